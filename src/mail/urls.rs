//! Tender URL collection from CSV rows.

use crate::mail::rows::CsvRow;

/// A column is a URL source when its name contains "url", ignoring case.
pub fn is_url_column(name: &str) -> bool {
    name.to_lowercase().contains("url")
}

/// Collect non-empty URL-column values, row by row, column by column.
///
/// Values are not validated; the scraper is where a bad URL shows up.
pub fn collect_urls(rows: &[CsvRow]) -> Vec<String> {
    rows.iter()
        .flat_map(|row| {
            row.iter()
                .filter(|(column, value)| is_url_column(column) && !value.is_empty())
                .map(|(_, value)| value.to_string())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[(&str, &str)]) -> CsvRow {
        cells.iter().copied().collect()
    }

    #[test]
    fn url_column_names() {
        assert!(is_url_column("URL"));
        assert!(is_url_column("Tender URL"));
        assert!(is_url_column("source_url"));
        assert!(is_url_column("Curly"));
        assert!(!is_url_column("Link"));
        assert!(!is_url_column("Notes"));
    }

    #[test]
    fn collects_in_row_then_column_order() {
        let rows = vec![
            row(&[("Tender URL", "https://a/1"), ("Notes", "x"), ("Alt Url", "https://a/2")]),
            row(&[("Tender URL", "https://b/1"), ("Notes", "y"), ("Alt Url", "")]),
        ];
        assert_eq!(
            collect_urls(&rows),
            vec!["https://a/1", "https://a/2", "https://b/1"]
        );
    }

    #[test]
    fn skips_empty_values() {
        let rows = vec![row(&[("URL", "")]), row(&[("URL", "https://c")])];
        assert_eq!(collect_urls(&rows), vec!["https://c"]);
    }

    #[test]
    fn no_url_columns_is_empty() {
        let rows = vec![row(&[("Title", "Roads"), ("Agency", "DoT")])];
        assert!(collect_urls(&rows).is_empty());
        assert!(collect_urls(&[]).is_empty());
    }

    #[test]
    fn values_are_not_validated() {
        let rows = vec![row(&[("url", "not a url at all")])];
        assert_eq!(collect_urls(&rows), vec!["not a url at all"]);
    }

    #[test]
    fn collection_is_repeatable() {
        let rows = vec![
            row(&[("URL", "https://a"), ("Other URL", "https://b")]),
            row(&[("URL", "https://c"), ("Other URL", "")]),
        ];
        assert_eq!(collect_urls(&rows), collect_urls(&rows));
    }
}

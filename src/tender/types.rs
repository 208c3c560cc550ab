//! Tender record types.

use serde::{Deserialize, Serialize};

/// Fields scraped from one tender detail page.
///
/// Fields the page does not carry are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenderDetails {
    pub description: String,
    pub category: String,
    pub agency: String,
    /// The page URL exactly as it appeared in the CSV.
    pub url: String,
}

impl TenderDetails {
    /// Text handed to the relevance classifier.
    pub fn summary(&self) -> String {
        format!(
            "Agency: {}\nCategory: {}\nDescription: {}\n",
            self.agency, self.category, self.description
        )
    }

    /// True when none of the scraped fields carried any text.
    pub fn is_blank(&self) -> bool {
        self.agency.is_empty() && self.category.is_empty() && self.description.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_has_three_labelled_lines() {
        let tender = TenderDetails {
            description: "Genomics data platform".into(),
            category: "81110000 - Computer services".into(),
            agency: "CSIRO".into(),
            url: "https://www.tenders.gov.au/Atm/Show/1".into(),
        };
        assert_eq!(
            tender.summary(),
            "Agency: CSIRO\nCategory: 81110000 - Computer services\nDescription: Genomics data platform\n"
        );
        assert!(!tender.is_blank());
    }

    #[test]
    fn empty_fields_still_render() {
        let tender = TenderDetails {
            url: "https://x".into(),
            ..Default::default()
        };
        assert_eq!(tender.summary(), "Agency: \nCategory: \nDescription: \n");
        assert!(tender.is_blank());
    }
}

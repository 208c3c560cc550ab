//! CSV attachment rows.

use serde::Serialize;

use crate::error::MailError;

/// One data row of a CSV attachment, keyed by header name.
///
/// Column order follows the header row. A repeated header name keeps its
/// first position and takes the last value, like any other mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CsvRow {
    cells: Vec<(String, String)>,
}

impl CsvRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `column` to `value`, replacing any existing value for that column.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        let column = column.into();
        let value = value.into();
        match self.cells.iter_mut().find(|(name, _)| *name == column) {
            Some((_, existing)) => *existing = value,
            None => self.cells.push((column, value)),
        }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value.as_str())
    }

    /// Iterate `(column, value)` pairs in header order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cells
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for CsvRow
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = CsvRow::new();
        for (column, value) in iter {
            row.insert(column, value);
        }
        row
    }
}

/// Parse CSV text with a header row into one `CsvRow` per data row.
///
/// Short records are padded with empty strings; cells past the last header
/// are dropped.
pub fn parse_csv_rows(text: &str) -> Result<Vec<CsvRow>, MailError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| MailError::CsvDecode(format!("unreadable header row: {e}")))?
        .clone();

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record =
            record.map_err(|e| MailError::CsvDecode(format!("bad record {}: {e}", index + 1)))?;

        if record.len() > headers.len() {
            tracing::debug!(
                record = index + 1,
                cells = record.len(),
                columns = headers.len(),
                "Dropping cells beyond header row"
            );
        }

        let row: CsvRow = headers
            .iter()
            .enumerate()
            .map(|(col, name)| (name, record.get(col).unwrap_or("")))
            .collect();
        rows.push(row);
    }

    Ok(rows)
}

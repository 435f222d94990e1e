// ============================================================
// CSV ROW TYPES
// ============================================================
// Unvalidated field-name-to-value mapping for one data line

use serde::{Deserialize, Serialize};

use super::FieldMap;

/// First data row number; row 1 is the header.
pub const FIRST_DATA_ROW: usize = 2;

/// A single data row in a CSV file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvRow {
    /// Row number as reported to clients (header is row 1)
    pub row_number: usize,

    /// Header name to raw cell value. Cells missing from a short line are
    /// absent; empty cells are present as empty strings.
    pub field_map: FieldMap,
}

impl CsvRow {
    /// Create a new CSV row
    pub fn new(row_number: usize, field_map: FieldMap) -> Self {
        Self {
            row_number,
            field_map,
        }
    }

    /// Build a row from `(header, value)` pairs
    pub fn from_pairs<'a, I>(row_number: usize, pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let field_map = pairs
            .into_iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();

        Self::new(row_number, field_map)
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.field_map.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.field_map.contains_key(field)
    }
}

// ============================================================
// CSV PARSER
// ============================================================
// Parse uploaded CSV content into numbered raw rows

use csv::{ReaderBuilder, StringRecord};

use crate::domain::csv::{CsvRow, FieldMap};
use crate::domain::error::UploadError;

const UTF8_BOM: char = '\u{feff}';

/// Decode an upload as strict UTF-8, dropping a leading byte order mark.
pub fn decode_utf8(bytes: &[u8]) -> Result<&str, UploadError> {
    let content =
        std::str::from_utf8(bytes).map_err(|e| UploadError::DecodeError(e.to_string()))?;
    Ok(content.strip_prefix(UTF8_BOM).unwrap_or(content))
}

/// Comma-separated parser producing header-keyed rows.
///
/// Quoting is lenient: an unterminated quote runs to the end of the input and
/// a quote inside an unquoted cell is kept as data. Reader errors still map to
/// `MalformedCsv`, but decoded text with flexible widths does not produce any.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvParser;

impl CsvParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse CSV content. The first line is the header; data rows are
    /// numbered from 2 and blank lines are skipped without consuming a number.
    pub fn parse_content(&self, content: &str) -> Result<Vec<CsvRow>, UploadError> {
        let mut reader = ReaderBuilder::new()
            .flexible(true) // short and long rows are the validator's problem
            .from_reader(content.as_bytes());

        let headers = reader
            .headers()
            .map_err(|e| UploadError::MalformedCsv(format!("Failed to read CSV headers: {}", e)))?
            .clone();

        let mut rows = Vec::new();
        for (index, result) in reader.records().enumerate() {
            let row_number = index + crate::domain::csv::FIRST_DATA_ROW;
            let record = result.map_err(|e| {
                UploadError::MalformedCsv(format!("Failed to parse CSV row {}: {}", row_number, e))
            })?;
            rows.push(Self::parse_row(row_number, &headers, &record));
        }

        Ok(rows)
    }

    /// Zip one record against the header. Cells past the header width are
    /// dropped; headers past the record width get no entry.
    fn parse_row(row_number: usize, headers: &StringRecord, record: &StringRecord) -> CsvRow {
        let field_map: FieldMap = headers
            .iter()
            .zip(record.iter())
            .map(|(header, value)| (header.to_string(), value.to_string()))
            .collect();

        CsvRow::new(row_number, field_map)
    }
}

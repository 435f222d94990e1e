// ============================================================
// CSV INFRASTRUCTURE LAYER
// ============================================================
// Decoding and parsing of uploaded CSV content

mod csv_parser;

pub use csv_parser::{decode_utf8, CsvParser};

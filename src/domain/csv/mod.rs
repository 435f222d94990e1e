// ============================================================
// CSV DOMAIN LAYER
// ============================================================
// Raw row types produced by the CSV parser
// No I/O, no async, no external dependencies

mod csv_row;

pub use csv_row::{CsvRow, FIRST_DATA_ROW};

pub use std::collections::HashMap;
pub type FieldMap = HashMap<String, String>;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use super::error::ValidationError;
use super::user::UserRecord;

/// Raw upload as handed over by the transport layer.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            bytes: bytes.into(),
        }
    }
}

/// Why a single row was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionReason {
    Invalid(ValidationError),
    DuplicateEmail,
}

pub const DUPLICATE_EMAIL_MESSAGE: &str = "Email already exists";

impl Serialize for RejectionReason {
    /// Row-shape failures serialize as a plain message, field failures as
    /// `{"<field>": ["<message>"]}`.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RejectionReason::DuplicateEmail => serializer.serialize_str(DUPLICATE_EMAIL_MESSAGE),
            RejectionReason::Invalid(err) => match err.field() {
                Some(field) => {
                    let mut map = serializer.serialize_map(Some(1))?;
                    map.serialize_entry(field, &[err.message()])?;
                    map.end()
                }
                None => serializer.serialize_str(err.message()),
            },
        }
    }
}

impl From<ValidationError> for RejectionReason {
    fn from(err: ValidationError) -> Self {
        RejectionReason::Invalid(err)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowError {
    pub row: usize,
    pub errors: RejectionReason,
}

/// Result of validating one data row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Accepted(UserRecord),
    Rejected {
        row_number: usize,
        reason: RejectionReason,
    },
}

/// Aggregate result of one upload.
///
/// Counters only move through `record_success` and `record_rejection`, which
/// keeps `errors.len() == rejected_records` at all times.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UploadReport {
    successful_records: usize,
    rejected_records: usize,
    errors: Vec<RowError>,
}

impl UploadReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&mut self) {
        self.successful_records += 1;
    }

    pub fn record_rejection(&mut self, row: usize, reason: RejectionReason) {
        self.rejected_records += 1;
        self.errors.push(RowError {
            row,
            errors: reason,
        });
    }

    pub fn successful_records(&self) -> usize {
        self.successful_records
    }

    pub fn rejected_records(&self) -> usize {
        self.rejected_records
    }

    pub fn errors(&self) -> &[RowError] {
        &self.errors
    }

    pub fn total_records(&self) -> usize {
        self.successful_records + self.rejected_records
    }
}

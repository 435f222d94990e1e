use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Serialize, Deserialize)]
pub enum AppError {
    NotFound(String),
    DatabaseError(String),
    IoError(String),
    ConfigError(String),
    Upload(UploadError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            AppError::IoError(msg) => write!(f, "IO error: {}", msg),
            AppError::ConfigError(msg) => write!(f, "Config error: {}", msg),
            // Upload errors are shown to clients verbatim
            AppError::Upload(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for AppError {}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::IoError(err.to_string())
    }
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        AppError::Upload(err)
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

/// Request-level failures. Any of these aborts an upload before a single
/// row reaches the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UploadError {
    NoFileProvided,
    UnsupportedFileType,
    DecodeError(String),
    MalformedCsv(String),
    FileTooLarge { limit: usize },
    InvalidMultipart(String),
}

impl fmt::Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadError::NoFileProvided => write!(f, "No file provided"),
            UploadError::UnsupportedFileType => write!(f, "File must have .csv extension"),
            UploadError::DecodeError(msg) => write!(f, "File is not valid UTF-8: {}", msg),
            UploadError::MalformedCsv(msg) => write!(f, "Malformed CSV: {}", msg),
            UploadError::FileTooLarge { limit } => {
                write!(f, "File exceeds the upload limit of {} bytes", limit)
            }
            UploadError::InvalidMultipart(msg) => write!(f, "Invalid multipart body: {}", msg),
        }
    }
}

impl std::error::Error for UploadError {}

/// Row-level validation failures, reported in the upload report and never
/// raised past the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationError {
    MissingFields,
    InvalidAge,
    EmptyName,
    NameTooLong,
    AgeOutOfRange,
    InvalidEmail,
}

impl ValidationError {
    /// Field the failure is attributed to, for field-level failures.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ValidationError::MissingFields | ValidationError::InvalidAge => None,
            ValidationError::EmptyName | ValidationError::NameTooLong => Some("name"),
            ValidationError::AgeOutOfRange => Some("age"),
            ValidationError::InvalidEmail => Some("email"),
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ValidationError::MissingFields => "Missing required fields (name, email, age)",
            ValidationError::InvalidAge => "Age must be a valid integer",
            ValidationError::EmptyName => "Name cannot be empty",
            ValidationError::NameTooLong => "Ensure this field has no more than 255 characters.",
            ValidationError::AgeOutOfRange => "Age must be an integer between 0 and 120",
            ValidationError::InvalidEmail => "Enter a valid email address.",
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.field() {
            Some(field) => write!(f, "{}: {}", field, self.message()),
            None => write!(f, "{}", self.message()),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Outcome of a failed store insert. Only `DuplicateEmail` is recoverable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertError {
    DuplicateEmail,
    Database(String),
}

impl fmt::Display for InsertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InsertError::DuplicateEmail => write!(f, "Email already exists"),
            InsertError::Database(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for InsertError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_errors_render_client_messages() {
        let err: AppError = UploadError::NoFileProvided.into();
        assert_eq!(err.to_string(), "No file provided");

        let err: AppError = UploadError::UnsupportedFileType.into();
        assert_eq!(err.to_string(), "File must have .csv extension");
    }

    #[test]
    fn test_validation_error_field_attribution() {
        assert_eq!(ValidationError::EmptyName.field(), Some("name"));
        assert_eq!(ValidationError::NameTooLong.field(), Some("name"));
        assert_eq!(ValidationError::AgeOutOfRange.field(), Some("age"));
        assert_eq!(ValidationError::InvalidEmail.field(), Some("email"));
        assert_eq!(ValidationError::InvalidAge.field(), None);
        assert_eq!(
            ValidationError::AgeOutOfRange.to_string(),
            "age: Age must be an integer between 0 and 120"
        );
    }
}

pub mod csv_upload;
pub mod record_validator;
pub mod user_directory;

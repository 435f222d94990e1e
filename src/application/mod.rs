pub mod use_cases;

pub use use_cases::csv_upload::CsvUploadUseCase;
pub use use_cases::user_directory::UserDirectoryUseCase;

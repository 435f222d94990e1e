pub mod error;
pub mod upload;
pub mod user;

// CSV row types
pub mod csv;

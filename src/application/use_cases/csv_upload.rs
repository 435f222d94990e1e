// ============================================================
// CSV UPLOAD USE CASE
// ============================================================
// Decode, parse, validate and store an uploaded user CSV

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::application::use_cases::record_validator::classify_row;
use crate::domain::error::{AppError, InsertError, Result, UploadError};
use crate::domain::upload::{RejectionReason, RowOutcome, UploadReport, UploadedFile};
use crate::infrastructure::csv::{decode_utf8, CsvParser};
use crate::infrastructure::db::users::UserStore;

pub const CSV_EXTENSION: &str = ".csv";

/// Row-by-row CSV ingestion.
///
/// Each row commits on its own: a rejected row never blocks the rows after
/// it, and rows stored before a fatal store error stay stored.
pub struct CsvUploadUseCase {
    store: Arc<dyn UserStore>,
    parser: CsvParser,
}

impl CsvUploadUseCase {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self {
            store,
            parser: CsvParser::new(),
        }
    }

    pub async fn ingest(&self, file: Option<UploadedFile>) -> Result<UploadReport> {
        let file = file.ok_or(UploadError::NoFileProvided)?;
        if !file.filename.ends_with(CSV_EXTENSION) {
            return Err(UploadError::UnsupportedFileType.into());
        }

        let content = decode_utf8(&file.bytes)?;
        // Parse everything up front so a malformed file never half-commits.
        let rows = self.parser.parse_content(content)?;

        let mut report = UploadReport::new();
        for row in &rows {
            let record = match classify_row(row) {
                RowOutcome::Accepted(record) => record,
                RowOutcome::Rejected { row_number, reason } => {
                    debug!(row = row_number, reason = ?reason, "Rejected CSV row");
                    report.record_rejection(row_number, reason);
                    continue;
                }
            };

            match self.store.insert(&record).await {
                Ok(id) => {
                    debug!(row = row.row_number, user_id = id, "Stored CSV row");
                    report.record_success();
                }
                Err(InsertError::DuplicateEmail) => {
                    debug!(row = row.row_number, email = %record.email(), "Duplicate email");
                    report.record_rejection(row.row_number, RejectionReason::DuplicateEmail);
                }
                Err(InsertError::Database(msg)) => {
                    error!(
                        error = %msg,
                        row = row.row_number,
                        filename = %file.filename,
                        "Aborting CSV upload on store failure"
                    );
                    return Err(AppError::DatabaseError(msg));
                }
            }
        }

        info!(
            filename = %file.filename,
            successful = report.successful_records(),
            rejected = report.rejected_records(),
            "Processed CSV upload"
        );
        Ok(report)
    }
}

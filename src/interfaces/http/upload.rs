use actix_multipart::{Field, Multipart};
use actix_web::http::header;
use actix_web::HttpRequest;
use futures_util::TryStreamExt;

use crate::domain::error::{AppError, Result, UploadError};
use crate::domain::upload::UploadedFile;

/// Multipart field carrying the CSV file.
pub const FILE_FIELD: &str = "file";

/// Pull the uploaded file out of a multipart body.
///
/// Returns `Ok(None)` when the request is not multipart or has no file part
/// named `file`; the upload use case turns that into `NoFileProvided`. A part
/// sent with an empty filename is an empty file input and does not count.
pub async fn read_file_field(
    req: &HttpRequest,
    mut payload: Multipart,
    max_bytes: usize,
) -> Result<Option<UploadedFile>> {
    if !is_multipart(req) {
        return Ok(None);
    }

    while let Some(mut field) = payload.try_next().await.map_err(invalid_multipart)? {
        let (name, filename) = match field.content_disposition() {
            Some(disposition) => (
                disposition.get_name().map(str::to_string),
                disposition.get_filename().map(str::to_string),
            ),
            None => (None, None),
        };

        match (name, filename) {
            (Some(name), Some(filename)) if name == FILE_FIELD && !filename.is_empty() => {
                let bytes = read_field(&mut field, max_bytes).await?;
                return Ok(Some(UploadedFile::new(filename, bytes)));
            }
            // plain form values and unrelated files
            _ => drain_field(&mut field).await?,
        }
    }

    Ok(None)
}

fn is_multipart(req: &HttpRequest) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| {
            value
                .trim_start()
                .to_ascii_lowercase()
                .starts_with("multipart/form-data")
        })
        .unwrap_or(false)
}

async fn read_field(field: &mut Field, max_bytes: usize) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.try_next().await.map_err(invalid_multipart)? {
        if bytes.len() + chunk.len() > max_bytes {
            return Err(UploadError::FileTooLarge { limit: max_bytes }.into());
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

async fn drain_field(field: &mut Field) -> Result<()> {
    while field.try_next().await.map_err(invalid_multipart)?.is_some() {}
    Ok(())
}

fn invalid_multipart(err: impl std::fmt::Display) -> AppError {
    UploadError::InvalidMultipart(err.to_string()).into()
}

mod upload;

#[cfg(test)]
mod tests;

use crate::application::{CsvUploadUseCase, UserDirectoryUseCase};
use crate::domain::error::{AppError, UploadError};
use crate::infrastructure::db::users::UserRepository;
use crate::infrastructure::response::{ErrorBody, HealthBody};
use actix_cors::Cors;
use actix_multipart::Multipart;
use actix_web::http::StatusCode;
use actix_web::{
    dev::Server, get, middleware, post, web, App, HttpRequest, HttpResponse, HttpServer,
    Responder, ResponseError,
};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

pub use upload::FILE_FIELD;

const MAX_LOG_ENTRIES: usize = 100;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LogEntry {
    pub time: String,
    pub level: String,
    pub source: String,
    pub message: String,
}

pub struct HttpState {
    pub upload_use_case: CsvUploadUseCase,
    pub user_directory: UserDirectoryUseCase,
    pub repository: Arc<UserRepository>,
    pub logs: Arc<Mutex<Vec<LogEntry>>>,
    pub max_upload_bytes: usize,
}

impl HttpState {
    pub fn new(
        repository: Arc<UserRepository>,
        logs: Arc<Mutex<Vec<LogEntry>>>,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            upload_use_case: CsvUploadUseCase::new(repository.clone()),
            user_directory: UserDirectoryUseCase::new(repository.clone()),
            repository,
            logs,
            max_upload_bytes,
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Upload(UploadError::FileTooLarge { .. }) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Upload(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody::new(self.to_string()))
    }
}

#[post("/upload-csv")]
async fn upload_csv(
    data: web::Data<HttpState>,
    req: HttpRequest,
    payload: Multipart,
) -> Result<HttpResponse, AppError> {
    let result = match upload::read_file_field(&req, payload, data.max_upload_bytes).await {
        Ok(file) => data.upload_use_case.ingest(file).await,
        Err(err) => Err(err),
    };

    match result {
        Ok(report) => {
            add_log(
                &data.logs,
                "INFO",
                "Upload",
                &format!(
                    "CSV processed: {} stored, {} rejected",
                    report.successful_records(),
                    report.rejected_records()
                ),
            );
            Ok(HttpResponse::Ok().json(report))
        }
        Err(err) => {
            let level = if err.status_code().is_server_error() {
                "ERROR"
            } else {
                "WARN"
            };
            add_log(
                &data.logs,
                level,
                "Upload",
                &format!("CSV upload failed: {}", err),
            );
            Err(err)
        }
    }
}

#[derive(Deserialize)]
struct ListUsersQuery {
    limit: Option<i64>,
    offset: Option<i64>,
}

#[get("/users")]
async fn list_users(
    data: web::Data<HttpState>,
    query: web::Query<ListUsersQuery>,
) -> Result<HttpResponse, AppError> {
    let page = data
        .user_directory
        .list_users(query.limit, query.offset)
        .await?;
    Ok(HttpResponse::Ok().json(page))
}

#[get("/health")]
async fn health(data: web::Data<HttpState>) -> impl Responder {
    match data.repository.ping().await {
        Ok(()) => HttpResponse::Ok().json(HealthBody::ok()),
        Err(e) => {
            add_log(
                &data.logs,
                "ERROR",
                "Health",
                &format!("Health check failed: {}", e),
            );
            HttpResponse::ServiceUnavailable().json(HealthBody::unavailable(e.to_string()))
        }
    }
}

#[get("/logs")]
async fn get_logs(data: web::Data<HttpState>) -> impl Responder {
    let logs = data.logs.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    HttpResponse::Ok().json(&*logs)
}

pub fn add_log_entry(
    logs: &Mutex<Vec<LogEntry>>,
    level: &str,
    source: &str,
    message: &str,
) -> LogEntry {
    let entry = LogEntry {
        time: Local::now().format("%H:%M:%S").to_string(),
        level: level.to_string(),
        source: source.to_string(),
        message: message.to_string(),
    };
    let mut logs = logs.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    logs.push(entry.clone());
    if logs.len() > MAX_LOG_ENTRIES {
        logs.remove(0);
    }
    entry
}

pub fn add_log(logs: &Mutex<Vec<LogEntry>>, level: &str, source: &str, message: &str) {
    add_log_entry(logs, level, source, message);
}

pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(upload_csv)
            .service(list_users)
            .service(health)
            .service(get_logs),
    );
}

pub fn start_server(state: HttpState, host: &str, port: u16) -> std::io::Result<Server> {
    let state = web::Data::new(state);

    let server = HttpServer::new(move || {
        let cors = Cors::permissive(); // Allow all origins for local tool

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure_api)
    })
    .bind((host, port))?
    .run();

    Ok(server)
}

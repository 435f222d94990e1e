use std::sync::{Arc, Mutex};

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::domain::error::{AppError, Result};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::db::users::UserRepository;
use crate::infrastructure::storage::ensure_database_dir;
use crate::interfaces::http::{add_log, start_server, HttpState, LogEntry};

pub async fn run() -> Result<()> {
    let config = AppConfig::load()?;
    init_tracing(&config.log_level);

    ensure_database_dir(&config.database_path).map_err(|err| {
        error!(
            error = %err,
            database_path = %config.database_path.display(),
            "Failed to create database dir"
        );
        AppError::from(err)
    })?;

    let repository = Arc::new(UserRepository::connect(&config.database_path).await?);
    info!(database_path = %config.database_path.display(), "Users database ready");

    let logs: Arc<Mutex<Vec<LogEntry>>> = Arc::new(Mutex::new(Vec::new()));
    add_log(
        &logs,
        "INFO",
        "Server",
        &format!("Listening on {}:{}", config.host, config.port),
    );

    let state = HttpState::new(repository.clone(), logs, config.max_upload_bytes);
    let server = start_server(state, &config.host, config.port).map_err(|err| {
        error!(error = %err, host = %config.host, port = config.port, "Failed to bind HTTP server");
        AppError::from(err)
    })?;

    info!(host = %config.host, port = config.port, "HTTP server started");
    server.await?;

    repository.close().await;
    info!("HTTP server stopped");
    Ok(())
}

fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

//! Store creation and utility functions.

use std::path::PathBuf;

use yagogame::{
    Directory,
    backend::database::{FileBacked, InMemory, SqlxBackend},
};

use crate::cli::{Backend, BackendConfig};

/// Redact credentials from a PostgreSQL connection URL for safe logging
pub fn redact_postgres_url(url: &str) -> String {
    if let Ok(parsed) = url::Url::parse(url) {
        let mut redacted = parsed.clone();
        if !parsed.username().is_empty() {
            let _ = redacted.set_username("***");
        }
        if parsed.password().is_some() {
            let _ = redacted.set_password(Some("***"));
        }
        redacted.to_string()
    } else {
        "postgres://***@<unparsable-url>".to_string()
    }
}

/// Open the configured store and wrap it in a `Directory`
pub async fn create_directory(
    config: &BackendConfig,
) -> Result<Directory, Box<dyn std::error::Error>> {
    let data_dir = config.data_dir.clone().unwrap_or_else(|| PathBuf::from("."));

    match config.backend {
        Backend::File => {
            let path = match &config.users_file {
                Some(path) => path.clone(),
                None => {
                    tokio::fs::create_dir_all(&data_dir).await?;
                    data_dir.join("users.json")
                }
            };
            tracing::info!("Using users file {}", path.display());
            Ok(Directory::from_store(FileBacked::open(&path).await?))
        }
        Backend::Sqlite => {
            tokio::fs::create_dir_all(&data_dir).await?;
            let db_path = data_dir.join("users.db");
            tracing::info!("Using SQLite backend at {}", db_path.display());
            Ok(Directory::from_store(SqlxBackend::open_sqlite(&db_path).await?))
        }
        Backend::Postgres => {
            let url = config
                .postgres_url
                .as_ref()
                .ok_or("PostgreSQL backend requires --postgres-url or YAGOGAME_POSTGRES_URL")?;

            let display_url = redact_postgres_url(url);
            tracing::info!("Connecting to PostgreSQL backend at {}", display_url);

            match SqlxBackend::connect_postgres(url).await {
                Ok(backend) => {
                    tracing::info!("Connected to PostgreSQL successfully");
                    Ok(Directory::from_store(backend))
                }
                Err(e) => {
                    Err(format!("Failed to connect to PostgreSQL at {display_url}: {e}").into())
                }
            }
        }
        Backend::Inmemory => {
            tracing::warn!("Using in-memory backend; users will not survive a restart");
            Ok(Directory::from_store(InMemory::new()))
        }
    }
}

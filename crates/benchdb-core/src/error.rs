// crates/benchdb-core/src/error.rs

use std::path::PathBuf;

use benchdb_parser::CaptureError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BenchError {
    #[error("Capture import failed: {0}")]
    Capture(#[from] CaptureError),

    #[error("Database query failed: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Schema setup failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("File I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Config file is not valid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Run {0} does not exist")]
    RunNotFound(i32),
}

pub type Result<T> = std::result::Result<T, BenchError>;

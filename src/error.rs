use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TabliteError {
    #[error("invalid arguments: a database path and a SQL statement are required (see --help)")]
    InvalidArgs,

    #[error("config: {message}")]
    Config { message: String },

    #[error("database file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("not a directory: {}", path.display())]
    NotADirectory { path: PathBuf },

    #[error("cannot open database {locator}: {source}")]
    Open {
        locator: String,
        source: rusqlite::Error,
    },

    #[error("{locator}: {source}")]
    Statement {
        locator: String,
        source: rusqlite::Error,
    },

    #[error("download failed for {url}: {message}")]
    Download { url: String, message: String },

    #[error("downloaded file appears to be empty: {url}")]
    EmptyDownload { url: String },

    #[error("output: {0}")]
    Output(#[from] csv::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal: {message}")]
    Internal { message: String },

    #[error("cancelled by interrupt signal")]
    Cancelled,
}

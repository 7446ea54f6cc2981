// Error type shared by the stores, the launcher and the balance query
// Commands flatten it into a message string at the IPC boundary

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid JSON in {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Name already exists: {0}")]
    DuplicateName(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("{0} is not installed")]
    TerminalNotInstalled(String),
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Unsupported on this platform: {0}")]
    Unsupported(String),
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        AppError::Io { path: path.as_ref().to_path_buf(), source }
    }

    pub fn parse(path: impl AsRef<Path>, source: serde_json::Error) -> Self {
        AppError::Parse { path: path.as_ref().to_path_buf(), source }
    }
}

pub type AppResult<T> = Result<T, AppError>;

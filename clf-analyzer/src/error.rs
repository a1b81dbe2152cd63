use std::path::PathBuf;

use thiserror::Error;
use tokio::task::JoinError;

#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("analysis task failed: {0}")]
    Task(#[from] JoinError),
}

pub type Result<T> = std::result::Result<T, AnalyzerError>;

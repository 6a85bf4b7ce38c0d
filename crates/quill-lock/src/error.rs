//! Error types for the quill-lock library

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LockError>;

#[derive(Error, Debug)]
pub enum LockError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid security settings: {0}")]
    InvalidSettings(String),

    #[error("Invalid setup input: {0}")]
    InvalidSetup(String),

    #[error("Setup step error: {0}")]
    SetupStep(String),
}

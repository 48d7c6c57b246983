use thiserror::Error;
use uuid::Uuid;

/// Errors raised by the store, the import/export layer and the CLI.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("flow not found: {0}")]
    NotFound(Uuid),

    #[error("invalid flow: {0}")]
    Invalid(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FlowError>;

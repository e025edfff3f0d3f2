use thiserror::Error;

pub type Result<T> = std::result::Result<T, SeederError>;

#[derive(Error, Debug)]
pub enum SeederError {
    #[error("Failed to read fixture: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Storage error: {0}")]
    StorageError(#[from] storage::error::StorageError),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Load error: {0}")]
    LoadError(String),
}

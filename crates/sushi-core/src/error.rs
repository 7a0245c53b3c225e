//! Error types for the sushi catalog

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SushiError>;

#[derive(Error, Debug)]
pub enum SushiError {
    #[error("Sushi not found: {0}")]
    NotFound(String),

    #[error("Sushi already exists: {0}")]
    AlreadyExists(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Redis error: {0}")]
    Redis(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl SushiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, SushiError::NotFound(_))
    }

    pub fn is_already_exists(&self) -> bool {
        matches!(self, SushiError::AlreadyExists(_))
    }
}

impl From<serde_json::Error> for SushiError {
    fn from(e: serde_json::Error) -> Self {
        SushiError::Serialization(e.to_string())
    }
}

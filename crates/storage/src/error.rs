use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("invalid DATABASE_URL: {0}")]
    InvalidUrl(String),

    #[error("not configured: {0}")]
    NotConfigured(String),
}

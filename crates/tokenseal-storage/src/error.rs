use thiserror::Error;

use tokenseal_crypto::CryptoError;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "sqlite")]
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    #[error("Invalid item name: {0:?}")]
    InvalidName(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

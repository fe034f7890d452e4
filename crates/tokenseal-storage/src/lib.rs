//! Encrypted item storage for browser-style key-value stores.
//!
//! [`SecureStorage`] seals values with `tokenseal-crypto` before writing them
//! through a [`StorageBackend`]; [`TokenManager`] keeps the auth token set on
//! top of it.

pub mod error;
pub mod secure;
pub mod storage;
pub mod token_manager;

pub use error::{Result, StorageError};
pub use secure::{SecureStorage, SecureStorageOptions, DEFAULT_SECURE_PREFIX};
pub use storage::{MemoryStorage, StorageBackend};
#[cfg(feature = "sqlite")]
pub use storage::SqliteStorage;
pub use token_manager::{TokenManager, TokenManagerOptions, TokenSet, TOKENS_ITEM};

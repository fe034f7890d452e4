//! Session-scoped cache of the derived key and the salt it came from.
//!
//! Lifecycle: empty until the first encrypt/decrypt stores a pair, replaced
//! whenever a different salt is derived, emptied by `clear`. The lock is only
//! held for the swap; derivation happens outside it, so two callers racing
//! from empty both derive and the last `store` wins.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::kdf::DerivedKey;
use crate::types::SALT_LENGTH;

struct CachedKey {
    key: Arc<DerivedKey>,
    salt: [u8; SALT_LENGTH],
}

#[derive(Default)]
pub struct KeyCache {
    slot: Mutex<Option<CachedKey>>,
}

impl KeyCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached key and its salt, if any.
    pub fn current(&self) -> Option<(Arc<DerivedKey>, [u8; SALT_LENGTH])> {
        self.slot
            .lock()
            .as_ref()
            .map(|cached| (Arc::clone(&cached.key), cached.salt))
    }

    /// The cached key, only if it was derived from `salt`.
    pub fn key_for_salt(&self, salt: &[u8]) -> Option<Arc<DerivedKey>> {
        self.slot
            .lock()
            .as_ref()
            .filter(|cached| cached.salt.as_slice() == salt)
            .map(|cached| Arc::clone(&cached.key))
    }

    /// Replace whatever is cached with `(key, salt)`.
    pub fn store(&self, key: Arc<DerivedKey>, salt: [u8; SALT_LENGTH]) {
        *self.slot.lock() = Some(CachedKey { key, salt });
    }

    /// Drop the cached pair. Returns whether anything was cached.
    ///
    /// Key bytes are zeroized once the last in-flight operation holding the
    /// `Arc` finishes.
    pub fn clear(&self) -> bool {
        self.slot.lock().take().is_some()
    }

    pub fn is_cached(&self) -> bool {
        self.slot.lock().is_some()
    }
}

impl std::fmt::Debug for KeyCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyCache")
            .field("cached", &self.is_cached())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AES_KEY_LENGTH;

    fn key(byte: u8) -> Arc<DerivedKey> {
        Arc::new(DerivedKey::from_bytes([byte; AES_KEY_LENGTH]))
    }

    #[test]
    fn starts_empty() {
        let cache = KeyCache::new();
        assert!(!cache.is_cached());
        assert!(cache.current().is_none());
    }

    #[test]
    fn store_then_lookup_by_salt() {
        let cache = KeyCache::new();
        cache.store(key(1), [9u8; SALT_LENGTH]);
        assert!(cache.key_for_salt(&[9u8; SALT_LENGTH]).is_some());
        assert!(cache.key_for_salt(&[8u8; SALT_LENGTH]).is_none());
    }

    #[test]
    fn last_writer_wins() {
        let cache = KeyCache::new();
        cache.store(key(1), [1u8; SALT_LENGTH]);
        cache.store(key(2), [2u8; SALT_LENGTH]);
        let (k, salt) = cache.current().unwrap();
        assert_eq!(salt, [2u8; SALT_LENGTH]);
        assert_eq!(k.as_bytes(), &[2u8; AES_KEY_LENGTH]);
    }

    #[test]
    fn clear_is_idempotent() {
        let cache = KeyCache::new();
        assert!(!cache.clear());
        cache.store(key(1), [1u8; SALT_LENGTH]);
        assert!(cache.clear());
        assert!(!cache.clear());
        assert!(!cache.is_cached());
    }
}

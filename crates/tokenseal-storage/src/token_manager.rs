//! Persists the auth token set through SecureStorage.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, StorageError};
use crate::secure::SecureStorage;
use crate::storage::StorageBackend;

/// Item name the token set is stored under (before the secure prefix).
pub const TOKENS_ITEM: &str = "auth_tokens";

/// Default clock skew tolerance, in seconds, applied before `expires_at`.
pub const DEFAULT_EXPIRY_SKEW_SECS: i64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenSet {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl TokenSet {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            expires_at: None,
        }
    }

    pub fn with_refresh_token(mut self, refresh_token: impl Into<String>) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }

    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Whether the access token is expired at `now`, treating anything within
    /// `skew` of the deadline as already expired. No expiry means never.
    /// A deadline pushed past the representable range counts as expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>, skew: Duration) -> bool {
        match self.expires_at {
            Some(expires_at) => now
                .checked_add_signed(skew)
                .map_or(true, |deadline| deadline >= expires_at),
            None => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TokenManagerOptions {
    pub expiry_skew_secs: i64,
}

impl Default for TokenManagerOptions {
    fn default() -> Self {
        Self {
            expiry_skew_secs: DEFAULT_EXPIRY_SKEW_SECS,
        }
    }
}

impl TokenManagerOptions {
    /// The skew as a `Duration`; fails when negative or out of range.
    pub fn skew(&self) -> Result<Duration> {
        if self.expiry_skew_secs < 0 {
            return Err(StorageError::InvalidOptions(
                "expiry_skew_secs must not be negative".into(),
            ));
        }
        Duration::try_seconds(self.expiry_skew_secs).ok_or_else(|| {
            StorageError::InvalidOptions(format!(
                "expiry_skew_secs out of range: {}",
                self.expiry_skew_secs
            ))
        })
    }
}

pub struct TokenManager<B: StorageBackend> {
    storage: SecureStorage<B>,
    skew: Duration,
}

impl<B: StorageBackend> TokenManager<B> {
    pub fn new(storage: SecureStorage<B>) -> Self {
        Self {
            storage,
            skew: Duration::seconds(DEFAULT_EXPIRY_SKEW_SECS),
        }
    }

    pub fn with_options(storage: SecureStorage<B>, options: TokenManagerOptions) -> Result<Self> {
        let skew = options.skew()?;
        Ok(Self { storage, skew })
    }

    pub fn storage(&self) -> &SecureStorage<B> {
        &self.storage
    }

    pub async fn store_tokens(&self, tokens: &TokenSet) -> Result<()> {
        self.storage.set_secure_json(TOKENS_ITEM, tokens).await?;
        debug!(has_refresh = tokens.refresh_token.is_some(), "stored auth tokens");
        Ok(())
    }

    /// The stored token set regardless of expiry. Corrupted entries read as `None`.
    pub async fn load_tokens(&self) -> Result<Option<TokenSet>> {
        self.storage.get_secure_json(TOKENS_ITEM).await
    }

    /// Access token valid at the current time.
    pub async fn access_token(&self) -> Result<Option<String>> {
        self.access_token_at(Utc::now()).await
    }

    /// Access token valid at `now`. An expired access token without a refresh
    /// token is discarded; with a refresh token the set is kept so the caller
    /// can renew it.
    pub async fn access_token_at(&self, now: DateTime<Utc>) -> Result<Option<String>> {
        let Some(tokens) = self.load_tokens().await? else {
            return Ok(None);
        };
        if !tokens.is_expired_at(now, self.skew) {
            return Ok(Some(tokens.access_token));
        }
        if tokens.refresh_token.is_none() {
            warn!("access token expired without refresh token, discarding");
            self.storage.remove_secure_item(TOKENS_ITEM)?;
        }
        Ok(None)
    }

    pub async fn refresh_token(&self) -> Result<Option<String>> {
        Ok(self.load_tokens().await?.and_then(|t| t.refresh_token))
    }

    /// True when a non-expired access token is stored.
    pub async fn is_authenticated(&self) -> Result<bool> {
        Ok(self.access_token().await?.is_some())
    }

    /// Remove the token set only, keeping other secure items and the cached key.
    pub fn clear_tokens(&self) -> Result<()> {
        self.storage.remove_secure_item(TOKENS_ITEM)
    }

    /// Full logout: every secure item and the cached key are dropped.
    pub fn logout(&self) -> Result<usize> {
        self.storage.logout()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn expiry_respects_skew() {
        let expires = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        let tokens = TokenSet::new("a").with_expiry(expires);
        let skew = Duration::seconds(30);

        assert!(!tokens.is_expired_at(expires - Duration::seconds(31), skew));
        assert!(tokens.is_expired_at(expires - Duration::seconds(30), skew));
        assert!(tokens.is_expired_at(expires + Duration::seconds(1), Duration::zero()));
    }

    #[test]
    fn huge_skew_does_not_overflow() {
        let tokens = TokenSet::new("a").with_expiry(Utc::now());
        let skew = Duration::try_seconds(i64::MAX / 1000).unwrap();
        assert!(tokens.is_expired_at(Utc::now(), skew));
    }

    #[test]
    fn options_reject_out_of_range_skew() {
        for secs in [-1, i64::MAX, i64::MIN] {
            let options = TokenManagerOptions {
                expiry_skew_secs: secs,
            };
            assert!(matches!(options.skew(), Err(StorageError::InvalidOptions(_))), "{secs}");
        }
        assert_eq!(
            TokenManagerOptions::default().skew().unwrap(),
            Duration::seconds(30)
        );
    }

    #[test]
    fn no_expiry_never_expires() {
        let tokens = TokenSet::new("a");
        assert!(!tokens.is_expired_at(Utc::now(), Duration::days(365)));
    }

    #[test]
    fn serializes_camel_case_and_skips_empty() {
        let json = serde_json::to_string(&TokenSet::new("abc").with_refresh_token("r")).unwrap();
        assert_eq!(json, r#"{"accessToken":"abc","refreshToken":"r"}"#);
    }
}

use std::fmt;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::cache::CacheManager;
use crate::models::TributeRecord;

/// Opaque identifier for one client installation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerToken(String);

impl OwnerToken {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<&str> for OwnerToken {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for OwnerToken {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for OwnerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Per-client state passed into every sync operation.
#[derive(Debug, Clone)]
pub struct ClientContext {
    token: OwnerToken,
}

impl ClientContext {
    pub fn new(token: OwnerToken) -> Self {
        Self { token }
    }

    /// Load the persisted owner token, generating and saving one on first run
    pub fn load_or_create(cache: &CacheManager) -> Result<Self> {
        if let Some(token) = cache.load_owner_token() {
            return Ok(Self::new(token));
        }

        let token = OwnerToken::generate();
        cache.save_owner_token(&token)?;
        info!(token = %token, "Generated new owner token");
        Ok(Self::new(token))
    }

    pub fn token(&self) -> &OwnerToken {
        &self.token
    }

    /// Whether this client submitted `record`. Advisory only; the backend
    /// re-checks ownership on delete.
    pub fn owns(&self, record: &TributeRecord) -> bool {
        !self.token.is_empty() && record.owner == self.token.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_owned_by(owner: &str) -> TributeRecord {
        TributeRecord {
            id: "1".to_string(),
            name: "A".to_string(),
            relation: "Friend".to_string(),
            message: "hello world!".to_string(),
            ts: 1000,
            owner: owner.to_string(),
        }
    }

    #[test]
    fn test_generated_tokens_are_unique() {
        let a = OwnerToken::generate();
        let b = OwnerToken::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 36);
    }

    #[test]
    fn test_owns_matching_token_only() {
        let ctx = ClientContext::new(OwnerToken::from("T"));
        assert!(ctx.owns(&record_owned_by("T")));
        assert!(!ctx.owns(&record_owned_by("U")));
        assert!(!ctx.owns(&record_owned_by("")));
    }

    #[test]
    fn test_empty_token_owns_nothing() {
        let ctx = ClientContext::new(OwnerToken::from(""));
        assert!(!ctx.owns(&record_owned_by("")));
    }

    #[test]
    fn test_load_or_create_persists_token() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CacheManager::new(dir.path().to_path_buf()).unwrap();

        let first = ClientContext::load_or_create(&cache).unwrap();
        let second = ClientContext::load_or_create(&cache).unwrap();
        assert_eq!(first.token(), second.token());

        // Clearing tributes leaves the token alone
        cache.clear().unwrap();
        let third = ClientContext::load_or_create(&cache).unwrap();
        assert_eq!(first.token(), third.token());
    }
}

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use crate::identity::OwnerToken;
use crate::models::TributeRecord;

/// Key for the tribute list. The suffix versions the stored layout.
const TRIBUTES_KEY: &str = "tributes_v1";

/// Key for this client's owner token.
const OWNER_TOKEN_KEY: &str = "user_uuid";

/// Consider the tribute list stale after 1 hour.
const CACHE_STALE_MINUTES: i64 = 60;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedData<T> {
    pub data: T,
    pub cached_at: DateTime<Utc>,
}

impl<T> CachedData<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }

    pub fn age_minutes(&self) -> i64 {
        (Utc::now() - self.cached_at).num_minutes()
    }

    pub fn age_display(&self) -> String {
        let minutes = self.age_minutes();
        if minutes < 1 {
            // Covers clock skew too
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            let hours = minutes / 60;
            if minutes % 60 >= 30 {
                format!("{}h ago", hours + 1)
            } else {
                format!("{}h ago", hours)
            }
        } else {
            let days = minutes / 1440;
            if (minutes % 1440) / 60 >= 12 {
                format!("{}d ago", days + 1)
            } else {
                format!("{}d ago", days)
            }
        }
    }

    pub fn is_stale(&self) -> bool {
        self.age_minutes() > CACHE_STALE_MINUTES
    }
}

/// Tribute list as found on disk: the current envelope, or a bare array
/// written by older clients.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredTributes {
    Envelope(CachedData<Vec<TributeRecord>>),
    Bare(Vec<TributeRecord>),
}

pub struct CacheManager {
    cache_dir: PathBuf,
}

impl CacheManager {
    pub fn new(cache_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&cache_dir)
            .with_context(|| format!("Failed to create data directory: {}", cache_dir.display()))?;
        Ok(Self { cache_dir })
    }

    pub fn dir(&self) -> &Path {
        &self.cache_dir
    }

    fn cache_path(&self, name: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", name))
    }

    fn read<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        let path = self.cache_path(name);
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read cache file: {}", name))?;

        let value = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse cache file: {}", name))?;

        Ok(Some(value))
    }

    fn write<T: Serialize>(&self, name: &str, value: &T) -> Result<()> {
        let contents = serde_json::to_string_pretty(value)?;
        std::fs::write(self.cache_path(name), contents)
            .with_context(|| format!("Failed to write cache file: {}", name))?;
        Ok(())
    }

    fn remove(&self, name: &str) -> Result<()> {
        let path = self.cache_path(name);
        if path.exists() {
            std::fs::remove_file(&path)
                .with_context(|| format!("Failed to remove cache file: {}", name))?;
        }
        Ok(())
    }

    // ===== Tributes =====

    /// The cached tribute list with its sync time. `None` when absent or
    /// unreadable. A bare array has no sync time and is stamped with the
    /// Unix epoch, so it reads as stale.
    pub fn load_cached(&self) -> Option<CachedData<Vec<TributeRecord>>> {
        match self.read::<StoredTributes>(TRIBUTES_KEY) {
            Ok(Some(StoredTributes::Envelope(cached))) => Some(cached),
            Ok(Some(StoredTributes::Bare(records))) => Some(CachedData {
                data: records,
                cached_at: DateTime::<Utc>::UNIX_EPOCH,
            }),
            Ok(None) => None,
            Err(e) => {
                debug!(cache = TRIBUTES_KEY, error = %e, "Ignoring unreadable tribute cache");
                None
            }
        }
    }

    /// The cached tributes in arrival order; empty when absent or malformed.
    pub fn load(&self) -> Vec<TributeRecord> {
        self.load_cached().map(|cached| cached.data).unwrap_or_default()
    }

    /// Replace the cached tribute list.
    pub fn save(&self, records: &[TributeRecord]) -> Result<()> {
        self.write(TRIBUTES_KEY, &CachedData::new(records))
    }

    /// Remove the cached tribute list. The owner token is kept.
    pub fn clear(&self) -> Result<()> {
        self.remove(TRIBUTES_KEY)
    }

    pub fn last_synced(&self) -> String {
        match self.load_cached() {
            Some(cached) if cached.cached_at == DateTime::<Utc>::UNIX_EPOCH => {
                "unknown".to_string()
            }
            Some(cached) => cached.age_display(),
            None => "never".to_string(),
        }
    }

    pub fn is_stale(&self) -> bool {
        // No cache = stale
        self.load_cached().map(|cached| cached.is_stale()).unwrap_or(true)
    }

    // ===== Owner token =====

    pub fn load_owner_token(&self) -> Option<OwnerToken> {
        match self.read::<OwnerToken>(OWNER_TOKEN_KEY) {
            Ok(Some(token)) if !token.is_empty() => Some(token),
            Ok(_) => None,
            Err(e) => {
                warn!(error = %e, "Owner token unreadable, a new one will be generated");
                None
            }
        }
    }

    pub fn save_owner_token(&self, token: &OwnerToken) -> Result<()> {
        self.write(OWNER_TOKEN_KEY, token)
    }
}

// ============================================================================
// Tests
// ============================================================================

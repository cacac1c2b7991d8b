use anyhow::Result;
use chrono::Utc;
use tracing::{debug, info, warn};

use crate::api::TributeRemote;
use crate::cache::CacheManager;
use crate::identity::ClientContext;
use crate::models::{TributeDraft, TributeRecord};

use super::SyncError;

/// Where the records returned by a bootstrap came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncSource {
    Remote,
    /// The backend was unreachable; these are the previously cached records.
    Cache,
}

#[derive(Debug, Clone)]
pub struct Bootstrap {
    pub records: Vec<TributeRecord>,
    pub source: SyncSource,
}

/// Stand-in remote for a controller that only touches the local cache.
#[derive(Debug, Clone, Copy, Default)]
pub struct Offline;

/// Coordinates the backend and the local cache.
///
/// Holds no state of its own: every operation re-reads the cache, so the
/// controller can be rebuilt freely. Concurrent submits/deletes are not
/// serialized; callers issue them one at a time.
pub struct SyncController<R> {
    remote: R,
    cache: CacheManager,
}

impl SyncController<Offline> {
    /// A controller for cache-only operations; needs no backend endpoint.
    pub fn offline(cache: CacheManager) -> Self {
        Self::new(Offline, cache)
    }
}

impl<R> SyncController<R> {
    pub fn new(remote: R, cache: CacheManager) -> Self {
        Self { remote, cache }
    }

    pub fn cache(&self) -> &CacheManager {
        &self.cache
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// Swap in a backend, keeping the same cache.
    pub fn with_remote<T: TributeRemote>(self, remote: T) -> SyncController<T> {
        SyncController::new(remote, self.cache)
    }

    pub fn can_delete(&self, ctx: &ClientContext, record: &TributeRecord) -> bool {
        ctx.owns(record)
    }

    /// Refuse a delete of a cached tribute owned by another client. Ids that
    /// are not cached pass; the backend re-checks ownership.
    pub fn check_owner(&self, ctx: &ClientContext, id: &str) -> Result<(), SyncError> {
        match self.cache.load().iter().find(|r| r.id == id) {
            Some(record) if !self.can_delete(ctx, record) => {
                Err(SyncError::NotOwner(id.to_string()))
            }
            _ => Ok(()),
        }
    }

    pub fn cached_tributes(&self) -> Vec<TributeRecord> {
        self.cache.load()
    }

    pub fn clear_local_cache(&self) -> Result<()> {
        self.cache.clear()?;
        info!("Cleared local tribute cache");
        Ok(())
    }
}

impl<R: TributeRemote> SyncController<R> {
    /// Replace the cache with the backend's list, falling back to the cached
    /// records when the backend is unreachable.
    pub async fn bootstrap(&self) -> Bootstrap {
        match self.remote.list_all().await {
            Ok(records) => {
                if let Err(e) = self.cache.save(&records) {
                    warn!(error = %e, "Failed to cache tributes");
                }
                info!(count = records.len(), "Synced tributes from backend");
                Bootstrap {
                    records,
                    source: SyncSource::Remote,
                }
            }
            Err(e) => {
                warn!(error = %e, "Error loading tributes from backend, using local cache");
                Bootstrap {
                    records: self.cache.load(),
                    source: SyncSource::Cache,
                }
            }
        }
    }

    pub async fn load_all_tributes(&self) -> Vec<TributeRecord> {
        self.bootstrap().await.records
    }

    /// Validate and submit a tribute, appending it to the cache on success.
    ///
    /// Returns the backend-assigned identifier. Nothing is sent and nothing
    /// is cached when validation fails.
    pub async fn submit_tribute(
        &self,
        ctx: &ClientContext,
        name: &str,
        relation: &str,
        message: &str,
    ) -> Result<String, SyncError> {
        let now = Utc::now().timestamp_millis();
        let draft = TributeDraft::new(name, relation, message, ctx.token().clone(), now)?;

        let id = self.remote.create(&draft).await.map_err(|e| {
            warn!(error = %e, "Tribute submission failed");
            SyncError::from(e)
        })?;

        let mut records = self.cache.load();
        records.push(TributeRecord::from_draft(id.clone(), &draft));
        if let Err(e) = self.cache.save(&records) {
            // The backend holds the record; the next bootstrap restores it
            warn!(id = %id, error = %e, "Failed to cache submitted tribute");
        }

        Ok(id)
    }

    /// Delete one of this client's tributes.
    ///
    /// The record is removed from the cache whatever the backend answers;
    /// the returned flag is the backend's confirmation.
    pub async fn delete_tribute(&self, ctx: &ClientContext, id: &str) -> Result<bool, SyncError> {
        self.check_owner(ctx, id)?;

        let confirmed = self.remote.delete(id, ctx.token()).await;
        if !confirmed {
            warn!(id = %id, "Backend did not confirm delete, removing locally anyway");
        }

        let remaining: Vec<TributeRecord> =
            self.cache.load().into_iter().filter(|r| r.id != id).collect();
        if let Err(e) = self.cache.save(&remaining) {
            warn!(id = %id, error = %e, "Failed to update cache after delete");
        }

        debug!(id = %id, confirmed, "Delete finished");
        Ok(confirmed)
    }
}

// ============================================================================
// Tests
// ============================================================================

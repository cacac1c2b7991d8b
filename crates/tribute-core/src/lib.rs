//! Core library for the tributes guestbook client.
//!
//! Tributes live on a hosted script backend and are mirrored into a local
//! cache so they can be shown offline. The `SyncController` keeps the two
//! in step:
//!
//! - on startup the backend's list replaces the cache, or the cache is used
//!   as-is when the backend is unreachable
//! - a submitted tribute is appended to the cache once the backend has
//!   assigned it an identifier
//! - a deleted tribute is dropped from the cache whatever the backend says
//!
//! Delete permission is gated on an `OwnerToken` generated once per
//! installation and carried in a `ClientContext`.

pub mod api;
pub mod cache;
pub mod config;
pub mod identity;
pub mod models;
pub mod sync;
pub mod utils;

pub use api::{ApiClient, ApiError, BackendReply, TributeRemote};
pub use cache::{CacheManager, CachedData};
pub use config::Config;
pub use identity::{ClientContext, OwnerToken};
pub use models::{TributeDraft, TributeRecord, ValidationError};
pub use sync::{Bootstrap, Offline, SyncController, SyncError, SyncSource};

//! Reconciliation between the local cache and the remote backend.
//!
//! The backend is authoritative on load; submits and deletes write to the
//! backend first and then patch the cache in place without re-fetching.

pub mod controller;
pub mod error;

pub use controller::{Bootstrap, Offline, SyncController, SyncSource};
pub use error::SyncError;

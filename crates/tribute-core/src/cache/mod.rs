//! Local caching module for offline access to tributes.
//!
//! This module provides the `CacheManager` for storing the tribute list and
//! the client's owner token on disk. Each entry is a JSON file in the data
//! directory, keyed by name. The tribute list is replaced wholesale on every
//! successful sync and is considered stale after 60 minutes.

pub mod manager;

pub use manager::{CacheManager, CachedData};

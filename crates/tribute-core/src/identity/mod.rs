//! Client identity for advisory delete permission.
//!
//! This module provides:
//! - `OwnerToken`: a random per-installation identifier stamped on submissions
//! - `ClientContext`: the value handed to every sync operation
//!
//! The token is generated on first use and persisted alongside the cache.

pub mod owner;

pub use owner::{ClientContext, OwnerToken};

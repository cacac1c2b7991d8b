//! Remote client module for the hosted tribute backend.
//!
//! This module provides the `TributeRemote` trait and its HTTP
//! implementation, `ApiClient`. The backend is a single script endpoint:
//! `GET` lists every tribute, form-encoded `POST`s create or delete one.
//! Its replies are loosely shaped, so they are classified into a
//! `BackendReply` before each operation decides how to treat them.

pub mod client;
pub mod error;
pub mod reply;

use async_trait::async_trait;

use crate::identity::OwnerToken;
use crate::models::{TributeDraft, TributeRecord};

pub use client::ApiClient;
pub use error::ApiError;
pub use reply::BackendReply;

/// Operations the sync controller needs from the backend.
#[async_trait]
pub trait TributeRemote: Send + Sync {
    /// Every tribute the backend currently holds.
    async fn list_all(&self) -> Result<Vec<TributeRecord>, ApiError>;

    /// Store a draft, returning the identifier the backend assigned.
    async fn create(&self, draft: &TributeDraft) -> Result<String, ApiError>;

    /// Ask the backend to delete `id`. `true` only on confirmed deletion;
    /// every failure is reported as `false`.
    async fn delete(&self, id: &str, owner: &OwnerToken) -> bool;
}

//! Data models for guestbook entries.
//!
//! - `TributeRecord`: an entry as returned by the backend and held in the cache
//! - `TributeDraft`: a validated submission awaiting a backend identifier

pub mod tribute;

pub use tribute::{
    latest, newest_first, TributeDraft, TributeRecord, ValidationError, DEFAULT_NAME,
    DEFAULT_RELATION, MIN_MESSAGE_LENGTH, PREVIEW_COUNT,
};

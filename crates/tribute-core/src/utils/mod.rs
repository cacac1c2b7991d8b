//! Utility functions for display formatting.

pub mod format;

pub use format::{format_timestamp, format_timestamp_in, truncate_string};

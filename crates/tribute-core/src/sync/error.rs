use thiserror::Error;

use crate::api::ApiError;
use crate::models::ValidationError;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Network error, the tribute backend could not be reached: {0}")]
    RemoteUnavailable(String),

    #[error("Failed to submit tribute: {0}")]
    RemoteRejected(String),

    #[error("Tribute {0} was not submitted from this device")]
    NotOwner(String),
}

impl From<ApiError> for SyncError {
    fn from(e: ApiError) -> Self {
        match e {
            ApiError::Unavailable(msg) => SyncError::RemoteUnavailable(msg),
            ApiError::Rejected(msg) | ApiError::InvalidResponse(msg) => {
                SyncError::RemoteRejected(msg)
            }
        }
    }
}

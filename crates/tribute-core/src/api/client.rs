//! HTTP client for the hosted tribute backend.
//!
//! This module provides the `ApiClient` struct, the `TributeRemote`
//! implementation used outside tests.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::{debug, error, info, warn};

use crate::identity::OwnerToken;
use crate::models::{TributeDraft, TributeRecord};

use super::{ApiError, BackendReply, TributeRemote};

// ============================================================================
// Constants
// ============================================================================

/// Default HTTP request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Maximum number of retries for rate-limited (429) listing requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 1000;

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    data: Option<Vec<TributeRecord>>,
}

/// Client for the tribute backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    endpoint: Url,
    initial_backoff: Duration,
}

impl ApiClient {
    /// Create a client for `endpoint` with the given request timeout
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .with_context(|| format!("Invalid backend endpoint: {}", endpoint))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            anyhow::bail!("Backend endpoint must be http or https: {}", endpoint);
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            endpoint,
            initial_backoff: Duration::from_millis(INITIAL_BACKOFF_MS),
        })
    }

    /// Set the first rate-limit backoff delay; later retries double it
    pub fn with_initial_backoff(mut self, backoff: Duration) -> Self {
        self.initial_backoff = backoff;
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Check if response is successful.
    /// Returns Ok(Some(response)) for success, Ok(None) for rate limit (should retry),
    /// or Err for other errors.
    async fn check_response_for_retry(
        response: reqwest::Response,
    ) -> Result<Option<reqwest::Response>, ApiError> {
        if response.status().is_success() {
            Ok(Some(response))
        } else if response.status().as_u16() == 429 {
            Ok(None)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn get_text(&self) -> Result<String, ApiError> {
        let mut retries = 0;
        let mut backoff = self.initial_backoff;

        loop {
            let response = self.client.get(self.endpoint.clone()).send().await?;

            match Self::check_response_for_retry(response).await? {
                Some(response) => return Ok(response.text().await?),
                None => {
                    retries += 1;
                    if retries > MAX_RATE_LIMIT_RETRIES {
                        return Err(ApiError::Unavailable("rate limited".to_string()));
                    }
                    warn!(retry = retries, backoff_ms = backoff.as_millis() as u64, "Rate limited, backing off");
                    tokio::time::sleep(backoff).await;
                    backoff *= 2; // Exponential backoff
                }
            }
        }
    }

    /// POST form fields and classify the reply body. Not retried: a create
    /// that timed out may still have been stored.
    async fn post_form<F: serde::Serialize + ?Sized>(
        &self,
        fields: &F,
    ) -> Result<BackendReply, ApiError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .form(fields)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ApiError::from_status(status, &body));
        }

        let reply = BackendReply::classify(&body);
        debug!(?reply, "Backend reply");
        Ok(reply)
    }
}

#[async_trait]
impl TributeRemote for ApiClient {
    async fn list_all(&self) -> Result<Vec<TributeRecord>, ApiError> {
        let body = self.get_text().await?;
        let parsed: ListResponse = serde_json::from_str(&body).map_err(|e| {
            ApiError::Unavailable(format!(
                "Failed to parse tribute list: {} ({})",
                e,
                ApiError::truncate_body(&body)
            ))
        })?;

        let records = parsed.data.unwrap_or_default();
        debug!(count = records.len(), "Fetched tributes");
        Ok(records)
    }

    async fn create(&self, draft: &TributeDraft) -> Result<String, ApiError> {
        match self.post_form(&draft.form_fields()).await? {
            BackendReply::Created { id } => {
                info!(id = %id, "Tribute stored");
                Ok(id)
            }
            BackendReply::Rejected { reason } => Err(ApiError::Rejected(
                reason.unwrap_or_else(|| "Unknown error".to_string()),
            )),
            BackendReply::Deleted | BackendReply::Unrecognized => Err(
                ApiError::InvalidResponse("reply carried no tribute identifier".to_string()),
            ),
            BackendReply::NotJson => {
                Err(ApiError::InvalidResponse("reply was not JSON".to_string()))
            }
        }
    }

    async fn delete(&self, id: &str, owner: &OwnerToken) -> bool {
        let fields = [("deleteId", id), ("uuid", owner.as_str())];
        match self.post_form(&fields).await {
            // The hosted backend may answer a completed write with an HTML page
            Ok(BackendReply::Deleted) | Ok(BackendReply::NotJson) => {
                info!(id = %id, "Deleted tribute");
                true
            }
            Ok(reply) => {
                warn!(id = %id, ?reply, "Delete failed or not found");
                false
            }
            Err(e) => {
                error!(id = %id, error = %e, "Error deleting tribute");
                false
            }
        }
    }
}

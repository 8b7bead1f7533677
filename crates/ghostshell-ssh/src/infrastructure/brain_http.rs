//! HTTP transport to the brain service.
//!
//! Implements [`BrainBackend`] with a single shared `reqwest::Client`.  The
//! client is cheap to clone and keeps its own connection pool, but every
//! command is still an independent POST.
//!
//! # Error classification
//!
//! The classification here is what lets the application layer keep "brain
//! is down" and "brain said something odd" apart:
//!
//! - connect/reset failures before a status → [`BrainError::Unreachable`]
//! - the configured timeout elapsed         → [`BrainError::Timeout`]
//! - non-2xx status                         → [`BrainError::Status`]
//! - 2xx with a truncated or undecodable body → [`BrainError::MalformedResponse`]

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::debug;

use crate::application::brain_service::{BrainBackend, BrainError};
use crate::domain::{CommandRequest, CommandResponse};

/// POSTs commands to `<endpoint>` as JSON.
#[derive(Debug, Clone)]
pub struct BrainHttpClient {
    client: Client,
    endpoint: Url,
}

impl BrainHttpClient {
    /// Builds a client for `endpoint`, bounding each request by `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`BrainError::InvalidEndpoint`] if `endpoint` is not an
    /// absolute `http`/`https` URL or the HTTP client cannot be built.
    pub fn new(endpoint: &str, timeout: Option<Duration>) -> Result<Self, BrainError> {
        let invalid = |reason: String| BrainError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason,
        };

        let url = Url::parse(endpoint).map_err(|e| invalid(e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| invalid(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: url,
        })
    }

    /// The URL every command is posted to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl BrainBackend for BrainHttpClient {
    async fn hallucinate(&self, request: &CommandRequest) -> Result<CommandResponse, BrainError> {
        // `.json()` serialises the body and sets `Content-Type: application/json`.
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(request)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            return Err(BrainError::Status(status.as_u16()));
        }

        // Past a 2xx status the brain is up; a cut-short body is malformed.
        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                BrainError::Timeout
            } else {
                BrainError::MalformedResponse(e.to_string())
            }
        })?;
        debug!(status = status.as_u16(), bytes = body.len(), "brain response received");

        serde_json::from_slice::<CommandResponse>(&body)
            .map_err(|e| BrainError::MalformedResponse(e.to_string()))
    }
}

fn classify(err: reqwest::Error) -> BrainError {
    if err.is_timeout() {
        BrainError::Timeout
    } else {
        BrainError::Unreachable(err.to_string())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

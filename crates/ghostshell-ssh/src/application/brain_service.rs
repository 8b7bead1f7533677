//! Brain client: turns a command line into terminal output.
//!
//! The HTTP exchange itself lives behind the [`BrainBackend`] trait (the
//! production implementation is `infrastructure::brain_http`).  This module
//! owns the *policy* of what the attacker sees for every possible outcome:
//!
//! | Backend outcome                    | Text returned to the shell           |
//! |------------------------------------|--------------------------------------|
//! | `Ok({"output": X})`                | `X`                                  |
//! | `Err(MalformedResponse)`           | empty string                         |
//! | `Err(Unreachable / Timeout / Status)` | `System Error: AI Brain unreachable.` |
//!
//! A malformed payload means the brain answered but said something we could
//! not decode; it is logged and rendered as "no output".  Everything else
//! means we never got an answer at all.
//!
//! Every command gets exactly one attempt.  There is no retry, backoff or
//! circuit breaker.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::domain::terminal::BRAIN_UNREACHABLE;
use crate::domain::{CommandRequest, CommandResponse};

// ── Error type ────────────────────────────────────────────────────────────────

/// Ways a brain round trip can fail.
#[derive(Debug, Error)]
pub enum BrainError {
    /// The endpoint URL could not be parsed or the HTTP client could not be
    /// built.  Only raised at construction time.
    #[error("invalid brain endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    /// Connection refused, DNS failure, reset, or the body could not be read.
    #[error("brain unreachable: {0}")]
    Unreachable(String),

    /// The configured timeout elapsed before the brain answered.
    #[error("brain request timed out")]
    Timeout,

    /// The brain answered with a non-2xx status.
    #[error("brain returned HTTP {0}")]
    Status(u16),

    /// The brain answered 2xx but the body was not a valid response object.
    #[error("malformed brain response: {0}")]
    MalformedResponse(String),
}

// ── Backend seam ──────────────────────────────────────────────────────────────

/// One request/response exchange with the brain.
///
/// Infrastructure implements this over HTTP; tests substitute a mock.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BrainBackend: Send + Sync {
    async fn hallucinate(&self, request: &CommandRequest) -> Result<CommandResponse, BrainError>;
}

// ── Client ────────────────────────────────────────────────────────────────────

/// Maps brain outcomes to terminal text.  Cheap to share across channels.
#[derive(Clone)]
pub struct BrainClient {
    backend: Arc<dyn BrainBackend>,
}

impl BrainClient {
    pub fn new(backend: Arc<dyn BrainBackend>) -> Self {
        Self { backend }
    }

    /// Sends `command` to the brain and returns the text to show the
    /// attacker.  Never fails: every error is folded into the returned text.
    pub async fn dispatch(&self, command: &str) -> String {
        let request = CommandRequest::new(command);

        match self.backend.hallucinate(&request).await {
            Ok(response) => {
                debug!(bytes = response.output.len(), "brain answered");
                response.output
            }
            Err(BrainError::MalformedResponse(reason)) => {
                warn!("brain response could not be decoded, rendering no output: {reason}");
                String::new()
            }
            Err(e) => {
                error!("error contacting brain: {e}");
                BRAIN_UNREACHABLE.to_string()
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

//! JSON message types exchanged with the brain service.
//!
//! The brain speaks a deliberately tiny protocol: one POST per command line,
//! one JSON object back.
//!
//! ```text
//! honeypot → brain:  {"command": "uname -a"}
//! brain → honeypot:  {"output": "Linux server 5.15.0-91-generic ..."}
//! ```
//!
//! No session identity travels with the request.  The brain is stateless per
//! call, so two channels typing the same command get independent answers.

use serde::{Deserialize, Deserializer, Serialize};

/// Body of a `POST /hallucinate` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandRequest {
    /// The command line exactly as the attacker typed it, with surrounding
    /// whitespace removed.
    pub command: String,
}

impl CommandRequest {
    /// Creates a request for `command`.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

/// Body of a successful brain response.
///
/// A missing or `null` `output` decodes as the empty string, and unknown
/// fields are ignored, so a brain that adds metadata keeps working.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResponse {
    /// Fabricated terminal output, rendered verbatim.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub output: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

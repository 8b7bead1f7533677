//! Captured login attempts.

use std::net::SocketAddr;

use uuid::Uuid;

/// One password authentication attempt, exactly as the client sent it.
///
/// Nothing here is validated.  The secret is kept verbatim because it is the
/// artifact the honeypot exists to collect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialAttempt {
    /// Correlates the attempt with the rest of the connection's log records.
    pub conn_id: Uuid,
    /// Remote address, when the transport knows it.
    pub peer: Option<SocketAddr>,
    /// Claimed user name.
    pub user: String,
    /// Claimed password.
    pub password: String,
}

//! Authentication policy: who gets in (everyone) and what gets recorded.
//!
//! The SSH transport asks the policy for a decision on every password
//! attempt.  The shipped [`AcceptAllPolicy`] grants every attempt, but only
//! after handing it to a [`CaptureSink`].  The capture is the point; the
//! grant just keeps the attacker talking.
//!
//! # Why a trait?
//!
//! The supervisor only depends on [`AuthPolicy`], so a deployment that wants
//! to, say, reject the first attempt to look more realistic can swap the
//! policy without touching the SSH plumbing.

use std::sync::Arc;

use tracing::info;

use crate::domain::CredentialAttempt;

/// `tracing` target for everything the honeypot captures (credentials and
/// commands), so it can be filtered or routed separately from operational
/// logs, e.g. `RUST_LOG=ghostshell::capture=info`.
pub const CAPTURE_TARGET: &str = "ghostshell::capture";

/// Result of an authentication decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthDecision {
    /// Let the client in.  No extra permissions are attached.
    Grant,
    /// Refuse this attempt; the client may try again.
    Deny,
}

/// Receives one record per captured login attempt.
pub trait CaptureSink: Send + Sync {
    fn record(&self, attempt: &CredentialAttempt);
}

/// Writes captures as structured `tracing` events on [`CAPTURE_TARGET`].
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingCaptureSink;

impl CaptureSink for TracingCaptureSink {
    fn record(&self, attempt: &CredentialAttempt) {
        info!(
            target: CAPTURE_TARGET,
            conn_id = %attempt.conn_id,
            peer = ?attempt.peer,
            user = %attempt.user,
            password = %attempt.password,
            "login attempt"
        );
    }
}

/// Decides whether a password attempt is let through.
///
/// Implementations must not fail: the transport cannot finish the handshake
/// without a decision.
pub trait AuthPolicy: Send + Sync {
    fn decide(&self, attempt: &CredentialAttempt) -> AuthDecision;
}

/// Grants every attempt after recording it.
#[derive(Clone)]
pub struct AcceptAllPolicy {
    sink: Arc<dyn CaptureSink>,
}

impl AcceptAllPolicy {
    pub fn new(sink: Arc<dyn CaptureSink>) -> Self {
        Self { sink }
    }
}

impl Default for AcceptAllPolicy {
    fn default() -> Self {
        Self::new(Arc::new(TracingCaptureSink))
    }
}

impl AuthPolicy for AcceptAllPolicy {
    fn decide(&self, attempt: &CredentialAttempt) -> AuthDecision {
        // Record first: the capture must exist whatever happens next.
        self.sink.record(attempt);
        AuthDecision::Grant
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use uuid::Uuid;

    #[derive(Default)]
    struct RecordingSink {
        records: Mutex<Vec<CredentialAttempt>>,
    }

    impl CaptureSink for RecordingSink {
        fn record(&self, attempt: &CredentialAttempt) {
            self.records.lock().unwrap().push(attempt.clone());
        }
    }

    fn attempt(user: &str, password: &str) -> CredentialAttempt {
        CredentialAttempt {
            conn_id: Uuid::new_v4(),
            peer: Some("198.51.100.23:51022".parse().unwrap()),
            user: user.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_accept_all_grants_any_credentials() {
        // Arrange
        let policy = AcceptAllPolicy::new(Arc::new(RecordingSink::default()));

        // Act / Assert
        for (user, password) in [
            ("root", "root"),
            ("admin", ""),
            ("", ""),
            ("ubuntu", "correct horse battery staple"),
            ("pi", "raspberry\u{0}\n"),
        ] {
            assert_eq!(policy.decide(&attempt(user, password)), AuthDecision::Grant);
        }
    }

    #[test]
    fn test_accept_all_records_exactly_one_capture_per_attempt() {
        // Arrange
        let sink = Arc::new(RecordingSink::default());
        let policy = AcceptAllPolicy::new(sink.clone());
        let first = attempt("root", "123456");
        let second = attempt("root", "toor");

        // Act
        policy.decide(&first);
        policy.decide(&second);

        // Assert
        let records = sink.records.lock().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], first);
        assert_eq!(records[1], second);
    }

    #[test]
    fn test_capture_keeps_secret_verbatim() {
        let sink = Arc::new(RecordingSink::default());
        let policy = AcceptAllPolicy::new(sink.clone());

        policy.decide(&attempt("oracle", "  spaces and\ttabs  "));

        let records = sink.records.lock().unwrap();
        assert_eq!(records[0].password, "  spaces and\ttabs  ");
    }

    #[test]
    fn test_default_policy_uses_tracing_sink_and_grants() {
        // The tracing sink has no observable state; this just exercises it.
        let policy = AcceptAllPolicy::default();
        assert_eq!(policy.decide(&attempt("git", "git")), AuthDecision::Grant);
    }
}

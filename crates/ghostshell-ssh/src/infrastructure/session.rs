//! Per-connection SSH session supervisor.
//!
//! One [`SessionSupervisor`] is created for every accepted TCP connection and
//! handed to `russh` as its [`Handler`].  It is where the protocol surface
//! meets the honeypot's policy:
//!
//! | SSH event                         | Behaviour                                   |
//! |-----------------------------------|---------------------------------------------|
//! | `none` auth                       | rejected, `password` advertised             |
//! | `password` auth                   | captured, then [`AuthPolicy`] decides       |
//! | `publickey` auth                  | rejected, `password` advertised             |
//! | open `session` channel            | accepted, fake shell spawned on it          |
//! | open any other channel type       | rejected                                    |
//! | `pty-req`, `shell`                | success                                     |
//! | `exec`, `subsystem`, `x11-req`    | failure                                     |
//! | `env`, `window-change`, `signal`  | no reply                                    |
//! | `tcpip-forward` & friends         | discarded                                   |
//!
//! Each shell runs in its own task, so one connection can host several
//! independent session channels.  When the shell loop ends, for whatever
//! reason, the channel is released: exit status 0, EOF, then close.

use std::net::SocketAddr;
use std::sync::Arc;

use russh::server::{Auth, Handle, Handler, Msg, Session};
use russh::{Channel, ChannelId, MethodKind, MethodSet, Sig};
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::application::auth_policy::{AuthDecision, AuthPolicy};
use crate::application::shell_emulator::ShellEmulator;
use crate::domain::channel::{decide_channel_open, negotiate, SESSION_CHANNEL_TYPE};
use crate::domain::{ChannelDecision, ControlReply, ControlRequest, CredentialAttempt};

/// The only authentication method ever offered.
pub(crate) fn password_only() -> MethodSet {
    MethodSet::from([MethodKind::Password].as_slice())
}

fn reject_to_password() -> Auth {
    Auth::Reject {
        proceed_with_methods: Some(password_only()),
        partial_success: false,
    }
}

/// `russh` handler for one attacker connection.
pub struct SessionSupervisor {
    conn_id: Uuid,
    peer: Option<SocketAddr>,
    auth_policy: Arc<dyn AuthPolicy>,
    emulator: ShellEmulator,
}

impl SessionSupervisor {
    pub fn new(
        peer: Option<SocketAddr>,
        auth_policy: Arc<dyn AuthPolicy>,
        emulator: ShellEmulator,
    ) -> Self {
        Self {
            conn_id: Uuid::new_v4(),
            peer,
            auth_policy,
            emulator,
        }
    }

    /// Identifier that ties together every log line of this connection.
    pub fn conn_id(&self) -> Uuid {
        self.conn_id
    }

    fn attempt(&self, user: &str, password: &str) -> CredentialAttempt {
        CredentialAttempt {
            conn_id: self.conn_id,
            peer: self.peer,
            user: user.to_string(),
            password: password.to_string(),
        }
    }

    /// Answers a channel request according to [`negotiate`].
    fn reply(&self, channel: ChannelId, request: ControlRequest, session: &mut Session) {
        let reply = negotiate(&request);
        debug!(
            conn_id = %self.conn_id,
            channel = ?channel,
            request = request.request_type(),
            reply = ?reply,
            "channel request"
        );
        let sent = match reply {
            ControlReply::Success => session.channel_success(channel),
            ControlReply::Failure => session.channel_failure(channel),
            ControlReply::NoReply => Ok(()),
        };
        if let Err(e) = sent {
            debug!(
                conn_id = %self.conn_id,
                channel = ?channel,
                "channel reply not delivered: {e}"
            );
        }
    }

    fn admit_channel(&self, channel_type: &str) -> bool {
        match decide_channel_open(channel_type) {
            ChannelDecision::Accept => true,
            ChannelDecision::Reject(rejection) => {
                info!(
                    conn_id = %self.conn_id,
                    channel_type,
                    reason = rejection.reason(),
                    "rejected channel"
                );
                false
            }
        }
    }
}

impl Handler for SessionSupervisor {
    type Error = anyhow::Error;

    async fn auth_none(&mut self, user: &str) -> Result<Auth, Self::Error> {
        debug!(conn_id = %self.conn_id, user, "none auth refused");
        Ok(reject_to_password())
    }

    async fn auth_password(&mut self, user: &str, password: &str) -> Result<Auth, Self::Error> {
        let attempt = self.attempt(user, password);
        match self.auth_policy.decide(&attempt) {
            AuthDecision::Grant => Ok(Auth::Accept),
            AuthDecision::Deny => Ok(reject_to_password()),
        }
    }

    async fn auth_publickey(
        &mut self,
        user: &str,
        public_key: &russh::keys::PublicKey,
    ) -> Result<Auth, Self::Error> {
        debug!(
            conn_id = %self.conn_id,
            user,
            algorithm = %public_key.algorithm(),
            "publickey auth refused"
        );
        Ok(reject_to_password())
    }

    async fn channel_open_session(
        &mut self,
        channel: Channel<Msg>,
        session: &mut Session,
    ) -> Result<bool, Self::Error> {
        if !self.admit_channel(SESSION_CHANNEL_TYPE) {
            return Ok(false);
        }

        let id = channel.id();
        let handle = session.handle();
        let emulator = self.emulator.clone();
        let span = info_span!("shell", conn_id = %self.conn_id, channel = ?id);

        tokio::spawn(
            async move {
                run_shell(channel, emulator).await;
                release_channel(&handle, id).await;
            }
            .instrument(span),
        );

        Ok(true)
    }

    async fn channel_open_direct_tcpip(
        &mut self,
        _channel: Channel<Msg>,
        host_to_connect: &str,
        port_to_connect: u32,
        _originator_address: &str,
        _originator_port: u32,
        _session: &mut Session,
    ) -> Result<bool, Self::Error> {
        debug!(
            conn_id = %self.conn_id,
            target = %format!("{host_to_connect}:{port_to_connect}"),
            "direct-tcpip requested"
        );
        Ok(self.admit_channel("direct-tcpip"))
    }

    async fn channel_open_forwarded_tcpip(
        &mut self,
        _channel: Channel<Msg>,
        _host_to_connect: &str,
        _port_to_connect: u32,
        _originator_address: &str,
        _originator_port: u32,
        _session: &mut Session,
    ) -> Result<bool, Self::Error> {
        Ok(self.admit_channel("forwarded-tcpip"))
    }

    async fn channel_open_x11(
        &mut self,
        _channel: Channel<Msg>,
        _originator_address: &str,
        _originator_port: u32,
        _session: &mut Session,
    ) -> Result<bool, Self::Error> {
        Ok(self.admit_channel("x11"))
    }

    #[allow(clippy::too_many_arguments)]
    async fn pty_request(
        &mut self,
        channel: ChannelId,
        term: &str,
        col_width: u32,
        row_height: u32,
        _pix_width: u32,
        _pix_height: u32,
        _modes: &[(russh::Pty, u32)],
        session: &mut Session,
    ) -> Result<(), Self::Error> {
        debug!(conn_id = %self.conn_id, term, col_width, row_height, "pty requested");
        self.reply(channel, ControlRequest::PtyReq, session);
        Ok(())
    }

    async fn shell_request(
        &mut self,
        channel: ChannelId,
        session: &mut Session,
    ) -> Result<(), Self::Error> {
        self.reply(channel, ControlRequest::Shell, session);
        Ok(())
    }

    async fn exec_request(
        &mut self,
        channel: ChannelId,
        data: &[u8],
        session: &mut Session,
    ) -> Result<(), Self::Error> {
        info!(
            conn_id = %self.conn_id,
            command = %String::from_utf8_lossy(data),
            "exec requested"
        );
        self.reply(channel, ControlRequest::Exec, session);
        Ok(())
    }

    async fn subsystem_request(
        &mut self,
        channel: ChannelId,
        name: &str,
        session: &mut Session,
    ) -> Result<(), Self::Error> {
        debug!(conn_id = %self.conn_id, subsystem = name, "subsystem requested");
        self.reply(channel, ControlRequest::Subsystem, session);
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    async fn x11_request(
        &mut self,
        channel: ChannelId,
        _single_connection: bool,
        _x11_auth_protocol: &str,
        _x11_auth_cookie: &str,
        _x11_screen_number: u32,
        session: &mut Session,
    ) -> Result<(), Self::Error> {
        self.reply(channel, ControlRequest::X11Req, session);
        Ok(())
    }

    async fn env_request(
        &mut self,
        channel: ChannelId,
        variable_name: &str,
        _variable_value: &str,
        session: &mut Session,
    ) -> Result<(), Self::Error> {
        debug!(conn_id = %self.conn_id, variable_name, "env requested");
        self.reply(channel, ControlRequest::Env, session);
        Ok(())
    }

    async fn window_change_request(
        &mut self,
        channel: ChannelId,
        _col_width: u32,
        _row_height: u32,
        _pix_width: u32,
        _pix_height: u32,
        session: &mut Session,
    ) -> Result<(), Self::Error> {
        self.reply(channel, ControlRequest::WindowChange, session);
        Ok(())
    }

    async fn signal(
        &mut self,
        channel: ChannelId,
        signal: Sig,
        session: &mut Session,
    ) -> Result<(), Self::Error> {
        debug!(conn_id = %self.conn_id, ?signal, "signal received");
        self.reply(channel, ControlRequest::Signal, session);
        Ok(())
    }

    async fn tcpip_forward(
        &mut self,
        address: &str,
        port: &mut u32,
        _session: &mut Session,
    ) -> Result<bool, Self::Error> {
        debug!(conn_id = %self.conn_id, address, port = *port, "discarding global request");
        Ok(false)
    }

    async fn cancel_tcpip_forward(
        &mut self,
        address: &str,
        port: u32,
        _session: &mut Session,
    ) -> Result<bool, Self::Error> {
        debug!(conn_id = %self.conn_id, address, port, "discarding global request");
        Ok(false)
    }
}

// ── Shell task ────────────────────────────────────────────────────────────────

async fn run_shell(channel: Channel<Msg>, emulator: ShellEmulator) {
    let mut stream = Box::pin(channel.into_stream());
    match emulator.run(&mut stream).await {
        Ok(exit) => info!(?exit, "shell ended"),
        Err(e) => warn!("shell ended with I/O error: {e}"),
    }
}

/// Sends exit-status 0, EOF and close.  Each step is best effort: the
/// client may already be gone.
async fn release_channel(handle: &Handle, id: ChannelId) {
    if handle.exit_status_request(id, 0).await.is_err() {
        debug!("exit-status not delivered");
    }
    if handle.eof(id).await.is_err() {
        debug!("eof not delivered");
    }
    if handle.close(id).await.is_err() {
        debug!("close not delivered");
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::application::auth_policy::{AcceptAllPolicy, CaptureSink};
    use crate::application::brain_service::{BrainClient, MockBrainBackend};

    #[derive(Default)]
    struct RecordingSink {
        attempts: Mutex<Vec<CredentialAttempt>>,
    }

    impl CaptureSink for RecordingSink {
        fn record(&self, attempt: &CredentialAttempt) {
            self.attempts.lock().unwrap().push(attempt.clone());
        }
    }

    struct DenyAll;

    impl AuthPolicy for DenyAll {
        fn decide(&self, _attempt: &CredentialAttempt) -> AuthDecision {
            AuthDecision::Deny
        }
    }

    fn emulator() -> ShellEmulator {
        ShellEmulator::new(BrainClient::new(Arc::new(MockBrainBackend::new())))
    }

    fn peer() -> Option<SocketAddr> {
        Some("203.0.113.7:51515".parse().unwrap())
    }

    #[tokio::test]
    async fn test_any_password_is_accepted_and_captured() {
        // Arrange
        let sink = Arc::new(RecordingSink::default());
        let policy = Arc::new(AcceptAllPolicy::new(sink.clone()));
        let mut supervisor = SessionSupervisor::new(peer(), policy, emulator());

        // Act
        let auth = supervisor.auth_password("root", "hunter2").await.unwrap();

        // Assert
        assert!(matches!(auth, Auth::Accept));
        let attempts = sink.attempts.lock().unwrap();
        assert_eq!(attempts.len(), 1);
        assert_eq!(attempts[0].user, "root");
        assert_eq!(attempts[0].password, "hunter2");
        assert_eq!(attempts[0].peer, peer());
        assert_eq!(attempts[0].conn_id, supervisor.conn_id());
    }

    #[tokio::test]
    async fn test_empty_credentials_are_still_accepted() {
        let sink = Arc::new(RecordingSink::default());
        let policy = Arc::new(AcceptAllPolicy::new(sink.clone()));
        let mut supervisor = SessionSupervisor::new(None, policy, emulator());

        let auth = supervisor.auth_password("", "").await.unwrap();

        assert!(matches!(auth, Auth::Accept));
        assert_eq!(sink.attempts.lock().unwrap()[0].password, "");
    }

    #[tokio::test]
    async fn test_denying_policy_rejects_and_advertises_password() {
        let mut supervisor = SessionSupervisor::new(peer(), Arc::new(DenyAll), emulator());

        let auth = supervisor.auth_password("admin", "admin").await.unwrap();

        match auth {
            Auth::Reject {
                proceed_with_methods,
                ..
            } => assert!(proceed_with_methods.is_some()),
            _ => panic!("expected Reject"),
        }
    }

    #[tokio::test]
    async fn test_none_auth_is_rejected_with_password_advertised() {
        let mut supervisor =
            SessionSupervisor::new(peer(), Arc::new(AcceptAllPolicy::default()), emulator());

        let auth = supervisor.auth_none("root").await.unwrap();

        match auth {
            Auth::Reject {
                proceed_with_methods,
                partial_success,
            } => {
                assert!(proceed_with_methods.is_some());
                assert!(!partial_success);
            }
            _ => panic!("expected Reject"),
        }
    }

    #[test]
    fn test_each_supervisor_gets_a_distinct_conn_id() {
        let policy: Arc<dyn AuthPolicy> = Arc::new(AcceptAllPolicy::default());
        let a = SessionSupervisor::new(None, Arc::clone(&policy), emulator());
        let b = SessionSupervisor::new(None, policy, emulator());
        assert_ne!(a.conn_id(), b.conn_id());
    }

    #[test]
    fn test_only_session_channels_pass_the_gate() {
        let supervisor =
            SessionSupervisor::new(None, Arc::new(AcceptAllPolicy::default()), emulator());

        assert!(supervisor.admit_channel(SESSION_CHANNEL_TYPE));
        assert!(!supervisor.admit_channel("direct-tcpip"));
        assert!(!supervisor.admit_channel("forwarded-tcpip"));
        assert!(!supervisor.admit_channel("x11"));
    }
}

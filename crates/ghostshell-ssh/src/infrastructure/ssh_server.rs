//! SSH listener: accept loop and per-connection task management.
//!
//! This module is responsible for:
//!
//! 1. Loading the host key and building the `russh` server configuration.
//! 2. Binding a TCP listener on the configured address.
//! 3. Accepting attacker connections and running the SSH handshake for each
//!    one in its own Tokio task, driven by a fresh [`SessionSupervisor`].
//! 4. Stopping the accept loop when the `running` flag is cleared.
//!
//! Startup failures (key, bind, brain endpoint) are returned to the caller
//! and end the process.  Everything after that is per connection: a failed
//! handshake or a dropped client is logged and the loop keeps accepting.

use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use anyhow::Context;
use russh::keys::PrivateKey;
use russh::server::{run_stream, Config};
use russh::SshId;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

use crate::application::auth_policy::{AcceptAllPolicy, AuthPolicy};
use crate::application::brain_service::BrainClient;
use crate::application::shell_emulator::ShellEmulator;
use crate::domain::HoneypotConfig;
use crate::infrastructure::brain_http::BrainHttpClient;
use crate::infrastructure::host_key::load_host_key;
use crate::infrastructure::session::{password_only, SessionSupervisor};

/// How often the accept loop wakes up to check the shutdown flag.
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Translates a [`HoneypotConfig`] into the `russh` server configuration.
pub fn build_ssh_config(config: &HoneypotConfig, host_key: PrivateKey) -> Config {
    Config {
        server_id: SshId::Standard(config.server_id.clone()),
        methods: password_only(),
        keys: vec![host_key],
        inactivity_timeout: config.inactivity_timeout,
        auth_rejection_time: Duration::from_secs(1),
        auth_rejection_time_initial: Some(Duration::ZERO),
        ..Default::default()
    }
}

/// Everything a connection task needs, shared across all of them.
#[derive(Clone)]
pub struct HoneypotServices {
    pub ssh_config: Arc<Config>,
    pub auth_policy: Arc<dyn AuthPolicy>,
    pub emulator: ShellEmulator,
}

impl HoneypotServices {
    /// Wires the production services: accept-all auth and the HTTP brain.
    ///
    /// # Errors
    ///
    /// Fails if the host key cannot be loaded or the brain endpoint is not a
    /// usable URL.
    pub fn from_config(config: &HoneypotConfig) -> anyhow::Result<Self> {
        let host_key = load_host_key(&config.host_key_path)
            .context("cannot start without a host key")?;

        let backend = BrainHttpClient::new(&config.brain_endpoint, config.brain_timeout)
            .context("cannot start without a valid brain endpoint")?;
        info!("brain endpoint {}", backend.endpoint());

        Ok(Self {
            ssh_config: Arc::new(build_ssh_config(config, host_key)),
            auth_policy: Arc::new(AcceptAllPolicy::default()),
            emulator: ShellEmulator::new(BrainClient::new(Arc::new(backend))),
        })
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Runs the honeypot until `running` is set to `false`.
///
/// # Errors
///
/// Returns an error if the services cannot be built (see
/// [`HoneypotServices::from_config`]) or the listener cannot be bound.
pub async fn run_server(config: HoneypotConfig, running: Arc<AtomicBool>) -> anyhow::Result<()> {
    let services = HoneypotServices::from_config(&config)?;

    let listener = TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind SSH listener on {}", config.listen_addr))?;

    info!("SSH honeypot listening on {}", config.listen_addr);

    serve(listener, services, running).await;
    Ok(())
}

/// Accepts connections on an already-bound listener until `running` is
/// cleared.
///
/// Split from [`run_server`] so tests can bind an ephemeral port and inject
/// their own services.
pub async fn serve(listener: TcpListener, services: HoneypotServices, running: Arc<AtomicBool>) {
    let services = Arc::new(services);

    loop {
        if !running.load(Ordering::Relaxed) {
            info!("shutdown flag set; stopping accept loop");
            break;
        }

        // Short timeout so the flag is rechecked even when nobody connects.
        match timeout(ACCEPT_POLL_INTERVAL, listener.accept()).await {
            Ok(Ok((stream, peer_addr))) => {
                info!("new connection from {peer_addr}");
                let services = Arc::clone(&services);
                tokio::spawn(async move {
                    handle_connection(stream, peer_addr, services).await;
                });
            }
            Ok(Err(e)) => {
                // Transient (e.g. EMFILE).  Keep accepting.
                error!("accept error: {e}");
            }
            Err(_) => {}
        }
    }
}

// ── Per-connection handler ────────────────────────────────────────────────────

/// Wraps [`run_connection`] and logs the outcome.
async fn handle_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    services: Arc<HoneypotServices>,
) {
    match run_connection(stream, peer_addr, services).await {
        Ok(()) => info!("connection {peer_addr} closed"),
        Err(e) => warn!("connection {peer_addr} closed with error: {e:#}"),
    }
}

/// Runs the SSH handshake and then the session until the client leaves.
async fn run_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    services: Arc<HoneypotServices>,
) -> anyhow::Result<()> {
    let supervisor = SessionSupervisor::new(
        Some(peer_addr),
        Arc::clone(&services.auth_policy),
        services.emulator.clone(),
    );
    debug!(conn_id = %supervisor.conn_id(), "supervisor created for {peer_addr}");

    let session = run_stream(Arc::clone(&services.ssh_config), stream, supervisor)
        .await
        .with_context(|| format!("handshake failed with {peer_addr}"))?;

    session
        .await
        .with_context(|| format!("session with {peer_addr} failed"))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

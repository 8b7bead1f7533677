//! Honeypot configuration types.
//!
//! [`HoneypotConfig`] is the single source of truth for all runtime settings.
//! It is assembled once at startup from defaults, an optional TOML file, and
//! CLI/environment overrides (see `main.rs`), then shared read-only.
//!
//! Keeping configuration as a plain struct (no global state, no environment
//! reads in here) is what lets tests point the brain client at a mock server
//! instead of the fixed production address.

use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

/// Where the brain listens unless told otherwise.
pub const DEFAULT_BRAIN_ENDPOINT: &str = "http://localhost:5000/hallucinate";

/// SSH identification string presented before key exchange.
///
/// Matches the stock OpenSSH build shipped with the Ubuntu release named in
/// the login banner, so version scanners see a consistent host.
pub const DEFAULT_SERVER_ID: &str = "SSH-2.0-OpenSSH_8.9p1 Ubuntu-3ubuntu0.4";

/// All runtime configuration for the honeypot.
///
/// # Example
///
/// ```rust
/// use ghostshell_ssh::domain::HoneypotConfig;
///
/// let cfg = HoneypotConfig::default();
/// assert_eq!(cfg.listen_addr.port(), 2222);
/// assert_eq!(cfg.brain_endpoint, "http://localhost:5000/hallucinate");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct HoneypotConfig {
    /// Address and port the SSH listener binds to.
    pub listen_addr: SocketAddr,

    /// Path of the OpenSSH/PEM private key used as the host identity.
    ///
    /// A missing or unparseable key is fatal at startup.
    pub host_key_path: PathBuf,

    /// Full URL of the brain's hallucinate endpoint.
    pub brain_endpoint: String,

    /// Upper bound on a single brain round trip.  `None` waits forever.
    ///
    /// A timed-out call is reported to the attacker exactly like an
    /// unreachable brain.
    pub brain_timeout: Option<Duration>,

    /// SSH identification string (`SSH-2.0-...`).
    pub server_id: String,

    /// Idle connections are dropped after this long.  `None` disables it.
    pub inactivity_timeout: Option<Duration>,
}

impl Default for HoneypotConfig {
    /// | Field              | Default                              |
    /// |--------------------|--------------------------------------|
    /// | listen_addr        | `0.0.0.0:2222`                       |
    /// | host_key_path      | `hostkey`                            |
    /// | brain_endpoint     | `http://localhost:5000/hallucinate`  |
    /// | brain_timeout      | 10 seconds                           |
    /// | server_id          | `SSH-2.0-OpenSSH_8.9p1 Ubuntu-3ubuntu0.4` |
    /// | inactivity_timeout | 300 seconds                          |
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, 2222)),
            host_key_path: PathBuf::from("hostkey"),
            brain_endpoint: DEFAULT_BRAIN_ENDPOINT.to_string(),
            brain_timeout: Some(Duration::from_secs(10)),
            server_id: DEFAULT_SERVER_ID.to_string(),
            inactivity_timeout: Some(Duration::from_secs(300)),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

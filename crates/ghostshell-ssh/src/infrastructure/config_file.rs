//! Optional TOML configuration file.
//!
//! A deployment can keep its settings in a file instead of on the command
//! line.  Every field is optional; anything left out keeps its built-in
//! default, and CLI flags / environment variables still win over the file.
//!
//! ```toml
//! [server]
//! listen = "0.0.0.0:22"
//! host_key = "/etc/ghostshell/hostkey"
//! server_id = "SSH-2.0-OpenSSH_8.9p1 Ubuntu-3ubuntu0.4"
//! inactivity_timeout_secs = 300
//!
//! [brain]
//! endpoint = "http://brain:5000/hallucinate"
//! timeout_secs = 10      # 0 waits forever
//!
//! [logging]
//! level = "info"         # used when RUST_LOG is unset
//! ```

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::config::{HoneypotConfig, DEFAULT_BRAIN_ENDPOINT, DEFAULT_SERVER_ID};

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// A field parsed as TOML but holds an unusable value.
    #[error("invalid value for {field}: '{value}'")]
    InvalidValue { field: &'static str, value: String },
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level shape of the configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub brain: BrainSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

/// SSH listener settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerSection {
    /// `ip:port` to bind.
    #[serde(default = "default_listen")]
    pub listen: String,
    /// Path of the host private key.
    #[serde(default = "default_host_key")]
    pub host_key: PathBuf,
    /// SSH identification string.
    #[serde(default = "default_server_id")]
    pub server_id: String,
    /// Idle connection timeout in seconds; `0` disables it.
    #[serde(default = "default_inactivity_timeout_secs")]
    pub inactivity_timeout_secs: u64,
}

/// Brain service settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BrainSection {
    #[serde(default = "default_brain_endpoint")]
    pub endpoint: String,
    /// Per-request timeout in seconds; `0` waits forever.
    #[serde(default = "default_brain_timeout_secs")]
    pub timeout_secs: u64,
}

/// Log output settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingSection {
    /// `tracing` level used when `RUST_LOG` is absent.
    #[serde(default = "default_log_level")]
    pub level: String,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_listen() -> String {
    HoneypotConfig::default().listen_addr.to_string()
}
fn default_host_key() -> PathBuf {
    HoneypotConfig::default().host_key_path
}
fn default_server_id() -> String {
    DEFAULT_SERVER_ID.to_string()
}
fn default_inactivity_timeout_secs() -> u64 {
    300
}
fn default_brain_endpoint() -> String {
    DEFAULT_BRAIN_ENDPOINT.to_string()
}
fn default_brain_timeout_secs() -> u64 {
    10
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            host_key: default_host_key(),
            server_id: default_server_id(),
            inactivity_timeout_secs: default_inactivity_timeout_secs(),
        }
    }
}

impl Default for BrainSection {
    fn default() -> Self {
        Self {
            endpoint: default_brain_endpoint(),
            timeout_secs: default_brain_timeout_secs(),
        }
    }
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ── Conversion ────────────────────────────────────────────────────────────────

/// `0` means "no limit".
pub fn secs_to_timeout(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

impl FileConfig {
    /// Resolves the file's values into a [`HoneypotConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if `server.listen` is not a
    /// socket address.
    pub fn to_honeypot_config(&self) -> Result<HoneypotConfig, ConfigError> {
        let listen_addr: SocketAddr =
            self.server
                .listen
                .parse()
                .map_err(|_| ConfigError::InvalidValue {
                    field: "server.listen",
                    value: self.server.listen.clone(),
                })?;

        Ok(HoneypotConfig {
            listen_addr,
            host_key_path: self.server.host_key.clone(),
            brain_endpoint: self.brain.endpoint.clone(),
            brain_timeout: secs_to_timeout(self.brain.timeout_secs),
            server_id: self.server.server_id.clone(),
            inactivity_timeout: secs_to_timeout(self.server.inactivity_timeout_secs),
        })
    }
}

// ── Loading ───────────────────────────────────────────────────────────────────

/// Reads and parses the configuration file at `path`.
///
/// Unlike the defaults-only path, an explicitly named file must exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file cannot be read and
/// [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(toml::from_str(&content)?)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

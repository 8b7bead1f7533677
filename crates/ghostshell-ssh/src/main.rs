//! GhostShell SSH honeypot: entry point.
//!
//! This binary listens for SSH connections, accepts any password, and hands
//! every command typed into the fake shell to an external "brain" service
//! that hallucinates plausible output.
//!
//! # Usage
//!
//! ```text
//! ghostshell-ssh [OPTIONS]
//!
//! Options:
//!   --config        <PATH>  TOML configuration file
//!   --listen        <ADDR>  Listen address [default: 0.0.0.0:2222]
//!   --host-key      <PATH>  Host private key [default: hostkey]
//!   --brain-url     <URL>   Brain endpoint [default: http://localhost:5000/hallucinate]
//!   --brain-timeout <SECS>  Brain request timeout, 0 disables [default: 10]
//!   --log-level     <LEVEL> Log level when RUST_LOG is unset [default: info]
//! ```
//!
//! # Precedence
//!
//! Built-in defaults, then the `--config` file, then CLI flags and
//! environment variables.  CLI args take precedence over environment
//! variables when both are present.
//!
//! | Variable                   | Flag              |
//! |----------------------------|-------------------|
//! | `GHOSTSHELL_CONFIG`        | `--config`        |
//! | `GHOSTSHELL_LISTEN`        | `--listen`        |
//! | `GHOSTSHELL_HOST_KEY`      | `--host-key`      |
//! | `GHOSTSHELL_BRAIN_URL`     | `--brain-url`     |
//! | `GHOSTSHELL_BRAIN_TIMEOUT` | `--brain-timeout` |
//! | `GHOSTSHELL_LOG_LEVEL`     | `--log-level`     |
//!
//! Captured credentials and commands are logged on the
//! `ghostshell::capture` target, e.g. `RUST_LOG=ghostshell::capture=info`
//! shows only the loot.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ghostshell_ssh::domain::HoneypotConfig;
use ghostshell_ssh::infrastructure::config_file::{load_config, secs_to_timeout, FileConfig};
use ghostshell_ssh::infrastructure::run_server;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Low-interaction SSH honeypot with an AI-generated shell.
///
/// Every flag is optional; unset flags fall back to the config file and
/// then to built-in defaults.
#[derive(Debug, Parser)]
#[command(
    name = "ghostshell-ssh",
    about = "SSH honeypot that forwards shell commands to an AI brain",
    version
)]
struct Cli {
    /// TOML configuration file.
    #[arg(long, env = "GHOSTSHELL_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on, e.g. `0.0.0.0:22`.
    #[arg(long, env = "GHOSTSHELL_LISTEN")]
    listen: Option<String>,

    /// Path of the host private key (OpenSSH or PEM, unencrypted).
    ///
    /// Generate one with `ssh-keygen -t ed25519 -N "" -f hostkey`.
    #[arg(long, env = "GHOSTSHELL_HOST_KEY")]
    host_key: Option<PathBuf>,

    /// Full URL of the brain's hallucinate endpoint.
    #[arg(long, env = "GHOSTSHELL_BRAIN_URL")]
    brain_url: Option<String>,

    /// Brain request timeout in seconds.  `0` waits forever.
    #[arg(long, env = "GHOSTSHELL_BRAIN_TIMEOUT")]
    brain_timeout: Option<u64>,

    /// Log level used when `RUST_LOG` is not set.
    #[arg(long, env = "GHOSTSHELL_LOG_LEVEL")]
    log_level: Option<String>,
}

/// Fully resolved startup settings.
#[derive(Debug)]
struct Settings {
    honeypot: HoneypotConfig,
    log_level: String,
}

impl Cli {
    /// Layers the CLI flags over the config file (if any) and the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed, or if
    /// `--listen` is not a valid socket address.
    fn into_settings(self) -> anyhow::Result<Settings> {
        let file = match &self.config {
            Some(path) => load_config(path)
                .with_context(|| format!("failed to load config file {}", path.display()))?,
            None => FileConfig::default(),
        };

        let mut honeypot = file
            .to_honeypot_config()
            .context("invalid configuration file")?;

        if let Some(listen) = &self.listen {
            honeypot.listen_addr = listen
                .parse::<SocketAddr>()
                .with_context(|| format!("invalid listen address: '{listen}'"))?;
        }
        if let Some(host_key) = self.host_key {
            honeypot.host_key_path = host_key;
        }
        if let Some(brain_url) = self.brain_url {
            honeypot.brain_endpoint = brain_url;
        }
        if let Some(secs) = self.brain_timeout {
            honeypot.brain_timeout = secs_to_timeout(secs);
        }

        Ok(Settings {
            honeypot,
            log_level: self.log_level.unwrap_or(file.logging.level),
        })
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

/// Program entry point.
///
/// # What happens at startup
///
/// 1. CLI arguments are parsed and layered over the config file.
/// 2. `tracing_subscriber` is initialised; `RUST_LOG` wins over the
///    configured level.
/// 3. A Ctrl+C handler is spawned that clears a shared `AtomicBool`.
/// 4. [`run_server`] loads the host key, binds the listener and accepts
///    connections until the flag is cleared.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Cli::parse().into_settings()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&settings.log_level)),
        )
        .init();

    let config = settings.honeypot;
    info!(
        "GhostShell starting: listen={}, brain={}",
        config.listen_addr, config.brain_endpoint
    );

    // ── Graceful shutdown flag ─────────────────────────────────────────────────
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = Arc::clone(&running);

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received Ctrl+C, shutting down");
                running_clone.store(false, Ordering::Relaxed);
            }
            Err(e) => {
                tracing::error!("failed to listen for Ctrl+C signal: {e}");
            }
        }
    });

    run_server(config, running).await?;

    info!("GhostShell stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use uuid::Uuid;

    fn bare_cli() -> Cli {
        Cli {
            config: None,
            listen: None,
            host_key: None,
            brain_url: None,
            brain_timeout: None,
            log_level: None,
        }
    }

    #[test]
    fn test_cli_without_flags_resolves_to_defaults() {
        // Arrange
        let cli = bare_cli();

        // Act
        let settings = cli.into_settings().unwrap();

        // Assert
        assert_eq!(settings.honeypot, HoneypotConfig::default());
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn test_cli_listen_override() {
        let cli = Cli::parse_from(["ghostshell-ssh", "--listen", "127.0.0.1:22"]);
        let settings = cli.into_settings().unwrap();
        assert_eq!(settings.honeypot.listen_addr.to_string(), "127.0.0.1:22");
    }

    #[test]
    fn test_cli_host_key_override() {
        let cli = Cli::parse_from(["ghostshell-ssh", "--host-key", "/etc/ghostshell/key"]);
        let settings = cli.into_settings().unwrap();
        assert_eq!(
            settings.honeypot.host_key_path,
            PathBuf::from("/etc/ghostshell/key")
        );
    }

    #[test]
    fn test_cli_brain_url_override() {
        let cli = Cli::parse_from(["ghostshell-ssh", "--brain-url", "http://brain:8000/hallucinate"]);
        let settings = cli.into_settings().unwrap();
        assert_eq!(settings.honeypot.brain_endpoint, "http://brain:8000/hallucinate");
    }

    #[test]
    fn test_cli_brain_timeout_override() {
        let cli = Cli::parse_from(["ghostshell-ssh", "--brain-timeout", "3"]);
        let settings = cli.into_settings().unwrap();
        assert_eq!(settings.honeypot.brain_timeout, Some(Duration::from_secs(3)));
    }

    #[test]
    fn test_cli_brain_timeout_zero_disables_it() {
        let cli = Cli::parse_from(["ghostshell-ssh", "--brain-timeout", "0"]);
        let settings = cli.into_settings().unwrap();
        assert_eq!(settings.honeypot.brain_timeout, None);
    }

    #[test]
    fn test_cli_log_level_override() {
        let cli = Cli::parse_from(["ghostshell-ssh", "--log-level", "debug"]);
        let settings = cli.into_settings().unwrap();
        assert_eq!(settings.log_level, "debug");
    }

    #[test]
    fn test_invalid_listen_returns_error() {
        // Arrange: hostname instead of an IP
        let cli = Cli {
            listen: Some("localhost:22".to_string()),
            ..bare_cli()
        };

        // Act
        let result = cli.into_settings();

        // Assert: must return an error, not panic
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_config_file_returns_error() {
        let cli = Cli {
            config: Some(PathBuf::from("/nonexistent/path/that/cannot/exist/gs.toml")),
            ..bare_cli()
        };

        assert!(cli.into_settings().is_err());
    }

    #[test]
    fn test_flags_take_precedence_over_config_file() {
        // Arrange: a file that sets listen, brain URL and log level
        let dir = std::env::temp_dir().join(format!("ghostshell_test_{}", Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("ghostshell.toml");
        std::fs::write(
            &path,
            r#"
[server]
listen = "127.0.0.1:2200"
[brain]
endpoint = "http://from-file:5000/hallucinate"
[logging]
level = "warn"
"#,
        )
        .unwrap();

        let cli = Cli {
            config: Some(path),
            brain_url: Some("http://from-flag:5000/hallucinate".to_string()),
            ..bare_cli()
        };

        // Act
        let settings = cli.into_settings().unwrap();

        // Assert: file values survive unless a flag overrides them
        assert_eq!(settings.honeypot.listen_addr.to_string(), "127.0.0.1:2200");
        assert_eq!(
            settings.honeypot.brain_endpoint,
            "http://from-flag:5000/hallucinate"
        );
        assert_eq!(settings.log_level, "warn");

        // Cleanup
        std::fs::remove_dir_all(&dir).ok();
    }
}

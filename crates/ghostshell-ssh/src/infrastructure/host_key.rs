//! Host identity loading.
//!
//! The honeypot never generates its own key: a fresh key per restart would
//! show up as a changed host key to returning scanners.  The operator
//! provisions one (`ssh-keygen -t ed25519 -N "" -f hostkey`) and a missing
//! or unreadable key stops the process before it listens.

use std::path::{Path, PathBuf};

use russh::keys::PrivateKey;
use thiserror::Error;
use tracing::info;

/// Error type for host key loading.
#[derive(Debug, Error)]
pub enum HostKeyError {
    /// Nothing exists at the configured path.
    #[error("host key not found at {}", path.display())]
    NotFound { path: PathBuf },

    /// The file exists but could not be read or parsed as a private key.
    #[error("failed to load host key from {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: russh::keys::Error,
    },
}

/// Loads an unencrypted private key (OpenSSH or PEM format) from `path`.
///
/// # Errors
///
/// [`HostKeyError::NotFound`] if the file does not exist,
/// [`HostKeyError::Load`] if it cannot be decoded.
pub fn load_host_key(path: &Path) -> Result<PrivateKey, HostKeyError> {
    if !path.exists() {
        return Err(HostKeyError::NotFound {
            path: path.to_path_buf(),
        });
    }

    let key = russh::keys::load_secret_key(path, None).map_err(|source| HostKeyError::Load {
        path: path.to_path_buf(),
        source,
    })?;

    info!("loaded {} host key from {}", key.algorithm(), path.display());
    Ok(key)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

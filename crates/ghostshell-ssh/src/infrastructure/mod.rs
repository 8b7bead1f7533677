//! Infrastructure layer for ghostshell-ssh.
//!
//! The infrastructure layer handles all I/O: the SSH listener, the HTTP
//! round trip to the brain, and reading files from disk.
//!
//! # Responsibilities
//!
//! - Binding the TCP listener and running the SSH handshake (`russh`)
//! - Translating SSH events into domain decisions (`session`)
//! - POSTing commands to the brain (`reqwest`)
//! - Loading the host key and the optional TOML configuration file
//! - Handling the graceful shutdown signal
//!
//! # What does NOT belong here?
//!
//! - What the attacker sees for a given brain outcome (application layer)
//! - Banner, prompt and parsing rules (domain layer)

pub mod brain_http;
pub mod config_file;
pub mod host_key;
pub mod session;
pub mod ssh_server;

pub use ssh_server::{run_server, serve, HoneypotServices};

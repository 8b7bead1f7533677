//! Domain layer for ghostshell-ssh.
//!
//! The domain layer contains pure types that have no dependencies on I/O,
//! networking, or the SSH library.  Everything here can be unit tested
//! without a socket, a runtime, or a running brain.
//!
//! # What belongs in the domain layer?
//!
//! - The brain wire messages (`CommandRequest` / `CommandResponse`)
//! - Terminal constants and input parsing (banner, prompt, `exit`)
//! - Channel-open and capability-negotiation decisions
//! - Captured credential records
//! - Configuration structures
//!
//! # What does NOT belong here?
//!
//! - Any `tokio`, `TcpStream`, `russh` or `reqwest` types
//! - File I/O or environment variable reading

pub mod channel;
pub mod config;
pub mod credentials;
pub mod messages;
pub mod terminal;

pub use channel::{ChannelDecision, ChannelRejection, ControlReply, ControlRequest};
pub use config::HoneypotConfig;
pub use credentials::CredentialAttempt;
pub use messages::{CommandRequest, CommandResponse};
pub use terminal::ShellInput;

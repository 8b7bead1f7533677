//! Application layer for ghostshell-ssh.
//!
//! The application layer orchestrates the honeypot's behaviour: it knows
//! *what* to do, but delegates *how* to the infrastructure layer.
//!
//! # Responsibilities
//!
//! - Deciding on and recording every login attempt
//! - Mapping brain outcomes (answer, garbage, outage) to terminal text
//! - Running the banner/prompt/dispatch loop of the fake shell
//!
//! # What does NOT belong here?
//!
//! - Opening sockets or speaking SSH (that is infrastructure)
//! - The HTTP client itself (hidden behind [`BrainBackend`])

pub mod auth_policy;
pub mod brain_service;
pub mod shell_emulator;

pub use auth_policy::{AcceptAllPolicy, AuthDecision, AuthPolicy, CaptureSink, TracingCaptureSink};
pub use brain_service::{BrainBackend, BrainClient, BrainError};
pub use shell_emulator::{ShellEmulator, ShellExit};

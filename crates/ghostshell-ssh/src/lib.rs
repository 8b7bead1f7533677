//! ghostshell-ssh library crate.
//!
//! A low-interaction SSH honeypot.  Any password is accepted (and logged),
//! and every command typed into the fake shell is sent to an external
//! "brain" service that invents a plausible terminal response.
//!
//! # Architecture (clean architecture)
//!
//! ```text
//! Attacker (ssh client)
//!         ↕
//! [ghostshell-ssh]
//!   ├── domain/           Pure types: wire messages, terminal text, channel rules
//!   ├── application/      Auth policy, brain outcome mapping, shell loop
//!   └── infrastructure/
//!         ├── ssh_server/ Accept loop (russh)
//!         ├── session/    Per-connection SSH handler
//!         └── brain_http/ POST /hallucinate (reqwest)
//!         ↕
//! Brain service (JSON over HTTP)
//! ```
//!
//! # Layer rules
//!
//! - `domain` has no I/O and no async.
//! - `application` depends on `domain` and reaches the brain only through
//!   the `BrainBackend` trait.
//! - `infrastructure` depends on all other layers plus `russh` and `reqwest`.

/// Domain layer: pure types and rules (no I/O).
pub mod domain;

/// Application layer: authentication, brain dispatch and the shell loop.
pub mod application;

/// Infrastructure layer: SSH listener, brain HTTP client, file loading.
pub mod infrastructure;

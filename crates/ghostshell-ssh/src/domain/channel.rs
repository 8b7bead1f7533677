//! Channel-open and capability-negotiation decisions.
//!
//! The honeypot only ever offers an interactive shell.  These functions
//! decide, from the request type alone, what the session supervisor answers:
//!
//! | Request                         | Answer                               |
//! |---------------------------------|--------------------------------------|
//! | channel open `session`          | accept                               |
//! | channel open anything else      | reject, "unknown channel type"       |
//! | `pty-req`, `shell`              | success                              |
//! | `env`, `window-change`, `signal`| no reply (clients do not expect one) |
//! | anything else (`exec`, ...)     | failure                              |

use std::fmt;

/// The only channel type the honeypot accepts.
pub const SESSION_CHANNEL_TYPE: &str = "session";

/// Why a channel-open request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelRejection {
    /// The client asked for something other than an interactive session
    /// (port forwarding, X11, agent forwarding, ...).
    UnknownChannelType,
}

impl ChannelRejection {
    /// Human-readable reason sent alongside the rejection.
    pub fn reason(self) -> &'static str {
        match self {
            ChannelRejection::UnknownChannelType => "unknown channel type",
        }
    }
}

impl fmt::Display for ChannelRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason())
    }
}

/// Outcome of a channel-open request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelDecision {
    Accept,
    Reject(ChannelRejection),
}

/// Decides whether a channel of `channel_type` may be opened.
pub fn decide_channel_open(channel_type: &str) -> ChannelDecision {
    if channel_type == SESSION_CHANNEL_TYPE {
        ChannelDecision::Accept
    } else {
        ChannelDecision::Reject(ChannelRejection::UnknownChannelType)
    }
}

/// A typed request arriving on an accepted channel's control stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlRequest {
    PtyReq,
    Shell,
    Exec,
    Subsystem,
    Env,
    WindowChange,
    Signal,
    X11Req,
}

impl ControlRequest {
    /// The SSH request type string, as it appears on the wire.
    pub fn request_type(&self) -> &'static str {
        match self {
            ControlRequest::PtyReq => "pty-req",
            ControlRequest::Shell => "shell",
            ControlRequest::Exec => "exec",
            ControlRequest::Subsystem => "subsystem",
            ControlRequest::Env => "env",
            ControlRequest::WindowChange => "window-change",
            ControlRequest::Signal => "signal",
            ControlRequest::X11Req => "x11-req",
        }
    }
}

/// The reply the supervisor sends for a [`ControlRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlReply {
    Success,
    Failure,
    /// Send nothing.  Used for request types that clients send with
    /// `want_reply = false`, where an unsolicited answer would confuse them.
    NoReply,
}

impl ControlReply {
    /// `true` only for [`ControlReply::Success`].
    pub fn is_accepted(self) -> bool {
        matches!(self, ControlReply::Success)
    }
}

/// Capability negotiation: only a pty and a shell are ever granted.
pub fn negotiate(request: &ControlRequest) -> ControlReply {
    match request {
        ControlRequest::PtyReq | ControlRequest::Shell => ControlReply::Success,
        ControlRequest::Env | ControlRequest::WindowChange | ControlRequest::Signal => {
            ControlReply::NoReply
        }
        ControlRequest::Exec | ControlRequest::Subsystem | ControlRequest::X11Req => {
            ControlReply::Failure
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

//! The fake interactive shell.
//!
//! One [`ShellEmulator::run`] call owns one channel's read-eval-respond loop:
//!
//! ```text
//! write BANNER
//! loop:
//!     write PROMPT
//!     read ≤ 1024 bytes          ── EOF / error ──▶ return
//!     trim                       ── "exit"      ──▶ return (no output)
//!     brain.dispatch(line)
//!     write "\r\n" + output + "\r\n"
//! ```
//!
//! The emulator is generic over any `AsyncRead + AsyncWrite` stream.  In
//! production that is an SSH channel; in tests it is a scripted mock, which
//! lets every byte the attacker would see be asserted exactly.
//!
//! Reads and brain calls never overlap within one channel.  Releasing the
//! channel afterwards is the caller's job (see the session supervisor).

use std::io;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info};

use crate::application::auth_policy::CAPTURE_TARGET;
use crate::application::brain_service::BrainClient;
use crate::domain::terminal::{parse_input, render_output, BANNER, PROMPT, READ_BUFFER_SIZE};
use crate::domain::ShellInput;

/// Why the loop stopped without an I/O error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellExit {
    /// The attacker typed `exit`.
    ExitCommand,
    /// The channel reached EOF.
    Disconnected,
}

/// Drives the banner/prompt/dispatch loop for a single channel.
#[derive(Clone)]
pub struct ShellEmulator {
    brain: BrainClient,
}

impl ShellEmulator {
    pub fn new(brain: BrainClient) -> Self {
        Self { brain }
    }

    /// Runs the loop until `exit`, EOF, or an I/O error.
    ///
    /// # Errors
    ///
    /// Returns the underlying error if reading from or writing to `stream`
    /// fails.  Either way the session is over.
    pub async fn run<S>(&self, stream: &mut S) -> io::Result<ShellExit>
    where
        S: AsyncRead + AsyncWrite + Unpin,
    {
        write_text(stream, BANNER).await?;

        let mut buffer = [0u8; READ_BUFFER_SIZE];
        loop {
            write_text(stream, PROMPT).await?;

            let n = stream.read(&mut buffer).await?;
            if n == 0 {
                debug!("channel reached EOF");
                return Ok(ShellExit::Disconnected);
            }

            let command = match parse_input(&buffer[..n]) {
                ShellInput::Exit => {
                    debug!("exit command received");
                    return Ok(ShellExit::ExitCommand);
                }
                ShellInput::Command(command) => command,
            };

            info!(target: CAPTURE_TARGET, command = %command, "command");

            let output = self.brain.dispatch(&command).await;
            write_text(stream, &render_output(&output)).await?;
        }
    }
}

async fn write_text<S>(stream: &mut S, text: &str) -> io::Result<()>
where
    S: AsyncWrite + Unpin,
{
    stream.write_all(text.as_bytes()).await?;
    stream.flush().await
}

// ── Tests ─────────────────────────────────────────────────────────────────────

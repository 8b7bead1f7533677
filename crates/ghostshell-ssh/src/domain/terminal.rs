//! What the attacker sees: banner, prompt, and the framing of each reply.
//!
//! All of these strings are fixed.  The fake host never changes its name,
//! its kernel, or the date it claims its system information was gathered,
//! which keeps transcripts comparable across sessions.

/// Login banner written once when a shell channel starts.
pub const BANNER: &str = "Welcome to Ubuntu 22.04.3 LTS (GNU/Linux 5.15.0-91-generic x86_64)\r\n\
System information as of Wed Dec 3 20:00:00 UTC 2025\r\n\r\n";

/// Prompt written before every read.
pub const PROMPT: &str = "root@server:~# ";

/// Command line that ends the session.
pub const EXIT_COMMAND: &str = "exit";

/// The only failure text that ever reaches the remote party.
pub const BRAIN_UNREACHABLE: &str = "System Error: AI Brain unreachable.";

/// Maximum number of bytes taken from the channel per read.
///
/// One read is treated as one command line; anything longer is split across
/// reads and therefore across commands.
pub const READ_BUFFER_SIZE: usize = 1024;

/// A single line of attacker input after normalisation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellInput {
    /// The attacker typed `exit`.
    Exit,
    /// Anything else, including the empty line.
    Command(String),
}

/// Turns raw bytes from one channel read into a [`ShellInput`].
///
/// Invalid UTF-8 is replaced rather than rejected and surrounding whitespace
/// (including `\r\n`) is trimmed.  Whitespace-only input becomes
/// `Command("")`; it is still forwarded to the brain.
pub fn parse_input(raw: &[u8]) -> ShellInput {
    let text = String::from_utf8_lossy(raw);
    let line = text.trim();

    if line == EXIT_COMMAND {
        ShellInput::Exit
    } else {
        ShellInput::Command(line.to_string())
    }
}

/// Frames brain output for the terminal: a line break before and after.
pub fn render_output(output: &str) -> String {
    format!("\r\n{output}\r\n")
}

// ── Tests ─────────────────────────────────────────────────────────────────────

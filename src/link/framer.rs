//! Newline-delimited downlink framer.
//!
//! The radio module talks in ASCII lines:
//! ```text
//! ┌──────────────────────────────┬────────┐
//! │ ASCII payload (≤ 95 B)       │ CR/LF  │
//! └──────────────────────────────┴────────┘
//! ```
//!
//! The framer accumulates one byte per call and yields a complete
//! line when a terminator arrives. This handles the main loop's
//! single-byte UART polling gracefully — a line assembles across
//! many iterations, and CRLF pairs do not produce empty lines.

use core::mem;

use log::warn;

/// Maximum accepted line length. The longest module notification
/// observed on the wire is well under this; anything longer is
/// treated as noise and truncated.
pub const MAX_LINE_LEN: usize = 96;

/// Streaming line assembler.
pub struct LineFramer {
    buf: heapless::String<MAX_LINE_LEN>,
    /// Set once the current line has overflowed, so the drop is
    /// logged once per line rather than once per byte.
    overflowed: bool,
}

impl LineFramer {
    pub fn new() -> Self {
        Self {
            buf: heapless::String::new(),
            overflowed: false,
        }
    }

    /// Feed one received byte.
    ///
    /// Returns `Some(line)` when a terminator completes a non-empty
    /// line. Empty lines (bare terminators, CRLF tails) are swallowed.
    /// Non-ASCII bytes are dropped with a diagnostic; they never
    /// abort line assembly.
    pub fn feed(&mut self, byte: u8) -> Option<heapless::String<MAX_LINE_LEN>> {
        match byte {
            b'\r' | b'\n' => {
                self.overflowed = false;
                if self.buf.is_empty() {
                    None
                } else {
                    Some(mem::take(&mut self.buf))
                }
            }
            _ if !byte.is_ascii() => {
                warn!("downlink: dropping non-ASCII byte 0x{byte:02X}");
                None
            }
            _ => {
                if self.buf.push(byte as char).is_err() && !self.overflowed {
                    self.overflowed = true;
                    warn!("downlink: line exceeds {MAX_LINE_LEN} bytes, truncating");
                }
                None
            }
        }
    }

    /// Number of bytes accumulated for the line in progress.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    /// Discard any partial line (e.g. after a transport hiccup).
    pub fn reset(&mut self) {
        self.buf.clear();
        self.overflowed = false;
    }
}

impl Default for LineFramer {
    fn default() -> Self {
        Self::new()
    }
}

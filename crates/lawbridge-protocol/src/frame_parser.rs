//! The byte-driven frame state machine: `STX cmd data[L] ETX`.

use lawbridge_core::constants::{command_payload_len, ASCII_SUBSTITUTE, END_BYTE, START_BYTE};
use lawbridge_core::{Error, Result};

/// Receives the decoded events a [`FrameParser`] produces while consuming
/// bytes — plain text characters and complete, well-framed commands.
///
/// Implemented by [`crate::refresh::RefreshController`], which is where
/// commands actually get dispatched to a [`crate::document::Document`].
/// Keeping the trait separate from that implementation is what lets
/// [`FrameParser::feed`] and the controller borrow disjoint fields of a
/// containing struct rather than one borrowing the other.
pub trait FrameSink {
    fn on_text(&mut self, ch: char);
    fn on_command(&mut self, cmd: u8, payload: &[u8]) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RawState {
    /// Outside any frame; bytes are text (or STX/ETX framing bytes).
    Idle,
    /// `STX` seen, waiting for the command byte.
    AwaitingCommand,
    /// Command byte recognized; accumulating its fixed-length payload,
    /// then awaiting the closing `ETX` once `payload.len() == expected`.
    Known { cmd: u8, expected: usize },
    /// Command byte not recognized; draining bytes until `ETX`.
    Unknown { cmd: u8 },
}

/// The low-level frame decoder: turns a byte stream into text characters
/// and complete commands, without any notion of what those commands mean.
///
/// State persists across [`feed`](FrameParser::feed) calls, so a frame may
/// be split across chunk boundaries arbitrarily; `feed(a); feed(b)` and a
/// single `feed(a ++ b)` produce identical sequences of [`FrameSink`]
/// calls.
#[derive(Debug)]
pub struct FrameParser {
    state: RawState,
    payload: Vec<u8>,
}

impl FrameParser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: RawState::Idle,
            payload: Vec::new(),
        }
    }

    /// Whether a frame is currently open (an `STX` has been seen but not
    /// yet matched by its closing `ETX`).
    #[must_use]
    pub fn in_frame(&self) -> bool {
        !matches!(self.state, RawState::Idle)
    }

    /// Feeds `bytes` through the state machine, dispatching each decoded
    /// event to `sink` as it completes. Returns as soon as a byte violates
    /// framing or a dispatched command is rejected by `sink`; bytes after
    /// the offending one in this call are not processed.
    pub fn feed(&mut self, bytes: &[u8], sink: &mut dyn FrameSink) -> Result<()> {
        for &byte in bytes {
            self.feed_byte(byte, sink)?;
        }
        Ok(())
    }

    fn feed_byte(&mut self, byte: u8, sink: &mut dyn FrameSink) -> Result<()> {
        match self.state {
            RawState::Idle => {
                if byte == START_BYTE {
                    self.state = RawState::AwaitingCommand;
                    self.payload.clear();
                } else if byte == END_BYTE {
                    // Structural byte with no open frame to close; never
                    // treated as text (spec §4.2).
                    tracing::trace!("ETX outside frame, ignored");
                } else {
                    sink.on_text(Self::decode_text_byte(byte));
                }
            }
            RawState::AwaitingCommand => {
                self.state = match command_payload_len(byte) {
                    Some(expected) => RawState::Known { cmd: byte, expected },
                    None => RawState::Unknown { cmd: byte },
                };
            }
            RawState::Known { cmd, expected } => {
                if self.payload.len() < expected {
                    self.payload.push(byte);
                } else if byte == END_BYTE {
                    let payload = std::mem::take(&mut self.payload);
                    self.state = RawState::Idle;
                    sink.on_command(cmd, &payload)?;
                } else {
                    self.payload.clear();
                    self.state = RawState::Idle;
                    return Err(Error::Framing { command: cmd, found: byte });
                }
            }
            RawState::Unknown { cmd } => {
                if byte == END_BYTE {
                    tracing::trace!(command = cmd, "unknown command discarded");
                    self.state = RawState::Idle;
                }
            }
        }
        Ok(())
    }

    fn decode_text_byte(byte: u8) -> char {
        if byte.is_ascii() {
            byte as char
        } else {
            ASCII_SUBSTITUTE
        }
    }
}

impl Default for FrameParser {
    fn default() -> Self {
        Self::new()
    }
}

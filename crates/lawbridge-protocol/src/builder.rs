//! Frame construction, the inverse of [`crate::frame_parser::FrameParser`].
//!
//! Exists mainly to build well-formed (and deliberately malformed) wire
//! frames for tests without hand-assembling byte arrays everywhere.

use lawbridge_core::constants::{command_payload_len, END_BYTE, START_BYTE};
use thiserror::Error;

/// Rejected frame construction, distinct from [`lawbridge_core::Error`]:
/// these are caller mistakes building a frame, not wire-decoding failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("unknown command byte {0:#04x}")]
    UnknownCommand(u8),
    #[error("payload length mismatch for command {cmd:#04x}: expected {expected}, got {actual}")]
    PayloadLengthMismatch { cmd: u8, expected: usize, actual: usize },
}

/// Assembles `STX cmd payload ETX` for a recognized command whose payload
/// matches the command's declared length.
///
/// # Errors
///
/// Returns [`BuildError::UnknownCommand`] for an unrecognized command byte,
/// or [`BuildError::PayloadLengthMismatch`] if `payload` doesn't match the
/// command's declared length.
pub fn build_frame(cmd: u8, payload: &[u8]) -> Result<Vec<u8>, BuildError> {
    let expected = command_payload_len(cmd).ok_or(BuildError::UnknownCommand(cmd))?;
    if payload.len() != expected {
        return Err(BuildError::PayloadLengthMismatch {
            cmd,
            expected,
            actual: payload.len(),
        });
    }
    let mut frame = Vec::with_capacity(payload.len() + 3);
    frame.push(START_BYTE);
    frame.push(cmd);
    frame.extend_from_slice(payload);
    frame.push(END_BYTE);
    Ok(frame)
}

/// Little-endian encoding for the `P` (page) command's payload.
#[must_use]
pub fn page_payload(page: u16) -> [u8; 2] {
    page.to_le_bytes()
}

/// `(startTC, endTC)` payload for the `R` (refresh begin) command.
#[must_use]
pub fn refresh_payload(start: crate::Timecode, end: crate::Timecode) -> [u8; 8] {
    let mut out = [0u8; 8];
    out[0..4].copy_from_slice(&start.to_bytes());
    out[4..8].copy_from_slice(&end.to_bytes());
    out
}

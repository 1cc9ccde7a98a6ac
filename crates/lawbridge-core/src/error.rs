use thiserror::Error;

/// Errors raised synchronously from `lawbridge-protocol` while feeding bytes
/// into the frame parser or refresh controller.
///
/// Both variants are "synchronous" in the sense of spec §7: they surface at
/// the `feed` call boundary for the byte that triggered them. Everything
/// else the wire format can throw at the parser (unknown commands, `E`
/// outside REFRESH, non-ASCII text bytes) is not an error — see spec §7's
/// `Ignored` / `Encoding substitution` outcomes, which are logged, not
/// raised.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The byte at the position immediately following a recognized
    /// command's fixed-length payload was not `ETX` (0x03).
    #[error("framing error: expected ETX (0x03) after command {command:#04x}, found {found:#04x}")]
    Framing { command: u8, found: u8 },

    /// `R` (refresh begin) was received while the parser was already in
    /// REFRESH state. Nested refresh is unsupported (spec §1 Non-goals).
    #[error("nested refresh: R received while already in REFRESH state")]
    NestedRefresh,
}

pub type Result<T> = std::result::Result<T, Error>;

//! Decoder for the LawBridge realtime-transcription wire protocol.
//!
//! A byte-driven frame parser ([`FrameParser`]) unpacks `STX cmd data ETX`
//! frames and plain text out of a stream; a [`RefreshController`] applies
//! them to a [`Document`], tracking the NORMAL/REFRESH mode distinction and
//! either of the two refresh strategies ([`RefreshMode::Buffer`] /
//! [`RefreshMode::Stream`]). [`LawBridgeParser`] wires the two together
//! into the type most callers want.

pub mod builder;
pub mod decoder;
pub mod document;
pub mod frame_parser;
pub mod refresh;
pub mod timecode;

pub use builder::{build_frame, BuildError};
pub use decoder::LawBridgeParser;
pub use document::Document;
pub use frame_parser::{FrameParser, FrameSink};
pub use refresh::{RefreshController, RefreshMode};
pub use timecode::Timecode;

pub use lawbridge_core::{Error, Result};

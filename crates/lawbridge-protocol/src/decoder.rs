//! The public entry point: feed wire bytes in, read document state out.

use crate::frame_parser::FrameParser;
use crate::refresh::{RefreshController, RefreshMode};
use lawbridge_core::Result;
use std::collections::BTreeMap;

/// A complete LawBridge decoder: a [`FrameParser`] driving a
/// [`RefreshController`] over its lifetime.
///
/// `frames` and `refresh` are split into their own fields (rather than one
/// owning the other) specifically so [`feed`](Self::feed) can hand the
/// frame parser a mutable reference to the refresh controller without the
/// borrow checker seeing it as `self` borrowing itself twice.
pub struct LawBridgeParser {
    frames: FrameParser,
    refresh: RefreshController,
}

impl LawBridgeParser {
    #[must_use]
    pub fn new(mode: RefreshMode) -> Self {
        Self {
            frames: FrameParser::new(),
            refresh: RefreshController::new(mode),
        }
    }

    /// Feeds a chunk of wire bytes through the parser. See
    /// [`FrameParser::feed`] for exactly how much of `bytes` is consumed
    /// when an error is returned.
    pub fn feed(&mut self, bytes: &[u8]) -> Result<()> {
        let Self { frames, refresh } = self;
        frames.feed(bytes, refresh)
    }

    #[must_use]
    pub fn document_text(&self) -> String {
        self.refresh.document_text()
    }

    #[must_use]
    pub fn current_page(&self) -> Option<u16> {
        self.refresh.current_page()
    }

    #[must_use]
    pub fn current_line(&self) -> Option<u8> {
        self.refresh.current_line()
    }

    #[must_use]
    pub fn current_format(&self) -> Option<u8> {
        self.refresh.current_format()
    }

    #[must_use]
    pub fn prevent_save(&self) -> bool {
        self.refresh.prevent_save()
    }

    #[must_use]
    pub fn time_index(&self) -> &BTreeMap<u32, usize> {
        self.refresh.time_index()
    }

    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        self.refresh.is_refreshing()
    }
}

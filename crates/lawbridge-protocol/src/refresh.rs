//! NORMAL/REFRESH mode tracking and the two refresh strategies.

use crate::document::Document;
use crate::frame_parser::FrameSink;
use crate::timecode::Timecode;
use lawbridge_core::constants::{
    CMD_DELETE, CMD_FORMAT, CMD_LINE, CMD_PAGE, CMD_PREVENT_SAVE, CMD_REFRESH_BEGIN,
    CMD_REFRESH_END, CMD_TIMECODE,
};
use lawbridge_core::{Error, Result};
use std::collections::BTreeMap;

/// Which strategy `R`/`E` use to apply a refresh (spec §4.3). Both observe
/// the same external contract; they differ in how the replaced region is
/// held while new text streams in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshMode {
    /// Accumulate the replacement in a scratch [`Document`]; splice it into
    /// the main document only once `E` arrives.
    Buffer,
    /// Delete the resolved range immediately on `R` and stream subsequent
    /// edits straight into the main document, guarded by a `lower_bound`.
    Stream,
}

struct ActiveRefresh {
    start_pos: usize,
    end_pos: usize,
    lower_bound: usize,
    /// `Some` only under [`RefreshMode::Buffer`].
    scratch: Option<Document>,
}

/// Owns the single [`Document`] a stream edits and tracks whether a
/// refresh is in progress, dispatching each [`FrameSink`] event to
/// whichever document is currently the active edit target.
pub struct RefreshController {
    mode: RefreshMode,
    doc: Document,
    active: Option<ActiveRefresh>,
}

impl RefreshController {
    #[must_use]
    pub fn new(mode: RefreshMode) -> Self {
        Self {
            mode,
            doc: Document::new(),
            active: None,
        }
    }

    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        self.active.is_some()
    }

    #[must_use]
    pub fn document_text(&self) -> String {
        self.doc.text()
    }

    #[must_use]
    pub fn current_page(&self) -> Option<u16> {
        self.doc.current_page()
    }

    #[must_use]
    pub fn current_line(&self) -> Option<u8> {
        self.doc.current_line()
    }

    #[must_use]
    pub fn current_format(&self) -> Option<u8> {
        self.doc.current_format()
    }

    #[must_use]
    pub fn prevent_save(&self) -> bool {
        self.doc.prevent_save()
    }

    #[must_use]
    pub fn time_index(&self) -> &BTreeMap<u32, usize> {
        self.doc.time_index()
    }

    /// The document currently receiving text and commands: the scratch
    /// document while a BUFFER refresh is open, the main document
    /// otherwise.
    fn target_mut(&mut self) -> &mut Document {
        if let RefreshMode::Buffer = self.mode {
            if let Some(state) = &mut self.active {
                return state
                    .scratch
                    .as_mut()
                    .expect("scratch document present during a BUFFER refresh");
            }
        }
        &mut self.doc
    }

    /// Resolves a `(start, end)` timecode pair to a `(start_pos, end_pos)`
    /// character range, per spec §4.3's anchor/fallback/clamp/swap rules.
    fn resolve_range(&self, start: Timecode, end: Timecode) -> (usize, usize) {
        let (mut start_frames, mut end_frames) = (start.frames(), end.frames());
        if end_frames < start_frames {
            std::mem::swap(&mut start_frames, &mut end_frames);
        }

        let len = self.doc.length();
        let index = self.doc.time_index();
        if index.is_empty() {
            return (0, len);
        }

        let start_pos = index
            .range(start_frames..)
            .next()
            .map(|(_, &pos)| pos)
            .or_else(|| index.range(..=start_frames).next_back().map(|(_, &pos)| pos))
            .unwrap_or(0);

        let end_pos = index
            .range(..=end_frames)
            .next_back()
            .map(|(_, &pos)| pos)
            .or_else(|| index.range(end_frames..).next().map(|(_, &pos)| pos))
            .unwrap_or(len);

        let mut start_pos = start_pos.min(len);
        let mut end_pos = end_pos.min(len);
        if end_pos < start_pos {
            std::mem::swap(&mut start_pos, &mut end_pos);
        }
        (start_pos, end_pos)
    }

    fn begin_refresh(&mut self, start: Timecode, end: Timecode) -> Result<()> {
        if self.active.is_some() {
            return Err(Error::NestedRefresh);
        }
        let (start_pos, end_pos) = self.resolve_range(start, end);
        tracing::debug!(?start, ?end, start_pos, end_pos, mode = ?self.mode, "refresh begin");
        match self.mode {
            RefreshMode::Buffer => {
                self.active = Some(ActiveRefresh {
                    start_pos,
                    end_pos,
                    lower_bound: 0,
                    scratch: Some(Document::new()),
                });
            }
            RefreshMode::Stream => {
                self.doc.delete_range(start_pos, end_pos);
                self.doc.set_insertion(start_pos);
                self.active = Some(ActiveRefresh {
                    start_pos,
                    end_pos,
                    lower_bound: start_pos,
                    scratch: None,
                });
            }
        }
        Ok(())
    }

    fn end_refresh(&mut self) {
        let Some(state) = self.active.take() else {
            tracing::trace!("E received outside REFRESH, ignored");
            return;
        };
        match self.mode {
            RefreshMode::Buffer => {
                let scratch = state
                    .scratch
                    .expect("scratch document present during a BUFFER refresh");
                let scratch_text = scratch.text();
                let scratch_prevent_save = scratch.prevent_save();
                self.doc.delete_range(state.start_pos, state.end_pos);
                self.doc.set_insertion(state.start_pos);
                self.doc.insert_text(&scratch_text);
                self.doc.set_prevent_save(scratch_prevent_save);
            }
            RefreshMode::Stream => {
                let len = self.doc.length();
                self.doc.set_insertion(len);
            }
        }
        tracing::debug!("refresh end");
    }

    fn handle_delete(&mut self) {
        if let (true, RefreshMode::Stream) = (self.active.is_some(), self.mode) {
            let lower = self.active.as_ref().unwrap().lower_bound;
            self.doc.delete_backspace(lower);
        } else {
            self.target_mut().delete_backspace(0);
        }
    }

    fn handle_prevent_save(&mut self) {
        self.target_mut().on_prevent_save();
        if self.active.is_some() {
            self.doc.set_prevent_save(true);
        }
    }
}

impl FrameSink for RefreshController {
    fn on_text(&mut self, ch: char) {
        self.target_mut().insert_text(&ch.to_string());
    }

    fn on_command(&mut self, cmd: u8, payload: &[u8]) -> Result<()> {
        match cmd {
            CMD_PAGE => self.target_mut().on_page([payload[0], payload[1]]),
            CMD_LINE => self.target_mut().on_line(payload[0]),
            CMD_FORMAT => self.target_mut().on_format(payload[0]),
            CMD_TIMECODE => {
                let tc = Timecode::from_bytes([payload[0], payload[1], payload[2], payload[3]]);
                self.target_mut().on_timecode(tc);
            }
            CMD_DELETE => self.handle_delete(),
            CMD_PREVENT_SAVE => self.handle_prevent_save(),
            CMD_REFRESH_BEGIN => {
                let start = Timecode::from_bytes([payload[0], payload[1], payload[2], payload[3]]);
                let end = Timecode::from_bytes([payload[4], payload[5], payload[6], payload[7]]);
                self.begin_refresh(start, end)?;
            }
            CMD_REFRESH_END => self.end_refresh(),
            other => unreachable!("FrameParser only dispatches recognized commands, got {other:#04x}"),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame_parser::FrameParser;

    fn feed_all(ctrl: &mut RefreshController, bytes: &[u8]) -> Result<()> {
        FrameParser::new().feed(bytes, ctrl)
    }

    #[test]
    fn test_plain_text_and_timecode_index() {
        let mut ctrl = RefreshController::new(RefreshMode::Buffer);
        feed_all(&mut ctrl, b"ab").unwrap();
        feed_all(&mut ctrl, &[0x02, CMD_TIMECODE, 0, 0, 1, 0, 0x03]).unwrap();
        feed_all(&mut ctrl, b"cd").unwrap();
        assert_eq!(ctrl.document_text(), "abcd");
        assert_eq!(ctrl.time_index().get(&30), Some(&2));
    }

    #[test]
    fn test_buffer_refresh_replaces_middle_range() {
        let mut ctrl = RefreshController::new(RefreshMode::Buffer);
        feed_all(&mut ctrl, b"AAABBBCCC").unwrap();
        feed_all(&mut ctrl, &[0x02, CMD_TIMECODE, 0, 0, 1, 0, 0x03]).unwrap(); // frame 30 -> pos 3
        feed_all(&mut ctrl, b"BBB").unwrap();
        feed_all(&mut ctrl, &[0x02, CMD_TIMECODE, 0, 0, 2, 0, 0x03]).unwrap(); // frame 60 -> pos 6
        feed_all(&mut ctrl, b"CCC").unwrap();

        // Begin refresh spanning [frame 30, frame 60) -> positions [3, 6)
        feed_all(
            &mut ctrl,
            &[0x02, CMD_REFRESH_BEGIN, 0, 0, 1, 0, 0, 0, 2, 0, 0x03],
        )
        .unwrap();
        assert!(ctrl.is_refreshing());
        feed_all(&mut ctrl, b"XYZ").unwrap();
        // the main document must be untouched until E
        assert_eq!(ctrl.document_text(), "AAABBBCCC");
        feed_all(&mut ctrl, &[0x02, CMD_REFRESH_END, 0x03]).unwrap();
        assert!(!ctrl.is_refreshing());
        assert_eq!(ctrl.document_text(), "AAAXYZCCC");
    }

    #[test]
    fn test_stream_refresh_respects_lower_bound_on_delete() {
        let mut ctrl = RefreshController::new(RefreshMode::Stream);
        feed_all(&mut ctrl, b"AAABBBCCC").unwrap();
        feed_all(&mut ctrl, &[0x02, CMD_TIMECODE, 0, 0, 1, 0, 0x03]).unwrap(); // pos 3
        feed_all(&mut ctrl, b"BBB").unwrap();
        feed_all(&mut ctrl, &[0x02, CMD_TIMECODE, 0, 0, 2, 0, 0x03]).unwrap(); // pos 6
        feed_all(&mut ctrl, b"CCC").unwrap();

        feed_all(
            &mut ctrl,
            &[0x02, CMD_REFRESH_BEGIN, 0, 0, 1, 0, 0, 0, 2, 0, 0x03],
        )
        .unwrap();
        // range [3,6) deleted immediately
        assert_eq!(ctrl.document_text(), "AAACCC");
        feed_all(&mut ctrl, b"XY").unwrap();
        assert_eq!(ctrl.document_text(), "AAAXYCCC");
        // backspace down to the lower bound, then no further
        for _ in 0..5 {
            feed_all(&mut ctrl, &[0x02, CMD_DELETE, 0x03]).unwrap();
        }
        assert_eq!(ctrl.document_text(), "AAACCC");
        feed_all(&mut ctrl, &[0x02, CMD_REFRESH_END, 0x03]).unwrap();
        assert_eq!(ctrl.document_text(), "AAACCC");
    }

    #[test]
    fn test_nested_refresh_rejected() {
        let mut ctrl = RefreshController::new(RefreshMode::Buffer);
        feed_all(&mut ctrl, b"hello").unwrap();
        feed_all(
            &mut ctrl,
            &[0x02, CMD_REFRESH_BEGIN, 0, 0, 0, 0, 0, 0, 1, 0, 0x03],
        )
        .unwrap();
        let err = feed_all(
            &mut ctrl,
            &[0x02, CMD_REFRESH_BEGIN, 0, 0, 0, 0, 0, 0, 1, 0, 0x03],
        )
        .unwrap_err();
        assert_eq!(err, Error::NestedRefresh);
        assert!(ctrl.is_refreshing());
    }

    #[test]
    fn test_end_outside_refresh_is_ignored() {
        let mut ctrl = RefreshController::new(RefreshMode::Buffer);
        feed_all(&mut ctrl, b"hi").unwrap();
        feed_all(&mut ctrl, &[0x02, CMD_REFRESH_END, 0x03]).unwrap();
        assert_eq!(ctrl.document_text(), "hi");
    }

    #[test]
    fn test_prevent_save_mirrors_onto_main_during_buffer_refresh() {
        let mut ctrl = RefreshController::new(RefreshMode::Buffer);
        feed_all(&mut ctrl, b"hi").unwrap();
        feed_all(
            &mut ctrl,
            &[0x02, CMD_REFRESH_BEGIN, 0, 0, 0, 0, 0, 0, 0, 0, 0x03],
        )
        .unwrap();
        assert!(!ctrl.prevent_save());
        feed_all(&mut ctrl, &[0x02, CMD_PREVENT_SAVE, 0x03]).unwrap();
        assert!(ctrl.prevent_save());
    }

    #[test]
    fn test_empty_index_range_resolves_to_whole_document() {
        let mut ctrl = RefreshController::new(RefreshMode::Stream);
        feed_all(&mut ctrl, b"hello").unwrap();
        feed_all(
            &mut ctrl,
            &[0x02, CMD_REFRESH_BEGIN, 0, 0, 1, 0, 0, 0, 2, 0, 0x03],
        )
        .unwrap();
        assert_eq!(ctrl.document_text(), "");
        feed_all(&mut ctrl, b"bye").unwrap();
        feed_all(&mut ctrl, &[0x02, CMD_REFRESH_END, 0x03]).unwrap();
        assert_eq!(ctrl.document_text(), "bye");
    }
}

//! Timecode: a four-octet `(HH, MM, SS, FF)` point in media time.

use lawbridge_core::constants::FRAMES_PER_SECOND;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A timecode as carried on the wire: four raw octets, `FF` being a 30 fps
/// frame index. Field ranges are never validated (spec §3) — the type is
/// used only to compute a frame count, which is what the document's time
/// index is actually keyed on.
///
/// # Examples
///
/// ```
/// use lawbridge_protocol::Timecode;
///
/// let tc = Timecode::new(0, 0, 1, 0);
/// assert_eq!(tc.frames(), 30); // one second in
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Timecode {
    pub hh: u8,
    pub mm: u8,
    pub ss: u8,
    pub ff: u8,
}

impl Timecode {
    #[must_use]
    pub const fn new(hh: u8, mm: u8, ss: u8, ff: u8) -> Self {
        Self { hh, mm, ss, ff }
    }

    /// Build a timecode from its wire representation: `(HH, MM, SS, FF)`,
    /// each one byte, no endianness (spec §6).
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 4]) -> Self {
        Self::new(bytes[0], bytes[1], bytes[2], bytes[3])
    }

    /// The wire representation of this timecode.
    #[must_use]
    pub const fn to_bytes(self) -> [u8; 4] {
        [self.hh, self.mm, self.ss, self.ff]
    }

    /// Total frame count at [`FRAMES_PER_SECOND`] fps — the sort key used
    /// by the document's time index and by refresh range resolution.
    ///
    /// Out-of-range fields (e.g. `mm = 99`) are not rejected; they simply
    /// contribute their full value to the sum, per spec §9's leniency note.
    #[must_use]
    pub fn frames(&self) -> u32 {
        let fps = u32::from(FRAMES_PER_SECOND);
        ((u32::from(self.hh) * 60 + u32::from(self.mm)) * 60 + u32::from(self.ss)) * fps
            + u32::from(self.ff)
    }
}

/// Timecodes compare by frame count (spec §3), not lexicographically by
/// field — a naive derived `Ord` would disagree with `frames()` once a
/// field carries an out-of-range value (e.g. `mm = 99`).
impl PartialOrd for Timecode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timecode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.frames().cmp(&other.frames())
    }
}

impl fmt::Display for Timecode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}:{:02}", self.hh, self.mm, self.ss, self.ff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 0, 0, 0, 0)]
    #[case(0, 0, 1, 0, 30)]
    #[case(0, 1, 0, 0, 1800)]
    #[case(1, 0, 0, 0, 108_000)]
    #[case(0, 0, 0, 15, 15)]
    fn test_frames(#[case] hh: u8, #[case] mm: u8, #[case] ss: u8, #[case] ff: u8, #[case] expected: u32) {
        assert_eq!(Timecode::new(hh, mm, ss, ff).frames(), expected);
    }

    #[test]
    fn test_from_bytes_roundtrip() {
        let tc = Timecode::from_bytes([1, 2, 3, 4]);
        assert_eq!(tc, Timecode::new(1, 2, 3, 4));
        assert_eq!(tc.to_bytes(), [1, 2, 3, 4]);
    }

    #[test]
    fn test_ordering_by_frame_count_not_lexicographic() {
        // hh=0,mm=99 has more frames than hh=1,mm=0, even though (0,99,..)
        // would sort before (1,0,..) lexicographically.
        let a = Timecode::new(0, 99, 0, 0);
        let b = Timecode::new(1, 0, 0, 0);
        assert!(a > b);
    }

    #[test]
    fn test_display_format() {
        assert_eq!(Timecode::new(1, 2, 3, 4).to_string(), "01:02:03:04");
    }
}

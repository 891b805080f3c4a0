//! Partition type used by parse events.

/// Named sub-range of an artifact inside the parse buffer.
///
/// Invariant: `offset` and `offset + len` lie on UTF-8 boundaries of the
/// buffer the partition was emitted against, and are only valid for the
/// duration of the handler call that received them (the buffer may shift or
/// refill afterwards).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Partition {
    /// Byte offset into the borrowed buffer.
    pub offset: usize,
    /// Byte length of the range.
    pub len: usize,
    /// 1-based line of the first character of the range.
    pub line: u32,
    /// 1-based column of the first character of the range.
    pub col: u32,
}

impl Partition {
    pub fn new(offset: usize, len: usize, line: u32, col: u32) -> Self {
        Self {
            offset,
            len,
            line,
            col,
        }
    }

    /// Zero-length partition anchored at a position, used for absent
    /// sub-structures (e.g. a DOCTYPE without a public id).
    pub fn empty_at(offset: usize, line: u32, col: u32) -> Self {
        Self {
            offset,
            len: 0,
            line,
            col,
        }
    }

    pub fn is_empty(self) -> bool {
        self.len == 0
    }

    /// Resolve the partition against the buffer it was emitted with.
    pub fn slice(self, buffer: &str) -> &str {
        debug_assert!(
            self.offset + self.len <= buffer.len(),
            "partition {}..{} out of bounds for buffer of {} bytes",
            self.offset,
            self.offset + self.len,
            buffer.len()
        );
        debug_assert!(
            buffer.is_char_boundary(self.offset) && buffer.is_char_boundary(self.offset + self.len),
            "partition must lie on UTF-8 boundaries"
        );
        &buffer[self.offset..self.offset + self.len]
    }
}

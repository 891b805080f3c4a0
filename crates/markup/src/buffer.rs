//! Sliding scan buffer with line/column tracking.
//!
//! Storage is an append-only `String` between shifts; byte offsets into it
//! are only stable until the next refill, which may discard the consumed
//! prefix. The read head and the position cursor always sit on UTF-8
//! boundaries.
//!
//! Newline accounting treats `\n`, `\r` and `\r\n` as exactly one line
//! break each; the pending-`\r` flag survives refills so a `\r\n` split
//! across chunks still counts once.

use std::io;

use crate::source::TextSource;

/// Consumed-prefix length that triggers a shift on the next refill.
const SHIFT_THRESHOLD: usize = 4 * 1024;

/// Hard cap on how many bytes a single structure may occupy.
pub(crate) const MAX_STRUCTURE_BYTES: usize = 64 * 1024 * 1024;

/// Restorable position snapshot.
///
/// Snapshots are cheap and only valid within the buffer contents they were
/// taken against; a shift invalidates all earlier snapshots.
#[derive(Clone, Copy, Debug)]
pub(crate) struct BufferMark {
    offset: usize,
    pub(crate) line: u32,
    pub(crate) col: u32,
    prev_cr: bool,
    generation: u64,
}

#[derive(Debug)]
pub(crate) struct ScanBuffer {
    buf: String,
    head: usize,
    line: u32,
    col: u32,
    prev_cr: bool,
    // Monotonic locate cursor; always between head and buf.len().
    cur_offset: usize,
    cur_line: u32,
    cur_col: u32,
    cur_prev_cr: bool,
    eof: bool,
    generation: u64,
}

impl ScanBuffer {
    pub(crate) fn new() -> Self {
        Self {
            buf: String::new(),
            head: 0,
            line: 1,
            col: 1,
            prev_cr: false,
            cur_offset: 0,
            cur_line: 1,
            cur_col: 1,
            cur_prev_cr: false,
            eof: false,
            generation: 0,
        }
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.buf
    }

    pub(crate) fn head(&self) -> usize {
        self.head
    }

    pub(crate) fn at_eof(&self) -> bool {
        self.eof
    }

    pub(crate) fn has_unread(&self) -> bool {
        self.head < self.buf.len()
    }

    /// Bytes currently buffered past the read head.
    pub(crate) fn window_len(&self) -> usize {
        self.buf.len() - self.head
    }

    /// Pull more text from the source, shifting out the consumed prefix
    /// first when it has grown past the threshold.
    ///
    /// Returns the number of bytes shifted out so the caller can adjust any
    /// absolute scan hints it keeps.
    pub(crate) fn fill_from(&mut self, source: &mut impl TextSource) -> io::Result<usize> {
        let mut shifted = 0;
        if self.head >= SHIFT_THRESHOLD && self.head >= self.buf.len() / 2 {
            shifted = self.shift();
        }
        let appended = source.fill(&mut self.buf)?;
        if appended == 0 {
            self.eof = true;
        }
        Ok(shifted)
    }

    fn shift(&mut self) -> usize {
        debug_assert!(self.buf.is_char_boundary(self.head));
        let shifted = self.head;
        self.buf.drain(..self.head);
        self.head = 0;
        self.cur_offset -= shifted;
        self.generation += 1;
        shifted
    }

    /// Position snapshot at the read head.
    #[allow(
        dead_code,
        reason = "buffer API surface for mid-structure restarts; exercised in tests"
    )]
    pub(crate) fn snapshot(&self) -> BufferMark {
        BufferMark {
            offset: self.head,
            line: self.line,
            col: self.col,
            prev_cr: self.prev_cr,
            generation: self.generation,
        }
    }

    /// Rewind the read head to an earlier snapshot.
    ///
    /// Fails when the snapshot's range has been discarded by a shift.
    #[allow(
        dead_code,
        reason = "buffer API surface for mid-structure restarts; exercised in tests"
    )]
    pub(crate) fn restore(&mut self, mark: BufferMark) -> bool {
        if mark.generation != self.generation || mark.offset > self.buf.len() {
            return false;
        }
        self.head = mark.offset;
        self.line = mark.line;
        self.col = mark.col;
        self.prev_cr = mark.prev_cr;
        self.cur_offset = mark.offset;
        self.cur_line = mark.line;
        self.cur_col = mark.col;
        self.cur_prev_cr = mark.prev_cr;
        true
    }

    /// Position of the read head.
    pub(crate) fn position(&self) -> (u32, u32) {
        (self.line, self.col)
    }

    /// Line/column of the character at `offset` (`head <= offset <= end`).
    ///
    /// Ascending queries walk the cursor forward; a backward query (an
    /// empty partition anchored before the last located offset) restarts
    /// from the head.
    pub(crate) fn locate(&mut self, offset: usize) -> (u32, u32) {
        debug_assert!(offset >= self.head && offset <= self.buf.len());
        if offset < self.cur_offset {
            self.cur_offset = self.head;
            self.cur_line = self.line;
            self.cur_col = self.col;
            self.cur_prev_cr = self.prev_cr;
        }
        for ch in self.buf[self.cur_offset..offset].chars() {
            match ch {
                '\n' => {
                    if self.cur_prev_cr {
                        self.cur_prev_cr = false;
                    } else {
                        self.cur_line += 1;
                        self.cur_col = 1;
                    }
                }
                '\r' => {
                    self.cur_line += 1;
                    self.cur_col = 1;
                    self.cur_prev_cr = true;
                }
                _ => {
                    self.cur_col += 1;
                    self.cur_prev_cr = false;
                }
            }
        }
        self.cur_offset = offset;
        (self.cur_line, self.cur_col)
    }

    /// Consume everything up to `offset`, folding the walked range into the
    /// head position.
    pub(crate) fn advance_to(&mut self, offset: usize) {
        debug_assert!(offset >= self.head && offset <= self.buf.len());
        let (line, col) = self.locate(offset);
        self.head = offset;
        self.line = line;
        self.col = col;
        self.prev_cr = self.cur_prev_cr;
    }
}

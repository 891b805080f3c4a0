//! Caller-supplied character sources.
//!
//! The parser never owns I/O: it pulls text through `TextSource` when the
//! scan buffer runs dry. Sources append decoded UTF-8 to the buffer; byte
//! readers keep an incomplete-sequence carry so multi-byte characters split
//! across chunks decode intact.

use std::io::{self, Read};

/// Pull-based character source.
pub trait TextSource {
    /// Append a chunk of decoded text to `sink`.
    ///
    /// Returns the number of bytes appended; 0 signals end of input.
    fn fill(&mut self, sink: &mut String) -> io::Result<usize>;
}

/// One-shot source over a borrowed string.
impl TextSource for &str {
    fn fill(&mut self, sink: &mut String) -> io::Result<usize> {
        if self.is_empty() {
            return Ok(0);
        }
        sink.push_str(self);
        let n = self.len();
        *self = "";
        Ok(n)
    }
}

const READ_CHUNK: usize = 8 * 1024;

/// Streaming source over any `io::Read`, decoding UTF-8 incrementally.
///
/// Invalid sequences are replaced with U+FFFD so the stream always makes
/// forward progress; a trailing incomplete sequence is carried into the
/// next read.
pub struct ReaderSource<R: Read> {
    reader: R,
    carry: [u8; 4],
    carry_len: usize,
    chunk: Vec<u8>,
}

impl<R: Read> ReaderSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            carry: [0; 4],
            carry_len: 0,
            chunk: vec![0; READ_CHUNK],
        }
    }
}

impl<R: Read> TextSource for ReaderSource<R> {
    fn fill(&mut self, sink: &mut String) -> io::Result<usize> {
        let before = sink.len();
        // A read may only extend the carry without completing a character;
        // 0 appended bytes must still mean end-of-input to the caller, so
        // keep reading until something decodes or the reader is dry.
        loop {
            let carried = self.carry_len;
            self.chunk[..carried].copy_from_slice(&self.carry[..carried]);
            let read = self.reader.read(&mut self.chunk[carried..])?;
            self.carry_len = 0;

            if read == 0 {
                // Lossy-flush a dangling suffix so the stream is never
                // silently truncated at end of input.
                if carried > 0 {
                    sink.push_str(&String::from_utf8_lossy(&self.chunk[..carried]));
                }
                return Ok(sink.len() - before);
            }

            let mut bytes = &self.chunk[..carried + read];
            while !bytes.is_empty() {
                match std::str::from_utf8(bytes) {
                    Ok(valid) => {
                        sink.push_str(valid);
                        break;
                    }
                    Err(err) => {
                        let valid_up_to = err.valid_up_to();
                        sink.push_str(
                            std::str::from_utf8(&bytes[..valid_up_to]).expect("valid UTF-8 prefix"),
                        );
                        match err.error_len() {
                            Some(bad) => {
                                sink.push('\u{FFFD}');
                                bytes = &bytes[valid_up_to + bad..];
                            }
                            None => {
                                let tail = &bytes[valid_up_to..];
                                self.carry[..tail.len()].copy_from_slice(tail);
                                self.carry_len = tail.len();
                                break;
                            }
                        }
                    }
                }
            }
            if sink.len() > before {
                return Ok(sink.len() - before);
            }
        }
    }
}

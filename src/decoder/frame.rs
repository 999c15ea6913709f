//! Word-level view over an MM1 capture
//!
//! The capture is a run of 32-bit Little-Endian words. Records address their
//! fields as 16-bit halves counted from the record's first word, and 32-bit
//! fields are two consecutive halves, low half first.
//!
//! A partial final word (1-3 bytes) is never interpreted as structure.

use super::common::Spectrum;
use super::error::DecodeError;

pub const WORD_SIZE: usize = 4;
pub const HALF_SIZE: usize = 2;
pub const HALVES_PER_WORD: usize = WORD_SIZE / HALF_SIZE;

/// Read-only, bounds-checked view of the capture
#[derive(Debug, Clone, Copy)]
pub struct WordFrame<'a> {
    data: &'a [u8],
}

impl<'a> WordFrame<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// Number of complete 32-bit words
    pub fn len_words(&self) -> usize {
        self.data.len() / WORD_SIZE
    }

    pub fn len_bytes(&self) -> usize {
        self.data.len()
    }

    /// Halves available from `word_cursor` to the last complete word
    pub fn halves_from(&self, word_cursor: usize) -> usize {
        self.len_words().saturating_sub(word_cursor) * HALVES_PER_WORD
    }

    /// Fail with `OutOfBounds` unless a record of `halves` fits at `word_cursor`
    pub fn ensure_halves(&self, word_cursor: usize, halves: usize) -> Result<(), DecodeError> {
        let available = self.halves_from(word_cursor);
        if halves > available {
            return Err(DecodeError::OutOfBounds {
                offset: word_cursor.saturating_mul(WORD_SIZE),
                needed: halves,
                available,
            });
        }
        Ok(())
    }

    /// Half at `word_cursor * 2 + half_index`
    pub fn read16(&self, word_cursor: usize, half_index: usize) -> Result<u16, DecodeError> {
        self.ensure_halves(word_cursor, half_index + 1)?;
        let pos = (word_cursor * HALVES_PER_WORD + half_index) * HALF_SIZE;
        Ok(read_u16(self.data, pos))
    }

    /// 32-bit field stored as two halves, low half first
    pub fn read32(&self, word_cursor: usize, half_index: usize) -> Result<u32, DecodeError> {
        let lo = self.read16(word_cursor, half_index)? as u32;
        let hi = self.read16(word_cursor, half_index + 1)? as u32;
        Ok(lo | (hi << 16))
    }

    /// Borrow `halves` halves starting at `half_index` as 32-bit bins
    ///
    /// An odd trailing half does not form a bin and is dropped.
    pub fn spectrum(
        &self,
        word_cursor: usize,
        half_index: usize,
        halves: usize,
    ) -> Result<Spectrum<'a>, DecodeError> {
        self.ensure_halves(word_cursor, half_index + halves)?;
        let start = (word_cursor * HALVES_PER_WORD + half_index) * HALF_SIZE;
        let bins = halves / HALVES_PER_WORD;
        Ok(Spectrum::new(&self.data[start..start + bins * WORD_SIZE]))
    }
}

/// Forward-only position in the capture, in words
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameCursor {
    word: usize,
}

impl FrameCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn word(&self) -> usize {
        self.word
    }

    pub fn byte_offset(&self) -> usize {
        self.word * WORD_SIZE
    }

    /// Move forward by `n_halves / 2` words
    ///
    /// Refuses to step past the end of `frame`; the error is reported at the
    /// record the cursor currently points to.
    pub fn advance(&mut self, frame: &WordFrame<'_>, n_halves: usize) -> Result<(), DecodeError> {
        let words = n_halves / HALVES_PER_WORD;
        frame.ensure_halves(self.word, words * HALVES_PER_WORD)?;
        self.word += words;
        Ok(())
    }
}

/// Read a u16 from data at given byte offset (Little-Endian)
#[inline]
fn read_u16(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

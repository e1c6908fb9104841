//! Position-tracking scanner over the cleaned input.
//!
//! All delimiters the parser scans for are ASCII, so byte positions stay on
//! UTF-8 boundaries as long as callers only advance through scan results.
//! Arbitrary `advance`/`rewind` can land mid-character; the extraction
//! helpers catch that and surface it as a fatal fault rather than slicing
//! blind.

use crate::error::ParseError;

/// Blank characters skipped between tag-internal tokens.
pub const BLANK_BYTES: &[u8] = b" \t\r\n";

/// A cursor over an input buffer: the byte position only moves through the
/// scan operations below and never shrinks the buffer.
#[derive(Debug)]
pub struct Cursor<'a> {
    buf: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// Wrap an input buffer, positioned at its start.
    #[must_use]
    pub fn new(buf: &'a str) -> Self {
        Cursor { buf, pos: 0 }
    }

    /// Current byte position, `0 <= pos <= buf.len()`.
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Whether the cursor has consumed the whole buffer.
    #[must_use]
    pub fn is_at_end(&self) -> bool {
        self.pos >= self.buf.len()
    }

    /// The character at the cursor, if any.
    #[must_use]
    pub fn current_char(&self) -> Option<char> {
        self.buf.get(self.pos..).and_then(|s| s.chars().next())
    }

    /// The byte at the cursor, if any.
    #[must_use]
    pub fn current_byte(&self) -> Option<u8> {
        self.buf.as_bytes().get(self.pos).copied()
    }

    /// The character starting at an arbitrary byte position, if any.
    #[must_use]
    pub fn char_at(&self, pos: usize) -> Option<char> {
        self.buf.get(pos..).and_then(|s| s.chars().next())
    }

    /// Move forward `n` bytes, clamped to the end of the buffer.
    pub fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.buf.len());
    }

    /// Move backward `n` bytes, clamped at 0.
    pub fn rewind(&mut self, n: usize) {
        self.pos = self.pos.saturating_sub(n);
    }

    /// Extract a range of the buffer.
    ///
    /// # Errors
    ///
    /// [`ParseError::Fatal`] when the range is out of bounds or not on
    /// character boundaries.
    fn slice(&self, start: usize, end: usize) -> Result<&'a str, ParseError> {
        self.buf
            .get(start..end)
            .ok_or_else(|| ParseError::Fatal(format!("corrupt extraction range {start}..{end}")))
    }

    /// Copy text up to (not including) the first byte in `delimiters`,
    /// leaving the cursor on the delimiter. With `escaped`, a delimiter
    /// preceded by a backslash does not terminate the scan and is kept in
    /// the copy.
    ///
    /// Running past the end of the buffer returns the remaining tail and
    /// leaves the position at the end; exhaustion is never an error.
    ///
    /// # Errors
    ///
    /// [`ParseError::Fatal`] on a corrupt extraction range.
    pub fn copy_until(&mut self, delimiters: &[u8], escaped: bool) -> Result<&'a str, ParseError> {
        let bytes = self.buf.as_bytes();
        let start = self.pos;
        let mut i = start;
        while i < bytes.len() {
            if delimiters.contains(&bytes[i]) && !(escaped && i > start && bytes[i - 1] == b'\\') {
                break;
            }
            i += 1;
        }
        self.pos = i;
        self.slice(start, i)
    }

    /// Speculatively extend a scan through the delimiter the cursor sits
    /// on: consume it and scan (escape-aware) to the next occurrence. When
    /// a next occurrence exists and the segment in between contains none of
    /// `disallowed`, return the consumed delimiter plus the segment with
    /// the cursor left on the next occurrence. Otherwise roll the cursor
    /// back and return `None`.
    ///
    /// Used for quoted attribute values containing stray quote characters:
    /// a candidate closing quote is only final when what follows it looks
    /// like tag syntax (`=` or `>`) rather than more value text.
    ///
    /// # Errors
    ///
    /// [`ParseError::Fatal`] on a corrupt extraction range.
    pub fn copy_until_unless(
        &mut self,
        delimiter: u8,
        disallowed: &[u8],
    ) -> Result<Option<String>, ParseError> {
        if self.current_byte() != Some(delimiter) {
            return Ok(None);
        }
        let origin = self.pos;
        self.advance(1);
        let segment = self.copy_until(&[delimiter], true)?;

        let reached_next = self.current_byte() == Some(delimiter);
        let clean = !segment.bytes().any(|b| disallowed.contains(&b));
        if reached_next && clean {
            let mut extension = String::with_capacity(segment.len() + 1);
            extension.push(delimiter as char);
            extension.push_str(segment);
            Ok(Some(extension))
        } else {
            self.pos = origin;
            Ok(None)
        }
    }

    /// Copy text up to the first case-insensitive occurrence of `literal`,
    /// leaving the cursor on the match (or at the end when there is none).
    ///
    /// # Errors
    ///
    /// [`ParseError::Fatal`] on a corrupt extraction range.
    pub fn copy_until_nocase(&mut self, literal: &str) -> Result<&'a str, ParseError> {
        let bytes = self.buf.as_bytes();
        let needle = literal.as_bytes();
        let start = self.pos;
        if needle.is_empty() {
            return self.slice(start, start);
        }
        let mut i = start;
        while i + needle.len() <= bytes.len() {
            if bytes[i..i + needle.len()].eq_ignore_ascii_case(needle) {
                self.pos = i;
                return self.slice(start, i);
            }
            i += 1;
        }
        self.pos = bytes.len();
        self.slice(start, bytes.len())
    }

    /// Skip bytes belonging to `chars`, returning how many were skipped.
    pub fn skip(&mut self, chars: &[u8]) -> usize {
        let bytes = self.buf.as_bytes();
        let start = self.pos;
        while self.pos < bytes.len() && chars.contains(&bytes[self.pos]) {
            self.pos += 1;
        }
        self.pos - start
    }
}

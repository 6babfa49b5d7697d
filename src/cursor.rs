//! Byte cursor for the hand-written scanners.
//!
//! Every construct of the dialect is delimited by ASCII bytes, so scanners
//! work on the UTF-8 bytes of a `&str` and only ever slice at positions next
//! to ASCII delimiters, which are always char boundaries.

use memchr::memchr;

/// A cursor for byte-by-byte scanning over a text.
///
/// # Example
/// ```
/// use hashmark::cursor::Cursor;
///
/// let mut cursor = Cursor::new("mailto:me@example.com");
/// assert!(cursor.eat_str_ignore_case("MAILTO:"));
/// assert_eq!(cursor.skip_while(|b| b != b'@'), 2);
/// assert_eq!(cursor.peek(), Some(b'@'));
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Cursor<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// Create a new cursor over a text.
    #[inline]
    pub fn new(input: &'a str) -> Self {
        Self {
            input: input.as_bytes(),
            pos: 0,
        }
    }

    /// Create a cursor starting at an offset.
    #[inline]
    pub fn new_at(input: &'a str, offset: usize) -> Self {
        debug_assert!(offset <= input.len());
        Self {
            input: input.as_bytes(),
            pos: offset,
        }
    }

    /// Current offset from the start of input.
    #[inline]
    pub fn offset(&self) -> usize {
        self.pos
    }

    /// Number of bytes remaining.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.input.len() - self.pos
    }

    /// Peek the current byte without advancing.
    #[inline]
    pub fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    /// Check if current position matches a byte.
    #[inline]
    pub fn at(&self, b: u8) -> bool {
        self.peek() == Some(b)
    }

    /// Check if the remaining input starts with `s`, ASCII case-insensitively.
    #[inline]
    pub fn at_str_ignore_case(&self, s: &str) -> bool {
        let s = s.as_bytes();
        self.remaining() >= s.len() && self.input[self.pos..self.pos + s.len()].eq_ignore_ascii_case(s)
    }

    /// Skip while predicate is true.
    #[inline]
    pub fn skip_while<F>(&mut self, mut predicate: F) -> usize
    where
        F: FnMut(u8) -> bool,
    {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if !predicate(b) {
                break;
            }
            self.pos += 1;
        }
        self.pos - start
    }

    /// Consume a specific byte if present.
    #[inline]
    pub fn eat(&mut self, b: u8) -> bool {
        if self.at(b) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Consume `s` ignoring ASCII case.
    #[inline]
    pub fn eat_str_ignore_case(&mut self, s: &str) -> bool {
        if self.at_str_ignore_case(s) {
            self.pos += s.len();
            true
        } else {
            false
        }
    }

    /// Offset of the next `\n` at or after the cursor, or the end of input.
    #[inline]
    pub fn line_end(&self) -> usize {
        line_end(self.input, self.pos)
    }
}

/// Offset of the next `\n` at or after `from`, or `input.len()`.
#[inline]
pub fn line_end(input: &[u8], from: usize) -> usize {
    memchr(b'\n', &input[from..]).map_or(input.len(), |i| from + i)
}

/// Whitespace as the dialect sees it (`\s`): space, tab, newline,
/// vertical tab, form feed and carriage return.
#[inline]
pub fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | 0x0B | 0x0C | b'\r')
}

/// Word byte (`\w`): ASCII letters, digits and underscore.
#[inline]
pub fn is_word(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

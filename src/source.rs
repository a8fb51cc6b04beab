//! The character source abstraction the tokenizer pulls from (§6.1).
//!
//! Mirrors the teacher's `Deb822::from_str` / `Deb822::read` / `Deb822::from_file`
//! trio: callers hand the crate a `&str`, anything implementing `std::io::Read`,
//! or a path, and the crate wraps it in a `CharSource` before tokenizing.

use std::io::Read;

/// A non-consuming lookahead of one character, or end of input.
pub trait CharSource {
    /// Look at the next character without consuming it.
    fn peek(&mut self) -> Option<char>;

    /// Consume and return the next character.
    fn read(&mut self) -> Option<char>;
}

/// A `CharSource` over an in-memory string.
pub struct StrSource<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
}

impl<'a> StrSource<'a> {
    pub fn new(input: &'a str) -> Self {
        StrSource {
            chars: input.chars().peekable(),
        }
    }
}

impl CharSource for StrSource<'_> {
    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn read(&mut self) -> Option<char> {
        self.chars.next()
    }
}

/// A `CharSource` over any `std::io::Read`, decoding UTF-8 eagerly.
///
/// The underlying reader is consumed into a string up front; this crate's
/// pull pipeline (tokenizer pulls characters, parser pulls tokens) operates
/// purely on the in-memory buffer from that point on.
pub struct ReadSource {
    inner: StrSourceOwned,
}

/// An owned variant of [`StrSource`] for sources that can't borrow from the
/// caller's stack frame (e.g. a buffer just read from a file).
struct StrSourceOwned {
    text: String,
    pos: usize,
}

impl ReadSource {
    pub fn new(mut reader: impl Read) -> std::io::Result<Self> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        Ok(ReadSource {
            inner: StrSourceOwned { text, pos: 0 },
        })
    }
}

impl CharSource for ReadSource {
    fn peek(&mut self) -> Option<char> {
        self.inner.text[self.inner.pos..].chars().next()
    }

    fn read(&mut self) -> Option<char> {
        let mut chars = self.inner.text[self.inner.pos..].chars();
        let c = chars.next()?;
        self.inner.pos += c.len_utf8();
        Some(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn str_source_peeks_without_consuming() {
        let mut src = StrSource::new("ab");
        assert_eq!(src.peek(), Some('a'));
        assert_eq!(src.peek(), Some('a'));
        assert_eq!(src.read(), Some('a'));
        assert_eq!(src.read(), Some('b'));
        assert_eq!(src.read(), None);
    }

    #[test]
    fn read_source_decodes_utf8() {
        let mut src = ReadSource::new("héllo".as_bytes()).unwrap();
        let mut out = String::new();
        while let Some(c) = src.read() {
            out.push(c);
        }
        assert_eq!(out, "héllo");
    }
}

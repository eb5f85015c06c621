//! # Stream
//!
//! Character-level access to an input text, with the line/column of
//! every character precomputed so that scanning can report positions
//! without rescanning the buffer.

use crate::location::{CharLocation, Location};
use std::path::Path;
use std::rc::Rc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_stream() {
        let string = "What a nice content,\nall in a single stream!";
        let origin = Path::new("somewhere");
        let mut stream = StringStream::new(origin, string);
        assert_eq!(stream.len(), string.chars().count());
        for chr in string.chars() {
            match stream.get() {
                Char::Char(c) => assert_eq!(chr, c),
                Char::EOF => {
                    panic!("Found EOF in stream, while expecting {}", chr)
                }
            }
            stream.incr_pos();
        }
        assert!(matches!(stream.get(), Char::EOF));
    }

    #[test]
    fn locations() {
        let stream = StringStream::new(Path::new("<input>"), "ab\ncd");
        assert_eq!(stream.loc_at(0), (0, 0));
        assert_eq!(stream.loc_at(2), (0, 2));
        assert_eq!(stream.loc_at(3), (1, 0));
        assert_eq!(stream.loc_at(4), (1, 1));
        // One past the last character: EOF location.
        assert_eq!(stream.loc_at(5), (1, 2));
        assert_eq!(
            stream.location(3, 5),
            Location::new(Path::new("<input>"), (1, 0), (1, 2))
        );
    }

    #[test]
    fn unicode() {
        let string = "До́брый день.";
        let mut stream = StringStream::new(Path::new("Russia"), string);
        for chr in string.chars() {
            match stream.get() {
                Char::Char(c) => assert_eq!(chr, c),
                Char::EOF => {
                    panic!("Found EOF in stream, while expecting {}", chr)
                }
            }
            stream.incr_pos();
        }
        assert_eq!(stream.slice(0, stream.len()), string);
    }
}

/// # Summary
///
/// A character, or `EOF`.
#[derive(Debug, Clone, Copy)]
pub enum Char {
    /// A character
    Char(char),
    /// End Of File
    EOF,
}

/// # Summary
///
/// A stream based on a string, considered as a file-like object.
/// Thus, a `StringStream` object requires an `origin`.
///
/// # Methods
///
/// `new`: build a `StringStream`.
/// `get`: the character at the current position, or `EOF`.
/// `incr_pos`: advance the current position by one character.
/// `loc_at`: the `(line, column)` of a character position.
/// `slice`: borrow the text between two character positions.
/// `location`: build a [`Location`] between two character positions.
pub struct StringStream {
    origin: Rc<Path>,
    stream: Rc<str>,
    // Per character: its (line, column). `bytes` additionally holds the
    // byte offset of every character plus one final end-of-text offset,
    // so slicing by character positions is O(1).
    spans: Vec<CharLocation>,
    bytes: Vec<usize>,
    pos: usize,
    eof: CharLocation,
}

impl StringStream {
    /// Build a new `StringStream`, based on its `origin` and on a given `string`.
    pub fn new(origin: impl Into<Rc<Path>>, string: impl Into<Rc<str>>) -> Self {
        let origin = origin.into();
        let string = string.into();
        let mut current_char = 0;
        let mut current_line = 0;
        let mut spans = Vec::new();
        let mut bytes = Vec::new();
        for (offset, chr) in string.char_indices() {
            spans.push((current_line, current_char));
            bytes.push(offset);
            if chr == '\n' {
                current_line += 1;
                current_char = 0;
            } else {
                current_char += 1;
            }
        }
        bytes.push(string.len());
        Self {
            origin,
            stream: string,
            spans,
            bytes,
            pos: 0,
            eof: (current_line, current_char),
        }
    }

    /// Return the origin file of the stream.
    pub fn origin(&self) -> Rc<Path> {
        self.origin.clone()
    }

    /// Return the length of the stream, in characters.
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    /// Return whether the stream is empty.
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Return the current position.
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Set the current position.
    pub fn set_pos(&mut self, pos: usize) {
        self.pos = pos;
    }

    /// Advance the current position by one character.
    pub fn incr_pos(&mut self) {
        self.pos += 1;
    }

    /// Get the character at the current position, or `EOF`.
    pub fn get(&self) -> Char {
        self.get_at(self.pos)
    }

    /// Get the character at the given position, or `EOF`.
    pub fn get_at(&self, pos: usize) -> Char {
        self.bytes
            .get(pos)
            .and_then(|&offset| self.stream[offset..].chars().next())
            .map_or(Char::EOF, Char::Char)
    }

    /// The `(line, column)` of the character at `pos`; one past the last
    /// character yields the end-of-file position.
    pub fn loc_at(&self, pos: usize) -> CharLocation {
        self.spans.get(pos).copied().unwrap_or(self.eof)
    }

    /// Borrow the text between two character positions, `start`
    /// inclusive and `end` exclusive.
    pub fn slice(&self, start: usize, end: usize) -> &str {
        &self.stream[self.bytes[start]..self.bytes[end]]
    }

    /// Build a [`Location`] between two character positions, `start`
    /// inclusive and `end` exclusive.
    pub fn location(&self, start: usize, end: usize) -> Location {
        Location::new(self.origin.clone(), self.loc_at(start), self.loc_at(end))
    }
}

impl std::fmt::Debug for StringStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.stream[self.bytes[self.pos]..].fmt(f)
    }
}

//! A module to handle byte sources for the parser.
//!
//! The parser never buffers a whole document. It asks its [`ByteSource`]
//! for one byte at a time, with a single byte of lookahead, keeping "where
//! the bytes come from" separate from "how they are tokenized".

use crate::error::{Error, Result};
use crate::names::is_whitespace;
use std::io::Read;

/// A uniform view over an arbitrary byte stream.
///
/// Implementations only need to support reading left-to-right with a
/// single byte of lookahead; the parser never backtracks further than
/// that.
pub trait ByteSource {
    /// Returns the next byte without consuming it, or `None` at EOF.
    fn peek(&mut self) -> Result<Option<u8>>;

    /// Consumes and returns the next byte, or `None` at EOF.
    fn advance(&mut self) -> Result<Option<u8>>;

    /// An opaque cursor, usable for error reporting. Not interpreted by
    /// the parser itself.
    fn position(&self) -> usize;

    /// Consumes and returns the next byte, failing with
    /// [`Error::PrematureEof`] if the source is already at EOF.
    ///
    /// Token readers call this once they know more input is required to
    /// complete a production (e.g. the closing quote of an attribute
    /// value), as opposed to `advance`, which is also used where EOF is a
    /// legitimate outcome (e.g. probing for the next phase).
    fn advance_required(&mut self) -> Result<u8> {
        self.advance()?.ok_or(Error::PrematureEof)
    }

    /// Consumes zero or more XML whitespace bytes (space, tab, CR, LF).
    fn skip_whitespace(&mut self) -> Result<()> {
        while let Some(b) = self.peek()? {
            if !is_whitespace(b) {
                break;
            }
            self.advance()?;
        }
        Ok(())
    }
}

/// A [`ByteSource`] backed by an in-memory byte slice.
#[derive(Debug, Clone)]
pub struct SliceSource<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> SliceSource<'a> {
    /// Wraps a byte slice for parsing.
    #[inline]
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }
}

impl<'a> ByteSource for SliceSource<'a> {
    #[inline]
    fn peek(&mut self) -> Result<Option<u8>> {
        Ok(self.buf.get(self.pos).copied())
    }

    #[inline]
    fn advance(&mut self) -> Result<Option<u8>> {
        match self.buf.get(self.pos).copied() {
            Some(b) => {
                self.pos += 1;
                Ok(Some(b))
            }
            None => Ok(None),
        }
    }

    #[inline]
    fn position(&self) -> usize {
        self.pos
    }
}

/// A [`ByteSource`] backed by any [`std::io::Read`], such as a file or a
/// socket, with a one-byte lookahead buffer.
pub struct ReaderSource<R> {
    reader: R,
    lookahead: Option<u8>,
    pos: usize,
}

impl<R: Read> ReaderSource<R> {
    /// Wraps a reader for parsing.
    #[inline]
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            lookahead: None,
            pos: 0,
        }
    }

    fn fill(&mut self) -> Result<Option<u8>> {
        if self.lookahead.is_none() {
            let mut byte = [0u8; 1];
            self.lookahead = match self.reader.read(&mut byte)? {
                0 => None,
                _ => Some(byte[0]),
            };
        }
        Ok(self.lookahead)
    }
}

impl<R: Read> ByteSource for ReaderSource<R> {
    #[inline]
    fn peek(&mut self) -> Result<Option<u8>> {
        self.fill()
    }

    fn advance(&mut self) -> Result<Option<u8>> {
        let byte = self.fill()?;
        if byte.is_some() {
            self.lookahead = None;
            self.pos += 1;
        }
        Ok(byte)
    }

    #[inline]
    fn position(&self) -> usize {
        self.pos
    }
}

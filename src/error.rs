//! Error management module

use std::fmt;
use std::io;

/// The error type produced by this crate.
///
/// `Aborted` deliberately has no variant here: cooperative abort is not a
/// failure, it is reported as a `bool` return from [`Parser::parse`] /
/// [`Parser::parse_continue`].
///
/// [`Parser::parse`]: crate::Parser::parse
/// [`Parser::parse_continue`]: crate::Parser::parse_continue
#[derive(Debug)]
pub enum Error {
    /// An error reading from the underlying byte source.
    Io(io::Error),
    /// Bytes that were expected to be UTF-8 text were not.
    Utf8(std::str::Utf8Error),
    /// Input ended while a token was incomplete, or while elements were
    /// still open.
    PrematureEof,
    /// An end-tag did not match the innermost open start-tag.
    TagMismatch {
        /// Name of the innermost open element.
        expected: String,
        /// Name actually found in the end-tag.
        found: String,
    },
    /// Lexically invalid input: bad name start, missing `=`/quotes in an
    /// attribute, a misplaced `<?xml?>`, stray text in the epilog, etc.
    Malformed(String),
}

/// A specialized `Result` type where the error is hard-wired to [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "I/O error: {}", err),
            Error::Utf8(err) => write!(f, "UTF-8 error: {}", err),
            Error::PrematureEof => write!(f, "premature end of input"),
            Error::TagMismatch { expected, found } => {
                write!(f, "expecting </{}> found </{}>", expected, found)
            }
            Error::Malformed(msg) => write!(f, "malformed xml: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Utf8(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    #[inline]
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<std::str::Utf8Error> for Error {
    #[inline]
    fn from(err: std::str::Utf8Error) -> Error {
        Error::Utf8(err)
    }
}

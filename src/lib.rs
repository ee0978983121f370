//! A streaming, event-driven (SAX-style) XML parser.
//!
//! Unlike a pull-based reader, [`Parser`] never hands back a borrowed
//! buffer to iterate over at your own pace: you install handlers for the
//! events you care about, hand it a [`ByteSource`], and it drives the
//! handlers as it reads. Handlers may cooperatively abort the parse by
//! returning [`ControlFlow::Break`]; the parser finishes the current token
//! to a clean boundary and returns `Ok(true)`, and the same logical stream
//! can be resumed later with [`Parser::parse_continue`], possibly with a
//! different set of handlers installed.
//!
//! ```
//! use std::cell::RefCell;
//! use std::ops::ControlFlow;
//! use std::rc::Rc;
//! use xmlsax::{Parser, SliceSource};
//!
//! let names = Rc::new(RefCell::new(Vec::new()));
//! let mut parser = Parser::new();
//! let handler_names = names.clone();
//! parser.on_start_tag(move |name, _attrs| {
//!     handler_names.borrow_mut().push(name.to_string());
//!     ControlFlow::Continue(())
//! });
//!
//! let mut source = SliceSource::new(b"<greeting>hello</greeting>");
//! let aborted = parser.parse(&mut source).unwrap();
//! assert!(!aborted);
//! assert_eq!(*names.borrow(), vec!["greeting".to_string()]);
//! ```
//!
//! No DOM is built and no namespace resolution is performed: this crate
//! narrows the Name production to ASCII and treats `<?xml ...?>` as an
//! ordinary processing instruction that happens to be restricted to the
//! very first token. See each module's documentation for the exact
//! productions recognized.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod attributes;
mod chars;
mod error;
mod names;
mod parser;
mod source;
mod tokens;

pub use attributes::{Attribute, AttributeIterator};
pub use chars::CharIterator;
pub use error::{Error, Result};
pub use parser::Parser;
pub use source::{ByteSource, ReaderSource, SliceSource};

//! The lazily-advancing attribute view handed to `startDocument` and
//! `startTag` handlers.
//!
//! Attributes are not pre-parsed into a container. Ordinarily an
//! [`AttributeIterator`] borrows the live [`ByteSource`] directly and pulls
//! one attribute at a time as the handler calls [`AttributeIterator::next_attribute`];
//! if the handler stops early (or aborts), the parser drains whatever is
//! left so the cursor lands exactly on the tag's `>` or `/>`.
//!
//! The root element is the one exception: `startDocument` and `startTag`
//! both receive an iterator over the *same* attributes, which a
//! single-pass live stream cannot hand out twice. For the root only, the
//! parser reads the attributes once into a small buffer and serves both
//! handlers from it.

use crate::error::Result;
use crate::names::is_name_start_char;
use crate::source::ByteSource;
use crate::tokens::{read_name, read_quoted_value};

/// A single attribute name/value pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// The attribute's name.
    pub name: String,
    /// The attribute's value, with quotes removed.
    pub value: String,
}

enum Backing<'a> {
    Live { source: &'a mut dyn ByteSource, done: bool },
    Buffered { items: &'a [Attribute], pos: usize },
}

/// A borrowed, forward-only view over a start-tag's attributes.
///
/// Valid only for the duration of the handler callback it was passed to.
pub struct AttributeIterator<'a> {
    backing: Backing<'a>,
}

impl<'a> AttributeIterator<'a> {
    pub(crate) fn live(source: &'a mut dyn ByteSource) -> Self {
        Self {
            backing: Backing::Live { source, done: false },
        }
    }

    pub(crate) fn buffered(items: &'a [Attribute]) -> Self {
        Self {
            backing: Backing::Buffered { items, pos: 0 },
        }
    }

    /// Returns the next attribute, or `None` once the tag's terminator
    /// (`>` or `/>`) has been reached.
    pub fn next_attribute(&mut self) -> Result<Option<Attribute>> {
        match &mut self.backing {
            Backing::Buffered { items, pos } => {
                if *pos < items.len() {
                    let attr = items[*pos].clone();
                    *pos += 1;
                    Ok(Some(attr))
                } else {
                    Ok(None)
                }
            }
            Backing::Live { source, done } => {
                if *done {
                    return Ok(None);
                }
                source.skip_whitespace()?;
                match source.peek()? {
                    Some(b'/') | Some(b'>') => {
                        *done = true;
                        Ok(None)
                    }
                    Some(b) if is_name_start_char(b) => {
                        let name = read_name(&mut **source)?;
                        source.skip_whitespace()?;
                        match source.advance()? {
                            Some(b'=') => {}
                            _ => {
                                return Err(crate::error::Error::Malformed(format!(
                                    "expected '=' after attribute name '{}'",
                                    name
                                )))
                            }
                        }
                        source.skip_whitespace()?;
                        let value = read_quoted_value(&mut **source)?;
                        Ok(Some(Attribute { name, value }))
                    }
                    Some(_) => Err(crate::error::Error::Malformed(
                        "invalid attribute syntax".into(),
                    )),
                    None => Err(crate::error::Error::PrematureEof),
                }
            }
        }
    }

    /// Consumes and discards any attributes the handler did not read,
    /// leaving the cursor positioned on the tag's terminator.
    pub(crate) fn drain_remaining(&mut self) -> Result<()> {
        while self.next_attribute()?.is_some() {}
        Ok(())
    }
}

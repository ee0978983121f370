//! The Prolog/Body/Epilog state machine.
//!
//! Drives the whole document: tracks which phase it's in, maintains an
//! element stack for well-formedness, and dispatches each `<` to the
//! right token reader, calling out to a push-callback handler registry
//! instead of handing back a pull-style event.

use crate::attributes::{Attribute, AttributeIterator};
use crate::chars::CharIterator;
use crate::error::{Error, Result};
use crate::names::is_name_start_char;
use crate::source::ByteSource;
use crate::tokens::{
    read_cdata_body, read_char_data, read_markup_decl_body, read_name, read_pi,
    skip_comment_body,
};
use std::ops::ControlFlow;

type StartDocumentFn = dyn FnMut(&str, &mut AttributeIterator<'_>) -> ControlFlow<()>;
type EndDocumentFn = dyn FnMut(&str) -> ControlFlow<()>;
type StartTagFn = dyn FnMut(&str, &mut AttributeIterator<'_>) -> ControlFlow<()>;
type EndTagFn = dyn FnMut(&str) -> ControlFlow<()>;
type CharactersFn = dyn FnMut(&mut CharIterator<'_>) -> ControlFlow<()>;
type ProcessingInstructionFn = dyn FnMut(&str, &str) -> ControlFlow<()>;
type ElementFn = dyn FnMut(&str, &str) -> ControlFlow<()>;

#[derive(Default)]
struct Handlers {
    start_document: Option<Box<StartDocumentFn>>,
    end_document: Option<Box<EndDocumentFn>>,
    start_tag: Option<Box<StartTagFn>>,
    end_tag: Option<Box<EndTagFn>>,
    characters: Option<Box<CharactersFn>>,
    processing_instruction: Option<Box<ProcessingInstructionFn>>,
    element: Option<Box<ElementFn>>,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Phase {
    Prolog,
    Body,
    Epilog,
}

/// State carried across an aborted `parse`/`parse_continue` pair. Discarded
/// whenever a fatal [`Error`] is returned, since resumption after a fatal
/// error is meaningless (spec §7).
struct ResumeState {
    phase: Phase,
    stack: Vec<String>,
    root_name: Option<String>,
    seen_first_token: bool,
}

impl ResumeState {
    fn new() -> Self {
        Self {
            phase: Phase::Prolog,
            stack: Vec::new(),
            root_name: None,
            seen_first_token: false,
        }
    }
}

/// A streaming, event-driven (SAX-style) XML parser.
///
/// `Parser` owns a handler registry and, between calls, any state needed to
/// resume a cooperatively aborted parse. It does not own a [`ByteSource`]:
/// one is passed to [`Parser::parse`] / [`Parser::parse_continue`] each
/// time, so the same source can be read incrementally and handlers can be
/// swapped out between an abort and its resume.
#[derive(Default)]
pub struct Parser {
    handlers: Handlers,
    state: Option<ResumeState>,
}

impl Parser {
    /// Creates a parser with no handlers installed. Unset handlers behave
    /// as no-ops; their events are still consumed from the input, just not
    /// reported.
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the `startDocument` handler: fired once, for the root
    /// element, before `startTag`.
    pub fn on_start_document<F>(&mut self, handler: F) -> &mut Self
    where
        F: FnMut(&str, &mut AttributeIterator<'_>) -> ControlFlow<()> + 'static,
    {
        self.handlers.start_document = Some(Box::new(handler));
        self
    }

    /// Installs the `endDocument` handler: fired once the root end-tag has
    /// been consumed.
    pub fn on_end_document<F>(&mut self, handler: F) -> &mut Self
    where
        F: FnMut(&str) -> ControlFlow<()> + 'static,
    {
        self.handlers.end_document = Some(Box::new(handler));
        self
    }

    /// Installs the `startTag` handler: fired for every element, including
    /// the root, with a lazy [`AttributeIterator`].
    pub fn on_start_tag<F>(&mut self, handler: F) -> &mut Self
    where
        F: FnMut(&str, &mut AttributeIterator<'_>) -> ControlFlow<()> + 'static,
    {
        self.handlers.start_tag = Some(Box::new(handler));
        self
    }

    /// Installs the `endTag` handler: fired for every element, including
    /// the root.
    pub fn on_end_tag<F>(&mut self, handler: F) -> &mut Self
    where
        F: FnMut(&str) -> ControlFlow<()> + 'static,
    {
        self.handlers.end_tag = Some(Box::new(handler));
        self
    }

    /// Installs the `characters` handler: fired for each run of text or
    /// CDATA content.
    pub fn on_characters<F>(&mut self, handler: F) -> &mut Self
    where
        F: FnMut(&mut CharIterator<'_>) -> ControlFlow<()> + 'static,
    {
        self.handlers.characters = Some(Box::new(handler));
        self
    }

    /// Installs the `processingInstruction` handler: fired with `(target,
    /// data)` for every PI, including `<?xml ...?>`.
    pub fn on_processing_instruction<F>(&mut self, handler: F) -> &mut Self
    where
        F: FnMut(&str, &str) -> ControlFlow<()> + 'static,
    {
        self.handlers.processing_instruction = Some(Box::new(handler));
        self
    }

    /// Installs the `element` handler: fired with `(keyword, body)` for
    /// markup declarations such as `<!DOCTYPE ...>` or `<!ELEMENT ...>`.
    pub fn on_element<F>(&mut self, handler: F) -> &mut Self
    where
        F: FnMut(&str, &str) -> ControlFlow<()> + 'static,
    {
        self.handlers.element = Some(Box::new(handler));
        self
    }

    /// Parses from the start of `source`. Returns `Ok(true)` if a handler
    /// cooperatively aborted the parse, `Ok(false)` if the document parsed
    /// to completion.
    pub fn parse(&mut self, source: &mut dyn ByteSource) -> Result<bool> {
        self.state = Some(ResumeState::new());
        self.run(source)
    }

    /// Resumes a parse previously stopped by an abort, continuing to read
    /// from `source` (which must be the same logical stream `parse` was
    /// reading from). Handlers may be replaced before calling this. Returns
    /// `Ok(false)` with no effect if there is no aborted parse to resume.
    pub fn parse_continue(&mut self, source: &mut dyn ByteSource) -> Result<bool> {
        if self.state.is_none() {
            return Ok(false);
        }
        self.run(source)
    }

    fn run(&mut self, source: &mut dyn ByteSource) -> Result<bool> {
        match self.drive(source) {
            Ok(aborted) => Ok(aborted),
            Err(e) => {
                // Fatal errors discard resumable state: resuming after
                // malformed input or a structural mismatch is meaningless.
                self.state = None;
                Err(e)
            }
        }
    }

    fn phase(&self) -> Phase {
        self.state.as_ref().expect("drive only runs with state set").phase
    }

    fn drive(&mut self, source: &mut dyn ByteSource) -> Result<bool> {
        loop {
            match self.phase() {
                Phase::Prolog | Phase::Epilog => {
                    let in_epilog = self.phase() == Phase::Epilog;
                    source.skip_whitespace()?;
                    match source.peek()? {
                        None if in_epilog => {
                            self.state = None;
                            return Ok(false);
                        }
                        None => return Err(Error::PrematureEof),
                        Some(b'<') => {
                            source.advance()?;
                            if self.handle_markup(source)?.is_break() {
                                return Ok(true);
                            }
                        }
                        Some(_) => {
                            return Err(Error::Malformed(if in_epilog {
                                "unexpected content after the root element".into()
                            } else {
                                "unexpected character data before the root element".into()
                            }))
                        }
                    }
                }
                Phase::Body => match source.peek()? {
                    None => return Err(Error::PrematureEof),
                    Some(b'<') => {
                        source.advance()?;
                        if self.handle_markup(source)?.is_break() {
                            return Ok(true);
                        }
                    }
                    Some(_) => {
                        let bytes = read_char_data(source)?;
                        let text =
                            String::from_utf8(bytes).map_err(|e| Error::Utf8(e.utf8_error()))?;
                        if let Some(handler) = self.handlers.characters.as_mut() {
                            let mut iter = CharIterator::new(&text);
                            if handler(&mut iter).is_break() {
                                return Ok(true);
                            }
                        }
                    }
                },
            }
        }
    }

    /// Dispatches on the byte immediately after a just-consumed `<`.
    fn handle_markup(&mut self, source: &mut dyn ByteSource) -> Result<ControlFlow<()>> {
        match source.peek()? {
            None => Err(Error::PrematureEof),
            Some(b'?') => {
                source.advance()?;
                self.handle_processing_instruction(source)
            }
            Some(b'!') => {
                source.advance()?;
                self.handle_bang(source)
            }
            Some(b'/') => {
                if self.phase() != Phase::Body {
                    return Err(Error::Malformed("end-tag not allowed here".into()));
                }
                source.advance()?;
                self.handle_end_tag(source)
            }
            Some(b) if is_name_start_char(b) => {
                if self.phase() == Phase::Epilog {
                    return Err(Error::Malformed(
                        "start-tag not allowed after the root element".into(),
                    ));
                }
                self.handle_start_tag(source)
            }
            Some(_) => Err(Error::Malformed("invalid character after '<'".into())),
        }
    }

    fn handle_processing_instruction(
        &mut self,
        source: &mut dyn ByteSource,
    ) -> Result<ControlFlow<()>> {
        let (target, body) = read_pi(source)?;
        let state = self.state.as_mut().expect("state set during drive");
        let is_xml_decl = target.eq_ignore_ascii_case("xml");
        if is_xml_decl && state.seen_first_token {
            return Err(Error::Malformed(
                "a <?xml ...?> declaration is only allowed as the very first token".into(),
            ));
        }
        state.seen_first_token = true;
        if let Some(handler) = self.handlers.processing_instruction.as_mut() {
            if handler(&target, &body).is_break() {
                return Ok(ControlFlow::Break(()));
            }
        }
        Ok(ControlFlow::Continue(()))
    }

    /// Dispatches after `<!` on comments, CDATA sections, and markup
    /// declarations.
    fn handle_bang(&mut self, source: &mut dyn ByteSource) -> Result<ControlFlow<()>> {
        match source.peek()? {
            Some(b'-') => {
                source.advance()?;
                let second = source.advance_required()?;
                if second != b'-' {
                    return Err(Error::Malformed("expected '--' to start a comment".into()));
                }
                skip_comment_body(source)?;
                self.state.as_mut().unwrap().seen_first_token = true;
                Ok(ControlFlow::Continue(()))
            }
            Some(b'[') => {
                if self.phase() != Phase::Body {
                    return Err(Error::Malformed(
                        "CDATA sections are only allowed in the document body".into(),
                    ));
                }
                source.advance()?;
                for expected in b"CDATA[" {
                    let got = source.advance_required()?;
                    if got != *expected {
                        return Err(Error::Malformed("malformed CDATA section".into()));
                    }
                }
                let text = read_cdata_body(source)?;
                self.state.as_mut().unwrap().seen_first_token = true;
                if let Some(handler) = self.handlers.characters.as_mut() {
                    let mut iter = CharIterator::new(&text);
                    if handler(&mut iter).is_break() {
                        return Ok(ControlFlow::Break(()));
                    }
                }
                Ok(ControlFlow::Continue(()))
            }
            Some(b) if is_name_start_char(b) => {
                if self.phase() == Phase::Epilog {
                    return Err(Error::Malformed(
                        "markup declarations are not allowed after the root element".into(),
                    ));
                }
                let keyword = read_name(source)?;
                let body = read_markup_decl_body(source)?;
                self.state.as_mut().unwrap().seen_first_token = true;
                if let Some(handler) = self.handlers.element.as_mut() {
                    if handler(&keyword, &body).is_break() {
                        return Ok(ControlFlow::Break(()));
                    }
                }
                Ok(ControlFlow::Continue(()))
            }
            None => Err(Error::PrematureEof),
            Some(_) => Err(Error::Malformed("invalid markup declaration".into())),
        }
    }

    fn handle_end_tag(&mut self, source: &mut dyn ByteSource) -> Result<ControlFlow<()>> {
        let name = read_name(source)?;
        source.skip_whitespace()?;
        let terminator = source.advance_required()?;
        if terminator != b'>' {
            return Err(Error::Malformed("expected '>' to close end-tag".into()));
        }
        self.finish_end_tag(name)
    }

    fn finish_end_tag(&mut self, name: String) -> Result<ControlFlow<()>> {
        let state = self.state.as_mut().expect("state set during drive");
        state.seen_first_token = true;
        let expected = state.stack.pop().ok_or_else(|| Error::TagMismatch {
            expected: String::new(),
            found: name.clone(),
        })?;
        if expected != name {
            return Err(Error::TagMismatch { expected, found: name });
        }
        let root_closed = state.stack.is_empty();
        if root_closed {
            state.phase = Phase::Epilog;
        }

        if let Some(handler) = self.handlers.end_tag.as_mut() {
            if handler(&name).is_break() {
                return Ok(ControlFlow::Break(()));
            }
        }

        if root_closed {
            let root_name = self
                .state
                .as_ref()
                .unwrap()
                .root_name
                .clone()
                .unwrap_or(name);
            if let Some(handler) = self.handlers.end_document.as_mut() {
                if handler(&root_name).is_break() {
                    return Ok(ControlFlow::Break(()));
                }
            }
        }
        Ok(ControlFlow::Continue(()))
    }

    fn handle_start_tag(&mut self, source: &mut dyn ByteSource) -> Result<ControlFlow<()>> {
        let name = read_name(source)?;
        let is_root = self.phase() == Phase::Prolog;
        self.state.as_mut().unwrap().seen_first_token = true;

        if is_root {
            let mut attrs = Vec::new();
            {
                let mut iter = AttributeIterator::live(source);
                while let Some(attr) = iter.next_attribute()? {
                    attrs.push(attr);
                }
            }
            let self_closing = consume_tag_terminator(source)?;
            self.finish_root_start(name, attrs, self_closing)
        } else {
            let mut aborted = false;
            {
                let mut iter = AttributeIterator::live(source);
                if let Some(handler) = self.handlers.start_tag.as_mut() {
                    if handler(&name, &mut iter).is_break() {
                        aborted = true;
                    }
                }
                iter.drain_remaining()?;
            }
            let self_closing = consume_tag_terminator(source)?;
            if !self_closing {
                self.state.as_mut().unwrap().stack.push(name.clone());
            }
            if aborted {
                return Ok(ControlFlow::Break(()));
            }
            if self_closing {
                if let Some(handler) = self.handlers.end_tag.as_mut() {
                    if handler(&name).is_break() {
                        return Ok(ControlFlow::Break(()));
                    }
                }
            }
            Ok(ControlFlow::Continue(()))
        }
    }

    fn finish_root_start(
        &mut self,
        name: String,
        attrs: Vec<Attribute>,
        self_closing: bool,
    ) -> Result<ControlFlow<()>> {
        {
            let state = self.state.as_mut().unwrap();
            state.root_name = Some(name.clone());
            if self_closing {
                // The element stack and phase already reflect the document's
                // true state here (closed, nothing left to resume into), so
                // an abort from either handler below still leaves a
                // `parse_continue` able to see a finished document instead
                // of spuriously expecting more body content.
                state.phase = Phase::Epilog;
            } else {
                state.stack.push(name.clone());
                state.phase = Phase::Body;
            }
        }

        let mut aborted = false;
        if let Some(handler) = self.handlers.start_document.as_mut() {
            let mut iter = AttributeIterator::buffered(&attrs);
            if handler(&name, &mut iter).is_break() {
                aborted = true;
            }
        }
        if !aborted {
            if let Some(handler) = self.handlers.start_tag.as_mut() {
                let mut iter = AttributeIterator::buffered(&attrs);
                if handler(&name, &mut iter).is_break() {
                    aborted = true;
                }
            }
        }
        if aborted {
            return Ok(ControlFlow::Break(()));
        }

        if self_closing {
            if let Some(handler) = self.handlers.end_tag.as_mut() {
                if handler(&name).is_break() {
                    return Ok(ControlFlow::Break(()));
                }
            }
            if let Some(handler) = self.handlers.end_document.as_mut() {
                if handler(&name).is_break() {
                    return Ok(ControlFlow::Break(()));
                }
            }
        }
        Ok(ControlFlow::Continue(()))
    }
}

/// Consumes a tag's terminator, `>` or `/>`, once attributes have been
/// drained. Returns whether the tag was self-closing.
fn consume_tag_terminator(source: &mut dyn ByteSource) -> Result<bool> {
    match source.advance_required()? {
        b'/' => {
            let next = source.advance_required()?;
            if next != b'>' {
                return Err(Error::Malformed("expected '>' after '/'".into()));
            }
            Ok(true)
        }
        b'>' => Ok(false),
        _ => Err(Error::Malformed("expected '>' or '/>' to close the tag".into())),
    }
}

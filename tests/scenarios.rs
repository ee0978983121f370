//! End-to-end tests (A-H) covering well-formed parsing, the fatal error
//! kinds, malformed names, abort/resume with attribute capture, CDATA
//! boundary greediness, PI/markup-declaration events, and a misplaced
//! XML declaration.

use pretty_assertions::assert_eq;
use std::cell::RefCell;
use std::ops::ControlFlow;
use std::rc::Rc;
use xmlsax::{Error, Parser, SliceSource};

fn recorder() -> (Rc<RefCell<Vec<String>>>, Rc<RefCell<Vec<String>>>) {
    let log = Rc::new(RefCell::new(Vec::new()));
    (log.clone(), log)
}

/// A. Well-formed simple: `<root></root>  ` produces exactly
/// startDocument, startTag, endTag, endDocument, and does not abort.
#[test]
fn scenario_a_well_formed_simple() {
    let (log, log2) = recorder();
    let mut parser = Parser::new();
    {
        let log = log.clone();
        parser.on_start_document(move |name, _| {
            log.borrow_mut().push(format!("startDocument({name})"));
            ControlFlow::Continue(())
        });
    }
    {
        let log = log.clone();
        parser.on_start_tag(move |name, _| {
            log.borrow_mut().push(format!("startTag({name})"));
            ControlFlow::Continue(())
        });
    }
    {
        let log = log.clone();
        parser.on_end_tag(move |name| {
            log.borrow_mut().push(format!("endTag({name})"));
            ControlFlow::Continue(())
        });
    }
    parser.on_end_document(move |name| {
        log.borrow_mut().push(format!("endDocument({name})"));
        ControlFlow::Continue(())
    });

    let mut source = SliceSource::new(b"<root></root>  ");
    let aborted = parser.parse(&mut source).unwrap();

    assert_eq!(aborted, false);
    assert_eq!(
        *log2.borrow(),
        vec![
            "startDocument(root)".to_string(),
            "startTag(root)".to_string(),
            "endTag(root)".to_string(),
            "endDocument(root)".to_string(),
        ]
    );
}

/// B. Premature EOF: `<root>` ends with the element stack non-empty.
#[test]
fn scenario_b_premature_eof() {
    let mut parser = Parser::new();
    let mut source = SliceSource::new(b"<root>");
    let err = parser.parse(&mut source).unwrap_err();
    assert!(matches!(err, Error::PrematureEof));
}

/// C. Tag mismatch: `<root></ruut>` names both the expected and found tag.
#[test]
fn scenario_c_tag_mismatch() {
    let mut parser = Parser::new();
    let mut source = SliceSource::new(b"<root></ruut>");
    let err = parser.parse(&mut source).unwrap_err();
    match err {
        Error::TagMismatch { expected, found } => {
            assert_eq!(expected, "root");
            assert_eq!(found, "ruut");
        }
        other => panic!("expected TagMismatch, got {other:?}"),
    }
}

/// D. Malformed name: `<root><0sub></0sub></root>` rejects the
/// digit-leading name instead of treating it as ordinary well-formed XML.
#[test]
fn scenario_d_malformed_name() {
    let mut parser = Parser::new();
    let mut source = SliceSource::new(b"<root><0sub></0sub></root>");
    let err = parser.parse(&mut source).unwrap_err();
    assert!(matches!(err, Error::Malformed(_)));
}

/// E. Two-step abort and resume. Pass 1 aborts from `startTag("tagdef")`
/// after reading one attribute; pass 2, installed after pass 1 returns,
/// aborts from `endTag("superTag")` having accumulated the sibling's text.
#[test]
fn scenario_e_two_step_abort_and_resume() {
    const DOCUMENT: &[u8] = b"
<root>
  <tagdef tagName='superTag' other='x' />
  <otherTag>irrelevant text</otherTag>
  <superTag>this is the answer</superTag>
  <tag2>bah</tag2>
</root>
";

    let captured_name = Rc::new(RefCell::new(String::new()));
    let mut parser = Parser::new();
    {
        let captured_name = captured_name.clone();
        parser.on_start_tag(move |name, attrs| {
            if name == "tagdef" {
                while let Ok(Some(attr)) = attrs.next_attribute() {
                    if attr.name == "tagName" {
                        *captured_name.borrow_mut() = attr.value.clone();
                        break;
                    }
                }
                return ControlFlow::Break(());
            }
            ControlFlow::Continue(())
        });
    }

    let mut source = SliceSource::new(DOCUMENT);
    let aborted = parser.parse(&mut source).unwrap();
    assert_eq!(aborted, true);
    assert_eq!(*captured_name.borrow(), "superTag");

    let target_open = Rc::new(RefCell::new(false));
    let accumulated = Rc::new(RefCell::new(String::new()));
    {
        let target_open = target_open.clone();
        parser.on_start_tag(move |name, _| {
            if name == "superTag" {
                *target_open.borrow_mut() = true;
            }
            ControlFlow::Continue(())
        });
    }
    {
        let target_open = target_open.clone();
        let accumulated = accumulated.clone();
        parser.on_characters(move |chars| {
            if *target_open.borrow() {
                accumulated.borrow_mut().push_str(chars.text());
            }
            ControlFlow::Continue(())
        });
    }
    parser.on_end_tag(move |name| {
        if name == "superTag" {
            return ControlFlow::Break(());
        }
        ControlFlow::Continue(())
    });

    let aborted_again = parser.parse_continue(&mut source).unwrap();
    assert_eq!(aborted_again, true);
    assert_eq!(*accumulated.borrow(), "this is the answer");
}

/// F. CDATA boundaries: the concatenated `characters` payload across a
/// CDATA section and a later text run reproduces the document's literal
/// text content, with the CDATA terminator detected greedily.
#[test]
fn scenario_f_cdata_boundaries() {
    let (log, log2) = recorder();
    let mut parser = Parser::new();
    parser.on_characters(move |chars| {
        log.borrow_mut().push(chars.text().to_string());
        ControlFlow::Continue(())
    });

    let document =
        b"<root><tagsafada3><![CDATA[ai [[didi]]]]></tagsafada3><tag3>depois</tag3></root>";
    let mut source = SliceSource::new(document);
    let aborted = parser.parse(&mut source).unwrap();

    assert_eq!(aborted, false);
    assert_eq!(log2.borrow().concat(), "ai [[didi]]depois");
}

/// G. Processing instructions and markup declarations each fire their own
/// event, target/keyword already split from body text.
#[test]
fn scenario_g_pi_and_markup_declarations() {
    let pis = Rc::new(RefCell::new(Vec::new()));
    let elements = Rc::new(RefCell::new(Vec::new()));

    let mut parser = Parser::new();
    {
        let pis = pis.clone();
        parser.on_processing_instruction(move |target, data| {
            pis.borrow_mut().push((target.to_string(), data.to_string()));
            ControlFlow::Continue(())
        });
    }
    {
        let elements = elements.clone();
        parser.on_element(move |keyword, body| {
            elements.borrow_mut().push((keyword.to_string(), body.to_string()));
            ControlFlow::Continue(())
        });
    }

    let document = b"<?xml encoding=\"ISO-8859-1\"?><!DOCTYPE greeting SYSTEM \"hello.dtd\"><root><!ELEMENT br EMPTY><!NOTATION usdruvs PUBLIC argh></root>";
    let mut source = SliceSource::new(document);
    let aborted = parser.parse(&mut source).unwrap();

    assert_eq!(aborted, false);
    assert_eq!(
        *pis.borrow(),
        vec![("xml".to_string(), "encoding=\"ISO-8859-1\"".to_string())]
    );
    assert_eq!(
        *elements.borrow(),
        vec![
            ("DOCTYPE".to_string(), "greeting SYSTEM \"hello.dtd\"".to_string()),
            ("ELEMENT".to_string(), "br EMPTY".to_string()),
            ("NOTATION".to_string(), "usdruvs PUBLIC argh".to_string()),
        ]
    );
}

/// H. XML declaration misplaced: `<?xml version="1.0"?>` appearing after
/// the first child rather than as the document's first token is malformed.
#[test]
fn scenario_h_xml_declaration_misplaced() {
    let mut parser = Parser::new();
    let mut source = SliceSource::new(b"<root><sub></sub><?xml version=\"1.0\"?></root>");
    let err = parser.parse(&mut source).unwrap_err();
    assert!(matches!(err, Error::Malformed(_)));
}

/// A `<?xml ...?>` declaration appearing first, as it ordinarily does, is
/// just a processing instruction like any other.
#[test]
fn xml_declaration_as_first_token_is_well_formed() {
    let mut parser = Parser::new();
    let mut source = SliceSource::new(b"<?xml version=\"1.0\" encoding=\"UTF-8\"?><root/>");
    let aborted = parser.parse(&mut source).unwrap();
    assert_eq!(aborted, false);
}

/// A fatal error discards resumable state: calling `parse_continue` after
/// one returns `Ok(false)` without attempting to read further.
#[test]
fn parse_continue_after_fatal_error_is_a_no_op() {
    let mut parser = Parser::new();
    let mut source = SliceSource::new(b"<a></b>");
    assert!(parser.parse(&mut source).is_err());
    assert_eq!(parser.parse_continue(&mut source).unwrap(), false);
}

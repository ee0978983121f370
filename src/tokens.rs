//! Token readers: one per lexical production, each consuming from a
//! [`ByteSource`] until its terminator and materializing a string.
//!
//! The CDATA and comment readers track trailing `]`/`-` runs
//! (`Seen0`/`Seen1`/`Seen2`) so their terminators (`]]>`, `-->`) are
//! detected greedily one byte at a time, without backtracking.

use crate::error::{Error, Result};
use crate::names::{is_name_char, is_name_start_char};
use crate::source::ByteSource;

/// Reads a Name production: a NameStartChar followed by zero or more
/// NameChars. Fails with [`Error::Malformed`] if the next byte cannot
/// start a name (e.g. a digit, per spec scenario D: `<0sub>`).
pub(crate) fn read_name(source: &mut dyn ByteSource) -> Result<String> {
    let mut name = String::new();
    match source.peek()? {
        Some(b) if is_name_start_char(b) => {
            name.push(b as char);
            source.advance()?;
        }
        Some(b) => {
            return Err(Error::Malformed(format!(
                "name must start with a letter, '_', or ':', found '{}'",
                b as char
            )))
        }
        None => return Err(Error::PrematureEof),
    }
    while let Some(b) = source.peek()? {
        if !is_name_char(b) {
            break;
        }
        name.push(b as char);
        source.advance()?;
    }
    Ok(name)
}

/// Reads a quoted attribute value: `'...'` or `"..."`. The other kind of
/// quote is literal inside the value.
pub(crate) fn read_quoted_value(source: &mut dyn ByteSource) -> Result<String> {
    let quote = match source.advance()? {
        Some(b @ (b'\'' | b'"')) => b,
        Some(_) => {
            return Err(Error::Malformed(
                "attribute value must start with a quote".into(),
            ))
        }
        None => return Err(Error::PrematureEof),
    };
    let mut buf = Vec::new();
    loop {
        let b = source.advance_required()?;
        if b == quote {
            break;
        }
        buf.push(b);
    }
    String::from_utf8(buf).map_err(|e| Error::Utf8(e.utf8_error()))
}

/// Reads a run of character data up to (but excluding) the next `<` or EOF.
pub(crate) fn read_char_data(source: &mut dyn ByteSource) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    while let Some(b) = source.peek()? {
        if b == b'<' {
            break;
        }
        buf.push(b);
        source.advance()?;
    }
    Ok(buf)
}

/// Reads a CDATA section body, assuming `<![CDATA[` has already been
/// consumed. Terminates on the first `]]>`, which is detected greedily:
/// a run of more than two `]` before the closing `>` leaves the extra
/// `]` characters as content (spec §4.3, `]]]>` emits one `]`).
pub(crate) fn read_cdata_body(source: &mut dyn ByteSource) -> Result<String> {
    let mut buf: Vec<u8> = Vec::new();
    let mut trailing_brackets = 0u32;
    loop {
        let b = source.advance_required()?;
        if b == b'>' && trailing_brackets >= 2 {
            buf.truncate(buf.len() - 2);
            break;
        }
        buf.push(b);
        trailing_brackets = if b == b']' { trailing_brackets + 1 } else { 0 };
    }
    String::from_utf8(buf).map_err(|e| Error::Utf8(e.utf8_error()))
}

/// Consumes a comment body, assuming `<!--` has already been consumed.
/// Terminates on the first `-->`. No content is materialized: comments
/// produce no event (spec §4.3), and `--` inside the body is permitted.
pub(crate) fn skip_comment_body(source: &mut dyn ByteSource) -> Result<()> {
    let mut trailing_dashes = 0u32;
    loop {
        let b = source.advance_required()?;
        if b == b'>' && trailing_dashes >= 2 {
            return Ok(());
        }
        trailing_dashes = if b == b'-' { trailing_dashes + 1 } else { 0 };
    }
}

/// Reads a processing instruction's target and body, assuming `<?` has
/// already been consumed. Returns `(target, body)`, where `body` excludes
/// the single whitespace separator between target and data.
pub(crate) fn read_pi(source: &mut dyn ByteSource) -> Result<(String, String)> {
    let target = read_name(source)?;
    source.skip_whitespace()?;
    let mut buf: Vec<u8> = Vec::new();
    let mut saw_question = false;
    loop {
        let b = source.advance_required()?;
        if b == b'>' && saw_question {
            buf.pop();
            break;
        }
        buf.push(b);
        saw_question = b == b'?';
    }
    let body = String::from_utf8(buf).map_err(|e| Error::Utf8(e.utf8_error()))?;
    Ok((target, body))
}

/// Reads a markup declaration body, assuming `<!` and the keyword Name
/// have already been consumed. Reads through the matching top-level `>`,
/// tracking nested `[ ... ]` (for internal DTD subsets) and quoted
/// sections so an embedded `>` does not terminate the declaration early.
/// Returns the trimmed body text.
pub(crate) fn read_markup_decl_body(source: &mut dyn ByteSource) -> Result<String> {
    let mut buf: Vec<u8> = Vec::new();
    let mut depth: i32 = 0;
    let mut quote: Option<u8> = None;
    loop {
        let b = source.advance_required()?;
        if let Some(q) = quote {
            buf.push(b);
            if b == q {
                quote = None;
            }
            continue;
        }
        match b {
            b'\'' | b'"' => {
                quote = Some(b);
                buf.push(b);
            }
            b'[' => {
                depth += 1;
                buf.push(b);
            }
            b']' => {
                depth -= 1;
                buf.push(b);
            }
            b'>' if depth <= 0 => break,
            _ => buf.push(b),
        }
    }
    let text = String::from_utf8(buf).map_err(|e| Error::Utf8(e.utf8_error()))?;
    Ok(text.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SliceSource;
    use pretty_assertions::assert_eq;

    fn src(bytes: &[u8]) -> SliceSource<'_> {
        SliceSource::new(bytes)
    }

    #[test]
    fn name_rejects_digit_start() {
        let mut s = src(b"0sub>");
        assert!(matches!(read_name(&mut s), Err(Error::Malformed(_))));
    }

    #[test]
    fn name_reads_until_non_name_char() {
        let mut s = src(b"tag-name.v2 rest");
        assert_eq!(read_name(&mut s).unwrap(), "tag-name.v2");
        assert_eq!(s.peek().unwrap(), Some(b' '));
    }

    #[test]
    fn cdata_body_greedy_terminator() {
        // `ai [[didi]]]]>` terminates at the *last* two brackets before `>`,
        // leaving the earlier two brackets as content (spec §4.3 / §8 scenario F).
        let mut s = src(b"ai [[didi]]]]>rest");
        assert_eq!(read_cdata_body(&mut s).unwrap(), "ai [[didi]]");
        assert_eq!(s.peek().unwrap(), Some(b'r'));
    }

    #[test]
    fn cdata_single_bracket_run_emits_one_bracket() {
        let mut s = src(b"x]]]>y");
        assert_eq!(read_cdata_body(&mut s).unwrap(), "x]");
    }

    #[test]
    fn comment_body_permits_double_dash() {
        let mut s = src(b"comment with -- inside-->rest");
        skip_comment_body(&mut s).unwrap();
        assert_eq!(s.peek().unwrap(), Some(b'r'));
    }

    #[test]
    fn pi_splits_target_and_body() {
        let mut s = src(b"xml encoding=\"ISO-8859-1\"?>rest");
        let (target, body) = read_pi(&mut s).unwrap();
        assert_eq!(target, "xml");
        assert_eq!(body, "encoding=\"ISO-8859-1\"");
        assert_eq!(s.peek().unwrap(), Some(b'r'));
    }

    #[test]
    fn pi_with_no_body() {
        let mut s = src(b"target?>rest");
        let (target, body) = read_pi(&mut s).unwrap();
        assert_eq!(target, "target");
        assert_eq!(body, "");
    }

    #[test]
    fn markup_decl_body_trims_and_respects_brackets() {
        let mut s = src(b" greeting SYSTEM \"hello.dtd\">rest");
        assert_eq!(
            read_markup_decl_body(&mut s).unwrap(),
            "greeting SYSTEM \"hello.dtd\""
        );
        assert_eq!(s.peek().unwrap(), Some(b'r'));
    }

    #[test]
    fn markup_decl_body_with_internal_subset() {
        let mut s = src(b" name [<!ENTITY gt '>'>]>rest");
        assert_eq!(
            read_markup_decl_body(&mut s).unwrap(),
            "name [<!ENTITY gt '>'>]"
        );
        assert_eq!(s.peek().unwrap(), Some(b'r'));
    }
}

//! Output sink: length tracking, conditional newlines and raw-tag stripping.

use nom::{
    branch::alt,
    bytes::complete::{tag, tag_no_case, take_until, take_while, take_while1},
    character::complete::{char, none_of, satisfy},
    combinator::{opt, recognize},
    multi::many0,
    sequence::{pair, preceded, tuple},
    IResult,
};
use std::borrow::Cow;
use std::io::{self, Write};

/// Per-session writer state.
///
/// The sink does not own the destination: the main body and the
/// table-of-contents side buffer are different writers that share one set
/// of counters.
#[derive(Debug, Default)]
pub struct OutputSink {
    last_output_len: usize,
    tag_suppression: usize,
}

impl OutputSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `s`, remembering its length. While tag suppression is active,
    /// anything matching the raw HTML tag grammar is removed first.
    pub fn write(&mut self, w: &mut dyn Write, s: &str) -> io::Result<()> {
        self.last_output_len = s.len();
        if self.tag_suppression > 0 {
            w.write_all(strip_html_tags(s).as_bytes())
        } else {
            w.write_all(s.as_bytes())
        }
    }

    /// Write an opening tag `name` (e.g. `"<a"`) with space-separated attributes.
    pub fn write_tag(&mut self, w: &mut dyn Write, name: &str, attrs: &[String]) -> io::Result<()> {
        let mut s = String::with_capacity(name.len() + 1 + attrs.iter().map(|a| a.len() + 1).sum::<usize>());
        s.push_str(name);
        for attr in attrs {
            s.push(' ');
            s.push_str(attr);
        }
        s.push('>');
        self.write(w, &s)?;
        self.last_output_len = 1;
        Ok(())
    }

    /// Write `\n` unless the previous write was empty.
    pub fn cr(&mut self, w: &mut dyn Write) -> io::Result<()> {
        if self.last_output_len > 0 {
            self.write(w, "\n")?;
        }
        Ok(())
    }

    pub fn last_output_len(&self) -> usize {
        self.last_output_len
    }

    pub fn set_last_output_len(&mut self, len: usize) {
        self.last_output_len = len;
    }

    /// Enter a region (image alt text) where raw tags are stripped.
    pub fn suppress_tags(&mut self) {
        self.tag_suppression += 1;
    }

    /// Leave a region entered with [`OutputSink::suppress_tags`].
    pub fn restore_tags(&mut self) {
        self.tag_suppression = self.tag_suppression.saturating_sub(1);
    }

    pub fn tag_suppression(&self) -> usize {
        self.tag_suppression
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Remove every substring that matches the raw HTML tag grammar: open and
/// close tags, comments, processing instructions, declarations and CDATA.
///
/// Constructs whose terminator no longer occurs ahead are not attempted, so
/// the scan stays linear in the input length.
pub fn strip_html_tags(s: &str) -> Cow<'_, str> {
    if !s.contains('<') {
        return Cow::Borrowed(s);
    }

    let mut gt = NextOccurrence::new(s, ">");
    let mut pi_end = NextOccurrence::new(s, "?>");
    let mut newline = NextOccurrence::new(s, "\n");
    let mut cdata_end = NextOccurrence::new(s, "]]>");

    let mut out = String::with_capacity(s.len());
    let mut pos = 0;
    while let Some(offset) = s[pos..].find('<') {
        let lt = pos + offset;
        out.push_str(&s[pos..lt]);
        pos = lt;
        if gt.at_or_after(lt).is_none() {
            break;
        }

        let rest = &s[lt..];
        let attempt = if rest.starts_with("<?") {
            match pi_end.at_or_after(lt + 2) {
                Some(end) => newline.at_or_after(lt + 2).map_or(true, |nl| nl > end),
                None => false,
            }
        } else if rest.get(..9).map_or(false, |p| p.eq_ignore_ascii_case("<![CDATA[")) {
            cdata_end.at_or_after(lt + 9).is_some()
        } else {
            true
        };

        match attempt.then(|| html_tag(rest)) {
            Some(Ok((after, _))) => pos = s.len() - after.len(),
            _ => {
                out.push('<');
                pos = lt + 1;
            }
        }
    }
    out.push_str(&s[pos..]);
    Cow::Owned(out)
}

/// Position of the next `needle` at or after a forward-moving offset.
struct NextOccurrence<'a> {
    haystack: &'a str,
    needle: &'static str,
    found: Option<Option<usize>>,
}

impl<'a> NextOccurrence<'a> {
    fn new(haystack: &'a str, needle: &'static str) -> Self {
        Self {
            haystack,
            needle,
            found: None,
        }
    }

    /// Offsets passed in must never decrease.
    fn at_or_after(&mut self, from: usize) -> Option<usize> {
        match self.found {
            Some(None) => return None,
            Some(Some(at)) if at >= from => return Some(at),
            _ => {}
        }
        let at = self
            .haystack
            .get(from..)
            .and_then(|t| t.find(self.needle))
            .map(|i| from + i);
        self.found = Some(at);
        at
    }
}

/// Match one raw HTML construct at the start of `input`.
pub fn html_tag(input: &str) -> IResult<&str, &str> {
    alt((
        open_tag,
        close_tag,
        comment,
        processing_instruction,
        declaration,
        cdata,
    ))(input)
}

fn is_html_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0c')
}

fn space0(input: &str) -> IResult<&str, &str> {
    take_while(is_html_space)(input)
}

fn space1(input: &str) -> IResult<&str, &str> {
    take_while1(is_html_space)(input)
}

fn tag_name(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        satisfy(|c| c.is_ascii_alphabetic()),
        take_while(|c: char| c.is_ascii_alphanumeric() || c == '-'),
    ))(input)
}

fn attribute_name(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        satisfy(|c| c.is_ascii_alphabetic() || c == '_' || c == ':'),
        take_while(|c: char| c.is_ascii_alphanumeric() || matches!(c, ':' | '.' | '_' | '-')),
    ))(input)
}

fn attribute_value(input: &str) -> IResult<&str, &str> {
    alt((
        take_while1(|c: char| !matches!(c, '"' | '\'' | '=' | '<' | '>' | '`') && c > ' '),
        recognize(tuple((char('\''), take_while(|c| c != '\''), char('\'')))),
        recognize(tuple((char('"'), take_while(|c| c != '"'), char('"')))),
    ))(input)
}

fn attribute(input: &str) -> IResult<&str, &str> {
    recognize(tuple((
        space1,
        attribute_name,
        opt(tuple((space0, char('='), space0, attribute_value))),
    )))(input)
}

fn open_tag(input: &str) -> IResult<&str, &str> {
    recognize(tuple((
        char('<'),
        tag_name,
        many0(attribute),
        space0,
        opt(char('/')),
        char('>'),
    )))(input)
}

fn close_tag(input: &str) -> IResult<&str, &str> {
    recognize(tuple((tag("</"), tag_name, space0, char('>'))))(input)
}

fn comment(input: &str) -> IResult<&str, &str> {
    alt((
        tag("<!---->"),
        recognize(tuple((
            tag("<!--"),
            opt(char('-')),
            none_of(">-"),
            many0(pair(opt(char('-')), none_of("-"))),
            tag("-->"),
        ))),
    ))(input)
}

fn processing_instruction(input: &str) -> IResult<&str, &str> {
    let (rest, body) = preceded(tag("<?"), take_until("?>"))(input)?;
    if body.contains('\n') {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::TakeUntil,
        )));
    }
    let (rest, _) = tag("?>")(rest)?;
    Ok((rest, &input[..input.len() - rest.len()]))
}

fn declaration(input: &str) -> IResult<&str, &str> {
    recognize(tuple((
        tag("<!"),
        take_while1(|c: char| c.is_ascii_alphabetic()),
        space1,
        take_while(|c| c != '>'),
        char('>'),
    )))(input)
}

fn cdata(input: &str) -> IResult<&str, &str> {
    recognize(tuple((tag_no_case("<![CDATA["), take_until("]]>"), tag("]]>"))))(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn matched(input: &str) -> Option<&str> {
        html_tag(input).ok().map(|(_, m)| m)
    }

    #[test]
    fn test_open_and_close_tags() {
        assert_eq!(matched("<em>x"), Some("<em>"));
        assert_eq!(matched("</em >x"), Some("</em >"));
        assert_eq!(matched("<br/>"), Some("<br/>"));
        assert_eq!(matched("<br />"), Some("<br />"));
        assert_eq!(
            matched(r#"<a href="x.html" class='k' data-n=3 hidden>t"#),
            Some(r#"<a href="x.html" class='k' data-n=3 hidden>"#)
        );
        assert_eq!(matched("<h-1>"), Some("<h-1>"));
        assert_eq!(matched("<1a>"), None);
        assert_eq!(matched("< em>"), None);
        assert_eq!(matched("<em"), None);
    }

    #[test]
    fn test_comments() {
        assert_eq!(matched("<!---->"), Some("<!---->"));
        assert_eq!(matched("<!-- note -->rest"), Some("<!-- note -->"));
        assert_eq!(matched("<!--->"), None);
        assert_eq!(matched("<!-- a -- b -->"), None);
    }

    #[test]
    fn test_other_constructs() {
        assert_eq!(matched(r#"<?xml version="1.0"?>"#), Some(r#"<?xml version="1.0"?>"#));
        assert_eq!(matched("<?a\nb?>"), None);
        assert_eq!(matched("<!DOCTYPE html>"), Some("<!DOCTYPE html>"));
        assert_eq!(matched("<!doctype html>"), Some("<!doctype html>"));
        assert_eq!(matched("<![CDATA[a < b]]>"), Some("<![CDATA[a < b]]>"));
    }

    #[test]
    fn test_strip_html_tags() {
        assert_eq!(strip_html_tags("<b>bold</b> text"), "bold text");
        assert_eq!(strip_html_tags("a < b"), "a < b");
        assert_eq!(strip_html_tags("x<!-- c -->y"), "xy");
        assert!(matches!(strip_html_tags("no tags"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_strip_html_tags_mixed_constructs() {
        assert_eq!(strip_html_tags("a<?pi?>b<![cdata[x]]>c<!DOCTYPE html>d"), "abcd");
        assert_eq!(strip_html_tags("<?a\nb?><b>x</b>"), "<?a\nb?>x");
        assert_eq!(strip_html_tags("<![CDATA[open <i>x</i>"), "<![CDATA[open x");
        assert_eq!(strip_html_tags("<em>x</em> <"), "x <");
    }

    #[test]
    fn test_strip_html_tags_unterminated_runs_are_linear() {
        let n = 100_000;
        let cases = [
            "<!a ".repeat(n),
            format!("{}>", "<!a ".repeat(n)),
            format!("{}?>", "<?a\n".repeat(n)),
            format!("{}\n?>", "<?a".repeat(n)),
            format!("{}>", "<![CDATA[".repeat(n)),
        ];

        let started = Instant::now();
        let stripped: Vec<_> = cases.iter().map(|c| strip_html_tags(c)).collect();
        assert!(started.elapsed() < Duration::from_secs(2));

        assert_eq!(stripped[0], cases[0]);
        assert_eq!(stripped[1], "");
        assert_eq!(stripped[2], cases[2]);
        assert_eq!(stripped[3], cases[3]);
        assert_eq!(stripped[4], cases[4]);
    }

    #[test]
    fn test_cr_only_after_nonempty_write() {
        let mut sink = OutputSink::new();
        let mut out = Vec::new();
        sink.cr(&mut out).unwrap();
        assert!(out.is_empty());

        sink.write(&mut out, "<p>").unwrap();
        sink.cr(&mut out).unwrap();
        assert_eq!(out, b"<p>\n");

        sink.write(&mut out, "").unwrap();
        sink.cr(&mut out).unwrap();
        assert_eq!(out, b"<p>\n");
    }

    #[test]
    fn test_write_tag_records_unit_length() {
        let mut sink = OutputSink::new();
        let mut out = Vec::new();
        sink.write_tag(&mut out, "<a", &[r#"href="/x""#.to_string()]).unwrap();
        assert_eq!(out, br#"<a href="/x">"#);
        assert_eq!(sink.last_output_len(), 1);
    }

    #[test]
    fn test_suppression_strips_tags() {
        let mut sink = OutputSink::new();
        let mut out = Vec::new();
        sink.suppress_tags();
        sink.write(&mut out, "<em>").unwrap();
        sink.write(&mut out, "<span>x</span>").unwrap();
        assert_eq!(sink.last_output_len(), 14);
        sink.restore_tags();
        sink.restore_tags();
        assert_eq!(sink.tag_suppression(), 0);
        sink.write(&mut out, "<em>").unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "x<em>");
    }
}

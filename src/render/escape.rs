//! HTML escaping primitives.

use entities::ENTITIES;
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::OnceLock;

fn needs_escape(b: u8) -> bool {
    matches!(b, b'&' | b'<' | b'>' | b'"')
}

/// Escape `&`, `<`, `>` and `"`. Borrows when nothing needs escaping.
pub fn escape_html(s: &str) -> Cow<'_, str> {
    let bytes = s.as_bytes();
    let Some(first) = bytes.iter().position(|&b| needs_escape(b)) else {
        return Cow::Borrowed(s);
    };

    let mut out = String::with_capacity(s.len() + 16);
    out.push_str(&s[..first]);
    for c in s[first..].chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Escape text destined for a link (an `href` value or link text).
///
/// Character references already present are decoded first so that an
/// author-written `&amp;` comes out as `&amp;` rather than `&amp;amp;`.
pub fn escape_link(s: &str) -> Cow<'_, str> {
    match unescape_entities(s) {
        Cow::Borrowed(s) => escape_html(s),
        Cow::Owned(s) => Cow::Owned(escape_html(&s).into_owned()),
    }
}

/// Named references keyed by name without the `&` and `;`.
fn named_entities() -> &'static HashMap<&'static str, &'static str> {
    static TABLE: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    TABLE.get_or_init(|| {
        ENTITIES
            .iter()
            .filter_map(|e| {
                let name = e.entity.strip_prefix('&')?.strip_suffix(';')?;
                Some((name, e.characters))
            })
            .collect()
    })
}

/// Longest reference body considered, in bytes.
const MAX_REFERENCE_BODY: usize = 32;

/// Decode numeric character references and HTML5 named entities.
///
/// Unknown or malformed references are left untouched.
pub fn unescape_entities(s: &str) -> Cow<'_, str> {
    if !s.contains('&') {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        match decode_reference(rest) {
            Some((decoded, consumed)) => {
                out.push_str(&decoded);
                rest = &rest[consumed..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

/// Decode the reference at the start of `s` (which begins with `&`).
/// Returns the replacement text and the number of bytes consumed.
fn decode_reference(s: &str) -> Option<(Cow<'static, str>, usize)> {
    let window = &s.as_bytes()[..s.len().min(MAX_REFERENCE_BODY + 2)];
    let semi = window.iter().position(|&b| b == b';')?;
    let body = &s[1..semi];
    if body.is_empty() {
        return None;
    }

    let decoded = if let Some(num) = body.strip_prefix('#') {
        let code = match num.strip_prefix(|c| c == 'x' || c == 'X') {
            Some(hex) => parse_digits(hex, 16)?,
            None => parse_digits(num, 10)?,
        };
        let c = match char::from_u32(code) {
            Some('\0') | None => '\u{fffd}',
            Some(c) => c,
        };
        Cow::Owned(c.to_string())
    } else {
        Cow::Borrowed(*named_entities().get(body)?)
    };

    Some((decoded, semi + 1))
}

/// Parse a run of digits in `radix`. Signs are not digits.
fn parse_digits(digits: &str, radix: u32) -> Option<u32> {
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    Some(u32::from_str_radix(digits, radix).unwrap_or(0x110000))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("A & B"), "A &amp; B");
        assert_eq!(
            escape_html(r#"<a href="x">"#),
            "&lt;a href=&quot;x&quot;&gt;"
        );
        assert_eq!(escape_html("it's"), "it's");
        assert!(matches!(escape_html("plain"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_escape_html_keeps_unicode() {
        assert_eq!(escape_html("café < thé"), "café &lt; thé");
    }

    #[test]
    fn test_unescape_entities() {
        assert_eq!(unescape_entities("a &amp; b"), "a & b");
        assert_eq!(unescape_entities("&#65;&#x42;&#X43;"), "ABC");
        assert_eq!(unescape_entities("&copy; 2024"), "\u{a9} 2024");
        assert_eq!(unescape_entities("&bogus; &"), "&bogus; &");
        assert_eq!(unescape_entities("&#0;"), "\u{fffd}");
    }

    #[test]
    fn test_unescape_full_named_table() {
        assert_eq!(unescape_entities("caf&eacute; &hearts;"), "caf\u{e9} \u{2665}");
        assert_eq!(unescape_entities("&NotEqualTilde;"), "\u{2242}\u{338}");
        assert_eq!(unescape_entities("&Eacute;&eacute;"), "\u{c9}\u{e9}");
    }

    #[test]
    fn test_numeric_references_reject_signs() {
        assert_eq!(unescape_entities("&#+65;"), "&#+65;");
        assert_eq!(unescape_entities("&#-65;"), "&#-65;");
        assert_eq!(unescape_entities("&#x+41;"), "&#x+41;");
        assert_eq!(unescape_entities("&#;&#x;"), "&#;&#x;");
        assert_eq!(unescape_entities("&#99999999999;"), "\u{fffd}");
    }

    #[test]
    fn test_reference_search_is_bounded() {
        let long = format!("&{};", "a".repeat(40));
        assert_eq!(unescape_entities(&long), long);

        let n = 200_000;
        let input = "&".repeat(n);
        let started = Instant::now();
        let escaped = escape_link(&input);
        assert_eq!(escaped.len(), n * "&amp;".len());
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn test_escape_link_does_not_double_escape() {
        assert_eq!(escape_link("/a?x=1&amp;y=2"), "/a?x=1&amp;y=2");
        assert_eq!(escape_link("/a?x=1&y=2"), "/a?x=1&amp;y=2");
        assert_eq!(escape_link(r#"say "hi""#), "say &quot;hi&quot;");
    }
}

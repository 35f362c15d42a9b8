//! Typographic punctuation substitution.
//!
//! The renderer hands already-escaped text to a [`PunctuationFilter`]; the
//! default implementation is [`Smartypants`]. Input arrives HTML-escaped, so
//! a double quote is seen as `&quot;`.

use crate::render::config::SmartypantsConfig;
use crate::render::links::{is_alnum, is_punctuation, is_space};
use std::io::{self, Write};

/// A pluggable text filter applied to escaped text when punctuation
/// substitution is enabled.
pub trait PunctuationFilter {
    /// Write `text` to `w`, substituting punctuation as it goes.
    fn process(&mut self, w: &mut dyn Write, text: &str) -> io::Result<()>;

    /// Forget any state carried between calls.
    fn reset(&mut self) {}
}

/// Smart quotes, dashes, ellipses, symbols and fractions.
///
/// Quote state is kept between calls, so a quotation split across several
/// text nodes still pairs up.
#[derive(Debug, Default)]
pub struct Smartypants {
    config: SmartypantsConfig,
    in_single_quote: bool,
    in_double_quote: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    Edge,
    Space,
    Punct,
    Word,
}

fn classify(c: u8) -> Context {
    if c == 0 {
        Context::Edge
    } else if is_space(c) {
        Context::Space
    } else if is_punctuation(c) {
        Context::Punct
    } else {
        Context::Word
    }
}

/// Decide whether a quote between `prev` and `next` opens, updating `is_open`.
fn quote_opens(prev: u8, next: u8, is_open: &mut bool) -> bool {
    use Context::*;

    let opens = match (classify(prev), classify(next)) {
        // No help from context.
        (Edge, Edge) | (Space, Space) | (Punct, Punct) => !*is_open,
        (Space, Edge) => true,
        (_, Edge) => false,
        (_, Space) => false,
        (Space, Punct) => true,
        (_, Punct) => false,
        (_, Word) => true,
    };
    *is_open = opens;
    opens
}

impl Smartypants {
    pub fn new(config: SmartypantsConfig) -> Self {
        Self {
            config,
            in_single_quote: false,
            in_double_quote: false,
        }
    }

    fn is_trigger(c: u8) -> bool {
        matches!(c, b'&' | b'"' | b'\'' | b'-' | b'.' | b'(') || c.is_ascii_digit()
    }

    /// Replacement for the construct starting at `s`, and how many bytes it covers.
    fn substitute(&mut self, prev: u8, s: &str) -> Option<(String, usize)> {
        let b = s.as_bytes();
        match b[0] {
            b'&' if s.starts_with("&quot;") => {
                let next = b.get(6).copied().unwrap_or(0);
                Some((self.double_quote(prev, next), 6))
            }
            b'"' => {
                let next = b.get(1).copied().unwrap_or(0);
                Some((self.double_quote(prev, next), 1))
            }
            b'\'' => {
                let next = b.get(1).copied().unwrap_or(0);
                if is_alnum(prev) && is_alnum(next) {
                    return Some(("&rsquo;".to_string(), 1));
                }
                let entity = if quote_opens(prev, next, &mut self.in_single_quote) {
                    "&lsquo;"
                } else {
                    "&rsquo;"
                };
                Some((entity.to_string(), 1))
            }
            b'-' => self.dash(prev, s),
            b'.' => {
                if s.starts_with("...") {
                    Some(("&hellip;".to_string(), 3))
                } else if s.starts_with(". . .") {
                    Some(("&hellip;".to_string(), 5))
                } else {
                    None
                }
            }
            b'(' => {
                let lower = s.get(..4).unwrap_or(s).to_ascii_lowercase();
                if lower.starts_with("(c)") {
                    Some(("&copy;".to_string(), 3))
                } else if lower.starts_with("(r)") {
                    Some(("&reg;".to_string(), 3))
                } else if lower.starts_with("(tm)") {
                    Some(("&trade;".to_string(), 4))
                } else {
                    None
                }
            }
            c if c.is_ascii_digit() => self.fraction(prev, s),
            _ => None,
        }
    }

    fn double_quote(&mut self, prev: u8, next: u8) -> String {
        let opens = quote_opens(prev, next, &mut self.in_double_quote);
        let nbsp = if self.config.quotes_nbsp { "&nbsp;" } else { "" };
        match (self.config.angled_quotes, opens) {
            (true, true) => format!("&laquo;{}", nbsp),
            (true, false) => format!("{}&raquo;", nbsp),
            (false, true) => "&ldquo;".to_string(),
            (false, false) => "&rdquo;".to_string(),
        }
    }

    fn dash(&self, prev: u8, s: &str) -> Option<(String, usize)> {
        if self.config.latex_dashes {
            if s.starts_with("---") {
                return Some(("&mdash;".to_string(), 3));
            }
            if s.starts_with("--") {
                return Some(("&ndash;".to_string(), 2));
            }
        } else if self.config.dashes {
            if s.starts_with("--") {
                return Some(("&mdash;".to_string(), 2));
            }
            let next = s.as_bytes().get(1).copied().unwrap_or(0);
            if is_space(prev) && is_space(next) {
                return Some(("&ndash;".to_string(), 1));
            }
        }
        None
    }

    fn fraction(&self, prev: u8, s: &str) -> Option<(String, usize)> {
        if is_alnum(prev) {
            return None;
        }
        let b = s.as_bytes();
        let num_len = b.iter().take_while(|c| c.is_ascii_digit()).count();
        if b.get(num_len) != Some(&b'/') {
            return None;
        }
        let den_len = b[num_len + 1..]
            .iter()
            .take_while(|c| c.is_ascii_digit())
            .count();
        let end = num_len + 1 + den_len;
        if den_len == 0 || matches!(b.get(end), Some(&c) if is_alnum(c)) {
            return None;
        }

        let (num, den) = (&s[..num_len], &s[num_len + 1..end]);
        let vulgar = match (num, den) {
            ("1", "2") => Some("&frac12;"),
            ("1", "4") => Some("&frac14;"),
            ("3", "4") => Some("&frac34;"),
            _ => None,
        };
        match vulgar {
            Some(entity) => Some((entity.to_string(), end)),
            None if self.config.fractions => Some((
                format!("<sup>{}</sup>&frasl;<sub>{}</sub>", num, den),
                end,
            )),
            None => None,
        }
    }
}

impl PunctuationFilter for Smartypants {
    fn process(&mut self, w: &mut dyn Write, text: &str) -> io::Result<()> {
        let b = text.as_bytes();
        let mut out = String::with_capacity(text.len() + 16);
        let mut mark = 0;
        let mut i = 0;

        while i < b.len() {
            if Self::is_trigger(b[i]) {
                let prev = if i > 0 { b[i - 1] } else { 0 };
                if let Some((replacement, consumed)) = self.substitute(prev, &text[i..]) {
                    out.push_str(&text[mark..i]);
                    out.push_str(&replacement);
                    i += consumed;
                    mark = i;
                    continue;
                }
            }
            i += 1;
        }
        out.push_str(&text[mark..]);

        w.write_all(out.as_bytes())
    }

    fn reset(&mut self) {
        self.in_single_quote = false;
        self.in_double_quote = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn smarten(config: SmartypantsConfig, text: &str) -> String {
        let mut sp = Smartypants::new(config);
        let mut out = Vec::new();
        sp.process(&mut out, text).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn enabled() -> SmartypantsConfig {
        SmartypantsConfig {
            enabled: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_double_quotes() {
        assert_eq!(
            smarten(enabled(), "say &quot;hello&quot; now"),
            "say &ldquo;hello&rdquo; now"
        );
    }

    #[test]
    fn test_angled_quotes_with_nbsp() {
        let config = SmartypantsConfig {
            angled_quotes: true,
            quotes_nbsp: true,
            ..enabled()
        };
        assert_eq!(
            smarten(config, "&quot;oui&quot;"),
            "&laquo;&nbsp;oui&nbsp;&raquo;"
        );
    }

    #[test]
    fn test_apostrophes_and_single_quotes() {
        assert_eq!(smarten(enabled(), "don't"), "don&rsquo;t");
        assert_eq!(smarten(enabled(), "'quoted'"), "&lsquo;quoted&rsquo;");
    }

    #[test]
    fn test_dashes() {
        let dashes = SmartypantsConfig {
            dashes: true,
            ..enabled()
        };
        assert_eq!(smarten(dashes, "a--b"), "a&mdash;b");
        assert_eq!(smarten(dashes, "a - b"), "a &ndash; b");
        assert_eq!(smarten(enabled(), "a--b"), "a--b");

        let latex = SmartypantsConfig {
            latex_dashes: true,
            ..dashes
        };
        assert_eq!(smarten(latex, "a---b--c"), "a&mdash;b&ndash;c");
        assert_eq!(smarten(latex, "a - b"), "a - b");
    }

    #[test]
    fn test_ellipsis_and_symbols() {
        assert_eq!(smarten(enabled(), "wait..."), "wait&hellip;");
        assert_eq!(smarten(enabled(), "wait. . ."), "wait&hellip;");
        assert_eq!(
            smarten(enabled(), "(c) (R) (Tm) (x)"),
            "&copy; &reg; &trade; (x)"
        );
    }

    #[test]
    fn test_fractions() {
        assert_eq!(smarten(enabled(), "1/2 cup, 3/4 done"), "&frac12; cup, &frac34; done");
        assert_eq!(smarten(enabled(), "5/8 and 11/2"), "5/8 and 11/2");
        assert_eq!(smarten(enabled(), "a1/2"), "a1/2");

        let generic = SmartypantsConfig {
            fractions: true,
            ..enabled()
        };
        assert_eq!(
            smarten(generic, "5/8"),
            "<sup>5</sup>&frasl;<sub>8</sub>"
        );
    }

    #[test]
    fn test_quote_state_spans_calls() {
        let mut sp = Smartypants::new(enabled());
        let mut out = Vec::new();
        sp.process(&mut out, "&quot;").unwrap();
        sp.process(&mut out, "x").unwrap();
        sp.process(&mut out, "&quot;").unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "&ldquo;x&rdquo;");

        let mut out = Vec::new();
        sp.process(&mut out, "&quot;").unwrap();
        sp.reset();
        sp.process(&mut out, "&quot;").unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "&ldquo;&ldquo;");
    }

    #[test]
    fn test_non_ascii_passthrough() {
        assert_eq!(smarten(enabled(), "naïve—ok 1/2"), "naïve—ok &frac12;");
    }
}

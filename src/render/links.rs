//! Link safety checks and slug generation.
//!
//! Character classes here are ASCII-only on purpose: a byte outside
//! `[0-9A-Za-z]` is never "alphanumeric", whatever script it belongs to.

const SAFE_SCHEMES: [&str; 4] = ["http://", "https://", "ftp://", "mailto://"];
const SAFE_PATHS: [&str; 3] = ["/", "./", "../"];

/// ASCII letter or digit.
pub fn is_alnum(c: u8) -> bool {
    c.is_ascii_digit() || is_letter(c)
}

/// ASCII letter.
pub fn is_letter(c: u8) -> bool {
    c.is_ascii_alphabetic()
}

/// Space, tab, newline, carriage return, form feed or vertical tab.
pub fn is_space(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\n' | b'\r' | b'\x0c' | b'\x0b')
}

/// ASCII punctuation as defined by CommonMark.
pub fn is_punctuation(c: u8) -> bool {
    c.is_ascii_punctuation()
}

/// A fragment, an absolute path on the current host, or a `./`/`../` path.
///
/// `//host/...` is protocol-relative and therefore not relative here.
pub fn is_relative_link(link: &str) -> bool {
    let b = link.as_bytes();
    match b {
        [] => false,
        [b'#', ..] => true,
        [b'/'] => true,
        [b'/', second, ..] => *second != b'/',
        _ => link.starts_with("./") || link.starts_with("../"),
    }
}

/// Whether `link` uses a trusted path form or protocol.
///
/// Paths must be exactly `/`, `./` or `../` or continue with an alphanumeric
/// character. Schemes are matched case-insensitively and must be followed by
/// an alphanumeric character.
pub fn is_safe_link(link: &str) -> bool {
    let b = link.as_bytes();

    for path in SAFE_PATHS {
        if b.starts_with(path.as_bytes()) {
            match b.get(path.len()) {
                None => return true,
                Some(&c) if is_alnum(c) => return true,
                _ => {}
            }
        }
    }

    SAFE_SCHEMES.iter().any(|scheme| {
        b.len() > scheme.len()
            && b[..scheme.len()].eq_ignore_ascii_case(scheme.as_bytes())
            && is_alnum(b[scheme.len()])
    })
}

pub fn is_mailto(link: &str) -> bool {
    link.starts_with("mailto:")
}

/// Build a URL-safe slug for id and href fragments.
///
/// ASCII alphanumerics are kept, every run of other bytes becomes a single
/// `-`, and leading/trailing dashes are trimmed.
pub fn slugify(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_symbol_run = false;

    for &c in input.as_bytes() {
        if is_alnum(c) {
            in_symbol_run = false;
            out.push(c as char);
        } else if !in_symbol_run {
            out.push('-');
            in_symbol_run = true;
        }
    }

    out.trim_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_is_relative_link() {
        assert!(is_relative_link("#section"));
        assert!(is_relative_link("/"));
        assert!(is_relative_link("/docs/intro"));
        assert!(is_relative_link("./img.png"));
        assert!(is_relative_link("../up"));
        assert!(!is_relative_link("//cdn.example.com/x.js"));
        assert!(!is_relative_link("https://example.com"));
        assert!(!is_relative_link("docs/intro"));
        assert!(!is_relative_link(""));
    }

    #[test]
    fn test_is_safe_link_paths() {
        assert!(is_safe_link("/path"));
        assert!(is_safe_link("/"));
        assert!(is_safe_link("./a"));
        assert!(is_safe_link("../"));
        assert!(!is_safe_link("/-x"));
        assert!(!is_safe_link("//evil.example"));
    }

    #[test]
    fn test_is_safe_link_schemes() {
        assert!(is_safe_link("http://a1"));
        assert!(is_safe_link("http://a"));
        assert!(is_safe_link("HTTPS://Example.com"));
        assert!(is_safe_link("ftp://files.example.com"));
        assert!(!is_safe_link("http://"));
        assert!(!is_safe_link("http://-x"));
        assert!(!is_safe_link("javascript:alert(1)"));
        assert!(!is_safe_link("data:text/html;base64,AAAA"));
        assert!(!is_safe_link("mailto:me@example.com"));
    }

    #[test]
    fn test_is_mailto() {
        assert!(is_mailto("mailto:me@example.com"));
        assert!(!is_mailto("MAILTO:me@example.com"));
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello, World!"), "Hello-World");
        assert_eq!(slugify("  a  b  "), "a-b");
        assert_eq!(slugify("1"), "1");
        assert_eq!(slugify("---"), "");
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("café"), "caf");
    }

    proptest! {
        #[test]
        fn slugify_is_idempotent(s in "[ -~]{0,40}") {
            let once = slugify(&s);
            prop_assert_eq!(slugify(&once), once.clone());
        }

        #[test]
        fn slugify_never_has_edge_dashes(s in "\\PC{0,40}") {
            let slug = slugify(&s);
            prop_assert!(!slug.starts_with('-'));
            prop_assert!(!slug.ends_with('-'));
            prop_assert!(slug.bytes().all(|c| c == b'-' || is_alnum(c)));
        }
    }
}

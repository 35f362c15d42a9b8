//! Table of contents.
//!
//! [`TocBuilder`] tracks the nesting of `<ul><li>` pairs as headings are
//! met in document order. The renderer drives it from a walk over the tree
//! and renders each heading's inline contents into [`TocBuilder::buffer`].

use std::io::{self, Write};

/// Accumulates table-of-contents entries.
#[derive(Debug, Default)]
pub struct TocBuilder {
    buf: Vec<u8>,
    level: usize,
    count: usize,
}

impl TocBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open an entry for a heading at `level` and return the `toc_N` id
    /// the heading should carry.
    pub fn enter_heading(&mut self, level: u8) -> String {
        let level = usize::from(level);

        if level == self.level {
            self.buf.extend_from_slice(b"</li>\n\n<li>");
        } else if level < self.level {
            while level < self.level {
                self.level -= 1;
                self.buf.extend_from_slice(b"</li>\n</ul>");
            }
            self.buf.extend_from_slice(b"</li>\n\n<li>");
        } else {
            while level > self.level {
                self.level += 1;
                self.buf.extend_from_slice(b"\n<ul>\n<li>");
            }
        }

        let id = format!("toc_{}", self.count);
        self.buf.extend_from_slice(format!(r##"<a href="#{}">"##, id).as_bytes());
        self.count += 1;
        id
    }

    pub fn exit_heading(&mut self) {
        self.buf.extend_from_slice(b"</a>");
    }

    /// Destination for the current heading's contents.
    pub fn buffer(&mut self) -> &mut Vec<u8> {
        &mut self.buf
    }

    /// Close every open list and return the entries.
    pub fn finish(mut self) -> Vec<u8> {
        while self.level > 0 {
            self.level -= 1;
            self.buf.extend_from_slice(b"</li>\n</ul>");
        }
        self.buf
    }
}

/// Wrap non-empty `entries` in a `<nav>` block.
pub fn write_nav(w: &mut dyn Write, entries: &[u8]) -> io::Result<()> {
    if entries.is_empty() {
        return Ok(());
    }
    w.write_all(b"<nav>\n")?;
    w.write_all(entries)?;
    w.write_all(b"\n\n</nav>\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn build(levels: &[u8]) -> String {
        let mut toc = TocBuilder::new();
        for (i, &level) in levels.iter().enumerate() {
            assert_eq!(toc.enter_heading(level), format!("toc_{}", i));
            toc.buffer().extend_from_slice(b"H");
            toc.exit_heading();
        }
        String::from_utf8(toc.finish()).unwrap()
    }

    #[test]
    fn test_nesting_transitions() {
        assert_eq!(
            build(&[1, 2, 2, 1, 3]),
            concat!(
                "\n<ul>\n<li>",
                r##"<a href="#toc_0">H</a>"##,
                "\n<ul>\n<li>",
                r##"<a href="#toc_1">H</a>"##,
                "</li>\n\n<li>",
                r##"<a href="#toc_2">H</a>"##,
                "</li>\n</ul>",
                "</li>\n\n<li>",
                r##"<a href="#toc_3">H</a>"##,
                "\n<ul>\n<li>",
                "\n<ul>\n<li>",
                r##"<a href="#toc_4">H</a>"##,
                "</li>\n</ul>",
                "</li>\n</ul>",
                "</li>\n</ul>",
            )
        );
    }

    #[test]
    fn test_flat_siblings() {
        assert_eq!(
            build(&[2, 2]),
            concat!(
                "\n<ul>\n<li>\n<ul>\n<li>",
                r##"<a href="#toc_0">H</a>"##,
                "</li>\n\n<li>",
                r##"<a href="#toc_1">H</a>"##,
                "</li>\n</ul></li>\n</ul>",
            )
        );
    }

    #[test]
    fn test_empty_toc_writes_nothing() {
        let toc = TocBuilder::new();
        let entries = toc.finish();
        let mut out = Vec::new();
        write_nav(&mut out, &entries).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_nav_wrapper() {
        let mut out = Vec::new();
        write_nav(&mut out, b"x").unwrap();
        assert_eq!(out, b"<nav>\nx\n\n</nav>\n");
    }
}

//! Footnote anchors and back-references.
//!
//! A reference in the text links to `#fn:{prefix}{slug}` and carries the id
//! `fnref:{prefix}{slug}`; the footnote body uses the mirrored pair. The
//! prefix keeps ids apart when several documents share one page.

use crate::ast::LinkData;
use crate::render::links::slugify;

/// Superscript reference rendered in place of a footnote link.
pub fn footnote_ref(prefix: &str, link: &LinkData) -> String {
    let fragment = format!("{}{}", prefix, slugify(&link.destination));
    format!(
        r##"<sup class="footnote-ref" id="fnref:{frag}"><a rel="footnote" href="#fn:{frag}">{n}</a></sup>"##,
        frag = fragment,
        n = link.note_id
    )
}

/// Opening tag of a footnote body.
pub fn footnote_item(prefix: &str, slug: &str) -> String {
    format!(r#"<li id="fn:{}{}">"#, prefix, slug)
}

/// Link from the end of a footnote body back to its reference.
pub fn footnote_return_link(prefix: &str, contents: &str, slug: &str) -> String {
    format!(
        r##" <a class="footnote-return" href="#fnref:{}{}">{}</a>"##,
        prefix, slug, contents
    )
}

//! HTML renderer for document trees.

use crate::ast::{
    CodeBlockData, HeadingData, ImageData, LinkData, ListData, ListFlags, ListItemData, NodeId,
    NodeKind, NodeRef, TableCellData, Tree,
};
use crate::error::{RenderError, Result};
use crate::render::config::HtmlConfig;
use crate::render::escape::{escape_html, escape_link};
use crate::render::footnotes::{footnote_item, footnote_ref, footnote_return_link};
use crate::render::heading_ids::HeadingIdRegistry;
use crate::render::links::{is_mailto, is_relative_link, is_safe_link, slugify};
use crate::render::sink::OutputSink;
use crate::render::smartypants::{PunctuationFilter, Smartypants};
use crate::render::toc::{write_nav, TocBuilder};
use crate::walk::{walk, WalkStatus};
use std::borrow::Cow;
use std::collections::HashMap;
use std::io::{self, Write};

const GENERATOR: &str = concat!("markdown-html ", env!("CARGO_PKG_VERSION"));

/// What a node hook did with a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookOutcome {
    /// Fall through to the built-in rendering.
    NotHandled,
    /// The hook wrote the node itself; continue the walk as instructed.
    Handled(WalkStatus),
}

/// Callback consulted before the built-in rendering of every node.
pub type NodeHook<'a> =
    Box<dyn FnMut(&mut dyn Write, NodeRef<'_>, bool) -> Result<HookOutcome> + 'a>;

/// A render session.
///
/// Holds everything that changes while a document is written: heading ids
/// handed out so far, the sink counters, table-of-contents ids and the
/// punctuation filter's quote state. A session renders one document at a
/// time; call [`HtmlRenderer::reset`] before reusing it for another.
pub struct HtmlRenderer<'a> {
    config: &'a HtmlConfig,
    sink: OutputSink,
    heading_ids: HeadingIdRegistry,
    toc_ids: HashMap<NodeId, String>,
    filter: Box<dyn PunctuationFilter + 'a>,
    hook: Option<NodeHook<'a>>,
}

impl<'a> HtmlRenderer<'a> {
    pub fn new(config: &'a HtmlConfig) -> Self {
        Self {
            config,
            sink: OutputSink::new(),
            heading_ids: HeadingIdRegistry::new(),
            toc_ids: HashMap::new(),
            filter: Box::new(Smartypants::new(config.smartypants)),
            hook: None,
        }
    }

    /// Install a hook that may take over the rendering of any node.
    pub fn with_hook<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&mut dyn Write, NodeRef<'_>, bool) -> Result<HookOutcome> + 'a,
    {
        self.hook = Some(Box::new(hook));
        self
    }

    /// Replace the default [`Smartypants`] engine.
    pub fn with_punctuation_filter(mut self, filter: impl PunctuationFilter + 'a) -> Self {
        self.filter = Box::new(filter);
        self
    }

    /// Clear all per-document state.
    pub fn reset(&mut self) {
        self.sink.reset();
        self.heading_ids.clear();
        self.toc_ids.clear();
        self.filter.reset();
    }

    /// Render a whole document: header, body and footer.
    ///
    /// A walk stopped by [`WalkStatus::Terminate`] still gets its footer;
    /// whatever was written before the stop stays in `w`.
    pub fn render(&mut self, tree: &Tree, w: &mut dyn Write) -> Result<()> {
        tracing::debug!(
            nodes = tree.len(),
            complete_page = self.config.complete_page,
            toc = self.config.toc,
            "rendering document"
        );

        self.render_header(tree, w)?;
        let status = walk(tree.root(), |node, entering| {
            self.render_node(&mut *w, node, entering)
        })?;
        if status == WalkStatus::Terminate {
            tracing::debug!("walk terminated early");
        }
        self.render_footer(w)?;

        tracing::debug!(heading_ids = self.heading_ids.len(), "document rendered");
        Ok(())
    }

    /// Render one visit of `node`.
    pub fn render_node(
        &mut self,
        w: &mut dyn Write,
        node: NodeRef<'_>,
        entering: bool,
    ) -> Result<WalkStatus> {
        if let Some(hook) = self.hook.as_mut() {
            if let HookOutcome::Handled(status) = hook(&mut *w, node, entering)? {
                tracing::trace!(node = node.kind().name(), entering, ?status, "node handled by hook");
                return Ok(status);
            }
        }

        match node.kind() {
            NodeKind::Document => {}
            NodeKind::Text(literal) => self.text(w, node, literal)?,
            NodeKind::SoftBreak => self.sink.cr(w)?,
            NodeKind::HardBreak => {
                self.sink.write(w, &format!("<br{}", self.config.close_tag()))?;
                self.sink.cr(w)?;
            }
            NodeKind::Emphasis => self.out_one_of(w, entering, "<em>", "</em>")?,
            NodeKind::Strong => self.out_one_of(w, entering, "<strong>", "</strong>")?,
            NodeKind::Delete => self.out_one_of(w, entering, "<del>", "</del>")?,
            NodeKind::BlockQuote => {
                self.out_one_of_cr(w, entering, "<blockquote>", "</blockquote>")?
            }
            NodeKind::Link(link) => self.link(w, link, entering)?,
            NodeKind::Image(image) => {
                if self.config.skip_images {
                    return Ok(WalkStatus::SkipChildren);
                }
                self.image(w, image, entering)?;
            }
            NodeKind::Code(literal) => {
                self.sink.write(w, "<code>")?;
                w.write_all(escape_html(literal).as_bytes())?;
                self.sink.write(w, "</code>")?;
            }
            NodeKind::CodeBlock(block) => self.code_block(w, node, block)?,
            NodeKind::Paragraph => self.paragraph(w, node, entering)?,
            NodeKind::RawHtmlSpan(literal) => {
                if !self.config.skip_html {
                    self.sink.write(w, literal)?;
                }
            }
            NodeKind::RawHtmlBlock(literal) => {
                if !self.config.skip_html {
                    self.sink.cr(w)?;
                    self.sink.write(w, literal)?;
                    self.sink.cr(w)?;
                }
            }
            NodeKind::Heading(heading) => self.heading(w, node, heading, entering)?,
            NodeKind::HorizontalRule => {
                self.sink.cr(w)?;
                self.hr(w)?;
                self.sink.cr(w)?;
            }
            NodeKind::List(list) => self.list(w, node, list, entering)?,
            NodeKind::ListItem(item) => self.list_item(w, node, item, entering)?,
            NodeKind::Table => self.out_one_of_cr(w, entering, "<table>", "</table>")?,
            NodeKind::TableHead => self.out_one_of_cr(w, entering, "<thead>", "</thead>")?,
            NodeKind::TableBody => self.table_body(w, node, entering)?,
            NodeKind::TableRow => self.out_one_of_cr(w, entering, "<tr>", "</tr>")?,
            NodeKind::TableCell(cell) => self.table_cell(w, node, cell, entering)?,
        }

        Ok(WalkStatus::GoToNext)
    }

    /// Write the page preamble (complete pages only) and the table of
    /// contents (when enabled).
    pub fn render_header(&mut self, tree: &Tree, w: &mut dyn Write) -> Result<()> {
        if self.config.complete_page {
            self.write_document_header(w)?;
        }
        if self.config.toc {
            self.write_toc(tree, w)?;
        }
        Ok(())
    }

    /// Close the page opened by [`HtmlRenderer::render_header`].
    pub fn render_footer(&mut self, w: &mut dyn Write) -> Result<()> {
        if self.config.complete_page {
            w.write_all(b"\n</body>\n</html>\n")?;
        }
        Ok(())
    }

    fn write_document_header(&mut self, w: &mut dyn Write) -> Result<()> {
        let ending = if self.config.use_xhtml { " /" } else { "" };

        if self.config.use_xhtml {
            w.write_all(b"<!DOCTYPE html PUBLIC \"-//W3C//DTD XHTML 1.0 Transitional//EN\" ")?;
            w.write_all(b"\"http://www.w3.org/TR/xhtml1/DTD/xhtml1-transitional.dtd\">\n")?;
            w.write_all(b"<html xmlns=\"http://www.w3.org/1999/xhtml\">\n")?;
        } else {
            w.write_all(b"<!DOCTYPE html>\n<html>\n")?;
        }

        w.write_all(b"<head>\n  <title>")?;
        let title = escape_html(&self.config.title);
        if self.config.smartypants.enabled {
            self.filter.process(w, &title)?;
        } else {
            w.write_all(title.as_bytes())?;
        }
        w.write_all(b"</title>\n")?;

        writeln!(w, "  <meta name=\"GENERATOR\" content=\"{}\"{}>", GENERATOR, ending)?;
        writeln!(w, "  <meta charset=\"utf-8\"{}>", ending)?;
        if !self.config.css.is_empty() {
            writeln!(
                w,
                "  <link rel=\"stylesheet\" type=\"text/css\" href=\"{}\"{}>",
                escape_html(&self.config.css),
                ending
            )?;
        }
        if !self.config.icon.is_empty() {
            writeln!(
                w,
                "  <link rel=\"icon\" type=\"image/x-icon\" href=\"{}\"{}>",
                escape_html(&self.config.icon),
                ending
            )?;
        }
        w.write_all(b"</head>\n<body>\n\n")?;
        Ok(())
    }

    /// Collect the headings into a `<nav>` block and assign them `toc_N` ids.
    ///
    /// Everything inside a heading goes through [`HtmlRenderer::render_node`]
    /// so that inline formatting shows up in the entry.
    fn write_toc(&mut self, tree: &Tree, w: &mut dyn Write) -> Result<()> {
        let mut toc = TocBuilder::new();
        let mut in_heading = false;
        self.toc_ids.clear();

        walk(tree.root(), |node, entering| {
            if let NodeKind::Heading(heading) = node.kind() {
                if !heading.is_title_block {
                    in_heading = entering;
                    if entering {
                        let id = toc.enter_heading(heading.level);
                        self.toc_ids.insert(node.id(), id);
                    } else {
                        toc.exit_heading();
                    }
                    return Ok(WalkStatus::GoToNext);
                }
            }

            if in_heading {
                return self.render_node(toc.buffer(), node, entering);
            }
            Ok(WalkStatus::GoToNext)
        })?;

        let entries = toc.finish();
        tracing::trace!(headings = self.toc_ids.len(), bytes = entries.len(), "table of contents built");
        write_nav(w, &entries)?;
        self.sink.set_last_output_len(entries.len());
        Ok(())
    }

    fn out_one_of(&mut self, w: &mut dyn Write, first: bool, a: &str, b: &str) -> io::Result<()> {
        self.sink.write(w, if first { a } else { b })
    }

    /// Open with a newline before, or close with a newline after.
    fn out_one_of_cr(&mut self, w: &mut dyn Write, entering: bool, open: &str, close: &str) -> io::Result<()> {
        if entering {
            self.sink.cr(w)?;
            self.sink.write(w, open)
        } else {
            self.sink.write(w, close)?;
            self.sink.cr(w)
        }
    }

    fn hr(&mut self, w: &mut dyn Write) -> io::Result<()> {
        self.sink.write(w, &format!("<hr{}", self.config.close_tag()))
    }

    fn text(&mut self, w: &mut dyn Write, node: NodeRef<'_>, literal: &str) -> Result<()> {
        if self.config.smartypants.enabled {
            self.filter.process(w, &escape_html(literal))?;
        } else if node
            .parent()
            .map_or(false, |p| matches!(p.kind(), NodeKind::Link(_)))
        {
            w.write_all(escape_link(literal).as_bytes())?;
        } else {
            w.write_all(escape_html(literal).as_bytes())?;
        }
        Ok(())
    }

    fn skip_link(&self, destination: &str) -> bool {
        self.config.skip_links
            || (self.config.safelink && !is_safe_link(destination) && !is_mailto(destination))
    }

    /// Prefix relative links (other than `./` and `../` ones) with the
    /// configured absolute prefix.
    fn absolute<'d>(&self, link: &'d str) -> Cow<'d, str> {
        let prefix = &self.config.absolute_prefix;
        if prefix.is_empty() || !is_relative_link(link) || link.starts_with('.') {
            return Cow::Borrowed(link);
        }
        let sep = if link.starts_with('/') { "" } else { "/" };
        Cow::Owned(format!("{}{}{}", prefix, sep, link))
    }

    fn link(&mut self, w: &mut dyn Write, link: &LinkData, entering: bool) -> Result<()> {
        if self.skip_link(&link.destination) {
            if entering {
                tracing::debug!(
                    destination = %link.destination,
                    skip_links = self.config.skip_links,
                    "link rendered as plain text"
                );
            }
            self.out_one_of(w, entering, "<tt>", "</tt>")?;
            return Ok(());
        }

        if !entering {
            if link.note_id == 0 {
                self.sink.write(w, "</a>")?;
            }
            return Ok(());
        }

        if link.note_id != 0 {
            let reference = footnote_ref(&self.config.footnote_anchor_prefix, link);
            self.sink.write(w, &reference)?;
            return Ok(());
        }

        let dest = self.absolute(&link.destination);
        let mut attrs = vec![format!("href=\"{}\"", escape_link(&dest))];
        if !is_relative_link(&dest) {
            if self.config.href_target_blank {
                attrs.push("target=\"_blank\"".to_string());
            }
            let rel: Vec<&str> = [
                (self.config.nofollow_links, "nofollow"),
                (self.config.noreferrer_links, "noreferrer"),
            ]
            .iter()
            .filter(|(on, _)| *on)
            .map(|(_, token)| *token)
            .collect();
            if !rel.is_empty() {
                attrs.push(format!("rel=\"{}\"", rel.join(" ")));
            }
        }
        if let Some(title) = link.title.as_deref().filter(|t| !t.is_empty()) {
            attrs.push(format!("title=\"{}\"", escape_html(title)));
        }
        self.sink.write_tag(w, "<a", &attrs)?;
        Ok(())
    }

    /// Images bracket their alt text: raw tags inside it are stripped, and a
    /// nested image only contributes its alt text.
    fn image(&mut self, w: &mut dyn Write, image: &ImageData, entering: bool) -> io::Result<()> {
        if entering {
            if self.sink.tag_suppression() == 0 {
                let dest = self.absolute(&image.destination);
                self.sink.write(w, "<img src=\"")?;
                w.write_all(escape_link(&dest).as_bytes())?;
                self.sink.write(w, "\" alt=\"")?;
            }
            self.sink.suppress_tags();
        } else {
            self.sink.restore_tags();
            if self.sink.tag_suppression() == 0 {
                if let Some(title) = &image.title {
                    self.sink.write(w, "\" title=\"")?;
                    w.write_all(escape_html(title).as_bytes())?;
                }
                self.sink.write(w, "\" />")?;
            }
        }
        Ok(())
    }

    fn paragraph(&mut self, w: &mut dyn Write, node: NodeRef<'_>, entering: bool) -> Result<()> {
        let parent = parent_of(node)?;
        if skip_paragraph_tags(parent) {
            return Ok(());
        }

        if entering {
            let prev = node.prev();
            let after_block = prev.map_or(false, |p| {
                matches!(
                    p.kind(),
                    NodeKind::RawHtmlBlock(_)
                        | NodeKind::List(_)
                        | NodeKind::Paragraph
                        | NodeKind::Heading(_)
                        | NodeKind::CodeBlock(_)
                        | NodeKind::BlockQuote
                        | NodeKind::HorizontalRule
                )
            });
            if after_block {
                self.sink.cr(w)?;
            }
            if prev.is_none() && matches!(parent.kind(), NodeKind::BlockQuote) {
                self.sink.cr(w)?;
            }
            self.sink.write(w, "<p>")?;
        } else {
            self.sink.write(w, "</p>")?;
            if !is_last_in_item(node, parent) {
                self.sink.cr(w)?;
            }
        }
        Ok(())
    }

    fn heading(
        &mut self,
        w: &mut dyn Write,
        node: NodeRef<'_>,
        heading: &HeadingData,
        entering: bool,
    ) -> Result<()> {
        let (open, close) = heading_tags(heading.level);

        if !entering {
            self.sink.write(w, close)?;
            if !is_last_in_item(node, parent_of(node)?) {
                self.sink.cr(w)?;
            }
            return Ok(());
        }

        let mut attrs = Vec::new();
        if heading.is_title_block {
            attrs.push("class=\"title\"".to_string());
        }
        let candidate = self
            .toc_ids
            .get(&node.id())
            .map(String::as_str)
            .or(heading.heading_id.as_deref())
            .filter(|id| !id.is_empty());
        if let Some(candidate) = candidate {
            let id = self.heading_ids.ensure_unique(candidate);
            attrs.push(format!(
                "id=\"{}{}{}\"",
                self.config.heading_id_prefix, id, self.config.heading_id_suffix
            ));
        }
        self.sink.cr(w)?;
        self.sink.write_tag(w, open, &attrs)?;
        Ok(())
    }

    fn list(&mut self, w: &mut dyn Write, node: NodeRef<'_>, list: &ListData, entering: bool) -> Result<()> {
        let parent = parent_of(node)?;
        let (open, close) = list_tags(list.flags);

        if entering {
            if list.is_footnotes_list {
                self.sink.write(w, "\n<div class=\"footnotes\">\n\n")?;
                self.hr(w)?;
                self.sink.cr(w)?;
            }
            self.sink.cr(w)?;
            if matches!(parent.kind(), NodeKind::ListItem(_)) {
                let tight = parent
                    .parent()
                    .map_or(false, |g| matches!(g.kind(), NodeKind::List(l) if l.tight));
                if tight {
                    self.sink.cr(w)?;
                }
            }
            self.sink.write_tag(w, open, &[])?;
            self.sink.cr(w)?;
        } else {
            self.sink.write(w, close)?;
            if matches!(parent.kind(), NodeKind::ListItem(_)) && node.next().is_some() {
                self.sink.cr(w)?;
            }
            if matches!(parent.kind(), NodeKind::Document | NodeKind::BlockQuote) {
                self.sink.cr(w)?;
            }
            if list.is_footnotes_list {
                self.sink.write(w, "\n</div>\n")?;
            }
        }
        Ok(())
    }

    fn list_item(
        &mut self,
        w: &mut dyn Write,
        node: NodeRef<'_>,
        item: &ListItemData,
        entering: bool,
    ) -> Result<()> {
        let parent = parent_of(node)?;
        let NodeKind::List(list) = parent.kind() else {
            return Err(RenderError::MalformedTree {
                node: "ListItem",
                reason: "parent is not a List",
            }
            .into());
        };
        let prefix = &self.config.footnote_anchor_prefix;
        let (open, close) = item_tags(item.flags);

        if entering {
            if node.prev().is_some() && !list.tight && !list.flags.definition {
                self.sink.cr(w)?;
            }
            match &item.ref_link {
                Some(reference) => self.sink.write(w, &footnote_item(prefix, &slugify(reference)))?,
                None => self.sink.write(w, open)?,
            }
        } else {
            if let Some(reference) = &item.ref_link {
                if self.config.footnote_return_links {
                    let back = footnote_return_link(
                        prefix,
                        self.config.footnote_return_link_contents(),
                        &slugify(reference),
                    );
                    self.sink.write(w, &back)?;
                }
            }
            self.sink.write(w, close)?;
            self.sink.cr(w)?;
        }
        Ok(())
    }

    fn code_block(&mut self, w: &mut dyn Write, node: NodeRef<'_>, block: &CodeBlockData) -> Result<()> {
        let mut attrs = Vec::new();
        if !block.info.is_empty() {
            let end = block
                .info
                .find(|c| c == ' ' || c == '\t')
                .unwrap_or(block.info.len());
            attrs.push(format!(
                "class=\"language-{}\"",
                escape_html(&block.info[..end])
            ));
        }

        self.sink.cr(w)?;
        self.sink.write(w, "<pre>")?;
        self.sink.write_tag(w, "<code", &attrs)?;
        w.write_all(escape_html(&block.literal).as_bytes())?;
        self.sink.write(w, "</code>")?;
        self.sink.write(w, "</pre>")?;
        if !matches!(parent_of(node)?.kind(), NodeKind::ListItem(_)) {
            self.sink.cr(w)?;
        }
        Ok(())
    }

    fn table_body(&mut self, w: &mut dyn Write, node: NodeRef<'_>, entering: bool) -> io::Result<()> {
        if entering {
            self.sink.cr(w)?;
            self.sink.write(w, "<tbody>")?;
            if node.first_child().is_none() {
                self.sink.cr(w)?;
            }
        } else {
            self.sink.write(w, "</tbody>")?;
            self.sink.cr(w)?;
        }
        Ok(())
    }

    fn table_cell(
        &mut self,
        w: &mut dyn Write,
        node: NodeRef<'_>,
        cell: &TableCellData,
        entering: bool,
    ) -> io::Result<()> {
        if !entering {
            self.out_one_of(w, cell.is_header, "</th>", "</td>")?;
            return self.sink.cr(w);
        }

        let mut attrs = Vec::new();
        if let Some(align) = cell.align.as_attr() {
            attrs.push(format!("align=\"{}\"", align));
        }
        if node.prev().is_none() {
            self.sink.cr(w)?;
        }
        self.sink
            .write_tag(w, if cell.is_header { "<th" } else { "<td" }, &attrs)
    }
}

fn parent_of(node: NodeRef<'_>) -> Result<NodeRef<'_>> {
    node.parent().ok_or_else(|| {
        RenderError::MalformedTree {
            node: node.kind().name(),
            reason: "node has no parent",
        }
        .into()
    })
}

/// Paragraphs render bare inside tight lists and definition terms.
fn skip_paragraph_tags(parent: NodeRef<'_>) -> bool {
    let Some(grandparent) = parent.parent() else {
        return false;
    };
    match grandparent.kind() {
        NodeKind::List(list) => {
            list.tight || matches!(parent.kind(), NodeKind::ListItem(item) if item.flags.term)
        }
        _ => false,
    }
}

fn is_last_in_item(node: NodeRef<'_>, parent: NodeRef<'_>) -> bool {
    matches!(parent.kind(), NodeKind::ListItem(_)) && node.next().is_none()
}

fn heading_tags(level: u8) -> (&'static str, &'static str) {
    match level {
        1 => ("<h1", "</h1>"),
        2 => ("<h2", "</h2>"),
        3 => ("<h3", "</h3>"),
        4 => ("<h4", "</h4>"),
        5 => ("<h5", "</h5>"),
        _ => ("<h6", "</h6>"),
    }
}

fn list_tags(flags: ListFlags) -> (&'static str, &'static str) {
    if flags.definition {
        ("<dl", "</dl>")
    } else if flags.ordered {
        ("<ol", "</ol>")
    } else {
        ("<ul", "</ul>")
    }
}

fn item_tags(flags: ListFlags) -> (&'static str, &'static str) {
    if flags.term {
        ("<dt>", "</dt>")
    } else if flags.definition {
        ("<dd>", "</dd>")
    } else {
        ("<li>", "</li>")
    }
}

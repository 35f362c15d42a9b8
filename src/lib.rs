//! # markdown-html
//!
//! An HTML renderer for Markdown document trees.
//!
//! The crate takes a tree produced by a Markdown parser and writes HTML for
//! it, with configurable policies for link safety, heading ids, footnotes, a
//! table of contents and typographic punctuation.
//!
//! ## Features
//!
//! - **Exact output**: newline placement follows fixed per-node rules, so the
//!   same tree always renders to the same bytes
//! - **Link safety**: links can be dropped entirely or restricted to an
//!   allowlist of paths and protocols; unsafe links render as `<tt>` text
//! - **Heading ids**: repeated ids get numbered suffixes, with optional
//!   prefix and suffix strings
//! - **Footnotes**: references and bodies with matching `fn:`/`fnref:`
//!   anchors and optional return links
//! - **Table of contents**: a `<nav>` block built from the headings
//! - **Smartypants**: smart quotes, dashes, ellipses and fractions
//! - **Complete pages**: optional HTML or XHTML preamble and footer
//!
//! ## Quick Start
//!
//! ```rust
//! use markdown_html::ast::{NodeKind, TreeBuilder};
//! use markdown_html::{render_html, HtmlConfig};
//!
//! let mut builder = TreeBuilder::new();
//! builder.open(NodeKind::Paragraph).text("A & B").close();
//! let tree = builder.finish().unwrap();
//!
//! let html = render_html(&tree, &HtmlConfig::default()).unwrap();
//! assert_eq!(html, "<p>A &amp; B</p>\n");
//! ```
//!
//! ## Sessions and hooks
//!
//! [`render_html`] uses a fresh [`HtmlRenderer`] per call. Create the
//! renderer yourself to stream into any [`std::io::Write`], to install a
//! node hook or to swap the punctuation filter:
//!
//! ```rust
//! use markdown_html::ast::{NodeKind, TreeBuilder};
//! use markdown_html::{HookOutcome, HtmlConfig, HtmlRenderer, WalkStatus};
//! use std::io::Write;
//!
//! let mut builder = TreeBuilder::new();
//! builder
//!     .open(NodeKind::Paragraph)
//!     .leaf(NodeKind::Code("ctrl-c".into()))
//!     .close();
//! let tree = builder.finish().unwrap();
//!
//! let config = HtmlConfig::default();
//! let mut renderer = HtmlRenderer::new(&config).with_hook(|w, node, _entering| {
//!     if let NodeKind::Code(keys) = node.kind() {
//!         write!(w, "<kbd>{}</kbd>", keys)?;
//!         return Ok(HookOutcome::Handled(WalkStatus::GoToNext));
//!     }
//!     Ok(HookOutcome::NotHandled)
//! });
//!
//! let mut out = Vec::new();
//! renderer.render(&tree, &mut out).unwrap();
//! assert_eq!(String::from_utf8(out).unwrap(), "<p><kbd>ctrl-c</kbd></p>\n");
//! ```
//!
//! ## Configuration
//!
//! [`HtmlConfig`] can be built in code or loaded from TOML with
//! [`HtmlConfig::from_toml_str`] and [`HtmlConfig::from_toml_file`]. Missing
//! keys keep their defaults.

pub mod ast;
pub mod error;
pub mod render;
pub mod walk;

// Convenience re-exports
pub use ast::{NodeId, NodeKind, NodeRef, Tree, TreeBuilder};
pub use error::{ConfigError, Error, RenderError, Result, TreeError};
pub use render::{
    render_html, HookOutcome, HtmlConfig, HtmlRenderer, PunctuationFilter, Smartypants,
    SmartypantsConfig,
};
pub use walk::{walk, WalkStatus};

//! Rendering layer for converting document trees to HTML.

pub mod config;
pub mod escape;
pub mod footnotes;
pub mod heading_ids;
pub mod html;
pub mod links;
pub mod sink;
pub mod smartypants;
pub mod toc;

pub use config::{HtmlConfig, SmartypantsConfig};
pub use html::{HookOutcome, HtmlRenderer, NodeHook};
pub use smartypants::{PunctuationFilter, Smartypants};

use crate::ast::Tree;
use crate::error::{RenderError, Result};

/// Render a document tree to an HTML string with a fresh session.
pub fn render_html(tree: &Tree, config: &HtmlConfig) -> Result<String> {
    let mut out = Vec::new();
    HtmlRenderer::new(config).render(tree, &mut out)?;
    Ok(String::from_utf8(out).map_err(RenderError::InvalidUtf8)?)
}

//! Renderer configuration.

use crate::error::{ConfigError, Result};
use serde::Deserialize;
use std::path::Path;

/// Return link text used when none is configured.
pub const DEFAULT_FOOTNOTE_RETURN_LINK: &str = "<sup>[return]</sup>";

/// Configuration for HTML rendering.
///
/// Every field has a default, so a TOML file only needs the keys it
/// changes:
///
/// ```
/// use markdown_html::HtmlConfig;
///
/// let config = HtmlConfig::from_toml_str(r#"
/// safelink = true
/// heading_id_prefix = "doc-"
///
/// [smartypants]
/// enabled = true
/// dashes = true
/// "#).unwrap();
/// assert!(config.safelink);
/// assert!(config.smartypants.dashes);
/// assert!(!config.toc);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HtmlConfig {
    /// Drop raw HTML blocks and spans.
    pub skip_html: bool,
    /// Drop images together with their alt text.
    pub skip_images: bool,
    /// Render every link as plain `<tt>` text.
    pub skip_links: bool,
    /// Only link to trusted paths and protocols.
    pub safelink: bool,
    /// Add `nofollow` to `rel` on absolute links.
    pub nofollow_links: bool,
    /// Add `noreferrer` to `rel` on absolute links.
    pub noreferrer_links: bool,
    /// Add `target="_blank"` on absolute links.
    pub href_target_blank: bool,
    /// Wrap the body in a complete HTML page.
    pub complete_page: bool,
    /// Self-closing void elements (`<br />`) and an XHTML preamble.
    pub use_xhtml: bool,
    /// End each footnote body with a link back to its reference.
    pub footnote_return_links: bool,
    /// Emit a table of contents ahead of the body.
    pub toc: bool,
    /// Punctuation substitution.
    pub smartypants: SmartypantsConfig,

    /// Prepended to relative links and image sources.
    pub absolute_prefix: String,
    /// Prepended to footnote anchors.
    pub footnote_anchor_prefix: String,
    /// Contents of footnote return links. Empty means the default.
    pub footnote_return_link_contents: String,
    pub heading_id_prefix: String,
    pub heading_id_suffix: String,

    /// Page title (complete pages only).
    pub title: String,
    /// Stylesheet URL (complete pages only).
    pub css: String,
    /// Icon URL (complete pages only).
    pub icon: String,
}

impl Default for HtmlConfig {
    fn default() -> Self {
        Self {
            skip_html: false,
            skip_images: false,
            skip_links: false,
            safelink: false,
            nofollow_links: false,
            noreferrer_links: false,
            href_target_blank: false,
            complete_page: false,
            use_xhtml: false,
            footnote_return_links: false,
            toc: false,
            smartypants: SmartypantsConfig::default(),
            absolute_prefix: String::new(),
            footnote_anchor_prefix: String::new(),
            footnote_return_link_contents: DEFAULT_FOOTNOTE_RETURN_LINK.to_string(),
            heading_id_prefix: String::new(),
            heading_id_suffix: String::new(),
            title: String::new(),
            css: String::new(),
            icon: String::new(),
        }
    }
}

impl HtmlConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(input: &str) -> Result<Self> {
        toml::from_str(input).map_err(|e| ConfigError::Toml(e.to_string()).into())
    }

    /// Read and parse a TOML configuration file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn footnote_return_link_contents(&self) -> &str {
        if self.footnote_return_link_contents.is_empty() {
            DEFAULT_FOOTNOTE_RETURN_LINK
        } else {
            &self.footnote_return_link_contents
        }
    }

    /// Ending for void elements: `>` or ` />`.
    pub fn close_tag(&self) -> &'static str {
        if self.use_xhtml {
            " />"
        } else {
            ">"
        }
    }
}

/// Punctuation substitution switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SmartypantsConfig {
    /// Master switch; the other flags do nothing without it.
    pub enabled: bool,
    /// Any `N/M` becomes a typeset fraction, not only 1/2, 1/4 and 3/4.
    pub fractions: bool,
    /// `--` becomes an em dash and ` - ` an en dash.
    pub dashes: bool,
    /// LaTeX dashes: `---` em, `--` en. Takes precedence over `dashes`.
    pub latex_dashes: bool,
    /// Double quotes become `&laquo;`/`&raquo;`.
    pub angled_quotes: bool,
    /// Non-breaking spaces inside angled quotes, French style.
    pub quotes_nbsp: bool,
}

impl SmartypantsConfig {
    /// Everything a typical English document wants.
    pub fn common() -> Self {
        Self {
            enabled: true,
            fractions: true,
            dashes: true,
            latex_dashes: true,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HtmlConfig::default();
        assert!(!config.complete_page);
        assert_eq!(config.close_tag(), ">");
        assert_eq!(config.footnote_return_link_contents(), "<sup>[return]</sup>");
    }

    #[test]
    fn test_empty_return_link_falls_back() {
        let config = HtmlConfig {
            footnote_return_link_contents: String::new(),
            ..Default::default()
        };
        assert_eq!(config.footnote_return_link_contents(), "<sup>[return]</sup>");
    }

    #[test]
    fn test_from_toml() {
        let config = HtmlConfig::from_toml_str(
            r#"
            use_xhtml = true
            absolute_prefix = "https://example.com"
            footnote_return_link_contents = "back"

            [smartypants]
            enabled = true
            angled_quotes = true
            "#,
        )
        .unwrap();
        assert_eq!(config.close_tag(), " />");
        assert_eq!(config.absolute_prefix, "https://example.com");
        assert_eq!(config.footnote_return_link_contents(), "back");
        assert!(config.smartypants.angled_quotes);
        assert!(!config.smartypants.fractions);
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(HtmlConfig::from_toml_str("").unwrap(), HtmlConfig::default());
    }

    #[test]
    fn test_bad_toml() {
        let err = HtmlConfig::from_toml_str("toc = \"yes\"").unwrap_err();
        assert!(err.to_string().contains("Invalid TOML"));
    }

    #[test]
    fn test_missing_file() {
        let err = HtmlConfig::from_toml_file("/nonexistent/markdown-html.toml").unwrap_err();
        assert!(matches!(err, crate::error::Error::Io(_)));
    }
}

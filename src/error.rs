//! Error types for the markdown-html library.

use thiserror::Error;

/// Result type alias for this library.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the library.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Tree error: {0}")]
    Tree(#[from] TreeError),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that occur while building a document tree.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    #[error("Unknown node id: {0}")]
    UnknownNode(usize),

    #[error("{parent} nodes cannot have children (tried to add {child})")]
    LeafParent {
        parent: &'static str,
        child: &'static str,
    },

    #[error("A tree has exactly one Document node")]
    NestedDocument,

    #[error("{0} is a leaf node and cannot be opened")]
    NotAContainer(&'static str),

    #[error("close() called with no open node")]
    CloseAtRoot,

    #[error("{0} node(s) left open")]
    Unclosed(usize),
}

/// Errors that occur during rendering.
///
/// These are contract violations by whoever built the tree; a render that
/// hits one is aborted.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Malformed tree at {node}: {reason}")]
    MalformedTree {
        node: &'static str,
        reason: &'static str,
    },

    #[error("Rendered output is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

/// Errors that occur while loading renderer configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid TOML: {0}")]
    Toml(String),
}

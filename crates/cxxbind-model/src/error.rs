//! Error types for cxxbind-model.

use miette::Diagnostic;
use thiserror::Error;

/// Result type for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;

#[derive(Error, Diagnostic, Debug)]
pub enum ModelError {
    /// No symbol is registered under the qualified name.
    #[error("symbol not found: {0}")]
    #[diagnostic(code(cxxbind::not_found))]
    NotFound(String),

    /// The raw symbol tree could not be decoded.
    #[error("invalid symbol tree: {0}")]
    #[diagnostic(code(cxxbind::invalid_tree))]
    InvalidTree(#[from] serde_json::Error),
}

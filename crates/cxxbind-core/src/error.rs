//! Error types for cxxbind-core.

use cxxbind_config::ConfigError;
use cxxbind_model::WrapperKind;
use miette::Diagnostic;
use thiserror::Error;

/// Result type for preprocessing.
pub type Result<T> = std::result::Result<T, PreprocessError>;

#[derive(Error, Diagnostic, Debug)]
pub enum PreprocessError {
    /// A forced wrapper pattern names an argument the wrapper cannot take.
    #[error("argument `{argument}` of type `{ty}` matches `{pattern}` but cannot be wrapped as {wrapper}")]
    #[diagnostic(
        code(cxxbind::invalid_wrapper_request),
        help("narrow the pattern, or only target non-const references and pointers to integers or strings")
    )]
    InvalidWrapperRequest {
        argument: String,
        ty: String,
        wrapper: WrapperKind,
        pattern: String,
    },

    #[error("invalid wrapper pattern `{pattern}`")]
    #[diagnostic(code(cxxbind::invalid_pattern))]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

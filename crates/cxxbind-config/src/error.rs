//! Error types for cxxbind-config.

use miette::Diagnostic;
use thiserror::Error;

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read config file: {0}")]
    #[diagnostic(code(cxxbind::config::read))]
    ReadConfig(#[from] std::io::Error),

    /// Failed to parse TOML configuration.
    #[error("failed to parse TOML config: {0}")]
    #[diagnostic(code(cxxbind::config::parse))]
    ParseToml(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    #[diagnostic(code(cxxbind::config::invalid))]
    Validation(String),

    /// A wrapper pattern is not a valid regular expression.
    #[error("invalid pattern `{pattern}` for {key}")]
    #[diagnostic(code(cxxbind::config::pattern))]
    InvalidPattern {
        key: &'static str,
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

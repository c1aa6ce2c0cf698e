//! Configuration for the cxxbind preprocessor.
//!
//! # Example
//!
//! ```toml
//! # cxxbind.toml
//! [project]
//! name = "quotes"
//!
//! [filter]
//! internal_path_markers = ["/usr", "Windows Kits"]
//!
//! [macros]
//! ignore_underscore_globals = true
//!
//! [wrappers]
//! output_arg_pattern = "::Api::Get\\w+::out_\\w+$"
//! ```

mod config;
mod error;

pub use config::{
    AliasConfig, BindConfig, FilterConfig, MacroConfig, ProjectConfig, WrapperConfig,
};
pub use error::{ConfigError, Result};

//! Binding configuration types (cxxbind.toml format).

use crate::error::{ConfigError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root binding configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BindConfig {
    /// Project metadata.
    pub project: ProjectConfig,

    /// Which declarations count as toolchain internals.
    #[serde(default)]
    pub filter: FilterConfig,

    /// Constant macro folding.
    #[serde(default)]
    pub macros: MacroConfig,

    /// Display name selection.
    #[serde(default)]
    pub aliases: AliasConfig,

    /// Argument wrapping.
    #[serde(default)]
    pub wrappers: WrapperConfig,
}

/// Project metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Project name.
    pub name: String,

    /// Project version (optional).
    #[serde(default)]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Declarations whose file path contains one of these are skipped.
    pub internal_path_markers: Vec<String>,

    /// Declarations whose file path starts with one of these are skipped.
    pub internal_include_paths: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            internal_path_markers: vec![
                "Microsoft Visual Studio".to_string(),
                "Windows Kits".to_string(),
                "/usr".to_string(),
            ],
            internal_include_paths: Vec::new(),
        }
    }
}

impl FilterConfig {
    /// Configured include paths plus those listed in the `INCLUDE`
    /// environment variable.
    pub fn include_paths(&self) -> Vec<String> {
        let mut paths = self.internal_include_paths.clone();
        if let Some(env) = std::env::var_os("INCLUDE") {
            paths.extend(
                std::env::split_paths(&env)
                    .map(|p| p.to_string_lossy().into_owned())
                    .filter(|p| !p.is_empty()),
            );
        }
        paths
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MacroConfig {
    /// Turn literal macros into constant variables of the root namespace.
    pub treat_const_macros_as_variable: bool,

    /// Drop root-namespace variables whose name starts with `_`.
    pub ignore_underscore_globals: bool,
}

impl Default for MacroConfig {
    fn default() -> Self {
        Self {
            treat_const_macros_as_variable: true,
            ignore_underscore_globals: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AliasConfig {
    /// `_Foo` is displayed as `Foo`.
    pub strip_leading_underscores: bool,
}

impl Default for AliasConfig {
    fn default() -> Self {
        Self {
            strip_leading_underscores: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WrapperConfig {
    /// Arguments whose qualified name (`::ns::f::arg`) matches are forced to
    /// be inout arguments.
    pub inout_arg_pattern: Option<String>,

    /// Arguments whose qualified name matches are forced to be output
    /// arguments.
    pub output_arg_pattern: Option<String>,

    /// Stop generating functions that keep an unsupported argument type.
    pub ignore_unsupported_functions: bool,
}

impl Default for WrapperConfig {
    fn default() -> Self {
        Self {
            inout_arg_pattern: None,
            output_arg_pattern: None,
            ignore_unsupported_functions: true,
        }
    }
}

impl WrapperConfig {
    /// Compile a configured pattern.
    pub fn compile(key: &'static str, pattern: Option<&str>) -> Result<Option<Regex>> {
        pattern
            .map(|p| {
                Regex::new(p).map_err(|source| ConfigError::InvalidPattern {
                    key,
                    pattern: p.to_string(),
                    source,
                })
            })
            .transpose()
    }

    pub fn inout_regex(&self) -> Result<Option<Regex>> {
        Self::compile("wrappers.inout_arg_pattern", self.inout_arg_pattern.as_deref())
    }

    pub fn output_regex(&self) -> Result<Option<Regex>> {
        Self::compile("wrappers.output_arg_pattern", self.output_arg_pattern.as_deref())
    }
}

impl BindConfig {
    /// A configuration with every section at its default.
    pub fn new(name: &str) -> Self {
        Self {
            project: ProjectConfig {
                name: name.to_string(),
                version: None,
            },
            filter: FilterConfig::default(),
            macros: MacroConfig::default(),
            aliases: AliasConfig::default(),
            wrappers: WrapperConfig::default(),
        }
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Reject an empty project name and wrapper patterns that do not compile.
    pub fn validate(&self) -> Result<()> {
        if self.project.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "project.name must not be empty".to_string(),
            ));
        }
        self.wrappers.inout_regex()?;
        self.wrappers.output_regex()?;
        Ok(())
    }

    pub fn with_output_pattern(mut self, pattern: &str) -> Self {
        self.wrappers.output_arg_pattern = Some(pattern.to_string());
        self
    }

    pub fn with_inout_pattern(mut self, pattern: &str) -> Self {
        self.wrappers.inout_arg_pattern = Some(pattern.to_string());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml = r#"
[project]
name = "ctp"
version = "6.3.15"

[filter]
internal_path_markers = ["/opt/toolchain"]
internal_include_paths = ["C:/sdk/include"]

[macros]
ignore_underscore_globals = false

[wrappers]
output_arg_pattern = "::Api::Req\\w+::n\\w+$"
ignore_unsupported_functions = false
        "#;

        let config = BindConfig::from_toml(toml).unwrap();

        assert_eq!(config.project.name, "ctp");
        assert_eq!(config.project.version, Some("6.3.15".to_string()));
        assert_eq!(config.filter.internal_path_markers, vec!["/opt/toolchain"]);
        assert_eq!(config.filter.internal_include_paths, vec!["C:/sdk/include"]);
        assert!(config.macros.treat_const_macros_as_variable);
        assert!(!config.macros.ignore_underscore_globals);
        assert!(config.aliases.strip_leading_underscores);
        assert!(config.wrappers.inout_arg_pattern.is_none());
        assert!(!config.wrappers.ignore_unsupported_functions);
        config.validate().unwrap();
    }

    #[test]
    fn test_defaults() {
        let config = BindConfig::from_toml("[project]\nname = \"x\"\n").unwrap();
        assert_eq!(
            config.filter.internal_path_markers,
            vec!["Microsoft Visual Studio", "Windows Kits", "/usr"]
        );
        assert!(config.macros.ignore_underscore_globals);
        assert!(config.wrappers.ignore_unsupported_functions);
    }

    #[test]
    fn test_missing_project_is_an_error() {
        let err = BindConfig::from_toml("[macros]\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseToml(_)));
    }

    #[test]
    fn test_validate() {
        let err = BindConfig::new(" ").validate().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));

        let err = BindConfig::new("x")
            .with_output_pattern("(unclosed")
            .validate()
            .unwrap_err();
        match err {
            ConfigError::InvalidPattern { key, pattern, .. } => {
                assert_eq!(key, "wrappers.output_arg_pattern");
                assert_eq!(pattern, "(unclosed");
            }
            other => panic!("unexpected error: {}", other),
        }

        BindConfig::new("x").with_inout_pattern("::f::x$").validate().unwrap();
    }
}

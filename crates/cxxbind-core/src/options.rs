use crate::error::{PreprocessError, Result};
use cxxbind_config::{BindConfig, FilterConfig};
use regex::Regex;

/// Knobs of one preprocessing run.
#[derive(Debug, Clone)]
pub struct PreprocessOptions {
    /// Substrings of toolchain and SDK header paths.
    pub internal_path_markers: Vec<String>,
    /// Prefixes of toolchain and SDK header paths.
    pub internal_include_paths: Vec<String>,
    pub treat_const_macros_as_variable: bool,
    pub ignore_underscore_globals: bool,
    pub strip_leading_underscores: bool,
    /// Searched in `<function qualified name>::<argument name>`.
    pub inout_arg_pattern: Option<Regex>,
    pub output_arg_pattern: Option<Regex>,
    /// Whether unsupported functions get `generate = false`.
    pub ignore_unsupported_functions: bool,
}

impl Default for PreprocessOptions {
    fn default() -> Self {
        Self {
            internal_path_markers: FilterConfig::default().internal_path_markers,
            internal_include_paths: Vec::new(),
            treat_const_macros_as_variable: true,
            ignore_underscore_globals: true,
            strip_leading_underscores: true,
            inout_arg_pattern: None,
            output_arg_pattern: None,
            ignore_unsupported_functions: true,
        }
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| PreprocessError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })
}

impl PreprocessOptions {
    pub fn with_output_pattern(mut self, pattern: &str) -> Result<Self> {
        self.output_arg_pattern = Some(compile(pattern)?);
        Ok(self)
    }

    pub fn with_inout_pattern(mut self, pattern: &str) -> Result<Self> {
        self.inout_arg_pattern = Some(compile(pattern)?);
        Ok(self)
    }

    pub fn with_internal_path_markers(mut self, markers: &[&str]) -> Self {
        self.internal_path_markers = markers.iter().map(|m| m.to_string()).collect();
        self
    }

    pub fn with_internal_include_paths(mut self, paths: &[&str]) -> Self {
        self.internal_include_paths = paths.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn with_const_macros_as_variables(mut self, enabled: bool) -> Self {
        self.treat_const_macros_as_variable = enabled;
        self
    }

    pub fn with_ignore_underscore_globals(mut self, enabled: bool) -> Self {
        self.ignore_underscore_globals = enabled;
        self
    }

    pub fn with_strip_leading_underscores(mut self, enabled: bool) -> Self {
        self.strip_leading_underscores = enabled;
        self
    }

    pub fn with_ignore_unsupported_functions(mut self, enabled: bool) -> Self {
        self.ignore_unsupported_functions = enabled;
        self
    }
}

impl TryFrom<&BindConfig> for PreprocessOptions {
    type Error = PreprocessError;

    fn try_from(config: &BindConfig) -> Result<Self> {
        Ok(Self {
            internal_path_markers: config.filter.internal_path_markers.clone(),
            internal_include_paths: config.filter.include_paths(),
            treat_const_macros_as_variable: config.macros.treat_const_macros_as_variable,
            ignore_underscore_globals: config.macros.ignore_underscore_globals,
            strip_leading_underscores: config.aliases.strip_leading_underscores,
            inout_arg_pattern: config.wrappers.inout_regex()?,
            output_arg_pattern: config.wrappers.output_regex()?,
            ignore_unsupported_functions: config.wrappers.ignore_unsupported_functions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cxxbind_config::ConfigError;

    #[test]
    fn test_from_config() {
        let mut config = BindConfig::new("demo").with_output_pattern("::f::out$");
        config.macros.ignore_underscore_globals = false;
        config.wrappers.ignore_unsupported_functions = false;

        let options = PreprocessOptions::try_from(&config).unwrap();
        assert!(!options.ignore_underscore_globals);
        assert!(!options.ignore_unsupported_functions);
        assert!(options.output_arg_pattern.unwrap().is_match("::ns::f::out"));
        assert!(options.inout_arg_pattern.is_none());
        assert_eq!(options.internal_path_markers.len(), 3);
    }

    #[test]
    fn test_bad_pattern() {
        let config = BindConfig::new("demo").with_inout_pattern("[");
        let err = PreprocessOptions::try_from(&config).unwrap_err();
        assert!(matches!(
            err,
            PreprocessError::Config(ConfigError::InvalidPattern { .. })
        ));

        let err = PreprocessOptions::default().with_output_pattern("(").unwrap_err();
        assert!(matches!(err, PreprocessError::InvalidPattern { .. }));
    }
}

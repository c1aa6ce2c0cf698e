use serde::{Deserialize, Serialize};
use std::fmt;

/// A position inside a source file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileLocation {
    #[serde(default)]
    pub offset: u32,
    #[serde(default)]
    pub line: u32,
    #[serde(default)]
    pub column: u32,
}

/// Where a declaration was found.
///
/// Symbols without a location are compiler built-ins or synthetic nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub file: String,
    #[serde(default)]
    pub start: FileLocation,
    #[serde(default)]
    pub end: FileLocation,
}

impl Location {
    pub fn new(file: impl Into<String>, line: u32, column: u32) -> Self {
        let start = FileLocation {
            offset: 0,
            line,
            column,
        };
        Self {
            file: file.into(),
            start,
            end: start,
        }
    }

    /// Whether the file path starts with any of `prefixes`.
    pub fn is_under_any(&self, prefixes: &[String]) -> bool {
        prefixes
            .iter()
            .any(|p| !p.is_empty() && self.file.starts_with(p.as_str()))
    }

    /// Whether the file path contains any of `markers`.
    pub fn contains_any(&self, markers: &[String]) -> bool {
        markers
            .iter()
            .any(|m| !m.is_empty() && self.file.contains(m.as_str()))
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.start.line, self.start.column)
    }
}

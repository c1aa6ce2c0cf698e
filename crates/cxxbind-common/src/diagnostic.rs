//! Diagnostic reporting for recoverable conditions.
//!
//! Passes never fail on a single bad declaration. Anything the user should look
//! at (unsupported signatures, type spellings nothing could resolve) is recorded
//! as a [`Diagnostic`] and rendered through miette by the CLI.

use crate::location::Location;
use miette::Diagnostic as MietteDiagnostic;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticLevel {
    Error,
    Warning,
    Info,
}

/// What a diagnostic is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// A function keeps an argument type the binding cannot express.
    UnsupportedSignature,
    /// A type spelling maps to no known base type, class or enum.
    UnresolvedTypeSpelling,
    /// A base class named by a class declaration is not in the graph.
    UnknownBaseClass,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DiagnosticKind::UnsupportedSignature => "unsupported-signature",
            DiagnosticKind::UnresolvedTypeSpelling => "unresolved-type",
            DiagnosticKind::UnknownBaseClass => "unknown-base-class",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Error, MietteDiagnostic)]
#[error("{message}")]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub kind: DiagnosticKind,
    pub message: String,
    pub location: Option<Location>,
    #[help]
    pub help: Option<String>,
}

impl Diagnostic {
    pub fn error(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Error,
            kind,
            message: message.into(),
            location: None,
            help: None,
        }
    }

    pub fn warning(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            level: DiagnosticLevel::Warning,
            kind,
            message: message.into(),
            location: None,
            help: None,
        }
    }

    pub fn with_location(mut self, location: Option<Location>) -> Self {
        self.location = location;
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// One-line rendering: `warning[unsupported-signature] file:line:col: message`.
    pub fn render(&self) -> String {
        let level = match self.level {
            DiagnosticLevel::Error => "error",
            DiagnosticLevel::Warning => "warning",
            DiagnosticLevel::Info => "info",
        };
        match &self.location {
            Some(loc) => format!("{}[{}] {}: {}", level, self.kind, loc, self.message),
            None => format!("{}[{}] {}", level, self.kind, self.message),
        }
    }
}

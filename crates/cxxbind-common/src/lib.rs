mod location;
mod diagnostic;

pub use location::{FileLocation, Location};
pub use diagnostic::{Diagnostic, DiagnosticKind, DiagnosticLevel};

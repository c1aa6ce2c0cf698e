//! Semantic model of C/C++ header declarations.
//!
//! Headers arrive as a [`RawTree`] from the front-end. [`ingest`] registers
//! every node in an [`ObjectManager`], one per run, and computes the facts
//! later passes rely on (base classes, overloads, polymorphism).

mod item;
mod symbol;
mod objects;
mod raw;
mod convert;
mod derive;
mod error;

pub use item::*;
pub use symbol::{Symbol, SymbolId, SymbolInfo, SymbolKind};
pub use objects::{normalize_qualified_name, strip_elaborated, ObjectManager};
pub use raw::{
    RawClass, RawEnum, RawFunction, RawMacro, RawMethod, RawNamespace, RawTree, RawTypedef,
    RawVariable,
};
pub use convert::{ingest, Ingested};
pub use error::{ModelError, Result};

//! Binding preparation passes over a C/C++ symbol graph.
//!
//! [`Preprocessor::process`] takes an ingested graph through four passes:
//!
//! 1. filtering: clear `generate` on built-ins, toolchain headers and
//!    non-public members;
//! 2. constant macro folding: literal macros become root constants;
//! 3. alias resolution: typedef groups share one display name;
//! 4. the wrapper pipeline: callbacks, string arrays, inout and output
//!    arguments are folded into a host-friendly signature, polymorphic
//!    arguments force synchronous calls and unsupported functions are
//!    reported.
//!
//! ```ignore
//! let ingested = cxxbind_model::ingest(RawTree::from_json(&json)?);
//! let result = Preprocessor::new(PreprocessOptions::default()).process(ingested)?;
//! print!("{}", result.unsupported_report());
//! ```

pub mod alias;
pub mod filter;
pub mod macros;
pub mod pipeline;
pub mod wrappers;

mod error;
mod options;
mod preprocess;

pub use alias::AliasTable;
pub use error::{PreprocessError, Result};
pub use filter::should_output;
pub use macros::{parse_literal, ParsedLiteral};
pub use options::PreprocessOptions;
pub use pipeline::WrapperReport;
pub use preprocess::{ExternalSignature, PreprocessResult, Preprocessor};
pub use wrappers::{ArgumentWrapper, WrappedView};

//! C/C++ type spellings: structure, typedef resolution and host mapping.
//!
//! The free functions take a spelling apart without looking anything up.
//! [`TypeResolver`] adds the symbol graph: typedef expansion, support checks
//! and the mapping to [`HostType`].

mod canonical;
mod function_pointer;
mod host;
mod resolve;

pub use canonical::*;
pub use function_pointer::*;
pub use host::*;
pub use resolve::TypeResolver;

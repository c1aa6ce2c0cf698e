//! Types as the host language sees them.

use crate::canonical::{array_base, is_array_type, is_pointer_type, pointer_base, remove_cvref};
use cxxbind_model::strip_elaborated;
use std::fmt;

/// A semantic host-language type. Pointers are transparent: the host sees
/// values, never addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostType {
    Int,
    Float,
    Bool,
    Str,
    /// `void` as a return type.
    None,
    /// Opaque `void *`.
    Any,
    Callable {
        args: Vec<HostType>,
        ret: Box<HostType>,
    },
    Sequence(Box<HostType>),
    Tuple(Vec<HostType>),
    /// A bound class or enum, by display alias.
    Named(String),
    /// A spelling nothing could resolve, passed through as written.
    Unresolved(String),
}

impl HostType {
    pub fn is_unresolved(&self) -> bool {
        match self {
            HostType::Unresolved(_) => true,
            HostType::Callable { args, ret } => {
                ret.is_unresolved() || args.iter().any(HostType::is_unresolved)
            }
            HostType::Sequence(inner) => inner.is_unresolved(),
            HostType::Tuple(items) => items.iter().any(HostType::is_unresolved),
            _ => false,
        }
    }
}

fn join(types: &[HostType]) -> String {
    types
        .iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for HostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostType::Int => f.write_str("int"),
            HostType::Float => f.write_str("float"),
            HostType::Bool => f.write_str("bool"),
            HostType::Str => f.write_str("str"),
            HostType::None => f.write_str("None"),
            HostType::Any => f.write_str("Any"),
            HostType::Callable { args, ret } => write!(f, "Callable[[{}], {}]", join(args), ret),
            HostType::Sequence(inner) => write!(f, "Sequence[{}]", inner),
            HostType::Tuple(items) => write!(f, "Tuple[{}]", join(items)),
            HostType::Named(name) => f.write_str(name),
            HostType::Unresolved(spelling) => f.write_str(spelling),
        }
    }
}

/// Host type of a fundamental spelling, `std::string` and the `<cstdint>`
/// aliases.
pub fn base_host_type(t: &str) -> Option<HostType> {
    let t = remove_cvref(t);
    let t = t.strip_prefix("std::").filter(|rest| is_cstdint(rest)).unwrap_or(t.as_str());
    let host = match t {
        "char" | "signed char" | "unsigned char" | "char8_t" | "char16_t" | "char32_t"
        | "wchar_t" => HostType::Int,
        "short" | "short int" | "signed short" | "signed short int" | "unsigned short"
        | "unsigned short int" => HostType::Int,
        "int" | "signed" | "signed int" | "unsigned" | "unsigned int" => HostType::Int,
        "long" | "long int" | "signed long" | "signed long int" | "unsigned long"
        | "unsigned long int" => HostType::Int,
        "long long" | "long long int" | "signed long long" | "signed long long int"
        | "unsigned long long" | "unsigned long long int" | "__int64" | "unsigned __int64" => {
            HostType::Int
        }
        "float" | "double" | "long double" => HostType::Float,
        "bool" | "_Bool" => HostType::Bool,
        "void" => HostType::None,
        "std::string" => HostType::Str,
        _ if is_cstdint(t) => HostType::Int,
        _ => {
            if is_char_sequence(t) {
                HostType::Str
            } else {
                return None;
            }
        }
    };
    Some(host)
}

fn is_cstdint(t: &str) -> bool {
    matches!(
        t,
        "int8_t"
            | "int16_t"
            | "int32_t"
            | "int64_t"
            | "uint8_t"
            | "uint16_t"
            | "uint32_t"
            | "uint64_t"
            | "size_t"
            | "ssize_t"
            | "intptr_t"
            | "uintptr_t"
            | "ptrdiff_t"
    )
}

/// `char *` or `char [n]`: a C string.
fn is_char_sequence(t: &str) -> bool {
    let base = if is_pointer_type(t) {
        pointer_base(t)
    } else if is_array_type(t) {
        array_base(t)
    } else {
        return false;
    };
    remove_cvref(&base) == "char"
}

/// A keyword type such as `int` or `unsigned long`, or a `<cstdint>` alias.
pub fn is_fundamental_type(t: &str) -> bool {
    let t = strip_elaborated(t);
    !t.contains(['*', '[', '(']) && base_host_type(t).is_some()
}

pub fn is_integer_type(t: &str) -> bool {
    base_host_type(t) == Some(HostType::Int)
}

/// `char *`, `char [n]` or `std::string`.
pub fn is_string_type(t: &str) -> bool {
    base_host_type(t) == Some(HostType::Str)
}

/// An array or pointer of strings: `char **`, `const char *[]`,
/// `std::vector<std::string>`.
pub fn is_string_array_type(t: &str) -> bool {
    let base = if is_array_type(t) {
        array_base(t)
    } else if is_pointer_type(t) {
        pointer_base(t)
    } else {
        return false;
    };
    is_string_type(&base)
}

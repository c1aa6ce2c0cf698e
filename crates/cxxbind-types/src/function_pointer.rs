//! Function pointer spellings: `int (__stdcall *handler)(int, void *)`.

use crate::canonical::{remove_cvref, split_args};
use cxxbind_model::{Function, Variable};
use once_cell::sync::Lazy;
use regex::Regex;

static FUNCTION_POINTER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(.+?)\s*\(\s*(\w*)\s*\*\s*(\w*)\s*\)\s*\((.*)\)$")
        .expect("function pointer pattern is valid")
});

pub fn is_function_pointer_type(t: &str) -> bool {
    FUNCTION_POINTER_RE.is_match(&remove_cvref(t))
}

/// Parse a function pointer spelling into a synthetic function.
///
/// The function takes the declarator name (often empty), the return type, the
/// calling convention if one was spelled, and one anonymous argument per
/// parameter. `(void)` and `()` both mean no parameters.
pub fn function_pointer_type_info(t: &str) -> Option<Function> {
    let t = remove_cvref(t);
    let caps = FUNCTION_POINTER_RE.captures(&t)?;

    let mut function = Function::new(&caps[3], caps[1].trim());
    let convention = &caps[2];
    if !convention.is_empty() {
        function.calling_convention = Some(convention.to_string());
    }
    let params = split_args(&caps[4]);
    if !(params.len() == 1 && params[0] == "void") {
        function.args = params.into_iter().map(Variable::arg).collect();
    }
    Some(function)
}

/// Spell a function pointer type: `void (*)(int, void *)`.
pub fn function_pointer_spelling<S: AsRef<str>>(
    ret_type: &str,
    calling_convention: Option<&str>,
    params: &[S],
) -> String {
    let params: Vec<&str> = params.iter().map(|p| p.as_ref()).collect();
    format!(
        "{} ({}*)({})",
        ret_type,
        calling_convention.map(|c| format!("{} ", c)).unwrap_or_default(),
        params.join(", ")
    )
}

/// The same function pointer type without its last parameter.
pub fn drop_last_parameter(t: &str) -> Option<String> {
    let function = function_pointer_type_info(t)?;
    let params: Vec<&str> = function.args.iter().map(|a| a.ty.as_str()).collect();
    let kept = params.split_last().map(|(_, rest)| rest).unwrap_or(&[]);
    Some(function_pointer_spelling(
        &function.ret_type,
        function.calling_convention.as_deref(),
        kept,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recognizes_function_pointers() {
        assert!(is_function_pointer_type("void (*)(int, void *)"));
        assert!(is_function_pointer_type("int(*)(int,char *)"));
        assert!(is_function_pointer_type("int32 (__cdecl*on_data)(Session *, void *)"));
        assert!(!is_function_pointer_type("int *"));
        assert!(!is_function_pointer_type("std::function<void(int)>"));
        assert!(!is_function_pointer_type("int (&)[4]"));
    }

    #[test]
    fn test_type_info() {
        let f = function_pointer_type_info("int32 (__cdecl*on_data)(Session *, std::map<int, int>, void *)")
            .unwrap();
        assert_eq!(f.info.name, "on_data");
        assert_eq!(f.ret_type, "int32");
        assert_eq!(f.calling_convention.as_deref(), Some("__cdecl"));
        let types: Vec<&str> = f.args.iter().map(|a| a.ty.as_str()).collect();
        assert_eq!(types, vec!["Session *", "std::map<int, int>", "void *"]);
        assert!(f.args.iter().all(|a| a.info.name.is_empty()));
    }

    #[test]
    fn test_no_parameters() {
        assert!(function_pointer_type_info("void (*)(void)").unwrap().args.is_empty());
        assert!(function_pointer_type_info("void (*)()").unwrap().args.is_empty());
        assert!(function_pointer_type_info("int").is_none());
    }

    #[test]
    fn test_drop_last_parameter() {
        assert_eq!(
            drop_last_parameter("void (*)(int, void *)").as_deref(),
            Some("void (*)(int)")
        );
        assert_eq!(
            drop_last_parameter("int (__stdcall*cb)(void *)").as_deref(),
            Some("int (__stdcall *)()")
        );
        assert_eq!(drop_last_parameter("int *"), None);
    }
}

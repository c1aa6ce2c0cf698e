//! Structural analysis of C++ type spellings.
//!
//! Everything here works on the spelling alone: no symbol lookups, no typedef
//! expansion. See [`TypeResolver`](crate::TypeResolver) for the graph-aware
//! half.

/// Split a comma-separated list, respecting nested `<>` and `()`.
/// Returns trimmed, non-empty parts.
///
/// # Example
/// ```
/// use cxxbind_types::split_args;
/// let args = split_args("int, std::map<int, char>, void (*)(int, void *)");
/// assert_eq!(args, vec!["int", "std::map<int, char>", "void (*)(int, void *)"]);
/// ```
pub fn split_args(args: &str) -> Vec<String> {
    let mut result = Vec::new();
    let mut current = String::new();
    let mut depth = 0i32;

    for ch in args.chars() {
        match ch {
            '<' | '(' => {
                depth += 1;
                current.push(ch);
            }
            '>' | ')' => {
                depth -= 1;
                current.push(ch);
            }
            ',' if depth == 0 => {
                let trimmed = current.trim().to_string();
                if !trimmed.is_empty() {
                    result.push(trimmed);
                }
                current.clear();
            }
            _ => current.push(ch),
        }
    }

    let trimmed = current.trim().to_string();
    if !trimmed.is_empty() {
        result.push(trimmed);
    }

    result
}

/// Strip `decorator` as a whole word from either end of `t`.
pub fn remove_decorator<'a>(t: &'a str, decorator: &str) -> &'a str {
    let mut t = t.trim();
    if let Some(rest) = t.strip_suffix(decorator) {
        if rest.is_empty() || rest.ends_with([' ', '*', '&']) {
            t = rest.trim_end();
        }
    }
    if let Some(rest) = t.strip_prefix(decorator) {
        if rest.starts_with(' ') {
            t = rest.trim_start();
        }
    }
    t
}

/// Strip top-level `const` and `volatile` from both ends.
pub fn remove_const_volatile(t: &str) -> String {
    let mut t = t.trim();
    loop {
        let next = remove_decorator(remove_decorator(t, "const"), "volatile");
        if next == t {
            break;
        }
        t = next;
    }
    t.replace("volatile ", "").trim().to_string()
}

/// Strip a trailing `&` or `&&`.
pub fn remove_ref(t: &str) -> String {
    t.trim().trim_end_matches('&').trim_end().to_string()
}

/// Strip cv-qualifiers and references: `const Foo &` -> `Foo`.
pub fn remove_cvref(t: &str) -> String {
    let mut t = t.trim().to_string();
    loop {
        let next = remove_const_volatile(&remove_ref(&remove_const_volatile(&t)));
        if next == t {
            return t;
        }
        t = next;
    }
}

pub fn is_reference_type(t: &str) -> bool {
    remove_const_volatile(t).ends_with('&')
}

/// Whether the outermost level is const: `const int &`, `char * const`.
pub fn is_const_type(t: &str) -> bool {
    let t = remove_ref(t);
    if is_pointer_type(&t) {
        t.ends_with("const")
    } else {
        t.starts_with("const ") || t.ends_with(" const")
    }
}

/// `T *`, after cv-qualifiers and references are removed.
///
/// Function pointers end in `)` and are not pointers here.
pub fn is_pointer_type(t: &str) -> bool {
    remove_cvref(t).ends_with('*')
}

/// Strip `const`/`volatile` qualifying the outermost pointer.
fn remove_trailing_cv(t: &str) -> &str {
    let mut t = t.trim_end();
    loop {
        let next = ["const", "volatile"].iter().find_map(|d| {
            t.strip_suffix(d)
                .filter(|rest| rest.ends_with([' ', '*']))
                .map(str::trim_end)
        });
        match next {
            Some(rest) => t = rest,
            None => return t,
        }
    }
}

/// `char * const` -> `char`, `const char *` -> `const char`.
pub fn pointer_base(t: &str) -> String {
    let t = remove_ref(t);
    // A leading const belongs to the pointee and stays.
    let t = remove_trailing_cv(&t);
    let t = t.strip_suffix('*').unwrap_or(t);
    t.trim().to_string()
}

pub fn is_std_vector(t: &str) -> bool {
    let t = remove_cvref(t);
    t.starts_with("std::vector<") && t.ends_with('>')
}

pub fn is_c_array_type(t: &str) -> bool {
    remove_cvref(t).ends_with(']')
}

/// Fixed-size `T[n]`, unsized `T[]` and `std::vector<T>` alike.
pub fn is_array_type(t: &str) -> bool {
    is_std_vector(t) || is_c_array_type(t)
}

pub fn array_base(t: &str) -> String {
    let t = remove_cvref(t);
    if is_std_vector(&t) {
        let inner = &t["std::vector<".len()..t.len() - 1];
        return split_args(inner).into_iter().next().unwrap_or_default();
    }
    match t.rfind('[') {
        Some(i) => t[..i].trim().to_string(),
        None => t,
    }
}

/// Text between the last brackets; empty for unsized arrays and vectors.
pub fn array_count_str(t: &str) -> String {
    let t = remove_cvref(t);
    if !t.ends_with(']') {
        return String::new();
    }
    match t.rfind('[') {
        Some(i) => t[i + 1..t.len() - 1].trim().to_string(),
        None => String::new(),
    }
}

/// Element count, or 0 when unknown.
pub fn array_count(t: &str) -> usize {
    array_count_str(t).parse().unwrap_or(0)
}

pub fn is_tuple_type(t: &str) -> bool {
    let t = remove_cvref(t);
    t.starts_with("std::tuple<") && t.ends_with('>')
}

pub fn tuple_elements(t: &str) -> Vec<String> {
    let t = remove_cvref(t);
    if !is_tuple_type(&t) {
        return Vec::new();
    }
    split_args(&t["std::tuple<".len()..t.len() - 1])
}

/// `std::tuple<a, b>`.
pub fn make_tuple_type<S: AsRef<str>>(elements: &[S]) -> String {
    let parts: Vec<&str> = elements.iter().map(|e| e.as_ref()).collect();
    format!("std::tuple<{}>", parts.join(", "))
}

/// Append `extra` to a return type, opening a tuple when needed.
/// A `void` return has no value to keep.
pub fn append_to_return(ret: &str, extra: &str) -> String {
    let ret = ret.trim();
    if ret == "void" || ret.is_empty() {
        make_tuple_type(&[extra])
    } else if is_tuple_type(ret) {
        let mut elements = tuple_elements(ret);
        elements.push(extra.to_string());
        make_tuple_type(&elements)
    } else {
        make_tuple_type(&[ret, extra])
    }
}

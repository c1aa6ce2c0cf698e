//! Constant macro folding.
//!
//! A macro whose whole definition is one integer, floating point, string or
//! character literal becomes a constant variable of the root namespace.

use crate::options::PreprocessOptions;
use cxxbind_model::{LiteralValue, ObjectManager, Symbol, SymbolInfo, Variable};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use smol_str::SmolStr;

static INTEGER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(0[bB][01']+|0[xX][0-9a-fA-F']+|0[0-7']*|[1-9][0-9']*)((?i:ull|llu|ul|lu|ll|u|l))?$")
        .expect("integer literal pattern is valid")
});

static FLOAT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^([0-9][0-9']*\.[0-9']*(?:[eE][+-]?[0-9]+)?|\.[0-9][0-9']*(?:[eE][+-]?[0-9]+)?|[0-9][0-9']*[eE][+-]?[0-9]+)([fFlL])?$",
    )
    .expect("floating literal pattern is valid")
});

/// A literal recognized in a macro definition.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLiteral {
    /// C++ type of the literal, e.g. `unsigned long`.
    pub ty: &'static str,
    pub value: LiteralValue,
    /// The trimmed source text.
    pub literal: String,
}

/// Parse a macro definition that is exactly one literal.
pub fn parse_literal(definition: &str) -> Option<ParsedLiteral> {
    let literal = definition.trim();
    if literal.is_empty() {
        return None;
    }
    let (ty, value) = parse_integer(literal)
        .or_else(|| parse_float(literal))
        .or_else(|| parse_string(literal))
        .or_else(|| parse_char(literal))?;
    Some(ParsedLiteral {
        ty,
        value,
        literal: literal.to_string(),
    })
}

/// Integer types with their largest value, LP64 data model.
const INTEGER_TYPES: [(&str, u64); 6] = [
    ("int", i32::MAX as u64),
    ("unsigned int", u32::MAX as u64),
    ("long", i64::MAX as u64),
    ("unsigned long", u64::MAX),
    ("long long", i64::MAX as u64),
    ("unsigned long long", u64::MAX),
];

/// Integer literals take the first candidate type their value fits, as in
/// C++. Decimal literals only widen to unsigned when no signed type fits.
fn parse_integer(literal: &str) -> Option<(&'static str, LiteralValue)> {
    let caps = INTEGER_RE.captures(literal)?;
    let digits = caps[1].replace('\'', "");
    let mut decimal = false;
    let value = if let Some(bin) = digits.strip_prefix("0b").or_else(|| digits.strip_prefix("0B")) {
        u64::from_str_radix(bin, 2).ok()?
    } else if let Some(hex) = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16).ok()?
    } else if digits.len() > 1 && digits.starts_with('0') {
        u64::from_str_radix(&digits[1..], 8).ok()?
    } else {
        decimal = true;
        digits.parse::<u64>().ok()?
    };

    let suffix = caps
        .get(2)
        .map(|m| m.as_str().to_ascii_lowercase())
        .unwrap_or_default();
    let candidates: &[&str] = match (suffix.as_str(), decimal) {
        ("", true) => &["int", "long", "long long", "unsigned long long"],
        ("", false) => &[
            "int",
            "unsigned int",
            "long",
            "unsigned long",
            "long long",
            "unsigned long long",
        ],
        ("u", _) => &["unsigned int", "unsigned long", "unsigned long long"],
        ("l", true) => &["long", "long long", "unsigned long long"],
        ("l", false) => &["long", "unsigned long", "long long", "unsigned long long"],
        ("ul" | "lu", _) => &["unsigned long", "unsigned long long"],
        ("ll", _) => &["long long", "unsigned long long"],
        _ => &["unsigned long long"],
    };
    let ty = candidates
        .iter()
        .copied()
        .find(|candidate| {
            INTEGER_TYPES
                .iter()
                .any(|(name, max)| name == candidate && value <= *max)
        })
        .unwrap_or("unsigned long long");
    let value = match i64::try_from(value) {
        Ok(signed) if !ty.starts_with("unsigned") => LiteralValue::Int(signed),
        _ => LiteralValue::UInt(value),
    };
    Some((ty, value))
}

fn parse_float(literal: &str) -> Option<(&'static str, LiteralValue)> {
    let caps = FLOAT_RE.captures(literal)?;
    let value = caps[1].replace('\'', "").parse::<f64>().ok()?;
    let ty = match caps.get(2).map(|m| m.as_str()) {
        Some("f") | Some("F") => "float",
        Some(_) => "long double",
        None => "double",
    };
    Some((ty, LiteralValue::Float(value)))
}

fn parse_string(literal: &str) -> Option<(&'static str, LiteralValue)> {
    let body = literal.strip_prefix('"')?.strip_suffix('"')?;
    let bytes = unescape(body, '"')?;
    Some((
        "const char *",
        LiteralValue::Str(String::from_utf8_lossy(&bytes).into_owned()),
    ))
}

/// Multi-character literals combine their bytes big-endian: `'ab'` is
/// `0x6162`.
fn parse_char(literal: &str) -> Option<(&'static str, LiteralValue)> {
    let body = literal.strip_prefix('\'')?.strip_suffix('\'')?;
    let bytes = unescape(body, '\'')?;
    if bytes.is_empty() {
        return None;
    }
    let value = bytes
        .iter()
        .try_fold(0u64, |acc, b| acc.checked_mul(256)?.checked_add(u64::from(*b)))?;
    let ty = if bytes.len() <= 4 {
        "unsigned int"
    } else {
        "unsigned long long"
    };
    Some((ty, LiteralValue::UInt(value)))
}

/// Decode C escape sequences. Fails on an unescaped `quote` or a dangling
/// backslash.
fn unescape(body: &str, quote: char) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(c) = chars.next() {
        if c == quote {
            return None;
        }
        if c != '\\' {
            let mut buf = [0u8; 4];
            out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
            continue;
        }
        let escaped = chars.next()?;
        let byte = match escaped {
            'n' => b'\n',
            't' => b'\t',
            'r' => b'\r',
            'a' => 0x07,
            'b' => 0x08,
            'f' => 0x0c,
            'v' => 0x0b,
            '\\' | '"' | '\'' | '?' => escaped as u8,
            'x' => {
                let mut value: u32 = 0;
                let mut digits = 0;
                while let Some(d) = chars.peek().and_then(|d| d.to_digit(16)) {
                    value = value.checked_mul(16)?.checked_add(d)?;
                    digits += 1;
                    chars.next();
                }
                if digits == 0 {
                    return None;
                }
                u8::try_from(value).ok()?
            }
            '0'..='7' => {
                let mut value = escaped.to_digit(8)?;
                for _ in 0..2 {
                    match chars.peek().and_then(|d| d.to_digit(8)) {
                        Some(d) => {
                            value = value * 8 + d;
                            chars.next();
                        }
                        None => break,
                    }
                }
                u8::try_from(value).ok()?
            }
            _ => return None,
        };
        out.push(byte);
    }
    Some(out)
}

/// Fold every literal macro into a constant variable.
///
/// With `treat_const_macros_as_variable` the variables are also registered in
/// the root namespace. With `ignore_underscore_globals` every root variable
/// whose name starts with `_` then leaves the root scope and stops being
/// generated.
pub fn fold_constant_macros(
    objects: &mut ObjectManager,
    options: &PreprocessOptions,
) -> IndexMap<SmolStr, Variable> {
    let root = objects.root();
    let mut const_macros = IndexMap::new();

    for (name, id) in objects.macros() {
        let Symbol::Macro(m) = objects.symbol(*id) else {
            continue;
        };
        let Some(parsed) = parse_literal(&m.definition) else {
            tracing::debug!("macro {} is not a literal", name);
            continue;
        };
        let info = SymbolInfo {
            qualified_name: format!("::{}", name),
            location: m.info.location.clone(),
            brief_comment: m.info.brief_comment.clone(),
            generate: m.info.generate,
            ..SymbolInfo::new(name.clone()).with_parent(root)
        };
        let variable = Variable {
            info,
            ty: parsed.ty.to_string(),
            is_const: true,
            is_static: true,
            value: Some(parsed.value),
            literal: Some(parsed.literal),
            access: Default::default(),
        };
        const_macros.insert(name.clone(), variable);
    }

    if options.treat_const_macros_as_variable {
        for (name, variable) in &const_macros {
            let id = objects.insert(Symbol::Variable(variable.clone()));
            if let Some(scope) = objects.symbol_mut(root).scope_mut() {
                scope.variables.insert(name.clone(), id);
            }
        }
    }

    if options.ignore_underscore_globals {
        let hidden: Vec<_> = objects
            .symbol(root)
            .scope()
            .map(|s| {
                s.variables
                    .iter()
                    .filter(|(name, _)| name.starts_with('_'))
                    .map(|(name, id)| (name.clone(), *id))
                    .collect()
            })
            .unwrap_or_default();
        for (name, id) in hidden {
            objects.symbol_mut(id).info_mut().generate = false;
            if let Some(scope) = objects.symbol_mut(root).scope_mut() {
                scope.variables.shift_remove(&name);
            }
            if let Some(variable) = const_macros.get_mut(&name) {
                variable.info.generate = false;
            }
        }
    }

    tracing::info!("folded {} constant macros", const_macros.len());
    const_macros
}

#[cfg(test)]
mod tests {
    use super::*;
    use cxxbind_model::Macro;

    fn parsed(definition: &str) -> (&'static str, LiteralValue) {
        let p = parse_literal(definition).unwrap_or_else(|| panic!("{} is a literal", definition));
        (p.ty, p.value)
    }

    #[test]
    fn test_integers() {
        assert_eq!(parsed("42"), ("int", LiteralValue::Int(42)));
        assert_eq!(parsed(" 0x1F "), ("int", LiteralValue::Int(31)));
        assert_eq!(parsed("017"), ("int", LiteralValue::Int(15)));
        assert_eq!(parsed("0"), ("int", LiteralValue::Int(0)));
        assert_eq!(parsed("0b1010"), ("int", LiteralValue::Int(10)));
        assert_eq!(parsed("1'000'000"), ("int", LiteralValue::Int(1_000_000)));
        assert_eq!(parsed("10u"), ("unsigned int", LiteralValue::UInt(10)));
        assert_eq!(parsed("10L"), ("long", LiteralValue::Int(10)));
        assert_eq!(parsed("10UL"), ("unsigned long", LiteralValue::UInt(10)));
        assert_eq!(parsed("10lu"), ("unsigned long", LiteralValue::UInt(10)));
        assert_eq!(parsed("10ll"), ("long long", LiteralValue::Int(10)));
        assert_eq!(parsed("10ULL"), ("unsigned long long", LiteralValue::UInt(10)));
        assert_eq!(
            parsed("0xFFFFFFFFFFFFFFFF"),
            ("unsigned long", LiteralValue::UInt(u64::MAX))
        );
        assert!(parse_literal("08").is_none());
        assert!(parse_literal("-1").is_none());
    }

    #[test]
    fn test_integer_widens_to_fitting_type() {
        assert_eq!(parsed("0xFFFFFFFF"), ("unsigned int", LiteralValue::UInt(0xFFFF_FFFF)));
        assert_eq!(parsed("2147483647"), ("int", LiteralValue::Int(2_147_483_647)));
        assert_eq!(parsed("3000000000"), ("long", LiteralValue::Int(3_000_000_000)));
        assert_eq!(parsed("0x100000000"), ("long", LiteralValue::Int(0x1_0000_0000)));
        assert_eq!(parsed("5000000000u"), ("unsigned long", LiteralValue::UInt(5_000_000_000)));
        assert_eq!(
            parsed("18446744073709551615"),
            ("unsigned long long", LiteralValue::UInt(u64::MAX))
        );
        assert_eq!(
            parsed("0x7fffffffffffffffLL"),
            ("long long", LiteralValue::Int(i64::MAX))
        );
    }

    #[test]
    fn test_floats() {
        assert_eq!(parsed("1.5"), ("double", LiteralValue::Float(1.5)));
        assert_eq!(parsed(".5"), ("double", LiteralValue::Float(0.5)));
        assert_eq!(parsed("1."), ("double", LiteralValue::Float(1.0)));
        assert_eq!(parsed("1e3"), ("double", LiteralValue::Float(1000.0)));
        assert_eq!(parsed("2.5e-1f"), ("float", LiteralValue::Float(0.25)));
        assert_eq!(parsed("3.0L"), ("long double", LiteralValue::Float(3.0)));
    }

    #[test]
    fn test_strings_and_chars() {
        assert_eq!(
            parsed(r#""a\tb\x41\101\"""#),
            ("const char *", LiteralValue::Str("a\tbAA\"".to_string()))
        );
        assert_eq!(parsed("'a'"), ("unsigned int", LiteralValue::UInt(97)));
        assert_eq!(parsed(r"'\n'"), ("unsigned int", LiteralValue::UInt(10)));
        assert_eq!(parsed("'ab'"), ("unsigned int", LiteralValue::UInt(0x6162)));
        assert_eq!(
            parsed("'abcde'"),
            ("unsigned long long", LiteralValue::UInt(0x61_6263_6465))
        );
        assert!(parse_literal(r#""a" "b""#).is_none());
        assert!(parse_literal("''").is_none());
    }

    #[test]
    fn test_non_literals() {
        for definition in ["", "FOO", "(1 + 2)", "__declspec(dllexport)", "0x", "1.5.2"] {
            assert!(parse_literal(definition).is_none(), "{:?}", definition);
        }
    }

    fn with_macros(definitions: &[(&str, &str)]) -> ObjectManager {
        let mut objects = ObjectManager::new();
        for (name, definition) in definitions {
            objects.insert_macro(Symbol::Macro(Macro {
                info: SymbolInfo::new(*name),
                definition: definition.to_string(),
            }));
        }
        objects
    }

    #[test]
    fn test_fold_into_root_namespace() {
        let mut objects = with_macros(&[("MAX_LEN", "64"), ("API", "__stdcall"), ("_GUARD", "1")]);
        let folded = fold_constant_macros(&mut objects, &PreprocessOptions::default());

        assert_eq!(folded.len(), 2);
        let max_len = objects.get("MAX_LEN").unwrap().as_variable().unwrap();
        assert!(max_len.is_const && max_len.is_static);
        assert_eq!(max_len.ty, "int");
        assert_eq!(max_len.value, Some(LiteralValue::Int(64)));

        let root = objects.symbol(objects.root()).scope().unwrap();
        assert!(root.variables.contains_key("MAX_LEN"));
        assert!(!root.variables.contains_key("_GUARD"));
        assert!(!folded["_GUARD"].info.generate);
        assert!(!objects.get("_GUARD").unwrap().info().generate);
    }

    #[test]
    fn test_fold_without_registration() {
        let mut objects = with_macros(&[("MAX_LEN", "64"), ("_GUARD", "1")]);
        let options = PreprocessOptions::default()
            .with_const_macros_as_variables(false)
            .with_ignore_underscore_globals(false);
        let folded = fold_constant_macros(&mut objects, &options);

        assert_eq!(folded.len(), 2);
        assert!(folded["_GUARD"].info.generate);
        assert!(!objects.contains("MAX_LEN"));
    }
}

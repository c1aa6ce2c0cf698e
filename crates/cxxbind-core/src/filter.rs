//! Output eligibility.
//!
//! Filtering never removes a symbol. It only clears `generate`, so the graph
//! stays complete for type resolution.

use crate::options::PreprocessOptions;
use cxxbind_model::{Access, ObjectManager, Symbol};

/// Whether a declaration belongs in the generated binding.
///
/// Anonymous symbols, symbols without a location (built-ins), declarations
/// from toolchain or SDK headers and non-public members are not.
pub fn should_output(symbol: &Symbol, options: &PreprocessOptions) -> bool {
    let info = symbol.info();
    if info.name.is_empty() {
        return false;
    }
    let Some(location) = &info.location else {
        return false;
    };
    if location.is_under_any(&options.internal_include_paths)
        || location.contains_any(&options.internal_path_markers)
    {
        return false;
    }
    match symbol {
        Symbol::Method(m) => m.access == Access::Public,
        Symbol::Variable(v) => v.access == Access::Public,
        _ => true,
    }
}

/// Set `generate` on every symbol except the root namespace. Returns the
/// number of symbols kept.
pub fn apply_filter(objects: &mut ObjectManager, options: &PreprocessOptions) -> usize {
    let root = objects.root();
    let decisions: Vec<_> = objects
        .iter()
        .filter(|(id, _)| *id != root)
        .map(|(id, symbol)| (id, should_output(symbol, options)))
        .collect();

    let mut kept = 0;
    for (id, generate) in decisions {
        let symbol = objects.symbol_mut(id);
        if !generate {
            tracing::debug!("filtered out {}", symbol);
        } else {
            kept += 1;
        }
        symbol.info_mut().generate = generate;
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use cxxbind_common::Location;
    use cxxbind_model::{Class, Function, Method, SymbolInfo, Variable};

    fn at(file: &str) -> Option<Location> {
        Some(Location::new(file, 1, 1))
    }

    fn function(name: &str, location: Option<Location>) -> Symbol {
        let mut f = Function::new(name, "void");
        f.info.location = location;
        Symbol::Function(f)
    }

    #[test]
    fn test_requires_name_and_location() {
        let options = PreprocessOptions::default();
        assert!(should_output(&function("f", at("api.h")), &options));
        assert!(!should_output(&function("", at("api.h")), &options));
        assert!(!should_output(&function("__builtin_expect", None), &options));
    }

    #[test]
    fn test_internal_headers() {
        let options = PreprocessOptions::default()
            .with_internal_include_paths(&["C:/sdk/include"]);
        assert!(!should_output(&function("printf", at("/usr/include/stdio.h")), &options));
        assert!(!should_output(
            &function("GetTickCount", at("C:/Program Files (x86)/Windows Kits/10/um/winbase.h")),
            &options
        ));
        assert!(!should_output(&function("sdk_init", at("C:/sdk/include/sdk.h")), &options));
        assert!(should_output(&function("sdk_init", at("C:/work/sdk/include/sdk.h")), &options));

        let options = PreprocessOptions::default().with_internal_path_markers(&[]);
        assert!(should_output(&function("printf", at("/usr/include/stdio.h")), &options));
    }

    #[test]
    fn test_member_access() {
        let options = PreprocessOptions::default();
        let mut m = Method::new(Function::new("run", "void"));
        m.function.info.location = at("api.h");
        assert!(should_output(&Symbol::Method(m.clone()), &options));
        m.access = Access::Protected;
        assert!(!should_output(&Symbol::Method(m), &options));

        let mut v = Variable::new("secret", "int");
        v.info.location = at("api.h");
        v.access = Access::Private;
        assert!(!should_output(&Symbol::Variable(v), &options));
    }

    #[test]
    fn test_apply_filter_keeps_symbols_queryable() {
        let mut objects = ObjectManager::new();
        let root = objects.root();
        let mut kept = Class::new("Api");
        kept.info = SymbolInfo::new("Api").with_parent(root).with_location(at("api.h"));
        let mut hidden = Class::new("FILE");
        hidden.info = SymbolInfo::new("FILE")
            .with_parent(root)
            .with_location(at("/usr/include/stdio.h"));
        objects.insert(Symbol::Class(kept));
        objects.insert(Symbol::Class(hidden));

        assert_eq!(apply_filter(&mut objects, &PreprocessOptions::default()), 1);
        assert!(objects.get("Api").unwrap().info().generate);
        assert!(!objects.get("FILE").unwrap().info().generate);
        assert!(objects.symbol(root).info().generate);
    }
}

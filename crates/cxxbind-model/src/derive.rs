//! Facts computed once every node is registered.

use crate::objects::ObjectManager;
use crate::symbol::{Symbol, SymbolId};
use cxxbind_common::{Diagnostic, DiagnosticKind};
use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;

/// Link base classes, then mark overloads, polymorphic classes and classes
/// with unresolved pure virtual methods.
pub fn derive_facts(objects: &mut ObjectManager) -> Vec<Diagnostic> {
    let diagnostics = link_supers(objects);
    mark_overloads(objects);
    mark_polymorphic(objects);
    mark_pure_virtual(objects);
    diagnostics
}

fn class_ids(objects: &ObjectManager) -> Vec<SymbolId> {
    objects
        .iter()
        .filter(|(_, s)| matches!(s, Symbol::Class(_)))
        .map(|(id, _)| id)
        .collect()
}

/// Resolve base class spellings from the scope enclosing each class.
fn link_supers(objects: &mut ObjectManager) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    for id in class_ids(objects) {
        let symbol = objects.symbol(id);
        let Some(class) = symbol.as_class() else {
            continue;
        };
        let scope = symbol.info().parent.unwrap_or(objects.root());

        let mut supers = Vec::new();
        for name in &class.super_names {
            match find_class(objects, scope, name) {
                Some(base) => supers.push(base),
                None => {
                    tracing::warn!("base class {} of {} not found", name, symbol.qualified_name());
                    diagnostics.push(
                        Diagnostic::warning(
                            DiagnosticKind::UnknownBaseClass,
                            format!(
                                "base class `{}` of `{}` is not declared in the input",
                                name,
                                symbol.qualified_name()
                            ),
                        )
                        .with_location(symbol.info().location.clone()),
                    );
                }
            }
        }

        if let Some(class) = objects.symbol_mut(id).as_class_mut() {
            class.supers = supers;
        }
    }
    diagnostics
}

/// A class named `name` as seen from `scope`, looking through typedefs.
fn find_class(objects: &ObjectManager, scope: SymbolId, name: &str) -> Option<SymbolId> {
    let id = objects.lookup_from(scope, name)?;
    match objects.symbol(id) {
        Symbol::Class(_) => Some(id),
        Symbol::Typedef(_) => {
            let resolved = objects.resolve_all_typedef(objects.symbol(id).qualified_name()).ok()?;
            match resolved {
                Symbol::Class(_) => objects.get_id(resolved.qualified_name()).ok(),
                _ => None,
            }
        }
        _ => None,
    }
}

/// Every member of a same-name group of two or more is an overload.
fn mark_overloads(objects: &mut ObjectManager) {
    let overloaded: Vec<SymbolId> = objects
        .scope_ids()
        .into_iter()
        .filter_map(|id| objects.symbol(id).scope())
        .flat_map(|scope| scope.functions.values())
        .filter(|group| group.len() >= 2)
        .flatten()
        .copied()
        .collect();

    for id in overloaded {
        if let Some(f) = objects.symbol_mut(id).as_function_mut() {
            f.has_overload = true;
        }
    }
}

fn has_virtual_member(objects: &ObjectManager, id: SymbolId) -> bool {
    let Some(class) = objects.symbol(id).as_class() else {
        return false;
    };
    class
        .member_functions()
        .into_iter()
        .filter_map(|m| objects.symbol(m).as_method())
        .any(|m| m.is_virtual)
}

/// A class is polymorphic when it or any of its bases declares a virtual
/// member.
fn mark_polymorphic(objects: &mut ObjectManager) {
    let classes = class_ids(objects);
    let mut polymorphic: FxHashSet<SymbolId> = classes
        .iter()
        .copied()
        .filter(|id| has_virtual_member(objects, *id))
        .collect();

    // Propagate to derived classes until nothing changes.
    loop {
        let before = polymorphic.len();
        for id in &classes {
            if polymorphic.contains(id) {
                continue;
            }
            let inherits = objects
                .symbol(*id)
                .as_class()
                .map(|c| c.supers.iter().any(|b| polymorphic.contains(b)))
                .unwrap_or(false);
            if inherits {
                polymorphic.insert(*id);
            }
        }
        if polymorphic.len() == before {
            break;
        }
    }

    for id in classes {
        let is_polymorphic = polymorphic.contains(&id);
        if let Some(class) = objects.symbol_mut(id).as_class_mut() {
            class.is_polymorphic = is_polymorphic;
        }
    }
}

/// Names of pure virtual methods still visible in `id`: its own, plus those
/// inherited and not overridden by a non-pure method of the same name.
fn visible_pure_virtuals(
    objects: &ObjectManager,
    id: SymbolId,
    memo: &mut FxHashMap<SymbolId, FxHashSet<SmolStr>>,
    visiting: &mut FxHashSet<SymbolId>,
) -> FxHashSet<SmolStr> {
    if let Some(done) = memo.get(&id) {
        return done.clone();
    }
    let Some(class) = objects.symbol(id).as_class() else {
        return FxHashSet::default();
    };
    if !visiting.insert(id) {
        return FxHashSet::default();
    }

    let mut pure = FxHashSet::default();
    let mut concrete = FxHashSet::default();
    for (name, group) in &class.scope.functions {
        for m in group.iter().filter_map(|m| objects.symbol(*m).as_method()) {
            if m.is_pure_virtual {
                pure.insert(name.clone());
            } else {
                concrete.insert(name.clone());
            }
        }
    }
    for base in &class.supers {
        for name in visible_pure_virtuals(objects, *base, memo, visiting) {
            if !concrete.contains(&name) {
                pure.insert(name);
            }
        }
    }

    visiting.remove(&id);
    memo.insert(id, pure.clone());
    pure
}

fn mark_pure_virtual(objects: &mut ObjectManager) {
    let mut memo = FxHashMap::default();
    let mut visiting = FxHashSet::default();
    let flags: Vec<(SymbolId, bool)> = class_ids(objects)
        .into_iter()
        .map(|id| {
            let pure = visible_pure_virtuals(objects, id, &mut memo, &mut visiting);
            (id, !pure.is_empty())
        })
        .collect();

    for (id, is_pure_virtual) in flags {
        if let Some(class) = objects.symbol_mut(id).as_class_mut() {
            class.is_pure_virtual = is_pure_virtual;
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::convert::ingest;
    use crate::raw::RawTree;
    use crate::ObjectManager;
    use cxxbind_common::DiagnosticKind;

    fn tree(json: &str) -> crate::Ingested {
        ingest(RawTree::from_json(json).unwrap())
    }

    fn class_flags(objects: &ObjectManager, name: &str) -> (bool, bool) {
        let class = objects.get(name).unwrap().as_class().unwrap();
        (class.is_polymorphic, class.is_pure_virtual)
    }

    const HIERARCHY: &str = r#"{ "root": { "namespaces": [{ "name": "ui", "classes": [
        { "name": "Widget",
          "methods": [{ "name": "paint", "ret_type": "void", "is_pure_virtual": true },
                      { "name": "id", "ret_type": "int" }] },
        { "name": "Button", "supers": ["Widget"],
          "methods": [{ "name": "paint", "ret_type": "void", "is_virtual": true }] },
        { "name": "Panel", "supers": ["ui::Widget"] },
        { "name": "Plain",
          "methods": [{ "name": "id", "ret_type": "int" }] }
    ] }] } }"#;

    #[test]
    fn test_supers_are_linked_from_enclosing_scope() {
        let ingested = tree(HIERARCHY);
        let objects = &ingested.objects;
        let widget = objects.get_id("::ui::Widget").unwrap();
        let button = objects.get("::ui::Button").unwrap().as_class().unwrap();
        let panel = objects.get("::ui::Panel").unwrap().as_class().unwrap();
        assert_eq!(button.supers, vec![widget]);
        assert_eq!(panel.supers, vec![widget]);
        assert!(ingested.diagnostics.is_empty());
    }

    #[test]
    fn test_polymorphism_and_pure_virtuals() {
        let objects = tree(HIERARCHY).objects;
        assert_eq!(class_flags(&objects, "::ui::Widget"), (true, true));
        // Overrides paint with a concrete method.
        assert_eq!(class_flags(&objects, "::ui::Button"), (true, false));
        // Inherits both polymorphism and the abstract paint.
        assert_eq!(class_flags(&objects, "::ui::Panel"), (true, true));
        assert_eq!(class_flags(&objects, "::ui::Plain"), (false, false));
    }

    #[test]
    fn test_virtual_destructor_makes_polymorphic() {
        let objects = tree(
            r#"{ "root": { "classes": [{ "name": "Handle",
                "destructor": { "name": "~Handle", "ret_type": "void", "is_virtual": true } }] } }"#,
        )
        .objects;
        assert_eq!(class_flags(&objects, "::Handle"), (true, false));
    }

    #[test]
    fn test_unknown_base_is_reported() {
        let ingested = tree(
            r#"{ "root": { "classes": [{ "name": "D", "supers": ["Missing"] }] } }"#,
        );
        let d = ingested.objects.get("::D").unwrap().as_class().unwrap();
        assert!(d.supers.is_empty());
        assert_eq!(ingested.diagnostics.len(), 1);
        assert_eq!(ingested.diagnostics[0].kind, DiagnosticKind::UnknownBaseClass);
    }

    #[test]
    fn test_base_through_typedef() {
        let objects = tree(
            r#"{ "root": {
                "classes": [{ "name": "_Base", "methods": [{ "name": "f", "ret_type": "void", "is_virtual": true }] },
                            { "name": "Derived", "supers": ["BaseT"] }],
                "typedefs": [{ "name": "BaseT", "target": "struct _Base" }]
            } }"#,
        )
        .objects;
        assert_eq!(class_flags(&objects, "::Derived"), (true, false));
    }

    #[test]
    fn test_overloads_are_marked() {
        let objects = tree(
            r#"{ "root": {
                "functions": [
                    { "name": "f", "ret_type": "void", "args": [{ "name": "a", "type": "int" }] },
                    { "name": "f", "ret_type": "void", "args": [{ "name": "a", "type": "double" }] },
                    { "name": "g", "ret_type": "void" }
                ],
                "classes": [{ "name": "C", "methods": [
                    { "name": "m", "ret_type": "void" },
                    { "name": "m", "ret_type": "void", "args": [{ "name": "x", "type": "int" }] }
                ] }]
            } }"#,
        )
        .objects;
        for id in objects.function_ids() {
            let f = objects.symbol(id).as_function().unwrap();
            assert_eq!(f.has_overload, f.info.name != "g", "{}", f.info.qualified_name);
        }
    }
}

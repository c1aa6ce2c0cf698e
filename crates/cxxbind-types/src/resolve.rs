//! Typedef-aware type resolution against one symbol graph.

use crate::canonical::{
    array_base, array_count_str, is_array_type, is_c_array_type, is_pointer_type,
    is_std_vector, is_tuple_type, pointer_base, remove_cvref, tuple_elements,
};
use crate::function_pointer::{function_pointer_type_info, is_function_pointer_type};
use crate::host::{base_host_type, HostType};
use cxxbind_model::{normalize_qualified_name, strip_elaborated, ObjectManager, Symbol};
use rustc_hash::{FxHashMap, FxHashSet};
use std::cell::RefCell;

/// Resolves type spellings through the typedefs of an [`ObjectManager`].
///
/// Results of [`resolve_to_basic_type`](Self::resolve_to_basic_type) are
/// cached for the lifetime of the resolver, so a resolver must not outlive
/// mutations of the typedefs it has seen.
pub struct TypeResolver<'a> {
    objects: &'a ObjectManager,
    cache: RefCell<FxHashMap<String, String>>,
}

impl<'a> TypeResolver<'a> {
    pub fn new(objects: &'a ObjectManager) -> Self {
        Self {
            objects,
            cache: RefCell::new(FxHashMap::default()),
        }
    }

    pub fn objects(&self) -> &'a ObjectManager {
        self.objects
    }

    /// Expand typedefs down to a non-typedef leaf, keeping pointer and array
    /// structure: `const PFoo &` with `typedef struct _Foo *PFoo` becomes
    /// `_Foo *`. Containers become `T []`.
    ///
    /// The result is a fixed point: resolving it again returns it unchanged.
    pub fn resolve_to_basic_type(&self, t: &str) -> String {
        if let Some(hit) = self.cache.borrow().get(t) {
            return hit.clone();
        }
        let resolved = self.resolve(t);
        self.cache
            .borrow_mut()
            .insert(t.to_string(), resolved.clone());
        resolved
    }

    fn resolve(&self, t: &str) -> String {
        let t = remove_cvref(t);
        let t = strip_elaborated(&t);
        if is_function_pointer_type(t) {
            return t.to_string();
        }
        if is_pointer_type(t) {
            return format!("{} *", self.resolve(&pointer_base(t)));
        }
        if is_std_vector(t) {
            return format!("{} []", self.resolve(&array_base(t)));
        }
        if is_c_array_type(t) {
            return format!("{} [{}]", self.resolve(&array_base(t)), array_count_str(t));
        }

        if let Ok(Symbol::Typedef(td)) = self.objects.get(t) {
            // A typedef that leads back to itself has no finite expansion and
            // stays a leaf.
            if !self.is_cyclic(&td.info.qualified_name) {
                return self.resolve(&td.target);
            }
        }
        t.to_string()
    }

    /// Whether the target chain of a typedef, looking through decorations,
    /// comes back to it.
    fn is_cyclic(&self, qualified_name: &str) -> bool {
        let mut pending = vec![qualified_name.to_string()];
        let mut seen = FxHashSet::default();
        while let Some(current) = pending.pop() {
            let Ok(Symbol::Typedef(td)) = self.objects.get(&current) else {
                continue;
            };
            let next = normalize_qualified_name(&self.remove_decorations(&td.target));
            if next == qualified_name {
                return true;
            }
            if seen.insert(next.clone()) {
                pending.push(next);
            }
        }
        false
    }

    /// Strip every pointer, array and cv-qualifier: `const Foo *[4]` -> `Foo`.
    pub fn remove_decorations(&self, t: &str) -> String {
        let t = remove_cvref(t);
        let t = strip_elaborated(&t);
        if is_function_pointer_type(t) {
            return t.to_string();
        }
        if is_pointer_type(t) {
            return self.remove_decorations(&pointer_base(t));
        }
        if is_array_type(t) {
            return self.remove_decorations(&array_base(t));
        }
        t.to_string()
    }

    /// Indirection depth of two or more is never supported: pointer to
    /// pointer, pointer to array, array of pointers or arrays.
    pub fn is_type_supported(&self, t: &str) -> bool {
        let t = self.resolve_to_basic_type(t);
        let base = if is_pointer_type(&t) {
            pointer_base(&t)
        } else if is_array_type(&t) {
            array_base(&t)
        } else {
            return true;
        };
        !(is_pointer_type(&base) || is_array_type(&base))
    }

    /// Map a spelling to its host type.
    ///
    /// Spellings that reach no base type, class or enum are logged and come
    /// back as [`HostType::Unresolved`].
    pub fn cpp_type_to_host(&self, t: &str) -> HostType {
        self.to_host(t, &mut FxHashSet::default())
    }

    fn to_host(&self, t: &str, visiting: &mut FxHashSet<String>) -> HostType {
        let t = remove_cvref(t);
        let t = strip_elaborated(&t);

        if let Some(host) = base_host_type(t) {
            return host;
        }
        if let Some(function) = function_pointer_type_info(t) {
            let args = function
                .args
                .iter()
                .map(|a| self.to_host(&a.ty, visiting))
                .collect();
            let ret = self.to_host(&function.ret_type, visiting);
            return HostType::Callable {
                args,
                ret: Box::new(ret),
            };
        }
        if is_pointer_type(t) {
            let base = pointer_base(t);
            if remove_cvref(&base) == "void" {
                return HostType::Any;
            }
            return self.to_host(&base, visiting);
        }
        if is_array_type(t) {
            return HostType::Sequence(Box::new(self.to_host(&array_base(t), visiting)));
        }
        if is_tuple_type(t) {
            return HostType::Tuple(
                tuple_elements(t)
                    .iter()
                    .map(|e| self.to_host(e, visiting))
                    .collect(),
            );
        }

        match self.objects.get(t) {
            Ok(Symbol::Class(c)) => return HostType::Named(c.info.alias.to_string()),
            Ok(Symbol::Enum(e)) => return HostType::Named(e.info.alias.to_string()),
            Ok(Symbol::Typedef(td)) => {
                if visiting.insert(td.info.qualified_name.clone()) {
                    return self.to_host(&td.target, visiting);
                }
                return HostType::Named(td.info.alias.to_string());
            }
            _ => {}
        }

        tracing::warn!("unresolved type spelling `{}`", t);
        HostType::Unresolved(t.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cxxbind_model::{Class, Enum, SymbolInfo, Typedef};

    fn typedef(objects: &mut ObjectManager, name: &str, target: &str) {
        let root = objects.root();
        objects.insert(Symbol::Typedef(Typedef {
            info: SymbolInfo::new(name).with_parent(root),
            target: target.to_string(),
        }));
    }

    fn class(objects: &mut ObjectManager, name: &str) {
        let mut c = Class::new(name);
        c.info.parent = Some(objects.root());
        objects.insert(Symbol::Class(c));
    }

    fn sample() -> ObjectManager {
        let mut objects = ObjectManager::new();
        class(&mut objects, "_Order");
        typedef(&mut objects, "OrderT", "struct _Order");
        typedef(&mut objects, "POrder", "OrderT *");
        typedef(&mut objects, "int32", "int");
        typedef(&mut objects, "Names", "char *[8]");
        typedef(&mut objects, "Loop", "Loop");
        typedef(&mut objects, "A", "B *");
        typedef(&mut objects, "B", "A");
        typedef(&mut objects, "Handler", "void (*)(int32, void *)");
        typedef(&mut objects, "Row", "int [4]");
        objects
    }

    #[test]
    fn test_resolve_to_basic_type() {
        let objects = sample();
        let r = TypeResolver::new(&objects);
        assert_eq!(r.resolve_to_basic_type("const int32 &"), "int");
        assert_eq!(r.resolve_to_basic_type("POrder"), "_Order *");
        assert_eq!(r.resolve_to_basic_type("const POrder *"), "_Order * *");
        assert_eq!(r.resolve_to_basic_type("int32 [4]"), "int [4]");
        assert_eq!(r.resolve_to_basic_type("std::vector<int32>"), "int []");
        assert_eq!(r.resolve_to_basic_type("Names"), "char * [8]");
        assert_eq!(r.resolve_to_basic_type("struct _Order"), "_Order");
        assert_eq!(r.resolve_to_basic_type("Unknown"), "Unknown");
        assert_eq!(r.resolve_to_basic_type("Handler"), "void (*)(int32, void *)");
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let objects = sample();
        let r = TypeResolver::new(&objects);
        for t in [
            "const int32 &",
            "POrder",
            "const POrder *",
            "Names",
            "std::vector<POrder>",
            "Loop",
            "Loop *",
            "A",
            "B",
            "A **",
            "Handler",
            "char * const",
        ] {
            let once = r.resolve_to_basic_type(t);
            assert_eq!(r.resolve_to_basic_type(&once), once, "not a fixed point: {}", t);
        }
    }

    #[test]
    fn test_self_referential_typedefs_terminate() {
        let objects = sample();
        let r = TypeResolver::new(&objects);
        assert_eq!(r.resolve_to_basic_type("Loop"), "Loop");
        assert_eq!(r.resolve_to_basic_type("A"), "A");
        assert_eq!(r.resolve_to_basic_type("B *"), "B *");
        assert_eq!(r.cpp_type_to_host("Loop"), HostType::Named("Loop".into()));
    }

    #[test]
    fn test_remove_decorations() {
        let objects = sample();
        let r = TypeResolver::new(&objects);
        assert_eq!(r.remove_decorations("const OrderT *[4]"), "OrderT");
        assert_eq!(r.remove_decorations("struct _Order &"), "_Order");
    }

    #[test]
    fn test_is_type_supported() {
        let objects = sample();
        let r = TypeResolver::new(&objects);
        assert!(r.is_type_supported("int"));
        assert!(r.is_type_supported("POrder"));
        assert!(r.is_type_supported("char [16]"));
        assert!(!r.is_type_supported("int **"));
        assert!(!r.is_type_supported("POrder *"));
        assert!(!r.is_type_supported("Names"));
        assert!(!r.is_type_supported("int [2][3]"));
        assert!(!r.is_type_supported("Row *"));
        assert!(r.is_type_supported("Handler"));
    }

    #[test]
    fn test_cpp_type_to_host() {
        let mut objects = sample();
        let root = objects.root();
        let mut side = Enum {
            info: SymbolInfo::new("Side").with_parent(root),
            underlying: "int".into(),
            is_strong_typed: true,
            values: Default::default(),
        };
        side.info.alias = "OrderSide".into();
        objects.insert(Symbol::Enum(side));

        let r = TypeResolver::new(&objects);
        assert_eq!(r.cpp_type_to_host("int32").to_string(), "int");
        assert_eq!(r.cpp_type_to_host("const char *").to_string(), "str");
        assert_eq!(r.cpp_type_to_host("void").to_string(), "None");
        assert_eq!(r.cpp_type_to_host("void *").to_string(), "Any");
        assert_eq!(r.cpp_type_to_host("POrder").to_string(), "_Order");
        assert_eq!(r.cpp_type_to_host("enum Side").to_string(), "OrderSide");
        assert_eq!(r.cpp_type_to_host("double [3]").to_string(), "Sequence[float]");
        assert_eq!(
            r.cpp_type_to_host("std::vector<std::string>").to_string(),
            "Sequence[str]"
        );
        assert_eq!(
            r.cpp_type_to_host("Handler").to_string(),
            "Callable[[int, Any], None]"
        );
        assert_eq!(
            r.cpp_type_to_host("std::tuple<bool, int32>").to_string(),
            "Tuple[bool, int]"
        );
        assert_eq!(
            r.cpp_type_to_host("Mystery"),
            HostType::Unresolved("Mystery".into())
        );
    }
}

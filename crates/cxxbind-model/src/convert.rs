//! Raw tree to symbol graph conversion.

use crate::derive;
use crate::item::{Class, Enum, Function, Macro, Method, Namespace, Scope, Typedef, Variable};
use crate::objects::ObjectManager;
use crate::raw::{
    RawClass, RawEnum, RawFunction, RawMacro, RawMethod, RawNamespace, RawTree, RawTypedef,
    RawVariable,
};
use crate::symbol::{Symbol, SymbolId, SymbolInfo};
use cxxbind_common::Diagnostic;
use smol_str::SmolStr;

/// A registered graph plus what registration found along the way.
#[derive(Debug)]
pub struct Ingested {
    pub objects: ObjectManager,
    pub diagnostics: Vec<Diagnostic>,
}

/// Register every node of `raw` and compute the derived facts
/// (base classes, overloads, polymorphism, pure virtuals).
pub fn ingest(raw: RawTree) -> Ingested {
    let RawTree { root, macros } = raw;
    let mut converter = Converter {
        objects: ObjectManager::new(),
    };
    let root_id = converter.objects.root();
    converter.convert_namespace_body(root, root_id);
    for (name, raw_macro) in macros {
        converter.convert_macro(name, raw_macro);
    }

    let mut objects = converter.objects;
    let diagnostics = derive::derive_facts(&mut objects);
    tracing::debug!("ingested {} symbols", objects.len());
    Ingested {
        objects,
        diagnostics,
    }
}

struct Converter {
    objects: ObjectManager,
}

impl Converter {
    /// Run `f` on the scope of `id`; ids handed around here always name a
    /// namespace or class.
    fn in_scope<R>(&mut self, id: SymbolId, f: impl FnOnce(&mut Scope) -> R) -> Option<R> {
        self.objects.symbol_mut(id).scope_mut().map(f)
    }

    fn convert_namespace_body(&mut self, raw: RawNamespace, id: SymbolId) {
        let RawNamespace {
            name: _,
            location: _,
            brief_comment: _,
            namespaces,
            classes,
            enums,
            typedefs,
            variables,
            functions,
        } = raw;

        for ns in namespaces {
            self.convert_namespace(ns, id);
        }
        for class in classes {
            self.convert_class(class, id);
        }
        for e in enums {
            self.convert_enum(e, id);
        }
        for td in typedefs {
            self.convert_typedef(td, id);
        }
        for var in variables {
            self.convert_variable(var, id);
        }
        for f in functions {
            let name = SmolStr::new(&f.name);
            let function = Symbol::Function(self.function(f, id));
            let fid = self.objects.insert(function);
            self.in_scope(id, |s| s.functions.entry(name).or_default().push(fid));
        }
    }

    fn convert_namespace(&mut self, raw: RawNamespace, parent: SymbolId) {
        let name = SmolStr::new(&raw.name);
        // A reopened namespace extends the one already registered.
        let existing = self
            .in_scope(parent, |s| s.namespaces.get(&name).copied())
            .flatten();
        let id = match existing {
            Some(id) => id,
            None => {
                let info = SymbolInfo {
                    location: raw.location.clone(),
                    brief_comment: raw.brief_comment.clone(),
                    ..SymbolInfo::new(name.clone()).with_parent(parent)
                };
                let id = self.objects.insert(Symbol::Namespace(Namespace {
                    info,
                    scope: Scope::default(),
                }));
                self.in_scope(parent, |s| s.namespaces.insert(name, id));
                id
            }
        };
        self.convert_namespace_body(raw, id);
    }

    fn convert_class(&mut self, raw: RawClass, parent: SymbolId) {
        let RawClass {
            name,
            location,
            brief_comment,
            supers,
            classes,
            enums,
            typedefs,
            variables,
            methods,
            constructors,
            destructor,
        } = raw;
        let name = SmolStr::new(name);
        let mut class = Class::new(name.clone());
        class.info = SymbolInfo {
            location,
            brief_comment,
            ..SymbolInfo::new(name.clone()).with_parent(parent)
        };
        class.super_names = supers;
        let id = self.objects.insert(Symbol::Class(class));
        self.in_scope(parent, |s| s.classes.insert(name, id));

        for nested in classes {
            self.convert_class(nested, id);
        }
        for e in enums {
            self.convert_enum(e, id);
        }
        for td in typedefs {
            self.convert_typedef(td, id);
        }
        for var in variables {
            self.convert_variable(var, id);
        }
        for m in methods {
            let name = SmolStr::new(&m.function.name);
            let method = self.method(m, id);
            let mid = self.objects.insert(Symbol::Method(method));
            self.in_scope(id, |s| s.functions.entry(name).or_default().push(mid));
        }

        let mut ctor_ids = Vec::with_capacity(constructors.len());
        for ctor in constructors {
            let method = self.method(ctor, id);
            ctor_ids.push(self.objects.insert(Symbol::Method(method)));
        }
        let dtor_id = destructor.map(|d| {
            let method = self.method(d, id);
            self.objects.insert(Symbol::Method(method))
        });
        if let Some(class) = self.objects.symbol_mut(id).as_class_mut() {
            class.constructors = ctor_ids;
            class.destructor = dtor_id;
        }
    }

    fn convert_enum(&mut self, raw: RawEnum, parent: SymbolId) {
        let RawEnum {
            name,
            location,
            brief_comment,
            underlying,
            is_strong_typed,
            values,
        } = raw;
        let name = SmolStr::new(name);
        let info = SymbolInfo {
            location,
            brief_comment,
            ..SymbolInfo::new(name.clone()).with_parent(parent)
        };
        let id = self.objects.insert(Symbol::Enum(Enum {
            info,
            underlying,
            is_strong_typed,
            values: Default::default(),
        }));

        let enum_name = self.objects.symbol(id).qualified_name().to_string();
        let values = values
            .into_iter()
            .map(|v| {
                let mut var = self.variable(v, id);
                var.info.qualified_name = format!("{}::{}", enum_name, var.info.name);
                (var.info.name.clone(), var)
            })
            .collect();
        if let Symbol::Enum(e) = self.objects.symbol_mut(id) {
            e.values = values;
        }
        self.in_scope(parent, |s| s.enums.insert(name, id));
    }

    fn convert_typedef(&mut self, raw: RawTypedef, parent: SymbolId) {
        let RawTypedef {
            name,
            location,
            brief_comment,
            target,
        } = raw;
        let name = SmolStr::new(name);
        let info = SymbolInfo {
            location,
            brief_comment,
            ..SymbolInfo::new(name.clone()).with_parent(parent)
        };
        let id = self
            .objects
            .insert(Symbol::Typedef(Typedef { info, target }));
        self.in_scope(parent, |s| s.typedefs.insert(name, id));
    }

    fn convert_variable(&mut self, raw: RawVariable, parent: SymbolId) {
        let var = self.variable(raw, parent);
        let name = var.info.name.clone();
        let id = self.objects.insert(Symbol::Variable(var));
        self.in_scope(parent, |s| s.variables.insert(name, id));
    }

    fn convert_macro(&mut self, name: String, raw: RawMacro) {
        let RawMacro {
            location,
            definition,
        } = raw;
        let info = SymbolInfo::new(name).with_location(location);
        self.objects
            .insert_macro(Symbol::Macro(Macro { info, definition }));
    }

    fn variable(&self, raw: RawVariable, parent: SymbolId) -> Variable {
        let RawVariable {
            name,
            location,
            brief_comment,
            ty,
            is_const,
            is_static,
            value,
            literal,
            access,
        } = raw;
        let info = SymbolInfo {
            location,
            brief_comment,
            ..SymbolInfo::new(name).with_parent(parent)
        };
        Variable {
            info,
            ty,
            is_const,
            is_static,
            value,
            literal,
            access,
        }
    }

    fn function(&self, raw: RawFunction, parent: SymbolId) -> Function {
        let RawFunction {
            name,
            location,
            brief_comment,
            ret_type,
            args,
            calling_convention,
        } = raw;
        let mut function = Function::new(name.clone(), ret_type);
        function.info = SymbolInfo {
            location,
            brief_comment,
            ..SymbolInfo::new(name).with_parent(parent)
        };
        // Argument parents are fixed up when the function is registered.
        function.args = args
            .into_iter()
            .map(|a| self.variable(a, parent))
            .collect();
        function.calling_convention = calling_convention;
        function
    }

    fn method(&self, raw: RawMethod, class: SymbolId) -> Method {
        let RawMethod {
            function,
            access,
            is_virtual,
            is_pure_virtual,
            is_static,
            is_final,
        } = raw;
        Method {
            function: self.function(function, class),
            access,
            is_virtual: is_virtual || is_pure_virtual,
            is_pure_virtual,
            is_static,
            is_final,
        }
    }
}

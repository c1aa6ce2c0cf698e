use crate::symbol::{SymbolId, SymbolInfo};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::fmt;

/// C++ access specifier for class members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Access {
    /// Also the access of every non-member declaration.
    #[default]
    Public,
    Protected,
    Private,
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Access::Public => "public",
            Access::Protected => "protected",
            Access::Private => "private",
        };
        f.write_str(s)
    }
}

/// How the emitted binding dispatches a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CallingType {
    #[default]
    Default,
    /// Deferred to a worker; arguments are value-copied.
    Async,
    /// Always dispatched on the calling thread.
    Sync,
}

/// A parsed literal value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiteralValue {
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
}

impl fmt::Display for LiteralValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LiteralValue::Int(v) => write!(f, "{}", v),
            LiteralValue::UInt(v) => write!(f, "{}", v),
            LiteralValue::Float(v) => write!(f, "{:?}", v),
            LiteralValue::Str(v) => write!(f, "{:?}", v),
        }
    }
}

/// The argument rewrite strategies a function signature can go through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WrapperKind {
    /// C callback + opaque user-data pointer becomes one callable.
    Callback,
    /// `char **` + count becomes one sequence of strings.
    StringArray,
    /// Argument is passed in and its final value is returned too.
    Inout,
    /// Argument is dropped from the input and only returned.
    Output,
}

impl fmt::Display for WrapperKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WrapperKind::Callback => "c_function_callback",
            WrapperKind::StringArray => "string_array",
            WrapperKind::Inout => "inout_argument",
            WrapperKind::Output => "output_argument",
        };
        f.write_str(s)
    }
}

/// One recorded rewrite: `kind` applied at `index` of the view it was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WrapperApplication {
    pub kind: WrapperKind,
    pub index: usize,
}

impl WrapperApplication {
    pub fn new(kind: WrapperKind, index: usize) -> Self {
        Self { kind, index }
    }
}

/// A variable, class field, enum value or function argument.
#[derive(Debug, Clone)]
pub struct Variable {
    pub info: SymbolInfo,
    /// Raw type spelling.
    pub ty: String,
    pub is_const: bool,
    pub is_static: bool,
    pub value: Option<LiteralValue>,
    /// Source text of the initializer, when it was a literal.
    pub literal: Option<String>,
    pub access: Access,
}

impl Variable {
    pub fn new(name: impl Into<SmolStr>, ty: impl Into<String>) -> Self {
        Self {
            info: SymbolInfo::new(name),
            ty: ty.into(),
            is_const: false,
            is_static: false,
            value: None,
            literal: None,
            access: Access::Public,
        }
    }

    /// An anonymous argument of the given type.
    pub fn arg(ty: impl Into<String>) -> Self {
        Self::new("", ty)
    }

    pub fn with_type(mut self, ty: impl Into<String>) -> Self {
        self.ty = ty.into();
        self
    }
}

/// A typedef or `using` alias.
#[derive(Debug, Clone)]
pub struct Typedef {
    pub info: SymbolInfo,
    /// Raw spelling of the aliased type.
    pub target: String,
}

/// A macro as seen by the preprocessor, before constant folding.
#[derive(Debug, Clone)]
pub struct Macro {
    pub info: SymbolInfo,
    pub definition: String,
}

#[derive(Debug, Clone)]
pub struct Enum {
    pub info: SymbolInfo,
    /// Underlying integer type spelling.
    pub underlying: String,
    pub is_strong_typed: bool,
    pub values: IndexMap<SmolStr, Variable>,
}

/// A free function, or the callable part of a method.
#[derive(Debug, Clone)]
pub struct Function {
    pub info: SymbolInfo,
    pub ret_type: String,
    pub args: Vec<Variable>,
    pub calling_convention: Option<String>,
    pub wrappers: Vec<WrapperApplication>,
    pub calling_type: CallingType,
    pub has_overload: bool,
}

impl Function {
    pub fn new(name: impl Into<SmolStr>, ret_type: impl Into<String>) -> Self {
        Self {
            info: SymbolInfo::new(name),
            ret_type: ret_type.into(),
            args: Vec::new(),
            calling_convention: None,
            wrappers: Vec::new(),
            calling_type: CallingType::Default,
            has_overload: false,
        }
    }

    pub fn with_arg(mut self, name: impl Into<SmolStr>, ty: impl Into<String>) -> Self {
        self.args.push(Variable::new(name, ty));
        self
    }

    /// `int a, char * b`
    pub fn args_signature(&self) -> String {
        self.args
            .iter()
            .map(|a| {
                if a.info.name.is_empty() {
                    a.ty.clone()
                } else {
                    format!("{} {}", a.ty, a.info.name)
                }
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// `::ns::f (int a, char * b)`
    pub fn signature(&self) -> String {
        format!("{} ({})", self.info.qualified_name, self.args_signature())
    }

    /// Function pointer spelling, e.g. `int(*)(int,char *)`.
    pub fn pointer_type(&self) -> String {
        self.pointer_type_in_scope("")
    }

    pub(crate) fn pointer_type_in_scope(&self, scope: &str) -> String {
        let args = self
            .args
            .iter()
            .map(|a| a.ty.as_str())
            .collect::<Vec<_>>()
            .join(",");
        let scope = if scope.is_empty() {
            String::new()
        } else {
            format!("{}::", scope)
        };
        format!("{}({}*)({})", self.ret_type, scope, args)
    }

    /// Address expression; overloads need a cast to pick the right one.
    pub fn address(&self) -> String {
        if self.has_overload {
            format!(
                "static_cast<{}>(&{})",
                self.pointer_type(),
                self.info.qualified_name
            )
        } else {
            format!("&{}", self.info.qualified_name)
        }
    }

    /// Qualified name of argument `index`, used by user wrapper patterns.
    pub fn arg_qualified_name(&self, index: usize) -> Option<String> {
        self.args
            .get(index)
            .map(|a| format!("{}::{}", self.info.qualified_name, a.info.name))
    }
}

#[derive(Debug, Clone)]
pub struct Method {
    pub function: Function,
    pub access: Access,
    pub is_virtual: bool,
    pub is_pure_virtual: bool,
    pub is_static: bool,
    pub is_final: bool,
}

impl Method {
    pub fn new(function: Function) -> Self {
        Self {
            function,
            access: Access::Public,
            is_virtual: false,
            is_pure_virtual: false,
            is_static: false,
            is_final: false,
        }
    }

    /// Qualified name of the owning class.
    pub fn class_name(&self) -> &str {
        let qn = self.function.info.qualified_name.as_str();
        qn.rsplit_once("::").map(|(scope, _)| scope).unwrap_or("")
    }

    /// Member function pointer spelling, e.g. `int(::C::*)(int)`.
    pub fn pointer_type(&self) -> String {
        if self.is_static {
            self.function.pointer_type()
        } else {
            self.function.pointer_type_in_scope(self.class_name())
        }
    }

    /// `public virtual ::C::f (int a) = 0`
    pub fn signature(&self) -> String {
        let mut s = format!("{} ", self.access);
        if self.is_virtual {
            s.push_str("virtual ");
        }
        if self.is_static {
            s.push_str("static ");
        }
        s.push_str(&self.function.signature());
        if self.is_pure_virtual {
            s.push_str(" = 0");
        }
        s
    }
}

/// Named children of a namespace or class, keyed by local name.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    pub classes: IndexMap<SmolStr, SymbolId>,
    pub enums: IndexMap<SmolStr, SymbolId>,
    pub typedefs: IndexMap<SmolStr, SymbolId>,
    pub variables: IndexMap<SmolStr, SymbolId>,
    /// Overloads share one key.
    pub functions: IndexMap<SmolStr, Vec<SymbolId>>,
    pub namespaces: IndexMap<SmolStr, SymbolId>,
}

impl Scope {
    /// Every direct child id, in declaration order per kind.
    pub fn children(&self) -> Vec<SymbolId> {
        let mut ids = Vec::new();
        ids.extend(self.namespaces.values().copied());
        ids.extend(self.classes.values().copied());
        ids.extend(self.enums.values().copied());
        ids.extend(self.typedefs.values().copied());
        ids.extend(self.variables.values().copied());
        ids.extend(self.functions.values().flatten().copied());
        ids
    }
}

#[derive(Debug, Clone)]
pub struct Namespace {
    pub info: SymbolInfo,
    pub scope: Scope,
}

#[derive(Debug, Clone)]
pub struct Class {
    pub info: SymbolInfo,
    pub scope: Scope,
    /// Base class spellings as declared.
    pub super_names: Vec<String>,
    /// Base classes found in the graph.
    pub supers: Vec<SymbolId>,
    pub constructors: Vec<SymbolId>,
    pub destructor: Option<SymbolId>,
    /// Has a virtual method, constructor or destructor, directly or through a base.
    pub is_polymorphic: bool,
    /// Some pure virtual method is still unresolved.
    pub is_pure_virtual: bool,
}

impl Class {
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            info: SymbolInfo::new(name),
            scope: Scope::default(),
            super_names: Vec::new(),
            supers: Vec::new(),
            constructors: Vec::new(),
            destructor: None,
            is_polymorphic: false,
            is_pure_virtual: false,
        }
    }

    /// Methods, constructors and destructor.
    pub fn member_functions(&self) -> Vec<SymbolId> {
        let mut ids: Vec<SymbolId> = self.scope.functions.values().flatten().copied().collect();
        ids.extend(self.constructors.iter().copied());
        ids.extend(self.destructor);
        ids
    }
}

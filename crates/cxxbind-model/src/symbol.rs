use crate::item::{Class, Enum, Function, Macro, Method, Namespace, Scope, Typedef, Variable};
use cxxbind_common::Location;
use smol_str::SmolStr;
use std::fmt;

/// Handle of a symbol owned by an [`ObjectManager`](crate::ObjectManager).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(pub(crate) u32);

impl SymbolId {
    pub fn as_u32(self) -> u32 {
        self.0
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// Fields every symbol carries.
#[derive(Debug, Clone)]
pub struct SymbolInfo {
    /// Local identifier; empty for anonymous and synthetic entities.
    pub name: SmolStr,
    /// Enclosing scope. Only used for naming and lookup.
    pub parent: Option<SymbolId>,
    /// Filled in when the symbol is registered.
    pub qualified_name: String,
    pub location: Option<Location>,
    pub brief_comment: String,
    /// Output-inclusion flag.
    pub generate: bool,
    /// Display name.
    pub alias: SmolStr,
}

impl SymbolInfo {
    pub fn new(name: impl Into<SmolStr>) -> Self {
        let name = name.into();
        Self {
            alias: name.clone(),
            name,
            parent: None,
            qualified_name: String::new(),
            location: None,
            brief_comment: String::new(),
            generate: true,
        }
    }

    pub fn with_location(mut self, location: Option<Location>) -> Self {
        self.location = location;
        self
    }

    pub fn with_parent(mut self, parent: SymbolId) -> Self {
        self.parent = Some(parent);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Namespace,
    Class,
    Enum,
    Typedef,
    Variable,
    Function,
    Method,
    Macro,
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SymbolKind::Namespace => "namespace",
            SymbolKind::Class => "class",
            SymbolKind::Enum => "enum",
            SymbolKind::Typedef => "typedef",
            SymbolKind::Variable => "variable",
            SymbolKind::Function => "function",
            SymbolKind::Method => "method",
            SymbolKind::Macro => "macro",
        };
        f.write_str(s)
    }
}

/// Every entity of the graph.
#[derive(Debug, Clone)]
pub enum Symbol {
    Namespace(Namespace),
    Class(Class),
    Enum(Enum),
    Typedef(Typedef),
    Variable(Variable),
    Function(Function),
    Method(Method),
    Macro(Macro),
}

impl Symbol {
    pub fn info(&self) -> &SymbolInfo {
        match self {
            Symbol::Namespace(n) => &n.info,
            Symbol::Class(c) => &c.info,
            Symbol::Enum(e) => &e.info,
            Symbol::Typedef(t) => &t.info,
            Symbol::Variable(v) => &v.info,
            Symbol::Function(f) => &f.info,
            Symbol::Method(m) => &m.function.info,
            Symbol::Macro(m) => &m.info,
        }
    }

    pub fn info_mut(&mut self) -> &mut SymbolInfo {
        match self {
            Symbol::Namespace(n) => &mut n.info,
            Symbol::Class(c) => &mut c.info,
            Symbol::Enum(e) => &mut e.info,
            Symbol::Typedef(t) => &mut t.info,
            Symbol::Variable(v) => &mut v.info,
            Symbol::Function(f) => &mut f.info,
            Symbol::Method(m) => &mut m.function.info,
            Symbol::Macro(m) => &mut m.info,
        }
    }

    pub fn kind(&self) -> SymbolKind {
        match self {
            Symbol::Namespace(_) => SymbolKind::Namespace,
            Symbol::Class(_) => SymbolKind::Class,
            Symbol::Enum(_) => SymbolKind::Enum,
            Symbol::Typedef(_) => SymbolKind::Typedef,
            Symbol::Variable(_) => SymbolKind::Variable,
            Symbol::Function(_) => SymbolKind::Function,
            Symbol::Method(_) => SymbolKind::Method,
            Symbol::Macro(_) => SymbolKind::Macro,
        }
    }

    pub fn name(&self) -> &str {
        &self.info().name
    }

    pub fn qualified_name(&self) -> &str {
        &self.info().qualified_name
    }

    pub fn is_typedef(&self) -> bool {
        matches!(self, Symbol::Typedef(_))
    }

    /// The callable part of a function or method.
    pub fn as_function(&self) -> Option<&Function> {
        match self {
            Symbol::Function(f) => Some(f),
            Symbol::Method(m) => Some(&m.function),
            _ => None,
        }
    }

    pub fn as_function_mut(&mut self) -> Option<&mut Function> {
        match self {
            Symbol::Function(f) => Some(f),
            Symbol::Method(m) => Some(&mut m.function),
            _ => None,
        }
    }

    pub fn as_method(&self) -> Option<&Method> {
        match self {
            Symbol::Method(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_class(&self) -> Option<&Class> {
        match self {
            Symbol::Class(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_class_mut(&mut self) -> Option<&mut Class> {
        match self {
            Symbol::Class(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_typedef(&self) -> Option<&Typedef> {
        match self {
            Symbol::Typedef(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_variable(&self) -> Option<&Variable> {
        match self {
            Symbol::Variable(v) => Some(v),
            _ => None,
        }
    }

    /// Named children, for namespaces and classes.
    pub fn scope(&self) -> Option<&Scope> {
        match self {
            Symbol::Namespace(n) => Some(&n.scope),
            Symbol::Class(c) => Some(&c.scope),
            _ => None,
        }
    }

    pub fn scope_mut(&mut self) -> Option<&mut Scope> {
        match self {
            Symbol::Namespace(n) => Some(&mut n.scope),
            Symbol::Class(c) => Some(&mut c.scope),
            _ => None,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.qualified_name())
    }
}

//! The registry of every symbol of one ingestion run.
//!
//! The manager owns all symbols in an arena and indexes them by qualified
//! name. Qualified names always start with `::`; the root namespace itself has
//! the empty qualified name and is reached through [`ObjectManager::root`].

use crate::error::{ModelError, Result};
use crate::item::{Namespace, Scope};
use crate::symbol::{Symbol, SymbolId, SymbolInfo};
use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;

const ELABORATED_PREFIXES: [&str; 4] = ["struct ", "class ", "union ", "enum "];

/// Strip an elaborated type specifier (`struct Foo` -> `Foo`).
pub fn strip_elaborated(name: &str) -> &str {
    let name = name.trim();
    for prefix in ELABORATED_PREFIXES {
        if let Some(rest) = name.strip_prefix(prefix) {
            return rest.trim();
        }
    }
    name
}

/// Normalize a spelling into registry key form: `Foo` and `struct ::Foo`
/// both become `::Foo`.
pub fn normalize_qualified_name(name: &str) -> String {
    let name = strip_elaborated(name);
    if name.starts_with("::") {
        name.to_string()
    } else {
        format!("::{}", name)
    }
}

#[derive(Debug)]
pub struct ObjectManager {
    symbols: Vec<Symbol>,
    by_name: FxHashMap<String, SymbolId>,
    macros: IndexMap<SmolStr, SymbolId>,
    root: SymbolId,
}

impl ObjectManager {
    /// Create a manager holding only the root namespace.
    pub fn new() -> Self {
        let root = Symbol::Namespace(Namespace {
            info: SymbolInfo::new(""),
            scope: Scope::default(),
        });
        Self {
            symbols: vec![root],
            by_name: FxHashMap::default(),
            macros: IndexMap::new(),
            root: SymbolId(0),
        }
    }

    pub fn root(&self) -> SymbolId {
        self.root
    }

    /// Register a symbol under its qualified name.
    ///
    /// The qualified name is computed from the parent. Re-registering a name
    /// replaces the previous entry, except that a typedef never replaces a
    /// non-typedef (`typedef struct Foo {} Foo;`). The symbol is kept in the
    /// arena either way. Anonymous symbols are stored but not indexed.
    pub fn insert(&mut self, mut symbol: Symbol) -> SymbolId {
        let parent_name = symbol
            .info()
            .parent
            .map(|p| self.symbol(p).qualified_name().to_string())
            .unwrap_or_default();
        let qualified_name = format!("{}::{}", parent_name, symbol.name());
        symbol.info_mut().qualified_name = qualified_name.clone();

        let id = SymbolId(self.symbols.len() as u32);
        if let Some(f) = symbol.as_function_mut() {
            for arg in &mut f.args {
                arg.info.parent = Some(id);
                arg.info.qualified_name = format!("{}::{}", qualified_name, arg.info.name);
            }
        }

        let is_typedef = symbol.is_typedef();
        let is_named = !symbol.name().is_empty();
        self.symbols.push(symbol);

        if is_named {
            match self.by_name.get(&qualified_name) {
                Some(existing) if is_typedef && !self.symbol(*existing).is_typedef() => {
                    tracing::debug!(
                        "typedef {} shadowed by existing {}",
                        qualified_name,
                        self.symbol(*existing).kind()
                    );
                }
                _ => {
                    self.by_name.insert(qualified_name, id);
                }
            }
        }
        id
    }

    /// Register a macro. Macros live in their own table; they are neither in
    /// a scope nor in the qualified-name index.
    pub fn insert_macro(&mut self, mut symbol: Symbol) -> SymbolId {
        let name = SmolStr::new(symbol.name());
        let info = symbol.info_mut();
        info.parent = Some(self.root);
        info.qualified_name = format!("::{}", name);
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(symbol);
        self.macros.insert(name, id);
        id
    }

    pub fn macros(&self) -> &IndexMap<SmolStr, SymbolId> {
        &self.macros
    }

    /// Look up a symbol id by qualified name.
    pub fn get_id(&self, qualified_name: &str) -> Result<SymbolId> {
        let key = normalize_qualified_name(qualified_name);
        self.by_name
            .get(&key)
            .copied()
            .ok_or(ModelError::NotFound(key))
    }

    /// Look up a symbol by qualified name.
    pub fn get(&self, qualified_name: &str) -> Result<&Symbol> {
        self.get_id(qualified_name).map(|id| self.symbol(id))
    }

    pub fn contains(&self, qualified_name: &str) -> bool {
        self.by_name
            .contains_key(&normalize_qualified_name(qualified_name))
    }

    /// Follow typedef targets until a non-typedef is reached.
    ///
    /// Stops on a typedef naming itself or any longer cycle and returns that
    /// typedef. Fails if a target in the chain is not registered.
    pub fn resolve_all_typedef(&self, qualified_name: &str) -> Result<&Symbol> {
        let mut current = self.get_id(qualified_name)?;
        let mut visited = FxHashSet::default();
        loop {
            let symbol = self.symbol(current);
            let Symbol::Typedef(td) = symbol else {
                return Ok(symbol);
            };
            if !visited.insert(current) {
                return Ok(symbol);
            }
            let target = normalize_qualified_name(&td.target);
            if target == td.info.qualified_name {
                return Ok(symbol);
            }
            current = self.get_id(&target)?;
        }
    }

    /// Find `name` as seen from inside `scope`, walking outwards to the root.
    pub fn lookup_from(&self, scope: SymbolId, name: &str) -> Option<SymbolId> {
        let name = strip_elaborated(name);
        if name.starts_with("::") {
            return self.get_id(name).ok();
        }
        let mut current = Some(scope);
        while let Some(id) = current {
            let candidate = format!("{}::{}", self.symbol(id).qualified_name(), name);
            if let Some(found) = self.by_name.get(&candidate) {
                return Some(*found);
            }
            current = self.symbol(id).info().parent;
        }
        None
    }

    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.index()]
    }

    pub fn symbol_mut(&mut self, id: SymbolId) -> &mut Symbol {
        &mut self.symbols[id.index()]
    }

    /// All symbols in insertion order, including shadowed and anonymous ones.
    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &Symbol)> {
        self.symbols
            .iter()
            .enumerate()
            .map(|(i, s)| (SymbolId(i as u32), s))
    }

    /// Every function and method, overloads included.
    pub fn function_ids(&self) -> Vec<SymbolId> {
        self.iter()
            .filter(|(_, s)| s.as_function().is_some())
            .map(|(id, _)| id)
            .collect()
    }

    /// Every namespace and class, root first.
    pub fn scope_ids(&self) -> Vec<SymbolId> {
        self.iter()
            .filter(|(_, s)| s.scope().is_some())
            .map(|(id, _)| id)
            .collect()
    }

    /// Number of registered symbols, not counting the root namespace.
    pub fn len(&self) -> usize {
        self.symbols.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ObjectManager {
    fn default() -> Self {
        Self::new()
    }
}

//! Display names.
//!
//! C headers name one struct several ways (`typedef struct _Foo {} FooT,
//! *PFooT;`). Typedefs link names into alias groups, and each group gets one
//! readable "easy name" shared by all its members.

use crate::options::PreprocessOptions;
use cxxbind_model::{normalize_qualified_name, strip_elaborated, ObjectManager, Symbol};
use cxxbind_types::is_fundamental_type;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use rustc_hash::{FxHashMap, FxHashSet};
use smol_str::SmolStr;
use std::collections::{BTreeSet, VecDeque};

static IDENTIFIER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(::)?[A-Za-z_]\w*(::[A-Za-z_]\w*)*$").expect("identifier pattern is valid")
});

#[derive(Debug, Default, Clone)]
pub struct AliasTable {
    /// Qualified name -> qualified names it is directly aliased with.
    pub type_alias: IndexMap<String, BTreeSet<String>>,
    /// Qualified name -> easy name of its group.
    pub easy_names: FxHashMap<String, SmolStr>,
}

impl AliasTable {
    /// Collect typedef edges and pick the easy name of every group.
    pub fn build(objects: &ObjectManager) -> Self {
        let mut table = AliasTable::default();
        for (_, symbol) in objects.iter() {
            let Symbol::Typedef(td) = symbol else {
                continue;
            };
            let target = strip_elaborated(&td.target);
            if !IDENTIFIER_RE.is_match(target) || is_fundamental_type(target) {
                continue;
            }
            let scope = td.info.parent.unwrap_or(objects.root());
            let target = objects
                .lookup_from(scope, target)
                .map(|id| objects.symbol(id).qualified_name().to_string())
                .unwrap_or_else(|| normalize_qualified_name(target));
            let name = td.info.qualified_name.clone();
            if target == name {
                continue;
            }
            table.link(&name, &target);
        }

        for group in table.groups() {
            if let Some(easy) = easy_name(&group) {
                for member in group {
                    table.easy_names.insert(member, easy.clone());
                }
            }
        }
        table
    }

    fn link(&mut self, a: &str, b: &str) {
        self.type_alias
            .entry(a.to_string())
            .or_default()
            .insert(b.to_string());
        self.type_alias
            .entry(b.to_string())
            .or_default()
            .insert(a.to_string());
    }

    /// Connected components of the alias relation, each sorted.
    pub fn groups(&self) -> Vec<Vec<String>> {
        let mut seen = FxHashSet::default();
        let mut groups = Vec::new();
        let mut starts: Vec<&String> = self.type_alias.keys().collect();
        starts.sort();

        for start in starts {
            if !seen.insert(start.as_str()) {
                continue;
            }
            let mut group = vec![start.clone()];
            let mut queue = VecDeque::from([start.as_str()]);
            while let Some(current) = queue.pop_front() {
                for next in self.type_alias.get(current).into_iter().flatten() {
                    if seen.insert(next.as_str()) {
                        group.push(next.clone());
                        queue.push_back(next.as_str());
                    }
                }
            }
            group.sort();
            groups.push(group);
        }
        groups
    }

    pub fn easy_name(&self, qualified_name: &str) -> Option<&str> {
        self.easy_names.get(qualified_name).map(|s| s.as_str())
    }
}

fn local_name(qualified_name: &str) -> &str {
    qualified_name.rsplit("::").next().unwrap_or(qualified_name)
}

/// `_Foo` with `Foo`, `FooT` or `Foo_t` in the same group gives `Foo`.
fn easy_name(group: &[String]) -> Option<SmolStr> {
    for member in group {
        let n = local_name(member).trim_start_matches('_');
        if n.is_empty() {
            continue;
        }
        let variants = [n.to_string(), format!("{}T", n), format!("{}_t", n)];
        let found = group.iter().any(|other| {
            other != member && variants.iter().any(|v| v == local_name(other))
        });
        if found {
            return Some(SmolStr::new(n));
        }
    }
    None
}

/// Set the display alias of every class, enum, typedef, function, method and
/// variable. Returns the number of aliases that differ from the name.
pub fn apply_aliases(
    objects: &mut ObjectManager,
    table: &AliasTable,
    options: &PreprocessOptions,
) -> usize {
    let updates: Vec<_> = objects
        .iter()
        .filter(|(_, s)| {
            matches!(
                s,
                Symbol::Class(_)
                    | Symbol::Enum(_)
                    | Symbol::Typedef(_)
                    | Symbol::Function(_)
                    | Symbol::Method(_)
                    | Symbol::Variable(_)
            )
        })
        .map(|(id, s)| {
            let info = s.info();
            let mut alias = table
                .easy_name(&info.qualified_name)
                .unwrap_or(info.name.as_str());
            if options.strip_leading_underscores {
                let stripped = alias.trim_start_matches('_');
                if !stripped.is_empty() {
                    alias = stripped;
                }
            }
            (id, SmolStr::new(alias))
        })
        .collect();

    let mut renamed = 0;
    for (id, alias) in updates {
        let info = objects.symbol_mut(id).info_mut();
        if alias != info.name {
            renamed += 1;
        }
        info.alias = alias;
    }
    renamed
}

//! The pass driver.

use crate::alias::{apply_aliases, AliasTable};
use crate::error::Result;
use crate::filter::apply_filter;
use crate::macros::fold_constant_macros;
use crate::options::PreprocessOptions;
use crate::pipeline::resolve_wrappers;
use crate::wrappers::WrappedView;
use cxxbind_common::{Diagnostic, DiagnosticKind, Location};
use cxxbind_model::{CallingType, Function, Ingested, ObjectManager, SymbolId, Variable};
use cxxbind_types::{HostType, TypeResolver};
use indexmap::IndexMap;
use smol_str::SmolStr;
use std::fmt;
use std::fmt::Write as _;

/// Runs filtering, constant macro folding, alias resolution and the wrapper
/// pipeline, in that order, over one ingested graph.
pub struct Preprocessor {
    options: PreprocessOptions,
}

impl Preprocessor {
    pub fn new(options: PreprocessOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &PreprocessOptions {
        &self.options
    }

    pub fn process(&self, ingested: Ingested) -> Result<PreprocessResult> {
        let Ingested {
            mut objects,
            mut diagnostics,
        } = ingested;

        let kept = apply_filter(&mut objects, &self.options);
        tracing::info!(
            "{} of {} symbols selected for output",
            kept,
            objects.len()
        );

        let const_macros = fold_constant_macros(&mut objects, &self.options);

        let aliases = AliasTable::build(&objects);
        let renamed = apply_aliases(&mut objects, &aliases, &self.options);
        tracing::info!(
            "{} alias groups, {} symbols renamed",
            aliases.groups().len(),
            renamed
        );

        let report = resolve_wrappers(&mut objects, &self.options)?;
        diagnostics.extend(report.diagnostics);

        Ok(PreprocessResult {
            objects,
            const_macros,
            aliases,
            unsupported_functions: report.unsupported_functions,
            diagnostics,
        })
    }
}

/// The processed graph and what the passes found.
#[derive(Debug)]
pub struct PreprocessResult {
    pub objects: ObjectManager,
    /// Every literal macro as a constant, whether registered or not.
    pub const_macros: IndexMap<SmolStr, Variable>,
    pub aliases: AliasTable,
    /// Functions keeping an unsupported argument type.
    pub unsupported_functions: IndexMap<String, Vec<Function>>,
    pub diagnostics: Vec<Diagnostic>,
}

/// A function signature as the host calls it.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalSignature {
    pub qualified_name: String,
    pub alias: SmolStr,
    pub args: Vec<(SmolStr, HostType)>,
    pub ret: HostType,
    pub calling_type: CallingType,
    pub location: Option<Location>,
}

impl ExternalSignature {
    /// Spellings no host type was found for.
    pub fn unresolved(&self) -> Vec<String> {
        let mut out = Vec::new();
        for (_, ty) in &self.args {
            collect_unresolved(ty, &mut out);
        }
        collect_unresolved(&self.ret, &mut out);
        out
    }
}

fn collect_unresolved(ty: &HostType, out: &mut Vec<String>) {
    match ty {
        HostType::Unresolved(spelling) => out.push(spelling.clone()),
        HostType::Callable { args, ret } => {
            args.iter().for_each(|a| collect_unresolved(a, out));
            collect_unresolved(ret, out);
        }
        HostType::Sequence(inner) => collect_unresolved(inner, out),
        HostType::Tuple(items) => items.iter().for_each(|i| collect_unresolved(i, out)),
        _ => {}
    }
}

impl fmt::Display for ExternalSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let args = self
            .args
            .iter()
            .enumerate()
            .map(|(i, (name, ty))| {
                if name.is_empty() {
                    format!("arg{}: {}", i, ty)
                } else {
                    format!("{}: {}", name, ty)
                }
            })
            .collect::<Vec<_>>()
            .join(", ");
        write!(f, "{}({}) -> {}", self.alias, args, self.ret)?;
        if self.calling_type == CallingType::Sync {
            f.write_str(" [sync]")?;
        }
        Ok(())
    }
}

impl PreprocessResult {
    pub fn resolver(&self) -> TypeResolver<'_> {
        TypeResolver::new(&self.objects)
    }

    /// The signature of a function with its wrappers applied.
    pub fn wrapped_view(&self, id: SymbolId) -> Option<WrappedView> {
        let function = self.objects.symbol(id).as_function()?;
        Some(WrappedView::replay(
            function,
            &function.wrappers,
            &self.resolver(),
        ))
    }

    pub fn external_signature(&self, id: SymbolId) -> Option<ExternalSignature> {
        self.external_signature_with(id, &self.resolver())
    }

    fn external_signature_with(
        &self,
        id: SymbolId,
        resolver: &TypeResolver<'_>,
    ) -> Option<ExternalSignature> {
        let symbol = self.objects.symbol(id);
        let original = symbol.as_function()?;
        let view = WrappedView::replay(original, &original.wrappers, resolver);
        Some(ExternalSignature {
            qualified_name: original.info.qualified_name.clone(),
            alias: symbol.info().alias.clone(),
            args: view
                .function
                .args
                .iter()
                .map(|a| (a.info.name.clone(), resolver.cpp_type_to_host(&a.ty)))
                .collect(),
            ret: resolver.cpp_type_to_host(&view.function.ret_type),
            calling_type: original.calling_type,
            location: original.info.location.clone(),
        })
    }

    /// Signatures of every generated function and method, in declaration
    /// order.
    pub fn external_signatures(&self) -> Vec<ExternalSignature> {
        let resolver = self.resolver();
        self.objects
            .function_ids()
            .into_iter()
            .filter(|id| self.objects.symbol(*id).info().generate)
            .filter_map(|id| self.external_signature_with(id, &resolver))
            .collect()
    }

    /// One warning per spelling of a generated signature that maps to no host
    /// type.
    pub fn unresolved_type_diagnostics(&self) -> Vec<Diagnostic> {
        self.external_signatures()
            .iter()
            .flat_map(|sig| {
                sig.unresolved().into_iter().map(move |spelling| {
                    Diagnostic::warning(
                        DiagnosticKind::UnresolvedTypeSpelling,
                        format!("`{}` in `{}` has no host type", spelling, sig.qualified_name),
                    )
                    .with_location(sig.location.clone())
                })
            })
            .collect()
    }

    pub fn unsupported_count(&self) -> usize {
        self.unsupported_functions.values().map(Vec::len).sum()
    }

    /// Count and full signature of every unsupported function.
    pub fn unsupported_report(&self) -> String {
        let mut out = format!("{} unsupported functions\n", self.unsupported_count());
        for functions in self.unsupported_functions.values() {
            for f in functions {
                let _ = writeln!(out, "  {}", f.signature());
            }
        }
        out
    }

    /// One line per generated function: `qualified name: external signature`.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        for sig in self.external_signatures() {
            let _ = writeln!(out, "{}: {}", sig.qualified_name, sig);
        }
        out
    }
}

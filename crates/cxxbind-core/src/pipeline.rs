//! Wrapper resolution for every function of the graph.
//!
//! Each function is planned against a read-only graph first: forced wrappers,
//! heuristic wrappers up to a fixpoint, the virtual-argument rule and the
//! support check. Plans are written back once all of them are computed.

use crate::error::{PreprocessError, Result};
use crate::options::PreprocessOptions;
use crate::wrappers::{wrapper_for, WrappedView};
use cxxbind_common::{Diagnostic, DiagnosticKind};
use cxxbind_model::{
    CallingType, Function, ObjectManager, Symbol, SymbolId, WrapperApplication, WrapperKind,
};
use cxxbind_types::TypeResolver;
use indexmap::IndexMap;
use regex::Regex;
use rustc_hash::FxHashSet;

/// Heuristic wrappers in priority order. Output is never guessed.
pub const HEURISTIC_ORDER: [WrapperKind; 3] = [
    WrapperKind::Callback,
    WrapperKind::StringArray,
    WrapperKind::Inout,
];

#[derive(Debug)]
struct FunctionPlan {
    id: SymbolId,
    wrappers: Vec<WrapperApplication>,
    force_sync: bool,
    unsupported: bool,
}

/// What the pipeline did.
#[derive(Debug, Default)]
pub struct WrapperReport {
    /// Functions keeping an unsupported argument, keyed by qualified name.
    pub unsupported_functions: IndexMap<String, Vec<Function>>,
    pub diagnostics: Vec<Diagnostic>,
    pub applications: usize,
    pub sync_functions: usize,
}

/// Resolve wrappers, calling types and support for every function and
/// method. Fails only on a forced wrapper that does not fit its argument.
pub fn resolve_wrappers(
    objects: &mut ObjectManager,
    options: &PreprocessOptions,
) -> Result<WrapperReport> {
    let plans = {
        let resolver = TypeResolver::new(objects);
        let mut plans = Vec::new();
        for id in objects.function_ids() {
            let symbol = objects.symbol(id);
            let Some(function) = symbol.as_function() else {
                continue;
            };
            let scope = symbol.info().parent.unwrap_or(objects.root());
            let generate = symbol.info().generate;
            plans.push(plan_function(id, function, scope, generate, options, &resolver)?);
        }
        plans
    };

    let mut report = WrapperReport::default();
    for plan in plans {
        let applied = plan.wrappers.len();
        let Some(function) = objects.symbol_mut(plan.id).as_function_mut() else {
            continue;
        };
        report.applications += applied.saturating_sub(function.wrappers.len());
        function.wrappers = plan.wrappers;
        if plan.force_sync {
            function.calling_type = CallingType::Sync;
            report.sync_functions += 1;
        }
        if plan.unsupported {
            tracing::debug!("unsupported: {}", function.signature());
            report.diagnostics.push(
                Diagnostic::warning(
                    DiagnosticKind::UnsupportedSignature,
                    format!("unsupported signature `{}`", function.signature()),
                )
                .with_location(function.info.location.clone())
                .with_help("pointers to pointers and arrays of pointers cannot be bound"),
            );
            if options.ignore_unsupported_functions {
                function.info.generate = false;
            }
            report
                .unsupported_functions
                .entry(function.info.qualified_name.clone())
                .or_default()
                .push(function.clone());
        }
    }

    tracing::info!(
        "applied {} wrappers, {} functions forced sync, {} unsupported",
        report.applications,
        report.sync_functions,
        report.unsupported_functions.values().map(Vec::len).sum::<usize>()
    );
    Ok(report)
}

fn plan_function(
    id: SymbolId,
    function: &Function,
    scope: SymbolId,
    generate: bool,
    options: &PreprocessOptions,
    resolver: &TypeResolver<'_>,
) -> Result<FunctionPlan> {
    let mut wrappers = function.wrappers.clone();
    let mut view = WrappedView::replay(function, &wrappers, resolver);

    if generate {
        let forced = [
            (WrapperKind::Output, options.output_arg_pattern.as_ref()),
            (WrapperKind::Inout, options.inout_arg_pattern.as_ref()),
        ];
        for (kind, pattern) in forced {
            if let Some(pattern) = pattern {
                apply_forced(kind, pattern, &mut view, &mut wrappers, resolver)?;
            }
        }
    }
    apply_heuristics(&mut view, &mut wrappers, resolver);

    let force_sync = takes_polymorphic_argument(function, scope, resolver);
    let unsupported = generate
        && view
            .function
            .args
            .iter()
            .any(|a| !resolver.is_type_supported(&a.ty));

    Ok(FunctionPlan {
        id,
        wrappers,
        force_sync,
        unsupported,
    })
}

/// Apply `kind` to every argument whose qualified name matches `pattern`.
fn apply_forced(
    kind: WrapperKind,
    pattern: &Regex,
    view: &mut WrappedView,
    wrappers: &mut Vec<WrapperApplication>,
    resolver: &TypeResolver<'_>,
) -> Result<()> {
    let wrapper = wrapper_for(kind);
    loop {
        let target = (0..view.function.args.len()).find_map(|i| {
            let name = view.function.arg_qualified_name(i)?;
            (wrapper.can_apply(view, i) && pattern.is_match(&name)).then_some((i, name))
        });
        let Some((index, argument)) = target else {
            return Ok(());
        };
        if !wrapper.matches(view, index, resolver) {
            return Err(PreprocessError::InvalidWrapperRequest {
                argument,
                ty: view.function.args[index].ty.clone(),
                wrapper: kind,
                pattern: pattern.as_str().to_string(),
            });
        }
        tracing::debug!("forced {} on {}", kind, argument);
        *view = wrapper.apply(view, index, resolver);
        wrappers.push(WrapperApplication::new(kind, index));
    }
}

/// Apply heuristic wrappers until none fits. Every application wraps or
/// removes an unwrapped slot, so a function with `n` arguments sees at most
/// `n` of them.
fn apply_heuristics(
    view: &mut WrappedView,
    wrappers: &mut Vec<WrapperApplication>,
    resolver: &TypeResolver<'_>,
) {
    'fixpoint: loop {
        for kind in HEURISTIC_ORDER {
            let wrapper = wrapper_for(kind);
            let found = (0..view.function.args.len())
                .find(|&i| wrapper.can_apply(view, i) && wrapper.matches(view, i, resolver));
            if let Some(index) = found {
                tracing::debug!(
                    "{} on argument {} of {}",
                    kind,
                    index,
                    view.function.info.qualified_name
                );
                *view = wrapper.apply(view, index, resolver);
                wrappers.push(WrapperApplication::new(kind, index));
                continue 'fixpoint;
            }
        }
        break;
    }
}

/// Whether an original argument is, through typedefs and decorations, a
/// polymorphic class. Such a value cannot be copied across an async call.
fn takes_polymorphic_argument(
    function: &Function,
    scope: SymbolId,
    resolver: &TypeResolver<'_>,
) -> bool {
    function.args.iter().any(|arg| {
        let base = resolver.remove_decorations(&resolver.resolve_to_basic_type(&arg.ty));
        names_polymorphic_class(&base, scope, resolver)
    })
}

/// Follow `name` through typedefs. Each target is stripped of decorations
/// and looked up from the scope of the typedef that names it.
fn names_polymorphic_class(name: &str, scope: SymbolId, resolver: &TypeResolver<'_>) -> bool {
    let objects = resolver.objects();
    let mut visited = FxHashSet::default();
    let mut current = objects.lookup_from(scope, name);
    while let Some(id) = current {
        if !visited.insert(id) {
            return false;
        }
        match objects.symbol(id) {
            Symbol::Class(c) => return c.is_polymorphic,
            Symbol::Typedef(td) => {
                let parent = td.info.parent.unwrap_or(objects.root());
                current = objects.lookup_from(parent, &resolver.remove_decorations(&td.target));
            }
            _ => return false,
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view_of(f: &Function, objects: &ObjectManager) -> (WrappedView, Vec<WrapperApplication>) {
        let resolver = TypeResolver::new(objects);
        let mut view = WrappedView::new(f);
        let mut wrappers = Vec::new();
        apply_heuristics(&mut view, &mut wrappers, &resolver);
        (view, wrappers)
    }

    #[test]
    fn test_heuristics_restart_after_each_application() {
        let objects = ObjectManager::new();
        let f = Function::new("f", "int")
            .with_arg("count", "int *")
            .with_arg("cb", "void (*)(int, void *)")
            .with_arg("ctx", "void *")
            .with_arg("names", "const char **")
            .with_arg("n", "int");
        let (view, wrappers) = view_of(&f, &objects);

        assert_eq!(
            wrappers,
            vec![
                WrapperApplication::new(WrapperKind::Callback, 1),
                WrapperApplication::new(WrapperKind::StringArray, 2),
                WrapperApplication::new(WrapperKind::Inout, 0),
            ]
        );
        assert_eq!(view.function.args.len(), 3);
        assert_eq!(view.function.ret_type, "std::tuple<int, int>");
    }

    #[test]
    fn test_count_is_not_taken_twice() {
        let objects = ObjectManager::new();
        let f = Function::new("f", "void")
            .with_arg("a", "char **")
            .with_arg("b", "char **")
            .with_arg("n", "int");
        let (view, wrappers) = view_of(&f, &objects);
        assert_eq!(wrappers[0], WrapperApplication::new(WrapperKind::StringArray, 1));
        assert_eq!(view.function.args.len(), 2);
    }

    #[test]
    fn test_forced_skips_wrapped_slots() {
        let objects = ObjectManager::new();
        let resolver = TypeResolver::new(&objects);
        let mut f = Function::new("f", "void").with_arg("n", "int &");
        f.info.qualified_name = "::f".into();
        let pattern = Regex::new("::f::n$").unwrap();

        let mut view = WrappedView::new(&f);
        let mut wrappers = Vec::new();
        apply_forced(WrapperKind::Output, &pattern, &mut view, &mut wrappers, &resolver).unwrap();
        apply_forced(WrapperKind::Inout, &pattern, &mut view, &mut wrappers, &resolver).unwrap();
        assert_eq!(wrappers, vec![WrapperApplication::new(WrapperKind::Output, 0)]);
        assert!(view.function.args.is_empty());
    }
}

//! Argument wrappers: rewrites of a function's external signature that keep a
//! way back to the original call.
//!
//! A wrapper never touches the graph. [`ArgumentWrapper::apply`] takes a
//! [`WrappedView`] and returns a new one, so the current view of a function is
//! always its original signature with the recorded applications replayed.

use cxxbind_model::{Function, WrapperApplication, WrapperKind};
use cxxbind_types::{
    append_to_return, drop_last_parameter, function_pointer_type_info, is_const_type,
    is_integer_type, is_pointer_type, is_reference_type, is_string_array_type, is_string_type,
    pointer_base, remove_cvref, remove_ref, TypeResolver,
};

/// A function as the host sees it after some wrappers were applied.
#[derive(Debug, Clone)]
pub struct WrappedView {
    pub function: Function,
    /// Wrapper kinds applied to each remaining argument slot.
    pub provenance: Vec<Vec<WrapperKind>>,
}

impl WrappedView {
    pub fn new(function: &Function) -> Self {
        Self {
            provenance: vec![Vec::new(); function.args.len()],
            function: function.clone(),
        }
    }

    /// Replay `applications` in order over the original signature.
    pub fn replay(
        function: &Function,
        applications: &[WrapperApplication],
        resolver: &TypeResolver<'_>,
    ) -> Self {
        applications
            .iter()
            .fold(Self::new(function), |view, app| {
                let wrapper = wrapper_for(app.kind);
                if app.index < view.function.args.len() {
                    wrapper.apply(&view, app.index, resolver)
                } else {
                    view
                }
            })
    }

    pub fn is_unwrapped(&self, index: usize) -> bool {
        self.provenance.get(index).is_some_and(|p| p.is_empty())
    }

    fn remove_arg(&mut self, index: usize) {
        self.function.args.remove(index);
        self.provenance.remove(index);
    }
}

pub trait ArgumentWrapper {
    fn kind(&self) -> WrapperKind;

    /// Kinds that may already occupy a slot this wrapper rewrites.
    fn compatible_with(&self) -> &'static [WrapperKind] {
        &[]
    }

    /// Whether argument `index` of `view` has the shape this wrapper handles.
    fn matches(&self, view: &WrappedView, index: usize, resolver: &TypeResolver<'_>) -> bool;

    fn apply(&self, view: &WrappedView, index: usize, resolver: &TypeResolver<'_>) -> WrappedView;

    /// The slot exists and holds only compatible wrappers.
    fn can_apply(&self, view: &WrappedView, index: usize) -> bool {
        view.provenance
            .get(index)
            .is_some_and(|kinds| kinds.iter().all(|k| self.compatible_with().contains(k)))
    }
}

/// `void (*cb)(int, void *), void *user_data` becomes one callable.
pub struct CallbackWrapper;

/// `char **items, int count` becomes one sequence of strings.
pub struct StringArrayWrapper;

pub struct InoutArgumentWrapper;

pub struct OutputArgumentWrapper;

static CALLBACK: CallbackWrapper = CallbackWrapper;
static STRING_ARRAY: StringArrayWrapper = StringArrayWrapper;
static INOUT: InoutArgumentWrapper = InoutArgumentWrapper;
static OUTPUT: OutputArgumentWrapper = OutputArgumentWrapper;

pub fn wrapper_for(kind: WrapperKind) -> &'static dyn ArgumentWrapper {
    match kind {
        WrapperKind::Callback => &CALLBACK,
        WrapperKind::StringArray => &STRING_ARRAY,
        WrapperKind::Inout => &INOUT,
        WrapperKind::Output => &OUTPUT,
    }
}

fn resolved_arg(view: &WrappedView, index: usize, resolver: &TypeResolver<'_>) -> Option<String> {
    view.function
        .args
        .get(index)
        .map(|a| resolver.resolve_to_basic_type(&a.ty))
}

impl ArgumentWrapper for CallbackWrapper {
    fn kind(&self) -> WrapperKind {
        WrapperKind::Callback
    }

    fn matches(&self, view: &WrappedView, index: usize, resolver: &TypeResolver<'_>) -> bool {
        let (Some(callback), Some(user_data)) = (
            resolved_arg(view, index, resolver),
            resolved_arg(view, index + 1, resolver),
        ) else {
            return false;
        };
        let Some(signature) = function_pointer_type_info(&callback) else {
            return false;
        };
        let takes_user_data = signature
            .args
            .last()
            .is_some_and(|last| resolver.resolve_to_basic_type(&last.ty) == "void *");
        takes_user_data && user_data == "void *" && view.is_unwrapped(index + 1)
    }

    fn apply(&self, view: &WrappedView, index: usize, resolver: &TypeResolver<'_>) -> WrappedView {
        let mut next = view.clone();
        let resolved = resolver.resolve_to_basic_type(&view.function.args[index].ty);
        let ty = drop_last_parameter(&resolved).unwrap_or(resolved);
        next.function.args[index].ty = ty;
        next.provenance[index].push(self.kind());
        if index + 1 < next.function.args.len() {
            next.remove_arg(index + 1);
        }
        next
    }
}

impl ArgumentWrapper for StringArrayWrapper {
    fn kind(&self) -> WrapperKind {
        WrapperKind::StringArray
    }

    fn matches(&self, view: &WrappedView, index: usize, resolver: &TypeResolver<'_>) -> bool {
        let (Some(items), Some(count)) = (
            resolved_arg(view, index, resolver),
            resolved_arg(view, index + 1, resolver),
        ) else {
            return false;
        };
        is_string_array_type(&items) && is_integer_type(&count) && view.is_unwrapped(index + 1)
    }

    fn apply(&self, view: &WrappedView, index: usize, _resolver: &TypeResolver<'_>) -> WrappedView {
        let mut next = view.clone();
        next.function.args[index].ty = "std::vector<std::string>".to_string();
        next.provenance[index].push(self.kind());
        if index + 1 < next.function.args.len() {
            next.remove_arg(index + 1);
        }
        next
    }
}

/// A non-const reference, or a pointer to an integer or a string. A bare
/// `char *` is an input string, not a pointer to a char.
pub fn is_inout_candidate(ty: &str, resolver: &TypeResolver<'_>) -> bool {
    if is_reference_type(ty) && !is_const_type(ty) {
        return true;
    }
    let t = resolver.resolve_to_basic_type(ty);
    if is_string_type(&t) || !is_pointer_type(&t) {
        return false;
    }
    let base = pointer_base(&t);
    is_integer_type(&base) || is_string_type(&base)
}

/// The value type an inout or output argument hands back.
fn pointee(ty: &str, resolver: &TypeResolver<'_>) -> String {
    if is_reference_type(ty) {
        remove_cvref(&remove_ref(ty))
    } else {
        pointer_base(&resolver.resolve_to_basic_type(ty))
    }
}

impl ArgumentWrapper for InoutArgumentWrapper {
    fn kind(&self) -> WrapperKind {
        WrapperKind::Inout
    }

    fn matches(&self, view: &WrappedView, index: usize, resolver: &TypeResolver<'_>) -> bool {
        view.function
            .args
            .get(index)
            .is_some_and(|a| is_inout_candidate(&a.ty, resolver))
    }

    fn apply(&self, view: &WrappedView, index: usize, resolver: &TypeResolver<'_>) -> WrappedView {
        let mut next = view.clone();
        let value = pointee(&view.function.args[index].ty, resolver);
        next.function.ret_type = append_to_return(&view.function.ret_type, &value);
        next.provenance[index].push(self.kind());
        next
    }
}

impl ArgumentWrapper for OutputArgumentWrapper {
    fn kind(&self) -> WrapperKind {
        WrapperKind::Output
    }

    fn matches(&self, view: &WrappedView, index: usize, resolver: &TypeResolver<'_>) -> bool {
        view.function
            .args
            .get(index)
            .is_some_and(|a| is_inout_candidate(&a.ty, resolver))
    }

    fn apply(&self, view: &WrappedView, index: usize, resolver: &TypeResolver<'_>) -> WrappedView {
        let mut next = view.clone();
        let value = pointee(&view.function.args[index].ty, resolver);
        next.function.ret_type = append_to_return(&view.function.ret_type, &value);
        next.remove_arg(index);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cxxbind_model::ObjectManager;

    fn view(f: Function) -> WrappedView {
        WrappedView::new(&f)
    }

    #[test]
    fn test_callback() {
        let objects = ObjectManager::new();
        let r = TypeResolver::new(&objects);
        let v = view(
            Function::new("subscribe", "int")
                .with_arg("cb", "void (*)(int, void *)")
                .with_arg("user_data", "void *")
                .with_arg("flags", "int"),
        );
        assert!(CALLBACK.matches(&v, 0, &r));
        assert!(!CALLBACK.matches(&v, 1, &r));

        let next = CALLBACK.apply(&v, 0, &r);
        assert_eq!(next.function.args.len(), 2);
        assert_eq!(next.function.args[0].ty, "void (*)(int)");
        assert_eq!(next.function.args[1].info.name, "flags");
        assert_eq!(next.provenance, vec![vec![WrapperKind::Callback], vec![]]);
        assert!(!CALLBACK.can_apply(&next, 0));
        assert!(CALLBACK.can_apply(&next, 1));
    }

    #[test]
    fn test_callback_needs_trailing_user_data() {
        let objects = ObjectManager::new();
        let r = TypeResolver::new(&objects);
        let v = view(
            Function::new("f", "void")
                .with_arg("cb", "void (*)(void *, int)")
                .with_arg("user_data", "void *"),
        );
        assert!(!CALLBACK.matches(&v, 0, &r));
    }

    #[test]
    fn test_string_array() {
        let objects = ObjectManager::new();
        let r = TypeResolver::new(&objects);
        let v = view(
            Function::new("subscribe", "int")
                .with_arg("ids", "char **")
                .with_arg("count", "int"),
        );
        assert!(STRING_ARRAY.matches(&v, 0, &r));
        let next = STRING_ARRAY.apply(&v, 0, &r);
        assert_eq!(next.function.args.len(), 1);
        assert_eq!(next.function.args[0].ty, "std::vector<std::string>");
    }

    #[test]
    fn test_inout_candidates() {
        let objects = ObjectManager::new();
        let r = TypeResolver::new(&objects);
        assert!(is_inout_candidate("int &", &r));
        assert!(!is_inout_candidate("const int &", &r));
        assert!(is_inout_candidate("int *", &r));
        assert!(is_inout_candidate("unsigned long long *", &r));
        assert!(is_inout_candidate("char **", &r));
        assert!(!is_inout_candidate("char *", &r));
        assert!(!is_inout_candidate("double *", &r));
        assert!(!is_inout_candidate("int", &r));
    }

    #[test]
    fn test_inout_and_output() {
        let objects = ObjectManager::new();
        let r = TypeResolver::new(&objects);
        let v = view(
            Function::new("read", "bool")
                .with_arg("size", "int *")
                .with_arg("flags", "unsigned int &"),
        );

        let inout = INOUT.apply(&v, 1, &r);
        assert_eq!(inout.function.args.len(), 2);
        assert_eq!(inout.function.ret_type, "std::tuple<bool, unsigned int>");
        assert!(!INOUT.can_apply(&inout, 1));

        let output = OUTPUT.apply(&inout, 0, &r);
        assert_eq!(output.function.args.len(), 1);
        assert_eq!(output.function.args[0].info.name, "flags");
        assert_eq!(
            output.function.ret_type,
            "std::tuple<bool, unsigned int, int>"
        );
    }

    #[test]
    fn test_replay() {
        let objects = ObjectManager::new();
        let r = TypeResolver::new(&objects);
        let f = Function::new("f", "void")
            .with_arg("out", "int *")
            .with_arg("cb", "void (*)(void *)")
            .with_arg("ctx", "void *");
        let apps = [
            WrapperApplication::new(WrapperKind::Output, 0),
            WrapperApplication::new(WrapperKind::Callback, 0),
        ];
        let v = WrappedView::replay(&f, &apps, &r);
        assert_eq!(v.function.args.len(), 1);
        assert_eq!(v.function.args[0].ty, "void (*)()");
        assert_eq!(v.function.ret_type, "std::tuple<int>");
    }
}

//! The typing environment `Gamma : Name -> Scheme`.

use rustc_hash::FxHashMap;

use taylor_types::{Type, TypeScheme};

/// A persistent-ish, scope-chained environment. `child()` creates a new
/// scope that shadows the parent without mutating it, matching how the
/// collector enters a lambda body or a match-case's bound variables.
#[derive(Clone, Debug, Default)]
pub struct TypeEnv {
    bindings: FxHashMap<String, TypeScheme>,
}

impl TypeEnv {
    pub fn new() -> Self {
        TypeEnv { bindings: FxHashMap::default() }
    }

    pub fn bind(&mut self, name: impl Into<String>, scheme: TypeScheme) {
        self.bindings.insert(name.into(), scheme);
    }

    pub fn bind_mono(&mut self, name: impl Into<String>, ty: Type) {
        self.bind(name, TypeScheme::mono(ty));
    }

    pub fn lookup(&self, name: &str) -> Option<&TypeScheme> {
        self.bindings.get(name)
    }

    /// Free type variables across every binding in scope, used by
    /// `generalize` to decide which variables of a candidate type are
    /// actually free to quantify over.
    pub fn free_vars(&self) -> rustc_hash::FxHashSet<u32> {
        let mut out = rustc_hash::FxHashSet::default();
        for scheme in self.bindings.values() {
            out.extend(scheme.free_vars());
        }
        out
    }

    /// A child scope that starts as a copy of `self`; bindings added to the
    /// child do not propagate back up. Cheap enough for a tree-shaped
    /// traversal of the sizes this compiler handles; a persistent
    /// structure would be the next step if profiling ever demanded it.
    pub fn child(&self) -> Self {
        self.clone()
    }
}

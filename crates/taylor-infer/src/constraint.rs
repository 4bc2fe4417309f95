//! Constraints emitted by the collector and consumed by the solver.
//!
//! Provenance tracking is essential for good error messages. Instead of
//! "expected Int, found String", a `ConstraintOrigin` lets the solver say
//! "argument 2 of `add` expected Int, found String (at 14..22)".

use taylor_ast::Span;
use taylor_types::{Type, TypeScheme};

/// Where a constraint came from -- attached to every constraint so the
/// solver can produce a message that points at the responsible syntax
/// rather than just the two types that disagreed.
#[derive(Clone, Debug)]
pub enum ConstraintOrigin {
    /// `f(a1, .., an)`: argument `param_idx` must match the callee's
    /// declared parameter type.
    FnArg { call_span: Span, param_idx: usize },
    BinOp { op_span: Span },
    /// The two branches of an `if` must agree.
    IfBranches { if_span: Span, then_span: Span, else_span: Span },
    Annotation { annotation_span: Span },
    /// A `match` case body must agree with the other cases' bodies.
    MatchCase { case_span: Span },
    /// A `try` expression's inner type against the function's declared
    /// return/error type.
    TryUnwrap { try_span: Span },
    LetBinding { binding_span: Span },
    ConstructorArg { call_span: Span, field_idx: usize },
    /// Synthetic origin for built-in constraints (arithmetic, comparison).
    Builtin,
}

impl ConstraintOrigin {
    /// Best-effort span for diagnostics; some origins (`Builtin`) have none.
    pub fn span(&self) -> Option<Span> {
        match self {
            ConstraintOrigin::FnArg { call_span, .. } => Some(*call_span),
            ConstraintOrigin::BinOp { op_span } => Some(*op_span),
            ConstraintOrigin::IfBranches { if_span, .. } => Some(*if_span),
            ConstraintOrigin::Annotation { annotation_span } => Some(*annotation_span),
            ConstraintOrigin::MatchCase { case_span } => Some(*case_span),
            ConstraintOrigin::TryUnwrap { try_span } => Some(*try_span),
            ConstraintOrigin::LetBinding { binding_span } => Some(*binding_span),
            ConstraintOrigin::ConstructorArg { call_span, .. } => Some(*call_span),
            ConstraintOrigin::Builtin => None,
        }
    }
}

/// A proposition about types that must hold once the final substitution is
/// applied.
#[derive(Clone, Debug)]
pub enum Constraint {
    /// `t1` and `t2` must unify.
    Equality(Type, Type, ConstraintOrigin),
    /// `sub` must be `super` or a subtype of it. Used only for `Result<_,
    /// E>`'s error parameter against `Throwable`.
    Subtype(Type, Type, ConstraintOrigin),
    /// `ty` must be an instantiation of `scheme` with fresh variables.
    Instance(Type, TypeScheme, ConstraintOrigin),
}

impl Constraint {
    pub fn origin(&self) -> &ConstraintOrigin {
        match self {
            Constraint::Equality(_, _, o) => o,
            Constraint::Subtype(_, _, o) => o,
            Constraint::Instance(_, _, o) => o,
        }
    }
}

/// An ordered, append-only list of constraints.
///
/// Order is preserved for deterministic error reporting; it has no bearing
/// on the final substitution, since solutions are confluent modulo variable
/// renaming.
#[derive(Clone, Debug, Default)]
pub struct ConstraintSet {
    constraints: Vec<Constraint>,
}

impl ConstraintSet {
    pub fn new() -> Self {
        ConstraintSet { constraints: Vec::new() }
    }

    pub fn add(&mut self, c: Constraint) {
        self.constraints.push(c);
    }

    /// Append `other`'s constraints after this set's, preserving the
    /// relative order of each.
    pub fn merge(mut self, other: ConstraintSet) -> Self {
        self.constraints.extend(other.constraints);
        self
    }

    /// Split into two sets by predicate, preserving relative order in each.
    pub fn partition<F: Fn(&Constraint) -> bool>(self, pred: F) -> (ConstraintSet, ConstraintSet) {
        let (yes, no): (Vec<_>, Vec<_>) = self.constraints.into_iter().partition(|c| pred(c));
        (ConstraintSet { constraints: yes }, ConstraintSet { constraints: no })
    }

    pub fn mentioned_type_vars(&self) -> rustc_hash::FxHashSet<u32> {
        let mut out = rustc_hash::FxHashSet::default();
        for c in &self.constraints {
            match c {
                Constraint::Equality(t1, t2, _) => {
                    out.extend(t1.free_vars());
                    out.extend(t2.free_vars());
                }
                Constraint::Subtype(t1, t2, _) => {
                    out.extend(t1.free_vars());
                    out.extend(t2.free_vars());
                }
                Constraint::Instance(t, scheme, _) => {
                    out.extend(t.free_vars());
                    out.extend(scheme.free_vars());
                }
            }
        }
        out
    }

    pub fn iter(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints.iter()
    }

    pub fn into_vec(self) -> Vec<Constraint> {
        self.constraints
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }
}

impl FromIterator<Constraint> for ConstraintSet {
    fn from_iter<I: IntoIterator<Item = Constraint>>(iter: I) -> Self {
        ConstraintSet { constraints: iter.into_iter().collect() }
    }
}

impl Extend<Constraint> for ConstraintSet {
    fn extend<I: IntoIterator<Item = Constraint>>(&mut self, iter: I) {
        self.constraints.extend(iter);
    }
}

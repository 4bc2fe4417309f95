//! The constraint solver: unification-with-occurs-check over a
//! `ConstraintSet`, producing a principal substitution (or an ordered list
//! of `TypeError`s) plus a fully typed AST.

use std::collections::VecDeque;

use taylor_ast::Span;
use taylor_types::{unify, Substitution, Type, TypeVarFactory};

use crate::class_hierarchy::ClassHierarchy;
use crate::constraint::{Constraint, ConstraintOrigin, ConstraintSet};
use crate::error::TypeError;

pub struct Solver<'a> {
    factory: &'a TypeVarFactory,
    hierarchy: &'a ClassHierarchy,
}

fn type_constructor_name(ty: &Type) -> Option<&str> {
    match ty {
        Type::Named(n) => Some(n.as_str()),
        Type::Generic(n, _) => Some(n.as_str()),
        _ => None,
    }
}

impl<'a> Solver<'a> {
    pub fn new(factory: &'a TypeVarFactory, hierarchy: &'a ClassHierarchy) -> Self {
        Solver { factory, hierarchy }
    }

    /// Process every constraint in order, accumulating a substitution.
    /// `UnifyError`s are recorded against the offending constraint's
    /// origin and the loop continues against the partial substitution, so
    /// a single pass can surface more than one error.
    pub fn solve(&self, constraints: ConstraintSet) -> (Substitution, Vec<TypeError>) {
        let mut subst = Substitution::empty();
        let mut errors = Vec::new();
        let mut queue: VecDeque<Constraint> = constraints.into_vec().into();
        let mut residual_subtypes: Vec<(Type, Type, ConstraintOrigin)> = Vec::new();

        while let Some(c) = queue.pop_front() {
            match c {
                Constraint::Equality(t1, t2, origin) => {
                    let a = subst.apply(&t1);
                    let b = subst.apply(&t2);
                    match unify(&a, &b) {
                        Ok(step) => subst = Substitution::compose(&step, &subst),
                        Err(e) => errors.push(TypeError::from_unify_error(e, &origin, Span::synthetic())),
                    }
                }
                Constraint::Instance(v, scheme, origin) => {
                    let instantiated = taylor_types::instantiate(&scheme, self.factory);
                    queue.push_back(Constraint::Equality(v, instantiated, origin));
                }
                Constraint::Subtype(sub, sup, origin) => {
                    let sub_applied = subst.apply(&sub);
                    let sup_applied = subst.apply(&sup);
                    self.handle_subtype(sub_applied, sup_applied, origin, &mut queue, &mut residual_subtypes, &mut errors);
                }
            }
        }

        // One final re-check pass now that the main queue has drained: a
        // residual constraint stuck behind an unresolved variable earlier
        // may be ground now.
        for (sub, sup, origin) in residual_subtypes {
            let sub_applied = subst.apply(&sub);
            let sup_applied = subst.apply(&sup);
            if let (Some(n1), Some(n2)) = (type_constructor_name(&sub_applied), type_constructor_name(&sup_applied)) {
                if !self.hierarchy.is_subtype(n1, n2) {
                    errors.push(TypeError {
                        kind: crate::error::TypeErrorKind::Mismatch,
                        location: origin.span().unwrap_or_default(),
                        primary_message: format!("`{n1}` is not a subtype of `{n2}`"),
                        secondary_messages: Vec::new(),
                        suggestion: None,
                    });
                }
            }
            // Still not ground on one side: genuinely ambiguous, left for
            // the post-pass's generic `AmbiguousType` sweep to catch.
        }

        (subst, errors)
    }

    #[allow(clippy::too_many_arguments)]
    fn handle_subtype(
        &self,
        sub: Type,
        sup: Type,
        origin: ConstraintOrigin,
        queue: &mut VecDeque<Constraint>,
        residual: &mut Vec<(Type, Type, ConstraintOrigin)>,
        errors: &mut Vec<TypeError>,
    ) {
        let sub_ground = sub.free_vars().is_empty();
        let sup_ground = sup.free_vars().is_empty();

        match (type_constructor_name(&sub), type_constructor_name(&sup)) {
            (Some(n1), Some(n2)) if sub_ground && sup_ground => {
                if !self.hierarchy.is_subtype(n1, n2) {
                    errors.push(TypeError {
                        kind: crate::error::TypeErrorKind::Mismatch,
                        location: origin.span().unwrap_or_default(),
                        primary_message: format!("`{n1}` is not a subtype of `{n2}`"),
                        secondary_messages: Vec::new(),
                        suggestion: None,
                    });
                }
            }
            _ if matches!(sub, Type::Var(_)) && sup_ground => {
                // Defaulting choice: pin the unresolved error type to the
                // function's declared bound.
                queue.push_back(Constraint::Equality(sub, sup, origin));
            }
            _ => residual.push((sub, sup, origin)),
        }
    }
}

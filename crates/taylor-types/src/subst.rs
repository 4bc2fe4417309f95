//! Substitutions: finite mappings from type variables to types.
//!
//! All type comparisons and rewrites in the core go through `apply` and
//! `compose`. Ad hoc structural equality checks elsewhere are prohibited --
//! if code needs to know whether two types are "the same", it applies the
//! current substitution to both and compares the results.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::ty::{Type, TypeVar};

/// A finite mapping `TypeVar -> Type`.
///
/// Composition is defined so that `compose(theta2, theta1).apply(t) ==
/// theta2.apply(theta1.apply(t))` for all `t`. Substitutions produced by a
/// completed solver run are idempotent: applying them twice yields the same
/// result as applying them once, because every bound variable maps to a
/// ground type that itself contains no bound variable.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Substitution {
    map: FxHashMap<u32, Type>,
}

impl Substitution {
    pub fn empty() -> Self {
        Substitution { map: FxHashMap::default() }
    }

    pub fn singleton(var: TypeVar, ty: Type) -> Self {
        let mut map = FxHashMap::default();
        map.insert(var.id, ty);
        Substitution { map }
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn get(&self, var: &TypeVar) -> Option<&Type> {
        self.map.get(&var.id)
    }

    pub fn insert(&mut self, var: TypeVar, ty: Type) {
        self.map.insert(var.id, ty);
    }

    /// Recursively substitute through a type. `apply(theta, Var(v)) ==
    /// theta(v)` if bound, else `Var(v)` unchanged.
    pub fn apply(&self, ty: &Type) -> Type {
        match ty {
            Type::Var(v) => match self.map.get(&v.id) {
                // The bound value may itself mention other bound variables
                // (e.g. freshly unioned vars before a final idempotent
                // snapshot); keep resolving until a fixed point so callers
                // always see a maximally-resolved type.
                Some(bound) => self.apply(bound),
                None => ty.clone(),
            },
            Type::Primitive(_) | Type::Named(_) => ty.clone(),
            Type::Generic(name, args) => {
                Type::Generic(name.clone(), args.iter().map(|a| self.apply(a)).collect())
            }
            Type::Tuple(elems) => Type::Tuple(elems.iter().map(|e| self.apply(e)).collect()),
            Type::Nullable(inner) => Type::Nullable(Box::new(self.apply(inner))),
            Type::Function(params, ret) => Type::Function(
                params.iter().map(|p| self.apply(p)).collect(),
                Box::new(self.apply(ret)),
            ),
        }
    }

    /// Free type variables mentioned by the substitution's codomain that are
    /// not otherwise resolved, used by `generalize`.
    pub fn free_vars(&self) -> FxHashSet<u32> {
        let mut out = FxHashSet::default();
        for ty in self.map.values() {
            for v in ty.free_vars() {
                out.insert(v);
            }
        }
        out
    }

    /// `compose(theta2, theta1)` such that applying the result equals
    /// applying `theta1` then `theta2`.
    pub fn compose(theta2: &Substitution, theta1: &Substitution) -> Substitution {
        let mut map: FxHashMap<u32, Type> = theta1
            .map
            .iter()
            .map(|(k, v)| (*k, theta2.apply(v)))
            .collect();
        for (k, v) in &theta2.map {
            map.entry(*k).or_insert_with(|| v.clone());
        }
        Substitution { map }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&u32, &Type)> {
        self.map.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ty::PrimitiveName;

    #[test]
    fn apply_substitutes_bound_var() {
        let v = TypeVar::new(0);
        let subst = Substitution::singleton(v.clone(), Type::int());
        assert_eq!(subst.apply(&Type::Var(v)), Type::int());
    }

    #[test]
    fn apply_leaves_unbound_var() {
        let v = TypeVar::new(0);
        let subst = Substitution::empty();
        assert_eq!(subst.apply(&Type::Var(v.clone())), Type::Var(v));
    }

    #[test]
    fn compose_matches_sequential_application() {
        let a = TypeVar::new(0);
        let b = TypeVar::new(1);
        // theta1: a -> b
        let theta1 = Substitution::singleton(a.clone(), Type::Var(b.clone()));
        // theta2: b -> Int
        let theta2 = Substitution::singleton(b, Type::int());

        let composed = Substitution::compose(&theta2, &theta1);
        let direct = theta2.apply(&theta1.apply(&Type::Var(a.clone())));
        assert_eq!(composed.apply(&Type::Var(a)), direct);
        assert_eq!(direct, Type::Primitive(PrimitiveName::Int));
    }

    #[test]
    fn idempotent_after_full_resolution() {
        let v = TypeVar::new(0);
        let subst = Substitution::singleton(v.clone(), Type::int());
        let once = subst.apply(&Type::Var(v.clone()));
        let twice = subst.apply(&once);
        assert_eq!(once, twice);
    }
}

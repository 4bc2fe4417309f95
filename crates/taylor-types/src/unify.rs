//! Robinson's unification algorithm over [`Type`], plus scheme
//! instantiation and generalization.
//!
//! Unification never mutates a shared union-find table; it returns a fresh
//! [`Substitution`] that the caller composes onto whatever substitution it
//! already holds. This keeps the solver's "apply partial substitution and
//! keep going after an error" behavior simple: a failed unification just
//! yields no substitution instead of leaving a table half-mutated.

use std::fmt;

use rustc_hash::FxHashSet;

use crate::subst::Substitution;
use crate::ty::{Type, TypeScheme, TypeVar};
use crate::var_factory::TypeVarFactory;

#[derive(Clone, Debug, PartialEq)]
pub enum UnifyError {
    /// Unifying a variable with a type that structurally contains it, e.g.
    /// `?a` with `List<?a>`.
    OccursCheck { var: TypeVar, ty: Type },
    MismatchPrimitives { expected: Type, found: Type },
    /// Two named or generic types whose constructor names disagree.
    MismatchNames { expected: String, found: String },
    /// Constructors agree but the two sides have incompatible shapes
    /// (e.g. a `Tuple` against a `Function`).
    MismatchShape { expected: Type, found: Type },
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },
}

impl fmt::Display for UnifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnifyError::OccursCheck { var, ty } => {
                write!(f, "occurs check failed: {var} occurs in {ty}")
            }
            UnifyError::MismatchPrimitives { expected, found } => {
                write!(f, "expected {expected}, found {found}")
            }
            UnifyError::MismatchNames { expected, found } => {
                write!(f, "expected type constructor `{expected}`, found `{found}`")
            }
            UnifyError::MismatchShape { expected, found } => {
                write!(f, "expected {expected}, found {found}")
            }
            UnifyError::ArityMismatch { name, expected, found } => {
                write!(
                    f,
                    "`{name}` expects {expected} type argument(s), found {found}"
                )
            }
        }
    }
}

impl std::error::Error for UnifyError {}

/// `Nullable(T)` and `Generic("Option", [T])` are the same type to the
/// unifier; codegen is the only consumer that cares which syntax produced
/// it. Normalize both to the generic form before comparing shapes.
fn as_generic_view(ty: &Type) -> Option<(&str, Vec<&Type>)> {
    match ty {
        Type::Nullable(inner) => Some(("Option", vec![inner.as_ref()])),
        Type::Generic(name, args) => Some((name.as_str(), args.iter().collect())),
        Type::Named(name) => Some((name.as_str(), Vec::new())),
        _ => None,
    }
}

/// Unify two types, returning a substitution that makes them equal under
/// `apply`, or the first mismatch encountered.
pub fn unify(a: &Type, b: &Type) -> Result<Substitution, UnifyError> {
    match (a, b) {
        (Type::Var(v1), Type::Var(v2)) if v1.id == v2.id => Ok(Substitution::empty()),
        (Type::Var(v), other) | (other, Type::Var(v)) => bind_var(v, other),

        (Type::Primitive(p1), Type::Primitive(p2)) => {
            if p1 == p2 {
                Ok(Substitution::empty())
            } else {
                Err(UnifyError::MismatchPrimitives {
                    expected: a.clone(),
                    found: b.clone(),
                })
            }
        }

        (Type::Tuple(xs), Type::Tuple(ys)) => {
            if xs.len() != ys.len() {
                return Err(UnifyError::ArityMismatch {
                    name: "tuple".to_string(),
                    expected: xs.len(),
                    found: ys.len(),
                });
            }
            unify_pointwise(xs, ys)
        }

        (Type::Function(ps1, r1), Type::Function(ps2, r2)) => {
            if ps1.len() != ps2.len() {
                return Err(UnifyError::ArityMismatch {
                    name: "function".to_string(),
                    expected: ps1.len(),
                    found: ps2.len(),
                });
            }
            let mut subst = unify_pointwise(ps1, ps2)?;
            let r = unify(&subst.apply(r1), &subst.apply(r2))?;
            subst = Substitution::compose(&r, &subst);
            Ok(subst)
        }

        _ => match (as_generic_view(a), as_generic_view(b)) {
            (Some((name1, args1)), Some((name2, args2))) => {
                if name1 != name2 {
                    return Err(UnifyError::MismatchNames {
                        expected: name1.to_string(),
                        found: name2.to_string(),
                    });
                }
                if args1.len() != args2.len() {
                    return Err(UnifyError::ArityMismatch {
                        name: name1.to_string(),
                        expected: args1.len(),
                        found: args2.len(),
                    });
                }
                let owned1: Vec<Type> = args1.into_iter().cloned().collect();
                let owned2: Vec<Type> = args2.into_iter().cloned().collect();
                unify_pointwise(&owned1, &owned2)
            }
            _ => Err(UnifyError::MismatchShape {
                expected: a.clone(),
                found: b.clone(),
            }),
        },
    }
}

/// Unify corresponding elements left to right, composing each result onto
/// the accumulated substitution before moving to the next pair (so later
/// elements see earlier bindings).
fn unify_pointwise(xs: &[Type], ys: &[Type]) -> Result<Substitution, UnifyError> {
    let mut subst = Substitution::empty();
    for (x, y) in xs.iter().zip(ys.iter()) {
        let x = subst.apply(x);
        let y = subst.apply(y);
        let step = unify(&x, &y)?;
        subst = Substitution::compose(&step, &subst);
    }
    Ok(subst)
}

fn bind_var(var: &TypeVar, ty: &Type) -> Result<Substitution, UnifyError> {
    if let Type::Var(other) = ty {
        if other.id == var.id {
            return Ok(Substitution::empty());
        }
    }
    if ty.free_vars().contains(&var.id) {
        return Err(UnifyError::OccursCheck {
            var: var.clone(),
            ty: ty.clone(),
        });
    }
    Ok(Substitution::singleton(var.clone(), ty.clone()))
}

/// Replace every quantified variable of `scheme` with a fresh one, drawn
/// from `factory`. Free (non-quantified) variables in the body are left
/// untouched.
pub fn instantiate(scheme: &TypeScheme, factory: &TypeVarFactory) -> Type {
    if scheme.quantified.is_empty() {
        return scheme.body.clone();
    }
    let mut subst = Substitution::empty();
    for qv in &scheme.quantified {
        subst.insert(qv.clone(), Type::Var(factory.fresh()));
    }
    subst.apply(&scheme.body)
}

/// Close over every free variable of `ty` that does not also appear free in
/// the surrounding environment (`env_free_vars`), producing a `forall`
/// scheme suitable for storing in a `val`/`let` binding.
pub fn generalize(env_free_vars: &FxHashSet<u32>, ty: &Type) -> TypeScheme {
    let mut quantified: Vec<TypeVar> = ty
        .free_vars()
        .into_iter()
        .filter(|id| !env_free_vars.contains(id))
        .map(TypeVar::new)
        .collect();
    quantified.sort_by_key(|v| v.id);
    TypeScheme::poly(quantified, ty.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unify_two_fresh_vars() {
        let a = TypeVar::new(0);
        let b = TypeVar::new(1);
        let subst = unify(&Type::Var(a.clone()), &Type::Var(b.clone())).unwrap();
        assert_eq!(subst.apply(&Type::Var(a)), subst.apply(&Type::Var(b)));
    }

    #[test]
    fn unify_var_with_concrete_type() {
        let a = TypeVar::new(0);
        let subst = unify(&Type::Var(a.clone()), &Type::int()).unwrap();
        assert_eq!(subst.apply(&Type::Var(a)), Type::int());
    }

    #[test]
    fn occurs_check_rejects_infinite_type() {
        let a = TypeVar::new(0);
        let list_of_a = Type::list(Type::Var(a.clone()));
        let err = unify(&Type::Var(a), &list_of_a).unwrap_err();
        assert!(matches!(err, UnifyError::OccursCheck { .. }));
    }

    #[test]
    fn primitive_mismatch_is_an_error() {
        let err = unify(&Type::int(), &Type::string()).unwrap_err();
        assert!(matches!(err, UnifyError::MismatchPrimitives { .. }));
    }

    #[test]
    fn generic_name_mismatch_is_an_error() {
        let err = unify(&Type::option(Type::int()), &Type::list(Type::int())).unwrap_err();
        assert!(matches!(err, UnifyError::MismatchNames { .. }));
    }

    #[test]
    fn nullable_unifies_with_option_generic() {
        let nullable_int = Type::Nullable(Box::new(Type::int()));
        let option_int = Type::option(Type::int());
        let subst = unify(&nullable_int, &option_int).unwrap();
        assert!(subst.is_empty());
    }

    #[test]
    fn named_unifies_with_empty_generic() {
        let named = Type::Named("Ordering".to_string());
        let generic = Type::Generic("Ordering".to_string(), Vec::new());
        let subst = unify(&named, &generic).unwrap();
        assert!(subst.is_empty());
    }

    #[test]
    fn function_arity_mismatch_is_an_error() {
        let f1 = Type::function(vec![Type::int()], Type::boolean());
        let f2 = Type::function(vec![Type::int(), Type::int()], Type::boolean());
        let err = unify(&f1, &f2).unwrap_err();
        assert!(matches!(err, UnifyError::ArityMismatch { .. }));
    }

    #[test]
    fn function_return_type_sees_param_bindings() {
        let a = TypeVar::new(0);
        let f1 = Type::function(vec![Type::Var(a.clone())], Type::Var(a.clone()));
        let f2 = Type::function(vec![Type::int()], Type::Var(TypeVar::new(1)));
        let subst = unify(&f1, &f2).unwrap();
        assert_eq!(subst.apply(&Type::Var(a)), Type::int());
    }

    #[test]
    fn generalize_and_instantiate_round_trip() {
        let factory = TypeVarFactory::new();
        let a = factory.fresh();
        let env_free = FxHashSet::default();
        let scheme = generalize(&env_free, &Type::function(vec![Type::Var(a.clone())], Type::Var(a)));
        assert_eq!(scheme.quantified.len(), 1);

        let t1 = instantiate(&scheme, &factory);
        let t2 = instantiate(&scheme, &factory);
        // Each instantiation must be fresh: unifying the two results must
        // not force them to the same variable as the original.
        assert_ne!(t1, t2);
    }

    #[test]
    fn generalize_excludes_env_free_vars() {
        let a = TypeVar::new(0);
        let mut env_free = FxHashSet::default();
        env_free.insert(a.id);
        let scheme = generalize(&env_free, &Type::Var(a));
        assert!(scheme.quantified.is_empty());
    }

    #[test]
    fn tuple_arity_mismatch_is_an_error() {
        let t1 = Type::Tuple(vec![Type::int(), Type::int()]);
        let t2 = Type::Tuple(vec![Type::int()]);
        let err = unify(&t1, &t2).unwrap_err();
        assert!(matches!(err, UnifyError::ArityMismatch { .. }));
    }

    #[test]
    fn shape_mismatch_between_tuple_and_function() {
        let t = Type::Tuple(vec![Type::int()]);
        let f = Type::function(vec![Type::int()], Type::int());
        let err = unify(&t, &f).unwrap_err();
        assert!(matches!(err, UnifyError::MismatchShape { .. }));
    }

    #[test]
    fn ty_display_formats_generics_and_functions() {
        let ty = Type::function(
            vec![Type::Tuple(vec![Type::int(), Type::string()])],
            Type::option(Type::boolean()),
        );
        assert_eq!(ty.to_string(), "((Int, String)) -> Option<Boolean>");
    }
}

//! Type representation, substitution, and unification for TaylorLang.
//!
//! This crate owns the `TypeRep` layer: the closed `Type` sum, substitutions
//! over it, Robinson's unification, and scheme generalization/instantiation.
//! It knows nothing about constraint collection or bytecode; those live in
//! `taylor-infer` and `taylor-codegen` respectively, both of which depend on
//! this crate for their shared vocabulary of types.

pub mod subst;
pub mod ty;
pub mod unify;
pub mod var_factory;

pub use subst::Substitution;
pub use ty::{PrimitiveName, Type, TypeScheme, TypeVar};
pub use unify::{generalize, instantiate, unify, UnifyError};
pub use var_factory::TypeVarFactory;

//! The prelude environment: built-in functions and the constructor schemes
//! contributed by every `type` declaration in the program.
//!
//! Arithmetic and comparison operators are *not* registered here as named
//! `Gamma` entries -- the collector dispatches on `BinOp` directly (see
//! `collector::collect_binary`), because their typing rule is a three-way
//! dispatch on the operand types rather than a single monomorphic or
//! polymorphic signature a scheme can express.

use taylor_ast::{Statement, StatementKind, TypeAnnotation};
use taylor_types::{Type, TypeScheme, TypeVar, TypeVarFactory};

use crate::env::TypeEnv;

/// `println : forall a. a -> Unit`, plus the constructor schemes for the
/// runtime library's built-in union types (`Option`, `Result`, `List`,
/// `Pair`). The runtime library itself is out of scope for this core --
/// the core only consumes these declared shapes, which it does here the
/// same way it would consume a user `type` declaration.
pub fn prelude(factory: &TypeVarFactory) -> TypeEnv {
    let mut env = TypeEnv::new();
    let a = factory.fresh_named("a");
    env.bind(
        "println",
        TypeScheme::poly(vec![a.clone()], Type::function(vec![Type::Var(a)], Type::unit())),
    );

    let t = factory.fresh_named("T");
    env.bind(
        "Some",
        TypeScheme::poly(vec![t.clone()], Type::function(vec![Type::Var(t.clone())], Type::option(Type::Var(t)))),
    );
    let t = factory.fresh_named("T");
    env.bind("None", TypeScheme::poly(vec![t.clone()], Type::option(Type::Var(t))));

    let ok_t = factory.fresh_named("T");
    let ok_e = factory.fresh_named("E");
    env.bind(
        "Ok",
        TypeScheme::poly(
            vec![ok_t.clone(), ok_e.clone()],
            Type::function(vec![Type::Var(ok_t.clone())], Type::result(Type::Var(ok_t), Type::Var(ok_e))),
        ),
    );
    let err_t = factory.fresh_named("T");
    let err_e = factory.fresh_named("E");
    env.bind(
        "Error",
        TypeScheme::poly(
            vec![err_t.clone(), err_e.clone()],
            Type::function(vec![Type::Var(err_e.clone())], Type::result(Type::Var(err_t), Type::Var(err_e))),
        ),
    );

    let cons_t = factory.fresh_named("T");
    env.bind(
        "Cons",
        TypeScheme::poly(
            vec![cons_t.clone()],
            Type::function(
                vec![Type::Var(cons_t.clone()), Type::list(Type::Var(cons_t.clone()))],
                Type::list(Type::Var(cons_t)),
            ),
        ),
    );
    let nil_t = factory.fresh_named("T");
    env.bind("Nil", TypeScheme::poly(vec![nil_t.clone()], Type::list(Type::Var(nil_t))));

    let pair_a = factory.fresh_named("A");
    let pair_b = factory.fresh_named("B");
    env.bind(
        "Pair",
        TypeScheme::poly(
            vec![pair_a.clone(), pair_b.clone()],
            Type::function(
                vec![Type::Var(pair_a.clone()), Type::Var(pair_b.clone())],
                Type::Generic("Pair".to_string(), vec![Type::Var(pair_a), Type::Var(pair_b)]),
            ),
        ),
    );

    env
}

/// Resolve a source-level [`TypeAnnotation`] into a `taylor_types::Type`,
/// substituting bound type-parameter names for the `Var`s introduced for
/// this declaration.
pub fn resolve_annotation(annotation: &TypeAnnotation, params: &rustc_hash::FxHashMap<String, Type>) -> Type {
    match annotation {
        TypeAnnotation::Name(name) => params
            .get(name)
            .cloned()
            .unwrap_or_else(|| named_or_primitive(name)),
        TypeAnnotation::Generic(name, args) => Type::Generic(
            name.clone(),
            args.iter().map(|a| resolve_annotation(a, params)).collect(),
        ),
        TypeAnnotation::Tuple(elems) => {
            Type::Tuple(elems.iter().map(|a| resolve_annotation(a, params)).collect())
        }
        TypeAnnotation::Function(ps, ret) => Type::Function(
            ps.iter().map(|a| resolve_annotation(a, params)).collect(),
            Box::new(resolve_annotation(ret, params)),
        ),
        TypeAnnotation::Nullable(inner) => Type::Nullable(Box::new(resolve_annotation(inner, params))),
    }
}

fn named_or_primitive(name: &str) -> Type {
    match name {
        "Int" => Type::int(),
        "Long" => Type::long(),
        "Float" => Type::float(),
        "Double" => Type::double(),
        "Boolean" => Type::boolean(),
        "String" => Type::string(),
        "Unit" => Type::unit(),
        "Char" => Type::char(),
        other => Type::Named(other.to_string()),
    }
}

/// For each `type T<a1..an> = C1(..) | C2(..)` in the program, enter `Ci`
/// into `env` with scheme `forall a1..an. (tau_i1, .., tau_ik) -> T<a1..an>`.
pub fn register_type_decls(env: &mut TypeEnv, statements: &[Statement], factory: &TypeVarFactory) {
    for stmt in statements {
        if let StatementKind::TypeDecl { name, type_params, variants } = &stmt.kind {
            let mut quantified: Vec<TypeVar> = Vec::new();
            let mut subst = rustc_hash::FxHashMap::default();
            for p in type_params {
                let v = factory.fresh_named(p);
                subst.insert(p.clone(), Type::Var(v.clone()));
                quantified.push(v);
            }
            let result_ty = Type::Generic(
                name.clone(),
                quantified.iter().map(|v| Type::Var(v.clone())).collect(),
            );
            for variant in variants {
                let field_tys: Vec<Type> = variant
                    .fields
                    .iter()
                    .map(|f| resolve_annotation(&f.annotation, &subst))
                    .collect();
                let ctor_ty = if field_tys.is_empty() {
                    result_ty.clone()
                } else {
                    Type::function(field_tys, result_ty.clone())
                };
                env.bind(variant.name.clone(), TypeScheme::poly(quantified.clone(), ctor_ty));
            }
        }
    }
}

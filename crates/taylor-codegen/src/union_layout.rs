//! Class layout for declared union types.
//!
//! Mirrors `taylor_infer::builtins::register_type_decls`'s walk over
//! `TypeDecl` statements, but keeps the per-variant field types (rather
//! than folding them into a constructor function type) because codegen
//! needs each field's declared type to pick `getField_i()`'s accessor
//! shape and the constructor's store width.

use rustc_hash::FxHashMap;

use taylor_ast::{Statement, StatementKind};
use taylor_infer::builtins::resolve_annotation;
use taylor_types::{Type, TypeVarFactory};

#[derive(Clone, Debug)]
pub struct VariantLayout {
    pub name: String,
    pub field_types: Vec<Type>,
}

#[derive(Clone, Debug)]
pub struct UnionLayout {
    pub type_name: String,
    pub variants: Vec<VariantLayout>,
    /// `Option`/`Result`/`List`/`Pair`: the runtime library, not this
    /// compiler, owns the `.class` files for these (see
    /// `taylor_infer::builtins::prelude`'s doc comment) -- their layout is
    /// registered so constructor/pattern lowering can still find field
    /// types and class names, but `class_synth` must not emit them.
    pub is_builtin: bool,
}

impl UnionLayout {
    pub fn variant(&self, name: &str) -> Option<&VariantLayout> {
        self.variants.iter().find(|v| v.name == name)
    }

    /// The JVM nested-class binary name for a variant, `T$C`.
    pub fn variant_class_name(&self, variant_name: &str) -> String {
        format!("{}${}", self.type_name, variant_name)
    }
}

/// All declared union types in a program, keyed by type name. Built once
/// per compilation unit and threaded read-only through every lowerer.
pub struct UnionRegistry {
    layouts: FxHashMap<String, UnionLayout>,
    /// Maps a constructor name back to the type it belongs to, so pattern
    /// lowering can find a variant's layout starting only from the
    /// constructor name written in the pattern.
    constructor_owner: FxHashMap<String, String>,
}

impl UnionRegistry {
    pub fn build(statements: &[Statement], factory: &TypeVarFactory) -> Self {
        let mut layouts = FxHashMap::default();
        let mut constructor_owner = FxHashMap::default();

        register_builtins(&mut layouts, &mut constructor_owner, factory);

        for stmt in statements {
            if let StatementKind::TypeDecl { name, type_params, variants } = &stmt.kind {
                let mut subst = FxHashMap::default();
                for p in type_params {
                    subst.insert(p.clone(), Type::Var(factory.fresh_named(p)));
                }
                let mut variant_layouts = Vec::with_capacity(variants.len());
                for variant in variants {
                    let field_types = variant
                        .fields
                        .iter()
                        .map(|f| resolve_annotation(&f.annotation, &subst))
                        .collect();
                    constructor_owner.insert(variant.name.clone(), name.clone());
                    variant_layouts.push(VariantLayout { name: variant.name.clone(), field_types });
                }
                layouts.insert(
                    name.clone(),
                    UnionLayout { type_name: name.clone(), variants: variant_layouts, is_builtin: false },
                );
            }
        }

        UnionRegistry { layouts, constructor_owner }
    }

    pub fn layout_for_type(&self, type_name: &str) -> Option<&UnionLayout> {
        self.layouts.get(type_name)
    }

    /// Every declared union type's layout, for class synthesis -- the only
    /// consumer that needs to walk the whole registry rather than look up
    /// a single type or constructor by name.
    pub fn layouts(&self) -> impl Iterator<Item = &UnionLayout> {
        self.layouts.values()
    }

    pub fn layout_for_constructor(&self, constructor_name: &str) -> Option<&UnionLayout> {
        self.constructor_owner
            .get(constructor_name)
            .and_then(|owner| self.layouts.get(owner))
    }
}

/// The layouts for `Option`/`Result`/`List`/`Pair`, mirroring the
/// constructor schemes `taylor_infer::builtins::prelude` enters into the
/// type environment -- same variants, same field arity, same generic
/// placeholders, just kept as a layout instead of folded into a function
/// type.
fn register_builtins(
    layouts: &mut FxHashMap<String, UnionLayout>,
    constructor_owner: &mut FxHashMap<String, String>,
    factory: &TypeVarFactory,
) {
    let mut insert = |type_name: &str, variants: Vec<VariantLayout>| {
        for v in &variants {
            constructor_owner.insert(v.name.clone(), type_name.to_string());
        }
        layouts.insert(
            type_name.to_string(),
            UnionLayout { type_name: type_name.to_string(), variants, is_builtin: true },
        );
    };

    let t = factory.fresh_named("T");
    insert(
        "Option",
        vec![
            VariantLayout { name: "Some".to_string(), field_types: vec![Type::Var(t)] },
            VariantLayout { name: "None".to_string(), field_types: vec![] },
        ],
    );

    let ok_t = factory.fresh_named("T");
    let err_e = factory.fresh_named("E");
    insert(
        "Result",
        vec![
            VariantLayout { name: "Ok".to_string(), field_types: vec![Type::Var(ok_t)] },
            VariantLayout { name: "Error".to_string(), field_types: vec![Type::Var(err_e)] },
        ],
    );

    let cons_t = factory.fresh_named("T");
    insert(
        "List",
        vec![
            VariantLayout {
                name: "Cons".to_string(),
                field_types: vec![Type::Var(cons_t.clone()), Type::list(Type::Var(cons_t))],
            },
            VariantLayout { name: "Nil".to_string(), field_types: vec![] },
        ],
    );

    let pair_a = factory.fresh_named("A");
    let pair_b = factory.fresh_named("B");
    insert(
        "Pair",
        vec![VariantLayout { name: "Pair".to_string(), field_types: vec![Type::Var(pair_a), Type::Var(pair_b)] }],
    );
}

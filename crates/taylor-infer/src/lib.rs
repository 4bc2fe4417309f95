//! Constraint collection and solving for TaylorLang: the `Collector` and
//! `Solver` halves of the middle-end.
//!
//! [`infer_program`] is the entry point a driver (out of this crate's
//! scope) calls with a validated `Program`. It wires together, in order:
//! structural validation, prelude/constructor-scheme setup, per-statement
//! collection, per-statement solving (which is what gives top-level `val`
//! bindings their let-polymorphism -- see `collector::Collector::collect_statement`),
//! and the post-pass that applies the final substitution to the typed tree.

pub mod builtins;
pub mod class_hierarchy;
pub mod collector;
pub mod constraint;
pub mod diagnostics;
pub mod env;
pub mod error;
pub mod solver;
pub mod typed_ast;
pub mod validate;

pub use class_hierarchy::ClassHierarchy;
pub use collector::Collector;
pub use constraint::{Constraint, ConstraintOrigin, ConstraintSet};
pub use env::TypeEnv;
pub use error::{TypeError, TypeErrorKind};
pub use solver::Solver;
pub use typed_ast::*;
pub use validate::{validate_program, StructuralError};

use taylor_ast::Program;
use taylor_types::{generalize, TypeVarFactory};

/// The outcome of inferring an entire program: either a structurally
/// invalid program (solver never ran), or a typed program plus whatever
/// `TypeError`s were accumulated along the way.
pub enum InferOutcome {
    Structural(Vec<StructuralError>),
    Typed {
        program: TypedProgram,
        errors: Vec<TypeError>,
    },
}

pub fn infer_program(program: &Program) -> InferOutcome {
    let structural_errors = validate_program(program);
    if !structural_errors.is_empty() {
        return InferOutcome::Structural(structural_errors);
    }

    let factory = TypeVarFactory::new();
    let hierarchy = ClassHierarchy::new();
    let solver = Solver::new(&factory, &hierarchy);
    let collector = Collector::new(&factory, &solver);

    let mut env = builtins::prelude(&factory);
    builtins::register_type_decls(&mut env, &program.statements, &factory);

    let mut typed_statements = Vec::with_capacity(program.statements.len());
    let mut all_errors = Vec::new();

    for stmt in &program.statements {
        let mut constraints = ConstraintSet::new();
        let mut stmt_errors = Vec::new();
        let mut typed = collector.collect_statement(&env, stmt, &mut constraints, &mut stmt_errors);

        let (subst, solve_errors) = solver.solve(constraints);
        stmt_errors.extend(solve_errors);
        typed.apply_subst(&subst);

        let quantified = bind_generalized(&mut env, &typed);
        report_ambiguous(&typed, &quantified, &mut stmt_errors);

        all_errors.extend(stmt_errors);
        typed_statements.push(typed);
    }

    InferOutcome::Typed {
        program: TypedProgram { statements: typed_statements },
        errors: all_errors,
    }
}

/// Binds `stmt`'s generalized scheme into `env` and returns the set of
/// variable ids that scheme just quantified over. Those ids are *not*
/// ambiguous -- they're exactly the ones `report_ambiguous` must not flag,
/// since they're free in the typed tree only because the binding is
/// polymorphic in them, not because the solver left them unresolved.
fn bind_generalized(env: &mut TypeEnv, stmt: &TypedStatement) -> rustc_hash::FxHashSet<u32> {
    let env_free = env.free_vars();
    match stmt {
        TypedStatement::ValDecl { name, ty, .. } => {
            let scheme = generalize(&env_free, ty);
            let quantified = scheme.quantified.iter().map(|v| v.id).collect();
            env.bind(name.clone(), scheme);
            quantified
        }
        TypedStatement::FunctionDecl { name, params, return_ty, .. } => {
            let fn_ty = taylor_types::Type::function(params.iter().map(|p| p.ty.clone()).collect(), return_ty.clone());
            let scheme = generalize(&env_free, &fn_ty);
            let quantified = scheme.quantified.iter().map(|v| v.id).collect();
            env.bind(name.clone(), scheme);
            quantified
        }
        _ => rustc_hash::FxHashSet::default(),
    }
}

/// Any type variable surviving the final substitution is reported once,
/// here, rather than scattered through every consumer of the typed tree.
///
/// `quantified` is the set of variable ids the current binding's scheme
/// just generalized over (see `bind_generalized`). Those are free in the
/// typed tree *because* the binding is polymorphic in them, not because
/// the solver failed to resolve them, so they are excluded from the sweep.
fn report_ambiguous(stmt: &TypedStatement, quantified: &rustc_hash::FxHashSet<u32>, errors: &mut Vec<TypeError>) {
    struct Sweep<'a> {
        quantified: &'a rustc_hash::FxHashSet<u32>,
        errors: &'a mut Vec<TypeError>,
    }
    impl<'a> Sweep<'a> {
        fn sweep_expr(&mut self, e: &TypedExpr) {
            if let taylor_types::Type::Var(v) = &e.ty {
                if !self.quantified.contains(&v.id) {
                    self.errors.push(TypeError::ambiguous_type(v, e.span));
                }
            }
            match &e.kind {
                TypedExprKind::Literal(lit) => self.sweep_literal(lit),
                TypedExprKind::Identifier(_) => {}
                TypedExprKind::Binary { left, right, .. } => {
                    self.sweep_expr(left);
                    self.sweep_expr(right);
                }
                TypedExprKind::Unary { operand, .. } => self.sweep_expr(operand),
                TypedExprKind::Call { callee, args } => {
                    self.sweep_expr(callee);
                    args.iter().for_each(|a| self.sweep_expr(a));
                }
                TypedExprKind::PropertyAccess { target, .. } => self.sweep_expr(target),
                TypedExprKind::IndexAccess { target, index } => {
                    self.sweep_expr(target);
                    self.sweep_expr(index);
                }
                TypedExprKind::ConstructorCall { args, .. } => args.iter().for_each(|a| self.sweep_expr(a)),
                TypedExprKind::Lambda { body, .. } => self.sweep_expr(body),
                TypedExprKind::If { cond, then_branch, else_branch } => {
                    self.sweep_expr(cond);
                    self.sweep_expr(then_branch);
                    self.sweep_expr(else_branch);
                }
                TypedExprKind::Match { target, cases } => {
                    self.sweep_expr(target);
                    for c in cases {
                        self.sweep_expr(&c.body);
                    }
                }
                TypedExprKind::Try { body, catches } => {
                    self.sweep_expr(body);
                    for c in catches {
                        self.sweep_expr(&c.body);
                    }
                }
                TypedExprKind::Block { statements, result } => {
                    for s in statements {
                        self.sweep_stmt(s);
                    }
                    self.sweep_expr(result);
                }
            }
        }

        fn sweep_literal(&mut self, lit: &TypedLiteral) {
            match lit {
                TypedLiteral::List(items) | TypedLiteral::Tuple(items) => items.iter().for_each(|i| self.sweep_expr(i)),
                TypedLiteral::Map(entries) => entries.iter().for_each(|(k, v)| {
                    self.sweep_expr(k);
                    self.sweep_expr(v);
                }),
                _ => {}
            }
        }

        fn sweep_stmt(&mut self, s: &TypedStatement) {
            match s {
                TypedStatement::FunctionDecl { params, return_ty, body, .. } => {
                    for p in params {
                        if let taylor_types::Type::Var(v) = &p.ty {
                            if !self.quantified.contains(&v.id) {
                                self.errors.push(TypeError::ambiguous_type(v, p.span));
                            }
                        }
                    }
                    if let taylor_types::Type::Var(v) = return_ty {
                        if !self.quantified.contains(&v.id) {
                            self.errors.push(TypeError::ambiguous_type(v, body.span));
                        }
                    }
                    self.sweep_expr(body);
                }
                TypedStatement::ValDecl { value, .. } => self.sweep_expr(value),
                TypedStatement::Expr(e) => self.sweep_expr(e),
                TypedStatement::TypeDecl { .. } => {}
            }
        }
    }

    Sweep { quantified, errors }.sweep_stmt(stmt);
}

//! The constraint collector: an AST visitor that walks a typed-hole AST,
//! introduces fresh type variables, and emits equality/subtype/instance
//! constraints. Never unifies anything itself -- that's the solver's job.

use taylor_ast as ast;
use taylor_ast::{BinOp, Span, UnOp};
use taylor_types::{Type, TypeScheme, TypeVarFactory};

use crate::builtins::resolve_annotation;
use crate::constraint::{Constraint, ConstraintOrigin, ConstraintSet};
use crate::env::TypeEnv;
use crate::error::TypeError;
use crate::solver::Solver;
use crate::typed_ast::*;

pub struct Collector<'a> {
    factory: &'a TypeVarFactory,
    /// Used only for a local, throwaway lookahead solve inside `try`
    /// expressions (see `collect_try`) -- never to report errors, and
    /// never to mutate any substitution the caller holds.
    solver: &'a Solver<'a>,
}

/// Which kind of arithmetic result a shallow, pre-solve look at an operand
/// type implies. Only literals and already-annotated bindings resolve to
/// anything other than `Unknown` at collection time; everything else is
/// left to the solver, exactly as the arithmetic dispatch rule requires.
#[derive(Clone, Copy, PartialEq, Eq)]
enum ArithClass {
    Int,
    Floating,
    Str,
    Unknown,
}

fn classify(ty: &Type) -> ArithClass {
    match ty {
        Type::Primitive(taylor_types::PrimitiveName::Int) => ArithClass::Int,
        Type::Primitive(taylor_types::PrimitiveName::Double)
        | Type::Primitive(taylor_types::PrimitiveName::Float) => ArithClass::Floating,
        Type::Primitive(taylor_types::PrimitiveName::String) => ArithClass::Str,
        _ => ArithClass::Unknown,
    }
}

impl<'a> Collector<'a> {
    pub fn new(factory: &'a TypeVarFactory, solver: &'a Solver<'a>) -> Self {
        Collector { factory, solver }
    }

    /// Elaborate a single top-level statement. The caller (`infer_program`)
    /// is responsible for solving the returned constraints and binding a
    /// generalized scheme into `env` before the next statement is
    /// collected -- this is what gives `val f = x => x` its polymorphic
    /// type (see scenario S1) without requiring the whole program's
    /// constraints to be solved in one shot.
    pub fn collect_statement(
        &self,
        env: &TypeEnv,
        stmt: &ast::Statement,
        constraints: &mut ConstraintSet,
        errors: &mut Vec<TypeError>,
    ) -> TypedStatement {
        match &stmt.kind {
            ast::StatementKind::FunctionDecl { name, params, return_type, body, .. } => {
                let mut fn_env = env.child();
                let typed_params: Vec<TypedParam> = params
                    .iter()
                    .map(|p| self.collect_param(p))
                    .collect();
                for p in &typed_params {
                    fn_env.bind_mono(p.name.clone(), p.ty.clone());
                }
                let declared_return = return_type
                    .as_ref()
                    .map(|a| resolve_annotation(a, &Default::default()));
                let return_ty = declared_return.clone().unwrap_or_else(|| Type::Var(self.factory.fresh()));
                // Bind the function itself (monomorphically, for this
                // statement's own recursive calls) before collecting the body.
                fn_env.bind_mono(
                    name.clone(),
                    Type::function(typed_params.iter().map(|p| p.ty.clone()).collect(), return_ty.clone()),
                );
                let typed_body = self.collect_expr(&fn_env, Some(&return_ty), body, constraints, errors);
                constraints.add(Constraint::Equality(
                    typed_body.ty.clone(),
                    return_ty.clone(),
                    ConstraintOrigin::LetBinding { binding_span: stmt.span },
                ));
                TypedStatement::FunctionDecl {
                    name: name.clone(),
                    params: typed_params,
                    return_ty,
                    body: Box::new(typed_body),
                }
            }
            ast::StatementKind::TypeDecl { name, .. } => TypedStatement::TypeDecl { name: name.clone() },
            ast::StatementKind::ValDecl { name, annotation, value } => {
                let typed_value = self.collect_expr(env, None, value, constraints, errors);
                if let Some(a) = annotation {
                    let declared = resolve_annotation(a, &Default::default());
                    constraints.add(Constraint::Equality(
                        typed_value.ty.clone(),
                        declared,
                        ConstraintOrigin::Annotation { annotation_span: stmt.span },
                    ));
                }
                TypedStatement::ValDecl {
                    name: name.clone(),
                    ty: typed_value.ty.clone(),
                    value: Box::new(typed_value),
                }
            }
            ast::StatementKind::Expr(e) => {
                let typed = self.collect_expr(env, None, e, constraints, errors);
                TypedStatement::Expr(Box::new(typed))
            }
        }
    }

    fn collect_param(&self, param: &ast::Param) -> TypedParam {
        let ty = match &param.annotation {
            Some(a) => resolve_annotation(a, &Default::default()),
            None => Type::Var(self.factory.fresh_named(param.name.clone())),
        };
        TypedParam { name: param.name.clone(), ty, span: param.span }
    }

    pub fn collect_expr(
        &self,
        env: &TypeEnv,
        fn_return_ty: Option<&Type>,
        expr: &ast::Expression,
        constraints: &mut ConstraintSet,
        errors: &mut Vec<TypeError>,
    ) -> TypedExpr {
        let span = expr.span;
        match &expr.kind {
            ast::ExprKind::Literal(lit) => self.collect_literal(env, fn_return_ty, lit, span, constraints, errors),
            ast::ExprKind::Identifier(name) => {
                let ty = match env.lookup(name) {
                    Some(scheme) => instantiate_scheme(scheme, self.factory),
                    None => {
                        errors.push(TypeError::unbound_identifier(name, span));
                        Type::Var(self.factory.fresh())
                    }
                };
                TypedExpr { kind: TypedExprKind::Identifier(name.clone()), ty, span }
            }
            ast::ExprKind::Binary { op, left, right } => {
                self.collect_binary(env, fn_return_ty, *op, left, right, span, constraints, errors)
            }
            ast::ExprKind::Unary { op, operand } => {
                let typed_operand = self.collect_expr(env, fn_return_ty, operand, constraints, errors);
                let ty = match op {
                    UnOp::Neg => typed_operand.ty.clone(),
                    UnOp::Not => {
                        constraints.add(Constraint::Equality(
                            typed_operand.ty.clone(),
                            Type::boolean(),
                            ConstraintOrigin::Builtin,
                        ));
                        Type::boolean()
                    }
                };
                TypedExpr {
                    kind: TypedExprKind::Unary { op: *op, operand: Box::new(typed_operand) },
                    ty,
                    span,
                }
            }
            ast::ExprKind::Call { callee, args } => {
                let typed_callee = self.collect_expr(env, fn_return_ty, callee, constraints, errors);
                let typed_args: Vec<TypedExpr> = args
                    .iter()
                    .map(|a| self.collect_expr(env, fn_return_ty, a, constraints, errors))
                    .collect();
                let result = Type::Var(self.factory.fresh());
                let expected_fn = Type::function(typed_args.iter().map(|a| a.ty.clone()).collect(), result.clone());
                constraints.add(Constraint::Equality(
                    typed_callee.ty.clone(),
                    expected_fn,
                    ConstraintOrigin::FnArg { call_span: span, param_idx: 0 },
                ));
                TypedExpr {
                    kind: TypedExprKind::Call { callee: Box::new(typed_callee), args: typed_args },
                    ty: result,
                    span,
                }
            }
            ast::ExprKind::PropertyAccess { target, property } => {
                // Field shapes belong to the runtime library, which the
                // core only consumes declared shapes of, not the full
                // structural layout; a bare property access therefore
                // resolves to a fresh, unconstrained variable here and is
                // pinned by whatever constraint its use site contributes.
                let typed_target = self.collect_expr(env, fn_return_ty, target, constraints, errors);
                let ty = Type::Var(self.factory.fresh());
                TypedExpr {
                    kind: TypedExprKind::PropertyAccess { target: Box::new(typed_target), property: property.clone() },
                    ty,
                    span,
                }
            }
            ast::ExprKind::IndexAccess { target, index } => {
                let typed_target = self.collect_expr(env, fn_return_ty, target, constraints, errors);
                let typed_index = self.collect_expr(env, fn_return_ty, index, constraints, errors);
                let elem = Type::Var(self.factory.fresh());
                constraints.add(Constraint::Equality(
                    typed_target.ty.clone(),
                    Type::list(elem.clone()),
                    ConstraintOrigin::Builtin,
                ));
                TypedExpr {
                    kind: TypedExprKind::IndexAccess { target: Box::new(typed_target), index: Box::new(typed_index) },
                    ty: elem,
                    span,
                }
            }
            ast::ExprKind::ConstructorCall { name, args } => {
                self.collect_constructor_call(env, fn_return_ty, name, args, span, constraints, errors)
            }
            ast::ExprKind::Lambda { params, body } => {
                let mut lambda_env = env.child();
                let typed_params: Vec<TypedParam> = params.iter().map(|p| self.collect_param(p)).collect();
                for p in &typed_params {
                    lambda_env.bind_mono(p.name.clone(), p.ty.clone());
                }
                let typed_body = self.collect_expr(&lambda_env, fn_return_ty, body, constraints, errors);
                let ty = Type::function(typed_params.iter().map(|p| p.ty.clone()).collect(), typed_body.ty.clone());
                TypedExpr {
                    kind: TypedExprKind::Lambda { params: typed_params, body: Box::new(typed_body) },
                    ty,
                    span,
                }
            }
            ast::ExprKind::If { cond, then_branch, else_branch } => {
                let typed_cond = self.collect_expr(env, fn_return_ty, cond, constraints, errors);
                let typed_then = self.collect_expr(env, fn_return_ty, then_branch, constraints, errors);
                let typed_else = self.collect_expr(env, fn_return_ty, else_branch, constraints, errors);
                constraints.add(Constraint::Equality(
                    typed_cond.ty.clone(),
                    Type::boolean(),
                    ConstraintOrigin::BinOp { op_span: cond.span },
                ));
                constraints.add(Constraint::Equality(
                    typed_then.ty.clone(),
                    typed_else.ty.clone(),
                    ConstraintOrigin::IfBranches {
                        if_span: span,
                        then_span: then_branch.span,
                        else_span: else_branch.span,
                    },
                ));
                let ty = typed_then.ty.clone();
                TypedExpr {
                    kind: TypedExprKind::If {
                        cond: Box::new(typed_cond),
                        then_branch: Box::new(typed_then),
                        else_branch: Box::new(typed_else),
                    },
                    ty,
                    span,
                }
            }
            ast::ExprKind::Match { target, cases } => {
                let typed_target = self.collect_expr(env, fn_return_ty, target, constraints, errors);
                let result = Type::Var(self.factory.fresh());
                let mut typed_cases = Vec::with_capacity(cases.len());
                for case in cases {
                    let mut case_env = env.child();
                    let typed_pattern = self.collect_pattern(
                        &mut case_env,
                        &case.pattern,
                        &typed_target.ty,
                        constraints,
                        errors,
                    );
                    let typed_body = self.collect_expr(&case_env, fn_return_ty, &case.body, constraints, errors);
                    constraints.add(Constraint::Equality(
                        typed_body.ty.clone(),
                        result.clone(),
                        ConstraintOrigin::MatchCase { case_span: case.span },
                    ));
                    typed_cases.push(TypedMatchCase {
                        pattern: typed_pattern,
                        body: Box::new(typed_body),
                        span: case.span,
                    });
                }
                TypedExpr {
                    kind: TypedExprKind::Match { target: Box::new(typed_target), cases: typed_cases },
                    ty: result,
                    span,
                }
            }
            ast::ExprKind::Try { body, catches } => {
                self.collect_try(env, fn_return_ty, body, catches, span, constraints, errors)
            }
            ast::ExprKind::Block { statements, result } => {
                let mut block_env = env.child();
                let mut typed_statements = Vec::with_capacity(statements.len());
                for s in statements {
                    let typed = self.collect_statement_in_block(&mut block_env, s, constraints, errors);
                    typed_statements.push(typed);
                }
                let typed_result = self.collect_expr(&block_env, fn_return_ty, result, constraints, errors);
                let ty = typed_result.ty.clone();
                TypedExpr {
                    kind: TypedExprKind::Block { statements: typed_statements, result: Box::new(typed_result) },
                    ty,
                    span,
                }
            }
        }
    }

    fn collect_literal(
        &self,
        env: &TypeEnv,
        fn_return_ty: Option<&Type>,
        lit: &ast::Literal,
        span: Span,
        constraints: &mut ConstraintSet,
        errors: &mut Vec<TypeError>,
    ) -> TypedExpr {
        match lit {
            ast::Literal::Int(n) => TypedExpr { kind: TypedExprKind::Literal(TypedLiteral::Int(*n)), ty: Type::int(), span },
            ast::Literal::Float(n) => TypedExpr { kind: TypedExprKind::Literal(TypedLiteral::Float(*n)), ty: Type::double(), span },
            ast::Literal::Str(s) => TypedExpr { kind: TypedExprKind::Literal(TypedLiteral::Str(s.clone())), ty: Type::string(), span },
            ast::Literal::Boolean(b) => TypedExpr { kind: TypedExprKind::Literal(TypedLiteral::Boolean(*b)), ty: Type::boolean(), span },
            ast::Literal::Null => {
                let inner = Type::Var(self.factory.fresh());
                TypedExpr { kind: TypedExprKind::Literal(TypedLiteral::Null), ty: Type::Nullable(Box::new(inner)), span }
            }
            ast::Literal::List(items) => {
                let elem = Type::Var(self.factory.fresh());
                let mut typed_items = Vec::with_capacity(items.len());
                for item in items {
                    let typed_item = self.collect_expr(env, fn_return_ty, item, constraints, errors);
                    constraints.add(Constraint::Equality(typed_item.ty.clone(), elem.clone(), ConstraintOrigin::Builtin));
                    typed_items.push(typed_item);
                }
                TypedExpr {
                    kind: TypedExprKind::Literal(TypedLiteral::List(typed_items)),
                    ty: Type::list(elem),
                    span,
                }
            }
            ast::Literal::Map(entries) => {
                let key = Type::Var(self.factory.fresh());
                let value = Type::Var(self.factory.fresh());
                let mut typed_entries = Vec::with_capacity(entries.len());
                for (k, v) in entries {
                    let typed_k = self.collect_expr(env, fn_return_ty, k, constraints, errors);
                    let typed_v = self.collect_expr(env, fn_return_ty, v, constraints, errors);
                    constraints.add(Constraint::Equality(typed_k.ty.clone(), key.clone(), ConstraintOrigin::Builtin));
                    constraints.add(Constraint::Equality(typed_v.ty.clone(), value.clone(), ConstraintOrigin::Builtin));
                    typed_entries.push((typed_k, typed_v));
                }
                TypedExpr {
                    kind: TypedExprKind::Literal(TypedLiteral::Map(typed_entries)),
                    ty: Type::map(key, value),
                    span,
                }
            }
            ast::Literal::Tuple(items) => {
                let mut typed_items = Vec::with_capacity(items.len());
                for item in items {
                    typed_items.push(self.collect_expr(env, fn_return_ty, item, constraints, errors));
                }
                let ty = Type::Tuple(typed_items.iter().map(|i| i.ty.clone()).collect());
                TypedExpr { kind: TypedExprKind::Literal(TypedLiteral::Tuple(typed_items)), ty, span }
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn collect_binary(
        &self,
        env: &TypeEnv,
        fn_return_ty: Option<&Type>,
        op: BinOp,
        left: &ast::Expression,
        right: &ast::Expression,
        span: Span,
        constraints: &mut ConstraintSet,
        errors: &mut Vec<TypeError>,
    ) -> TypedExpr {
        let typed_left = self.collect_expr(env, fn_return_ty, left, constraints, errors);
        let typed_right = self.collect_expr(env, fn_return_ty, right, constraints, errors);
        let origin = ConstraintOrigin::BinOp { op_span: span };

        let ty = if op.is_arithmetic() {
            self.arithmetic_result(op, &typed_left.ty, &typed_right.ty, origin, constraints)
        } else if op.is_comparison() {
            constraints.add(Constraint::Equality(typed_left.ty.clone(), typed_right.ty.clone(), origin));
            Type::boolean()
        } else if op.is_logical() {
            constraints.add(Constraint::Equality(typed_left.ty.clone(), Type::boolean(), origin.clone()));
            constraints.add(Constraint::Equality(typed_right.ty.clone(), Type::boolean(), origin));
            Type::boolean()
        } else {
            // Elvis: `a ?: b` -- `a` must be nullable, `b` fills the hole.
            let inner = Type::Var(self.factory.fresh());
            constraints.add(Constraint::Equality(
                typed_left.ty.clone(),
                Type::Nullable(Box::new(inner.clone())),
                origin.clone(),
            ));
            constraints.add(Constraint::Equality(typed_right.ty.clone(), inner.clone(), origin));
            inner
        };

        TypedExpr {
            kind: TypedExprKind::Binary { op, left: Box::new(typed_left), right: Box::new(typed_right) },
            ty,
            span,
        }
    }

    /// The three-way arithmetic dispatch from the invariant table: `Int op
    /// Int -> Int`; any `Float`/`Double` operand promotes to `Double`;
    /// `String + anything` concatenates to `String`. Anything left
    /// unresolved at this point (a bare type variable on both sides) is
    /// handed to the solver as an equality constraint rather than
    /// defaulted -- defaulting arithmetic to `Double` for unannotated
    /// identifiers is exactly the bug this dispatch exists to avoid.
    fn arithmetic_result(
        &self,
        op: BinOp,
        left: &Type,
        right: &Type,
        origin: ConstraintOrigin,
        constraints: &mut ConstraintSet,
    ) -> Type {
        match (classify(left), classify(right)) {
            (ArithClass::Int, ArithClass::Int) => Type::int(),
            (ArithClass::Floating, _) | (_, ArithClass::Floating) => Type::double(),
            (ArithClass::Str, _) if op == BinOp::Add => Type::string(),
            _ => {
                constraints.add(Constraint::Equality(left.clone(), right.clone(), origin));
                left.clone()
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn collect_constructor_call(
        &self,
        env: &TypeEnv,
        fn_return_ty: Option<&Type>,
        name: &str,
        args: &[ast::Expression],
        span: Span,
        constraints: &mut ConstraintSet,
        errors: &mut Vec<TypeError>,
    ) -> TypedExpr {
        let typed_args: Vec<TypedExpr> = args
            .iter()
            .map(|a| self.collect_expr(env, fn_return_ty, a, constraints, errors))
            .collect();

        let scheme = match env.lookup(name) {
            Some(s) => s.clone(),
            None => {
                errors.push(TypeError::unbound_identifier(name, span));
                let ty = Type::Var(self.factory.fresh());
                return TypedExpr { kind: TypedExprKind::ConstructorCall { name: name.to_string(), args: typed_args }, ty, span };
            }
        };
        let instantiated = instantiate_scheme(&scheme, self.factory);

        let ty = match &instantiated {
            Type::Function(params, ret) => {
                if params.len() != typed_args.len() {
                    errors.push(TypeError::from_unify_error(
                        taylor_types::UnifyError::ArityMismatch {
                            name: name.to_string(),
                            expected: params.len(),
                            found: typed_args.len(),
                        },
                        &ConstraintOrigin::Builtin,
                        span,
                    ));
                }
                for (i, (p, a)) in params.iter().zip(typed_args.iter()).enumerate() {
                    constraints.add(Constraint::Equality(
                        a.ty.clone(),
                        p.clone(),
                        ConstraintOrigin::ConstructorArg { call_span: span, field_idx: i },
                    ));
                }
                (**ret).clone()
            }
            other => {
                if !typed_args.is_empty() {
                    errors.push(TypeError::from_unify_error(
                        taylor_types::UnifyError::ArityMismatch { name: name.to_string(), expected: 0, found: typed_args.len() },
                        &ConstraintOrigin::Builtin,
                        span,
                    ));
                }
                other.clone()
            }
        };

        TypedExpr {
            kind: TypedExprKind::ConstructorCall { name: name.to_string(), args: typed_args },
            ty,
            span,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn collect_try(
        &self,
        env: &TypeEnv,
        fn_return_ty: Option<&Type>,
        body: &ast::Expression,
        catches: &[ast::CatchClause],
        span: Span,
        constraints: &mut ConstraintSet,
        errors: &mut Vec<TypeError>,
    ) -> TypedExpr {
        // `expr`'s own elaboration introduces fresh vars for anything that
        // comes from a call's result (the `Call` rule always synthesizes a
        // fresh `beta`, regardless of the callee's actual declared return
        // type). The pass-through/wrap dispatch needs `expr`'s *shape* --
        // `Result<u, v>` or not -- which isn't visible on a bare `beta`
        // before solving. Collect the body into its own constraint set and
        // solve that set immediately, purely to see through to its ground
        // shape; the unsolved constraints are still folded into the
        // caller's set below so the real solver remains the sole source of
        // reported errors.
        let mut local_constraints = ConstraintSet::new();
        let typed_body = self.collect_expr(env, fn_return_ty, body, &mut local_constraints, errors);
        let (local_subst, _) = self.solver.solve(local_constraints.clone());
        let resolved_body_ty = local_subst.apply(&typed_body.ty);
        constraints.extend(local_constraints.into_vec());

        let origin = ConstraintOrigin::TryUnwrap { try_span: span };

        // Structurally distinguish pass-through (the enclosing function
        // itself returns `Result<T, E>`) from wrap semantics -- never
        // inferred heuristically from nearby syntax.
        let result_ty = match fn_return_ty.and_then(|t| t.as_result_args()) {
            Some((t, e)) => {
                if let Some((u, v)) = resolved_body_ty.as_result_args() {
                    constraints.add(Constraint::Equality(u.clone(), t.clone(), origin.clone()));
                    constraints.add(Constraint::Subtype(v.clone(), e.clone(), origin));
                } else {
                    constraints.add(Constraint::Equality(typed_body.ty.clone(), t.clone(), origin));
                }
                t.clone()
            }
            None => typed_body.ty.clone(),
        };

        let mut typed_catches = Vec::with_capacity(catches.len());
        for clause in catches {
            let exception_ty = resolve_annotation(&clause.exception_type, &Default::default());
            let mut clause_env = env.child();
            clause_env.bind_mono(clause.binding.clone(), exception_ty.clone());
            let typed_clause_body = self.collect_expr(&clause_env, fn_return_ty, &clause.body, constraints, errors);
            constraints.add(Constraint::Equality(
                typed_clause_body.ty.clone(),
                result_ty.clone(),
                ConstraintOrigin::MatchCase { case_span: clause.span },
            ));
            typed_catches.push(TypedCatchClause {
                exception_ty,
                binding: clause.binding.clone(),
                body: Box::new(typed_clause_body),
                span: clause.span,
            });
        }

        TypedExpr {
            kind: TypedExprKind::Try { body: Box::new(typed_body), catches: typed_catches },
            ty: result_ty,
            span,
        }
    }

    fn collect_statement_in_block(
        &self,
        env: &mut TypeEnv,
        stmt: &ast::Statement,
        constraints: &mut ConstraintSet,
        errors: &mut Vec<TypeError>,
    ) -> TypedStatement {
        // Local `val`/function declarations bind monomorphically into the
        // block's scope; full let-generalization is reserved for top-level
        // statements (see `collect_statement`), where the solver runs once
        // per statement before the scheme is bound.
        let typed = self.collect_statement(env, stmt, constraints, errors);
        match &typed {
            TypedStatement::ValDecl { name, ty, .. } => env.bind_mono(name.clone(), ty.clone()),
            TypedStatement::FunctionDecl { name, params, return_ty, .. } => {
                env.bind_mono(name.clone(), Type::function(params.iter().map(|p| p.ty.clone()).collect(), return_ty.clone()));
            }
            _ => {}
        }
        typed
    }

    fn collect_pattern(
        &self,
        env: &mut TypeEnv,
        pattern: &ast::Pattern,
        target_ty: &Type,
        constraints: &mut ConstraintSet,
        errors: &mut Vec<TypeError>,
    ) -> TypedPattern {
        let span = pattern.span;
        match &pattern.kind {
            ast::PatternKind::Wildcard => TypedPattern { kind: TypedPatternKind::Wildcard, ty: target_ty.clone(), span },
            ast::PatternKind::Identifier(name) => {
                env.bind_mono(name.clone(), target_ty.clone());
                TypedPattern { kind: TypedPatternKind::Identifier(name.clone()), ty: target_ty.clone(), span }
            }
            ast::PatternKind::Literal(lit) => {
                let ty = literal_type(lit, self.factory);
                constraints.add(Constraint::Equality(target_ty.clone(), ty.clone(), ConstraintOrigin::Builtin));
                TypedPattern { kind: TypedPatternKind::Literal(lit.clone()), ty, span }
            }
            ast::PatternKind::Constructor { name, subpatterns } => {
                let scheme = match env.lookup(name) {
                    Some(s) => s.clone(),
                    None => {
                        errors.push(TypeError::unbound_identifier(name, span));
                        TypeScheme::mono(Type::Var(self.factory.fresh()))
                    }
                };
                let instantiated = instantiate_scheme(&scheme, self.factory);
                let (field_tys, ctor_result): (Vec<Type>, Type) = match instantiated {
                    Type::Function(params, ret) => (params, *ret),
                    other => (Vec::new(), other),
                };
                constraints.add(Constraint::Equality(target_ty.clone(), ctor_result, ConstraintOrigin::Builtin));
                if field_tys.len() != subpatterns.len() {
                    errors.push(TypeError::from_unify_error(
                        taylor_types::UnifyError::ArityMismatch { name: name.clone(), expected: field_tys.len(), found: subpatterns.len() },
                        &ConstraintOrigin::Builtin,
                        span,
                    ));
                }
                let typed_subpatterns = subpatterns
                    .iter()
                    .zip(field_tys.iter().chain(std::iter::repeat(&Type::Var(self.factory.fresh()))))
                    .map(|(sp, field_ty)| self.collect_pattern(env, sp, field_ty, constraints, errors))
                    .collect();
                TypedPattern {
                    kind: TypedPatternKind::Constructor { name: name.clone(), subpatterns: typed_subpatterns },
                    ty: target_ty.clone(),
                    span,
                }
            }
            ast::PatternKind::Guard { inner, cond } => {
                let typed_inner = self.collect_pattern(env, inner, target_ty, constraints, errors);
                let typed_cond = self.collect_expr(env, None, cond, constraints, errors);
                constraints.add(Constraint::Equality(typed_cond.ty.clone(), Type::boolean(), ConstraintOrigin::Builtin));
                TypedPattern {
                    kind: TypedPatternKind::Guard { inner: Box::new(typed_inner), cond: Box::new(typed_cond) },
                    ty: target_ty.clone(),
                    span,
                }
            }
        }
    }
}

fn literal_type(lit: &ast::Literal, factory: &TypeVarFactory) -> Type {
    match lit {
        ast::Literal::Int(_) => Type::int(),
        ast::Literal::Float(_) => Type::double(),
        ast::Literal::Str(_) => Type::string(),
        ast::Literal::Boolean(_) => Type::boolean(),
        ast::Literal::Null => Type::Nullable(Box::new(Type::Var(factory.fresh()))),
        ast::Literal::List(_) => Type::list(Type::Var(factory.fresh())),
        ast::Literal::Map(_) => Type::map(Type::Var(factory.fresh()), Type::Var(factory.fresh())),
        ast::Literal::Tuple(_) => Type::Tuple(Vec::new()),
    }
}

fn instantiate_scheme(scheme: &TypeScheme, factory: &TypeVarFactory) -> Type {
    taylor_types::instantiate(scheme, factory)
}

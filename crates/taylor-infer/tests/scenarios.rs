//! End-to-end inference scenarios, hand-building the AST nodes a parser
//! would otherwise produce (no `ASTBuilder` exists in this workspace).

use taylor_ast::*;
use taylor_infer::{infer_program, InferOutcome, TypedExprKind, TypedStatement};
use taylor_types::Type;

fn span() -> Span {
    Span::new(0, 0)
}

fn program(statements: Vec<Statement>) -> Program {
    Program { statements }
}

/// S1: `val f = x => x` elaborates to a polymorphic identity function.
#[test]
fn identity_lambda_is_polymorphic() {
    let body = Expression::ident("x", span());
    let lambda = Expression::lambda(vec![Param { name: "x".into(), annotation: None, span: span() }], body, span());
    let prog = program(vec![Statement::val_decl("f", None, lambda, span())]);

    let outcome = infer_program(&prog);
    let (typed_program, errors) = match outcome {
        InferOutcome::Typed { program, errors } => (program, errors),
        InferOutcome::Structural(e) => panic!("unexpected structural errors: {e:?}"),
    };
    assert!(errors.is_empty(), "unexpected errors: {errors:?}");

    match &typed_program.statements[0] {
        TypedStatement::ValDecl { ty, .. } => match ty {
            Type::Function(params, ret) => {
                assert_eq!(params.len(), 1);
                assert_eq!(&params[0], ret.as_ref());
            }
            other => panic!("expected a function type, got {other}"),
        },
        other => panic!("expected ValDecl, got {other:?}"),
    }
}

/// S2: arithmetic on two `Int`-typed pattern bindings stays `Int`, never
/// defaults to `Double`.
#[test]
fn arithmetic_on_bound_ints_stays_int() {
    let pair_pattern = Pattern::constructor(
        "Pair",
        vec![Pattern::identifier("x", span()), Pattern::identifier("y", span())],
        span(),
    );
    let body = Expression::binary(BinOp::Add, Expression::ident("x", span()), Expression::ident("y", span()), span());
    let match_case = MatchCase { pattern: pair_pattern, body: Box::new(body), span: span() };

    let p_param = Param {
        name: "p".into(),
        annotation: Some(TypeAnnotation::Generic("Pair".into(), vec![TypeAnnotation::Name("Int".into()), TypeAnnotation::Name("Int".into())])),
        span: span(),
    };
    let match_expr = Expression::match_expr(Expression::ident("p", span()), vec![match_case], span());
    let fn_decl = Statement::function_decl("sum_pair", vec![], vec![p_param], None, match_expr, span());
    let prog = program(vec![fn_decl]);

    let outcome = infer_program(&prog);
    let (typed_program, errors) = match outcome {
        InferOutcome::Typed { program, errors } => (program, errors),
        InferOutcome::Structural(e) => panic!("unexpected structural errors: {e:?}"),
    };
    assert!(errors.is_empty(), "unexpected errors: {errors:?}");

    match &typed_program.statements[0] {
        TypedStatement::FunctionDecl { return_ty, .. } => assert_eq!(*return_ty, Type::int()),
        other => panic!("expected FunctionDecl, got {other:?}"),
    }
}

/// S3: `Some(42)` infers `Option<Int>` without an annotation.
#[test]
fn generic_constructor_call_infers_option_int() {
    let some_42 = Expression::constructor_call("Some", vec![Expression::int(42, span())], span());
    let prog = program(vec![Statement::val_decl("o", None, some_42, span())]);

    let outcome = infer_program(&prog);
    let (typed_program, errors) = match outcome {
        InferOutcome::Typed { program, errors } => (program, errors),
        InferOutcome::Structural(e) => panic!("unexpected structural errors: {e:?}"),
    };
    assert!(errors.is_empty(), "unexpected errors: {errors:?}");

    match &typed_program.statements[0] {
        TypedStatement::ValDecl { ty, .. } => assert_eq!(*ty, Type::option(Type::int())),
        other => panic!("expected ValDecl, got {other:?}"),
    }
}

/// S4: `try readFile("a")` inside a function returning `Result<String,
/// IOException>` binds the unwrapped value as plain `String`, with no
/// spurious `Result<..> = String` constraint surfacing.
#[test]
fn try_expression_unwraps_matching_result_type() {
    let read_file_param = Param { name: "path".into(), annotation: Some(TypeAnnotation::Name("String".into())), span: span() };
    let read_file_body = Expression::constructor_call(
        "Ok",
        vec![Expression::literal(Literal::Str("unused".into()), span())],
        span(),
    );
    let read_file_decl = Statement::function_decl(
        "readFile",
        vec![],
        vec![read_file_param],
        Some(TypeAnnotation::Generic(
            "Result".into(),
            vec![TypeAnnotation::Name("String".into()), TypeAnnotation::Name("IOException".into())],
        )),
        read_file_body,
        span(),
    );

    let call = Expression::call(Expression::ident("readFile", span()), vec![Expression::literal(Literal::Str("a".into()), span())], span());
    let try_expr = Expression::try_expr(call, vec![], span());
    let wrapped = Expression::constructor_call("Ok", vec![try_expr], span());
    let read_decl = Statement::function_decl(
        "read",
        vec![],
        vec![],
        Some(TypeAnnotation::Generic(
            "Result".into(),
            vec![TypeAnnotation::Name("String".into()), TypeAnnotation::Name("IOException".into())],
        )),
        wrapped,
        span(),
    );

    let prog = program(vec![read_file_decl, read_decl]);
    let outcome = infer_program(&prog);
    let (_typed_program, errors) = match outcome {
        InferOutcome::Typed { program, errors } => (program, errors),
        InferOutcome::Structural(e) => panic!("unexpected structural errors: {e:?}"),
    };
    assert!(errors.is_empty(), "unexpected errors: {errors:?}");
}

/// Identifiers that reference no binding are reported, not silently
/// tolerated, and the solver never runs for a structurally invalid unit.
#[test]
fn unbound_identifier_is_a_structural_error() {
    let prog = program(vec![Statement::expr(Expression::ident("undefined_name", span()), span())]);
    let outcome = infer_program(&prog);
    match outcome {
        InferOutcome::Structural(errs) => assert!(!errs.is_empty()),
        InferOutcome::Typed { .. } => panic!("expected a structural error"),
    }
}

/// `if` branches of mismatched type produce a `Mismatch` error rather than
/// panicking or silently picking one branch's type.
#[test]
fn if_branch_mismatch_is_reported() {
    let if_expr = Expression::if_expr(
        Expression::literal(Literal::Boolean(true), span()),
        Expression::int(1, span()),
        Expression::literal(Literal::Str("no".into()), span()),
        span(),
    );
    let prog = program(vec![Statement::val_decl("x", None, if_expr, span())]);
    let outcome = infer_program(&prog);
    let errors = match outcome {
        InferOutcome::Typed { errors, .. } => errors,
        InferOutcome::Structural(e) => panic!("unexpected structural errors: {e:?}"),
    };
    assert!(!errors.is_empty());
    assert_eq!(errors[0].kind, taylor_infer::TypeErrorKind::Mismatch);
}

/// Confirms the collected `TypedExprKind::ConstructorCall` node for `Some(42)`
/// carries the instantiated `42: Int` argument, not a bare `Var`.
#[test]
fn constructor_call_argument_is_resolved() {
    let some_42 = Expression::constructor_call("Some", vec![Expression::int(42, span())], span());
    let prog = program(vec![Statement::val_decl("o", None, some_42, span())]);
    let outcome = infer_program(&prog);
    let typed_program = match outcome {
        InferOutcome::Typed { program, .. } => program,
        InferOutcome::Structural(e) => panic!("unexpected structural errors: {e:?}"),
    };
    match &typed_program.statements[0] {
        TypedStatement::ValDecl { value, .. } => match &value.kind {
            TypedExprKind::ConstructorCall { args, .. } => assert_eq!(args[0].ty, Type::int()),
            other => panic!("expected ConstructorCall, got {other:?}"),
        },
        other => panic!("expected ValDecl, got {other:?}"),
    }
}

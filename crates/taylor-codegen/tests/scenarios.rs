//! End-to-end lowering scenarios, hand-building the typed AST a parser +
//! `taylor_infer::infer_program` would otherwise produce.
//!
//! Assertions run against `MethodEmitter::instructions()` directly rather
//! than `compile_program`'s serialized class bytes: exact instruction-shape
//! claims (S2's "uses `iadd`, not `dadd`", S5's "`dload n; pop2; goto
//! success`") need to inspect the instruction stream, not a disassembler
//! this crate doesn't own.

use taylor_ast::*;
use taylor_infer::{infer_program, InferOutcome, TypedExpr, TypedStatement};
use taylor_types::TypeVarFactory;

use taylor_codegen::emitter::MethodEmitter;
use taylor_codegen::error::CodegenError;
use taylor_codegen::expr::{lower_expr, LowerCtx};
use taylor_codegen::instr::Instruction;
use taylor_codegen::slot::SlotMap;
use taylor_codegen::union_layout::UnionRegistry;

fn span() -> Span {
    Span::new(0, 0)
}

fn program(statements: Vec<Statement>) -> Program {
    Program { statements }
}

/// Infers `prog`, panicking on any structural or type error, and returns
/// the typed tree.
fn infer_ok(prog: &Program) -> taylor_infer::TypedProgram {
    match infer_program(prog) {
        InferOutcome::Structural(e) => panic!("unexpected structural errors: {e:?}"),
        InferOutcome::Typed { program, errors } => {
            assert!(errors.is_empty(), "unexpected type errors: {errors:?}");
            program
        }
    }
}

fn find_function<'a>(typed: &'a taylor_infer::TypedProgram, name: &str) -> (&'a [taylor_infer::TypedParam], &'a TypedExpr) {
    for stmt in &typed.statements {
        if let TypedStatement::FunctionDecl { name: n, params, body, .. } = stmt {
            if n == name {
                return (params, body);
            }
        }
    }
    panic!("no function named `{name}` in typed program");
}

/// Lowers `body` as a function's sole expression, binding `params` into a
/// fresh `SlotMap` first, and returns the finished instruction stream.
fn lower_function_body(
    ast_statements: &[Statement],
    params: &[taylor_infer::TypedParam],
    body: &TypedExpr,
) -> Vec<Instruction> {
    let factory = TypeVarFactory::new();
    let registry = UnionRegistry::build(ast_statements, &factory);
    let ctx = LowerCtx { registry: &registry, entry_class: "Test" };

    let mut emitter = MethodEmitter::new();
    let mut slots = SlotMap::new();
    for p in params {
        slots.bind(p.name.clone(), p.ty.clone());
    }

    lower_expr(&mut emitter, &mut slots, &ctx, body).expect("lowering should succeed");
    emitter.into_instructions()
}

/// S2: `match p { case Pair(x, y) => x + y }` on a `Pair<Int, Int>` emits
/// `iadd`, loading its operands via `iload`, never `dadd`/`dload`.
#[test]
fn pair_destructure_arithmetic_uses_iadd() {
    let pair_pattern = Pattern::constructor(
        "Pair",
        vec![Pattern::identifier("x", span()), Pattern::identifier("y", span())],
        span(),
    );
    let body = Expression::binary(BinOp::Add, Expression::ident("x", span()), Expression::ident("y", span()), span());
    let match_case = MatchCase { pattern: pair_pattern, body: Box::new(body), span: span() };

    let p_param = Param {
        name: "p".into(),
        annotation: Some(TypeAnnotation::Generic(
            "Pair".into(),
            vec![TypeAnnotation::Name("Int".into()), TypeAnnotation::Name("Int".into())],
        )),
        span: span(),
    };
    let match_expr = Expression::match_expr(Expression::ident("p", span()), vec![match_case], span());
    let fn_decl = Statement::function_decl("sum_pair", vec![], vec![p_param], None, match_expr, span());
    let ast = program(vec![fn_decl]);

    let typed = infer_ok(&ast);
    let (params, body) = find_function(&typed, "sum_pair");
    let instructions = lower_function_body(&ast.statements, params, body);

    assert!(instructions.contains(&Instruction::Iadd), "expected iadd in {instructions:?}");
    assert!(!instructions.contains(&Instruction::Dadd), "did not expect dadd in {instructions:?}");
    assert!(
        instructions.iter().any(|i| matches!(i, Instruction::Iload(_))),
        "expected an iload loading a bound Int field"
    );
    assert!(!instructions.iter().any(|i| matches!(i, Instruction::Dload(_))), "did not expect any dload");
}

/// S4: a function returning `Result<String, IOException>` whose `try`
/// expression has no explicit `catch` rewraps the thrown exception as
/// `new Result$Error(e)` in a synthesized handler, per the bytecode shape
/// `try { ... } catch (IOException e) { return new Result$Error(e); }`.
#[test]
fn try_without_catch_rewraps_into_result_error() {
    let read_file_param = Param { name: "path".into(), annotation: Some(TypeAnnotation::Name("String".into())), span: span() };
    let read_file_body = Expression::constructor_call("Ok", vec![Expression::literal(Literal::Str("unused".into()), span())], span());
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
    let read_decl = Statement::function_decl(
        "read",
        vec![],
        vec![],
        Some(TypeAnnotation::Generic(
            "Result".into(),
            vec![TypeAnnotation::Name("String".into()), TypeAnnotation::Name("IOException".into())],
        )),
        try_expr,
        span(),
    );

    let ast = program(vec![read_file_decl, read_decl]);
    let typed = infer_ok(&ast);
    let (params, body) = find_function(&typed, "read");
    let instructions = lower_function_body(&ast.statements, params, body);

    assert!(
        instructions.iter().any(|i| matches!(i, Instruction::New(name) if name == "Result$Error")),
        "expected `new Result$Error` in {instructions:?}"
    );
    assert!(instructions.contains(&Instruction::Areturn), "the synthesized handler returns the wrapped error");
}

/// S5: matching a bare wildcard against a `Double` target loads the
/// target, discards it width-aware (`pop2`, not `pop`), and jumps straight
/// to the case body -- `dload n; pop2; goto success`.
#[test]
fn double_wildcard_match_pops_two_slots() {
    let case = MatchCase { pattern: Pattern::wildcard(span()), body: Box::new(Expression::int(0, span())), span: span() };
    let match_expr = Expression::match_expr(Expression::ident("d", span()), vec![case], span());

    let d_param = Param { name: "d".into(), annotation: Some(TypeAnnotation::Name("Double".into())), span: span() };
    let fn_decl = Statement::function_decl("pick", vec![], vec![d_param], None, match_expr, span());
    let ast = program(vec![fn_decl]);

    let typed = infer_ok(&ast);
    let (params, body) = find_function(&typed, "pick");
    let instructions = lower_function_body(&ast.statements, params, body);

    let dload_pos = instructions
        .iter()
        .position(|i| matches!(i, Instruction::Dload(_)))
        .expect("expected a dload reading the target slot");
    assert_eq!(instructions[dload_pos + 1], Instruction::Pop2, "a Double target must be discarded with pop2");
    assert!(
        matches!(instructions[dload_pos + 2], Instruction::Goto(_)),
        "wildcard falls straight through to its success label"
    );
}

/// S6: a `List<Int>` match covering only `Cons` is rejected before any
/// bytecode is emitted, naming the missing `Nil` variant.
#[test]
fn non_exhaustive_list_match_is_rejected() {
    let cons_pattern = Pattern::constructor(
        "Cons",
        vec![Pattern::identifier("head", span()), Pattern::identifier("tail", span())],
        span(),
    );
    let case = MatchCase { pattern: cons_pattern, body: Box::new(Expression::ident("head", span())), span: span() };
    let match_expr = Expression::match_expr(Expression::ident("xs", span()), vec![case], span());

    let xs_param = Param {
        name: "xs".into(),
        annotation: Some(TypeAnnotation::Generic("List".into(), vec![TypeAnnotation::Name("Int".into())])),
        span: span(),
    };
    let fn_decl = Statement::function_decl("head_or_die", vec![], vec![xs_param], None, match_expr, span());
    let ast = program(vec![fn_decl]);

    let typed = infer_ok(&ast);
    let (params, body) = find_function(&typed, "head_or_die");

    let factory = TypeVarFactory::new();
    let registry = UnionRegistry::build(&ast.statements, &factory);
    let ctx = LowerCtx { registry: &registry, entry_class: "Test" };
    let mut emitter = MethodEmitter::new();
    let mut slots = SlotMap::new();
    for p in params {
        slots.bind(p.name.clone(), p.ty.clone());
    }

    let err = lower_expr(&mut emitter, &mut slots, &ctx, body).expect_err("expected a non-exhaustive match error");
    match err {
        CodegenError::NonExhaustiveMatch { missing_variants, .. } => {
            assert_eq!(missing_variants, vec!["Nil".to_string()]);
        }
        CodegenError::Internal(e) => panic!("expected NonExhaustiveMatch, got an internal error: {e}"),
    }
}

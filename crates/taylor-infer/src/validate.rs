//! Pre-typecheck structural validation.
//!
//! Run before the collector ever sees the AST. A `StructuralError` here
//! means the tree itself is malformed -- an identifier with no reachable
//! binding, a constructor call naming an undeclared variant -- and the
//! solver is never invoked for a unit that fails this pass.

use rustc_hash::FxHashSet;

use taylor_ast::{Expression, ExprKind, Pattern, PatternKind, Program, Span, Statement, StatementKind};

#[derive(Clone, Debug, PartialEq)]
pub struct StructuralError {
    pub message: String,
    pub location: Span,
}

impl StructuralError {
    fn new(message: impl Into<String>, location: Span) -> Self {
        StructuralError { message: message.into(), location }
    }
}

const BUILTIN_CONSTRUCTORS: &[&str] = &["Some", "None", "Ok", "Error", "Cons", "Nil", "Pair"];
const BUILTIN_NAMES: &[&str] = &["println"];

struct Validator {
    known_constructors: FxHashSet<String>,
    errors: Vec<StructuralError>,
}

/// Check every `Identifier` reference and `ConstructorCall` name against
/// the declared lexical scope / variant set. Does not check type
/// annotation well-formedness beyond constructor existence -- arity and
/// generic-name resolution for annotations is handled structurally by the
/// collector itself, since it already carries the machinery to resolve a
/// `TypeAnnotation` into a `Type`.
pub fn validate_program(program: &Program) -> Vec<StructuralError> {
    let mut known_constructors: FxHashSet<String> =
        BUILTIN_CONSTRUCTORS.iter().map(|s| s.to_string()).collect();
    for stmt in &program.statements {
        if let StatementKind::TypeDecl { variants, .. } = &stmt.kind {
            for v in variants {
                known_constructors.insert(v.name.clone());
            }
        }
    }

    let mut validator = Validator { known_constructors, errors: Vec::new() };
    let mut top_level: FxHashSet<String> = BUILTIN_NAMES.iter().map(|s| s.to_string()).collect();
    for stmt in &program.statements {
        match &stmt.kind {
            StatementKind::FunctionDecl { name, .. } => {
                top_level.insert(name.clone());
            }
            StatementKind::ValDecl { name, .. } => {
                top_level.insert(name.clone());
            }
            _ => {}
        }
    }
    for stmt in &program.statements {
        validator.check_statement(stmt, &top_level);
    }
    validator.errors
}

impl Validator {
    fn check_statement(&mut self, stmt: &Statement, scope: &FxHashSet<String>) {
        match &stmt.kind {
            StatementKind::FunctionDecl { params, body, .. } => {
                let mut inner = scope.clone();
                for p in params {
                    inner.insert(p.name.clone());
                }
                self.check_expr(body, &inner);
            }
            StatementKind::TypeDecl { .. } => {}
            StatementKind::ValDecl { value, .. } => self.check_expr(value, scope),
            StatementKind::Expr(e) => self.check_expr(e, scope),
        }
    }

    fn check_expr(&mut self, expr: &Expression, scope: &FxHashSet<String>) {
        match &expr.kind {
            ExprKind::Literal(lit) => self.check_literal(lit, scope),
            ExprKind::Identifier(name) => {
                if !scope.contains(name) {
                    self.errors.push(StructuralError::new(format!("unbound identifier `{name}`"), expr.span));
                }
            }
            ExprKind::Binary { left, right, .. } => {
                self.check_expr(left, scope);
                self.check_expr(right, scope);
            }
            ExprKind::Unary { operand, .. } => self.check_expr(operand, scope),
            ExprKind::Call { callee, args } => {
                self.check_expr(callee, scope);
                for a in args {
                    self.check_expr(a, scope);
                }
            }
            ExprKind::PropertyAccess { target, .. } => self.check_expr(target, scope),
            ExprKind::IndexAccess { target, index } => {
                self.check_expr(target, scope);
                self.check_expr(index, scope);
            }
            ExprKind::ConstructorCall { name, args } => {
                if !self.known_constructors.contains(name) {
                    self.errors.push(StructuralError::new(format!("`{name}` does not name a declared variant"), expr.span));
                }
                for a in args {
                    self.check_expr(a, scope);
                }
            }
            ExprKind::Lambda { params, body } => {
                let mut inner = scope.clone();
                for p in params {
                    inner.insert(p.name.clone());
                }
                self.check_expr(body, &inner);
            }
            ExprKind::If { cond, then_branch, else_branch } => {
                self.check_expr(cond, scope);
                self.check_expr(then_branch, scope);
                self.check_expr(else_branch, scope);
            }
            ExprKind::Match { target, cases } => {
                self.check_expr(target, scope);
                for case in cases {
                    let mut inner = scope.clone();
                    self.check_pattern(&case.pattern, &mut inner);
                    self.check_expr(&case.body, &inner);
                }
            }
            ExprKind::Try { body, catches } => {
                self.check_expr(body, scope);
                for clause in catches {
                    let mut inner = scope.clone();
                    inner.insert(clause.binding.clone());
                    self.check_expr(&clause.body, &inner);
                }
            }
            ExprKind::Block { statements, result } => {
                let mut inner = scope.clone();
                for s in statements {
                    match &s.kind {
                        StatementKind::ValDecl { name, value, .. } => {
                            self.check_expr(value, &inner);
                            inner.insert(name.clone());
                        }
                        StatementKind::FunctionDecl { name, .. } => {
                            self.check_statement(s, &inner);
                            inner.insert(name.clone());
                        }
                        _ => self.check_statement(s, &inner),
                    }
                }
                self.check_expr(result, &inner);
            }
        }
    }

    fn check_literal(&mut self, lit: &taylor_ast::Literal, scope: &FxHashSet<String>) {
        use taylor_ast::Literal;
        match lit {
            Literal::List(items) | Literal::Tuple(items) => {
                for i in items {
                    self.check_expr(i, scope);
                }
            }
            Literal::Map(entries) => {
                for (k, v) in entries {
                    self.check_expr(k, scope);
                    self.check_expr(v, scope);
                }
            }
            Literal::Int(_) | Literal::Float(_) | Literal::Str(_) | Literal::Boolean(_) | Literal::Null => {}
        }
    }

    fn check_pattern(&mut self, pattern: &Pattern, scope: &mut FxHashSet<String>) {
        match &pattern.kind {
            PatternKind::Wildcard | PatternKind::Literal(_) => {}
            PatternKind::Identifier(name) => {
                scope.insert(name.clone());
            }
            PatternKind::Constructor { name, subpatterns } => {
                if !self.known_constructors.contains(name) {
                    self.errors.push(StructuralError::new(format!("`{name}` does not name a declared variant"), pattern.span));
                }
                for sp in subpatterns {
                    self.check_pattern(sp, scope);
                }
            }
            PatternKind::Guard { inner, cond } => {
                self.check_pattern(inner, scope);
                self.check_expr(cond, scope);
            }
        }
    }
}

//! The elaborated tree the collector produces and the solver finalizes.
//!
//! Shaped like `taylor_ast`'s `Expression`/`Pattern`/`Statement`, but every
//! node additionally carries a `Type` -- a fresh `Var` fresh out of the
//! collector, a fully ground type once the solver's substitution has been
//! applied in its post-pass. [`TypedExpr::type_is_ground`] is how callers
//! tell which stage they're looking at.

use taylor_ast::{BinOp, Literal, Span, UnOp};
use taylor_types::{Substitution, Type};

#[derive(Clone, Debug, PartialEq)]
pub struct TypedExpr {
    pub kind: TypedExprKind,
    pub ty: Type,
    pub span: Span,
}

impl TypedExpr {
    pub fn type_is_ground(&self) -> bool {
        self.ty.free_vars().is_empty()
    }

    /// Apply `subst` to this node's own type and recurse into every child,
    /// used by the solver's post-pass.
    pub fn apply_subst(&mut self, subst: &Substitution) {
        self.ty = subst.apply(&self.ty);
        match &mut self.kind {
            TypedExprKind::Literal(lit) => apply_subst_literal(lit, subst),
            TypedExprKind::Identifier(_) => {}
            TypedExprKind::Binary { left, right, .. } => {
                left.apply_subst(subst);
                right.apply_subst(subst);
            }
            TypedExprKind::Unary { operand, .. } => operand.apply_subst(subst),
            TypedExprKind::Call { callee, args } => {
                callee.apply_subst(subst);
                for a in args {
                    a.apply_subst(subst);
                }
            }
            TypedExprKind::PropertyAccess { target, .. } => target.apply_subst(subst),
            TypedExprKind::IndexAccess { target, index } => {
                target.apply_subst(subst);
                index.apply_subst(subst);
            }
            TypedExprKind::ConstructorCall { args, .. } => {
                for a in args {
                    a.apply_subst(subst);
                }
            }
            TypedExprKind::Lambda { params, body } => {
                for p in params {
                    p.ty = subst.apply(&p.ty);
                }
                body.apply_subst(subst);
            }
            TypedExprKind::If { cond, then_branch, else_branch } => {
                cond.apply_subst(subst);
                then_branch.apply_subst(subst);
                else_branch.apply_subst(subst);
            }
            TypedExprKind::Match { target, cases } => {
                target.apply_subst(subst);
                for c in cases {
                    c.pattern.apply_subst(subst);
                    c.body.apply_subst(subst);
                }
            }
            TypedExprKind::Try { body, catches } => {
                body.apply_subst(subst);
                for c in catches {
                    c.exception_ty = subst.apply(&c.exception_ty);
                    c.body.apply_subst(subst);
                }
            }
            TypedExprKind::Block { statements, result } => {
                for s in statements {
                    s.apply_subst(subst);
                }
                result.apply_subst(subst);
            }
        }
    }
}

fn apply_subst_literal(lit: &mut TypedLiteral, subst: &Substitution) {
    match lit {
        TypedLiteral::List(items) | TypedLiteral::Tuple(items) => {
            for i in items {
                i.apply_subst(subst);
            }
        }
        TypedLiteral::Map(entries) => {
            for (k, v) in entries {
                k.apply_subst(subst);
                v.apply_subst(subst);
            }
        }
        TypedLiteral::Int(_) | TypedLiteral::Float(_) | TypedLiteral::Str(_) | TypedLiteral::Boolean(_) | TypedLiteral::Null => {}
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum TypedLiteral {
    Int(i64),
    Float(f64),
    Str(String),
    Boolean(bool),
    Null,
    List(Vec<TypedExpr>),
    Map(Vec<(TypedExpr, TypedExpr)>),
    Tuple(Vec<TypedExpr>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct TypedParam {
    pub name: String,
    pub ty: Type,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TypedCatchClause {
    pub exception_ty: Type,
    pub binding: String,
    pub body: Box<TypedExpr>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TypedMatchCase {
    pub pattern: TypedPattern,
    pub body: Box<TypedExpr>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TypedExprKind {
    Literal(TypedLiteral),
    Identifier(String),
    Binary { op: BinOp, left: Box<TypedExpr>, right: Box<TypedExpr> },
    Unary { op: UnOp, operand: Box<TypedExpr> },
    Call { callee: Box<TypedExpr>, args: Vec<TypedExpr> },
    PropertyAccess { target: Box<TypedExpr>, property: String },
    IndexAccess { target: Box<TypedExpr>, index: Box<TypedExpr> },
    ConstructorCall { name: String, args: Vec<TypedExpr> },
    Lambda { params: Vec<TypedParam>, body: Box<TypedExpr> },
    If { cond: Box<TypedExpr>, then_branch: Box<TypedExpr>, else_branch: Box<TypedExpr> },
    Match { target: Box<TypedExpr>, cases: Vec<TypedMatchCase> },
    Try { body: Box<TypedExpr>, catches: Vec<TypedCatchClause> },
    Block { statements: Vec<TypedStatement>, result: Box<TypedExpr> },
}

#[derive(Clone, Debug, PartialEq)]
pub struct TypedPattern {
    pub kind: TypedPatternKind,
    pub ty: Type,
    pub span: Span,
}

impl TypedPattern {
    pub fn apply_subst(&mut self, subst: &Substitution) {
        self.ty = subst.apply(&self.ty);
        match &mut self.kind {
            TypedPatternKind::Wildcard | TypedPatternKind::Identifier(_) | TypedPatternKind::Literal(_) => {}
            TypedPatternKind::Constructor { subpatterns, .. } => {
                for p in subpatterns {
                    p.apply_subst(subst);
                }
            }
            TypedPatternKind::Guard { inner, cond } => {
                inner.apply_subst(subst);
                cond.apply_subst(subst);
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum TypedPatternKind {
    Wildcard,
    Identifier(String),
    Literal(Literal),
    Constructor { name: String, subpatterns: Vec<TypedPattern> },
    Guard { inner: Box<TypedPattern>, cond: Box<TypedExpr> },
}

#[derive(Clone, Debug, PartialEq)]
pub enum TypedStatement {
    FunctionDecl {
        name: String,
        params: Vec<TypedParam>,
        return_ty: Type,
        body: Box<TypedExpr>,
    },
    /// Type declarations carry no per-node type of their own; kept for
    /// positional fidelity with the source program.
    TypeDecl { name: String },
    ValDecl { name: String, ty: Type, value: Box<TypedExpr> },
    Expr(Box<TypedExpr>),
}

impl TypedStatement {
    pub fn apply_subst(&mut self, subst: &Substitution) {
        match self {
            TypedStatement::FunctionDecl { params, return_ty, body, .. } => {
                for p in params {
                    p.ty = subst.apply(&p.ty);
                }
                *return_ty = subst.apply(return_ty);
                body.apply_subst(subst);
            }
            TypedStatement::TypeDecl { .. } => {}
            TypedStatement::ValDecl { ty, value, .. } => {
                *ty = subst.apply(ty);
                value.apply_subst(subst);
            }
            TypedStatement::Expr(e) => e.apply_subst(subst),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct TypedProgram {
    pub statements: Vec<TypedStatement>,
}

impl TypedProgram {
    pub fn apply_subst(&mut self, subst: &Substitution) {
        for s in &mut self.statements {
            s.apply_subst(subst);
        }
    }
}

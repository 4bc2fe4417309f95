//! Shared AST, span, and source-level type-annotation model for TaylorLang.
//!
//! This crate owns none of the lexing, parsing, or tree-building machinery --
//! those are external collaborators (an `ASTBuilder`). It only defines the
//! shape of the tree the collector walks: [`Program`], [`Statement`],
//! [`Expression`], and [`Pattern`], plus the source-level [`TypeAnnotation`]
//! syntax that appears in declarations before any inference has run.

pub mod ast;
pub mod span;

pub use ast::*;
pub use span::Span;

//! Type errors: the wire format collaborators (a driver, a language server)
//! consume.
//!
//! Every error carries a `kind`, a source `location`, a primary message,
//! optional secondary messages, and an optional suggestion. The shape is
//! kept serializable so a driver can print it, a test can snapshot it, or
//! a future language server can stream it without this crate knowing which.

use serde::Serialize;

use taylor_ast::Span;
use taylor_types::{Type, TypeVar, UnifyError};

use crate::constraint::ConstraintOrigin;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeErrorKind {
    OccursCheck,
    Mismatch,
    AmbiguousType,
    NonExhaustiveMatch,
    UnboundIdentifier,
    ArityMismatch,
    NotInstantiable,
}

/// A single reported error, in the contract's wire format.
#[derive(Clone, Debug, Serialize)]
pub struct TypeError {
    pub kind: TypeErrorKind,
    pub location: Span,
    pub primary_message: String,
    pub secondary_messages: Vec<String>,
    pub suggestion: Option<String>,
}

impl TypeError {
    fn new(kind: TypeErrorKind, location: Span, primary_message: impl Into<String>) -> Self {
        TypeError {
            kind,
            location,
            primary_message: primary_message.into(),
            secondary_messages: Vec::new(),
            suggestion: None,
        }
    }

    fn with_secondary(mut self, msg: impl Into<String>) -> Self {
        self.secondary_messages.push(msg.into());
        self
    }

    fn with_suggestion(mut self, msg: impl Into<String>) -> Self {
        self.suggestion = Some(msg.into());
        self
    }

    /// Build a `TypeError` from a solver-time unification failure, folding
    /// in whatever span the originating constraint carried.
    pub fn from_unify_error(err: UnifyError, origin: &ConstraintOrigin, fallback: Span) -> Self {
        let location = origin.span().unwrap_or(fallback);
        match err {
            UnifyError::OccursCheck { var, ty } => {
                TypeError::new(
                    TypeErrorKind::OccursCheck,
                    location,
                    format!("infinite type: `{var}` occurs in `{ty}`"),
                )
            }
            UnifyError::MismatchPrimitives { expected, found } => mismatch(location, expected, found),
            UnifyError::MismatchNames { expected, found } => TypeError::new(
                TypeErrorKind::Mismatch,
                location,
                format!("expected type `{expected}`, found `{found}`"),
            ),
            UnifyError::MismatchShape { expected, found } => mismatch(location, expected, found),
            UnifyError::ArityMismatch { name, expected, found } => TypeError::new(
                TypeErrorKind::ArityMismatch,
                location,
                format!("`{name}` expects {expected} type argument(s), found {found}"),
            ),
        }
    }

    pub fn ambiguous_type(var: &TypeVar, location: Span) -> Self {
        TypeError::new(
            TypeErrorKind::AmbiguousType,
            location,
            format!("cannot infer a concrete type for `{var}`"),
        )
        .with_suggestion("add a type annotation")
    }

    pub fn unbound_identifier(name: &str, location: Span) -> Self {
        TypeError::new(
            TypeErrorKind::UnboundIdentifier,
            location,
            format!("unbound identifier `{name}`"),
        )
    }

    pub fn non_exhaustive_match(missing_variants: &[String], location: Span) -> Self {
        let mut err = TypeError::new(
            TypeErrorKind::NonExhaustiveMatch,
            location,
            format!(
                "match is not exhaustive: missing {}",
                missing_variants.join(", ")
            ),
        );
        for variant in missing_variants {
            err = err.with_secondary(format!("variant `{variant}` is not covered"));
        }
        err.with_suggestion("add a case for the missing variant(s) or a wildcard `_`")
    }

    pub fn not_instantiable(scheme_body: &Type, location: Span) -> Self {
        TypeError::new(
            TypeErrorKind::NotInstantiable,
            location,
            format!("`{scheme_body}` cannot be instantiated at this use site"),
        )
    }
}

fn mismatch(location: Span, expected: Type, found: Type) -> TypeError {
    TypeError::new(
        TypeErrorKind::Mismatch,
        location,
        format!("expected `{expected}`, found `{found}`"),
    )
}

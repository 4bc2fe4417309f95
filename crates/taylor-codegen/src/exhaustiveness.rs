//! Exhaustiveness checking for `match` expressions over declared union
//! types, per the error taxonomy's `NonExhaustiveMatch | Lowerer pre-pass`
//! entry. This deliberately does not live in `taylor-infer`: the collector
//! only has to know a match's *result* type, never whether its coverage is
//! complete.

use taylor_ast::Span;
use taylor_infer::{TypedMatchCase, TypedPatternKind};
use taylor_types::Type;

use crate::union_layout::UnionRegistry;

#[derive(Clone, Debug)]
pub struct NonExhaustiveMatch {
    pub missing_variants: Vec<String>,
    pub location: Span,
}

/// A pattern counts as a catch-all only when it can never fail to match:
/// a bare wildcard or identifier, with no guard condition attached (a
/// guard can always reject, so it never discharges exhaustiveness on its
/// own).
fn is_catch_all(kind: &TypedPatternKind) -> bool {
    matches!(kind, TypedPatternKind::Wildcard | TypedPatternKind::Identifier(_))
}

/// Checks a match's cases against the target type's declared variants.
/// Non-union targets (primitives, tuples, functions) have no variant set
/// to exhaust and are always considered exhaustive here -- literal
/// patterns over them are the collector's concern, not this pass's.
pub fn check_match_exhaustive(
    target_ty: &Type,
    cases: &[TypedMatchCase],
    match_span: Span,
    registry: &UnionRegistry,
) -> Option<NonExhaustiveMatch> {
    if cases.iter().any(|c| is_catch_all(&c.pattern.kind)) {
        return None;
    }

    let type_name = match target_ty {
        Type::Generic(name, _) => name.as_str(),
        Type::Named(name) => name.as_str(),
        _ => return None,
    };

    let Some(layout) = registry.layout_for_type(type_name) else {
        return None;
    };

    let mut covered = std::collections::HashSet::new();
    for case in cases {
        if let TypedPatternKind::Constructor { name, .. } = &case.pattern.kind {
            covered.insert(name.as_str());
        }
    }

    let missing: Vec<String> = layout
        .variants
        .iter()
        .map(|v| v.name.as_str())
        .filter(|name| !covered.contains(name))
        .map(str::to_string)
        .collect();

    if missing.is_empty() {
        None
    } else {
        Some(NonExhaustiveMatch { missing_variants: missing, location: match_span })
    }
}

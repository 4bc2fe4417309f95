//! Source locations.
//!
//! Every AST node produced by the (external) `ASTBuilder` carries a [`Span`].
//! Spans are plain byte offsets into the original source text; the core
//! never re-derives them and never constructs a node without one.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A half-open byte range `[start, end)` into the source text.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub const fn new(start: u32, end: u32) -> Self {
        Span { start, end }
    }

    /// A zero-width span at offset 0, used for synthetic nodes that have no
    /// corresponding source text (e.g. desugared constructs).
    pub const fn synthetic() -> Self {
        Span { start: 0, end: 0 }
    }

    /// Merge two spans into the smallest span covering both.
    pub fn to(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

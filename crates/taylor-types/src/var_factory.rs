//! Fresh type variable generation.
//!
//! Encapsulated in a factory object (rather than a process-wide singleton)
//! so independent compilation units can be inferred in parallel on separate
//! worker threads without contending on, or entangling, each other's
//! variable ids.

use std::sync::atomic::{AtomicU32, Ordering};

use crate::ty::TypeVar;

/// Thread-safe monotonic counter producing globally unique [`TypeVar`] ids
/// for a single compilation unit.
#[derive(Debug, Default)]
pub struct TypeVarFactory {
    next: AtomicU32,
}

impl TypeVarFactory {
    pub fn new() -> Self {
        TypeVarFactory { next: AtomicU32::new(0) }
    }

    /// Allocate a fresh, unnamed type variable.
    pub fn fresh(&self) -> TypeVar {
        let id = self.next.fetch_add(1, Ordering::Relaxed);
        TypeVar::new(id)
    }

    /// Allocate a fresh type variable with a debug name (purely cosmetic,
    /// does not affect identity).
    pub fn fresh_named(&self, name: impl Into<String>) -> TypeVar {
        let id = self.next.fetch_add(1, Ordering::Relaxed);
        TypeVar::named(id, name)
    }

    /// Reset the counter to zero. Exists only for deterministic golden
    /// tests (see the determinism property in the pattern-lowering test
    /// suite); calling this outside a test context reintroduces id
    /// collisions across compilation units and is a compiler bug.
    pub fn reset_for_tests(&self) {
        self.next.store(0, Ordering::Relaxed);
    }
}

//! The exception class-hierarchy oracle consulted by `Subtype` constraints.
//!
//! `Subtype` constraints are used solely for `Result<T, E>`'s error
//! parameter, which must be `Throwable` or a declared subclass of it. The
//! oracle is read-only once built and safe to share across the worker
//! threads that may process independent compilation units concurrently.

use rustc_hash::FxHashMap;

/// A minimal, closed view of the `Throwable` hierarchy: every known
/// exception name maps to its direct superclass, terminating at
/// `"Throwable"` itself (which maps to nothing).
#[derive(Clone, Debug)]
pub struct ClassHierarchy {
    superclass: FxHashMap<String, String>,
}

impl Default for ClassHierarchy {
    fn default() -> Self {
        let mut superclass = FxHashMap::default();
        superclass.insert("Exception".to_string(), "Throwable".to_string());
        superclass.insert("RuntimeException".to_string(), "Exception".to_string());
        superclass.insert("IOException".to_string(), "Exception".to_string());
        superclass.insert("IllegalArgumentException".to_string(), "RuntimeException".to_string());
        superclass.insert("IllegalStateException".to_string(), "RuntimeException".to_string());
        superclass.insert("NumberFormatException".to_string(), "IllegalArgumentException".to_string());
        superclass.insert("NullPointerException".to_string(), "RuntimeException".to_string());
        superclass.insert("IndexOutOfBoundsException".to_string(), "RuntimeException".to_string());
        ClassHierarchy { superclass }
    }
}

impl ClassHierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an additional user-declared exception subtype (e.g. one
    /// introduced by a `type` declaration whose JVM supertype is
    /// `Throwable` or a descendant).
    pub fn register(&mut self, name: impl Into<String>, extends: impl Into<String>) {
        self.superclass.insert(name.into(), extends.into());
    }

    /// Whether `sub` is `sup` or a transitive subclass of it. `"Throwable"`
    /// is the root and is a supertype of everything known to the oracle.
    pub fn is_subtype(&self, sub: &str, sup: &str) -> bool {
        if sub == sup {
            return true;
        }
        if sup == "Throwable" {
            return sub == "Throwable" || self.superclass.contains_key(sub);
        }
        let mut current = sub;
        let mut guard = 0;
        while let Some(parent) = self.superclass.get(current) {
            if parent == sup {
                return true;
            }
            current = parent;
            guard += 1;
            if guard > self.superclass.len() + 1 {
                // Cyclic hierarchy data would otherwise spin forever; this
                // oracle is built from a fixed table, so this only fires on
                // a malformed `register` call.
                return false;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_exception_is_throwable() {
        let oracle = ClassHierarchy::new();
        assert!(oracle.is_subtype("IOException", "Throwable"));
    }

    #[test]
    fn unrelated_exceptions_are_not_subtypes() {
        let oracle = ClassHierarchy::new();
        assert!(!oracle.is_subtype("IOException", "NumberFormatException"));
    }

    #[test]
    fn transitive_subtype_resolves() {
        let oracle = ClassHierarchy::new();
        assert!(oracle.is_subtype("NumberFormatException", "RuntimeException"));
    }
}

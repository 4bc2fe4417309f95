//! Local-variable slot allocation.
//!
//! JVM locals are indexed by slot, and `double`/`long` occupy two
//! consecutive slots. Every allocator in this crate goes through
//! [`SlotMap`] so that width bookkeeping lives in exactly one place.

use rustc_hash::FxHashMap;

use taylor_types::{PrimitiveName, Type};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Width {
    One,
    Two,
}

/// JVM rule: `double` and `long` are two-slot values; everything else,
/// including `Object`-erased generics and reference types, is one slot.
pub fn width_of(ty: &Type) -> Width {
    match ty {
        Type::Primitive(PrimitiveName::Double) | Type::Primitive(PrimitiveName::Long) => Width::Two,
        _ => Width::One,
    }
}

/// Allocates local-variable indices for a single method, width-aware.
#[derive(Debug, Default)]
pub struct SlotMap {
    next_index: u16,
    bindings: FxHashMap<String, (u16, Type)>,
    /// Every allocation (named or anonymous) in the order it was made --
    /// allocation is monotonic, so this is also index order. Backs
    /// [`SlotMap::layout`], which `crate::backend` needs to synthesize
    /// stack-map frames: a JVM verifier needs the declared type of every
    /// local, not just the ones a name was ever bound to (`targetSlot`/
    /// `resultSlot` are allocated anonymously).
    layout: Vec<(u16, Type)>,
}

impl SlotMap {
    pub fn new() -> Self {
        SlotMap { next_index: 0, bindings: FxHashMap::default(), layout: Vec::new() }
    }

    /// Reserve `n` slots up front without naming them (e.g. `this` in an
    /// instance method, or the implicit receiver of a synthetic lambda
    /// class).
    pub fn reserve(&mut self, n: u16) {
        self.next_index += n;
    }

    /// Allocate a fresh, unnamed slot of the given type -- used for
    /// `targetSlot`/`resultSlot` in the match-lowering protocol.
    pub fn allocate_anonymous(&mut self, ty: &Type) -> u16 {
        let index = self.next_index;
        self.next_index += match width_of(ty) {
            Width::One => 1,
            Width::Two => 2,
        };
        self.layout.push((index, ty.clone()));
        index
    }

    /// Bind `name` to a fresh slot of type `ty`, returning the index.
    pub fn bind(&mut self, name: impl Into<String>, ty: Type) -> u16 {
        let index = self.allocate_anonymous(&ty);
        self.bindings.insert(name.into(), (index, ty));
        index
    }

    pub fn lookup(&self, name: &str) -> Option<(u16, &Type)> {
        self.bindings.get(name).map(|(idx, ty)| (*idx, ty))
    }

    pub fn locals_count(&self) -> u16 {
        self.next_index
    }

    /// Every local this method ever allocates, in index order: the
    /// complete declared-type layout a verifier-facing frame needs.
    pub fn layout(&self) -> &[(u16, Type)] {
        &self.layout
    }
}

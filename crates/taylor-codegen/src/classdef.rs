//! Class-level description, independent of how `crate::backend` turns it
//! into bytes. A `MethodEmitter`'s finished instruction stream plus a
//! `SlotMap`'s locals count describe one method; this module describes
//! the class that owns a collection of such methods.

use taylor_types::{PrimitiveName, Type};

use crate::emitter::ExceptionHandler;
use crate::instr::Instruction;

#[derive(Clone, Debug)]
pub struct FieldDef {
    pub name: String,
    pub descriptor: String,
}

/// The JVM verification-type category a local variable's slot belongs to,
/// independent of the source `taylor_types::Type` it was declared with.
/// `crate::backend` needs exactly this much to synthesize `StackMapTable`
/// frames; it otherwise knows nothing about `taylor_types`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JvmLocalType {
    Int,
    Long,
    Float,
    Double,
    /// Any reference type: `String`, a declared union/product, a
    /// `Object`-erased generic, or a lambda's synthetic `Function1`.
    Reference,
}

/// Maps a source type to the JVM verification-type category its slot(s)
/// belong to. Shared by every `MethodDef` builder in this crate so a
/// method's `local_types` always agrees with how `SlotMap` widths it.
pub fn jvm_local_type(ty: &Type) -> JvmLocalType {
    match ty {
        Type::Primitive(PrimitiveName::Int) | Type::Primitive(PrimitiveName::Boolean) | Type::Primitive(PrimitiveName::Char) => {
            JvmLocalType::Int
        }
        Type::Primitive(PrimitiveName::Long) => JvmLocalType::Long,
        Type::Primitive(PrimitiveName::Float) => JvmLocalType::Float,
        Type::Primitive(PrimitiveName::Double) => JvmLocalType::Double,
        _ => JvmLocalType::Reference,
    }
}

#[derive(Clone, Debug)]
pub struct MethodDef {
    pub name: String,
    pub descriptor: String,
    pub is_static: bool,
    pub max_locals: u16,
    pub instructions: Vec<Instruction>,
    pub exception_handlers: Vec<ExceptionHandler>,
    /// One entry per conceptual local (not per word -- a `Double`/`Long`
    /// is one entry even though it occupies two slot indices), in index
    /// order. Populated by whichever lowering pass built `instructions`,
    /// from the same `SlotMap` that allocated them.
    pub local_types: Vec<JvmLocalType>,
}

/// Describes one `T` or `T$C` class to emit. Union-type parents carry no
/// fields or constructor of their own (`fields`/`ctor_param_descriptors`
/// empty); variant classes carry `field_1..field_k` and a constructor
/// that stores each in order.
#[derive(Clone, Debug)]
pub struct ClassDef {
    pub internal_name: String,
    pub super_class: String,
    pub is_abstract: bool,
    pub fields: Vec<FieldDef>,
    pub methods: Vec<MethodDef>,
}

impl ClassDef {
    pub fn new(internal_name: impl Into<String>, super_class: impl Into<String>, is_abstract: bool) -> Self {
        ClassDef {
            internal_name: internal_name.into(),
            super_class: super_class.into(),
            is_abstract,
            fields: Vec::new(),
            methods: Vec::new(),
        }
    }
}

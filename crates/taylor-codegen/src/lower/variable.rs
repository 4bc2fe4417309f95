//! Variable-access sub-lowerer.
//!
//! Per §4.4's "Arithmetic lowering" rule, an identifier's operand width is
//! always read back from the slot map's *declared* binding type -- never
//! defaulted -- so a mis-inferred `Double` can never silently narrow an
//! `Int` local.

use taylor_types::{PrimitiveName, Type};

use crate::emitter::{InternalCompilerError, MethodEmitter, StackShape};
use crate::instr::Instruction;
use crate::slot::{width_of, SlotMap};

pub fn lower_load(
    emitter: &mut MethodEmitter,
    slots: &SlotMap,
    name: &str,
) -> Result<Type, InternalCompilerError> {
    let (index, ty) = slots
        .lookup(name)
        .ok_or_else(|| InternalCompilerError { message: format!("unbound local `{name}` reached codegen") })?;
    let ty = ty.clone();
    let instr = match &ty {
        Type::Primitive(PrimitiveName::Int) | Type::Primitive(PrimitiveName::Boolean) | Type::Primitive(PrimitiveName::Char) => {
            Instruction::Iload(index)
        }
        Type::Primitive(PrimitiveName::Long) => Instruction::Lload(index),
        Type::Primitive(PrimitiveName::Double) | Type::Primitive(PrimitiveName::Float) => Instruction::Dload(index),
        _ => Instruction::Aload(index),
    };
    emitter.emit(instr);
    let shape: StackShape = width_of(&ty).into();
    emitter.push_shape(shape);
    Ok(ty)
}

/// Stores into an already-allocated anonymous slot (no name binding) --
/// used for `if`/`try`/match result slots that never appear in source.
pub fn store_into(emitter: &mut MethodEmitter, slot: u16, ty: &Type) -> Result<(), InternalCompilerError> {
    emitter.pop_shape()?;
    let instr = match ty {
        Type::Primitive(PrimitiveName::Long) => Instruction::Lstore(slot),
        Type::Primitive(PrimitiveName::Double) | Type::Primitive(PrimitiveName::Float) => Instruction::Dstore(slot),
        Type::Primitive(PrimitiveName::Int) | Type::Primitive(PrimitiveName::Boolean) | Type::Primitive(PrimitiveName::Char) => {
            Instruction::Istore(slot)
        }
        _ => Instruction::Astore(slot),
    };
    emitter.emit(instr);
    Ok(())
}

/// Loads an already-allocated anonymous slot.
pub fn load_into(emitter: &mut MethodEmitter, slot: u16, ty: &Type) {
    let instr = match ty {
        Type::Primitive(PrimitiveName::Int) | Type::Primitive(PrimitiveName::Boolean) | Type::Primitive(PrimitiveName::Char) => {
            Instruction::Iload(slot)
        }
        Type::Primitive(PrimitiveName::Long) => Instruction::Lload(slot),
        Type::Primitive(PrimitiveName::Double) | Type::Primitive(PrimitiveName::Float) => Instruction::Dload(slot),
        _ => Instruction::Aload(slot),
    };
    emitter.emit(instr);
    let shape: StackShape = width_of(ty).into();
    emitter.push_shape(shape);
}

pub fn lower_store(
    emitter: &mut MethodEmitter,
    slots: &mut SlotMap,
    name: &str,
    ty: Type,
) -> Result<u16, InternalCompilerError> {
    emitter.pop_shape()?;
    let index = slots.bind(name, ty.clone());
    let instr = match &ty {
        Type::Primitive(PrimitiveName::Long) => Instruction::Lstore(index),
        Type::Primitive(PrimitiveName::Double) | Type::Primitive(PrimitiveName::Float) => Instruction::Dstore(index),
        Type::Primitive(PrimitiveName::Int) | Type::Primitive(PrimitiveName::Boolean) | Type::Primitive(PrimitiveName::Char) => {
            Instruction::Istore(index)
        }
        _ => Instruction::Astore(index),
    };
    emitter.emit(instr);
    Ok(index)
}

//! Arithmetic sub-lowerer.
//!
//! Assumes both operands are already on the operand stack with the shape
//! implied by `result_ty` (the coordinator inserts `i2d`/`d2i` conversions
//! at the operand-lowering sites where an operand's declared type doesn't
//! already match, per §4.4's "implicit narrowing is forbidden" rule --
//! this module only emits the final op).

use taylor_ast::BinOp;
use taylor_types::{PrimitiveName, Type};

use crate::emitter::{InternalCompilerError, MethodEmitter, StackShape};
use crate::instr::Instruction;

pub fn lower_arithmetic(
    emitter: &mut MethodEmitter,
    op: BinOp,
    result_ty: &Type,
) -> Result<(), InternalCompilerError> {
    let is_double = matches!(result_ty, Type::Primitive(PrimitiveName::Double) | Type::Primitive(PrimitiveName::Float));
    let instr = match (op, is_double) {
        (BinOp::Add, false) => Instruction::Iadd,
        (BinOp::Sub, false) => Instruction::Isub,
        (BinOp::Mul, false) => Instruction::Imul,
        (BinOp::Div, false) => Instruction::Idiv,
        (BinOp::Mod, false) => Instruction::Irem,
        (BinOp::Add, true) => Instruction::Dadd,
        (BinOp::Sub, true) => Instruction::Dsub,
        (BinOp::Mul, true) => Instruction::Dmul,
        (BinOp::Div, true) => Instruction::Ddiv,
        (BinOp::Mod, true) => Instruction::Drem,
        (other, _) => {
            return Err(InternalCompilerError {
                message: format!("{other:?} is not an arithmetic operator"),
            })
        }
    };

    // Both operands consumed, one result pushed, same width as the result.
    emitter.pop_shape()?;
    emitter.pop_shape()?;
    emitter.emit(instr);
    let shape = if is_double { StackShape::Two } else { StackShape::One };
    emitter.push_shape(shape);
    Ok(())
}

/// `i2d`/`d2i` explicit conversions, used at an operand site whose declared
/// type disagrees with the arithmetic result type -- never emitted as an
/// implicit narrowing.
pub fn convert(emitter: &mut MethodEmitter, from_is_double: bool, to_is_double: bool) -> Result<(), InternalCompilerError> {
    if from_is_double == to_is_double {
        return Ok(());
    }
    let from_shape = emitter.pop_shape()?;
    if to_is_double {
        emitter.emit(Instruction::I2d);
        emitter.push_shape(StackShape::Two);
    } else {
        emitter.emit(Instruction::D2i);
        emitter.push_shape(StackShape::One);
    }
    let _ = from_shape;
    Ok(())
}

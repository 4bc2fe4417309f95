//! Comparison sub-lowerer: general boolean-valued comparisons (used by
//! `if` conditions and boolean-typed `BinaryOp` expressions outside of
//! pattern position). Pattern-position literal comparisons have their own
//! jump-to-`next` shape and live in [`crate::lower::pattern`] instead,
//! since there the branch target is the case's failure label rather than
//! a value materialized on the stack.

use taylor_ast::BinOp;
use taylor_types::{PrimitiveName, Type};

use crate::emitter::{InternalCompilerError, MethodEmitter, StackShape};
use crate::instr::Instruction;

/// Assumes both operands are already on the stack with shape matching
/// `operand_ty`; leaves a single-width `0`/`1` int on the stack.
pub fn lower_comparison(
    emitter: &mut MethodEmitter,
    op: BinOp,
    operand_ty: &Type,
) -> Result<(), InternalCompilerError> {
    let is_double = matches!(operand_ty, Type::Primitive(PrimitiveName::Double) | Type::Primitive(PrimitiveName::Float));
    let is_string = matches!(operand_ty, Type::Primitive(PrimitiveName::String));

    let true_label = emitter.fresh_label();
    let end_label = emitter.fresh_label();

    if is_string {
        // `left.equals(right)` -> int 0/1 directly; `==`/`!=` still need
        // negating for `!=` since `equals` already returns the `Eq` sense.
        emitter.pop_shape()?;
        emitter.pop_shape()?;
        emitter.emit(Instruction::Invokevirtual {
            owner: "java/lang/Object".to_string(),
            name: "equals".to_string(),
            descriptor: "(Ljava/lang/Object;)Z".to_string(),
        });
        emitter.push_shape(StackShape::One);
        if matches!(op, BinOp::Ne) {
            negate_boolean(emitter)?;
        }
        return Ok(());
    }

    if is_double {
        emitter.pop_shape()?;
        emitter.pop_shape()?;
        emitter.emit(Instruction::Dcmpl);
        emitter.push_shape(StackShape::One);
        let branch = match op {
            BinOp::Lt => Instruction::Ifne(true_label),
            BinOp::Eq => Instruction::Ifeq(true_label),
            BinOp::Ne => Instruction::Ifne(true_label),
            _ => Instruction::Ifne(true_label),
        };
        emitter.pop_shape()?;
        emitter.emit(branch);
    } else {
        emitter.pop_shape()?;
        emitter.pop_shape()?;
        let branch = match op {
            BinOp::Lt => Instruction::IfIcmplt(true_label),
            BinOp::Le => Instruction::IfIcmple(true_label),
            BinOp::Gt => Instruction::IfIcmpgt(true_label),
            BinOp::Ge => Instruction::IfIcmpge(true_label),
            BinOp::Eq => Instruction::IfIcmpeq(true_label),
            BinOp::Ne => Instruction::IfIcmpne(true_label),
            other => {
                return Err(InternalCompilerError { message: format!("{other:?} is not a comparison operator") })
            }
        };
        emitter.emit(branch);
    }

    emitter.emit(Instruction::Iconst(0));
    emitter.push_shape(StackShape::One);
    emitter.emit(Instruction::Goto(end_label));
    emitter.pop_shape()?;
    emitter.mark_label(true_label);
    emitter.emit(Instruction::Iconst(1));
    emitter.push_shape(StackShape::One);
    emitter.mark_label(end_label);
    Ok(())
}

/// Logical `!`: flips an already-materialized `0`/`1` int on the stack.
pub fn lower_not(emitter: &mut MethodEmitter) -> Result<(), InternalCompilerError> {
    negate_boolean(emitter)
}

fn negate_boolean(emitter: &mut MethodEmitter) -> Result<(), InternalCompilerError> {
    let zero_label = emitter.fresh_label();
    let end_label = emitter.fresh_label();
    emitter.pop_shape()?;
    emitter.emit(Instruction::Ifeq(zero_label));
    emitter.emit(Instruction::Iconst(0));
    emitter.push_shape(StackShape::One);
    emitter.emit(Instruction::Goto(end_label));
    emitter.pop_shape()?;
    emitter.mark_label(zero_label);
    emitter.emit(Instruction::Iconst(1));
    emitter.push_shape(StackShape::One);
    emitter.mark_label(end_label);
    Ok(())
}

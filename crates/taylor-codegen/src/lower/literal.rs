//! Literal sub-lowerer: pushes a constant value onto the operand stack.

use taylor_infer::TypedLiteral;
use taylor_types::Type;

use crate::emitter::{InternalCompilerError, MethodEmitter, StackShape};
use crate::instr::{Constant, Instruction};
use crate::slot::width_of;

pub fn lower_literal(
    emitter: &mut MethodEmitter,
    lit: &TypedLiteral,
    ty: &Type,
) -> Result<(), InternalCompilerError> {
    match lit {
        TypedLiteral::Int(n) => {
            emitter.emit(Instruction::Iconst(*n as i32));
            emitter.push_shape(StackShape::One);
        }
        TypedLiteral::Float(f) => {
            emitter.emit(Instruction::Dconst(*f));
            emitter.push_shape(StackShape::Two);
        }
        TypedLiteral::Str(s) => {
            emitter.emit(Instruction::Ldc(Constant::String(s.clone())));
            emitter.push_shape(StackShape::One);
        }
        TypedLiteral::Boolean(b) => {
            emitter.emit(Instruction::Iconst(if *b { 1 } else { 0 }));
            emitter.push_shape(StackShape::One);
        }
        TypedLiteral::Null => {
            emitter.emit(Instruction::AconstNull);
            emitter.push_shape(StackShape::One);
        }
        TypedLiteral::List(_) | TypedLiteral::Map(_) | TypedLiteral::Tuple(_) => {
            return Err(InternalCompilerError {
                message: "collection-literal construction is owned by the runtime library, \
                          not the pattern-match lowerer"
                    .to_string(),
            });
        }
    }
    let expected: StackShape = width_of(ty).into();
    emitter.assert_top(expected)?;
    Ok(())
}

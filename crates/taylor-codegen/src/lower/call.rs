//! Function-call sub-lowerer.
//!
//! Top-level `FunctionDecl`s compile to `static` methods of the
//! compilation unit's synthesized entry class (the driver, out of this
//! crate's scope, names and assembles that class); a `Call` whose callee
//! is a plain identifier therefore lowers to `invokestatic`. A callee that
//! isn't a bare identifier (e.g. a value of function type produced by a
//! lambda) would need a `Function1.invoke` boundary -- out of scope for
//! the scenarios this core is required to compile.

use taylor_infer::{TypedExpr, TypedExprKind};
use taylor_types::Type;

use crate::descriptor::method_descriptor;
use crate::emitter::{InternalCompilerError, MethodEmitter};
use crate::error::CodegenError;
use crate::instr::Instruction;
use crate::slot::SlotMap;

pub fn lower_call(
    emitter: &mut MethodEmitter,
    slots: &mut SlotMap,
    entry_class: &str,
    callee: &TypedExpr,
    args: &[TypedExpr],
    result_ty: &Type,
    lower_expr: &mut dyn FnMut(&mut MethodEmitter, &mut SlotMap, &TypedExpr) -> Result<Type, CodegenError>,
) -> Result<Type, CodegenError> {
    let TypedExprKind::Identifier(name) = &callee.kind else {
        return Err(CodegenError::Internal(InternalCompilerError {
            message: "call lowering only supports a bare top-level function identifier callee".to_string(),
        }));
    };

    let mut arg_tys = Vec::with_capacity(args.len());
    for arg in args {
        arg_tys.push(lower_expr(emitter, slots, arg)?);
    }

    emitter.emit(Instruction::Invokestatic {
        owner: entry_class.to_string(),
        name: name.clone(),
        descriptor: method_descriptor(&arg_tys, result_ty),
    });
    for _ in args {
        emitter.pop_shape()?;
    }
    let shape = crate::slot::width_of(result_ty).into();
    if !matches!(result_ty, Type::Primitive(taylor_types::PrimitiveName::Unit)) {
        emitter.push_shape(shape);
    }

    Ok(result_ty.clone())
}

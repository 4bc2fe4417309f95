//! Constructor-call sub-lowerer: `new T$C; dup; <args>; invokespecial <init>`.

use taylor_infer::TypedExpr;
use taylor_types::Type;

use crate::descriptor::method_descriptor;
use crate::emitter::{InternalCompilerError, MethodEmitter, StackShape};
use crate::error::CodegenError;
use crate::instr::Instruction;
use crate::slot::SlotMap;
use crate::union_layout::UnionRegistry;

pub fn lower_constructor_call(
    emitter: &mut MethodEmitter,
    slots: &mut SlotMap,
    registry: &UnionRegistry,
    name: &str,
    args: &[TypedExpr],
    lower_expr: &mut dyn FnMut(&mut MethodEmitter, &mut SlotMap, &TypedExpr) -> Result<Type, CodegenError>,
) -> Result<Type, CodegenError> {
    let layout = registry.layout_for_constructor(name).ok_or_else(|| InternalCompilerError {
        message: format!("constructor `{name}` has no registered variant layout"),
    })?;
    let variant = layout.variant(name).expect("layout_for_constructor guarantees the variant exists");
    let class_name = layout.variant_class_name(name);

    emitter.emit(Instruction::New(class_name.clone()));
    emitter.push_shape(StackShape::One);
    emitter.emit(Instruction::Dup);
    emitter.push_shape(StackShape::One);

    for arg in args {
        lower_expr(emitter, slots, arg)?;
    }

    emitter.emit(Instruction::Invokespecial {
        owner: class_name.clone(),
        name: "<init>".to_string(),
        descriptor: method_descriptor(&variant.field_types, &Type::unit()),
    });
    for _ in args {
        emitter.pop_shape()?;
    }
    emitter.pop_shape()?; // the `dup`'d receiver consumed by <init>

    Ok(Type::Generic(layout.type_name.clone(), Vec::new()))
}

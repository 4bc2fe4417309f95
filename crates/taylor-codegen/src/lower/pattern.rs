//! Pattern compiler: the sub-lowerer implementing §4.4's "Pattern
//! compilation rules" and "Generic boundary handling".
//!
//! Every entry point takes an explicit `on_success`/`on_failure` label
//! pair rather than assuming "falls through to success": `Guard` needs to
//! interpose its condition between an inner pattern's match and the
//! case's actual success label, so fallthrough-to-success can't be baked
//! into the leaf rules.

use taylor_ast::Literal;
use taylor_infer::{TypedExpr, TypedPattern, TypedPatternKind};
use taylor_types::{PrimitiveName, Type};

use crate::descriptor::{boxed_wrapper, field_descriptor, internal_name};
use crate::emitter::{InternalCompilerError, MethodEmitter, StackShape};
use crate::error::CodegenError;
use crate::instr::{Constant, Instruction, Label};
use crate::slot::{width_of, SlotMap, Width};
use crate::union_layout::UnionRegistry;

pub struct PatternContext<'a> {
    pub registry: &'a UnionRegistry,
    pub lower_expr: &'a mut dyn FnMut(&mut MethodEmitter, &mut SlotMap, &TypedExpr) -> Result<Type, CodegenError>,
}

fn width_aware_pop(emitter: &mut MethodEmitter, ty: &Type) -> Result<(), InternalCompilerError> {
    emitter.pop_shape()?;
    match width_of(ty) {
        Width::Two => emitter.emit(Instruction::Pop2),
        Width::One => emitter.emit(Instruction::Pop),
    }
    Ok(())
}

fn load_slot(emitter: &mut MethodEmitter, slot: u16, ty: &Type) {
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

/// Compiles `pattern` against the value already bound in `target_slot`
/// (of type `target_ty`), branching to `on_success` or `on_failure`.
pub fn lower_pattern_test(
    emitter: &mut MethodEmitter,
    slots: &mut SlotMap,
    ctx: &mut PatternContext,
    pattern: &TypedPattern,
    target_slot: u16,
    target_ty: &Type,
    on_success: Label,
    on_failure: Label,
) -> Result<(), CodegenError> {
    match &pattern.kind {
        TypedPatternKind::Wildcard => {
            load_slot(emitter, target_slot, target_ty);
            width_aware_pop(emitter, target_ty)?;
            emitter.emit(Instruction::Goto(on_success));
        }

        TypedPatternKind::Identifier(name) => {
            load_slot(emitter, target_slot, target_ty);
            emitter.pop_shape()?;
            crate::lower::variable::lower_store(emitter, slots, name, target_ty.clone())?;
            emitter.emit(Instruction::Goto(on_success));
        }

        TypedPatternKind::Literal(lit) => {
            lower_literal_test(emitter, target_slot, target_ty, lit, on_failure)?;
            emitter.emit(Instruction::Goto(on_success));
        }

        TypedPatternKind::Constructor { name, subpatterns } => {
            lower_constructor_test(emitter, slots, ctx, name, subpatterns, target_slot, target_ty, on_success, on_failure)?;
        }

        TypedPatternKind::Guard { inner, cond } => {
            let check_label = emitter.fresh_label();
            lower_pattern_test(emitter, slots, ctx, inner, target_slot, target_ty, check_label, on_failure)?;
            emitter.mark_label(check_label);
            (ctx.lower_expr)(emitter, slots, cond)?;
            emitter.pop_shape()?;
            emitter.emit(Instruction::Ifeq(on_failure));
            emitter.emit(Instruction::Goto(on_success));
        }
    }
    Ok(())
}

fn lower_literal_test(
    emitter: &mut MethodEmitter,
    target_slot: u16,
    target_ty: &Type,
    lit: &Literal,
    on_failure: Label,
) -> Result<(), InternalCompilerError> {
    match lit {
        Literal::Int(n) => {
            load_slot(emitter, target_slot, target_ty);
            emitter.emit(Instruction::Iconst(*n as i32));
            emitter.push_shape(StackShape::One);
            emitter.pop_shape()?;
            emitter.pop_shape()?;
            emitter.emit(Instruction::IfIcmpne(on_failure));
        }
        Literal::Boolean(b) => {
            load_slot(emitter, target_slot, target_ty);
            emitter.emit(Instruction::Iconst(if *b { 1 } else { 0 }));
            emitter.push_shape(StackShape::One);
            emitter.pop_shape()?;
            emitter.pop_shape()?;
            emitter.emit(Instruction::IfIcmpne(on_failure));
        }
        Literal::Float(f) => {
            load_slot(emitter, target_slot, target_ty);
            emitter.emit(Instruction::Dconst(*f));
            emitter.push_shape(StackShape::Two);
            emitter.pop_shape()?;
            emitter.pop_shape()?;
            emitter.emit(Instruction::Dcmpl);
            emitter.push_shape(StackShape::One);
            emitter.pop_shape()?;
            emitter.emit(Instruction::Ifne(on_failure));
        }
        Literal::Str(s) => {
            load_slot(emitter, target_slot, target_ty);
            emitter.emit(Instruction::Ldc(Constant::String(s.clone())));
            emitter.push_shape(StackShape::One);
            emitter.pop_shape()?;
            emitter.pop_shape()?;
            emitter.emit(Instruction::Invokevirtual {
                owner: "java/lang/String".to_string(),
                name: "equals".to_string(),
                descriptor: "(Ljava/lang/Object;)Z".to_string(),
            });
            emitter.push_shape(StackShape::One);
            emitter.pop_shape()?;
            emitter.emit(Instruction::Ifeq(on_failure));
        }
        Literal::Null => {
            load_slot(emitter, target_slot, target_ty);
            emitter.pop_shape()?;
            emitter.emit(Instruction::Ifnonnull(on_failure));
        }
        Literal::List(_) | Literal::Map(_) | Literal::Tuple(_) => {
            return Err(InternalCompilerError {
                message: "collection literal patterns are not part of the compiled match protocol".to_string(),
            });
        }
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn lower_constructor_test(
    emitter: &mut MethodEmitter,
    slots: &mut SlotMap,
    ctx: &mut PatternContext,
    name: &str,
    subpatterns: &[TypedPattern],
    target_slot: u16,
    target_ty: &Type,
    on_success: Label,
    on_failure: Label,
) -> Result<(), CodegenError> {
    let layout = ctx.registry.layout_for_constructor(name).ok_or_else(|| InternalCompilerError {
        message: format!("constructor pattern `{name}` has no registered variant layout"),
    })?;
    let variant = layout.variant(name).expect("layout_for_constructor guarantees the variant exists");
    let class_name = layout.variant_class_name(name);

    load_slot(emitter, target_slot, target_ty);
    emitter.emit(Instruction::Instanceof(class_name.clone()));
    emitter.pop_shape()?;
    emitter.push_shape(StackShape::One);
    emitter.pop_shape()?;
    emitter.emit(Instruction::Ifeq(on_failure));

    if subpatterns.is_empty() {
        emitter.emit(Instruction::Goto(on_success));
        return Ok(());
    }

    load_slot(emitter, target_slot, target_ty);
    emitter.pop_shape()?;
    emitter.emit(Instruction::Checkcast(class_name.clone()));
    emitter.push_shape(StackShape::One);
    let cast_slot = crate::lower::variable::lower_store(
        emitter,
        slots,
        &format!("$cast_{}_{}", name, target_slot),
        Type::Named(class_name.clone()),
    )?;

    // Chain each subpattern's test; the last one's success is this
    // constructor test's overall success.
    let mut chain_labels: Vec<Label> = (0..subpatterns.len() - 1).map(|_| emitter.fresh_label()).collect();
    chain_labels.push(on_success);

    for (i, sub) in subpatterns.iter().enumerate() {
        let declared_field_ty = &variant.field_types[i];
        let accessor_descriptor = field_descriptor(declared_field_ty);

        load_slot(emitter, cast_slot, &Type::Named(class_name.clone()));
        emitter.pop_shape()?;
        emitter.emit(Instruction::Invokevirtual {
            owner: class_name.clone(),
            name: format!("getField_{}", i + 1),
            descriptor: format!("(){accessor_descriptor}"),
        });
        let accessor_shape: StackShape = if accessor_descriptor == "D" || accessor_descriptor == "J" {
            StackShape::Two
        } else {
            StackShape::One
        };
        emitter.push_shape(accessor_shape);

        let field_slot_ty = if matches!(declared_field_ty, Type::Var(_)) {
            // Generic boundary: erased to Object. Unbox/downcast before
            // storing, per §4.4's generic-boundary handling.
            unbox_generic_boundary(emitter, &sub.ty)?;
            sub.ty.clone()
        } else {
            declared_field_ty.clone()
        };

        let field_slot = crate::lower::variable::lower_store(
            emitter,
            slots,
            &format!("$field_{}_{}_{}", name, target_slot, i),
            field_slot_ty.clone(),
        )?;

        lower_pattern_test(emitter, slots, ctx, sub, field_slot, &field_slot_ty, chain_labels[i], on_failure)?;
        if i + 1 < subpatterns.len() {
            emitter.mark_label(chain_labels[i]);
        }
    }

    Ok(())
}

/// Step (a)-(d) of §4.4's "Generic boundary handling": the accessor has
/// already pushed an `Object`; convert it to `resolved_ty`'s concrete
/// shape before anything downstream tries to use it as that type.
fn unbox_generic_boundary(emitter: &mut MethodEmitter, resolved_ty: &Type) -> Result<(), InternalCompilerError> {
    emitter.assert_top(StackShape::One)?;
    match boxed_wrapper(resolved_ty) {
        Some((wrapper, unbox_method)) => {
            emitter.emit(Instruction::Checkcast(wrapper.to_string()));
            let unboxed_descriptor = match resolved_ty {
                Type::Primitive(PrimitiveName::Double) => "()D",
                Type::Primitive(PrimitiveName::Long) => "()J",
                Type::Primitive(PrimitiveName::Float) => "()F",
                Type::Primitive(PrimitiveName::Boolean) => "()Z",
                Type::Primitive(PrimitiveName::Char) => "()C",
                _ => "()I",
            };
            emitter.emit(Instruction::Invokevirtual {
                owner: wrapper.to_string(),
                name: unbox_method.to_string(),
                descriptor: unboxed_descriptor.to_string(),
            });
            emitter.pop_shape()?;
            let shape: StackShape = width_of(resolved_ty).into();
            emitter.push_shape(shape);
        }
        None => {
            // Reference type: narrow via checkcast, still a single slot.
            if let Type::Named(name) | Type::Generic(name, _) = resolved_ty {
                emitter.emit(Instruction::Checkcast(internal_name(name)));
            }
        }
    }
    Ok(())
}

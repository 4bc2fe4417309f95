//! Compiles a type-checked TaylorLang program to JVM class files.
//!
//! [`compile_program`] is the entry point a driver (out of this crate's
//! scope) calls with the outputs of `taylor_infer::infer_program`: the
//! original `Program` (for its `TypeDecl`s, which `UnionRegistry` needs)
//! and the corresponding `TypedProgram`. It wires together, in order:
//! union-type layout registration, per-`FunctionDecl` method lowering via
//! `expr::lower_expr`, the class shapes §6 names for declared union types,
//! and `backend::emit_class_file` for final serialization.

pub mod backend;
pub mod class_synth;
pub mod classdef;
pub mod descriptor;
pub mod emitter;
pub mod error;
pub mod exhaustiveness;
pub mod expr;
pub mod instr;
pub mod lower;
pub mod match_lower;
pub mod slot;
pub mod union_layout;

use taylor_ast::Program;
use taylor_infer::{TypedProgram, TypedStatement};
use taylor_types::{Type, TypeVarFactory};

use crate::classdef::{jvm_local_type, ClassDef, JvmLocalType, MethodDef};
use crate::emitter::MethodEmitter;
use crate::error::CodegenError;
use crate::expr::{lower_expr, LowerCtx};
use crate::slot::SlotMap;
use crate::union_layout::UnionRegistry;

/// A compiled unit: every emitted class's JVM internal name paired with
/// its serialized bytes, ready to be written out by the driver.
pub struct CompiledUnit {
    pub classes: Vec<(String, Vec<u8>)>,
}

/// Compiles every top-level `FunctionDecl` in `typed_program` into static
/// methods of a synthesized `entry_class`, plus one class family per
/// declared union type in `ast_program`.
///
/// The first error encountered -- a `NonExhaustiveMatch` or an
/// `InternalCompilerError` from any function -- aborts the unit; per §7,
/// neither kind is accumulated past the lowerer the way collector/solver
/// errors are.
pub fn compile_program(
    ast_program: &Program,
    typed_program: &TypedProgram,
    factory: &TypeVarFactory,
    entry_class: &str,
) -> Result<CompiledUnit, CodegenError> {
    let registry = UnionRegistry::build(&ast_program.statements, factory);
    let ctx = LowerCtx { registry: &registry, entry_class };

    let mut entry_methods = Vec::new();
    for stmt in &typed_program.statements {
        if let TypedStatement::FunctionDecl { name, params, return_ty, body } = stmt {
            entry_methods.push(lower_function(&ctx, name, params, return_ty, body)?);
        }
    }

    let mut classes = class_synth::synthesize_union_classes(&registry);
    classes.push(ClassDef {
        internal_name: entry_class.to_string(),
        super_class: "java/lang/Object".to_string(),
        is_abstract: false,
        fields: Vec::new(),
        methods: entry_methods,
    });

    let mut out = Vec::with_capacity(classes.len());
    for class in &classes {
        let bytes = backend::emit_class_file(class)?;
        out.push((class.internal_name.clone(), bytes));
    }
    Ok(CompiledUnit { classes: out })
}

fn lower_function(
    ctx: &LowerCtx,
    name: &str,
    params: &[taylor_infer::TypedParam],
    return_ty: &Type,
    body: &taylor_infer::TypedExpr,
) -> Result<MethodDef, CodegenError> {
    let mut emitter = MethodEmitter::new();
    let mut slots = SlotMap::new();
    for p in params {
        slots.bind(p.name.clone(), p.ty.clone());
    }

    lower_expr(&mut emitter, &mut slots, ctx, body)?;
    emitter.emit(return_instruction(return_ty));

    // Every local beyond the parameters (targetSlot/resultSlot, pattern
    // bindings) is default-initialized up front, before any branch. That
    // gives every jump target in the method the same, single static
    // locals layout -- the full one below -- so `backend` can synthesize
    // one `StackMapTable` frame shape per jump target without a real
    // per-path liveness analysis.
    let layout = slots.layout();
    let local_types: Vec<JvmLocalType> = layout.iter().map(|(_, ty)| jvm_local_type(ty)).collect();
    let mut instructions = default_init_prologue(&layout[params.len()..]);
    instructions.extend(emitter.into_instructions());

    let param_types: Vec<Type> = params.iter().map(|p| p.ty.clone()).collect();
    Ok(MethodDef {
        name: name.to_string(),
        descriptor: descriptor::method_descriptor(&param_types, return_ty),
        is_static: true,
        max_locals: slots.locals_count(),
        instructions,
        exception_handlers: emitter.exception_handlers().to_vec(),
        local_types,
    })
}

/// Stores a default value (`0`, `0L`, `0.0`, or `null`) into every slot in
/// `locals`, matching each slot's declared width. Run once at method
/// entry so no local is ever "not yet assigned" at a jump target.
fn default_init_prologue(locals: &[(u16, Type)]) -> Vec<instr::Instruction> {
    use instr::Instruction;
    let mut out = Vec::with_capacity(locals.len() * 2);
    for (index, ty) in locals {
        match jvm_local_type(ty) {
            JvmLocalType::Int => {
                out.push(Instruction::Iconst(0));
                out.push(Instruction::Istore(*index));
            }
            JvmLocalType::Long => {
                out.push(Instruction::Lconst(0));
                out.push(Instruction::Lstore(*index));
            }
            JvmLocalType::Float | JvmLocalType::Double => {
                out.push(Instruction::Dconst(0.0));
                out.push(Instruction::Dstore(*index));
            }
            JvmLocalType::Reference => {
                out.push(Instruction::AconstNull);
                out.push(Instruction::Astore(*index));
            }
        }
    }
    out
}

/// A function whose return type is `Unit` never pushes a value (every
/// sub-lowerer that produces one skips `push_shape` for `Unit`, see
/// `lower::call::lower_call`), so its final instruction is a bare `return`
/// rather than popping and discarding something.
fn return_instruction(ty: &Type) -> instr::Instruction {
    use instr::Instruction;
    use taylor_types::PrimitiveName;
    match ty {
        Type::Primitive(PrimitiveName::Unit) => Instruction::Return,
        Type::Primitive(PrimitiveName::Long) => Instruction::Lreturn,
        Type::Primitive(PrimitiveName::Double) | Type::Primitive(PrimitiveName::Float) => Instruction::Dreturn,
        Type::Primitive(PrimitiveName::Int) | Type::Primitive(PrimitiveName::Boolean) | Type::Primitive(PrimitiveName::Char) => {
            Instruction::Ireturn
        }
        _ => Instruction::Areturn,
    }
}

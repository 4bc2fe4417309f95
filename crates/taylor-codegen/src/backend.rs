//! The one module allowed to know `ristretto_classfile`'s actual API.
//!
//! Every other module in this crate works against the local `Instruction`/
//! `Label`/`ClassDef` IR; this module's only job is translating that IR
//! into an on-disk `.class` file. Isolating the translation here means a
//! future `ristretto_classfile` upgrade touches one file, not the whole
//! lowerer.

use std::collections::{BTreeMap, HashMap};

use ristretto_classfile::attributes::{Attribute, ExceptionTableEntry, Instruction as JvmInstr, StackFrame, VerificationType};
use ristretto_classfile::{ClassAccessFlags, ClassFile, ConstantPool, FieldAccessFlags, MethodAccessFlags, Version};

use crate::classdef::{ClassDef, FieldDef, JvmLocalType, MethodDef};
use crate::emitter::{ExceptionHandler, InternalCompilerError};
use crate::instr::{Constant, Instruction, Label};

/// Resolves every `Label` in `instructions` to a byte offset and lowers
/// the local `Instruction` vocabulary into `ristretto_classfile`'s Code
/// attribute instruction stream plus its exception table.
fn lower_instructions(
    instructions: &[Instruction],
    pool: &mut ConstantPool,
) -> Result<(Vec<JvmInstr>, HashMap<Label, u16>), InternalCompilerError> {
    let mut offsets = HashMap::new();
    let mut out = Vec::with_capacity(instructions.len());

    for instr in instructions {
        if let Instruction::Label(label) = instr {
            offsets.insert(*label, out.len() as u16);
            continue;
        }
        out.push(lower_one(instr, pool)?);
    }
    Ok((out, offsets))
}

fn lower_one(instr: &Instruction, pool: &mut ConstantPool) -> Result<JvmInstr, InternalCompilerError> {
    use Instruction as I;
    let jvm = match instr {
        I::Iconst(n) => JvmInstr::Ldc(pool.add_integer(*n).map_err(pool_err)?),
        I::Lconst(n) => JvmInstr::Ldc2W(pool.add_long(*n).map_err(pool_err)?),
        I::Dconst(f) => JvmInstr::Ldc2W(pool.add_double(*f).map_err(pool_err)?),
        I::Ldc(Constant::String(s)) => JvmInstr::Ldc(pool.add_string(s).map_err(pool_err)?),
        I::AconstNull => JvmInstr::Aconst_null,

        I::Iload(i) => JvmInstr::Iload(*i as u8),
        I::Lload(i) => JvmInstr::Lload(*i as u8),
        I::Dload(i) => JvmInstr::Dload(*i as u8),
        I::Aload(i) => JvmInstr::Aload(*i as u8),
        I::Istore(i) => JvmInstr::Istore(*i as u8),
        I::Lstore(i) => JvmInstr::Lstore(*i as u8),
        I::Dstore(i) => JvmInstr::Dstore(*i as u8),
        I::Astore(i) => JvmInstr::Astore(*i as u8),

        I::Pop => JvmInstr::Pop,
        I::Pop2 => JvmInstr::Pop2,
        I::Dup => JvmInstr::Dup,
        I::Dup2 => JvmInstr::Dup2,

        I::Iadd => JvmInstr::Iadd,
        I::Isub => JvmInstr::Isub,
        I::Imul => JvmInstr::Imul,
        I::Idiv => JvmInstr::Idiv,
        I::Irem => JvmInstr::Irem,
        I::Dadd => JvmInstr::Dadd,
        I::Dsub => JvmInstr::Dsub,
        I::Dmul => JvmInstr::Dmul,
        I::Ddiv => JvmInstr::Ddiv,
        I::Drem => JvmInstr::Drem,
        I::Ineg => JvmInstr::Ineg,
        I::Dneg => JvmInstr::Dneg,

        I::I2d => JvmInstr::I2d,
        I::D2i => JvmInstr::D2i,

        I::Dcmpl => JvmInstr::Dcmpl,
        I::IfIcmpeq(l) => JvmInstr::If_icmpeq(placeholder(*l)),
        I::IfIcmpne(l) => JvmInstr::If_icmpne(placeholder(*l)),
        I::IfIcmplt(l) => JvmInstr::If_icmplt(placeholder(*l)),
        I::IfIcmple(l) => JvmInstr::If_icmple(placeholder(*l)),
        I::IfIcmpgt(l) => JvmInstr::If_icmpgt(placeholder(*l)),
        I::IfIcmpge(l) => JvmInstr::If_icmpge(placeholder(*l)),
        I::Ifeq(l) => JvmInstr::Ifeq(placeholder(*l)),
        I::Ifne(l) => JvmInstr::Ifne(placeholder(*l)),
        I::Ifnull(l) => JvmInstr::Ifnull(placeholder(*l)),
        I::Ifnonnull(l) => JvmInstr::Ifnonnull(placeholder(*l)),
        I::Goto(l) => JvmInstr::Goto(placeholder(*l)),

        I::New(class) => JvmInstr::New(pool.add_class(class).map_err(pool_err)?),
        I::Checkcast(class) => JvmInstr::Checkcast(pool.add_class(class).map_err(pool_err)?),
        I::Instanceof(class) => JvmInstr::Instanceof(pool.add_class(class).map_err(pool_err)?),
        I::Invokevirtual { owner, name, descriptor } => {
            JvmInstr::Invokevirtual(pool.add_method_ref(owner, name, descriptor).map_err(pool_err)?)
        }
        I::Invokespecial { owner, name, descriptor } => {
            JvmInstr::Invokespecial(pool.add_method_ref(owner, name, descriptor).map_err(pool_err)?)
        }
        I::Invokestatic { owner, name, descriptor } => {
            JvmInstr::Invokestatic(pool.add_method_ref(owner, name, descriptor).map_err(pool_err)?)
        }
        I::Getfield { owner, name, descriptor } => {
            JvmInstr::Getfield(pool.add_field_ref(owner, name, descriptor).map_err(pool_err)?)
        }
        I::Putfield { owner, name, descriptor } => {
            JvmInstr::Putfield(pool.add_field_ref(owner, name, descriptor).map_err(pool_err)?)
        }
        I::Athrow => JvmInstr::Athrow,

        I::Ireturn => JvmInstr::Ireturn,
        I::Lreturn => JvmInstr::Lreturn,
        I::Dreturn => JvmInstr::Dreturn,
        I::Areturn => JvmInstr::Areturn,
        I::Return => JvmInstr::Return,

        I::Label(_) => unreachable!("labels are stripped before lower_one is called"),
    };
    Ok(jvm)
}

/// Jump offsets are encoded relative to the *jump instruction's own*
/// bytecode index, which isn't known until the whole stream has been laid
/// out; `placeholder` emits `0` and [`patch_jumps`] rewrites every branch
/// target afterward, once instruction offsets are final.
fn placeholder(_label: Label) -> i16 {
    0
}

fn pool_err(e: impl std::fmt::Display) -> InternalCompilerError {
    InternalCompilerError { message: format!("constant pool: {e}") }
}

/// A second pass over the lowered stream: every branch instruction was
/// emitted with a `0` placeholder offset above because the target's own
/// position wasn't known yet. Now that `label_offsets` is complete,
/// rewrite each placeholder to the real relative offset.
fn patch_jumps(
    instructions: &mut [JvmInstr],
    original: &[Instruction],
    label_offsets: &HashMap<Label, u16>,
) -> Result<(), InternalCompilerError> {
    let mut index = 0usize;
    for instr in original {
        if matches!(instr, Instruction::Label(_)) {
            continue;
        }
        let target_label = jump_target(instr);
        if let Some(label) = target_label {
            let target = *label_offsets.get(&label).ok_or_else(|| InternalCompilerError {
                message: format!("jump to unmarked label {label:?}"),
            })?;
            let relative = target as i32 - index as i32;
            let relative: i16 = relative.try_into().map_err(|_| InternalCompilerError {
                message: "branch offset exceeds i16 range".to_string(),
            })?;
            set_jump_offset(&mut instructions[index], relative);
        }
        index += 1;
    }
    Ok(())
}

fn jump_target(instr: &Instruction) -> Option<Label> {
    use Instruction as I;
    match instr {
        I::IfIcmpeq(l)
        | I::IfIcmpne(l)
        | I::IfIcmplt(l)
        | I::IfIcmple(l)
        | I::IfIcmpgt(l)
        | I::IfIcmpge(l)
        | I::Ifeq(l)
        | I::Ifne(l)
        | I::Ifnull(l)
        | I::Ifnonnull(l)
        | I::Goto(l) => Some(*l),
        _ => None,
    }
}

fn set_jump_offset(instr: &mut JvmInstr, offset: i16) {
    use JvmInstr as J;
    match instr {
        J::If_icmpeq(o)
        | J::If_icmpne(o)
        | J::If_icmplt(o)
        | J::If_icmple(o)
        | J::If_icmpgt(o)
        | J::If_icmpge(o)
        | J::Ifeq(o)
        | J::Ifne(o)
        | J::Ifnull(o)
        | J::Ifnonnull(o)
        | J::Goto(o) => *o = offset,
        _ => unreachable!("set_jump_offset only called on branch instructions"),
    }
}

/// Every local beyond a method's parameters is default-initialized before
/// any branch runs (see `crate::lib::default_init_prologue`), so the set
/// of assigned locals never varies by incoming edge -- one static
/// `locals` list, taken from `def.local_types`, covers every frame in the
/// method. That turns frame synthesis into "one frame per jump target /
/// exception handler, same locals, stack empty or (for a handler) the
/// caught exception" rather than a real per-path liveness merge.
fn stack_map_frames(
    original: &[Instruction],
    offsets: &HashMap<Label, u16>,
    exception_handlers: &[ExceptionHandler],
    local_types: &[JvmLocalType],
    pool: &mut ConstantPool,
) -> Result<Vec<StackFrame>, InternalCompilerError> {
    let object_class = pool.add_class("java/lang/Object").map_err(pool_err)?;
    let locals: Vec<VerificationType> = local_types.iter().map(|t| verification_type_for_local(*t, object_class)).collect();

    let mut targets: BTreeMap<u16, Vec<VerificationType>> = BTreeMap::new();

    for instr in original {
        if let Some(label) = jump_target(instr) {
            let offset = resolve_offset(label, offsets)?;
            targets.entry(offset).or_default();
        }
    }

    for handler in exception_handlers {
        let offset = resolve_offset(handler.handler, offsets)?;
        let catch_class = match &handler.catch_type {
            Some(name) => pool.add_class(name).map_err(pool_err)?,
            None => pool.add_class("java/lang/Throwable").map_err(pool_err)?,
        };
        targets.insert(offset, vec![VerificationType::Object { cpool_index: catch_class }]);
    }

    let mut frames = Vec::with_capacity(targets.len());
    let mut previous_offset: i32 = -1;
    for (offset, stack) in targets {
        let offset_delta = (offset as i32 - previous_offset - 1) as u16;
        frames.push(StackFrame::FullFrame { frame_type: 255, offset_delta, locals: locals.clone(), stack });
        previous_offset = offset as i32;
    }
    Ok(frames)
}

fn verification_type_for_local(local: JvmLocalType, object_class: u16) -> VerificationType {
    match local {
        JvmLocalType::Int => VerificationType::Integer,
        JvmLocalType::Long => VerificationType::Long,
        JvmLocalType::Float => VerificationType::Float,
        JvmLocalType::Double => VerificationType::Double,
        JvmLocalType::Reference => VerificationType::Object { cpool_index: object_class },
    }
}

fn resolve_offset(label: Label, offsets: &HashMap<Label, u16>) -> Result<u16, InternalCompilerError> {
    offsets
        .get(&label)
        .copied()
        .ok_or_else(|| InternalCompilerError { message: format!("jump to unmarked label {label:?}") })
}

fn lower_method(def: &MethodDef, pool: &mut ConstantPool) -> Result<ristretto_classfile::Method, InternalCompilerError> {
    let (mut code, offsets) = lower_instructions(&def.instructions, pool)?;
    patch_jumps(&mut code, &def.instructions, &offsets)?;

    let exception_table = def
        .exception_handlers
        .iter()
        .map(|h| lower_exception_handler(h, &offsets, pool))
        .collect::<Result<Vec<_>, _>>()?;

    let mut access_flags = MethodAccessFlags::PUBLIC;
    if def.is_static {
        access_flags |= MethodAccessFlags::STATIC;
    }

    let frames = stack_map_frames(&def.instructions, &offsets, &def.exception_handlers, &def.local_types, pool)?;
    let mut code_attributes = Vec::new();
    if !frames.is_empty() {
        code_attributes.push(Attribute::StackMapTable {
            name_index: pool.add_utf8("StackMapTable").map_err(pool_err)?,
            frames,
        });
    }

    let code_attribute = Attribute::Code {
        name_index: pool.add_utf8("Code").map_err(pool_err)?,
        max_stack: 64,
        max_locals: def.max_locals,
        code,
        exception_table,
        attributes: code_attributes,
    };

    Ok(ristretto_classfile::Method {
        access_flags,
        name_index: pool.add_utf8(&def.name).map_err(pool_err)?,
        descriptor_index: pool.add_utf8(&def.descriptor).map_err(pool_err)?,
        attributes: vec![code_attribute],
    })
}

fn lower_exception_handler(
    h: &ExceptionHandler,
    offsets: &HashMap<Label, u16>,
    pool: &mut ConstantPool,
) -> Result<ExceptionTableEntry, InternalCompilerError> {
    let resolve = |l: Label| {
        offsets.get(&l).copied().ok_or_else(|| InternalCompilerError {
            message: format!("exception handler references unmarked label {l:?}"),
        })
    };
    let catch_type = match &h.catch_type {
        Some(name) => pool.add_class(name).map_err(pool_err)?,
        None => 0,
    };
    Ok(ExceptionTableEntry {
        range_pc: resolve(h.start)?,
        range_pc_end: resolve(h.end)?,
        handler_pc: resolve(h.handler)?,
        catch_type,
    })
}

fn lower_field(def: &FieldDef, pool: &mut ConstantPool) -> Result<ristretto_classfile::Field, InternalCompilerError> {
    Ok(ristretto_classfile::Field {
        access_flags: FieldAccessFlags::PUBLIC | FieldAccessFlags::FINAL,
        name_index: pool.add_utf8(&def.name).map_err(pool_err)?,
        descriptor_index: pool.add_utf8(&def.descriptor).map_err(pool_err)?,
        attributes: Vec::new(),
    })
}

/// Serializes one `ClassDef` to a `.class` file's bytes.
pub fn emit_class_file(def: &ClassDef) -> Result<Vec<u8>, InternalCompilerError> {
    let mut pool = ConstantPool::new();

    let this_class = pool.add_class(&def.internal_name).map_err(pool_err)?;
    let super_class = pool.add_class(&def.super_class).map_err(pool_err)?;

    let mut access_flags = ClassAccessFlags::PUBLIC | ClassAccessFlags::SUPER;
    if def.is_abstract {
        access_flags |= ClassAccessFlags::ABSTRACT;
    }

    let fields = def.fields.iter().map(|f| lower_field(f, &mut pool)).collect::<Result<Vec<_>, _>>()?;
    let methods = def.methods.iter().map(|m| lower_method(m, &mut pool)).collect::<Result<Vec<_>, _>>()?;

    let class_file = ClassFile {
        version: Version::Java8 { minor: 0 },
        constant_pool: pool,
        access_flags,
        this_class,
        super_class,
        interfaces: Vec::new(),
        fields,
        methods,
        attributes: Vec::new(),
    };

    let mut bytes = Vec::new();
    class_file.to_bytes(&mut bytes).map_err(|e| InternalCompilerError { message: format!("class file serialization: {e}") })?;
    Ok(bytes)
}

//! The bytecode-level instruction vocabulary the lowerer emits against.
//!
//! This is deliberately a small IR rather than a direct wrapper around
//! `ristretto_classfile`'s instruction type: the lowerer's logic (label
//! patching, width-aware store/pop, stack bookkeeping) is independent of
//! exactly how the backend serializes an opcode, and keeping it separate
//! lets [`crate::backend`] own the one place that has to match
//! `ristretto_classfile`'s actual API.

#[derive(Clone, Debug, PartialEq)]
pub enum Instruction {
    // -- constants --
    Iconst(i32),
    Lconst(i64),
    Dconst(f64),
    Ldc(Constant),
    AconstNull,

    // -- locals --
    Iload(u16),
    Lload(u16),
    Dload(u16),
    Aload(u16),
    Istore(u16),
    Lstore(u16),
    Dstore(u16),
    Astore(u16),

    // -- stack --
    Pop,
    Pop2,
    Dup,

    // -- arithmetic --
    Iadd,
    Isub,
    Imul,
    Idiv,
    Irem,
    Dadd,
    Dsub,
    Dmul,
    Ddiv,
    Drem,
    Ineg,
    Dneg,

    // -- conversions --
    I2d,
    D2i,

    // -- comparison / control flow --
    Dcmpl,
    IfIcmpeq(Label),
    IfIcmpne(Label),
    IfIcmplt(Label),
    IfIcmple(Label),
    IfIcmpgt(Label),
    IfIcmpge(Label),
    Ifeq(Label),
    Ifne(Label),
    Ifnull(Label),
    Ifnonnull(Label),
    Goto(Label),

    // -- objects --
    New(String),
    Dup2,
    Checkcast(String),
    Instanceof(String),
    Invokevirtual { owner: String, name: String, descriptor: String },
    Invokespecial { owner: String, name: String, descriptor: String },
    Invokestatic { owner: String, name: String, descriptor: String },
    Getfield { owner: String, name: String, descriptor: String },
    Putfield { owner: String, name: String, descriptor: String },
    Athrow,

    // -- returns --
    Ireturn,
    Lreturn,
    Dreturn,
    Areturn,
    Return,

    /// A label definition site. Carries no stack effect; purely a patch target.
    Label(Label),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Constant {
    String(String),
}

/// An opaque jump target, allocated in program order by
/// [`crate::emitter::MethodEmitter::fresh_label`] and resolved to a byte
/// offset only when the method is finalized.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Label(pub u32);

//! Per-method mutable emission state: the instruction stream, label
//! allocation, and a running operand-stack-shape assertion layer.
//!
//! Per §5 of the governing spec, a `MethodEmitter` is owned by exactly one
//! method's lowering and discarded on completion -- nothing here is shared
//! across methods or threads.

use crate::instr::{Instruction, Label};
use crate::slot::Width;

/// A lightweight description of one operand-stack entry, used only for the
/// assertion layer below -- never serialized.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StackShape {
    One,
    Two,
}

impl From<Width> for StackShape {
    fn from(w: Width) -> Self {
        match w {
            Width::One => StackShape::One,
            Width::Two => StackShape::Two,
        }
    }
}

/// Emitted when the lowerer's own bookkeeping detects a stack-shape
/// violation before the JVM verifier ever sees the class file. Per §7 this
/// is always fatal and never retried.
#[derive(Debug, Clone)]
pub struct InternalCompilerError {
    pub message: String,
}

impl std::fmt::Display for InternalCompilerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "internal compiler error: {}", self.message)
    }
}
impl std::error::Error for InternalCompilerError {}

/// One entry of the method's exception table: bytecode in `[start, end)`
/// whose thrown `catch_type` (or any `Throwable` if `None`) is handled
/// starting at `handler`.
#[derive(Clone, Debug)]
pub struct ExceptionHandler {
    pub start: Label,
    pub end: Label,
    pub handler: Label,
    pub catch_type: Option<String>,
}

#[derive(Debug, Default)]
pub struct MethodEmitter {
    instructions: Vec<Instruction>,
    next_label: u32,
    /// Simulated operand stack, narrowest possible model: just widths, in
    /// push order. Used only to catch shape bugs in this crate, not to
    /// compute real JVM stack-map frames (the backend's frame-computation
    /// mode owns that).
    shape_stack: Vec<StackShape>,
    exception_handlers: Vec<ExceptionHandler>,
}

impl MethodEmitter {
    pub fn new() -> Self {
        MethodEmitter { instructions: Vec::new(), next_label: 0, shape_stack: Vec::new(), exception_handlers: Vec::new() }
    }

    pub fn add_exception_handler(&mut self, handler: ExceptionHandler) {
        self.exception_handlers.push(handler);
    }

    pub fn exception_handlers(&self) -> &[ExceptionHandler] {
        &self.exception_handlers
    }

    pub fn fresh_label(&mut self) -> Label {
        let id = self.next_label;
        self.next_label += 1;
        Label(id)
    }

    pub fn emit(&mut self, instr: Instruction) {
        self.instructions.push(instr);
    }

    /// Marks the definition site of `label`. The spec's step 5c warns that
    /// the *final* failure label of a match must be visited only after
    /// every case's test has been emitted -- callers are responsible for
    /// ordering calls to this method accordingly; the emitter itself just
    /// records the site.
    pub fn mark_label(&mut self, label: Label) {
        self.instructions.push(Instruction::Label(label));
    }

    pub fn push_shape(&mut self, shape: StackShape) {
        self.shape_stack.push(shape);
    }

    pub fn pop_shape(&mut self) -> Result<StackShape, InternalCompilerError> {
        self.shape_stack.pop().ok_or_else(|| InternalCompilerError {
            message: "popped an empty simulated operand stack".to_string(),
        })
    }

    /// Asserts the simulated stack is exactly `expected`, from bottom to
    /// top. Called at label merge points and after pattern compilation per
    /// the spec's "assertion layer" requirement.
    pub fn assert_shape(&self, expected: &[StackShape]) -> Result<(), InternalCompilerError> {
        if self.shape_stack != expected {
            return Err(InternalCompilerError {
                message: format!(
                    "operand stack shape mismatch: expected {expected:?}, found {:?}",
                    self.shape_stack
                ),
            });
        }
        Ok(())
    }

    pub fn assert_empty(&self) -> Result<(), InternalCompilerError> {
        self.assert_shape(&[])
    }

    /// Asserts the topmost simulated stack entry has the given shape --
    /// used right after a sub-lowerer pushes a value, to catch a
    /// width/shape mismatch as close to its source as possible.
    pub fn assert_top(&self, shape: StackShape) -> Result<(), InternalCompilerError> {
        match self.shape_stack.last() {
            Some(top) if *top == shape => Ok(()),
            Some(top) => Err(InternalCompilerError {
                message: format!("expected top-of-stack shape {shape:?}, found {top:?}"),
            }),
            None => Err(InternalCompilerError { message: "expected a non-empty operand stack".to_string() }),
        }
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn into_instructions(self) -> Vec<Instruction> {
        self.instructions
    }
}

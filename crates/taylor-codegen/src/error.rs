//! Crate-wide error type, covering the two lowerer-originated entries of
//! §7's taxonomy: `NonExhaustiveMatch` (fails the unit, but is not a
//! compiler bug) and `InternalCompilerError` (a bytecode-invariant
//! violation, always fatal).

use taylor_ast::Span;

use crate::emitter::InternalCompilerError;

#[derive(Debug)]
pub enum CodegenError {
    NonExhaustiveMatch { missing_variants: Vec<String>, location: Span },
    Internal(InternalCompilerError),
}

impl From<InternalCompilerError> for CodegenError {
    fn from(e: InternalCompilerError) -> Self {
        CodegenError::Internal(e)
    }
}

impl std::fmt::Display for CodegenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CodegenError::NonExhaustiveMatch { missing_variants, location } => {
                write!(f, "non-exhaustive match at {location:?}: missing variant(s) {missing_variants:?}")
            }
            CodegenError::Internal(e) => write!(f, "{e}"),
        }
    }
}
impl std::error::Error for CodegenError {}

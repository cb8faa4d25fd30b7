use crate::ast::{BinaryOp, BuiltinType, UnaryOp};
use staticscript_ir::IrError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodegenError {
    #[error("Undefined function: {0}")]
    UndefinedFunction(String),

    #[error("Argument count mismatch calling {callee}: expected {expected}, found {found}")]
    ArityMismatch {
        callee: String,
        expected: usize,
        found: usize,
    },

    #[error("Unsupported unary operator: {0}")]
    UnsupportedUnaryOperator(UnaryOp),

    #[error("Unsupported binary operator {op} on {ty}")]
    UnsupportedBinaryOperator { op: BinaryOp, ty: BuiltinType },

    #[error("Verification failed in {function}: {reason}")]
    VerificationFailure { function: String, reason: String },

    #[error("IR builder error: {0}")]
    Ir(IrError),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Pass pipeline failed: {0:#}")]
    Pass(anyhow::Error),
}

impl From<IrError> for CodegenError {
    fn from(err: IrError) -> Self {
        match err {
            IrError::Verification { function, reason } => {
                CodegenError::VerificationFailure { function, reason }
            }
            other => CodegenError::Ir(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, CodegenError>;

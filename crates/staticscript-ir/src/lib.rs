/*! Backend IR for the StaticScript compiler.
 *
 * Functions are control-flow graphs of basic blocks over typed values. Blocks are created detached
 * and spliced into a function's layout once something can reach them, so a finished function only
 * contains reachable code. `IrBuilder` is the single build cursor the code generator drives;
 * `verifier` checks the result before any pass pipeline sees it.
 */

pub mod analysis;
pub mod block;
pub mod builder;
pub mod function;
pub mod instructions;
pub mod module;
pub mod types;
pub mod values;
pub mod verifier;

pub use analysis::{ControlFlowGraph, DominatorTree, Pass, PassManager, VerifierPass};
pub use block::{BasicBlock, BlockId, Terminator};
pub use builder::{InstBuilder, IrBuilder, Position};
pub use function::{Function, FunctionBody, FunctionSignature, Linkage, Parameter};
pub use instructions::{Instruction, IntCC};
pub use module::{DataObject, GlobalVariable, Module};
pub use types::Type;
pub use values::{Constant, DataId, GlobalId, ParamId, TempId, Value};
pub use verifier::{verify_function, verify_module};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum IrError {
    #[error("Builder error: {0}")]
    Builder(String),
    #[error("Verification failed in {function}: {reason}")]
    Verification { function: String, reason: String },
}

pub type Result<T> = std::result::Result<T, IrError>;

#[cfg(test)]
mod tests;

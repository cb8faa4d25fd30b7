/*! Control-flow analysis and the pass pipeline.
 *
 * The CFG and dominator tree are computed over a function's laid-out blocks only. The verifier
 * uses both to check that every use of a value is dominated by its definition.
 */

pub mod cfg;
pub mod dominator;
pub mod pass;

pub use cfg::ControlFlowGraph;
pub use dominator::DominatorTree;
pub use pass::{Pass, PassManager, PassStatistics, VerifierPass};

//! Analyses over the IR: CFG, dominance, value definitions, loops.

mod cfg;
mod defs;
mod dominance;
mod loops;

pub use cfg::ControlFlowGraph;
pub use defs::{ValueDef, ValueDefs};
pub use dominance::{DominatorTree, IrreducibleCfgError};
pub use loops::{Loop, LoopForest};

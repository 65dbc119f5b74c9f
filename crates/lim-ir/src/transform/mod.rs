//! IR transformation passes.

pub mod licm;

pub use licm::{invariant_insts, run_function, run_module, LicmStats, LoopStat, PassError};

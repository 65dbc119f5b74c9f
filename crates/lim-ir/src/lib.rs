//! LIM Intermediate Representation (IR).
//!
//! This crate defines the core IR types for the loop optimizer:
//! - Values (SSA value identifiers)
//! - Instructions (iadd, iconst, brif, return, etc.)
//! - Blocks (basic blocks with parameters)
//! - Functions (blocks + layout + data flow graph)
//! - Modules (multi-function programs)
//!
//! plus the analyses (control flow graph, dominator tree, loop forest)
//! and the loop-invariant code motion transform built on top of them.

#![no_std]

extern crate alloc;

mod analysis;
mod block;
mod condcodes;
mod dfg;
mod entity;
mod entity_map;
mod function;
mod layout;
mod module;
mod parser;
mod signature;
mod transform;
mod types;
mod value;
mod verifier;

pub use analysis::{
    ControlFlowGraph, DominatorTree, IrreducibleCfgError, Loop, LoopForest, ValueDef, ValueDefs,
};
pub use block::BlockData;
pub use condcodes::IntCC;
pub use dfg::{BranchTargets, DataFlowGraph, InstData, Opcode};
pub use entity::{Block, EntityRef, Inst};
pub use entity_map::PrimaryMap;
pub use function::Function;
pub use layout::Layout;
pub use module::Module;
pub use parser::{parse_function, parse_module, ParseError};
pub use signature::Signature;
pub use transform::{invariant_insts, run_function, run_module, LicmStats, LoopStat, PassError};
pub use types::Type;
pub use value::Value;
pub use verifier::{verify, verify_module, VerifierError};

//! Value definition lookup.

use alloc::collections::BTreeMap;

use crate::{
    entity::{Block, Inst},
    function::Function,
    value::Value,
};

/// Where a value is defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueDef {
    /// Defined as a parameter of a block.
    Param(Block),
    /// Defined as a result of an instruction.
    Inst(Inst),
}

/// Map from every value in a function to its definition site.
#[derive(Debug, Clone)]
pub struct ValueDefs {
    defs: BTreeMap<Value, ValueDef>,
}

impl ValueDefs {
    /// Scan a function and record the definition of every value.
    ///
    /// Later definitions of an already-seen value are ignored; the
    /// verifier reports those separately.
    pub fn compute(func: &Function) -> Self {
        let mut defs = BTreeMap::new();

        for block in func.blocks() {
            for &param in &func.blocks.get(block).unwrap().params {
                defs.entry(param).or_insert(ValueDef::Param(block));
            }
            for inst in func.block_insts(block) {
                for &result in func.dfg.inst_results(inst) {
                    defs.entry(result).or_insert(ValueDef::Inst(inst));
                }
            }
        }

        Self { defs }
    }

    /// Get the definition of a value, if any.
    pub fn def(&self, value: Value) -> Option<ValueDef> {
        self.defs.get(&value).copied()
    }

    /// Get the block a value is defined in, if it is defined.
    pub fn def_block(&self, func: &Function, value: Value) -> Option<Block> {
        match self.def(value)? {
            ValueDef::Param(block) => Some(block),
            ValueDef::Inst(inst) => func.layout.inst_block(inst),
        }
    }
}

//! Functions.

use alloc::{string::String, vec::Vec};
use core::fmt;

use crate::{
    block::BlockData,
    dfg::{DataFlowGraph, InstData},
    entity::{Block, EntityRef, Inst},
    entity_map::PrimaryMap,
    layout::Layout,
    signature::Signature,
    types::Type,
    value::Value,
};

/// A function in the IR.
///
/// A function consists of:
/// - A signature (parameter and return types)
/// - Block data (block parameters)
/// - Layout (where blocks/instructions are)
/// - DFG (what instructions are)
#[derive(Debug, Clone)]
pub struct Function {
    /// Function signature
    pub signature: Signature,
    /// Function name
    pub name: String,
    /// Block data
    pub blocks: PrimaryMap<Block, BlockData>,
    /// Block and instruction ordering
    pub layout: Layout,
    /// Data flow graph
    pub dfg: DataFlowGraph,
}

impl Function {
    /// Create a new function with the given signature and name.
    pub fn new(signature: Signature, name: String) -> Self {
        Self {
            signature,
            name,
            blocks: PrimaryMap::new(),
            layout: Layout::new(),
            dfg: DataFlowGraph::new(),
        }
    }

    /// Create a new block without parameters.
    ///
    /// The block is registered but not yet placed; use `append_block` or
    /// `Layout::insert_block`.
    pub fn create_block(&mut self) -> Block {
        let block = self.blocks.push(BlockData::new());
        self.layout.ensure_block(block);
        block
    }

    /// Create a new block with the given parameters.
    pub fn create_block_with_params(&mut self, params: Vec<Value>, param_types: Vec<Type>) -> Block {
        let block = self.blocks.push(BlockData::with_params(params, param_types));
        self.layout.ensure_block(block);
        block
    }

    /// Create an instruction in the DFG and register it with the layout.
    pub fn create_inst(&mut self, data: InstData) -> Inst {
        let inst = self.dfg.create_inst(data);
        self.layout.ensure_inst(inst);
        inst
    }

    /// Append a block to the end of the layout.
    pub fn append_block(&mut self, block: Block) {
        self.layout.append_block(block);
    }

    /// Append an instruction to the end of a block.
    pub fn append_inst(&mut self, inst: Inst, block: Block) {
        self.layout.append_inst(inst, block);
    }

    /// Get the entry block (first block in layout order).
    pub fn entry_block(&self) -> Option<Block> {
        self.layout.entry_block()
    }

    /// Get block data.
    pub fn block_data(&self, block: Block) -> Option<&BlockData> {
        self.blocks.get(block)
    }

    /// Number of blocks created in this function.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Iterate over blocks in layout order.
    pub fn blocks(&self) -> impl Iterator<Item = Block> + '_ {
        self.layout.blocks()
    }

    /// Iterate over the instructions of a block in order.
    pub fn block_insts(&self, block: Block) -> impl Iterator<Item = Inst> + '_ {
        self.layout.block_insts(block)
    }

    /// The lowest value index not yet used by any parameter, argument or
    /// result. Transforms mint fresh values from here.
    pub fn next_value_index(&self) -> u32 {
        let mut max: Option<u32> = None;
        let mut see = |v: Value| {
            let idx = EntityRef::index(v) as u32;
            max = Some(match max {
                Some(m) if m >= idx => m,
                _ => idx,
            });
        };
        for data in self.blocks.values() {
            for &param in &data.params {
                see(param);
            }
        }
        for data in self.dfg.insts.values() {
            for &arg in &data.args {
                see(arg);
            }
            for &result in &data.results {
                see(result);
            }
        }
        match max {
            Some(m) => m + 1,
            None => 0,
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "function %{}(", self.name)?;
        for (i, param_ty) in self.signature.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", param_ty)?;
        }
        write!(f, ")")?;

        if !self.signature.returns.is_empty() {
            write!(f, " -> ")?;
            for (i, ret_ty) in self.signature.returns.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", ret_ty)?;
            }
        }
        writeln!(f, " {{")?;

        for (printed, block) in self.blocks().enumerate() {
            if printed > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", block)?;
            if let Some(data) = self.block_data(block) {
                if !data.params.is_empty() {
                    write!(f, "(")?;
                    for (i, (param, ty)) in
                        data.params.iter().zip(data.param_types.iter()).enumerate()
                    {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{}: {}", param, ty)?;
                    }
                    write!(f, ")")?;
                }
            }
            writeln!(f, ":")?;

            for inst in self.block_insts(block) {
                if let Some(data) = self.dfg.inst_data(inst) {
                    writeln!(f, "    {}", data)?;
                }
            }
        }

        writeln!(f, "}}")?;
        Ok(())
    }
}

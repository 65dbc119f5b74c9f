//! Data flow graph (instruction data).

use crate::{entity::Inst, entity_map::PrimaryMap, value::Value};

pub mod inst_data;
pub mod opcode;

pub use inst_data::{BranchTargets, InstData};
pub use opcode::Opcode;

/// The data flow graph stores what instructions do (opcode + operands),
/// separate from where they appear in the layout.
#[derive(Debug, Clone)]
pub struct DataFlowGraph {
    /// Instruction data
    pub insts: PrimaryMap<Inst, InstData>,
}

impl DataFlowGraph {
    /// Create a new empty DFG.
    pub fn new() -> Self {
        Self {
            insts: PrimaryMap::new(),
        }
    }

    /// Create an instruction and return its entity.
    ///
    /// The instruction is added to the DFG but not yet inserted into the
    /// layout; use `Layout::append_inst` or `Layout::insert_inst` for
    /// that.
    pub fn create_inst(&mut self, data: InstData) -> Inst {
        self.insts.push(data)
    }

    /// Get instruction data.
    pub fn inst_data(&self, inst: Inst) -> Option<&InstData> {
        self.insts.get(inst)
    }

    /// Get mutable instruction data.
    pub fn inst_data_mut(&mut self, inst: Inst) -> Option<&mut InstData> {
        self.insts.get_mut(inst)
    }

    /// Get instruction argument values.
    pub fn inst_args(&self, inst: Inst) -> &[Value] {
        self.inst_data(inst)
            .map(|data| data.args.as_slice())
            .unwrap_or(&[])
    }

    /// Get instruction result values.
    pub fn inst_results(&self, inst: Inst) -> &[Value] {
        self.inst_data(inst)
            .map(|data| data.results.as_slice())
            .unwrap_or(&[])
    }
}

impl Default for DataFlowGraph {
    fn default() -> Self {
        Self::new()
    }
}

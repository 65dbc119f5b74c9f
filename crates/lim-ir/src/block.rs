//! Block data (parameters).

use alloc::vec::Vec;

use crate::{types::Type, value::Value};

/// Block data: the parameters of a basic block.
///
/// Block parameters are the SSA equivalent of phi nodes: a predecessor
/// passes arguments along its edge and the block binds them to fresh
/// values. Where the block sits is tracked by [`crate::Layout`]; what its
/// instructions do lives in [`crate::DataFlowGraph`].
#[derive(Debug, Clone)]
pub struct BlockData {
    /// Block parameter values.
    pub params: Vec<Value>,
    /// Parameter types (parallel to `params`).
    pub param_types: Vec<Type>,
}

impl BlockData {
    /// Create block data with no parameters.
    pub fn new() -> Self {
        Self {
            params: Vec::new(),
            param_types: Vec::new(),
        }
    }

    /// Create block data with the given parameters and types.
    pub fn with_params(params: Vec<Value>, param_types: Vec<Type>) -> Self {
        assert_eq!(
            params.len(),
            param_types.len(),
            "params and param_types must have the same length"
        );
        Self {
            params,
            param_types,
        }
    }

    /// Number of parameters.
    pub fn param_count(&self) -> usize {
        self.params.len()
    }
}

impl Default for BlockData {
    fn default() -> Self {
        Self::new()
    }
}

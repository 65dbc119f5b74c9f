//! Dominance analysis using Cooper's "Simple, Fast Dominator Algorithm".

use alloc::{vec, vec::Vec};
use core::fmt;

use crate::entity::{Block, EntityRef};

use super::cfg::ControlFlowGraph;

/// The dominance fixed point did not converge within its iteration cap.
///
/// For any reducible CFG the iteration converges quickly; exhausting the
/// cap means the control flow cannot be described by natural loops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IrreducibleCfgError {
    /// Number of iterations performed before giving up.
    pub iterations: usize,
}

impl fmt::Display for IrreducibleCfgError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "dominance computation did not converge after {} iterations (irreducible control flow)",
            self.iterations
        )
    }
}

impl core::error::Error for IrreducibleCfgError {}

/// Dominator tree for a function.
///
/// Maps each reachable block to its immediate dominator. The entry block
/// has none; unreachable blocks neither dominate nor are dominated.
#[derive(Debug, Clone)]
pub struct DominatorTree {
    /// Immediate dominator for each block (None = entry or unreachable)
    idom: Vec<Option<Block>>,
    /// 1-based reverse-postorder numbers; 0 marks unreachable blocks
    rpo_numbers: Vec<u32>,
    /// Blocks in reverse postorder
    rpo: Vec<Block>,
    entry: Block,
    num_blocks: usize,
}

impl DominatorTree {
    /// Iteration cap for the fixed point. Reducible CFGs converge in a
    /// small number of passes regardless of size.
    const MAX_ITERATIONS: usize = 100;

    /// Compute the dominator tree from a CFG.
    pub fn compute(cfg: &ControlFlowGraph) -> Result<Self, IrreducibleCfgError> {
        let num_blocks = cfg.num_blocks();
        let entry = cfg.entry();
        let rpo = cfg.reverse_post_order();

        let mut rpo_numbers = vec![0u32; num_blocks];
        for (rpo_idx, &block) in rpo.iter().enumerate() {
            rpo_numbers[block.index()] = (rpo_idx + 1) as u32;
        }

        let mut idom: Vec<Option<Block>> = vec![None; num_blocks];

        let reachable_preds = |block: Block| -> Vec<Block> {
            cfg.predecessors(block)
                .iter()
                .filter(|p| rpo_numbers[p.index()] > 0)
                .copied()
                .collect()
        };

        for &block in &rpo {
            if block == entry {
                continue;
            }
            // Initial guess: the first reachable predecessor, refined below.
            if let Some(&pred) = reachable_preds(block).first() {
                idom[block.index()] = Some(pred);
            }
        }

        let mut iterations = 0;
        let mut changed = true;
        while changed {
            iterations += 1;
            if iterations > Self::MAX_ITERATIONS {
                return Err(IrreducibleCfgError { iterations });
            }
            changed = false;
            for &block in &rpo {
                if block == entry {
                    continue;
                }

                let preds = reachable_preds(block);
                let mut candidate = match preds.first() {
                    Some(&p) => p,
                    None => continue,
                };
                for &pred in preds.iter().skip(1) {
                    candidate = Self::common_dominator(candidate, pred, &idom, &rpo_numbers);
                }

                if idom[block.index()] != Some(candidate) {
                    idom[block.index()] = Some(candidate);
                    changed = true;
                }
            }
        }

        Ok(Self {
            idom,
            rpo_numbers,
            rpo,
            entry,
            num_blocks,
        })
    }

    /// Check if `a` dominates `b`. A block dominates itself.
    pub fn dominates(&self, a: Block, b: Block) -> bool {
        if a.index() >= self.num_blocks || b.index() >= self.num_blocks {
            return false;
        }
        if a == b {
            return true;
        }
        // Unreachable blocks dominate nothing and are dominated by nothing.
        if self.rpo_numbers[a.index()] == 0 || self.rpo_numbers[b.index()] == 0 {
            return false;
        }
        if a == self.entry {
            return true;
        }

        // Walk up the dominator tree from b; dominators always have
        // smaller RPO numbers.
        let rpo_a = self.rpo_numbers[a.index()];
        let mut current = b;
        while self.rpo_numbers[current.index()] > rpo_a {
            match self.idom[current.index()] {
                Some(idom) => current = idom,
                None => return false,
            }
        }
        current == a
    }

    /// Immediate dominator of a block, if any.
    pub fn immediate_dominator(&self, block: Block) -> Option<Block> {
        if block.index() >= self.num_blocks {
            return None;
        }
        self.idom[block.index()]
    }

    /// Whether a block is reachable from the entry.
    pub fn is_reachable(&self, block: Block) -> bool {
        block.index() < self.num_blocks && self.rpo_numbers[block.index()] > 0
    }

    /// Blocks in reverse postorder, as used for the fixed point.
    pub fn rpo(&self) -> &[Block] {
        &self.rpo
    }

    /// 1-based reverse-postorder number of a block; 0 if unreachable.
    pub fn rpo_number(&self, block: Block) -> u32 {
        self.rpo_numbers[block.index()]
    }

    fn common_dominator(
        a: Block,
        b: Block,
        idom: &[Option<Block>],
        rpo_numbers: &[u32],
    ) -> Block {
        let mut finger1 = a;
        let mut finger2 = b;

        while finger1 != finger2 {
            if rpo_numbers[finger1.index()] < rpo_numbers[finger2.index()] {
                match idom[finger2.index()] {
                    Some(next) => finger2 = next,
                    None => return finger1,
                }
            } else {
                match idom[finger1.index()] {
                    Some(next) => finger1 = next,
                    None => return finger2,
                }
            }
        }

        finger1
    }
}

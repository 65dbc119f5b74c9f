//! Control flow graph construction.

use alloc::{collections::BTreeSet, vec, vec::Vec};

use crate::{
    entity::{Block, EntityRef},
    function::Function,
};

/// Control flow graph for a function.
///
/// Edges are derived from the branch targets of each block's terminator.
/// Blocks are identified by their entities; predecessor and successor
/// sets are kept in deterministic (entity index) order.
#[derive(Debug, Clone)]
pub struct ControlFlowGraph {
    predecessors: Vec<BTreeSet<Block>>,
    successors: Vec<BTreeSet<Block>>,
    entry: Block,
    num_blocks: usize,
}

impl ControlFlowGraph {
    /// Build the CFG of a function.
    ///
    /// The function must have an entry block.
    pub fn from_function(func: &Function) -> Self {
        let num_blocks = func.block_count();
        let entry = func.entry_block().expect("function has an entry block");
        let mut predecessors = vec![BTreeSet::new(); num_blocks];
        let mut successors = vec![BTreeSet::new(); num_blocks];

        for block in func.blocks() {
            for inst in func.block_insts(block) {
                let data = func.dfg.inst_data(inst).expect("inst in layout has data");
                if let Some(branch) = &data.targets {
                    for (target, _) in &branch.targets {
                        successors[block.index()].insert(*target);
                        predecessors[target.index()].insert(block);
                    }
                }
            }
        }

        Self {
            predecessors,
            successors,
            entry,
            num_blocks,
        }
    }

    /// Predecessors of a block.
    pub fn predecessors(&self, block: Block) -> &BTreeSet<Block> {
        &self.predecessors[block.index()]
    }

    /// Successors of a block.
    pub fn successors(&self, block: Block) -> &BTreeSet<Block> {
        &self.successors[block.index()]
    }

    /// The entry block.
    pub fn entry(&self) -> Block {
        self.entry
    }

    /// Number of blocks covered by this CFG.
    pub fn num_blocks(&self) -> usize {
        self.num_blocks
    }

    /// All blocks reachable from the entry, in reverse postorder.
    pub fn reverse_post_order(&self) -> Vec<Block> {
        let mut visited = BTreeSet::new();
        let mut post_order = Vec::new();

        fn dfs(
            block: Block,
            cfg: &ControlFlowGraph,
            visited: &mut BTreeSet<Block>,
            post_order: &mut Vec<Block>,
        ) {
            if !visited.insert(block) {
                return;
            }
            for &succ in cfg.successors(block) {
                dfs(succ, cfg, visited, post_order);
            }
            post_order.push(block);
        }

        dfs(self.entry, self, &mut visited, &mut post_order);
        post_order.reverse();
        post_order
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_function;

    #[test]
    fn test_cfg_single_block() {
        let func = parse_function("function %t() {\nblock0:\n    return\n}").unwrap();
        let cfg = ControlFlowGraph::from_function(&func);

        assert_eq!(cfg.num_blocks(), 1);
        assert!(cfg.predecessors(Block::new(0)).is_empty());
        assert!(cfg.successors(Block::new(0)).is_empty());
    }

    #[test]
    fn test_cfg_linear_chain() {
        let func = parse_function(
            "function %t() {\nblock0:\n    jump block1\nblock1:\n    jump block2\nblock2:\n    return\n}",
        )
        .unwrap();
        let cfg = ControlFlowGraph::from_function(&func);

        assert!(cfg.predecessors(Block::new(0)).is_empty());
        assert!(cfg.successors(Block::new(0)).contains(&Block::new(1)));
        assert!(cfg.predecessors(Block::new(2)).contains(&Block::new(1)));
        assert!(cfg.successors(Block::new(2)).is_empty());
    }

    #[test]
    fn test_cfg_diamond() {
        let func = parse_function(
            "function %t(i32) {\nblock0(v0: i32):\n    brif v0, block1, block2\nblock1:\n    jump block3\nblock2:\n    jump block3\nblock3:\n    return\n}",
        )
        .unwrap();
        let cfg = ControlFlowGraph::from_function(&func);

        assert_eq!(cfg.successors(Block::new(0)).len(), 2);
        assert_eq!(cfg.predecessors(Block::new(3)).len(), 2);
    }

    #[test]
    fn test_cfg_self_loop() {
        let func = parse_function(
            "function %t(i32) {\nblock0(v0: i32):\n    jump block1\nblock1:\n    brif v0, block1, block2\nblock2:\n    return\n}",
        )
        .unwrap();
        let cfg = ControlFlowGraph::from_function(&func);

        assert!(cfg.successors(Block::new(1)).contains(&Block::new(1)));
        assert!(cfg.predecessors(Block::new(1)).contains(&Block::new(1)));
        assert!(cfg.predecessors(Block::new(1)).contains(&Block::new(0)));
    }

    #[test]
    fn test_cfg_reverse_post_order() {
        let func = parse_function(
            "function %t(i32) {\nblock0(v0: i32):\n    brif v0, block1, block2\nblock1:\n    jump block3\nblock2:\n    jump block3\nblock3:\n    return\n}",
        )
        .unwrap();
        let cfg = ControlFlowGraph::from_function(&func);
        let rpo = cfg.reverse_post_order();

        assert_eq!(rpo.len(), 4);
        assert_eq!(rpo[0], Block::new(0));
        assert_eq!(rpo[rpo.len() - 1], Block::new(3));
    }

    #[test]
    fn test_cfg_unreachable_block_excluded_from_rpo() {
        let func = parse_function(
            "function %t() {\nblock0:\n    return\nblock1:\n    return\n}",
        )
        .unwrap();
        let cfg = ControlFlowGraph::from_function(&func);
        let rpo = cfg.reverse_post_order();

        assert_eq!(rpo, alloc::vec![Block::new(0)]);
    }
}

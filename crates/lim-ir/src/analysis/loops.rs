//! Natural loop detection and the loop nesting forest.

use alloc::{collections::BTreeSet, vec, vec::Vec};

use crate::entity::Block;

use super::{cfg::ControlFlowGraph, dominance::DominatorTree};

/// A natural loop.
///
/// The header dominates every member block: a back-edge only exists
/// where that holds, so control can enter the loop through the header
/// alone.
#[derive(Debug, Clone)]
pub struct Loop {
    /// The header block: target of the loop's back-edges.
    pub header: Block,
    /// All member blocks, including the header.
    pub blocks: BTreeSet<Block>,
    /// Blocks with a back-edge to the header.
    pub latches: Vec<Block>,
    /// Members with a successor outside the loop, in entity order.
    pub exits: Vec<Block>,
    /// Index of the innermost enclosing loop in the forest, if any.
    pub parent: Option<usize>,
}

impl Loop {
    /// Whether a block belongs to this loop.
    pub fn contains(&self, block: Block) -> bool {
        self.blocks.contains(&block)
    }
}

/// The loop nesting forest of a function.
#[derive(Debug, Clone)]
pub struct LoopForest {
    loops: Vec<Loop>,
    irreducible_headers: Vec<Block>,
}

impl LoopForest {
    /// Detect all natural loops from back-edges in the dominator tree.
    ///
    /// Back-edges sharing a header are merged into one loop. Nesting is
    /// derived from strict block-set containment. Retreating edges whose
    /// target does NOT dominate their source close a cycle that is not a
    /// natural loop; those targets are recorded as irreducible entry
    /// points instead of producing a loop.
    pub fn compute(cfg: &ControlFlowGraph, domtree: &DominatorTree) -> Self {
        // Group back-edges by header, in deterministic RPO order.
        let mut headers: Vec<Block> = Vec::new();
        let mut latches_by_header: Vec<Vec<Block>> = Vec::new();
        let mut irreducible_headers: Vec<Block> = Vec::new();
        for &block in domtree.rpo() {
            for &succ in cfg.successors(block) {
                if domtree.dominates(succ, block) {
                    match headers.iter().position(|&h| h == succ) {
                        Some(i) => latches_by_header[i].push(block),
                        None => {
                            headers.push(succ);
                            latches_by_header.push(vec![block]);
                        }
                    }
                } else if domtree.rpo_number(succ) <= domtree.rpo_number(block)
                    && !irreducible_headers.contains(&succ)
                {
                    irreducible_headers.push(succ);
                }
            }
        }

        let mut loops: Vec<Loop> = headers
            .into_iter()
            .zip(latches_by_header)
            .map(|(header, latches)| {
                let blocks = natural_loop_body(cfg, header, &latches);
                let exits = blocks
                    .iter()
                    .filter(|b| cfg.successors(**b).iter().any(|s| !blocks.contains(s)))
                    .copied()
                    .collect();
                Loop {
                    header,
                    blocks,
                    latches,
                    exits,
                    parent: None,
                }
            })
            .collect();

        // Nesting: the parent is the smallest strict superset.
        for i in 0..loops.len() {
            let mut parent: Option<usize> = None;
            for j in 0..loops.len() {
                if i == j || loops[j].blocks.len() <= loops[i].blocks.len() {
                    continue;
                }
                if loops[i].blocks.is_subset(&loops[j].blocks) {
                    let better = match parent {
                        Some(p) => loops[j].blocks.len() < loops[p].blocks.len(),
                        None => true,
                    };
                    if better {
                        parent = Some(j);
                    }
                }
            }
            loops[i].parent = parent;
        }

        Self {
            loops,
            irreducible_headers,
        }
    }

    /// Number of loops in the forest.
    pub fn len(&self) -> usize {
        self.loops.len()
    }

    /// Whether the function has no loops.
    pub fn is_empty(&self) -> bool {
        self.loops.is_empty()
    }

    /// Get a loop by forest index.
    pub fn get(&self, index: usize) -> &Loop {
        &self.loops[index]
    }

    /// Iterate over all loops.
    pub fn iter(&self) -> impl Iterator<Item = &Loop> {
        self.loops.iter()
    }

    /// Entry blocks of cycles that are not natural loops. Transforms
    /// leave these regions alone.
    pub fn irreducible_headers(&self) -> &[Block] {
        &self.irreducible_headers
    }

    /// Forest indices ordered innermost-first: every loop appears before
    /// its parent. Hoisting in this order moves inner-loop invariants
    /// into the parent's body where the parent's own pass sees them.
    pub fn bottom_up(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.loops.len()).collect();
        order.sort_by_key(|&i| self.loops[i].blocks.len());
        order
    }

    /// The innermost loop containing a block, if any.
    pub fn innermost_containing(&self, block: Block) -> Option<usize> {
        self.loops
            .iter()
            .enumerate()
            .filter(|(_, l)| l.contains(block))
            .min_by_key(|(_, l)| l.blocks.len())
            .map(|(i, _)| i)
    }
}

/// Compute the body of the natural loop with the given header and
/// latches: every block that can reach a latch without passing through
/// the header, plus the header itself.
fn natural_loop_body(cfg: &ControlFlowGraph, header: Block, latches: &[Block]) -> BTreeSet<Block> {
    let mut body = BTreeSet::new();
    body.insert(header);

    let mut worklist: Vec<Block> = Vec::new();
    for &latch in latches {
        if body.insert(latch) {
            worklist.push(latch);
        }
    }

    while let Some(block) = worklist.pop() {
        for &pred in cfg.predecessors(block) {
            if body.insert(pred) {
                worklist.push(pred);
            }
        }
    }

    body
}

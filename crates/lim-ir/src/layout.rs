//! Function layout (block and instruction ordering).
//!
//! The layout tracks WHERE blocks and instructions are, separate from
//! what they do (the data flow graph). Both orderings are doubly-linked
//! lists stored in entity maps, so inserting a synthesized block or
//! moving an instruction between blocks is O(1).

use crate::{
    entity::{Block, Inst},
    entity_map::PrimaryMap,
};

/// Linked-list node for a block.
#[derive(Debug, Clone, Default)]
struct BlockNode {
    prev: Option<Block>,
    next: Option<Block>,
    first_inst: Option<Inst>,
    last_inst: Option<Inst>,
}

/// Linked-list node for an instruction.
#[derive(Debug, Clone, Default)]
struct InstNode {
    block: Option<Block>,
    prev: Option<Inst>,
    next: Option<Inst>,
}

/// Block and instruction ordering for one function.
#[derive(Debug, Clone)]
pub struct Layout {
    blocks: PrimaryMap<Block, BlockNode>,
    insts: PrimaryMap<Inst, InstNode>,
    first_block: Option<Block>,
    last_block: Option<Block>,
}

impl Layout {
    /// Create a new empty layout.
    pub fn new() -> Self {
        Self {
            blocks: PrimaryMap::new(),
            insts: PrimaryMap::new(),
            first_block: None,
            last_block: None,
        }
    }

    /// Check if a block is currently inserted in the layout.
    pub fn is_block_inserted(&self, block: Block) -> bool {
        Some(block) == self.first_block
            || self
                .blocks
                .get(block)
                .map(|n| n.prev.is_some())
                .unwrap_or(false)
    }

    /// Append a block to the end of the layout.
    pub fn append_block(&mut self, block: Block) {
        debug_assert!(!self.is_block_inserted(block));

        let last = self.last_block;
        {
            let node = self.blocks.get_mut(block).expect("block must be registered");
            node.prev = last;
            node.next = None;
        }

        match last {
            Some(last) => self.blocks.get_mut(last).unwrap().next = Some(block),
            None => self.first_block = Some(block),
        }
        self.last_block = Some(block);
    }

    /// Insert a block immediately before another block.
    pub fn insert_block(&mut self, block: Block, before: Block) {
        debug_assert!(!self.is_block_inserted(block));
        debug_assert!(self.is_block_inserted(before));

        let prev = self.blocks.get(before).unwrap().prev;
        {
            let node = self.blocks.get_mut(block).expect("block must be registered");
            node.prev = prev;
            node.next = Some(before);
        }
        self.blocks.get_mut(before).unwrap().prev = Some(block);

        match prev {
            Some(p) => self.blocks.get_mut(p).unwrap().next = Some(block),
            None => self.first_block = Some(block),
        }
    }

    /// Get the entry block (first block in layout order).
    pub fn entry_block(&self) -> Option<Block> {
        self.first_block
    }

    /// Get the block following `block` in layout order.
    pub fn next_block(&self, block: Block) -> Option<Block> {
        self.blocks.get(block)?.next
    }

    /// Iterate over blocks in layout order.
    pub fn blocks(&self) -> Blocks<'_> {
        Blocks {
            layout: self,
            next: self.first_block,
        }
    }

    /// Get the block containing an instruction, if it is inserted.
    pub fn inst_block(&self, inst: Inst) -> Option<Block> {
        self.insts.get(inst)?.block
    }

    /// Append an instruction to the end of a block.
    pub fn append_inst(&mut self, inst: Inst, block: Block) {
        debug_assert!(self.inst_block(inst).is_none());
        debug_assert!(self.is_block_inserted(block));

        let prev = self.blocks.get(block).unwrap().last_inst;
        {
            let node = self.insts.get_mut(inst).expect("inst must be registered");
            node.block = Some(block);
            node.prev = prev;
            node.next = None;
        }

        match prev {
            Some(p) => self.insts.get_mut(p).unwrap().next = Some(inst),
            None => self.blocks.get_mut(block).unwrap().first_inst = Some(inst),
        }
        self.blocks.get_mut(block).unwrap().last_inst = Some(inst);
    }

    /// Insert an instruction immediately before another instruction.
    pub fn insert_inst(&mut self, inst: Inst, before: Inst) {
        debug_assert!(self.inst_block(inst).is_none());

        let block = self
            .inst_block(before)
            .expect("insertion point must be in the layout");
        let prev = self.insts.get(before).unwrap().prev;
        {
            let node = self.insts.get_mut(inst).expect("inst must be registered");
            node.block = Some(block);
            node.prev = prev;
            node.next = Some(before);
        }
        self.insts.get_mut(before).unwrap().prev = Some(inst);

        match prev {
            Some(p) => self.insts.get_mut(p).unwrap().next = Some(inst),
            None => self.blocks.get_mut(block).unwrap().first_inst = Some(inst),
        }
    }

    /// Remove an instruction from the layout.
    pub fn remove_inst(&mut self, inst: Inst) {
        let block = self
            .inst_block(inst)
            .expect("instruction must be in the layout");

        let prev = self.insts.get(inst).unwrap().prev;
        let next = self.insts.get(inst).unwrap().next;
        {
            let node = self.insts.get_mut(inst).unwrap();
            node.block = None;
            node.prev = None;
            node.next = None;
        }

        match prev {
            Some(p) => self.insts.get_mut(p).unwrap().next = next,
            None => self.blocks.get_mut(block).unwrap().first_inst = next,
        }
        match next {
            Some(n) => self.insts.get_mut(n).unwrap().prev = prev,
            None => self.blocks.get_mut(block).unwrap().last_inst = prev,
        }
    }

    /// Get the first instruction in a block.
    pub fn first_inst(&self, block: Block) -> Option<Inst> {
        self.blocks.get(block)?.first_inst
    }

    /// Get the last instruction in a block.
    pub fn last_inst(&self, block: Block) -> Option<Inst> {
        self.blocks.get(block)?.last_inst
    }

    /// Get the instruction following `inst` within its block.
    pub fn next_inst(&self, inst: Inst) -> Option<Inst> {
        self.insts.get(inst)?.next
    }

    /// Iterate over the instructions of a block in order.
    pub fn block_insts(&self, block: Block) -> Insts<'_> {
        Insts {
            layout: self,
            next: self.first_inst(block),
        }
    }

    /// Register a block so it can be inserted later.
    pub(crate) fn ensure_block(&mut self, block: Block) {
        while !self.blocks.contains(block) {
            self.blocks.push(BlockNode::default());
        }
    }

    /// Register an instruction so it can be inserted later.
    pub(crate) fn ensure_inst(&mut self, inst: Inst) {
        while !self.insts.contains(inst) {
            self.insts.push(InstNode::default());
        }
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over blocks in layout order.
pub struct Blocks<'f> {
    layout: &'f Layout,
    next: Option<Block>,
}

impl<'f> Iterator for Blocks<'f> {
    type Item = Block;

    fn next(&mut self) -> Option<Block> {
        let current = self.next?;
        self.next = self.layout.next_block(current);
        Some(current)
    }
}

/// Iterator over the instructions of a block.
pub struct Insts<'f> {
    layout: &'f Layout,
    next: Option<Inst>,
}

impl<'f> Iterator for Insts<'f> {
    type Item = Inst;

    fn next(&mut self) -> Option<Inst> {
        let current = self.next?;
        self.next = self.layout.next_inst(current);
        Some(current)
    }
}

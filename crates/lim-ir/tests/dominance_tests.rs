//! Integration tests for the analysis stack: CFG, dominators, loops.

use lim_ir::{parse_function, Block, ControlFlowGraph, DominatorTree, LoopForest};

fn analyses(text: &str) -> (ControlFlowGraph, DominatorTree, LoopForest) {
    let func = parse_function(text).unwrap();
    let cfg = ControlFlowGraph::from_function(&func);
    let domtree = DominatorTree::compute(&cfg).unwrap();
    let forest = LoopForest::compute(&cfg, &domtree);
    (cfg, domtree, forest)
}

#[test]
fn test_domtree_through_loop_exit() {
    let (_, domtree, forest) = analyses(
        "function %t(i32) -> i32 {
block0(v0: i32):
    v1 = iconst 0
    jump block1(v1)
block1(v2: i32):
    v3 = iadd v2, v0
    v4 = icmp slt v3, v0
    brif v4, block1(v3), block2
block2:
    return v3
}",
    );

    // The loop header dominates the exit block.
    assert!(domtree.dominates(Block::new(1), Block::new(2)));
    assert_eq!(domtree.immediate_dominator(Block::new(2)), Some(Block::new(1)));

    assert_eq!(forest.len(), 1);
    let lp = forest.get(0);
    assert_eq!(lp.header, Block::new(1));
    assert_eq!(lp.exits, vec![Block::new(1)]);
}

#[test]
fn test_loop_nest_containment() {
    let (_, _, forest) = analyses(
        "function %t(i32) -> i32 {
block0(v0: i32):
    jump block1
block1:
    jump block2
block2:
    brif v0, block2, block3
block3:
    brif v0, block1, block4
block4:
    return v0
}",
    );

    assert_eq!(forest.len(), 2);
    let order = forest.bottom_up();
    let inner = forest.get(order[0]);
    let outer = forest.get(order[1]);
    assert!(inner.blocks.len() < outer.blocks.len());
    assert!(inner.blocks.is_subset(&outer.blocks));
    assert_eq!(inner.parent, Some(order[1]));
}

#[test]
fn test_side_entry_cycle_is_not_a_natural_loop() {
    // Two entries into the cycle {block1, block2}: neither dominates the
    // other, so the retreating edge closing the cycle is not a back-edge
    // and no loop is produced.
    let (_, _, forest) = analyses(
        "function %t(i32) -> i32 {
block0(v0: i32):
    brif v0, block1, block3
block1:
    jump block2
block2:
    brif v0, block1, block4
block3:
    jump block2
block4:
    return v0
}",
    );

    assert!(forest.is_empty());
    assert_eq!(forest.irreducible_headers().len(), 1);
}

#[test]
fn test_irreducible_cycle_is_skipped_not_fatal() {
    // The invariant product sits inside the irreducible cycle; nothing
    // is hoisted through it, but the pass still succeeds.
    let mut func = parse_function(
        "function %t(i32, i32) -> i32 {
block0(v0: i32, v1: i32):
    brif v0, block1, block3
block1:
    v2 = imul v0, v1
    jump block2
block2:
    brif v0, block1, block4
block3:
    jump block2
block4:
    return v0
}",
    )
    .unwrap();
    let before = format!("{}", func);

    let stats = lim_ir::run_function(&mut func).unwrap();
    assert_eq!(stats.loops_seen, 0);
    assert_eq!(stats.loops_skipped, 1);
    assert_eq!(stats.hoisted, 0);
    assert_eq!(format!("{}", func), before);
}

#[test]
fn test_rpo_places_dominators_first() {
    let (cfg, domtree, _) = analyses(
        "function %t(i32) {
block0(v0: i32):
    brif v0, block1, block2
block1:
    jump block3
block2:
    jump block3
block3:
    return
}",
    );

    let rpo = cfg.reverse_post_order();
    let pos = |b: Block| rpo.iter().position(|&x| x == b).unwrap();
    for &b in &rpo {
        if let Some(idom) = domtree.immediate_dominator(b) {
            assert!(pos(idom) < pos(b));
        }
    }
}

//! The `domtree` subtest: dominator tree preorder listings.

use std::collections::BTreeMap;

use lim_ir::{Block, ControlFlowGraph, DominatorTree, EntityRef, Function};

use crate::filecheck::match_filecheck;
use crate::parser::parse_test_file;

/// Run all cases from a domtree test file.
pub fn run_tests_from_file(content: &str) {
    let test_cases = parse_test_file(content);
    assert!(!test_cases.is_empty(), "No test cases found in test file");

    for case in test_cases {
        assert_eq!(
            case.command, "test domtree",
            "Unexpected test command: {}",
            case.command
        );
        run_domtree_test(&case.function_text, &case.expected_text);
    }
}

/// Format the dominator tree as a preorder listing: each line names a
/// block and its children in the tree, children visited in entity order.
fn format_domtree(func: &Function, cfg: &ControlFlowGraph, domtree: &DominatorTree) -> String {
    let mut children: BTreeMap<Block, Vec<Block>> = BTreeMap::new();
    for block in func.blocks() {
        if let Some(idom) = domtree.immediate_dominator(block) {
            children.entry(idom).or_default().push(block);
        }
    }
    for list in children.values_mut() {
        list.sort_by_key(|b| EntityRef::index(*b));
    }

    fn preorder(block: Block, children: &BTreeMap<Block, Vec<Block>>, out: &mut Vec<String>) {
        let list = children.get(&block).cloned().unwrap_or_default();
        if list.is_empty() {
            out.push(format!("{}:", block));
        } else {
            let names: Vec<String> = list.iter().map(|b| format!("{}", b)).collect();
            out.push(format!("{}: {}", block, names.join(" ")));
        }
        for child in list {
            preorder(child, children, out);
        }
    }

    let mut out = vec![String::from("domtree {")];
    preorder(cfg.entry(), &children, &mut out);
    out.push(String::from("}"));
    out.join("\n")
}

fn run_domtree_test(function_text: &str, expected_text: &str) {
    let func = lim_ir::parse_function(function_text.trim()).unwrap_or_else(|e| {
        panic!(
            "Failed to parse function: {}\n\nFunction text:\n{}",
            e, function_text
        )
    });

    let cfg = ControlFlowGraph::from_function(&func);
    let domtree = DominatorTree::compute(&cfg).expect("reducible test input");
    let actual = format_domtree(&func, &cfg, &domtree);

    if let Err(e) = match_filecheck(&actual, expected_text) {
        panic!(
            "Domtree test failed: {}\n\nActual:\n{}\n\nFunction:\n{}",
            e, actual, function_text
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domtree_basic() {
        run_tests_from_file(include_str!("../filetests/domtree/basic.lim"));
    }

    #[test]
    fn test_domtree_loops() {
        run_tests_from_file(include_str!("../filetests/domtree/loops.lim"));
    }
}

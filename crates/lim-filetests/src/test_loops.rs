//! The `loops` subtest: loop forest listings.

use lim_ir::{ControlFlowGraph, DominatorTree, LoopForest};

use crate::filecheck::match_filecheck;
use crate::parser::parse_test_file;

/// Run all cases from a loops test file.
pub fn run_tests_from_file(content: &str) {
    let test_cases = parse_test_file(content);
    assert!(!test_cases.is_empty(), "No test cases found in test file");

    for case in test_cases {
        assert_eq!(
            case.command, "test loops",
            "Unexpected test command: {}",
            case.command
        );
        run_loops_test(&case.function_text, &case.expected_text);
    }
}

/// One line per loop in discovery order, plus irreducible entries.
fn format_loops(forest: &LoopForest) -> String {
    let mut out = Vec::new();

    for lp in forest.iter() {
        let blocks: Vec<String> = lp.blocks.iter().map(|b| format!("{}", b)).collect();
        let latches: Vec<String> = lp.latches.iter().map(|b| format!("{}", b)).collect();
        let exits: Vec<String> = lp.exits.iter().map(|b| format!("{}", b)).collect();
        let parent = match lp.parent {
            Some(p) => format!("{}", forest.get(p).header),
            None => String::from("none"),
        };
        out.push(format!(
            "loop header={} blocks=[{}] latches=[{}] exits=[{}] parent={}",
            lp.header,
            blocks.join(" "),
            latches.join(" "),
            exits.join(" "),
            parent
        ));
    }
    for &header in forest.irreducible_headers() {
        out.push(format!("irreducible entry {}", header));
    }
    if out.is_empty() {
        out.push(String::from("no loops"));
    }

    out.join("\n")
}

fn run_loops_test(function_text: &str, expected_text: &str) {
    let func = lim_ir::parse_function(function_text.trim()).unwrap_or_else(|e| {
        panic!(
            "Failed to parse function: {}\n\nFunction text:\n{}",
            e, function_text
        )
    });

    let cfg = ControlFlowGraph::from_function(&func);
    let domtree = DominatorTree::compute(&cfg).expect("reducible test input");
    let forest = LoopForest::compute(&cfg, &domtree);
    let actual = format_loops(&forest);

    if let Err(e) = match_filecheck(&actual, expected_text) {
        panic!(
            "Loops test failed: {}\n\nActual:\n{}\n\nFunction:\n{}",
            e, actual, function_text
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loops_basic() {
        run_tests_from_file(include_str!("../filetests/loops/basic.lim"));
    }

    #[test]
    fn test_loops_nested() {
        run_tests_from_file(include_str!("../filetests/loops/nested.lim"));
    }
}

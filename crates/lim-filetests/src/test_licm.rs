//! The `licm` subtest: runs the pass and checks the transformed
//! function plus its statistics lines.

use crate::filecheck::match_filecheck;
use crate::parser::parse_test_file;

/// Run all cases from a licm test file.
pub fn run_tests_from_file(content: &str) {
    let test_cases = parse_test_file(content);
    assert!(!test_cases.is_empty(), "No test cases found in test file");

    for case in test_cases {
        assert_eq!(
            case.command, "test licm",
            "Unexpected test command: {}",
            case.command
        );
        run_licm_test(&case.function_text, &case.expected_text);
    }
}

fn run_licm_test(function_text: &str, expected_text: &str) {
    let mut func = lim_ir::parse_function(function_text.trim()).unwrap_or_else(|e| {
        panic!(
            "Failed to parse function: {}\n\nFunction text:\n{}",
            e, function_text
        )
    });

    let stats = lim_ir::run_function(&mut func).unwrap_or_else(|e| {
        panic!("Pass failed: {}\n\nFunction text:\n{}", e, function_text)
    });
    assert!(
        lim_ir::verify(&func).is_ok(),
        "Pass output does not verify:\n{}",
        func
    );

    // Function text first, then the statistics lines.
    let actual = format!("{}{}", func, stats);

    if let Err(e) = match_filecheck(&actual, expected_text) {
        panic!(
            "Licm test failed: {}\n\nActual:\n{}\n\nFunction:\n{}",
            e, actual, function_text
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_licm_hoist() {
        run_tests_from_file(include_str!("../filetests/licm/hoist.lim"));
    }

    #[test]
    fn test_licm_div() {
        run_tests_from_file(include_str!("../filetests/licm/div.lim"));
    }

    #[test]
    fn test_licm_nested() {
        run_tests_from_file(include_str!("../filetests/licm/nested.lim"));
    }

    #[test]
    fn test_licm_memory() {
        run_tests_from_file(include_str!("../filetests/licm/memory.lim"));
    }

    #[test]
    fn test_licm_preheader() {
        run_tests_from_file(include_str!("../filetests/licm/preheader.lim"));
    }
}

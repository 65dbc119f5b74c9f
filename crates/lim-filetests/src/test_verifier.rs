//! The `verifier` subtest: checks verifier diagnostics on functions the
//! parser accepts but the verifier rejects.

use crate::filecheck::match_filecheck;
use crate::parser::parse_test_file;

/// Run all cases from a verifier test file.
pub fn run_tests_from_file(content: &str) {
    let test_cases = parse_test_file(content);
    assert!(!test_cases.is_empty(), "No test cases found in test file");

    for case in test_cases {
        assert_eq!(
            case.command, "test verifier",
            "Unexpected test command: {}",
            case.command
        );
        run_verifier_test(&case.function_text, &case.expected_text);
    }
}

fn run_verifier_test(function_text: &str, expected_text: &str) {
    let func = lim_ir::parse_function(function_text.trim()).unwrap_or_else(|e| {
        panic!(
            "Failed to parse function: {}\n\nFunction text:\n{}",
            e, function_text
        )
    });

    let actual = match lim_ir::verify(&func) {
        Ok(()) => String::from("ok"),
        Err(errors) => errors
            .iter()
            .map(|e| format!("error: {}", e))
            .collect::<Vec<_>>()
            .join("\n"),
    };

    if let Err(e) = match_filecheck(&actual, expected_text) {
        panic!(
            "Verifier test failed: {}\n\nActual:\n{}\n\nFunction:\n{}",
            e, actual, function_text
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verifier_dominance() {
        run_tests_from_file(include_str!("../filetests/verifier/dominance.lim"));
    }
}

//! Test file parsing.

/// A test case extracted from a test file.
#[derive(Debug, Clone)]
pub struct TestCase {
    /// The function text
    pub function_text: String,
    /// The expected output (the `;` comment block after the function)
    pub expected_text: String,
    /// The test command, e.g. "test licm"
    pub command: String,
}

/// Parse a test file into its cases.
///
/// A file starts with a `test <kind>` command. Each `function ... { }`
/// is one case; the `;` comment block that follows it holds the expected
/// output (usually filecheck directives) with the `;` prefix stripped.
pub fn parse_test_file(content: &str) -> Vec<TestCase> {
    let lines: Vec<&str> = content.lines().collect();
    let mut test_cases = Vec::new();
    let mut command = String::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i].trim();

        if command.is_empty() && line.starts_with("test ") {
            command = String::from(line);
            i += 1;
            continue;
        }

        if line.starts_with("function ") {
            let function_start = i;
            let mut brace_count = 0i32;
            let mut function_end = i;
            for (j, line) in lines.iter().enumerate().skip(i) {
                for ch in line.chars() {
                    match ch {
                        '{' => brace_count += 1,
                        '}' => {
                            brace_count -= 1;
                            if brace_count == 0 {
                                function_end = j;
                            }
                        }
                        _ => {}
                    }
                }
                if function_end > function_start || (brace_count == 0 && j > i) {
                    break;
                }
            }

            let function_text = lines[function_start..=function_end].join("\n");

            // The expected output is the comment block that follows.
            let mut j = function_end + 1;
            while j < lines.len() && lines[j].trim().is_empty() {
                j += 1;
            }
            let mut expected = Vec::new();
            while j < lines.len() && lines[j].trim().starts_with(';') {
                let trimmed = lines[j].trim();
                let stripped = trimmed
                    .strip_prefix("; ")
                    .or_else(|| trimmed.strip_prefix(';'))
                    .unwrap_or(trimmed);
                expected.push(String::from(stripped));
                j += 1;
            }

            test_cases.push(TestCase {
                function_text,
                expected_text: expected.join("\n"),
                command: command.clone(),
            });
            i = j;
        } else {
            i += 1;
        }
    }

    test_cases
}

//! Parser for the IR text format.

mod block;
mod error;
mod function;
mod instructions;
mod module;
mod primitives;
mod validation;
mod whitespace;

use alloc::format;

use error::{parse_error, validation_error};
pub use error::ParseError;
use function::parse_function_internal;
use module::parse_module_internal;

use crate::{function::Function, module::Module};

/// Parse a complete module from IR text.
pub fn parse_module(input: &str) -> Result<Module, ParseError> {
    let trimmed = input.trim();
    match parse_module_internal(trimmed) {
        Ok((remaining, module)) => {
            if !remaining.trim().is_empty() {
                return Err(parse_error(
                    trimmed,
                    remaining,
                    &format!("Unexpected input remaining: {}", remaining),
                ));
            }
            for func in module.functions.values() {
                validation::validate_function(func)
                    .map_err(|msg| validation_error(format!("%{}: {}", func.name, msg)))?;
            }
            Ok(module)
        }
        Err(e) => Err(parse_error(trimmed, trimmed, &format!("Parse error: {:?}", e))),
    }
}

/// Parse a single function from IR text.
pub fn parse_function(input: &str) -> Result<Function, ParseError> {
    let trimmed = input.trim();
    match parse_function_internal(trimmed) {
        Ok((remaining, (_, func))) => {
            if !remaining.trim().is_empty() {
                return Err(parse_error(
                    trimmed,
                    remaining,
                    &format!("Unexpected input remaining: {}", remaining),
                ));
            }
            validation::validate_function(&func).map_err(validation_error)?;
            Ok(func)
        }
        Err(e) => Err(parse_error(trimmed, trimmed, &format!("Parse error: {:?}", e))),
    }
}

#[cfg(test)]
mod tests {
    use alloc::{format, string::ToString, vec::Vec};

    use super::*;

    #[test]
    fn test_parse_function_empty_input() {
        assert!(parse_function("").is_err());
        assert!(parse_function("invalid").is_err());
        assert!(parse_function("function %test() {").is_err());
    }

    #[test]
    fn test_parse_function_trailing_garbage() {
        let result = parse_function("function %test() {\nblock0:\n    return\n} extra");
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_function_with_comments() {
        let input = "function %test() -> i32 {\n; header comment\nblock0:\n    v0 = iconst 42 ; inline\n    return v0\n}";
        let func = parse_function(input).unwrap();
        assert_eq!(func.block_count(), 1);
        let insts: Vec<_> = func.block_insts(func.entry_block().unwrap()).collect();
        assert_eq!(insts.len(), 2);
    }

    #[test]
    fn test_parse_function_loop_shape() {
        let input = "function %count(i32) -> i32 {\n\
                     block0(v0: i32):\n\
                     \x20   v1 = iconst 0\n\
                     \x20   jump block1(v1)\n\
                     block1(v2: i32):\n\
                     \x20   v3 = iadd v2, v0\n\
                     \x20   v4 = icmp slt v3, v0\n\
                     \x20   brif v4, block1(v3), block2\n\
                     block2:\n\
                     \x20   return v3\n\
                     }";
        let func = parse_function(input).unwrap();
        assert_eq!(func.block_count(), 3);
        assert_eq!(func.name, "count");
    }

    #[test]
    fn test_parse_module_roundtrip_display() {
        let input = "module {\nentry: %main\n\nfunction %main() -> i32 {\nblock0:\n    v0 = iconst 7\n    return v0\n}\n}";
        let module = parse_module(input).unwrap();
        let printed = format!("{}", module);
        let reparsed = parse_module(&printed).unwrap();
        assert_eq!(reparsed.function_count(), module.function_count());
        assert_eq!(reparsed.entry_function, Some("main".to_string()));
    }

    #[test]
    fn test_parse_function_roundtrip_display() {
        let input = "function %f(i32) -> i32 {\nblock0(v0: i32):\n    v1 = iconst 3\n    v2 = imul v0, v1\n    return v2\n}";
        let func = parse_function(input).unwrap();
        let printed = format!("{}", func);
        let reparsed = parse_function(&printed).unwrap();
        assert_eq!(format!("{}", reparsed), printed);
    }
}

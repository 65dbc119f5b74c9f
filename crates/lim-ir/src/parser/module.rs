//! Module parser.

use nom::{
    bytes::complete::tag,
    character::complete::char,
    combinator::opt,
    sequence::terminated,
    IResult,
};

use super::{
    function::parse_function_internal,
    primitives::parse_function_name,
    whitespace::blank,
};
use crate::module::Module;

/// Parse a module:
///
/// ```text
/// module {
/// entry: %main
///
/// function %main() { ... }
/// }
/// ```
pub(crate) fn parse_module_internal(input: &str) -> IResult<&str, Module> {
    let (input, _) = terminated(tag("module"), blank)(input)?;
    let (input, _) = terminated(char('{'), blank)(input)?;

    let (input, entry) = opt(|input| {
        let (input, _) = terminated(tag("entry:"), blank)(input)?;
        terminated(parse_function_name, blank)(input)
    })(input)?;

    let mut module = Module::new();

    let mut input = input;
    loop {
        let (remaining, _) = blank(input)?;
        if remaining.starts_with('}') {
            input = remaining;
            break;
        }

        let (remaining, (name, func)) = parse_function_internal(remaining)?;
        input = remaining;

        if module.functions.contains_key(&name) {
            return Err(nom::Err::Failure(nom::error::Error::new(
                input,
                nom::error::ErrorKind::Verify,
            )));
        }
        module.add_function(name, func);
    }

    let (input, _) = terminated(char('}'), blank)(input)?;

    if let Some(entry) = entry {
        if !module.functions.contains_key(&entry) {
            return Err(nom::Err::Failure(nom::error::Error::new(
                input,
                nom::error::ErrorKind::Verify,
            )));
        }
        module.set_entry_function(entry);
    }

    Ok((input, module))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_module_single_function() {
        let input = "module {\nentry: %main\n\nfunction %main() {\nblock0:\n    return\n}\n}";
        let (remaining, module) = parse_module_internal(input).unwrap();
        assert_eq!(remaining, "");
        assert_eq!(module.function_count(), 1);
        assert_eq!(module.entry_function.as_deref(), Some("main"));
    }

    #[test]
    fn test_parse_module_no_entry() {
        let input = "module {\nfunction %f() {\nblock0:\n    return\n}\n}";
        let (_, module) = parse_module_internal(input).unwrap();
        assert!(module.entry_function.is_none());
    }

    #[test]
    fn test_parse_module_unknown_entry() {
        let input = "module {\nentry: %missing\n\nfunction %f() {\nblock0:\n    return\n}\n}";
        assert!(parse_module_internal(input).is_err());
    }

    #[test]
    fn test_parse_module_duplicate_function() {
        let input = "module {\nfunction %f() {\nblock0:\n    return\n}\nfunction %f() {\nblock0:\n    return\n}\n}";
        assert!(parse_module_internal(input).is_err());
    }
}

//! Function and signature parsers.

use alloc::{string::String, vec, vec::Vec};

use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::char,
    combinator::{map, opt},
    multi::separated_list0,
    sequence::{delimited, terminated, tuple},
    IResult,
};

use super::{
    block::parse_block,
    primitives::{parse_function_name, parse_type},
    whitespace::blank,
};
use crate::{
    dfg::InstData,
    entity::Block,
    function::Function,
    signature::Signature,
    types::Type,
    value::Value,
};

/// Parse a function signature: (i32, i32) -> i32
pub(crate) fn parse_signature(input: &str) -> IResult<&str, Signature> {
    let (input, params) = delimited(
        terminated(char('('), blank),
        separated_list0(terminated(char(','), blank), terminated(parse_type, blank)),
        terminated(char(')'), blank),
    )(input)?;

    let (input, returns) = opt(alt((
        // -> void is syntactic sugar for an empty return list
        map(
            tuple((blank, tag("->"), blank, terminated(tag("void"), blank))),
            |_| Vec::<Type>::new(),
        ),
        map(
            tuple((
                blank,
                tag("->"),
                blank,
                separated_list0(terminated(char(','), blank), terminated(parse_type, blank)),
            )),
            |(_, _, _, types)| types,
        ),
    )))(input)?;

    Ok((
        input,
        Signature {
            params,
            returns: returns.unwrap_or_default(),
        },
    ))
}

fn build_failure(input: &str) -> nom::Err<nom::error::Error<&str>> {
    nom::Err::Failure(nom::error::Error::new(input, nom::error::ErrorKind::Verify))
}

/// Parse a function.
///
/// Block labels carry the block's entity index; labels may appear in any
/// textual order (a transformed function prints synthesized blocks where
/// the layout placed them), but the set of declared indices must be
/// exactly 0..n with no duplicates. Layout order follows textual order.
pub(crate) fn parse_function_internal(input: &str) -> IResult<&str, (String, Function)> {
    let (input, _) = terminated(tag("function"), blank)(input)?;
    let (input, name) = terminated(parse_function_name, blank)(input)?;
    let (input, signature) = parse_signature(input)?;
    let (input, _) = terminated(char('{'), blank)(input)?;

    let mut parsed_blocks: Vec<(u32, Vec<(Value, Type)>, Vec<InstData>)> = Vec::new();

    let mut input = input;
    loop {
        let (remaining, _) = blank(input)?;
        if remaining.starts_with('}') {
            input = remaining;
            break;
        }

        let (remaining, parsed) = parse_block(remaining)?;
        input = remaining;
        parsed_blocks.push(parsed);
    }

    let (input, _) = terminated(char('}'), blank)(input)?;

    let mut function = Function::new(signature, name.clone());

    if let Some(max_index) = parsed_blocks.iter().map(|(i, _, _)| *i).max() {
        // Declared indices must cover 0..=max exactly once.
        let mut declared = vec![false; max_index as usize + 1];
        for (index, _, _) in &parsed_blocks {
            if declared[*index as usize] {
                return Err(build_failure(input));
            }
            declared[*index as usize] = true;
        }
        if declared.iter().any(|d| !*d) {
            return Err(build_failure(input));
        }

        for _ in 0..=max_index {
            function.create_block();
        }
        for (index, params, insts) in parsed_blocks {
            let block = Block::new(index);
            if !params.is_empty() {
                let (values, types): (Vec<_>, Vec<_>) = params.into_iter().unzip();
                let data = function.blocks.get_mut(block).expect("block was created");
                data.params = values;
                data.param_types = types;
            }
            function.append_block(block);

            for inst_data in insts {
                let inst = function.create_inst(inst_data);
                function.append_inst(inst, block);
            }
        }
    }

    Ok((input, (name, function)))
}

//! Block parser.

use alloc::vec::Vec;

use nom::{
    character::complete::char,
    combinator::opt,
    multi::{many0, separated_list0},
    sequence::{delimited, preceded, terminated},
    IResult,
};

use super::{
    instructions::parse_instruction,
    primitives::{parse_block_index, parse_type, parse_value},
    whitespace::blank,
};
use crate::{dfg::InstData, types::Type, value::Value};

/// Parse a single block parameter: v0: i32
fn parse_block_param(input: &str) -> IResult<&str, (Value, Type)> {
    let (input, _) = blank(input)?;
    let (input, value) = terminated(parse_value, blank)(input)?;
    let (input, _) = terminated(char(':'), blank)(input)?;
    let (input, ty) = terminated(parse_type, blank)(input)?;
    Ok((input, (value, ty)))
}

/// Parse block parameters: (v0: i32, v1: i32)
fn parse_block_params(input: &str) -> IResult<&str, Vec<(Value, Type)>> {
    delimited(
        terminated(char('('), blank),
        separated_list0(
            terminated(char(','), blank),
            terminated(parse_block_param, blank),
        ),
        preceded(blank, char(')')),
    )(input)
}

/// Parse a block: header with optional parameters, then instructions.
///
/// Returns the declared block index, the parameters, and the instruction
/// data in order.
pub(crate) fn parse_block(
    input: &str,
) -> IResult<&str, (u32, Vec<(Value, Type)>, Vec<InstData>)> {
    let (input, _) = blank(input)?;
    let (input, block_index) = terminated(parse_block_index, blank)(input)?;
    let (input, params) = opt(parse_block_params)(input)?;
    let (input, _) = terminated(char(':'), blank)(input)?;

    // many0 stops when no instruction parses, i.e. at the next block
    // header or the closing brace.
    let (input, insts) = many0(terminated(parse_instruction, blank))(input)?;

    Ok((input, (block_index, params.unwrap_or_default(), insts)))
}

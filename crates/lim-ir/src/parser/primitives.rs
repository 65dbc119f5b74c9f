//! Primitive parsers for types, values, names, and literals.

use alloc::string::{String, ToString};

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::char,
    combinator::{map, map_res, opt, recognize},
    sequence::{pair, preceded},
    IResult,
};

use crate::{types::Type, value::Value};

/// Parse an integer literal
pub(crate) fn integer(input: &str) -> IResult<&str, i64> {
    map_res(
        recognize(pair(
            opt(char('-')),
            take_while1(|c: char| c.is_ascii_digit()),
        )),
        |s: &str| s.parse::<i64>(),
    )(input)
}

/// Parse a type (i32, i64)
pub(crate) fn parse_type(input: &str) -> IResult<&str, Type> {
    alt((
        map(tag("i32"), |_| Type::I32),
        map(tag("i64"), |_| Type::I64),
    ))(input)
}

/// Parse a value (v0, v1, etc.)
pub(crate) fn parse_value(input: &str) -> IResult<&str, Value> {
    map(
        map_res(
            preceded(char('v'), take_while1(|c: char| c.is_ascii_digit())),
            |s: &str| s.parse::<u32>(),
        ),
        Value::new,
    )(input)
}

/// Parse a function name (%name)
pub(crate) fn parse_function_name(input: &str) -> IResult<&str, String> {
    map(
        preceded(
            char('%'),
            take_while1(|c: char| c.is_alphanumeric() || c == '_'),
        ),
        |s: &str| s.to_string(),
    )(input)
}

/// Parse a block index (block0, block1, etc.)
pub(crate) fn parse_block_index(input: &str) -> IResult<&str, u32> {
    map_res(
        preceded(tag("block"), take_while1(|c: char| c.is_ascii_digit())),
        |s: &str| s.parse::<u32>(),
    )(input)
}

//! Whitespace and comment parsing utilities.

use nom::{
    branch::alt,
    bytes::complete::take_while,
    character::complete::{char, multispace1},
    combinator::map,
    multi::many0,
    sequence::pair,
    IResult,
};

/// Parse whitespace and `;` line comments, discarding the result.
///
/// This is the main separator parser used throughout: every token parser
/// is terminated with `blank`, so comments can appear anywhere a line
/// break can.
pub(crate) fn blank(input: &str) -> IResult<&str, ()> {
    map(
        many0(alt((
            map(multispace1, |_| ()),
            map(pair(char(';'), take_while(|c| c != '\n')), |_| ()),
        ))),
        |_| (),
    )(input)
}

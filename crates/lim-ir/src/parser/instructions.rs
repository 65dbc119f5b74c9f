//! Instruction parsers.

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
    primitives::{integer, parse_block_index, parse_function_name, parse_type, parse_value},
    whitespace::blank,
};
use crate::{
    condcodes::IntCC,
    dfg::{InstData, Opcode},
    entity::Block,
    value::Value,
};

use alloc::vec::Vec;

/// Parse a binary integer instruction (arithmetic or bitwise)
pub(crate) fn parse_binary(input: &str) -> IResult<&str, InstData> {
    let (input, result) = terminated(parse_value, blank)(input)?;
    let (input, _) = terminated(tag("="), blank)(input)?;
    let (input, op) = terminated(
        alt((
            tag("iadd"),
            tag("isub"),
            tag("imul"),
            tag("idiv"),
            tag("irem"),
            tag("iand"),
            tag("ior"),
            tag("ixor"),
        )),
        blank,
    )(input)?;
    let (input, arg1) = terminated(parse_value, blank)(input)?;
    let (input, _) = terminated(char(','), blank)(input)?;
    let (input, arg2) = terminated(parse_value, blank)(input)?;

    let opcode = match op {
        "iadd" => Opcode::Iadd,
        "isub" => Opcode::Isub,
        "imul" => Opcode::Imul,
        "idiv" => Opcode::Idiv,
        "irem" => Opcode::Irem,
        "iand" => Opcode::Iand,
        "ior" => Opcode::Ior,
        "ixor" => Opcode::Ixor,
        _ => unreachable!(),
    };

    Ok((input, InstData::binary(opcode, result, arg1, arg2)))
}

/// Parse an integer condition code
fn parse_int_cond_code(input: &str) -> IResult<&str, IntCC> {
    let (input, cond_str) = terminated(
        alt((
            tag("eq"),
            tag("ne"),
            tag("slt"),
            tag("sle"),
            tag("sgt"),
            tag("sge"),
            tag("ult"),
            tag("ule"),
            tag("ugt"),
            tag("uge"),
        )),
        blank,
    )(input)?;

    let cond = match cond_str {
        "eq" => IntCC::Equal,
        "ne" => IntCC::NotEqual,
        "slt" => IntCC::SignedLessThan,
        "sle" => IntCC::SignedLessThanOrEqual,
        "sgt" => IntCC::SignedGreaterThan,
        "sge" => IntCC::SignedGreaterThanOrEqual,
        "ult" => IntCC::UnsignedLessThan,
        "ule" => IntCC::UnsignedLessThanOrEqual,
        "ugt" => IntCC::UnsignedGreaterThan,
        "uge" => IntCC::UnsignedGreaterThanOrEqual,
        _ => unreachable!(),
    };

    Ok((input, cond))
}

/// Parse a comparison instruction (icmp with condition code)
pub(crate) fn parse_icmp(input: &str) -> IResult<&str, InstData> {
    let (input, result) = terminated(parse_value, blank)(input)?;
    let (input, _) = terminated(tag("="), blank)(input)?;
    let (input, _) = terminated(tag("icmp"), blank)(input)?;
    let (input, cond) = parse_int_cond_code(input)?;
    let (input, arg1) = terminated(parse_value, blank)(input)?;
    let (input, _) = terminated(char(','), blank)(input)?;
    let (input, arg2) = terminated(parse_value, blank)(input)?;

    Ok((input, InstData::icmp(cond, result, arg1, arg2)))
}

/// Parse a constant instruction (iconst)
pub(crate) fn parse_iconst(input: &str) -> IResult<&str, InstData> {
    let (input, result) = terminated(parse_value, blank)(input)?;
    let (input, _) = terminated(tag("="), blank)(input)?;
    let (input, _) = terminated(tag("iconst"), blank)(input)?;
    let (input, value) = terminated(integer, blank)(input)?;
    Ok((input, InstData::iconst(result, value)))
}

/// Parse a load instruction
pub(crate) fn parse_load(input: &str) -> IResult<&str, InstData> {
    let (input, result) = terminated(parse_value, blank)(input)?;
    let (input, _) = terminated(tag("="), blank)(input)?;
    let (input, _) = tag("load")(input)?;
    let (input, _) = char('.')(input)?;
    let (input, ty) = terminated(parse_type, blank)(input)?;
    let (input, address) = terminated(parse_value, blank)(input)?;
    Ok((input, InstData::load(result, address, ty)))
}

/// Parse a store instruction
pub(crate) fn parse_store(input: &str) -> IResult<&str, InstData> {
    let (input, _) = terminated(tag("store"), char('.'))(input)?;
    let (input, ty) = terminated(parse_type, blank)(input)?;
    let (input, address) = terminated(parse_value, blank)(input)?;
    let (input, _) = terminated(char(','), blank)(input)?;
    let (input, value) = terminated(parse_value, blank)(input)?;
    Ok((input, InstData::store(address, value, ty)))
}

/// Parse a call instruction
pub(crate) fn parse_call(input: &str) -> IResult<&str, InstData> {
    let (input, _) = terminated(tag("call"), blank)(input)?;
    let (input, callee) = terminated(parse_function_name, blank)(input)?;
    let (input, args) = delimited(
        terminated(char('('), blank),
        separated_list0(terminated(char(','), blank), terminated(parse_value, blank)),
        terminated(char(')'), blank),
    )(input)?;

    let (input, results) = opt(map(
        tuple((
            terminated(tag("->"), blank),
            separated_list0(terminated(char(','), blank), terminated(parse_value, blank)),
        )),
        |(_, values)| values,
    ))(input)?;

    Ok((
        input,
        InstData::call(callee, args, results.unwrap_or_default()),
    ))
}

/// Parse an edge argument list: (v1, v2, ...)
fn parse_edge_args(input: &str) -> IResult<&str, Vec<Value>> {
    let (input, args) = opt(delimited(
        terminated(char('('), blank),
        separated_list0(terminated(char(','), blank), terminated(parse_value, blank)),
        terminated(char(')'), blank),
    ))(input)?;
    Ok((input, args.unwrap_or_default()))
}

/// Parse a jump instruction
pub(crate) fn parse_jump(input: &str) -> IResult<&str, InstData> {
    let (input, _) = terminated(tag("jump"), blank)(input)?;
    let (input, target) = terminated(parse_block_index, blank)(input)?;
    let (input, args) = parse_edge_args(input)?;
    Ok((input, InstData::jump(Block::new(target), args)))
}

/// Parse a conditional branch instruction (brif)
pub(crate) fn parse_brif(input: &str) -> IResult<&str, InstData> {
    let (input, _) = terminated(tag("brif"), blank)(input)?;
    let (input, condition) = terminated(parse_value, blank)(input)?;
    let (input, _) = terminated(char(','), blank)(input)?;
    let (input, target_then) = terminated(parse_block_index, blank)(input)?;
    let (input, args_then) = parse_edge_args(input)?;
    let (input, _) = terminated(char(','), blank)(input)?;
    let (input, target_else) = terminated(parse_block_index, blank)(input)?;
    let (input, args_else) = parse_edge_args(input)?;
    Ok((
        input,
        InstData::brif(
            condition,
            Block::new(target_then),
            args_then,
            Block::new(target_else),
            args_else,
        ),
    ))
}

/// Parse a return instruction
pub(crate) fn parse_return(input: &str) -> IResult<&str, InstData> {
    let (input, _) = terminated(tag("return"), blank)(input)?;
    let (input, values) =
        separated_list0(terminated(char(','), blank), terminated(parse_value, blank))(input)?;
    Ok((input, InstData::return_(values)))
}

/// Parse any instruction
pub(crate) fn parse_instruction(input: &str) -> IResult<&str, InstData> {
    // Order matters: instructions without a result assignment first, then
    // the "v0 = ..." forms with the more specific mnemonics before the
    // generic binary parser.
    alt((
        parse_store,
        parse_call,
        parse_brif,
        parse_jump,
        parse_return,
        parse_iconst,
        parse_load,
        parse_icmp,
        parse_binary,
    ))(input)
}

#[cfg(test)]
mod tests {
    use alloc::vec;

    use super::*;

    #[test]
    fn test_parse_iconst() {
        let (remaining, data) = parse_instruction("v0 = iconst 42").unwrap();
        assert_eq!(remaining, "");
        assert_eq!(data.opcode, Opcode::Iconst);
        assert_eq!(data.imm, Some(42));
    }

    #[test]
    fn test_parse_iconst_negative() {
        let (_, data) = parse_instruction("v0 = iconst -7").unwrap();
        assert_eq!(data.imm, Some(-7));
    }

    #[test]
    fn test_parse_binary() {
        let (_, data) = parse_instruction("v2 = iadd v0, v1").unwrap();
        assert_eq!(data.opcode, Opcode::Iadd);
        assert_eq!(data.args, vec![Value::new(0), Value::new(1)]);

        let (_, data) = parse_instruction("v2 = idiv v0, v1").unwrap();
        assert_eq!(data.opcode, Opcode::Idiv);

        let (_, data) = parse_instruction("v2 = ixor v0, v1").unwrap();
        assert_eq!(data.opcode, Opcode::Ixor);
    }

    #[test]
    fn test_parse_icmp() {
        let (_, data) = parse_instruction("v2 = icmp slt v0, v1").unwrap();
        match data.opcode {
            Opcode::Icmp { cond } => assert_eq!(cond, IntCC::SignedLessThan),
            _ => panic!("Expected Icmp opcode"),
        }
    }

    #[test]
    fn test_parse_load_store() {
        let (_, data) = parse_instruction("v1 = load.i32 v0").unwrap();
        assert_eq!(data.opcode, Opcode::Load);
        assert_eq!(data.ty, Some(crate::Type::I32));

        let (_, data) = parse_instruction("store.i64 v0, v1").unwrap();
        assert_eq!(data.opcode, Opcode::Store);
        assert_eq!(data.ty, Some(crate::Type::I64));
    }

    #[test]
    fn test_parse_call() {
        let (remaining, data) = parse_instruction("call %func(v0, v1) -> v2").unwrap();
        assert_eq!(remaining, "");
        match &data.opcode {
            Opcode::Call { callee } => assert_eq!(callee, "func"),
            _ => panic!("Expected Call opcode"),
        }
        assert_eq!(data.args.len(), 2);
        assert_eq!(data.results, vec![Value::new(2)]);
    }

    #[test]
    fn test_parse_call_no_results() {
        let (_, data) = parse_instruction("call %func(v0)").unwrap();
        assert!(data.results.is_empty());
    }

    #[test]
    fn test_parse_jump() {
        let (_, data) = parse_instruction("jump block1").unwrap();
        assert_eq!(data.opcode, Opcode::Jump);
        let branch = data.targets.as_ref().unwrap();
        assert_eq!(branch.targets[0].0, Block::new(1));
        assert!(branch.targets[0].1.is_empty());
    }

    #[test]
    fn test_parse_jump_with_args() {
        let (_, data) = parse_instruction("jump block3(v1, v2)").unwrap();
        let branch = data.targets.as_ref().unwrap();
        assert_eq!(branch.targets[0].0, Block::new(3));
        assert_eq!(branch.targets[0].1, vec![Value::new(1), Value::new(2)]);
    }

    #[test]
    fn test_parse_brif() {
        let (_, data) = parse_instruction("brif v0, block1(v1), block2").unwrap();
        assert_eq!(data.opcode, Opcode::Brif);
        let branch = data.targets.as_ref().unwrap();
        assert_eq!(branch.targets[0].0, Block::new(1));
        assert_eq!(branch.targets[0].1, vec![Value::new(1)]);
        assert_eq!(branch.targets[1].0, Block::new(2));
        assert!(branch.targets[1].1.is_empty());
    }

    #[test]
    fn test_parse_return() {
        let (_, data) = parse_instruction("return").unwrap();
        assert_eq!(data.opcode, Opcode::Return);
        assert!(data.args.is_empty());

        let (_, data) = parse_instruction("return v0, v1").unwrap();
        assert_eq!(data.args.len(), 2);
    }

    #[test]
    fn test_parse_instruction_invalid() {
        assert!(parse_instruction("invalid").is_err());
        assert!(parse_instruction("").is_err());
        assert!(parse_instruction("v0 = iadd").is_err());
        assert!(parse_instruction("v0 = iconst").is_err());
    }
}

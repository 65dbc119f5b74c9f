//! Structural validation for parsed functions.
//!
//! These checks run right after parsing and catch malformed input before
//! it reaches any analysis: dangling branch targets, edge/parameter arity
//! mismatches, missing terminators, signature mismatches and double
//! definitions. Use-before-definition is the verifier's job, since it
//! needs dominance.

use alloc::{collections::BTreeSet, format, string::String};

use crate::{
    entity::EntityRef,
    function::Function,
    value::Value,
};

/// Validate that branch targets exist and edge arguments match the target
/// block's parameter count.
pub(crate) fn validate_block_targets(func: &Function) -> Result<(), String> {
    let num_blocks = func.blocks.len();

    for block in func.blocks() {
        for inst in func.block_insts(block) {
            let data = func.dfg.inst_data(inst).expect("inst in layout has data");
            let branch = match &data.targets {
                Some(branch) => branch,
                None => continue,
            };
            for (target, args) in &branch.targets {
                if target.index() >= num_blocks {
                    return Err(format!(
                        "{} targets {} but function only has {} blocks",
                        data.opcode.mnemonic(),
                        target,
                        num_blocks
                    ));
                }
                let params = &func.blocks.get(*target).unwrap().params;
                if args.len() != params.len() {
                    return Err(format!(
                        "{} to {} expects {} arguments, but {} provided",
                        data.opcode.mnemonic(),
                        target,
                        params.len(),
                        args.len()
                    ));
                }
            }
        }
    }

    Ok(())
}

/// Validate that return instructions match the signature's return count.
pub(crate) fn validate_return_arity(func: &Function) -> Result<(), String> {
    let expected = func.signature.returns.len();

    for block in func.blocks() {
        for inst in func.block_insts(block) {
            let data = func.dfg.inst_data(inst).expect("inst in layout has data");
            if data.opcode == crate::dfg::Opcode::Return && data.args.len() != expected {
                return Err(format!(
                    "return in {} has {} values, but the signature expects {}",
                    block,
                    data.args.len(),
                    expected
                ));
            }
        }
    }

    Ok(())
}

/// Validate that every block ends with a terminator and contains no
/// terminator before its last instruction.
pub(crate) fn validate_terminators(func: &Function) -> Result<(), String> {
    for block in func.blocks() {
        let last = match func.layout.last_inst(block) {
            Some(last) => last,
            None => return Err(format!("{} is empty", block)),
        };

        for inst in func.block_insts(block) {
            let data = func.dfg.inst_data(inst).expect("inst in layout has data");
            let is_terminator = data.opcode.is_terminator();
            if inst == last && !is_terminator {
                return Err(format!("{} does not end with a terminator", block));
            }
            if inst != last && is_terminator {
                return Err(format!(
                    "{} has a terminator before its last instruction",
                    block
                ));
            }
        }
    }

    Ok(())
}

/// Validate that the entry block's parameters match the signature.
pub(crate) fn validate_entry_block(func: &Function) -> Result<(), String> {
    let entry = match func.entry_block() {
        Some(entry) => entry,
        None => return Err(String::from("function has no entry block")),
    };
    let data = func.blocks.get(entry).unwrap();

    if data.params.len() != func.signature.params.len() {
        return Err(format!(
            "entry block has {} parameters, but the signature expects {}",
            data.params.len(),
            func.signature.params.len()
        ));
    }
    for (i, (ty, expected)) in data
        .param_types
        .iter()
        .zip(func.signature.params.iter())
        .enumerate()
    {
        if ty != expected {
            return Err(format!(
                "entry parameter {} has type {}, but the signature expects {}",
                i, ty, expected
            ));
        }
    }

    Ok(())
}

/// Validate single assignment: no value is defined twice, either as a
/// block parameter or an instruction result.
pub(crate) fn validate_single_assignment(func: &Function) -> Result<(), String> {
    let mut defined: BTreeSet<Value> = BTreeSet::new();

    for block in func.blocks() {
        for &param in &func.blocks.get(block).unwrap().params {
            if !defined.insert(param) {
                return Err(format!("{} defined more than once", param));
            }
        }
        for inst in func.block_insts(block) {
            for &result in func.dfg.inst_results(inst) {
                if !defined.insert(result) {
                    return Err(format!("{} defined more than once", result));
                }
            }
        }
    }

    Ok(())
}

/// Run all parse-time validations.
pub(crate) fn validate_function(func: &Function) -> Result<(), String> {
    validate_terminators(func)?;
    validate_block_targets(func)?;
    validate_return_arity(func)?;
    validate_entry_block(func)?;
    validate_single_assignment(func)?;
    Ok(())
}

//! SSA verification: single assignment and def-dominates-use.

use alloc::{collections::BTreeMap, format, vec::Vec};

use crate::{
    analysis::{ControlFlowGraph, DominatorTree, ValueDef, ValueDefs},
    entity::{Block, Inst},
    value::Value,
    Function,
};

use super::VerifierError;

/// Verify SSA form: every value is defined exactly once, every use has a
/// definition, and each definition dominates its uses.
///
/// If the dominator tree cannot be computed (irreducible control flow),
/// the dominance part is skipped and only definedness is checked.
pub fn verify_ssa(function: &Function, errors: &mut Vec<VerifierError>) {
    verify_single_assignment(function, errors);

    let defs = ValueDefs::compute(function);
    let cfg = ControlFlowGraph::from_function(function);
    let domtree = DominatorTree::compute(&cfg).ok();

    // Position of each instruction within its block, for same-block
    // ordering checks.
    let mut positions: BTreeMap<Inst, usize> = BTreeMap::new();
    for block in function.blocks() {
        for (pos, inst) in function.block_insts(block).enumerate() {
            positions.insert(inst, pos);
        }
    }

    for block in function.blocks() {
        for inst in function.block_insts(block) {
            let data = match function.dfg.inst_data(inst) {
                Some(data) => data,
                None => continue,
            };
            for &arg in &data.args {
                verify_use(
                    function, &defs, domtree.as_ref(), &positions, block, inst, arg, errors,
                );
            }
        }
    }
}

fn verify_single_assignment(function: &Function, errors: &mut Vec<VerifierError>) {
    let mut seen: BTreeMap<Value, Block> = BTreeMap::new();

    for block in function.blocks() {
        for &param in &function.blocks.get(block).unwrap().params {
            if let Some(first) = seen.insert(param, block) {
                errors.push(VerifierError::with_location(
                    format!("{} defined again; first defined in {}", param, first),
                    format!("{}", block),
                ));
            }
        }
        for inst in function.block_insts(block) {
            for &result in function.dfg.inst_results(inst) {
                if let Some(first) = seen.insert(result, block) {
                    errors.push(VerifierError::with_location(
                        format!("{} defined again; first defined in {}", result, first),
                        format!("{}", block),
                    ));
                }
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn verify_use(
    function: &Function,
    defs: &ValueDefs,
    domtree: Option<&DominatorTree>,
    positions: &BTreeMap<Inst, usize>,
    use_block: Block,
    use_inst: Inst,
    value: Value,
    errors: &mut Vec<VerifierError>,
) {
    let def = match defs.def(value) {
        Some(def) => def,
        None => {
            errors.push(VerifierError::with_location(
                format!("{} is used but never defined", value),
                format!("{}", use_inst),
            ));
            return;
        }
    };

    let def_block = match defs.def_block(function, value) {
        Some(block) => block,
        None => return,
    };

    if def_block == use_block {
        // A block parameter is available everywhere in its block; an
        // instruction result only after the defining instruction.
        if let ValueDef::Inst(def_inst) = def {
            let def_pos = positions.get(&def_inst).copied().unwrap_or(usize::MAX);
            let use_pos = positions.get(&use_inst).copied().unwrap_or(0);
            if def_pos >= use_pos {
                errors.push(VerifierError::with_location(
                    format!("{} is used before it is defined", value),
                    format!("{}", use_inst),
                ));
            }
        }
        return;
    }

    if let Some(domtree) = domtree {
        if !domtree.dominates(def_block, use_block) {
            errors.push(VerifierError::with_location(
                format!(
                    "{} is used in {} but its definition in {} does not dominate it",
                    value, use_block, def_block
                ),
                format!("{}", use_inst),
            ));
        }
    }
}

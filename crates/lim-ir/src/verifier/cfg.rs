//! Branch target verification.

use alloc::{format, vec::Vec};

use crate::{entity::EntityRef, Function};

use super::VerifierError;

/// Verify that every branch target names an existing, layout-inserted
/// block and passes as many arguments as the target has parameters.
pub fn verify_branch_targets(function: &Function, errors: &mut Vec<VerifierError>) {
    for block in function.blocks() {
        for inst in function.block_insts(block) {
            let data = match function.dfg.inst_data(inst) {
                Some(data) => data,
                None => continue,
            };
            let branch = match &data.targets {
                Some(branch) => branch,
                None => continue,
            };

            for (target, args) in &branch.targets {
                if target.index() >= function.blocks.len() {
                    errors.push(VerifierError::with_location(
                        format!("branch to undefined {}", target),
                        format!("{}", inst),
                    ));
                    continue;
                }
                if !function.layout.is_block_inserted(*target) {
                    errors.push(VerifierError::with_location(
                        format!("branch to {} which is not in the layout", target),
                        format!("{}", inst),
                    ));
                    continue;
                }
                let params = &function.blocks.get(*target).unwrap().params;
                if params.len() != args.len() {
                    errors.push(VerifierError::with_location(
                        format!(
                            "branch to {} passes {} arguments, expected {}",
                            target,
                            args.len(),
                            params.len()
                        ),
                        format!("{}", inst),
                    ));
                }
            }
        }
    }
}

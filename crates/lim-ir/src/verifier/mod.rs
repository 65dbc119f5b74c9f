//! IR verifier.
//!
//! Checks the well-formedness rules every analysis relies on: block
//! structure, branch targets, and SSA definitions. The optimizer runs
//! the verifier before touching a function, so malformed input is
//! rejected before any mutation.

use alloc::{format, string::String, vec::Vec};

use crate::Function;

mod cfg;
mod ssa;

pub use cfg::verify_branch_targets;
pub use ssa::verify_ssa;

/// Verifier error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifierError {
    /// Error message describing what's wrong
    pub message: String,
    /// Location information (e.g. "block0", "inst5")
    pub location: Option<String>,
}

impl VerifierError {
    /// Create a new verifier error.
    pub fn new(message: String) -> Self {
        Self {
            message,
            location: None,
        }
    }

    /// Create a new verifier error with a location.
    pub fn with_location(message: String, location: String) -> Self {
        Self {
            message,
            location: Some(location),
        }
    }
}

impl core::fmt::Display for VerifierError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{}: {}", location, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Verify that a function is well-formed.
///
/// Runs all checks and collects every violation rather than stopping at
/// the first one.
pub fn verify(function: &Function) -> Result<(), Vec<VerifierError>> {
    let mut errors = Vec::new();

    verify_structure(function, &mut errors);
    verify_branch_targets(function, &mut errors);
    // SSA checks need an intact block structure to make sense.
    if errors.is_empty() {
        verify_ssa(function, &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Verify a module: every function individually, plus cross-function
/// checks on call sites.
///
/// A call to a function that exists in the module must pass as many
/// arguments as the callee has parameters and bind as many results as
/// the callee returns. Calls to unknown names are left alone; the module
/// may be linked against externals.
pub fn verify_module(module: &crate::Module) -> Result<(), Vec<VerifierError>> {
    let mut errors = Vec::new();

    for func in module.functions.values() {
        if let Err(func_errors) = verify(func) {
            for e in func_errors {
                errors.push(VerifierError {
                    message: format!("%{}: {}", func.name, e.message),
                    location: e.location,
                });
            }
        }
    }

    for func in module.functions.values() {
        for block in func.blocks() {
            for inst in func.block_insts(block) {
                let data = match func.dfg.inst_data(inst) {
                    Some(data) => data,
                    None => continue,
                };
                let callee = match &data.opcode {
                    crate::dfg::Opcode::Call { callee } => callee,
                    _ => continue,
                };
                let callee_func = match module.get_function(callee) {
                    Some(f) => f,
                    None => continue,
                };

                if data.args.len() != callee_func.signature.params.len() {
                    errors.push(VerifierError::with_location(
                        format!(
                            "call to %{} expects {} arguments, got {}",
                            callee,
                            callee_func.signature.params.len(),
                            data.args.len()
                        ),
                        format!("{}", inst),
                    ));
                }
                if data.results.len() != callee_func.signature.returns.len() {
                    errors.push(VerifierError::with_location(
                        format!(
                            "call to %{} returns {} values, but {} results are bound",
                            callee,
                            callee_func.signature.returns.len(),
                            data.results.len()
                        ),
                        format!("{}", inst),
                    ));
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Verify that the function has an entry block and every block ends in
/// exactly one terminator.
fn verify_structure(function: &Function, errors: &mut Vec<VerifierError>) {
    if function.entry_block().is_none() {
        errors.push(VerifierError::new(String::from("function has no entry block")));
        return;
    }

    for block in function.blocks() {
        let last = match function.layout.last_inst(block) {
            Some(last) => last,
            None => {
                errors.push(VerifierError::with_location(
                    format!("{} is empty", block),
                    format!("{}", block),
                ));
                continue;
            }
        };

        for inst in function.block_insts(block) {
            let data = match function.dfg.inst_data(inst) {
                Some(data) => data,
                None => continue,
            };
            if inst == last && !data.opcode.is_terminator() {
                errors.push(VerifierError::with_location(
                    format!("{} has no terminator", block),
                    format!("{}", block),
                ));
            }
            if inst != last && data.opcode.is_terminator() {
                errors.push(VerifierError::with_location(
                    format!("{} has a terminator before its last instruction", block),
                    format!("{}", block),
                ));
            }
        }
    }
}

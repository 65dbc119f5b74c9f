//! Loop-invariant code motion.
//!
//! The pass walks the loop forest innermost-first. For each reducible
//! loop it classifies the body's instructions, filters them through the
//! safety rules, and moves the survivors into the loop's preheader,
//! synthesizing one when the header has no usable entry block.
//!
//! Analysis always completes before mutation: the candidate set for a
//! loop is fixed before the first instruction moves, and the whole
//! function is verified before anything runs at all.

use alloc::{
    collections::{BTreeMap, BTreeSet},
    string::String,
    vec::Vec,
};
use core::fmt;

use crate::{
    analysis::{ControlFlowGraph, DominatorTree, Loop, LoopForest, ValueDef, ValueDefs},
    dfg::{InstData, Opcode},
    entity::{Block, Inst},
    function::Function,
    module::Module,
    value::Value,
    verifier,
};

/// Fatal or function-level failures of the pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassError {
    /// The input violates CFG well-formedness. Raised before any
    /// mutation.
    MalformedInput {
        /// Name of the offending function
        function: String,
        /// Block or instruction the verifier pointed at
        location: String,
        /// What is wrong
        message: String,
    },
    /// Dominance computation did not converge for this function.
    IrreducibleCfg {
        /// Name of the offending function
        function: String,
    },
}

impl fmt::Display for PassError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PassError::MalformedInput {
                function,
                location,
                message,
            } => {
                write!(f, "malformed input in %{} at {}: {}", function, location, message)
            }
            PassError::IrreducibleCfg { function } => {
                write!(f, "irreducible control flow in %{}", function)
            }
        }
    }
}

impl core::error::Error for PassError {}

/// Per-loop hoist count, keyed by the loop's header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopStat {
    /// Function the loop belongs to
    pub function: String,
    /// The loop's header block
    pub header: Block,
    /// Instructions moved out of this loop
    pub hoisted: usize,
}

/// Statistics for one pass invocation.
///
/// The `Display` output is one machine-checkable line per loop plus a
/// totals line; the filetest harness matches against it.
#[derive(Debug, Clone, Default)]
pub struct LicmStats {
    /// Functions transformed
    pub functions: usize,
    /// Functions skipped because dominance did not converge
    pub functions_skipped: usize,
    /// Loops found
    pub loops_seen: usize,
    /// Loops skipped as irreducible
    pub loops_skipped: usize,
    /// Preheader blocks synthesized
    pub preheaders_created: usize,
    /// Total instructions hoisted
    pub hoisted: usize,
    /// Per-loop counts
    pub per_loop: Vec<LoopStat>,
}

impl fmt::Display for LicmStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for stat in &self.per_loop {
            writeln!(
                f,
                "licm %{} header={} hoisted={}",
                stat.function, stat.header, stat.hoisted
            )?;
        }
        writeln!(
            f,
            "licm total functions={} skipped={} loops={} irreducible={} preheaders={} hoisted={}",
            self.functions,
            self.functions_skipped,
            self.loops_seen,
            self.loops_skipped,
            self.preheaders_created,
            self.hoisted
        )
    }
}

/// Run the pass over every function of a module.
///
/// All functions are verified before the first one is touched, so a
/// malformed function aborts the pass with no partial mutation anywhere.
/// Functions with irreducible control flow are skipped and counted.
pub fn run_module(module: &mut Module) -> Result<LicmStats, PassError> {
    for (name, func) in &module.functions {
        check_well_formed(name, func)?;
    }

    let mut stats = LicmStats::default();
    for (name, func) in module.functions.iter_mut() {
        match transform_function(name, func, &mut stats) {
            Ok(()) => stats.functions += 1,
            Err(PassError::IrreducibleCfg { .. }) => stats.functions_skipped += 1,
            Err(err) => return Err(err),
        }
    }
    Ok(stats)
}

/// Run the pass over a single function.
///
/// Unlike [`run_module`], an irreducible CFG is surfaced as an error
/// here; the caller owns the skip policy.
pub fn run_function(func: &mut Function) -> Result<LicmStats, PassError> {
    let name = func.name.clone();
    check_well_formed(&name, func)?;

    let mut stats = LicmStats::default();
    transform_function(&name, func, &mut stats)?;
    stats.functions = 1;
    Ok(stats)
}

fn check_well_formed(name: &str, func: &Function) -> Result<(), PassError> {
    verifier::verify(func).map_err(|errors| {
        let first = &errors[0];
        PassError::MalformedInput {
            function: String::from(name),
            location: first.location.clone().unwrap_or_default(),
            message: first.message.clone(),
        }
    })
}

/// Transform one function, accumulating statistics.
///
/// Runs repeated innermost-first sweeps. A sweep that synthesizes a
/// preheader changes the block structure, so the analyses are recomputed
/// and the sweep restarted; a newly inserted preheader of an inner loop
/// is part of every enclosing loop's body, which is what lets invariants
/// climb the whole nest.
fn transform_function(
    name: &str,
    func: &mut Function,
    stats: &mut LicmStats,
) -> Result<(), PassError> {
    let mut seen_headers: BTreeSet<Block> = BTreeSet::new();
    let mut skipped_headers: BTreeSet<Block> = BTreeSet::new();
    let mut hoisted_per_header: BTreeMap<Block, usize> = BTreeMap::new();
    let mut sweeps = 0;

    loop {
        let cfg = ControlFlowGraph::from_function(func);
        let domtree = DominatorTree::compute(&cfg).map_err(|_| PassError::IrreducibleCfg {
            function: String::from(name),
        })?;
        let forest = LoopForest::compute(&cfg, &domtree);

        skipped_headers.extend(forest.irreducible_headers().iter().copied());

        let mut created = false;
        for index in forest.bottom_up() {
            let lp = forest.get(index);
            seen_headers.insert(lp.header);

            let (hoisted, created_here) = hoist_loop(func, &cfg, &domtree, lp);
            *hoisted_per_header.entry(lp.header).or_insert(0) += hoisted;
            if created_here {
                stats.preheaders_created += 1;
                created = true;
                // Block structure changed; recompute before going on.
                break;
            }
        }

        sweeps += 1;
        if !created || sweeps > seen_headers.len() + 1 {
            break;
        }
    }

    debug_assert!(verifier::verify(func).is_ok());

    stats.loops_seen += seen_headers.len();
    stats.loops_skipped += skipped_headers.len();
    for (header, hoisted) in hoisted_per_header {
        stats.hoisted += hoisted;
        stats.per_loop.push(LoopStat {
            function: String::from(name),
            header,
            hoisted,
        });
    }
    Ok(())
}

/// Hoist everything safe out of one loop. Returns the number of moved
/// instructions and whether a preheader was synthesized.
fn hoist_loop(
    func: &mut Function,
    cfg: &ControlFlowGraph,
    domtree: &DominatorTree,
    lp: &Loop,
) -> (usize, bool) {
    let body_rpo: Vec<Block> = domtree
        .rpo()
        .iter()
        .copied()
        .filter(|b| lp.contains(*b))
        .collect();
    let defs = ValueDefs::compute(func);

    // Analysis first, in full; the layout is only touched afterwards.
    let candidates = hoistable_insts(func, lp, &defs, &body_rpo);
    if candidates.is_empty() {
        return (0, false);
    }

    let (preheader, created) = ensure_preheader(func, cfg, lp);
    let terminator = func
        .layout
        .last_inst(preheader)
        .expect("preheader has a terminator");

    let count = candidates.len();
    for inst in candidates {
        func.layout.remove_inst(inst);
        func.layout.insert_inst(inst, terminator);
    }

    (count, created)
}

/// Data-flow loop invariance, as a plain classification.
///
/// An instruction is invariant iff every operand is defined outside the
/// loop or by an instruction already classified invariant. Instructions
/// start unclassified and the set grows monotonically, so the iteration
/// reaches its fixed point within one pass per instruction in the body.
///
/// This is the raw classification; it ignores whether moving the
/// instruction would be safe. The motion engine uses
/// [`hoistable_insts`], which folds in the safety rules so that an
/// unsafe instruction pins its consumers in place too.
pub fn invariant_insts(func: &Function, lp: &Loop) -> BTreeSet<Inst> {
    let defs = ValueDefs::compute(func);
    let body: Vec<Block> = lp.blocks.iter().copied().collect();
    fixed_point(func, lp, &defs, &body, &mut |_, _| true)
}

/// The ordered hoistable set for one loop: invariant by data flow and
/// safe to move. Order is the loop body in reverse postorder, so a moved
/// instruction always lands after the moved definitions it consumes.
fn hoistable_insts(
    func: &Function,
    lp: &Loop,
    defs: &ValueDefs,
    body_rpo: &[Block],
) -> Vec<Inst> {
    // Any write or call in the body makes every load's aliasing unknown;
    // unknown fails closed.
    let loop_writes_memory = body_rpo.iter().any(|&block| {
        func.block_insts(block).any(|inst| {
            func.dfg
                .inst_data(inst)
                .map(|data| data.opcode.can_store() || data.opcode.is_call())
                .unwrap_or(false)
        })
    });

    let hoistable = fixed_point(func, lp, defs, body_rpo, &mut |data, set| {
        is_safe_to_hoist(func, defs, data, set, loop_writes_memory)
    });

    body_rpo
        .iter()
        .flat_map(|&block| func.block_insts(block))
        .filter(|inst| hoistable.contains(inst))
        .collect()
}

/// Shared fixed-point driver for the invariance state machine. `extra`
/// is the additional admission rule applied on top of operand
/// invariance.
fn fixed_point(
    func: &Function,
    lp: &Loop,
    defs: &ValueDefs,
    body: &[Block],
    extra: &mut dyn FnMut(&InstData, &BTreeSet<Inst>) -> bool,
) -> BTreeSet<Inst> {
    let mut set: BTreeSet<Inst> = BTreeSet::new();

    loop {
        let mut changed = false;
        for &block in body {
            for inst in func.block_insts(block) {
                if set.contains(&inst) {
                    continue;
                }
                let data = match func.dfg.inst_data(inst) {
                    Some(data) => data,
                    None => continue,
                };
                if data.opcode.is_terminator() || data.results.is_empty() {
                    continue;
                }
                let operands_invariant = data.args.iter().all(|&arg| {
                    match defs.def_block(func, arg) {
                        Some(def_block) if lp.contains(def_block) => match defs.def(arg) {
                            Some(ValueDef::Inst(def_inst)) => set.contains(&def_inst),
                            // Parameters of loop blocks carry loop-varying
                            // values along back-edges.
                            _ => false,
                        },
                        Some(_) => true,
                        None => false,
                    }
                });
                if operands_invariant && extra(data, &set) {
                    set.insert(inst);
                    changed = true;
                }
            }
        }
        if !changed {
            break;
        }
    }

    set
}

/// The safety rules of the pass, applied to one candidate.
fn is_safe_to_hoist(
    func: &Function,
    defs: &ValueDefs,
    data: &InstData,
    _set: &BTreeSet<Inst>,
    loop_writes_memory: bool,
) -> bool {
    // Stores and calls are never moved: a call's purity is unknown and a
    // store would need alias analysis to relocate.
    if data.opcode.has_side_effect() {
        return false;
    }
    // Division only moves when the divisor provably cannot be zero;
    // executing unconditionally inside the body is not enough, because
    // the preheader runs even for a zero-trip loop entry.
    if data.opcode.can_trap() && !divisor_is_nonzero_const(func, defs, data) {
        return false;
    }
    // A load stays put whenever the loop writes memory at all.
    if data.opcode.can_load() && loop_writes_memory {
        return false;
    }
    true
}

/// Whether the divisor of a div/rem is an iconst with a nonzero value.
fn divisor_is_nonzero_const(func: &Function, defs: &ValueDefs, data: &InstData) -> bool {
    let divisor = data.args[1];
    match defs.def(divisor) {
        Some(ValueDef::Inst(inst)) => func
            .dfg
            .inst_data(inst)
            .map(|d| d.opcode == Opcode::Iconst && d.imm.unwrap_or(0) != 0)
            .unwrap_or(false),
        _ => false,
    }
}

/// Find or synthesize the preheader of a loop.
///
/// The single loop-outside predecessor of the header is reused when its
/// terminator is an unconditional jump to the header. Otherwise a fresh
/// block is inserted before the header: it mirrors the header's
/// parameters, takes over every entry edge, and jumps to the header.
fn ensure_preheader(func: &mut Function, cfg: &ControlFlowGraph, lp: &Loop) -> (Block, bool) {
    let header = lp.header;
    let outside_preds: Vec<Block> = cfg
        .predecessors(header)
        .iter()
        .filter(|p| !lp.contains(**p))
        .copied()
        .collect();

    if let [single] = outside_preds[..] {
        if let Some(term) = func.layout.last_inst(single) {
            let data = func.dfg.inst_data(term).expect("terminator has data");
            if data.opcode == Opcode::Jump {
                return (single, false);
            }
        }
    }

    let param_types = func
        .blocks
        .get(header)
        .expect("header exists")
        .param_types
        .clone();

    let base = func.next_value_index();
    let fresh: Vec<Value> = (0..param_types.len() as u32)
        .map(|k| Value::new(base + k))
        .collect();

    let preheader = func.create_block_with_params(fresh.clone(), param_types);
    func.layout.insert_block(preheader, header);

    for &pred in &outside_preds {
        let insts: Vec<Inst> = func.block_insts(pred).collect();
        for inst in insts {
            if let Some(data) = func.dfg.inst_data_mut(inst) {
                data.retarget(header, preheader);
            }
        }
    }

    let jump = func.create_inst(InstData::jump(header, fresh));
    func.append_inst(jump, preheader);

    (preheader, true)
}

//! Instruction data structure.

use alloc::{string::String, vec::Vec};
use core::fmt;

use crate::{dfg::opcode::Opcode, entity::Block, types::Type, value::Value};

/// Instruction data: opcode plus operands.
///
/// All instructions share this uniform shape. `args` holds every value
/// the instruction uses (for branches: the condition followed by the
/// flattened edge arguments), `results` the values it defines, `targets`
/// the outgoing edges with their per-edge argument lists.
#[derive(Debug, Clone)]
pub struct InstData {
    /// The operation this instruction performs
    pub opcode: Opcode,
    /// Input values
    pub args: Vec<Value>,
    /// Output values (usually 0 or 1)
    pub results: Vec<Value>,
    /// Branch targets, for jump/brif
    pub targets: Option<BranchTargets>,
    /// Access type, for load/store
    pub ty: Option<Type>,
    /// Immediate value, for constants
    pub imm: Option<i64>,
}

/// Outgoing edges of a control-flow instruction.
///
/// A jump has one target, a brif two. Each edge carries the arguments
/// bound to the target block's parameters.
#[derive(Debug, Clone)]
pub struct BranchTargets {
    /// Targets with their argument values
    pub targets: Vec<(Block, Vec<Value>)>,
}

impl InstData {
    /// Create a binary integer instruction (arithmetic or bitwise).
    pub fn binary(opcode: Opcode, result: Value, arg1: Value, arg2: Value) -> Self {
        Self {
            opcode,
            args: Vec::from([arg1, arg2]),
            results: Vec::from([result]),
            targets: None,
            ty: None,
            imm: None,
        }
    }

    /// Create an integer comparison instruction.
    pub fn icmp(cond: crate::condcodes::IntCC, result: Value, arg1: Value, arg2: Value) -> Self {
        Self::binary(Opcode::Icmp { cond }, result, arg1, arg2)
    }

    /// Create an integer constant instruction.
    pub fn iconst(result: Value, imm: i64) -> Self {
        Self {
            opcode: Opcode::Iconst,
            args: Vec::new(),
            results: Vec::from([result]),
            targets: None,
            ty: None,
            imm: Some(imm),
        }
    }

    /// Create a load instruction.
    pub fn load(result: Value, address: Value, ty: Type) -> Self {
        Self {
            opcode: Opcode::Load,
            args: Vec::from([address]),
            results: Vec::from([result]),
            targets: None,
            ty: Some(ty),
            imm: None,
        }
    }

    /// Create a store instruction.
    pub fn store(address: Value, value: Value, ty: Type) -> Self {
        Self {
            opcode: Opcode::Store,
            args: Vec::from([address, value]),
            results: Vec::new(),
            targets: None,
            ty: Some(ty),
            imm: None,
        }
    }

    /// Create a call instruction.
    pub fn call(callee: String, args: Vec<Value>, results: Vec<Value>) -> Self {
        Self {
            opcode: Opcode::Call { callee },
            args,
            results,
            targets: None,
            ty: None,
            imm: None,
        }
    }

    /// Create an unconditional jump.
    pub fn jump(target: Block, args: Vec<Value>) -> Self {
        Self {
            opcode: Opcode::Jump,
            args: args.clone(),
            results: Vec::new(),
            targets: Some(BranchTargets {
                targets: Vec::from([(target, args)]),
            }),
            ty: None,
            imm: None,
        }
    }

    /// Create a conditional branch.
    pub fn brif(
        condition: Value,
        target_then: Block,
        args_then: Vec<Value>,
        target_else: Block,
        args_else: Vec<Value>,
    ) -> Self {
        let mut args = Vec::from([condition]);
        args.extend(args_then.iter().copied());
        args.extend(args_else.iter().copied());
        Self {
            opcode: Opcode::Brif,
            args,
            results: Vec::new(),
            targets: Some(BranchTargets {
                targets: Vec::from([(target_then, args_then), (target_else, args_else)]),
            }),
            ty: None,
            imm: None,
        }
    }

    /// Create a return instruction.
    pub fn return_(values: Vec<Value>) -> Self {
        Self {
            opcode: Opcode::Return,
            args: values,
            results: Vec::new(),
            targets: None,
            ty: None,
            imm: None,
        }
    }

    /// The condition value of a brif.
    pub fn branch_condition(&self) -> Option<Value> {
        match self.opcode {
            Opcode::Brif => self.args.first().copied(),
            _ => None,
        }
    }

    /// Retarget every edge pointing at `from` to point at `to` instead,
    /// keeping the edge arguments. Used when a preheader takes over the
    /// entry edges of a loop header.
    pub fn retarget(&mut self, from: Block, to: Block) {
        if let Some(branch) = &mut self.targets {
            for (target, _) in &mut branch.targets {
                if *target == from {
                    *target = to;
                }
            }
        }
    }
}

fn write_target(f: &mut fmt::Formatter<'_>, target: Block, args: &[Value]) -> fmt::Result {
    write!(f, "{}", target)?;
    if !args.is_empty() {
        write!(f, "(")?;
        for (i, arg) in args.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", arg)?;
        }
        write!(f, ")")?;
    }
    Ok(())
}

impl fmt::Display for InstData {
    /// Prints the same syntax the parser accepts.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.opcode {
            Opcode::Iconst => {
                write!(f, "{} = iconst {}", self.results[0], self.imm.unwrap_or(0))
            }
            Opcode::Iadd
            | Opcode::Isub
            | Opcode::Imul
            | Opcode::Idiv
            | Opcode::Irem
            | Opcode::Iand
            | Opcode::Ior
            | Opcode::Ixor => {
                write!(
                    f,
                    "{} = {} {}, {}",
                    self.results[0],
                    self.opcode.mnemonic(),
                    self.args[0],
                    self.args[1]
                )
            }
            Opcode::Icmp { cond } => {
                write!(
                    f,
                    "{} = icmp {} {}, {}",
                    self.results[0], cond, self.args[0], self.args[1]
                )
            }
            Opcode::Load => {
                write!(
                    f,
                    "{} = load.{} {}",
                    self.results[0],
                    self.ty.unwrap_or(Type::I32),
                    self.args[0]
                )
            }
            Opcode::Store => {
                write!(
                    f,
                    "store.{} {}, {}",
                    self.ty.unwrap_or(Type::I32),
                    self.args[0],
                    self.args[1]
                )
            }
            Opcode::Call { callee } => {
                write!(f, "call %{}(", callee)?;
                for (i, arg) in self.args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")?;
                if !self.results.is_empty() {
                    write!(f, " -> ")?;
                    for (i, result) in self.results.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{}", result)?;
                    }
                }
                Ok(())
            }
            Opcode::Jump => {
                let branch = self.targets.as_ref().expect("jump must have a target");
                let (target, args) = &branch.targets[0];
                write!(f, "jump ")?;
                write_target(f, *target, args)
            }
            Opcode::Brif => {
                let branch = self.targets.as_ref().expect("brif must have targets");
                write!(f, "brif {}, ", self.args[0])?;
                let (then_target, then_args) = &branch.targets[0];
                write_target(f, *then_target, then_args)?;
                write!(f, ", ")?;
                let (else_target, else_args) = &branch.targets[1];
                write_target(f, *else_target, else_args)
            }
            Opcode::Return => {
                write!(f, "return")?;
                for (i, arg) in self.args.iter().enumerate() {
                    if i == 0 {
                        write!(f, " {}", arg)?;
                    } else {
                        write!(f, ", {}", arg)?;
                    }
                }
                Ok(())
            }
        }
    }
}

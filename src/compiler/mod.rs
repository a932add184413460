//! Source-to-instruction translation.
//!
//! One left-to-right pass dispatches each operation character to its rule
//! in [`instruction`]. Runs of `+`/`-` and `>`/`<` are merged, and loops are
//! linked through a stack of open-loop addresses: `[` pushes its address,
//! `]` pops the innermost one and both instructions receive each other's
//! address.

mod instruction;

pub use self::instruction::{opcode, Fragment, Instruction, Opcode, Translation};

use tracing::{debug, warn};

use crate::error::CompileError;

/// Per-instruction debug data, kept beside the instruction stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebugInfo {
    pub mnemonic: &'static str,
    /// Source text the instruction was compiled from.
    pub source: String,
    /// Character offset of that text in the original source.
    pub position: usize,
}

/// A compiled program. Addresses are indices into the instruction list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    instructions: Vec<Instruction>,
    debug: Vec<DebugInfo>,
}

impl Program {
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn get(&self, address: usize) -> Option<&Instruction> {
        self.instructions.get(address)
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn debug_info(&self, address: usize) -> Option<&DebugInfo> {
        self.debug.get(address)
    }

    /// Addresses of loop-opens that never met their `]`.
    pub fn unresolved_loops(&self) -> Vec<usize> {
        self.instructions
            .iter()
            .enumerate()
            .filter(|(_, inst)| matches!(inst, Instruction::LoopOpen(None)))
            .map(|(addr, _)| addr)
            .collect()
    }

    fn push(&mut self, instruction: Instruction, source: String, position: usize) -> usize {
        let address = self.instructions.len();
        self.debug.push(DebugInfo {
            mnemonic: instruction.mnemonic(),
            source,
            position,
        });
        self.instructions.push(instruction);
        address
    }
}

/// Compiles `source` into a [`Program`].
///
/// Fails only on a `]` with no open loop before it. A `[` that is never
/// closed compiles to a loop-open without a target.
pub fn compile(source: &str) -> Result<Program, CompileError> {
    Compiler::new(source).compile()
}

struct Compiler {
    source: Vec<char>,
    program: Program,
    open_loops: Vec<usize>,
}

impl Compiler {
    fn new(source: &str) -> Compiler {
        Compiler {
            source: source.chars().collect(),
            program: Program::default(),
            open_loops: Vec::new(),
        }
    }

    fn compile(mut self) -> Result<Program, CompileError> {
        let mut cursor = 0;
        while cursor < self.source.len() {
            let op = match opcode(self.source[cursor]) {
                Some(op) => op,
                None => {
                    cursor += 1;
                    continue;
                }
            };

            let Translation { fragment, end } = op.translate(&self.source, cursor);
            self.apply(fragment, cursor, end)?;
            cursor = end;
        }

        if !self.open_loops.is_empty() {
            warn!(
                unresolved = ?self.program.unresolved_loops(),
                "compiler: loop-open without matching loop-close"
            );
        }
        debug!(
            chars = self.source.len(),
            instructions = self.program.len(),
            "compiler: done"
        );
        Ok(self.program)
    }

    fn apply(
        &mut self,
        fragment: Fragment,
        start: usize,
        end: usize,
    ) -> Result<(), CompileError> {
        let text: String = self.source[start..end].iter().collect();
        match fragment {
            Fragment::Nothing => {}
            Fragment::Emit(inst) => {
                self.program.push(inst, text, start);
            }
            Fragment::Open => {
                let addr = self.program.push(Instruction::LoopOpen(None), text, start);
                self.open_loops.push(addr);
            }
            Fragment::Close => {
                let open = self.open_loops.pop().ok_or(CompileError::UnopenedLoop {
                    ch: self.source[start],
                    position: start,
                })?;
                let close = self.program.push(Instruction::LoopClose(open), text, start);
                self.program.instructions[open] = Instruction::LoopOpen(Some(close));
            }
        }
        Ok(())
    }
}

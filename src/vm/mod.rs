mod tape;
pub use self::tape::Tape;

use std::io::Write;

use tracing::{debug, trace};

use crate::compiler::{Instruction, Program};
use crate::error::{ConfigError, InputError, VmError};
use crate::io::InputSource;

pub const DEFAULT_TAPE_LEN: usize = 1024;
pub const DEFAULT_CELL_SIZE: u32 = 256;

/// Cells at most this wide do byte I/O; wider cells read and write chars.
pub const BYTE_CELL_SIZE: u32 = 256;

/// Tape geometry, fixed for the lifetime of a [`Vm`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VmConfig {
    pub tape_len: usize,
    /// Cell values are kept modulo this.
    pub cell_size: u32,
}

impl Default for VmConfig {
    fn default() -> Self {
        VmConfig {
            tape_len: DEFAULT_TAPE_LEN,
            cell_size: DEFAULT_CELL_SIZE,
        }
    }
}

/// Executes compiled programs on a circular tape.
///
/// State is reset at the start of every [`Vm::run`] and left untouched
/// afterwards, so it can be inspected however the run ended.
#[derive(Debug)]
pub struct Vm {
    tape: Tape,
    data_ptr: usize,
    code_ptr: usize,
}

impl Vm {
    pub fn new(config: VmConfig) -> Result<Vm, ConfigError> {
        if config.tape_len == 0 {
            return Err(ConfigError::EmptyTape);
        }
        if config.cell_size == 0 {
            return Err(ConfigError::EmptyCell);
        }

        Ok(Vm {
            tape: Tape::alloc(config.tape_len, config.cell_size),
            data_ptr: 0,
            code_ptr: 0,
        })
    }

    pub fn reset(&mut self) {
        self.tape.reset();
        self.data_ptr = 0;
        self.code_ptr = 0;
    }

    pub fn config(&self) -> VmConfig {
        VmConfig {
            tape_len: self.tape.len(),
            cell_size: self.tape.cell_size(),
        }
    }

    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    pub fn data_ptr(&self) -> usize {
        self.data_ptr
    }

    pub fn code_ptr(&self) -> usize {
        self.code_ptr
    }

    /// Runs `program` from address 0 on a zeroed tape until the instruction
    /// pointer passes the last instruction.
    pub fn run<I, W>(
        &mut self,
        program: &Program,
        input: &mut I,
        output: &mut W,
    ) -> Result<(), VmError>
    where
        I: InputSource + ?Sized,
        W: Write + ?Sized,
    {
        self.reset();
        debug!(
            instructions = program.len(),
            tape_len = self.tape.len(),
            cell_size = self.tape.cell_size(),
            "vm: start"
        );

        let code = program.instructions();
        let mut steps: u64 = 0;
        while self.code_ptr < code.len() {
            self.execute(code, input, output)?;
            self.code_ptr += 1;
            steps += 1;
        }

        debug!(steps, data_ptr = self.data_ptr, "vm: halted");
        Ok(())
    }

    // Executes the instruction at `code_ptr`. A jump leaves `code_ptr` on the
    // target, and the caller's increment then moves past it.
    fn execute<I, W>(
        &mut self,
        code: &[Instruction],
        input: &mut I,
        output: &mut W,
    ) -> Result<(), VmError>
    where
        I: InputSource + ?Sized,
        W: Write + ?Sized,
    {
        match code[self.code_ptr] {
            Instruction::Add(delta) => self.tape.add(self.data_ptr, delta),
            Instruction::Move(delta) => self.data_ptr = self.tape.offset(self.data_ptr, delta),
            Instruction::LoopOpen(target) => {
                if self.tape[self.data_ptr] == 0 {
                    match target {
                        Some(close) => self.jump(close),
                        // nothing after this loop-open, so skipping is falling through
                        None if self.code_ptr + 1 == code.len() => {}
                        None => {
                            return Err(VmError::UnclosedLoop {
                                address: self.code_ptr,
                            })
                        }
                    }
                }
            }
            Instruction::LoopClose(open) => {
                if self.tape[self.data_ptr] != 0 {
                    self.jump(open);
                }
            }
            Instruction::Input => {
                let value = if self.byte_cells() {
                    input.read_byte().map(u32::from)
                } else {
                    input.read_char().map(u32::from)
                };
                let value = value.map_err(|e| self.input_error(e))?;
                self.tape[self.data_ptr] = value;
            }
            Instruction::Output => {
                let value = self.tape[self.data_ptr];
                let mut buf = [0u8; 4];
                let bytes: &[u8] = if self.byte_cells() {
                    buf[0] = value as u8;
                    &buf[..1]
                } else {
                    let ch = char::from_u32(value).ok_or_else(|| {
                        self.internal(
                            "InvalidChar".to_string(),
                            format!("cell value {} is not a character code", value),
                        )
                    })?;
                    ch.encode_utf8(&mut buf).as_bytes()
                };
                output
                    .write_all(bytes)
                    .and_then(|_| output.flush())
                    .map_err(|err| self.internal(format!("{:?}", err.kind()), err.to_string()))?;
            }
        }
        Ok(())
    }

    fn byte_cells(&self) -> bool {
        self.tape.cell_size() <= BYTE_CELL_SIZE
    }

    fn jump(&mut self, target: usize) {
        trace!(from = self.code_ptr, to = target, "vm: jump");
        self.code_ptr = target;
    }

    // Interrupt and end of input pass through; stream failures are internal.
    fn input_error(&self, err: InputError) -> VmError {
        match err {
            InputError::Io(err) => self.internal(format!("{:?}", err.kind()), err.to_string()),
            signal => VmError::Input(signal),
        }
    }

    fn internal(&self, kind: String, message: String) -> VmError {
        VmError::Internal {
            address: self.code_ptr,
            kind,
            message,
        }
    }
}

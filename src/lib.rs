#[macro_use]
extern crate lazy_static;

pub mod compiler;
pub mod disasm;
pub mod error;
pub mod io;
pub mod vm;

pub use compiler::{compile, Instruction, Program};
pub use error::{CompileError, ConfigError, Error, InputError, Result, VmError};
pub use vm::{Vm, VmConfig};

/// Compiles `code` and runs it once on a VM with the default tape.
pub fn run<I, W>(code: &str, input: &mut I, output: &mut W) -> Result<Vm>
where
    I: io::InputSource + ?Sized,
    W: std::io::Write + ?Sized,
{
    let program = compile(code)?;
    let mut vm = Vm::new(VmConfig::default())?;
    vm.run(&program, input, output)?;
    Ok(vm)
}

//! Error types for compilation, execution and I/O.

use std::io;

use thiserror::Error;

/// Crate-level result type
pub type Result<T> = std::result::Result<T, Error>;

/// Any failure of a compile-and-run cycle
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Vm(#[from] VmError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("compile-time error at char {position} ({ch}): unopened loop")]
    UnopenedLoop { ch: char, position: usize },
}

#[derive(Debug, Error)]
pub enum VmError {
    /// A loop-open without a matching loop-close was taken.
    #[error("runtime error at instruction {address}: unclosed loop")]
    UnclosedLoop { address: usize },

    #[error("internal error at instruction {address}: {kind}: {message}")]
    Internal {
        address: usize,
        kind: String,
        message: String,
    },

    #[error(transparent)]
    Input(#[from] InputError),
}

impl VmError {
    /// True for the signals raised by the input source rather than by the
    /// program itself.
    pub fn is_interrupt(&self) -> bool {
        matches!(
            self,
            VmError::Input(InputError::Interrupted) | VmError::Input(InputError::EndOfInput)
        )
    }
}

#[derive(Debug, Error)]
pub enum InputError {
    #[error("interrupted")]
    Interrupted,

    #[error("end of input")]
    EndOfInput,

    #[error("input error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("tape length must be positive")]
    EmptyTape,

    #[error("cell size must be positive")]
    EmptyCell,
}

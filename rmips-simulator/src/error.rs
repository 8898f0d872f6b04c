use rmips_types::instruction::Instruction;
use std::io;
use thiserror::Error;

/// A fault raised while executing a program.
///
/// Every variant terminates the simulated process; there is no exception or
/// interrupt vector in this machine model, so none of these are visible to
/// the program itself.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("attempted to execute non-instruction: bad offset in program")]
    BadOffset,
    #[error("segmentation fault: attempted to read outside of allocated memory segment")]
    ReadOutOfBounds,
    #[error("segmentation fault: attempted to write outside of allocated memory segment")]
    WriteOutOfBounds,
    #[error("could not execute system call {0}: no such service")]
    NoSuchService(u32),
    #[error("unexpected EOF on read operation")]
    UnexpectedEof,
    #[error("input '{0}' is not an integer")]
    InputNotInteger(String),
    #[error("integer division or modulo by zero")]
    DivideByZero,
    /// A decoded instruction whose operands do not fit its mnemonic. Only
    /// reachable through a hand-built or damaged image.
    #[error("malformed instruction '{0}'")]
    MalformedInstruction(Instruction),
    #[error("{0}")]
    Io(#[from] io::Error),
}

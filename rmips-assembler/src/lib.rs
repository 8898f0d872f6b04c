//! A two-pass assembler for the rmips instruction subset.
//!
//! Source text is tokenized into directives, labels, and statements
//! ([`lex`]); pass one classifies them into data entries, raw instructions,
//! and global symbols ([`parse`]); pass two lays out the data segment,
//! resolves labels, and validates every instruction against the instruction
//! table ([`layout`]). The result is an immutable [`Program`] ready to be
//! written as an image or executed directly.

mod layout;
mod lex;
mod parse;
mod string_unescape;

use rmips_types::program::Program;
use thiserror::Error;

/// A fatal assembly error, carrying the offending source line.
///
/// Assembly aborts at the first one; no partial image is produced.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum AssembleError {
    #[error("line {line}: bad input: '{text}'")]
    BadInput { line: usize, text: String },
    #[error("line {line}: directive '{name}' is not recognized")]
    UnknownDirective { line: usize, name: String },
    #[error("line {line}: '{directive}' directive requires integer argument")]
    IntegerArgument { line: usize, directive: &'static str },
    #[error("line {line}: '{directive}' directive requires character string argument")]
    StringArgument { line: usize, directive: &'static str },
    #[error("line {line}: 'space' directive requires integer allocation amount argument")]
    SpaceArgument { line: usize },
    #[error("line {line}: malformed string literal: {reason}")]
    BadStringLiteral { line: usize, reason: String },
    #[error("line {line}: globl symbol '{symbol}' must be in text segment")]
    GloblInData { line: usize, symbol: String },
    #[error("line {line}: directive '{directive}' must be found in data segment")]
    DataDirectiveInText { line: usize, directive: &'static str },
    #[error("line {line}: cannot understand '{text}'")]
    Unrecognized { line: usize, text: String },
    #[error("line {line}: '{name}' is not a valid instruction")]
    UnknownInstruction { line: usize, name: String },
    #[error("line {line}: '{name}' instruction is not formatted correctly")]
    MalformedInstruction { line: usize, name: String },
    #[error("line {line}: cannot resolve label '{label}'")]
    UnresolvedLabel { line: usize, label: String },
    #[error("line {line}: label '{label}' is already in use")]
    DuplicateLabel { line: usize, label: String },
}

/// Assemble source text into a program.
pub fn assemble(source: &str) -> Result<Program, AssembleError> {
    let tokens = lex::tokenize(source)?;
    let collected = parse::classify(&tokens)?;
    layout::build(collected)
}

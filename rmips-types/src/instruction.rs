//! The instruction table: every supported mnemonic, the operand shapes it
//! accepts, and the normalized operand values shared by the assembler and
//! the simulator.

use crate::register::Register;
use either::Either;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use thiserror::Error;

/// A validated instruction record: mnemonic plus normalized operands.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Instruction {
    pub mnemonic: Mnemonic,
    pub operands: Operands,
}

/// The normalized operand list of an instruction.
///
/// Produced by [`Mnemonic::validate`]; raw operand token lists are never
/// mutated in place.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Operands {
    None,
    Reg(Register),
    RegReg(Register, Register),
    RegRegReg(Register, Register, Register),
    RegRegImm(Register, Register, i32),
    /// Last source may be a register or a literal (`sll`, `srl`, `sra`, `rem`)
    RegRegSrc(Register, Register, Either<Register, i32>),
    RegImm(Register, i32),
    RegAddr(Register, Address),
    RegTarget(Register, u32),
    RegRegTarget(Register, Register, u32),
    Target(u32),
}

/// A memory operand, after indirect-address desugaring.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Address {
    /// An absolute byte address
    Direct(u32),
    /// The `offset(base)` form: offset plus the base register's value
    Indirect { offset: i32, base: Register },
}

/// A raw operand as the assembler hands it to validation: either a source
/// token or a label already resolved to its numeric value.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum OperandToken<'a> {
    Word(&'a str),
    Resolved(u32),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum OperandError {
    /// The operand list matches none of the mnemonic's accepted shapes
    #[error("instruction is not formatted correctly")]
    Shape,
    /// An address or branch-target slot held something that is neither a
    /// defined label nor an integer literal
    #[error("cannot resolve label '{0}'")]
    UnresolvedLabel(String),
}

/// Mnemonics of the supported instruction subset.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Mnemonic {
    Add,
    Addu,
    Addi,
    Addiu,
    And,
    Andi,
    Div,
    Divu,
    Mul,
    Mulu,
    Mult,
    Multu,
    Nor,
    Or,
    Ori,
    Rem,
    Sll,
    Sllv,
    Sra,
    Srav,
    Srl,
    Srlv,
    Sub,
    Subu,
    Xor,
    Xori,
    Slt,
    Sltu,
    Slti,
    Sltiu,
    Beq,
    Bgez,
    Bgtz,
    Blez,
    Bne,
    Blt,
    Bgt,
    J,
    Jal,
    Jalr,
    Jr,
    La,
    Lhi,
    Li,
    Llo,
    Lb,
    Lbu,
    Lh,
    Lhu,
    Lw,
    Mfhi,
    Mflo,
    Move,
    Mthi,
    Mtlo,
    Sb,
    Sh,
    Sw,
    Nop,
    Syscall,
}

impl Mnemonic {
    /// Get the mnemonic's source-code name.
    pub fn name(self) -> &'static str {
        match self {
            Mnemonic::Add => "add",
            Mnemonic::Addu => "addu",
            Mnemonic::Addi => "addi",
            Mnemonic::Addiu => "addiu",
            Mnemonic::And => "and",
            Mnemonic::Andi => "andi",
            Mnemonic::Div => "div",
            Mnemonic::Divu => "divu",
            Mnemonic::Mul => "mul",
            Mnemonic::Mulu => "mulu",
            Mnemonic::Mult => "mult",
            Mnemonic::Multu => "multu",
            Mnemonic::Nor => "nor",
            Mnemonic::Or => "or",
            Mnemonic::Ori => "ori",
            Mnemonic::Rem => "rem",
            Mnemonic::Sll => "sll",
            Mnemonic::Sllv => "sllv",
            Mnemonic::Sra => "sra",
            Mnemonic::Srav => "srav",
            Mnemonic::Srl => "srl",
            Mnemonic::Srlv => "srlv",
            Mnemonic::Sub => "sub",
            Mnemonic::Subu => "subu",
            Mnemonic::Xor => "xor",
            Mnemonic::Xori => "xori",
            Mnemonic::Slt => "slt",
            Mnemonic::Sltu => "sltu",
            Mnemonic::Slti => "slti",
            Mnemonic::Sltiu => "sltiu",
            Mnemonic::Beq => "beq",
            Mnemonic::Bgez => "bgez",
            Mnemonic::Bgtz => "bgtz",
            Mnemonic::Blez => "blez",
            Mnemonic::Bne => "bne",
            Mnemonic::Blt => "blt",
            Mnemonic::Bgt => "bgt",
            Mnemonic::J => "j",
            Mnemonic::Jal => "jal",
            Mnemonic::Jalr => "jalr",
            Mnemonic::Jr => "jr",
            Mnemonic::La => "la",
            Mnemonic::Lhi => "lhi",
            Mnemonic::Li => "li",
            Mnemonic::Llo => "llo",
            Mnemonic::Lb => "lb",
            Mnemonic::Lbu => "lbu",
            Mnemonic::Lh => "lh",
            Mnemonic::Lhu => "lhu",
            Mnemonic::Lw => "lw",
            Mnemonic::Mfhi => "mfhi",
            Mnemonic::Mflo => "mflo",
            Mnemonic::Move => "move",
            Mnemonic::Mthi => "mthi",
            Mnemonic::Mtlo => "mtlo",
            Mnemonic::Sb => "sb",
            Mnemonic::Sh => "sh",
            Mnemonic::Sw => "sw",
            Mnemonic::Nop => "nop",
            Mnemonic::Syscall => "syscall",
        }
    }

    /// Check if the mnemonic's final operand may name a label that the
    /// assembler resolves before validation.
    pub fn resolves_labels(self) -> bool {
        matches!(
            self,
            Mnemonic::Beq
                | Mnemonic::Bgez
                | Mnemonic::Bgtz
                | Mnemonic::Blez
                | Mnemonic::Bne
                | Mnemonic::Blt
                | Mnemonic::Bgt
                | Mnemonic::J
                | Mnemonic::Jal
                | Mnemonic::Jalr
                | Mnemonic::Jr
                | Mnemonic::La
                | Mnemonic::Lb
                | Mnemonic::Lbu
                | Mnemonic::Lh
                | Mnemonic::Lhu
                | Mnemonic::Lw
                | Mnemonic::Sb
                | Mnemonic::Sh
                | Mnemonic::Sw
        )
    }

    /// Validate the raw operand list against the mnemonic's accepted shapes
    /// and produce the normalized operands.
    pub fn validate(self, parts: &[OperandToken]) -> Result<Operands, OperandError> {
        use Mnemonic::*;

        match self {
            Add | Addu | And | Nor | Or | Sub | Subu | Xor | Mul | Mulu | Slt | Sltu | Sllv
            | Srav | Srlv => three_registers(parts),
            Addi | Addiu | Andi | Ori | Xori | Slti | Sltiu => register_immediate(parts),
            Sll | Sra | Srl | Rem => register_source(parts),
            Div | Divu | Mult | Multu | Move => two_registers(parts),
            Jr | Jalr | Mfhi | Mflo | Mthi | Mtlo => one_register(parts),
            Beq | Bne | Blt | Bgt => compare_branch(parts),
            Bgez | Bgtz | Blez => zero_branch(parts),
            J | Jal => jump_target(parts),
            La | Li | Lb | Lbu | Lh | Lhu | Lw | Sb | Sh | Sw => register_address(parts),
            Lhi | Llo => half_immediate(parts),
            Nop | Syscall => match parts {
                [] => Ok(Operands::None),
                _ => Err(OperandError::Shape),
            },
        }
    }
}

impl FromStr for Mnemonic {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "add" => Mnemonic::Add,
            "addu" => Mnemonic::Addu,
            "addi" => Mnemonic::Addi,
            "addiu" => Mnemonic::Addiu,
            "and" => Mnemonic::And,
            "andi" => Mnemonic::Andi,
            "div" => Mnemonic::Div,
            "divu" => Mnemonic::Divu,
            "mul" => Mnemonic::Mul,
            "mulu" => Mnemonic::Mulu,
            "mult" => Mnemonic::Mult,
            "multu" => Mnemonic::Multu,
            "nor" => Mnemonic::Nor,
            "or" => Mnemonic::Or,
            "ori" => Mnemonic::Ori,
            "rem" => Mnemonic::Rem,
            "sll" => Mnemonic::Sll,
            "sllv" => Mnemonic::Sllv,
            "sra" => Mnemonic::Sra,
            "srav" => Mnemonic::Srav,
            "srl" => Mnemonic::Srl,
            "srlv" => Mnemonic::Srlv,
            "sub" => Mnemonic::Sub,
            "subu" => Mnemonic::Subu,
            "xor" => Mnemonic::Xor,
            "xori" => Mnemonic::Xori,
            "slt" => Mnemonic::Slt,
            "sltu" => Mnemonic::Sltu,
            "slti" => Mnemonic::Slti,
            "sltiu" => Mnemonic::Sltiu,
            "beq" => Mnemonic::Beq,
            "bgez" => Mnemonic::Bgez,
            "bgtz" => Mnemonic::Bgtz,
            "blez" => Mnemonic::Blez,
            "bne" => Mnemonic::Bne,
            "blt" => Mnemonic::Blt,
            "bgt" => Mnemonic::Bgt,
            "j" => Mnemonic::J,
            "jal" => Mnemonic::Jal,
            "jalr" => Mnemonic::Jalr,
            "jr" => Mnemonic::Jr,
            "la" => Mnemonic::La,
            "lhi" => Mnemonic::Lhi,
            "li" => Mnemonic::Li,
            "llo" => Mnemonic::Llo,
            "lb" => Mnemonic::Lb,
            "lbu" => Mnemonic::Lbu,
            "lh" => Mnemonic::Lh,
            "lhu" => Mnemonic::Lhu,
            "lw" => Mnemonic::Lw,
            "mfhi" => Mnemonic::Mfhi,
            "mflo" => Mnemonic::Mflo,
            "move" => Mnemonic::Move,
            "mthi" => Mnemonic::Mthi,
            "mtlo" => Mnemonic::Mtlo,
            "sb" => Mnemonic::Sb,
            "sh" => Mnemonic::Sh,
            "sw" => Mnemonic::Sw,
            "nop" => Mnemonic::Nop,
            "syscall" => Mnemonic::Syscall,
            _ => return Err(()),
        })
    }
}

// Shape checks. Register slots are checked before address/target slots, so a
// wrong register name reads as a shape mismatch rather than a label error.

fn three_registers(parts: &[OperandToken]) -> Result<Operands, OperandError> {
    match parts {
        [a, b, c] => Ok(Operands::RegRegReg(register(a)?, register(b)?, register(c)?)),
        _ => Err(OperandError::Shape),
    }
}

fn register_immediate(parts: &[OperandToken]) -> Result<Operands, OperandError> {
    match parts {
        [a, b, i] => Ok(Operands::RegRegImm(register(a)?, register(b)?, immediate(i)?)),
        _ => Err(OperandError::Shape),
    }
}

fn register_source(parts: &[OperandToken]) -> Result<Operands, OperandError> {
    match parts {
        [a, b, s] => Ok(Operands::RegRegSrc(register(a)?, register(b)?, source(s)?)),
        _ => Err(OperandError::Shape),
    }
}

fn two_registers(parts: &[OperandToken]) -> Result<Operands, OperandError> {
    match parts {
        [a, b] => Ok(Operands::RegReg(register(a)?, register(b)?)),
        _ => Err(OperandError::Shape),
    }
}

fn one_register(parts: &[OperandToken]) -> Result<Operands, OperandError> {
    match parts {
        [a] => Ok(Operands::Reg(register(a)?)),
        _ => Err(OperandError::Shape),
    }
}

fn compare_branch(parts: &[OperandToken]) -> Result<Operands, OperandError> {
    match parts {
        [a, b, t] => Ok(Operands::RegRegTarget(register(a)?, register(b)?, target(t)?)),
        _ => Err(OperandError::Shape),
    }
}

fn zero_branch(parts: &[OperandToken]) -> Result<Operands, OperandError> {
    match parts {
        [a, t] => Ok(Operands::RegTarget(register(a)?, target(t)?)),
        _ => Err(OperandError::Shape),
    }
}

fn jump_target(parts: &[OperandToken]) -> Result<Operands, OperandError> {
    match parts {
        [t] => Ok(Operands::Target(target(t)?)),
        _ => Err(OperandError::Shape),
    }
}

fn register_address(parts: &[OperandToken]) -> Result<Operands, OperandError> {
    match parts {
        [r, a] => Ok(Operands::RegAddr(register(r)?, address(a)?)),
        _ => Err(OperandError::Shape),
    }
}

fn half_immediate(parts: &[OperandToken]) -> Result<Operands, OperandError> {
    match parts {
        [r, v] => Ok(Operands::RegImm(register(r)?, target(v)? as i32)),
        _ => Err(OperandError::Shape),
    }
}

// Slot parsers over a single raw operand.

fn register(token: &OperandToken) -> Result<Register, OperandError> {
    match token {
        OperandToken::Word(word) => Register::from_name(word).ok_or(OperandError::Shape),
        OperandToken::Resolved(_) => Err(OperandError::Shape),
    }
}

fn immediate(token: &OperandToken) -> Result<i32, OperandError> {
    match token {
        OperandToken::Word(word) => literal(word).map(|v| v as i32).ok_or(OperandError::Shape),
        OperandToken::Resolved(_) => Err(OperandError::Shape),
    }
}

fn source(token: &OperandToken) -> Result<Either<Register, i32>, OperandError> {
    match token {
        OperandToken::Word(word) => match Register::from_name(word) {
            Some(reg) => Ok(Either::Left(reg)),
            None => literal(word)
                .map(|v| Either::Right(v as i32))
                .ok_or(OperandError::Shape),
        },
        OperandToken::Resolved(_) => Err(OperandError::Shape),
    }
}

fn target(token: &OperandToken) -> Result<u32, OperandError> {
    match token {
        OperandToken::Resolved(value) => Ok(*value),
        OperandToken::Word(word) => literal(word)
            .map(|v| v as u32)
            .ok_or_else(|| OperandError::UnresolvedLabel(word.to_string())),
    }
}

fn address(token: &OperandToken) -> Result<Address, OperandError> {
    match token {
        OperandToken::Resolved(value) => Ok(Address::Direct(*value)),
        OperandToken::Word(word) => {
            if let Some(indirect) = indirect(word) {
                return Ok(indirect);
            }
            literal(word)
                .map(|v| Address::Direct(v as u32))
                .ok_or_else(|| OperandError::UnresolvedLabel(word.to_string()))
        }
    }
}

/// Parse the `offset(base)` indirect form. The offset may be omitted.
fn indirect(word: &str) -> Option<Address> {
    let open = word.find('(')?;
    let base = word[open + 1..].strip_suffix(')')?;
    let base = Register::from_name(base)?;
    let offset = match &word[..open] {
        "" => 0,
        digits => literal(digits)? as i32,
    };
    Some(Address::Indirect { offset, base })
}

/// Parse an integer literal: an optionally negated run of decimal digits.
fn literal(word: &str) -> Option<i64> {
    let digits = word.strip_prefix('-').unwrap_or(word);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    word.parse().ok()
}

impl Display for Instruction {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic.name())?;
        match &self.operands {
            Operands::None => Ok(()),
            Operands::Reg(a) => write!(f, " {}", a),
            Operands::RegReg(a, b) => write!(f, " {}, {}", a, b),
            Operands::RegRegReg(a, b, c) => write!(f, " {}, {}, {}", a, b, c),
            Operands::RegRegImm(a, b, i) => write!(f, " {}, {}, {}", a, b, i),
            Operands::RegRegSrc(a, b, s) => write!(f, " {}, {}, {}", a, b, s),
            Operands::RegImm(a, i) => write!(f, " {}, {}", a, i),
            Operands::RegAddr(a, addr) => write!(f, " {}, {}", a, addr),
            Operands::RegTarget(a, t) => write!(f, " {}, {}", a, t),
            Operands::RegRegTarget(a, b, t) => write!(f, " {}, {}, {}", a, b, t),
            Operands::Target(t) => write!(f, " {}", t),
        }
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Address::Direct(value) => write!(f, "{}", value),
            Address::Indirect { offset, base } => write!(f, "{}({})", offset, base),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words<'a>(parts: &[&'a str]) -> Vec<OperandToken<'a>> {
        parts.iter().copied().map(OperandToken::Word).collect()
    }

    #[test]
    fn three_register_shape() {
        let reg = |name| Register::from_name(name).unwrap();
        assert_eq!(
            Mnemonic::Add.validate(&words(&["$t0", "$t1", "$t2"])),
            Ok(Operands::RegRegReg(reg("$t0"), reg("$t1"), reg("$t2"))),
        );
        assert_eq!(
            Mnemonic::Add.validate(&words(&["$t0", "$t1"])),
            Err(OperandError::Shape),
        );
        assert_eq!(
            Mnemonic::Add.validate(&words(&["$t0", "$t1", "17"])),
            Err(OperandError::Shape),
        );
    }

    #[test]
    fn shift_amount_may_be_register_or_literal() {
        let reg = |name| Register::from_name(name).unwrap();
        assert_eq!(
            Mnemonic::Sll.validate(&words(&["$t0", "$t1", "4"])),
            Ok(Operands::RegRegSrc(reg("$t0"), reg("$t1"), Either::Right(4))),
        );
        assert_eq!(
            Mnemonic::Sra.validate(&words(&["$t0", "$t1", "$t2"])),
            Ok(Operands::RegRegSrc(reg("$t0"), reg("$t1"), Either::Left(reg("$t2")))),
        );
    }

    #[test]
    fn indirect_addresses_are_desugared() {
        let reg = |name| Register::from_name(name).unwrap();
        assert_eq!(
            Mnemonic::Lw.validate(&words(&["$t0", "-4($sp)"])),
            Ok(Operands::RegAddr(
                reg("$t0"),
                Address::Indirect { offset: -4, base: reg("$sp") },
            )),
        );
        // the offset may be omitted
        assert_eq!(
            Mnemonic::Sb.validate(&words(&["$t0", "($gp)"])),
            Ok(Operands::RegAddr(
                reg("$t0"),
                Address::Indirect { offset: 0, base: reg("$gp") },
            )),
        );
        // 'la'/'li' accept the indirect form too
        assert_eq!(
            Mnemonic::Li.validate(&words(&["$a0", "8($t1)"])),
            Ok(Operands::RegAddr(
                reg("$a0"),
                Address::Indirect { offset: 8, base: reg("$t1") },
            )),
        );
    }

    #[test]
    fn unresolved_labels_are_reported() {
        assert_eq!(
            Mnemonic::Lw.validate(&words(&["$t0", "missing"])),
            Err(OperandError::UnresolvedLabel("missing".to_string())),
        );
        assert_eq!(
            Mnemonic::Beq.validate(&words(&["$t0", "$t1", "nowhere"])),
            Err(OperandError::UnresolvedLabel("nowhere".to_string())),
        );
    }

    #[test]
    fn resolved_labels_become_targets() {
        let reg = |name| Register::from_name(name).unwrap();
        let parts = [
            OperandToken::Word("$t0"),
            OperandToken::Word("$t1"),
            OperandToken::Resolved(7),
        ];
        assert_eq!(
            Mnemonic::Beq.validate(&parts),
            Ok(Operands::RegRegTarget(reg("$t0"), reg("$t1"), 7)),
        );
        assert_eq!(
            Mnemonic::J.validate(&[OperandToken::Resolved(3)]),
            Ok(Operands::Target(3)),
        );
    }

    #[test]
    fn no_operand_shapes_are_strict() {
        assert_eq!(Mnemonic::Nop.validate(&[]), Ok(Operands::None));
        assert_eq!(Mnemonic::Syscall.validate(&[]), Ok(Operands::None));
        assert_eq!(
            Mnemonic::Nop.validate(&words(&["$t0"])),
            Err(OperandError::Shape),
        );
    }

    #[test]
    fn half_load_takes_a_literal() {
        let reg = |name| Register::from_name(name).unwrap();
        assert_eq!(
            Mnemonic::Lhi.validate(&words(&["$t0", "255"])),
            Ok(Operands::RegImm(reg("$t0"), 255)),
        );
        assert_eq!(
            Mnemonic::Llo.validate(&words(&["$t0", "4($sp)"])),
            Err(OperandError::UnresolvedLabel("4($sp)".to_string())),
        );
    }

    #[test]
    fn names_round_trip() {
        for name in &["add", "sltiu", "bgez", "jalr", "asciiz-not-an-op"] {
            match name.parse::<Mnemonic>() {
                Ok(mnemonic) => assert_eq!(mnemonic.name(), *name),
                Err(()) => assert_eq!(*name, "asciiz-not-an-op"),
            }
        }
    }

    #[test]
    fn display_matches_source_syntax() {
        let reg = |name| Register::from_name(name).unwrap();
        let instruction = Instruction {
            mnemonic: Mnemonic::Lw,
            operands: Operands::RegAddr(
                reg("$t0"),
                Address::Indirect { offset: -4, base: reg("$sp") },
            ),
        };
        assert_eq!(instruction.to_string(), "lw $t0, -4($sp)");
    }
}

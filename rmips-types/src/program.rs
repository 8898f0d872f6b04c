//! The program image: an assembled program and its on-disk codec.

use crate::instruction::{Address, Instruction, Mnemonic, Operands};
use crate::register::Register;
use either::Either;
use std::io;
use std::io::{Read, Write};

pub const IMAGE_MAGIC: u16 = 0x4D50;
pub const IMAGE_VERSION: u16 = 1;

// Operand encoding tags
const TAG_NONE: u8 = 0;
const TAG_REG: u8 = 1;
const TAG_REG_REG: u8 = 2;
const TAG_REG_REG_REG: u8 = 3;
const TAG_REG_REG_IMM: u8 = 4;
const TAG_REG_REG_SRC: u8 = 5;
const TAG_REG_IMM: u8 = 6;
const TAG_REG_ADDR: u8 = 7;
const TAG_REG_TARGET: u8 = 8;
const TAG_REG_REG_TARGET: u8 = 9;
const TAG_TARGET: u8 = 10;

const ADDR_DIRECT: u8 = 0;
const ADDR_INDIRECT: u8 = 1;
const SRC_REGISTER: u8 = 0;
const SRC_LITERAL: u8 = 1;

/// An assembled program: the immutable instruction sequence plus the
/// laid-out data segment bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Program {
    pub instructions: Vec<Instruction>,
    pub data: Vec<u8>,
}

impl Program {
    /// Parse the input as a program image.
    pub fn parse<R: Read>(input: &mut R) -> io::Result<Self> {
        let magic = read_u16(input)?;

        if magic != IMAGE_MAGIC {
            return Err(invalid_data("invalid magic number"));
        }

        let version = read_u16(input)?;

        if version != IMAGE_VERSION {
            return Err(invalid_data("unknown version number"));
        }

        let instruction_count = read_u32(input)?;
        let data_length = read_u32(input)?;

        let instructions = (0..instruction_count)
            .map(|_| read_instruction(input))
            .collect::<io::Result<_>>()?;

        let mut data = vec![0; data_length as usize];
        input.read_exact(&mut data)?;

        Ok(Program { instructions, data })
    }

    /// Write the program as an image.
    pub fn write<W: Write>(&self, output: &mut W) -> io::Result<()> {
        output.write_all(&IMAGE_MAGIC.to_be_bytes())?;
        output.write_all(&IMAGE_VERSION.to_be_bytes())?;
        output.write_all(&(self.instructions.len() as u32).to_be_bytes())?;
        output.write_all(&(self.data.len() as u32).to_be_bytes())?;

        for instruction in &self.instructions {
            write_instruction(output, instruction)?;
        }

        output.write_all(&self.data)
    }
}

fn write_instruction<W: Write>(output: &mut W, instruction: &Instruction) -> io::Result<()> {
    let name = instruction.mnemonic.name();
    output.write_all(&[name.len() as u8])?;
    output.write_all(name.as_bytes())?;

    match &instruction.operands {
        Operands::None => output.write_all(&[TAG_NONE]),
        Operands::Reg(a) => {
            output.write_all(&[TAG_REG])?;
            write_register(output, *a)
        }
        Operands::RegReg(a, b) => {
            output.write_all(&[TAG_REG_REG])?;
            write_register(output, *a)?;
            write_register(output, *b)
        }
        Operands::RegRegReg(a, b, c) => {
            output.write_all(&[TAG_REG_REG_REG])?;
            write_register(output, *a)?;
            write_register(output, *b)?;
            write_register(output, *c)
        }
        Operands::RegRegImm(a, b, immediate) => {
            output.write_all(&[TAG_REG_REG_IMM])?;
            write_register(output, *a)?;
            write_register(output, *b)?;
            output.write_all(&immediate.to_be_bytes())
        }
        Operands::RegRegSrc(a, b, source) => {
            output.write_all(&[TAG_REG_REG_SRC])?;
            write_register(output, *a)?;
            write_register(output, *b)?;
            match source {
                Either::Left(reg) => {
                    output.write_all(&[SRC_REGISTER])?;
                    write_register(output, *reg)
                }
                Either::Right(value) => {
                    output.write_all(&[SRC_LITERAL])?;
                    output.write_all(&value.to_be_bytes())
                }
            }
        }
        Operands::RegImm(a, immediate) => {
            output.write_all(&[TAG_REG_IMM])?;
            write_register(output, *a)?;
            output.write_all(&immediate.to_be_bytes())
        }
        Operands::RegAddr(a, address) => {
            output.write_all(&[TAG_REG_ADDR])?;
            write_register(output, *a)?;
            write_address(output, address)
        }
        Operands::RegTarget(a, target) => {
            output.write_all(&[TAG_REG_TARGET])?;
            write_register(output, *a)?;
            output.write_all(&target.to_be_bytes())
        }
        Operands::RegRegTarget(a, b, target) => {
            output.write_all(&[TAG_REG_REG_TARGET])?;
            write_register(output, *a)?;
            write_register(output, *b)?;
            output.write_all(&target.to_be_bytes())
        }
        Operands::Target(target) => {
            output.write_all(&[TAG_TARGET])?;
            output.write_all(&target.to_be_bytes())
        }
    }
}

fn write_address<W: Write>(output: &mut W, address: &Address) -> io::Result<()> {
    match address {
        Address::Direct(value) => {
            output.write_all(&[ADDR_DIRECT])?;
            output.write_all(&value.to_be_bytes())
        }
        Address::Indirect { offset, base } => {
            output.write_all(&[ADDR_INDIRECT])?;
            output.write_all(&offset.to_be_bytes())?;
            write_register(output, *base)
        }
    }
}

fn write_register<W: Write>(output: &mut W, register: Register) -> io::Result<()> {
    output.write_all(&[register.index() as u8])
}

fn read_instruction<R: Read>(input: &mut R) -> io::Result<Instruction> {
    let length = read_u8(input)? as usize;
    let mut name = vec![0; length];
    input.read_exact(&mut name)?;
    let name = String::from_utf8(name).map_err(|_| invalid_data("malformed mnemonic"))?;
    let mnemonic: Mnemonic = name
        .parse()
        .map_err(|()| invalid_data("unknown mnemonic"))?;

    let operands = match read_u8(input)? {
        TAG_NONE => Operands::None,
        TAG_REG => Operands::Reg(read_register(input)?),
        TAG_REG_REG => Operands::RegReg(read_register(input)?, read_register(input)?),
        TAG_REG_REG_REG => Operands::RegRegReg(
            read_register(input)?,
            read_register(input)?,
            read_register(input)?,
        ),
        TAG_REG_REG_IMM => Operands::RegRegImm(
            read_register(input)?,
            read_register(input)?,
            read_u32(input)? as i32,
        ),
        TAG_REG_REG_SRC => {
            let a = read_register(input)?;
            let b = read_register(input)?;
            let source = match read_u8(input)? {
                SRC_REGISTER => Either::Left(read_register(input)?),
                SRC_LITERAL => Either::Right(read_u32(input)? as i32),
                _ => return Err(invalid_data("unknown source operand tag")),
            };
            Operands::RegRegSrc(a, b, source)
        }
        TAG_REG_IMM => Operands::RegImm(read_register(input)?, read_u32(input)? as i32),
        TAG_REG_ADDR => Operands::RegAddr(read_register(input)?, read_address(input)?),
        TAG_REG_TARGET => Operands::RegTarget(read_register(input)?, read_u32(input)?),
        TAG_REG_REG_TARGET => Operands::RegRegTarget(
            read_register(input)?,
            read_register(input)?,
            read_u32(input)?,
        ),
        TAG_TARGET => Operands::Target(read_u32(input)?),
        _ => return Err(invalid_data("unknown operand tag")),
    };

    Ok(Instruction { mnemonic, operands })
}

fn read_address<R: Read>(input: &mut R) -> io::Result<Address> {
    match read_u8(input)? {
        ADDR_DIRECT => Ok(Address::Direct(read_u32(input)?)),
        ADDR_INDIRECT => Ok(Address::Indirect {
            offset: read_u32(input)? as i32,
            base: read_register(input)?,
        }),
        _ => Err(invalid_data("unknown address tag")),
    }
}

fn read_register<R: Read>(input: &mut R) -> io::Result<Register> {
    let index = read_u8(input)?;
    Register::from_index(index).ok_or_else(|| invalid_data("register index out of range"))
}

fn read_u8<R: Read>(input: &mut R) -> io::Result<u8> {
    let mut bytes = [0; 1];
    input.read_exact(&mut bytes)?;
    Ok(bytes[0])
}

fn read_u16<R: Read>(input: &mut R) -> io::Result<u16> {
    let mut bytes = [0; 2];
    input.read_exact(&mut bytes)?;
    Ok(u16::from_be_bytes(bytes))
}

fn read_u32<R: Read>(input: &mut R) -> io::Result<u32> {
    let mut bytes = [0; 4];
    input.read_exact(&mut bytes)?;
    Ok(u32::from_be_bytes(bytes))
}

fn invalid_data(message: &str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message)
}

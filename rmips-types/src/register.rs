use crate::constants::REGISTER_NAMES;
use std::fmt;
use std::fmt::{Display, Formatter};

/// Total register slots: `$0`-`$31` plus the `HI`/`LO` specials.
pub const REGISTER_COUNT: usize = 34;

/// A register slot, identified by its index into the register file.
///
/// Unlike hardware MIPS, `$zero` is an ordinary slot: a write to it is
/// visible to later reads.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Register(u8);

impl Register {
    pub const V0: Register = Register(2);
    pub const A0: Register = Register(4);
    pub const A1: Register = Register(5);
    /// The stack pointer register
    pub const SP: Register = Register(29);
    /// The link register written by `jal`/`jalr`
    pub const RA: Register = Register(31);
    pub const HI: Register = Register(32);
    pub const LO: Register = Register(33);

    /// Look up a register by the name it has in source code: `$N` numbering,
    /// any of the conventional aliases, or the bare `HI`/`LO` specials.
    pub fn from_name(name: &str) -> Option<Register> {
        match name {
            "HI" => return Some(Register::HI),
            "LO" => return Some(Register::LO),
            _ => {}
        }

        let name = name.strip_prefix('$')?;

        if !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit()) {
            return name.parse::<u8>().ok().filter(|num| *num < 32).map(Register);
        }

        let number = match name {
            "zero" | "r0" => 0,
            "at" => 1,
            "v0" => 2,
            "v1" => 3,
            "a0" => 4,
            "a1" => 5,
            "a2" => 6,
            "a3" => 7,
            "t0" => 8,
            "t1" => 9,
            "t2" => 10,
            "t3" => 11,
            "t4" => 12,
            "t5" => 13,
            "t6" => 14,
            "t7" => 15,
            "s0" => 16,
            "s1" => 17,
            "s2" => 18,
            "s3" => 19,
            "s4" => 20,
            "s5" => 21,
            "s6" => 22,
            "s7" => 23,
            "t8" => 24,
            "t9" => 25,
            "k0" => 26,
            "k1" => 27,
            "gp" => 28,
            "sp" => 29,
            "fp" | "s8" => 30,
            "ra" => 31,
            _ => return None,
        };

        Some(Register(number))
    }

    /// Get the register with the given index. If the index is out of range,
    /// None is returned.
    pub fn from_index(index: u8) -> Option<Register> {
        if (index as usize) < REGISTER_COUNT {
            Some(Register(index))
        } else {
            None
        }
    }

    /// Get the register's index into the register file.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Pretty-print the register using its canonical name
impl Display for Register {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match *self {
            Register::HI => f.write_str("HI"),
            Register::LO => f.write_str("LO"),
            _ => f.write_str(REGISTER_NAMES[self.0 as usize]),
        }
    }
}

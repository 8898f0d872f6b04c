//! Loads and stores.
//!
//! Each takes a normalized memory operand: a direct address or a desugared
//! `offset(base)` pair. Byte and halfword loads sign-extend or zero-extend
//! per the mnemonic; stores truncate the source register to the access
//! width.

use crate::console::Console;
use crate::error::RuntimeError;
use crate::Processor;
use rmips_types::instruction::Address;
use rmips_types::register::Register;

impl<C: Console> Processor<C> {
    /// Load byte (sign-extended)
    pub(crate) fn op_lb(&mut self, t: Register, address: Address) -> Result<(), RuntimeError> {
        let address = self.effective_address(address);
        let value = self.memory.get(address)? as i8;
        self.set_reg(t, value as i32 as u32);
        Ok(())
    }

    /// Load byte (zero-extended)
    pub(crate) fn op_lbu(&mut self, t: Register, address: Address) -> Result<(), RuntimeError> {
        let address = self.effective_address(address);
        let value = self.memory.get(address)?;
        self.set_reg(t, value as u32);
        Ok(())
    }

    /// Load halfword (sign-extended)
    pub(crate) fn op_lh(&mut self, t: Register, address: Address) -> Result<(), RuntimeError> {
        let address = self.effective_address(address);
        let value = self.memory.get_halfword(address)? as i16;
        self.set_reg(t, value as i32 as u32);
        Ok(())
    }

    /// Load halfword (zero-extended)
    pub(crate) fn op_lhu(&mut self, t: Register, address: Address) -> Result<(), RuntimeError> {
        let address = self.effective_address(address);
        let value = self.memory.get_halfword(address)?;
        self.set_reg(t, value as u32);
        Ok(())
    }

    /// Load word
    pub(crate) fn op_lw(&mut self, t: Register, address: Address) -> Result<(), RuntimeError> {
        let address = self.effective_address(address);
        let value = self.memory.get_word(address)?;
        self.set_reg(t, value);
        Ok(())
    }

    /// Store byte
    pub(crate) fn op_sb(&mut self, t: Register, address: Address) -> Result<(), RuntimeError> {
        let address = self.effective_address(address);
        let value = self.reg(t) as u8;
        self.memory.set(address, value)
    }

    /// Store halfword
    pub(crate) fn op_sh(&mut self, t: Register, address: Address) -> Result<(), RuntimeError> {
        let address = self.effective_address(address);
        let value = self.reg(t) as u16;
        self.memory.set_halfword(address, value)
    }

    /// Store word
    pub(crate) fn op_sw(&mut self, t: Register, address: Address) -> Result<(), RuntimeError> {
        let address = self.effective_address(address);
        let value = self.reg(t);
        self.memory.set_word(address, value)
    }
}

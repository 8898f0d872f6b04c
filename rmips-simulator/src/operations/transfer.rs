//! Register transfers and the load-immediate family.

use crate::console::Console;
use crate::error::RuntimeError;
use crate::Processor;
use rmips_types::instruction::Address;
use rmips_types::register::Register;

impl<C: Console> Processor<C> {
    /// Load address: a direct address or a base+offset sum. `li` is an
    /// alias of this operation.
    pub(crate) fn op_la(&mut self, t: Register, address: Address) -> Result<(), RuntimeError> {
        let value = self.effective_address(address) as u32;
        self.set_reg(t, value);
        Ok(())
    }

    /// Load the upper halfword, keeping the lower half
    pub(crate) fn op_lhi(&mut self, t: Register, immediate: i32) -> Result<(), RuntimeError> {
        let value = (self.reg(t) & 0xFFFF) | ((immediate as u32) << 16);
        self.set_reg(t, value);
        Ok(())
    }

    /// Load the lower halfword, keeping the upper half
    pub(crate) fn op_llo(&mut self, t: Register, immediate: i32) -> Result<(), RuntimeError> {
        let value = (self.reg(t) & 0xFFFF_0000) | (immediate as u32 & 0xFFFF);
        self.set_reg(t, value);
        Ok(())
    }

    /// Copy a register
    pub(crate) fn op_move(&mut self, d: Register, s: Register) -> Result<(), RuntimeError> {
        let value = self.reg(s);
        self.set_reg(d, value);
        Ok(())
    }

    /// Move from HI
    pub(crate) fn op_mfhi(&mut self, d: Register) -> Result<(), RuntimeError> {
        let value = self.reg(Register::HI);
        self.set_reg(d, value);
        Ok(())
    }

    /// Move from LO
    pub(crate) fn op_mflo(&mut self, d: Register) -> Result<(), RuntimeError> {
        let value = self.reg(Register::LO);
        self.set_reg(d, value);
        Ok(())
    }

    /// Move to HI
    pub(crate) fn op_mthi(&mut self, s: Register) -> Result<(), RuntimeError> {
        let value = self.reg(s);
        self.set_reg(Register::HI, value);
        Ok(())
    }

    /// Move to LO
    pub(crate) fn op_mtlo(&mut self, s: Register) -> Result<(), RuntimeError> {
        let value = self.reg(s);
        self.set_reg(Register::LO, value);
        Ok(())
    }
}

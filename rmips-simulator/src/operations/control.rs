//! Branches and jumps.
//!
//! Branch comparisons are signed, and every target is an absolute index into
//! the instruction sequence. The program counter has already moved past the
//! current instruction by the time these run, so the link value written by
//! `jal`/`jalr` is the index of the instruction after the jump.

use crate::console::Console;
use crate::error::RuntimeError;
use crate::Processor;
use rmips_types::register::Register;

impl<C: Console> Processor<C> {
    /// Branch on equal
    pub(crate) fn op_beq(&mut self, s: Register, t: Register, target: u32) -> Result<(), RuntimeError> {
        if self.reg_signed(s) == self.reg_signed(t) {
            self.jump_to(target);
        }
        Ok(())
    }

    /// Branch on not equal
    pub(crate) fn op_bne(&mut self, s: Register, t: Register, target: u32) -> Result<(), RuntimeError> {
        if self.reg_signed(s) != self.reg_signed(t) {
            self.jump_to(target);
        }
        Ok(())
    }

    /// Branch on less than
    pub(crate) fn op_blt(&mut self, s: Register, t: Register, target: u32) -> Result<(), RuntimeError> {
        if self.reg_signed(s) < self.reg_signed(t) {
            self.jump_to(target);
        }
        Ok(())
    }

    /// Branch on greater than
    pub(crate) fn op_bgt(&mut self, s: Register, t: Register, target: u32) -> Result<(), RuntimeError> {
        if self.reg_signed(s) > self.reg_signed(t) {
            self.jump_to(target);
        }
        Ok(())
    }

    /// Branch on greater than or equal to zero
    pub(crate) fn op_bgez(&mut self, s: Register, target: u32) -> Result<(), RuntimeError> {
        if self.reg_signed(s) >= 0 {
            self.jump_to(target);
        }
        Ok(())
    }

    /// Branch on greater than zero
    pub(crate) fn op_bgtz(&mut self, s: Register, target: u32) -> Result<(), RuntimeError> {
        if self.reg_signed(s) > 0 {
            self.jump_to(target);
        }
        Ok(())
    }

    /// Branch on less than or equal to zero
    pub(crate) fn op_blez(&mut self, s: Register, target: u32) -> Result<(), RuntimeError> {
        if self.reg_signed(s) <= 0 {
            self.jump_to(target);
        }
        Ok(())
    }

    /// Jump
    pub(crate) fn op_j(&mut self, target: u32) -> Result<(), RuntimeError> {
        self.jump_to(target);
        Ok(())
    }

    /// Jump and link
    pub(crate) fn op_jal(&mut self, target: u32) -> Result<(), RuntimeError> {
        self.set_reg(Register::RA, self.program_counter as u32);
        self.jump_to(target);
        Ok(())
    }

    /// Jump to the address in a register
    pub(crate) fn op_jr(&mut self, s: Register) -> Result<(), RuntimeError> {
        let target = self.reg(s);
        self.jump_to(target);
        Ok(())
    }

    /// Jump and link to the address in a register
    pub(crate) fn op_jalr(&mut self, s: Register) -> Result<(), RuntimeError> {
        self.set_reg(Register::RA, self.program_counter as u32);
        let target = self.reg(s);
        self.jump_to(target);
        Ok(())
    }
}

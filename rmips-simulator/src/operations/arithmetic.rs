//! Arithmetic, logic, comparison, and shift operations.
//!
//! Everything is 32-bit with silent wraparound; there is no overflow trap in
//! this machine model. Division and remainder truncate toward zero, and a
//! zero divisor is a runtime fault.

use crate::console::Console;
use crate::error::RuntimeError;
use crate::Processor;
use either::Either;
use rmips_types::register::Register;

impl<C: Console> Processor<C> {
    /// Add (signed)
    pub(crate) fn op_add(&mut self, d: Register, s: Register, t: Register) -> Result<(), RuntimeError> {
        let value = self.reg_signed(s).wrapping_add(self.reg_signed(t));
        self.set_reg(d, value as u32);
        Ok(())
    }

    /// Add (unsigned)
    pub(crate) fn op_addu(&mut self, d: Register, s: Register, t: Register) -> Result<(), RuntimeError> {
        let value = self.reg(s).wrapping_add(self.reg(t));
        self.set_reg(d, value);
        Ok(())
    }

    /// Add immediate (signed)
    pub(crate) fn op_addi(&mut self, d: Register, s: Register, immediate: i32) -> Result<(), RuntimeError> {
        let value = self.reg_signed(s).wrapping_add(immediate);
        self.set_reg(d, value as u32);
        Ok(())
    }

    /// Add immediate (unsigned)
    pub(crate) fn op_addiu(&mut self, d: Register, s: Register, immediate: i32) -> Result<(), RuntimeError> {
        let value = self.reg(s).wrapping_add(immediate as u32);
        self.set_reg(d, value);
        Ok(())
    }

    /// Bitwise and
    pub(crate) fn op_and(&mut self, d: Register, s: Register, t: Register) -> Result<(), RuntimeError> {
        let value = self.reg(s) & self.reg(t);
        self.set_reg(d, value);
        Ok(())
    }

    /// Bitwise and immediate
    pub(crate) fn op_andi(&mut self, d: Register, s: Register, immediate: i32) -> Result<(), RuntimeError> {
        let value = self.reg(s) & immediate as u32;
        self.set_reg(d, value);
        Ok(())
    }

    /// Bitwise or
    pub(crate) fn op_or(&mut self, d: Register, s: Register, t: Register) -> Result<(), RuntimeError> {
        let value = self.reg(s) | self.reg(t);
        self.set_reg(d, value);
        Ok(())
    }

    /// Bitwise or immediate
    pub(crate) fn op_ori(&mut self, d: Register, s: Register, immediate: i32) -> Result<(), RuntimeError> {
        let value = self.reg(s) | immediate as u32;
        self.set_reg(d, value);
        Ok(())
    }

    /// Bitwise exclusive or
    pub(crate) fn op_xor(&mut self, d: Register, s: Register, t: Register) -> Result<(), RuntimeError> {
        let value = self.reg(s) ^ self.reg(t);
        self.set_reg(d, value);
        Ok(())
    }

    /// Bitwise exclusive or immediate
    pub(crate) fn op_xori(&mut self, d: Register, s: Register, immediate: i32) -> Result<(), RuntimeError> {
        let value = self.reg(s) ^ immediate as u32;
        self.set_reg(d, value);
        Ok(())
    }

    /// Bitwise not-or
    pub(crate) fn op_nor(&mut self, d: Register, s: Register, t: Register) -> Result<(), RuntimeError> {
        let value = !(self.reg(s) | self.reg(t));
        self.set_reg(d, value);
        Ok(())
    }

    /// Subtract (signed)
    pub(crate) fn op_sub(&mut self, d: Register, s: Register, t: Register) -> Result<(), RuntimeError> {
        let value = self.reg_signed(s).wrapping_sub(self.reg_signed(t));
        self.set_reg(d, value as u32);
        Ok(())
    }

    /// Subtract (unsigned)
    pub(crate) fn op_subu(&mut self, d: Register, s: Register, t: Register) -> Result<(), RuntimeError> {
        let value = self.reg(s).wrapping_sub(self.reg(t));
        self.set_reg(d, value);
        Ok(())
    }

    /// Multiply (signed), low word only; HI/LO are untouched
    pub(crate) fn op_mul(&mut self, d: Register, s: Register, t: Register) -> Result<(), RuntimeError> {
        let value = self.reg_signed(s).wrapping_mul(self.reg_signed(t));
        self.set_reg(d, value as u32);
        Ok(())
    }

    /// Multiply (unsigned), low word only; HI/LO are untouched
    pub(crate) fn op_mulu(&mut self, d: Register, s: Register, t: Register) -> Result<(), RuntimeError> {
        let value = self.reg(s).wrapping_mul(self.reg(t));
        self.set_reg(d, value);
        Ok(())
    }

    /// Multiply (signed) into HI:LO
    pub(crate) fn op_mult(&mut self, s: Register, t: Register) -> Result<(), RuntimeError> {
        let product = self.reg_signed(s) as i64 * self.reg_signed(t) as i64;
        self.set_reg(Register::HI, (product >> 32) as u32);
        self.set_reg(Register::LO, product as u32);
        Ok(())
    }

    /// Multiply (unsigned) into HI:LO
    pub(crate) fn op_multu(&mut self, s: Register, t: Register) -> Result<(), RuntimeError> {
        let product = self.reg(s) as u64 * self.reg(t) as u64;
        self.set_reg(Register::HI, (product >> 32) as u32);
        self.set_reg(Register::LO, product as u32);
        Ok(())
    }

    /// Divide (signed): HI holds the remainder, LO the quotient
    pub(crate) fn op_div(&mut self, s: Register, t: Register) -> Result<(), RuntimeError> {
        let divisor = self.reg_signed(t);

        if divisor == 0 {
            return Err(RuntimeError::DivideByZero);
        }

        let dividend = self.reg_signed(s);
        self.set_reg(Register::HI, dividend.wrapping_rem(divisor) as u32);
        self.set_reg(Register::LO, dividend.wrapping_div(divisor) as u32);
        Ok(())
    }

    /// Divide (unsigned): HI holds the remainder, LO the quotient
    pub(crate) fn op_divu(&mut self, s: Register, t: Register) -> Result<(), RuntimeError> {
        let divisor = self.reg(t);

        if divisor == 0 {
            return Err(RuntimeError::DivideByZero);
        }

        let dividend = self.reg(s);
        self.set_reg(Register::HI, dividend % divisor);
        self.set_reg(Register::LO, dividend / divisor);
        Ok(())
    }

    /// Remainder (signed); the second source may be a register or a literal
    pub(crate) fn op_rem(&mut self, d: Register, s: Register, source: Either<Register, i32>) -> Result<(), RuntimeError> {
        let divisor = self.source(source) as i32;

        if divisor == 0 {
            return Err(RuntimeError::DivideByZero);
        }

        let value = self.reg_signed(s).wrapping_rem(divisor);
        self.set_reg(d, value as u32);
        Ok(())
    }

    /// Shift left logical; the amount may be a register or a literal
    pub(crate) fn op_sll(&mut self, d: Register, s: Register, amount: Either<Register, i32>) -> Result<(), RuntimeError> {
        let amount = self.source(amount);
        let value = self.reg(s).checked_shl(amount).unwrap_or(0);
        self.set_reg(d, value);
        Ok(())
    }

    /// Shift right logical; the amount may be a register or a literal
    pub(crate) fn op_srl(&mut self, d: Register, s: Register, amount: Either<Register, i32>) -> Result<(), RuntimeError> {
        let amount = self.source(amount);
        let value = self.reg(s).checked_shr(amount).unwrap_or(0);
        self.set_reg(d, value);
        Ok(())
    }

    /// Shift right arithmetic: the sign bit fills in from the left. Amounts
    /// past 31 saturate to a full sign fill.
    pub(crate) fn op_sra(&mut self, d: Register, s: Register, amount: Either<Register, i32>) -> Result<(), RuntimeError> {
        let amount = self.source(amount).min(31);
        let value = self.reg_signed(s) >> amount;
        self.set_reg(d, value as u32);
        Ok(())
    }

    /// Set on less than (signed)
    pub(crate) fn op_slt(&mut self, d: Register, s: Register, t: Register) -> Result<(), RuntimeError> {
        let value = (self.reg_signed(s) < self.reg_signed(t)) as u32;
        self.set_reg(d, value);
        Ok(())
    }

    /// Set on less than (unsigned)
    pub(crate) fn op_sltu(&mut self, d: Register, s: Register, t: Register) -> Result<(), RuntimeError> {
        let value = (self.reg(s) < self.reg(t)) as u32;
        self.set_reg(d, value);
        Ok(())
    }

    /// Set on less than immediate (signed)
    pub(crate) fn op_slti(&mut self, d: Register, s: Register, immediate: i32) -> Result<(), RuntimeError> {
        let value = (self.reg_signed(s) < immediate) as u32;
        self.set_reg(d, value);
        Ok(())
    }

    /// Set on less than immediate (unsigned comparison of the bit patterns)
    pub(crate) fn op_sltiu(&mut self, d: Register, s: Register, immediate: i32) -> Result<(), RuntimeError> {
        let value = (self.reg(s) < immediate as u32) as u32;
        self.set_reg(d, value);
        Ok(())
    }
}

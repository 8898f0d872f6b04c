//! The syscall dispatch table, keyed on the service number in `$v0`.

use crate::console::Console;
use crate::error::RuntimeError;
use crate::Processor;
use log::trace;
use rmips_types::constants::*;
use rmips_types::register::Register;

impl<C: Console> Processor<C> {
    /// Handle a syscall operation
    pub(crate) fn op_syscall(&mut self) -> Result<(), RuntimeError> {
        match self.reg(Register::V0) {
            SYSCALL_PRINT_INT => self.syscall_print_int(),
            SYSCALL_PRINT_STR => self.syscall_print_str(),
            SYSCALL_READ_INT => self.syscall_read_int(),
            SYSCALL_READ_STR => self.syscall_read_str(),
            SYSCALL_EXIT => self.syscall_exit(),
            SYSCALL_PRINT_CHAR => self.syscall_print_char(),
            SYSCALL_READ_CHAR => self.syscall_read_char(),
            service => Err(RuntimeError::NoSuchService(service)),
        }
    }

    /// Print the integer in `$a0`
    fn syscall_print_int(&mut self) -> Result<(), RuntimeError> {
        trace!("PRINT_INT");
        let value = self.reg_signed(Register::A0);
        self.console.print(value.to_string().as_bytes())
    }

    /// Print the NUL-terminated string `$a0` points at
    fn syscall_print_str(&mut self) -> Result<(), RuntimeError> {
        trace!("PRINT_STR");
        let address = self.reg_signed(Register::A0) as i64;
        let bytes = self.memory.get_str(address)?;
        self.console.print(&bytes)
    }

    /// Read an integer into `$v0`
    fn syscall_read_int(&mut self) -> Result<(), RuntimeError> {
        trace!("READ_INT");
        let value = self.console.read_int()?;
        self.set_reg(Register::V0, value as u32);
        Ok(())
    }

    /// Read at most `$a1` bytes (or one line) into the buffer at `$a0`,
    /// leaving the byte count in `$v0`
    fn syscall_read_str(&mut self) -> Result<(), RuntimeError> {
        trace!("READ_STR");
        let address = self.reg_signed(Register::A0) as i64;
        let limit = self.reg_signed(Register::A1).max(0) as usize;
        let bytes = self.console.read_chunk(limit)?;
        self.memory.store(address, &bytes)?;
        self.set_reg(Register::V0, bytes.len() as u32);
        Ok(())
    }

    /// Stop the machine, with `$a0` as the process exit code
    fn syscall_exit(&mut self) -> Result<(), RuntimeError> {
        self.return_code = self.reg_signed(Register::A0);
        self.running = false;
        trace!("EXIT with code {}", self.return_code);
        Ok(())
    }

    /// Print the character in `$a0`
    fn syscall_print_char(&mut self) -> Result<(), RuntimeError> {
        trace!("PRINT_CHAR");
        let value = self.reg(Register::A0);
        self.console.print(&[value as u8])
    }

    /// Read one character into `$v0`
    fn syscall_read_char(&mut self) -> Result<(), RuntimeError> {
        trace!("READ_CHAR");
        let byte = self.console.read_byte()?;
        self.set_reg(Register::V0, byte as u32);
        Ok(())
    }
}

use crate::console::Console;
use crate::error::RuntimeError;
use crate::memory::Memory;
use crate::registers::Registers;
use either::Either;
use log::trace;
use rmips_types::instruction::{Address, Instruction, Mnemonic, Operands};
use rmips_types::program::Program;
use rmips_types::register::Register;

/// A MIPS processor running an assembled program.
///
/// The instruction sequence is immutable once loaded; only register and
/// memory contents change while the program runs. The program counter is an
/// index into the sequence, not a byte address.
pub struct Processor<C> {
    pub(crate) registers: Registers,
    pub(crate) memory: Memory,
    pub(crate) console: C,
    instructions: Vec<Instruction>,
    pub(crate) program_counter: usize,
    pub running: bool,
    pub return_code: i32,
}

impl<C: Console> Processor<C> {
    /// Load a program: the data segment goes to the bottom of memory, the
    /// stack pointer starts at the top of the allocation, and the program
    /// counter at the first instruction.
    pub fn new(program: Program, console: C) -> Self {
        let memory = Memory::new(&program.data);
        let mut registers = Registers::new();
        registers.set(Register::SP, memory.size() as u32);

        Processor {
            registers,
            memory,
            console,
            instructions: program.instructions,
            program_counter: 0,
            running: true,
            return_code: 0,
        }
    }

    /// Run until the program exits.
    ///
    /// There is no fall-through halt: a program that runs past its last
    /// instruction faults with a bad offset, so the only clean way out is
    /// the exit syscall.
    pub fn run(&mut self) -> Result<(), RuntimeError> {
        while self.running {
            self.step()?;
        }

        Ok(())
    }

    /// Fetch the instruction at the program counter, advance past it, then
    /// execute. Advancing first is what makes the link value of `jal` the
    /// index of the instruction after the jump.
    pub fn step(&mut self) -> Result<(), RuntimeError> {
        let instruction = *self
            .instructions
            .get(self.program_counter)
            .ok_or(RuntimeError::BadOffset)?;

        trace!("{:4}: {}", self.program_counter, instruction);
        self.program_counter += 1;
        self.execute(instruction)
    }

    fn execute(&mut self, instruction: Instruction) -> Result<(), RuntimeError> {
        use Mnemonic::*;
        use Operands::*;

        match (instruction.mnemonic, instruction.operands) {
            (Add, RegRegReg(d, s, t)) => self.op_add(d, s, t),
            (Addu, RegRegReg(d, s, t)) => self.op_addu(d, s, t),
            (Addi, RegRegImm(d, s, imm)) => self.op_addi(d, s, imm),
            (Addiu, RegRegImm(d, s, imm)) => self.op_addiu(d, s, imm),
            (And, RegRegReg(d, s, t)) => self.op_and(d, s, t),
            (Andi, RegRegImm(d, s, imm)) => self.op_andi(d, s, imm),
            (Div, RegReg(s, t)) => self.op_div(s, t),
            (Divu, RegReg(s, t)) => self.op_divu(s, t),
            (Mul, RegRegReg(d, s, t)) => self.op_mul(d, s, t),
            (Mulu, RegRegReg(d, s, t)) => self.op_mulu(d, s, t),
            (Mult, RegReg(s, t)) => self.op_mult(s, t),
            (Multu, RegReg(s, t)) => self.op_multu(s, t),
            (Nor, RegRegReg(d, s, t)) => self.op_nor(d, s, t),
            (Or, RegRegReg(d, s, t)) => self.op_or(d, s, t),
            (Ori, RegRegImm(d, s, imm)) => self.op_ori(d, s, imm),
            (Rem, RegRegSrc(d, s, src)) => self.op_rem(d, s, src),
            (Sll, RegRegSrc(d, s, src)) => self.op_sll(d, s, src),
            (Sllv, RegRegReg(d, s, t)) => self.op_sll(d, s, Either::Left(t)),
            (Sra, RegRegSrc(d, s, src)) => self.op_sra(d, s, src),
            (Srav, RegRegReg(d, s, t)) => self.op_sra(d, s, Either::Left(t)),
            (Srl, RegRegSrc(d, s, src)) => self.op_srl(d, s, src),
            (Srlv, RegRegReg(d, s, t)) => self.op_srl(d, s, Either::Left(t)),
            (Sub, RegRegReg(d, s, t)) => self.op_sub(d, s, t),
            (Subu, RegRegReg(d, s, t)) => self.op_subu(d, s, t),
            (Xor, RegRegReg(d, s, t)) => self.op_xor(d, s, t),
            (Xori, RegRegImm(d, s, imm)) => self.op_xori(d, s, imm),
            (Slt, RegRegReg(d, s, t)) => self.op_slt(d, s, t),
            (Sltu, RegRegReg(d, s, t)) => self.op_sltu(d, s, t),
            (Slti, RegRegImm(d, s, imm)) => self.op_slti(d, s, imm),
            (Sltiu, RegRegImm(d, s, imm)) => self.op_sltiu(d, s, imm),
            (Beq, RegRegTarget(s, t, target)) => self.op_beq(s, t, target),
            (Bne, RegRegTarget(s, t, target)) => self.op_bne(s, t, target),
            (Blt, RegRegTarget(s, t, target)) => self.op_blt(s, t, target),
            (Bgt, RegRegTarget(s, t, target)) => self.op_bgt(s, t, target),
            (Bgez, RegTarget(s, target)) => self.op_bgez(s, target),
            (Bgtz, RegTarget(s, target)) => self.op_bgtz(s, target),
            (Blez, RegTarget(s, target)) => self.op_blez(s, target),
            (J, Target(target)) => self.op_j(target),
            (Jal, Target(target)) => self.op_jal(target),
            (Jalr, Reg(s)) => self.op_jalr(s),
            (Jr, Reg(s)) => self.op_jr(s),
            (La, RegAddr(t, address)) => self.op_la(t, address),
            (Li, RegAddr(t, address)) => self.op_la(t, address),
            (Lhi, RegImm(t, imm)) => self.op_lhi(t, imm),
            (Llo, RegImm(t, imm)) => self.op_llo(t, imm),
            (Lb, RegAddr(t, address)) => self.op_lb(t, address),
            (Lbu, RegAddr(t, address)) => self.op_lbu(t, address),
            (Lh, RegAddr(t, address)) => self.op_lh(t, address),
            (Lhu, RegAddr(t, address)) => self.op_lhu(t, address),
            (Lw, RegAddr(t, address)) => self.op_lw(t, address),
            (Sb, RegAddr(t, address)) => self.op_sb(t, address),
            (Sh, RegAddr(t, address)) => self.op_sh(t, address),
            (Sw, RegAddr(t, address)) => self.op_sw(t, address),
            (Mfhi, Reg(d)) => self.op_mfhi(d),
            (Mflo, Reg(d)) => self.op_mflo(d),
            (Mthi, Reg(s)) => self.op_mthi(s),
            (Mtlo, Reg(s)) => self.op_mtlo(s),
            (Move, RegReg(d, s)) => self.op_move(d, s),
            (Nop, Operands::None) => Ok(()),
            (Syscall, Operands::None) => self.op_syscall(),
            _ => Err(RuntimeError::MalformedInstruction(instruction)),
        }
    }

    /// The current program counter (an instruction index).
    pub fn program_counter(&self) -> usize {
        self.program_counter
    }

    pub fn registers(&self) -> &Registers {
        &self.registers
    }

    pub fn registers_mut(&mut self) -> &mut Registers {
        &mut self.registers
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    /// The injected console (lets a test inspect a scripted double).
    pub fn console(&self) -> &C {
        &self.console
    }

    // Helpers shared by the operation modules.

    pub(crate) fn reg(&self, register: Register) -> u32 {
        self.registers.get(register)
    }

    pub(crate) fn reg_signed(&self, register: Register) -> i32 {
        self.registers.get_signed(register)
    }

    pub(crate) fn set_reg(&mut self, register: Register, value: u32) {
        self.registers.set(register, value);
    }

    pub(crate) fn jump_to(&mut self, target: u32) {
        self.program_counter = target as usize;
    }

    /// Read a register-or-literal source operand.
    pub(crate) fn source(&self, source: Either<Register, i32>) -> u32 {
        match source {
            Either::Left(register) => self.reg(register),
            Either::Right(value) => value as u32,
        }
    }

    /// Resolve a memory operand to an effective byte address. The sum is
    /// done at 64 bits so out-of-range results stay out of range.
    pub(crate) fn effective_address(&self, address: Address) -> i64 {
        match address {
            Address::Direct(value) => value as i64,
            Address::Indirect { offset, base } => {
                offset as i64 + self.reg_signed(base) as i64
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::ScriptedConsole;
    use rmips_types::constants::STACK_SPACE;

    fn reg(name: &str) -> Register {
        Register::from_name(name).unwrap()
    }

    fn instruction(mnemonic: Mnemonic, operands: Operands) -> Instruction {
        Instruction { mnemonic, operands }
    }

    fn processor(instructions: Vec<Instruction>) -> Processor<ScriptedConsole> {
        processor_with(instructions, Vec::new(), "")
    }

    fn processor_with(
        instructions: Vec<Instruction>,
        data: Vec<u8>,
        input: &str,
    ) -> Processor<ScriptedConsole> {
        let program = Program { instructions, data };
        Processor::new(program, ScriptedConsole::new(input))
    }

    #[test]
    fn addu_wraps_around() {
        let mut processor = processor(vec![instruction(
            Mnemonic::Addu,
            Operands::RegRegReg(reg("$t0"), reg("$t1"), reg("$t2")),
        )]);
        processor.registers.set(reg("$t1"), 0xFFFF_FFFF);
        processor.registers.set(reg("$t2"), 1);

        processor.step().unwrap();
        assert_eq!(processor.reg(reg("$t0")), 0);
    }

    #[test]
    fn slt_is_signed_and_sltu_is_not() {
        let mut processor = processor(vec![
            instruction(
                Mnemonic::Slt,
                Operands::RegRegReg(reg("$t0"), reg("$t1"), reg("$t2")),
            ),
            instruction(
                Mnemonic::Sltu,
                Operands::RegRegReg(reg("$t3"), reg("$t1"), reg("$t2")),
            ),
        ]);
        processor.registers.set(reg("$t1"), 0xFFFF_FFFF); // -1 signed
        processor.registers.set(reg("$t2"), 1);

        processor.step().unwrap();
        processor.step().unwrap();
        assert_eq!(processor.reg(reg("$t0")), 1);
        assert_eq!(processor.reg(reg("$t3")), 0);
    }

    #[test]
    fn sra_preserves_the_sign_bit() {
        let mut processor = processor(vec![instruction(
            Mnemonic::Sra,
            Operands::RegRegSrc(reg("$t0"), reg("$t1"), Either::Right(1)),
        )]);
        processor.registers.set(reg("$t1"), 0x8000_0000);

        processor.step().unwrap();
        assert_eq!(processor.reg(reg("$t0")), 0xC000_0000);
    }

    #[test]
    fn logical_shifts_drop_the_sign_bit() {
        let mut processor = processor(vec![instruction(
            Mnemonic::Srl,
            Operands::RegRegSrc(reg("$t0"), reg("$t1"), Either::Right(1)),
        )]);
        processor.registers.set(reg("$t1"), 0x8000_0000);

        processor.step().unwrap();
        assert_eq!(processor.reg(reg("$t0")), 0x4000_0000);
    }

    #[test]
    fn mult_splits_the_product_across_hi_and_lo() {
        let mut processor = processor(vec![instruction(
            Mnemonic::Mult,
            Operands::RegReg(reg("$t0"), reg("$t1")),
        )]);
        processor.registers.set(reg("$t0"), 0x8000_0000);
        processor.registers.set(reg("$t1"), 2);

        processor.step().unwrap();
        assert_eq!(processor.reg(Register::HI), 0xFFFF_FFFF);
        assert_eq!(processor.reg(Register::LO), 0);
    }

    #[test]
    fn div_truncates_and_leaves_the_remainder_in_hi() {
        let mut processor = processor(vec![instruction(
            Mnemonic::Div,
            Operands::RegReg(reg("$t0"), reg("$t1")),
        )]);
        processor.registers.set(reg("$t0"), (-7_i32) as u32);
        processor.registers.set(reg("$t1"), 2);

        processor.step().unwrap();
        assert_eq!(processor.registers.get_signed(Register::LO), -3);
        assert_eq!(processor.registers.get_signed(Register::HI), -1);
    }

    #[test]
    fn division_by_zero_faults() {
        let mut processor = processor(vec![instruction(
            Mnemonic::Div,
            Operands::RegReg(reg("$t0"), reg("$t1")),
        )]);
        processor.registers.set(reg("$t0"), 1);

        assert!(matches!(
            processor.step(),
            Err(RuntimeError::DivideByZero)
        ));
    }

    #[test]
    fn taken_branch_redirects_the_program_counter() {
        let mut processor = processor(vec![
            instruction(
                Mnemonic::Beq,
                Operands::RegRegTarget(reg("$t0"), reg("$t1"), 5),
            ),
            instruction(
                Mnemonic::Bne,
                Operands::RegRegTarget(reg("$t0"), reg("$t1"), 9),
            ),
        ]);

        // equal registers: the beq is taken
        processor.step().unwrap();
        assert_eq!(processor.program_counter(), 5);

        // not taken: the counter just advances
        processor.jump_to(1);
        processor.step().unwrap();
        assert_eq!(processor.program_counter(), 2);
    }

    #[test]
    fn jal_links_the_instruction_after_the_jump() {
        let mut processor = processor(vec![
            instruction(Mnemonic::Nop, Operands::None),
            instruction(Mnemonic::Jal, Operands::Target(7)),
        ]);

        processor.step().unwrap();
        processor.step().unwrap();
        assert_eq!(processor.reg(Register::RA), 2);
        assert_eq!(processor.program_counter(), 7);
    }

    #[test]
    fn jr_reads_the_target_from_a_register() {
        let mut processor = processor(vec![instruction(
            Mnemonic::Jr,
            Operands::Reg(reg("$ra")),
        )]);
        processor.registers.set(reg("$ra"), 4);

        processor.step().unwrap();
        assert_eq!(processor.program_counter(), 4);
    }

    #[test]
    fn running_off_the_end_is_a_bad_offset() {
        let mut processor = processor(vec![]);
        assert!(matches!(processor.step(), Err(RuntimeError::BadOffset)));
    }

    #[test]
    fn byte_loads_extend_per_mnemonic() {
        let data = vec![0xFE, 0, 0, 0, 0, 0, 0, 0];
        let mut processor = processor_with(
            vec![
                instruction(
                    Mnemonic::Lb,
                    Operands::RegAddr(reg("$t0"), Address::Direct(0)),
                ),
                instruction(
                    Mnemonic::Lbu,
                    Operands::RegAddr(reg("$t1"), Address::Direct(0)),
                ),
            ],
            data,
            "",
        );

        processor.step().unwrap();
        processor.step().unwrap();
        assert_eq!(processor.reg(reg("$t0")), 0xFFFF_FFFE);
        assert_eq!(processor.reg(reg("$t1")), 0x0000_00FE);
    }

    #[test]
    fn stores_truncate_to_the_access_width() {
        let mut processor = processor_with(
            vec![instruction(
                Mnemonic::Sb,
                Operands::RegAddr(reg("$t0"), Address::Direct(0)),
            )],
            vec![0; 8],
            "",
        );
        processor.registers.set(reg("$t0"), 0x1234_56AB);

        processor.step().unwrap();
        assert_eq!(processor.memory.get(0).unwrap(), 0xAB);
        assert_eq!(processor.memory.get(1).unwrap(), 0);
    }

    #[test]
    fn indirect_accesses_add_the_base_register() {
        let mut processor = processor_with(
            vec![instruction(
                Mnemonic::Lw,
                Operands::RegAddr(
                    reg("$t0"),
                    Address::Indirect { offset: -4, base: reg("$t1") },
                ),
            )],
            vec![0x78, 0x56, 0x34, 0x12, 0, 0, 0, 0],
            "",
        );
        processor.registers.set(reg("$t1"), 4);

        processor.step().unwrap();
        assert_eq!(processor.reg(reg("$t0")), 0x1234_5678);
    }

    #[test]
    fn out_of_bounds_access_faults() {
        let mut processor = processor(vec![instruction(
            Mnemonic::Lw,
            Operands::RegAddr(reg("$t0"), Address::Direct(STACK_SPACE as u32)),
        )]);

        assert!(matches!(
            processor.step(),
            Err(RuntimeError::ReadOutOfBounds)
        ));
    }

    #[test]
    fn la_loads_direct_and_indirect_sums() {
        let mut processor = processor(vec![
            instruction(
                Mnemonic::La,
                Operands::RegAddr(reg("$t0"), Address::Direct(16)),
            ),
            instruction(
                Mnemonic::La,
                Operands::RegAddr(
                    reg("$t1"),
                    Address::Indirect { offset: 8, base: reg("$t0") },
                ),
            ),
        ]);

        processor.step().unwrap();
        processor.step().unwrap();
        assert_eq!(processor.reg(reg("$t0")), 16);
        assert_eq!(processor.reg(reg("$t1")), 24);
    }

    #[test]
    fn half_loads_splice_without_touching_the_other_half() {
        let mut processor = processor(vec![
            instruction(Mnemonic::Lhi, Operands::RegImm(reg("$t0"), 0x1234)),
            instruction(Mnemonic::Llo, Operands::RegImm(reg("$t0"), 0x5678)),
        ]);
        processor.registers.set(reg("$t0"), 0xAAAA_BBBB);

        processor.step().unwrap();
        assert_eq!(processor.reg(reg("$t0")), 0x1234_BBBB);
        processor.step().unwrap();
        assert_eq!(processor.reg(reg("$t0")), 0x1234_5678);
    }

    #[test]
    fn stack_pointer_starts_at_the_top_of_memory() {
        let processor = processor_with(Vec::new(), vec![0; 16], "");
        assert_eq!(processor.reg(Register::SP), (16 + STACK_SPACE) as u32);
    }

    #[test]
    fn exit_syscall_stops_the_machine_with_a_code() {
        let mut processor = processor(vec![instruction(
            Mnemonic::Syscall,
            Operands::None,
        )]);
        processor.registers.set(Register::V0, 10);
        processor.registers.set(Register::A0, 5);

        processor.step().unwrap();
        assert!(!processor.running);
        assert_eq!(processor.return_code, 5);
    }

    #[test]
    fn print_syscalls_write_to_the_console() {
        let mut processor = processor_with(
            vec![
                instruction(Mnemonic::Syscall, Operands::None), // print_int
                instruction(Mnemonic::Syscall, Operands::None), // print_str
            ],
            b"ok\0".to_vec(),
            "",
        );
        processor.registers.set(Register::V0, 1);
        processor.registers.set(Register::A0, (-12_i32) as u32);
        processor.step().unwrap();

        processor.registers.set(Register::V0, 4);
        processor.registers.set(Register::A0, 0);
        processor.step().unwrap();

        assert_eq!(processor.console().output(), b"-12ok");
    }

    #[test]
    fn read_syscalls_consume_scripted_input() {
        let mut processor = processor_with(
            vec![
                instruction(Mnemonic::Syscall, Operands::None), // read_int
                instruction(Mnemonic::Syscall, Operands::None), // read_str
            ],
            vec![0; 16],
            " 37\nhello\n",
        );
        processor.registers.set(Register::V0, 5);
        processor.step().unwrap();
        assert_eq!(processor.registers.get_signed(Register::V0), 37);

        processor.registers.set(Register::V0, 8);
        processor.registers.set(Register::A0, 0);
        processor.registers.set(Register::A1, 16);
        processor.step().unwrap();
        assert_eq!(processor.reg(Register::V0), 6);
        assert_eq!(processor.memory.get_str(0).unwrap(), b"hello\n".to_vec());
    }

    #[test]
    fn unknown_service_numbers_fault() {
        let mut processor = processor(vec![instruction(
            Mnemonic::Syscall,
            Operands::None,
        )]);
        processor.registers.set(Register::V0, 99);

        assert!(matches!(
            processor.step(),
            Err(RuntimeError::NoSuchService(99))
        ));
    }

    #[test]
    fn mismatched_operands_are_malformed() {
        let mut processor = processor(vec![instruction(
            Mnemonic::Add,
            Operands::Target(3),
        )]);

        assert!(matches!(
            processor.step(),
            Err(RuntimeError::MalformedInstruction(_))
        ));
    }
}

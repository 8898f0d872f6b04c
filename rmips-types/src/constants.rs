// Syscall service numbers (read from $v0)
pub const SYSCALL_PRINT_INT: u32 = 1;
pub const SYSCALL_PRINT_STR: u32 = 4;
pub const SYSCALL_READ_INT: u32 = 5;
pub const SYSCALL_READ_STR: u32 = 8;
pub const SYSCALL_EXIT: u32 = 10;
pub const SYSCALL_PRINT_CHAR: u32 = 11;
pub const SYSCALL_READ_CHAR: u32 = 12;

/// Bytes reserved above the data segment for the stack/heap region.
pub const STACK_SPACE: usize = 1024 * 1024;

/// The data segment is padded with zero bytes to this boundary before the
/// stack region begins.
pub const DATA_ALIGNMENT: usize = 8;

pub static REGISTER_NAMES: [&str; 32] = [
    "$zero", "$at", "$v0", "$v1", "$a0", "$a1", "$a2", "$a3", "$t0", "$t1", "$t2", "$t3",
    "$t4", "$t5", "$t6", "$t7", "$s0", "$s1", "$s2", "$s3", "$s4", "$s5", "$s6", "$s7",
    "$t8", "$t9", "$k0", "$k1", "$gp", "$sp", "$fp", "$ra",
];

pub mod constants;
pub mod instruction;
pub mod program;
pub mod register;

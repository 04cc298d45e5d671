pub mod constants;
pub mod isa;

pub use isa::{DecodeError, Ins, Opcode, Reg};

use crate::alu::AluError;

use common::DecodeError;

use std::io;

use thiserror::Error;

/// Conditions that stop the machine. Each one records the address of the
/// instruction that raised it, and is raised before that instruction changes
/// any state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Fault {
    #[error("unknown opcode {opcode:#010b} at {pc:#04x}")]
    UnknownOpcode { pc: u8, opcode: u8 },

    #[error("unsupported ALU operation {selector:#x} at {pc:#04x}")]
    UnsupportedAluOp { pc: u8, selector: u8 },

    #[error("division by zero at {pc:#04x}")]
    DivideByZero { pc: u8 },

    #[error("instruction at {pc:#04x} reaches address {addr:#x}, past the end of memory")]
    AddressOutOfRange { pc: u8, addr: usize },

    #[error("instruction at {pc:#04x} names register {index}")]
    InvalidRegister { pc: u8, index: u8 },

    #[error("stack overflow at {pc:#04x}")]
    StackOverflow { pc: u8 },

    #[error("stack underflow at {pc:#04x}")]
    StackUnderflow { pc: u8 },

    #[error("PRN at {pc:#04x} could not write its output: {kind}")]
    Output { pc: u8, kind: io::ErrorKind },
}

impl Fault {
    pub fn from_decode(pc: u8, err: DecodeError) -> Fault {
        match err {
            DecodeError::UnknownOpcode(opcode) => Fault::UnknownOpcode { pc, opcode },
            DecodeError::InvalidRegister(index) => Fault::InvalidRegister { pc, index },
            DecodeError::Truncated { needed, .. } => Fault::AddressOutOfRange {
                pc,
                addr: pc as usize + needed - 1,
            },
            DecodeError::Empty => Fault::AddressOutOfRange { pc, addr: pc as usize },
        }
    }

    pub fn from_alu(pc: u8, err: AluError) -> Fault {
        match err {
            AluError::Unsupported(selector) => Fault::UnsupportedAluOp { pc, selector },
            AluError::DivideByZero => Fault::DivideByZero { pc },
        }
    }

    pub fn pc(&self) -> u8 {
        match *self {
            Fault::UnknownOpcode { pc, .. }
                | Fault::UnsupportedAluOp { pc, .. }
                | Fault::DivideByZero { pc }
                | Fault::AddressOutOfRange { pc, .. }
                | Fault::InvalidRegister { pc, .. }
                | Fault::StackOverflow { pc }
                | Fault::StackUnderflow { pc }
                | Fault::Output { pc, .. } => pc,
        }
    }
}

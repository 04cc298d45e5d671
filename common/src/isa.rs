use crate::constants::{MAX_INS_SIZE, NUM_REGS};

use std::fmt;
use std::io::{self, Write};

use derive_more::IsVariant;
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use thiserror::Error;


#[derive(Debug, Clone, Copy, FromPrimitive, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    Hlt = 0b0000_0001,
    Ret = 0b0001_0001,
    Push = 0b0100_0101,
    Pop = 0b0100_0110,
    Prn = 0b0100_0111,
    Call = 0b0101_0000,
    Jmp = 0b0101_0100,
    Jeq = 0b0101_0101,
    Jne = 0b0101_0110,
    Ldi = 0b1000_0010,
    Add = 0b1010_0000,
    Mul = 0b1010_0010,
    Cmp = 0b1010_0111,
}

impl Opcode {
    pub const ALL: [Opcode; 13] = [
        Opcode::Hlt,
        Opcode::Ret,
        Opcode::Push,
        Opcode::Pop,
        Opcode::Prn,
        Opcode::Call,
        Opcode::Jmp,
        Opcode::Jeq,
        Opcode::Jne,
        Opcode::Ldi,
        Opcode::Add,
        Opcode::Mul,
        Opcode::Cmp,
    ];

    const ALU_SHIFT: u8 = 5;
    const ALU_MASK: u8 = 0x1 << Self::ALU_SHIFT;
    const SELECTOR_MASK: u8 = 0xf;

    pub fn decode(byte: u8) -> Option<Opcode> {
        Opcode::from_u8(byte)
    }

    pub fn encode(self) -> u8 {
        self as u8
    }

    // Operand bytes that follow the opcode.
    pub fn num_operands(self) -> usize {
        use Opcode::*;
        match self {
            Hlt | Ret => 0,
            Push | Pop | Prn | Call | Jmp | Jeq | Jne => 1,
            Ldi | Add | Mul | Cmp => 2,
        }
    }

    pub fn size(self) -> usize {
        1 + self.num_operands()
    }

    /// For opcodes routed through the ALU, the low nibble selecting the operation.
    pub fn alu_selector(self) -> Option<u8> {
        let raw = self.encode();
        if raw & Self::ALU_MASK != 0 {
            Some(raw & Self::SELECTOR_MASK)
        } else {
            None
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", format!("{:?}", self).to_uppercase())
    }
}


////////////////////////////////////////////////////////////////////////////////


#[derive(Debug, Clone, Copy, FromPrimitive, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Reg {
    R0 = 0,
    R1,
    R2,
    R3,
    R4,
    R5,
    R6,
    SP,
}

impl Reg {
    pub const ALL: [Reg; NUM_REGS] = [
        Reg::R0,
        Reg::R1,
        Reg::R2,
        Reg::R3,
        Reg::R4,
        Reg::R5,
        Reg::R6,
        Reg::SP,
    ];

    pub fn decode(index: u8) -> Option<Reg> {
        Reg::from_u8(index)
    }

    pub fn encode(self) -> u8 {
        self as u8
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", format!("{:?}", self).to_lowercase())
    }
}


////////////////////////////////////////////////////////////////////////////////


#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("no bytes to decode")]
    Empty,

    #[error("unknown opcode {0:#010b}")]
    UnknownOpcode(u8),

    #[error("no register {0}")]
    InvalidRegister(u8),

    #[error("{opcode} needs {needed} bytes")]
    Truncated { opcode: Opcode, needed: usize },
}


#[derive(Debug, Clone, Copy, PartialEq, Eq, IsVariant)]
pub enum Ins {
    Hlt,
    Ldi { reg: Reg, imm: u8 },
    Prn { reg: Reg },
    Add { a: Reg, b: Reg },
    Mul { a: Reg, b: Reg },
    Cmp { a: Reg, b: Reg },
    Push { reg: Reg },
    Pop { reg: Reg },
    Call { reg: Reg },
    Ret,
    Jmp { reg: Reg },
    Jeq { reg: Reg },
    Jne { reg: Reg },
}

impl Ins {
    pub fn opcode(&self) -> Opcode {
        match self {
            Ins::Hlt => Opcode::Hlt,
            Ins::Ldi { .. } => Opcode::Ldi,
            Ins::Prn { .. } => Opcode::Prn,
            Ins::Add { .. } => Opcode::Add,
            Ins::Mul { .. } => Opcode::Mul,
            Ins::Cmp { .. } => Opcode::Cmp,
            Ins::Push { .. } => Opcode::Push,
            Ins::Pop { .. } => Opcode::Pop,
            Ins::Call { .. } => Opcode::Call,
            Ins::Ret => Opcode::Ret,
            Ins::Jmp { .. } => Opcode::Jmp,
            Ins::Jeq { .. } => Opcode::Jeq,
            Ins::Jne { .. } => Opcode::Jne,
        }
    }

    pub fn size(&self) -> usize {
        self.opcode().size()
    }

    // Takes the bytes starting at the opcode; anything past the instruction is ignored.
    pub fn decode(input: &[u8]) -> Result<Ins, DecodeError> {
        let (&first, operands) = input.split_first().ok_or(DecodeError::Empty)?;
        let opcode = Opcode::decode(first).ok_or(DecodeError::UnknownOpcode(first))?;

        let needed = opcode.size();
        if input.len() < needed {
            return Err(DecodeError::Truncated { opcode, needed });
        }

        let reg = |i: usize| {
            let index = operands[i];
            Reg::decode(index).ok_or(DecodeError::InvalidRegister(index))
        };

        let ins = match opcode {
            Opcode::Hlt => Ins::Hlt,
            Opcode::Ret => Ins::Ret,
            Opcode::Ldi => Ins::Ldi { reg: reg(0)?, imm: operands[1] },
            Opcode::Prn => Ins::Prn { reg: reg(0)? },
            Opcode::Add => Ins::Add { a: reg(0)?, b: reg(1)? },
            Opcode::Mul => Ins::Mul { a: reg(0)?, b: reg(1)? },
            Opcode::Cmp => Ins::Cmp { a: reg(0)?, b: reg(1)? },
            Opcode::Push => Ins::Push { reg: reg(0)? },
            Opcode::Pop => Ins::Pop { reg: reg(0)? },
            Opcode::Call => Ins::Call { reg: reg(0)? },
            Opcode::Jmp => Ins::Jmp { reg: reg(0)? },
            Opcode::Jeq => Ins::Jeq { reg: reg(0)? },
            Opcode::Jne => Ins::Jne { reg: reg(0)? },
        };
        Ok(ins)
    }

    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(MAX_INS_SIZE);
        out.push(self.opcode().encode());
        match *self {
            Ins::Hlt | Ins::Ret => (),
            Ins::Ldi { reg, imm } => out.extend([reg.encode(), imm]),
            Ins::Add { a, b } | Ins::Mul { a, b } | Ins::Cmp { a, b } => {
                out.extend([a.encode(), b.encode()])
            }
            Ins::Prn { reg }
                | Ins::Push { reg }
                | Ins::Pop { reg }
                | Ins::Call { reg }
                | Ins::Jmp { reg }
                | Ins::Jeq { reg }
                | Ins::Jne { reg } => out.push(reg.encode()),
        }
        debug_assert_eq!(out.len(), self.size());
        out
    }

    pub fn emit(&self, out: &mut impl Write) -> io::Result<()> {
        out.write_all(&self.encode())
    }
}

impl fmt::Display for Ins {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let op = self.opcode();
        match *self {
            Ins::Hlt | Ins::Ret => write!(f, "{op}"),
            Ins::Ldi { reg, imm } => write!(f, "{op}\t{reg}, {imm}"),
            Ins::Add { a, b } | Ins::Mul { a, b } | Ins::Cmp { a, b } => {
                write!(f, "{op}\t{a}, {b}")
            }
            Ins::Prn { reg }
                | Ins::Push { reg }
                | Ins::Pop { reg }
                | Ins::Call { reg }
                | Ins::Jmp { reg }
                | Ins::Jeq { reg }
                | Ins::Jne { reg } => write!(f, "{op}\t{reg}"),
        }
    }
}

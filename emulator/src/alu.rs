//! Register-to-register arithmetic and comparison.
//!
//! Everything is byte arithmetic: results wrap modulo 256 and DIV truncates.

use crate::Flag;

use std::cmp::Ordering;

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use thiserror::Error;

/// Operation selector, as found in the low nibble of ALU opcodes.
#[derive(Debug, Clone, Copy, FromPrimitive, PartialEq, Eq)]
#[repr(u8)]
pub enum AluOp {
    Add = 0,
    Sub = 1,
    Mul = 2,
    Div = 3,
    Cmp = 7,
}

impl AluOp {
    pub fn from_selector(selector: u8) -> Result<AluOp, AluError> {
        AluOp::from_u8(selector).ok_or(AluError::Unsupported(selector))
    }

    pub fn selector(self) -> u8 {
        self as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AluError {
    #[error("unsupported ALU operation {0:#x}")]
    Unsupported(u8),

    #[error("division by zero")]
    DivideByZero,
}

/// Arithmetic writes back to the first operand, CMP only sets the flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluOut {
    Value(u8),
    Flag(Flag),
}

pub fn execute(op: AluOp, a: u8, b: u8) -> Result<AluOut, AluError> {
    let out = match op {
        AluOp::Add => AluOut::Value(a.wrapping_add(b)),
        AluOp::Sub => AluOut::Value(a.wrapping_sub(b)),
        AluOp::Mul => AluOut::Value(a.wrapping_mul(b)),
        AluOp::Div => AluOut::Value(a.checked_div(b).ok_or(AluError::DivideByZero)?),
        AluOp::Cmp => AluOut::Flag(compare(a, b)),
    };
    Ok(out)
}

pub fn compare(a: u8, b: u8) -> Flag {
    match a.cmp(&b) {
        Ordering::Equal => Flag::Equal,
        Ordering::Less => Flag::LessThan,
        Ordering::Greater => Flag::GreaterThan,
    }
}

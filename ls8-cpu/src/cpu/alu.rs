use std::{fmt, str::FromStr};

use crate::{CpuError, Result};

use super::registers::RegisterFile;

/// Operations the ALU knows how to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl AluOp {
    pub fn name(self) -> &'static str {
        match self {
            AluOp::Add => "ADD",
            AluOp::Sub => "SUB",
            AluOp::Mul => "MUL",
            AluOp::Div => "DIV",
        }
    }

    /// Compute `lhs op rhs` as a byte. Everything wraps; division truncates.
    /// Returns `None` when dividing by zero.
    pub fn compute(self, lhs: u8, rhs: u8) -> Option<u8> {
        match self {
            AluOp::Add => Some(lhs.wrapping_add(rhs)),
            AluOp::Sub => Some(lhs.wrapping_sub(rhs)),
            AluOp::Mul => Some(lhs.wrapping_mul(rhs)),
            AluOp::Div => lhs.checked_div(rhs),
        }
    }
}

impl fmt::Display for AluOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AluOp {
    type Err = CpuError;

    fn from_str(name: &str) -> Result<AluOp> {
        match name {
            "ADD" => Ok(AluOp::Add),
            "SUB" => Ok(AluOp::Sub),
            "MUL" => Ok(AluOp::Mul),
            "DIV" => Ok(AluOp::Div),
            other => Err(CpuError::UnsupportedOperation(other.to_string())),
        }
    }
}

/// `dest = dest op src`. The ALU never touches the program counter; `address`
/// is only used to report a division by zero.
pub fn apply(
    registers: &mut RegisterFile,
    op: AluOp,
    dest: u8,
    src: u8,
    address: u16,
) -> Result<()> {
    let lhs = registers.get(dest)?;
    let rhs = registers.get(src)?;
    let result = op
        .compute(lhs, rhs)
        .ok_or(CpuError::DivisionByZero { address })?;
    registers.set(dest, result)
}

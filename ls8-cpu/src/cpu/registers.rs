use std::fmt::{Debug, Formatter, Result as FmtResult};

use crate::{CpuError, Result};

pub const REGISTER_COUNT: usize = 8;
/// R7 holds the stack pointer. Nothing stops a program from using it as a
/// data register, but it shouldn't.
pub const SP: u8 = 7;
/// Where the (downward growing) stack starts.
pub const STACK_TOP: u8 = 0xF4;

/// The eight byte-wide general purpose registers.
#[derive(Clone, PartialEq, Eq)]
pub struct RegisterFile {
    values: [u8; REGISTER_COUNT],
}

impl RegisterFile {
    pub fn new() -> RegisterFile {
        let mut values = [0; REGISTER_COUNT];
        values[SP as usize] = STACK_TOP;
        RegisterFile { values }
    }

    pub fn get(&self, register: u8) -> Result<u8> {
        self.values
            .get(register as usize)
            .copied()
            .ok_or(CpuError::InvalidRegister { register })
    }

    pub fn set(&mut self, register: u8, value: u8) -> Result<()> {
        let slot = self
            .values
            .get_mut(register as usize)
            .ok_or(CpuError::InvalidRegister { register })?;
        *slot = value;
        Ok(())
    }

    /// Fail unless `register` names one of R0-R7.
    pub fn check(register: u8) -> Result<u8> {
        if (register as usize) < REGISTER_COUNT {
            Ok(register)
        } else {
            Err(CpuError::InvalidRegister { register })
        }
    }

    pub fn sp(&self) -> u8 {
        self.values[SP as usize]
    }

    pub fn set_sp(&mut self, value: u8) {
        self.values[SP as usize] = value;
    }

    pub fn as_array(&self) -> &[u8; REGISTER_COUNT] {
        &self.values
    }
}

impl Default for RegisterFile {
    fn default() -> Self {
        RegisterFile::new()
    }
}

impl Debug for RegisterFile {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        for (n, value) in self.values.iter().enumerate() {
            if n != 0 {
                write!(fmt, " ")?;
            }
            write!(fmt, "{value:02X}")?;
        }
        Ok(())
    }
}

//! The LS-8: an eight-register, 256-byte toy CPU.
//!
//! A [`Cpu`] executes against anything implementing [`Memory`] and prints
//! through an [`OutputPort`]. [`Machine`] bundles a CPU with plain [`Ram`]
//! for the common case.

mod cpu;
mod error;
mod image;
mod machine;
mod memory;
mod output;

pub use cpu::alu::AluOp;
pub use cpu::opcode::{Opcode, OperandCount, ALL_OPCODES};
pub use cpu::registers::{RegisterFile, REGISTER_COUNT, SP, STACK_TOP};
pub use cpu::{Cpu, RunState};
pub use error::{CpuError, Result};
pub use image::{ImageError, ProgramImage};
pub use machine::{Machine, RunLimits};
pub use memory::{Memory, Ram, MEMORY_SIZE};
pub use output::{NullOutput, OutputPort};

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use crate::{Cpu, CpuError, Memory, OutputPort, ProgramImage, Ram, Result};

/// Opt-in ways to stop a run that would otherwise go until HLT. Neither one
/// halts the machine, so a stopped run can be picked up again.
#[derive(Debug, Clone, Default)]
pub struct RunLimits {
    /// Give up after this many instructions.
    pub max_steps: Option<u64>,
    /// Checked once before every instruction.
    pub cancel: Option<Arc<AtomicBool>>,
}

impl RunLimits {
    pub fn with_max_steps(mut self, max_steps: u64) -> Self {
        self.max_steps = Some(max_steps);
        self
    }

    pub fn with_cancel(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = Some(cancel);
        self
    }
}

/// A CPU with its memory and somewhere to print to.
pub struct Machine<O: OutputPort> {
    cpu: Cpu,
    memory: Ram,
    output: O,
}

impl<O: OutputPort> Machine<O> {
    pub fn new(output: O) -> Machine<O> {
        return Machine {
            cpu: Cpu::new(),
            memory: Ram::new(),
            output,
        };
    }

    /// Wipe memory, copy `program` in at address 0, and reset the CPU.
    pub fn load_bytes(&mut self, program: &[u8]) -> Result<()> {
        self.load_at(program, 0)
    }

    pub fn load(&mut self, image: &ProgramImage) -> Result<()> {
        self.load_at(image.bytes(), image.entry())
    }

    fn load_at(&mut self, program: &[u8], entry: u16) -> Result<()> {
        let mut memory = Ram::new();
        memory.load(program)?;
        self.memory = memory;
        self.cpu.reset(entry);
        log::debug!("Loaded {} bytes, entry point {entry:02X}", program.len());
        Ok(())
    }

    pub fn step(&mut self) -> Result<()> {
        self.cpu.step(&mut self.memory, &mut self.output)
    }

    /// Run until HLT (or a fault). A program that never halts never returns.
    /// Returns the number of instructions executed.
    pub fn run(&mut self) -> Result<u64> {
        self.run_with(&RunLimits::default())
    }

    pub fn run_with(&mut self, limits: &RunLimits) -> Result<u64> {
        let start = self.cpu.steps();
        while self.cpu.is_running() {
            if let Some(cancel) = &limits.cancel {
                if cancel.load(Ordering::Relaxed) {
                    log::debug!("Cancelled at {:02X}", self.cpu.get_pc());
                    return Err(CpuError::Cancelled);
                }
            }
            if let Some(limit) = limits.max_steps {
                if self.cpu.steps() - start >= limit {
                    return Err(CpuError::StepLimitReached { limit });
                }
            }
            self.step()?;
        }
        let executed = self.cpu.steps() - start;
        log::debug!("Halted after {executed} instructions");
        Ok(executed)
    }

    /// One line describing the instruction at PC and the registers, e.g.
    /// `TRACE: 00 | 82 00 08 | 00 00 00 00 00 00 00 F4`.
    pub fn trace(&mut self) -> String {
        let pc = self.cpu.get_pc();
        let mut peek = |address: u16| self.memory.read_byte(address).unwrap_or(0);
        let (ir, a, b) = (peek(pc), peek(pc + 1), peek(pc + 2));
        format!(
            "TRACE: {pc:02X} | {ir:02X} {a:02X} {b:02X} | {:?}",
            self.cpu.registers()
        )
    }

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }
    pub fn memory(&self) -> &Ram {
        &self.memory
    }
    pub fn output(&self) -> &O {
        &self.output
    }
    pub fn into_output(self) -> O {
        self.output
    }
}

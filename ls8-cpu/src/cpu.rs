use std::fmt::{Debug, Formatter, Result as FmtResult};

use crate::{CpuError, Memory, OutputPort, Result};

pub mod alu;
pub mod opcode;
pub mod registers;
use opcode::{Opcode, OperandCount};
use registers::RegisterFile;

/// Every instruction gets both operand bytes, used or not, plus the whole
/// machine. Handlers are responsible for moving PC.
type Handler<M, O> = fn(&mut Cpu, &mut M, &mut O, u8, u8) -> Result<()>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    Halted,
}

pub struct Cpu {
    /// R0-R7. R7 is the stack pointer.
    registers: RegisterFile,
    /// The program counter.
    pc: u16,
    state: RunState,
    /// Instructions completed since the last reset.
    steps: u64,
}

impl Debug for Cpu {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        write!(
            fmt,
            "PC:{pc:02X} R:{registers:?} {state}",
            pc = self.pc,
            registers = self.registers,
            state = match self.state {
                RunState::Running => "RUN",
                RunState::Halted => "HLT",
            },
        )
    }
}

impl Cpu {
    pub fn new() -> Cpu {
        return Cpu {
            registers: RegisterFile::new(),
            pc: 0,
            state: RunState::Running,
            steps: 0,
        };
    }

    /// Back to power-on state, ready to execute from `entry`.
    pub fn reset(&mut self, entry: u16) {
        *self = Cpu::new();
        self.pc = entry;
    }

    /// Execute one instruction. Any failure halts the machine before it is
    /// handed back. Stepping a halted machine does nothing.
    pub fn step<M: Memory, O: OutputPort>(
        &mut self,
        memory: &mut M,
        output: &mut O,
    ) -> Result<()> {
        if self.state == RunState::Halted {
            return Ok(());
        }
        let address = self.pc;
        match self.execute_instruction(memory, output) {
            Ok(()) => {
                self.steps += 1;
                Ok(())
            }
            Err(error) => {
                log::warn!("Machine fault at {address:02X}, halting: {error}");
                self.state = RunState::Halted;
                Err(error)
            }
        }
    }

    fn execute_instruction<M: Memory, O: OutputPort>(
        &mut self,
        memory: &mut M,
        output: &mut O,
    ) -> Result<()> {
        let address = self.pc;
        let byte = memory.read_byte(address)?;
        let illegal = CpuError::IllegalOpcode {
            address,
            opcode: byte,
        };
        let operand_count = OperandCount::decode(byte).ok_or_else(|| illegal.clone())?;
        let opcode = Opcode::from_byte(byte).ok_or(illegal)?;
        let mut operands = [0u8; 2];
        // Only fetch what the instruction uses; the rest stay zero.
        let needed = operand_count.count() as usize;
        for (offset, operand) in (1..).zip(operands.iter_mut()).take(needed) {
            *operand = memory.read_byte(address + offset)?;
        }
        let [operand_a, operand_b] = operands;
        log::trace!(
            "{address:02X} | {byte:02X} {operand_a:02X} {operand_b:02X} | {registers:?} | {opcode}",
            registers = self.registers,
        );
        let handler: Handler<M, O> = Cpu::handler(opcode);
        handler(self, memory, output, operand_a, operand_b)
    }

    fn handler<M: Memory, O: OutputPort>(opcode: Opcode) -> Handler<M, O> {
        match opcode {
            Opcode::Ldi => Cpu::ldi::<M, O>,
            Opcode::Prn => Cpu::prn::<M, O>,
            Opcode::Add => Cpu::add::<M, O>,
            Opcode::Sub => Cpu::sub::<M, O>,
            Opcode::Mul => Cpu::mul::<M, O>,
            Opcode::Div => Cpu::div::<M, O>,
            Opcode::Hlt => Cpu::hlt::<M, O>,
            Opcode::Push => Cpu::push::<M, O>,
            Opcode::Pop => Cpu::pop::<M, O>,
            Opcode::Call => Cpu::call::<M, O>,
            Opcode::Ret => Cpu::ret::<M, O>,
        }
    }

    /// Step PC over the instruction that was just executed.
    fn advance_past(&mut self, opcode: Opcode) {
        debug_assert!(!opcode.sets_pc(), "{opcode} moves PC by itself");
        self.pc += opcode.width();
    }

    /// Move SP down, then store whatever `value` reads from the registers
    /// once SP has moved.
    fn push_with<M: Memory>(
        &mut self,
        memory: &mut M,
        value: impl FnOnce(&RegisterFile) -> Result<u8>,
    ) -> Result<()> {
        let sp = self.registers.sp().wrapping_sub(1);
        self.registers.set_sp(sp);
        let byte = value(&self.registers)?;
        memory.write_byte(sp as u16, byte)
    }

    fn push_byte<M: Memory>(&mut self, memory: &mut M, byte: u8) -> Result<()> {
        self.push_with(memory, |_| Ok(byte))
    }

    fn pop_byte<M: Memory>(&mut self, memory: &mut M) -> Result<u8> {
        let sp = self.registers.sp();
        let byte = memory.read_byte(sp as u16)?;
        self.registers.set_sp(sp.wrapping_add(1));
        Ok(byte)
    }

    fn alu(&mut self, opcode: Opcode, operand_a: u8, operand_b: u8) -> Result<()> {
        let op = opcode
            .alu_op()
            .ok_or_else(|| CpuError::UnsupportedOperation(opcode.mnemonic().to_string()))?;
        alu::apply(&mut self.registers, op, operand_a, operand_b, self.pc)?;
        self.advance_past(opcode);
        Ok(())
    }

    fn ldi<M: Memory, O: OutputPort>(
        &mut self,
        _memory: &mut M,
        _output: &mut O,
        operand_a: u8,
        operand_b: u8,
    ) -> Result<()> {
        self.registers.set(operand_a, operand_b)?;
        self.advance_past(Opcode::Ldi);
        Ok(())
    }

    fn prn<M: Memory, O: OutputPort>(
        &mut self,
        _memory: &mut M,
        output: &mut O,
        operand_a: u8,
        _operand_b: u8,
    ) -> Result<()> {
        output.emit(self.registers.get(operand_a)?);
        self.advance_past(Opcode::Prn);
        Ok(())
    }

    fn add<M: Memory, O: OutputPort>(&mut self, _: &mut M, _: &mut O, a: u8, b: u8) -> Result<()> {
        self.alu(Opcode::Add, a, b)
    }

    fn sub<M: Memory, O: OutputPort>(&mut self, _: &mut M, _: &mut O, a: u8, b: u8) -> Result<()> {
        self.alu(Opcode::Sub, a, b)
    }

    fn mul<M: Memory, O: OutputPort>(&mut self, _: &mut M, _: &mut O, a: u8, b: u8) -> Result<()> {
        self.alu(Opcode::Mul, a, b)
    }

    fn div<M: Memory, O: OutputPort>(&mut self, _: &mut M, _: &mut O, a: u8, b: u8) -> Result<()> {
        self.alu(Opcode::Div, a, b)
    }

    fn hlt<M: Memory, O: OutputPort>(
        &mut self,
        _memory: &mut M,
        _output: &mut O,
        _operand_a: u8,
        _operand_b: u8,
    ) -> Result<()> {
        self.state = RunState::Halted;
        self.advance_past(Opcode::Hlt);
        log::debug!("HLT after {} instructions", self.steps + 1);
        Ok(())
    }

    fn push<M: Memory, O: OutputPort>(
        &mut self,
        memory: &mut M,
        _output: &mut O,
        operand_a: u8,
        _operand_b: u8,
    ) -> Result<()> {
        RegisterFile::check(operand_a)?;
        // SP moves first, so PUSH R7 stores the already decremented pointer.
        self.push_with(memory, |registers| registers.get(operand_a))?;
        self.advance_past(Opcode::Push);
        Ok(())
    }

    fn pop<M: Memory, O: OutputPort>(
        &mut self,
        memory: &mut M,
        _output: &mut O,
        operand_a: u8,
        _operand_b: u8,
    ) -> Result<()> {
        RegisterFile::check(operand_a)?;
        let value = memory.read_byte(self.registers.sp() as u16)?;
        self.registers.set(operand_a, value)?;
        // Re-read SP: POP R7 overwrote it.
        self.registers.set_sp(self.registers.sp().wrapping_add(1));
        self.advance_past(Opcode::Pop);
        Ok(())
    }

    fn call<M: Memory, O: OutputPort>(
        &mut self,
        memory: &mut M,
        _output: &mut O,
        operand_a: u8,
        _operand_b: u8,
    ) -> Result<()> {
        RegisterFile::check(operand_a)?;
        let return_address = self.pc + Opcode::Call.width();
        let return_byte = u8::try_from(return_address).map_err(|_| CpuError::OutOfBounds {
            address: return_address,
        })?;
        self.push_byte(memory, return_byte)?;
        self.pc = self.registers.get(operand_a)? as u16;
        Ok(())
    }

    fn ret<M: Memory, O: OutputPort>(
        &mut self,
        memory: &mut M,
        _output: &mut O,
        _operand_a: u8,
        _operand_b: u8,
    ) -> Result<()> {
        self.pc = self.pop_byte(memory)? as u16;
        Ok(())
    }

    // Ways to inspect the state of the CPU.
    pub fn get_pc(&self) -> u16 {
        self.pc
    }
    pub fn get_register(&self, register: u8) -> Result<u8> {
        self.registers.get(register)
    }
    pub fn get_sp(&self) -> u8 {
        self.registers.sp()
    }
    pub fn registers(&self) -> &RegisterFile {
        &self.registers
    }
    pub fn state(&self) -> RunState {
        self.state
    }
    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }
    pub fn steps(&self) -> u64 {
        self.steps
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Cpu::new()
    }
}

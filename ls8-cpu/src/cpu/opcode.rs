use std::fmt;

use super::alu::AluOp;

/// How many operand bytes follow an opcode. Lives in the top two bits of the
/// opcode itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandCount {
    Zero,
    One,
    Two,
}

impl OperandCount {
    /// `None` for the `11` pattern, which no instruction uses.
    pub fn decode(opcode: u8) -> Option<OperandCount> {
        match opcode >> 6 {
            0b00 => Some(OperandCount::Zero),
            0b01 => Some(OperandCount::One),
            0b10 => Some(OperandCount::Two),
            _ => None,
        }
    }

    pub fn count(self) -> u16 {
        match self {
            OperandCount::Zero => 0,
            OperandCount::One => 1,
            OperandCount::Two => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    // LDI r,imm
    // LoaD Immediate
    Ldi = 0b1000_0010,
    // PRN r
    // PRiNt register (as decimal)
    Prn = 0b0100_0111,
    // ADD r,r
    Add = 0b1010_0000,
    // SUB r,r
    Sub = 0b1010_0001,
    // MUL r,r
    Mul = 0b1010_0010,
    // DIV r,r
    Div = 0b1010_0011,
    // HLT
    // HaLT the machine
    Hlt = 0b0000_0001,
    // PUSH r
    Push = 0b0100_0101,
    // POP r
    Pop = 0b0100_0110,
    // CALL r
    // CALL subroutine at address held in r
    Call = 0b0101_0000,
    // RET
    // RETurn from subroutine
    Ret = 0b0001_0001,
}

pub const ALL_OPCODES: [Opcode; 11] = [
    Opcode::Ldi,
    Opcode::Prn,
    Opcode::Add,
    Opcode::Sub,
    Opcode::Mul,
    Opcode::Div,
    Opcode::Hlt,
    Opcode::Push,
    Opcode::Pop,
    Opcode::Call,
    Opcode::Ret,
];

impl Opcode {
    pub fn from_byte(byte: u8) -> Option<Opcode> {
        ALL_OPCODES.iter().copied().find(|op| *op as u8 == byte)
    }

    pub fn operand_count(self) -> OperandCount {
        match OperandCount::decode(self as u8) {
            Some(count) => count,
            None => unreachable!("{} is encoded with the unused 11 pattern", self),
        }
    }

    /// Encoded size in bytes: the opcode plus its operands.
    pub fn width(self) -> u16 {
        1 + self.operand_count().count()
    }

    /// Whether the instruction sets PC itself rather than stepping over its
    /// own encoding.
    pub fn sets_pc(self) -> bool {
        matches!(self, Opcode::Call | Opcode::Ret)
    }

    pub fn alu_op(self) -> Option<AluOp> {
        match self {
            Opcode::Add => Some(AluOp::Add),
            Opcode::Sub => Some(AluOp::Sub),
            Opcode::Mul => Some(AluOp::Mul),
            Opcode::Div => Some(AluOp::Div),
            _ => None,
        }
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Ldi => "LDI",
            Opcode::Prn => "PRN",
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mul => "MUL",
            Opcode::Div => "DIV",
            Opcode::Hlt => "HLT",
            Opcode::Push => "PUSH",
            Opcode::Pop => "POP",
            Opcode::Call => "CALL",
            Opcode::Ret => "RET",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

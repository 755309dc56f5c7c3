use thiserror::Error;

pub type Result<T> = std::result::Result<T, CpuError>;

/// Everything that can stop the machine short of a HLT.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CpuError {
    #[error("illegal opcode {opcode:02X} at address {address:02X}")]
    IllegalOpcode { address: u16, opcode: u8 },
    #[error("unsupported ALU operation '{0}'")]
    UnsupportedOperation(String),
    #[error("address {address:04X} is outside of memory")]
    OutOfBounds { address: u16 },
    #[error("there is no register R{register}")]
    InvalidRegister { register: u8 },
    #[error("division by zero at address {address:02X}")]
    DivisionByZero { address: u16 },
    #[error("a {length}-byte program does not fit in memory")]
    ProgramTooLarge { length: usize },
    #[error("gave up after {limit} instructions")]
    StepLimitReached { limit: u64 },
    #[error("execution was cancelled")]
    Cancelled,
}

impl CpuError {
    /// Whether this error is a fault in the running program (as opposed to
    /// the host asking us to stop).
    pub fn is_fault(&self) -> bool {
        !matches!(
            self,
            CpuError::StepLimitReached { .. } | CpuError::Cancelled
        )
    }
}

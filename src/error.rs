use thiserror::Error;

use crate::memory::TypeAddr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MemoryError {
    #[error("address {addr:#05x} is outside of the 4k address space")]
    AddressOutOfRange { addr: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("program of {len} bytes does not fit into the {capacity} bytes of program memory")]
    ProgramTooLarge { len: usize, capacity: usize },
}

/// Everything that can go wrong while running a single cycle.
///
/// None of these leave the machine in an unusable state: registers, memory and
/// the framebuffer stay inspectable and the caller decides whether to keep
/// calling `run_cycle`, reset, or stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CpuFault {
    #[error("memory access at {addr:#05x} is outside of the 4k address space")]
    AddressOutOfRange { addr: usize },
    #[error("call at {pc:#05x} overflowed the 16 entry stack")]
    StackOverflow { pc: TypeAddr },
    #[error("return at {pc:#05x} with an empty stack")]
    StackUnderflow { pc: TypeAddr },
    #[error("unknown instruction {opcode:04x} at {addr:#05x}")]
    UnknownInstruction { opcode: u16, addr: TypeAddr },
}

impl CpuFault {
    /// Unknown instructions are skipped like a no-op, everything else means the
    /// program went off the rails.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CpuFault::UnknownInstruction { .. })
    }
}

impl From<MemoryError> for CpuFault {
    fn from(err: MemoryError) -> Self {
        match err {
            MemoryError::AddressOutOfRange { addr } => CpuFault::AddressOutOfRange { addr },
        }
    }
}

//! Access analysis and symbolic execution over a register-transfer instruction stream.
//!
//! Registers are normalized through an architecture's [RegisterTable] into slices of 64-bit base
//! registers described by [RegisterDesc]. The [test_access] analysis answers which bits of a
//! register or memory variable an instruction reads or writes, and the [SymbolicVm] tracks the
//! symbolic value of every register and memory location as instructions execute.

pub mod access;
pub mod arch;
pub mod block;
pub mod instruction;
pub mod mem;
pub mod pointer;
pub mod register;
pub mod tracer;
pub mod vm;

pub use access::{test_access, AccessDetails, AccessType, Variable};
pub use arch::{amd64::Amd64, Architecture, PartialWrite, RegisterId, RegisterTable};
pub use block::{Block, BlockPoint, Instr, Opcode, Operand};
pub use instruction::{Instruction, OperandType, ProgramPoint};
pub use mem::{MemoryState, SymbolicMemory};
pub use pointer::Pointer;
pub use register::RegisterDesc;
pub use tracer::{ReplayTracer, Tracer};
pub use vm::SymbolicVm;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    Register(#[from] arch::Error),

    #[error(transparent)]
    Instruction(#[from] block::Error),

    #[error(transparent)]
    Access(#[from] access::Error),
}

#[cfg(test)]
mod tests;

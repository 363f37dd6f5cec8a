//! Read-only view of instructions used by the access analysis.

use crate::register::RegisterDesc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandType {
    Read,
    Write,
    ReadWrite,
}

impl OperandType {
    pub fn is_read(self) -> bool {
        matches!(self, Self::Read | Self::ReadWrite)
    }

    pub fn is_write(self) -> bool {
        matches!(self, Self::Write | Self::ReadWrite)
    }
}

pub trait Instruction {
    fn operand_count(&self) -> usize;

    /// How operand `index` is accessed. Must only be called with `index < operand_count()`.
    fn operand_type(&self, index: usize) -> OperandType;

    /// The register held by operand `index`, or `None` if the operand is not a register.
    fn operand_register(&self, index: usize) -> Option<&RegisterDesc>;

    fn accesses_memory(&self) -> bool;

    fn writes_memory(&self) -> bool;

    /// Size of the memory access in bytes. Zero if the instruction does not access memory.
    fn access_size(&self) -> usize;

    /// Base register and byte displacement of the memory access.
    fn memory_location(&self) -> Option<(RegisterDesc, i64)>;
}

/// A position in an instruction stream.
pub trait ProgramPoint {
    type Instruction: Instruction;

    fn instruction(&self) -> &Self::Instruction;
}

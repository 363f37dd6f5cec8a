//! A basic register-transfer instruction set and straight-line blocks of it.
//!
//! Each opcode is described by a static descriptor giving the access type of every operand and
//! the direction of its memory access, if any. Memory operands are always a base register
//! followed by an immediate byte displacement.

use crate::instruction::{Instruction, OperandType, ProgramPoint};
use crate::register::RegisterDesc;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("illegal {opcode} instruction: {kind}")]
    IllegalInstruction {
        opcode: Opcode,
        kind: IllegalInstructionKind,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IllegalInstructionKind {
    OperandMissing(usize),
    OperandNotPermitted(usize),
    RegisterRequired(usize),
    ImmediateRequired(usize),
    InvalidImmediateSize(usize),
}

impl std::fmt::Display for IllegalInstructionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OperandMissing(index) => write!(f, "operand {index} is missing"),
            Self::OperandNotPermitted(index) => write!(f, "operand {index} is not permitted"),
            Self::RegisterRequired(index) => write!(f, "operand {index} must be a register"),
            Self::ImmediateRequired(index) => write!(f, "operand {index} must be an immediate"),
            Self::InvalidImmediateSize(index) => {
                write!(f, "operand {index} has an invalid immediate size")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryAccess {
    None,
    Read,
    Write,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// `mov dst, src`
    Mov,

    /// `movsx dst, src`: sign-extending move.
    Movsx,

    Add,
    Sub,
    And,
    Or,
    Xor,
    Neg,
    Not,
    Shl,

    /// Logical right shift.
    Shr,

    /// `ldd dst, base, displacement`: load `dst` from memory.
    Ldd,

    /// `str base, displacement, value`: store `value` to memory.
    Str,

    Nop,
}

struct OpcodeDescriptor {
    mnemonic: &'static str,
    operands: &'static [OperandType],
    memory: MemoryAccess,

    /// Index of the base register operand of the memory access.
    memory_operand: usize,
}

const NO_MEMORY: usize = usize::MAX;

const fn descriptor(mnemonic: &'static str, operands: &'static [OperandType]) -> OpcodeDescriptor {
    OpcodeDescriptor {
        mnemonic,
        operands,
        memory: MemoryAccess::None,
        memory_operand: NO_MEMORY,
    }
}

const MOVE: &[OperandType] = &[OperandType::Write, OperandType::Read];
const BINARY: &[OperandType] = &[OperandType::ReadWrite, OperandType::Read];
const UNARY: &[OperandType] = &[OperandType::ReadWrite];
const LOAD: &[OperandType] = &[OperandType::Write, OperandType::Read, OperandType::Read];
const STORE: &[OperandType] = &[OperandType::Read, OperandType::Read, OperandType::Read];

static MOV: OpcodeDescriptor = descriptor("mov", MOVE);
static MOVSX: OpcodeDescriptor = descriptor("movsx", MOVE);
static ADD: OpcodeDescriptor = descriptor("add", BINARY);
static SUB: OpcodeDescriptor = descriptor("sub", BINARY);
static AND: OpcodeDescriptor = descriptor("and", BINARY);
static OR: OpcodeDescriptor = descriptor("or", BINARY);
static XOR: OpcodeDescriptor = descriptor("xor", BINARY);
static NEG: OpcodeDescriptor = descriptor("neg", UNARY);
static NOT: OpcodeDescriptor = descriptor("not", UNARY);
static SHL: OpcodeDescriptor = descriptor("shl", BINARY);
static SHR: OpcodeDescriptor = descriptor("shr", BINARY);
static LDD: OpcodeDescriptor = OpcodeDescriptor {
    mnemonic: "ldd",
    operands: LOAD,
    memory: MemoryAccess::Read,
    memory_operand: 1,
};
static STR: OpcodeDescriptor = OpcodeDescriptor {
    mnemonic: "str",
    operands: STORE,
    memory: MemoryAccess::Write,
    memory_operand: 0,
};
static NOP: OpcodeDescriptor = descriptor("nop", &[]);

impl Opcode {
    fn descriptor(self) -> &'static OpcodeDescriptor {
        match self {
            Self::Mov => &MOV,
            Self::Movsx => &MOVSX,
            Self::Add => &ADD,
            Self::Sub => &SUB,
            Self::And => &AND,
            Self::Or => &OR,
            Self::Xor => &XOR,
            Self::Neg => &NEG,
            Self::Not => &NOT,
            Self::Shl => &SHL,
            Self::Shr => &SHR,
            Self::Ldd => &LDD,
            Self::Str => &STR,
            Self::Nop => &NOP,
        }
    }

    pub fn mnemonic(self) -> &'static str {
        self.descriptor().mnemonic
    }

    pub fn operand_types(self) -> &'static [OperandType] {
        self.descriptor().operands
    }

    pub fn memory_access(self) -> MemoryAccess {
        self.descriptor().memory
    }

    /// Index of the base register operand for opcodes accessing memory. The displacement is the
    /// operand that follows it.
    pub fn memory_operand(self) -> Option<usize> {
        let descriptor = self.descriptor();
        (descriptor.memory != MemoryAccess::None).then_some(descriptor.memory_operand)
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.mnemonic())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    Register(RegisterDesc),
    Immediate { value: u64, bit_count: u32 },
}

impl Operand {
    /// A 64-bit immediate holding the two's complement encoding of `value`.
    pub fn imm(value: i64) -> Self {
        Self::Immediate {
            value: value as u64,
            bit_count: 64,
        }
    }

    pub fn register(&self) -> Option<&RegisterDesc> {
        match self {
            Self::Register(register) => Some(register),
            Self::Immediate { .. } => None,
        }
    }

    /// Sign-extended value of an immediate operand.
    pub fn signed_value(&self) -> Option<i64> {
        match *self {
            Self::Immediate { value, bit_count } => {
                let unused = 64u32.checked_sub(bit_count)?;
                let value = value.checked_shl(unused)? as i64;
                Some(value >> unused)
            }
            Self::Register(_) => None,
        }
    }

    /// Size of the operand in bits.
    pub fn bit_count(&self) -> u32 {
        match self {
            Self::Register(register) => register.bit_count(),
            Self::Immediate { bit_count, .. } => *bit_count,
        }
    }
}

impl From<RegisterDesc> for Operand {
    fn from(register: RegisterDesc) -> Self {
        Self::Register(register)
    }
}

/// A validated instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instr {
    opcode: Opcode,
    operands: Vec<Operand>,
}

impl Instr {
    pub fn new(opcode: Opcode, operands: Vec<Operand>) -> Result<Self> {
        let illegal = |kind| Error::IllegalInstruction { opcode, kind };
        let expected = opcode.operand_types();

        if operands.len() < expected.len() {
            return Err(illegal(IllegalInstructionKind::OperandMissing(
                operands.len(),
            )));
        } else if operands.len() > expected.len() {
            return Err(illegal(IllegalInstructionKind::OperandNotPermitted(
                expected.len(),
            )));
        }

        for (index, (operand, operand_type)) in operands.iter().zip(expected).enumerate() {
            if let Operand::Immediate { bit_count, .. } = operand {
                if *bit_count == 0 || *bit_count > 64 {
                    return Err(illegal(IllegalInstructionKind::InvalidImmediateSize(index)));
                }
            }

            if operand_type.is_write() && operand.register().is_none() {
                return Err(illegal(IllegalInstructionKind::RegisterRequired(index)));
            }
        }

        if let Some(base) = opcode.memory_operand() {
            if operands[base].register().is_none() {
                return Err(illegal(IllegalInstructionKind::RegisterRequired(base)));
            }

            if operands[base + 1].register().is_some() {
                return Err(illegal(IllegalInstructionKind::ImmediateRequired(base + 1)));
            }
        }

        Ok(Self { opcode, operands })
    }

    pub fn opcode(&self) -> Opcode {
        self.opcode
    }

    pub fn operands(&self) -> &[Operand] {
        &self.operands
    }

    /// The operand transferred to or from memory.
    fn memory_value(&self) -> Option<&Operand> {
        match self.opcode {
            Opcode::Ldd => self.operands.first(),
            Opcode::Str => self.operands.get(2),
            _ => None,
        }
    }
}

impl Instruction for Instr {
    fn operand_count(&self) -> usize {
        self.operands.len()
    }

    fn operand_type(&self, index: usize) -> OperandType {
        self.opcode.operand_types()[index]
    }

    fn operand_register(&self, index: usize) -> Option<&RegisterDesc> {
        self.operands.get(index).and_then(Operand::register)
    }

    fn accesses_memory(&self) -> bool {
        self.opcode.memory_access() != MemoryAccess::None
    }

    fn writes_memory(&self) -> bool {
        self.opcode.memory_access() == MemoryAccess::Write
    }

    fn access_size(&self) -> usize {
        self.memory_value()
            .map(|operand| operand.bit_count().div_ceil(8) as usize)
            .unwrap_or(0)
    }

    fn memory_location(&self) -> Option<(RegisterDesc, i64)> {
        let base = self.opcode.memory_operand()?;
        let register = self.operands.get(base)?.register()?;
        let displacement = self.operands.get(base + 1)?.signed_value()?;
        Some((*register, displacement))
    }
}

/// A straight-line sequence of instructions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Block {
    instructions: Vec<Instr>,
}

impl Block {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, instruction: Instr) {
        self.instructions.push(instruction);
    }

    /// Validates and appends an instruction.
    pub fn emit(&mut self, opcode: Opcode, operands: Vec<Operand>) -> Result<&mut Self> {
        self.push(Instr::new(opcode, operands)?);
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    pub fn instructions(&self) -> &[Instr] {
        &self.instructions
    }

    pub fn point(&self, index: usize) -> Option<BlockPoint<'_>> {
        (index < self.instructions.len()).then_some(BlockPoint { block: self, index })
    }

    pub fn points(&self) -> impl Iterator<Item = BlockPoint<'_>> {
        (0..self.instructions.len()).map(move |index| BlockPoint { block: self, index })
    }
}

impl FromIterator<Instr> for Block {
    fn from_iter<T: IntoIterator<Item = Instr>>(iter: T) -> Self {
        Self {
            instructions: iter.into_iter().collect(),
        }
    }
}

/// An instruction within a [Block].
#[derive(Debug, Clone, Copy)]
pub struct BlockPoint<'a> {
    block: &'a Block,
    index: usize,
}

impl BlockPoint<'_> {
    pub fn index(&self) -> usize {
        self.index
    }
}

impl ProgramPoint for BlockPoint<'_> {
    type Instruction = Instr;

    fn instruction(&self) -> &Instr {
        &self.block.instructions[self.index]
    }
}

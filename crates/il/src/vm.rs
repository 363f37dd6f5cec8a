//! Symbolic virtual machine.
//!
//! The machine holds a symbolic value for every register written so far, keyed by the full 64-bit
//! slot of its base register, and a [MemoryState]. Registers that were never written read as the
//! tagged variables of their initial value, so reading the same unwritten register twice yields
//! identical expressions. Memory that is unknown reads as fresh undefined bytes.

use std::collections::BTreeMap;

use sym::SymbolicBitVec;

use crate::arch::{Architecture, PartialWrite, RegisterId};
use crate::block::{self, IllegalInstructionKind, Instr, Opcode, Operand};
use crate::mem::{MemoryState, SymbolicMemory};
use crate::pointer::Pointer;
use crate::register::{RegisterDesc, MAX_REGISTER_BITS};

#[derive(Debug, Clone)]
pub struct SymbolicVm<A: Architecture, M: MemoryState = SymbolicMemory> {
    arch: A,
    registers: BTreeMap<RegisterDesc, SymbolicBitVec>,
    memory: M,
}

impl<A: Architecture> SymbolicVm<A> {
    pub fn new(arch: A) -> Self {
        Self::with_memory(arch, SymbolicMemory::new())
    }
}

impl<A: Architecture, M: MemoryState> SymbolicVm<A, M> {
    pub fn with_memory(arch: A, memory: M) -> Self {
        Self {
            arch,
            registers: BTreeMap::new(),
            memory,
        }
    }

    pub fn architecture(&self) -> &A {
        &self.arch
    }

    pub fn memory(&self) -> &M {
        &self.memory
    }

    /// Registers that have been written, keyed by their full base register slot.
    pub fn registers(&self) -> impl Iterator<Item = (&RegisterDesc, &SymbolicBitVec)> {
        self.registers.iter()
    }

    pub fn read_register(&self, register: &RegisterDesc) -> SymbolicBitVec {
        let offset = register.bit_offset() as usize;
        let count = register.bit_count() as usize;
        match self.registers.get(&register.canonical()) {
            Some(value) => (value.clone() >> offset).resize(count),
            None => SymbolicBitVec::tagged(register.base().tag(), offset, count),
        }
    }

    /// Writes `value` to the register. The value is resized to the register width first.
    pub fn write_register(&mut self, register: &RegisterDesc, value: SymbolicBitVec) {
        let width = MAX_REGISTER_BITS as usize;
        let value = value.resize(register.bit_count() as usize);

        log::trace!(
            "{} := {}",
            register.render(&self.arch),
            value.render_with(|tag| self.tag_name(tag))
        );

        if register.is_full() || self.arch.partial_write(register) == PartialWrite::ZeroExtend {
            self.registers
                .insert(register.canonical(), value.resize(width));
            return;
        }

        let base = register.base();
        let slot = self
            .registers
            .entry(register.canonical())
            .or_insert_with(|| SymbolicBitVec::tagged(base.tag(), 0, width));

        let mask = SymbolicBitVec::constant(register.mask(), width);
        let preserved = std::mem::take(slot) & !mask;
        let written = value.resize(width) << register.bit_offset() as usize;
        *slot = preserved | written;
    }

    /// Reads `byte_count` bytes at `pointer`. Unknown memory reads as undefined.
    pub fn read_memory(&self, pointer: &Pointer, byte_count: usize) -> SymbolicBitVec {
        let bit_count = byte_count * 8;
        self.memory.read(pointer, bit_count).unwrap_or_else(|| {
            log::trace!("read of {byte_count} byte(s) at {pointer} is undefined");
            SymbolicBitVec::with_size(bit_count)
        })
    }

    /// Writes `value` at `pointer`. Values that are not a whole number of bytes are zero-extended
    /// to the next byte.
    pub fn write_memory(&mut self, pointer: &Pointer, value: SymbolicBitVec) {
        let num_bytes = value.num_bytes();
        let value = value.resize(num_bytes * 8);
        log::trace!(
            "[{}] := {}",
            pointer.render_with(|tag| self.tag_name(tag)),
            value.render_with(|tag| self.tag_name(tag))
        );
        self.memory.write(pointer, value);
    }

    /// The address `base + displacement` in the current state.
    pub fn pointer(&self, base: &RegisterDesc, displacement: i64) -> Pointer {
        Pointer::new(&self.arch, self.read_register(base)).offset(displacement)
    }

    /// Renders every register and memory binding as `key := value`, one per line. Each line is
    /// also logged.
    pub fn dump_state(&self) -> String {
        let registers = self.registers.iter().map(|(register, value)| {
            format!(
                "{} := {}",
                register.render(&self.arch),
                value.render_with(|tag| self.tag_name(tag))
            )
        });

        let memory = self.memory.entries().map(|(pointer, value)| {
            format!(
                "[{}] := {}",
                pointer.render_with(|tag| self.tag_name(tag)),
                value.render_with(|tag| self.tag_name(tag))
            )
        });

        let lines: Vec<String> = registers.chain(memory).collect();
        for line in &lines {
            log::info!("{line}");
        }

        lines.join("\n")
    }

    pub fn execute(&mut self, instruction: &Instr) -> block::Result<()> {
        log::debug!(
            "executing {} with {} operand(s)",
            instruction.opcode(),
            instruction.operands().len()
        );

        match (instruction.opcode(), instruction.operands()) {
            (Opcode::Nop, []) => (),
            (Opcode::Mov, [Operand::Register(dst), src]) => {
                let value = self.read_operand(src);
                self.write_register(dst, value);
            }
            (Opcode::Movsx, [Operand::Register(dst), src]) => {
                let value = self.read_operand(src).resize_signed(dst.bit_count() as usize);
                self.write_register(dst, value);
            }
            (opcode @ (Opcode::Neg | Opcode::Not), [Operand::Register(dst)]) => {
                let value = self.read_register(dst);
                let value = if opcode == Opcode::Neg { -value } else { !value };
                self.write_register(dst, value);
            }
            (opcode, [Operand::Register(dst), rhs]) if is_binary(opcode) => {
                let lhs = self.read_register(dst);
                let rhs = self.read_operand(rhs);
                let value = binary(opcode, lhs, rhs);
                self.write_register(dst, value);
            }
            (Opcode::Ldd, [Operand::Register(dst), Operand::Register(base), displacement]) => {
                let pointer = self.pointer(base, signed_value(instruction, displacement, 2)?);
                let value = self.read_memory(&pointer, dst.bit_count().div_ceil(8) as usize);
                self.write_register(dst, value);
            }
            (Opcode::Str, [Operand::Register(base), displacement, value]) => {
                let pointer = self.pointer(base, signed_value(instruction, displacement, 1)?);
                let value = self.read_operand(value);
                self.write_memory(&pointer, value);
            }
            (opcode, operands) => {
                return Err(block::Error::IllegalInstruction {
                    opcode,
                    kind: IllegalInstructionKind::OperandNotPermitted(operands.len()),
                })
            }
        }

        Ok(())
    }

    fn read_operand(&self, operand: &Operand) -> SymbolicBitVec {
        match operand {
            Operand::Register(register) => self.read_register(register),
            Operand::Immediate { value, bit_count } => {
                SymbolicBitVec::constant(*value, *bit_count as usize)
            }
        }
    }

    fn tag_name(&self, tag: usize) -> String {
        match RegisterId::from_tag(tag) {
            Some(register) => self.arch.register_name(register).into_owned(),
            None => format!("%{tag}"),
        }
    }
}

fn is_binary(opcode: Opcode) -> bool {
    matches!(
        opcode,
        Opcode::Add
            | Opcode::Sub
            | Opcode::And
            | Opcode::Or
            | Opcode::Xor
            | Opcode::Shl
            | Opcode::Shr
    )
}

/// Applies a binary opcode. The right-hand side is resized to the width of the left-hand side,
/// except for concrete shift amounts which are applied directly.
fn binary(opcode: Opcode, lhs: SymbolicBitVec, rhs: SymbolicBitVec) -> SymbolicBitVec {
    let width = lhs.len();
    if matches!(opcode, Opcode::Shl | Opcode::Shr) {
        if let Ok(amount) = u64::try_from(&rhs) {
            let amount = usize::try_from(amount).unwrap_or(usize::MAX);
            return if opcode == Opcode::Shl {
                lhs << amount
            } else {
                lhs >> amount
            };
        }
    }

    let rhs = rhs.resize(width);
    match opcode {
        Opcode::Add => lhs + rhs,
        Opcode::Sub => lhs - rhs,
        Opcode::And => lhs & rhs,
        Opcode::Or => lhs | rhs,
        Opcode::Xor => lhs ^ rhs,
        Opcode::Shl => lhs << rhs,
        _ => lhs >> rhs,
    }
}

fn signed_value(instruction: &Instr, operand: &Operand, index: usize) -> block::Result<i64> {
    operand
        .signed_value()
        .ok_or(block::Error::IllegalInstruction {
            opcode: instruction.opcode(),
            kind: IllegalInstructionKind::ImmediateRequired(index),
        })
}

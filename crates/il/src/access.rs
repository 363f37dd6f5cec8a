//! Access analysis: does an instruction touch a variable, and which part of it.

use crate::instruction::{Instruction, OperandType, ProgramPoint};
use crate::pointer::Pointer;
use crate::register::RegisterDesc;
use crate::tracer::Tracer;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("memory accesses are either reads or writes and cannot be queried as read-write")]
    ReadWriteMemoryFilter,

    #[error("instruction accesses memory but has no memory operand")]
    MissingMemoryOperand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessType {
    None,
    Read,
    Write,
    ReadWrite,
}

impl AccessType {
    pub fn is_read(self) -> bool {
        matches!(self, Self::Read | Self::ReadWrite)
    }

    pub fn is_write(self) -> bool {
        matches!(self, Self::Write | Self::ReadWrite)
    }
}

/// The part of a variable an instruction accesses, in bits relative to the start of the variable.
///
/// The offset may be negative when the accessing operand starts before the variable. A bit count
/// of [AccessDetails::UNKNOWN_BIT_COUNT] means the variable may be accessed at an unknown
/// position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessDetails {
    pub access: AccessType,
    pub bit_offset: i32,
    pub bit_count: i32,
}

impl AccessDetails {
    pub const UNKNOWN_BIT_COUNT: i32 = -1;

    pub const NONE: AccessDetails = AccessDetails {
        access: AccessType::None,
        bit_offset: 0,
        bit_count: 0,
    };

    pub fn new(access: AccessType, bit_offset: i32, bit_count: i32) -> Self {
        Self {
            access,
            bit_offset,
            bit_count,
        }
    }

    pub fn unknown(access: AccessType) -> Self {
        Self::new(access, 0, Self::UNKNOWN_BIT_COUNT)
    }

    pub fn is_accessed(&self) -> bool {
        self.access != AccessType::None
    }

    pub fn is_unknown(&self) -> bool {
        self.bit_count == Self::UNKNOWN_BIT_COUNT
    }
}

/// The storage an analysis asks about.
#[derive(Debug, Clone)]
pub enum Variable {
    Register(RegisterDesc),

    /// `bit_count` bits of memory starting at `base`.
    Memory { base: Pointer, bit_count: u32 },
}

/// Determines whether the instruction at `point` accesses `variable` in a way matching `filter`.
///
/// `AccessType::None` as a filter accepts any access. Register accesses compare operand bit
/// ranges directly. Memory accesses trace the base register of the instruction's memory operand
/// to an address and compare it to the variable's address.
pub fn test_access<P, T>(
    point: &P,
    variable: &Variable,
    tracer: &mut T,
    filter: AccessType,
) -> Result<AccessDetails>
where
    P: ProgramPoint,
    T: Tracer<P>,
{
    match variable {
        Variable::Register(register) => Ok(test_register_access(
            point.instruction(),
            register,
            filter,
        )),
        Variable::Memory { base, bit_count } => {
            test_memory_access(point, base, *bit_count, tracer, filter)
        }
    }
}

fn test_register_access(
    instruction: &impl Instruction,
    register: &RegisterDesc,
    filter: AccessType,
) -> AccessDetails {
    for index in 0..instruction.operand_count() {
        let operand_type = instruction.operand_type(index);
        let accepted = match filter {
            AccessType::None => true,
            AccessType::Read => operand_type.is_read(),
            AccessType::Write => operand_type.is_write(),
            AccessType::ReadWrite => operand_type.is_read() && operand_type.is_write(),
        };
        if !accepted {
            continue;
        }

        let Some(operand) = instruction.operand_register(index) else {
            continue;
        };

        if operand.overlaps(register) {
            let access = match operand_type {
                OperandType::Read => AccessType::Read,
                OperandType::Write => AccessType::Write,
                OperandType::ReadWrite => AccessType::ReadWrite,
            };

            // Offsets and counts are bounded by the 64-bit register width
            return AccessDetails::new(
                access,
                operand.bit_offset() as i32 - register.bit_offset() as i32,
                operand.bit_count() as i32,
            );
        }
    }

    AccessDetails::NONE
}

fn test_memory_access<P, T>(
    point: &P,
    variable: &Pointer,
    bit_count: u32,
    tracer: &mut T,
    filter: AccessType,
) -> Result<AccessDetails>
where
    P: ProgramPoint,
    T: Tracer<P>,
{
    let instruction = point.instruction();
    if !instruction.accesses_memory() {
        return Ok(AccessDetails::NONE);
    }

    let writes = instruction.writes_memory();
    let access = match filter {
        AccessType::ReadWrite => return Err(Error::ReadWriteMemoryFilter),
        AccessType::Read if writes => return Ok(AccessDetails::NONE),
        AccessType::Write if !writes => return Ok(AccessDetails::NONE),
        AccessType::None if writes => AccessType::Write,
        AccessType::None => AccessType::Read,
        filter => filter,
    };

    let (base, displacement) = instruction
        .memory_location()
        .ok_or(Error::MissingMemoryOperand)?;
    let address = tracer.trace(point, &base);
    let pointer = Pointer::new(tracer.architecture(), address).offset(displacement);

    if !pointer.can_overlap(variable) {
        return Ok(AccessDetails::NONE);
    }

    let Some(low) = pointer.difference(variable) else {
        log::debug!("access to {pointer} may alias {variable} at an unknown offset");
        return Ok(AccessDetails::unknown(access));
    };

    let access_size = i64::try_from(instruction.access_size()).unwrap_or(i64::MAX);
    let high = low.saturating_add(access_size);
    let variable_size = i64::from(bit_count / 8);
    if low >= variable_size || high <= 0 {
        return Ok(AccessDetails::NONE);
    }

    match (to_bits(low), high.checked_sub(low).and_then(to_bits)) {
        (Some(bit_offset), Some(bit_count)) => {
            Ok(AccessDetails::new(access, bit_offset, bit_count))
        }
        _ => {
            log::debug!("access to {pointer} of {access_size} byte(s) exceeds the bit range");
            Ok(AccessDetails::unknown(access))
        }
    }
}

/// Converts a byte count to bits, if it fits in an [AccessDetails] field.
fn to_bits(bytes: i64) -> Option<i32> {
    bytes
        .checked_mul(8)
        .and_then(|bits| i32::try_from(bits).ok())
}

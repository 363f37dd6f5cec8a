//! Register normalization.
//!
//! Every architectural register name maps onto a slice of a *base* register. The table answers
//! three questions: which slice a register names ([RegisterTable::resolve]), which base register a
//! name belongs to ([RegisterTable::base_of]) and which name covers a given slice of a base
//! register ([RegisterTable::remap]).

use std::borrow::Cow;
use std::collections::BTreeMap;

use crate::register::RegisterDesc;

pub mod amd64;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("the invalid register cannot be resolved")]
    InvalidRegister,

    #[error("no register covers {size} byte(s) at offset {offset} of {base}")]
    UnmappedRegister {
        base: RegisterId,
        offset: u8,
        size: u8,
    },

    #[error("{register} is part of {base} and cannot be used as a base register")]
    NotBaseRegister {
        register: RegisterId,
        base: RegisterId,
    },

    #[error("bits {bit_offset}..{bit_offset}+{bit_count} are outside of register {base}")]
    InvalidBitRange {
        base: RegisterId,
        bit_offset: u32,
        bit_count: u32,
    },
}

/// Architectural register identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegisterId(pub u16);

impl RegisterId {
    /// Sentinel that never names a register.
    pub const INVALID: RegisterId = RegisterId(0);

    /// Tag used for the symbolic variables holding the initial value of this register.
    pub fn tag(self) -> usize {
        usize::from(self.0)
    }

    /// Inverse of [RegisterId::tag].
    pub fn from_tag(tag: usize) -> Option<Self> {
        u16::try_from(tag).ok().map(RegisterId)
    }
}

impl std::fmt::Display for RegisterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "reg{}", self.0)
    }
}

/// Location of a register inside its base register. Offset and size are in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterMapping {
    pub base: RegisterId,
    pub offset: u8,
    pub size: u8,
}

impl RegisterMapping {
    pub const fn new(base: RegisterId, offset: u8, size: u8) -> Self {
        Self { base, offset, size }
    }
}

/// Immutable mapping between register names and base register slices.
#[derive(Debug, Clone, Default)]
pub struct RegisterTable {
    mappings: BTreeMap<RegisterId, RegisterMapping>,
    names: BTreeMap<(RegisterId, u8, u8), RegisterId>,
}

impl RegisterTable {
    /// Builds the table from `(register, mapping)` entries. If two registers cover the same
    /// slice, the first one is used when remapping.
    pub fn new(entries: impl IntoIterator<Item = (RegisterId, RegisterMapping)>) -> Self {
        let mut table = Self::default();
        for (id, mapping) in entries {
            table.mappings.insert(id, mapping);
            table
                .names
                .entry((mapping.base, mapping.offset, mapping.size))
                .or_insert(id);
        }

        table
    }

    /// Resolves a register to its base register slice. Registers absent from the table are
    /// treated as 64-bit base registers of their own.
    pub fn resolve(&self, id: RegisterId) -> Result<RegisterMapping> {
        if id == RegisterId::INVALID {
            return Err(Error::InvalidRegister);
        }

        Ok(self
            .mappings
            .get(&id)
            .copied()
            .unwrap_or(RegisterMapping::new(id, 0, 8)))
    }

    /// Returns the base register of `id`. Unknown registers, including the invalid register, are
    /// their own base.
    pub fn base_of(&self, id: RegisterId) -> RegisterId {
        self.mappings
            .get(&id)
            .map(|mapping| mapping.base)
            .unwrap_or(id)
    }

    /// Finds the register naming `size` bytes at byte `offset` of the base register of `id`. A
    /// slice at offset zero without a name of its own is named by the base register.
    pub fn remap(&self, id: RegisterId, offset: u8, size: u8) -> Result<RegisterId> {
        let base = self.base_of(id);
        if let Some(name) = self.names.get(&(base, offset, size)) {
            return Ok(*name);
        }

        if offset == 0 {
            return Ok(base);
        }

        Err(Error::UnmappedRegister { base, offset, size })
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (RegisterId, RegisterMapping)> + '_ {
        self.mappings.iter().map(|(id, mapping)| (*id, *mapping))
    }
}

/// How a write to part of a register affects the rest of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartialWrite {
    /// Bits outside of the written range keep their value.
    Merge,

    /// The written value is zero-extended over the whole base register.
    ZeroExtend,
}

/// Architecture specific behavior of the analysis and the virtual machine.
pub trait Architecture {
    fn registers(&self) -> &RegisterTable;

    /// Human readable name of a register, used when rendering values.
    fn register_name(&self, id: RegisterId) -> Cow<'static, str>;

    /// Whether pointers derived from this base register only alias other pointers derived from
    /// it, such as the stack pointer.
    fn is_restricted(&self, _base: RegisterId) -> bool {
        false
    }

    fn partial_write(&self, _register: &RegisterDesc) -> PartialWrite {
        PartialWrite::Merge
    }
}

impl<A: Architecture + ?Sized> Architecture for &A {
    fn registers(&self) -> &RegisterTable {
        (**self).registers()
    }

    fn register_name(&self, id: RegisterId) -> Cow<'static, str> {
        (**self).register_name(id)
    }

    fn is_restricted(&self, base: RegisterId) -> bool {
        (**self).is_restricted(base)
    }

    fn partial_write(&self, register: &RegisterDesc) -> PartialWrite {
        (**self).partial_write(register)
    }
}

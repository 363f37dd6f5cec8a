use crate::arch::{self, Architecture, RegisterId, RegisterTable};

/// Width of a base register slot.
pub const MAX_REGISTER_BITS: u32 = 64;

/// A contiguous bit range of a base register.
///
/// Ordering is by base register first, which keeps register bindings grouped by base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RegisterDesc {
    base: RegisterId,
    bit_offset: u32,
    bit_count: u32,
}

impl RegisterDesc {
    /// Describes `bit_count` bits at `bit_offset` of `base`, which must be a base register of
    /// `registers`.
    pub fn new(
        registers: &RegisterTable,
        base: RegisterId,
        bit_offset: u32,
        bit_count: u32,
    ) -> arch::Result<Self> {
        if base == RegisterId::INVALID {
            return Err(arch::Error::InvalidRegister);
        }

        let canonical = registers.base_of(base);
        if canonical != base {
            return Err(arch::Error::NotBaseRegister {
                register: base,
                base: canonical,
            });
        }

        let end = bit_offset.checked_add(bit_count);
        if bit_count == 0 || end.map_or(true, |end| end > MAX_REGISTER_BITS) {
            return Err(arch::Error::InvalidBitRange {
                base,
                bit_offset,
                bit_count,
            });
        }

        Ok(Self {
            base,
            bit_offset,
            bit_count,
        })
    }

    /// Describes the architectural register `id` as a slice of its base register.
    pub fn from_register(registers: &RegisterTable, id: RegisterId) -> arch::Result<Self> {
        let mapping = registers.resolve(id)?;
        Self::new(
            registers,
            mapping.base,
            u32::from(mapping.offset) * 8,
            u32::from(mapping.size) * 8,
        )
    }

    /// Finds the architectural register that names exactly this slice. Slices that are not byte
    /// aligned have no name.
    pub fn to_register(&self, registers: &RegisterTable) -> arch::Result<RegisterId> {
        let unmapped = || arch::Error::UnmappedRegister {
            base: self.base,
            offset: (self.bit_offset / 8) as u8,
            size: self.bit_count.div_ceil(8) as u8,
        };

        if self.bit_offset % 8 != 0 || self.bit_count % 8 != 0 {
            return Err(unmapped());
        }

        // Both values are at most 8 since the slice lies within a 64-bit register
        registers.remap(
            self.base,
            (self.bit_offset / 8) as u8,
            (self.bit_count / 8) as u8,
        )
    }

    pub fn base(&self) -> RegisterId {
        self.base
    }

    pub fn bit_offset(&self) -> u32 {
        self.bit_offset
    }

    pub fn bit_count(&self) -> u32 {
        self.bit_count
    }

    /// First bit past the end of the slice.
    pub fn bit_end(&self) -> u32 {
        self.bit_offset + self.bit_count
    }

    pub fn is_full(&self) -> bool {
        self.bit_offset == 0 && self.bit_count == MAX_REGISTER_BITS
    }

    /// The whole 64-bit slot of the base register.
    pub fn canonical(&self) -> Self {
        Self {
            base: self.base,
            bit_offset: 0,
            bit_count: MAX_REGISTER_BITS,
        }
    }

    pub fn overlaps(&self, other: &Self) -> bool {
        self.base == other.base
            && self.bit_offset < other.bit_end()
            && other.bit_offset < self.bit_end()
    }

    /// Mask of the bits of the base register covered by this slice.
    pub fn mask(&self) -> u64 {
        let bits = u64::MAX >> (MAX_REGISTER_BITS - self.bit_count);
        bits << self.bit_offset
    }

    /// Renders the register name, or the base register name with a bit range if the slice has no
    /// name of its own.
    pub fn render(&self, arch: &impl Architecture) -> String {
        match self.to_register(arch.registers()) {
            Ok(id) if self.is_named_by(arch, id) => arch.register_name(id).into_owned(),
            _ => format!(
                "{}[{}..{}]",
                arch.register_name(self.base),
                self.bit_offset,
                self.bit_end()
            ),
        }
    }

    fn is_named_by(&self, arch: &impl Architecture, id: RegisterId) -> bool {
        Self::from_register(arch.registers(), id).is_ok_and(|named| named == *self)
    }
}

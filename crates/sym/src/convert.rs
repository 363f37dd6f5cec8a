use crate::bit::SymbolicBit;
use crate::vec::SymbolicBitVec;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ConcretizationError {
    #[error("non-literal bit at index {bit_index}")]
    NonLiteralBit { bit_index: usize },

    #[error("value exceeded maximum number of bits ({max_bits})")]
    Overflow { max_bits: usize },
}

impl From<bool> for SymbolicBit {
    fn from(value: bool) -> Self {
        SymbolicBit::Literal(value)
    }
}

impl TryFrom<SymbolicBit> for bool {
    type Error = ConcretizationError;

    fn try_from(value: SymbolicBit) -> Result<Self, Self::Error> {
        value
            .maybe_literal()
            .ok_or(ConcretizationError::NonLiteralBit { bit_index: 0 })
    }
}

/// Concretizes little-endian bits into a `u64`. Bits beyond `max_bits` are permitted only if they
/// are literal zeros.
fn concretize_bits<'a>(
    bits: impl Iterator<Item = &'a SymbolicBit>,
    max_bits: usize,
) -> Result<u64, ConcretizationError> {
    let mut value = 0u64;
    for (bit_index, bit) in bits.enumerate() {
        match bit {
            SymbolicBit::Literal(false) => (),
            SymbolicBit::Literal(true) if bit_index < max_bits => value |= 1 << bit_index,
            SymbolicBit::Literal(true) => return Err(ConcretizationError::Overflow { max_bits }),
            _ => return Err(ConcretizationError::NonLiteralBit { bit_index }),
        }
    }

    Ok(value)
}

macro_rules! concrete_type {
    ($target:ty) => {
        impl From<$target> for SymbolicBitVec {
            fn from(value: $target) -> Self {
                SymbolicBitVec::constant(value.into(), <$target>::BITS as usize)
            }
        }

        impl TryFrom<&SymbolicBitVec> for $target {
            type Error = ConcretizationError;

            fn try_from(value: &SymbolicBitVec) -> Result<Self, Self::Error> {
                let value = concretize_bits(value.iter(), <$target>::BITS as usize)?;

                // Range is enforced by concretize_bits
                Ok(value as $target)
            }
        }

        impl TryFrom<SymbolicBitVec> for $target {
            type Error = ConcretizationError;

            fn try_from(value: SymbolicBitVec) -> Result<Self, Self::Error> {
                <$target>::try_from(&value)
            }
        }
    };
}

concrete_type!(u8);
concrete_type!(u16);
concrete_type!(u32);
concrete_type!(u64);

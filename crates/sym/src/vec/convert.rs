use super::SymbolicBitVec;
use crate::bit::SymbolicBit;

impl IntoIterator for SymbolicBitVec {
    type Item = SymbolicBit;
    type IntoIter = std::collections::vec_deque::IntoIter<SymbolicBit>;

    fn into_iter(self) -> Self::IntoIter {
        self.bits.into_iter()
    }
}

impl FromIterator<SymbolicBit> for SymbolicBitVec {
    fn from_iter<T: IntoIterator<Item = SymbolicBit>>(iter: T) -> Self {
        Self::from_bits(iter.into_iter().collect())
    }
}

/// Concatenates the values, the first value supplying the least significant bits.
impl FromIterator<SymbolicBitVec> for SymbolicBitVec {
    fn from_iter<T: IntoIterator<Item = SymbolicBitVec>>(iter: T) -> Self {
        iter.into_iter().flat_map(|bitvec| bitvec.bits).collect()
    }
}

impl From<SymbolicBit> for SymbolicBitVec {
    fn from(value: SymbolicBit) -> Self {
        std::iter::once(value).collect()
    }
}

use super::{ShiftDirection, SymbolicBitVec};
use crate::bit::{SymbolicBit, FALSE};

impl std::ops::Index<usize> for SymbolicBitVec {
    type Output = SymbolicBit;

    fn index(&self, index: usize) -> &Self::Output {
        &self.bits[index]
    }
}

impl std::ops::Not for SymbolicBitVec {
    type Output = Self;

    fn not(self) -> Self::Output {
        self.bits.into_iter().map(|bit| !bit).collect()
    }
}

macro_rules! bitwise_op {
    ($trait:ident, $method:ident, $op:tt) => {
        impl std::ops::$trait for SymbolicBitVec {
            type Output = Self;

            fn $method(self, rhs: Self) -> Self::Output {
                assert_eq!(self.bits.len(), rhs.bits.len());
                self.bits
                    .into_iter()
                    .zip(rhs.bits)
                    .map(|(lhs, rhs)| lhs $op rhs)
                    .collect()
            }
        }
    };
}

bitwise_op!(BitAnd, bitand, &);
bitwise_op!(BitOr, bitor, |);
bitwise_op!(BitXor, bitxor, ^);

impl std::ops::Shl<usize> for SymbolicBitVec {
    type Output = Self;

    fn shl(mut self, rhs: usize) -> Self::Output {
        self <<= rhs;
        self
    }
}

impl std::ops::Shl for SymbolicBitVec {
    type Output = Self;

    fn shl(mut self, rhs: Self) -> Self::Output {
        self <<= rhs;
        self
    }
}

impl std::ops::ShlAssign<usize> for SymbolicBitVec {
    fn shl_assign(&mut self, rhs: usize) {
        self.shift_mut(rhs, FALSE, ShiftDirection::Left);
    }
}

impl std::ops::ShlAssign for SymbolicBitVec {
    fn shl_assign(&mut self, rhs: Self) {
        for (i, shift_bit) in rhs.bits.into_iter().enumerate() {
            let amount = shift_amount(i);
            let mut shifted_value = self.clone();
            shifted_value.shift_mut(amount, FALSE, ShiftDirection::Left);
            self.mux_mut(shifted_value, !shift_bit);
        }
    }
}

/// Performs an _unsigned_ right shift.
impl std::ops::ShrAssign for SymbolicBitVec {
    fn shr_assign(&mut self, rhs: Self) {
        for (i, shift_bit) in rhs.bits.into_iter().enumerate() {
            let amount = shift_amount(i);
            let mut shifted_value = self.clone();
            shifted_value.shift_mut(amount, FALSE, ShiftDirection::Right);
            self.mux_mut(shifted_value, !shift_bit);
        }
    }
}

impl std::ops::ShrAssign<usize> for SymbolicBitVec {
    fn shr_assign(&mut self, rhs: usize) {
        self.shift_mut(rhs, FALSE, ShiftDirection::Right);
    }
}

impl std::ops::Shr for SymbolicBitVec {
    type Output = Self;

    fn shr(mut self, rhs: Self) -> Self::Output {
        self >>= rhs;
        self
    }
}

impl std::ops::Shr<usize> for SymbolicBitVec {
    type Output = Self;

    fn shr(mut self, rhs: usize) -> Self::Output {
        self >>= rhs;
        self
    }
}

impl std::ops::Add for SymbolicBitVec {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        assert_eq!(self.bits.len(), rhs.bits.len());
        let (lhs, operand) = (self.clone(), rhs.clone());

        // The carry out of the most significant bit is discarded
        let (sum, _) = self.addition_with_carry(rhs);
        sum.with_addend_of(&lhs, &operand)
    }
}

impl std::ops::Neg for SymbolicBitVec {
    type Output = Self;

    fn neg(self) -> Self::Output {
        let num_bits = self.bits.len();
        !self + SymbolicBitVec::constant(1, num_bits)
    }
}

impl std::ops::Sub for SymbolicBitVec {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        assert_eq!(self.bits.len(), rhs.bits.len());
        self + (-rhs)
    }
}

/// Shift amount selected by bit `index` of a symbolic shift operand. Amounts that do not fit in
/// a `usize` saturate, which shifts out every bit.
fn shift_amount(index: usize) -> usize {
    u32::try_from(index)
        .ok()
        .and_then(|index| 1usize.checked_shl(index))
        .unwrap_or(usize::MAX)
}

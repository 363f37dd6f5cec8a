use std::collections::{BTreeSet, HashSet, VecDeque};
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::bit::{SymbolicBit, FALSE};

mod convert;
mod ops;

/// Variable identifiers with this bit set belong to tagged values. The remaining bits hold the
/// tag followed by [TAG_BIT_INDEX_BITS] bits of bit index.
pub const TAGGED_SYMBOL_BASE: usize = 1 << (usize::BITS - 1);

/// Number of identifier bits reserved for the bit index of a tagged variable.
pub const TAG_BIT_INDEX_BITS: u32 = 8;

static NEXT_SYMBOL: AtomicUsize = AtomicUsize::new(0);

/// Returns the variable identifier of bit `bit_index` of the value identified by `tag`.
pub fn tagged_symbol(tag: usize, bit_index: usize) -> usize {
    assert!(
        bit_index < (1 << TAG_BIT_INDEX_BITS),
        "bit index {bit_index} exceeds tagged value width"
    );
    TAGGED_SYMBOL_BASE | (tag << TAG_BIT_INDEX_BITS) | bit_index
}

/// Splits a tagged variable identifier into `(tag, bit_index)`. Returns `None` for fresh
/// variables.
pub fn symbol_tag(id: usize) -> Option<(usize, usize)> {
    if id & TAGGED_SYMBOL_BASE == 0 {
        return None;
    }

    let raw = id & !TAGGED_SYMBOL_BASE;
    Some((
        raw >> TAG_BIT_INDEX_BITS,
        raw & ((1 << TAG_BIT_INDEX_BITS) - 1),
    ))
}

/// Little-endian vector of symbolic bits.
///
/// Equality compares bits only. A value produced by adding a constant also remembers the operand
/// and the constant, see [SymbolicBitVec::split_addend].
#[derive(Debug, Clone, Default)]
pub struct SymbolicBitVec {
    bits: VecDeque<SymbolicBit>,
    addend: Option<Rc<Addend>>,
}

/// Records that `sum` was computed as `base + value`.
#[derive(Debug)]
struct Addend {
    base: SymbolicBitVec,
    value: u64,
    sum: VecDeque<SymbolicBit>,
}

impl PartialEq for SymbolicBitVec {
    fn eq(&self, other: &Self) -> bool {
        self.bits == other.bits
    }
}

impl Eq for SymbolicBitVec {}

enum ShiftDirection {
    Left,
    Right,
}

impl SymbolicBitVec {
    pub fn msb(&self) -> Option<&SymbolicBit> {
        self.bits.back()
    }

    pub fn lsb(&self) -> Option<&SymbolicBit> {
        self.bits.front()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bits.len()
    }

    pub fn num_bytes(&self) -> usize {
        self.bits.len().div_ceil(8)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SymbolicBit> {
        self.bits.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut SymbolicBit> {
        self.bits.iter_mut()
    }

    pub fn empty() -> Self {
        Self::from_bits(VecDeque::with_capacity(0))
    }

    fn from_bits(bits: VecDeque<SymbolicBit>) -> Self {
        Self { bits, addend: None }
    }

    /// Creates a value of `num_bits` fresh variables. Every call produces variables that have
    /// never been handed out before, so the result is unconstrained and unrelated to any other
    /// value.
    pub fn with_size(num_bits: usize) -> Self {
        let start_symbol = NEXT_SYMBOL.fetch_add(num_bits, Ordering::SeqCst);
        (start_symbol..start_symbol + num_bits)
            .map(SymbolicBit::Variable)
            .collect()
    }

    /// Creates the bits `offset..offset + num_bits` of the unconstrained value identified by
    /// `tag`. Calls with the same tag always produce the same variables.
    pub fn tagged(tag: usize, offset: usize, num_bits: usize) -> Self {
        (offset..offset + num_bits)
            .map(|bit_index| SymbolicBit::Variable(tagged_symbol(tag, bit_index)))
            .collect()
    }

    /// Creates a literal value of `num_bits` bits. Bits of `value` beyond `num_bits` are dropped
    /// and bits beyond 64 are zero.
    pub fn constant(value: u64, num_bits: usize) -> Self {
        (0..num_bits)
            .map(|i| SymbolicBit::Literal(i < 64 && (value >> i) & 0x1 == 1))
            .collect()
    }

    pub fn contains_variable(&self) -> bool {
        self.bits
            .iter()
            .any(|bit| !matches!(*bit, SymbolicBit::Literal(_)))
    }

    /// Concatenates the left-hand side with the right-hand side, creating a new `SymbolicBitVec`
    /// with a combined length of both inputs. The left-hand side supplies the least significant
    /// bits.
    pub fn concat(mut self, mut rhs: Self) -> Self {
        self.bits.append(&mut rhs.bits);
        self
    }

    /// Creates a new `SymbolicBitVec` with the specified number of least-significant bits removed.
    pub fn truncate_lsb(mut self, num_bits_truncated: usize) -> Self {
        let num_bits_truncated = usize::min(num_bits_truncated, self.bits.len());
        self.bits.drain(..num_bits_truncated);
        self
    }

    /// Creates a new `SymbolicBitVec` with the specified number of most-significant bits removed.
    pub fn truncate_msb(mut self, num_bits_truncated: usize) -> Self {
        let len = self.bits.len().saturating_sub(num_bits_truncated);
        self.bits.truncate(len);
        self
    }

    /// Create a new `SymbolicBitVec` with the number of additional zero bits specified as the
    /// most-significant bits.
    pub fn zero_extend(mut self, num_bits: usize) -> Self {
        self.bits.extend(std::iter::repeat(FALSE).take(num_bits));
        self
    }

    /// Create a new `SymbolicBitVec` with the number of additional bits specified as the
    /// most-significant bits. The additional bits are clones of the original most significant-bit.
    /// An empty value is extended with zeros.
    pub fn sign_extend(mut self, num_bits: usize) -> Self {
        let msb = self.msb().cloned().unwrap_or_default();
        self.bits.extend(std::iter::repeat(msb).take(num_bits));
        self
    }

    /// Zero-extends or truncates the value to exactly `num_bits` bits.
    pub fn resize(self, num_bits: usize) -> Self {
        let len = self.len();
        if num_bits >= len {
            self.zero_extend(num_bits - len)
        } else {
            self.truncate_msb(len - num_bits)
        }
    }

    /// Sign-extends or truncates the value to exactly `num_bits` bits.
    pub fn resize_signed(self, num_bits: usize) -> Self {
        let len = self.len();
        if num_bits >= len {
            self.sign_extend(num_bits - len)
        } else {
            self.truncate_msb(len - num_bits)
        }
    }

    /// Splits the value into parts of `num_bits` bits, least significant part first. The last
    /// part holds the remaining bits and may be shorter.
    pub fn into_parts(self, num_bits: usize) -> Vec<Self> {
        assert!(num_bits > 0, "part size must be non-zero");
        let mut parts = Vec::with_capacity(self.len().div_ceil(num_bits));
        let mut remainder = self;
        while remainder.len() > num_bits {
            let rest = remainder.bits.split_off(num_bits);
            parts.push(remainder);
            remainder = Self::from_bits(rest);
        }

        if !remainder.is_empty() {
            parts.push(remainder);
        }

        parts
    }

    pub fn addition_with_carry(self, rhs: Self) -> (Self, SymbolicBit) {
        let mut carry = self.clone().addition_carry_bits(rhs.clone());
        let overflow = carry.bits.pop_back().unwrap_or_default();
        let sum = self ^ rhs ^ carry;
        (sum, overflow)
    }

    pub fn addition_carry_bits(self, rhs: Self) -> Self {
        assert_eq!(self.bits.len(), rhs.bits.len());
        let mut carry = VecDeque::with_capacity(self.bits.len() + 1);
        carry.push_back(FALSE);
        for i in 0..self.bits.len() {
            let next = (self[i].clone() & rhs[i].clone())
                | (self[i].clone() & carry[i].clone())
                | (rhs[i].clone() & carry[i].clone());
            carry.push_back(next);
        }

        Self::from_bits(carry)
    }

    /// Checks whether both values are known to hold the same expression. This compares bits with
    /// [SymbolicBit::is_identical] and therefore never walks shared expression trees; values
    /// that are equal but were computed independently may be reported as not identical.
    pub fn is_identical(&self, rhs: &Self) -> bool {
        self.len() == rhs.len()
            && self
                .bits
                .iter()
                .zip(rhs.bits.iter())
                .all(|(lhs, rhs)| lhs.is_identical(rhs))
    }

    /// Splits a value computed by adding a constant into the non-constant operand and the
    /// constant, modulo the value width. Nested additions of constants are folded into a single
    /// constant. Returns `None` once the bits have changed since the addition.
    pub fn split_addend(&self) -> Option<(&SymbolicBitVec, u64)> {
        let addend = self.addend.as_deref()?;
        let unchanged = addend.sum.len() == self.bits.len()
            && addend
                .sum
                .iter()
                .zip(self.bits.iter())
                .all(|(lhs, rhs)| lhs.is_identical(rhs));
        unchanged.then_some((&addend.base, addend.value))
    }

    /// Attaches the addend of `lhs + rhs` to `sum` when exactly one operand is a constant.
    fn with_addend_of(mut self, lhs: &Self, rhs: &Self) -> Self {
        let (operand, value) = match (u64::try_from(lhs), u64::try_from(rhs)) {
            (Err(_), Ok(value)) => (lhs, value),
            (Ok(value), Err(_)) => (rhs, value),
            _ => return self,
        };

        let (base, value) = match operand.split_addend() {
            Some((base, inner)) => (base.clone(), inner.wrapping_add(value)),
            None => (operand.clone(), value),
        };

        let value = match u32::try_from(self.len()) {
            Ok(len) if len < u64::BITS => value & ((1 << len) - 1),
            _ => value,
        };

        self.addend = Some(Rc::new(Addend {
            base,
            value,
            sum: self.bits.clone(),
        }));
        self
    }

    /// Returns the tags of all tagged variables this value depends on.
    pub fn tags(&self) -> BTreeSet<usize> {
        let mut tags = BTreeSet::new();
        let mut visited: HashSet<*const SymbolicBit> = HashSet::new();
        let mut pending: Vec<&SymbolicBit> = self.bits.iter().collect();

        while let Some(bit) = pending.pop() {
            match bit {
                SymbolicBit::Literal(_) => (),
                SymbolicBit::Variable(id) => {
                    if let Some((tag, _)) = symbol_tag(*id) {
                        tags.insert(tag);
                    }
                }
                SymbolicBit::Not(x) => {
                    if visited.insert(Rc::as_ptr(x)) {
                        pending.push(x);
                    }
                }
                SymbolicBit::And(x, y) => {
                    if visited.insert(Rc::as_ptr(x)) {
                        pending.push(x);
                    }
                    if visited.insert(Rc::as_ptr(y)) {
                        pending.push(y);
                    }
                }
            }
        }

        tags
    }

    fn shift_mut(&mut self, amount: usize, shift_in: SymbolicBit, direction: ShiftDirection) {
        let len = self.len();
        let amount = usize::min(amount, len);

        match direction {
            ShiftDirection::Left => {
                // [ 0 1 2 3 4 5 6 7 ] << 3
                // [ x x x 0 1 2 3 4 ]
                self.bits.truncate(len - amount);
                for _ in 0..amount {
                    self.bits.push_front(shift_in.clone());
                }
            }
            ShiftDirection::Right => {
                // [ 0 1 2 3 4 5 6 7 ] >> 3
                // [ 3 4 5 6 7 x x x ]
                self.bits.drain(..amount);
                for _ in 0..amount {
                    self.bits.push_back(shift_in.clone());
                }
            }
        }
    }

    fn mux_mut(&mut self, rhs: Self, selector: SymbolicBit) {
        for (i, rhs) in rhs.bits.into_iter().enumerate() {
            let lhs = std::mem::take(&mut self.bits[i]);
            self.bits[i] = selector.clone().select(lhs, rhs);
        }
    }
}

use std::collections::BTreeSet;

use sym::SymbolicBitVec;

use crate::arch::{Architecture, RegisterId};

/// Width of an address.
pub const POINTER_BITS: usize = 64;

/// A symbolic address: a base expression displaced by a constant byte offset.
///
/// Bases of the form `base + constant` are split on construction, so addresses derived from the
/// same register by constant adjustments compare by offset.
///
/// Pointers also carry the restrict-qualified base registers their base depends on. Two pointers
/// derived from disjoint restricted registers never alias.
#[derive(Debug, Clone)]
pub struct Pointer {
    base: SymbolicBitVec,
    offset: i64,
    restrict: BTreeSet<RegisterId>,
}

impl Pointer {
    pub fn new(arch: &impl Architecture, base: SymbolicBitVec) -> Self {
        let base = base.resize(POINTER_BITS);

        // Constant addresses share a zero base so that they compare by offset alone
        if let Ok(address) = u64::try_from(&base) {
            return Self::constant(address);
        }

        // A base computed by adding a constant keeps the constant in the offset
        let (base, offset) = match base.split_addend() {
            Some((operand, addend)) => (operand.clone(), addend as i64),
            None => (base, 0),
        };

        let restrict = base
            .tags()
            .into_iter()
            .filter_map(RegisterId::from_tag)
            .filter(|register| arch.is_restricted(*register))
            .collect();

        Self {
            base,
            offset,
            restrict,
        }
    }

    pub fn constant(address: u64) -> Self {
        Self {
            base: SymbolicBitVec::constant(0, POINTER_BITS),
            offset: address as i64,
            restrict: BTreeSet::new(),
        }
    }

    /// Displaces the pointer by `displacement` bytes.
    pub fn offset(mut self, displacement: i64) -> Self {
        self.offset = self.offset.wrapping_add(displacement);
        self
    }

    pub fn base(&self) -> &SymbolicBitVec {
        &self.base
    }

    pub fn displacement(&self) -> i64 {
        self.offset
    }

    pub fn restrict(&self) -> &BTreeSet<RegisterId> {
        &self.restrict
    }

    /// The full address expression.
    pub fn address(&self) -> SymbolicBitVec {
        self.base.clone() + SymbolicBitVec::constant(self.offset as u64, POINTER_BITS)
    }

    pub fn can_overlap(&self, other: &Self) -> bool {
        self.restrict.is_empty()
            || other.restrict.is_empty()
            || !self.restrict.is_disjoint(&other.restrict)
    }

    /// Byte distance `self - other`, if it is a constant.
    pub fn difference(&self, other: &Self) -> Option<i64> {
        let delta = if self.base.is_identical(&other.base) {
            0
        } else {
            u64::try_from(self.base.clone() - other.base.clone()).ok()? as i64
        };

        Some(delta.wrapping_add(self.offset).wrapping_sub(other.offset))
    }

    pub fn render_with(&self, name_tag: impl Fn(usize) -> String) -> String {
        let is_constant = !self.base.contains_variable();
        match (is_constant, self.offset) {
            (true, offset) => format!("{:#x}", offset as u64),
            (false, 0) => self.base.render_with(name_tag),
            (false, offset) if offset < 0 => format!(
                "{} - {:#x}",
                self.base.render_with(name_tag),
                offset.unsigned_abs()
            ),
            (false, offset) => format!("{} + {:#x}", self.base.render_with(name_tag), offset),
        }
    }
}

impl std::fmt::Display for Pointer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render_with(|tag| format!("%{tag}")))
    }
}

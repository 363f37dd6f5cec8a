//! Symbolic bit-vector expressions.
//!
//! Values are little-endian vectors of [SymbolicBit]. A bit is either a literal, a variable, or a
//! boolean combination of other bits. Variables come in two flavors: fresh variables allocated
//! by [SymbolicBitVec::with_size] that denote undefined data, and tagged variables created by
//! [SymbolicBitVec::tagged] whose identity is derived from a caller-chosen tag (for example a
//! register) so that the same tag always produces the same bits.

mod bit;
mod convert;
mod render;
mod vec;

pub use crate::bit::*;
pub use crate::convert::ConcretizationError;
pub use crate::vec::*;

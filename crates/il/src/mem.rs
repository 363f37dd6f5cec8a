use std::collections::BTreeMap;

use sym::SymbolicBitVec;

use crate::pointer::Pointer;

/// Byte-addressed symbolic memory.
pub trait MemoryState {
    /// Reads `bit_count` bits at `pointer`. Returns `None` if nothing is known about the value.
    fn read(&self, pointer: &Pointer, bit_count: usize) -> Option<SymbolicBitVec>;

    /// Writes `value` at `pointer`. The value size must be a multiple of 8 bits.
    fn write(&mut self, pointer: &Pointer, value: SymbolicBitVec);

    /// Contiguous runs of known bytes and the pointers they start at.
    fn entries(&self) -> impl Iterator<Item = (Pointer, SymbolicBitVec)> + '_;
}

/// Bytes written relative to a common anchor pointer.
#[derive(Debug, Clone)]
struct Region {
    anchor: Pointer,
    bytes: BTreeMap<i64, SymbolicBitVec>,
}

impl Region {
    fn runs(&self) -> Vec<(Pointer, SymbolicBitVec)> {
        let mut runs: Vec<(i64, i64, SymbolicBitVec)> = Vec::new();
        for (offset, byte) in &self.bytes {
            match runs.last_mut() {
                Some((_, end, value)) if *end == *offset => {
                    *value = std::mem::take(value).concat(byte.clone());
                    *end += 1;
                }
                _ => runs.push((*offset, offset + 1, byte.clone())),
            }
        }

        runs.into_iter()
            .map(|(start, _, value)| (self.anchor.clone().offset(start), value))
            .collect()
    }
}

/// Memory made of regions whose relative placement is unknown. Bytes within a region are at
/// known distances from each other.
#[derive(Debug, Clone, Default)]
pub struct SymbolicMemory {
    regions: Vec<Region>,
}

impl SymbolicMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Finds the region `pointer` lies in and the offset of `pointer` within it.
    fn locate(&self, pointer: &Pointer) -> Option<(usize, i64)> {
        self.regions
            .iter()
            .enumerate()
            .find_map(|(index, region)| {
                pointer
                    .difference(&region.anchor)
                    .map(|offset| (index, offset))
            })
    }
}

impl MemoryState for SymbolicMemory {
    fn read(&self, pointer: &Pointer, bit_count: usize) -> Option<SymbolicBitVec> {
        let (index, offset) = self.locate(pointer)?;

        // A write through an aliasing pointer may have changed the value
        let ambiguous = self
            .regions
            .iter()
            .enumerate()
            .any(|(i, region)| i != index && pointer.can_overlap(&region.anchor));
        if ambiguous {
            return None;
        }

        let region = &self.regions[index];
        let mut known = false;
        let value: SymbolicBitVec = (0..bit_count.div_ceil(8) as i64)
            .map(|i| match region.bytes.get(&(offset + i)) {
                Some(byte) => {
                    known = true;
                    byte.clone()
                }
                None => SymbolicBitVec::with_size(8),
            })
            .collect();

        known.then(|| value.resize(bit_count))
    }

    fn write(&mut self, pointer: &Pointer, value: SymbolicBitVec) {
        debug_assert_eq!(value.len() % 8, 0);

        let located = self.locate(pointer).map(|(index, _)| index);
        let num_regions = self.regions.len();
        let mut index = 0;
        self.regions.retain(|region| {
            let keep = Some(index) == located || !pointer.can_overlap(&region.anchor);
            index += 1;
            keep
        });

        let invalidated = num_regions - self.regions.len();
        if invalidated > 0 {
            log::debug!("write to {pointer} invalidated {invalidated} aliasing region(s)");
        }

        let (index, offset) = match self.locate(pointer) {
            Some(location) => location,
            None => {
                self.regions.push(Region {
                    anchor: pointer.clone(),
                    bytes: BTreeMap::new(),
                });
                (self.regions.len() - 1, 0)
            }
        };

        let bytes = &mut self.regions[index].bytes;
        for (i, byte) in value.into_parts(8).into_iter().enumerate() {
            bytes.insert(offset + i as i64, byte);
        }
    }

    fn entries(&self) -> impl Iterator<Item = (Pointer, SymbolicBitVec)> + '_ {
        self.regions.iter().flat_map(Region::runs)
    }
}

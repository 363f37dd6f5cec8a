use crate::bit::SymbolicBit;
use crate::vec::{symbol_tag, SymbolicBitVec};

/// A run of bits sharing a rendering.
enum Segment {
    Literal(Vec<bool>),
    Tagged { tag: usize, lo: usize, hi: usize },
    Fresh { first: usize, len: usize },
    Expression(usize),
}

impl Segment {
    fn new(bit: &SymbolicBit) -> Self {
        match bit {
            SymbolicBit::Literal(value) => Self::Literal(vec![*value]),
            SymbolicBit::Variable(id) => match symbol_tag(*id) {
                Some((tag, bit_index)) => Self::Tagged {
                    tag,
                    lo: bit_index,
                    hi: bit_index + 1,
                },
                None => Self::Fresh { first: *id, len: 1 },
            },
            _ => Self::Expression(1),
        }
    }

    /// Extends this segment with the next more significant bit. Returns `false` if the bit
    /// starts a new segment.
    fn extend(&mut self, bit: &SymbolicBit) -> bool {
        match (self, bit) {
            (Self::Literal(bits), SymbolicBit::Literal(value)) => bits.push(*value),
            (Self::Tagged { tag, hi, .. }, SymbolicBit::Variable(id))
                if symbol_tag(*id) == Some((*tag, *hi)) =>
            {
                *hi += 1
            }
            (Self::Fresh { first, len }, SymbolicBit::Variable(id)) if *id == *first + *len => {
                *len += 1
            }
            (Self::Expression(len), SymbolicBit::Not(_) | SymbolicBit::And(_, _)) => *len += 1,
            _ => return false,
        }

        true
    }

    fn render(&self, name_tag: &impl Fn(usize) -> String, standalone: bool) -> String {
        match self {
            Self::Literal(bits) => {
                let hex = render_hex(bits);
                if standalone {
                    hex
                } else {
                    format!("{hex}:{len}", len = bits.len())
                }
            }
            Self::Tagged { tag, lo, hi } => format!("{name}[{lo}..{hi}]", name = name_tag(*tag)),
            Self::Fresh { first, len } => format!("${first}:{len}"),
            Self::Expression(len) => format!("expr:{len}"),
        }
    }
}

fn render_hex(bits: &[bool]) -> String {
    let digits: String = bits
        .chunks(4)
        .rev()
        .map(|nibble| {
            let value = nibble
                .iter()
                .enumerate()
                .fold(0u32, |acc, (i, bit)| acc | (u32::from(*bit) << i));
            char::from_digit(value, 16).unwrap_or('?')
        })
        .collect();

    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        "0x0".to_string()
    } else {
        format!("0x{digits}")
    }
}

impl SymbolicBitVec {
    /// Renders the value from the most significant segment to the least significant one. Tagged
    /// variables are named with `name_tag`.
    pub fn render_with(&self, name_tag: impl Fn(usize) -> String) -> String {
        let mut segments: Vec<Segment> = Vec::new();
        for bit in self.iter() {
            let extended = segments
                .last_mut()
                .map(|segment| segment.extend(bit))
                .unwrap_or(false);
            if !extended {
                segments.push(Segment::new(bit));
            }
        }

        if segments.is_empty() {
            return "<empty>".to_string();
        }

        let standalone = segments.len() == 1;
        segments
            .iter()
            .rev()
            .map(|segment| segment.render(&name_tag, standalone))
            .collect::<Vec<_>>()
            .join(" . ")
    }
}

impl std::fmt::Display for SymbolicBitVec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render_with(|tag| format!("%{tag}")))
    }
}

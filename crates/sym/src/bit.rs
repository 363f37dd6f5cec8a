use std::rc::Rc;

pub const FALSE: SymbolicBit = SymbolicBit::Literal(false);
pub const TRUE: SymbolicBit = SymbolicBit::Literal(true);

/// A value that can be used to represent a variable bit, possibly with constraints on its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolicBit {
    /// A literal `true` or `false` value.
    Literal(bool),

    /// A variable value. The parameter is the identifier for this variable. Two variables with the
    /// same identifier are equivalent.
    Variable(usize),

    /// The negation of a symbolic bit. The `!` operator should be preferred to this, as it has the
    /// opportunity to perform simplications where a direct construction does not.
    Not(Rc<Self>),

    /// The conjunction of two symbolic bits. The `&` operator should be preferred to this, as it
    /// has the opportunity to perform simplifications where a direct construction does not.
    And(Rc<Self>, Rc<Self>),
}

impl SymbolicBit {
    pub fn maybe_literal(&self) -> Option<bool> {
        match self {
            Self::Literal(b) => Some(*b),
            _ => None,
        }
    }

    pub fn maybe_variable(&self) -> Option<usize> {
        match self {
            Self::Variable(id) => Some(*id),
            _ => None,
        }
    }

    pub fn equals(self, rhs: Self) -> Self {
        (self.clone() & rhs.clone()) | (!self & !rhs)
    }

    pub fn select(self, lhs: Self, rhs: Self) -> Self {
        (self.clone() & lhs) | (!self & rhs)
    }

    /// Checks whether two bits are known to be the same expression without walking the
    /// expression trees. Composite bits are only identical if they share their operands.
    pub fn is_identical(&self, rhs: &Self) -> bool {
        match (self, rhs) {
            (Self::Literal(x), Self::Literal(y)) => x == y,
            (Self::Variable(x), Self::Variable(y)) => x == y,
            (Self::Not(x), Self::Not(y)) => Rc::ptr_eq(x, y) || x.is_same_leaf(y),
            (Self::And(x, y), Self::And(u, v)) => {
                (Rc::ptr_eq(x, u) || x.is_same_leaf(u)) && (Rc::ptr_eq(y, v) || y.is_same_leaf(v))
                    || (Rc::ptr_eq(x, v) || x.is_same_leaf(v))
                        && (Rc::ptr_eq(y, u) || y.is_same_leaf(u))
            }
            _ => false,
        }
    }

    fn is_same_leaf(&self, rhs: &Self) -> bool {
        match (self, rhs) {
            (Self::Literal(x), Self::Literal(y)) => x == y,
            (Self::Variable(x), Self::Variable(y)) => x == y,
            _ => false,
        }
    }
}

impl Default for SymbolicBit {
    fn default() -> Self {
        FALSE
    }
}

impl std::ops::Not for SymbolicBit {
    type Output = Self;

    fn not(self) -> Self::Output {
        match self {
            SymbolicBit::Literal(value) => SymbolicBit::Literal(!value),
            SymbolicBit::Not(y) => Rc::unwrap_or_clone(y),
            _ => SymbolicBit::Not(Rc::new(self)),
        }
    }
}

impl std::ops::BitAnd for SymbolicBit {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        if self.is_identical(&rhs) {
            return self;
        }

        match self {
            SymbolicBit::Literal(false) => return FALSE,
            SymbolicBit::Literal(true) => return rhs,
            SymbolicBit::Not(ref z) if z.is_identical(&rhs) => return FALSE,
            _ => (),
        }

        match rhs {
            SymbolicBit::Literal(false) => return FALSE,
            SymbolicBit::Literal(true) => return self,
            SymbolicBit::Not(ref z) if z.is_identical(&self) => return FALSE,
            _ => (),
        }

        SymbolicBit::And(Rc::new(self), Rc::new(rhs))
    }
}

impl std::ops::BitOr for SymbolicBit {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        !(!self & !rhs)
    }
}

impl std::ops::BitXor for SymbolicBit {
    type Output = Self;

    fn bitxor(self, rhs: Self) -> Self::Output {
        // Literal operands reduce to the other operand or its negation
        match (self.maybe_literal(), rhs.maybe_literal()) {
            (Some(false), _) => rhs,
            (Some(true), _) => !rhs,
            (_, Some(false)) => self,
            (_, Some(true)) => !self,
            _ => (self.clone() & !rhs.clone()) | (!self & rhs),
        }
    }
}

//! The set of value types an expression may produce.
use itertools::Itertools;
use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not};

/// A bit set of possible value types.
///
/// Literals may be ambiguous: the string `"red"` is both a `STRING` and a
/// `COLOR`, a three-number array is both a `NUMBER_ARRAY` and a `COLOR`.
/// Operators narrow the set with the type hints they pass down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ValueTypes(u8);

impl ValueTypes {
    pub const NONE: Self = Self(0);
    pub const COLOR: Self = Self(0b00001);
    pub const NUMBER: Self = Self(0b00010);
    pub const BOOLEAN: Self = Self(0b00100);
    pub const NUMBER_ARRAY: Self = Self(0b01000);
    pub const STRING: Self = Self(0b10000);
    pub const ANY: Self = Self(0b11111);

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// True when at least one type is shared.
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// True when exactly one type remains.
    pub const fn is_unique(self) -> bool {
        self.0.count_ones() == 1
    }
}

impl BitOr for ValueTypes {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for ValueTypes {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for ValueTypes {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl BitAndAssign for ValueTypes {
    fn bitand_assign(&mut self, rhs: Self) {
        self.0 &= rhs.0;
    }
}

impl Not for ValueTypes {
    type Output = Self;

    fn not(self) -> Self {
        Self(!self.0 & Self::ANY.0)
    }
}

impl fmt::Display for ValueTypes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        let names = [
            (Self::COLOR, "color"),
            (Self::NUMBER, "number"),
            (Self::BOOLEAN, "boolean"),
            (Self::NUMBER_ARRAY, "number[]"),
            (Self::STRING, "string"),
        ];
        let joined = names
            .iter()
            .filter(|(ty, _)| self.contains(*ty))
            .map(|(_, name)| name)
            .join("|");
        f.write_str(&joined)
    }
}

//! 24-bit bus address arithmetic

use num_traits::{Bounded, One, Zero};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::{Display, Formatter, LowerHex, UpperHex};
use std::ops::{Add, AddAssign, BitAnd, BitOr, Mul, Sub};

const MASK: u32 = 0xFF_FFFF;

/// An unsigned 24-bit quantity, the width of the 65C816 address bus.
///
/// All arithmetic wraps at `0xFF_FFFF`, matching the behavior of the
/// program bank/program counter pair during sequential execution.
#[allow(non_camel_case_types)]
#[derive(
    Copy, Clone, Default, Hash, PartialEq, Eq, PartialOrd, Ord, Debug, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct u24 {
    v: u32,
}

impl u24 {
    /// The wrapped 24-bit value.
    pub fn value(self) -> u32 {
        self.v
    }

    /// The bank byte (top 8 bits) of the address.
    pub fn bank(self) -> u8 {
        (self.v >> 16) as u8
    }
}

impl Display for u24 {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "{}", self.v)
    }
}

impl UpperHex for u24 {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        UpperHex::fmt(&self.v, f)
    }
}

impl LowerHex for u24 {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        LowerHex::fmt(&self.v, f)
    }
}

impl From<u8> for u24 {
    fn from(v: u8) -> Self {
        u24 { v: u32::from(v) }
    }
}

impl From<u16> for u24 {
    fn from(v: u16) -> Self {
        u24 { v: u32::from(v) }
    }
}

impl From<u32> for u24 {
    fn from(v: u32) -> Self {
        u24 { v: v & MASK }
    }
}

impl From<u24> for u32 {
    fn from(v: u24) -> Self {
        v.v
    }
}

impl From<u24> for usize {
    fn from(v: u24) -> Self {
        v.v as usize
    }
}

impl Add for u24 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        u24 {
            v: self.v.wrapping_add(rhs.v) & MASK,
        }
    }
}

impl Add<u32> for u24 {
    type Output = Self;

    fn add(self, rhs: u32) -> Self {
        u24 {
            v: self.v.wrapping_add(rhs) & MASK,
        }
    }
}

impl AddAssign<u32> for u24 {
    fn add_assign(&mut self, rhs: u32) {
        self.v = self.v.wrapping_add(rhs) & MASK;
    }
}

impl Sub for u24 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        u24 {
            v: self.v.wrapping_sub(rhs.v) & MASK,
        }
    }
}

impl Mul for u24 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        u24 {
            v: self.v.wrapping_mul(rhs.v) & MASK,
        }
    }
}

impl BitAnd<u32> for u24 {
    type Output = Self;

    fn bitand(self, rhs: u32) -> Self {
        u24 {
            v: self.v & rhs & MASK,
        }
    }
}

impl BitOr for u24 {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        u24 { v: self.v | rhs.v }
    }
}

impl BitOr<u32> for u24 {
    type Output = Self;

    fn bitor(self, rhs: u32) -> Self {
        u24 {
            v: (self.v | rhs) & MASK,
        }
    }
}

impl Zero for u24 {
    fn zero() -> Self {
        u24 { v: 0 }
    }

    fn is_zero(&self) -> bool {
        self.v == 0
    }
}

impl One for u24 {
    fn one() -> Self {
        u24 { v: 1 }
    }

    fn is_one(&self) -> bool {
        self.v == 1
    }
}

impl Bounded for u24 {
    fn min_value() -> Self {
        u24 { v: 0 }
    }

    fn max_value() -> Self {
        u24 { v: MASK }
    }
}

//! Closed intervals over the unsigned 64-bit domain.
//!
//! A [`ValueRange`] `[min, max]` stands for every integer between its bounds.
//! `min > max` is the empty range. Bitwise `And`/`Or` bounds are exact;
//! `Xor` and all arithmetic are deliberately coarse.

use std::fmt;

use crate::types::Width;
use crate::utils::{lshr, max_value_of_n_bits, sext, shl};

// Hacker's Delight, 4-3: bounds of `x | y` and `x & y` for `x in [a, b]`,
// `y in [c, d]`. Each scans from the most significant bit for the first
// position where raising a lower bound (or lowering an upper bound) pays off.

fn min_or(mut a: u64, b: u64, mut c: u64, d: u64) -> u64 {
    let mut m = 1u64 << 63;
    while m != 0 {
        if !a & c & m != 0 {
            let temp = (a | m) & m.wrapping_neg();
            if temp <= b {
                a = temp;
                break;
            }
        } else if a & !c & m != 0 {
            let temp = (c | m) & m.wrapping_neg();
            if temp <= d {
                c = temp;
                break;
            }
        }
        m >>= 1;
    }
    a | c
}

fn max_or(a: u64, mut b: u64, c: u64, mut d: u64) -> u64 {
    let mut m = 1u64 << 63;
    while m != 0 {
        if b & d & m != 0 {
            let temp = (b - m) | (m - 1);
            if temp >= a {
                b = temp;
                break;
            }
            let temp = (d - m) | (m - 1);
            if temp >= c {
                d = temp;
                break;
            }
        }
        m >>= 1;
    }
    b | d
}

fn min_and(mut a: u64, b: u64, mut c: u64, d: u64) -> u64 {
    let mut m = 1u64 << 63;
    while m != 0 {
        if !a & !c & m != 0 {
            let temp = (a | m) & m.wrapping_neg();
            if temp <= b {
                a = temp;
                break;
            }
            let temp = (c | m) & m.wrapping_neg();
            if temp <= d {
                c = temp;
                break;
            }
        }
        m >>= 1;
    }
    a & c
}

fn max_and(a: u64, mut b: u64, c: u64, mut d: u64) -> u64 {
    let mut m = 1u64 << 63;
    while m != 0 {
        if b & !d & m != 0 {
            let temp = (b & !m) | (m - 1);
            if temp >= a {
                b = temp;
                break;
            }
        } else if !b & d & m != 0 {
            let temp = (d & !m) | (m - 1);
            if temp >= c {
                d = temp;
                break;
            }
        }
        m >>= 1;
    }
    b & d
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ValueRange {
    min: u64,
    max: u64,
}

impl Default for ValueRange {
    /// The empty range.
    fn default() -> Self {
        Self::empty()
    }
}

impl ValueRange {
    pub const fn new(min: u64, max: u64) -> Self {
        Self { min, max }
    }

    pub const fn empty() -> Self {
        Self { min: 1, max: 0 }
    }

    /// The singleton `[value, value]`.
    pub const fn fixed(value: u64) -> Self {
        Self {
            min: value,
            max: value,
        }
    }

    /// `[0, 2^bits - 1]`.
    pub const fn full(bits: Width) -> Self {
        Self {
            min: 0,
            max: max_value_of_n_bits(bits),
        }
    }

    pub const fn is_empty(&self) -> bool {
        self.min > self.max
    }

    /// Singleton test; read the value with [`min`](Self::min).
    pub const fn is_fixed(&self) -> bool {
        self.min == self.max
    }

    pub fn is_full_range(&self, bits: Width) -> bool {
        self.min == 0 && self.max == max_value_of_n_bits(bits)
    }

    pub fn contains(&self, value: u64) -> bool {
        self.min <= value && value <= self.max
    }

    pub fn intersects(&self, b: &ValueRange) -> bool {
        !self.set_intersection(b).is_empty()
    }

    pub fn min(&self) -> u64 {
        assert!(!self.is_empty(), "cannot get minimum of empty range");
        self.min
    }

    pub fn max(&self) -> u64 {
        assert!(!self.is_empty(), "cannot get maximum of empty range");
        self.max
    }

    /// Lower bound of the range read as `bits`-wide two's complement values.
    pub fn min_signed(&self, bits: Width) -> i64 {
        let (min, max) = self.signed_window(bits);
        let sign = 1u64 << (bits - 1);
        if min < sign && max >= sign {
            sext(sign, bits)
        } else {
            sext(min, bits)
        }
    }

    /// Upper bound of the range read as `bits`-wide two's complement values.
    pub fn max_signed(&self, bits: Width) -> i64 {
        let (min, max) = self.signed_window(bits);
        let sign = 1u64 << (bits - 1);
        if min < sign && max >= sign {
            (sign - 1) as i64
        } else {
            sext(max, bits)
        }
    }

    fn signed_window(&self, bits: Width) -> (u64, u64) {
        assert!(!self.is_empty(), "cannot get signed bounds of empty range");
        assert!(
            (1..=64).contains(&bits) && self.max <= max_value_of_n_bits(bits),
            "range {} is outside {} bits",
            self,
            bits
        );
        (self.min, self.max)
    }

    pub fn must_equal(&self, value: u64) -> bool {
        self.min == self.max && self.min == value
    }

    pub fn may_equal(&self, value: u64) -> bool {
        self.contains(value)
    }

    pub fn must_equal_range(&self, b: &ValueRange) -> bool {
        self.is_fixed() && b.is_fixed() && self.min == b.min
    }

    pub fn may_equal_range(&self, b: &ValueRange) -> bool {
        self.intersects(b)
    }
}

// Set operations
impl ValueRange {
    pub fn set_intersection(&self, b: &ValueRange) -> ValueRange {
        ValueRange::new(self.min.max(b.min), self.max.min(b.max))
    }

    pub fn set_union(&self, b: &ValueRange) -> ValueRange {
        if self.is_empty() {
            return *b;
        }
        if b.is_empty() {
            return *self;
        }
        ValueRange::new(self.min.min(b.min), self.max.max(b.max))
    }

    /// `self \ b` as a single interval.
    ///
    /// When `b` splits `self` in two, only the lower piece is kept.
    pub fn set_difference(&self, b: &ValueRange) -> ValueRange {
        if b.is_empty() || b.min > self.max || b.max < self.min {
            *self
        } else if b.min <= self.min && b.max >= self.max {
            ValueRange::empty()
        } else if b.min <= self.min {
            // b.max < self.max, so no overflow
            ValueRange::new(b.max + 1, self.max)
        } else {
            // b.min > self.min, so no underflow
            ValueRange::new(self.min, b.min - 1)
        }
    }
}

// Bitwise operations
impl ValueRange {
    pub fn binary_and(&self, b: &ValueRange) -> ValueRange {
        if self.is_empty() || b.is_empty() {
            return ValueRange::empty();
        }
        if self.is_fixed() && b.is_fixed() {
            return ValueRange::fixed(self.min & b.min);
        }
        ValueRange::new(
            min_and(self.min, self.max, b.min, b.max),
            max_and(self.min, self.max, b.min, b.max),
        )
    }

    pub fn binary_or(&self, b: &ValueRange) -> ValueRange {
        if self.is_empty() || b.is_empty() {
            return ValueRange::empty();
        }
        if self.is_fixed() && b.is_fixed() {
            return ValueRange::fixed(self.min | b.min);
        }
        ValueRange::new(
            min_or(self.min, self.max, b.min, b.max),
            max_or(self.min, self.max, b.min, b.max),
        )
    }

    /// Exact for two singletons, otherwise `[0, 2^k - 1]` with `2^k` the
    /// smallest power of two above `self.max | b.max`.
    pub fn binary_xor(&self, b: &ValueRange) -> ValueRange {
        if self.is_empty() || b.is_empty() {
            return ValueRange::empty();
        }
        if self.is_fixed() && b.is_fixed() {
            return ValueRange::fixed(self.min ^ b.min);
        }
        let bits = 64 - (self.max | b.max).leading_zeros();
        ValueRange::full(bits)
    }

    pub fn binary_shift_left(&self, bits: Width) -> ValueRange {
        if self.is_empty() {
            return ValueRange::empty();
        }
        ValueRange::new(shl(self.min, bits as u64), shl(self.max, bits as u64))
    }

    pub fn binary_shift_right(&self, bits: Width) -> ValueRange {
        if self.is_empty() {
            return ValueRange::empty();
        }
        ValueRange::new(lshr(self.min, bits as u64), lshr(self.max, bits as u64))
    }

    /// `self ++ b`, where `b` is `bits` wide.
    pub fn concat(&self, b: &ValueRange, bits: Width) -> ValueRange {
        self.binary_shift_left(bits).binary_or(b)
    }

    /// Bits `[low_bit, max_bit)` of every value.
    pub fn extract(&self, low_bit: Width, max_bit: Width) -> ValueRange {
        self.binary_shift_right(low_bit)
            .binary_and(&ValueRange::fixed(max_value_of_n_bits(max_bit - low_bit)))
    }
}

// Arithmetic is not tracked.
impl ValueRange {
    pub fn add(&self, _b: &ValueRange, width: Width) -> ValueRange {
        ValueRange::full(width)
    }
    pub fn sub(&self, _b: &ValueRange, width: Width) -> ValueRange {
        ValueRange::full(width)
    }
    pub fn mul(&self, _b: &ValueRange, width: Width) -> ValueRange {
        ValueRange::full(width)
    }
    pub fn udiv(&self, _b: &ValueRange, width: Width) -> ValueRange {
        ValueRange::full(width)
    }
    pub fn sdiv(&self, _b: &ValueRange, width: Width) -> ValueRange {
        ValueRange::full(width)
    }
    pub fn urem(&self, _b: &ValueRange, width: Width) -> ValueRange {
        ValueRange::full(width)
    }
    pub fn srem(&self, _b: &ValueRange, width: Width) -> ValueRange {
        ValueRange::full(width)
    }
}

impl fmt::Display for ValueRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "[]")
        } else if self.is_fixed() {
            write!(f, "{}", self.min)
        } else {
            write!(f, "[{},{}]", self.min, self.max)
        }
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    fn r(min: u64, max: u64) -> ValueRange {
        ValueRange::new(min, max)
    }

    #[test]
    fn test_intersection_union() {
        assert_eq!(r(0, 10).set_intersection(&r(5, 20)), r(5, 10));
        assert!(r(0, 4).set_intersection(&r(5, 9)).is_empty());
        assert_eq!(r(0, 4).set_union(&r(10, 12)), r(0, 12));
        assert_eq!(ValueRange::empty().set_union(&r(5, 9)), r(5, 9));
        assert_eq!(r(5, 9).set_union(&ValueRange::empty()), r(5, 9));
    }

    #[test]
    fn test_difference() {
        // disjoint
        assert_eq!(r(0, 10).set_difference(&r(20, 30)), r(0, 10));
        // covering
        assert!(r(3, 5).set_difference(&r(0, 10)).is_empty());
        // straddles the lower edge
        assert_eq!(r(0, 10).set_difference(&r(0, 3)), r(4, 10));
        // straddles the upper edge
        assert_eq!(r(0, 10).set_difference(&r(8, 12)), r(0, 7));
        // strictly inside: lower piece only
        assert_eq!(r(0, 10).set_difference(&r(4, 6)), r(0, 3));
        // empty subtrahend
        assert_eq!(r(0, 10).set_difference(&ValueRange::empty()), r(0, 10));
    }

    #[test]
    fn test_and_or_fixed() {
        let a = ValueRange::fixed(0b1100);
        let b = ValueRange::fixed(0b1010);
        assert_eq!(a.binary_and(&b), ValueRange::fixed(0b1000));
        assert_eq!(a.binary_or(&b), ValueRange::fixed(0b1110));
        assert_eq!(a.binary_xor(&b), ValueRange::fixed(0b0110));
    }

    #[test]
    fn test_and_or_bounds() {
        assert_eq!(r(0, 255).binary_and(&ValueRange::fixed(0x0f)), r(0, 15));
        assert_eq!(r(0x100, 0x1ff).binary_and(&ValueRange::fixed(0xff)), r(0, 255));
        assert_eq!(r(1, 2).binary_or(&r(4, 4)), r(5, 6));
        assert_eq!(r(0, 1).binary_or(&r(0, 2)), r(0, 3));
    }

    #[test]
    fn test_empty_operands() {
        let e = ValueRange::empty();
        assert!(e.binary_and(&r(0, 3)).is_empty());
        assert!(r(0, 3).binary_or(&e).is_empty());
        assert!(e.binary_xor(&r(0, 3)).is_empty());
        assert!(e.binary_shift_right(1).is_empty());
        assert!(e.extract(0, 8).is_empty());
    }

    #[test]
    fn test_xor_is_coarse() {
        assert_eq!(r(0, 5).binary_xor(&r(1, 2)), r(0, 7));
        assert_eq!(r(0, 8).binary_xor(&r(0, 1)), r(0, 15));
        assert_eq!(r(0, 1 << 63).binary_xor(&r(0, 1)), ValueRange::full(64));
    }

    #[test]
    fn test_concat_extract() {
        let hi = ValueRange::fixed(0x12);
        let lo = r(0x30, 0x3f);
        assert_eq!(hi.concat(&lo, 8), r(0x1230, 0x123f));
        assert_eq!(r(0x1230, 0x123f).extract(8, 16), ValueRange::fixed(0x12));
        assert_eq!(r(0x1230, 0x123f).extract(0, 8), r(0x30, 0x3f));
        assert_eq!(r(0, 9).extract(8, 16), ValueRange::fixed(0));
    }

    #[test]
    fn test_arith_is_full() {
        let a = ValueRange::fixed(3);
        assert!(a.add(&a, 8).is_full_range(8));
        assert!(a.mul(&a, 16).is_full_range(16));
        assert!(a.srem(&a, 64).is_full_range(64));
    }

    #[test]
    fn test_signed_bounds() {
        // no straddle, non-negative
        assert_eq!(r(3, 100).min_signed(8), 3);
        assert_eq!(r(3, 100).max_signed(8), 100);
        // no straddle, negative
        assert_eq!(r(200, 250).min_signed(8), -56);
        assert_eq!(r(200, 250).max_signed(8), -6);
        // straddle
        assert_eq!(r(100, 200).min_signed(8), -128);
        assert_eq!(r(100, 200).max_signed(8), 127);
        assert_eq!(ValueRange::full(64).min_signed(64), i64::MIN);
        assert_eq!(ValueRange::full(64).max_signed(64), i64::MAX);
    }

    #[test]
    fn test_predicates() {
        assert!(ValueRange::fixed(4).must_equal(4));
        assert!(!r(4, 5).must_equal(4));
        assert!(r(4, 5).may_equal(5));
        assert!(!r(4, 5).may_equal(6));
        assert!(ValueRange::fixed(4).must_equal_range(&ValueRange::fixed(4)));
        assert!(r(0, 4).may_equal_range(&r(4, 9)));
        assert!(!r(0, 3).may_equal_range(&r(4, 9)));
        assert!(ValueRange::full(8).is_full_range(8));
        assert!(!r(1, 255).is_full_range(8));
    }

    #[test]
    #[should_panic(expected = "cannot get minimum of empty range")]
    fn test_min_of_empty() {
        ValueRange::empty().min();
    }

    #[test]
    fn test_display() {
        assert_eq!(ValueRange::fixed(7).to_string(), "7");
        assert_eq!(r(0, 9).to_string(), "[0,9]");
        assert_eq!(ValueRange::empty().to_string(), "[]");
    }

    #[test]
    fn test_and_or_exhaustive_small() {
        // Every pair of 4-bit ranges.
        for a0 in 0..16u64 {
            for a1 in a0..16 {
                for b0 in 0..16u64 {
                    for b1 in b0..16 {
                        let and = r(a0, a1).binary_and(&r(b0, b1));
                        let or = r(a0, a1).binary_or(&r(b0, b1));
                        let (mut lo_and, mut hi_and) = (u64::MAX, 0);
                        let (mut lo_or, mut hi_or) = (u64::MAX, 0);
                        for x in a0..=a1 {
                            for y in b0..=b1 {
                                lo_and = lo_and.min(x & y);
                                hi_and = hi_and.max(x & y);
                                lo_or = lo_or.min(x | y);
                                hi_or = hi_or.max(x | y);
                            }
                        }
                        assert_eq!(and, r(lo_and, hi_and), "[{a0},{a1}] & [{b0},{b1}]");
                        assert_eq!(or, r(lo_or, hi_or), "[{a0},{a1}] | [{b0},{b1}]");
                    }
                }
            }
        }
    }
}

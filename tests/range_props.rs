//! Property-based soundness tests for the interval domain.
//!
//! For every pair of ranges and every pair of values drawn from them, the
//! concrete result of an operator must lie within the range computed for it.

use fastcex::range::ValueRange;
use fastcex::types::Width;
use fastcex::utils::{max_value_of_n_bits, sext};
use proptest::prelude::*;

/// Non-empty ranges within `bits` bits.
fn range_in(bits: Width) -> impl Strategy<Value = ValueRange> {
    let max = max_value_of_n_bits(bits);
    (0..=max, 0..=max).prop_map(|(a, b)| ValueRange::new(a.min(b), a.max(b)))
}

/// Up to `n` evenly spread values of `r`, always including both ends.
fn samples(r: ValueRange, n: u64) -> Vec<u64> {
    let (min, max) = (r.min(), r.max());
    let step = ((max - min) / n).max(1);
    let mut values: Vec<u64> = (0..=n).map_while(|i| min.checked_add(i * step)).take_while(|&v| v <= max).collect();
    values.push(max);
    values
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    /// AND bounds hold for every pair of 8-bit values.
    #[test]
    fn soundness_and_8bit(a in range_in(8), b in range_in(8)) {
        let r = a.binary_and(&b);
        for x in a.min()..=a.max() {
            for y in b.min()..=b.max() {
                prop_assert!(r.contains(x & y), "{} & {} not in {} = {} & {}", x, y, r, a, b);
            }
        }
    }

    /// OR bounds hold for every pair of 8-bit values.
    #[test]
    fn soundness_or_8bit(a in range_in(8), b in range_in(8)) {
        let r = a.binary_or(&b);
        for x in a.min()..=a.max() {
            for y in b.min()..=b.max() {
                prop_assert!(r.contains(x | y), "{} | {} not in {} = {} | {}", x, y, r, a, b);
            }
        }
    }

    /// XOR is coarse but still sound.
    #[test]
    fn soundness_xor_8bit(a in range_in(8), b in range_in(8)) {
        let r = a.binary_xor(&b);
        for x in a.min()..=a.max() {
            for y in b.min()..=b.max() {
                prop_assert!(r.contains(x ^ y));
            }
        }
    }

    /// AND/OR bounds on wide ranges, checked at sample points.
    #[test]
    fn soundness_and_or_64bit(a in range_in(64), b in range_in(64)) {
        let and = a.binary_and(&b);
        let or = a.binary_or(&b);
        for x in samples(a, 16) {
            for y in samples(b, 16) {
                prop_assert!(and.contains(x & y));
                prop_assert!(or.contains(x | y));
            }
        }
    }

    #[test]
    fn intersection_is_subset(a in range_in(16), b in range_in(16)) {
        let i = a.set_intersection(&b);
        if !i.is_empty() {
            prop_assert!(a.contains(i.min()) && a.contains(i.max()));
            prop_assert!(b.contains(i.min()) && b.contains(i.max()));
        } else {
            prop_assert!(!a.may_equal_range(&b));
        }
    }

    #[test]
    fn union_is_superset(a in range_in(16), b in range_in(16)) {
        let u = a.set_union(&b);
        prop_assert!(u.contains(a.min()) && u.contains(a.max()));
        prop_assert!(u.contains(b.min()) && u.contains(b.max()));
    }

    /// The difference never contains values of the removed range.
    #[test]
    fn difference_excludes(a in range_in(8), b in range_in(8)) {
        let d = a.set_difference(&b);
        for v in a.min()..=a.max() {
            if d.contains(v) {
                prop_assert!(!b.contains(v));
            }
        }
    }

    #[test]
    fn concat_extract_sound(a in range_in(8), b in range_in(8)) {
        let c = a.concat(&b, 8);
        for x in samples(a, 8) {
            for y in samples(b, 8) {
                let v = (x << 8) | y;
                prop_assert!(c.contains(v));
                prop_assert!(c.extract(8, 16).contains(x));
                prop_assert!(c.extract(0, 8).contains(y));
            }
        }
    }
}

fn check_signed_bounds(r: ValueRange, bits: Width) -> Result<(), TestCaseError> {
    let (lo, hi) = (r.min_signed(bits), r.max_signed(bits));
    prop_assert!(lo <= hi);
    for v in samples(r, 64) {
        let s = sext(v, bits);
        prop_assert!(lo <= s && s <= hi, "{} not in [{}, {}] for {}", s, lo, hi, r);
    }
    // Both bounds are taken by some value of the range.
    let mask = max_value_of_n_bits(bits);
    prop_assert!(r.contains(lo as u64 & mask), "{} not attained in {}", lo, r);
    prop_assert!(r.contains(hi as u64 & mask), "{} not attained in {}", hi, r);
    Ok(())
}

proptest! {
    #[test]
    fn signed_bounds_8(r in range_in(8)) {
        check_signed_bounds(r, 8)?;
    }

    #[test]
    fn signed_bounds_16(r in range_in(16)) {
        check_signed_bounds(r, 16)?;
    }

    #[test]
    fn signed_bounds_32(r in range_in(32)) {
        check_signed_bounds(r, 32)?;
    }

    #[test]
    fn signed_bounds_64(r in range_in(64)) {
        check_signed_bounds(r, 64)?;
    }
}

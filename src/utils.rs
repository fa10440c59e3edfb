use crate::types::Width;

/// [Szudzik pairing function][szudzik-pairing], wrapping on overflow.
///
/// ```text
/// (a, b) -> if (a<b) then (b^2 + a) else (a^2 + a + b)
/// ```
///
/// Constant payloads span the whole `u64` domain, so the arithmetic wraps
/// instead of overflowing. The result is only used for bucket selection.
///
/// [szudzik-pairing]: http://szudzik.com/ElegantPairing.pdf
pub fn pairing2(a: u64, b: u64) -> u64 {
    if a < b {
        b.wrapping_mul(b).wrapping_add(a)
    } else {
        a.wrapping_mul(a).wrapping_add(a).wrapping_add(b)
    }
}

/// Pairing function for three `u64` values.
pub fn pairing3(a: u64, b: u64, c: u64) -> u64 {
    pairing2(pairing2(a, b), c)
}

/// Pairing function for four `u64` values.
pub fn pairing4(a: u64, b: u64, c: u64, d: u64) -> u64 {
    pairing2(pairing2(a, b), pairing2(c, d))
}

pub trait MyHash {
    /// Bucket hash (not necessarily perfect once values wrap).
    fn hash(&self) -> u64;
}

impl MyHash for (u64, u64) {
    fn hash(&self) -> u64 {
        pairing2(self.0, self.1)
    }
}

impl MyHash for (u64, u64, u64) {
    fn hash(&self) -> u64 {
        pairing3(self.0, self.1, self.2)
    }
}

impl MyHash for (u64, u64, u64, u64) {
    fn hash(&self) -> u64 {
        pairing4(self.0, self.1, self.2, self.3)
    }
}

/// All-ones value of the given width: `2^bits - 1`.
pub const fn max_value_of_n_bits(bits: Width) -> u64 {
    if bits >= 64 {
        u64::MAX
    } else {
        (1u64 << bits) - 1
    }
}

/// Keep only the low `bits` bits of `value`.
pub const fn truncate(value: u64, bits: Width) -> u64 {
    value & max_value_of_n_bits(bits)
}

/// Sign-extend the low `bits` bits of `value` to a full `i64`.
pub const fn sext(value: u64, bits: Width) -> i64 {
    assert!(bits > 0 && bits <= 64, "Width should be in the range 1..=64");
    let shift = 64 - bits;
    ((value << shift) as i64) >> shift
}

/// Logical shift left that saturates to zero instead of panicking.
pub const fn shl(value: u64, bits: u64) -> u64 {
    if bits >= 64 {
        0
    } else {
        value << bits
    }
}

/// Logical shift right that saturates to zero instead of panicking.
pub const fn lshr(value: u64, bits: u64) -> u64 {
    if bits >= 64 {
        0
    } else {
        value >> bits
    }
}

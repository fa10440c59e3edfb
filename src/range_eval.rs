//! Forward abstract evaluation of expressions over an interval-like domain.
//!
//! [`RangeEvaluator`] computes, for any expression, a value of the abstract
//! domain `T` that contains every concrete value the expression can take
//! given what the [`ReadRange`] source knows about array contents. It never
//! mutates anything.
//!
//! Only comparisons, bitwise operators, concatenation and extraction are
//! tracked; arithmetic is delegated to the domain (which may give up), and
//! shifts and sign extension evaluate to the full range of their width.

use std::fmt::Display;

use log::trace;

use crate::cache::{Cache, CacheStats};
use crate::expr::{ExprKind, ExprManager, UpdateList, ARRAY_RANGE};
use crate::node::BinOp;
use crate::range::ValueRange;
use crate::reference::ExprRef;
use crate::types::{ArrayId, Width, BOOL};

/// Operations a domain must provide to be evaluated over.
pub trait RangeDomain: Copy + Display {
    fn fixed(value: u64) -> Self;
    fn empty() -> Self;
    fn full(bits: Width) -> Self;

    fn is_empty(&self) -> bool;
    fn is_full_range(&self, bits: Width) -> bool;
    fn must_equal(&self, value: u64) -> bool;
    fn must_equal_range(&self, b: &Self) -> bool;
    fn may_equal_range(&self, b: &Self) -> bool;

    fn min(&self) -> u64;
    fn max(&self) -> u64;
    fn min_signed(&self, bits: Width) -> i64;
    fn max_signed(&self, bits: Width) -> i64;

    fn set_union(&self, b: &Self) -> Self;

    fn binary_and(&self, b: &Self) -> Self;
    fn binary_or(&self, b: &Self) -> Self;
    fn binary_xor(&self, b: &Self) -> Self;
    fn concat(&self, b: &Self, bits: Width) -> Self;
    fn extract(&self, low_bit: Width, max_bit: Width) -> Self;

    fn add(&self, b: &Self, width: Width) -> Self;
    fn sub(&self, b: &Self, width: Width) -> Self;
    fn mul(&self, b: &Self, width: Width) -> Self;
    fn udiv(&self, b: &Self, width: Width) -> Self;
    fn sdiv(&self, b: &Self, width: Width) -> Self;
    fn urem(&self, b: &Self, width: Width) -> Self;
    fn srem(&self, b: &Self, width: Width) -> Self;
}

impl RangeDomain for ValueRange {
    fn fixed(value: u64) -> Self {
        ValueRange::fixed(value)
    }
    fn empty() -> Self {
        ValueRange::empty()
    }
    fn full(bits: Width) -> Self {
        ValueRange::full(bits)
    }

    fn is_empty(&self) -> bool {
        ValueRange::is_empty(self)
    }
    fn is_full_range(&self, bits: Width) -> bool {
        ValueRange::is_full_range(self, bits)
    }
    fn must_equal(&self, value: u64) -> bool {
        ValueRange::must_equal(self, value)
    }
    fn must_equal_range(&self, b: &Self) -> bool {
        ValueRange::must_equal_range(self, b)
    }
    fn may_equal_range(&self, b: &Self) -> bool {
        ValueRange::may_equal_range(self, b)
    }

    fn min(&self) -> u64 {
        ValueRange::min(self)
    }
    fn max(&self) -> u64 {
        ValueRange::max(self)
    }
    fn min_signed(&self, bits: Width) -> i64 {
        ValueRange::min_signed(self, bits)
    }
    fn max_signed(&self, bits: Width) -> i64 {
        ValueRange::max_signed(self, bits)
    }

    fn set_union(&self, b: &Self) -> Self {
        ValueRange::set_union(self, b)
    }

    fn binary_and(&self, b: &Self) -> Self {
        ValueRange::binary_and(self, b)
    }
    fn binary_or(&self, b: &Self) -> Self {
        ValueRange::binary_or(self, b)
    }
    fn binary_xor(&self, b: &Self) -> Self {
        ValueRange::binary_xor(self, b)
    }
    fn concat(&self, b: &Self, bits: Width) -> Self {
        ValueRange::concat(self, b, bits)
    }
    fn extract(&self, low_bit: Width, max_bit: Width) -> Self {
        ValueRange::extract(self, low_bit, max_bit)
    }

    fn add(&self, b: &Self, width: Width) -> Self {
        ValueRange::add(self, b, width)
    }
    fn sub(&self, b: &Self, width: Width) -> Self {
        ValueRange::sub(self, b, width)
    }
    fn mul(&self, b: &Self, width: Width) -> Self {
        ValueRange::mul(self, b, width)
    }
    fn udiv(&self, b: &Self, width: Width) -> Self {
        ValueRange::udiv(self, b, width)
    }
    fn sdiv(&self, b: &Self, width: Width) -> Self {
        ValueRange::sdiv(self, b, width)
    }
    fn urem(&self, b: &Self, width: Width) -> Self {
        ValueRange::urem(self, b, width)
    }
    fn srem(&self, b: &Self, width: Width) -> Self {
        ValueRange::srem(self, b, width)
    }
}

/// Source of ranges for bytes that no write in the log covers.
pub trait ReadRange<T> {
    /// Range of the initial contents of `array` at an index within `index`.
    fn initial_read_range(&self, array: ArrayId, index: T) -> T;
}

pub struct RangeEvaluator<'a, T, S> {
    em: &'a ExprManager,
    source: &'a S,
    cache: Cache<ExprRef, T>,
}

impl<'a, T, S> RangeEvaluator<'a, T, S>
where
    T: RangeDomain,
    S: ReadRange<T>,
{
    pub fn new(em: &'a ExprManager, source: &'a S) -> Self {
        Self {
            em,
            source,
            cache: Cache::new(em.config().cache_bits),
        }
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn evaluate(&mut self, e: ExprRef) -> T {
        if let Some(range) = self.cache.get(&e) {
            return range;
        }
        let range = self.compute(e);
        trace!("range({}) = {}", e, range);
        self.cache.insert(e, range);
        range
    }

    fn compute(&mut self, e: ExprRef) -> T {
        let em = self.em;
        let width = em.width(e);

        match em.kind(e) {
            ExprKind::Constant(value) => T::fixed(value),
            ExprKind::Read { updates, index } => {
                let index = self.evaluate(index);
                self.read(updates, index)
            }
            ExprKind::Select {
                cond,
                on_true,
                on_false,
            } => {
                let cond = self.evaluate(cond);
                if cond.must_equal(1) {
                    self.evaluate(on_true)
                } else if cond.must_equal(0) {
                    self.evaluate(on_false)
                } else {
                    self.evaluate(on_true).set_union(&self.evaluate(on_false))
                }
            }
            ExprKind::Concat { msb, lsb } => {
                let bits = em.width(lsb);
                self.evaluate(msb).concat(&self.evaluate(lsb), bits)
            }
            ExprKind::Extract { expr, offset } => {
                self.evaluate(expr).extract(offset, offset + width)
            }
            ExprKind::ZExt(src) => self.evaluate(src),
            ExprKind::Not(src) if width == BOOL => {
                let value = self.evaluate(src);
                if value.must_equal(0) {
                    T::fixed(1)
                } else if value.must_equal(1) {
                    T::fixed(0)
                } else {
                    T::full(BOOL)
                }
            }
            ExprKind::Binary { op, left, right } => self.binary(op, left, right, width),
            ExprKind::NotOptimized(_) | ExprKind::SExt(_) | ExprKind::Not(_) => T::full(width),
        }
    }

    fn binary(&mut self, op: BinOp, left: ExprRef, right: ExprRef, width: Width) -> T {
        let bits = self.em.width(left);
        let l = self.evaluate(left);
        let r = self.evaluate(right);

        match op {
            BinOp::Add => l.add(&r, bits),
            BinOp::Sub => l.sub(&r, bits),
            BinOp::Mul => l.mul(&r, bits),
            BinOp::UDiv => l.udiv(&r, bits),
            BinOp::SDiv => l.sdiv(&r, bits),
            BinOp::URem => l.urem(&r, bits),
            BinOp::SRem => l.srem(&r, bits),

            BinOp::And => l.binary_and(&r),
            BinOp::Or => l.binary_or(&r),
            BinOp::Xor => l.binary_xor(&r),
            BinOp::Shl | BinOp::LShr | BinOp::AShr => T::full(width),

            BinOp::Ne | BinOp::Ugt | BinOp::Uge | BinOp::Sgt | BinOp::Sge => {
                panic!("invalid expression (uncanonicalized {})", op.name())
            }

            _ if l.is_empty() || r.is_empty() => T::full(BOOL),

            BinOp::Eq => {
                if l.must_equal_range(&r) {
                    T::fixed(1)
                } else if !l.may_equal_range(&r) {
                    T::fixed(0)
                } else {
                    T::full(BOOL)
                }
            }
            BinOp::Ult => decide(l.max() < r.min(), l.min() >= r.max()),
            BinOp::Ule => decide(l.max() <= r.min(), l.min() > r.max()),
            BinOp::Slt => decide(
                l.max_signed(bits) < r.min_signed(bits),
                l.min_signed(bits) >= r.max_signed(bits),
            ),
            BinOp::Sle => decide(
                l.max_signed(bits) <= r.min_signed(bits),
                l.min_signed(bits) > r.max_signed(bits),
            ),
        }
    }

    fn read(&mut self, updates: UpdateList, index: T) -> T {
        let em = self.em;
        let mut res = T::empty();

        for update in em.updates(updates) {
            let ui = self.evaluate(update.index);

            if ui.must_equal_range(&index) {
                return res.set_union(&self.evaluate(update.value));
            } else if ui.may_equal_range(&index) {
                res = res.set_union(&self.evaluate(update.value));
                if res.is_full_range(ARRAY_RANGE) {
                    return res;
                }
            }
        }

        res.set_union(&self.source.initial_read_range(updates.array, index))
    }
}

fn decide<T: RangeDomain>(must_be_true: bool, must_be_false: bool) -> T {
    if must_be_true {
        T::fixed(1)
    } else if must_be_false {
        T::fixed(0)
    } else {
        T::full(BOOL)
    }
}

//! Concrete evaluation.
//!
//! [`ExprEvaluator`] folds an expression down to a constant, asking an
//! [`InitialValue`] source for the initial contents of symbolic arrays.
//! Whenever some byte is not determined (unknown initial value, symbolic
//! index, out-of-bounds read, division by zero) the result is `None`.
//!
//! [`Assignment`] binds concrete bytes to arrays and is the reference
//! interpreter used to check models.

use std::collections::HashMap;

use crate::cache::{Cache, CacheStats};
use crate::expr::{ExprKind, ExprManager, UpdateList};
use crate::node::BinOp;
use crate::reference::ExprRef;
use crate::types::{ArrayId, Width, BOOL};
use crate::utils::{lshr, sext, shl, truncate};

/// Apply `op` to two constants of the given operand width.
///
/// Returns `None` for division or remainder by zero.
pub fn eval_binary(op: BinOp, left: u64, right: u64, width: Width) -> Option<u64> {
    let l = truncate(left, width);
    let r = truncate(right, width);
    let sl = sext(l, width);
    let sr = sext(r, width);

    let value = match op {
        BinOp::Add => l.wrapping_add(r),
        BinOp::Sub => l.wrapping_sub(r),
        BinOp::Mul => l.wrapping_mul(r),
        BinOp::UDiv => l.checked_div(r)?,
        BinOp::SDiv => {
            if r == 0 {
                return None;
            }
            sl.wrapping_div(sr) as u64
        }
        BinOp::URem => l.checked_rem(r)?,
        BinOp::SRem => {
            if r == 0 {
                return None;
            }
            sl.wrapping_rem(sr) as u64
        }

        BinOp::And => l & r,
        BinOp::Or => l | r,
        BinOp::Xor => l ^ r,
        BinOp::Shl => {
            if r >= width as u64 {
                0
            } else {
                shl(l, r)
            }
        }
        BinOp::LShr => {
            if r >= width as u64 {
                0
            } else {
                lshr(l, r)
            }
        }
        BinOp::AShr => {
            let amount = r.min(width as u64 - 1);
            (sl >> amount) as u64
        }

        BinOp::Eq => (l == r) as u64,
        BinOp::Ne => (l != r) as u64,
        BinOp::Ult => (l < r) as u64,
        BinOp::Ule => (l <= r) as u64,
        BinOp::Ugt => (l > r) as u64,
        BinOp::Uge => (l >= r) as u64,
        BinOp::Slt => (sl < sr) as u64,
        BinOp::Sle => (sl <= sr) as u64,
        BinOp::Sgt => (sl > sr) as u64,
        BinOp::Sge => (sl >= sr) as u64,
    };

    let result_width = if op.is_comparison() { BOOL } else { width };
    Some(truncate(value, result_width))
}

/// Source of initial contents for symbolic arrays.
pub trait InitialValue {
    /// Initial value of the in-bounds byte `index` of the symbolic `array`.
    fn initial_value(&self, array: ArrayId, index: u64) -> Option<u8>;
}

pub struct ExprEvaluator<'a, S> {
    em: &'a ExprManager,
    source: &'a S,
    cache: Cache<ExprRef, Option<u64>>,
}

impl<'a, S> ExprEvaluator<'a, S>
where
    S: InitialValue,
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

    pub fn evaluate(&mut self, e: ExprRef) -> Option<u64> {
        if let Some(value) = self.cache.get(&e) {
            return value;
        }
        let value = self.compute(e);
        self.cache.insert(e, value);
        value
    }

    fn compute(&mut self, e: ExprRef) -> Option<u64> {
        let em = self.em;
        let width = em.width(e);

        match em.kind(e) {
            ExprKind::Constant(value) => Some(value),
            ExprKind::NotOptimized(inner) => self.evaluate(inner),
            ExprKind::Read { updates, index } => {
                let index = self.evaluate(index)?;
                self.read(updates, index)
            }
            ExprKind::Select {
                cond,
                on_true,
                on_false,
            } => {
                if self.evaluate(cond)? != 0 {
                    self.evaluate(on_true)
                } else {
                    self.evaluate(on_false)
                }
            }
            ExprKind::Concat { msb, lsb } => {
                let m = self.evaluate(msb)?;
                let l = self.evaluate(lsb)?;
                Some(shl(m, em.width(lsb) as u64) | l)
            }
            ExprKind::Extract { expr, offset } => {
                let value = self.evaluate(expr)?;
                Some(truncate(lshr(value, offset as u64), width))
            }
            ExprKind::ZExt(src) => self.evaluate(src),
            ExprKind::SExt(src) => {
                let value = self.evaluate(src)?;
                Some(truncate(sext(value, em.width(src)) as u64, width))
            }
            ExprKind::Not(inner) => {
                let value = self.evaluate(inner)?;
                Some(truncate(!value, width))
            }
            ExprKind::Binary { op, left, right } => {
                if width == BOOL && matches!(op, BinOp::And | BinOp::Or) {
                    return self.boolean(op, left, right);
                }
                let l = self.evaluate(left)?;
                let r = self.evaluate(right)?;
                eval_binary(op, l, r, em.width(left))
            }
        }
    }

    /// Boolean `And`/`Or`, decided by one side when it dominates.
    fn boolean(&mut self, op: BinOp, left: ExprRef, right: ExprRef) -> Option<u64> {
        let dominant = if op == BinOp::And { 0 } else { 1 };
        let l = self.evaluate(left);
        if l == Some(dominant) {
            return l;
        }
        let r = self.evaluate(right);
        if r == Some(dominant) {
            return r;
        }
        eval_binary(op, l?, r?, BOOL)
    }

    fn read(&mut self, updates: UpdateList, index: u64) -> Option<u64> {
        let em = self.em;
        for update in em.updates(updates) {
            if self.evaluate(update.index)? == index {
                return self.evaluate(update.value);
            }
        }

        let array = em.array(updates.array);
        if index >= array.size() {
            return None;
        }
        if array.is_constant() {
            return array.constant_value(index).map(u64::from);
        }
        self.source
            .initial_value(updates.array, index)
            .map(u64::from)
    }
}

/// Concrete contents for a set of symbolic arrays.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Assignment {
    bindings: HashMap<ArrayId, Vec<u8>>,
}

impl Assignment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pair up objects with the values returned for them by a solver.
    pub fn from_values(objects: &[ArrayId], values: Vec<Vec<u8>>) -> Self {
        assert_eq!(objects.len(), values.len(), "Objects/values mismatch");
        Self {
            bindings: objects.iter().copied().zip(values).collect(),
        }
    }

    pub fn bind(&mut self, array: ArrayId, bytes: Vec<u8>) {
        self.bindings.insert(array, bytes);
    }

    pub fn get(&self, array: ArrayId) -> Option<&[u8]> {
        self.bindings.get(&array).map(Vec::as_slice)
    }

    pub fn evaluate(&self, em: &ExprManager, e: ExprRef) -> Option<u64> {
        ExprEvaluator::new(em, self).evaluate(e)
    }

    /// Check that every expression evaluates to `true`.
    pub fn satisfies(&self, em: &ExprManager, constraints: &[ExprRef]) -> bool {
        let mut evaluator = ExprEvaluator::new(em, self);
        constraints.iter().all(|&c| evaluator.evaluate(c) == Some(1))
    }
}

impl InitialValue for Assignment {
    fn initial_value(&self, array: ArrayId, index: u64) -> Option<u8> {
        let bytes = self.bindings.get(&array)?;
        bytes.get(usize::try_from(index).ok()?).copied()
    }
}

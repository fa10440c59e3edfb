//! Per-query byte tables, backward forcing and witness extraction.
//!
//! A [`CexData`] holds one [`CexObjectData`] table per symbolic array that a
//! query touches. Forcing narrows table entries so that a given expression is
//! likely to take a required range; it is a heuristic and may be wrong. The
//! only trusted check is [`CexData::must_be_value`], which evaluates the
//! expression concretely once every entry has been fixed to a single byte.

use std::collections::{BTreeMap, HashSet};

use log::{debug, trace};

use crate::eval::{ExprEvaluator, InitialValue};
use crate::expr::{ExprKind, ExprManager, ARRAY_RANGE};
use crate::node::BinOp;
use crate::range::ValueRange;
use crate::range_eval::{RangeEvaluator, ReadRange};
use crate::reference::ExprRef;
use crate::types::{ArrayId, Width, BOOL};
use crate::utils::{max_value_of_n_bits, truncate};

/// Possible values for each byte of one array.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct CexObjectData {
    values: Vec<ValueRange>,
}

impl CexObjectData {
    /// A table of `len` bytes, each `[0,255]`.
    pub fn new(len: usize) -> Self {
        Self {
            values: vec![ValueRange::full(ARRAY_RANGE); len],
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: u64) -> Option<ValueRange> {
        self.values.get(usize::try_from(index).ok()?).copied()
    }

    pub fn set(&mut self, index: u64, range: ValueRange) {
        let len = self.values.len();
        match usize::try_from(index).ok().and_then(|i| self.values.get_mut(i)) {
            Some(entry) => *entry = range,
            None => panic!("Byte {} out of table of {} bytes", index, len),
        }
    }

    pub fn values(&self) -> &[ValueRange] {
        &self.values
    }

    fn grow(&mut self, len: usize) {
        if len > self.values.len() {
            self.values.resize(len, ValueRange::full(ARRAY_RANGE));
        }
    }

    /// Replace every entry by the midpoint of its range.
    fn fix(&mut self) {
        for entry in self.values.iter_mut() {
            let (min, max) = (entry.min(), entry.max());
            *entry = ValueRange::fixed(min + (max - min) / 2);
        }
    }
}

/// Solving context of one query: a byte table per symbolic array.
pub struct CexData<'a> {
    em: &'a ExprManager,
    objects: BTreeMap<ArrayId, CexObjectData>,
}

impl<'a> CexData<'a> {
    pub fn new(em: &'a ExprManager) -> Self {
        Self {
            em,
            objects: BTreeMap::new(),
        }
    }

    /// Build a context with tables for every array read by `exprs`.
    pub fn from_exprs(em: &'a ExprManager, exprs: &[ExprRef]) -> Self {
        let mut cd = Self::new(em);
        cd.discover(exprs);
        cd
    }

    pub fn object(&self, array: ArrayId) -> Option<&CexObjectData> {
        self.objects.get(&array)
    }

    pub fn objects(&self) -> impl Iterator<Item = (ArrayId, &CexObjectData)> + '_ {
        self.objects.iter().map(|(&id, obj)| (id, obj))
    }

    /// Make sure `array` has a table covering at least `len` bytes.
    ///
    /// Tables never extend past the declared size of the array, and constant
    /// arrays get no table at all.
    pub fn reserve(&mut self, array: ArrayId, len: u64) {
        let arr = self.em.array(array);
        if arr.is_constant() {
            return;
        }
        let len = len.min(arr.size()) as usize;
        self.objects
            .entry(array)
            .or_insert_with(|| CexObjectData::new(0))
            .grow(len);
    }

    /// Record the largest byte index read from each array in `exprs`.
    ///
    /// A symbolic index may hit any byte, so it reserves the whole array.
    pub fn discover(&mut self, exprs: &[ExprRef]) {
        let mut visited = HashSet::new();
        let mut extents: BTreeMap<ArrayId, u64> = BTreeMap::new();
        for &e in exprs {
            self.discover_expr(e, &mut visited, &mut extents);
        }
        for (array, len) in extents {
            self.reserve(array, len);
        }
    }

    fn discover_expr(
        &self,
        e: ExprRef,
        visited: &mut HashSet<ExprRef>,
        extents: &mut BTreeMap<ArrayId, u64>,
    ) {
        if !visited.insert(e) {
            return;
        }
        let em = self.em;
        match em.kind(e) {
            ExprKind::Constant(_) => {}
            ExprKind::Read { updates, index } => {
                let len = match em.constant_value(index) {
                    Some(i) => i.saturating_add(1),
                    None => em.array(updates.array).size(),
                };
                let extent = extents.entry(updates.array).or_insert(0);
                *extent = (*extent).max(len);

                self.discover_expr(index, visited, extents);
                let mut cur = updates.head;
                while let Some(u) = cur {
                    if !visited.insert(u) {
                        break;
                    }
                    let update = em.update(u);
                    self.discover_expr(update.index, visited, extents);
                    self.discover_expr(update.value, visited, extents);
                    cur = update.next;
                }
            }
            ExprKind::Select {
                cond,
                on_true,
                on_false,
            } => {
                self.discover_expr(cond, visited, extents);
                self.discover_expr(on_true, visited, extents);
                self.discover_expr(on_false, visited, extents);
            }
            ExprKind::Concat { msb, lsb } => {
                self.discover_expr(msb, visited, extents);
                self.discover_expr(lsb, visited, extents);
            }
            ExprKind::Binary { left, right, .. } => {
                self.discover_expr(left, visited, extents);
                self.discover_expr(right, visited, extents);
            }
            ExprKind::NotOptimized(x)
            | ExprKind::Extract { expr: x, .. }
            | ExprKind::ZExt(x)
            | ExprKind::SExt(x)
            | ExprKind::Not(x) => self.discover_expr(x, visited, extents),
        }
    }

    /// Forward range of `e` under the current tables.
    pub fn eval_range(&self, e: ExprRef) -> ValueRange {
        let mut evaluator = RangeEvaluator::new(self.em, self);
        let range = evaluator.evaluate(e);
        trace!("eval_range({}) = {}, {}", e, range, evaluator.cache_stats());
        range
    }

    pub fn force_expr_to_value(&mut self, e: ExprRef, value: u64) {
        self.force_expr_to_range(e, ValueRange::fixed(value));
    }

    /// Narrow the tables so that `e` is likely to lie within `range`.
    pub fn force_expr_to_range(&mut self, e: ExprRef, range: ValueRange) {
        let em = self.em;
        debug!("force(e = {}, range = {})", em.display(e), range);

        if range.is_empty() {
            debug!("force: empty range, skipping");
            return;
        }

        let width = em.width(e);
        match em.kind(e) {
            ExprKind::Constant(_) | ExprKind::NotOptimized(_) | ExprKind::Extract { .. } => {}

            ExprKind::Read {
                updates,
                index: index_expr,
            } => {
                let index = self.eval_range(index_expr);

                for update in em.updates(updates) {
                    // Same node means same index, whatever the ranges say.
                    if update.index == index_expr {
                        self.force_expr_to_range(update.value, range);
                        return;
                    }
                    let ui = self.eval_range(update.index);
                    if !ui.may_equal_range(&index) {
                        continue;
                    }
                    if ui.must_equal_range(&index) {
                        self.force_expr_to_range(update.value, range);
                    } else {
                        debug!("force: write at {} may alias, stopping", ui);
                    }
                    return;
                }

                if !index.is_fixed() {
                    return;
                }
                let i = index.min();
                let array = em.array(updates.array);
                if i >= array.size() || array.is_constant() {
                    return;
                }
                let Some(obj) = self.objects.get_mut(&updates.array) else {
                    return;
                };
                let Some(current) = obj.get(i) else {
                    return;
                };
                let narrowed = current.set_intersection(&range);
                let new = if narrowed.is_empty() && range.is_fixed() {
                    range
                } else {
                    narrowed
                };
                trace!("force: {}[{}] {} -> {}", array.name(), i, current, new);
                obj.set(i, new);
            }

            ExprKind::Select {
                cond,
                on_true,
                on_false,
            } => {
                let cond = self.eval_range(cond);
                if cond.must_equal(1) {
                    self.force_expr_to_range(on_true, range);
                } else if cond.must_equal(0) {
                    self.force_expr_to_range(on_false, range);
                } else {
                    self.force_expr_to_range(on_true, range);
                    self.force_expr_to_range(on_false, range);
                }
            }

            ExprKind::Concat { msb, lsb } => {
                let lsb_width = em.width(lsb);
                let msb_width = em.width(msb);
                self.force_expr_to_range(msb, range.extract(lsb_width, lsb_width + msb_width));
                self.force_expr_to_range(lsb, range.extract(0, lsb_width));
            }

            ExprKind::ZExt(src) => {
                let in_bits = em.width(src);
                self.force_expr_to_range(src, range.set_intersection(&ValueRange::full(in_bits)));
            }

            ExprKind::SExt(src) => {
                let in_bits = em.width(src);
                // Values in this band have neither all-zero nor all-one high bits.
                let band = ValueRange::new(
                    1 << (in_bits - 1),
                    max_value_of_n_bits(width) - max_value_of_n_bits(in_bits - 1) - 1,
                );
                let output = range.set_difference(&band);
                let input = output.binary_and(&ValueRange::fixed(max_value_of_n_bits(in_bits)));
                self.force_expr_to_range(src, input);
            }

            ExprKind::Not(src) => {
                if width == BOOL && range.is_fixed() {
                    self.force_expr_to_value(src, 1 - range.min());
                }
            }

            ExprKind::Binary { op, left, right } => self.force_binary(op, left, right, width, range),
        }
    }

    fn force_binary(
        &mut self,
        op: BinOp,
        left: ExprRef,
        right: ExprRef,
        width: Width,
        range: ValueRange,
    ) {
        let bits = self.em.width(left);

        match op {
            BinOp::Add => {
                let (l, r) = (self.eval_range(left), self.eval_range(right));
                let (c, other) = if l.is_fixed() {
                    (l.min(), right)
                } else if r.is_fixed() {
                    (r.min(), left)
                } else {
                    return;
                };
                // C + X in [lo, hi]  =>  X in [lo - C, hi - C], unless that wraps.
                let lo = truncate(range.min().wrapping_sub(c), bits);
                let hi = truncate(range.max().wrapping_sub(c), bits);
                if lo <= hi {
                    self.force_expr_to_range(other, ValueRange::new(lo, hi));
                } else {
                    debug!("force: Add range wraps, skipping");
                }
            }

            BinOp::And if width == BOOL && range.is_fixed() => {
                let (l, r) = (self.eval_range(left), self.eval_range(right));
                if range.min() == 1 {
                    if !l.must_equal(1) {
                        self.force_expr_to_value(left, 1);
                    }
                    if !r.must_equal(1) {
                        self.force_expr_to_value(right, 1);
                    }
                } else if !l.must_equal(0) && !r.must_equal(0) {
                    self.force_expr_to_value(left, 0);
                    if !self.eval_range(left).must_equal(0) {
                        self.force_expr_to_value(right, 0);
                    }
                }
            }

            BinOp::Or if width == BOOL && range.is_fixed() => {
                let (l, r) = (self.eval_range(left), self.eval_range(right));
                if range.min() == 0 {
                    if !l.must_equal(0) {
                        self.force_expr_to_value(left, 0);
                    }
                    if !r.must_equal(0) {
                        self.force_expr_to_value(right, 0);
                    }
                } else if !l.must_equal(1) && !r.must_equal(1) {
                    self.force_expr_to_value(left, 1);
                    if !self.eval_range(left).must_equal(1) {
                        self.force_expr_to_value(right, 1);
                    }
                }
            }

            BinOp::Eq if range.is_fixed() => {
                let (l, r) = (self.eval_range(left), self.eval_range(right));
                let (c, other) = if l.is_fixed() {
                    (l.min(), right)
                } else if r.is_fixed() {
                    (r.min(), left)
                } else {
                    return;
                };
                if range.min() == 1 {
                    self.force_expr_to_value(other, c);
                } else {
                    let rest = ValueRange::full(bits).set_difference(&ValueRange::fixed(c));
                    self.force_expr_to_range(other, rest);
                }
            }

            BinOp::Ult if range.is_fixed() => {
                let max = max_value_of_n_bits(bits);
                let (l, r) = (self.eval_range(left), self.eval_range(right));
                let holds = range.min() == 1;
                if l.is_fixed() {
                    // L < R  or  R <= L
                    let want = if holds {
                        interval(l.min().checked_add(1), Some(max))
                    } else {
                        ValueRange::new(0, l.min())
                    };
                    self.force_expr_to_range(right, want);
                } else if r.is_fixed() {
                    // L < R  or  R <= L
                    let want = if holds {
                        interval(Some(0), r.min().checked_sub(1))
                    } else {
                        ValueRange::new(r.min(), max)
                    };
                    self.force_expr_to_range(left, want);
                }
            }

            BinOp::Ule if range.is_fixed() => {
                let max = max_value_of_n_bits(bits);
                let (l, r) = (self.eval_range(left), self.eval_range(right));
                let holds = range.min() == 1;
                if l.is_fixed() {
                    // L <= R  or  R < L
                    let want = if holds {
                        ValueRange::new(l.min(), max)
                    } else {
                        interval(Some(0), l.min().checked_sub(1))
                    };
                    self.force_expr_to_range(right, want);
                } else if r.is_fixed() {
                    // L <= R  or  R < L
                    let want = if holds {
                        ValueRange::new(0, r.min())
                    } else {
                        interval(r.min().checked_add(1), Some(max))
                    };
                    self.force_expr_to_range(left, want);
                }
            }

            BinOp::Ne | BinOp::Ugt | BinOp::Uge | BinOp::Sgt | BinOp::Sge => {
                panic!("invalid expression (uncanonicalized {})", op.name())
            }

            // Not propagated backward.
            _ => {}
        }
    }

    /// True if no table entry has become empty.
    pub fn is_consistent(&self) -> bool {
        self.objects
            .values()
            .all(|obj| obj.values.iter().all(|range| !range.is_empty()))
    }

    /// Pick the midpoint of every entry as the witness byte.
    ///
    /// # Panics
    ///
    /// Panics if the tables are not [consistent](Self::is_consistent).
    pub fn fix_values(&mut self) {
        for obj in self.objects.values_mut() {
            obj.fix();
        }
    }

    /// Concrete value of `e` under the fixed tables, or `None` if it depends
    /// on a byte without a fixed value (e.g. an out-of-bounds read).
    pub fn constify(&self, e: ExprRef) -> Option<u64> {
        let mut evaluator = ExprEvaluator::new(self.em, self);
        let value = evaluator.evaluate(e);
        trace!("constify({}) = {:?}, {}", e, value, evaluator.cache_stats());
        value
    }

    pub fn must_be_value(&self, e: ExprRef, value: u64) -> bool {
        let result = self.constify(e);
        if result != Some(value) {
            debug!(
                "must_be_value: {} is {:?}, expected {}",
                self.em.display(e),
                result,
                value
            );
        }
        result == Some(value)
    }

    /// Log the current tables.
    pub fn dump(&self) {
        for (&array, obj) in self.objects.iter() {
            let ranges: Vec<String> = obj.values.iter().map(|r| r.to_string()).collect();
            trace!("{}: [{}]", self.em.array(array).name(), ranges.join(", "));
        }
    }
}

/// `[lo, hi]`, or empty if either bound does not exist.
fn interval(lo: Option<u64>, hi: Option<u64>) -> ValueRange {
    match (lo, hi) {
        (Some(lo), Some(hi)) => ValueRange::new(lo, hi),
        _ => ValueRange::empty(),
    }
}

impl ReadRange<ValueRange> for CexData<'_> {
    fn initial_read_range(&self, array: ArrayId, index: ValueRange) -> ValueRange {
        if index.is_fixed() {
            let i = index.min();
            let arr = self.em.array(array);
            if i < arr.size() {
                if let Some(value) = arr.constant_value(i) {
                    return ValueRange::fixed(value as u64);
                }
                if let Some(range) = self.objects.get(&array).and_then(|obj| obj.get(i)) {
                    if !range.is_empty() {
                        return range;
                    }
                }
            }
        }
        ValueRange::full(ARRAY_RANGE)
    }
}

impl InitialValue for CexData<'_> {
    fn initial_value(&self, array: ArrayId, index: u64) -> Option<u8> {
        let range = self.objects.get(&array)?.get(index)?;
        if range.is_fixed() {
            Some(range.min() as u8)
        } else {
            None
        }
    }
}

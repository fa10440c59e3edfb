//! Expression manager: hash-consed bit-vector expressions over symbolic arrays.
//!
//! All expressions live in an [`ExprManager`] and are referred to by
//! lightweight [`ExprRef`] handles. Structurally equal expressions are stored
//! once, so an expression is a DAG and a handle comparison is a structural
//! comparison.
//!
//! The builders keep expressions in canonical form:
//!
//! - `Ne`, `Ugt`, `Uge`, `Sgt` and `Sge` are rewritten into `Eq`, `Ult`,
//!   `Ule`, `Slt` and `Sle`.
//! - Constant operands are folded, and moved to the left of commutative
//!   operators and `Eq`.
//!
//! Widths are limited to 64 bits.

use std::cell::RefCell;
use std::fmt::Debug;
use std::rc::Rc;

use log::debug;

use crate::eval::eval_binary;
use crate::node::{BinOp, Kind, Node};
use crate::reference::ExprRef;
use crate::table::Table;
use crate::types::{ArrayId, Width, BOOL, INT32, INT64, INT8};
use crate::utils::{lshr, sext, truncate};

/// Width of array indices.
pub const ARRAY_DOMAIN: Width = INT32;
/// Width of array elements.
pub const ARRAY_RANGE: Width = INT8;

/// A symbolic (or constant) byte array.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Array {
    name: String,
    size: u64,
    constant_values: Option<Vec<u8>>,
}

impl Array {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared size in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn is_constant(&self) -> bool {
        self.constant_values.is_some()
    }

    pub fn constant_values(&self) -> Option<&[u8]> {
        self.constant_values.as_deref()
    }

    /// Initial content of a constant array, `None` for symbolic arrays or
    /// out-of-bounds indices.
    pub fn constant_value(&self, index: u64) -> Option<u8> {
        let values = self.constant_values.as_ref()?;
        values.get(usize::try_from(index).ok()?).copied()
    }
}

/// Write log over an array, newest write first.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct UpdateList {
    pub array: ArrayId,
    pub head: Option<ExprRef>,
}

/// One write of an [`UpdateList`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Update {
    pub index: ExprRef,
    pub value: ExprRef,
    pub next: Option<ExprRef>,
}

/// Decoded view of a node, for matching.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ExprKind {
    Constant(u64),
    NotOptimized(ExprRef),
    Read {
        updates: UpdateList,
        index: ExprRef,
    },
    Select {
        cond: ExprRef,
        on_true: ExprRef,
        on_false: ExprRef,
    },
    /// `msb ++ lsb`.
    Concat {
        msb: ExprRef,
        lsb: ExprRef,
    },
    Extract {
        expr: ExprRef,
        offset: Width,
    },
    ZExt(ExprRef),
    SExt(ExprRef),
    Not(ExprRef),
    Binary {
        op: BinOp,
        left: ExprRef,
        right: ExprRef,
    },
}

/// Sizing of an [`ExprManager`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ManagerConfig {
    /// The node table holds at most `2^storage_bits - 1` nodes.
    pub storage_bits: usize,
    /// Initial capacity (as a power of two) of the evaluation caches.
    pub cache_bits: usize,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            storage_bits: 16,
            cache_bits: 8,
        }
    }
}

impl ManagerConfig {
    pub fn with_storage_bits(mut self, storage_bits: usize) -> Self {
        self.storage_bits = storage_bits;
        self
    }

    pub fn with_cache_bits(mut self, cache_bits: usize) -> Self {
        self.cache_bits = cache_bits;
        self
    }
}

pub struct ExprManager {
    storage: RefCell<Table<Node>>,
    arrays: RefCell<Vec<Rc<Array>>>,
    config: ManagerConfig,
}

impl ExprManager {
    pub fn new(storage_bits: usize) -> Self {
        Self::with_config(ManagerConfig::default().with_storage_bits(storage_bits))
    }

    pub fn with_config(config: ManagerConfig) -> Self {
        Self {
            storage: RefCell::new(Table::new(config.storage_bits)),
            arrays: RefCell::new(Vec::new()),
            config,
        }
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Number of distinct nodes built so far.
    pub fn size(&self) -> usize {
        self.storage.borrow().size()
    }
}

impl Default for ExprManager {
    fn default() -> Self {
        ExprManager::with_config(ManagerConfig::default())
    }
}

impl Debug for ExprManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let storage = self.storage.borrow();
        f.debug_struct("ExprManager")
            .field("capacity", &storage.capacity())
            .field("size", &storage.size())
            .field("shared", &storage.hits())
            .field("arrays", &self.arrays.borrow().len())
            .finish()
    }
}

// Arrays
impl ExprManager {
    /// Register a new symbolic array of `size` bytes.
    pub fn mk_array(&self, name: impl Into<String>, size: u64) -> ArrayId {
        self.add_array(Array {
            name: name.into(),
            size,
            constant_values: None,
        })
    }

    /// Register a new array with known contents.
    pub fn mk_constant_array(&self, name: impl Into<String>, values: &[u8]) -> ArrayId {
        self.add_array(Array {
            name: name.into(),
            size: values.len() as u64,
            constant_values: Some(values.to_vec()),
        })
    }

    fn add_array(&self, array: Array) -> ArrayId {
        let mut arrays = self.arrays.borrow_mut();
        let id = ArrayId::new(arrays.len() as u32);
        debug!("mk_array(name = {}, size = {}) -> {}", array.name, array.size, id);
        arrays.push(Rc::new(array));
        id
    }

    pub fn array(&self, id: ArrayId) -> Rc<Array> {
        Rc::clone(&self.arrays.borrow()[id.index()])
    }
}

// Node access
impl ExprManager {
    pub(crate) fn node(&self, e: ExprRef) -> Node {
        *self.storage.borrow().get(e.index())
    }

    pub fn width(&self, e: ExprRef) -> Width {
        self.node(e).width
    }

    pub fn kind(&self, e: ExprRef) -> ExprKind {
        let node = self.node(e);
        let [a, b, c] = node.kids;
        match node.kind {
            Kind::Constant => ExprKind::Constant(node.payload),
            Kind::NotOptimized => ExprKind::NotOptimized(a),
            Kind::Read => ExprKind::Read {
                updates: UpdateList {
                    array: ArrayId::new(node.payload as u32),
                    head: b.to_option(),
                },
                index: a,
            },
            Kind::Select => ExprKind::Select {
                cond: a,
                on_true: b,
                on_false: c,
            },
            Kind::Concat => ExprKind::Concat { msb: a, lsb: b },
            Kind::Extract => ExprKind::Extract {
                expr: a,
                offset: node.payload as Width,
            },
            Kind::ZExt => ExprKind::ZExt(a),
            Kind::SExt => ExprKind::SExt(a),
            Kind::Not => ExprKind::Not(a),
            Kind::Binary(op) => ExprKind::Binary {
                op,
                left: a,
                right: b,
            },
            Kind::Update | Kind::Invalid => {
                panic!("{} is not an expression (kind = {:?})", e, node.kind)
            }
        }
    }

    /// Return the value of a constant expression.
    pub fn constant_value(&self, e: ExprRef) -> Option<u64> {
        match self.kind(e) {
            ExprKind::Constant(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_constant(&self, e: ExprRef) -> bool {
        self.node(e).kind == Kind::Constant
    }

    pub fn is_true(&self, e: ExprRef) -> bool {
        self.width(e) == BOOL && self.constant_value(e) == Some(1)
    }

    pub fn is_false(&self, e: ExprRef) -> bool {
        self.width(e) == BOOL && self.constant_value(e) == Some(0)
    }

    /// Decode one write of an update list.
    pub fn update(&self, u: ExprRef) -> Update {
        let node = self.node(u);
        assert_eq!(node.kind, Kind::Update, "{} is not an update", u);
        let [index, value, next] = node.kids;
        Update {
            index,
            value,
            next: next.to_option(),
        }
    }

    /// Iterate over the writes of `updates`, newest first.
    pub fn updates(&self, updates: UpdateList) -> impl Iterator<Item = Update> + '_ {
        std::iter::successors(updates.head.map(|u| self.update(u)), move |u| {
            u.next.map(|next| self.update(next))
        })
    }

    fn put(&self, node: Node) -> ExprRef {
        let index = self.storage.borrow_mut().intern(node);
        ExprRef::new(index as u32)
    }
}

// Leaves
impl ExprManager {
    pub fn mk_constant(&self, value: u64, width: Width) -> ExprRef {
        assert!(
            (1..=INT64).contains(&width),
            "Width should be in the range 1..=64, got {}",
            width
        );
        self.put(Node::new(
            Kind::Constant,
            width,
            [ExprRef::NONE; 3],
            truncate(value, width),
        ))
    }

    pub fn mk_bool(&self, value: bool) -> ExprRef {
        self.mk_constant(value as u64, BOOL)
    }

    pub fn mk_true(&self) -> ExprRef {
        self.mk_bool(true)
    }

    pub fn mk_false(&self) -> ExprRef {
        self.mk_bool(false)
    }

    /// Wrap `e` so that no simplification looks through it.
    pub fn mk_not_optimized(&self, e: ExprRef) -> ExprRef {
        let width = self.width(e);
        self.put(Node::new(
            Kind::NotOptimized,
            width,
            [e, ExprRef::NONE, ExprRef::NONE],
            0,
        ))
    }
}

// Reads and writes
impl ExprManager {
    pub fn empty_updates(&self, array: ArrayId) -> UpdateList {
        UpdateList { array, head: None }
    }

    /// Return `updates` with one more write of `value` at `index` on top.
    pub fn extend(&self, updates: UpdateList, index: ExprRef, value: ExprRef) -> UpdateList {
        assert_eq!(self.width(index), ARRAY_DOMAIN, "Index width mismatch");
        assert_eq!(self.width(value), ARRAY_RANGE, "Value width mismatch");
        let head = self.put(Node::new(
            Kind::Update,
            0,
            [index, value, updates.head.into()],
            updates.array.into(),
        ));
        UpdateList {
            array: updates.array,
            head: Some(head),
        }
    }

    /// Read one byte.
    ///
    /// With a constant index the write log is searched for a definite hit;
    /// writes at other constant indices are skipped.
    pub fn mk_read(&self, updates: UpdateList, index: ExprRef) -> ExprRef {
        assert_eq!(self.width(index), ARRAY_DOMAIN, "Index width mismatch");

        if let Some(i) = self.constant_value(index) {
            let mut remaining = updates.head;
            for update in self.updates(updates) {
                match self.constant_value(update.index) {
                    Some(j) if j == i => {
                        debug!("mk_read: hit write at {}", i);
                        return update.value;
                    }
                    Some(_) => remaining = update.next,
                    None => break,
                }
            }
            if remaining.is_none() {
                if let Some(value) = self.array(updates.array).constant_value(i) {
                    return self.mk_constant(value as u64, ARRAY_RANGE);
                }
            }
        }

        self.put(Node::new(
            Kind::Read,
            ARRAY_RANGE,
            [index, updates.head.into(), ExprRef::NONE],
            updates.array.into(),
        ))
    }

    /// Read the byte at a constant offset of the initial array contents.
    pub fn mk_read_byte(&self, array: ArrayId, index: u64) -> ExprRef {
        let index = self.mk_constant(index, ARRAY_DOMAIN);
        self.mk_read(self.empty_updates(array), index)
    }

    /// Little-endian read of `bytes` bytes starting at `offset`.
    pub fn mk_read_le(&self, array: ArrayId, offset: u64, bytes: u64) -> ExprRef {
        assert!(
            (1..=8).contains(&bytes),
            "Reads are limited to 1..=8 bytes, got {}",
            bytes
        );
        let kids: Vec<ExprRef> = (0..bytes)
            .rev()
            .map(|i| self.mk_read_byte(array, offset + i))
            .collect();
        self.mk_concat_all(&kids)
    }
}

// Structure
impl ExprManager {
    pub fn mk_select(&self, cond: ExprRef, on_true: ExprRef, on_false: ExprRef) -> ExprRef {
        assert_eq!(self.width(cond), BOOL, "Select condition must be boolean");
        let width = self.width(on_true);
        assert_eq!(width, self.width(on_false), "Select arms width mismatch");

        if let Some(c) = self.constant_value(cond) {
            return if c != 0 { on_true } else { on_false };
        }
        if on_true == on_false {
            return on_true;
        }
        self.put(Node::new(Kind::Select, width, [cond, on_true, on_false], 0))
    }

    pub fn mk_concat(&self, msb: ExprRef, lsb: ExprRef) -> ExprRef {
        let lsb_width = self.width(lsb);
        let width = self.width(msb) + lsb_width;
        assert!(width <= INT64, "Concat wider than 64 bits ({})", width);

        if let (Some(m), Some(l)) = (self.constant_value(msb), self.constant_value(lsb)) {
            return self.mk_constant((m << lsb_width) | l, width);
        }
        self.put(Node::new(
            Kind::Concat,
            width,
            [msb, lsb, ExprRef::NONE],
            0,
        ))
    }

    /// Concatenate `kids`, most significant first.
    pub fn mk_concat_all(&self, kids: &[ExprRef]) -> ExprRef {
        let Some((&last, rest)) = kids.split_last() else {
            panic!("Concat of nothing");
        };
        rest.iter()
            .rev()
            .fold(last, |acc, &msb| self.mk_concat(msb, acc))
    }

    pub fn mk_extract(&self, e: ExprRef, offset: Width, width: Width) -> ExprRef {
        let src_width = self.width(e);
        assert!(
            width >= 1 && offset + width <= src_width,
            "Extract [{}, {}) out of {} bits",
            offset,
            offset + width,
            src_width
        );

        if offset == 0 && width == src_width {
            return e;
        }
        if let Some(value) = self.constant_value(e) {
            return self.mk_constant(lshr(value, offset as u64), width);
        }
        self.put(Node::new(
            Kind::Extract,
            width,
            [e, ExprRef::NONE, ExprRef::NONE],
            offset as u64,
        ))
    }

    /// Zero-extend (or truncate) `e` to `width` bits.
    pub fn mk_zext(&self, e: ExprRef, width: Width) -> ExprRef {
        let src_width = self.width(e);
        if width == src_width {
            return e;
        }
        if width < src_width {
            return self.mk_extract(e, 0, width);
        }
        if let Some(value) = self.constant_value(e) {
            return self.mk_constant(value, width);
        }
        self.put(Node::new(
            Kind::ZExt,
            width,
            [e, ExprRef::NONE, ExprRef::NONE],
            0,
        ))
    }

    /// Sign-extend (or truncate) `e` to `width` bits.
    pub fn mk_sext(&self, e: ExprRef, width: Width) -> ExprRef {
        let src_width = self.width(e);
        if width == src_width {
            return e;
        }
        if width < src_width {
            return self.mk_extract(e, 0, width);
        }
        if let Some(value) = self.constant_value(e) {
            return self.mk_constant(sext(value, src_width) as u64, width);
        }
        self.put(Node::new(
            Kind::SExt,
            width,
            [e, ExprRef::NONE, ExprRef::NONE],
            0,
        ))
    }

    /// Bitwise complement.
    pub fn mk_not(&self, e: ExprRef) -> ExprRef {
        let width = self.width(e);
        if let Some(value) = self.constant_value(e) {
            return self.mk_constant(!value, width);
        }
        if let ExprKind::Not(inner) = self.kind(e) {
            return inner;
        }
        self.put(Node::new(
            Kind::Not,
            width,
            [e, ExprRef::NONE, ExprRef::NONE],
            0,
        ))
    }
}

// Binary operators
impl ExprManager {
    /// Build a binary node as-is: no folding, no canonicalization.
    pub fn mk_binary(&self, op: BinOp, left: ExprRef, right: ExprRef) -> ExprRef {
        let operand_width = self.width(left);
        assert_eq!(
            operand_width,
            self.width(right),
            "{} operands width mismatch",
            op.name()
        );
        let width = if op.is_comparison() {
            BOOL
        } else {
            operand_width
        };
        self.put(Node::new(
            Kind::Binary(op),
            width,
            [left, right, ExprRef::NONE],
            0,
        ))
    }

    /// Build `op(left, right)` in canonical form.
    pub fn apply(&self, op: BinOp, left: ExprRef, right: ExprRef) -> ExprRef {
        let width = self.width(left);
        assert_eq!(
            width,
            self.width(right),
            "{} operands width mismatch",
            op.name()
        );

        match op {
            BinOp::Ne => {
                let eq = self.apply(BinOp::Eq, left, right);
                return self.apply(BinOp::Eq, self.mk_false(), eq);
            }
            BinOp::Ugt => return self.apply(BinOp::Ult, right, left),
            BinOp::Uge => return self.apply(BinOp::Ule, right, left),
            BinOp::Sgt => return self.apply(BinOp::Slt, right, left),
            BinOp::Sge => return self.apply(BinOp::Sle, right, left),
            _ => {}
        }

        match (self.constant_value(left), self.constant_value(right)) {
            (Some(l), Some(r)) => {
                if let Some(value) = eval_binary(op, l, r, width) {
                    let result_width = if op.is_comparison() { BOOL } else { width };
                    return self.mk_constant(value, result_width);
                }
            }
            (None, Some(_)) if op.is_commutative() => {
                return self.apply(op, right, left);
            }
            _ => {}
        }

        if op == BinOp::Eq {
            if left == right {
                return self.mk_true();
            }
            if width == BOOL && self.is_true(left) {
                return right;
            }
        }

        self.mk_binary(op, left, right)
    }

    pub fn mk_add(&self, l: ExprRef, r: ExprRef) -> ExprRef {
        self.apply(BinOp::Add, l, r)
    }
    pub fn mk_sub(&self, l: ExprRef, r: ExprRef) -> ExprRef {
        self.apply(BinOp::Sub, l, r)
    }
    pub fn mk_mul(&self, l: ExprRef, r: ExprRef) -> ExprRef {
        self.apply(BinOp::Mul, l, r)
    }
    pub fn mk_udiv(&self, l: ExprRef, r: ExprRef) -> ExprRef {
        self.apply(BinOp::UDiv, l, r)
    }
    pub fn mk_sdiv(&self, l: ExprRef, r: ExprRef) -> ExprRef {
        self.apply(BinOp::SDiv, l, r)
    }
    pub fn mk_urem(&self, l: ExprRef, r: ExprRef) -> ExprRef {
        self.apply(BinOp::URem, l, r)
    }
    pub fn mk_srem(&self, l: ExprRef, r: ExprRef) -> ExprRef {
        self.apply(BinOp::SRem, l, r)
    }
    pub fn mk_and(&self, l: ExprRef, r: ExprRef) -> ExprRef {
        self.apply(BinOp::And, l, r)
    }
    pub fn mk_or(&self, l: ExprRef, r: ExprRef) -> ExprRef {
        self.apply(BinOp::Or, l, r)
    }
    pub fn mk_xor(&self, l: ExprRef, r: ExprRef) -> ExprRef {
        self.apply(BinOp::Xor, l, r)
    }
    pub fn mk_shl(&self, l: ExprRef, r: ExprRef) -> ExprRef {
        self.apply(BinOp::Shl, l, r)
    }
    pub fn mk_lshr(&self, l: ExprRef, r: ExprRef) -> ExprRef {
        self.apply(BinOp::LShr, l, r)
    }
    pub fn mk_ashr(&self, l: ExprRef, r: ExprRef) -> ExprRef {
        self.apply(BinOp::AShr, l, r)
    }
    pub fn mk_eq(&self, l: ExprRef, r: ExprRef) -> ExprRef {
        self.apply(BinOp::Eq, l, r)
    }
    pub fn mk_ne(&self, l: ExprRef, r: ExprRef) -> ExprRef {
        self.apply(BinOp::Ne, l, r)
    }
    pub fn mk_ult(&self, l: ExprRef, r: ExprRef) -> ExprRef {
        self.apply(BinOp::Ult, l, r)
    }
    pub fn mk_ule(&self, l: ExprRef, r: ExprRef) -> ExprRef {
        self.apply(BinOp::Ule, l, r)
    }
    pub fn mk_ugt(&self, l: ExprRef, r: ExprRef) -> ExprRef {
        self.apply(BinOp::Ugt, l, r)
    }
    pub fn mk_uge(&self, l: ExprRef, r: ExprRef) -> ExprRef {
        self.apply(BinOp::Uge, l, r)
    }
    pub fn mk_slt(&self, l: ExprRef, r: ExprRef) -> ExprRef {
        self.apply(BinOp::Slt, l, r)
    }
    pub fn mk_sle(&self, l: ExprRef, r: ExprRef) -> ExprRef {
        self.apply(BinOp::Sle, l, r)
    }
    pub fn mk_sgt(&self, l: ExprRef, r: ExprRef) -> ExprRef {
        self.apply(BinOp::Sgt, l, r)
    }
    pub fn mk_sge(&self, l: ExprRef, r: ExprRef) -> ExprRef {
        self.apply(BinOp::Sge, l, r)
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;

    #[test]
    fn test_hash_consing() {
        let em = ExprManager::default();
        let x = em.mk_array("x", 4);
        let a = em.mk_read_byte(x, 0);
        let b = em.mk_read_byte(x, 0);
        assert_eq!(a, b);
        let c = em.mk_read_byte(x, 1);
        assert_ne!(a, c);
        assert_eq!(em.width(a), 8);
    }

    #[test]
    fn test_constant_folding() {
        let em = ExprManager::default();
        let a = em.mk_constant(200, 8);
        let b = em.mk_constant(100, 8);
        assert_eq!(em.constant_value(em.mk_add(a, b)), Some(44));
        assert!(em.is_true(em.mk_ult(b, a)));
        assert!(em.is_false(em.mk_slt(b, a)));
        assert_eq!(em.constant_value(em.mk_constant(0x1ff, 8)), Some(0xff));
    }

    #[test]
    fn test_division_by_zero_is_not_folded() {
        let em = ExprManager::default();
        let a = em.mk_constant(7, 8);
        let z = em.mk_constant(0, 8);
        let e = em.mk_udiv(a, z);
        assert!(!em.is_constant(e));
    }

    #[test]
    fn test_canonical_comparisons() {
        let em = ExprManager::default();
        let x = em.mk_array("x", 1);
        let r = em.mk_read_byte(x, 0);
        let c = em.mk_constant(250, 8);

        let gt = em.mk_ugt(r, c);
        match em.kind(gt) {
            ExprKind::Binary { op, left, right } => {
                assert_eq!(op, BinOp::Ult);
                assert_eq!(left, c);
                assert_eq!(right, r);
            }
            other => panic!("unexpected {:?}", other),
        }

        let ne = em.mk_ne(r, c);
        match em.kind(ne) {
            ExprKind::Binary { op, left, right } => {
                assert_eq!(op, BinOp::Eq);
                assert!(em.is_false(left));
                assert_eq!(right, em.mk_eq(c, r));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_constant_moves_left() {
        let em = ExprManager::default();
        let x = em.mk_array("x", 1);
        let r = em.mk_read_byte(x, 0);
        let c = em.mk_constant(3, 8);
        assert_eq!(em.mk_eq(r, c), em.mk_eq(c, r));
        assert_eq!(em.mk_add(r, c), em.mk_add(c, r));
    }

    #[test]
    fn test_read_through_writes() {
        let em = ExprManager::default();
        let x = em.mk_array("x", 4);
        let ul = em.empty_updates(x);
        let i1 = em.mk_constant(1, ARRAY_DOMAIN);
        let v = em.mk_constant(42, ARRAY_RANGE);
        let ul = em.extend(ul, i1, v);
        assert_eq!(em.mk_read(ul, i1), v);

        let i2 = em.mk_constant(2, ARRAY_DOMAIN);
        let read = em.mk_read(ul, i2);
        assert!(!em.is_constant(read));
        assert_eq!(em.updates(ul).count(), 1);
    }

    #[test]
    fn test_constant_array_read() {
        let em = ExprManager::default();
        let t = em.mk_constant_array("t", &[5, 6, 7]);
        assert_eq!(em.constant_value(em.mk_read_byte(t, 2)), Some(7));
        assert!(em.array(t).is_constant());
        assert_eq!(em.array(t).size(), 3);
    }

    #[test]
    fn test_read_le() {
        let em = ExprManager::default();
        let t = em.mk_constant_array("t", &[0x34, 0x12]);
        let e = em.mk_read_le(t, 0, 2);
        assert_eq!(em.constant_value(e), Some(0x1234));
        assert_eq!(em.width(e), 16);
    }

    #[test]
    fn test_casts() {
        let em = ExprManager::default();
        let c = em.mk_constant(0x80, 8);
        assert_eq!(em.constant_value(em.mk_sext(c, 16)), Some(0xff80));
        assert_eq!(em.constant_value(em.mk_zext(c, 16)), Some(0x80));
        assert_eq!(em.constant_value(em.mk_extract(c, 4, 4)), Some(0x8));

        let x = em.mk_array("x", 2);
        let w = em.mk_read_le(x, 0, 2);
        let t = em.mk_zext(w, 8);
        assert_eq!(em.kind(t), ExprKind::Extract { expr: w, offset: 0 });
    }

    #[test]
    fn test_select_folding() {
        let em = ExprManager::default();
        let x = em.mk_array("x", 1);
        let r = em.mk_read_byte(x, 0);
        let c = em.mk_constant(1, 8);
        assert_eq!(em.mk_select(em.mk_true(), r, c), r);
        assert_eq!(em.mk_select(em.mk_false(), r, c), c);
        let cond = em.mk_ult(r, c);
        assert_eq!(em.mk_select(cond, r, r), r);
    }

    #[test]
    #[should_panic(expected = "Concat wider than 64 bits")]
    fn test_concat_too_wide() {
        let em = ExprManager::default();
        let x = em.mk_array("x", 16);
        let a = em.mk_read_le(x, 0, 8);
        em.mk_concat(a, em.mk_read_byte(x, 8));
    }
}

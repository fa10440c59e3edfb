//! Hash-consing table for expression nodes.
//!
//! Nodes are never removed: an expression manager lives as long as the
//! expressions built in it, and the solver only ever reads them. Slot 0 is
//! reserved so that index 0 can serve as "no expression".

use std::ops::Index;

use crate::utils::MyHash;

struct Slot<T> {
    value: T,
    /// Next slot of the same bucket, 0 at the end of the chain.
    next: u32,
}

pub struct Table<T> {
    slots: Vec<Slot<T>>,
    limit: usize,
    /// First slot of each bucket, 0 for an empty bucket.
    heads: Vec<u32>,
    mask: u64,
    hits: usize,
}

impl<T: Default> Table<T> {
    /// A table holding at most `2^bits - 1` values.
    pub fn new(bits: usize) -> Self {
        assert!(bits <= 31, "Storage bits should be in the range 0..=31");
        let limit = 1usize << bits;
        let heads_bits = bits.min(16);

        let mut slots = Vec::with_capacity(limit.min(1 << 12));
        slots.push(Slot {
            value: T::default(),
            next: 0,
        });

        Self {
            slots,
            limit,
            heads: vec![0; 1 << heads_bits],
            mask: (1u64 << heads_bits) - 1,
            hits: 0,
        }
    }
}

impl<T> Table<T> {
    pub fn capacity(&self) -> usize {
        self.limit
    }

    /// Number of stored values (the reserved slot excluded).
    pub fn size(&self) -> usize {
        self.slots.len() - 1
    }

    /// Number of [`intern`](Self::intern) calls answered by an existing value.
    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn get(&self, index: usize) -> &T {
        assert_ne!(index, 0, "Index is 0");
        &self.slots[index].value
    }

    fn push(&mut self, value: T) -> u32 {
        let index = self.slots.len();
        if index >= self.limit {
            panic!("Storage is full ({} nodes)", self.size());
        }
        self.slots.push(Slot { value, next: 0 });
        index as u32
    }
}

impl<T: MyHash + Eq> Table<T> {
    /// Index of `value`, stored on first sight.
    pub fn intern(&mut self, value: T) -> usize {
        let bucket = (value.hash() & self.mask) as usize;

        let mut last = None;
        let mut cur = self.heads[bucket];
        while cur != 0 {
            let slot = &self.slots[cur as usize];
            if slot.value == value {
                self.hits += 1;
                return cur as usize;
            }
            last = Some(cur);
            cur = slot.next;
        }

        let index = self.push(value);
        match last {
            Some(tail) => self.slots[tail as usize].next = index,
            None => self.heads[bucket] = index,
        }
        index as usize
    }
}

impl<T> Index<usize> for Table<T> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        self.get(index)
    }
}

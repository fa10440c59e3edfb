//! Type-safe wrappers for array identities and expression widths.
//!
//! Arrays are the symbolic memory objects that reads refer to. An [`ArrayId`]
//! is the object identity used to key the per-object byte tables, so two
//! arrays with the same name are still distinct objects.
use std::fmt;

/// Bit width of an expression.
pub type Width = u32;

/// Width of boolean expressions.
pub const BOOL: Width = 1;
pub const INT8: Width = 8;
pub const INT16: Width = 16;
pub const INT32: Width = 32;
pub const INT64: Width = 64;

/// An array identifier (0-indexed, assigned by the manager in creation order).
///
/// # Invariants
///
/// - Only the [`ExprManager`][crate::expr::ExprManager] that created an id
///   can resolve it.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ArrayId(u32);

impl ArrayId {
    pub(crate) fn new(id: u32) -> Self {
        ArrayId(id)
    }

    /// Returns the raw array index as a `usize`.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ArrayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a{}", self.0)
    }
}

impl From<ArrayId> for u64 {
    fn from(id: ArrayId) -> Self {
        id.0 as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array_id() {
        let a = ArrayId::new(0);
        let b = ArrayId::new(3);
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 3);
        assert!(a < b);
        assert_eq!(u64::from(b), 3);
        assert_eq!(b.to_string(), "a3");
    }
}

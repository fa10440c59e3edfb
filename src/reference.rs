use std::fmt::{Display, Formatter};

/// Handle to a hash-consed expression node.
///
/// Handles are only meaningful for the [`ExprManager`][crate::expr::ExprManager]
/// that produced them. Index 0 is the table sentry and never denotes a node.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
pub struct ExprRef(u32);

impl ExprRef {
    /// The sentry handle, used for absent kids.
    pub(crate) const NONE: ExprRef = ExprRef(0);

    pub(crate) const fn new(index: u32) -> Self {
        Self(index)
    }

    /// Return the index of the node in the manager's table.
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub(crate) const fn is_none(self) -> bool {
        self.0 == 0
    }

    pub(crate) fn to_option(self) -> Option<ExprRef> {
        if self.is_none() {
            None
        } else {
            Some(self)
        }
    }
}

impl From<Option<ExprRef>> for ExprRef {
    fn from(value: Option<ExprRef>) -> Self {
        value.unwrap_or(ExprRef::NONE)
    }
}

impl Display for ExprRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "@{}", self.0)
    }
}

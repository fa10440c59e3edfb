use crate::reference::ExprRef;
use crate::types::Width;
use crate::utils::MyHash;

/// Binary operators.
///
/// `Ne`, `Ugt`, `Uge`, `Sgt` and `Sge` never survive the canonicalizing
/// builders; they only exist so that raw construction can express them.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BinOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    UDiv,
    SDiv,
    URem,
    SRem,

    // Bit
    And,
    Or,
    Xor,
    Shl,
    LShr,
    AShr,

    // Compare
    Eq,
    Ne,
    Ult,
    Ule,
    Ugt,
    Uge,
    Slt,
    Sle,
    Sgt,
    Sge,
}

impl BinOp {
    pub const ALL: [BinOp; 23] = [
        BinOp::Add,
        BinOp::Sub,
        BinOp::Mul,
        BinOp::UDiv,
        BinOp::SDiv,
        BinOp::URem,
        BinOp::SRem,
        BinOp::And,
        BinOp::Or,
        BinOp::Xor,
        BinOp::Shl,
        BinOp::LShr,
        BinOp::AShr,
        BinOp::Eq,
        BinOp::Ne,
        BinOp::Ult,
        BinOp::Ule,
        BinOp::Ugt,
        BinOp::Uge,
        BinOp::Slt,
        BinOp::Sle,
        BinOp::Sgt,
        BinOp::Sge,
    ];

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinOp::Eq
                | BinOp::Ne
                | BinOp::Ult
                | BinOp::Ule
                | BinOp::Ugt
                | BinOp::Uge
                | BinOp::Slt
                | BinOp::Sle
                | BinOp::Sgt
                | BinOp::Sge
        )
    }

    /// Comparisons that the builders rewrite away.
    pub fn is_uncanonical(self) -> bool {
        matches!(
            self,
            BinOp::Ne | BinOp::Ugt | BinOp::Uge | BinOp::Sgt | BinOp::Sge
        )
    }

    pub fn is_commutative(self) -> bool {
        matches!(
            self,
            BinOp::Add | BinOp::Mul | BinOp::And | BinOp::Or | BinOp::Xor | BinOp::Eq
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            BinOp::Add => "Add",
            BinOp::Sub => "Sub",
            BinOp::Mul => "Mul",
            BinOp::UDiv => "UDiv",
            BinOp::SDiv => "SDiv",
            BinOp::URem => "URem",
            BinOp::SRem => "SRem",
            BinOp::And => "And",
            BinOp::Or => "Or",
            BinOp::Xor => "Xor",
            BinOp::Shl => "Shl",
            BinOp::LShr => "LShr",
            BinOp::AShr => "AShr",
            BinOp::Eq => "Eq",
            BinOp::Ne => "Ne",
            BinOp::Ult => "Ult",
            BinOp::Ule => "Ule",
            BinOp::Ugt => "Ugt",
            BinOp::Uge => "Uge",
            BinOp::Slt => "Slt",
            BinOp::Sle => "Sle",
            BinOp::Sgt => "Sgt",
            BinOp::Sge => "Sge",
        }
    }

    fn tag(self) -> u64 {
        self as u64
    }
}

/// Node tag.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum Kind {
    /// Sentry.
    #[default]
    Invalid,
    Constant,
    NotOptimized,
    Read,
    Select,
    Concat,
    Extract,
    ZExt,
    SExt,
    Not,
    Binary(BinOp),
    /// One cell of a write log: `[index, value, next]`.
    Update,
}

impl Kind {
    fn tag(self) -> u64 {
        match self {
            Kind::Invalid => 0,
            Kind::Constant => 1,
            Kind::NotOptimized => 2,
            Kind::Read => 3,
            Kind::Select => 4,
            Kind::Concat => 5,
            Kind::Extract => 6,
            Kind::ZExt => 7,
            Kind::SExt => 8,
            Kind::Not => 9,
            Kind::Update => 10,
            Kind::Binary(op) => 16 + op.tag(),
        }
    }
}

/// Packed expression node.
///
/// The meaning of `payload` depends on the kind: the value for constants,
/// the array id for reads and updates, the bit offset for extracts.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub struct Node {
    pub kind: Kind,
    pub width: Width,
    pub kids: [ExprRef; 3],
    pub payload: u64,
}

impl Node {
    pub fn new(kind: Kind, width: Width, kids: [ExprRef; 3], payload: u64) -> Self {
        Self {
            kind,
            width,
            kids,
            payload,
        }
    }
}

impl MyHash for Node {
    fn hash(&self) -> u64 {
        let head = (self.kind.tag() << 8) | self.width as u64;
        let kids = MyHash::hash(&(
            self.kids[0].index() as u64,
            self.kids[1].index() as u64,
            self.kids[2].index() as u64,
        ));
        MyHash::hash(&(head, kids, self.payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_classes() {
        for op in BinOp::ALL {
            if op.is_uncanonical() {
                assert!(op.is_comparison(), "{:?}", op);
            }
        }
        assert!(BinOp::Eq.is_commutative());
        assert!(!BinOp::Ult.is_commutative());
    }

    #[test]
    fn test_hash_distinguishes_kinds() {
        let a = Node::new(Kind::Binary(BinOp::Add), 8, [ExprRef::NONE; 3], 0);
        let b = Node::new(Kind::Binary(BinOp::Sub), 8, [ExprRef::NONE; 3], 0);
        assert_ne!(MyHash::hash(&a), MyHash::hash(&b));
    }
}

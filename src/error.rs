use thiserror::Error;

/// Failure of an order-statistic query.
///
/// Every variant describes a caller-visible condition. None of them is retryable and none of
/// them leaves the collection modified.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Error)]
pub enum Error {
    /// `kth(k)` was called with `k == 0` or `k > len()`.
    #[error("index is out of range")]
    OutOfRange,
    /// No stored value is strictly smaller than the queried value.
    #[error("predecessor does not exist")]
    NoPredecessor,
    /// No stored value is strictly greater than the queried value.
    #[error("successor does not exist")]
    NoSuccessor,
}

/// A structural defect reported by `check_invariants`.
///
/// This is a diagnostic for test harnesses. A correct tree never produces one, and no
/// operation of the collections consults the checker.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Error)]
pub enum ViolatedInvariant {
    /// An in-order walk produced a value smaller than its predecessor.
    #[error("binary search tree order is violated")]
    Order,
    /// A node's cached size disagrees with its children and multiplicity.
    #[error("subtree size mismatch: expected {expected}, found {found}")]
    Size { expected: usize, found: usize },
    /// A parent back-reference does not point at the node holding the child link.
    #[error("parent link is inconsistent")]
    Parent,
    /// The arena holds nodes that are unreachable from the root.
    #[error("{allocated} nodes allocated but {reachable} reachable from the root")]
    Leak { allocated: usize, reachable: usize },
    /// A cached AVL height disagrees with the children.
    #[error("cached height is stale")]
    Height,
    /// Sibling heights differ by more than one.
    #[error("height balance is violated")]
    Balance,
    /// The red-black root is red.
    #[error("red-black root is red")]
    RedRoot,
    /// A red node has a red child.
    #[error("red node has a red child")]
    DoubleRed,
    /// Two root-to-leaf paths carry different numbers of black nodes.
    #[error("black height is not uniform")]
    BlackHeight,
    /// A child's priority is smaller than its parent's.
    #[error("heap order on priorities is violated")]
    Heap,
    /// An AA-tree level rule is broken.
    #[error("AA-tree level rule is violated")]
    Level,
    /// A scapegoat node's cached weight disagrees with its children.
    #[error("subtree weight mismatch: expected {expected}, found {found}")]
    Weight { expected: usize, found: usize },
    /// A scapegoat child outweighs the α bound of its parent.
    #[error("weight balance bound is exceeded")]
    AlphaBalance,
}

//! Level-balanced order-statistic tree (Andersson tree).
//!
//! A node's level plays the role of a red-black black height, with the restriction that only
//! right links may be horizontal. Two rotations, skew and split, are enough to restore the
//! level rules after any change.

use core::cmp::{Ordering, min};

use crate::raw::{Arena, Dir, Handle, Node, RawTree, binary_links, size_of};
use crate::{Error, OrderStatistic, ViolatedInvariant};

#[derive(Clone)]
pub(crate) struct AaNode<T> {
    value: T,
    left: Option<Handle>,
    right: Option<Handle>,
    /// Leaves sit at level 1; a missing child counts as level 0.
    level: u32,
    size: usize,
}

impl<T: Ord> Node for AaNode<T> {
    type Value = T;

    fn value(&self) -> &T {
        &self.value
    }

    fn value_mut(&mut self) -> &mut T {
        &mut self.value
    }

    binary_links!();

    fn size(&self) -> usize {
        self.size
    }

    fn pull(nodes: &mut Arena<Self>, handle: Handle) {
        let node = nodes.get(handle);
        let size = 1 + size_of(nodes, node.left) + size_of(nodes, node.right);
        nodes.get_mut(handle).size = size;
    }
}

/// An ordered multiset kept as an AA tree.
///
/// # Examples
///
/// ```
/// use order_stat_trees::AaTree;
///
/// let mut tree: AaTree<char> = "skewsplit".chars().collect();
/// assert_eq!(tree.kth(1), Ok(&'e'));
/// assert_eq!(tree.rank(&'s'), 6);
///
/// tree.delete(&'s');
/// assert_eq!(tree.iter().collect::<String>(), "eiklpstw");
/// ```
#[derive(Clone)]
pub struct AaTree<T> {
    raw: RawTree<AaNode<T>>,
}

collection_common!(AaTree, AaNode);

impl<T: Ord> AaTree<T> {
    /// Makes a new, empty `AaTree`.
    #[must_use]
    pub const fn new() -> Self {
        Self { raw: RawTree::new() }
    }

    /// Makes a new, empty `AaTree` with room for `capacity` values.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            raw: RawTree::with_capacity(capacity),
        }
    }

    fn level(&self, subtree: Option<Handle>) -> u32 {
        subtree.map_or(0, |handle| self.raw.node(handle).level)
    }

    /// Removes a left horizontal link by rotating right.
    fn skew(&mut self, handle: Handle) -> Handle {
        if self.level(self.raw.left(handle)) == self.raw.node(handle).level {
            self.raw.rotate(handle, Dir::Right)
        } else {
            handle
        }
    }

    /// Removes two consecutive right horizontal links by rotating left and raising the middle
    /// node.
    fn split(&mut self, handle: Handle) -> Handle {
        let far = self.raw.right(handle).and_then(|right| self.raw.right(right));
        if far.is_some() && self.level(far) == self.raw.node(handle).level {
            let top = self.raw.rotate(handle, Dir::Left);
            self.raw.node_mut(top).level += 1;
            top
        } else {
            handle
        }
    }

    /// Adds one occurrence of `value`. Equal values go to the right of their peers.
    pub fn insert(&mut self, value: T) {
        let root = self.insert_at(self.raw.root(), value);
        self.raw.set_root(Some(root));
    }

    fn insert_at(&mut self, subtree: Option<Handle>, value: T) -> Handle {
        let Some(handle) = subtree else {
            return self.raw.alloc(AaNode {
                value,
                left: None,
                right: None,
                level: 1,
                size: 1,
            });
        };

        let dir = Dir::right_if(value >= *self.raw.value(handle));
        let child = self.insert_at(self.raw.child(handle, dir), value);
        self.raw.set_child(handle, dir, Some(child));
        self.raw.pull(handle);
        let handle = self.skew(handle);
        self.split(handle)
    }

    /// Removes one occurrence of `value`. Does nothing if `value` is absent.
    pub fn delete(&mut self, value: &T) {
        let root = self.delete_at(self.raw.root(), value);
        self.raw.set_root(root);
    }

    fn delete_at(&mut self, subtree: Option<Handle>, value: &T) -> Option<Handle> {
        let handle = subtree?;
        match value.cmp(self.raw.value(handle)) {
            Ordering::Less => {
                let left = self.delete_at(self.raw.left(handle), value);
                self.raw.set_child(handle, Dir::Left, left);
            }
            Ordering::Greater => {
                let right = self.delete_at(self.raw.right(handle), value);
                self.raw.set_child(handle, Dir::Right, right);
            }
            Ordering::Equal => match (self.raw.left(handle), self.raw.right(handle)) {
                // Without a left child the node is at level 1, and so is its right child if any.
                (None, orphan) | (orphan, None) => {
                    self.raw.take(handle);
                    return orphan;
                }
                (Some(_), Some(right)) => {
                    let (right, successor) = self.detach_min(right);
                    self.raw.node_mut(handle).value = successor;
                    self.raw.set_child(handle, Dir::Right, right);
                }
            },
        }
        Some(self.rebalance(handle))
    }

    /// Unlinks the leftmost node of `handle`'s subtree, returning what is left and its value.
    fn detach_min(&mut self, handle: Handle) -> (Option<Handle>, T) {
        let Some(left) = self.raw.left(handle) else {
            let right = self.raw.right(handle);
            return (right, self.raw.take(handle).value);
        };
        let (left, smallest) = self.detach_min(left);
        self.raw.set_child(handle, Dir::Left, left);
        (Some(self.rebalance(handle)), smallest)
    }

    /// Restores the level rules at `handle` after a removal below it.
    fn rebalance(&mut self, handle: Handle) -> Handle {
        self.raw.pull(handle);

        let (left, right) = (self.raw.left(handle), self.raw.right(handle));
        let expected = min(self.level(left), self.level(right)) + 1;
        if expected < self.raw.node(handle).level {
            self.raw.node_mut(handle).level = expected;
            if let Some(right) = right
                && expected < self.raw.node(right).level
            {
                self.raw.node_mut(right).level = expected;
            }
        }

        let handle = self.skew(handle);
        if let Some(right) = self.raw.right(handle) {
            let right = self.skew(right);
            self.raw.set_child(handle, Dir::Right, Some(right));
            if let Some(far) = self.raw.right(right) {
                let far = self.skew(far);
                self.raw.set_child(right, Dir::Right, Some(far));
            }
        }
        let handle = self.split(handle);
        if let Some(right) = self.raw.right(handle) {
            let right = self.split(right);
            self.raw.set_child(handle, Dir::Right, Some(right));
        }
        handle
    }

    /// Returns `true` if `value` is stored at least once.
    #[must_use]
    pub fn contains(&self, value: &T) -> bool {
        self.raw.find(value).is_some()
    }

    /// Returns the `k`-th smallest value, 1-indexed.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfRange`] if `k == 0` or `k > len()`.
    pub fn kth(&self, k: usize) -> Result<&T, Error> {
        self.raw.kth(k).map(|handle| self.raw.value(handle)).ok_or(Error::OutOfRange)
    }

    /// Returns the number of stored values strictly smaller than `value`, plus one.
    #[must_use]
    pub fn rank(&self, value: &T) -> usize {
        self.raw.rank(value)
    }

    /// Returns the largest stored value strictly smaller than `value`.
    ///
    /// # Errors
    ///
    /// [`Error::NoPredecessor`] if there is none.
    pub fn predecessor(&self, value: &T) -> Result<&T, Error> {
        self.raw.predecessor(value).map(|handle| self.raw.value(handle)).ok_or(Error::NoPredecessor)
    }

    /// Returns the smallest stored value strictly greater than `value`.
    ///
    /// # Errors
    ///
    /// [`Error::NoSuccessor`] if there is none.
    pub fn successor(&self, value: &T) -> Result<&T, Error> {
        self.raw.successor(value).map(|handle| self.raw.value(handle)).ok_or(Error::NoSuccessor)
    }

    /// Verifies ordering, sizes and the level rules.
    ///
    /// # Errors
    ///
    /// The first [`ViolatedInvariant`] found.
    pub fn check_invariants(&self) -> Result<(), ViolatedInvariant> {
        self.raw.check_with(|raw, handle| {
            let level_of = |subtree: Option<Handle>| subtree.map_or(0, |child| raw.node(child).level);
            let node = raw.node(handle);
            let left = level_of(node.left);
            let right = level_of(node.right);
            let far = level_of(node.right.and_then(|child| raw.node(child).right));

            let left_ok = left + 1 == node.level;
            let right_ok = right == node.level || right + 1 == node.level;
            if left_ok && right_ok && far < node.level {
                Ok(())
            } else {
                Err(ViolatedInvariant::Level)
            }
        })
    }
}

impl<T: Ord> OrderStatistic<T> for AaTree<T> {
    fn insert(&mut self, value: T) {
        AaTree::insert(self, value);
    }

    fn delete(&mut self, value: &T) {
        AaTree::delete(self, value);
    }

    fn contains(&mut self, value: &T) -> bool {
        AaTree::contains(self, value)
    }

    fn len(&self) -> usize {
        AaTree::len(self)
    }

    fn clear(&mut self) {
        AaTree::clear(self);
    }

    fn kth(&mut self, k: usize) -> Result<&T, Error> {
        AaTree::kth(self, k)
    }

    fn rank(&mut self, value: &T) -> usize {
        AaTree::rank(self, value)
    }

    fn predecessor(&mut self, value: &T) -> Result<&T, Error> {
        AaTree::predecessor(self, value)
    }

    fn successor(&mut self, value: &T) -> Result<&T, Error> {
        AaTree::successor(self, value)
    }
}

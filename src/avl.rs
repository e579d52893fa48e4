//! Height-balanced order-statistic tree.

use core::cmp::max;

use crate::raw::{Arena, Dir, Handle, Node, RawTree, binary_links, size_of};
use crate::{Error, OrderStatistic, ViolatedInvariant};

#[derive(Clone)]
pub(crate) struct AvlNode<T> {
    value: T,
    left: Option<Handle>,
    right: Option<Handle>,
    /// Edges on the longest downward path; a leaf is 0 and an empty subtree counts as -1.
    height: i32,
    size: usize,
}

impl<T: Ord> Node for AvlNode<T> {
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
        let height = 1 + max(height_of(nodes, node.left), height_of(nodes, node.right));
        let size = 1 + size_of(nodes, node.left) + size_of(nodes, node.right);
        let node = nodes.get_mut(handle);
        node.height = height;
        node.size = size;
    }
}

fn height_of<T: Ord>(nodes: &Arena<AvlNode<T>>, subtree: Option<Handle>) -> i32 {
    subtree.map_or(-1, |handle| nodes.get(handle).height)
}

/// An ordered multiset kept as an AVL tree.
///
/// Sibling subtree heights never differ by more than one, so every operation is O(log n) in
/// the worst case.
///
/// # Examples
///
/// ```
/// use order_stat_trees::AvlTree;
///
/// let mut tree: AvlTree<i32> = (1..=7).collect();
/// assert_eq!(tree.kth(4), Ok(&4));
///
/// tree.delete(&4);
/// assert_eq!(tree.rank(&5), 4);
/// assert_eq!(tree.iter().copied().collect::<Vec<_>>(), [1, 2, 3, 5, 6, 7]);
/// ```
#[derive(Clone)]
pub struct AvlTree<T> {
    raw: RawTree<AvlNode<T>>,
}

collection_common!(AvlTree, AvlNode);

impl<T: Ord> AvlTree<T> {
    /// Makes a new, empty `AvlTree`.
    #[must_use]
    pub const fn new() -> Self {
        Self { raw: RawTree::new() }
    }

    /// Makes a new, empty `AvlTree` with room for `capacity` values.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            raw: RawTree::with_capacity(capacity),
        }
    }

    /// Adds one occurrence of `value`.
    pub fn insert(&mut self, value: T) {
        let root = self.insert_at(self.raw.root(), value);
        self.raw.set_root(Some(root));
    }

    fn insert_at(&mut self, subtree: Option<Handle>, value: T) -> Handle {
        let Some(handle) = subtree else {
            return self.raw.alloc(AvlNode {
                value,
                left: None,
                right: None,
                height: 0,
                size: 1,
            });
        };

        let dir = Dir::right_if(value >= *self.raw.value(handle));
        let child = self.insert_at(self.raw.child(handle, dir), value);
        self.raw.set_child(handle, dir, Some(child));
        self.raw.pull(handle);
        self.rebalance(handle)
    }

    /// Removes one occurrence of `value`. Does nothing if `value` is absent.
    pub fn delete(&mut self, value: &T) {
        let root = self.delete_at(self.raw.root(), value);
        self.raw.set_root(root);
    }

    fn delete_at(&mut self, subtree: Option<Handle>, value: &T) -> Option<Handle> {
        let handle = subtree?;
        let dir = match value.cmp(self.raw.value(handle)) {
            core::cmp::Ordering::Less => Dir::Left,
            core::cmp::Ordering::Greater => Dir::Right,
            core::cmp::Ordering::Equal => {
                let (left, right) = (self.raw.left(handle), self.raw.right(handle));
                match (left, right) {
                    (None, _) | (_, None) => {
                        self.raw.take(handle);
                        return left.or(right);
                    }
                    (Some(_), Some(right)) => {
                        let (right, successor) = self.detach_min(right);
                        *self.raw.node_mut(handle).value_mut() = successor;
                        self.raw.set_child(handle, Dir::Right, right);
                        self.raw.pull(handle);
                        return Some(self.rebalance(handle));
                    }
                }
            }
        };

        let child = self.delete_at(self.raw.child(handle, dir), value);
        self.raw.set_child(handle, dir, child);
        self.raw.pull(handle);
        Some(self.rebalance(handle))
    }

    /// Unlinks the leftmost node of `subtree` and returns the remaining subtree with its value.
    fn detach_min(&mut self, handle: Handle) -> (Option<Handle>, T) {
        match self.raw.left(handle) {
            None => {
                let right = self.raw.right(handle);
                (right, self.raw.take(handle).value)
            }
            Some(left) => {
                let (left, min) = self.detach_min(left);
                self.raw.set_child(handle, Dir::Left, left);
                self.raw.pull(handle);
                (Some(self.rebalance(handle)), min)
            }
        }
    }

    /// Restores the height rule at `handle`, whose children are balanced and pulled.
    fn rebalance(&mut self, handle: Handle) -> Handle {
        let nodes = self.raw.nodes();
        let node = nodes.get(handle);
        let (left, right, size) = (node.left, node.right, node.size);
        let skew = height_of(nodes, left) - height_of(nodes, right);

        let top = if skew > 1 {
            let left = left.expect("`AvlTree::rebalance()` - left-heavy node without a left child!");
            let inner_heavy = height_of(nodes, self.raw.left(left)) < height_of(nodes, self.raw.right(left));
            if inner_heavy {
                let promoted = self.raw.rotate(left, Dir::Left);
                self.raw.set_child(handle, Dir::Left, Some(promoted));
            }
            self.raw.rotate(handle, Dir::Right)
        } else if skew < -1 {
            let right = right.expect("`AvlTree::rebalance()` - right-heavy node without a right child!");
            let inner_heavy = height_of(nodes, self.raw.right(right)) < height_of(nodes, self.raw.left(right));
            if inner_heavy {
                let promoted = self.raw.rotate(right, Dir::Right);
                self.raw.set_child(handle, Dir::Right, Some(promoted));
            }
            self.raw.rotate(handle, Dir::Left)
        } else {
            return handle;
        };
        debug_assert_eq!(self.raw.node(top).size, size, "`AvlTree::rebalance()` - rotation changed the subtree size!");
        top
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

    /// Height of the tree in edges; -1 when empty.
    #[must_use]
    pub fn height(&self) -> i32 {
        height_of(self.raw.nodes(), self.raw.root())
    }

    /// Verifies ordering, size bookkeeping, cached heights and the height balance rule.
    ///
    /// # Errors
    ///
    /// The first [`ViolatedInvariant`] found.
    pub fn check_invariants(&self) -> Result<(), ViolatedInvariant> {
        self.raw.check_with(|raw, handle| {
            let nodes = raw.nodes();
            let node = nodes.get(handle);
            let (left, right) = (height_of(nodes, node.left), height_of(nodes, node.right));
            if node.height != 1 + max(left, right) {
                return Err(ViolatedInvariant::Height);
            }
            if (left - right).abs() > 1 {
                return Err(ViolatedInvariant::Balance);
            }
            Ok(())
        })
    }
}

impl<T: Ord> OrderStatistic<T> for AvlTree<T> {
    fn insert(&mut self, value: T) {
        AvlTree::insert(self, value);
    }

    fn delete(&mut self, value: &T) {
        AvlTree::delete(self, value);
    }

    fn contains(&mut self, value: &T) -> bool {
        AvlTree::contains(self, value)
    }

    fn len(&self) -> usize {
        AvlTree::len(self)
    }

    fn clear(&mut self) {
        AvlTree::clear(self);
    }

    fn kth(&mut self, k: usize) -> Result<&T, Error> {
        AvlTree::kth(self, k)
    }

    fn rank(&mut self, value: &T) -> usize {
        AvlTree::rank(self, value)
    }

    fn predecessor(&mut self, value: &T) -> Result<&T, Error> {
        AvlTree::predecessor(self, value)
    }

    fn successor(&mut self, value: &T) -> Result<&T, Error> {
        AvlTree::successor(self, value)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::collections::BTreeMap;
    use alloc::vec::Vec;
    use proptest::prelude::*;

    #[derive(Clone, Debug)]
    enum Op {
        Insert(i32),
        Delete(i32),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            3 => (0i32..200).prop_map(Op::Insert),
            2 => (0i32..200).prop_map(Op::Delete),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn invariants_hold_after_every_operation(ops in prop::collection::vec(op_strategy(), 0..400)) {
            let mut tree = AvlTree::new();
            let mut model: BTreeMap<i32, usize> = BTreeMap::new();

            for op in ops {
                match op {
                    Op::Insert(value) => {
                        tree.insert(value);
                        *model.entry(value).or_default() += 1;
                    }
                    Op::Delete(value) => {
                        tree.delete(&value);
                        if let Some(count) = model.get_mut(&value) {
                            *count -= 1;
                            if *count == 0 {
                                model.remove(&value);
                            }
                        }
                    }
                }
                prop_assert_eq!(tree.check_invariants(), Ok(()));
            }

            let expected: Vec<i32> = model.iter().flat_map(|(&value, &count)| core::iter::repeat_n(value, count)).collect();
            let actual: Vec<i32> = tree.iter().copied().collect();
            prop_assert_eq!(actual, expected);
        }
    }

    #[test]
    fn ascending_inserts_stay_logarithmic() {
        let tree: AvlTree<i32> = (1..=7).collect();
        assert_eq!(tree.check_invariants(), Ok(()));
        assert_eq!(tree.iter().copied().collect::<Vec<_>>(), [1, 2, 3, 4, 5, 6, 7]);
        assert!(tree.height() <= 3);
    }

    #[test]
    fn deleting_an_inner_node_splices_its_successor() {
        let mut tree: AvlTree<i32> = [4, 2, 6, 1, 3, 5, 7].into_iter().collect();
        tree.delete(&4);
        assert_eq!(tree.check_invariants(), Ok(()));
        assert_eq!(tree.iter().copied().collect::<Vec<_>>(), [1, 2, 3, 5, 6, 7]);
        assert_eq!(tree.raw.node_count(), 6);
    }

    #[test]
    fn duplicates_are_counted() {
        let mut tree: AvlTree<i32> = [2, 2, 2, 1].into_iter().collect();
        assert_eq!(tree.len(), 4);
        assert_eq!(tree.rank(&2), 2);
        assert_eq!(tree.successor(&1), Ok(&2));
        tree.delete(&2);
        assert_eq!(tree.len(), 3);
        assert!(tree.contains(&2));
        assert_eq!(tree.check_invariants(), Ok(()));
    }
}

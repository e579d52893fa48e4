//! Self-adjusting order-statistic tree.
//!
//! Every access, queries included, ends by splaying the last node it touched to the root. The
//! tree has no shape invariant of its own and may degenerate into a path between accesses, so
//! every walk here is iterative.

use core::cmp::Ordering::{Equal, Greater, Less};

use crate::raw::{Arena, Dir, Handle, Node, RawTree, binary_links, size_of};
use crate::{Error, OrderStatistic, ViolatedInvariant};

#[derive(Clone)]
pub(crate) struct SplayNode<T> {
    value: T,
    left: Option<Handle>,
    right: Option<Handle>,
    parent: Option<Handle>,
    /// Occurrences of `value`; equal values share one node.
    count: usize,
    size: usize,
}

impl<T: Ord> Node for SplayNode<T> {
    type Value = T;

    const TRACKS_PARENT: bool = true;

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

    fn multiplicity(&self) -> usize {
        self.count
    }

    fn parent(&self) -> Option<Handle> {
        self.parent
    }

    fn set_parent(&mut self, parent: Option<Handle>) {
        self.parent = parent;
    }

    fn pull(nodes: &mut Arena<Self>, handle: Handle) {
        let node = nodes.get(handle);
        let size = node.count + size_of(nodes, node.left) + size_of(nodes, node.right);
        nodes.get_mut(handle).size = size;
    }
}

/// An ordered multiset kept as a splay tree.
///
/// Operations run in amortized O(log n). Because `contains`, `kth`, `rank`, `predecessor` and
/// `successor` all restructure the tree, they take `&mut self`; only `len`, `is_empty` and
/// iteration leave the shape alone.
///
/// # Examples
///
/// ```
/// use order_stat_trees::SplayTree;
///
/// let mut tree: SplayTree<i32> = [1, 2, 3].into_iter().collect();
/// assert_eq!(tree.kth(1), Ok(&1));
/// assert_eq!(tree.root(), Some(&1));
///
/// tree.insert(0);
/// assert_eq!(tree.kth(1), Ok(&0));
/// ```
#[derive(Clone)]
pub struct SplayTree<T> {
    raw: RawTree<SplayNode<T>>,
}

collection_common!(SplayTree, SplayNode);

impl<T: Ord> SplayTree<T> {
    /// Makes a new, empty `SplayTree`.
    #[must_use]
    pub const fn new() -> Self {
        Self { raw: RawTree::new() }
    }

    /// Makes a new, empty `SplayTree` with room for `capacity` distinct values.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            raw: RawTree::with_capacity(capacity),
        }
    }

    /// Returns the value at the root, which is the one most recently accessed.
    #[must_use]
    pub fn root(&self) -> Option<&T> {
        self.raw.root().map(|root| self.raw.value(root))
    }

    /// Lifts `handle` one level by rotating it over its parent.
    fn rotate_up(&mut self, handle: Handle) {
        let parent = self
            .raw
            .node(handle)
            .parent
            .expect("`SplayTree::rotate_up()` - node has no parent!");
        let slot = self.raw.slot_below(self.raw.node(parent).parent, parent);
        let dir = self.raw.side_of(parent, handle);
        let promoted = self.raw.rotate(parent, dir.flip());
        debug_assert!(promoted == handle, "`SplayTree::rotate_up()` - rotation promoted the wrong child");
        self.raw.attach(slot, Some(handle));
    }

    /// Moves `handle` to the root with zig, zig-zig and zig-zag steps.
    fn splay(&mut self, handle: Handle) {
        while let Some(parent) = self.raw.node(handle).parent {
            match self.raw.node(parent).parent {
                None => self.rotate_up(handle),
                Some(grand) if self.raw.side_of(grand, parent) == self.raw.side_of(parent, handle) => {
                    self.rotate_up(parent);
                    self.rotate_up(handle);
                }
                Some(_) => {
                    self.rotate_up(handle);
                    self.rotate_up(handle);
                }
            }
        }
    }

    /// Walks toward `value` and returns the node holding it, or the last node on the path.
    fn descend(&self, value: &T) -> Option<Handle> {
        let mut current = self.raw.root()?;
        loop {
            let next = match value.cmp(self.raw.value(current)) {
                Less => self.raw.left(current),
                Greater => self.raw.right(current),
                Equal => return Some(current),
            };
            match next {
                Some(next) => current = next,
                None => return Some(current),
            }
        }
    }

    /// Splays the node nearest to `value` and returns it, now the root.
    fn access(&mut self, value: &T) -> Option<Handle> {
        let handle = self.descend(value)?;
        self.splay(handle);
        Some(handle)
    }

    /// Splays the extreme node of `subtree` on side `dir` and returns it.
    fn splay_extreme(&mut self, subtree: Option<Handle>, dir: Dir) -> Option<Handle> {
        let mut current = subtree?;
        while let Some(next) = self.raw.child(current, dir) {
            current = next;
        }
        self.splay(current);
        Some(current)
    }

    /// Adds one occurrence of `value`.
    pub fn insert(&mut self, value: T) {
        let Some(mut current) = self.raw.root() else {
            let root = self.raw.alloc(SplayNode {
                value,
                left: None,
                right: None,
                parent: None,
                count: 1,
                size: 1,
            });
            self.raw.set_root(Some(root));
            return;
        };

        let touched = loop {
            self.raw.node_mut(current).size += 1;
            let dir = match value.cmp(self.raw.value(current)) {
                Less => Dir::Left,
                Greater => Dir::Right,
                Equal => {
                    self.raw.node_mut(current).count += 1;
                    break current;
                }
            };
            match self.raw.child(current, dir) {
                Some(next) => current = next,
                None => {
                    let leaf = self.raw.alloc(SplayNode {
                        value,
                        left: None,
                        right: None,
                        parent: None,
                        count: 1,
                        size: 1,
                    });
                    self.raw.set_child(current, dir, Some(leaf));
                    break leaf;
                }
            }
        };
        self.splay(touched);
    }

    /// Removes one occurrence of `value`. Does nothing if `value` is absent, though the nearest
    /// node is still splayed.
    pub fn delete(&mut self, value: &T) {
        let Some(root) = self.access(value) else { return };
        if self.raw.value(root) != value {
            return;
        }

        let node = self.raw.node_mut(root);
        if node.count > 1 {
            node.count -= 1;
            node.size -= 1;
            return;
        }

        let (left, right) = (node.left, node.right);
        self.raw.take(root);
        self.raw.set_root(left);
        match self.splay_extreme(left, Dir::Right) {
            None => self.raw.set_root(right),
            Some(joint) => {
                self.raw.set_child(joint, Dir::Right, right);
                self.raw.pull(joint);
            }
        }
    }

    /// Returns `true` if `value` is stored at least once.
    pub fn contains(&mut self, value: &T) -> bool {
        self.access(value).is_some_and(|root| self.raw.value(root) == value)
    }

    /// Returns the `k`-th smallest value, 1-indexed, after splaying its node.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfRange`] if `k == 0` or `k > len()`.
    pub fn kth(&mut self, k: usize) -> Result<&T, Error> {
        let handle = self.raw.kth(k).ok_or(Error::OutOfRange)?;
        self.splay(handle);
        Ok(self.raw.value(handle))
    }

    /// Returns the number of stored values strictly smaller than `value`, plus one.
    pub fn rank(&mut self, value: &T) -> usize {
        let Some(root) = self.access(value) else { return 1 };
        let node = self.raw.node(root);
        let below = self.raw.size(node.left);
        if node.value < *value { below + node.count + 1 } else { below + 1 }
    }

    /// Returns the largest stored value strictly smaller than `value`.
    ///
    /// # Errors
    ///
    /// [`Error::NoPredecessor`] if there is none.
    pub fn predecessor(&mut self, value: &T) -> Result<&T, Error> {
        let root = self.access(value).ok_or(Error::NoPredecessor)?;
        let found = if self.raw.value(root) < value {
            root
        } else {
            let left = self.raw.left(root);
            self.splay_extreme(left, Dir::Right).ok_or(Error::NoPredecessor)?
        };
        Ok(self.raw.value(found))
    }

    /// Returns the smallest stored value strictly greater than `value`.
    ///
    /// # Errors
    ///
    /// [`Error::NoSuccessor`] if there is none.
    pub fn successor(&mut self, value: &T) -> Result<&T, Error> {
        let root = self.access(value).ok_or(Error::NoSuccessor)?;
        let found = if self.raw.value(root) > value {
            root
        } else {
            let right = self.raw.right(root);
            self.splay_extreme(right, Dir::Left).ok_or(Error::NoSuccessor)?
        };
        Ok(self.raw.value(found))
    }

    /// Verifies ordering, sizes and parent back-links.
    ///
    /// # Errors
    ///
    /// The first [`ViolatedInvariant`] found.
    pub fn check_invariants(&self) -> Result<(), ViolatedInvariant> {
        self.raw.check_with(|raw, handle| {
            let node = raw.node(handle);
            if node.count == 0 {
                return Err(ViolatedInvariant::Size {
                    expected: node.size + 1,
                    found: node.size,
                });
            }
            // One node per distinct value.
            match node.right {
                Some(right) if raw.value(right) == &node.value => Err(ViolatedInvariant::Order),
                _ => Ok(()),
            }
        })
    }
}

impl<T: Ord> OrderStatistic<T> for SplayTree<T> {
    fn insert(&mut self, value: T) {
        SplayTree::insert(self, value);
    }

    fn delete(&mut self, value: &T) {
        SplayTree::delete(self, value);
    }

    fn contains(&mut self, value: &T) -> bool {
        SplayTree::contains(self, value)
    }

    fn len(&self) -> usize {
        SplayTree::len(self)
    }

    fn clear(&mut self) {
        SplayTree::clear(self);
    }

    fn kth(&mut self, k: usize) -> Result<&T, Error> {
        SplayTree::kth(self, k)
    }

    fn rank(&mut self, value: &T) -> usize {
        SplayTree::rank(self, value)
    }

    fn predecessor(&mut self, value: &T) -> Result<&T, Error> {
        SplayTree::predecessor(self, value)
    }

    fn successor(&mut self, value: &T) -> Result<&T, Error> {
        SplayTree::successor(self, value)
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
        Contains(i32),
        Kth(usize),
        Rank(i32),
        Predecessor(i32),
        Successor(i32),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            4 => (0i32..64).prop_map(Op::Insert),
            2 => (0i32..64).prop_map(Op::Delete),
            1 => (0i32..64).prop_map(Op::Contains),
            1 => (0usize..80).prop_map(Op::Kth),
            1 => (0i32..64).prop_map(Op::Rank),
            1 => (0i32..64).prop_map(Op::Predecessor),
            1 => (0i32..64).prop_map(Op::Successor),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(96))]

        #[test]
        fn every_access_keeps_the_tree_consistent(ops in prop::collection::vec(op_strategy(), 0..300)) {
            let mut tree = SplayTree::new();
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
                    Op::Contains(value) => {
                        prop_assert_eq!(tree.contains(&value), model.contains_key(&value));
                    }
                    Op::Kth(k) => {
                        let expected = model
                            .iter()
                            .flat_map(|(&value, &count)| core::iter::repeat_n(value, count))
                            .nth(k.wrapping_sub(1));
                        prop_assert_eq!(tree.kth(k).ok().copied(), expected);
                    }
                    Op::Rank(value) => {
                        let below: usize = model.range(..value).map(|(_, &count)| count).sum();
                        prop_assert_eq!(tree.rank(&value), below + 1);
                    }
                    Op::Predecessor(value) => {
                        let expected = model.range(..value).next_back().map(|(&value, _)| value);
                        prop_assert_eq!(tree.predecessor(&value).ok().copied(), expected);
                    }
                    Op::Successor(value) => {
                        let expected = model.range(value + 1..).next().map(|(&value, _)| value);
                        prop_assert_eq!(tree.successor(&value).ok().copied(), expected);
                    }
                }
                prop_assert_eq!(tree.check_invariants(), Ok(()));
                prop_assert_eq!(tree.len(), model.values().sum::<usize>());
            }
        }
    }

    #[test]
    fn queries_move_the_touched_node_to_the_root() {
        let mut tree: SplayTree<i32> = [1, 2, 3].into_iter().collect();
        assert_eq!(tree.root(), Some(&3));

        assert!(tree.contains(&1));
        assert_eq!(tree.root(), Some(&1));

        assert_eq!(tree.rank(&3), 3);
        assert_eq!(tree.root(), Some(&3));

        assert_eq!(tree.predecessor(&3), Ok(&2));
        assert_eq!(tree.root(), Some(&2));

        assert_eq!(tree.successor(&2), Ok(&3));
        assert_eq!(tree.root(), Some(&3));

        assert!(!tree.contains(&0));
        assert_eq!(tree.root(), Some(&1));
        assert_eq!(tree.check_invariants(), Ok(()));
    }

    #[test]
    fn kth_then_insert_below_the_minimum() {
        let mut tree: SplayTree<i32> = [1, 2, 3].into_iter().collect();
        assert_eq!(tree.kth(1), Ok(&1));
        assert_eq!(tree.root(), Some(&1));
        tree.insert(0);
        assert_eq!(tree.check_invariants(), Ok(()));
        assert_eq!(tree.kth(1), Ok(&0));
        assert_eq!(tree.iter().copied().collect::<Vec<_>>(), [0, 1, 2, 3]);
    }

    #[test]
    fn duplicates_share_a_node() {
        let mut tree: SplayTree<i32> = [7, 7, 7, 3].into_iter().collect();
        assert_eq!(tree.len(), 4);
        assert_eq!(tree.raw.node_count(), 2);
        assert_eq!(tree.rank(&7), 2);
        assert_eq!(tree.rank(&8), 5);
        tree.delete(&7);
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.raw.node_count(), 2);
        tree.delete(&7);
        tree.delete(&7);
        assert_eq!(tree.raw.node_count(), 1);
        assert!(!tree.contains(&7));
        assert_eq!(tree.check_invariants(), Ok(()));
    }

    #[test]
    fn degenerate_paths_are_walked_without_recursion() {
        let mut tree: SplayTree<u32> = (0..20_000).collect();
        assert_eq!(tree.check_invariants(), Ok(()));
        assert_eq!(tree.kth(1), Ok(&0));
        assert_eq!(tree.rank(&19_999), 20_000);
        assert_eq!(tree.iter().len(), 20_000);
        assert_eq!(tree.check_invariants(), Ok(()));
    }

    #[test]
    fn deleting_the_root_joins_both_sides() {
        let mut tree: SplayTree<i32> = [4, 2, 6, 1, 3, 5, 7].into_iter().collect();
        tree.delete(&4);
        assert_eq!(tree.root(), Some(&3));
        assert_eq!(tree.check_invariants(), Ok(()));
        assert_eq!(tree.iter().copied().collect::<Vec<_>>(), [1, 2, 3, 5, 6, 7]);
    }
}

//! Randomized order-statistic tree repaired by rotations.
//!
//! Every node draws a priority once, at creation. The tree is ordered by value and min-heap
//! ordered by priority, which makes its shape that of a random BST regardless of the insertion
//! order.

use rand::{RngCore, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;

use crate::raw::{Arena, Dir, Handle, Node, RawTree, binary_links, size_of};
use crate::{Error, OrderStatistic, ViolatedInvariant};

/// Node shared by both treap flavours.
#[derive(Clone)]
pub(crate) struct TreapNode<T> {
    value: T,
    left: Option<Handle>,
    right: Option<Handle>,
    pub(crate) priority: u32,
    size: usize,
}

impl<T> TreapNode<T> {
    pub(crate) fn leaf(value: T, priority: u32) -> Self {
        Self {
            value,
            left: None,
            right: None,
            priority,
            size: 1,
        }
    }
}

impl<T: Ord> Node for TreapNode<T> {
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

/// Per-node heap rule: no child has a smaller priority than its parent.
pub(crate) fn check_heap<T: Ord>(raw: &RawTree<TreapNode<T>>, handle: Handle) -> Result<(), ViolatedInvariant> {
    let node = raw.node(handle);
    let violated = [node.left, node.right]
        .into_iter()
        .flatten()
        .any(|child| raw.node(child).priority < node.priority);
    if violated { Err(ViolatedInvariant::Heap) } else { Ok(()) }
}

/// An ordered multiset kept as a treap, rebalanced with rotations.
///
/// Priorities come from a xoshiro256** generator owned by the tree. [`Treap::with_seed`] makes
/// the shape reproducible.
///
/// # Examples
///
/// ```
/// use order_stat_trees::Treap;
///
/// let mut tree = Treap::with_seed(7);
/// tree.extend([5, 3, 8, 1, 4]);
///
/// assert_eq!(tree.rank(&4), 3);
/// assert_eq!(tree.predecessor(&4), Ok(&3));
/// assert_eq!(tree.successor(&4), Ok(&5));
/// ```
#[derive(Clone)]
pub struct Treap<T> {
    raw: RawTree<TreapNode<T>>,
    rng: Xoshiro256StarStar,
}

collection_common!(Treap, TreapNode);

impl<T: Ord> Treap<T> {
    /// Makes a new, empty `Treap` whose priorities are seeded from OS entropy.
    #[must_use]
    pub fn new() -> Self {
        Self {
            raw: RawTree::new(),
            rng: Xoshiro256StarStar::from_entropy(),
        }
    }

    /// Makes a new, empty `Treap` with a deterministic priority stream.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            raw: RawTree::new(),
            rng: Xoshiro256StarStar::seed_from_u64(seed),
        }
    }

    /// Makes a new, empty `Treap` with room for `capacity` values.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            raw: RawTree::with_capacity(capacity),
            rng: Xoshiro256StarStar::from_entropy(),
        }
    }

    /// Adds one occurrence of `value`. Equal values go to the right of their peers.
    pub fn insert(&mut self, value: T) {
        let root = self.insert_at(self.raw.root(), value);
        self.raw.set_root(Some(root));
    }

    fn insert_at(&mut self, subtree: Option<Handle>, value: T) -> Handle {
        let Some(handle) = subtree else {
            let priority = self.rng.next_u32();
            return self.raw.alloc(TreapNode::leaf(value, priority));
        };

        let dir = Dir::right_if(*self.raw.value(handle) <= value);
        let child = self.insert_at(self.raw.child(handle, dir), value);
        self.raw.set_child(handle, dir, Some(child));
        self.raw.pull(handle);
        if self.raw.node(child).priority < self.raw.node(handle).priority {
            self.raw.rotate(handle, dir.flip())
        } else {
            handle
        }
    }

    /// Removes one occurrence of `value`. Does nothing if `value` is absent.
    pub fn delete(&mut self, value: &T) {
        let root = self.delete_at(self.raw.root(), value);
        self.raw.set_root(root);
    }

    fn delete_at(&mut self, subtree: Option<Handle>, value: &T) -> Option<Handle> {
        let handle = subtree?;
        let node = self.raw.node(handle);
        let dir = match value.cmp(&node.value) {
            core::cmp::Ordering::Less => Dir::Left,
            core::cmp::Ordering::Greater => Dir::Right,
            core::cmp::Ordering::Equal => match (node.left, node.right) {
                (None, orphan) | (orphan, None) => {
                    self.raw.take(handle);
                    return orphan;
                }
                (Some(left), Some(right)) => {
                    // Sink the node below whichever child wins the heap, then keep chasing it.
                    let toward = Dir::right_if(self.raw.node(left).priority < self.raw.node(right).priority);
                    let top = self.raw.rotate(handle, toward);
                    let sunk = self.delete_at(Some(handle), value);
                    self.raw.set_child(top, toward, sunk);
                    self.raw.pull(top);
                    return Some(top);
                }
            },
        };

        let child = self.delete_at(self.raw.child(handle, dir), value);
        self.raw.set_child(handle, dir, child);
        self.raw.pull(handle);
        Some(handle)
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

    /// Verifies ordering, sizes and the priority heap.
    ///
    /// # Errors
    ///
    /// The first [`ViolatedInvariant`] found.
    pub fn check_invariants(&self) -> Result<(), ViolatedInvariant> {
        self.raw.check_with(check_heap)
    }
}

impl<T: Ord> OrderStatistic<T> for Treap<T> {
    fn insert(&mut self, value: T) {
        Treap::insert(self, value);
    }

    fn delete(&mut self, value: &T) {
        Treap::delete(self, value);
    }

    fn contains(&mut self, value: &T) -> bool {
        Treap::contains(self, value)
    }

    fn len(&self) -> usize {
        Treap::len(self)
    }

    fn clear(&mut self) {
        Treap::clear(self);
    }

    fn kth(&mut self, k: usize) -> Result<&T, Error> {
        Treap::kth(self, k)
    }

    fn rank(&mut self, value: &T) -> usize {
        Treap::rank(self, value)
    }

    fn predecessor(&mut self, value: &T) -> Result<&T, Error> {
        Treap::predecessor(self, value)
    }

    fn successor(&mut self, value: &T) -> Result<&T, Error> {
        Treap::successor(self, value)
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
            3 => (0i32..100).prop_map(Op::Insert),
            2 => (0i32..100).prop_map(Op::Delete),
        ]
    }

    /// Values in pre-order, which pins down the shape.
    fn pre_order(tree: &Treap<i32>) -> Vec<i32> {
        let mut out = Vec::new();
        let mut pending: Vec<Handle> = tree.raw.root().into_iter().collect();
        while let Some(handle) = pending.pop() {
            out.push(*tree.raw.value(handle));
            pending.extend(tree.raw.right(handle));
            pending.extend(tree.raw.left(handle));
        }
        out
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn heap_and_order_survive_mixed_updates(
            seed in any::<u64>(),
            ops in prop::collection::vec(op_strategy(), 0..400),
        ) {
            let mut tree = Treap::with_seed(seed);
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
            prop_assert_eq!(tree.iter().copied().collect::<Vec<_>>(), expected);
            prop_assert_eq!(tree.raw.node_count(), tree.len());
        }
    }

    #[test]
    fn equal_seeds_build_equal_shapes() {
        let values = [50, 20, 80, 10, 30, 70, 90, 20, 60];
        let mut first = Treap::with_seed(42);
        let mut second = Treap::with_seed(42);
        first.extend(values);
        second.extend(values);
        assert_eq!(pre_order(&first), pre_order(&second));

        first.delete(&20);
        second.delete(&20);
        assert_eq!(pre_order(&first), pre_order(&second));
    }

    #[test]
    fn sorted_input_still_yields_a_shallow_tree() {
        let tree: Treap<u32> = {
            let mut tree = Treap::with_seed(3);
            tree.extend(0..4096);
            tree
        };
        fn depth(tree: &Treap<u32>, subtree: Option<Handle>) -> usize {
            subtree.map_or(0, |handle| 1 + depth(tree, tree.raw.left(handle)).max(depth(tree, tree.raw.right(handle))))
        }
        assert_eq!(tree.check_invariants(), Ok(()));
        assert!(depth(&tree, tree.raw.root()) < 64);
    }

    #[test]
    fn entropy_seeded_trees_work() {
        let mut tree: Treap<i32> = [3, 1, 2].into_iter().collect();
        tree.delete(&1);
        assert_eq!(tree.kth(1), Ok(&2));
        assert_eq!(tree.check_invariants(), Ok(()));
    }

    #[test]
    fn rotating_inserts_keep_sizes_exact() {
        for seed in 0..64 {
            let mut tree = Treap::with_seed(seed);
            for value in [5, 3, 8, 1, 4] {
                tree.insert(value);
                assert_eq!(tree.check_invariants(), Ok(()));
            }
            assert_eq!(tree.rank(&4), 3);
            assert_eq!(tree.predecessor(&4), Ok(&3));
            assert_eq!(tree.successor(&4), Ok(&5));
        }
    }
}

//! Red-black order-statistic tree with single-pass top-down insertion and deletion.
//!
//! Both updates walk from the root to a leaf exactly once, repairing colors on the way down so
//! nothing needs fixing on the way back up. Sizes are adjusted during the same walk: every node
//! passed on the way down is bumped by one before the value reaches it, and each rotation
//! restores the counts it disturbs.

use crate::raw::{Arena, Dir, Handle, Node, RawTree, Slot, binary_links, size_of};
use crate::{Error, OrderStatistic, ViolatedInvariant};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Color {
    Red,
    Black,
}

#[derive(Clone)]
pub(crate) struct RedBlackNode<T> {
    value: T,
    left: Option<Handle>,
    right: Option<Handle>,
    color: Color,
    size: usize,
}

impl<T: Ord> Node for RedBlackNode<T> {
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

/// An ordered multiset kept as a red-black tree.
///
/// # Examples
///
/// ```
/// use order_stat_trees::{Error, RedBlackTree};
///
/// let mut tree = RedBlackTree::new();
/// tree.extend([10, 20, 30, 20]);
///
/// assert_eq!(tree.len(), 4);
/// assert_eq!(tree.rank(&20), 2);
/// assert_eq!(tree.successor(&20), Ok(&30));
/// assert_eq!(tree.kth(5), Err(Error::OutOfRange));
/// ```
#[derive(Clone)]
pub struct RedBlackTree<T> {
    raw: RawTree<RedBlackNode<T>>,
}

collection_common!(RedBlackTree, RedBlackNode);

impl<T: Ord> RedBlackTree<T> {
    /// Makes a new, empty `RedBlackTree`.
    #[must_use]
    pub const fn new() -> Self {
        Self { raw: RawTree::new() }
    }

    /// Makes a new, empty `RedBlackTree` with room for `capacity` values.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            raw: RawTree::with_capacity(capacity),
        }
    }

    fn is_red(&self, subtree: Option<Handle>) -> bool {
        subtree.is_some_and(|handle| self.raw.node(handle).color == Color::Red)
    }

    fn paint(&mut self, handle: Handle, color: Color) {
        self.raw.node_mut(handle).color = color;
    }

    /// Rotates toward `dir`, leaving the promoted node black and the demoted one red.
    fn rotate_single(&mut self, root: Handle, dir: Dir) -> Handle {
        let pivot = self.raw.rotate(root, dir);
        self.paint(root, Color::Red);
        self.paint(pivot, Color::Black);
        pivot
    }

    fn rotate_double(&mut self, root: Handle, dir: Dir) -> Handle {
        let inner = self
            .raw
            .child(root, dir.flip())
            .expect("`RedBlackTree::rotate_double()` - rotation pivot is missing!");
        let promoted = self.rotate_single(inner, dir.flip());
        self.raw.set_child(root, dir.flip(), Some(promoted));
        self.rotate_single(root, dir)
    }

    /// Adds one occurrence of `value`. Equal values go to the right of their peers.
    pub fn insert(&mut self, value: T) {
        let Some(root) = self.raw.root() else {
            let root = self.raw.alloc(RedBlackNode {
                value,
                left: None,
                right: None,
                color: Color::Black,
                size: 1,
            });
            self.raw.set_root(Some(root));
            return;
        };

        // `great` is `None` while the walk is still directly below the root slot.
        let mut great: Option<Handle> = None;
        let mut grand: Option<Handle> = None;
        let mut parent: Option<Handle> = None;
        let mut current = Some(root);
        let mut dir = Dir::Left;
        let mut last = Dir::Left;
        let mut value = Some(value);

        loop {
            let here = match current {
                Some(here) => {
                    self.raw.node_mut(here).size += 1;
                    let (left, right) = (self.raw.left(here), self.raw.right(here));
                    if let (Some(left), Some(right)) = (left, right)
                        && self.is_red(Some(left))
                        && self.is_red(Some(right))
                    {
                        self.paint(here, Color::Red);
                        self.paint(left, Color::Black);
                        self.paint(right, Color::Black);
                    }
                    here
                }
                None => {
                    let Some(value) = value.take() else { break };
                    let here = self.raw.alloc(RedBlackNode {
                        value,
                        left: None,
                        right: None,
                        color: Color::Red,
                        size: 1,
                    });
                    let parent = parent.expect("`RedBlackTree::insert()` - new leaf has no parent!");
                    self.raw.set_child(parent, dir, Some(here));
                    here
                }
            };
            let placed = value.is_none();

            if self.is_red(Some(here)) && self.is_red(parent) {
                let grand = grand.expect("`RedBlackTree::insert()` - red parent has no grandparent!");
                let slot = self.raw.slot_below(great, grand);
                let outer = parent.is_some_and(|parent| self.raw.child(parent, last) == Some(here));
                let top = if outer {
                    // Sizes of the rotated pair already include the new value.
                    self.rotate_single(grand, last.flip())
                } else {
                    let top = self.rotate_double(grand, last.flip());
                    if !placed {
                        // `here` moved above the path just walked and lost its bump.
                        self.raw.node_mut(top).size += 1;
                    }
                    top
                };
                self.raw.attach(slot, Some(top));
            }

            let Some(pending) = value.as_ref() else { break };
            last = dir;
            dir = Dir::right_if(*self.raw.value(here) <= *pending);
            if grand.is_some() {
                great = grand;
            }
            grand = parent;
            parent = Some(here);
            current = self.raw.child(here, dir);
        }

        if let Some(root) = self.raw.root() {
            self.paint(root, Color::Black);
        }
    }

    /// Removes one occurrence of `value`. Does nothing if `value` is absent.
    pub fn delete(&mut self, value: &T) {
        if self.raw.find(value).is_none() {
            return;
        }

        // `None` stands for the slot above the root.
        let mut grand: Option<Handle> = None;
        let mut parent: Option<Handle> = None;
        let mut current: Option<Handle> = None;
        let mut target: Option<Handle> = None;
        let mut dir = Dir::Right;

        loop {
            let next = match current {
                None => self.raw.root(),
                Some(here) => self.raw.child(here, dir),
            };
            let Some(here) = next else { break };

            let last = dir;
            grand = parent;
            parent = current;
            current = Some(here);
            dir = Dir::right_if(self.raw.value(here) < value);

            self.raw.node_mut(here).size -= 1;
            if self.raw.value(here) == value {
                target = Some(here);
            }

            if self.is_red(Some(here)) || self.is_red(self.raw.child(here, dir)) {
                continue;
            }

            if self.is_red(self.raw.child(here, dir.flip())) {
                let top = self.rotate_single(here, dir);
                // The rotation recounted `here` from its children; restore its decrement.
                self.raw.node_mut(here).size -= 1;
                self.raw.pull(top);
                self.raw.attach(Slot::at(parent, last), Some(top));
                parent = Some(top);
            } else if let Some(sibling) = parent.and_then(|parent| self.raw.child(parent, last.flip())) {
                let near = self.raw.child(sibling, last);
                let far = self.raw.child(sibling, last.flip());
                let parent = parent.expect("`RedBlackTree::delete()` - sibling without a parent!");

                if !self.is_red(near) && !self.is_red(far) {
                    self.paint(parent, Color::Black);
                    self.paint(sibling, Color::Red);
                    self.paint(here, Color::Red);
                } else {
                    let slot = self.raw.slot_below(grand, parent);
                    let top = if self.is_red(near) {
                        self.rotate_double(parent, last)
                    } else {
                        self.rotate_single(parent, last)
                    };
                    self.raw.attach(slot, Some(top));

                    self.paint(here, Color::Red);
                    self.paint(top, Color::Red);
                    for side in [Dir::Left, Dir::Right] {
                        if let Some(child) = self.raw.child(top, side) {
                            self.paint(child, Color::Black);
                        }
                    }
                }
            }
        }

        let bottom = current.expect("`RedBlackTree::delete()` - descent visited no node!");
        let target = target.expect("`RedBlackTree::delete()` - located value vanished during descent!");
        let orphan = self.raw.left(bottom).or(self.raw.right(bottom));
        let side = parent.map_or(Dir::Right, |parent| self.raw.side_of(parent, bottom));
        self.raw.attach(Slot::at(parent, side), orphan);

        // `bottom` holds the in-order neighbour of `target`, or is `target` itself.
        let removed = self.raw.take(bottom);
        if target != bottom {
            self.raw.node_mut(target).value = removed.value;
        }

        if let Some(root) = self.raw.root() {
            self.paint(root, Color::Black);
        }
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

    /// Verifies ordering, sizes and the red-black coloring rules.
    ///
    /// # Errors
    ///
    /// The first [`ViolatedInvariant`] found.
    pub fn check_invariants(&self) -> Result<(), ViolatedInvariant> {
        self.raw.check_with(|raw, handle| {
            let node = raw.node(handle);
            if node.color == Color::Red
                && [node.left, node.right]
                    .into_iter()
                    .flatten()
                    .any(|child| raw.node(child).color == Color::Red)
            {
                return Err(ViolatedInvariant::DoubleRed);
            }
            Ok(())
        })?;

        if self.is_red(self.raw.root()) {
            return Err(ViolatedInvariant::RedRoot);
        }
        self.black_height(self.raw.root()).map(|_| ())
    }

    /// Black nodes on every path from `subtree` down to a missing child.
    fn black_height(&self, subtree: Option<Handle>) -> Result<usize, ViolatedInvariant> {
        let Some(handle) = subtree else { return Ok(0) };
        let node = self.raw.node(handle);
        let left = self.black_height(node.left)?;
        let right = self.black_height(node.right)?;
        if left != right {
            return Err(ViolatedInvariant::BlackHeight);
        }
        Ok(left + usize::from(node.color == Color::Black))
    }
}

impl<T: Ord> OrderStatistic<T> for RedBlackTree<T> {
    fn insert(&mut self, value: T) {
        RedBlackTree::insert(self, value);
    }

    fn delete(&mut self, value: &T) {
        RedBlackTree::delete(self, value);
    }

    fn contains(&mut self, value: &T) -> bool {
        RedBlackTree::contains(self, value)
    }

    fn len(&self) -> usize {
        RedBlackTree::len(self)
    }

    fn clear(&mut self) {
        RedBlackTree::clear(self);
    }

    fn kth(&mut self, k: usize) -> Result<&T, Error> {
        RedBlackTree::kth(self, k)
    }

    fn rank(&mut self, value: &T) -> usize {
        RedBlackTree::rank(self, value)
    }

    fn predecessor(&mut self, value: &T) -> Result<&T, Error> {
        RedBlackTree::predecessor(self, value)
    }

    fn successor(&mut self, value: &T) -> Result<&T, Error> {
        RedBlackTree::successor(self, value)
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

    fn contents(model: &BTreeMap<i32, usize>) -> Vec<i32> {
        model.iter().flat_map(|(&value, &count)| core::iter::repeat_n(value, count)).collect()
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(96))]

        #[test]
        fn coloring_and_sizes_survive_mixed_updates(ops in prop::collection::vec(op_strategy(), 0..400)) {
            let mut tree = RedBlackTree::new();
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
                prop_assert_eq!(tree.len(), model.values().sum::<usize>());
            }

            prop_assert_eq!(tree.iter().copied().collect::<Vec<_>>(), contents(&model));
        }
    }

    #[test]
    fn ascending_then_descending_deletes() {
        let mut tree: RedBlackTree<u32> = (0..512).collect();
        assert_eq!(tree.check_invariants(), Ok(()));
        for value in (0..512).rev().step_by(2) {
            tree.delete(&value);
            assert_eq!(tree.check_invariants(), Ok(()));
        }
        assert_eq!(tree.len(), 256);
        assert_eq!(tree.kth(1), Ok(&0));
        assert_eq!(tree.kth(256), Ok(&510));
        assert_eq!(tree.raw.node_count(), 256);
    }

    #[test]
    fn deleting_absent_values_leaves_sizes_alone() {
        let mut tree: RedBlackTree<i32> = [5, 3, 8].into_iter().collect();
        tree.delete(&4);
        tree.delete(&100);
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.check_invariants(), Ok(()));
    }

    #[test]
    fn emptying_the_tree() {
        let mut tree: RedBlackTree<i32> = [2, 2, 1].into_iter().collect();
        for value in [2, 1, 2] {
            tree.delete(&value);
            assert_eq!(tree.check_invariants(), Ok(()));
        }
        assert!(tree.is_empty());
        assert!(tree.raw.root().is_none());
        assert_eq!(tree.kth(1), Err(Error::OutOfRange));
    }

    #[test]
    fn rotations_during_the_descent_keep_sizes_exact() {
        let mut tree = RedBlackTree::new();
        for value in [10, 20, 30, 40, 50, 25] {
            tree.insert(value);
            assert_eq!(tree.check_invariants(), Ok(()));
        }
        tree.delete(&20);
        assert_eq!(tree.check_invariants(), Ok(()));
        assert_eq!(tree.iter().copied().collect::<Vec<_>>(), [10, 25, 30, 40, 50]);
        assert_eq!(tree.kth(5), Ok(&50));
    }
}

use core::cmp::Ordering::{Equal, Greater, Less};

use super::arena::Arena;
use super::iter::Iter;
use super::link::{Dir, Handle, Slot};
use super::node::{Node, size_of};

/// Arena-backed binary tree shared by every engine.
///
/// `RawTree` knows how to link, rotate and search nodes; it never rebalances. Engines own one
/// and layer their repair rules on top.
#[derive(Clone)]
pub(crate) struct RawTree<N> {
    /// Arena storing all tree nodes.
    nodes: Arena<N>,
    /// Handle to the root node, if the tree is non-empty.
    root: Option<Handle>,
}

impl<N: Node> RawTree<N> {
    pub(crate) const fn new() -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Arena::with_capacity(capacity),
            root: None,
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    /// Number of live values stored in the tree.
    pub(crate) fn len(&self) -> usize {
        size_of(&self.nodes, self.root)
    }

    /// Number of nodes held by the arena, live or not.
    pub(crate) fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
    }

    pub(crate) fn root(&self) -> Option<Handle> {
        self.root
    }

    pub(crate) fn set_root(&mut self, root: Option<Handle>) {
        self.root = root;
        if let Some(handle) = root {
            self.nodes.get_mut(handle).set_parent(None);
        }
    }

    pub(crate) fn nodes(&self) -> &Arena<N> {
        &self.nodes
    }

    #[inline]
    pub(crate) fn node(&self, handle: Handle) -> &N {
        self.nodes.get(handle)
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, handle: Handle) -> &mut N {
        self.nodes.get_mut(handle)
    }

    #[inline]
    pub(crate) fn value(&self, handle: Handle) -> &N::Value {
        self.nodes.get(handle).value()
    }

    pub(crate) fn alloc(&mut self, node: N) -> Handle {
        self.nodes.alloc(node)
    }

    /// Frees a node that has already been unlinked.
    pub(crate) fn take(&mut self, handle: Handle) -> N {
        self.nodes.take(handle)
    }

    #[inline]
    pub(crate) fn child(&self, handle: Handle, dir: Dir) -> Option<Handle> {
        self.nodes.get(handle).child(dir)
    }

    #[inline]
    pub(crate) fn left(&self, handle: Handle) -> Option<Handle> {
        self.child(handle, Dir::Left)
    }

    #[inline]
    pub(crate) fn right(&self, handle: Handle) -> Option<Handle> {
        self.child(handle, Dir::Right)
    }

    #[inline]
    pub(crate) fn size(&self, subtree: Option<Handle>) -> usize {
        size_of(&self.nodes, subtree)
    }

    /// Links `child` under `parent`, keeping the back-reference in step when the engine
    /// tracks one.
    pub(crate) fn set_child(&mut self, parent: Handle, dir: Dir, child: Option<Handle>) {
        self.nodes.get_mut(parent).set_child(dir, child);
        if N::TRACKS_PARENT
            && let Some(child) = child
        {
            self.nodes.get_mut(child).set_parent(Some(parent));
        }
    }

    /// Which side of `parent` holds `child`.
    #[inline]
    pub(crate) fn side_of(&self, parent: Handle, child: Handle) -> Dir {
        Dir::right_if(self.right(parent) == Some(child))
    }

    /// The slot `child` hangs from, given its parent (`None` for the root).
    pub(crate) fn slot_below(&self, parent: Option<Handle>, child: Handle) -> Slot {
        Slot::at(parent, parent.map_or(Dir::Left, |parent| self.side_of(parent, child)))
    }

    pub(crate) fn attach(&mut self, slot: Slot, subtree: Option<Handle>) {
        match slot {
            Slot::Root => self.set_root(subtree),
            Slot::Child(parent, dir) => self.set_child(parent, dir, subtree),
        }
    }

    #[inline]
    pub(crate) fn pull(&mut self, handle: Handle) {
        N::pull(&mut self.nodes, handle);
    }

    /// Rotates the subtree at `root` toward `dir`, promoting its child on the opposite side.
    /// Returns the promoted node, which the caller must attach where `root` used to hang.
    ///
    /// Both nodes are pulled, lower one first; ancestors are left untouched. The cached size of
    /// `root` is never read, so engines that adjust sizes during a descent may rotate mid-walk.
    pub(crate) fn rotate(&mut self, root: Handle, dir: Dir) -> Handle {
        let pivot = self.child(root, dir.flip()).expect("`RawTree::rotate()` - rotation pivot is missing!");
        let inner = self.child(pivot, dir);
        self.set_child(root, dir.flip(), inner);
        self.set_child(pivot, dir, Some(root));
        self.pull(root);
        self.pull(pivot);
        pivot
    }

    /// Returns an in-order iterator over the live values.
    pub(crate) fn iter(&self) -> Iter<'_, N> {
        Iter::new(self)
    }
}

/// Searches shared by every engine.
///
/// They only read sizes and multiplicities, so a lazily deleted node (multiplicity 0) is
/// skipped naturally.
impl<N: Node> RawTree<N> {
    /// Finds a node holding a live occurrence of `value`.
    pub(crate) fn find(&self, value: &N::Value) -> Option<Handle> {
        let mut current = self.root;
        while let Some(handle) = current {
            let node = self.node(handle);
            match value.cmp(node.value()) {
                Less => current = node.child(Dir::Left),
                Greater => current = node.child(Dir::Right),
                Equal if node.multiplicity() > 0 => return Some(handle),
                Equal => {
                    // Every copy of `value` lies below the first node that compares equal,
                    // but a dead one gives no hint which side the live copies are on.
                    let k = self.rank_in(Some(handle), value);
                    return self.kth_in(Some(handle), k).filter(|&found| self.value(found) == value);
                }
            }
        }
        None
    }

    /// Finds the node holding the `k`-th smallest live value (1-indexed).
    pub(crate) fn kth(&self, k: usize) -> Option<Handle> {
        self.kth_in(self.root, k)
    }

    fn kth_in(&self, subtree: Option<Handle>, mut k: usize) -> Option<Handle> {
        if k == 0 || k > self.size(subtree) {
            return None;
        }

        let mut current = subtree;
        while let Some(handle) = current {
            let node = self.node(handle);
            let left_size = self.size(node.child(Dir::Left));
            let own = node.multiplicity();
            if left_size >= k {
                current = node.child(Dir::Left);
            } else if left_size + own >= k {
                return Some(handle);
            } else {
                k -= left_size + own;
                current = node.child(Dir::Right);
            }
        }
        None
    }

    /// Number of live values strictly smaller than `value`, plus one.
    pub(crate) fn rank(&self, value: &N::Value) -> usize {
        self.rank_in(self.root, value)
    }

    fn rank_in(&self, subtree: Option<Handle>, value: &N::Value) -> usize {
        self.count_below(subtree, |candidate| candidate < value) + 1
    }

    /// Counts live values in `subtree` for which `is_below` holds. `is_below` must be a
    /// prefix of the in-order sequence.
    fn count_below(&self, subtree: Option<Handle>, is_below: impl Fn(&N::Value) -> bool) -> usize {
        let mut count = 0;
        let mut current = subtree;
        while let Some(handle) = current {
            let node = self.node(handle);
            if is_below(node.value()) {
                count += self.size(node.child(Dir::Left)) + node.multiplicity();
                current = node.child(Dir::Right);
            } else {
                current = node.child(Dir::Left);
            }
        }
        count
    }

    /// Largest live value strictly smaller than `value`.
    pub(crate) fn predecessor(&self, value: &N::Value) -> Option<Handle> {
        let below = self.count_below(self.root, |candidate| candidate < value);
        self.kth(below)
    }

    /// Smallest live value strictly greater than `value`.
    pub(crate) fn successor(&self, value: &N::Value) -> Option<Handle> {
        let not_above = self.count_below(self.root, |candidate| candidate <= value);
        self.kth(not_above + 1)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::raw::plain::Plain;

    fn leaf(tree: &mut RawTree<Plain>, value: i32, count: usize) -> Handle {
        tree.alloc(Plain::new(value, count))
    }

    /// Builds
    ///
    /// ```text
    ///         20 (dead)
    ///        /   \
    ///      10     30
    ///     /  \
    ///    5    20 (x2)
    /// ```
    fn sample() -> RawTree<Plain> {
        let mut tree = RawTree::new();
        let five = leaf(&mut tree, 5, 1);
        let twenty = leaf(&mut tree, 20, 2);
        let ten = leaf(&mut tree, 10, 1);
        tree.set_child(ten, Dir::Left, Some(five));
        tree.set_child(ten, Dir::Right, Some(twenty));
        tree.pull(ten);
        let thirty = leaf(&mut tree, 30, 1);
        let root = leaf(&mut tree, 20, 0);
        tree.set_child(root, Dir::Left, Some(ten));
        tree.set_child(root, Dir::Right, Some(thirty));
        tree.pull(root);
        tree.set_root(Some(root));
        tree
    }

    #[test]
    fn sizes_skip_dead_nodes() {
        let tree = sample();
        assert_eq!(tree.len(), 5);
        assert_eq!(tree.node_count(), 5);
    }

    #[test]
    fn kth_repeats_duplicates() {
        let tree = sample();
        let values: alloc::vec::Vec<i32> = (1..=5).map(|k| *tree.value(tree.kth(k).unwrap())).collect();
        assert_eq!(values, [5, 10, 20, 20, 30]);
        assert!(tree.kth(0).is_none());
        assert!(tree.kth(6).is_none());
    }

    #[test]
    fn find_looks_past_dead_copies() {
        let tree = sample();
        let found = tree.find(&20).unwrap();
        assert_eq!(tree.node(found).count, 2);
        assert!(tree.find(&15).is_none());
    }

    #[test]
    fn rank_and_neighbours() {
        let tree = sample();
        assert_eq!(tree.rank(&20), 3);
        assert_eq!(tree.rank(&21), 5);
        assert_eq!(tree.rank(&1), 1);
        assert_eq!(tree.predecessor(&20).map(|h| *tree.value(h)), Some(10));
        assert_eq!(tree.successor(&20).map(|h| *tree.value(h)), Some(30));
        assert!(tree.predecessor(&5).is_none());
        assert!(tree.successor(&30).is_none());
    }

    #[test]
    fn rotation_preserves_order_and_sizes() {
        let mut tree = sample();
        let root = tree.root().unwrap();
        let promoted = tree.rotate(root, Dir::Right);
        tree.set_root(Some(promoted));
        assert_eq!(*tree.value(promoted), 10);
        assert_eq!(tree.node(promoted).size, 5);
        assert_eq!(tree.node(root).size, 3);
        let values: alloc::vec::Vec<i32> = tree.iter().copied().collect();
        assert_eq!(values, [5, 10, 20, 20, 30]);
    }

    #[test]
    fn rotation_ignores_a_pending_size_adjustment() {
        // Top-down engines bump sizes on the way down and may rotate before the value lands.
        let mut tree = sample();
        let root = tree.root().unwrap();
        tree.node_mut(root).size += 1;
        let promoted = tree.rotate(root, Dir::Right);
        tree.set_root(Some(promoted));
        assert_eq!(tree.node(promoted).size, 5);
        assert_eq!(tree.check_with(|_, _| Ok(())), Ok(()));
    }
}

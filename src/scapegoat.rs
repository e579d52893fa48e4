//! Weight-balanced order-statistic tree with lazy deletion and partial rebuilding.

use alloc::vec::Vec;

use crate::raw::{Arena, Dir, Handle, Node, RawTree, binary_links, size_of};
use crate::{Error, OrderStatistic, ViolatedInvariant};

/// Balance factor used by [`ScapegoatTree::new`].
pub const DEFAULT_ALPHA: f64 = 0.7;

#[derive(Clone)]
pub(crate) struct ScapegoatNode<T> {
    value: T,
    left: Option<Handle>,
    right: Option<Handle>,
    /// Cleared by deletion; the node stays linked until the next rebuild that covers it.
    active: bool,
    /// Active nodes in the subtree.
    size: usize,
    /// All nodes in the subtree, active or not.
    weight: usize,
}

impl<T: Ord> Node for ScapegoatNode<T> {
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

    fn multiplicity(&self) -> usize {
        usize::from(self.active)
    }

    fn pull(nodes: &mut Arena<Self>, handle: Handle) {
        let node = nodes.get(handle);
        let size = usize::from(node.active) + size_of(nodes, node.left) + size_of(nodes, node.right);
        let weight = 1 + weight_of(nodes, node.left) + weight_of(nodes, node.right);
        let node = nodes.get_mut(handle);
        node.size = size;
        node.weight = weight;
    }
}

fn weight_of<T>(nodes: &Arena<ScapegoatNode<T>>, subtree: Option<Handle>) -> usize {
    subtree.map_or(0, |handle| nodes.get(handle).weight)
}

/// Largest weight a part may carry inside a whole of weight `whole`.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn alpha_share(alpha: f64, whole: usize) -> usize {
    (alpha * whole as f64) as usize
}

/// An ordered multiset kept as a scapegoat tree.
///
/// Deletion only marks a node dead; dead nodes still count toward the weight that drives
/// rebalancing and are reclaimed by the next rebuild that covers them. Insertion rebuilds every
/// ancestor whose child outweighs `alpha` times its own weight.
///
/// # Examples
///
/// ```
/// use order_stat_trees::ScapegoatTree;
///
/// let mut tree: ScapegoatTree<i32> = (1..=15).collect();
/// tree.delete(&8);
///
/// assert_eq!(tree.len(), 14);
/// assert_eq!(tree.node_count(), 15);
/// assert_eq!(tree.successor(&7), Ok(&9));
/// ```
#[derive(Clone)]
pub struct ScapegoatTree<T> {
    raw: RawTree<ScapegoatNode<T>>,
    alpha: f64,
}

collection_common!(ScapegoatTree, ScapegoatNode);

impl<T: Ord> ScapegoatTree<T> {
    /// Makes a new, empty `ScapegoatTree` with α = 0.7.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            raw: RawTree::new(),
            alpha: DEFAULT_ALPHA,
        }
    }

    /// Makes a new, empty `ScapegoatTree` with the given balance factor.
    ///
    /// Smaller values keep the tree shallower at the cost of more frequent rebuilds.
    ///
    /// # Panics
    ///
    /// Panics if `alpha` is not within `[0.5, 1.0)`.
    #[must_use]
    pub fn with_alpha(alpha: f64) -> Self {
        assert!(
            (0.5..1.0).contains(&alpha),
            "`ScapegoatTree::with_alpha()` - `alpha` must lie in [0.5, 1.0), got {alpha}"
        );
        Self {
            raw: RawTree::new(),
            alpha,
        }
    }

    /// Makes a new, empty `ScapegoatTree` with α = 0.7 and room for `capacity` nodes.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            raw: RawTree::with_capacity(capacity),
            alpha: DEFAULT_ALPHA,
        }
    }

    /// The balance factor.
    #[must_use]
    pub const fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Nodes currently linked into the tree, including lazily deleted ones.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.raw.node_count()
    }

    fn is_imbalanced(&self, handle: Handle) -> bool {
        let nodes = self.raw.nodes();
        let node = nodes.get(handle);
        let limit = alpha_share(self.alpha, node.weight);
        weight_of(nodes, node.left) > limit || weight_of(nodes, node.right) > limit
    }

    /// Adds one occurrence of `value`. Equal values go to the right of their peers.
    pub fn insert(&mut self, value: T) {
        let root = self.insert_at(self.raw.root(), value);
        self.raw.set_root(Some(root));
    }

    fn insert_at(&mut self, subtree: Option<Handle>, value: T) -> Handle {
        let Some(handle) = subtree else {
            return self.raw.alloc(ScapegoatNode {
                value,
                left: None,
                right: None,
                active: true,
                size: 1,
                weight: 1,
            });
        };

        let dir = Dir::right_if(value >= *self.raw.value(handle));
        let child = self.insert_at(self.raw.child(handle, dir), value);
        self.raw.set_child(handle, dir, Some(child));
        self.raw.pull(handle);
        if self.is_imbalanced(handle) {
            self.rebuild(handle)
                .expect("`ScapegoatTree::insert_at()` - rebuilt subtree lost the inserted value!")
        } else {
            handle
        }
    }

    /// Rebuilds the subtree at `handle` into a perfectly balanced one over its active nodes,
    /// freeing the dead ones.
    fn rebuild(&mut self, handle: Handle) -> Option<Handle> {
        let mut live = Vec::with_capacity(self.raw.size(Some(handle)));
        let mut stack: Vec<Handle> = Vec::new();
        let mut current = Some(handle);
        loop {
            while let Some(node) = current {
                stack.push(node);
                current = self.raw.left(node);
            }
            let Some(node) = stack.pop() else { break };
            current = self.raw.right(node);
            if self.raw.node(node).active {
                live.push(node);
            } else {
                self.raw.take(node);
            }
        }
        self.build(&live)
    }

    fn build(&mut self, sorted: &[Handle]) -> Option<Handle> {
        let mid = sorted.len() / 2;
        let &root = sorted.get(mid)?;
        let left = self.build(&sorted[..mid]);
        let right = self.build(&sorted[mid + 1..]);
        self.raw.set_child(root, Dir::Left, left);
        self.raw.set_child(root, Dir::Right, right);
        self.raw.pull(root);
        Some(root)
    }

    /// Removes one occurrence of `value`. Does nothing if `value` is absent.
    ///
    /// The node is only marked dead. Once dead nodes make up more than `alpha` of the tree the
    /// whole tree is rebuilt.
    pub fn delete(&mut self, value: &T) {
        if self.raw.find(value).is_none() {
            return;
        }

        let mut k = self.raw.rank(value);
        let mut current = self.raw.root();
        while let Some(handle) = current {
            let left = self.raw.left(handle);
            let below = self.raw.size(left);
            let node = self.raw.node_mut(handle);
            node.size -= 1;
            let own = usize::from(node.active);
            if below >= k {
                current = left;
            } else if below + own >= k {
                node.active = false;
                break;
            } else {
                k -= below + own;
                current = node.right;
            }
        }

        if let Some(root) = self.raw.root() {
            let node = self.raw.node(root);
            if node.weight - node.size > alpha_share(self.alpha, node.weight) {
                let root = self.rebuild(root);
                self.raw.set_root(root);
            }
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

    /// Verifies ordering, active sizes, weights and the α-weight balance of every node.
    ///
    /// # Errors
    ///
    /// The first [`ViolatedInvariant`] found.
    pub fn check_invariants(&self) -> Result<(), ViolatedInvariant> {
        self.raw.check_with(|raw, handle| {
            let nodes = raw.nodes();
            let node = nodes.get(handle);
            let (left, right) = (weight_of(nodes, node.left), weight_of(nodes, node.right));
            let expected = 1 + left + right;
            if node.weight != expected {
                return Err(ViolatedInvariant::Weight {
                    expected,
                    found: node.weight,
                });
            }
            let limit = alpha_share(self.alpha, node.weight);
            if left > limit || right > limit {
                return Err(ViolatedInvariant::AlphaBalance);
            }
            Ok(())
        })
    }
}

impl<T: Ord> OrderStatistic<T> for ScapegoatTree<T> {
    fn insert(&mut self, value: T) {
        ScapegoatTree::insert(self, value);
    }

    fn delete(&mut self, value: &T) {
        ScapegoatTree::delete(self, value);
    }

    fn contains(&mut self, value: &T) -> bool {
        ScapegoatTree::contains(self, value)
    }

    fn len(&self) -> usize {
        ScapegoatTree::len(self)
    }

    fn clear(&mut self) {
        ScapegoatTree::clear(self);
    }

    fn kth(&mut self, k: usize) -> Result<&T, Error> {
        ScapegoatTree::kth(self, k)
    }

    fn rank(&mut self, value: &T) -> usize {
        ScapegoatTree::rank(self, value)
    }

    fn predecessor(&mut self, value: &T) -> Result<&T, Error> {
        ScapegoatTree::predecessor(self, value)
    }

    fn successor(&mut self, value: &T) -> Result<&T, Error> {
        ScapegoatTree::successor(self, value)
    }
}

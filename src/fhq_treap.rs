//! Randomized order-statistic tree built from split and merge alone.
//!
//! No rotations: every update cuts the tree along a value boundary, edits the pieces and glues
//! them back together by priority.

use rand::{RngCore, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;

use crate::raw::{Dir, Handle, RawTree};
use crate::treap::{TreapNode, check_heap};
use crate::{Error, OrderStatistic, ViolatedInvariant};

/// An ordered multiset kept as a treap and updated only through split and merge.
///
/// `rank`, `predecessor` and `successor` split the tree and merge it back, so they take
/// `&mut self`. The merge may pick a different shape than the one split, but the values and the
/// heap order are always preserved.
///
/// # Examples
///
/// ```
/// use order_stat_trees::{Error, FhqTreap};
///
/// let mut tree = FhqTreap::with_seed(1);
/// tree.extend([5, 3, 8, 1, 4]);
///
/// assert_eq!(tree.rank(&4), 3);
/// assert_eq!(tree.predecessor(&1), Err(Error::NoPredecessor));
/// assert_eq!(tree.successor(&4), Ok(&5));
/// ```
#[derive(Clone)]
pub struct FhqTreap<T> {
    raw: RawTree<TreapNode<T>>,
    rng: Xoshiro256StarStar,
}

collection_common!(FhqTreap, TreapNode);

impl<T: Ord> FhqTreap<T> {
    /// Makes a new, empty `FhqTreap` whose priorities are seeded from OS entropy.
    #[must_use]
    pub fn new() -> Self {
        Self {
            raw: RawTree::new(),
            rng: Xoshiro256StarStar::from_entropy(),
        }
    }

    /// Makes a new, empty `FhqTreap` with a deterministic priority stream.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            raw: RawTree::new(),
            rng: Xoshiro256StarStar::seed_from_u64(seed),
        }
    }

    /// Makes a new, empty `FhqTreap` with room for `capacity` values.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            raw: RawTree::with_capacity(capacity),
            rng: Xoshiro256StarStar::from_entropy(),
        }
    }

    /// Cuts `subtree` into the values satisfying `goes_left` and the rest. `goes_left` must hold
    /// for a prefix of the in-order sequence.
    fn split(&mut self, subtree: Option<Handle>, goes_left: &impl Fn(&T) -> bool) -> (Option<Handle>, Option<Handle>) {
        let Some(handle) = subtree else { return (None, None) };
        if goes_left(self.raw.value(handle)) {
            let (left, right) = self.split(self.raw.right(handle), goes_left);
            self.raw.set_child(handle, Dir::Right, left);
            self.raw.pull(handle);
            (Some(handle), right)
        } else {
            let (left, right) = self.split(self.raw.left(handle), goes_left);
            self.raw.set_child(handle, Dir::Left, right);
            self.raw.pull(handle);
            (left, Some(handle))
        }
    }

    /// Joins two treaps where every value of `left` is at most every value of `right`.
    fn merge(&mut self, left: Option<Handle>, right: Option<Handle>) -> Option<Handle> {
        let (Some(low), Some(high)) = (left, right) else {
            return left.or(right);
        };
        if self.raw.node(low).priority < self.raw.node(high).priority {
            let joined = self.merge(self.raw.right(low), Some(high));
            self.raw.set_child(low, Dir::Right, joined);
            self.raw.pull(low);
            Some(low)
        } else {
            let joined = self.merge(Some(low), self.raw.left(high));
            self.raw.set_child(high, Dir::Left, joined);
            self.raw.pull(high);
            Some(high)
        }
    }

    fn extreme(&self, subtree: Option<Handle>, dir: Dir) -> Option<Handle> {
        let mut current = subtree?;
        while let Some(next) = self.raw.child(current, dir) {
            current = next;
        }
        Some(current)
    }

    /// Adds one occurrence of `value` after its equal peers.
    pub fn insert(&mut self, value: T) {
        let (left, right) = self.split(self.raw.root(), &|candidate| *candidate <= value);
        let priority = self.rng.next_u32();
        let leaf = self.raw.alloc(TreapNode::leaf(value, priority));
        let left = self.merge(left, Some(leaf));
        let root = self.merge(left, right);
        self.raw.set_root(root);
    }

    /// Removes one occurrence of `value`. Does nothing if `value` is absent.
    pub fn delete(&mut self, value: &T) {
        let (left, right) = self.split(self.raw.root(), &|candidate| candidate <= value);
        let (left, band) = self.split(left, &|candidate| candidate < value);
        // `band` holds every copy of `value`; dropping its root removes exactly one.
        let band = band.and_then(|top| {
            let (low, high) = (self.raw.left(top), self.raw.right(top));
            self.raw.take(top);
            self.merge(low, high)
        });
        let left = self.merge(left, band);
        let root = self.merge(left, right);
        self.raw.set_root(root);
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
    pub fn rank(&mut self, value: &T) -> usize {
        let (left, right) = self.split(self.raw.root(), &|candidate| candidate < value);
        let rank = self.raw.size(left) + 1;
        let root = self.merge(left, right);
        self.raw.set_root(root);
        rank
    }

    /// Returns the largest stored value strictly smaller than `value`.
    ///
    /// # Errors
    ///
    /// [`Error::NoPredecessor`] if there is none.
    pub fn predecessor(&mut self, value: &T) -> Result<&T, Error> {
        let (left, right) = self.split(self.raw.root(), &|candidate| candidate < value);
        let found = self.extreme(left, Dir::Right);
        let root = self.merge(left, right);
        self.raw.set_root(root);
        found.map(|handle| self.raw.value(handle)).ok_or(Error::NoPredecessor)
    }

    /// Returns the smallest stored value strictly greater than `value`.
    ///
    /// # Errors
    ///
    /// [`Error::NoSuccessor`] if there is none.
    pub fn successor(&mut self, value: &T) -> Result<&T, Error> {
        let (left, right) = self.split(self.raw.root(), &|candidate| candidate <= value);
        let found = self.extreme(right, Dir::Left);
        let root = self.merge(left, right);
        self.raw.set_root(root);
        found.map(|handle| self.raw.value(handle)).ok_or(Error::NoSuccessor)
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

impl<T: Ord> OrderStatistic<T> for FhqTreap<T> {
    fn insert(&mut self, value: T) {
        FhqTreap::insert(self, value);
    }

    fn delete(&mut self, value: &T) {
        FhqTreap::delete(self, value);
    }

    fn contains(&mut self, value: &T) -> bool {
        FhqTreap::contains(self, value)
    }

    fn len(&self) -> usize {
        FhqTreap::len(self)
    }

    fn clear(&mut self) {
        FhqTreap::clear(self);
    }

    fn kth(&mut self, k: usize) -> Result<&T, Error> {
        FhqTreap::kth(self, k)
    }

    fn rank(&mut self, value: &T) -> usize {
        FhqTreap::rank(self, value)
    }

    fn predecessor(&mut self, value: &T) -> Result<&T, Error> {
        FhqTreap::predecessor(self, value)
    }

    fn successor(&mut self, value: &T) -> Result<&T, Error> {
        FhqTreap::successor(self, value)
    }
}

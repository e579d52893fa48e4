use crate::Error;

/// The contract shared by every collection in this crate.
///
/// All queries take `&mut self` so that self-adjusting engines ([`SplayTree`](crate::SplayTree)
/// and [`FhqTreap`](crate::FhqTreap)) implement the trait on equal terms with the others.
/// The statically balanced engines also offer `&self` versions of the same queries as inherent
/// methods.
///
/// # Examples
///
/// ```
/// use order_stat_trees::{AvlTree, OrderStatistic, SplayTree};
///
/// fn median<T: Ord, O: OrderStatistic<T>>(tree: &mut O) -> Option<&T> {
///     let middle = tree.len().div_ceil(2);
///     tree.kth(middle).ok()
/// }
///
/// let mut avl: AvlTree<i32> = (1..=5).collect();
/// let mut splay: SplayTree<i32> = (1..=5).collect();
/// assert_eq!(median(&mut avl), Some(&3));
/// assert_eq!(median(&mut splay), Some(&3));
/// ```
pub trait OrderStatistic<T: Ord> {
    /// Adds one occurrence of `value`.
    fn insert(&mut self, value: T);

    /// Removes one occurrence of `value`; does nothing if it is absent.
    fn delete(&mut self, value: &T);

    /// Returns `true` if at least one occurrence of `value` is stored.
    fn contains(&mut self, value: &T) -> bool;

    /// Returns the number of stored values, duplicates included.
    fn len(&self) -> usize;

    /// Returns `true` if nothing is stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every value.
    fn clear(&mut self);

    /// Returns the `k`-th smallest value, 1-indexed.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfRange`] if `k == 0` or `k > len()`.
    fn kth(&mut self, k: usize) -> Result<&T, Error>;

    /// Returns the number of stored values strictly smaller than `value`, plus one.
    fn rank(&mut self, value: &T) -> usize;

    /// Returns the largest stored value strictly smaller than `value`.
    ///
    /// # Errors
    ///
    /// [`Error::NoPredecessor`] if there is none.
    fn predecessor(&mut self, value: &T) -> Result<&T, Error>;

    /// Returns the smallest stored value strictly greater than `value`.
    ///
    /// # Errors
    ///
    /// [`Error::NoSuccessor`] if there is none.
    fn successor(&mut self, value: &T) -> Result<&T, Error>;
}

/// Implements the surface every collection shares on top of its `raw: RawTree<$node<T>>`
/// field and its inherent `new`/`insert`.
macro_rules! collection_common {
    ($tree:ident, $node:ident) => {
        #[doc = concat!("An iterator over the values of a [`", stringify!($tree), "`] in ascending order.")]
        ///
        /// Duplicates are yielded once per stored occurrence.
        #[must_use = "iterators are lazy and do nothing unless consumed"]
        pub struct Iter<'a, T> {
            inner: $crate::raw::Iter<'a, $node<T>>,
        }

        impl<'a, T: Ord> Iterator for Iter<'a, T> {
            type Item = &'a T;

            #[inline]
            fn next(&mut self) -> Option<&'a T> {
                self.inner.next()
            }

            #[inline]
            fn size_hint(&self) -> (usize, Option<usize>) {
                self.inner.size_hint()
            }
        }

        impl<T: Ord> ExactSizeIterator for Iter<'_, T> {}

        impl<T: Ord> core::iter::FusedIterator for Iter<'_, T> {}

        impl<T> Clone for Iter<'_, T> {
            fn clone(&self) -> Self {
                Iter {
                    inner: self.inner.clone(),
                }
            }
        }

        impl<T: Ord> $tree<T> {
            /// Returns the number of stored values, duplicates included.
            ///
            /// # Complexity
            ///
            /// O(1)
            #[must_use]
            pub fn len(&self) -> usize {
                self.raw.len()
            }

            /// Returns `true` if nothing is stored.
            #[must_use]
            pub fn is_empty(&self) -> bool {
                self.raw.len() == 0
            }

            /// Removes every value, keeping the allocated node storage.
            pub fn clear(&mut self) {
                self.raw.clear();
            }

            /// Returns how many nodes fit before the node storage reallocates.
            #[must_use]
            pub fn capacity(&self) -> usize {
                self.raw.capacity()
            }

            /// Returns an in-order iterator over the stored values.
            ///
            /// Iteration never restructures the tree.
            pub fn iter(&self) -> Iter<'_, T> {
                Iter { inner: self.raw.iter() }
            }
        }

        impl<'a, T: Ord> IntoIterator for &'a $tree<T> {
            type Item = &'a T;
            type IntoIter = Iter<'a, T>;

            fn into_iter(self) -> Iter<'a, T> {
                self.iter()
            }
        }

        impl<T: Ord + core::fmt::Debug> core::fmt::Debug for $tree<T> {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.debug_list().entries(self.iter()).finish()
            }
        }

        impl<T: Ord> Default for $tree<T> {
            fn default() -> Self {
                Self::new()
            }
        }

        impl<T: Ord> Extend<T> for $tree<T> {
            fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
                for value in iter {
                    self.insert(value);
                }
            }
        }

        impl<T: Ord> FromIterator<T> for $tree<T> {
            fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
                let mut tree = Self::new();
                tree.extend(iter);
                tree
            }
        }
    };
}

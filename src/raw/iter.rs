use core::iter::FusedIterator;

use smallvec::SmallVec;

use super::link::{Dir, Handle};
use super::node::Node;
use super::raw_tree::RawTree;

/// In-order walk over a [`RawTree`], yielding each value once per live occurrence.
pub(crate) struct Iter<'a, N> {
    tree: &'a RawTree<N>,
    /// Ancestors whose value has not been yielded yet, deepest last.
    stack: SmallVec<[Handle; 32]>,
    /// Node currently being yielded and how many more times.
    current: Option<(Handle, usize)>,
    remaining: usize,
}

impl<'a, N: Node> Iter<'a, N> {
    pub(crate) fn new(tree: &'a RawTree<N>) -> Self {
        let mut iter = Self {
            tree,
            stack: SmallVec::new(),
            current: None,
            remaining: tree.len(),
        };
        iter.descend_left(tree.root());
        iter
    }

    fn descend_left(&mut self, mut subtree: Option<Handle>) {
        while let Some(handle) = subtree {
            self.stack.push(handle);
            subtree = self.tree.child(handle, Dir::Left);
        }
    }
}

impl<'a, N: Node> Iterator for Iter<'a, N> {
    type Item = &'a N::Value;

    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.tree;
        loop {
            if let Some((handle, repeats)) = self.current
                && repeats > 0
            {
                self.current = Some((handle, repeats - 1));
                self.remaining -= 1;
                return Some(tree.value(handle));
            }

            let handle = self.stack.pop()?;
            self.descend_left(tree.child(handle, Dir::Right));
            self.current = Some((handle, tree.node(handle).multiplicity()));
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<N: Node> ExactSizeIterator for Iter<'_, N> {}

impl<N: Node> FusedIterator for Iter<'_, N> {}

impl<N> Clone for Iter<'_, N> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree,
            stack: self.stack.clone(),
            current: self.current,
            remaining: self.remaining,
        }
    }
}

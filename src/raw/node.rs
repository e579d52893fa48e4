use super::arena::Arena;
use super::link::{Dir, Handle};

/// What every engine's node exposes to the shared traversals.
///
/// `size` counts the live values of the whole subtree, `multiplicity` the live values held by
/// the node itself. Engines store one value per node (multiplicity 1) except the splay tree,
/// which keeps a counter, and the scapegoat tree, whose lazily deleted nodes hold 0.
pub(crate) trait Node: Sized {
    type Value: Ord;

    /// Whether `parent` is maintained by [`set_parent`](Node::set_parent).
    const TRACKS_PARENT: bool = false;

    fn value(&self) -> &Self::Value;

    fn value_mut(&mut self) -> &mut Self::Value;

    fn child(&self, dir: Dir) -> Option<Handle>;

    fn set_child(&mut self, dir: Dir, child: Option<Handle>);

    fn size(&self) -> usize;

    #[inline]
    fn multiplicity(&self) -> usize {
        1
    }

    #[inline]
    fn parent(&self) -> Option<Handle> {
        None
    }

    #[inline]
    fn set_parent(&mut self, _parent: Option<Handle>) {}

    /// Recomputes the node's augmentation (size and any engine-specific field) from its
    /// children, which must already be up to date.
    fn pull(nodes: &mut Arena<Self>, handle: Handle);
}

/// Size of an optional subtree.
#[inline]
pub(crate) fn size_of<N: Node>(nodes: &Arena<N>, subtree: Option<Handle>) -> usize {
    subtree.map_or(0, |handle| nodes.get(handle).size())
}

/// Implements the child accessors for a node struct with `left` and `right` fields.
macro_rules! binary_links {
    () => {
        #[inline]
        fn child(&self, dir: $crate::raw::Dir) -> Option<$crate::raw::Handle> {
            match dir {
                $crate::raw::Dir::Left => self.left,
                $crate::raw::Dir::Right => self.right,
            }
        }

        #[inline]
        fn set_child(&mut self, dir: $crate::raw::Dir, child: Option<$crate::raw::Handle>) {
            match dir {
                $crate::raw::Dir::Left => self.left = child,
                $crate::raw::Dir::Right => self.right = child,
            }
        }
    };
}

pub(crate) use binary_links;

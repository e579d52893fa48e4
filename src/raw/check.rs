use alloc::vec::Vec;

use super::link::{Dir, Handle};
use super::node::Node;
use super::raw_tree::RawTree;
use crate::ViolatedInvariant;

impl<N: Node> RawTree<N> {
    /// Verifies the invariants every engine shares, then runs `local` on each node.
    ///
    /// Shared invariants: in-order values never decrease, every cached size equals the
    /// children's sizes plus the node's multiplicity, parent links (where tracked) point back
    /// at the linking node, and every allocated node is reachable from the root.
    ///
    /// The walk is iterative since self-adjusting engines may legitimately degenerate into a
    /// path.
    pub(crate) fn check_with(
        &self,
        mut local: impl FnMut(&Self, Handle) -> Result<(), ViolatedInvariant>,
    ) -> Result<(), ViolatedInvariant> {
        let allocated = self.node_count();
        let mut reachable = 0;
        let mut pending: Vec<(Handle, Option<Handle>)> = self.root().map(|root| (root, None)).into_iter().collect();

        while let Some((handle, parent)) = pending.pop() {
            reachable += 1;
            if reachable > allocated {
                return Err(ViolatedInvariant::Leak { allocated, reachable });
            }

            let node = self.node(handle);
            if N::TRACKS_PARENT && node.parent() != parent {
                return Err(ViolatedInvariant::Parent);
            }

            let left = node.child(Dir::Left);
            let right = node.child(Dir::Right);
            let expected = self.size(left) + self.size(right) + node.multiplicity();
            if node.size() != expected {
                return Err(ViolatedInvariant::Size {
                    expected,
                    found: node.size(),
                });
            }

            local(self, handle)?;

            pending.extend(left.map(|child| (child, Some(handle))));
            pending.extend(right.map(|child| (child, Some(handle))));
        }

        if reachable != allocated {
            return Err(ViolatedInvariant::Leak { allocated, reachable });
        }
        self.check_order()
    }

    /// In-order walk over every node, dead ones included.
    fn check_order(&self) -> Result<(), ViolatedInvariant> {
        let mut stack: Vec<Handle> = Vec::new();
        let mut previous: Option<Handle> = None;
        let mut current = self.root();

        loop {
            while let Some(handle) = current {
                stack.push(handle);
                current = self.left(handle);
            }
            let Some(handle) = stack.pop() else {
                return Ok(());
            };

            if let Some(previous) = previous
                && self.value(previous) > self.value(handle)
            {
                return Err(ViolatedInvariant::Order);
            }
            previous = Some(handle);
            current = self.right(handle);
        }
    }
}

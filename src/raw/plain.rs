//! A bare node with a multiplicity counter, used to exercise the raw tree by hand.

use super::arena::Arena;
use super::link::Handle;
use super::node::{Node, binary_links, size_of};

pub(crate) struct Plain {
    pub(crate) value: i32,
    pub(crate) count: usize,
    pub(crate) left: Option<Handle>,
    pub(crate) right: Option<Handle>,
    pub(crate) size: usize,
}

impl Plain {
    pub(crate) fn new(value: i32, count: usize) -> Self {
        Self {
            value,
            count,
            left: None,
            right: None,
            size: count,
        }
    }
}

impl Node for Plain {
    type Value = i32;

    fn value(&self) -> &i32 {
        &self.value
    }

    fn value_mut(&mut self) -> &mut i32 {
        &mut self.value
    }

    binary_links!();

    fn size(&self) -> usize {
        self.size
    }

    fn multiplicity(&self) -> usize {
        self.count
    }

    fn pull(nodes: &mut Arena<Self>, handle: Handle) {
        let node = nodes.get(handle);
        let size = size_of(nodes, node.left) + size_of(nodes, node.right) + node.count;
        nodes.get_mut(handle).size = size;
    }
}

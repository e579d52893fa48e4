mod arena;
mod check;
mod iter;
mod link;
mod node;
mod raw_tree;

#[cfg(test)]
pub(crate) mod plain;

pub(crate) use arena::Arena;
pub(crate) use iter::Iter;
pub(crate) use link::{Dir, Handle, Slot};
pub(crate) use node::{Node, binary_links, size_of};
pub(crate) use raw_tree::RawTree;

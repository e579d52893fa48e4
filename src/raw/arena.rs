use alloc::vec::Vec;

use super::link::Handle;

/// One cell of an [`Arena`].
#[derive(Clone)]
enum Entry<T> {
    Occupied(T),
    /// A freed cell, linking to the next freed one.
    Vacant(Option<Handle>),
}

/// Node storage addressed by [`Handle`].
///
/// Freed cells form an intrusive stack threaded through the vacant entries, so a tree that
/// alternates inserts and deletes reuses the same cells instead of growing.
#[derive(Clone)]
pub(crate) struct Arena<T> {
    entries: Vec<Entry<T>>,
    /// Most recently freed cell.
    vacant: Option<Handle>,
    occupied: usize,
}

impl<T> Arena<T> {
    pub(crate) const fn new() -> Self {
        Self {
            entries: Vec::new(),
            vacant: None,
            occupied: 0,
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            vacant: None,
            occupied: 0,
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.entries.capacity()
    }

    /// Number of occupied cells.
    pub(crate) const fn len(&self) -> usize {
        self.occupied
    }

    pub(crate) fn alloc(&mut self, node: T) -> Handle {
        self.occupied += 1;
        if let Some(handle) = self.vacant {
            let entry = &mut self.entries[handle.to_index()];
            let Entry::Vacant(next) = *entry else {
                unreachable!("`Arena::alloc()` - free list points at an occupied cell!");
            };
            self.vacant = next;
            *entry = Entry::Occupied(node);
            return handle;
        }

        assert!(
            self.entries.len() <= Handle::MAX,
            "`Arena::alloc()` - arena is at maximum capacity ({})",
            Handle::MAX + 1
        );
        let handle = Handle::from_index(self.entries.len());
        self.entries.push(Entry::Occupied(node));
        handle
    }

    #[inline]
    pub(crate) fn get(&self, handle: Handle) -> &T {
        match &self.entries[handle.to_index()] {
            Entry::Occupied(node) => node,
            Entry::Vacant(_) => panic!("`Arena::get()` - `handle` is invalid!"),
        }
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, handle: Handle) -> &mut T {
        match &mut self.entries[handle.to_index()] {
            Entry::Occupied(node) => node,
            Entry::Vacant(_) => panic!("`Arena::get_mut()` - `handle` is invalid!"),
        }
    }

    /// Moves the node out and pushes its cell onto the free stack.
    pub(crate) fn take(&mut self, handle: Handle) -> T {
        let freed = Entry::Vacant(self.vacant);
        match core::mem::replace(&mut self.entries[handle.to_index()], freed) {
            Entry::Occupied(node) => {
                self.vacant = Some(handle);
                self.occupied -= 1;
                node
            }
            Entry::Vacant(next) => {
                self.entries[handle.to_index()] = Entry::Vacant(next);
                panic!("`Arena::take()` - `handle` is invalid!");
            }
        }
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
        self.vacant = None;
        self.occupied = 0;
    }
}

use core::num::NonZero;

#[cfg(test)]
type RawHandle = u16;
#[cfg(not(test))]
type RawHandle = u32;

/// Index of a node slot in an [`Arena`](super::Arena).
///
/// Stored off by one in a `NonZero` so that `Option<Handle>` (an absent child) costs nothing.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(transparent)]
pub(crate) struct Handle(NonZero<RawHandle>);

impl Handle {
    pub(crate) const MAX: usize = (RawHandle::MAX - 1) as usize;

    #[inline]
    pub(crate) const fn from_index(index: usize) -> Self {
        assert!(index <= Self::MAX, "`Handle::from_index()` - `index` > `Handle::MAX`!");
        #[allow(clippy::cast_possible_truncation)]
        let raw = (index + 1) as RawHandle;
        match NonZero::new(raw) {
            Some(raw) => Self(raw),
            None => unreachable!(),
        }
    }

    #[inline]
    pub(crate) const fn to_index(self) -> usize {
        (self.0.get() - 1) as usize
    }
}

/// Which child link of a node.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Dir {
    Left,
    Right,
}

impl Dir {
    /// The direction a search for a value moves in after comparing it with a node:
    /// right when `greater` holds.
    #[inline]
    pub(crate) const fn right_if(greater: bool) -> Self {
        if greater { Dir::Right } else { Dir::Left }
    }

    #[inline]
    pub(crate) const fn flip(self) -> Self {
        match self {
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }
}

/// The place a subtree hangs from: the tree's root pointer or a parent's child link.
///
/// Engines that restructure above the node they are looking at (rotations reattaching a new
/// subtree root) record the slot first and write the new subtree into it afterwards.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Slot {
    Root,
    Child(Handle, Dir),
}

impl Slot {
    /// The slot on side `dir` of `parent`, where a missing parent stands for the root.
    #[inline]
    pub(crate) const fn at(parent: Option<Handle>, dir: Dir) -> Self {
        match parent {
            Some(parent) => Slot::Child(parent, dir),
            None => Slot::Root,
        }
    }
}

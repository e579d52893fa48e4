//! Order-statistic binary search trees for Rust.
//!
//! This crate provides seven ordered multiset collections that share one contract: logarithmic
//! insert, delete and membership, plus order-statistic queries over the stored values.
//!
//! - [`kth`](OrderStatistic::kth) - The k-th smallest value (1-indexed)
//! - [`rank`](OrderStatistic::rank) - The number of stored values strictly smaller than a value, plus one
//! - [`predecessor`](OrderStatistic::predecessor) / [`successor`](OrderStatistic::successor) -
//!   The nearest stored value strictly below / above a value
//!
//! Every collection augments its nodes with the subtree size and differs only in how it keeps
//! the tree shallow:
//!
//! | Collection | Balancing discipline |
//! |---|---|
//! | [`AvlTree`] | height balance, single and double rotations |
//! | [`RedBlackTree`] | color balance, single-pass top-down insertion and deletion |
//! | [`SplayTree`] | amortized move-to-root on every access |
//! | [`Treap`] | random priorities, rotation-based repair |
//! | [`FhqTreap`] | random priorities, split and merge only |
//! | [`ScapegoatTree`] | weight balance with lazy deletion and partial rebuilding |
//! | [`AaTree`] | level balance via skew and split |
//!
//! # Example
//!
//! ```
//! use order_stat_trees::{Error, OrderStatistic, RedBlackTree};
//!
//! let mut tree = RedBlackTree::new();
//! for value in [5, 3, 8, 1, 4] {
//!     tree.insert(value);
//! }
//!
//! assert_eq!(tree.kth(2), Ok(&3));
//! assert_eq!(tree.rank(&4), 3);
//! assert_eq!(tree.predecessor(&4), Ok(&3));
//! assert_eq!(tree.successor(&8), Err(Error::NoSuccessor));
//! ```
//!
//! # Duplicates
//!
//! All collections are multisets. [`SplayTree`] keeps a multiplicity counter per node; every
//! other engine stores one node per inserted value.
//!
//! # Read access on self-adjusting trees
//!
//! [`SplayTree`] restructures itself on every query, including `contains` and `rank`, so all of
//! its queries take `&mut self`. [`FhqTreap`] answers `rank`, `predecessor` and `successor` by
//! splitting and re-merging, which also needs `&mut self`. A concurrent wrapper around either
//! must treat those queries as writes.
//!
//! # Implementation
//!
//! Nodes live in a slot arena and link to each other by compact handles, so rotations are
//! handle swaps and no node is ever shared or aliased.

#![no_std]
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

#[macro_use]
mod macros;

mod error;
mod order_statistic;
mod raw;

pub mod aa;
pub mod avl;
pub mod fhq_treap;
pub mod red_black;
pub mod scapegoat;
pub mod splay;
pub mod treap;

pub use aa::AaTree;
pub use avl::AvlTree;
pub use error::{Error, ViolatedInvariant};
pub use fhq_treap::FhqTreap;
pub use order_statistic::OrderStatistic;
pub use red_black::RedBlackTree;
pub use scapegoat::ScapegoatTree;
pub use splay::SplayTree;
pub use treap::Treap;

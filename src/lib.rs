//! An AVL ordered set threaded with a sorted, doubly-linked chain.
//!
//! [`AvlTree`] keeps its keys in a height-balanced binary search tree and, in
//! parallel, links every node to its in-order neighbours. The chain is anchored
//! by two permanent, key-less sentinels, so that:
//!
//! - the minimum and maximum are read in O(1) ([`front`](AvlTree::front),
//!   [`back`](AvlTree::back)),
//! - iteration in either direction costs O(1) per step without walking back
//!   up the tree,
//! - a [`Cursor`] always has somewhere to stand, even one before the first or
//!   one past the last key.
//!
//! # Example
//!
//! ```
//! use threaded_avl::AvlTree;
//!
//! let mut tree = AvlTree::new();
//! for key in [5, 3, 8, 1, 4, 7, 9] {
//!     assert!(tree.insert(key));
//! }
//! assert!(!tree.insert(4)); // duplicates are rejected
//!
//! assert_eq!(tree.front(), Ok(&1));
//! assert_eq!(tree.back(), Ok(&9));
//! assert_eq!(tree.height(), Some(2));
//!
//! // Walk forward with a cursor until it parks on the back sentinel.
//! let mut cursor = tree.begin();
//! let mut seen = Vec::new();
//! while cursor != tree.end() {
//!     seen.push(*cursor.get().unwrap());
//!     cursor.move_next();
//! }
//! assert_eq!(seen, [1, 3, 4, 5, 7, 8, 9]);
//!
//! assert!(tree.erase(&5));
//! assert_eq!(tree.iter().rev().copied().collect::<Vec<_>>(), [9, 8, 7, 4, 3, 1]);
//! ```
//!
//! # Implementation
//!
//! Nodes live in an arena and refer to each other by handle. The tree links
//! (`left`/`right`) own their subtrees and are reshaped by rotations; the chain
//! links (`prev`/`next`) own nothing and only change when a key is spliced in or
//! unlinked, so rebalancing never disturbs iteration order.

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

mod error;
mod raw;

pub mod avl_tree;

pub use avl_tree::{AvlTree, Cursor};
pub use error::Underflow;

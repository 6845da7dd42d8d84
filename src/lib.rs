//! A self-balancing ordered binary search tree for Rust.
//!
//! This crate provides [`OrderedTree`], an AVL tree storing unique values with
//! O(log n) insertion, lookup, and removal, plus one-shot ordered snapshots:
//!
//! - [`insert`](OrderedTree::insert) - Add a value, rejecting duplicates
//! - [`get`](OrderedTree::get) / [`remove`](OrderedTree::remove) - Look up or
//!   delete by any borrowed form of the value
//! - [`collect_ascending`](OrderedTree::collect_ascending) /
//!   [`collect_descending`](OrderedTree::collect_descending) - Snapshot all
//!   values in order into a caller-provided buffer
//!
//! # Example
//!
//! ```
//! use ordered_tree::OrderedTree;
//!
//! let mut tree = OrderedTree::new();
//! tree.insert(5).unwrap();
//! tree.insert(3).unwrap();
//! tree.insert(8).unwrap();
//!
//! assert_eq!(tree.get(&3), Some(&3));
//! assert_eq!(tree.len(), 3);
//!
//! // A second insert of an equal value is rejected.
//! assert!(tree.insert(5).is_err());
//!
//! let mut snapshot = [0; 3];
//! let count = tree.collect_ascending(&mut snapshot);
//! assert_eq!(&snapshot[..count], &[3, 5, 8]);
//!
//! assert_eq!(tree.remove(&3), Some(3));
//! assert_eq!(tree.get(&3), None);
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library dependency
//! - **Height-balanced** - Canonical four-case AVL rotations keep the tree height
//!   within ~1.44·log2(n + 2) after every insert and remove
//! - **Arena-backed** - Nodes live in a slot arena addressed by compact handles;
//!   removal and teardown never walk an owning pointer graph
//!
//! # Implementation
//!
//! The tree is a classic node-per-value binary search tree with parent
//! back-references, stored in a contiguous arena. Mutating operations record
//! their descent path on an explicit stack and rebalance bottom-up on the
//! unwind. Subtree heights are recomputed rather than cached, trading
//! per-operation cost for simpler structural invariants.

#![no_std]
// These forbid rules and lint groups are meant to be very restrictive.
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

pub mod ordered_tree;

pub use error::DuplicateKeyError;
pub use ordered_tree::OrderedTree;

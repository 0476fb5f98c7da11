//! A sparse prefix tree (qp-trie) keyed by byte strings.
//!
//! This crate provides a [`Trie`], a map whose internal nodes branch on a
//! single key position and store only the children that are present. A
//! 257-bit presence bitmap (one bit per byte value plus one for "the key
//! ended here") and a popcount rank locate each child in a dense array.
//!
//! # Features
//!
//! - Lookups, inserts and removals in O(k) for keys of length k
//! - Any byte string is a key, including the empty one and keys that are
//!   prefixes of each other
//! - Iteration in ascending key order
//! - Depth-first and breadth-first walks over the raw tree for tooling that
//!   wants to inspect its shape
//!
//! The `serde` feature adds `Serialize` and `Deserialize` for [`Trie`].

mod as_bytes;
mod error;
mod iter;
mod node;
#[cfg(feature = "serde")]
mod serde_impl;
mod traversal;
mod trie;

pub use as_bytes::AsBytes;
pub use error::InvariantError;
pub use iter::{IntoIter, Iter, IterMut, Keys, Values, ValuesMut};
pub use node::{BRANCHING_FACTOR, Branch, Char, Leaf, Node};
pub use traversal::{SearchNode, Visit, breadth_first, depth_first};
pub use trie::Trie;

#[cfg(test)]
mod proptest_trie;

use crate::node::Char;

/// A broken structural invariant found by [`Trie::check_invariants`].
///
/// None of these can be produced through the public API; they exist to make
/// failures in tests and fuzzing readable.
///
/// [`Trie::check_invariants`]: crate::Trie::check_invariants
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum InvariantError {
    #[error("root is not a branch")]
    RootNotBranch,
    #[error("empty node stored below branch at index {parent_index}")]
    EmptyChild { parent_index: usize },
    #[error("branch at index {index} has {bits} presence bits but {children} children")]
    BitmapMismatch {
        index: usize,
        bits: usize,
        children: usize,
    },
    #[error("branch at index {index} has {children} children, expected at least 2")]
    UnderfullBranch { index: usize, children: usize },
    #[error("branch at index {child} sits below branch at index {parent}")]
    IndexNotIncreasing { parent: usize, child: usize },
    #[error("leaf {key:02X?} found under {found} at index {index}, expected {expected}")]
    MisplacedLeaf {
        key: Vec<u8>,
        index: usize,
        expected: Char,
        found: Char,
    },
    #[error("leaf {key:02X?} parts from {other:02X?} before index {index}")]
    DivergentLeaf {
        key: Vec<u8>,
        index: usize,
        other: Vec<u8>,
    },
    #[error("trie records {recorded} entries but holds {counted} leaves")]
    LengthMismatch { recorded: usize, counted: usize },
}

//! An ordered, directory-aware tree over slash-delimited paths.
//!
//! Archive formats, virtual filesystems, and asset browsers all need the
//! same structure: a namespace that maps paths like `DIR/SUB/NAME.EXT` to
//! some payload, browsable one level at a time. [`PathTree`] is that
//! structure, kept deliberately generic so it can hold archive entries,
//! file handles, or anything else path-keyed.
//!
//! ## Structure
//!
//! Every node stores one path *segment*. Directory segments keep their
//! trailing `/` (so `DIR/` and a file named `DIR` are distinct siblings),
//! and a node's full path is the concatenation of the segments from the
//! root down to it. Nodes live in a single arena owned by the tree and
//! reference each other by [`NodeId`]; parents hold their children as a
//! sorted list of ids, children hold a non-owning id back to their parent.
//!
//! ## Ordering
//!
//! Siblings are kept sorted at all times under one rule: directories
//! compare before files, and within the same kind the comparison is a
//! plain ordinal comparison of the segment text. Insertion and lookup
//! both binary search against this rule, so an insert is
//! `O(depth x log siblings)`.
//!
//! ## Mutation model
//!
//! The tree is append-only: nodes are created on demand by [`PathTree::insert`]
//! and never removed. Inserts require `&mut` and are not synchronized;
//! build the tree on one thread, then share it freely for reads.

pub mod tree;

pub use tree::{NodeId, PathNode, PathTree};

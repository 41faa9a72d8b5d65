//! This crate provides one Binary Search Tree (BST) engine with pluggable
//! balancing strategies.
//!
//! ## Binary Search Tree
//!
//! A Binary Search Tree is a data structure supporting operations to
//! insert, find, and delete stored records. The most important invariants of
//! a BST are:
//!
//! 1. For every node in a BST, all the nodes in its left subtree hold a
//!    payload less than its own.
//! 2. For every node in a BST, all the nodes in its right subtree hold a
//!    payload greater than its own.
//!
//! Searching takes `O(height)`, so how the tree is kept short matters. The
//! engine in [`tree`] does every insert, removal and rotation itself, and
//! asks a [`Balance`] strategy after each change whether to rotate:
//!
//! - [`Unbalanced`]: never. Sorted input degenerates into a list.
//! - [`Avl`]: sibling subtree heights differ by at most a configurable amount.
//! - [`RedBlack`]: the red-black tree, tracked as levels instead of colours.
//! - [`WeightBalanced`]: the lighter child of every node carries a minimum share
//!   of its subtree's nodes.
//!
//! ## Nodes and payloads
//!
//! Nodes live in an arena ([`Nodes`]) and are named by [`NodeId`]s. A node id
//! stays valid, and keeps naming the same payload, until that node itself is
//! removed, even while rotations and removals elsewhere reshape the tree.
//!
//! The engine never compares payloads itself. Every search takes a closure
//! reporting where the target lies relative to a payload, so one engine
//! backs sets, maps and anything else ordered by part of its payload.
//!
//! ```
//! use bbst::{RedBlackTree, Side};
//!
//! // A map from name to age, ordered by name.
//! let mut ages = RedBlackTree::new();
//! for (name, age) in [("bea", 31), ("al", 45), ("cy", 27)] {
//!     ages.insert(|entry: &(&str, u32)| name.cmp(entry.0), (name, age));
//! }
//!
//! let al = ages.get(|entry| "al".cmp(entry.0)).unwrap();
//! assert_eq!(ages.payload(al), Some(&("al", 45)));
//!
//! ages.remove(|entry| "bea".cmp(entry.0), Side::Left);
//! let names: Vec<_> = ages.iter().map(|(name, _)| *name).collect();
//! assert_eq!(names, ["al", "cy"]);
//! ```

#![deny(missing_docs, clippy::clone_on_ref_ptr)]

pub mod arena;
pub mod avl;
pub mod balance;
pub mod error;
pub mod iter;
pub mod red_black;
pub mod side;
pub mod tree;
pub mod weight_balanced;


pub use arena::{Node, NodeId, Nodes};
pub use avl::Avl;
pub use balance::{Balance, Unbalanced};
pub use error::{Result, TreeError};
pub use iter::{Cursor, Iter, LevelOrder, Range, Walk};
pub use red_black::RedBlack;
pub use side::Side;
pub use tree::{BinarySearchTree, Factory, FixAggregate, FixRotation, Inserted};
pub use weight_balanced::{Ratio, WeightBalanced};

/// A tree balanced by [`Avl`].
pub type AvlTree<T> = BinarySearchTree<T, Avl>;

/// A tree balanced by [`RedBlack`].
pub type RedBlackTree<T> = BinarySearchTree<T, RedBlack>;

/// A tree balanced by [`WeightBalanced`].
pub type BbTree<T> = BinarySearchTree<T, WeightBalanced>;

//! The seam between the tree engine and its balancing strategies.
//!
//! The engine owns all pointer surgery: attaching and unlinking nodes, the single rotation
//! primitive, and promoting a successor during removal. A strategy only stores its per-node state
//! and decides *when* and *where* to rotate.

use std::fmt::Debug;

use crate::arena::{NodeId, Nodes};
use crate::error::Result;
use crate::side::Side;
use crate::tree::BinarySearchTree;

/// A balancing strategy.
pub trait Balance: Sized + Debug {
    /// Per-node state, e.g. a height or a subtree weight.
    type Meta: Copy + Debug;

    /// State of a freshly inserted leaf.
    fn new_meta(&self) -> Self::Meta;

    /// Patches per-node state after [`BinarySearchTree::rotate`] moved `child`, the old parent,
    /// below `parent`. Everything above `parent` is unaffected by a rotation.
    fn rotated<T>(&self, nodes: &mut Nodes<T, Self::Meta>, child: NodeId, parent: NodeId) {
        let _ = (nodes, child, parent);
    }

    /// Hands the state of `removed` to `successor`, which is about to take over its position.
    ///
    /// The two nodes trade places, so trading their states keeps every position's state intact.
    fn designate<T>(&self, nodes: &mut Nodes<T, Self::Meta>, removed: NodeId, successor: NodeId) {
        let removed_meta = *nodes[removed].meta();
        *nodes[removed].meta_mut() = *nodes[successor].meta();
        *nodes[successor].meta_mut() = removed_meta;
    }

    /// Restores the balance invariant after the subtree on `side` of `node` gained or lost a
    /// node. Works bottom-up from `node`.
    fn fix<T>(tree: &mut BinarySearchTree<T, Self>, node: NodeId, side: Side);

    /// Checks this strategy's invariant locally at `id`.
    fn check<T>(&self, nodes: &Nodes<T, Self::Meta>, id: NodeId) -> Result<()>;
}

/// No balancing at all: the plain binary search tree.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Unbalanced;

impl Balance for Unbalanced {
    type Meta = ();

    fn new_meta(&self) -> Self::Meta {}

    fn fix<T>(_tree: &mut BinarySearchTree<T, Self>, _node: NodeId, _side: Side) {}

    fn check<T>(&self, _nodes: &Nodes<T, ()>, _id: NodeId) -> Result<()> {
        Ok(())
    }
}

//! Arena storage for tree nodes.
//!
//! Nodes never point at each other directly. A node's parent and children are [`NodeId`]s into
//! the [`Nodes`] arena that owns every node of one tree. Slots freed by removal are recycled;
//! each removal bumps the slot's generation, so an id that outlived its node is recognised as
//! stale instead of silently naming whatever node took the slot over.

use std::fmt;
use std::ops::{Index, IndexMut};

use slab::Slab;

use crate::side::Side;

/// Handle to a node in a [`Nodes`] arena.
///
/// Ids stay valid, and keep naming the same payload, for as long as the node is in its tree. That
/// includes rotations and the removal of *other* nodes.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    /// Position of the node's slot in the arena.
    pub const fn index(self) -> u32 {
        self.index
    }

    /// How many nodes had left the slot before this id was handed out.
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({}v{})", self.index, self.generation)
    }
}

/// A tree node: a payload, a parent link, two child links and the balancing strategy's
/// per-node state `M`.
#[derive(Debug)]
pub struct Node<T, M> {
    payload: T,
    parent: Option<NodeId>,
    children: [Option<NodeId>; 2],
    meta: M,
}

impl<T, M> Node<T, M> {
    pub(crate) fn new(payload: T, meta: M) -> Self {
        Self {
            payload,
            parent: None,
            children: [None, None],
            meta,
        }
    }

    /// The stored value.
    pub fn payload(&self) -> &T {
        &self.payload
    }

    /// The stored value, mutably. Changing whatever the tree is ordered by breaks the tree.
    pub fn payload_mut(&mut self) -> &mut T {
        &mut self.payload
    }

    /// The parent, or `None` for the root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// The child on `side`.
    pub fn child(&self, side: Side) -> Option<NodeId> {
        self.children[side]
    }

    /// Both children, left first.
    pub fn children(&self) -> [Option<NodeId>; 2] {
        self.children
    }

    /// The balancing strategy's state for this node.
    pub fn meta(&self) -> &M {
        &self.meta
    }

    /// The balancing strategy's state for this node, mutably. Only strategies should write it.
    pub fn meta_mut(&mut self) -> &mut M {
        &mut self.meta
    }

    pub(crate) fn set_parent(&mut self, parent: Option<NodeId>) {
        self.parent = parent;
    }

    pub(crate) fn set_child(&mut self, side: Side, child: Option<NodeId>) {
        self.children[side] = child;
    }

    pub(crate) fn set_children(&mut self, children: [Option<NodeId>; 2]) {
        self.children = children;
    }

    pub(crate) fn into_payload(self) -> T {
        self.payload
    }
}

/// The arena owning every node of one tree.
///
/// Nodes sit in a [`Slab`]. The slab hands out vacant keys again, so every key also has a
/// generation that is bumped when its node is removed.
#[derive(Debug)]
pub struct Nodes<T, M> {
    slab: Slab<Node<T, M>>,
    generations: Vec<u32>,
}

impl<T, M> Default for Nodes<T, M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, M> Nodes<T, M> {
    /// An empty arena.
    pub const fn new() -> Self {
        Self {
            slab: Slab::new(),
            generations: Vec::new(),
        }
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.slab.len()
    }

    /// Whether there are no live nodes.
    pub fn is_empty(&self) -> bool {
        self.slab.is_empty()
    }

    fn is_current(&self, id: NodeId) -> bool {
        self.generations.get(id.index as usize) == Some(&id.generation)
    }

    /// The node named by `id`, or `None` if it was removed.
    pub fn get(&self, id: NodeId) -> Option<&Node<T, M>> {
        if !self.is_current(id) {
            return None;
        }
        self.slab.get(id.index as usize)
    }

    /// The node named by `id` mutably, or `None` if it was removed.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node<T, M>> {
        if !self.is_current(id) {
            return None;
        }
        self.slab.get_mut(id.index as usize)
    }

    /// Whether `id` names a live node.
    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    pub(crate) fn insert(&mut self, node: Node<T, M>) -> NodeId {
        let key = self.slab.insert(node);
        let index = u32::try_from(key).expect("arena exceeds u32::MAX nodes");
        if key == self.generations.len() {
            self.generations.push(0);
        }
        NodeId {
            index,
            generation: self.generations[key],
        }
    }

    pub(crate) fn remove(&mut self, id: NodeId) -> Node<T, M> {
        assert!(self.is_current(id), "stale {:?}", id);
        let key = id.index as usize;
        let node = self.slab.try_remove(key).expect("removing a vacant slot");
        self.generations[key] = self.generations[key].wrapping_add(1);
        node
    }

    pub(crate) fn clear(&mut self) {
        for (key, _) in self.slab.iter() {
            self.generations[key] = self.generations[key].wrapping_add(1);
        }
        // Keys are handed out from 0 again.
        self.slab.clear();
    }

    /// The parent of `id`.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self[id].parent
    }

    /// The child of `id` on `side`.
    pub fn child(&self, id: NodeId, side: Side) -> Option<NodeId> {
        self[id].children[side]
    }

    /// Whether `id` has no children.
    pub fn is_leaf(&self, id: NodeId) -> bool {
        self[id].children == [None, None]
    }

    /// Which side of its parent `id` hangs on, or `None` for the root.
    pub fn index(&self, id: NodeId) -> Option<Side> {
        self.parent(id).and_then(|parent| self.index_of(parent, id))
    }

    /// Which side of `id` the node `candidate` hangs on, or `None` if it is not a child of `id`.
    pub fn index_of(&self, id: NodeId, candidate: NodeId) -> Option<Side> {
        Side::BOTH
            .into_iter()
            .find(|&side| self.child(id, side) == Some(candidate))
    }

    /// The outermost node on `side` of the subtree rooted at `id`.
    pub fn extreme(&self, mut id: NodeId, side: Side) -> NodeId {
        while let Some(child) = self.child(id, side) {
            id = child;
        }
        id
    }

    /// The in-order neighbour of `id` in direction `side`: the successor for `Right`, the
    /// predecessor for `Left`. `None` once the end of the sequence is passed.
    pub fn next(&self, id: NodeId, side: Side) -> Option<NodeId> {
        if let Some(child) = self.child(id, side) {
            return Some(self.extreme(child, !side));
        }
        let mut id = id;
        while self.index(id) == Some(side) {
            id = self.parent(id)?;
        }
        self.parent(id)
    }
}

impl<T, M> Index<NodeId> for Nodes<T, M> {
    type Output = Node<T, M>;

    fn index(&self, id: NodeId) -> &Node<T, M> {
        self.get(id)
            .unwrap_or_else(|| panic!("{:?} is not in this tree", id))
    }
}

impl<T, M> IndexMut<NodeId> for Nodes<T, M> {
    fn index_mut(&mut self, id: NodeId) -> &mut Node<T, M> {
        self.get_mut(id)
            .unwrap_or_else(|| panic!("{:?} is not in this tree", id))
    }
}

//! The tree engine shared by every balancing strategy.
//!
//! The engine has no notion of a key. Every lookup takes a "choose subtree" closure that compares
//! the target against a node's payload: `Greater` descends right, `Less` descends left and `Equal`
//! is a hit. A set compares an element to the payload, a map compares a key to the payload's key,
//! and both run on the same engine.
//!
//! # Examples
//!
//! ```
//! use bbst::{AvlTree, Side};
//!
//! let mut tree = AvlTree::new();
//! for key in [5, 3, 8, 1, 4] {
//!     tree.insert(|entry: &i32| key.cmp(entry), key);
//! }
//!
//! assert_eq!(tree.size(), 5);
//! assert!(tree.get(|entry: &i32| 4.cmp(entry)).is_some());
//!
//! // Removing returns the payload.
//! assert_eq!(tree.remove(|entry: &i32| 3.cmp(entry), Side::Left), Some(3));
//! assert_eq!(tree.iter().copied().collect::<Vec<_>>(), [1, 4, 5, 8]);
//! ```

use std::cmp::Ordering;
use std::fmt;

use tracing::{debug, trace};

use crate::arena::{Node, NodeId, Nodes};
use crate::balance::{Balance, Unbalanced};
use crate::error::{Result, TreeError};
use crate::side::Side;

/// Recomputes a caller-maintained aggregate at a node. Returns `true` when nothing above the node
/// can be affected, which stops the upward walk.
pub type FixAggregate<T, M> = Box<dyn FnMut(&mut Nodes<T, M>, NodeId) -> bool>;

/// Called with the root of a subtree that a rotation or a removal moved to a new parent.
pub type FixRotation<T, M> = Box<dyn FnMut(&mut Nodes<T, M>, NodeId)>;

/// Builds a tree of strategy `B` from its two hooks. [`BinarySearchTree::with_hooks`] coerces to
/// this, so generic code can be handed a strategy without naming it.
pub type Factory<T, B> = fn(
    FixAggregate<T, <B as Balance>::Meta>,
    FixRotation<T, <B as Balance>::Meta>,
) -> BinarySearchTree<T, B>;

/// Outcome of [`BinarySearchTree::insert`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Inserted {
    /// The payload was stored in this new node.
    New(NodeId),
    /// An equal payload was already stored here. The tree is unchanged.
    Existing(NodeId),
}

impl Inserted {
    /// The node holding the payload, new or not.
    pub fn node(self) -> NodeId {
        match self {
            Inserted::New(id) | Inserted::Existing(id) => id,
        }
    }

    /// Whether a node was added.
    pub fn is_new(self) -> bool {
        matches!(self, Inserted::New(_))
    }
}

/// A binary search tree balanced by the strategy `B`.
pub struct BinarySearchTree<T, B: Balance = Unbalanced> {
    nodes: Nodes<T, B::Meta>,
    root: Option<NodeId>,
    size: usize,
    balance: B,
    fix_aggregate: FixAggregate<T, B::Meta>,
    fix_rotation: FixRotation<T, B::Meta>,
    /// Bumped whenever a node joins or leaves the tree.
    modifications: u64,
}

impl<T, B: Balance + Default> Default for BinarySearchTree<T, B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, B> fmt::Debug for BinarySearchTree<T, B>
where
    T: fmt::Debug,
    B: Balance,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BinarySearchTree")
            .field("balance", &self.balance)
            .field("size", &self.size)
            .field("items", &self.iter().collect::<Vec<_>>())
            .finish()
    }
}

impl<T, B: Balance> BinarySearchTree<T, B> {
    /// An empty tree with the strategy's default parameters and no aggregate hooks.
    pub fn new() -> Self
    where
        B: Default,
    {
        Self::with_balance(B::default())
    }

    /// An empty tree with explicit strategy parameters and no aggregate hooks.
    pub fn with_balance(balance: B) -> Self {
        Self::with_balance_and_hooks(balance, Box::new(|_, _| true), Box::new(|_, _| {}))
    }

    /// An empty tree with the strategy's default parameters and the given hooks.
    pub fn with_hooks(
        fix_aggregate: FixAggregate<T, B::Meta>,
        fix_rotation: FixRotation<T, B::Meta>,
    ) -> Self
    where
        B: Default,
    {
        Self::with_balance_and_hooks(B::default(), fix_aggregate, fix_rotation)
    }

    /// An empty tree with explicit strategy parameters and the given hooks.
    pub fn with_balance_and_hooks(
        balance: B,
        fix_aggregate: FixAggregate<T, B::Meta>,
        fix_rotation: FixRotation<T, B::Meta>,
    ) -> Self {
        debug!(?balance, "new tree");
        Self {
            nodes: Nodes::new(),
            root: None,
            size: 0,
            balance,
            fix_aggregate,
            fix_rotation,
            modifications: 0,
        }
    }

    /// The balancing strategy and its parameters.
    pub fn balance(&self) -> &B {
        &self.balance
    }

    /// Read access to every node.
    pub fn nodes(&self) -> &Nodes<T, B::Meta> {
        &self.nodes
    }

    /// Write access to payloads and strategy state. Links can only change through the tree.
    pub fn nodes_mut(&mut self) -> &mut Nodes<T, B::Meta> {
        &mut self.nodes
    }

    /// The root node.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Number of nodes in the tree.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Whether the tree has no nodes.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// The payload stored at `id`, if `id` is in this tree.
    pub fn payload(&self, id: NodeId) -> Option<&T> {
        self.nodes.get(id).map(Node::payload)
    }

    /// The payload stored at `id` mutably. Call [`refresh`](Self::refresh) afterwards if an
    /// aggregate depends on what changed.
    pub fn payload_mut(&mut self, id: NodeId) -> Option<&mut T> {
        self.nodes.get_mut(id).map(Node::payload_mut)
    }

    /// The smallest node.
    pub fn first(&self) -> Option<NodeId> {
        self.root.map(|root| self.nodes.extreme(root, Side::Left))
    }

    /// The largest node.
    pub fn last(&self) -> Option<NodeId> {
        self.root.map(|root| self.nodes.extreme(root, Side::Right))
    }

    /// Number of nodes on the longest root-to-leaf path.
    pub fn height(&self) -> usize {
        let mut stack: Vec<_> = self.root.map(|root| (root, 1)).into_iter().collect();
        let mut height = 0;
        while let Some((id, depth)) = stack.pop() {
            height = height.max(depth);
            stack.extend(
                self.nodes[id]
                    .children()
                    .into_iter()
                    .flatten()
                    .map(|child| (child, depth + 1)),
            );
        }
        height
    }

    pub(crate) fn modifications(&self) -> u64 {
        self.modifications
    }

    /// Descends from the root following `cmp` and returns the last node visited together with
    /// the last comparison. `Equal` means the node was found; otherwise the ordering names the
    /// side a new node would be attached on. `None` only for an empty tree.
    pub fn search<F>(&self, mut cmp: F) -> Option<(NodeId, Ordering)>
    where
        F: FnMut(&T) -> Ordering,
    {
        let mut id = self.root?;
        loop {
            let ordering = cmp(self.nodes[id].payload());
            match Side::of(ordering).and_then(|side| self.nodes.child(id, side)) {
                Some(child) => id = child,
                None => return Some((id, ordering)),
            }
        }
    }

    /// The node `cmp` reports as `Equal`.
    pub fn get<F>(&self, cmp: F) -> Option<NodeId>
    where
        F: FnMut(&T) -> Ordering,
    {
        self.search(cmp)
            .filter(|&(_, ordering)| ordering == Ordering::Equal)
            .map(|(id, _)| id)
    }

    /// Replaces the whole tree by a single node holding `payload`.
    pub fn init(&mut self, payload: T) -> NodeId {
        if !self.is_empty() {
            self.clear();
        }
        let id = self.nodes.insert(Node::new(payload, self.balance.new_meta()));
        self.root = Some(id);
        self.size = 1;
        self.modifications += 1;
        (self.fix_aggregate)(&mut self.nodes, id);
        id
    }

    /// Inserts `payload` where `cmp` leads, unless `cmp` finds an equal payload first. In that
    /// case the tree is left alone, `payload` is dropped and the existing node is returned.
    pub fn insert<F>(&mut self, cmp: F, payload: T) -> Inserted
    where
        F: FnMut(&T) -> Ordering,
    {
        let Some((parent, ordering)) = self.search(cmp) else {
            return Inserted::New(self.init(payload));
        };
        let Some(side) = Side::of(ordering) else {
            return Inserted::Existing(parent);
        };

        let mut node = Node::new(payload, self.balance.new_meta());
        node.set_parent(Some(parent));
        let id = self.nodes.insert(node);
        self.nodes[parent].set_child(side, Some(id));
        self.size += 1;
        self.modifications += 1;
        trace!(?id, ?parent, ?side, "attached");

        (self.fix_aggregate)(&mut self.nodes, id);
        self.propagate_aggregate(parent, None);
        B::fix(self, parent, side);
        Inserted::New(id)
    }

    /// Removes the node `cmp` reports as `Equal` and returns its payload.
    ///
    /// If the node has two children, its in-order neighbour on side `hint` takes its place.
    pub fn remove<F>(&mut self, cmp: F, hint: Side) -> Option<T>
    where
        F: FnMut(&T) -> Ordering,
    {
        let id = self.get(cmp)?;
        self.remove_node(id, hint)
    }

    /// Removes the node `id` and returns its payload, or `None` if `id` is not in this tree.
    ///
    /// Every other [`NodeId`] keeps naming the same payload afterwards. A node with two children
    /// is replaced by its in-order neighbour on side `hint` (the other side if `hint` is empty),
    /// and that neighbour moves into the vacated position as a node rather than by copying its
    /// payload. The rotation hook sees every subtree that ends up below a new parent.
    pub fn remove_node(&mut self, id: NodeId, hint: Side) -> Option<T> {
        let children = self.nodes.get(id)?.children();
        let hint = if children[hint].is_some() { hint } else { !hint };
        let successor = match children {
            [Some(_), Some(_)] => {
                let successor = self
                    .nodes
                    .next(id, hint)
                    .expect("a node with two children has neighbours on both sides");
                self.promote(id, successor);
                Some(successor)
            }
            _ => None,
        };

        // `id` has at most one child now; splice it out.
        let parent = self.nodes.parent(id);
        let side = self.nodes.index(id);
        let [left, right] = self.nodes[id].children();
        let child = left.or(right);
        if let Some(child) = child {
            self.nodes[child].set_parent(parent);
        }
        match (parent, side) {
            (Some(parent), Some(side)) => self.nodes[parent].set_child(side, child),
            _ => self.root = child,
        }
        let payload = self.nodes.remove(id).into_payload();
        self.size -= 1;
        self.modifications += 1;
        trace!(?id, ?successor, "unlinked");
        if let Some(child) = child {
            (self.fix_rotation)(&mut self.nodes, child);
        }

        if let (Some(parent), Some(side)) = (parent, side) {
            self.propagate_aggregate(parent, successor);
            B::fix(self, parent, side);
        }
        Some(payload)
    }

    /// Removes every node.
    pub fn clear(&mut self) {
        debug!(size = self.size, "clearing tree");
        self.nodes.clear();
        self.root = None;
        self.size = 0;
        self.modifications += 1;
    }

    /// Rotates `id` into its parent's position and returns `id`.
    ///
    /// The parent becomes the child of `id` on the side facing away from where `id` hung, and the
    /// subtree of `id` on that side moves over to the parent. In-order sequence is unchanged. The
    /// strategy patches its state, then the rotation hook sees the moved subtree and the
    /// aggregate hook recomputes the old parent followed by `id`.
    ///
    /// # Panics
    ///
    /// When `id` is the root.
    ///
    /// # Diagram
    ///
    /// ```text
    ///        parent               id
    ///        /    \              /  \
    ///      id      z   rotate   x   parent
    ///     /  \          ->           /  \
    ///    x   moved                moved  z
    /// ```
    pub fn rotate(&mut self, id: NodeId) -> NodeId {
        let parent = self.nodes.parent(id).expect("cannot rotate the root");
        let side = self
            .nodes
            .index_of(parent, id)
            .expect("a parent links to its children");

        let moved = self.nodes.child(id, !side);
        self.nodes[parent].set_child(side, moved);
        if let Some(moved) = moved {
            self.nodes[moved].set_parent(Some(parent));
        }

        let grandparent = self.nodes.parent(parent);
        match grandparent {
            Some(grandparent) => {
                let parent_side = self
                    .nodes
                    .index_of(grandparent, parent)
                    .expect("a parent links to its children");
                self.nodes[grandparent].set_child(parent_side, Some(id));
            }
            None => self.root = Some(id),
        }
        self.nodes[id].set_parent(grandparent);
        self.nodes[id].set_child(!side, Some(parent));
        self.nodes[parent].set_parent(Some(id));
        trace!(?id, ?parent, "rotated");

        self.balance.rotated(&mut self.nodes, parent, id);
        if let Some(moved) = moved {
            (self.fix_rotation)(&mut self.nodes, moved);
        }
        (self.fix_aggregate)(&mut self.nodes, parent);
        (self.fix_aggregate)(&mut self.nodes, id);
        id
    }

    /// Re-runs the aggregate hook from `id` upwards, e.g. after changing a payload through
    /// [`payload_mut`](Self::payload_mut). Returns `false` if `id` is not in this tree.
    pub fn refresh(&mut self, id: NodeId) -> bool {
        if !self.nodes.contains(id) {
            return false;
        }
        self.propagate_aggregate(id, None);
        true
    }

    /// Walks the whole tree checking parent links, the node count and the strategy's invariant.
    pub fn check_invariants(&self) -> Result<()> {
        let Some(root) = self.root else {
            debug_assert_eq!(self.size, 0);
            return Ok(());
        };
        if let Some(parent) = self.nodes.parent(root) {
            return Err(TreeError::violation(
                root,
                format!("root has parent {:?}", parent),
            ));
        }

        let mut stack = vec![root];
        let mut count = 0;
        while let Some(id) = stack.pop() {
            count += 1;
            for child in self.nodes[id].children().into_iter().flatten() {
                if self.nodes.parent(child) != Some(id) {
                    return Err(TreeError::violation(
                        child,
                        format!("parent link does not lead back to {:?}", id),
                    ));
                }
                stack.push(child);
            }
            self.balance.check(&self.nodes, id)?;
        }

        if count != self.size {
            return Err(TreeError::violation(
                root,
                format!("{} nodes reachable but size is {}", count, self.size),
            ));
        }
        Ok(())
    }

    /// Trades the positions of `removed` and its in-order neighbour `successor`, which lies in
    /// the subtree of `removed`. Both keep their payloads; their links and strategy states swap.
    fn promote(&mut self, removed: NodeId, successor: NodeId) {
        self.balance.designate(&mut self.nodes, removed, successor);

        let removed_side = self.nodes.index(removed);
        let successor_side = self.nodes.index(successor);
        let (removed_parent, removed_children) =
            (self.nodes.parent(removed), self.nodes[removed].children());
        let (successor_parent, successor_children) =
            (self.nodes.parent(successor), self.nodes[successor].children());

        // Links between the two nodes have to point the other way round afterwards.
        let swap = |link: Option<NodeId>| match link {
            Some(id) if id == removed => Some(successor),
            Some(id) if id == successor => Some(removed),
            other => other,
        };
        self.nodes[removed].set_parent(swap(successor_parent));
        self.nodes[removed].set_children(successor_children.map(swap));
        self.nodes[successor].set_parent(swap(removed_parent));
        self.nodes[successor].set_children(removed_children.map(swap));

        for (id, side) in [(removed, successor_side), (successor, removed_side)] {
            for child in self.nodes[id].children().into_iter().flatten() {
                self.nodes[child].set_parent(Some(id));
            }
            match self.nodes.parent(id) {
                None => self.root = Some(id),
                Some(parent) if parent == removed || parent == successor => {}
                Some(parent) => {
                    let side = side.expect("a node with a parent hangs on one of its sides");
                    self.nodes[parent].set_child(side, Some(id));
                }
            }
        }
        trace!(?removed, ?successor, "promoted");

        // Every subtree below the two nodes has a new parent now.
        for id in [removed, successor] {
            for child in self.nodes[id].children().into_iter().flatten() {
                if child != removed && child != successor {
                    (self.fix_rotation)(&mut self.nodes, child);
                }
            }
        }
    }

    /// Runs the aggregate hook from `from` upwards until it reports that nothing above can change.
    /// The walk never stops below `through`.
    fn propagate_aggregate(&mut self, from: NodeId, mut through: Option<NodeId>) {
        let mut current = Some(from);
        while let Some(id) = current {
            let settled = (self.fix_aggregate)(&mut self.nodes, id);
            if through == Some(id) {
                through = None;
            }
            if settled && through.is_none() {
                break;
            }
            current = self.nodes.parent(id);
        }
    }
}

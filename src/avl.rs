//! Height-balanced (AVL) strategy.
//!
//! Every node stores the height of its subtree (a leaf has height 1, an empty subtree 0). The
//! heights of a node's two subtrees may differ by at most `max_balance`, which bounds the tree's
//! height by `O(lg N)`.
//!
//! # Examples
//!
//! ```
//! use bbst::{Avl, AvlTree};
//!
//! let mut tree = AvlTree::with_balance(Avl::new(2).unwrap());
//! for key in 0..100 {
//!     tree.insert(|entry: &i32| key.cmp(entry), key);
//! }
//!
//! assert!(tree.check_invariants().is_ok());
//! assert!(tree.height() < 15);
//! ```

use tracing::trace;

use crate::arena::{NodeId, Nodes};
use crate::balance::Balance;
use crate::error::{Result, TreeError};
use crate::side::Side;
use crate::tree::BinarySearchTree;

/// AVL balancing with a configurable tolerance.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Avl {
    max_balance: usize,
}

impl Default for Avl {
    fn default() -> Self {
        Self { max_balance: 1 }
    }
}

impl Avl {
    /// Allows sibling subtrees to differ in height by up to `max_balance`, which must be at least 1.
    pub fn new(max_balance: usize) -> Result<Self> {
        if max_balance == 0 {
            return Err(TreeError::InvalidParameter(
                "max_balance must be at least 1".to_string(),
            ));
        }
        Ok(Self { max_balance })
    }

    /// The largest allowed height difference between sibling subtrees.
    pub fn max_balance(&self) -> usize {
        self.max_balance
    }
}

fn height<T>(nodes: &Nodes<T, usize>, id: Option<NodeId>) -> usize {
    id.map_or(0, |id| *nodes[id].meta())
}

fn child_heights<T>(nodes: &Nodes<T, usize>, id: NodeId) -> [usize; 2] {
    nodes[id].children().map(|child| height(nodes, child))
}

/// Recomputes the height of `id` from its children and returns it.
fn update_height<T>(nodes: &mut Nodes<T, usize>, id: NodeId) -> usize {
    let [left, right] = child_heights(nodes, id);
    let height = left.max(right) + 1;
    *nodes[id].meta_mut() = height;
    height
}

impl Balance for Avl {
    type Meta = usize;

    fn new_meta(&self) -> usize {
        1
    }

    fn rotated<T>(&self, nodes: &mut Nodes<T, usize>, child: NodeId, parent: NodeId) {
        update_height(nodes, child);
        update_height(nodes, parent);
    }

    fn fix<T>(tree: &mut BinarySearchTree<T, Self>, node: NodeId, _side: Side) {
        let max_balance = tree.balance().max_balance;
        let mut current = Some(node);
        while let Some(id) = current {
            let nodes = tree.nodes();
            // Still the height from before the insert or removal below.
            let old_height = *nodes[id].meta();
            let [left, right] = child_heights(nodes, id);

            if left.abs_diff(right) <= max_balance {
                if update_height(tree.nodes_mut(), id) == old_height {
                    return;
                }
                current = tree.nodes().parent(id);
                continue;
            }

            let heavy = if right > left { Side::Right } else { Side::Left };
            let child = nodes
                .child(id, heavy)
                .expect("the taller side has a node");
            let inner = nodes.child(child, !heavy);
            let outer = nodes.child(child, heavy);
            let top = match inner {
                Some(inner) if height(nodes, Some(inner)) > height(nodes, outer) => {
                    trace!(?id, ?inner, "double rotation");
                    tree.rotate(inner);
                    tree.rotate(inner)
                }
                _ => {
                    trace!(?id, ?child, "single rotation");
                    tree.rotate(child)
                }
            };

            if *tree.nodes()[top].meta() == old_height {
                return;
            }
            current = tree.nodes().parent(top);
        }
    }

    fn check<T>(&self, nodes: &Nodes<T, usize>, id: NodeId) -> Result<()> {
        let [left, right] = child_heights(nodes, id);
        let stored = *nodes[id].meta();
        if stored != left.max(right) + 1 {
            return Err(TreeError::violation(
                id,
                format!(
                    "stored height {} but subtrees have heights {} and {}",
                    stored, left, right
                ),
            ));
        }
        if left.abs_diff(right) > self.max_balance {
            return Err(TreeError::violation(
                id,
                format!("subtree heights {} and {} are too far apart", left, right),
            ));
        }
        Ok(())
    }
}

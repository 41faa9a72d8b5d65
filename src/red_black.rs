//! Red-black strategy, expressed through levels instead of colours.
//!
//! Every node stores a level, the black height of its subtree; an empty subtree has level 0 and
//! a node with an empty child has level 1. A child sits either one level below its parent (a black
//! child) or on the same level (a red child, one half of a 3- or 4-node of the equivalent 2-3-4
//! tree). A red child never has a red child of its own. Together these bound the height by
//! `2 lg(N + 1)`.
//!
//! Recolouring becomes promoting or demoting a level. Rotations need no state patching at all:
//! levels belong to positions in the 2-3-4 tree, which a rotation does not change.

use tracing::trace;

use crate::arena::{NodeId, Nodes};
use crate::balance::Balance;
use crate::error::{Result, TreeError};
use crate::side::Side;
use crate::tree::BinarySearchTree;

/// Red-black balancing.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RedBlack;

fn level<T>(nodes: &Nodes<T, usize>, id: Option<NodeId>) -> usize {
    id.map_or(0, |id| *nodes[id].meta())
}

fn add_level<T>(nodes: &mut Nodes<T, usize>, id: NodeId, delta: isize) {
    let meta = nodes[id].meta_mut();
    *meta = meta
        .checked_add_signed(delta)
        .expect("levels stay positive");
}

impl RedBlack {
    /// `x` may be red below a red parent. Push the conflict up by promoting the grandparent
    /// while the parent's sibling is red too, then settle it with one or two rotations.
    fn fix_red<T>(tree: &mut BinarySearchTree<T, Self>, mut x: NodeId) {
        loop {
            let nodes = tree.nodes();
            let Some(parent) = nodes.parent(x) else {
                return;
            };
            if level(nodes, Some(parent)) != level(nodes, Some(x)) {
                return;
            }
            let Some(grandparent) = nodes.parent(parent) else {
                return;
            };
            if level(nodes, Some(grandparent)) != level(nodes, Some(parent)) {
                return;
            }

            let parent_side = nodes.index(parent).expect("parent has a parent");
            let uncle = nodes.child(grandparent, !parent_side);
            if level(nodes, uncle) == level(nodes, Some(grandparent)) {
                trace!(?grandparent, "promote");
                add_level(tree.nodes_mut(), grandparent, 1);
                x = grandparent;
                continue;
            }

            if nodes.index(x) == Some(parent_side) {
                trace!(?parent, "single rotation");
                tree.rotate(parent);
            } else {
                trace!(?x, "double rotation");
                tree.rotate(x);
                tree.rotate(x);
            }
            return;
        }
    }

    /// The child on `side` of `parent` may sit two levels below it. Demote along the path until
    /// the gap closes or a rotation absorbs it.
    fn fix_short<T>(tree: &mut BinarySearchTree<T, Self>, mut parent: NodeId, mut side: Side) {
        loop {
            let nodes = tree.nodes();
            let parent_level = level(nodes, Some(parent));
            if parent_level - level(nodes, nodes.child(parent, side)) < 2 {
                return;
            }

            let sibling = nodes
                .child(parent, !side)
                .expect("the taller side has a node");
            if level(nodes, Some(sibling)) == parent_level {
                // Red sibling: rotate it up so the gap faces a black sibling, then go again.
                trace!(?sibling, "rotate red sibling");
                tree.rotate(sibling);
                continue;
            }

            let sibling_level = level(nodes, Some(sibling));
            let outer = nodes.child(sibling, !side);
            let inner = nodes.child(sibling, side);
            if level(nodes, outer) == sibling_level {
                trace!(?sibling, "single rotation");
                tree.rotate(sibling);
                add_level(tree.nodes_mut(), sibling, 1);
                add_level(tree.nodes_mut(), parent, -1);
                return;
            }
            let red_inner = inner.filter(|&inner| level(nodes, Some(inner)) == sibling_level);
            if let Some(inner) = red_inner {
                trace!(?inner, "double rotation");
                tree.rotate(inner);
                tree.rotate(inner);
                add_level(tree.nodes_mut(), inner, 1);
                add_level(tree.nodes_mut(), parent, -1);
                return;
            }

            // Black sibling with black children: demote the parent and move the gap up.
            trace!(?parent, "demote");
            add_level(tree.nodes_mut(), parent, -1);
            let nodes = tree.nodes();
            match (nodes.parent(parent), nodes.index(parent)) {
                (Some(grandparent), Some(parent_side)) => {
                    parent = grandparent;
                    side = parent_side;
                }
                _ => return,
            }
        }
    }
}

impl Balance for RedBlack {
    type Meta = usize;

    fn new_meta(&self) -> usize {
        1
    }

    fn fix<T>(tree: &mut BinarySearchTree<T, Self>, node: NodeId, side: Side) {
        let nodes = tree.nodes();
        let child = nodes.child(node, side);
        match level(nodes, Some(node)) - level(nodes, child) {
            0 => Self::fix_red(tree, child.expect("a child on its parent's level exists")),
            2 => Self::fix_short(tree, node, side),
            _ => {}
        }
    }

    fn check<T>(&self, nodes: &Nodes<T, usize>, id: NodeId) -> Result<()> {
        let node_level = level(nodes, Some(id));
        if node_level == 0 {
            return Err(TreeError::violation(id, "level 0 on a node"));
        }
        for side in Side::BOTH {
            let child = nodes.child(id, side);
            match node_level.checked_sub(level(nodes, child)) {
                Some(1) => {}
                Some(0) => {
                    let child = child.expect("empty subtrees have level 0");
                    let red_grandchild = nodes[child]
                        .children()
                        .into_iter()
                        .any(|grandchild| level(nodes, grandchild) == node_level);
                    if red_grandchild {
                        return Err(TreeError::violation(
                            id,
                            format!("two red links in a row below the {:?} side", side),
                        ));
                    }
                }
                _ => {
                    return Err(TreeError::violation(
                        id,
                        format!(
                            "level {} but {:?} child has level {}",
                            node_level,
                            side,
                            level(nodes, child)
                        ),
                    ))
                }
            }
        }
        Ok(())
    }
}

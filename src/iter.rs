//! Traversals over a [`BinarySearchTree`].
//!
//! [`Iter`], [`Walk`], [`LevelOrder`] and [`Range`] borrow the tree, so it cannot change under
//! them. [`Cursor`] holds no borrow and may remove what it just returned; any other change to the
//! tree between its steps is reported as [`TreeError::ConcurrentModification`].

use std::cmp::Ordering;
use std::collections::VecDeque;
use std::iter::FusedIterator;

use crate::arena::{NodeId, Nodes};
use crate::balance::Balance;
use crate::error::{Result, TreeError};
use crate::side::Side;
use crate::tree::BinarySearchTree;

/// In-order iterator over payloads. Reverse it for descending order.
pub struct Iter<'a, T, M> {
    nodes: &'a Nodes<T, M>,
    front: Option<NodeId>,
    back: Option<NodeId>,
    remaining: usize,
}

impl<'a, T, M> Iterator for Iter<'a, T, M> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        let id = self.front?;
        self.front = self.nodes.next(id, Side::Right);
        self.remaining -= 1;
        Some(self.nodes[id].payload())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T, M> DoubleEndedIterator for Iter<'a, T, M> {
    fn next_back(&mut self) -> Option<&'a T> {
        if self.remaining == 0 {
            return None;
        }
        let id = self.back?;
        self.back = self.nodes.next(id, Side::Left);
        self.remaining -= 1;
        Some(self.nodes[id].payload())
    }
}

impl<T, M> ExactSizeIterator for Iter<'_, T, M> {}

impl<T, M> FusedIterator for Iter<'_, T, M> {}

/// In-order walk over node ids in one direction, starting anywhere.
pub struct Walk<'a, T, M> {
    nodes: &'a Nodes<T, M>,
    next: Option<NodeId>,
    side: Side,
}

impl<T, M> Iterator for Walk<'_, T, M> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.next?;
        self.next = self.nodes.next(id, self.side);
        Some(id)
    }
}

impl<T, M> FusedIterator for Walk<'_, T, M> {}

/// Breadth-first iterator over payloads, root first.
pub struct LevelOrder<'a, T, M> {
    nodes: &'a Nodes<T, M>,
    queue: VecDeque<NodeId>,
}

impl<'a, T, M> Iterator for LevelOrder<'a, T, M> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let id = self.queue.pop_front()?;
        let node = &self.nodes[id];
        self.queue.extend(node.children().into_iter().flatten());
        Some(node.payload())
    }
}

impl<T, M> FusedIterator for LevelOrder<'_, T, M> {}

/// Payloads between two inclusive bounds, in one direction.
///
/// Stops at the first payload past the far bound instead of scanning to the end of the tree.
pub struct Range<'a, T, M, K, C> {
    walk: Walk<'a, T, M>,
    cmp: C,
    bound: &'a K,
}

impl<'a, T, M, K, C> Iterator for Range<'a, T, M, K, C>
where
    C: Fn(&K, &T) -> Ordering,
{
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let id = self.walk.next()?;
        let payload = self.walk.nodes[id].payload();
        // Walking right the bound is the maximum, walking left it is the minimum.
        let past = match self.walk.side {
            Side::Right => (self.cmp)(self.bound, payload) == Ordering::Less,
            Side::Left => (self.cmp)(self.bound, payload) == Ordering::Greater,
        };
        if past {
            self.walk.next = None;
            return None;
        }
        Some(payload)
    }
}

impl<T, M, K, C> FusedIterator for Range<'_, T, M, K, C> where C: Fn(&K, &T) -> Ordering {}

/// A detached in-order cursor that can remove the node it last returned.
///
/// # Examples
///
/// ```
/// use bbst::RedBlackTree;
///
/// let mut tree = RedBlackTree::new();
/// for key in 0..10 {
///     tree.insert(|entry: &i32| key.cmp(entry), key);
/// }
///
/// // Drop every odd key on the way through.
/// let mut cursor = tree.cursor(true);
/// while cursor.has_next() {
///     let id = cursor.next(&tree).unwrap();
///     if tree.payload(id).unwrap() % 2 == 1 {
///         cursor.remove(&mut tree).unwrap();
///     }
/// }
///
/// assert_eq!(tree.iter().copied().collect::<Vec<_>>(), [0, 2, 4, 6, 8]);
/// ```
#[derive(Clone, Debug)]
pub struct Cursor {
    next: Option<NodeId>,
    last: Option<NodeId>,
    side: Side,
    modifications: u64,
}

impl Cursor {
    /// Whether [`next`](Self::next) has a node to return.
    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }

    /// Returns the next node and moves past it.
    pub fn next<T, B: Balance>(&mut self, tree: &BinarySearchTree<T, B>) -> Result<NodeId> {
        self.check(tree)?;
        let id = self.next.ok_or(TreeError::NoSuchElement)?;
        self.next = tree.nodes().next(id, self.side);
        self.last = Some(id);
        Ok(id)
    }

    /// Removes the node last returned by [`next`](Self::next) and returns its payload.
    ///
    /// A removed node with two children is replaced by its neighbour on the side the cursor came
    /// from, which it has already returned.
    pub fn remove<T, B: Balance>(&mut self, tree: &mut BinarySearchTree<T, B>) -> Result<T> {
        self.check(tree)?;
        let id = self
            .last
            .take()
            .ok_or(TreeError::IllegalState("remove without a preceding next"))?;
        let payload = tree
            .remove_node(id, !self.side)
            .ok_or(TreeError::ConcurrentModification)?;
        self.modifications = tree.modifications();
        Ok(payload)
    }

    fn check<T, B: Balance>(&self, tree: &BinarySearchTree<T, B>) -> Result<()> {
        if tree.modifications() != self.modifications {
            return Err(TreeError::ConcurrentModification);
        }
        Ok(())
    }
}

impl<T, B: Balance> BinarySearchTree<T, B> {
    /// Payloads in ascending order; `.rev()` for descending.
    pub fn iter(&self) -> Iter<'_, T, B::Meta> {
        Iter {
            nodes: self.nodes(),
            front: self.first(),
            back: self.last(),
            remaining: self.size(),
        }
    }

    /// Node ids in ascending order.
    pub fn nodes_in_order(&self) -> Walk<'_, T, B::Meta> {
        Walk {
            nodes: self.nodes(),
            next: self.first(),
            side: Side::Right,
        }
    }

    /// Node ids from `start` onwards in direction `side`, `start` included. Empty if `start` is
    /// not in this tree.
    pub fn walk_from(&self, start: NodeId, side: Side) -> Walk<'_, T, B::Meta> {
        Walk {
            nodes: self.nodes(),
            next: Some(start).filter(|&id| self.nodes().contains(id)),
            side,
        }
    }

    /// A cursor at the first node, or at the last one when not `forwards`.
    pub fn cursor(&self, forwards: bool) -> Cursor {
        Cursor {
            next: if forwards { self.first() } else { self.last() },
            last: None,
            side: Side::forwards(forwards),
            modifications: self.modifications(),
        }
    }

    /// Payloads breadth first.
    pub fn level_order(&self) -> LevelOrder<'_, T, B::Meta> {
        LevelOrder {
            nodes: self.nodes(),
            queue: self.root().into_iter().collect(),
        }
    }

    /// Payloads `p` with `min <= p <= max` according to `cmp`, ascending when `forwards` and
    /// descending otherwise.
    ///
    /// # Examples
    ///
    /// ```
    /// use bbst::BbTree;
    ///
    /// let mut tree = BbTree::new();
    /// for key in (0..20).step_by(2) {
    ///     tree.insert(|entry: &i32| key.cmp(entry), key);
    /// }
    ///
    /// let cmp = |key: &i32, entry: &i32| key.cmp(entry);
    /// let up: Vec<_> = tree.range(cmp, &3, &9, true).copied().collect();
    /// let down: Vec<_> = tree.range(cmp, &3, &9, false).copied().collect();
    /// assert_eq!(up, [4, 6, 8]);
    /// assert_eq!(down, [8, 6, 4]);
    /// ```
    pub fn range<'a, K, C>(
        &'a self,
        cmp: C,
        min: &'a K,
        max: &'a K,
        forwards: bool,
    ) -> Range<'a, T, B::Meta, K, C>
    where
        C: Fn(&K, &T) -> Ordering,
    {
        let side = Side::forwards(forwards);
        let (start, bound) = if forwards { (min, max) } else { (max, min) };
        let next = self
            .search(|payload| cmp(start, payload))
            .and_then(|(id, ordering)| {
                // Landing next to the bound on its outer side means the neighbour is the first hit.
                if Side::of(ordering) == Some(side) {
                    self.nodes().next(id, side)
                } else {
                    Some(id)
                }
            });
        Range {
            walk: Walk {
                nodes: self.nodes(),
                next,
                side,
            },
            cmp,
            bound,
        }
    }
}

impl<'a, T, B: Balance> IntoIterator for &'a BinarySearchTree<T, B> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T, B::Meta>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

//! Directions within the tree.

use std::cmp::Ordering;
use std::ops::{Index, IndexMut, Not};

/// One of the two child slots of a node.
///
/// `Left` holds the lower subtree and is slot 0, `Right` holds the higher subtree and is slot 1.
/// As a direction of travel, `Right` walks towards successors and `Left` towards predecessors.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    /// Slot 0, the lower subtree.
    Left = 0,
    /// Slot 1, the higher subtree.
    Right = 1,
}

impl Side {
    /// Both sides, in slot order.
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    /// The other side.
    pub const fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    /// The slot number of this side.
    pub const fn slot(self) -> usize {
        self as usize
    }

    /// The side a search descends to for the given comparison of target versus node.
    /// `Equal` has no side.
    pub fn of(ordering: Ordering) -> Option<Self> {
        match ordering {
            Ordering::Less => Some(Side::Left),
            Ordering::Equal => None,
            Ordering::Greater => Some(Side::Right),
        }
    }

    /// `Right` when travelling forwards, `Left` otherwise.
    pub const fn forwards(forwards: bool) -> Self {
        if forwards {
            Side::Right
        } else {
            Side::Left
        }
    }
}

impl Not for Side {
    type Output = Side;

    fn not(self) -> Side {
        self.opposite()
    }
}

impl<T> Index<Side> for [T; 2] {
    type Output = T;

    fn index(&self, side: Side) -> &T {
        &self[side.slot()]
    }
}

impl<T> IndexMut<Side> for [T; 2] {
    fn index_mut(&mut self, side: Side) -> &mut T {
        &mut self[side.slot()]
    }
}

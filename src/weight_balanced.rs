//! Weight-balanced (BB[α]) strategy.
//!
//! Every node stores its weight: the number of nodes in its subtree plus one. An empty subtree
//! weighs 1, so a node's weight is exactly the sum of its children's weights and ratios stay
//! defined down to the leaves. The lighter child of every node carries at least `alpha` of the
//! node's weight.
//!
//! When a node falls out of balance its heavier child is rotated up, or, if that child leans
//! towards the light side by more than `d` of its own weight, the heavier child's inner child is
//! rotated up twice. In small subtrees the rotation `d` picks can still leave a node short; then
//! the other rotation is used if it balances every node it touches, and otherwise the nodes moved
//! down are rebalanced in turn.
//!
//! Both parameters are exact fractions.

use std::fmt;

use tracing::trace;

use crate::arena::{NodeId, Nodes};
use crate::balance::Balance;
use crate::error::{Result, TreeError};
use crate::side::Side;
use crate::tree::BinarySearchTree;

/// A non-negative fraction.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Ratio {
    numerator: u64,
    denominator: u64,
}

impl Ratio {
    /// `numerator / denominator`.
    ///
    /// # Panics
    ///
    /// When `denominator` is zero.
    pub const fn new(numerator: u64, denominator: u64) -> Self {
        assert!(denominator != 0, "zero denominator");
        Self {
            numerator,
            denominator,
        }
    }

    /// The numerator.
    pub const fn numerator(self) -> u64 {
        self.numerator
    }

    /// The denominator.
    pub const fn denominator(self) -> u64 {
        self.denominator
    }

    /// Whether `part < self * whole`.
    fn exceeds(self, part: usize, whole: usize) -> bool {
        (part as u128) * (self.denominator as u128) < (self.numerator as u128) * (whole as u128)
    }
}

impl fmt::Debug for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// Weight balancing with imbalance tolerance `alpha` and rotation threshold `d`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct WeightBalanced {
    alpha: Ratio,
    d: Ratio,
}

impl Default for WeightBalanced {
    fn default() -> Self {
        Self {
            alpha: Ratio::new(3, 11),
            d: Ratio::new(3, 5),
        }
    }
}

impl WeightBalanced {
    /// Balancing with the given parameters.
    ///
    /// `alpha` must lie in `(2/11, 1 - sqrt(2)/2]` and `d` in `[1/(2 - alpha), 1 - alpha]`.
    pub fn new(alpha: Ratio, d: Ratio) -> Result<Self> {
        let (an, ad) = (alpha.numerator as u128, alpha.denominator as u128);
        let (dn, dd) = (d.numerator as u128, d.denominator as u128);

        // 2/11 < a
        if 2 * ad >= 11 * an {
            return Err(invalid(format!("alpha {:?} must exceed 2/11", alpha)));
        }
        // a <= 1 - sqrt(2)/2  <=>  2 (1 - a)^2 >= 1
        if an >= ad || 2 * (ad - an) * (ad - an) < ad * ad {
            return Err(invalid(format!(
                "alpha {:?} must not exceed 1 - sqrt(2)/2",
                alpha
            )));
        }
        // 1/(2 - a) <= d  <=>  d (2 - a) >= 1
        if dn * (2 * ad - an) < dd * ad {
            return Err(invalid(format!(
                "d {:?} must be at least 1/(2 - alpha)",
                d
            )));
        }
        // d <= 1 - a
        if dn * ad > dd * (ad - an) {
            return Err(invalid(format!("d {:?} must not exceed 1 - alpha", d)));
        }
        Ok(Self { alpha, d })
    }

    /// Balancing with tolerance `alpha` and the rotation threshold `d = 1/(2 - alpha)`.
    pub fn with_alpha(alpha: Ratio) -> Result<Self> {
        if alpha.numerator >= alpha.denominator {
            return Err(invalid(format!("alpha {:?} must be below 1", alpha)));
        }
        let d = Ratio::new(alpha.denominator, 2 * alpha.denominator - alpha.numerator);
        Self::new(alpha, d)
    }

    /// The smallest share of a node's weight its lighter child may carry.
    pub fn alpha(&self) -> Ratio {
        self.alpha
    }

    /// The lean beyond which a double rotation is used.
    pub fn d(&self) -> Ratio {
        self.d
    }
}

impl WeightBalanced {
    fn balanced(&self, left: usize, right: usize) -> bool {
        !self.alpha.exceeds(left.min(right), left + right)
    }

    /// Rotates below `id` until the subtree it roots is balanced, and returns the new root of
    /// that subtree. Weights above it do not change.
    ///
    /// The rotation `d` asks for is used unless only the other one leaves all of its nodes
    /// balanced. If neither does, the nodes moved down are settled in turn.
    fn settle<T>(tree: &mut BinarySearchTree<T, Self>, mut id: NodeId) -> NodeId {
        let balance = *tree.balance();
        loop {
            let nodes = tree.nodes();
            let [left, right] = child_weights(nodes, id);
            if balance.balanced(left, right) {
                return id;
            }

            let light = if left <= right { Side::Left } else { Side::Right };
            let heavy = !light;
            let child = nodes
                .child(id, heavy)
                .expect("the heavier side has a node");
            let inner = nodes.child(child, light);
            let (near, far) = (left.min(right), weight(nodes, nodes.child(child, heavy)));
            let middle = weight(nodes, inner);

            let single = balance.balanced(near, middle) && balance.balanced(near + middle, far);
            let double = inner.is_some_and(|inner| {
                let split = child_weights(nodes, inner);
                let (inner_near, inner_far) = (split[light], split[heavy]);
                balance.balanced(near, inner_near)
                    && balance.balanced(inner_far, far)
                    && balance.balanced(near + inner_near, inner_far + far)
            });
            let leans = !balance.d.exceeds(middle, middle + far);
            let twice = match (single, double) {
                (true, false) => false,
                (false, true) => true,
                _ => leans,
            };

            id = match inner.filter(|_| twice) {
                Some(inner) => {
                    trace!(?id, ?inner, "double rotation");
                    tree.rotate(inner);
                    let top = tree.rotate(inner);
                    if !double {
                        Self::settle(tree, child);
                        Self::settle(tree, id);
                    }
                    top
                }
                None => {
                    trace!(?id, ?child, "single rotation");
                    let top = tree.rotate(child);
                    if !single {
                        Self::settle(tree, id);
                    }
                    top
                }
            };
        }
    }
}

fn invalid(reason: String) -> TreeError {
    TreeError::InvalidParameter(reason)
}

fn weight<T>(nodes: &Nodes<T, usize>, id: Option<NodeId>) -> usize {
    id.map_or(1, |id| *nodes[id].meta())
}

fn child_weights<T>(nodes: &Nodes<T, usize>, id: NodeId) -> [usize; 2] {
    nodes[id].children().map(|child| weight(nodes, child))
}

impl Balance for WeightBalanced {
    type Meta = usize;

    fn new_meta(&self) -> usize {
        2
    }

    fn rotated<T>(&self, nodes: &mut Nodes<T, usize>, child: NodeId, parent: NodeId) {
        // `parent` took over the whole subtree; `child` lost `parent`'s old weight and gained the
        // subtree that moved across.
        let total = *nodes[child].meta();
        let side = nodes
            .index_of(parent, child)
            .expect("the old parent hangs below the new one");
        let moved = weight(nodes, nodes.child(child, !side));
        let parent_weight = *nodes[parent].meta();
        *nodes[child].meta_mut() = total - parent_weight + moved;
        *nodes[parent].meta_mut() = total;
    }

    fn fix<T>(tree: &mut BinarySearchTree<T, Self>, node: NodeId, _side: Side) {
        let mut current = Some(node);
        while let Some(id) = current {
            let [left, right] = child_weights(tree.nodes(), id);
            *tree.nodes_mut()[id].meta_mut() = left + right;
            let top = Self::settle(tree, id);
            current = tree.nodes().parent(top);
        }
    }

    fn check<T>(&self, nodes: &Nodes<T, usize>, id: NodeId) -> Result<()> {
        let [left, right] = child_weights(nodes, id);
        let stored = *nodes[id].meta();
        if stored != left + right {
            return Err(TreeError::violation(
                id,
                format!(
                    "stored weight {} but subtrees weigh {} and {}",
                    stored, left, right
                ),
            ));
        }
        if self.alpha.exceeds(left.min(right), stored) {
            return Err(TreeError::violation(
                id,
                format!(
                    "lighter subtree weighs {} of {}, below {:?}",
                    left.min(right),
                    stored,
                    self.alpha
                ),
            ));
        }
        Ok(())
    }
}

//! Per-node data kept up to date through the aggregate and rotation hooks.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use bbst::{
    Avl, Balance, BinarySearchTree, FixAggregate, NodeId, Nodes, RedBlack, Side, Unbalanced,
    WeightBalanced,
};

use crate::Op;

/// Payload: the key and the number of nodes in the subtree below and including it.
type Counted = (i16, usize);

fn subtree_count<M>() -> FixAggregate<Counted, M> {
    Box::new(|nodes, id| {
        let count = 1 + nodes[id]
            .children()
            .into_iter()
            .flatten()
            .map(|child| nodes[child].payload().1)
            .sum::<usize>();
        let old = std::mem::replace(&mut nodes[id].payload_mut().1, count);
        old == count
    })
}

fn counted<B: Balance + Default>() -> BinarySearchTree<Counted, B> {
    BinarySearchTree::with_hooks(subtree_count(), Box::new(|_, _| {}))
}

fn by(key: i16) -> impl FnMut(&Counted) -> Ordering {
    move |entry| key.cmp(&entry.0)
}

fn actual_count<M>(nodes: &Nodes<Counted, M>, id: Option<NodeId>) -> usize {
    id.map_or(0, |id| {
        1 + nodes[id]
            .children()
            .into_iter()
            .map(|child| actual_count(nodes, child))
            .sum::<usize>()
    })
}

/// The `k`th smallest key, found by descending on subtree counts.
fn nth<B: Balance>(tree: &BinarySearchTree<Counted, B>, mut k: usize) -> Option<i16> {
    let nodes = tree.nodes();
    let mut id = tree.root()?;
    loop {
        let left = nodes.child(id, Side::Left);
        let left_count = left.map_or(0, |left| nodes[left].payload().1);
        match k.cmp(&left_count) {
            Ordering::Less => id = left?,
            Ordering::Equal => return Some(nodes[id].payload().0),
            Ordering::Greater => {
                k -= left_count + 1;
                id = nodes.child(id, Side::Right)?;
            }
        }
    }
}

fn counts_hold<B: Balance + Default>(ops: &[Op<i16>]) -> bool {
    let mut tree = counted::<B>();
    let mut set = BTreeSet::new();
    for op in ops {
        match *op {
            Op::Insert(k) => {
                tree.insert(by(k), (k, 1));
                set.insert(k);
            }
            Op::Remove(k, predecessor) => {
                let hint = if predecessor { Side::Left } else { Side::Right };
                tree.remove(by(k), hint);
                set.remove(&k);
            }
            Op::Iter => {}
        }

        let nodes = tree.nodes();
        let consistent = tree
            .nodes_in_order()
            .all(|id| nodes[id].payload().1 == actual_count(nodes, Some(id)));
        if !consistent {
            return false;
        }
    }

    (0..set.len() + 1).all(|k| nth(&tree, k) == set.iter().nth(k).copied())
}

quickcheck::quickcheck! {
    fn avl_counts(ops: Vec<Op<i16>>) -> bool {
        counts_hold::<Avl>(&ops)
    }

    fn red_black_counts(ops: Vec<Op<i16>>) -> bool {
        counts_hold::<RedBlack>(&ops)
    }

    fn weight_balanced_counts(ops: Vec<Op<i16>>) -> bool {
        counts_hold::<WeightBalanced>(&ops)
    }
}

#[test]
fn rotation_hook_sees_moved_subtrees() {
    use std::cell::Cell;
    use std::rc::Rc;

    let moved = Rc::new(Cell::new(0));
    let seen = Rc::clone(&moved);
    let mut tree: BinarySearchTree<Counted, Avl> = BinarySearchTree::with_hooks(
        subtree_count(),
        Box::new(move |_, _| seen.set(seen.get() + 1)),
    );
    // Ascending inserts keep rotating nodes that already have a left subtree.
    for key in 0..64 {
        tree.insert(by(key), (key, 1));
    }

    assert!(moved.get() > 0);
    assert_eq!(nth(&tree, 10), Some(10));
    assert_eq!(tree.payload(tree.root().unwrap()).unwrap().1, 64);
}

/// Payload: the key and the key of the node's parent.
type Parented = (i16, Option<i16>);

fn record_parent<M>(nodes: &mut Nodes<Parented, M>, id: NodeId) {
    let parent = nodes.parent(id).map(|parent| nodes[parent].payload().0);
    nodes[id].payload_mut().1 = parent;
}

/// The aggregate hook only looks at the node it is given, so every subtree that moves below a
/// new parent has to be reported through the rotation hook.
fn parented<B: Balance + Default>() -> BinarySearchTree<Parented, B> {
    BinarySearchTree::with_hooks(
        Box::new(|nodes, id| {
            record_parent(nodes, id);
            true
        }),
        Box::new(|nodes, id| record_parent(nodes, id)),
    )
}

fn parent_of(key: i16) -> impl FnMut(&Parented) -> Ordering {
    move |entry| key.cmp(&entry.0)
}

fn parents_hold<B: Balance + Default>(ops: &[Op<i16>]) -> bool {
    let mut tree = parented::<B>();
    for op in ops {
        match *op {
            Op::Insert(k) => {
                tree.insert(parent_of(k), (k, None));
            }
            Op::Remove(k, predecessor) => {
                let hint = if predecessor { Side::Left } else { Side::Right };
                tree.remove(parent_of(k), hint);
            }
            Op::Iter => {}
        }

        let nodes = tree.nodes();
        let consistent = tree.nodes_in_order().all(|id| {
            let actual = nodes.parent(id).map(|parent| nodes[parent].payload().0);
            nodes[id].payload().1 == actual
        });
        if !consistent {
            return false;
        }
    }
    true
}

quickcheck::quickcheck! {
    fn unbalanced_parents(ops: Vec<Op<i16>>) -> bool {
        parents_hold::<Unbalanced>(&ops)
    }

    fn avl_parents(ops: Vec<Op<i16>>) -> bool {
        parents_hold::<Avl>(&ops)
    }

    fn red_black_parents(ops: Vec<Op<i16>>) -> bool {
        parents_hold::<RedBlack>(&ops)
    }

    fn weight_balanced_parents(ops: Vec<Op<i16>>) -> bool {
        parents_hold::<WeightBalanced>(&ops)
    }
}

#[test]
fn rotation_hook_sees_subtrees_moved_by_removal() {
    use std::cell::RefCell;
    use std::rc::Rc;

    let moved = Rc::new(RefCell::new(Vec::new()));
    let seen = Rc::clone(&moved);
    let mut tree: BinarySearchTree<Counted> = BinarySearchTree::with_hooks(
        subtree_count(),
        Box::new(move |nodes, id| seen.borrow_mut().push(nodes[id].payload().0)),
    );
    //        50
    //      /    \
    //    30      70
    //   /  \    /  \
    //  20  40  60  80
    //            \
    //            65
    for key in [50, 30, 70, 60, 65, 80, 20, 40] {
        tree.insert(by(key), (key, 1));
    }
    assert!(moved.borrow().is_empty());

    // 60 takes the root: 30 and 70 get it as their parent, 65 ends up below 70.
    tree.remove(by(50), Side::Right);
    let mut moved = moved.borrow().clone();
    moved.sort_unstable();
    moved.dedup();
    assert_eq!(moved, [30, 65, 70]);

    assert_eq!(tree.payload(tree.root().unwrap()), Some(&(60, 7)));
    tree.check_invariants().unwrap();
}

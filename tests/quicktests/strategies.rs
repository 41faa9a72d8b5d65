use std::collections::BTreeSet;

use bbst::{Balance, BinarySearchTree, Factory, Side};

use crate::Op;

/// A tree from `factory` without aggregate hooks.
fn plain<K, B: Balance>(factory: Factory<K, B>) -> BinarySearchTree<K, B> {
    factory(Box::new(|_, _| true), Box::new(|_, _| {}))
}

fn by(key: i16) -> impl FnMut(&i16) -> std::cmp::Ordering {
    move |entry| key.cmp(entry)
}

/// Applies a set of operations to a tree and a set.
/// This way we can ensure that after a random smattering of inserts
/// and deletes we have the same keys in both, and that the tree stayed
/// valid along the way.
fn do_ops<B: Balance>(
    ops: &[Op<i16>],
    tree: &mut BinarySearchTree<i16, B>,
    set: &mut BTreeSet<i16>,
) {
    for op in ops {
        match *op {
            Op::Insert(k) => {
                assert_eq!(tree.insert(by(k), k).is_new(), set.insert(k));
            }
            Op::Remove(k, predecessor) => {
                let hint = if predecessor { Side::Left } else { Side::Right };
                assert_eq!(tree.remove(by(k), hint), set.take(&k));
            }
            Op::Iter => {
                assert!(tree.iter().eq(set.iter()));
            }
        }
        tree.check_invariants().unwrap();
    }
}

pub fn matches_model<B: Balance>(factory: Factory<i16, B>, ops: &[Op<i16>]) -> bool {
    let mut tree = plain(factory);
    let mut set = BTreeSet::new();

    do_ops(ops, &mut tree, &mut set);
    tree.size() == set.len()
        && tree.iter().eq(set.iter())
        && tree.iter().rev().eq(set.iter().rev())
        && tree.first().and_then(|id| tree.payload(id)) == set.first()
        && tree.last().and_then(|id| tree.payload(id)) == set.last()
}

pub fn contains<B: Balance>(factory: Factory<i16, B>, xs: &[i16], nots: &[i16]) -> bool {
    let mut tree = plain(factory);
    for &x in xs {
        tree.insert(by(x), x);
    }

    xs.iter()
        .all(|&x| tree.get(by(x)).and_then(|id| tree.payload(id)) == Some(&x))
        && nots
            .iter()
            .filter(|x| !xs.contains(x))
            .all(|&x| tree.get(by(x)).is_none())
}

pub fn remove_everything<B: Balance>(factory: Factory<i16, B>, xs: &[i16]) -> bool {
    let mut tree = plain(factory);
    for &x in xs {
        tree.insert(by(x), x);
    }
    for &x in xs {
        tree.remove(by(x), Side::Left);
        tree.check_invariants().unwrap();
    }

    tree.is_empty() && tree.root().is_none() && tree.height() == 0
}

pub fn cursor_removal<B: Balance>(factory: Factory<i16, B>, xs: &[i16], forwards: bool) -> bool {
    let mut tree = plain(factory);
    for &x in xs {
        tree.insert(by(x), x);
    }
    let expected: Vec<_> = tree.iter().copied().filter(|x| x % 3 != 0).collect();

    let mut cursor = tree.cursor(forwards);
    while cursor.has_next() {
        let id = cursor.next(&tree).unwrap();
        if tree.payload(id).unwrap() % 3 == 0 {
            cursor.remove(&mut tree).unwrap();
            tree.check_invariants().unwrap();
        }
    }

    tree.iter().copied().eq(expected)
}

pub fn level_order_visits_every_node<B: Balance>(factory: Factory<i16, B>, xs: &[i16]) -> bool {
    let mut tree = plain(factory);
    for &x in xs {
        tree.insert(by(x), x);
    }

    let mut visited: Vec<_> = tree.level_order().copied().collect();
    visited.sort_unstable();
    tree.level_order().next() == tree.root().and_then(|id| tree.payload(id))
        && visited.into_iter().eq(tree.iter().copied())
}

macro_rules! strategy_quicktests {
    ($name:ident, $balance:ty) => {
        mod $name {
            use bbst::BinarySearchTree;

            use crate::Op;

            type Tree = BinarySearchTree<i16, $balance>;

            quickcheck::quickcheck! {
                fn matches_model(ops: Vec<Op<i16>>) -> bool {
                    super::matches_model(Tree::with_hooks, &ops)
                }

                fn contains(xs: Vec<i16>, nots: Vec<i16>) -> bool {
                    super::contains(Tree::with_hooks, &xs, &nots)
                }

                fn remove_everything(xs: Vec<i16>) -> bool {
                    super::remove_everything(Tree::with_hooks, &xs)
                }

                fn cursor_removal(xs: Vec<i16>, forwards: bool) -> bool {
                    super::cursor_removal(Tree::with_hooks, &xs, forwards)
                }

                fn level_order_visits_every_node(xs: Vec<i16>) -> bool {
                    super::level_order_visits_every_node(Tree::with_hooks, &xs)
                }
            }
        }
    };
}

strategy_quicktests!(unbalanced, bbst::Unbalanced);
strategy_quicktests!(avl, bbst::Avl);
strategy_quicktests!(red_black, bbst::RedBlack);
strategy_quicktests!(weight_balanced, bbst::WeightBalanced);

use std::collections::BTreeSet;

use bbst::{Avl, Balance, BinarySearchTree, RedBlack, WeightBalanced};

fn cmp(key: &i8, entry: &i8) -> std::cmp::Ordering {
    key.cmp(entry)
}

fn range_matches<B: Balance + Default>(xs: &[i8], min: i8, max: i8) -> bool {
    let mut tree = BinarySearchTree::<i8, B>::new();
    for &x in xs {
        tree.insert(|entry| x.cmp(entry), x);
    }
    let set: BTreeSet<_> = xs.iter().copied().collect();
    let expected: Vec<_> = if min <= max {
        set.range(min..=max).copied().collect()
    } else {
        Vec::new()
    };

    let up: Vec<_> = tree.range(cmp, &min, &max, true).copied().collect();
    let down: Vec<_> = tree.range(cmp, &min, &max, false).copied().collect();
    up == expected && down.into_iter().rev().eq(expected)
}

quickcheck::quickcheck! {
    fn avl_range(xs: Vec<i8>, min: i8, max: i8) -> bool {
        range_matches::<Avl>(&xs, min, max)
    }

    fn red_black_range(xs: Vec<i8>, min: i8, max: i8) -> bool {
        range_matches::<RedBlack>(&xs, min, max)
    }

    fn weight_balanced_range(xs: Vec<i8>, min: i8, max: i8) -> bool {
        range_matches::<WeightBalanced>(&xs, min, max)
    }
}

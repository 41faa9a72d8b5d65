use quickcheck::{Arbitrary, Gen};

mod aggregate;
mod range;
mod strategies;

/// An enum for the various kinds of "things" to do to
/// binary search trees in a quicktest.
#[derive(Copy, Clone, Debug)]
pub enum Op<K> {
    /// Insert the K into the tree
    Insert(K),
    /// Remove the K from the tree, promoting a predecessor if the flag is set
    Remove(K, bool),
    /// Compare iterators
    Iter,
}

impl<K> Arbitrary for Op<K>
where
    K: Arbitrary,
{
    /// Tells quickcheck how to randomly choose an operation
    fn arbitrary(g: &mut Gen) -> Self {
        match g.choose(&[0, 1, 2]).unwrap() {
            0 => Op::Insert(K::arbitrary(g)),
            1 => Op::Remove(K::arbitrary(g), bool::arbitrary(g)),
            2 => Op::Iter,
            _ => unreachable!(),
        }
    }
}

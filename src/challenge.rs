use std::collections::{btree_set, BTreeSet};
use std::iter::Copied;

use sha2::{Digest, Sha256};

use crate::types::Hash256;

/// Leaf indices selected by a Fiat–Shamir derivation, kept in ascending order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChallengeSet(BTreeSet<u64>);

impl ChallengeSet {
    /// Smallest selected index.
    #[must_use]
    pub fn first(&self) -> Option<u64> {
        self.0.first().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn contains(&self, index: u64) -> bool {
        self.0.contains(&index)
    }

    pub fn iter(&self) -> Copied<btree_set::Iter<'_, u64>> {
        self.0.iter().copied()
    }

    #[must_use]
    pub fn to_sorted_vec(&self) -> Vec<u64> {
        self.0.iter().copied().collect()
    }
}

impl<'a> IntoIterator for &'a ChallengeSet {
    type Item = u64;
    type IntoIter = Copied<btree_set::Iter<'a, u64>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<u64> for ChallengeSet {
    fn from_iter<I: IntoIterator<Item = u64>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Derives the challenged leaf set from a root digest.
pub trait ChallengeSampler {
    fn sample(&self, root: &Hash256, leaf_count: u64, t: u64) -> ChallengeSet;
}

impl<F: Fn(&Hash256, u64, u64) -> ChallengeSet> ChallengeSampler for F {
    fn sample(&self, root: &Hash256, leaf_count: u64, t: u64) -> ChallengeSet {
        self(root, leaf_count, t)
    }
}

/// PoET-style sampler backed by [`fiat_shamir`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FiatShamir;

impl ChallengeSampler for FiatShamir {
    fn sample(&self, root: &Hash256, leaf_count: u64, t: u64) -> ChallengeSet {
        fiat_shamir(root, leaf_count, t)
    }
}

/// Select `min(t, leaf_count)` distinct indices in `[0, leaf_count)`.
///
/// idx_c = BE64( SHA256( root || BE32(c) )[..8] ) mod leaf_count, for c = 0, 1, ...
/// until enough distinct indices are collected or the 32-bit counter is spent.
/// Returns an empty set when `leaf_count` or `t` is zero.
#[must_use]
pub fn fiat_shamir(root: &Hash256, leaf_count: u64, t: u64) -> ChallengeSet {
    let mut out = BTreeSet::new();
    if leaf_count == 0 {
        return ChallengeSet(out);
    }
    let want = usize::try_from(t.min(leaf_count)).unwrap_or(usize::MAX);
    for counter in 0..=u32::MAX {
        if out.len() >= want {
            break;
        }
        let mut h = Sha256::new();
        h.update(root);
        h.update(counter.to_be_bytes());
        let digest: [u8; 32] = h.finalize().into();
        let mut head = [0u8; 8];
        head.copy_from_slice(&digest[..8]);
        out.insert(u64::from_be_bytes(head) % leaf_count);
    }
    ChallengeSet(out)
}

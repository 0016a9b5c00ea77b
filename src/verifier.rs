use subtle::ConstantTimeEq;
use tracing::debug;

use crate::{
    challenge::{ChallengeSampler, FiatShamir},
    errors::VerifyError,
    hashers::MerkleHash,
    position::{tree_height, Position},
    types::{Hash256, MerkleProof},
};

/// Membership-proof verifier provider interface.
pub trait ProofVerifier {
    /// Accept or reject `proof` for a tree of `leaf_count` leaves proving `t` of them.
    fn verify(&self, proof: &MerkleProof, leaf_count: u64, t: u64) -> Result<(), VerifyError>;
}

/// Checks a Merkle multiproof over the leaves Fiat–Shamir selects from the root.
///
/// Only the tree layer is checked; proven leaves are taken as given.
#[derive(Clone, Debug, Default)]
pub struct MultiProofVerifier<M, C = FiatShamir> {
    merkle_hash: M,
    sampler: C,
}

impl<M: MerkleHash> MultiProofVerifier<M, FiatShamir> {
    #[must_use]
    pub const fn new(merkle_hash: M) -> Self {
        Self { merkle_hash, sampler: FiatShamir }
    }
}

impl<M: MerkleHash, C: ChallengeSampler> MultiProofVerifier<M, C> {
    #[must_use]
    pub const fn with_sampler(merkle_hash: M, sampler: C) -> Self {
        Self { merkle_hash, sampler }
    }
}

impl<M: MerkleHash, C: ChallengeSampler> ProofVerifier for MultiProofVerifier<M, C> {
    fn verify(&self, proof: &MerkleProof, leaf_count: u64, t: u64) -> Result<(), VerifyError> {
        if leaf_count == 0 {
            return Err(VerifyError::EmptyTree);
        }
        let indices = self.sampler.sample(&proof.root, leaf_count, t);
        if proof.proven_leaves.len() != indices.len() {
            return Err(VerifyError::LeafCountMismatch {
                expected: indices.len(),
                got: proof.proven_leaves.len(),
            });
        }
        let mut leaves = Vec::with_capacity(indices.len());
        for (index, leaf) in indices.iter().zip(&proof.proven_leaves) {
            if index >= leaf_count {
                return Err(VerifyError::IndexOutOfRange { index, leaf_count });
            }
            leaves.push((Position::leaf(index), *leaf));
        }
        let height = tree_height(leaf_count);
        debug!(leaves = leaves.len(), proof_nodes = proof.proof_nodes.len(), height, "folding multiproof");
        let computed = compute_root(&leaves, &proof.proof_nodes, height, &self.merkle_hash)?;
        if bool::from(computed.ct_eq(&proof.root)) {
            Ok(())
        } else {
            Err(VerifyError::RootMismatch)
        }
    }
}

/// Fold sorted, distinct `leaves` up to the root of a tree of `tree_height`.
///
/// At every level, adjacent siblings are hashed together; every other node
/// takes its sibling from `proof_nodes`, consumed left to right, level by level.
///
/// # Errors
///
/// [`VerifyError::ProofNodesExhausted`] if a sibling is missing,
/// [`VerifyError::TrailingProofNodes`] if nodes are left over, and
/// [`VerifyError::RootMismatch`] when there are no leaves to fold.
pub fn compute_root<M: MerkleHash + ?Sized>(
    leaves: &[(Position, Hash256)],
    proof_nodes: &[Hash256],
    tree_height: u64,
    merkle_hash: &M,
) -> Result<Hash256, VerifyError> {
    let mut nodes = proof_nodes.iter();
    let mut level = leaves.to_vec();
    for _ in 0..tree_height {
        let mut next = Vec::with_capacity(level.len() / 2 + 1);
        let mut i = 0usize;
        while i < level.len() {
            let (pos, hash) = level[i];
            let paired = !pos.is_right_sibling()
                && level.get(i + 1).is_some_and(|(p, _)| *p == pos.sibling());
            let (left, right) = if paired {
                let right = level[i + 1].1;
                i += 2;
                (hash, right)
            } else {
                let sib = nodes.next().ok_or(VerifyError::ProofNodesExhausted {
                    height: pos.height,
                    index: pos.index,
                })?;
                i += 1;
                if pos.is_right_sibling() { (*sib, hash) } else { (hash, *sib) }
            };
            next.push((pos.parent()?, merkle_hash.node_hash(&left, &right)));
        }
        level = next;
    }
    let remaining = nodes.len();
    if remaining > 0 {
        return Err(VerifyError::TrailingProofNodes { remaining });
    }
    match level.as_slice() {
        [(pos, root)] if *pos == Position::root(tree_height) => Ok(*root),
        _ => Err(VerifyError::RootMismatch),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        challenge::{fiat_shamir, ChallengeSet},
        hashers::{make_label, Sha256LabelHash, Sha256MerkleHash},
        types::ZERO_HASH,
    };

    /// Full tree levels, leaves padded with zero digests to a power of two.
    fn build_levels(leaves: &[Hash256], merkle: &Sha256MerkleHash) -> Vec<Vec<Hash256>> {
        let height = tree_height(leaves.len() as u64);
        let mut level = leaves.to_vec();
        level.resize(1usize << height, ZERO_HASH);
        let mut levels = vec![level];
        while levels.last().unwrap().len() > 1 {
            let prev = levels.last().unwrap();
            let next: Vec<Hash256> = prev.chunks(2).map(|c| merkle.node_hash(&c[0], &c[1])).collect();
            levels.push(next);
        }
        levels
    }

    /// Proof nodes in the order `compute_root` consumes them.
    fn prove(levels: &[Vec<Hash256>], indices: &[u64]) -> Vec<Hash256> {
        let mut out = Vec::new();
        let mut current: Vec<Position> = indices.iter().map(|&i| Position::leaf(i)).collect();
        for level in &levels[..levels.len() - 1] {
            let mut next = Vec::new();
            let mut i = 0;
            while i < current.len() {
                let pos = current[i];
                let paired = !pos.is_right_sibling()
                    && current.get(i + 1).is_some_and(|p| *p == pos.sibling());
                if paired {
                    i += 2;
                } else {
                    out.push(level[pos.sibling().index as usize]);
                    i += 1;
                }
                next.push(pos.parent().unwrap());
            }
            current = next;
        }
        out
    }

    fn labels(n: u64) -> Vec<Hash256> {
        let h = Sha256LabelHash::default();
        (0..n).map(|i| make_label(&h, i, None)).collect()
    }

    #[test]
    fn honest_fiat_shamir_proof_verifies() {
        let merkle = Sha256MerkleHash::default();
        let leaves = labels(64);
        let levels = build_levels(&leaves, &merkle);
        let root = levels.last().unwrap()[0];
        let indices = fiat_shamir(&root, 64, 8).to_sorted_vec();
        let proof = MerkleProof {
            root,
            proven_leaves: indices.iter().map(|&i| leaves[i as usize]).collect(),
            proof_nodes: prove(&levels, &indices),
        };
        let verifier = MultiProofVerifier::new(merkle);
        assert_eq!(verifier.verify(&proof, 64, 8), Ok(()));
    }

    #[test]
    fn non_power_of_two_tree_verifies() {
        let merkle = Sha256MerkleHash::new(b"seed");
        let leaves = labels(5);
        let levels = build_levels(&leaves, &merkle);
        let root = levels.last().unwrap()[0];
        let sampler = |_: &Hash256, _: u64, _: u64| ChallengeSet::from_iter([1u64, 2, 4]);
        let indices = [1u64, 2, 4];
        let proof = MerkleProof {
            root,
            proven_leaves: indices.iter().map(|&i| leaves[i as usize]).collect(),
            proof_nodes: prove(&levels, &indices),
        };
        let verifier = MultiProofVerifier::with_sampler(merkle, sampler);
        assert_eq!(verifier.verify(&proof, 5, 3), Ok(()));
    }

    #[test]
    fn tampered_leaf_is_rejected() {
        let merkle = Sha256MerkleHash::default();
        let leaves = labels(16);
        let levels = build_levels(&leaves, &merkle);
        let root = levels.last().unwrap()[0];
        let sampler = |_: &Hash256, _: u64, _: u64| ChallengeSet::from_iter([0u64, 1, 9]);
        let indices = [0u64, 1, 9];
        let mut proof = MerkleProof {
            root,
            proven_leaves: indices.iter().map(|&i| leaves[i as usize]).collect(),
            proof_nodes: prove(&levels, &indices),
        };
        proof.proven_leaves[2][0] ^= 1;
        let verifier = MultiProofVerifier::with_sampler(merkle, sampler);
        assert_eq!(verifier.verify(&proof, 16, 3), Err(VerifyError::RootMismatch));
    }

    #[test]
    fn missing_and_extra_proof_nodes() {
        let merkle = Sha256MerkleHash::default();
        let leaf = [(Position::leaf(2), [1u8; 32])];
        assert_eq!(
            compute_root(&leaf, &[], 2, &merkle),
            Err(VerifyError::ProofNodesExhausted { height: 0, index: 2 })
        );
        assert_eq!(
            compute_root(&leaf, &[[0u8; 32]; 3], 2, &merkle),
            Err(VerifyError::TrailingProofNodes { remaining: 1 })
        );
        assert!(compute_root(&leaf, &[[0u8; 32]; 2], 2, &merkle).is_ok());
    }

    #[test]
    fn single_leaf_tree_is_its_own_root() {
        let merkle = Sha256MerkleHash::default();
        let leaf = [(Position::leaf(0), [9u8; 32])];
        assert_eq!(compute_root(&leaf, &[], 0, &merkle), Ok([9u8; 32]));
        assert_eq!(compute_root(&[], &[], 0, &merkle), Err(VerifyError::RootMismatch));
    }

    #[test]
    fn leaf_count_mismatch_and_range() {
        let merkle = Sha256MerkleHash::default();
        let proof = MerkleProof { root: [0u8; 32], proven_leaves: vec![[0u8; 32]; 2], proof_nodes: vec![] };
        let verifier = MultiProofVerifier::new(merkle.clone());
        assert_eq!(
            verifier.verify(&proof, 16, 4),
            Err(VerifyError::LeafCountMismatch { expected: 4, got: 2 })
        );
        assert_eq!(verifier.verify(&proof, 0, 4), Err(VerifyError::EmptyTree));

        let wild = |_: &Hash256, _: u64, _: u64| ChallengeSet::from_iter([3u64, 40]);
        let verifier = MultiProofVerifier::with_sampler(merkle, wild);
        assert_eq!(
            verifier.verify(&proof, 16, 2),
            Err(VerifyError::IndexOutOfRange { index: 40, leaf_count: 16 })
        );
    }
}

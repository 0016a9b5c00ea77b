use crate::hashers::{Sha256LabelHash, Sha256MerkleHash};

pub const HASH_LEN: usize = 32;                 // SHA-256 width
pub const T: u64 = 150;                         // leaves proven per PoET proof
pub const DEFAULT_LEAF_COUNT: u64 = 1000;       // leaf range scanned by the probe
pub const CHECKSUM_LEN: usize = 8;              // BE64 CRC trailer on state files

/// 32-byte digest (SHA-256 output).
pub type Hash256 = [u8; HASH_LEN];

/// Digest used as the all-zero placeholder for unpopulated proof slots.
pub const ZERO_HASH: Hash256 = [0u8; HASH_LEN];

/// A Merkle membership proof for the leaves selected by Fiat–Shamir over `root`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MerkleProof {
    pub root: Hash256,
    /// Labels of the proven leaves, ordered by ascending leaf index.
    pub proven_leaves: Vec<Hash256>,
    /// Missing siblings, level by level from the leaves, left to right.
    pub proof_nodes: Vec<Hash256>,
}

/// A leaf whose label selects its own index first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Candidate {
    pub index: u64,
    pub label: Hash256,
}

/// Parameters of the PoET probe run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProbeParams {
    pub leaf_count: u64,
    pub challenges: u64,
    /// Membership root mixed into the label and Merkle hashes.
    ///
    /// `run_poet_probe` takes its hashers as arguments; build them with
    /// [`ProbeParams::label_hash`] and [`ProbeParams::merkle_hash`] so they
    /// share this seed.
    pub seed: Vec<u8>,
}

impl ProbeParams {
    #[must_use]
    pub fn label_hash(&self) -> Sha256LabelHash {
        Sha256LabelHash::new(&self.seed)
    }

    #[must_use]
    pub fn merkle_hash(&self) -> Sha256MerkleHash {
        Sha256MerkleHash::new(&self.seed)
    }
}

impl Default for ProbeParams {
    fn default() -> Self {
        Self { leaf_count: DEFAULT_LEAF_COUNT, challenges: T, seed: Vec::new() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hashers::{make_label, MerkleHash};

    #[test]
    fn probe_hashers_share_the_seed() {
        let params = ProbeParams { seed: vec![0xab], ..ProbeParams::default() };
        assert_eq!(params.label_hash(), Sha256LabelHash::new(&[0xab]));
        assert_ne!(
            make_label(&params.label_hash(), 7, None),
            make_label(&ProbeParams::default().label_hash(), 7, None)
        );
        let (a, b) = ([1u8; 32], [2u8; 32]);
        assert_eq!(
            params.merkle_hash().node_hash(&a, &b),
            Sha256MerkleHash::new(&[0xab]).node_hash(&a, &b)
        );
    }
}

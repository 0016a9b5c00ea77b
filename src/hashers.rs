use sha2::{Digest, Sha256};

use crate::types::Hash256;

/// Hash over a serialized label input.
pub trait LabelHash {
    fn label_hash(&self, data: &[u8]) -> Hash256;
}

/// Hash of an inner Merkle node from its two children.
pub trait MerkleHash {
    fn node_hash(&self, left: &Hash256, right: &Hash256) -> Hash256;
}

impl<F: Fn(&[u8]) -> Hash256> LabelHash for F {
    fn label_hash(&self, data: &[u8]) -> Hash256 {
        self(data)
    }
}

impl<F: Fn(&Hash256, &Hash256) -> Hash256> MerkleHash for F {
    fn node_hash(&self, left: &Hash256, right: &Hash256) -> Hash256 {
        self(left, right)
    }
}

/// SHA256( seed || data )
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Sha256LabelHash {
    seed: Vec<u8>,
}

impl Sha256LabelHash {
    #[must_use]
    pub fn new(seed: &[u8]) -> Self {
        Self { seed: seed.to_vec() }
    }
}

impl LabelHash for Sha256LabelHash {
    fn label_hash(&self, data: &[u8]) -> Hash256 {
        let mut h = Sha256::new();
        h.update(&self.seed);
        h.update(data);
        h.finalize().into()
    }
}

/// SHA256( seed || left || right )
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Sha256MerkleHash {
    seed: Vec<u8>,
}

impl Sha256MerkleHash {
    #[must_use]
    pub fn new(seed: &[u8]) -> Self {
        Self { seed: seed.to_vec() }
    }
}

impl MerkleHash for Sha256MerkleHash {
    fn node_hash(&self, left: &Hash256, right: &Hash256) -> Hash256 {
        let mut h = Sha256::new();
        h.update(&self.seed);
        h.update(left);
        h.update(right);
        h.finalize().into()
    }
}

/// Label[i] = H( BE64(i) || left_siblings... )
///
/// `None` is the root-probing mode with no sibling input.
#[must_use]
pub fn make_label<L: LabelHash + ?Sized>(
    label_hash: &L,
    index: u64,
    left_siblings: Option<&[Hash256]>,
) -> Hash256 {
    let siblings = left_siblings.unwrap_or_default();
    let mut buf = Vec::with_capacity(8 + siblings.len() * 32);
    buf.extend_from_slice(&index.to_be_bytes());
    for s in siblings {
        buf.extend_from_slice(s);
    }
    label_hash.label_hash(&buf)
}

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PositionError {
    #[error("invalid node {input:?}: {reason}")]
    Parse { input: String, reason: &'static str },

    #[error("node {height}:{index} is a leaf and has no children")]
    LeafHasNoChildren { height: u64, index: u64 },

    #[error("child index of node {height}:{index} overflows u64")]
    IndexOverflow { height: u64, index: u64 },

    #[error("parent height of node {height}:{index} overflows u64")]
    HeightOverflow { height: u64, index: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("leaf count must be positive")]
    EmptyTree,

    #[error("challenge count must be positive")]
    ZeroChallenges,

    #[error("no candidate found in {leaf_count} leaves")]
    NoCandidate { leaf_count: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    #[error("leaf count must be positive")]
    EmptyTree,

    #[error("proven leaves: expected {expected} got {got}")]
    LeafCountMismatch { expected: usize, got: usize },

    #[error("proven leaf index {index} not in [0, {leaf_count})")]
    IndexOutOfRange { index: u64, leaf_count: u64 },

    #[error("proof nodes exhausted while folding node {height}:{index}")]
    ProofNodesExhausted { height: u64, index: u64 },

    #[error("{remaining} proof nodes left unused")]
    TrailingProofNodes { remaining: usize },

    #[error("merkle proof not valid: computed root does not match")]
    RootMismatch,

    #[error(transparent)]
    Position(#[from] PositionError),
}

#[derive(Debug, Error)]
pub enum StateFileError {
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("file {} is too small: {len} bytes", path.display())]
    TooSmall { path: PathBuf, len: u64 },

    #[error("wrong checksum 0x{saved:X}, computed 0x{computed:X}")]
    ChecksumMismatch { saved: u64, computed: u64 },

    #[error("decode {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("scale decode {}: {source}", path.display())]
    Scale {
        path: PathBuf,
        #[source]
        source: parity_scale_codec::Error,
    },
}

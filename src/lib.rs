#![forbid(unsafe_code)]
#![deny(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! spacemesh-tool: inspection helpers for Spacemesh node artifacts and PoET proofs.
//!
//! The library holds the pieces the `smtool` binary drives: Merkle node
//! position arithmetic, the Fiat–Shamir challenge derivation used by PoET,
//! a self-selecting root search for probing proof verifiers, a Merkle
//! multiproof verifier, and readers for checksummed node state files and
//! the SCALE-encoded NIPost state they carry.

// Fixed choices, matching the PoET service:
// - Hash: SHA-256 (32-byte output), seeded by the membership root
// - Labels: H(seed || BE64(index) || left siblings)
// - Merkle nodes: H(seed || left || right)
// - Fiat–Shamir: BE64(H(root || BE32(counter))[..8]) mod leaf_count
// - State files: payload || BE64(CRC-64/GO-ISO(payload)), SCALE payloads

pub mod types;
pub mod errors;
pub mod position;
pub mod hashers;
pub mod challenge;
pub mod search;
pub mod verifier;
pub mod state_file;
pub mod nipost;

pub use types::*;
pub use errors::{PositionError, SearchError, StateFileError, VerifyError};
pub use position::{parse_node, tree_height, Position};
pub use hashers::{make_label, LabelHash, MerkleHash, Sha256LabelHash, Sha256MerkleHash};
pub use challenge::{fiat_shamir, ChallengeSampler, ChallengeSet, FiatShamir};
pub use search::{assemble_probe_proof, find_self_selecting_root, run_poet_probe, ProbeReport};
pub use verifier::{compute_root, MultiProofVerifier, ProofVerifier};
pub use state_file::{read_checksummed, write_checksummed, PostMetadata};
pub use nipost::{load_scale, NipostBuilderState, NipostChallenge, Post};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

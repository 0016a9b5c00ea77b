//! Self-selecting root search used to probe PoET verifiers.
//!
//! A leaf label is used as the proof root, Fiat–Shamir then picks the proven
//! leaves from that root. A fixed point is a leaf index `i` whose own label
//! selects `i` as the smallest challenged index.

use tracing::{debug, info, warn};

use crate::{
    challenge::ChallengeSampler,
    errors::{SearchError, VerifyError},
    hashers::{make_label, LabelHash},
    types::{Candidate, MerkleProof, ProbeParams, ZERO_HASH},
    verifier::ProofVerifier,
};

/// Outcome of a probe: the root that was found and what the verifier said about it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProbeReport {
    pub candidate: Candidate,
    pub proof: MerkleProof,
    pub outcome: Result<(), VerifyError>,
}

/// Scan `[0, leaf_count)` for the first index whose label selects itself first.
///
/// # Errors
///
/// [`SearchError::EmptyTree`] / [`SearchError::ZeroChallenges`] for degenerate
/// parameters, and [`SearchError::NoCandidate`] when the scan is exhausted.
pub fn find_self_selecting_root<L, C>(
    leaf_count: u64,
    t: u64,
    label_hash: &L,
    sampler: &C,
) -> Result<Candidate, SearchError>
where
    L: LabelHash + ?Sized,
    C: ChallengeSampler + ?Sized,
{
    if leaf_count == 0 {
        return Err(SearchError::EmptyTree);
    }
    if t == 0 {
        return Err(SearchError::ZeroChallenges);
    }
    debug!(leaf_count, t, "searching for self-selecting root");
    for index in 0..leaf_count {
        let label = make_label(label_hash, index, None);
        if sampler.sample(&label, leaf_count, t).first() == Some(index) {
            info!(index, "candidate index");
            return Ok(Candidate { index, label });
        }
    }
    Err(SearchError::NoCandidate { leaf_count })
}

/// Proof with the candidate label as root and only the first proven leaf filled in.
///
/// The remaining slots stay zero and no proof nodes are supplied: this is the
/// malformed input handed to the verifier, not a usable membership proof.
#[must_use]
pub fn assemble_probe_proof<L, C>(
    candidate: &Candidate,
    leaf_count: u64,
    t: u64,
    label_hash: &L,
    sampler: &C,
) -> MerkleProof
where
    L: LabelHash + ?Sized,
    C: ChallengeSampler + ?Sized,
{
    let challenged = sampler.sample(&candidate.label, leaf_count, t);
    let slots = usize::try_from(t.min(leaf_count)).unwrap_or(usize::MAX);
    let mut proven_leaves = vec![ZERO_HASH; slots];
    if let (Some(first), Some(slot)) = (challenged.first(), proven_leaves.first_mut()) {
        *slot = make_label(label_hash, first, None);
    }
    MerkleProof { root: candidate.label, proven_leaves, proof_nodes: Vec::new() }
}

/// Search for a root, assemble the probe proof and submit it to `verifier`.
///
/// A verifier rejection is part of the report, not an error.
///
/// # Errors
///
/// Propagates [`SearchError`] from [`find_self_selecting_root`].
pub fn run_poet_probe<L, C, V>(
    params: &ProbeParams,
    label_hash: &L,
    sampler: &C,
    verifier: &V,
) -> Result<ProbeReport, SearchError>
where
    L: LabelHash + ?Sized,
    C: ChallengeSampler + ?Sized,
    V: ProofVerifier + ?Sized,
{
    let candidate =
        find_self_selecting_root(params.leaf_count, params.challenges, label_hash, sampler)?;
    let proof =
        assemble_probe_proof(&candidate, params.leaf_count, params.challenges, label_hash, sampler);
    let outcome = verifier.verify(&proof, params.leaf_count, params.challenges);
    match &outcome {
        Ok(()) => warn!(index = candidate.index, "verifier accepted probe proof"),
        Err(e) => debug!(error = %e, "verifier rejected probe proof"),
    }
    Ok(ProbeReport { candidate, proof, outcome })
}

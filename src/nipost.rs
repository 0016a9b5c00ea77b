//! SCALE-encoded NIPost state files kept by the node between ATX rounds.
//!
//! Both files use the checksummed layout read by [`read_checksummed`]; the
//! payload is the SCALE encoding of the structs below.

use std::path::Path;

use parity_scale_codec::{Decode, Input};
use tracing::debug;

use crate::{errors::StateFileError, state_file::read_checksummed, types::Hash256};

/// Proof of space attached to a node's first ATX.
#[derive(Clone, Debug, PartialEq, Eq, Decode)]
pub struct Post {
    #[codec(compact)]
    pub nonce: u32,
    pub indices: Vec<u8>,
    #[codec(compact)]
    pub pow: u64,
}

/// Contents of `nipost_challenge.bin`.
#[derive(Clone, Debug, PartialEq, Eq, Decode)]
pub struct NipostChallenge {
    #[codec(compact)]
    pub publish_epoch: u32,
    /// Number of ATXs this node published before.
    #[codec(compact)]
    pub sequence: u64,
    pub prev_atx_id: Hash256,
    pub positioning_atx: Hash256,
    /// Only set for the initial ATX.
    pub commitment_atx: Option<Hash256>,
    pub initial_post: Option<Post>,
}

impl NipostChallenge {
    pub fn load(path: &Path) -> Result<Self, StateFileError> {
        load_scale(path)
    }
}

/// Head of `nipost_builder_state.bin`.
///
/// Only the challenge hash is decoded. The NIPost, PoET requests and proof
/// reference that follow are kept as undecoded bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NipostBuilderState {
    pub challenge: Hash256,
    pub tail: Vec<u8>,
}

impl Decode for NipostBuilderState {
    fn decode<I: Input>(input: &mut I) -> Result<Self, parity_scale_codec::Error> {
        let challenge = Hash256::decode(input)?;
        let mut tail = vec![0u8; input.remaining_len()?.unwrap_or_default()];
        input.read(&mut tail)?;
        Ok(Self { challenge, tail })
    }
}

impl NipostBuilderState {
    pub fn load(path: &Path) -> Result<Self, StateFileError> {
        load_scale(path)
    }
}

/// Verify the checksum trailer of `path` and SCALE-decode the payload as `T`.
///
/// Bytes left after `T` are ignored.
///
/// # Errors
///
/// Everything [`read_checksummed`] reports, and [`StateFileError::Scale`] for
/// payloads that do not decode.
pub fn load_scale<T: Decode>(path: &Path) -> Result<T, StateFileError> {
    let payload = read_checksummed(path)?;
    let mut input = payload.as_slice();
    let value = T::decode(&mut input)
        .map_err(|source| StateFileError::Scale { path: path.to_path_buf(), source })?;
    if !input.is_empty() {
        debug!(path = %path.display(), trailing = input.len(), "bytes left after scale value");
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state_file::write_checksummed;
    use tempfile::tempdir;

    // epoch 5, sequence 2, prev 0x11.., positioning 0x22..
    fn encoded_challenge(commitment: Option<u8>, post: bool) -> Vec<u8> {
        let mut out = vec![0x14, 0x08];
        out.extend_from_slice(&[0x11; 32]);
        out.extend_from_slice(&[0x22; 32]);
        match commitment {
            Some(b) => {
                out.push(1);
                out.extend_from_slice(&[b; 32]);
            }
            None => out.push(0),
        }
        if post {
            // nonce 7, indices [1, 2, 3], pow 9
            out.extend_from_slice(&[1, 0x1c, 0x0c, 1, 2, 3, 0x24]);
        } else {
            out.push(0);
        }
        out
    }

    #[test]
    fn challenge_without_commitment() {
        let ch = NipostChallenge::decode(&mut encoded_challenge(None, false).as_slice()).unwrap();
        assert_eq!(ch.publish_epoch, 5);
        assert_eq!(ch.sequence, 2);
        assert_eq!(ch.prev_atx_id, [0x11; 32]);
        assert_eq!(ch.positioning_atx, [0x22; 32]);
        assert_eq!(ch.commitment_atx, None);
        assert_eq!(ch.initial_post, None);
    }

    #[test]
    fn initial_challenge_with_post() {
        let ch = NipostChallenge::decode(&mut encoded_challenge(Some(0x33), true).as_slice()).unwrap();
        assert_eq!(ch.commitment_atx, Some([0x33; 32]));
        assert_eq!(ch.initial_post, Some(Post { nonce: 7, indices: vec![1, 2, 3], pow: 9 }));
    }

    #[test]
    fn challenge_file_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nipost_challenge.bin");
        write_checksummed(&path, &encoded_challenge(Some(0x33), false)).unwrap();
        let ch = NipostChallenge::load(&path).unwrap();
        assert_eq!(ch.commitment_atx, Some([0x33; 32]));
    }

    #[test]
    fn truncated_challenge_is_a_scale_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nipost_challenge.bin");
        let mut payload = encoded_challenge(None, false);
        payload.truncate(40);
        write_checksummed(&path, &payload).unwrap();
        assert!(matches!(NipostChallenge::load(&path), Err(StateFileError::Scale { .. })));
    }

    #[test]
    fn builder_state_keeps_tail() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nipost_builder_state.bin");
        let mut payload = vec![0xab; 32];
        payload.extend_from_slice(&[0, 0, 7]);
        write_checksummed(&path, &payload).unwrap();
        let bs = NipostBuilderState::load(&path).unwrap();
        assert_eq!(bs.challenge, [0xab; 32]);
        assert_eq!(bs.tail, vec![0, 0, 7]);

        write_checksummed(&path, &[0xab; 31]).unwrap();
        assert!(matches!(NipostBuilderState::load(&path), Err(StateFileError::Scale { .. })));
    }
}

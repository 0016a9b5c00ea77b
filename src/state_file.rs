//! Node state files: checksummed binary blobs and the post-data metadata JSON.

use std::fs;
use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use crc::{Crc, CRC_64_GO_ISO};
use serde::{Deserialize, Deserializer};
use tracing::debug;

use crate::{errors::StateFileError, types::CHECKSUM_LEN};

const CRC64: Crc<u64> = Crc::<u64>::new(&CRC_64_GO_ISO);

/// CRC-64 (Go `crc64.ISO` table) of `data`.
#[must_use]
pub fn checksum(data: &[u8]) -> u64 {
    CRC64.checksum(data)
}

/// Read `payload || BE64(crc64(payload))` and return the verified payload.
///
/// # Errors
///
/// I/O failures, files shorter than the trailer, and checksum mismatches.
pub fn read_checksummed(path: &Path) -> Result<Vec<u8>, StateFileError> {
    let mut data = fs::read(path)
        .map_err(|source| StateFileError::Io { path: path.to_path_buf(), source })?;
    if data.len() < CHECKSUM_LEN {
        return Err(StateFileError::TooSmall { path: path.to_path_buf(), len: data.len() as u64 });
    }
    let split = data.len() - CHECKSUM_LEN;
    let mut trailer = [0u8; CHECKSUM_LEN];
    trailer.copy_from_slice(&data[split..]);
    data.truncate(split);

    let saved = u64::from_be_bytes(trailer);
    let computed = checksum(&data);
    if saved != computed {
        return Err(StateFileError::ChecksumMismatch { saved, computed });
    }
    debug!(path = %path.display(), payload_len = data.len(), "checksum ok");
    Ok(data)
}

/// Write `payload` followed by its BE64 checksum.
///
/// # Errors
///
/// I/O failures.
pub fn write_checksummed(path: &Path, payload: &[u8]) -> Result<(), StateFileError> {
    let mut out = Vec::with_capacity(payload.len() + CHECKSUM_LEN);
    out.extend_from_slice(payload);
    out.extend_from_slice(&checksum(payload).to_be_bytes());
    fs::write(path, out).map_err(|source| StateFileError::Io { path: path.to_path_buf(), source })
}

/// Contents of `postdata_metadata.json`.
///
/// Missing fields decode as zero or empty, as Go's `encoding/json` leaves them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PostMetadata {
    #[serde(deserialize_with = "base64_bytes")]
    pub node_id: Vec<u8>,
    #[serde(deserialize_with = "base64_bytes")]
    pub commitment_atx_id: Vec<u8>,
    pub labels_per_unit: u64,
    pub num_units: u32,
    pub max_file_size: u64,
    pub nonce: Option<u64>,
    pub last_position: Option<u64>,
}

impl PostMetadata {
    /// Decode the metadata file at `path`.
    ///
    /// # Errors
    ///
    /// I/O failures and malformed JSON.
    pub fn load(path: &Path) -> Result<Self, StateFileError> {
        let raw = fs::read(path)
            .map_err(|source| StateFileError::Io { path: path.to_path_buf(), source })?;
        serde_json::from_slice(&raw)
            .map_err(|source| StateFileError::Json { path: path.to_path_buf(), source })
    }

    /// Total labels committed to: `labels_per_unit * num_units`.
    #[must_use]
    pub fn total_labels(&self) -> u64 {
        self.labels_per_unit.saturating_mul(u64::from(self.num_units))
    }
}

// Go encodes []byte as standard base64, nil as null.
fn base64_bytes<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
    Option::<String>::deserialize(d)?
        .map_or_else(|| Ok(Vec::new()), |s| STANDARD.decode(s).map_err(serde::de::Error::custom))
}

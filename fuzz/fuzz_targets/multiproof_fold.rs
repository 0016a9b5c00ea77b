#![no_main]

use libfuzzer_sys::fuzz_target;
use spacemesh_tool::{compute_root, Position, Sha256MerkleHash};

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 { return; }
    let height = u64::from(data[0] % 12);
    let width = 1u64 << height;

    // Leaf indices from the next bytes, sorted and distinct
    let count = usize::from(data[1] % 16);
    let mut indices: Vec<u64> = data[2..].iter().take(count).map(|b| u64::from(*b) % width).collect();
    indices.sort_unstable();
    indices.dedup();
    let leaves: Vec<_> = indices.iter().map(|&i| (Position::leaf(i), [i as u8; 32])).collect();

    let rest = data.len().saturating_sub(2 + count);
    let proof_nodes = vec![[0xAAu8; 32]; rest % 64];

    let _ = compute_root(&leaves, &proof_nodes, height, &Sha256MerkleHash::default());
});

//! Hash function backing bid commitments.
//!
//! Commitment helpers take the hash function as a parameter; this is the one the auction seals
//! and verifies blind bids with.

use alloy_primitives::B256;
use tiny_keccak::{Hasher, Keccak};

/// Keccak-256 digest of `bytes`, matching the EVM `keccak256` opcode.
pub fn keccak256(bytes: &[u8]) -> B256 {
    let mut digest: B256 = B256::ZERO;
    let mut keccak: Keccak = Keccak::v256();
    keccak.update(bytes);
    keccak.finalize(&mut digest.0);
    digest
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::b256;

    #[test]
    fn test_keccak256_matches_alloy() {
        for len in [1usize, 31, 32, 52, 135, 136, 137, 300] {
            let bytes: Vec<u8> = (0..len).map(|_| rand::random::<u8>()).collect();
            assert_eq!(keccak256(&bytes), alloy_primitives::keccak256(&bytes));
        }
    }

    #[test]
    fn test_keccak256_empty() {
        assert_eq!(
            keccak256(&[]),
            b256!("c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470")
        );
    }
}

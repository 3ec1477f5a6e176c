use alloy_primitives::{Address, B256, U256};
use alloy_sol_types::{sol, SolValue};
use serde::{Deserialize, Serialize};

sol! {
    /// A `SealedPrice` is the preimage of a blind bid commitment
    #[derive(Serialize, Deserialize, PartialEq, Eq, Debug)]
    struct SealedPrice {
        /// The address of the bidder committing to the price
        address bidder;
        /// The declared price, scaled by 10^18
        uint256 price;
    }
}

/// Computes the commitment binding `bidder` to `price`.
///
/// The commitment is the hash of `abi.encodePacked(bidder, price)`, so it can be reproduced
/// onchain with `keccak256(abi.encodePacked(msg.sender, price))`.
///
/// # Arguments
///
/// * `hash_function` - A function that computes a 32-byte hash from a byte slice.
/// * `bidder` - The address of the committing bidder.
/// * `price` - The price being committed to.
pub fn commit<F: Fn(&[u8]) -> B256>(hash_function: &F, bidder: &Address, price: &U256) -> B256 {
    hash_function(
        &SealedPrice {
            bidder: *bidder,
            price: *price,
        }
        .abi_encode_packed(),
    )
}

/// Returns true if `commitment` was produced by `bidder` committing to `price`.
pub fn verify<F: Fn(&[u8]) -> B256>(
    hash_function: &F,
    commitment: &B256,
    bidder: &Address,
    price: &U256,
) -> bool {
    commit(hash_function, bidder, price) == *commitment
}

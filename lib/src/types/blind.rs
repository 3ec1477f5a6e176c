use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

/// A sealed bid placed during the blind round.
#[derive(PartialEq, Eq, Debug, Clone, Serialize, Deserialize)]
pub struct BlindBid {
    /// Address of the bidder.
    pub bidder: Address,
    /// Hash binding the bidder to the price that will be revealed later.
    pub commitment: B256,
}

/// The commit phase of the auction.
#[derive(PartialEq, Eq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlindRound {
    /// Sealed bids in arrival order.
    pub bids: Vec<BlindBid>,
    /// Entry fees collected from every sealed bid.
    pub raised_funds: U256,
    /// Set once the reveal succeeded.
    pub ended: bool,
}

impl BlindRound {
    /// Returns true if `bidder` has a sealed bid on file.
    pub fn has_bidder(&self, bidder: &Address) -> bool {
        self.bids.iter().any(|bid: &BlindBid| bid.bidder == *bidder)
    }
}

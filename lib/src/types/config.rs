use crate::errors::AuctionError;
use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// Construction parameters of an auction, supplied once by the deployer.
#[derive(PartialEq, Eq, Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuctionConfig {
    /// The auction's own account in the escrow token and prize asset ledgers.
    pub custody: Address,
    /// Privileged operator of the auction.
    pub broker: Address,
    /// Fee paid for every blind bid and every position selected, scaled by 10^18.
    pub entry_fee: U256,
    /// Funds the blind round must raise before it can be sealed.
    pub min_raised_funds: U256,
    /// Identifier of the prize asset held in custody.
    pub prize_id: U256,
}

impl AuctionConfig {
    /// Checks the configuration can back an auction.
    pub fn validate(&self) -> Result<(), AuctionError> {
        if self.entry_fee.is_zero() {
            return Err(AuctionError::InvalidConfig("entry fee must be positive"));
        }
        if self.min_raised_funds.is_zero() {
            return Err(AuctionError::InvalidConfig(
                "minimum raised funds must be positive",
            ));
        }
        if self.broker == Address::ZERO {
            return Err(AuctionError::InvalidConfig("broker must be set"));
        }
        if self.custody == Address::ZERO {
            return Err(AuctionError::InvalidConfig("custody account must be set"));
        }
        Ok(())
    }
}

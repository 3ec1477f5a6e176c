//! Commit-reveal phase of the auction.
//!
//! Bidders seal a commitment to their price while the round is open. The broker later reveals
//! every price at once; the reveal is either fully verified and applied or rejected as a whole.

use crate::constants::LOG_TARGET;
use crate::errors::AuctionError;
use crate::types::blind::{BlindBid, BlindRound};
use crate::types::commitments::verify;
use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

/// A bidder and the price they revealed.
pub type Reveal = (Address, U256);

/// Keeps the sealed bids and every commitment value ever used.
#[derive(PartialEq, Eq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlindRoundManager {
    round: BlindRound,
    used_commitments: BTreeSet<B256>,
}

impl BlindRoundManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the underlying blind round.
    pub fn round(&self) -> &BlindRound {
        &self.round
    }

    pub fn is_sealed(&self) -> bool {
        self.round.ended
    }

    /// Fails with `AuctionError::RoundSealed` once the round was sealed.
    pub fn ensure_open(&self) -> Result<(), AuctionError> {
        if self.round.ended {
            return Err(AuctionError::RoundSealed);
        }
        Ok(())
    }

    /// Records a sealed bid and adds `entry_fee` to the raised funds.
    ///
    /// # Errors
    ///
    /// * `AuctionError::RoundSealed` if the round was sealed.
    /// * `AuctionError::DuplicateBid` if `bidder` already sealed a bid, or if `commitment` was
    ///   ever used by anyone.
    pub fn submit(
        &mut self,
        bidder: Address,
        commitment: B256,
        entry_fee: U256,
    ) -> Result<(), AuctionError> {
        self.ensure_open()?;
        if self.round.has_bidder(&bidder) || self.used_commitments.contains(&commitment) {
            return Err(AuctionError::DuplicateBid);
        }

        self.used_commitments.insert(commitment);
        self.round.bids.push(BlindBid { bidder, commitment });
        self.round.raised_funds = self.round.raised_funds.saturating_add(entry_fee);
        debug!(target: LOG_TARGET, %bidder, %commitment, "blind bid recorded");
        Ok(())
    }

    /// Verifies `revealed_prices` against the sealed bids and seals the round.
    ///
    /// `revealed_prices[i]` is the price of the `i`-th sealed bid. Nothing changes unless every
    /// price matches its commitment.
    ///
    /// # Returns
    ///
    /// The bidders and their revealed prices, in bid order.
    ///
    /// # Errors
    ///
    /// * `AuctionError::AlreadySealed` if the round was sealed.
    /// * `AuctionError::NoBidders` if no bid was sealed.
    /// * `AuctionError::MismatchedRevealCount` if the number of prices differs from the number
    ///   of bids.
    /// * `AuctionError::InsufficientRaisedFunds` if the raised funds are below `min_raised_funds`.
    /// * `AuctionError::InvalidReveal` naming the first bidder whose price does not match, or
    ///   whose price is zero. A zero price would be carried into every later round and drag the
    ///   target price of any round holding it down to zero.
    pub fn seal<F: Fn(&[u8]) -> B256>(
        &mut self,
        hash_function: &F,
        revealed_prices: &[U256],
        min_raised_funds: U256,
    ) -> Result<Vec<Reveal>, AuctionError> {
        if self.round.ended {
            return Err(AuctionError::AlreadySealed);
        }
        if self.round.bids.is_empty() {
            return Err(AuctionError::NoBidders);
        }
        if revealed_prices.len() != self.round.bids.len() {
            return Err(AuctionError::MismatchedRevealCount {
                expected: self.round.bids.len(),
                got: revealed_prices.len(),
            });
        }
        if self.round.raised_funds < min_raised_funds {
            return Err(AuctionError::InsufficientRaisedFunds {
                raised: self.round.raised_funds,
                required: min_raised_funds,
            });
        }

        let reveals: Vec<Reveal> = self
            .round
            .bids
            .iter()
            .zip(revealed_prices)
            .map(|(bid, price): (&BlindBid, &U256)| {
                let honest: bool = !price.is_zero()
                    && verify(hash_function, &bid.commitment, &bid.bidder, price);
                if honest {
                    Ok((bid.bidder, *price))
                } else {
                    Err(AuctionError::InvalidReveal(bid.bidder))
                }
            })
            .collect::<Result<_, _>>()?;

        self.round.ended = true;
        Ok(reveals)
    }
}

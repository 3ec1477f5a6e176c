use super::positions::{PositionArena, Positions};
use super::{BidderId, Lookup};
use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Prices a participant declared during a round.
#[derive(PartialEq, Eq, Debug, Clone, Serialize, Deserialize)]
pub struct BidderInfo {
    /// Address of the participant.
    pub bidder: Address,
    /// Declared prices in selection order. Never contains the same price twice.
    pub prices: Vec<U256>,
}

impl BidderInfo {
    pub fn new(bidder: Address) -> Self {
        Self {
            bidder,
            prices: Vec::new(),
        }
    }

    pub fn has_declared(&self, price: &U256) -> bool {
        self.prices.contains(price)
    }
}

/// A single round of the descending phase.
#[derive(PartialEq, Eq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct Round {
    /// Price clusters of the round.
    pub positions: Positions,
    /// Participants that acted during the round, in order of first action.
    pub bidders: Vec<BidderInfo>,
    /// Price each bidder carries into the following round, filled when the round is sealed.
    pub next_prices: BTreeMap<Address, U256>,
    /// Number of selection calls accepted during the round.
    pub actions: usize,
    /// Set once the round was advanced.
    pub ended: bool,
}

impl Round {
    /// Creates a round holding no positions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up the bidder entry of `bidder`.
    pub fn find_bidder(&self, bidder: &Address) -> Lookup<BidderId> {
        match self.bidders.iter().position(|info: &BidderInfo| info.bidder == *bidder) {
            Some(index) => Lookup::Found(BidderId(index)),
            None => Lookup::NotFound,
        }
    }

    /// Returns the bidder entry of `bidder`, creating an empty one if absent.
    pub fn bidder_entry(&mut self, bidder: Address) -> BidderId {
        match self.find_bidder(&bidder) {
            Lookup::Found(id) => id,
            Lookup::NotFound => {
                self.bidders.push(BidderInfo::new(bidder));
                BidderId(self.bidders.len() - 1)
            }
        }
    }

    /// Returns the prices `bidder` declared this round, empty if they did not act.
    pub fn declared_prices(&self, bidder: &Address) -> &[U256] {
        match self.find_bidder(bidder) {
            Lookup::Found(id) => &self.bidders[id.0].prices,
            Lookup::NotFound => &[],
        }
    }

    /// Returns true if the round cannot accept another selection.
    pub fn is_saturated(&self) -> bool {
        self.actions >= self.positions.len()
    }

    /// Prices of every position of the round, in position order.
    pub fn position_prices(&self) -> Vec<U256> {
        self.positions.iter().map(|position| position.price).collect()
    }

    /// Places `bidder` on the position at `price` for this round.
    pub fn seat(&mut self, price: U256, bidder: Address) {
        self.positions.add_rewarder(price, bidder);
    }
}

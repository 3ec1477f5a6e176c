//! The descending rounds that follow the blind round.
//!
//! Every round holds a set of positions. Participants select positions of the current round,
//! paying the entry fee to the position's rewarders. When the round is advanced, each
//! participant's declared prices are folded together with the prices they carried out of every
//! earlier round into a geometric mean, which seats them on a position of the next round.

use crate::blind::Reveal;
use crate::constants::LOG_TARGET;
use crate::errors::AuctionError;
use crate::pricing::{geometric_mean, quantile_target};
use crate::types::blind::BlindRound;
use crate::types::positions::Position;
use crate::types::rounds::Round;
use crate::types::BidderId;
use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Part of an entry fee owed to one rewarder of a selected position.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub struct RewardShare {
    pub rewarder: Address,
    pub amount: U256,
}

/// Outcome of an accepted position selection.
#[derive(PartialEq, Eq, Debug, Clone)]
pub struct Selection {
    /// Prices of the selected positions, in selection order.
    pub prices: Vec<U256>,
    /// Entry fee shares to credit.
    pub shares: Vec<RewardShare>,
}

impl Selection {
    /// Returns the sum of every share, which may fall short of the fees paid by the division
    /// remainders.
    pub fn total_shared(&self) -> U256 {
        self.shares
            .iter()
            .fold(U256::ZERO, |acc: U256, share: &RewardShare| acc + share.amount)
    }
}

/// Arena of rounds. Round `i` lives at index `i` and is never mutated once sealed.
#[derive(PartialEq, Eq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoundEngine {
    rounds: Vec<Round>,
    current: usize,
}

impl RoundEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true once the blind round has been materialised as round zero.
    pub fn is_open(&self) -> bool {
        !self.rounds.is_empty()
    }

    /// Index of the round currently accepting selections.
    pub fn current(&self) -> usize {
        self.current
    }

    pub fn round(&self, index: usize) -> Option<&Round> {
        self.rounds.get(index)
    }

    pub fn current_round(&self) -> Option<&Round> {
        self.rounds.get(self.current)
    }

    /// Opens round zero, seating every revealed bidder on the position of their price.
    ///
    /// # Returns
    ///
    /// The number of positions of round zero.
    pub fn open(&mut self, reveals: &[Reveal]) -> usize {
        let mut round: Round = Round::new();
        for (bidder, price) in reveals {
            round.seat(*price, *bidder);
        }
        let positions: usize = round.positions.len();
        self.rounds = vec![round];
        self.current = 0;
        positions
    }

    /// Fails unless `round` is the open, unsealed round.
    pub fn ensure_current(&self, round: usize) -> Result<(), AuctionError> {
        match self.rounds.get(round) {
            None => Err(AuctionError::UnknownRound(round)),
            Some(entry) if entry.ended || round != self.current => {
                Err(AuctionError::RoundAlreadySealed(round))
            }
            Some(_) => Ok(()),
        }
    }

    /// Returns true if `participant` sealed a blind bid and acted in every round before `round`.
    pub fn has_lineage(&self, blind: &BlindRound, participant: &Address, round: usize) -> bool {
        blind.has_bidder(participant)
            && self.rounds.get(..round).map_or(false, |previous: &[Round]| {
                previous
                    .iter()
                    .all(|entry: &Round| entry.find_bidder(participant).found().is_some())
            })
    }

    /// Selects the positions at `indexes` of `round` on behalf of `participant`.
    ///
    /// Each selected position splits `entry_fee` evenly among its rewarders; the remainder of
    /// the division is not distributed. A call counts as one action of the round regardless of
    /// how many positions it selects.
    ///
    /// # Errors
    ///
    /// * `AuctionError::UnknownRound` or `AuctionError::RoundAlreadySealed` if `round` is not
    ///   the open round.
    /// * `AuctionError::EmptySelection` if `indexes` is empty.
    /// * `AuctionError::PositionOutOfBounds` for an index past the last position.
    /// * `AuctionError::Overflow` if the round already counts as many actions as positions.
    /// * `AuctionError::UnprovenParticipant` if `participant` skipped the blind round or any
    ///   earlier round.
    /// * `AuctionError::DuplicateBid` if a selected price was already declared by
    ///   `participant` this round, or appears twice in `indexes`.
    pub fn select_positions(
        &mut self,
        blind: &BlindRound,
        round: usize,
        participant: Address,
        indexes: &[usize],
        entry_fee: U256,
    ) -> Result<Selection, AuctionError> {
        self.ensure_current(round)?;
        if indexes.is_empty() {
            return Err(AuctionError::EmptySelection);
        }

        let entry: &Round = &self.rounds[round];
        let len: usize = entry.positions.len();
        if let Some(index) = indexes.iter().find(|index: &&usize| **index >= len) {
            return Err(AuctionError::PositionOutOfBounds { index: *index, len });
        }
        if entry.is_saturated() {
            return Err(AuctionError::Overflow);
        }
        if !self.has_lineage(blind, &participant, round) {
            return Err(AuctionError::UnprovenParticipant(participant));
        }

        let declared: &[U256] = entry.declared_prices(&participant);
        let mut prices: Vec<U256> = Vec::with_capacity(indexes.len());
        let mut shares: Vec<RewardShare> = Vec::new();
        for index in indexes {
            let position: &Position = &entry.positions[*index];
            if declared.contains(&position.price) || prices.contains(&position.price) {
                return Err(AuctionError::DuplicateBid);
            }
            prices.push(position.price);

            let count: U256 = U256::from(position.rewarders.len());
            if count.is_zero() {
                continue;
            }
            let amount: U256 = entry_fee / count;
            shares.extend(
                position
                    .rewarders
                    .iter()
                    .map(|rewarder: &Address| RewardShare {
                        rewarder: *rewarder,
                        amount,
                    }),
            );
        }

        let entry: &mut Round = &mut self.rounds[round];
        let id: BidderId = entry.bidder_entry(participant);
        entry.bidders[id.0].prices.extend_from_slice(&prices);
        entry.actions += 1;

        Ok(Selection { prices, shares })
    }

    /// Seals `round` and opens the next one.
    ///
    /// Every bidder of `round` is seated in the next round at the geometric mean of their price
    /// trail: the prices they declared in `round` followed by the price they carried out of each
    /// earlier round.
    ///
    /// # Returns
    ///
    /// The index of the newly opened round.
    ///
    /// # Errors
    ///
    /// * `AuctionError::UnknownRound` or `AuctionError::RoundAlreadySealed` if `round` is not
    ///   the open round.
    /// * `AuctionError::NoBidders` if nobody acted during `round`.
    /// * `AuctionError::UnprovenParticipant` if a bidder lacks a carried price for an earlier
    ///   round.
    /// * `AuctionError::Pricing` if a geometric mean cannot be computed.
    pub fn advance(&mut self, round: usize) -> Result<usize, AuctionError> {
        self.ensure_current(round)?;
        let entry: &Round = &self.rounds[round];
        if entry.bidders.is_empty() {
            return Err(AuctionError::NoBidders);
        }

        let mut carried: Vec<(Address, U256)> = Vec::with_capacity(entry.bidders.len());
        for info in &entry.bidders {
            let mut trail: Vec<U256> = info.prices.clone();
            for previous in &self.rounds[..round] {
                let price: U256 = *previous
                    .next_prices
                    .get(&info.bidder)
                    .ok_or(AuctionError::UnprovenParticipant(info.bidder))?;
                trail.push(price);
            }
            let price: U256 = geometric_mean(&trail)?;
            debug!(
                target: LOG_TARGET,
                round,
                bidder = %info.bidder,
                trail = trail.len(),
                %price,
                "price carried forward"
            );
            carried.push((info.bidder, price));
        }

        let mut next: Round = Round::new();
        let entry: &mut Round = &mut self.rounds[round];
        for (bidder, price) in carried {
            next.seat(price, bidder);
            entry.next_prices.insert(bidder, price);
        }
        entry.ended = true;

        self.rounds.push(next);
        self.current = round + 1;
        Ok(self.current)
    }

    /// Returns the quantile-sampled geometric mean of the position prices of `round`.
    pub fn target_price(&self, round: usize) -> Result<U256, AuctionError> {
        let entry: &Round = self
            .rounds
            .get(round)
            .ok_or(AuctionError::UnknownRound(round))?;
        Ok(quantile_target(&entry.position_prices())?)
    }
}

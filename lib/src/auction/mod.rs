//! The auction state machine.
//!
//! An auction moves from the blind round through rounds `0..n` to its conclusion:
//!
//! 1. Bidders seal commitments to a price, paying the entry fee ([`Auction::submit_blind_bid`]).
//! 2. The broker reveals every price at once, which seats each bidder on a position of round
//!    zero ([`Auction::seal_blind_round`]).
//! 3. In each round bidders select positions, paying the entry fee to the position's rewarders
//!    ([`Auction::select_positions`]), until the round is advanced ([`Auction::advance_round`]).
//! 4. Once few enough positions remain, the position closest to the round's target price wins
//!    ([`Auction::conclude_auction`]) and its first rewarder may claim the prize.
//!
//! Every operation either applies completely or not at all. Changes are staged on a copy of the
//! state, the escrow or prize transfer (if any) runs last, and the copy replaces the state only
//! once that transfer succeeded.

use crate::blind::{BlindRoundManager, Reveal};
use crate::constants::{LOG_TARGET, MIN_POSITIONS};
use crate::errors::AuctionError;
use crate::external::{EscrowToken, PrizeAsset};
use crate::hashing::keccak256;
use crate::ledger::RewardLedger;
use crate::pricing::quantile_target;
use crate::rounds::{RoundEngine, Selection};
use crate::types::blind::BlindBid;
use crate::types::config::AuctionConfig;
use crate::types::events::{AuctionEvent, AuctionEvents};
use crate::types::positions::Position;
use crate::types::rounds::{BidderInfo, Round};
use alloy_primitives::{Address, B256, U256};
use tracing::{info, warn};

/// Phase of the auction state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Sealed bids are being collected.
    Blind,
    /// The given round accepts position selections.
    Round(usize),
    /// A winner was chosen. Terminal.
    Concluded,
}

/// Mutable state of an auction, staged and swapped as a whole by every operation.
#[derive(Debug, Clone, Default)]
struct AuctionState {
    blind: BlindRoundManager,
    rounds: RoundEngine,
    ledger: RewardLedger,
    winner: Option<Address>,
    winning_price: U256,
    prize_claimed: bool,
}

/// A descending consensus auction over one prize asset.
pub struct Auction<E: EscrowToken, P: PrizeAsset> {
    config: AuctionConfig,
    state: AuctionState,
    escrow: E,
    prize: P,
    events: AuctionEvents,
}

impl<E: EscrowToken, P: PrizeAsset> Auction<E, P> {
    /// Creates an auction in its blind phase.
    ///
    /// # Errors
    ///
    /// `AuctionError::InvalidConfig` if `config` fails validation.
    pub fn new(config: AuctionConfig, escrow: E, prize: P) -> Result<Self, AuctionError> {
        config.validate()?;
        info!(
            target: LOG_TARGET,
            broker = %config.broker,
            entry_fee = %config.entry_fee,
            min_raised_funds = %config.min_raised_funds,
            "auction created"
        );
        Ok(Self {
            config,
            state: AuctionState::default(),
            escrow,
            prize,
            events: AuctionEvents::new(),
        })
    }

    /// Seals a commitment to a price on behalf of `bidder` and collects the entry fee.
    ///
    /// # Errors
    ///
    /// * `AuctionError::RoundSealed` once the blind round was sealed.
    /// * `AuctionError::InsufficientFunds` if `bidder` cannot pay the entry fee.
    /// * `AuctionError::DuplicateBid` if `bidder` already bid or `commitment` was already used.
    /// * `AuctionError::Transfer` if the escrow rejects the fee transfer.
    pub fn submit_blind_bid(
        &mut self,
        bidder: Address,
        commitment: B256,
    ) -> Result<(), AuctionError> {
        self.state.blind.ensure_open()?;
        let fee: U256 = self.config.entry_fee;
        self.ensure_funds(&bidder, fee)?;

        let mut staged: AuctionState = self.state.clone();
        staged.blind.submit(bidder, commitment, fee)?;

        self.pull_funds(&bidder, fee)?;
        self.commit(staged, vec![AuctionEvent::BidEntered { bidder, amount: fee }]);
        Ok(())
    }

    /// Reveals every sealed price and opens round zero. Broker only.
    ///
    /// `revealed_prices[i]` is the price of the `i`-th sealed bid. If any price fails to match
    /// its commitment, nothing is revealed and the blind round stays open.
    ///
    /// # Errors
    ///
    /// * `AuctionError::NotBroker` if `caller` is not the broker.
    /// * Any error of [`BlindRoundManager::seal`].
    pub fn seal_blind_round(
        &mut self,
        caller: Address,
        revealed_prices: &[U256],
    ) -> Result<(), AuctionError> {
        self.ensure_broker(&caller)?;

        let mut staged: AuctionState = self.state.clone();
        let reveals: Vec<Reveal> = staged.blind.seal(
            &keccak256,
            revealed_prices,
            self.config.min_raised_funds,
        )?;
        let positions: usize = staged.rounds.open(&reveals);

        self.commit(staged, vec![AuctionEvent::RoundStarted { round: 0, positions }]);
        Ok(())
    }

    /// Selects a single position of `round`. See [`Auction::select_positions`].
    pub fn select_position(
        &mut self,
        participant: Address,
        round: usize,
        index: usize,
    ) -> Result<(), AuctionError> {
        self.select_positions(participant, round, &[index])
    }

    /// Selects the positions at `indexes` of `round`, paying the entry fee once per position.
    ///
    /// Each fee is split evenly among the rewarders of its position and credited to their
    /// reward balances.
    ///
    /// # Errors
    ///
    /// * `AuctionError::AlreadyConcluded` once a winner was chosen.
    /// * `AuctionError::StillInBlindPhase` before the blind round was sealed.
    /// * `AuctionError::InsufficientFunds` if `participant` cannot pay every fee.
    /// * Any error of [`RoundEngine::select_positions`].
    /// * `AuctionError::Transfer` if the escrow rejects the fee transfer.
    pub fn select_positions(
        &mut self,
        participant: Address,
        round: usize,
        indexes: &[usize],
    ) -> Result<(), AuctionError> {
        self.ensure_running()?;
        self.state.rounds.ensure_current(round)?;
        let fee: U256 = self.config.entry_fee;
        let total: U256 = fee.saturating_mul(U256::from(indexes.len()));
        self.ensure_funds(&participant, total)?;

        let mut staged: AuctionState = self.state.clone();
        let selection: Selection = staged.rounds.select_positions(
            staged.blind.round(),
            round,
            participant,
            indexes,
            fee,
        )?;
        for share in &selection.shares {
            staged.ledger.credit(&share.rewarder, share.amount);
        }

        self.pull_funds(&participant, total)?;
        self.commit(
            staged,
            vec![AuctionEvent::PositionSelected {
                round,
                bidder: participant,
                prices: selection.prices,
                amount: total,
            }],
        );
        Ok(())
    }

    /// Seals `round`, carrying every bidder's price into the next round.
    ///
    /// # Errors
    ///
    /// * `AuctionError::AlreadyConcluded` once a winner was chosen.
    /// * `AuctionError::StillInBlindPhase` before the blind round was sealed.
    /// * Any error of [`RoundEngine::advance`].
    pub fn advance_round(&mut self, round: usize) -> Result<usize, AuctionError> {
        self.ensure_running()?;

        let mut staged: AuctionState = self.state.clone();
        let next: usize = staged.rounds.advance(round)?;
        let positions: usize = staged
            .rounds
            .current_round()
            .map_or(0, |entry: &Round| entry.positions.len());

        self.commit(staged, vec![AuctionEvent::RoundStarted { round: next, positions }]);
        Ok(next)
    }

    /// Returns the quantile-sampled geometric mean of the position prices of `round`.
    pub fn target_price(&self, round: usize) -> Result<U256, AuctionError> {
        self.state.rounds.target_price(round)
    }

    /// Chooses the winner among the positions of the current round.
    ///
    /// The winning position is the one whose price is closest to the round's target price, the
    /// earliest position winning ties. Its first rewarder becomes the winner. Anyone may conclude
    /// once at most [`MIN_POSITIONS`] positions remain; above that only the broker may.
    ///
    /// # Errors
    ///
    /// * `AuctionError::StillInBlindPhase` while the auction is in the blind round or round zero.
    /// * `AuctionError::RoundAlreadySealed` if the current round was sealed.
    /// * `AuctionError::AlreadyConcluded` once a winner was chosen.
    /// * `AuctionError::TooManyPositions` if a non-broker concludes a crowded round.
    pub fn conclude_auction(&mut self, caller: Address) -> Result<Address, AuctionError> {
        let current: usize = self.state.rounds.current();
        let round: &Round = match self.state.rounds.current_round() {
            Some(round) if current > 0 => round,
            _ => return Err(AuctionError::StillInBlindPhase),
        };
        if round.ended {
            return Err(AuctionError::RoundAlreadySealed(current));
        }
        if self.state.winner.is_some() {
            return Err(AuctionError::AlreadyConcluded);
        }
        if caller != self.config.broker && round.positions.len() > MIN_POSITIONS {
            return Err(AuctionError::TooManyPositions(round.positions.len()));
        }

        let target: U256 = quantile_target(&round.position_prices())?;
        let position: &Position = select_winning_position(&round.positions, target)
            .map(|index: usize| &round.positions[index])
            .ok_or(AuctionError::NoPositions)?;
        let winner: Address = *position.first_rewarder().ok_or(AuctionError::NoPositions)?;
        let price: U256 = position.price;

        let mut staged: AuctionState = self.state.clone();
        staged.winner = Some(winner);
        staged.winning_price = price;
        self.commit(
            staged,
            vec![AuctionEvent::AuctionEnded {
                round: current,
                winner,
                price,
            }],
        );
        Ok(winner)
    }

    /// Transfers the prize out of custody to the winner.
    ///
    /// # Errors
    ///
    /// * `AuctionError::PrizeAlreadyClaimed` after the first successful claim.
    /// * `AuctionError::NotWinner` if `caller` is not the recorded winner.
    /// * `AuctionError::NoPrize` if the prize is not held in custody.
    /// * `AuctionError::Transfer` if the prize transfer is rejected.
    pub fn claim_prize(&mut self, caller: Address) -> Result<(), AuctionError> {
        if self.state.prize_claimed {
            return Err(AuctionError::PrizeAlreadyClaimed);
        }
        let winner: Address = self
            .state
            .winner
            .filter(|winner: &Address| *winner == caller)
            .ok_or(AuctionError::NotWinner(caller))?;
        let prize_id: U256 = self.config.prize_id;
        if self.prize.owner_of(prize_id) != Some(self.config.custody) {
            return Err(AuctionError::NoPrize);
        }

        let mut staged: AuctionState = self.state.clone();
        staged.prize_claimed = true;

        if let Err(error) = self
            .prize
            .transfer_from(&self.config.custody, &winner, prize_id)
        {
            warn!(target: LOG_TARGET, %winner, %error, "prize transfer rejected");
            return Err(AuctionError::from(error));
        }
        self.commit(staged, vec![AuctionEvent::PrizeClaimed { winner, prize_id }]);
        Ok(())
    }

    /// Pays out every reward owed to `participant`.
    ///
    /// # Returns
    ///
    /// The amount paid out.
    ///
    /// # Errors
    ///
    /// * `AuctionError::NoRewards` if nothing is owed.
    /// * `AuctionError::Transfer` if the escrow rejects the payout, in which case the balance
    ///   stays owed.
    pub fn withdraw_rewards(&mut self, participant: Address) -> Result<U256, AuctionError> {
        let mut staged: AuctionState = self.state.clone();
        let amount: U256 = staged.ledger.withdraw(&participant)?;

        self.push_funds(&participant, amount)?;
        self.commit(
            staged,
            vec![AuctionEvent::RewardWithdrawn {
                bidder: participant,
                amount,
            }],
        );
        Ok(amount)
    }

    /// Moves escrowed funds that are not owed to any rewarder to the broker. Broker only.
    ///
    /// # Errors
    ///
    /// * `AuctionError::NotBroker` if `caller` is not the broker.
    /// * `AuctionError::InsufficientUnearmarkedFunds` if `amount` would dip into owed rewards.
    /// * `AuctionError::Transfer` if the escrow rejects the transfer.
    pub fn operator_withdraw(&mut self, caller: Address, amount: U256) -> Result<(), AuctionError> {
        self.ensure_broker(&caller)?;
        let available: U256 = self.unearmarked_funds();
        if amount > available {
            return Err(AuctionError::InsufficientUnearmarkedFunds {
                available,
                requested: amount,
            });
        }

        self.push_funds(&caller, amount)?;
        self.emit(vec![AuctionEvent::OperatorWithdrawn {
            broker: caller,
            amount,
        }]);
        Ok(())
    }

    /// Returns the current phase of the state machine.
    pub fn phase(&self) -> Phase {
        if self.state.winner.is_some() {
            Phase::Concluded
        } else if self.state.rounds.is_open() {
            Phase::Round(self.state.rounds.current())
        } else {
            Phase::Blind
        }
    }

    pub fn config(&self) -> &AuctionConfig {
        &self.config
    }

    pub fn is_blind_round_sealed(&self) -> bool {
        self.state.blind.is_sealed()
    }

    pub fn blind_bids(&self) -> &[BlindBid] {
        &self.state.blind.round().bids
    }

    pub fn raised_funds(&self) -> U256 {
        self.state.blind.round().raised_funds
    }

    pub fn current_round(&self) -> usize {
        self.state.rounds.current()
    }

    /// Positions of `round`, or `None` if the round was not opened.
    pub fn positions(&self, round: usize) -> Option<&[Position]> {
        self.state
            .rounds
            .round(round)
            .map(|entry: &Round| entry.positions.as_slice())
    }

    /// Bidders that acted during `round`, or `None` if the round was not opened.
    pub fn bidders(&self, round: usize) -> Option<&[BidderInfo]> {
        self.state
            .rounds
            .round(round)
            .map(|entry: &Round| entry.bidders.as_slice())
    }

    /// Price `participant` carried out of `round`, once the round was sealed.
    pub fn next_price(&self, round: usize, participant: &Address) -> Option<U256> {
        self.state
            .rounds
            .round(round)
            .and_then(|entry: &Round| entry.next_prices.get(participant).copied())
    }

    pub fn winner(&self) -> Option<Address> {
        self.state.winner
    }

    /// Price of the winning position, zero until the auction concluded.
    pub fn winning_price(&self) -> U256 {
        self.state.winning_price
    }

    pub fn is_prize_claimed(&self) -> bool {
        self.state.prize_claimed
    }

    /// Rewards owed to `participant`.
    pub fn rewards_of(&self, participant: &Address) -> U256 {
        self.state.ledger.balance_of(participant)
    }

    pub fn reward_ledger(&self) -> &RewardLedger {
        &self.state.ledger
    }

    /// Sum of every reward owed.
    pub fn total_outstanding(&self) -> U256 {
        self.state.ledger.total_outstanding()
    }

    /// Escrowed funds held in custody that are not owed to any rewarder.
    pub fn unearmarked_funds(&self) -> U256 {
        self.state
            .ledger
            .unearmarked(self.escrow.balance_of(&self.config.custody))
    }

    /// Signals committed so far.
    pub fn events(&self) -> &[AuctionEvent] {
        &self.events
    }

    /// Drains the committed signals.
    pub fn take_events(&mut self) -> AuctionEvents {
        std::mem::take(&mut self.events)
    }

    pub fn escrow(&self) -> &E {
        &self.escrow
    }

    pub fn escrow_mut(&mut self) -> &mut E {
        &mut self.escrow
    }

    pub fn prize(&self) -> &P {
        &self.prize
    }

    pub fn prize_mut(&mut self) -> &mut P {
        &mut self.prize
    }

    fn ensure_broker(&self, caller: &Address) -> Result<(), AuctionError> {
        if *caller != self.config.broker {
            return Err(AuctionError::NotBroker(*caller));
        }
        Ok(())
    }

    /// Fails unless the blind round was sealed and no winner was chosen yet.
    fn ensure_running(&self) -> Result<(), AuctionError> {
        if self.state.winner.is_some() {
            return Err(AuctionError::AlreadyConcluded);
        }
        if !self.state.blind.is_sealed() {
            return Err(AuctionError::StillInBlindPhase);
        }
        Ok(())
    }

    fn ensure_funds(&self, account: &Address, required: U256) -> Result<(), AuctionError> {
        let available: U256 = self.escrow.balance_of(account);
        if available < required {
            return Err(AuctionError::InsufficientFunds {
                available,
                required,
            });
        }
        Ok(())
    }

    /// Pulls `amount` from `from` into custody.
    fn pull_funds(&mut self, from: &Address, amount: U256) -> Result<(), AuctionError> {
        self.escrow
            .transfer_from(from, &self.config.custody, amount)
            .map_err(|error| {
                warn!(target: LOG_TARGET, account = %from, %amount, %error, "escrow pull rejected");
                AuctionError::from(error)
            })
    }

    /// Pays `amount` out of custody to `to`.
    fn push_funds(&mut self, to: &Address, amount: U256) -> Result<(), AuctionError> {
        self.escrow
            .transfer(&self.config.custody, to, amount)
            .map_err(|error| {
                warn!(target: LOG_TARGET, account = %to, %amount, %error, "escrow payout rejected");
                AuctionError::from(error)
            })
    }

    /// Replaces the state with `staged` and records `events`.
    fn commit(&mut self, staged: AuctionState, events: AuctionEvents) {
        self.state = staged;
        debug_assert!(self.state.ledger.is_consistent());
        self.emit(events);
    }

    fn emit(&mut self, events: AuctionEvents) {
        for event in events {
            info!(target: LOG_TARGET, ?event, "{}", event.name());
            self.events.push(event);
        }
    }
}

/// Returns the index of the position whose price is closest to `target`.
///
/// Positions are scanned in order and only a strictly smaller distance replaces the best so far,
/// so the earliest of equally close positions wins.
pub fn select_winning_position(positions: &[Position], target: U256) -> Option<usize> {
    let mut best: Option<(usize, U256)> = None;
    for (index, position) in positions.iter().enumerate() {
        let distance: U256 = if position.price > target {
            position.price - target
        } else {
            target - position.price
        };
        match best {
            Some((_, closest)) if distance >= closest => {}
            _ => best = Some((index, distance)),
        }
    }
    best.map(|(index, _)| index)
}

#[cfg(test)]
mod tests;

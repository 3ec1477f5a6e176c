//! Pull-based reward accounting.
//!
//! Rewards are credited when a position is selected and stay owed until the rewarder pulls them.
//! The ledger keeps a running total of every owed balance so the auction can tell which part of
//! its escrow is earmarked.

use crate::constants::LOG_TARGET;
use crate::errors::AuctionError;
use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Owed balances of every rewarder.
#[derive(PartialEq, Eq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct RewardLedger {
    balances: BTreeMap<Address, U256>,
    total_outstanding: U256,
}

impl RewardLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credits `amount` to `rewarder`.
    pub fn credit(&mut self, rewarder: &Address, amount: U256) {
        if amount.is_zero() {
            return;
        }
        let balance: &mut U256 = self.balances.entry(*rewarder).or_insert(U256::ZERO);
        *balance = balance.saturating_add(amount);
        self.total_outstanding = self.total_outstanding.saturating_add(amount);
        debug!(target: LOG_TARGET, %rewarder, %amount, "reward credited");
    }

    /// Zeroes the balance of `rewarder` and returns what was owed.
    ///
    /// # Errors
    ///
    /// `AuctionError::NoRewards` if nothing is owed, including on every call after a successful
    /// withdrawal.
    pub fn withdraw(&mut self, rewarder: &Address) -> Result<U256, AuctionError> {
        let amount: U256 = self
            .balances
            .remove(rewarder)
            .filter(|amount: &U256| !amount.is_zero())
            .ok_or(AuctionError::NoRewards)?;
        self.total_outstanding = self.total_outstanding.saturating_sub(amount);
        Ok(amount)
    }

    /// Returns the balance owed to `rewarder`.
    pub fn balance_of(&self, rewarder: &Address) -> U256 {
        self.balances.get(rewarder).copied().unwrap_or(U256::ZERO)
    }

    /// Returns the sum of every owed balance.
    pub fn total_outstanding(&self) -> U256 {
        self.total_outstanding
    }

    /// Returns how much of `escrow_balance` is not owed to any rewarder.
    pub fn unearmarked(&self, escrow_balance: U256) -> U256 {
        escrow_balance.saturating_sub(self.total_outstanding)
    }

    /// Iterates over every non-zero balance.
    pub fn balances(&self) -> impl Iterator<Item = (&Address, &U256)> {
        self.balances.iter()
    }

    /// Returns true if the running total matches the sum of all balances.
    pub fn is_consistent(&self) -> bool {
        let sum: Option<U256> = self
            .balances
            .values()
            .try_fold(U256::ZERO, |acc: U256, balance: &U256| acc.checked_add(*balance));
        sum == Some(self.total_outstanding)
    }
}

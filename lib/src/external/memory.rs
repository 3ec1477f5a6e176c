//! In-memory escrow token and prize asset ledgers.

use super::{EscrowToken, PrizeAsset};
use crate::errors::TransferError;
use alloy_primitives::{Address, U256};
use std::collections::HashMap;

/// Fungible token ledger kept in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEscrow {
    balances: HashMap<Address, U256>,
    halted: bool,
}

impl InMemoryEscrow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credits `amount` new tokens to `account`.
    pub fn mint(&mut self, account: &Address, amount: U256) {
        let balance: &mut U256 = self.balances.entry(*account).or_insert(U256::ZERO);
        *balance = balance.saturating_add(amount);
    }

    /// Makes every subsequent transfer fail until `resume` is called.
    pub fn halt(&mut self) {
        self.halted = true;
    }

    pub fn resume(&mut self) {
        self.halted = false;
    }

    /// Returns the sum of every balance.
    pub fn total_supply(&self) -> U256 {
        self.balances.values().fold(U256::ZERO, |acc, balance| acc + *balance)
    }

    fn move_funds(
        &mut self,
        from: &Address,
        to: &Address,
        amount: U256,
    ) -> Result<(), TransferError> {
        if self.halted {
            return Err(TransferError::Halted);
        }
        let available: U256 = self.balance_of(from);
        if available < amount {
            return Err(TransferError::InsufficientBalance {
                available,
                required: amount,
            });
        }
        self.balances.insert(*from, available - amount);
        self.mint(to, amount);
        Ok(())
    }
}

impl EscrowToken for InMemoryEscrow {
    fn balance_of(&self, account: &Address) -> U256 {
        self.balances.get(account).copied().unwrap_or(U256::ZERO)
    }

    fn transfer_from(
        &mut self,
        from: &Address,
        to: &Address,
        amount: U256,
    ) -> Result<(), TransferError> {
        self.move_funds(from, to, amount)
    }

    fn transfer(
        &mut self,
        sender: &Address,
        recipient: &Address,
        amount: U256,
    ) -> Result<(), TransferError> {
        self.move_funds(sender, recipient, amount)
    }
}

/// Non-fungible asset ledger kept in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPrize {
    owners: HashMap<U256, Address>,
    halted: bool,
}

impl InMemoryPrize {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates `asset_id` held by `owner`.
    pub fn mint(&mut self, owner: &Address, asset_id: U256) {
        self.owners.insert(asset_id, *owner);
    }

    /// Makes every subsequent transfer fail until `resume` is called.
    pub fn halt(&mut self) {
        self.halted = true;
    }

    pub fn resume(&mut self) {
        self.halted = false;
    }
}

impl PrizeAsset for InMemoryPrize {
    fn owner_of(&self, asset_id: U256) -> Option<Address> {
        self.owners.get(&asset_id).copied()
    }

    fn transfer_from(
        &mut self,
        from: &Address,
        to: &Address,
        asset_id: U256,
    ) -> Result<(), TransferError> {
        if self.halted {
            return Err(TransferError::Halted);
        }
        match self.owners.get(&asset_id) {
            None => Err(TransferError::UnknownAsset(asset_id)),
            Some(owner) if owner != from => Err(TransferError::NotOwner(asset_id)),
            Some(_) => {
                self.owners.insert(asset_id, *to);
                Ok(())
            }
        }
    }
}

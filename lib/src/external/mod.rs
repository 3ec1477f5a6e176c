//! Interfaces of the contracts the auction interacts with.
//!
//! The auction only reads balances and custody before acting and moves value as the very last
//! step of an operation, so an implementation may fail any transfer without leaving the auction
//! half-updated.

pub mod memory;

use crate::errors::TransferError;
use alloy_primitives::{Address, U256};

/// The fungible token entry fees and rewards are paid in.
pub trait EscrowToken {
    /// Returns the balance held by `account`.
    fn balance_of(&self, account: &Address) -> U256;

    /// Moves `amount` from `from` to `to` on behalf of the auction.
    fn transfer_from(
        &mut self,
        from: &Address,
        to: &Address,
        amount: U256,
    ) -> Result<(), TransferError>;

    /// Moves `amount` out of the `sender` account, which is the auction's own custody account.
    fn transfer(
        &mut self,
        sender: &Address,
        recipient: &Address,
        amount: U256,
    ) -> Result<(), TransferError>;
}

/// The non-fungible asset awarded to the winner.
pub trait PrizeAsset {
    /// Returns the holder of `asset_id`, if the asset exists.
    fn owner_of(&self, asset_id: U256) -> Option<Address>;

    /// Moves `asset_id` from `from` to `to`.
    fn transfer_from(
        &mut self,
        from: &Address,
        to: &Address,
        asset_id: U256,
    ) -> Result<(), TransferError>;
}

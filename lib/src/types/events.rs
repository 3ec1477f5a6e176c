use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// Signals emitted by the auction for external observers.
#[derive(PartialEq, Eq, Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum AuctionEvent {
    /// A sealed bid entered the blind round.
    BidEntered { bidder: Address, amount: U256 },
    /// A round opened for position selection.
    RoundStarted { round: usize, positions: usize },
    /// A participant selected one or more positions of a round.
    PositionSelected {
        round: usize,
        bidder: Address,
        prices: Vec<U256>,
        amount: U256,
    },
    /// A winner was chosen.
    AuctionEnded {
        round: usize,
        winner: Address,
        price: U256,
    },
    /// A participant pulled their accrued rewards.
    RewardWithdrawn { bidder: Address, amount: U256 },
    /// The winner took the prize out of custody.
    PrizeClaimed { winner: Address, prize_id: U256 },
    /// The broker withdrew funds not earmarked as rewards.
    OperatorWithdrawn { broker: Address, amount: U256 },
}

impl AuctionEvent {
    /// Short name of the signal, used as the log message.
    pub fn name(&self) -> &'static str {
        match self {
            AuctionEvent::BidEntered { .. } => "bid entered",
            AuctionEvent::RoundStarted { .. } => "round started",
            AuctionEvent::PositionSelected { .. } => "position selected",
            AuctionEvent::AuctionEnded { .. } => "auction ended",
            AuctionEvent::RewardWithdrawn { .. } => "reward withdrawn",
            AuctionEvent::PrizeClaimed { .. } => "prize claimed",
            AuctionEvent::OperatorWithdrawn { .. } => "operator withdrawn",
        }
    }
}

/// Log of signals committed by the auction.
pub type AuctionEvents = Vec<AuctionEvent>;

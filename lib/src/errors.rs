//! Error types returned by the auction and its collaborators.

use alloy_primitives::{Address, U256};
use thiserror::Error;

/// Failure classes an `AuctionError` belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The operation is not valid in the current phase of the state machine.
    PhaseViolation,
    /// The caller lacks the privilege the operation requires.
    AuthorizationFailure,
    /// The input is malformed or the caller cannot afford the operation.
    ValidationFailure,
    /// The caller did not take part in every round leading to the current one.
    ProvenanceFailure,
    /// The round cannot accept more actions.
    CapacityFailure,
    /// An aggregate was requested over an empty collection.
    EmptyState,
    /// An escrow or prize transfer was rejected.
    CollaboratorFailure,
    /// Fixed-point arithmetic left the representable range.
    Arithmetic,
}

/// Errors raised by the fixed-point pricing routines.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PricingError {
    #[error("cannot compute over an empty set of values")]
    EmptyInput,
    #[error("fixed-point arithmetic overflow")]
    Overflow,
}

/// Errors raised by the escrow token or the prize asset.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferError {
    #[error("insufficient balance: have {available}, need {required}")]
    InsufficientBalance { available: U256, required: U256 },
    #[error("asset {0} is not held by the sender")]
    NotOwner(U256),
    #[error("asset {0} does not exist")]
    UnknownAsset(U256),
    #[error("transfers are halted")]
    Halted,
}

/// Every reason an auction operation can be rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuctionError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),

    #[error("blind round is sealed")]
    RoundSealed,
    #[error("blind round was already sealed")]
    AlreadySealed,
    #[error("round {0} is already sealed")]
    RoundAlreadySealed(usize),
    #[error("round {0} does not exist")]
    UnknownRound(usize),
    #[error("auction is still in the blind phase")]
    StillInBlindPhase,
    #[error("auction has already concluded")]
    AlreadyConcluded,

    #[error("caller {0} is not the broker")]
    NotBroker(Address),
    #[error("caller {0} is not the winner")]
    NotWinner(Address),
    #[error("prize has already been claimed")]
    PrizeAlreadyClaimed,
    #[error("{0} positions remain, only the broker may conclude")]
    TooManyPositions(usize),

    #[error("insufficient funds: have {available}, need {required}")]
    InsufficientFunds { available: U256, required: U256 },
    #[error("duplicate bid")]
    DuplicateBid,
    #[error("expected {expected} revealed prices, got {got}")]
    MismatchedRevealCount { expected: usize, got: usize },
    #[error("raised funds {raised} below the required {required}")]
    InsufficientRaisedFunds { raised: U256, required: U256 },
    #[error("revealed price does not match the commitment of {0}")]
    InvalidReveal(Address),
    #[error("position {index} out of bounds ({len} positions)")]
    PositionOutOfBounds { index: usize, len: usize },
    #[error("no positions were selected")]
    EmptySelection,
    #[error("requested {requested} exceeds the {available} not earmarked as rewards")]
    InsufficientUnearmarkedFunds { available: U256, requested: U256 },

    #[error("participant {0} has no unbroken participation chain")]
    UnprovenParticipant(Address),

    #[error("round is saturated")]
    Overflow,

    #[error("no bidders")]
    NoBidders,
    #[error("no positions")]
    NoPositions,
    #[error("no rewards to withdraw")]
    NoRewards,
    #[error("prize is not held by the auction")]
    NoPrize,

    #[error(transparent)]
    Pricing(#[from] PricingError),
    #[error("transfer failed: {0}")]
    Transfer(#[from] TransferError),
}

impl AuctionError {
    /// Returns the failure class of this error.
    pub fn kind(&self) -> ErrorKind {
        use AuctionError::*;
        match self {
            RoundSealed
            | AlreadySealed
            | RoundAlreadySealed(_)
            | StillInBlindPhase
            | AlreadyConcluded
            | PrizeAlreadyClaimed => ErrorKind::PhaseViolation,
            NotBroker(_) | NotWinner(_) | TooManyPositions(_) => ErrorKind::AuthorizationFailure,
            InvalidConfig(_)
            | UnknownRound(_)
            | InsufficientFunds { .. }
            | DuplicateBid
            | MismatchedRevealCount { .. }
            | InsufficientRaisedFunds { .. }
            | InvalidReveal(_)
            | PositionOutOfBounds { .. }
            | EmptySelection
            | InsufficientUnearmarkedFunds { .. } => ErrorKind::ValidationFailure,
            UnprovenParticipant(_) => ErrorKind::ProvenanceFailure,
            Overflow => ErrorKind::CapacityFailure,
            NoBidders | NoPositions | NoRewards | NoPrize => ErrorKind::EmptyState,
            Pricing(PricingError::EmptyInput) => ErrorKind::EmptyState,
            Pricing(PricingError::Overflow) => ErrorKind::Arithmetic,
            Transfer(_) => ErrorKind::CollaboratorFailure,
        }
    }
}

//! Sealed-bid, multi-round descending consensus auction.
//!
//! Bidders commit to a price in a blind round, then repeatedly buy into the price positions of
//! the other bidders. Each round folds the prices a bidder bought into a single carried price,
//! so positions converge until the one closest to the round's quantile target wins the prize.

pub mod auction;
pub mod blind;
pub mod constants;
pub mod errors;
pub mod external;
pub mod hashing;
pub mod ledger;
pub mod pricing;
pub mod rounds;
pub mod types;

pub use auction::{select_winning_position, Auction, Phase};
pub use errors::{AuctionError, ErrorKind, PricingError, TransferError};
pub use external::memory::{InMemoryEscrow, InMemoryPrize};
pub use external::{EscrowToken, PrizeAsset};
pub use types::commitments::commit;
pub use types::config::AuctionConfig;
pub use types::events::{AuctionEvent, AuctionEvents};

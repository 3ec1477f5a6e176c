pub mod blind;
pub mod commitments;
pub mod config;
pub mod events;
pub mod positions;
pub mod rounds;

use serde::{Deserialize, Serialize};

/// Index of a position inside the position arena of a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PositionId(pub usize);

/// Index of a bidder entry inside the bidder arena of a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BidderId(pub usize);

/// Outcome of looking an entry up in one of the round arenas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
}

impl<T> Lookup<T> {
    /// Converts the lookup into an `Option`.
    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(id) => Some(id),
            Lookup::NotFound => None,
        }
    }
}

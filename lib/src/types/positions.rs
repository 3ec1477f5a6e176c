use super::{Lookup, PositionId};
use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// A price point of a round together with every participant that converged on it.
#[derive(PartialEq, Eq, Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    /// Participants credited when the position is selected, in arrival order.
    pub rewarders: Vec<Address>,
    /// The price shared by every rewarder.
    pub price: U256,
}

impl Position {
    /// Creates an empty position at `price`.
    pub fn new(price: U256) -> Self {
        Self {
            rewarders: Vec::new(),
            price,
        }
    }

    /// Returns the participant that first reached this position.
    pub fn first_rewarder(&self) -> Option<&Address> {
        self.rewarders.first()
    }
}

/// A collection of positions of a single round, indexed by `PositionId`.
pub type Positions = Vec<Position>;

/// Find-or-create access to a positions arena.
pub trait PositionArena {
    /// Looks up the position at `price`.
    fn find_position(&self, price: &U256) -> Lookup<PositionId>;

    /// Returns the position at `price`, creating it at the end of the arena if absent.
    fn position_entry(&mut self, price: U256) -> PositionId;

    /// Appends `rewarder` to the position at `price`, creating it if absent.
    fn add_rewarder(&mut self, price: U256, rewarder: Address) -> PositionId;
}

impl PositionArena for Positions {
    fn find_position(&self, price: &U256) -> Lookup<PositionId> {
        match self.iter().position(|position: &Position| position.price == *price) {
            Some(index) => Lookup::Found(PositionId(index)),
            None => Lookup::NotFound,
        }
    }

    fn position_entry(&mut self, price: U256) -> PositionId {
        match self.find_position(&price) {
            Lookup::Found(id) => id,
            Lookup::NotFound => {
                self.push(Position::new(price));
                PositionId(self.len() - 1)
            }
        }
    }

    fn add_rewarder(&mut self, price: U256, rewarder: Address) -> PositionId {
        let id: PositionId = self.position_entry(price);
        self[id.0].rewarders.push(rewarder);
        id
    }
}

use alloy_primitives::{Address, U256};
use anyhow::{Context, Result};
use dcauction_lib::constants::SCALE;
use dcauction_lib::AuctionConfig;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A bidder of a scenario.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub address: Address,
    /// Price sealed during the blind round, scaled by 10^18.
    pub price: U256,
    /// Escrow tokens minted to the participant before the auction starts.
    pub funds: U256,
}

/// Positions a participant selects during a round.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PlannedSelection {
    /// Index of the participant in `Scenario::participants`.
    pub participant: usize,
    pub positions: Vec<usize>,
}

/// A full auction to replay.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub config: AuctionConfig,
    pub participants: Vec<Participant>,
    /// Selections of each round, in order. Rounds past the end are generated at random when
    /// the scenario itself was generated.
    #[serde(default)]
    pub rounds: Vec<Vec<PlannedSelection>>,
}

impl Scenario {
    /// Reads a scenario from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents: String = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse scenario {}", path.display()))
    }

    /// Generates `bidders` participants with prices between 1 and 1000 tokens.
    pub fn random(bidders: usize) -> Self {
        let mut rng = rand::thread_rng();
        let entry_fee: U256 = SCALE;
        let participants: Vec<Participant> = (0..bidders)
            .map(|_| Participant {
                address: Address::random(),
                price: U256::from(rng.gen_range(1..=1000u64)) * SCALE,
                funds: U256::from(1000u64) * SCALE,
            })
            .collect();

        Scenario {
            config: AuctionConfig {
                custody: Address::random(),
                broker: Address::random(),
                entry_fee,
                min_raised_funds: entry_fee * U256::from(bidders.max(1)),
                prize_id: U256::from(rng.gen::<u64>()),
            },
            participants,
            rounds: Vec::new(),
        }
    }

    /// Index of `address` among the participants.
    pub fn participant_index(&self, address: &Address) -> Option<usize> {
        self.participants
            .iter()
            .position(|participant: &Participant| participant.address == *address)
    }
}

/// Draws the selections of one round.
///
/// At most `positions` of the `eligible` participants act, so the round never saturates. Each
/// picks the position closest to the target, `closest`, and sometimes one other position.
pub fn random_round(eligible: &[usize], positions: usize, closest: usize) -> Vec<PlannedSelection> {
    let mut rng = rand::thread_rng();
    let mut acting: Vec<usize> = eligible.to_vec();
    acting.shuffle(&mut rng);
    acting.truncate(positions);

    acting
        .into_iter()
        .map(|participant: usize| {
            let mut selected: Vec<usize> = vec![closest];
            let other: usize = rng.gen_range(0..positions);
            if other != closest && rng.gen_bool(0.25) {
                selected.push(other);
            }
            PlannedSelection {
                participant,
                positions: selected,
            }
        })
        .collect()
}

//! Runs a descending consensus auction against in-memory escrow and prize ledgers.
//!
//! You can run this script using the following command:
//! ```shell
//! RUST_LOG=info cargo run --release -- --random --bidders 20
//! ```
//! or, to replay a scenario and keep a report of the run:
//! ```shell
//! cargo run --release -- --scenario scenario.json --report report.json
//! ```

use alloy_primitives::{Address, B256, U256};
use anyhow::{bail, Context, Result};
use clap::Parser;
use dcauction_lib::constants::MIN_POSITIONS;
use dcauction_lib::hashing::keccak256;
use dcauction_lib::types::positions::Position;
use dcauction_lib::{
    commit, select_winning_position, Auction, AuctionEvents, EscrowToken, InMemoryEscrow,
    InMemoryPrize, PrizeAsset,
};
use input::{PlannedSelection, Scenario};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[path = "../lib/input.rs"]
mod input;

type MemoryAuction = Auction<InMemoryEscrow, InMemoryPrize>;

/// The arguments for the command.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// JSON scenario to replay.
    #[clap(long, conflicts_with = "random")]
    scenario: Option<PathBuf>,

    /// Generate bidders and their selections at random.
    #[clap(long)]
    random: bool,

    /// Number of bidders of a random scenario.
    #[clap(long, default_value = "20")]
    bidders: usize,

    /// Rounds played before the broker concludes regardless of the positions left.
    #[clap(long, default_value = "16")]
    max_rounds: usize,

    /// Where to write a JSON report of the run.
    #[clap(long, env = "DCAUCTION_REPORT")]
    report: Option<PathBuf>,
}

/// Rewards paid out to a participant at the end of the run.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Payout {
    bidder: Address,
    amount: U256,
}

/// Outcome of a run.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Report {
    winner: Address,
    winning_price: U256,
    rounds: usize,
    commitments: Vec<String>,
    payouts: Vec<Payout>,
    events: AuctionEvents,
}

fn main() -> Result<()> {
    init_logging();

    // Parse the command line arguments.
    let args = Args::parse();
    let scenario: Scenario = match (&args.scenario, args.random) {
        (Some(path), false) => Scenario::from_file(path)?,
        (None, true) => Scenario::random(args.bidders),
        _ => bail!("you must specify either --scenario <path> or --random"),
    };

    let report: Report = run(&scenario, args.random, args.max_rounds)?;
    println!("Auction concluded after {} rounds.", report.rounds);
    println!("winner: {}", report.winner);
    println!("winningPrice: {}", report.winning_price);

    if let Some(path) = &args.report {
        let contents: String = serde_json::to_string_pretty(&report)?;
        std::fs::write(path, contents)
            .with_context(|| format!("failed to write report {}", path.display()))?;
        println!("Report written to {}", path.display());
    }
    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Plays `scenario` from the blind round to the prize claim.
fn run(scenario: &Scenario, random: bool, max_rounds: usize) -> Result<Report> {
    let config = &scenario.config;
    let mut escrow: InMemoryEscrow = InMemoryEscrow::new();
    for participant in &scenario.participants {
        escrow.mint(&participant.address, participant.funds);
    }
    let mut prize: InMemoryPrize = InMemoryPrize::new();
    prize.mint(&config.custody, config.prize_id);
    let mut auction: MemoryAuction = Auction::new(config.clone(), escrow, prize)?;

    // Blind round
    let mut commitments: Vec<String> = Vec::with_capacity(scenario.participants.len());
    for participant in &scenario.participants {
        let commitment: B256 = commit(&keccak256, &participant.address, &participant.price);
        auction.submit_blind_bid(participant.address, commitment)?;
        commitments.push(format!("0x{}", hex::encode(commitment)));
    }
    let prices: Vec<U256> = scenario
        .participants
        .iter()
        .map(|participant| participant.price)
        .collect();
    auction.seal_blind_round(config.broker, &prices)?;

    // Selection rounds
    for index in 0..max_rounds {
        let round: usize = auction.current_round();
        let positions: &[Position] = auction.positions(round).context("current round missing")?;
        if positions.len() <= MIN_POSITIONS {
            break;
        }

        let selections: Vec<PlannedSelection> = match scenario.rounds.get(index) {
            Some(selections) => selections.clone(),
            None if random => {
                let target: U256 = auction.target_price(round)?;
                let closest: usize =
                    select_winning_position(positions, target).context("round has no positions")?;
                input::random_round(&eligible(&auction, scenario, round), positions.len(), closest)
            }
            None => break,
        };
        play_round(&mut auction, scenario, round, &selections)?;

        if let Err(error) = auction.advance_round(round) {
            warn!(round, %error, "round could not be advanced");
            break;
        }
    }

    // Conclusion
    let winner: Address = auction.conclude_auction(config.broker)?;
    auction.claim_prize(winner)?;
    info!(%winner, owner = ?auction.prize().owner_of(config.prize_id), "prize delivered");

    let mut payouts: Vec<Payout> = Vec::new();
    for participant in &scenario.participants {
        if auction.rewards_of(&participant.address).is_zero() {
            continue;
        }
        let amount: U256 = auction.withdraw_rewards(participant.address)?;
        payouts.push(Payout {
            bidder: participant.address,
            amount,
        });
    }
    info!(
        custody = %auction.escrow().balance_of(&config.custody),
        unearmarked = %auction.unearmarked_funds(),
        "rewards paid out"
    );

    Ok(Report {
        winner,
        winning_price: auction.winning_price(),
        rounds: auction.current_round() + 1,
        commitments,
        payouts,
        events: auction.take_events(),
    })
}

/// Participants allowed to act in `round`: every bidder in round zero, then those who acted in
/// the previous round.
fn eligible(auction: &MemoryAuction, scenario: &Scenario, round: usize) -> Vec<usize> {
    if round == 0 {
        return (0..scenario.participants.len()).collect();
    }
    auction
        .bidders(round - 1)
        .unwrap_or_default()
        .iter()
        .filter_map(|info| scenario.participant_index(&info.bidder))
        .collect()
}

/// Applies `selections` to `round`, skipping the ones the auction rejects.
fn play_round(
    auction: &mut MemoryAuction,
    scenario: &Scenario,
    round: usize,
    selections: &[PlannedSelection],
) -> Result<()> {
    for selection in selections {
        let participant: Address = scenario
            .participants
            .get(selection.participant)
            .map(|participant| participant.address)
            .with_context(|| format!("unknown participant {}", selection.participant))?;
        if let Err(error) = auction.select_positions(participant, round, &selection.positions) {
            warn!(round, %participant, %error, "selection rejected");
        }
    }
    Ok(())
}

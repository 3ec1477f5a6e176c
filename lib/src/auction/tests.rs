use super::*;
use crate::errors::{ErrorKind, TransferError};
use crate::external::memory::{InMemoryEscrow, InMemoryPrize};
use crate::pricing::geometric_mean;
use crate::types::commitments::commit;

const UNIT: u128 = 1_000_000_000_000_000_000;
const PRIZE_ID: u64 = 7;

type TestAuction = Auction<InMemoryEscrow, InMemoryPrize>;

fn ether(amount: u64) -> U256 {
    U256::from(amount as u128 * UNIT)
}

fn config(min_raised_funds: U256) -> AuctionConfig {
    AuctionConfig {
        custody: Address::random(),
        broker: Address::random(),
        entry_fee: ether(2),
        min_raised_funds,
        prize_id: U256::from(PRIZE_ID),
    }
}

struct Harness {
    auction: TestAuction,
    broker: Address,
    custody: Address,
    bidders: Vec<Address>,
    prices: Vec<U256>,
}

impl Harness {
    fn reveal(&mut self) -> Result<(), AuctionError> {
        let prices: Vec<U256> = self.prices.clone();
        self.auction.seal_blind_round(self.broker, &prices)
    }

    fn balance(&self, account: &Address) -> U256 {
        self.auction.escrow().balance_of(account)
    }
}

/// Deploys an auction where one bidder per price, each funded with 100 ether, sealed a bid.
fn setup_with(prices: &[u64], min_raised_funds: U256) -> Harness {
    let config: AuctionConfig = config(min_raised_funds);
    let bidders: Vec<Address> = prices.iter().map(|_| Address::random()).collect();
    let prices: Vec<U256> = prices.iter().map(|price: &u64| ether(*price)).collect();

    let mut escrow: InMemoryEscrow = InMemoryEscrow::new();
    for bidder in &bidders {
        escrow.mint(bidder, ether(100));
    }
    let mut prize: InMemoryPrize = InMemoryPrize::new();
    prize.mint(&config.custody, U256::from(PRIZE_ID));

    let (broker, custody) = (config.broker, config.custody);
    let mut auction: TestAuction = Auction::new(config, escrow, prize).unwrap();
    for (bidder, price) in bidders.iter().zip(&prices) {
        auction
            .submit_blind_bid(*bidder, commit(&keccak256, bidder, price))
            .unwrap();
    }

    Harness {
        auction,
        broker,
        custody,
        bidders,
        prices,
    }
}

fn setup(prices: &[u64]) -> Harness {
    setup_with(prices, ether(10))
}

fn sealed(prices: &[u64]) -> Harness {
    let mut harness: Harness = setup(prices);
    harness.reveal().unwrap();
    harness
}

#[test]
fn test_new_rejects_invalid_config() {
    let mut invalid: AuctionConfig = config(ether(10));
    invalid.entry_fee = U256::ZERO;
    assert!(matches!(
        Auction::new(invalid, InMemoryEscrow::new(), InMemoryPrize::new()),
        Err(AuctionError::InvalidConfig(_))
    ));
}

#[test]
fn test_submit_blind_bid() {
    let harness: Harness = setup(&[100, 200]);
    let auction: &TestAuction = &harness.auction;

    assert_eq!(auction.phase(), Phase::Blind);
    assert_eq!(auction.blind_bids().len(), 2);
    assert_eq!(auction.raised_funds(), ether(4));
    assert_eq!(harness.balance(&harness.custody), ether(4));
    assert_eq!(harness.balance(&harness.bidders[0]), ether(98));
    assert_eq!(
        auction.events()[0],
        AuctionEvent::BidEntered {
            bidder: harness.bidders[0],
            amount: ether(2),
        }
    );
}

#[test]
fn test_submit_blind_bid_rejections() {
    let mut harness: Harness = setup(&[100]);
    let bidder: Address = harness.bidders[0];

    // One bid per bidder
    let error = harness
        .auction
        .submit_blind_bid(bidder, commit(&keccak256, &bidder, &ether(300)))
        .unwrap_err();
    assert_eq!(error, AuctionError::DuplicateBid);

    // Commitments are never reused, whoever submits them
    let stranger: Address = Address::random();
    harness.auction.escrow_mut().mint(&stranger, ether(2));
    let used: B256 = harness.auction.blind_bids()[0].commitment;
    assert_eq!(
        harness.auction.submit_blind_bid(stranger, used),
        Err(AuctionError::DuplicateBid)
    );

    let poor: Address = Address::random();
    harness.auction.escrow_mut().mint(&poor, ether(1));
    assert_eq!(
        harness.auction.submit_blind_bid(poor, B256::random()),
        Err(AuctionError::InsufficientFunds {
            available: ether(1),
            required: ether(2),
        })
    );

    // Rejections move no funds and record nothing
    assert_eq!(harness.auction.blind_bids().len(), 1);
    assert_eq!(harness.auction.raised_funds(), ether(2));
    assert_eq!(harness.balance(&harness.custody), ether(2));
    assert_eq!(harness.balance(&stranger), ether(2));
    assert_eq!(harness.auction.events().len(), 1);
}

#[test]
fn test_seal_blind_round() {
    let mut harness: Harness = setup(&[100, 200, 100, 300, 500]);

    let stranger: Address = Address::random();
    let prices: Vec<U256> = harness.prices.clone();
    assert_eq!(
        harness.auction.seal_blind_round(stranger, &prices),
        Err(AuctionError::NotBroker(stranger))
    );
    assert_eq!(
        harness.auction.seal_blind_round(harness.broker, &prices[1..]),
        Err(AuctionError::MismatchedRevealCount {
            expected: 5,
            got: 4
        })
    );

    harness.reveal().unwrap();
    let auction: &TestAuction = &harness.auction;
    assert!(auction.is_blind_round_sealed());
    assert_eq!(auction.phase(), Phase::Round(0));

    let positions: &[Position] = auction.positions(0).unwrap();
    let prices: Vec<U256> = positions.iter().map(|position| position.price).collect();
    assert_eq!(prices, vec![ether(100), ether(200), ether(300), ether(500)]);
    assert_eq!(
        positions[0].rewarders,
        vec![harness.bidders[0], harness.bidders[2]]
    );
    assert_eq!(
        auction.events().last(),
        Some(&AuctionEvent::RoundStarted {
            round: 0,
            positions: 4
        })
    );

    let bidder: Address = harness.bidders[0];
    assert_eq!(
        harness.auction.submit_blind_bid(bidder, B256::random()),
        Err(AuctionError::RoundSealed)
    );
    assert_eq!(harness.reveal(), Err(AuctionError::AlreadySealed));
}

#[test]
fn test_seal_requires_raised_funds() {
    let mut harness: Harness = setup(&[100, 200]);
    assert_eq!(
        harness.reveal(),
        Err(AuctionError::InsufficientRaisedFunds {
            raised: ether(4),
            required: ether(10),
        })
    );
    assert!(!harness.auction.is_blind_round_sealed());
}

#[test]
fn test_reveal_is_atomic() {
    let mut harness: Harness = setup_with(&[100, 200, 300, 400], ether(8));
    let events: usize = harness.auction.events().len();

    // Three valid reveals and one that does not match its commitment
    harness.prices[3] = ether(401);
    assert_eq!(
        harness.reveal(),
        Err(AuctionError::InvalidReveal(harness.bidders[3]))
    );
    assert!(!harness.auction.is_blind_round_sealed());
    assert_eq!(harness.auction.positions(0), None);
    assert_eq!(harness.auction.phase(), Phase::Blind);
    assert_eq!(harness.auction.events().len(), events);

    // The round stays open for the corrected reveal
    harness.prices[3] = ether(400);
    harness.reveal().unwrap();
    assert_eq!(harness.auction.positions(0).unwrap().len(), 4);
}

#[test]
fn test_reveal_rejects_zero_price() {
    let mut harness: Harness = setup(&[0, 200, 300, 400, 500]);
    assert_eq!(
        harness.reveal(),
        Err(AuctionError::InvalidReveal(harness.bidders[0]))
    );
    assert!(!harness.auction.is_blind_round_sealed());
    assert_eq!(harness.auction.positions(0), None);
}

#[test]
fn test_advance_long_wide_trail() {
    let mut prices: Vec<u64> = vec![1, 1000];
    prices.extend((982..1000).rev());
    let mut harness: Harness = setup(&prices);
    harness.reveal().unwrap();
    let buyer: Address = harness.bidders[0];

    // One participant buys into all twenty positions of round zero
    let every: Vec<usize> = (0..prices.len()).collect();
    harness.auction.select_positions(buyer, 0, &every).unwrap();
    assert_eq!(harness.auction.advance_round(0), Ok(1));
    assert_eq!(
        harness.auction.next_price(0, &buyer),
        Some(geometric_mean(&harness.prices).unwrap())
    );

    let stranger: Address = Address::random();
    assert_eq!(harness.auction.conclude_auction(stranger), Ok(buyer));
}

#[test]
fn test_select_position() {
    let mut harness: Harness = sealed(&[100, 200, 300, 400, 500]);
    let (buyer, seller) = (harness.bidders[0], harness.bidders[4]);

    harness.auction.select_position(buyer, 0, 4).unwrap();

    assert_eq!(harness.auction.rewards_of(&seller), ether(2));
    assert_eq!(harness.auction.total_outstanding(), ether(2));
    assert_eq!(harness.balance(&buyer), ether(96));
    assert_eq!(harness.balance(&harness.custody), ether(12));
    assert_eq!(harness.auction.unearmarked_funds(), ether(10));

    let bidders: &[BidderInfo] = harness.auction.bidders(0).unwrap();
    assert_eq!(bidders.len(), 1);
    assert_eq!(bidders[0].bidder, buyer);
    assert_eq!(bidders[0].prices, vec![ether(500)]);
    assert_eq!(
        harness.auction.events().last(),
        Some(&AuctionEvent::PositionSelected {
            round: 0,
            bidder: buyer,
            prices: vec![ether(500)],
            amount: ether(2),
        })
    );
}

#[test]
fn test_select_positions_batch() {
    let mut harness: Harness = sealed(&[100, 200, 300, 400, 500]);
    let buyer: Address = harness.bidders[0];

    harness.auction.select_positions(buyer, 0, &[1, 2]).unwrap();

    assert_eq!(harness.auction.rewards_of(&harness.bidders[1]), ether(2));
    assert_eq!(harness.auction.rewards_of(&harness.bidders[2]), ether(2));
    assert_eq!(harness.balance(&buyer), ether(94));
    // A batch counts as a single action
    assert_eq!(harness.auction.state.rounds.round(0).unwrap().actions, 1);

    assert_eq!(
        harness.auction.select_positions(buyer, 0, &[0, 2]),
        Err(AuctionError::DuplicateBid)
    );
    assert_eq!(
        harness.auction.select_positions(buyer, 0, &[]),
        Err(AuctionError::EmptySelection)
    );
}

#[test]
fn test_select_position_rejections() {
    let mut harness: Harness = setup(&[100, 200, 300, 400, 500]);
    let buyer: Address = harness.bidders[0];
    assert_eq!(
        harness.auction.select_position(buyer, 0, 0),
        Err(AuctionError::StillInBlindPhase)
    );

    harness.reveal().unwrap();
    let stranger: Address = Address::random();
    harness.auction.escrow_mut().mint(&stranger, ether(10));
    let error: AuctionError = harness.auction.select_position(stranger, 0, 0).unwrap_err();
    assert_eq!(error, AuctionError::UnprovenParticipant(stranger));
    assert_eq!(error.kind(), ErrorKind::ProvenanceFailure);

    assert_eq!(
        harness.auction.select_position(buyer, 0, 5),
        Err(AuctionError::PositionOutOfBounds { index: 5, len: 5 })
    );
    assert_eq!(
        harness.auction.select_position(buyer, 1, 0),
        Err(AuctionError::UnknownRound(1))
    );
    assert_eq!(
        harness.auction.select_positions(buyer, 0, &[0; 60]),
        Err(AuctionError::InsufficientFunds {
            available: ether(98),
            required: ether(120),
        })
    );

    assert_eq!(harness.auction.total_outstanding(), U256::ZERO);
    assert_eq!(harness.auction.bidders(0).map(<[_]>::len), Some(0));
}

#[test]
fn test_round_saturation() {
    let mut harness: Harness = sealed(&[100, 100, 100, 100, 200]);
    // Two positions admit two actions
    harness.auction.select_position(harness.bidders[0], 0, 1).unwrap();
    harness.auction.select_position(harness.bidders[1], 0, 1).unwrap();

    let error: AuctionError = harness
        .auction
        .select_position(harness.bidders[2], 0, 0)
        .unwrap_err();
    assert_eq!(error, AuctionError::Overflow);
    assert_eq!(error.kind(), ErrorKind::CapacityFailure);
}

#[test]
fn test_reward_conservation() {
    let mut harness: Harness = sealed(&[100, 100, 100, 200, 300]);
    let bidders: Vec<Address> = harness.bidders.clone();

    // Position 0 has three rewarders, so each fee paid for it leaves a remainder of 2 wei
    harness.auction.select_position(bidders[3], 0, 0).unwrap();
    harness.auction.select_positions(bidders[4], 0, &[0, 1]).unwrap();
    harness.auction.select_position(bidders[0], 0, 2).unwrap();

    let paid: U256 = ether(8);
    let forfeited: U256 = U256::from(4);
    assert_eq!(harness.auction.total_outstanding(), paid - forfeited);
    assert!(harness.auction.reward_ledger().is_consistent());

    let withdrawn: U256 = harness.auction.withdraw_rewards(bidders[3]).unwrap();
    assert_eq!(withdrawn, ether(2));
    assert_eq!(
        harness.auction.total_outstanding() + withdrawn,
        paid - forfeited
    );

    let owed: U256 = bidders
        .iter()
        .map(|bidder: &Address| harness.auction.rewards_of(bidder))
        .fold(U256::ZERO, |acc: U256, amount: U256| acc + amount);
    assert_eq!(owed, harness.auction.total_outstanding());

    // Custody holds every fee minus what was paid out, the forfeited remainder included
    assert_eq!(harness.balance(&harness.custody), ether(16));
    assert_eq!(
        harness.auction.unearmarked_funds(),
        ether(10) + forfeited
    );
}

#[test]
fn test_advance_round() {
    let mut harness: Harness = sealed(&[100, 200, 300, 400, 500]);
    let bidders: Vec<Address> = harness.bidders.clone();
    assert_eq!(harness.auction.advance_round(0), Err(AuctionError::NoBidders));

    harness.auction.select_position(bidders[0], 0, 3).unwrap();
    harness.auction.select_positions(bidders[1], 0, &[0, 3]).unwrap();

    assert_eq!(harness.auction.advance_round(0), Ok(1));
    assert_eq!(harness.auction.phase(), Phase::Round(1));
    assert_eq!(harness.auction.current_round(), 1);
    // sqrt(100 * 400) = 200
    assert_eq!(
        harness.auction.next_price(0, &bidders[1]),
        Some(ether(200))
    );
    assert_eq!(
        harness.auction.next_price(0, &bidders[0]),
        Some(ether(400))
    );
    assert_eq!(harness.auction.next_price(0, &bidders[2]), None);

    let positions: &[Position] = harness.auction.positions(1).unwrap();
    assert_eq!(positions.len(), 2);
    assert_eq!(positions[0].price, ether(400));
    assert_eq!(positions[0].rewarders, vec![bidders[0]]);
    assert_eq!(
        harness.auction.events().last(),
        Some(&AuctionEvent::RoundStarted {
            round: 1,
            positions: 2
        })
    );

    // The sealed round is closed and stragglers lost their lineage
    assert_eq!(
        harness.auction.select_position(bidders[2], 0, 0),
        Err(AuctionError::RoundAlreadySealed(0))
    );
    assert_eq!(
        harness.auction.select_position(bidders[2], 1, 0),
        Err(AuctionError::UnprovenParticipant(bidders[2]))
    );
}

#[test]
fn test_conclude_auction_preconditions() {
    let mut harness: Harness = setup(&[100, 200, 300, 400, 500]);
    let broker: Address = harness.broker;
    assert_eq!(
        harness.auction.conclude_auction(broker),
        Err(AuctionError::StillInBlindPhase)
    );

    harness.reveal().unwrap();
    assert_eq!(
        harness.auction.conclude_auction(broker),
        Err(AuctionError::StillInBlindPhase)
    );

    for (index, bidder) in harness.bidders.clone().into_iter().enumerate() {
        harness.auction.select_position(bidder, 0, index).unwrap();
    }
    harness.auction.advance_round(0).unwrap();
    assert_eq!(harness.auction.positions(1).unwrap().len(), 5);

    let stranger: Address = Address::random();
    let error: AuctionError = harness.auction.conclude_auction(stranger).unwrap_err();
    assert_eq!(error, AuctionError::TooManyPositions(5));
    assert_eq!(error.kind(), ErrorKind::AuthorizationFailure);

    // Target of [500, 400, 300, 200, 100] samples [500, 300, 100], whose mean is ~246.6
    assert_eq!(harness.auction.conclude_auction(broker), Ok(harness.bidders[1]));
    assert_eq!(harness.auction.winning_price(), ether(200));
    assert_eq!(harness.auction.phase(), Phase::Concluded);

    assert_eq!(
        harness.auction.conclude_auction(broker),
        Err(AuctionError::AlreadyConcluded)
    );
    assert_eq!(
        harness.auction.select_position(harness.bidders[0], 1, 1),
        Err(AuctionError::AlreadyConcluded)
    );
    assert_eq!(
        harness.auction.advance_round(1),
        Err(AuctionError::AlreadyConcluded)
    );
}

#[test]
fn test_select_winning_position() {
    let positions = |prices: &[u64]| -> Vec<Position> {
        prices
            .iter()
            .map(|price: &u64| Position::new(U256::from(*price)))
            .collect()
    };

    assert_eq!(
        select_winning_position(&positions(&[100, 150, 200]), U256::from(150)),
        Some(1)
    );
    assert_eq!(
        select_winning_position(&positions(&[125, 150, 175]), U256::from(150)),
        Some(1)
    );
    // Equally close positions resolve to the earliest
    assert_eq!(
        select_winning_position(&positions(&[175, 125]), U256::from(150)),
        Some(0)
    );
    assert_eq!(
        select_winning_position(&positions(&[10, 20, 90]), U256::from(1000)),
        Some(2)
    );
    assert_eq!(select_winning_position(&[], U256::from(150)), None);
}

#[test]
fn test_claim_prize() {
    let mut harness: Harness = sealed(&[100, 200, 300, 400, 500]);
    let bidders: Vec<Address> = harness.bidders.clone();
    assert_eq!(
        harness.auction.claim_prize(bidders[0]),
        Err(AuctionError::NotWinner(bidders[0]))
    );

    for (index, bidder) in bidders.iter().enumerate().take(3) {
        harness.auction.select_position(*bidder, 0, index).unwrap();
    }
    harness.auction.advance_round(0).unwrap();
    let winner: Address = harness.auction.conclude_auction(bidders[4]).unwrap();
    let loser: Address = *bidders.iter().find(|bidder| **bidder != winner).unwrap();

    assert_eq!(
        harness.auction.claim_prize(loser),
        Err(AuctionError::NotWinner(loser))
    );
    harness.auction.claim_prize(winner).unwrap();
    assert!(harness.auction.is_prize_claimed());
    assert_eq!(
        harness.auction.prize().owner_of(U256::from(PRIZE_ID)),
        Some(winner)
    );
    assert_eq!(
        harness.auction.events().last(),
        Some(&AuctionEvent::PrizeClaimed {
            winner,
            prize_id: U256::from(PRIZE_ID),
        })
    );

    assert_eq!(
        harness.auction.claim_prize(winner),
        Err(AuctionError::PrizeAlreadyClaimed)
    );
    assert_eq!(
        harness.auction.claim_prize(loser),
        Err(AuctionError::PrizeAlreadyClaimed)
    );
}

#[test]
fn test_claim_prize_outside_custody() {
    let mut harness: Harness = sealed(&[100, 200, 300, 400, 500]);
    harness
        .auction
        .prize_mut()
        .mint(&Address::random(), U256::from(PRIZE_ID));

    harness.auction.select_position(harness.bidders[0], 0, 0).unwrap();
    harness.auction.advance_round(0).unwrap();
    let winner: Address = harness.auction.conclude_auction(harness.broker).unwrap();
    assert_eq!(winner, harness.bidders[0]);

    assert_eq!(harness.auction.claim_prize(winner), Err(AuctionError::NoPrize));
    assert!(!harness.auction.is_prize_claimed());
}

#[test]
fn test_withdraw_rewards() {
    let mut harness: Harness = sealed(&[100, 200, 300, 400, 500]);
    let (buyer, seller) = (harness.bidders[0], harness.bidders[2]);
    assert_eq!(
        harness.auction.withdraw_rewards(seller),
        Err(AuctionError::NoRewards)
    );

    harness.auction.select_position(buyer, 0, 2).unwrap();
    assert_eq!(harness.auction.withdraw_rewards(seller), Ok(ether(2)));
    assert_eq!(harness.balance(&seller), ether(100));
    assert_eq!(harness.auction.rewards_of(&seller), U256::ZERO);
    assert_eq!(
        harness.auction.events().last(),
        Some(&AuctionEvent::RewardWithdrawn {
            bidder: seller,
            amount: ether(2),
        })
    );
    assert_eq!(
        harness.auction.withdraw_rewards(seller),
        Err(AuctionError::NoRewards)
    );
}

#[test]
fn test_collaborator_failures_unwind() {
    let mut harness: Harness = sealed(&[100, 200, 300, 400, 500]);
    let (buyer, seller) = (harness.bidders[0], harness.bidders[1]);
    let events: usize = harness.auction.events().len();

    harness.auction.escrow_mut().halt();
    let error: AuctionError = harness.auction.select_position(buyer, 0, 1).unwrap_err();
    assert_eq!(error, AuctionError::Transfer(TransferError::Halted));
    assert_eq!(error.kind(), ErrorKind::CollaboratorFailure);
    assert_eq!(harness.auction.rewards_of(&seller), U256::ZERO);
    assert_eq!(harness.auction.bidders(0).map(<[_]>::len), Some(0));
    assert_eq!(harness.auction.events().len(), events);

    harness.auction.escrow_mut().resume();
    harness.auction.select_position(buyer, 0, 1).unwrap();

    harness.auction.escrow_mut().halt();
    assert_eq!(
        harness.auction.withdraw_rewards(seller),
        Err(AuctionError::Transfer(TransferError::Halted))
    );
    assert_eq!(harness.auction.rewards_of(&seller), ether(2));
    assert_eq!(harness.auction.total_outstanding(), ether(2));
    harness.auction.escrow_mut().resume();

    harness.auction.advance_round(0).unwrap();
    let winner: Address = harness.auction.conclude_auction(harness.broker).unwrap();
    harness.auction.prize_mut().halt();
    assert_eq!(
        harness.auction.claim_prize(winner),
        Err(AuctionError::Transfer(TransferError::Halted))
    );
    assert!(!harness.auction.is_prize_claimed());

    harness.auction.prize_mut().resume();
    harness.auction.claim_prize(winner).unwrap();
}

#[test]
fn test_operator_withdraw() {
    let mut harness: Harness = sealed(&[100, 200, 300, 400, 500]);
    let broker: Address = harness.broker;
    harness.auction.select_position(harness.bidders[0], 0, 1).unwrap();

    let stranger: Address = Address::random();
    assert_eq!(
        harness.auction.operator_withdraw(stranger, ether(1)),
        Err(AuctionError::NotBroker(stranger))
    );
    assert_eq!(
        harness.auction.operator_withdraw(broker, ether(11)),
        Err(AuctionError::InsufficientUnearmarkedFunds {
            available: ether(10),
            requested: ether(11),
        })
    );

    harness.auction.operator_withdraw(broker, ether(10)).unwrap();
    assert_eq!(harness.balance(&broker), ether(10));
    assert_eq!(harness.auction.unearmarked_funds(), U256::ZERO);
    assert_eq!(
        harness.auction.events().last(),
        Some(&AuctionEvent::OperatorWithdrawn {
            broker,
            amount: ether(10),
        })
    );

    // Owed rewards stay withdrawable
    assert_eq!(
        harness.auction.withdraw_rewards(harness.bidders[1]),
        Ok(ether(2))
    );
}

#[test]
fn test_end_to_end() {
    let mut harness: Harness = setup(&[100, 200, 300, 400, 500]);
    harness.reveal().unwrap();
    let bidders: Vec<Address> = harness.bidders.clone();

    // (bidder, position) selections for each round until few enough positions remain
    let plan: [&[(usize, usize)]; 2] = [
        &[(0, 0), (1, 1), (2, 2), (3, 2), (4, 4)],
        // Round one holds [100, 200, 300, 500]; everyone with lineage settles on 300
        &[(0, 2), (1, 2), (2, 2), (3, 2)],
    ];
    for selections in plan {
        let round: usize = harness.auction.current_round();
        for (bidder, position) in selections {
            harness
                .auction
                .select_position(bidders[*bidder], round, *position)
                .unwrap();
        }
        harness.auction.advance_round(round).unwrap();
    }

    // Round two holds ~173.2, ~244.9 and 300, with a target of ~233.5
    let round: usize = harness.auction.current_round();
    assert_eq!(round, 2);
    assert!(harness.auction.positions(round).unwrap().len() <= MIN_POSITIONS);

    let stranger: Address = Address::random();
    let winner: Address = harness.auction.conclude_auction(stranger).unwrap();
    assert_eq!(winner, bidders[1]);
    assert_eq!(harness.auction.winner(), Some(winner));

    // Every fee of the rounds is owed to a rewarder
    assert_eq!(harness.auction.total_outstanding(), ether(18));
    assert_eq!(harness.auction.unearmarked_funds(), ether(10));

    let owed: U256 = harness.auction.rewards_of(&winner);
    assert!(owed > U256::ZERO);
    let before: U256 = harness.balance(&winner);
    assert_eq!(harness.auction.withdraw_rewards(winner), Ok(owed));
    assert_eq!(harness.balance(&winner), before + owed);

    harness.auction.claim_prize(winner).unwrap();

    let events: AuctionEvents = harness.auction.take_events();
    let count = |name: &str| events.iter().filter(|event| event.name() == name).count();
    assert_eq!(count("bid entered"), 5);
    assert_eq!(count("round started"), 3);
    assert_eq!(count("position selected"), 9);
    assert_eq!(count("auction ended"), 1);
    assert_eq!(count("prize claimed"), 1);
    assert!(harness.auction.events().is_empty());
}

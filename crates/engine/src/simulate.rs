// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Monte Carlo equity simulation.
use rand::Rng;
use serde::{Deserialize, Serialize};

use potodds_cards::{Card, Deck};
use potodds_eval::HandValue;

use crate::EngineError;

/// Community cards on a full board.
const BOARD_SIZE: usize = 5;

/// Hole cards per player.
const HOLE_CARDS: usize = 2;

/// Cards in an evaluated hand.
const HAND_SIZE: usize = HOLE_CARDS + BOARD_SIZE;

/// An equity estimation request.
///
/// A request is validated on construction and immutable afterward, so by
/// the time it reaches a worker no card or deal checks are needed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationRequest {
    players: usize,
    hero: [Card; HOLE_CARDS],
    board: Vec<Card>,
    dead: Vec<Card>,
    iterations: u32,
}

impl SimulationRequest {
    /// Creates a validated request.
    ///
    /// The hero must hold exactly two cards, the board at most five, the
    /// player count must be a supported table size, and no card may appear
    /// twice across the hero, board, and dead cards. A deal that needs
    /// more cards than the deck has left fails with
    /// [EngineError::DeckExhausted].
    pub fn new(
        players: usize,
        hero: &[Card],
        board: &[Card],
        dead: &[Card],
        iterations: u32,
    ) -> Result<Self, EngineError> {
        if hero.len() != HOLE_CARDS {
            return Err(EngineError::InsufficientHoleCards(hero.len()));
        }

        if !(2..=10).contains(&players) {
            return Err(EngineError::InvalidPlayerCount(players));
        }

        if board.len() > BOARD_SIZE {
            return Err(EngineError::TooManyBoardCards(board.len()));
        }

        if iterations == 0 {
            return Err(EngineError::NoIterations);
        }

        let mut seen: Vec<Card> = Vec::with_capacity(hero.len() + board.len() + dead.len());
        for &card in hero.iter().chain(board).chain(dead) {
            if seen.contains(&card) {
                return Err(EngineError::DuplicateCard(card));
            }
            seen.push(card);
        }

        let needed = BOARD_SIZE - board.len() + (players - 1) * HOLE_CARDS;
        if needed > Deck::SIZE - seen.len() {
            return Err(EngineError::DeckExhausted);
        }

        Ok(Self {
            players,
            hero: [hero[0], hero[1]],
            board: board.to_vec(),
            dead: dead.to_vec(),
            iterations,
        })
    }

    /// The number of players at the table, hero included.
    pub fn players(&self) -> usize {
        self.players
    }

    /// The hero hole cards.
    pub fn hero(&self) -> &[Card] {
        &self.hero
    }

    /// The known board cards.
    pub fn board(&self) -> &[Card] {
        &self.board
    }

    /// The cards excluded from play.
    pub fn dead(&self) -> &[Card] {
        &self.dead
    }

    /// The trials budget for this request.
    pub fn iterations(&self) -> u32 {
        self.iterations
    }
}

/// Raw win and tie counters for a batch of trials.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialCounts {
    /// Trials the hero won outright.
    pub wins: u64,
    /// Trials the hero split with at least one opponent.
    pub ties: u64,
    /// Trials run.
    pub trials: u64,
}

impl TrialCounts {
    /// Adds another batch of counters to this one.
    pub fn merge(&mut self, other: TrialCounts) {
        self.wins += other.wins;
        self.ties += other.ties;
        self.trials += other.trials;
    }
}

/// Single threaded sampling core.
///
/// Each worker owns its own simulator, there is no shared mutable state
/// between workers during a run. The random source is injected so tests
/// can run with a seeded generator.
#[derive(Debug, Clone)]
pub struct Simulator {
    /// The undealt cards, copied into a working deck for every trial.
    deck: Vec<Card>,
    hero: [Card; HOLE_CARDS],
    board: Vec<Card>,
    opponents: usize,
}

impl Simulator {
    /// Creates a simulator for a validated request.
    pub fn new(request: &SimulationRequest) -> Self {
        let deck = Deck::all()
            .iter()
            .copied()
            .filter(|c| {
                !request.hero().contains(c)
                    && !request.board().contains(c)
                    && !request.dead().contains(c)
            })
            .collect();

        Self {
            deck,
            hero: [request.hero()[0], request.hero()[1]],
            board: request.board().to_vec(),
            opponents: request.players() - 1,
        }
    }

    /// Runs a batch of trials and returns the raw counters.
    pub fn run<R: Rng>(&self, trials: u64, rng: &mut R) -> TrialCounts {
        let draw = BOARD_SIZE - self.board.len();
        let needed = draw + self.opponents * HOLE_CARDS;

        // The hand buffer keeps the community cards in the top five slots
        // so evaluating a player only swaps the two hole slots.
        let mut hand = [self.hero[0]; HAND_SIZE];
        hand[HOLE_CARDS..HOLE_CARDS + self.board.len()].copy_from_slice(&self.board);

        let mut work = self.deck.clone();
        let mut counts = TrialCounts::default();

        for _ in 0..trials {
            work.copy_from_slice(&self.deck);

            // Partial Fisher-Yates, only the first `needed` positions are
            // dealt so only those need to be uniform.
            for j in 0..needed {
                let r = rng.random_range(j..work.len());
                work.swap(j, r);
            }

            hand[HOLE_CARDS + self.board.len()..].copy_from_slice(&work[..draw]);

            hand[..HOLE_CARDS].copy_from_slice(&self.hero);
            let hero_value = HandValue::eval(&hand);

            let mut won = true;
            let mut tied = false;

            for opponent in 0..self.opponents {
                let pos = draw + opponent * HOLE_CARDS;
                hand[0] = work[pos];
                hand[1] = work[pos + 1];

                let value = HandValue::eval(&hand);
                if value > hero_value {
                    // Lost, no other opponent can change that.
                    won = false;
                    tied = false;
                    break;
                } else if value == hero_value {
                    // Tied for now, a later opponent may still win.
                    won = false;
                    tied = true;
                }
            }

            if won {
                counts.wins += 1;
            } else if tied {
                counts.ties += 1;
            }
        }

        counts.trials = trials;
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::prelude::*;

    fn cards(s: &str) -> Vec<Card> {
        s.split_whitespace()
            .map(|t| t.parse::<Card>().unwrap())
            .collect()
    }

    fn request(players: usize, hero: &str, board: &str, iterations: u32) -> SimulationRequest {
        SimulationRequest::new(players, &cards(hero), &cards(board), &[], iterations).unwrap()
    }

    fn win_pct(players: usize, hero: &str, board: &str, trials: u64, seed: u64) -> f64 {
        let request = request(players, hero, board, 1);
        let simulator = Simulator::new(&request);
        let mut rng = SmallRng::seed_from_u64(seed);

        let counts = simulator.run(trials, &mut rng);
        assert_eq!(counts.trials, trials);
        assert!(counts.wins + counts.ties <= counts.trials);

        counts.wins as f64 * 100.0 / counts.trials as f64
    }

    #[test]
    fn request_validation() {
        let ah = cards("Ah");
        let hero = cards("Ah Ad");

        assert_eq!(
            SimulationRequest::new(2, &ah, &[], &[], 1000).unwrap_err(),
            EngineError::InsufficientHoleCards(1)
        );

        assert_eq!(
            SimulationRequest::new(1, &hero, &[], &[], 1000).unwrap_err(),
            EngineError::InvalidPlayerCount(1)
        );

        assert_eq!(
            SimulationRequest::new(11, &hero, &[], &[], 1000).unwrap_err(),
            EngineError::InvalidPlayerCount(11)
        );

        assert_eq!(
            SimulationRequest::new(2, &hero, &cards("2c 3c 4c 5c 6c 7c"), &[], 1000).unwrap_err(),
            EngineError::TooManyBoardCards(6)
        );

        assert_eq!(
            SimulationRequest::new(2, &hero, &[], &[], 0).unwrap_err(),
            EngineError::NoIterations
        );
    }

    #[test]
    fn request_rejects_duplicates() {
        let hero = cards("Ah Ad");

        assert_eq!(
            SimulationRequest::new(2, &cards("Ah Ah"), &[], &[], 1000).unwrap_err(),
            EngineError::DuplicateCard(cards("Ah")[0])
        );

        // Across hero and board.
        assert_eq!(
            SimulationRequest::new(2, &hero, &cards("Kd Ah 2c"), &[], 1000).unwrap_err(),
            EngineError::DuplicateCard(cards("Ah")[0])
        );

        // Across board and dead cards.
        assert_eq!(
            SimulationRequest::new(2, &hero, &cards("Kd Qh 2c"), &cards("2c"), 1000).unwrap_err(),
            EngineError::DuplicateCard(cards("2c")[0])
        );
    }

    #[test]
    fn request_rejects_exhausted_deck() {
        let hero = cards("Ah Ad");

        // Ten players need 23 cards but 33 dead cards leave only 17.
        let dead = Deck::all()
            .iter()
            .copied()
            .filter(|c| !hero.contains(c))
            .take(33)
            .collect::<Vec<_>>();

        assert_eq!(
            SimulationRequest::new(10, &hero, &[], &dead, 1000).unwrap_err(),
            EngineError::DeckExhausted
        );

        // With fewer dead cards the same request is fine.
        assert!(SimulationRequest::new(10, &hero, &[], &dead[..27], 1000).is_ok());
    }

    #[test]
    fn simulator_excludes_known_cards() {
        let request = request(3, "Ah Ad", "Kd Qh 2c", 1);
        let simulator = Simulator::new(&request);

        assert_eq!(simulator.deck.len(), Deck::SIZE - 5);
        for card in cards("Ah Ad Kd Qh 2c") {
            assert!(!simulator.deck.contains(&card));
        }
    }

    #[test]
    fn board_royal_flush_always_ties() {
        // Everybody plays the board.
        let request = request(4, "2c 3d", "Th Jh Qh Kh Ah", 1);
        let simulator = Simulator::new(&request);
        let mut rng = SmallRng::seed_from_u64(7);

        let counts = simulator.run(2_000, &mut rng);
        assert_eq!(counts.ties, 2_000);
        assert_eq!(counts.wins, 0);
    }

    #[test]
    fn hero_royal_flush_always_wins() {
        let request = request(4, "Ah Kh", "Th Jh Qh", 1);
        let simulator = Simulator::new(&request);
        let mut rng = SmallRng::seed_from_u64(7);

        let counts = simulator.run(2_000, &mut rng);
        assert_eq!(counts.wins, 2_000);
    }

    #[test]
    fn known_equity_pocket_aces() {
        // Heads-up preflop AA vs a random hand is about 85%.
        let win = win_pct(2, "Ah Ad", "", 100_000, 1);
        assert!((win - 85.2).abs() < 1.5, "win={win:.2}");
    }

    #[test]
    fn known_equity_pocket_kings() {
        // Heads-up preflop KK vs a random hand is about 82%.
        let win = win_pct(2, "Kh Kd", "", 100_000, 2);
        assert!((win - 82.4).abs() < 1.5, "win={win:.2}");
    }

    #[test]
    fn stronger_hole_cards_win_more() {
        // Holding the board and opponents fixed, pocket aces must beat a
        // low offsuit hand by a wide margin.
        let aces = win_pct(3, "Ah Ad", "", 20_000, 3);
        let trash = win_pct(3, "7h 2d", "", 20_000, 3);
        assert!(aces > trash + 20.0, "aces={aces:.2} trash={trash:.2}");
    }
}

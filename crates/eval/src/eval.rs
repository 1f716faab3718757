// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Poker hand evaluator.
use serde::{Deserialize, Serialize};

use potodds_cards::Card;

/// A Poker hand rank, ordered from the weakest to the strongest category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HandRank {
    /// High card.
    HighCard = 0,
    /// One pair.
    OnePair,
    /// Two pairs.
    TwoPair,
    /// Three of a kind.
    ThreeOfAKind,
    /// Straight.
    Straight,
    /// Flush.
    Flush,
    /// Full house.
    FullHouse,
    /// Four of a kind.
    FourOfAKind,
    /// Straight flush.
    StraightFlush,
}

/// Rank bitmasks for the ten straights, ace high first, the wheel last.
///
/// The wheel A-2-3-4-5 is not five consecutive bits, its mask sets the
/// ace bit above the four low ranks.
const STRAIGHTS: [u16; 10] = [
    0x1F00, 0x0F80, 0x07C0, 0x03E0, 0x01F0, 0x00F8, 0x007C, 0x003E, 0x001F, 0x100F,
];

/// Bits below the hand rank used for the kickers encoding.
const RANK_SHIFT: u32 = 20;

/// A hand strength value.
///
/// The value packs the hand rank in the high bits and the tie breaking
/// kickers in decreasing significance below it, so that comparing two
/// values compares the hands under standard Poker rules, and two equal
/// values are a true tie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HandValue(u32);

impl HandValue {
    /// Evaluates a 5, 6, or 7 cards hand.
    ///
    /// For 6 and 7 cards the value is the maximum over all the 5 cards
    /// subsets, all C(n, 5) of them are evaluated.
    ///
    /// Panics if the hand has fewer than 5 or more than 7 cards.
    pub fn eval(cards: &[Card]) -> HandValue {
        let n = cards.len();
        assert!((5..=7).contains(&n), "eval requires 5 to 7 cards");

        let mut hand = [cards[0]; 5];
        let mut best = HandValue(0);

        for c1 in 0..n {
            hand[0] = cards[c1];

            for c2 in (c1 + 1)..n {
                hand[1] = cards[c2];

                for c3 in (c2 + 1)..n {
                    hand[2] = cards[c3];

                    for c4 in (c3 + 1)..n {
                        hand[3] = cards[c4];

                        for c5 in (c4 + 1)..n {
                            hand[4] = cards[c5];
                            best = best.max(Self::eval5(&hand));
                        }
                    }
                }
            }
        }

        best
    }

    /// Returns the hand rank for this value.
    pub fn rank(&self) -> HandRank {
        match self.0 >> RANK_SHIFT {
            0 => HandRank::HighCard,
            1 => HandRank::OnePair,
            2 => HandRank::TwoPair,
            3 => HandRank::ThreeOfAKind,
            4 => HandRank::Straight,
            5 => HandRank::Flush,
            6 => HandRank::FullHouse,
            7 => HandRank::FourOfAKind,
            8 => HandRank::StraightFlush,
            r => panic!("Invalid hand rank {r}"),
        }
    }

    /// Packs a rank and its kickers encoding into a value.
    fn new(rank: HandRank, kickers: u32) -> HandValue {
        HandValue(((rank as u32) << RANK_SHIFT) | kickers)
    }

    /// Evaluates a 5 cards hand.
    fn eval5(cards: &[Card; 5]) -> HandValue {
        // Bitmask of the ranks in the hand.
        let q = (cards.iter().fold(0, |acc, c| acc | c.id()) >> 16) as u16;

        // All suit bits survive the AND only when the five cards share
        // the suit.
        let flush = cards.iter().fold(!0, |acc, c| acc & c.id()) & 0xF000 != 0;

        match (flush, Self::straight_high(q)) {
            (true, Some(high)) => Self::new(HandRank::StraightFlush, u32::from(high)),
            (true, None) => Self::new(HandRank::Flush, u32::from(q)),
            (false, Some(high)) => Self::new(HandRank::Straight, u32::from(high)),
            (false, None) => Self::eval_groups(cards, q),
        }
    }

    /// Returns the high card rank for a straight ranks bitmask.
    ///
    /// The wheel ranks below the six high straight with the five as its
    /// high card.
    fn straight_high(q: u16) -> Option<u8> {
        STRAIGHTS
            .iter()
            .position(|&mask| mask == q)
            .map(|pos| if pos == 9 { 3 } else { 12 - pos as u8 })
    }

    /// Classifies a hand with repeated ranks by its multiplicity pattern.
    ///
    /// The five rank indices are sorted from highest to lowest so each
    /// pattern is an equality test at fixed offsets, the kickers follow
    /// the group ranks in decreasing significance.
    fn eval_groups(cards: &[Card; 5], q: u16) -> HandValue {
        let mut ranks = [0u8; 5];
        for (pos, card) in cards.iter().enumerate() {
            ranks[pos] = card.rank_bits();
        }
        ranks.sort_unstable_by(|a, b| b.cmp(a));

        let [r0, r1, r2, r3, r4] = ranks.map(u32::from);

        use HandRank::*;
        if r0 == r3 {
            Self::new(FourOfAKind, (r0 << 4) | r4)
        } else if r1 == r4 {
            Self::new(FourOfAKind, (r1 << 4) | r0)
        } else if r0 == r2 && r3 == r4 {
            Self::new(FullHouse, (r0 << 4) | r3)
        } else if r0 == r1 && r2 == r4 {
            Self::new(FullHouse, (r2 << 4) | r0)
        } else if r0 == r2 {
            Self::new(ThreeOfAKind, (r0 << 8) | (r3 << 4) | r4)
        } else if r1 == r3 {
            Self::new(ThreeOfAKind, (r1 << 8) | (r0 << 4) | r4)
        } else if r2 == r4 {
            Self::new(ThreeOfAKind, (r2 << 8) | (r0 << 4) | r1)
        } else if r0 == r1 && r2 == r3 {
            Self::new(TwoPair, (r0 << 8) | (r2 << 4) | r4)
        } else if r0 == r1 && r3 == r4 {
            Self::new(TwoPair, (r0 << 8) | (r3 << 4) | r2)
        } else if r1 == r2 && r3 == r4 {
            Self::new(TwoPair, (r1 << 8) | (r3 << 4) | r0)
        } else if r0 == r1 {
            Self::new(OnePair, (r0 << 12) | (r2 << 8) | (r3 << 4) | r4)
        } else if r1 == r2 {
            Self::new(OnePair, (r1 << 12) | (r0 << 8) | (r3 << 4) | r4)
        } else if r2 == r3 {
            Self::new(OnePair, (r2 << 12) | (r0 << 8) | (r1 << 4) | r4)
        } else if r3 == r4 {
            Self::new(OnePair, (r3 << 12) | (r0 << 8) | (r1 << 4) | r2)
        } else {
            Self::new(HighCard, u32::from(q))
        }
    }
}

// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Potodds Poker hand evaluator.
//!
//! Poker hand evaluator for 5, 6 and 7 cards hands built on the
//! [Cactus Kev's][kevlink] card encoding: a 5 cards hand is classified
//! with bitwise suit and rank tests, a 6 or 7 cards hand takes the best
//! value over all its 5 cards subsets.
//!
//! To use the evaluator create a hand and use [HandValue] to evaluate the
//! hand and get its rank:
//!
//! ```
//! # use potodds_eval::*;
//! let hand = ["Ah", "Kh", "Qh", "Jh", "Th"]
//!     .iter()
//!     .map(|s| s.parse::<Card>().unwrap())
//!     .collect::<Vec<_>>();
//! let value = HandValue::eval(&hand);
//! assert_eq!(value.rank(), HandRank::StraightFlush);
//! ```
//!
//! [kevlink]: http://suffe.cool/poker/evaluator.html
#![warn(clippy::all, rust_2018_idioms, missing_docs)]
mod eval;
pub use eval::{HandRank, HandValue};

// Reexport cards types.
pub use potodds_cards::{Card, Deck, InvalidCard, Rank, Suit};

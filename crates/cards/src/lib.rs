// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Potodds Poker cards types.
//!
//! This crate defines types to create cards:
//!
//! ```
//! # use potodds_cards::{Card, Rank, Suit};
//! let ah = Card::new(Rank::Ace, Suit::Hearts);
//! let kd = Card::new(Rank::King, Suit::Diamonds);
//! ```
//!
//! a card can also be parsed from its two character form, a rank in
//! `{2,..,9,T,J,Q,K,A}` followed by a suit in `{h,d,c,s}`:
//!
//! ```
//! # use potodds_cards::{Card, Rank, Suit};
//! let ah = "Ah".parse::<Card>().unwrap();
//! assert_eq!(ah, Card::new(Rank::Ace, Suit::Hearts));
//! assert_eq!(ah.to_string(), "Ah");
//! ```
//!
//! and a [Deck] type for shuffling and dealing cards:
//!
//! ```
//! # use potodds_cards::{Card, Deck, Rank, Suit};
//! let mut deck = Deck::new_and_shuffled(&mut rand::rng());
//! let card = deck.deal();
//! assert_eq!(deck.count(), Deck::SIZE - 1);
//! ```
#![warn(clippy::all, rust_2018_idioms, missing_docs)]
mod deck;
pub use deck::{Card, Deck, InvalidCard, Rank, Suit};

// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Engine error types.
use thiserror::Error;

use potodds_cards::{Card, InvalidCard};

/// Errors surfaced by the equity engine.
///
/// Request errors are detected when a [SimulationRequest] is built, before
/// any simulation work begins. [EngineError::Cancelled] is expected during
/// normal operation and is not a failure from the caller's perspective.
///
/// [SimulationRequest]: crate::SimulationRequest
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// A malformed or unrecognized card token.
    #[error(transparent)]
    InvalidCard(#[from] InvalidCard),
    /// A card appears more than once across hero, board, and dead cards.
    #[error("duplicate card {0}")]
    DuplicateCard(Card),
    /// The hero does not hold exactly two cards.
    #[error("expected 2 hole cards, got {0}")]
    InsufficientHoleCards(usize),
    /// The player count is outside the supported table sizes.
    #[error("player count {0} is not in the 2..=10 range")]
    InvalidPlayerCount(usize),
    /// More than five board cards.
    #[error("board has {0} cards, at most 5 are allowed")]
    TooManyBoardCards(usize),
    /// The iterations budget is zero.
    #[error("iterations count must be positive")]
    NoIterations,
    /// Too few undealt cards are left to complete a trial.
    #[error("the deck has too few cards left to deal")]
    DeckExhausted,
    /// The request was superseded by a newer submission.
    #[error("superseded by a newer request")]
    Cancelled,
    /// An internal engine failure.
    #[error("engine failure: {reason}")]
    Engine {
        /// What failed.
        reason: String,
    },
}

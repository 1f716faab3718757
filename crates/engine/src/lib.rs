// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Potodds Poker equity engine.
//!
//! Estimates win, tie, and lose probabilities for a hero hand against a
//! number of random opponents by Monte Carlo sampling, with the sampling
//! workload fanned out to a fixed pool of worker threads.
//!
//! The [EquityPool] keeps at most one request live: submitting a new
//! request cancels the one in flight, so an interactive caller can keep
//! firing requests as the hand changes and only ever observe the result
//! of the latest one.
//!
//! ```no_run
//! # use potodds_engine::{Card, EngineError, EquityPool, SimulationRequest};
//! # async fn example() -> Result<(), EngineError> {
//! let pool = EquityPool::new();
//!
//! let hero = ["Ah".parse::<Card>()?, "Ad".parse::<Card>()?];
//! let request = SimulationRequest::new(2, &hero, &[], &[], 100_000)?;
//!
//! let result = pool.compute_equity(request).await?;
//! println!("win {:.1}% tie {:.1}%", result.win_pct, result.tie_pct);
//! # Ok(())
//! # }
//! ```
#![warn(clippy::all, rust_2018_idioms, missing_docs)]
mod error;
mod pool;
mod simulate;

pub use error::EngineError;
pub use pool::{EquityPool, ResultReceiver, SimulationResult};
pub use simulate::{SimulationRequest, Simulator, TrialCounts};

// Reexport cards and evaluator types.
pub use potodds_cards::{Card, Deck, InvalidCard, Rank, Suit};
pub use potodds_eval::{HandRank, HandValue};

// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Parallel equity workers pool.
use log::{debug, error, info};
use parking_lot::Mutex;
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::{
    num::NonZeroUsize,
    panic::{self, AssertUnwindSafe},
    sync::{Arc, mpsc},
    thread,
    time::{Duration, Instant},
};
use tokio::sync::oneshot;

use crate::{EngineError, SimulationRequest, Simulator, TrialCounts};

/// Workers to spawn when the hardware parallelism is unknown.
const DEFAULT_WORKERS: usize = 4;

/// Trials a worker runs between generation checks, so a superseded job
/// stops early instead of running its full share.
const TRIALS_CHUNK: u64 = 4096;

/// An aggregated equity estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Percentage of trials the hero won outright.
    pub win_pct: f64,
    /// Percentage of trials the hero split the pot.
    pub tie_pct: f64,
    /// Percentage of trials the hero lost.
    pub lose_pct: f64,
    /// Total trials run across all workers.
    pub trials: u64,
    /// Wall clock time from submission to aggregation.
    pub elapsed: Duration,
}

impl SimulationResult {
    /// Builds a result from the aggregated raw counters.
    ///
    /// Percentages are computed once from the summed counts so uneven
    /// worker shares carry their real weight.
    fn from_counts(counts: TrialCounts, elapsed: Duration) -> Self {
        let trials = counts.trials as f64;
        let win_pct = counts.wins as f64 * 100.0 / trials;
        let tie_pct = counts.ties as f64 * 100.0 / trials;

        Self {
            win_pct,
            tie_pct,
            lose_pct: 100.0 - win_pct - tie_pct,
            trials: counts.trials,
            elapsed,
        }
    }
}

/// The receiver side of a submission.
pub type ResultReceiver = oneshot::Receiver<Result<SimulationResult, EngineError>>;

/// Resolves a submission, at most once.
type Reply = oneshot::Sender<Result<SimulationResult, EngineError>>;

/// A request message to a worker.
enum Job {
    /// Run a share of a request's iterations budget.
    Calculate {
        /// The generation this job belongs to.
        generation: u64,
        /// The request shared by all the workers of this generation.
        request: Arc<SimulationRequest>,
        /// This worker trials share.
        trials: u64,
    },
}

/// A pool of worker threads that fans out equity requests.
///
/// The pool keeps at most one request live. Submitting a request while a
/// previous one is in flight cancels it: its submitter observes
/// [EngineError::Cancelled] and its partial counts are discarded, a result
/// from a superseded request is never delivered as if it were current.
pub struct EquityPool {
    workers: Vec<Worker>,
    shared: Arc<Shared>,
}

struct Worker {
    tx: mpsc::Sender<Job>,
    handle: thread::JoinHandle<()>,
}

struct Shared {
    state: Mutex<State>,
}

struct State {
    /// Monotonically increasing tag of the current request.
    ///
    /// A report whose tag does not match is stale and is dropped, which
    /// makes cancellation a pure tag comparison.
    generation: u64,
    /// Workers of the current generation that have not reported yet.
    remaining: usize,
    /// Raw counters accumulated from the current generation workers.
    counts: TrialCounts,
    /// Resolves the current submission.
    reply: Option<Reply>,
    /// Submission time of the current request.
    started: Instant,
}

impl Shared {
    /// The tag of the request currently in flight.
    fn current_generation(&self) -> u64 {
        self.state.lock().generation
    }

    /// Accumulates a worker report.
    ///
    /// Stale generation reports are dropped at this barrier. The last
    /// reporting worker of the current generation aggregates the counts
    /// and resolves the submission.
    fn report(&self, generation: u64, counts: TrialCounts) {
        let mut state = self.state.lock();
        if generation != state.generation {
            debug!("Dropping stale report for generation {generation}");
            return;
        }

        state.counts.merge(counts);
        state.remaining -= 1;

        if state.remaining > 0 {
            return;
        }

        if let Some(reply) = state.reply.take() {
            let result = SimulationResult::from_counts(state.counts, state.started.elapsed());
            debug!(
                "Generation {generation} aggregated {} trials in {:?}",
                result.trials, result.elapsed
            );

            // The submitter may have dropped the receiver.
            let _ = reply.send(Ok(result));
        }
    }

    /// Aborts the aggregation of a generation after a worker fault.
    ///
    /// Bumping the generation makes every outstanding report of the
    /// faulted request stale, no partial result is ever synthesized from
    /// an incomplete worker set.
    fn fail(&self, generation: u64, reason: &str) {
        let mut state = self.state.lock();
        if generation != state.generation {
            return;
        }

        state.generation += 1;
        if let Some(reply) = state.reply.take() {
            let _ = reply.send(Err(EngineError::Engine {
                reason: reason.to_string(),
            }));
        }
    }
}

impl EquityPool {
    /// Creates a pool with one worker per available core.
    pub fn new() -> Self {
        let workers = thread::available_parallelism().map_or(DEFAULT_WORKERS, NonZeroUsize::get);
        Self::with_workers(workers)
    }

    /// Creates a pool with a fixed number of workers.
    ///
    /// Panics if `workers` is zero.
    pub fn with_workers(workers: usize) -> Self {
        assert!(workers > 0, "the pool needs at least one worker");

        let shared = Arc::new(Shared {
            state: Mutex::new(State {
                generation: 0,
                remaining: 0,
                counts: TrialCounts::default(),
                reply: None,
                started: Instant::now(),
            }),
        });

        let workers = (0..workers)
            .map(|worker_id| {
                let (tx, rx) = mpsc::channel();
                let shared = shared.clone();
                let handle = thread::spawn(move || worker_loop(worker_id, rx, shared));
                Worker { tx, handle }
            })
            .collect::<Vec<_>>();

        info!("Started equity pool with {} workers", workers.len());

        Self { workers, shared }
    }

    /// The number of workers in the pool.
    pub fn workers(&self) -> usize {
        self.workers.len()
    }

    /// Estimates the hero equity for a request.
    ///
    /// Resolves once per submission: with the aggregated result, with
    /// [EngineError::Cancelled] when a newer request supersedes this one,
    /// or with [EngineError::Engine] on an internal failure.
    pub async fn compute_equity(
        &self,
        request: SimulationRequest,
    ) -> Result<SimulationResult, EngineError> {
        let rx = self.submit(request)?;
        rx.await.map_err(|_| EngineError::Engine {
            reason: "the pool terminated before aggregation".to_string(),
        })?
    }

    /// Submits a request without waiting for its result.
    ///
    /// The iterations budget splits evenly across the workers, rounded up
    /// so every worker runs at least one trial. Any request in flight is
    /// cancelled and replaced atomically: no result from it can be
    /// delivered once this submission holds the current generation.
    pub fn submit(&self, request: SimulationRequest) -> Result<ResultReceiver, EngineError> {
        let (tx, rx) = oneshot::channel();
        let request = Arc::new(request);
        let share = u64::from(request.iterations()).div_ceil(self.workers.len() as u64);

        let generation = {
            let mut state = self.shared.state.lock();
            state.generation += 1;
            state.remaining = self.workers.len();
            state.counts = TrialCounts::default();
            state.started = Instant::now();

            if let Some(reply) = state.reply.replace(tx) {
                debug!("Superseding request generation {}", state.generation - 1);
                let _ = reply.send(Err(EngineError::Cancelled));
            }

            state.generation
        };

        debug!(
            "Dispatching generation {generation}, {share} trials to each of {} workers",
            self.workers.len()
        );

        for worker in &self.workers {
            let job = Job::Calculate {
                generation,
                request: request.clone(),
                trials: share,
            };

            worker.tx.send(job).map_err(|_| EngineError::Engine {
                reason: "a worker stopped accepting requests".to_string(),
            })?;
        }

        Ok(rx)
    }

    /// Terminates the pool.
    ///
    /// A pending submission resolves with [EngineError::Cancelled], the
    /// workers drain and exit, and no further requests are accepted.
    pub fn terminate(self) {
        {
            let mut state = self.shared.state.lock();
            state.generation += 1;
            if let Some(reply) = state.reply.take() {
                let _ = reply.send(Err(EngineError::Cancelled));
            }
        }

        for Worker { tx, handle } in self.workers {
            drop(tx);
            let _ = handle.join();
        }

        info!("Equity pool terminated");
    }
}

impl Default for EquityPool {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs jobs until the pool closes the job channel.
fn worker_loop(worker_id: usize, rx: mpsc::Receiver<Job>, shared: Arc<Shared>) {
    let mut rng = SmallRng::from_os_rng();

    while let Ok(job) = rx.recv() {
        let Job::Calculate {
            generation,
            request,
            trials,
        } = job;

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let simulator = Simulator::new(&request);
            let mut counts = TrialCounts::default();
            let mut left = trials;

            // Cooperative cancellation, poll the generation between chunks.
            while left > 0 && shared.current_generation() == generation {
                let chunk = left.min(TRIALS_CHUNK);
                counts.merge(simulator.run(chunk, &mut rng));
                left -= chunk;
            }

            (counts, left)
        }));

        match outcome {
            Ok((counts, 0)) => shared.report(generation, counts),
            Ok(_) => debug!("Worker {worker_id} abandoned stale generation {generation}"),
            Err(_) => {
                error!("Worker {worker_id} failed on generation {generation}");
                shared.fail(generation, "a worker failed while simulating");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use potodds_cards::Card;

    fn cards(s: &str) -> Vec<Card> {
        s.split_whitespace()
            .map(|t| t.parse::<Card>().unwrap())
            .collect()
    }

    fn request(players: usize, hero: &str, board: &str, iterations: u32) -> SimulationRequest {
        SimulationRequest::new(players, &cards(hero), &cards(board), &[], iterations).unwrap()
    }

    #[tokio::test]
    async fn percentages_add_up() {
        let pool = EquityPool::with_workers(4);
        let result = pool
            .compute_equity(request(3, "Ah Kd", "", 8_000))
            .await
            .unwrap();

        assert!((result.win_pct + result.tie_pct + result.lose_pct - 100.0).abs() < 1e-9);

        // Ceiling rounded shares run at least the requested budget.
        assert!(result.trials >= 8_000);

        pool.terminate();
    }

    #[tokio::test]
    async fn uneven_shares_aggregate_by_counts() {
        // Three workers get a ceiling rounded share of a budget that does
        // not divide evenly.
        let pool = EquityPool::with_workers(3);
        let result = pool
            .compute_equity(request(2, "Ah Ad", "", 10_000))
            .await
            .unwrap();

        assert_eq!(result.trials, 3 * 3_334);
        assert!(result.win_pct > 75.0);

        pool.terminate();
    }

    #[tokio::test]
    async fn newer_request_cancels_in_flight() {
        let pool = EquityPool::with_workers(2);

        // Big enough to still be running when the next request lands.
        let first = pool.submit(request(2, "Ah Ad", "", 5_000_000)).unwrap();
        let second = pool.submit(request(2, "Ah Kh", "Th Jh Qh", 20_000)).unwrap();

        // The first submitter observes the cancellation, never a result.
        assert_eq!(first.await.unwrap(), Err(EngineError::Cancelled));

        // The second result comes from the second request parameters: with
        // a royal flush the hero cannot lose a single trial.
        let result = second.await.unwrap().unwrap();
        assert!(result.win_pct > 99.9, "win={:.2}", result.win_pct);

        pool.terminate();
    }

    #[tokio::test]
    async fn terminate_resolves_pending_submission() {
        let pool = EquityPool::with_workers(2);
        let rx = pool.submit(request(2, "Ah Ad", "", 50_000_000)).unwrap();

        pool.terminate();
        assert_eq!(rx.await.unwrap(), Err(EngineError::Cancelled));
    }

    #[tokio::test]
    async fn sequential_requests_resolve_in_order() {
        let pool = EquityPool::with_workers(2);

        let first = pool
            .compute_equity(request(2, "Ah Ad", "", 4_000))
            .await
            .unwrap();
        let second = pool
            .compute_equity(request(2, "7h 2d", "", 4_000))
            .await
            .unwrap();

        // Both resolved, each from its own request.
        assert!(first.win_pct > second.win_pct);

        pool.terminate();
    }
}

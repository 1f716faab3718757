// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0
//
// Prints a 13x13 preflop equity chart:
//
// ```bash
// $ cargo r --release --example chart -- --players 3
// ```
use anyhow::Result;
use clap::{Parser, value_parser};
use std::time::Instant;

use potodds_engine::{Card, EquityPool, Rank, SimulationRequest, Suit};

fn separator() {
    print!("|");
    for _ in 0..13 {
        print!("-----|");
    }
    println!();
}

#[derive(Debug, Parser)]
struct Cli {
    /// The number of players at the table, hero included.
    #[clap(long, short, default_value_t = 2, value_parser = value_parser!(u8).range(2..=10))]
    players: u8,
    /// Trials per hand.
    #[clap(long, short, default_value_t = 100_000)]
    iterations: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .format_target(false)
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();
    let pool = EquityPool::new();

    separator();

    let now = Instant::now();

    for r1 in Rank::ranks().rev() {
        let mut labels = Vec::with_capacity(13);
        let mut probs = Vec::with_capacity(13);

        for r2 in Rank::ranks().rev() {
            let (c1, c2) = if r1 < r2 || r1 == r2 {
                // Offsuit or pair
                (Card::new(r2, Suit::Hearts), Card::new(r1, Suit::Spades))
            } else {
                // Suited cards
                (Card::new(r1, Suit::Hearts), Card::new(r2, Suit::Hearts))
            };

            if c1.rank() == c2.rank() {
                labels.push(format!("{}{} ", c1.rank(), c2.rank()));
            } else if c1.suit() == c2.suit() {
                labels.push(format!("{}{}s", c1.rank(), c2.rank()));
            } else {
                labels.push(format!("{}{}o", c1.rank(), c2.rank()));
            }

            let request = SimulationRequest::new(
                cli.players as usize,
                &[c1, c2],
                &[],
                &[],
                cli.iterations,
            )?;
            let result = pool.compute_equity(request).await?;
            probs.push(result.win_pct.round());
        }

        print!("|");
        for label in labels {
            print!(" {label} |");
        }

        println!();

        print!("|");
        for prob in &probs {
            print!(" {:2.0}% |", prob.ceil());
        }
        println!();

        separator();
    }

    println!("Elapsed: {:.3}s", now.elapsed().as_secs_f64());

    pool.terminate();

    Ok(())
}

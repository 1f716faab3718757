// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0
use anyhow::Result;
use clap::Parser;

use potodds_engine::{Card, EquityPool, SimulationRequest};

/// A verification scenario with a reference equity.
struct Scenario {
    name: &'static str,
    players: usize,
    hero: &'static str,
    board: &'static str,
    expected_win: f64,
    tolerance: f64,
}

/// Canonical scenarios with known equities against random opponents.
const SCENARIOS: &[Scenario] = &[
    Scenario {
        name: "AA vs random (preflop)",
        players: 2,
        hero: "Ah Ad",
        board: "",
        expected_win: 85.2,
        tolerance: 1.0,
    },
    Scenario {
        name: "KK vs random (preflop)",
        players: 2,
        hero: "Kh Kd",
        board: "",
        expected_win: 82.4,
        tolerance: 1.0,
    },
    Scenario {
        name: "Nut flush draw (AhKh on 2h 7h Jd)",
        players: 2,
        hero: "Ah Kh",
        board: "2h 7h Jd",
        expected_win: 71.9,
        tolerance: 1.0,
    },
    Scenario {
        name: "Flopped set (8h8d on 8c 2s 5d)",
        players: 2,
        hero: "8h 8d",
        board: "8c 2s 5d",
        expected_win: 95.0,
        tolerance: 2.0,
    },
];

#[derive(Debug, Parser)]
struct Cli {
    /// Trials per scenario.
    #[clap(long, short, default_value_t = 200_000)]
    iterations: u32,
    /// Number of worker threads, defaults to the available cores.
    #[clap(long, short)]
    workers: Option<usize>,
}

fn parse_cards(s: &str) -> Result<Vec<Card>> {
    s.split_whitespace()
        .map(|t| Ok(t.parse::<Card>()?))
        .collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .format_target(false)
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();
    let pool = match cli.workers {
        Some(workers) => EquityPool::with_workers(workers),
        None => EquityPool::new(),
    };

    println!(
        "Running equity verification, {} trials per scenario",
        cli.iterations
    );
    println!("==================================");

    let mut passed = 0;
    for scenario in SCENARIOS {
        let hero = parse_cards(scenario.hero)?;
        let board = parse_cards(scenario.board)?;

        let request =
            SimulationRequest::new(scenario.players, &hero, &board, &[], cli.iterations)?;
        let result = pool.compute_equity(request).await?;

        let diff = (result.win_pct - scenario.expected_win).abs();
        let pass = diff <= scenario.tolerance;

        println!("Test: {}", scenario.name);
        println!(
            "  Expected: {:.1}% (tolerance {:.1}%)",
            scenario.expected_win, scenario.tolerance
        );
        println!(
            "  Actual:   {:.2}% over {} trials in {}ms",
            result.win_pct,
            result.trials,
            result.elapsed.as_millis()
        );
        println!("  Result:   {}", if pass { "PASS" } else { "FAIL" });
        println!("----------------------------------");

        if pass {
            passed += 1;
        }
    }

    println!("Summary: {passed}/{} scenarios passed", SCENARIOS.len());

    pool.terminate();

    if passed < SCENARIOS.len() {
        std::process::exit(1);
    }

    Ok(())
}

//! Monte Carlo contest simulator CLI.
//!
//! Usage:
//!   cargo run --release --bin simulate_cli -- [OPTIONS]
//!
//! Options:
//!   --pool <FILE>         Player pool + contest JSON file (required)
//!   --lineups <FILE>      Lineups JSON file to simulate (required)
//!   --config <FILE>       Simulation config JSON file (optional)
//!   --simulations <N>     Number of Monte Carlo iterations (default: 10000)
//!   --output <FILE>       Output file (default: simulation.json)
//!   --seed <N>            Master RNG seed (optional)

use std::env;
use std::fs;
use std::sync::Arc;

use dfs_core::cancel::CancellationHandle;
use dfs_core::model::{Contest, Lineup, Player, PlayerPool};
use dfs_core::progress::ProgressHub;
use dfs_core::simulator::{simulate, SimulationConfig, SimulationStatus};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;

#[derive(Deserialize)]
struct PoolFile {
    contest: Contest,
    players: Vec<Player>,
}

fn main() {
    let args: Vec<String> = env::args().collect();

    let mut pool_file: Option<String> = None;
    let mut lineups_file: Option<String> = None;
    let mut config_file: Option<String> = None;
    let mut num_simulations: Option<u32> = None;
    let mut output_file = "simulation.json".to_string();
    let mut seed: Option<u64> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--pool" | "-p" => {
                i += 1;
                if i < args.len() {
                    pool_file = Some(args[i].clone());
                }
            }
            "--lineups" | "-l" => {
                i += 1;
                if i < args.len() {
                    lineups_file = Some(args[i].clone());
                }
            }
            "--config" | "-c" => {
                i += 1;
                if i < args.len() {
                    config_file = Some(args[i].clone());
                }
            }
            "--simulations" | "-n" => {
                i += 1;
                if i < args.len() {
                    num_simulations = args[i].parse().ok();
                }
            }
            "--output" | "-o" => {
                i += 1;
                if i < args.len() {
                    output_file = args[i].clone();
                }
            }
            "--seed" | "-s" => {
                i += 1;
                if i < args.len() {
                    seed = args[i].parse().ok();
                }
            }
            "--help" | "-h" => {
                print_help();
                return;
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_help();
                return;
            }
        }
        i += 1;
    }

    let (Some(pool_path), Some(lineups_path)) = (pool_file, lineups_file) else {
        eprintln!("--pool and --lineups are both required");
        print_help();
        return;
    };

    println!("=================================================");
    println!("  DFS Contest Simulator");
    println!("=================================================");
    println!();

    println!("Loading player pool from: {}", pool_path);
    let pool_file: PoolFile = match fs::read_to_string(&pool_path).map(|t| serde_json::from_str(&t)) {
        Ok(Ok(p)) => p,
        Ok(Err(e)) => {
            eprintln!("Error parsing pool file: {}", e);
            return;
        }
        Err(e) => {
            eprintln!("Error reading pool file: {}", e);
            return;
        }
    };
    let pool = PlayerPool::new(pool_file.players);
    let contest = pool_file.contest;
    println!("Players loaded: {}", pool.len());

    println!("Loading lineups from: {}", lineups_path);
    let lineups: Vec<Lineup> = match fs::read_to_string(&lineups_path).map(|t| serde_json::from_str(&t)) {
        Ok(Ok(l)) => l,
        Ok(Err(e)) => {
            eprintln!("Error parsing lineups file: {}", e);
            return;
        }
        Err(e) => {
            eprintln!("Error reading lineups file: {}", e);
            return;
        }
    };
    println!("Lineups loaded: {}", lineups.len());

    let mut config = match &config_file {
        Some(path) => {
            println!("Loading simulation config from: {}", path);
            match SimulationConfig::from_json_file(std::path::Path::new(path)) {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("Error loading config: {}", e);
                    return;
                }
            }
        }
        None => SimulationConfig::new(),
    };
    if let Some(n) = num_simulations {
        config = config.with_num_simulations(n);
    }
    if let Some(s) = seed {
        config = config.with_master_seed(s);
    }

    println!("Simulations: {}", config.num_simulations);
    println!("Output: {}", output_file);
    println!();

    let hub = Arc::new(ProgressHub::new());
    let subscription = hub.subscribe("simulate_cli");
    let bar = ProgressBar::new(config.num_simulations as u64);
    bar.set_style(
        ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} iterations")
            .unwrap()
            .progress_chars("##-"),
    );

    println!("Starting simulation...");
    let cancel = CancellationHandle::new();
    let result = simulate(&contest, &lineups, &pool, &config, &cancel, Some((&hub, "simulate_cli")));

    for event in subscription.drain() {
        bar.set_position(event.completed);
    }
    bar.finish_and_clear();

    let result = match result {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Simulator rejected the request: {}", e);
            return;
        }
    };

    println!();
    println!("Status: {:?}", result.status);
    println!("Iterations completed: {}", result.stats.iterations_completed);
    println!("Elapsed: {:.1}ms", result.stats.elapsed_ms);
    for warning in &result.warnings {
        println!("Warning: {:?}", warning);
    }
    println!();

    println!("=== Per-Lineup Results ===");
    for lineup_result in &result.per_lineup {
        println!(
            "Lineup {}: mean={:.2} p50={:.2} cash%={:.1} win%={:.2} ROI={:.2}",
            lineup_result.lineup_index,
            lineup_result.mean,
            lineup_result.p50,
            lineup_result.cash_probability * 100.0,
            lineup_result.win_probability * 100.0,
            lineup_result.expected_roi,
        );
    }
    println!();

    println!("Saving results to {}...", output_file);
    match serde_json::to_string_pretty(&result) {
        Ok(json) => match fs::write(&output_file, json) {
            Ok(_) => println!("Results saved successfully!"),
            Err(e) => eprintln!("Error saving results: {}", e),
        },
        Err(e) => eprintln!("Error serializing results: {}", e),
    }

    if result.status == SimulationStatus::Timeout {
        eprintln!("Simulation hit its deadline before completing every iteration.");
    }

    println!("Done!");
}

fn print_help() {
    println!("DFS Contest Simulator");
    println!();
    println!("Usage: simulate_cli [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -p, --pool <FILE>         Player pool + contest JSON file (required)");
    println!("  -l, --lineups <FILE>      Lineups JSON file to simulate (required)");
    println!("  -c, --config <FILE>       Simulation config JSON file");
    println!("  -n, --simulations <N>     Number of Monte Carlo iterations");
    println!("  -o, --output <FILE>       Output file (default: simulation.json)");
    println!("  -s, --seed <N>            Master RNG seed");
    println!("  -h, --help                Show this help");
}

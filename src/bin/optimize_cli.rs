//! Lineup optimizer CLI.
//!
//! Usage:
//!   cargo run --release --bin optimize_cli -- [OPTIONS]
//!
//! Options:
//!   --pool <FILE>        Player pool + contest JSON file (required)
//!   --config <FILE>      Optimizer config JSON file (optional)
//!   --lineups <N>        Number of lineups to generate (default: 1)
//!   --output <FILE>      Output file (default: lineups.json)
//!   --seconds <N>        Wall-clock deadline in seconds (optional)

use std::env;
use std::fs;
use std::sync::Arc;
use std::time::Duration;

use dfs_core::cancel::CancellationHandle;
use dfs_core::model::{Contest, Player, PlayerPool};
use dfs_core::optimizer::config::OptimizerConfig;
use dfs_core::optimizer::{optimize, OptimizeStatus};
use dfs_core::progress::ProgressHub;
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
    let mut config_file: Option<String> = None;
    let mut num_lineups: u32 = 1;
    let mut output_file = "lineups.json".to_string();
    let mut deadline_secs: Option<u64> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--pool" | "-p" => {
                i += 1;
                if i < args.len() {
                    pool_file = Some(args[i].clone());
                }
            }
            "--config" | "-c" => {
                i += 1;
                if i < args.len() {
                    config_file = Some(args[i].clone());
                }
            }
            "--lineups" | "-n" => {
                i += 1;
                if i < args.len() {
                    num_lineups = args[i].parse().unwrap_or(1);
                }
            }
            "--output" | "-o" => {
                i += 1;
                if i < args.len() {
                    output_file = args[i].clone();
                }
            }
            "--seconds" | "-s" => {
                i += 1;
                if i < args.len() {
                    deadline_secs = args[i].parse().ok();
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

    let Some(pool_path) = pool_file else {
        eprintln!("--pool is required");
        print_help();
        return;
    };

    println!("=================================================");
    println!("  DFS Lineup Optimizer");
    println!("=================================================");
    println!();

    println!("Loading player pool from: {}", pool_path);
    let pool_json = match fs::read_to_string(&pool_path) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error reading pool file: {}", e);
            return;
        }
    };
    let pool_file: PoolFile = match serde_json::from_str(&pool_json) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error parsing pool file: {}", e);
            return;
        }
    };
    let pool = PlayerPool::new(pool_file.players);
    let contest: Contest = pool_file.contest;
    println!("Players loaded: {}", pool.len());

    let mut config = match &config_file {
        Some(path) => {
            println!("Loading optimizer config from: {}", path);
            match OptimizerConfig::from_json_file(std::path::Path::new(path)) {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("Error loading config: {}", e);
                    return;
                }
            }
        }
        None => OptimizerConfig::new(),
    };
    config = config.with_num_lineups(num_lineups);
    if let Some(secs) = deadline_secs {
        config = config.with_deadline(Duration::from_secs(secs));
    }

    println!("Lineups requested: {}", num_lineups);
    println!("Output: {}", output_file);
    println!();

    let hub = Arc::new(ProgressHub::new());
    let subscription = hub.subscribe("optimize_cli");
    let bar = ProgressBar::new(1);
    bar.set_style(
        ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] searching for lineups...")
            .unwrap(),
    );

    println!("Starting search...");
    let cancel = CancellationHandle::new();
    let result = optimize(&contest, &pool, &config, &cancel, Some((&hub, "optimize_cli")));

    for _event in subscription.drain() {
        bar.tick();
    }
    bar.finish_and_clear();

    let result = match result {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Optimizer rejected the request: {}", e);
            return;
        }
    };

    println!();
    println!("Status: {:?}", result.status);
    println!("Valid combinations explored: {}", result.stats.valid_combinations);
    println!("Nodes pruned: {}", result.stats.nodes_pruned);
    println!("Elapsed: {:.1}ms", result.stats.elapsed_ms);
    if let Some(reason) = &result.infeasible_reason {
        println!("Infeasible: {}", reason);
    }
    for warning in &result.warnings {
        println!("Warning: {:?}", warning);
    }
    println!("Lineups produced: {}", result.lineups.len());
    println!();

    println!("=== Top Lineups ===");
    for (i, lineup) in result.lineups.iter().take(5).enumerate() {
        println!(
            "#{} salary={} projection={:.2} objective={:.2}",
            i + 1,
            lineup.total_salary,
            lineup.total_projection,
            lineup.objective.unwrap_or(lineup.total_projection)
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

    if result.status == OptimizeStatus::Cancelled {
        eprintln!("Search was cancelled before completing.");
    }

    println!("Done!");
}

fn print_help() {
    println!("DFS Lineup Optimizer");
    println!();
    println!("Usage: optimize_cli [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -p, --pool <FILE>        Player pool + contest JSON file (required)");
    println!("  -c, --config <FILE>      Optimizer config JSON file");
    println!("  -n, --lineups <N>        Number of lineups to generate (default: 1)");
    println!("  -o, --output <FILE>      Output file (default: lineups.json)");
    println!("  -s, --seconds <N>        Wall-clock deadline in seconds");
    println!("  -h, --help               Show this help");
}

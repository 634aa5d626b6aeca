//! Debug script: build a small synthetic golf pool in-process and inspect
//! what the optimizer and simulator produce for it, without needing a pool
//! JSON fixture on disk.

use dfs_core::cancel::CancellationHandle;
use dfs_core::model::{Contest, ContestType, Platform, Player, PlayerId, PlayerPool, Sport, TeamId};
use dfs_core::optimizer::config::OptimizerConfig;
use dfs_core::optimizer::optimize;
use dfs_core::roster;
use dfs_core::simulator::{simulate, SimulationConfig};

fn synthetic_golf_pool() -> PlayerPool {
    let players: Vec<Player> = (0..24)
        .map(|i| Player {
            id: PlayerId(i),
            external_id: i.to_string(),
            name: format!("Golfer {i}"),
            team: TeamId(format!("T{}", i % 6)),
            opponent: TeamId("FIELD".to_string()),
            position: "G".to_string(),
            salary: 6_000 + (i % 10) * 500,
            projected_points: 55.0 + (i % 20) as f64,
            floor_points: 20.0 + (i % 10) as f64,
            ceiling_points: 90.0 + (i % 25) as f64,
            ownership: 0.03 + (i % 10) as f64 * 0.015,
            is_injured: false,
            batting_order: None,
        })
        .collect();
    PlayerPool::new(players)
}

fn main() {
    let pool = synthetic_golf_pool();
    let contest = Contest {
        sport: Sport::Golf,
        platform: Platform::DraftKings,
        salary_cap: 50_000,
        position_requirements: roster::requirements_for(Sport::Golf, Platform::DraftKings).unwrap(),
        contest_type: ContestType::Gpp,
        total_entries: 1_000,
        entry_fee: 5.0,
        prize_pool: 4_000.0,
    };

    let opt_config = OptimizerConfig::new().with_num_lineups(5).with_min_different_players(2);
    let opt_result = optimize(&contest, &pool, &opt_config, &CancellationHandle::new(), None).unwrap();

    println!("Optimizer status: {:?}", opt_result.status);
    println!("Valid combinations explored: {}", opt_result.stats.valid_combinations);
    println!("Nodes pruned: {}", opt_result.stats.nodes_pruned);
    println!();
    for (i, lineup) in opt_result.lineups.iter().enumerate() {
        println!(
            "Lineup {}: salary={} projection={:.1} players={:?}",
            i,
            lineup.total_salary,
            lineup.total_projection,
            lineup.player_ids()
        );
    }

    println!();
    println!("Simulating the top lineup against a synthetic field...");
    let sim_config = SimulationConfig::new().with_num_simulations(2_000).with_contest_size(100);
    let sim_result = simulate(
        &contest,
        &opt_result.lineups[..1],
        &pool,
        &sim_config,
        &CancellationHandle::new(),
        None,
    )
    .unwrap();

    let summary = &sim_result.per_lineup[0];
    println!("Status: {:?}", sim_result.status);
    println!(
        "Mean={:.2} p10={:.2} p50={:.2} p90={:.2} cash%={:.1} win%={:.2}",
        summary.mean,
        summary.p10,
        summary.p50,
        summary.p90,
        summary.cash_probability * 100.0,
        summary.win_probability * 100.0
    );
}

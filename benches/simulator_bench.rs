//! Benchmarks for the Monte Carlo contest simulator.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use dfs_core::cancel::CancellationHandle;
use dfs_core::model::{Contest, ContestType, Lineup, Platform, Player, PlayerId, PlayerPool, SlotAssignment, Sport, TeamId};
use dfs_core::simulator::{simulate, SimulationConfig};

fn golf_pool(n: u32) -> PlayerPool {
    let players: Vec<Player> = (0..n)
        .map(|i| Player {
            id: PlayerId(i),
            external_id: i.to_string(),
            name: format!("Golfer {i}"),
            team: TeamId(format!("T{}", i % 10)),
            opponent: TeamId("FIELD".to_string()),
            position: "G".to_string(),
            salary: 6_000 + (i % 15) * 400,
            projected_points: 60.0 + (i % 30) as f64,
            floor_points: 20.0 + (i % 15) as f64,
            ceiling_points: 100.0 + (i % 40) as f64,
            ownership: 0.02 + (i % 20) as f64 * 0.01,
            is_injured: false,
            batting_order: None,
        })
        .collect();
    PlayerPool::new(players)
}

fn golf_contest() -> Contest {
    Contest {
        sport: Sport::Golf,
        platform: Platform::DraftKings,
        salary_cap: 50_000,
        position_requirements: dfs_core::roster::requirements_for(Sport::Golf, Platform::DraftKings).unwrap(),
        contest_type: ContestType::Gpp,
        total_entries: 5_000,
        entry_fee: 5.0,
        prize_pool: 20_000.0,
    }
}

fn three_lineups(pool: &PlayerPool) -> Vec<Lineup> {
    let ids: Vec<PlayerId> = pool.iter().map(|p| p.id).collect();
    (0..3)
        .map(|offset| {
            let picks: Vec<PlayerId> = ids.iter().skip(offset * 6).take(6).copied().collect();
            Lineup {
                assignments: picks
                    .iter()
                    .map(|&player_id| SlotAssignment { slot_tag: "G".to_string(), player_id })
                    .collect(),
                total_salary: 36_000,
                total_projection: 0.0,
                objective: None,
            }
        })
        .collect()
}

fn simulate_5000_iterations_with_correlations(c: &mut Criterion) {
    let pool = golf_pool(60);
    let contest = golf_contest();
    let lineups = three_lineups(&pool);
    let config = SimulationConfig::new().with_num_simulations(5_000).with_use_correlations(true);

    c.bench_function("simulate_5000_iterations_correlated", |b| {
        b.iter(|| {
            let result = simulate(&contest, &lineups, &pool, &config, &CancellationHandle::new(), None).unwrap();
            black_box(result.stats.iterations_completed)
        })
    });
}

fn simulate_5000_iterations_independent(c: &mut Criterion) {
    let pool = golf_pool(60);
    let contest = golf_contest();
    let lineups = three_lineups(&pool);
    let config = SimulationConfig::new().with_num_simulations(5_000).with_use_correlations(false);

    c.bench_function("simulate_5000_iterations_independent", |b| {
        b.iter(|| {
            let result = simulate(&contest, &lineups, &pool, &config, &CancellationHandle::new(), None).unwrap();
            black_box(result.stats.iterations_completed)
        })
    });
}

criterion_group!(benches, simulate_5000_iterations_with_correlations, simulate_5000_iterations_independent);
criterion_main!(benches);

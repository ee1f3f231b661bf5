//! Integration tests for the Selfish-Altruist model

use rayon::prelude::*;
use selfish_altruist::checkpoint::Checkpoint;
use selfish_altruist::config::PayoffConfig;
use selfish_altruist::grid::{Grid, Torus};
use selfish_altruist::{fitness, lottery};
use selfish_altruist::{Config, StopPolicy, Strategy, World};

fn sweep_config(disease: f64) -> Config {
    let mut config = Config::default();
    config.grid.width = 24;
    config.grid.height = 24;
    config.payoff.cost_of_altruism = 0.13;
    config.payoff.benefit_of_altruism = 0.48;
    config.payoff.disease = disease;
    config.payoff.harshness = 0.97;
    config
}

fn strategies(world: &World) -> Vec<Strategy> {
    world.cells().iter().map(|c| c.strategy).collect()
}

#[test]
fn test_full_simulation_cycle() {
    let mut world = World::new_with_seed(sweep_config(0.2), 12345).unwrap();

    let taken = world.run(200);

    assert_eq!(world.time(), taken);
    assert!(world.stats().is_conserved());
    assert_eq!(world.stats_history.len() as u64, taken + 1);

    for cell in world.cells() {
        assert!(cell.x < 24 && cell.y < 24);
        assert!(cell.weights.selfish >= 0.0);
        assert!(cell.weights.altruist >= 0.0);
        assert!(cell.weights.void >= 0.0);
        if cell.strategy == Strategy::Void {
            assert_eq!(cell.fitness, 0.97);
        }
    }
}

#[test]
fn test_fitness_literal_values() {
    let payoff = PayoffConfig {
        cost_of_altruism: 0.13,
        benefit_of_altruism: 0.5,
        disease: 0.0,
        harshness: 0.0,
    };

    // Lone altruist at (1, 1); a selfish cell at (3, 3) with one altruist
    // neighbor at (3, 4); everything else void.
    let mut grid = Grid::populate(5, 5, |x, y| match (x, y) {
        (1, 1) | (3, 4) => Strategy::Altruist,
        (3, 3) => Strategy::Selfish,
        _ => Strategy::Void,
    });
    fitness::evaluate(&mut grid, &payoff);

    assert!((grid.get(1, 1).fitness - 0.97).abs() < 1e-12);
    assert!((grid.get(3, 3).fitness - 1.10).abs() < 1e-12);
    assert_eq!(grid.get(0, 0).fitness, 0.0);
    assert_eq!(grid.get(1, 2).fitness, 0.0);
}

#[test]
fn test_corner_neighbors_wrap() {
    let torus = Torus::new(7, 9);
    let hood = torus.von_neumann(0, 0);
    let coords: Vec<_> = hood.as_slice().iter().map(|&i| torus.coords(i)).collect();

    for expected in [(6, 0), (1, 0), (0, 8), (0, 1)] {
        assert!(coords.contains(&expected), "missing {:?}", expected);
    }
    assert_eq!(coords.len(), 5);
}

#[test]
fn test_lottery_passes_on_public_grid() {
    let payoff = PayoffConfig {
        disease: 0.25,
        ..PayoffConfig::default()
    };
    let mut grid = Grid::populate(8, 8, |x, y| {
        Strategy::ALL[(x * 3 + y) % 3]
    });

    fitness::evaluate(&mut grid, &payoff);
    lottery::assign_weights(&mut grid, payoff.disease);

    for cell in grid.cells() {
        assert!(cell.total_fitness > 0.0);
        assert!((cell.weights.sum() - 1.0).abs() < 1e-9);
    }
}

#[test]
fn test_checkpoint_persistence() {
    let mut world = World::new_with_seed(sweep_config(0.19), 54321).unwrap();
    world.run(25);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("checkpoint.bin");
    world.create_checkpoint().save(&path).expect("Failed to save checkpoint");

    let loaded = Checkpoint::load(&path).expect("Failed to load checkpoint");
    assert_eq!(loaded.step, world.time());
    assert_eq!(loaded.random_seed, world.seed());

    let mut restored = World::from_checkpoint(loaded).unwrap();
    assert_eq!(restored.stats(), world.stats());
    assert_eq!(restored.stats_history.len(), world.stats_history.len());

    // The restored run continues the same random stream
    world.run(25);
    restored.run(25);
    assert_eq!(strategies(&restored), strategies(&world));
    assert_eq!(restored.time(), world.time());
    assert_eq!(
        restored.stats_history.altruist_series(),
        world.stats_history.altruist_series()
    );
}

#[test]
fn test_reproducibility() {
    let config = sweep_config(0.2);

    let mut world1 = World::new_with_seed(config.clone(), 99999).unwrap();
    let mut world2 = World::new_with_seed(config, 99999).unwrap();

    world1.run(100);
    world2.run(100);

    assert_eq!(world1.time(), world2.time());
    assert_eq!(strategies(&world1), strategies(&world2));
    assert_eq!(
        world1.stats_history.altruist_series(),
        world2.stats_history.altruist_series()
    );
}

#[test]
fn test_parallel_runs_match_sequential() {
    let diseases = [0.18, 0.19, 0.20, 0.21];

    let run = |disease: f64| {
        let mut world = World::new_with_seed(sweep_config(disease), 7).unwrap();
        world.run(60);
        world.stats().clone()
    };

    let sequential: Vec<_> = diseases.iter().map(|&d| run(d)).collect();
    let parallel: Vec<_> = diseases.par_iter().map(|&d| run(d)).collect();

    assert_eq!(sequential, parallel);
}

#[test]
fn test_extinction_policy() {
    let mut config = sweep_config(0.0);
    config.run.stop_policy = StopPolicy::Extinction;
    // Harsh environment with heavy disease drives the population out
    config.payoff.harshness = 1.0;
    config.payoff.disease = 1.0;

    let mut world = World::new_with_seed(config, 2024).unwrap();
    let taken = world.run(2000);

    assert!(!world.is_running());
    assert!(taken < 2000);
    assert_eq!(world.time(), taken);
    let stats = world.stats();
    assert!(stats.n_selfish == 0 || stats.n_altruist == 0);

    // Only the final snapshot is stopped
    let (last, earlier) = world.stats_history.snapshots.split_last().unwrap();
    assert!(!last.running);
    assert_eq!(last.step, taken);
    assert!(earlier.iter().all(|s| s.running));

    let stopped_at = world.time();
    assert!(!world.step());
    assert_eq!(world.run(10), 0);
    assert_eq!(world.time(), stopped_at);
}

#[test]
fn test_altruist_share_policy_first_crossing() {
    let mut config = sweep_config(0.0);
    config.population.altruistic_probability = 0.3;
    config.population.selfish_probability = 0.1;
    config.payoff.cost_of_altruism = 0.0;
    config.payoff.benefit_of_altruism = 0.9;
    config.payoff.harshness = 0.0;
    config.run.stop_policy = StopPolicy::AltruistShare;

    let mut world = World::new_with_seed(config, 31).unwrap();
    let taken = world.run(500);

    assert_eq!(taken, 2);
    assert!(!world.is_running());

    let snapshots = &world.stats_history.snapshots;
    assert_eq!(snapshots.len(), 3);
    let (last, earlier) = snapshots.split_last().unwrap();
    for s in earlier {
        assert!(s.running);
        assert!(s.percentage_of_altruist <= 0.7);
    }
    assert_eq!(last.step, 2);
    assert!(!last.running);
    assert!(last.percentage_of_altruist > 0.7);

    assert!(!world.step());
    assert_eq!(world.run(100), 0);
    assert_eq!(world.time(), 2);
    assert_eq!(world.stats_history.len(), 3);
}

#[test]
fn test_stats_tracking() {
    let mut config = sweep_config(0.2);
    config.logging.stats_interval = 10;

    let mut world = World::new_with_seed(config, 33333).unwrap();
    let taken = world.run(100);

    let series = world.stats_history.population_series();
    assert!(!series.is_empty());
    assert_eq!(series[0].0, 0);
    for (step, _) in &series {
        assert!(step % 10 == 0 || *step == taken);
    }
}

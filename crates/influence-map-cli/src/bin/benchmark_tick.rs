use influence_map_core::{CellKey, Decay, InfluenceConfig, InfluenceGrid, Kernel, Propagation};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use std::time::{Duration, Instant};

const SIDE: u32 = 256;
const TICKS: u32 = 50;

fn create_sources(count: usize, seed: u64) -> Vec<(CellKey, f64)> {
    let mut rng = ChaCha12Rng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let cell = CellKey::from_xy(rng.random_range(0..SIDE), rng.random_range(0..SIDE));
            (cell, rng.random::<f64>() * 2.0 - 1.0)
        })
        .collect()
}

fn time_ticks(propagation: Propagation, sources: &[(CellKey, f64)]) -> Duration {
    let config = InfluenceConfig {
        momentum: 0.8,
        propagation,
        ..InfluenceConfig::default()
    };
    let source = |cell: CellKey, sources: &[(CellKey, f64)]| {
        sources
            .iter()
            .find(|(k, _)| *k == cell)
            .map(|(_, v)| *v)
            .unwrap_or(0.0)
    };
    let mut grid = InfluenceGrid::new(config, source);
    let cells = (0..SIDE).flat_map(|y| (0..SIDE).map(move |x| CellKey::from_xy(x, y)));
    grid.init(cells, SIDE, SIDE).expect("benchmark grid is valid");

    let start = Instant::now();
    for _ in 0..TICKS {
        grid.update(sources).expect("grid is initialized");
    }
    start.elapsed()
}

fn main() {
    let sources = create_sources(16, 42);
    println!(
        "Benchmarking {} ticks on a {}x{} grid ({} cells, {} sources)",
        TICKS,
        SIDE,
        SIDE,
        SIDE * SIDE,
        sources.len()
    );

    let kernel = time_ticks(
        Propagation::Kernel {
            kernel: Kernel::default(),
            decay: Decay::None,
        },
        &sources,
    );
    println!("Kernel convolution: {:?} total, {:?} per tick", kernel, kernel / TICKS);

    let dominance = time_ticks(
        Propagation::DecayedDominance {
            decay: Decay::Exponential { strength: 0.1 },
        },
        &sources,
    );
    println!("Decayed dominance:  {:?} total, {:?} per tick", dominance, dominance / TICKS);

    let diff = kernel.saturating_sub(dominance);
    println!("Kernel overhead per tick: {:?}", diff / TICKS);
}

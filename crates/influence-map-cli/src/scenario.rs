use crate::spatial;
use anyhow::{ensure, Result};
use influence_map_core::{CellKey, FieldSnapshot, FieldStats, InfluenceConfig, InfluenceGrid};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha12Rng;
use rstar::RTree;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Team {
    Ally,
    Enemy,
}

impl Team {
    pub fn sign(self) -> f64 {
        match self {
            Team::Ally => 1.0,
            Team::Enemy => -1.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Unit {
    pub id: u32,
    pub team: Team,
    pub position: [f64; 2],
}

impl Unit {
    pub fn new(id: u32, team: Team, position: [f64; 2]) -> Self {
        Self { id, team, position }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub width: u32,
    pub height: u32,
    pub units_per_team: usize,
    /// Radius, in cells, over which a unit projects influence.
    pub sensing_radius: f64,
    pub unit_strength: f64,
    /// Chance per turn that a unit steps to an orthogonal neighbor cell.
    pub wander_probability: f64,
    pub turns: usize,
    pub sample_every: usize,
    pub seed: u64,
    pub influence: InfluenceConfig,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            width: 32,
            height: 32,
            units_per_team: 6,
            sensing_radius: 3.0,
            unit_strength: 0.8,
            wander_probability: 0.5,
            turns: 200,
            sample_every: 10,
            seed: 42,
            influence: InfluenceConfig {
                momentum: 0.8,
                update_cooldown: 2,
                ..InfluenceConfig::default()
            },
        }
    }
}

impl ScenarioConfig {
    pub fn validate(&self) -> Result<()> {
        ensure!(self.width > 0 && self.height > 0, "grid must be non-empty");
        ensure!(
            self.sensing_radius.is_finite() && self.sensing_radius > 0.0,
            "sensing_radius must be positive"
        );
        ensure!(self.unit_strength.is_finite(), "unit_strength must be finite");
        ensure!(
            (0.0..=1.0).contains(&self.wander_probability),
            "wander_probability must be in [0, 1]"
        );
        ensure!(self.sample_every > 0, "sample_every must be positive");
        self.influence.validate()?;
        Ok(())
    }
}

/// One turn of the synthetic match, handed to the grid as its snapshot.
pub struct WorldSnapshot {
    pub turn: usize,
    index: RTree<Unit>,
    sensing_radius: f64,
    unit_strength: f64,
}

impl WorldSnapshot {
    pub fn new(turn: usize, units: &[Unit], sensing_radius: f64, unit_strength: f64) -> Self {
        Self {
            turn,
            index: spatial::build_index(units),
            sensing_radius,
            unit_strength,
        }
    }
}

/// Signed sum of nearby unit influence at the cell center, falling off
/// linearly to zero at the sensing radius.
pub fn unit_influence(cell: CellKey, snapshot: &WorldSnapshot) -> f64 {
    let center = [cell.x() as f64 + 0.5, cell.y() as f64 + 0.5];
    let radius = snapshot.sensing_radius;
    spatial::query_neighbors(&snapshot.index, center, radius)
        .into_iter()
        .map(|(unit, d)| unit.team.sign() * snapshot.unit_strength * (1.0 - d / radius))
        .sum()
}

/// Allies spawn in the left third, enemies in the right third.
pub fn spawn_units(config: &ScenarioConfig, rng: &mut ChaCha12Rng) -> Vec<Unit> {
    let third = (config.width as f64 / 3.0).max(1.0);
    let mut units = Vec::with_capacity(config.units_per_team * 2);
    for (team, x_offset) in [(Team::Ally, 0.0), (Team::Enemy, config.width as f64 - third)] {
        for _ in 0..config.units_per_team {
            let x = (x_offset + rng.random::<f64>() * third).floor() + 0.5;
            let y = rng.random_range(0..config.height) as f64 + 0.5;
            units.push(Unit::new(units.len() as u32, team, [x, y]));
        }
    }
    units
}

pub fn wander(units: &mut [Unit], config: &ScenarioConfig, rng: &mut ChaCha12Rng) {
    const STEPS: [[f64; 2]; 4] = [[0.0, -1.0], [0.0, 1.0], [1.0, 0.0], [-1.0, 0.0]];
    let max_x = config.width as f64 - 0.5;
    let max_y = config.height as f64 - 0.5;
    for unit in units.iter_mut() {
        if rng.random::<f64>() >= config.wander_probability {
            continue;
        }
        let step = STEPS[rng.random_range(0..STEPS.len())];
        unit.position[0] = (unit.position[0] + step[0]).clamp(0.5, max_x);
        unit.position[1] = (unit.position[1] + step[1]).clamp(0.5, max_y);
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunSummary {
    pub schema_version: u32,
    pub seed: u64,
    pub turns: usize,
    pub ticks: u64,
    pub samples: Vec<FieldStats>,
    pub final_stats: FieldStats,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_field: Option<FieldSnapshot>,
}

/// Run one seeded session: wander units, feed each turn to the grid, sample
/// field statistics.
pub fn run_session(config: &ScenarioConfig, keep_field: bool) -> Result<RunSummary> {
    config.validate()?;
    let mut rng = ChaCha12Rng::seed_from_u64(config.seed);
    let mut units = spawn_units(config, &mut rng);

    let mut grid = InfluenceGrid::try_new(config.influence.clone(), unit_influence)?;
    let cells = (0..config.height).flat_map(|y| (0..config.width).map(move |x| CellKey::from_xy(x, y)));
    grid.init(cells, config.width, config.height)?;

    let mut samples = Vec::with_capacity(config.turns / config.sample_every + 1);
    for turn in 1..=config.turns {
        wander(&mut units, config, &mut rng);
        let snapshot =
            WorldSnapshot::new(turn, &units, config.sensing_radius, config.unit_strength);
        grid.update(&snapshot)?;
        if turn % config.sample_every == 0 || turn == config.turns {
            let stats = grid.stats()?;
            log::debug!(
                "seed {} turn {}: total {:.4}, abs max {:.4}",
                config.seed,
                snapshot.turn,
                stats.total,
                stats.abs_max
            );
            samples.push(stats);
        }
    }

    Ok(RunSummary {
        schema_version: 1,
        seed: config.seed,
        turns: config.turns,
        ticks: grid.ticks(),
        samples,
        final_stats: grid.stats()?,
        final_field: if keep_field {
            Some(grid.snapshot()?)
        } else {
            None
        },
    })
}

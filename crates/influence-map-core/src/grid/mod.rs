mod propagation;
pub mod stats;

pub use stats::*;

use crate::cell::{CellKey, MAX_GRID_SIDE};
use crate::config::{ConfigError, InfluenceConfig};
use crate::source::BaseInfluence;
use crate::topology::Layout;
use std::{error::Error, fmt};

#[derive(Debug, Clone, PartialEq)]
pub enum GridError {
    UninitializedGrid,
    AlreadyInitialized,
    UnknownCell(CellKey),
    InvalidParameters(ConfigError),
    InvalidDimensions { width: u32, height: u32 },
    CellOutOfBounds { cell: CellKey, width: u32, height: u32 },
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridError::UninitializedGrid => write!(f, "influence grid used before init"),
            GridError::AlreadyInitialized => write!(f, "influence grid is already initialized"),
            GridError::UnknownCell(cell) => {
                write!(f, "cell {cell} was not registered at init")
            }
            GridError::InvalidParameters(e) => write!(f, "{}", e),
            GridError::InvalidDimensions { width, height } => write!(
                f,
                "grid dimensions {width}x{height} must be non-zero and at most {MAX_GRID_SIDE} per side"
            ),
            GridError::CellOutOfBounds {
                cell,
                width,
                height,
            } => write!(f, "cell {cell} lies outside the {width}x{height} grid"),
        }
    }
}

impl From<ConfigError> for GridError {
    fn from(err: ConfigError) -> Self {
        GridError::InvalidParameters(err)
    }
}

impl Error for GridError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            GridError::InvalidParameters(e) => Some(e),
            _ => None,
        }
    }
}

/// Per-cell buffers, indexed by layout slot.
#[derive(Clone, Debug)]
pub(crate) struct FieldState {
    pub(crate) layout: Layout,
    pub(crate) values: Vec<f64>,
    pub(crate) pending: Vec<f64>,
    pub(crate) provisional: Vec<f64>,
}

/// Spatial diffusion of scalar influence over a rectangular tile grid.
///
/// Each executed tick injects base influence from `source`, propagates the
/// pending buffer through the configured [`Propagation`](crate::config::Propagation)
/// strategy and blends the result with the previous value using `momentum`.
pub struct InfluenceGrid<F> {
    config: InfluenceConfig,
    source: F,
    state: Option<FieldState>,
    cooldown_remaining: u32,
    ticks: u64,
}

impl<F> InfluenceGrid<F> {
    pub fn new(config: InfluenceConfig, source: F) -> Self {
        Self::try_new(config, source).unwrap_or_else(|e| panic!("{e}"))
    }

    pub fn try_new(config: InfluenceConfig, source: F) -> Result<Self, GridError> {
        config.validate()?;
        let cooldown_remaining = config.update_cooldown;
        Ok(Self {
            config,
            source,
            state: None,
            cooldown_remaining,
            ticks: 0,
        })
    }

    /// Register the valid cells and the grid extents. Every cell starts at 0.
    ///
    /// A grid can only be initialized once; see [`InfluenceGrid::reset`] to
    /// clear values instead.
    pub fn init(
        &mut self,
        cells: impl IntoIterator<Item = CellKey>,
        width: u32,
        height: u32,
    ) -> Result<(), GridError> {
        if self.state.is_some() {
            return Err(GridError::AlreadyInitialized);
        }
        if width == 0 || height == 0 || width > MAX_GRID_SIDE || height > MAX_GRID_SIDE {
            return Err(GridError::InvalidDimensions { width, height });
        }
        let keys: Vec<CellKey> = cells.into_iter().collect();
        if let Some(&cell) = keys.iter().find(|k| !k.in_bounds(width, height)) {
            return Err(GridError::CellOutOfBounds {
                cell,
                width,
                height,
            });
        }

        let layout = Layout::new(width, height, keys);
        let n = layout.len();
        self.state = Some(FieldState {
            layout,
            values: vec![0.0; n],
            pending: vec![0.0; n],
            provisional: vec![0.0; n],
        });
        self.cooldown_remaining = self.config.update_cooldown;
        self.ticks = 0;
        Ok(())
    }

    /// Zero every value and restart the cooldown and tick counter, keeping
    /// the registered cells.
    pub fn reset(&mut self) -> Result<(), GridError> {
        let state = self.state.as_mut().ok_or(GridError::UninitializedGrid)?;
        state.values.fill(0.0);
        state.pending.fill(0.0);
        state.provisional.fill(0.0);
        self.cooldown_remaining = self.config.update_cooldown;
        self.ticks = 0;
        Ok(())
    }

    /// Advance the driver loop by one call.
    ///
    /// Returns `Ok(true)` when a diffusion tick ran and `Ok(false)` when the
    /// call was absorbed by the cooldown.
    pub fn update<S: ?Sized>(&mut self, snapshot: &S) -> Result<bool, GridError>
    where
        F: BaseInfluence<S>,
    {
        let state = self.state.as_mut().ok_or(GridError::UninitializedGrid)?;

        self.cooldown_remaining = self.cooldown_remaining.saturating_sub(1);
        if self.cooldown_remaining > 0 {
            return Ok(false);
        }
        self.cooldown_remaining = self.config.update_cooldown;

        propagation::inject(state, &self.source, snapshot, self.config.clamp_limit);
        propagation::propagate(state, &self.config.propagation);
        propagation::smooth(state, self.config.momentum, self.config.clamp_limit);
        self.ticks += 1;
        Ok(true)
    }

    pub fn get_influence(&self, cell: CellKey) -> Result<f64, GridError> {
        let state = self.state()?;
        state
            .layout
            .slot(cell)
            .map(|slot| state.values[slot])
            .ok_or(GridError::UnknownCell(cell))
    }

    pub fn get_influence_at(&self, x: u32, y: u32) -> Result<f64, GridError> {
        self.get_influence(CellKey::from_xy(x, y))
    }

    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.state
            .as_ref()
            .map(|s| (s.layout.width(), s.layout.height()))
    }

    /// Registered cells in slot order. Empty before init.
    pub fn cells(&self) -> &[CellKey] {
        self.state.as_ref().map(|s| s.layout.cells()).unwrap_or(&[])
    }

    pub fn cell_count(&self) -> usize {
        self.cells().len()
    }

    /// `(cell, value)` pairs in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (CellKey, f64)> + '_ {
        self.state.iter().flat_map(|s| {
            s.layout
                .cells()
                .iter()
                .copied()
                .zip(s.values.iter().copied())
        })
    }

    /// Number of executed (not skipped) ticks since init or reset.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn cooldown_remaining(&self) -> u32 {
        self.cooldown_remaining
    }

    pub fn config(&self) -> &InfluenceConfig {
        &self.config
    }

    pub(crate) fn state(&self) -> Result<&FieldState, GridError> {
        self.state.as_ref().ok_or(GridError::UninitializedGrid)
    }
}

//! Engine-agnostic influence map: scalar influence diffused over a tile grid
//! by injection, spatial propagation and momentum smoothing.

pub mod cell;
pub mod config;
pub mod grid;
pub mod kernel;
pub mod source;
pub mod topology;

pub use cell::{CellKey, MAX_GRID_SIDE};
pub use config::{ConfigError, Decay, InfluenceConfig, Propagation};
pub use grid::{CellValue, FieldSnapshot, FieldStats, GridError, InfluenceGrid};
pub use kernel::Kernel;
pub use source::{BaseInfluence, NoInjection};

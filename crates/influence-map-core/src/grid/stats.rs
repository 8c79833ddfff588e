use super::{GridError, InfluenceGrid};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct FieldStats {
    pub tick: u64,
    pub cell_count: usize,
    pub total: f64,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub abs_max: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CellValue {
    pub x: u32,
    pub y: u32,
    pub value: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FieldSnapshot {
    pub tick: u64,
    pub width: u32,
    pub height: u32,
    pub cells: Vec<CellValue>,
}

impl<F> InfluenceGrid<F> {
    pub fn stats(&self) -> Result<FieldStats, GridError> {
        let state = self.state()?;
        let values = &state.values;
        if state.layout.is_empty() {
            return Ok(FieldStats {
                tick: self.ticks(),
                ..FieldStats::default()
            });
        }
        let total: f64 = values.iter().sum();
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Ok(FieldStats {
            tick: self.ticks(),
            cell_count: values.len(),
            total,
            mean: total / values.len() as f64,
            min,
            max,
            abs_max: min.abs().max(max.abs()),
        })
    }

    pub fn snapshot(&self) -> Result<FieldSnapshot, GridError> {
        let state = self.state()?;
        Ok(FieldSnapshot {
            tick: self.ticks(),
            width: state.layout.width(),
            height: state.layout.height(),
            cells: self
                .iter()
                .map(|(cell, value)| CellValue {
                    x: cell.x(),
                    y: cell.y(),
                    value,
                })
                .collect(),
        })
    }
}

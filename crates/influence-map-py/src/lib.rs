use influence_map_core::{
    CellKey, Decay, InfluenceConfig, InfluenceGrid, Kernel, Propagation,
};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use std::collections::HashMap;

/// Base influences supplied from Python for one tick, keyed by packed cell key.
type BaseTable = HashMap<u64, f64>;

fn lookup_base(cell: CellKey, table: &BaseTable) -> f64 {
    table.get(&cell.raw()).copied().unwrap_or(0.0)
}

fn to_py_err(err: impl std::fmt::Display) -> PyErr {
    PyValueError::new_err(err.to_string())
}

fn parse_decay(model: &str, strength: f64) -> PyResult<Decay> {
    match model {
        "none" => Ok(Decay::None),
        "exponential" => Ok(Decay::Exponential { strength }),
        "linear" => Ok(Decay::Linear { strength }),
        other => Err(PyValueError::new_err(format!(
            "unknown decay model '{other}' (expected none, exponential or linear)"
        ))),
    }
}

/// Python-facing influence grid. The snapshot passed to `update` is a dict of
/// base influences; cells missing from it inject nothing.
#[pyclass(name = "InfluenceGrid")]
pub struct PyInfluenceGrid {
    grid: InfluenceGrid<fn(CellKey, &BaseTable) -> f64>,
}

#[pymethods]
impl PyInfluenceGrid {
    #[new]
    #[pyo3(signature = (
        momentum=0.5,
        update_cooldown=1,
        clamp_limit=1.0,
        mode="kernel",
        decay="none",
        decay_strength=0.0,
        sigma=None,
    ))]
    pub fn new(
        momentum: f64,
        update_cooldown: u32,
        clamp_limit: f64,
        mode: &str,
        decay: &str,
        decay_strength: f64,
        sigma: Option<f64>,
    ) -> PyResult<Self> {
        let decay = parse_decay(decay, decay_strength)?;
        let propagation = match mode {
            "kernel" => Propagation::Kernel {
                kernel: match sigma {
                    Some(sigma) => Kernel::gaussian(sigma).map_err(to_py_err)?,
                    None => Kernel::default(),
                },
                decay,
            },
            "dominance" => Propagation::DecayedDominance { decay },
            other => {
                return Err(PyValueError::new_err(format!(
                    "unknown propagation mode '{other}' (expected kernel or dominance)"
                )))
            }
        };
        let config = InfluenceConfig {
            momentum,
            update_cooldown,
            clamp_limit,
            propagation,
        };
        let source: fn(CellKey, &BaseTable) -> f64 = lookup_base;
        let grid = InfluenceGrid::try_new(config, source).map_err(to_py_err)?;
        Ok(Self { grid })
    }

    pub fn init(&mut self, cells: Vec<u64>, width: u32, height: u32) -> PyResult<()> {
        self.grid
            .init(cells.into_iter().map(CellKey::from_raw), width, height)
            .map_err(to_py_err)
    }

    /// Returns True when a diffusion tick ran, False when absorbed by the cooldown.
    pub fn update(&mut self, base: BaseTable) -> PyResult<bool> {
        self.grid.update(&base).map_err(to_py_err)
    }

    pub fn reset(&mut self) -> PyResult<()> {
        self.grid.reset().map_err(to_py_err)
    }

    pub fn get_influence(&self, key: u64) -> PyResult<f64> {
        self.grid
            .get_influence(CellKey::from_raw(key))
            .map_err(to_py_err)
    }

    #[getter]
    pub fn ticks(&self) -> u64 {
        self.grid.ticks()
    }

    pub fn values(&self) -> HashMap<u64, f64> {
        self.grid.iter().map(|(cell, v)| (cell.raw(), v)).collect()
    }

    pub fn stats(&self) -> PyResult<HashMap<&'static str, f64>> {
        let stats = self.grid.stats().map_err(to_py_err)?;
        Ok(HashMap::from([
            ("tick", stats.tick as f64),
            ("cell_count", stats.cell_count as f64),
            ("total", stats.total),
            ("mean", stats.mean),
            ("min", stats.min),
            ("max", stats.max),
            ("abs_max", stats.abs_max),
        ]))
    }
}

#[pyfunction]
fn pack_key(x: u32, y: u32) -> u64 {
    CellKey::from_xy(x, y).raw()
}

#[pyfunction]
fn unpack_key(key: u64) -> (u32, u32) {
    CellKey::from_raw(key).xy()
}

#[pyfunction]
fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyInfluenceGrid>()?;
    m.add_function(wrap_pyfunction!(pack_key, m)?)?;
    m.add_function(wrap_pyfunction!(unpack_key, m)?)?;
    m.add_function(wrap_pyfunction!(version, m)?)?;
    Ok(())
}

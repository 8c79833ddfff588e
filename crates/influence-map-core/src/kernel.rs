use crate::config::ConfigError;
use serde::{Deserialize, Serialize};

/// Relative `(dx, dy)` offsets in kernel index order. `dy = -1` is north.
///
/// Row-major: NW, N, NE, W, C, E, SW, S, SE.
pub const KERNEL_OFFSETS: [(i64, i64); 9] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (0, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Index of the center weight in [`KERNEL_OFFSETS`].
pub const CENTER: usize = 4;

/// 3×3 propagation kernel, normalized so the weights sum to 1.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 9]", into = "[f64; 9]")]
pub struct Kernel {
    weights: [f64; 9],
}

impl Kernel {
    /// Build a kernel from raw weights and normalize it.
    ///
    /// Rejects non-finite or negative weights and a non-positive sum.
    pub fn new(weights: [f64; 9]) -> Result<Self, ConfigError> {
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(ConfigError::InvalidKernel);
        }
        let sum: f64 = weights.iter().sum();
        if !(sum.is_finite() && sum > 0.0) {
            return Err(ConfigError::InvalidKernel);
        }
        let mut normalized = weights;
        for w in &mut normalized {
            *w /= sum;
        }
        Ok(Self {
            weights: normalized,
        })
    }

    /// Sampled isotropic Gaussian with standard deviation `sigma` (in cells).
    pub fn gaussian(sigma: f64) -> Result<Self, ConfigError> {
        if !(sigma.is_finite() && sigma > 0.0) {
            return Err(ConfigError::InvalidSigma);
        }
        let two_sigma_sq = 2.0 * sigma * sigma;
        let mut weights = [0.0f64; 9];
        for (w, &(dx, dy)) in weights.iter_mut().zip(KERNEL_OFFSETS.iter()) {
            let d_sq = (dx * dx + dy * dy) as f64;
            *w = (-d_sq / two_sigma_sq).exp();
        }
        Self::new(weights)
    }

    pub fn weights(&self) -> &[f64; 9] {
        &self.weights
    }

    pub(crate) fn weight(&self, index: usize) -> f64 {
        self.weights[index]
    }
}

impl Default for Kernel {
    /// Binomial approximation of a Gaussian: `[1 2 1; 2 4 2; 1 2 1] / 16`.
    fn default() -> Self {
        Self {
            weights: [
                1.0 / 16.0,
                2.0 / 16.0,
                1.0 / 16.0,
                2.0 / 16.0,
                4.0 / 16.0,
                2.0 / 16.0,
                1.0 / 16.0,
                2.0 / 16.0,
                1.0 / 16.0,
            ],
        }
    }
}

impl TryFrom<[f64; 9]> for Kernel {
    type Error = ConfigError;

    fn try_from(weights: [f64; 9]) -> Result<Self, Self::Error> {
        Self::new(weights)
    }
}

impl From<Kernel> for [f64; 9] {
    fn from(kernel: Kernel) -> Self {
        kernel.weights
    }
}

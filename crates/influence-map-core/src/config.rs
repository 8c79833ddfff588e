use crate::kernel::Kernel;
use serde::{Deserialize, Serialize};
use std::{error::Error, fmt};

/// Attenuation applied to a neighbor's value as it propagates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum Decay {
    #[default]
    None,
    /// `value * e^(-strength)`
    Exponential { strength: f64 },
    /// `value * strength`; the strength is the retained factor.
    Linear { strength: f64 },
}

impl Decay {
    pub fn apply(&self, value: f64) -> f64 {
        match *self {
            Decay::None => value,
            Decay::Exponential { strength } => value * (-strength).exp(),
            Decay::Linear { strength } => value * strength,
        }
    }

    fn strength(&self) -> Option<f64> {
        match *self {
            Decay::None => None,
            Decay::Exponential { strength } | Decay::Linear { strength } => Some(strength),
        }
    }
}

/// Spatial propagation strategy, chosen once at construction.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Propagation {
    /// 3×3 convolution over the pending buffer. Off-center contributions
    /// pass through `decay`.
    Kernel {
        #[serde(default)]
        kernel: Kernel,
        #[serde(default)]
        decay: Decay,
    },
    /// Strongest decayed value among the orthogonal neighbors wins.
    DecayedDominance {
        #[serde(default)]
        decay: Decay,
    },
}

impl Propagation {
    pub fn decay(&self) -> Decay {
        match *self {
            Propagation::Kernel { decay, .. } | Propagation::DecayedDominance { decay } => decay,
        }
    }
}

impl Default for Propagation {
    fn default() -> Self {
        Propagation::Kernel {
            kernel: Kernel::default(),
            decay: Decay::None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InfluenceConfig {
    /// Fraction of the pre-tick value kept when smoothing, in (0, 1].
    pub momentum: f64,
    /// Driver calls per executed tick. 1 runs every call.
    pub update_cooldown: u32,
    /// Stored values are clamped to `[-clamp_limit, clamp_limit]`.
    pub clamp_limit: f64,
    pub propagation: Propagation,
}

impl Default for InfluenceConfig {
    fn default() -> Self {
        Self {
            momentum: 0.5,
            update_cooldown: 1,
            clamp_limit: 1.0,
            propagation: Propagation::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    InvalidMomentum(f64),
    InvalidCooldown,
    InvalidClampLimit(f64),
    InvalidDecayStrength(f64),
    InvalidKernel,
    InvalidSigma,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidMomentum(v) => {
                write!(f, "momentum must be in (0, 1], got {v}")
            }
            ConfigError::InvalidCooldown => write!(f, "update_cooldown must be at least 1"),
            ConfigError::InvalidClampLimit(v) => {
                write!(f, "clamp_limit must be positive and finite, got {v}")
            }
            ConfigError::InvalidDecayStrength(v) => {
                write!(f, "decay strength must be in [0, 1], got {v}")
            }
            ConfigError::InvalidKernel => write!(
                f,
                "kernel weights must be finite, non-negative and sum to a positive value"
            ),
            ConfigError::InvalidSigma => write!(f, "gaussian sigma must be positive and finite"),
        }
    }
}

impl Error for ConfigError {}

impl InfluenceConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.momentum > 0.0 && self.momentum <= 1.0) {
            return Err(ConfigError::InvalidMomentum(self.momentum));
        }
        if self.update_cooldown == 0 {
            return Err(ConfigError::InvalidCooldown);
        }
        if !(self.clamp_limit.is_finite() && self.clamp_limit > 0.0) {
            return Err(ConfigError::InvalidClampLimit(self.clamp_limit));
        }
        if let Some(strength) = self.propagation.decay().strength() {
            if !(0.0..=1.0).contains(&strength) {
                return Err(ConfigError::InvalidDecayStrength(strength));
            }
        }
        Ok(())
    }
}

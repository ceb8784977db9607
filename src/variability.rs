//! Variability classification
//!
//! Population standard deviation (divide by N) bucketed by two cutpoints.
//! Mood and sleep share the classifier and differ only in their thresholds.

use crate::types::Stability;
use serde::{Deserialize, Serialize};

/// Below this, sigma is treated as zero
const ZERO_SIGMA: f64 = 1e-9;

/// Cutpoints for the three-way bucketing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StabilityThresholds {
    /// sigma below this is stable
    pub stable_below: f64,
    /// sigma below this (and not stable) is moderate, anything above is volatile
    pub moderate_below: f64,
}

impl StabilityThresholds {
    /// Thresholds for ratings on a 1-10 scale
    pub fn mood() -> Self {
        Self {
            stable_below: 1.5,
            moderate_below: 3.0,
        }
    }

    /// Thresholds for sleep duration in hours
    pub fn sleep() -> Self {
        Self {
            stable_below: 0.5,
            moderate_below: 1.5,
        }
    }

    /// A sigma of zero means a single value (or a single distinct value) was observed
    pub fn classify(&self, sigma: f64) -> Stability {
        if sigma.abs() < ZERO_SIGMA {
            Stability::NotEnoughData
        } else if sigma < self.stable_below {
            Stability::Stable
        } else if sigma < self.moderate_below {
            Stability::Moderate
        } else {
            Stability::Volatile
        }
    }
}

/// Population standard deviation, 0 for an empty slice
pub fn population_std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

//! Per-property weight vectors used by the ranking stages.

use mofgen_common::{PerProperty, Property};
use serde::{Deserialize, Serialize};

/// One non-negative weight per property. The ranking stages expect weights
/// summing to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PropertyWeights {
    pub ground_state_energy: f64,
    pub co2_uptake: f64,
    pub selectivity: f64,
    pub heat_adsorption: f64,
}

impl Default for PropertyWeights {
    /// Fallback weights over all candidates.
    fn default() -> Self {
        Self::fallback()
    }
}

impl PropertyWeights {
    pub const fn new(ground_state_energy: f64, co2_uptake: f64, selectivity: f64, heat_adsorption: f64) -> Self {
        Self {
            ground_state_energy,
            co2_uptake,
            selectivity,
            heat_adsorption,
        }
    }

    /// Tie-break among primary survivors: selectivity and heat of adsorption.
    pub const fn secondary() -> Self {
        Self::new(0.0, 0.0, 0.5, 0.5)
    }

    /// Weighted rank when too few candidates pass the primary filter.
    pub const fn fallback() -> Self {
        Self::new(0.35, 0.35, 0.15, 0.15)
    }

    /// Combined percentile score reported per candidate.
    pub const fn display() -> Self {
        Self::new(0.45, 0.45, 0.05, 0.05)
    }

    pub fn get(&self, property: Property) -> f64 {
        match property {
            Property::GroundStateEnergy => self.ground_state_energy,
            Property::Co2Uptake => self.co2_uptake,
            Property::Selectivity => self.selectivity,
            Property::HeatOfAdsorption => self.heat_adsorption,
        }
    }

    /// Validate that all weights are non-negative and sum to ~1.0
    pub fn validate(&self) -> bool {
        let arr = self.as_array();
        arr.iter().all(|w| w.is_finite() && *w >= 0.0) && (arr.iter().sum::<f64>() - 1.0).abs() < 1e-6
    }

    /// Renormalise weights so they sum to 1.0
    pub fn normalise(&mut self) {
        let sum: f64 = self.as_array().iter().sum();
        if sum > 0.0 {
            self.ground_state_energy /= sum;
            self.co2_uptake /= sum;
            self.selectivity /= sum;
            self.heat_adsorption /= sum;
        }
    }

    /// Weights in [`Property::ALL`] order.
    pub fn as_array(&self) -> [f64; 4] {
        [
            self.ground_state_energy,
            self.co2_uptake,
            self.selectivity,
            self.heat_adsorption,
        ]
    }

    /// Σ wᵢ·vᵢ over the four properties.
    pub fn combine(&self, values: &PerProperty<f64>) -> f64 {
        self.as_array()
            .iter()
            .zip(values.iter())
            .map(|(w, (_, v))| w * v)
            .sum()
    }
}

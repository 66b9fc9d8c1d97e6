//! The four performance properties and their ranking polarity.

use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

/// Direction in which a property value is considered better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    LowerIsBetter,
    HigherIsBetter,
}

impl Polarity {
    pub fn higher_is_better(self) -> bool {
        matches!(self, Polarity::HigherIsBetter)
    }
}

/// A predicted / measured MOF performance property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Property {
    /// Ground-state energy (eV). Lower is better.
    GroundStateEnergy,
    /// CO2 uptake at 0.15 bar / 298 K (mmol/g). Higher is better.
    Co2Uptake,
    /// CO2/N2 selectivity. Higher is better.
    Selectivity,
    /// Heat of adsorption of CO2 at 0.15 bar / 298 K (kcal/mol). Higher is better.
    HeatOfAdsorption,
}

impl Property {
    pub const ALL: [Property; 4] = [
        Property::GroundStateEnergy,
        Property::Co2Uptake,
        Property::Selectivity,
        Property::HeatOfAdsorption,
    ];

    pub fn polarity(self) -> Polarity {
        match self {
            Property::GroundStateEnergy => Polarity::LowerIsBetter,
            Property::Co2Uptake | Property::Selectivity | Property::HeatOfAdsorption => {
                Polarity::HigherIsBetter
            }
        }
    }

    /// Stable snake_case key used in reports and output columns.
    pub fn key(self) -> &'static str {
        match self {
            Property::GroundStateEnergy => "ground_state_energy",
            Property::Co2Uptake => "co2_uptake",
            Property::Selectivity => "selectivity",
            Property::HeatOfAdsorption => "heat_adsorption",
        }
    }

    /// Human-readable name for logs.
    pub fn label(self) -> &'static str {
        match self {
            Property::GroundStateEnergy => "Ground State Energy",
            Property::Co2Uptake => "CO2 Uptake",
            Property::Selectivity => "CO2/N2 Selectivity",
            Property::HeatOfAdsorption => "Heat Adsorption",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Property::GroundStateEnergy => "eV",
            Property::Co2Uptake => "mmol/g",
            Property::Selectivity => "",
            Property::HeatOfAdsorption => "kcal/mol",
        }
    }
}

impl std::fmt::Display for Property {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One value per [`Property`], addressable by property.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PerProperty<T> {
    pub ground_state_energy: T,
    pub co2_uptake: T,
    pub selectivity: T,
    pub heat_adsorption: T,
}

impl<T> PerProperty<T> {
    pub fn new(ground_state_energy: T, co2_uptake: T, selectivity: T, heat_adsorption: T) -> Self {
        Self {
            ground_state_energy,
            co2_uptake,
            selectivity,
            heat_adsorption,
        }
    }

    /// Build by evaluating `f` once per property, in [`Property::ALL`] order.
    pub fn from_fn(mut f: impl FnMut(Property) -> T) -> Self {
        Self {
            ground_state_energy: f(Property::GroundStateEnergy),
            co2_uptake: f(Property::Co2Uptake),
            selectivity: f(Property::Selectivity),
            heat_adsorption: f(Property::HeatOfAdsorption),
        }
    }

    /// Fallible variant of [`PerProperty::from_fn`]; stops at the first error.
    pub fn try_from_fn<E>(mut f: impl FnMut(Property) -> Result<T, E>) -> Result<Self, E> {
        Ok(Self {
            ground_state_energy: f(Property::GroundStateEnergy)?,
            co2_uptake: f(Property::Co2Uptake)?,
            selectivity: f(Property::Selectivity)?,
            heat_adsorption: f(Property::HeatOfAdsorption)?,
        })
    }

    pub fn map<U>(&self, mut f: impl FnMut(Property, &T) -> U) -> PerProperty<U> {
        PerProperty::from_fn(|p| f(p, &self[p]))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Property, &T)> {
        Property::ALL.into_iter().map(move |p| (p, &self[p]))
    }
}

impl PerProperty<f64> {
    pub fn all_finite(&self) -> bool {
        self.iter().all(|(_, v)| v.is_finite())
    }
}

impl<T> Index<Property> for PerProperty<T> {
    type Output = T;

    fn index(&self, property: Property) -> &T {
        match property {
            Property::GroundStateEnergy => &self.ground_state_energy,
            Property::Co2Uptake => &self.co2_uptake,
            Property::Selectivity => &self.selectivity,
            Property::HeatOfAdsorption => &self.heat_adsorption,
        }
    }
}

impl<T> IndexMut<Property> for PerProperty<T> {
    fn index_mut(&mut self, property: Property) -> &mut T {
        match property {
            Property::GroundStateEnergy => &mut self.ground_state_energy,
            Property::Co2Uptake => &mut self.co2_uptake,
            Property::Selectivity => &mut self.selectivity,
            Property::HeatOfAdsorption => &mut self.heat_adsorption,
        }
    }
}

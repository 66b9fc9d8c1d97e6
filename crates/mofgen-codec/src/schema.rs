//! Column names for the MOF screening dataset.

use mofgen_common::PerProperty;
use serde::{Deserialize, Serialize};

/// Descriptor columns, in the order they appear in the feature vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSchema {
    #[serde(default = "default_numeric")]
    pub numeric: Vec<String>,
    #[serde(default = "default_categorical")]
    pub categorical: Vec<String>,
}

fn default_numeric() -> Vec<String> {
    [
        "volume [A^3]",
        "surface_area [m^2/g]",
        "void_fraction",
        "void_volume [cm^3/g]",
        "largest_free_sphere_diameter [A]",
        "weight [u]",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_categorical() -> Vec<String> {
    vec!["topology".to_string(), "functional_groups".to_string()]
}

impl Default for FeatureSchema {
    fn default() -> Self {
        Self {
            numeric: default_numeric(),
            categorical: default_categorical(),
        }
    }
}

/// Full dataset layout: descriptors, target columns and an optional id column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSchema {
    #[serde(default)]
    pub features: FeatureSchema,
    #[serde(default = "default_targets")]
    pub targets: PerProperty<String>,
    #[serde(default)]
    pub id_column: Option<String>,
}

fn default_targets() -> PerProperty<String> {
    PerProperty::new(
        "Ground_State_Energy".to_string(),
        "CO2_uptake_P0.15bar_T298K [mmol/g]".to_string(),
        "CO2/N2_selectivity".to_string(),
        "heat_adsorption_CO2_P0.15bar_T298K [kcal/mol]".to_string(),
    )
}

impl Default for DatasetSchema {
    fn default() -> Self {
        Self {
            features: FeatureSchema::default(),
            targets: default_targets(),
            id_column: None,
        }
    }
}

//! MOF descriptor records as they come out of (and go back into) the data source.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::property::PerProperty;

/// Sentinel category emitted when a decoded one-hot block cannot be resolved.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// A raw MOF record: named numeric descriptors (physical units) and named
/// categorical descriptors (topology, functional groups).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MofRecord {
    /// Source identifier, when the dataset carries one.
    pub name: Option<String>,
    pub numeric: BTreeMap<String, f64>,
    pub categorical: BTreeMap<String, String>,
}

impl MofRecord {
    pub fn with_numeric(mut self, field: impl Into<String>, value: f64) -> Self {
        self.numeric.insert(field.into(), value);
        self
    }

    pub fn with_categorical(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.categorical.insert(field.into(), value.into());
        self
    }
}

/// A training record with its four measured targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledRecord {
    pub record: MofRecord,
    pub targets: PerProperty<f64>,
}

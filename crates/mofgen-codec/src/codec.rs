//! Fitted bijection between raw MOF records and normalized feature vectors.
//!
//! Layout of a feature vector: one standardized value per numeric column
//! (schema order), followed by one one-hot block per categorical column with
//! that column's categories in sorted order. The layout is frozen at fit time.

use std::collections::BTreeMap;

use mofgen_common::{MofRecord, UNKNOWN_CATEGORY};
use serde::{Deserialize, Serialize};

use crate::error::{CodecError, Result};
use crate::schema::FeatureSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct NumericColumn {
    name: String,
    median: f64,
    mean: f64,
    scale: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct CategoricalColumn {
    name: String,
    categories: Vec<String>,
    most_frequent: String,
    offset: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCodec {
    numeric: Vec<NumericColumn>,
    categorical: Vec<CategoricalColumn>,
    width: usize,
}

impl FeatureCodec {
    /// Fit imputation, standardization and one-hot vocabularies on training records.
    pub fn fit(records: &[MofRecord], schema: &FeatureSchema) -> Result<Self> {
        if records.is_empty() {
            return Err(CodecError::Fit("no training records".to_string()));
        }

        let mut numeric = Vec::with_capacity(schema.numeric.len());
        for name in &schema.numeric {
            let mut present: Vec<f64> = records
                .iter()
                .filter_map(|r| r.numeric.get(name).copied())
                .filter(|v| v.is_finite())
                .collect();
            if present.is_empty() {
                return Err(CodecError::Fit(format!("numeric column '{name}' has no values")));
            }
            present.sort_by(f64::total_cmp);
            let median = median_of_sorted(&present);

            let imputed: Vec<f64> = records
                .iter()
                .map(|r| r.numeric.get(name).copied().filter(|v| v.is_finite()).unwrap_or(median))
                .collect();
            let n = imputed.len() as f64;
            let mean = imputed.iter().sum::<f64>() / n;
            let variance = imputed.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
            let std = variance.sqrt();
            // Constant columns keep unit scale.
            let scale = if std > f64::EPSILON { std } else { 1.0 };

            numeric.push(NumericColumn {
                name: name.clone(),
                median,
                mean,
                scale,
            });
        }

        let mut categorical = Vec::with_capacity(schema.categorical.len());
        let mut offset = numeric.len();
        for name in &schema.categorical {
            let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
            for r in records {
                if let Some(v) = r.categorical.get(name).filter(|v| !v.is_empty()) {
                    *counts.entry(v.as_str()).or_default() += 1;
                }
            }
            // Ties resolve to the lexicographically smallest category.
            let most_frequent = counts
                .iter()
                .fold(None::<(&str, usize)>, |best, (&cat, &count)| match best {
                    Some((_, best_count)) if best_count >= count => best,
                    _ => Some((cat, count)),
                })
                .map(|(cat, _)| cat.to_string())
                .ok_or_else(|| CodecError::Fit(format!("categorical column '{name}' has no values")))?;
            let categories: Vec<String> = counts.keys().map(|c| c.to_string()).collect();

            let block = categories.len();
            categorical.push(CategoricalColumn {
                name: name.clone(),
                categories,
                most_frequent,
                offset,
            });
            offset += block;
        }

        Ok(Self {
            numeric,
            categorical,
            width: offset,
        })
    }

    /// Length of every feature vector produced by this codec.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn numeric_fields(&self) -> impl Iterator<Item = &str> {
        self.numeric.iter().map(|c| c.name.as_str())
    }

    pub fn categorical_fields(&self) -> impl Iterator<Item = &str> {
        self.categorical.iter().map(|c| c.name.as_str())
    }

    /// Sorted category vocabulary of a categorical field.
    pub fn categories(&self, field: &str) -> Option<&[String]> {
        self.categorical
            .iter()
            .find(|c| c.name == field)
            .map(|c| c.categories.as_slice())
    }

    /// Forward map. Missing numeric values take the fitted median, missing
    /// categories the most frequent one; categories unseen at fit time encode
    /// as an all-zero block.
    pub fn apply(&self, record: &MofRecord) -> Vec<f32> {
        let mut out = vec![0.0f32; self.width];
        for (i, col) in self.numeric.iter().enumerate() {
            let raw = record
                .numeric
                .get(&col.name)
                .copied()
                .filter(|v| v.is_finite())
                .unwrap_or(col.median);
            out[i] = ((raw - col.mean) / col.scale) as f32;
        }
        for col in &self.categorical {
            let value = record
                .categorical
                .get(&col.name)
                .filter(|v| !v.is_empty())
                .unwrap_or(&col.most_frequent);
            if let Ok(pos) = col.categories.binary_search(value) {
                out[col.offset + pos] = 1.0;
            }
        }
        out
    }

    pub fn apply_all(&self, records: &[MofRecord]) -> Vec<Vec<f32>> {
        records.iter().map(|r| self.apply(r)).collect()
    }

    /// Inverse map back to original units and category labels.
    ///
    /// Each categorical field takes the arg-max of its block. A block without
    /// any finite value, or an arg-max outside the vocabulary, decodes to
    /// [`UNKNOWN_CATEGORY`].
    pub fn inverse(&self, vector: &[f32]) -> Result<MofRecord> {
        if vector.len() != self.width {
            return Err(CodecError::DimensionMismatch {
                expected: self.width,
                actual: vector.len(),
            });
        }

        let mut record = MofRecord::default();
        for (i, col) in self.numeric.iter().enumerate() {
            let value = vector[i] as f64 * col.scale + col.mean;
            record.numeric.insert(col.name.clone(), value);
        }
        for col in &self.categorical {
            let block = &vector[col.offset..col.offset + col.categories.len()];
            let label = argmax(block)
                .and_then(|idx| col.categories.get(idx))
                .map(String::as_str)
                .unwrap_or(UNKNOWN_CATEGORY);
            record.categorical.insert(col.name.clone(), label.to_string());
        }
        Ok(record)
    }
}

fn median_of_sorted(values: &[f64]) -> f64 {
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

/// First index of the largest finite value.
fn argmax(values: &[f32]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .filter(|(_, v)| v.is_finite())
        .fold(None::<(usize, f32)>, |best, (i, &v)| match best {
            Some((_, b)) if b >= v => best,
            _ => Some((i, v)),
        })
        .map(|(i, _)| i)
}

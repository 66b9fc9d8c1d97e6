//! Loading and cleaning of the labelled MOF screening CSV.
//!
//! Every numeric descriptor and target is coerced to `f64`; anything that does
//! not parse (or parses to a non-finite value) is treated as missing, and rows
//! with a missing numeric descriptor or target are dropped.

use std::path::Path;

use mofgen_common::{LabeledRecord, MofRecord, PerProperty, Property};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{CodecError, Result};
use crate::schema::DatasetSchema;

/// Cleaned dataset plus the bookkeeping of what cleaning removed.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub records: Vec<LabeledRecord>,
    pub rows_read: usize,
    pub rows_dropped: usize,
}

impl Dataset {
    /// Observed (min, max) of every target column.
    pub fn target_ranges(&self) -> PerProperty<(f64, f64)> {
        PerProperty::from_fn(|p| {
            self.records
                .iter()
                .map(|r| r.targets[p])
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)))
        })
    }
}

/// Row-count summary used in the run report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetSummary {
    pub rows_read: usize,
    pub rows_dropped: usize,
    pub rows_kept: usize,
    pub train_rows: usize,
    pub test_rows: usize,
}

/// Load the dataset CSV from disk.
pub async fn load_dataset(path: &Path, schema: &DatasetSchema) -> Result<Dataset> {
    debug!("Loading MOF dataset from {:?}", path);
    let content = tokio::fs::read_to_string(path).await?;
    parse_dataset(&content, schema)
}

/// Parse and clean dataset CSV text.
pub fn parse_dataset(content: &str, schema: &DatasetSchema) -> Result<Dataset> {
    let mut reader = csv::Reader::from_reader(content.as_bytes());
    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.trim().to_string()).collect();

    let column = |name: &str| -> Result<usize> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| CodecError::MissingColumn(name.to_string()))
    };

    let numeric_cols = schema
        .features
        .numeric
        .iter()
        .map(|name| Ok((name.clone(), column(name)?)))
        .collect::<Result<Vec<_>>>()?;
    let categorical_cols = schema
        .features
        .categorical
        .iter()
        .map(|name| Ok((name.clone(), column(name)?)))
        .collect::<Result<Vec<_>>>()?;
    let target_cols = PerProperty::try_from_fn(|p| column(&schema.targets[p]))?;
    let id_col = schema.id_column.as_deref().map(column).transpose()?;

    let mut records = Vec::new();
    let mut rows_read = 0;

    for result in reader.records() {
        let row = result?;
        rows_read += 1;

        let targets = PerProperty::from_fn(|p| coerce_numeric(row.get(target_cols[p])));
        if Property::ALL.iter().any(|&p| targets[p].is_none()) {
            continue;
        }

        let mut record = MofRecord {
            name: id_col.and_then(|i| row.get(i)).map(|s| s.trim().to_string()),
            ..Default::default()
        };

        let mut complete = true;
        for (name, idx) in &numeric_cols {
            match coerce_numeric(row.get(*idx)) {
                Some(v) => {
                    record.numeric.insert(name.clone(), v);
                }
                None => {
                    complete = false;
                    break;
                }
            }
        }
        if !complete {
            continue;
        }

        for (name, idx) in &categorical_cols {
            // Empty categorical cells are left out and imputed by the codec.
            if let Some(value) = row.get(*idx).map(str::trim).filter(|s| !s.is_empty()) {
                record.categorical.insert(name.clone(), value.to_string());
            }
        }

        records.push(LabeledRecord {
            record,
            targets: targets.map(|_, v| v.unwrap_or_default()),
        });
    }

    let rows_dropped = rows_read - records.len();
    info!(
        "Dataset cleaned: {} rows read, {} dropped for missing values, {} kept",
        rows_read,
        rows_dropped,
        records.len()
    );

    if records.is_empty() {
        return Err(CodecError::EmptyDataset);
    }

    Ok(Dataset {
        records,
        rows_read,
        rows_dropped,
    })
}

fn coerce_numeric(raw: Option<&str>) -> Option<f64> {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Shuffle and split into (train, test). The test share is rounded up. A
/// positive fraction keeps at least one row on each side when there are two
/// or more records; a zero fraction yields no test rows.
pub fn train_test_split<R: Rng + ?Sized>(
    records: Vec<LabeledRecord>,
    test_fraction: f64,
    rng: &mut R,
) -> (Vec<LabeledRecord>, Vec<LabeledRecord>) {
    let n = records.len();
    let n_test = if n < 2 || test_fraction <= 0.0 {
        0
    } else {
        ((n as f64 * test_fraction.min(1.0)).ceil() as usize).clamp(1, n - 1)
    };

    let mut order: Vec<usize> = (0..n).collect();
    order.shuffle(rng);

    let mut slots: Vec<Option<LabeledRecord>> = records.into_iter().map(Some).collect();
    let mut test = Vec::with_capacity(n_test);
    let mut train = Vec::with_capacity(n - n_test);
    for (pos, idx) in order.into_iter().enumerate() {
        if let Some(record) = slots[idx].take() {
            if pos < n_test {
                test.push(record);
            } else {
                train.push(record);
            }
        }
    }
    (train, test)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FeatureSchema;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn small_schema() -> DatasetSchema {
        DatasetSchema {
            features: FeatureSchema {
                numeric: vec!["a".to_string(), "b".to_string()],
                categorical: vec!["topology".to_string()],
            },
            targets: PerProperty::new(
                "gs".to_string(),
                "co2".to_string(),
                "sel".to_string(),
                "heat".to_string(),
            ),
            id_column: Some("name".to_string()),
        }
    }

    const CSV: &str = "name,a,b,topology,gs,co2,sel,heat\n\
        m1,1.0,2.0,pcu,-1.0,3.0,10.0,5.0\n\
        m2,abc,2.0,pcu,-1.0,3.0,10.0,5.0\n\
        m3,1.5,2.5,,-2.0,4.0,11.0,6.0\n\
        m4,1.5,2.5,dia,,4.0,11.0,6.0\n\
        m5,1.5,inf,dia,-2.0,4.0,11.0,6.0\n";

    #[test]
    fn test_rows_with_missing_values_are_dropped() {
        let ds = parse_dataset(CSV, &small_schema()).unwrap();
        assert_eq!(ds.rows_read, 5);
        assert_eq!(ds.rows_dropped, 3);
        let names: Vec<_> = ds.records.iter().map(|r| r.record.name.clone().unwrap()).collect();
        assert_eq!(names, ["m1", "m3"]);
    }

    #[test]
    fn test_empty_categorical_is_left_for_imputation() {
        let ds = parse_dataset(CSV, &small_schema()).unwrap();
        assert!(ds.records[1].record.categorical.get("topology").is_none());
        assert_eq!(ds.records[0].record.categorical["topology"], "pcu");
    }

    #[test]
    fn test_missing_column_is_an_error() {
        let mut schema = small_schema();
        schema.features.numeric.push("missing".to_string());
        let err = parse_dataset(CSV, &schema).unwrap_err();
        assert!(matches!(err, CodecError::MissingColumn(c) if c == "missing"));
    }

    #[test]
    fn test_target_ranges() {
        let ds = parse_dataset(CSV, &small_schema()).unwrap();
        let ranges = ds.target_ranges();
        assert_eq!(ranges[Property::GroundStateEnergy], (-2.0, -1.0));
        assert_eq!(ranges[Property::Selectivity], (10.0, 11.0));
    }

    #[test]
    fn test_split_sizes_and_disjointness() {
        let records: Vec<_> = (0..10)
            .map(|i| LabeledRecord {
                record: MofRecord {
                    name: Some(format!("m{i}")),
                    ..Default::default()
                },
                targets: PerProperty::new(i as f64, 0.0, 0.0, 0.0),
            })
            .collect();
        let mut rng = StdRng::seed_from_u64(42);
        let (train, test) = train_test_split(records, 0.2, &mut rng);
        assert_eq!(train.len(), 8);
        assert_eq!(test.len(), 2);
        let mut all: Vec<_> = train.iter().chain(&test).map(|r| r.targets.ground_state_energy as i64).collect();
        all.sort();
        assert_eq!(all, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_zero_fraction_keeps_every_row_for_training() {
        let records: Vec<_> = (0..10)
            .map(|i| LabeledRecord {
                record: MofRecord::default(),
                targets: PerProperty::new(i as f64, 0.0, 0.0, 0.0),
            })
            .collect();
        let (train, test) = train_test_split(records, 0.0, &mut StdRng::seed_from_u64(1));
        assert_eq!(train.len(), 10);
        assert!(test.is_empty());
    }

    #[test]
    fn test_split_is_seed_deterministic() {
        let make = || -> Vec<LabeledRecord> {
            (0..20)
                .map(|i| LabeledRecord {
                    record: MofRecord::default(),
                    targets: PerProperty::new(i as f64, 0.0, 0.0, 0.0),
                })
                .collect()
        };
        let (a, _) = train_test_split(make(), 0.25, &mut StdRng::seed_from_u64(7));
        let (b, _) = train_test_split(make(), 0.25, &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
    }
}

//! Persisted results: the top-candidate CSV and the JSON run report.

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Utc};
use mofgen_codec::FeatureCodec;
use mofgen_common::Property;
use mofgen_ranker::SelectionStage;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::candidate::{GeneratedMof, MaterializationFailure};
use crate::generate::GenerationOutcome;
use crate::pipeline::TrainingReport;
use crate::seeds::SeedSelection;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationReport {
    pub num_samples: usize,
    pub seeds: SeedSelection,
    pub stage: SelectionStage,
    pub evaluated: usize,
    pub excluded: Vec<usize>,
    pub primary_count: usize,
    pub ground_state_threshold: Option<f64>,
    pub co2_uptake_threshold: Option<f64>,
    pub top: Vec<GeneratedMof>,
    pub failures: Vec<MaterializationFailure>,
}

impl GenerationReport {
    pub fn from_outcome(outcome: &GenerationOutcome) -> Self {
        Self {
            num_samples: outcome.candidates.len(),
            seeds: outcome.seeds.clone(),
            stage: outcome.ranking.stage,
            evaluated: outcome.ranking.evaluated,
            excluded: outcome.ranking.excluded.clone(),
            primary_count: outcome.ranking.primary_indices.len(),
            ground_state_threshold: outcome.ranking.ground_state_threshold,
            co2_uptake_threshold: outcome.ranking.co2_uptake_threshold,
            top: outcome.top.clone(),
            failures: outcome.failures.clone(),
        }
    }
}

/// Diagnostics of one train → generate run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub training: TrainingReport,
    pub generation: GenerationReport,
}

impl RunReport {
    pub fn new(training: &TrainingReport, outcome: &GenerationOutcome) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            training: training.clone(),
            generation: GenerationReport::from_outcome(outcome),
        }
    }
}

/// Column header for the candidate CSV.
pub fn csv_header(codec: &FeatureCodec) -> Vec<String> {
    let mut header = vec!["mof_id".to_string()];
    header.extend(codec.numeric_fields().map(String::from));
    header.extend(codec.categorical_fields().map(String::from));
    header.extend(Property::ALL.iter().map(|p| format!("predicted_{}", p.key())));
    header.push("performance_score".to_string());
    header
}

/// Render ranked MOFs as CSV text, one row per candidate in ranking order.
pub fn candidates_csv(mofs: &[GeneratedMof], codec: &FeatureCodec) -> anyhow::Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(csv_header(codec))?;

    for mof in mofs {
        let mut row = vec![mof.mof_id.clone()];
        for field in codec.numeric_fields() {
            row.push(mof.record.numeric.get(field).map(|v| v.to_string()).unwrap_or_default());
        }
        for field in codec.categorical_fields() {
            row.push(mof.record.categorical.get(field).cloned().unwrap_or_default());
        }
        for (_, v) in mof.predictions.iter() {
            row.push(v.to_string());
        }
        row.push(mof.performance_score.to_string());
        writer.write_record(&row)?;
    }

    Ok(String::from_utf8(writer.into_inner()?)?)
}

/// Where [`write_outputs`] put its files.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputPaths {
    /// `None` when there were no candidates to write.
    pub candidates_csv: Option<PathBuf>,
    pub report_json: PathBuf,
}

/// Write the candidate CSV and the run report into `dir`, creating it if needed.
pub async fn write_outputs(
    dir: &Path,
    csv_name: &str,
    report_name: &str,
    codec: &FeatureCodec,
    report: &RunReport,
) -> anyhow::Result<OutputPaths> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("creating output directory {:?}", dir))?;

    let top = &report.generation.top;
    let candidates_csv = if top.is_empty() {
        warn!("No valid MOFs generated, skipping CSV output");
        None
    } else {
        let path = dir.join(csv_name);
        tokio::fs::write(&path, candidates_csv(top, codec)?)
            .await
            .with_context(|| format!("writing {:?}", path))?;
        info!("Best MOFs saved to {:?}", path);
        Some(path)
    };

    let report_json = dir.join(report_name);
    tokio::fs::write(&report_json, serde_json::to_string_pretty(report)?)
        .await
        .with_context(|| format!("writing {:?}", report_json))?;
    info!(run_id = %report.run_id, "Run report saved to {:?}", report_json);

    Ok(OutputPaths {
        candidates_csv,
        report_json,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mofgen_codec::FeatureSchema;
    use mofgen_common::{MofRecord, PerProperty};

    fn codec() -> FeatureCodec {
        let schema = FeatureSchema {
            numeric: vec!["surface_area".to_string(), "void_fraction".to_string()],
            categorical: vec!["topology".to_string()],
        };
        let records = vec![
            MofRecord::default()
                .with_numeric("surface_area", 1000.0)
                .with_numeric("void_fraction", 0.4)
                .with_categorical("topology", "pcu"),
            MofRecord::default()
                .with_numeric("surface_area", 2000.0)
                .with_numeric("void_fraction", 0.6)
                .with_categorical("topology", "dia"),
        ];
        FeatureCodec::fit(&records, &schema).unwrap()
    }

    fn mof(position: usize) -> GeneratedMof {
        GeneratedMof {
            mof_id: format!("GEN-MOF-{}", position + 1),
            record: MofRecord::default()
                .with_numeric("surface_area", 1500.5)
                .with_numeric("void_fraction", 0.5)
                .with_categorical("topology", "dia"),
            predictions: PerProperty::new(-1.5, 2.25, 30.0, 7.5),
            percentiles: PerProperty::new(90.0, 90.0, 50.0, 50.0),
            performance_score: 86.0,
            selection_score: 1.0,
            stage: SelectionStage::Primary,
        }
    }

    #[test]
    fn test_csv_header_order() {
        assert_eq!(
            csv_header(&codec()),
            vec![
                "mof_id",
                "surface_area",
                "void_fraction",
                "topology",
                "predicted_ground_state_energy",
                "predicted_co2_uptake",
                "predicted_selectivity",
                "predicted_heat_adsorption",
                "performance_score",
            ]
        );
    }

    #[test]
    fn test_csv_rows_follow_ranking() {
        let csv = candidates_csv(&[mof(0), mof(1)], &codec()).unwrap();
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "GEN-MOF-1,1500.5,0.5,dia,-1.5,2.25,30,7.5,86");
        assert!(lines[2].starts_with("GEN-MOF-2,"));
    }

    #[test]
    fn test_empty_csv_has_only_header() {
        let csv = candidates_csv(&[], &codec()).unwrap();
        assert_eq!(csv.lines().count(), 1);
    }
}

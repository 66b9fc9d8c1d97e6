//! Train → generate → rank → persist on synthetic screening data.

use mofgen_codec::{parse_dataset, DatasetSchema};
use mofgen_generator::{
    select_seeds, write_outputs, PipelineSettings, RunReport, SeedPath, SeedPolicy, TrainedPipeline,
};
use mofgen_models::{AutoencoderConfig, PredictorConfig};
use mofgen_test_utils::{synthetic_records, to_csv};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

fn settings() -> PipelineSettings {
    PipelineSettings {
        autoencoder: AutoencoderConfig::default().with_epochs(5),
        predictor: PredictorConfig::default().with_epochs(10),
        ..PipelineSettings::default()
    }
}

fn train() -> TrainedPipeline {
    let csv = to_csv(&synthetic_records(250, 77)).unwrap();
    let dataset = parse_dataset(&csv, &DatasetSchema::default()).unwrap();
    TrainedPipeline::train(dataset, &settings()).unwrap()
}

#[test]
fn test_fixed_seeds_reproduce_the_whole_run() {
    let policy = SeedPolicy::default();
    let a = train().generate(&policy, 200, &mut StdRng::seed_from_u64(5)).unwrap();
    let b = train().generate(&policy, 200, &mut StdRng::seed_from_u64(5)).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.candidates.len(), 200);
    assert!(a.top.len() + a.failures.len() <= 10);
    assert!(!a.top.is_empty());
}

#[test]
fn test_trained_pipeline_is_reusable() {
    let pipeline = train();
    let policy = SeedPolicy::default();
    let a = pipeline.generate(&policy, 50, &mut StdRng::seed_from_u64(1)).unwrap();
    let b = pipeline.generate(&policy, 50, &mut StdRng::seed_from_u64(2)).unwrap();
    assert_eq!(a.seeds, b.seeds);
    assert_ne!(a.candidates, b.candidates);
}

#[test]
fn test_generated_records_use_known_vocabulary() {
    let pipeline = train();
    let outcome = pipeline
        .generate(&SeedPolicy::default(), 100, &mut StdRng::seed_from_u64(3))
        .unwrap();
    let codec = pipeline.codec();
    for mof in &outcome.top {
        assert!(mof.mof_id.starts_with("GEN-MOF-"));
        for field in codec.categorical_fields() {
            let label = &mof.record.categorical[field];
            let known = codec.categories(field).unwrap();
            assert!(label == "Unknown" || known.contains(label), "{field} = {label}");
        }
        assert_eq!(mof.record.numeric.len(), 6);
    }
}

#[tokio::test]
async fn test_outputs_written_to_disk() {
    let pipeline = train();
    let outcome = pipeline
        .generate(&SeedPolicy::default(), 100, &mut StdRng::seed_from_u64(4))
        .unwrap();
    let report = RunReport::new(pipeline.report(), &outcome);

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("results");
    let paths = write_outputs(&out, "generated_top_mofs.csv", "run_report.json", pipeline.codec(), &report)
        .await
        .unwrap();

    let csv_path = paths.candidates_csv.unwrap();
    let csv = std::fs::read_to_string(csv_path).unwrap();
    assert!(csv.starts_with("mof_id,volume [A^3]"));
    assert_eq!(csv.lines().count(), outcome.top.len() + 1);

    let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(paths.report_json).unwrap()).unwrap();
    assert_eq!(json["run_id"].as_str().unwrap(), report.run_id.to_string());
    assert_eq!(json["training"]["predictors"].as_array().unwrap().len(), 4);
    assert_eq!(json["generation"]["num_samples"], 100);
}

#[test]
fn test_thousand_rows_with_150_joint_top_performers() {
    let mut rng = StdRng::seed_from_u64(1000);
    let mut rows: Vec<usize> = (0..1000).collect();
    rows.shuffle(&mut rng);

    // 150 rows in both top-20% sets, 50 only low-energy, 50 only high-uptake.
    let mut gs = vec![0.0; 1000];
    let mut co2 = vec![0.0; 1000];
    for (slot, &row) in rows.iter().enumerate() {
        let good_gs = slot < 200;
        let good_co2 = slot < 150 || (200..250).contains(&slot);
        gs[row] = if good_gs { rng.gen_range(-10.0..-5.0) } else { rng.gen_range(0.0..5.0) };
        co2[row] = if good_co2 { rng.gen_range(10.0..20.0) } else { rng.gen_range(0.0..5.0) };
    }

    let seeds = select_seeds(&gs, &co2, &SeedPolicy::default()).unwrap();
    let mut expected: Vec<usize> = rows[..150].to_vec();
    expected.sort_unstable();
    assert_eq!(seeds.path, SeedPath::Intersection);
    assert_eq!(seeds.top_k, 200);
    assert_eq!(seeds.indices, expected);
}

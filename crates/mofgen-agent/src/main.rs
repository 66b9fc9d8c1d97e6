//! mofgen — generative discovery of metal-organic frameworks.
//! Entry point for the command-line binary.

use anyhow::Context;
use mofgen_codec::{load_dataset, FeatureCodec};
use mofgen_config::Config;
use mofgen_generator::{write_outputs, GeneratedMof, RunReport, TrainedPipeline};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialise structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mofgen=debug,info")),
        )
        .init();

    info!("mofgen starting up...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = Config::load()?;
    config.validate()?;

    let dataset = load_dataset(&config.data.csv_path, &config.data.columns)
        .await
        .with_context(|| format!("loading dataset {:?}", config.data.csv_path))?;
    info!("Loaded {} MOFs from {:?}", dataset.records.len(), config.data.csv_path);

    let settings = config.pipeline_settings();
    let pipeline = tokio::task::spawn_blocking(move || TrainedPipeline::train(dataset, &settings))
        .await
        .context("training task panicked")??;

    let policy = config.generation.seed_policy.clone();
    let num_samples = config.generation.num_samples;
    let mut rng = config.seeds.sampling_rng();
    let (pipeline, outcome) = tokio::task::spawn_blocking(move || {
        let outcome = pipeline.generate(&policy, num_samples, &mut rng);
        (pipeline, outcome)
    })
    .await
    .context("generation task panicked")?;
    let outcome = outcome?;

    info!("Top generated MOFs:");
    for mof in &outcome.top {
        log_candidate(mof, pipeline.codec());
    }

    let report = RunReport::new(pipeline.report(), &outcome);
    let paths = write_outputs(
        &config.output.dir,
        &config.output.candidates_file,
        &config.output.report_file,
        pipeline.codec(),
        &report,
    )
    .await?;
    info!(
        "Run {} finished: {} candidates written, report at {:?}",
        report.run_id,
        outcome.top.len(),
        paths.report_json
    );
    Ok(())
}

fn log_candidate(mof: &GeneratedMof, codec: &FeatureCodec) {
    info!("{} (score {:.1}, {:?})", mof.mof_id, mof.performance_score, mof.stage);
    for (p, value) in mof.predictions.iter() {
        info!("  Predicted {}: {:.4} {}", p, value, p.unit());
    }
    for field in codec.numeric_fields() {
        if let Some(v) = mof.record.numeric.get(field) {
            info!("  {}: {:.4}", field, v);
        }
    }
    for field in codec.categorical_fields() {
        if let Some(v) = mof.record.categorical.get(field) {
            info!("  {}: {}", field, v);
        }
    }
}

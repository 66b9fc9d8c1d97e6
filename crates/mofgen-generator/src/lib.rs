//! mofgen-generator — Generative core of the MOF discovery pipeline.
//!
//! Training (`pipeline`) fits the codec, the autoencoder and the four
//! property predictors. Generation (`generate`) picks jointly high-performing
//! training rows as seeds (`seeds`), fits a diagonal Gaussian to their
//! encodings (`sampler`), decodes samples into candidates, scores and ranks
//! them, and maps the ranked ones back to records (`candidate`). Results are
//! persisted by `output`.

pub mod candidate;
pub mod generate;
pub mod output;
pub mod pipeline;
pub mod sampler;
pub mod seeds;

pub use candidate::{Candidate, GeneratedMof, MaterializationFailure};
pub use generate::{GenerationOutcome, Generator};
pub use output::{candidates_csv, write_outputs, GenerationReport, OutputPaths, RunReport};
pub use pipeline::{PipelineSettings, PredictorReport, RngSeeds, TrainedPipeline, TrainingReport};
pub use sampler::LatentSampler;
pub use seeds::{select_seeds, SeedPath, SeedPolicy, SeedSelection};

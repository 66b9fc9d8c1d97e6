//! mofgen-codec — Data source and feature codec for the MOF generator.
//!
//! 1. Loading and cleaning the labelled MOF CSV (`dataset`)
//! 2. Column naming for descriptors and targets (`schema`)
//! 3. The fitted bijection between raw records and normalized feature
//!    vectors: standardized numeric columns followed by one-hot categorical
//!    blocks (`codec`)

pub mod codec;
pub mod dataset;
pub mod error;
pub mod schema;

pub use codec::FeatureCodec;
pub use dataset::{load_dataset, parse_dataset, train_test_split, Dataset, DatasetSummary};
pub use error::{CodecError, Result};
pub use schema::{DatasetSchema, FeatureSchema};

//! mofgen-common — Shared types and errors used across all mofgen crates.

pub mod error;
pub mod property;
pub mod record;

// Re-export commonly used types
pub use error::{MofgenError, Result};
pub use property::{PerProperty, Polarity, Property};
pub use record::{LabeledRecord, MofRecord, UNKNOWN_CATEGORY};

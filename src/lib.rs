#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Popularity baseline predictors and timing diagnostics.
pub mod baseline;
/// Batch entry points for split and prediction jobs.
pub mod batch;
/// Batch configuration types.
pub mod config;
/// Centralized constants used across splitting, baselines, and output.
pub mod constants;
/// Interaction records and the interaction store.
pub mod data;
/// Core filtering driven to a fixed point.
pub mod corefilter;
/// Delimited sample and prediction file writing.
pub mod output;
/// Popularity ranking and tie-break helpers.
pub mod rank;
/// Sample file parsing and label interning.
pub mod reader;
/// Partitioning strategies.
pub mod splits;
/// Shared type aliases.
pub mod types;

mod errors;

pub use baseline::BaselineTimings;
pub use batch::SplitStrategy;
pub use config::SplitConfig;
pub use corefilter::{CoreFilter, CoreResult, DegreeCoreFilter};
pub use data::{Interaction, InteractionStore};
pub use errors::SplitError;
pub use output::SampleWriter;
pub use rank::{RankCriterion, RankDirection};
pub use splits::{HoldoutSelection, SplitOutcome, Splitter};
pub use types::{CategoryId, PredictedId, Rating, ResourceId, TagId, Timestamp, UserId};

use std::path::PathBuf;

use crate::constants::baseline::DEFAULT_LIST_SIZE;
use crate::constants::output::{DEFAULT_METRICS_DIR, DEFAULT_OUTPUT_DIR};
use crate::output::SampleWriter;
use crate::rank::RankDirection;

/// Top-level batch configuration.
#[derive(Clone, Debug)]
pub struct SplitConfig {
    /// RNG seed controlling every randomized strategy and baseline.
    pub seed: u64,
    /// Directory receiving sample and prediction files.
    pub output_dir: PathBuf,
    /// Directory receiving timing diagnostics.
    pub metrics_dir: PathBuf,
    /// Ranking direction used when recommending popular items.
    pub popular_direction: RankDirection,
    /// Ranking direction used when selecting ranked holdout positions.
    ///
    /// Defaults to least-frequent-first: the sparsest interactions of a user
    /// are held out so the dense ones keep training coverage.
    pub holdout_direction: RankDirection,
    /// Width of prediction rows (tags or resources per instance).
    pub list_size: usize,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            metrics_dir: PathBuf::from(DEFAULT_METRICS_DIR),
            popular_direction: RankDirection::MostFrequentFirst,
            holdout_direction: RankDirection::LeastFrequentFirst,
            list_size: DEFAULT_LIST_SIZE,
        }
    }
}

impl SplitConfig {
    /// Build the sample writer for this configuration.
    pub fn writer(&self) -> SampleWriter {
        SampleWriter::new(self.output_dir.clone()).with_metrics_dir(self.metrics_dir.clone())
    }
}

/// Constants used by interaction records and prediction rows.
pub mod record {
    use crate::types::{PredictedId, Rating};

    /// Sentinel rating meaning "no rating was recorded".
    pub const MISSING_RATING: Rating = -2.0;
    /// Sentinel used to right-pad oracle tag rows to a fixed width.
    pub const ORACLE_PAD: PredictedId = -1;
}

/// Constants used by sample and prediction file naming.
pub mod output {
    /// Suffix appended to the train partition of a split.
    pub const TRAIN_SUFFIX: &str = "_train";
    /// Suffix appended to the test partition of a split.
    pub const TEST_SUFFIX: &str = "_test";
    /// Suffix appended to most-popular prediction files.
    pub const MOST_POPULAR_SUFFIX: &str = "_mp";
    /// Suffix appended to random-baseline prediction files.
    pub const RANDOM_SUFFIX: &str = "_rand";
    /// Suffix appended to baseline timing diagnostics files.
    pub const TIMING_SUFFIX: &str = "_TIME";
    /// File extension for all sample and prediction files.
    pub const SAMPLE_EXTENSION: &str = "txt";
    /// Default directory for sample and prediction files.
    pub const DEFAULT_OUTPUT_DIR: &str = "./data/csv";
    /// Default directory for metric and timing diagnostics.
    pub const DEFAULT_METRICS_DIR: &str = "./data/metrics";
}

/// Constants used by baseline predictors.
pub mod baseline {
    /// Default width of prediction rows (tags or resources per instance).
    pub const DEFAULT_LIST_SIZE: usize = 10;
}

/// Constants used by the core-filtering loop.
pub mod corefilter {
    /// First level probed when determining the maximum core of a dataset.
    pub const PROBE_START_LEVEL: usize = 2;
}

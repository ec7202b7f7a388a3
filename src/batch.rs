//! Batch entry points wiring reader, splitter, core filtering, and writer.

use std::path::Path;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;

use crate::baseline;
use crate::config::SplitConfig;
use crate::constants::output::{MOST_POPULAR_SUFFIX, RANDOM_SUFFIX};
use crate::corefilter::{self, DegreeCoreFilter};
use crate::data::{Interaction, InteractionStore};
use crate::errors::SplitError;
use crate::reader::read_sample_file;
use crate::splits::{HoldoutSelection, Splitter};

/// Which partition strategy a split job applies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SplitStrategy {
    /// Whole-collection shuffled percentage split.
    RandomPercentage {
        /// Percentage of records assigned to test.
        test_percentage: usize,
    },
    /// Keep a random percentage of users with all their records.
    PerUserPercentage {
        /// Percentage of users to keep.
        percentage: usize,
    },
    /// Hold out the last record of each user.
    LeaveLastOut {
        /// Whether a single-record user may become test-only.
        cold_start: bool,
    },
    /// Hold out one uniformly random record of each user.
    LeaveOneRandomOut,
    /// Hold out the first `n` scan positions of each user.
    LeaveNOut {
        /// Records held out per user.
        n: usize,
    },
    /// Hold out a bounded per-user fraction, random or ranked.
    LeavePercentageOut {
        /// Requested holdout count per user (clamped to `user_size - 1`).
        percentage: usize,
        /// Random or popularity-ranked position selection.
        selection: HoldoutSelection,
    },
}

/// Read `input` and either split it `repeat` times (`core_level == 0`) or
/// run core filtering at `core_level` to its fixed point.
///
/// Returns the record count of the final dataset the job operated on.
pub fn split_sample(
    input: impl AsRef<Path>,
    output_name: &str,
    strategy: SplitStrategy,
    repeat: usize,
    core_level: usize,
    config: &SplitConfig,
) -> Result<usize, SplitError> {
    let mut store = read_sample_file(input)?;
    log_store_shape(&store);
    let writer = config.writer();

    if core_level > 0 {
        let result_name = format!(
            "{output_name}_core_u{core_level}_r{core_level}_t{core_level}"
        );
        let filter = DegreeCoreFilter::uniform(core_level);
        let mut snapshot = |filtered: &InteractionStore, iteration: usize| {
            let name = format!("{result_name}_c{iteration}");
            if let Err(err) = writer.write_sample(filtered, filtered.data(), &name) {
                tracing::warn!(file = %name, error = %err, "core snapshot write failed");
            }
        };
        let result = corefilter::run_to_fixed_point(store, &filter, Some(&mut snapshot));
        return Ok(result.store.len());
    }

    store.sort_by_user();
    let splitter = Splitter::new(&store)?;
    let mut rng = StdRng::seed_from_u64(config.seed);
    for _ in 0..repeat {
        match strategy {
            SplitStrategy::RandomPercentage { test_percentage } => {
                let outcome = splitter.random_percentage(test_percentage, &mut rng);
                splitter.write_split(&writer, output_name, &outcome);
            }
            SplitStrategy::PerUserPercentage { percentage } => {
                let kept = splitter.per_user_percentage(percentage, &mut rng);
                let name = format!("{output_name}_{percentage}_perc");
                writer.write_sample(&store, &kept, &name)?;
            }
            SplitStrategy::LeaveLastOut { cold_start } => {
                let outcome = splitter.leave_last_out(cold_start);
                splitter.write_split(&writer, output_name, &outcome);
            }
            SplitStrategy::LeaveOneRandomOut => {
                let outcome = splitter.leave_one_random_out(&mut rng);
                splitter.write_split(&writer, output_name, &outcome);
            }
            SplitStrategy::LeaveNOut { n } => {
                let outcome = splitter.leave_n_out(n);
                splitter.write_split(&writer, output_name, &outcome);
            }
            SplitStrategy::LeavePercentageOut {
                percentage,
                selection,
            } => {
                let outcome = splitter.leave_percentage_out(percentage, selection, &mut rng);
                splitter.write_split(&writer, output_name, &outcome);
            }
        }
    }
    Ok(store.len())
}

/// Probe increasing core levels of `input` until filtering empties it.
pub fn determine_max_core(input: impl AsRef<Path>) -> Result<usize, SplitError> {
    let store = read_sample_file(input)?;
    log_store_shape(&store);
    Ok(corefilter::determine_max_core(&store))
}

/// Write the most-popular tag baseline for the trailing `sample_size`
/// instances of `input`, plus its `_TIME` diagnostics.
pub fn predict_popular_tags(
    input: impl AsRef<Path>,
    output_name: &str,
    train_size: usize,
    sample_size: usize,
    config: &SplitConfig,
) -> Result<(), SplitError> {
    let mut store = read_sample_file(input)?;
    let (rows, timings) = baseline::predict_popular_tags(
        &store,
        sample_size,
        config.list_size,
        config.popular_direction,
    );
    // Narrow to the test region only after ranking, so the popularity list
    // still reflects the full collection.
    store.narrow_to_tail(train_size);
    let writer = config.writer();
    let name = format!("{output_name}{MOST_POPULAR_SUFFIX}");
    writer.write_tag_predictions(&store, store.data(), &rows, &name)?;
    writer.write_timings(&name, &timings.to_string())?;
    Ok(())
}

/// Write the most-popular unseen-resource baseline for every distinct
/// test-region user of `input`.
pub fn predict_popular_resources(
    input: impl AsRef<Path>,
    output_name: &str,
    train_size: usize,
    config: &SplitConfig,
) -> Result<(), SplitError> {
    let store = read_sample_file(input)?;
    let rows = baseline::predict_popular_resources(&store, config.list_size, train_size);
    let records = first_test_records(&store, train_size);
    let name = format!("{output_name}{MOST_POPULAR_SUFFIX}");
    config
        .writer()
        .write_resource_predictions(&store, &records, &rows, &name)
}

/// Write the random unseen-resource baseline for every distinct test-region
/// user of `input`.
pub fn predict_random_resources(
    input: impl AsRef<Path>,
    output_name: &str,
    train_size: usize,
    config: &SplitConfig,
) -> Result<(), SplitError> {
    let store = read_sample_file(input)?;
    let mut rng = StdRng::seed_from_u64(config.seed);
    let rows = baseline::predict_random_resources(&store, config.list_size, train_size, &mut rng);
    let records = first_test_records(&store, train_size);
    let name = format!("{output_name}{RANDOM_SUFFIX}");
    config
        .writer()
        .write_resource_predictions(&store, &records, &rows, &name)
}

/// One representative test-region record per distinct test user, aligned
/// with the per-user prediction rows.
fn first_test_records(store: &InteractionStore, train_size: usize) -> Vec<Interaction> {
    let tail = &store.data()[train_size.min(store.len())..];
    store
        .unique_test_users(train_size)
        .into_iter()
        .filter_map(|user| {
            tail.iter()
                .find(|interaction| interaction.user == user)
                .cloned()
        })
        .collect()
}

fn log_store_shape(store: &InteractionStore) {
    info!(
        users = store.num_users(),
        resources = store.num_resources(),
        tags = store.num_tags(),
        lines = store.len(),
        "dataset loaded"
    );
}

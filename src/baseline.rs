//! Non-personalized popularity baselines used as a comparison floor.

use std::fmt;
use std::time::{Duration, Instant};

use rand::Rng;
use rand::seq::SliceRandom;

use crate::constants::record::ORACLE_PAD;
use crate::data::InteractionStore;
use crate::rank::{RankDirection, ranked_ids};
use crate::types::{PredictedId, ResourceId, TagId};

/// Wall-clock diagnostics for a baseline run.
///
/// "Training" is computing the popularity list once; "testing" is
/// replicating it across the sample.
#[derive(Clone, Copy, Debug)]
pub struct BaselineTimings {
    /// Time spent computing the popularity ranking.
    pub training: Duration,
    /// Time spent producing all prediction rows.
    pub testing: Duration,
    /// Number of prediction rows produced.
    pub sample_size: usize,
}

impl BaselineTimings {
    /// Mean per-row test time; zero when no rows were produced.
    pub fn average_test(&self) -> Duration {
        if self.sample_size == 0 {
            Duration::ZERO
        } else {
            self.testing / self.sample_size as u32
        }
    }

    /// Training plus testing time.
    pub fn total(&self) -> Duration {
        self.training + self.testing
    }
}

impl fmt::Display for BaselineTimings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Full training time: {}", self.training.as_millis())?;
        writeln!(f, "Full test time: {}", self.testing.as_millis())?;
        writeln!(f, "Average test time: {}", self.average_test().as_millis())?;
        writeln!(f, "Total time: {}", self.total().as_millis())
    }
}

/// Rank all tag IDs by global occurrence count and return the first `size`.
///
/// Deterministic: an unchanged frequency table yields the identical list.
pub fn popular_tag_list(
    store: &InteractionStore,
    size: usize,
    direction: RankDirection,
) -> Vec<TagId> {
    let mut ranked = ranked_ids(store.tag_counts(), direction);
    ranked.truncate(size);
    ranked
}

/// Predict the same fixed popular tag list for every one of `sample_size`
/// test instances, recording training and test wall-clock time.
pub fn predict_popular_tags(
    store: &InteractionStore,
    sample_size: usize,
    limit: usize,
    direction: RankDirection,
) -> (Vec<Vec<PredictedId>>, BaselineTimings) {
    let train_start = Instant::now();
    let list: Vec<PredictedId> = popular_tag_list(store, limit, direction)
        .into_iter()
        .map(|tag| tag as PredictedId)
        .collect();
    let training = train_start.elapsed();

    let test_start = Instant::now();
    let rows = vec![list; sample_size];
    let testing = test_start.elapsed();

    (
        rows,
        BaselineTimings {
            training,
            testing,
            sample_size,
        },
    )
}

/// Oracle rows: the actual tag list of each of the trailing `sample_size`
/// interactions, right-padded with `-1` to width `limit`.
///
/// Used to sanity-check the evaluation metric itself, not a real baseline.
pub fn perfect_tags(
    store: &InteractionStore,
    sample_size: usize,
    limit: usize,
) -> Vec<Vec<PredictedId>> {
    let train_size = store.len().saturating_sub(sample_size);
    store.data()[train_size..]
        .iter()
        .map(|interaction| {
            let mut row: Vec<PredictedId> = interaction
                .tags
                .iter()
                .map(|tag| *tag as PredictedId)
                .collect();
            while row.len() < limit {
                row.push(ORACLE_PAD);
            }
            row
        })
        .collect()
}

/// For each distinct test-region user, the `count` globally-most-frequent
/// resources that user has not consumed in the train region, in popularity
/// order.
pub fn predict_popular_resources(
    store: &InteractionStore,
    count: usize,
    train_size: usize,
) -> Vec<Vec<PredictedId>> {
    let ranking = ranked_ids(store.resource_counts(), RankDirection::MostFrequentFirst);
    predict_from_candidates(store, count, train_size, &ranking)
}

/// Same exclusion semantics as [`predict_popular_resources`], drawing
/// candidates from a uniformly shuffled resource permutation instead.
pub fn predict_random_resources<R: Rng>(
    store: &InteractionStore,
    count: usize,
    train_size: usize,
    rng: &mut R,
) -> Vec<Vec<PredictedId>> {
    let mut permutation: Vec<ResourceId> = (0..store.num_resources()).collect();
    permutation.shuffle(rng);
    predict_from_candidates(store, count, train_size, &permutation)
}

fn predict_from_candidates(
    store: &InteractionStore,
    count: usize,
    train_size: usize,
    candidates: &[ResourceId],
) -> Vec<Vec<PredictedId>> {
    store
        .unique_test_users(train_size)
        .into_iter()
        .map(|user| {
            let seen = store.user_resources_in_train(train_size, user);
            candidates
                .iter()
                .filter(|resource| !seen.contains(resource))
                .take(count)
                .map(|resource| *resource as PredictedId)
                .collect()
        })
        .collect()
}

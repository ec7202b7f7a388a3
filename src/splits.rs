//! Partitioning strategies over an interaction store.
//!
//! Every strategy reads the store without mutating it: order-sensitive
//! strategies work on explicit copies, per-user strategies build new
//! sequences. For each strategy `|train| + |test| == |input|` and every input
//! record lands in exactly one side.

use std::collections::HashSet;

use rand::Rng;
use rand::seq::SliceRandom;
use tracing::warn;

use crate::constants::output::{TEST_SUFFIX, TRAIN_SUFFIX};
use crate::data::{Interaction, InteractionStore};
use crate::errors::SplitError;
use crate::output::SampleWriter;
use crate::rank::{RankCriterion, RankDirection, ranked_positions};
use crate::types::UserId;

/// How `leave_percentage_out` picks the held-out positions of a user block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HoldoutSelection {
    /// Distinct positions drawn uniformly at random.
    Random,
    /// Prefix of the popularity ranking in the given direction.
    Ranked(RankDirection),
}

/// Train/test partition produced by one strategy invocation.
#[derive(Clone, Debug)]
pub struct SplitOutcome {
    /// Records assigned to training.
    pub train: Vec<Interaction>,
    /// Records assigned to testing.
    pub test: Vec<Interaction>,
}

impl SplitOutcome {
    /// Combined record count; always equals the input length.
    pub fn len(&self) -> usize {
        self.train.len() + self.test.len()
    }

    /// Whether both partitions are empty.
    pub fn is_empty(&self) -> bool {
        self.train.is_empty() && self.test.is_empty()
    }

    /// Train followed by test, the order used for the combined output file.
    pub fn combined(&self) -> Vec<Interaction> {
        let mut all = self.train.clone();
        all.extend(self.test.iter().cloned());
        all
    }
}

/// Partitioning engine over a validated interaction store.
pub struct Splitter<'a> {
    store: &'a InteractionStore,
}

impl<'a> Splitter<'a> {
    /// Wrap a store, checking the per-user count invariant up front.
    pub fn new(store: &'a InteractionStore) -> Result<Self, SplitError> {
        store.validate()?;
        Ok(Self { store })
    }

    /// Shuffle the whole collection and cut it at `total * pct / 100` from
    /// the end. Not per-user aware: a user's records may land on one side.
    pub fn random_percentage<R: Rng>(&self, test_percentage: usize, rng: &mut R) -> SplitOutcome {
        let mut sample = self.store.data().to_owned();
        sample.shuffle(rng);
        let total = sample.len();
        let test_size = total * test_percentage.min(100) / 100;
        let train_size = total - test_size;
        let test = sample.split_off(train_size);
        SplitOutcome {
            train: sample,
            test,
        }
    }

    /// Keep every record of a random `user_count * pct / 100` subset of
    /// users; the remaining users are dropped entirely.
    pub fn per_user_percentage<R: Rng>(&self, percentage: usize, rng: &mut R) -> Vec<Interaction> {
        let user_count = self.store.num_users();
        let user_limit = user_count * percentage / 100;
        let mut indices: Vec<UserId> = (0..user_count).collect();
        indices.shuffle(rng);
        let selected: HashSet<UserId> = indices.into_iter().take(user_limit).collect();
        self.store
            .data()
            .iter()
            .filter(|interaction| selected.contains(&interaction.user))
            .cloned()
            .collect()
    }

    /// Send the last record of each user's block to test. Without
    /// `cold_start`, a single-record user stays entirely in train so the
    /// user keeps a training footprint.
    pub fn leave_last_out(&self, cold_start: bool) -> SplitOutcome {
        let mut train = Vec::new();
        let mut test = Vec::new();
        for (_, block) in self.store.user_blocks() {
            if block.len() == 1 && !cold_start {
                train.extend(block.iter().cloned());
                continue;
            }
            let (head, last) = block.split_at(block.len() - 1);
            train.extend(head.iter().cloned());
            test.extend(last.iter().cloned());
        }
        SplitOutcome { train, test }
    }

    /// Send one uniformly random record of each user's block to test.
    pub fn leave_one_random_out<R: Rng>(&self, rng: &mut R) -> SplitOutcome {
        let mut train = Vec::new();
        let mut test = Vec::new();
        for (_, block) in self.store.user_blocks() {
            let pick = rng.random_range(0..block.len());
            for (idx, interaction) in block.iter().enumerate() {
                if idx == pick {
                    test.push(interaction.clone());
                } else {
                    train.push(interaction.clone());
                }
            }
        }
        SplitOutcome { train, test }
    }

    /// Send the first `n` scan positions of each user's block to test.
    ///
    /// Works on a user-sorted copy so repeated runs against a fixed `n`
    /// partition identically.
    pub fn leave_n_out(&self, n: usize) -> SplitOutcome {
        let sorted = self.store.sorted_copy();
        let sorted_store = self.store.rebuilt_with(sorted);
        let mut train = Vec::new();
        let mut test = Vec::new();
        for (_, block) in sorted_store.user_blocks() {
            let cut = n.min(block.len());
            test.extend(block[..cut].iter().cloned());
            train.extend(block[cut..].iter().cloned());
        }
        SplitOutcome { train, test }
    }

    /// Hold out `min(user_size - 1, percentage)` records per user, never the
    /// whole block, picked at random or by popularity ranking.
    pub fn leave_percentage_out<R: Rng>(
        &self,
        percentage: usize,
        selection: HoldoutSelection,
        rng: &mut R,
    ) -> SplitOutcome {
        let mut train = Vec::new();
        let mut test = Vec::new();
        for (_, block) in self.store.user_blocks() {
            let limit = percentage.min(block.len().saturating_sub(1));
            let holdout = self.holdout_positions(block, limit, selection, rng);
            for (idx, interaction) in block.iter().enumerate() {
                if holdout.contains(&(idx + 1)) {
                    test.push(interaction.clone());
                } else {
                    train.push(interaction.clone());
                }
            }
        }
        SplitOutcome { train, test }
    }

    fn holdout_positions<R: Rng>(
        &self,
        block: &[Interaction],
        limit: usize,
        selection: HoldoutSelection,
        rng: &mut R,
    ) -> HashSet<usize> {
        match selection {
            HoldoutSelection::Random => {
                let mut positions = HashSet::new();
                while positions.len() < limit {
                    positions.insert(rng.random_range(1..=block.len()));
                }
                positions
            }
            HoldoutSelection::Ranked(direction) => ranked_positions(
                block,
                self.store.resource_counts(),
                RankCriterion::ResourceFrequency,
                direction,
            )
            .into_iter()
            .take(limit)
            .collect(),
        }
    }

    /// Write the three outputs of a split: `<name>_train`, `<name>_test`,
    /// and `<name>` (train followed by test).
    ///
    /// Each write is an independent attempt; a failure is logged and does
    /// not abort the siblings. Returns how many files were written.
    pub fn write_split(&self, writer: &SampleWriter, name: &str, outcome: &SplitOutcome) -> usize {
        let combined = outcome.combined();
        let files = [
            (format!("{name}{TRAIN_SUFFIX}"), outcome.train.as_slice()),
            (format!("{name}{TEST_SUFFIX}"), outcome.test.as_slice()),
            (name.to_string(), combined.as_slice()),
        ];
        let mut written = 0;
        for (file_name, records) in files {
            match writer.write_sample(self.store, records, &file_name) {
                Ok(()) => written += 1,
                Err(err) => warn!(file = %file_name, error = %err, "sample write failed"),
            }
        }
        written
    }
}

//! Iterative core filtering driven to a fixed point in memory.
//!
//! Earlier tooling serialized the intermediate dataset to disk between
//! iterations and re-read it; here the loop passes the filtered store along
//! directly and preserves the same convergence criterion (stop once the
//! filtered size is no smaller than before the iteration).

use tracing::info;

use crate::constants::corefilter::PROBE_START_LEVEL;
use crate::data::{Interaction, InteractionStore};

/// One filtering pass over a store.
///
/// The filtering algorithm is a collaborator behind this narrow interface;
/// the loop below only drives it to convergence.
pub trait CoreFilter {
    /// Apply one pass, returning the filtered store.
    fn filter_pass(&self, store: &InteractionStore) -> InteractionStore;
}

/// Degree-threshold filter: drops interactions of users and resources whose
/// occurrence count falls below the level, and strips tags below the tag
/// level (an interaction with no surviving tags is dropped too).
#[derive(Clone, Copy, Debug)]
pub struct DegreeCoreFilter {
    /// Minimum interactions a user must have.
    pub user_level: usize,
    /// Minimum occurrences a resource must have.
    pub resource_level: usize,
    /// Minimum occurrences a tag must have.
    pub tag_level: usize,
}

impl DegreeCoreFilter {
    /// Uniform filter using `level` for users, resources, and tags.
    pub fn uniform(level: usize) -> Self {
        Self {
            user_level: level,
            resource_level: level,
            tag_level: level,
        }
    }
}

impl CoreFilter for DegreeCoreFilter {
    fn filter_pass(&self, store: &InteractionStore) -> InteractionStore {
        let kept: Vec<Interaction> = store
            .data()
            .iter()
            .filter(|interaction| {
                store
                    .user_counts()
                    .get(interaction.user)
                    .is_some_and(|count| *count >= self.user_level)
                    && store
                        .resource_counts()
                        .get(interaction.resource)
                        .is_some_and(|count| *count >= self.resource_level)
            })
            .cloned()
            .filter_map(|mut interaction| {
                interaction.tags.retain(|tag| {
                    store
                        .tag_counts()
                        .get(*tag)
                        .is_some_and(|count| *count >= self.tag_level)
                });
                if interaction.tags.is_empty() {
                    None
                } else {
                    Some(interaction)
                }
            })
            .collect();
        store.rebuilt_with(kept)
    }
}

/// Result of driving a filter to its fixed point.
#[derive(Debug)]
pub struct CoreResult {
    /// The converged store.
    pub store: InteractionStore,
    /// Number of filter passes applied.
    pub iterations: usize,
}

/// Apply `filter` repeatedly until the filtered size stops shrinking.
///
/// `snapshot` is invoked with each iteration's filtered store so callers can
/// materialize the persisted `_c<iter>` artifacts; a `None` skips that.
pub fn run_to_fixed_point(
    mut store: InteractionStore,
    filter: &dyn CoreFilter,
    mut snapshot: Option<&mut dyn FnMut(&InteractionStore, usize)>,
) -> CoreResult {
    let mut iterations = 0;
    loop {
        let size_before = store.len();
        info!(iteration = iterations, size = size_before, "core iteration");
        let filtered = filter.filter_pass(&store);
        iterations += 1;
        if let Some(snapshot) = snapshot.as_deref_mut() {
            snapshot(&filtered, iterations);
        }
        if filtered.len() >= size_before {
            info!(iterations, size = filtered.len(), "core filtering converged");
            return CoreResult {
                store: filtered,
                iterations,
            };
        }
        store = filtered;
    }
}

/// Probe increasing core levels starting at 2 until filtering empties the
/// dataset; returns the first such level.
pub fn determine_max_core(store: &InteractionStore) -> usize {
    let mut level = PROBE_START_LEVEL;
    loop {
        let filter = DegreeCoreFilter::uniform(level);
        let result = run_to_fixed_point(store.clone(), &filter, None);
        info!(level, size = result.store.len(), "max-core probe");
        if result.store.is_empty() {
            return level;
        }
        level += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Interaction;

    fn sparse_store() -> InteractionStore {
        // User 0 and resource 0 are dense; user 2 and resource 2 are orphans.
        let interactions = vec![
            Interaction::unrated(0, 0, vec![0], "t"),
            Interaction::unrated(0, 0, vec![0], "t"),
            Interaction::unrated(1, 0, vec![0], "t"),
            Interaction::unrated(1, 1, vec![0], "t"),
            Interaction::unrated(2, 2, vec![1], "t"),
        ];
        InteractionStore::from_interactions(interactions)
    }

    #[test]
    fn one_pass_drops_sparse_users_resources_and_tags() {
        let store = sparse_store();
        let filter = DegreeCoreFilter::uniform(2);
        let filtered = filter.filter_pass(&store);
        assert_eq!(filtered.len(), 3);
        assert!(filtered.data().iter().all(|i| i.user != 2));
        assert!(filtered.data().iter().all(|i| i.resource == 0));
        assert!(filtered.data().iter().all(|i| i.tags == vec![0]));
    }

    #[test]
    fn fixed_point_converges_and_counts_iterations() {
        let store = sparse_store();
        let filter = DegreeCoreFilter::uniform(2);
        let mut snapshot_sizes = Vec::new();
        let mut snapshot = |store: &InteractionStore, iteration: usize| {
            snapshot_sizes.push((iteration, store.len()));
        };
        let result = run_to_fixed_point(store, &filter, Some(&mut snapshot));
        // Filtering user 1's split block cascades once, then stabilizes.
        assert!(result.iterations >= 2);
        assert_eq!(snapshot_sizes.len(), result.iterations);
        let final_size = result.store.len();
        let refiltered = filter.filter_pass(&result.store);
        assert_eq!(refiltered.len(), final_size);
    }

    #[test]
    fn empty_store_converges_immediately() {
        let store = InteractionStore::from_interactions(Vec::new());
        let result = run_to_fixed_point(store, &DegreeCoreFilter::uniform(2), None);
        assert_eq!(result.iterations, 1);
        assert!(result.store.is_empty());
    }

    #[test]
    fn determine_max_core_finds_the_emptying_level() {
        let store = sparse_store();
        let level = determine_max_core(&store);
        // No user has three interactions, so level 3 empties the dataset.
        assert_eq!(level, 3);
    }
}

//! Shared popularity-ranking helper used by holdout selection and baselines.
//!
//! The reference behavior this crate replaces drove both "hold out the least
//! popular interactions" and "recommend the most popular items" through one
//! implicit comparator. Here the direction is an explicit, named policy so
//! callers state what they mean and tests can pin it down.

use std::cmp::Ordering;

use crate::data::Interaction;

/// Ordering policy for popularity rankings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RankDirection {
    /// Highest occurrence count first (recommendation order).
    MostFrequentFirst,
    /// Lowest occurrence count first (sparse-holdout order).
    LeastFrequentFirst,
}

/// Criterion used to score one interaction inside a user block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RankCriterion {
    /// Score by the record's own rating.
    Rating,
    /// Score by the global occurrence count of the record's resource.
    ResourceFrequency,
}

/// Rank the 1-based positions of a contiguous user block.
///
/// Positions are ordered by the chosen criterion in `direction`, with ties
/// broken by ascending position so the result is stable across invocations.
pub fn ranked_positions(
    block: &[Interaction],
    resource_counts: &[usize],
    criterion: RankCriterion,
    direction: RankDirection,
) -> Vec<usize> {
    let mut scored: Vec<(usize, f64)> = block
        .iter()
        .enumerate()
        .map(|(idx, interaction)| {
            let score = match criterion {
                RankCriterion::Rating => interaction.rating,
                RankCriterion::ResourceFrequency => resource_counts
                    .get(interaction.resource)
                    .copied()
                    .unwrap_or(0) as f64,
            };
            (idx + 1, score)
        })
        .collect();
    scored.sort_by(|a, b| compare(a.1, b.1, direction).then_with(|| a.0.cmp(&b.0)));
    scored.into_iter().map(|(position, _)| position).collect()
}

/// Rank dictionary IDs by their occurrence counts.
///
/// Ties are broken by ascending ID, so an unchanged frequency table always
/// yields the identical ordered list.
pub fn ranked_ids(counts: &[usize], direction: RankDirection) -> Vec<usize> {
    let mut ids: Vec<usize> = (0..counts.len()).collect();
    ids.sort_by(|a, b| compare(counts[*a] as f64, counts[*b] as f64, direction).then(a.cmp(b)));
    ids
}

fn compare(a: f64, b: f64, direction: RankDirection) -> Ordering {
    match direction {
        RankDirection::MostFrequentFirst => b.total_cmp(&a),
        RankDirection::LeastFrequentFirst => a.total_cmp(&b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Interaction;

    fn block(resources: &[usize]) -> Vec<Interaction> {
        resources
            .iter()
            .map(|resource| Interaction::unrated(0, *resource, vec![0], "t"))
            .collect()
    }

    #[test]
    fn ranked_ids_orders_by_count_then_id() {
        let counts = vec![3, 1, 3, 5];
        assert_eq!(
            ranked_ids(&counts, RankDirection::MostFrequentFirst),
            vec![3, 0, 2, 1]
        );
        assert_eq!(
            ranked_ids(&counts, RankDirection::LeastFrequentFirst),
            vec![1, 0, 2, 3]
        );
    }

    #[test]
    fn ranked_positions_are_one_based_and_stable() {
        let counts = vec![4, 4, 9];
        let block = block(&[2, 0, 1, 0]);
        let ascending = ranked_positions(
            &block,
            &counts,
            RankCriterion::ResourceFrequency,
            RankDirection::LeastFrequentFirst,
        );
        // Resources 0 and 1 tie at count 4; positions stay in scan order.
        assert_eq!(ascending, vec![2, 3, 4, 1]);
        let descending = ranked_positions(
            &block,
            &counts,
            RankCriterion::ResourceFrequency,
            RankDirection::MostFrequentFirst,
        );
        assert_eq!(descending, vec![1, 2, 3, 4]);
    }

    #[test]
    fn ranked_positions_by_rating_use_record_ratings() {
        let mut block = block(&[0, 1]);
        block[0].rating = 5.0;
        block[1].rating = 2.0;
        let ranked = ranked_positions(
            &block,
            &[],
            RankCriterion::Rating,
            RankDirection::MostFrequentFirst,
        );
        assert_eq!(ranked, vec![1, 2]);
    }
}

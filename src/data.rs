use std::collections::HashSet;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::constants::record::MISSING_RATING;
use crate::errors::SplitError;
use crate::types::{CategoryId, Rating, ResourceId, TagId, Timestamp, UserId};

/// One user tagging one resource at one time, optionally rated and
/// optionally categorized.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Interaction {
    /// User that performed the tagging.
    pub user: UserId,
    /// Resource that was tagged.
    pub resource: ResourceId,
    /// Tags in tagging order; duplicates permitted.
    pub tags: Vec<TagId>,
    /// Timestamp carried verbatim from the log.
    pub timestamp: Timestamp,
    /// Rating, `MISSING_RATING` when absent.
    pub rating: Rating,
    /// Category labels attached to the interaction.
    pub categories: Vec<CategoryId>,
}

impl Interaction {
    /// Build a fully specified interaction.
    pub fn new(
        user: UserId,
        resource: ResourceId,
        tags: Vec<TagId>,
        timestamp: impl Into<Timestamp>,
        rating: Rating,
        categories: Vec<CategoryId>,
    ) -> Self {
        Self {
            user,
            resource,
            tags,
            timestamp: timestamp.into(),
            rating,
            categories,
        }
    }

    /// Build an interaction without a rating or categories.
    pub fn unrated(
        user: UserId,
        resource: ResourceId,
        tags: Vec<TagId>,
        timestamp: impl Into<Timestamp>,
    ) -> Self {
        Self::new(user, resource, tags, timestamp, MISSING_RATING, Vec::new())
    }

    /// Whether a rating was recorded for this interaction.
    pub fn has_rating(&self) -> bool {
        self.rating != MISSING_RATING
    }
}

/// Ordered interaction collection with per-user counts, global frequency
/// tables, and the string dictionaries used at serialization time.
#[derive(Clone, Debug)]
pub struct InteractionStore {
    interactions: Vec<Interaction>,
    user_counts: Vec<usize>,
    resource_counts: Vec<usize>,
    tag_counts: Vec<usize>,
    users: Vec<String>,
    resources: Vec<String>,
    tags: Vec<String>,
    categories: Vec<String>,
}

impl InteractionStore {
    /// Build a store from interactions and their label dictionaries.
    ///
    /// Per-user counts and frequency tables are computed once here and stay
    /// read-only during splitting.
    pub fn with_dictionaries(
        interactions: Vec<Interaction>,
        users: Vec<String>,
        resources: Vec<String>,
        tags: Vec<String>,
        categories: Vec<String>,
    ) -> Self {
        let (user_counts, resource_counts, tag_counts) =
            count_tables(&interactions, users.len(), resources.len(), tags.len());
        Self {
            interactions,
            user_counts,
            resource_counts,
            tag_counts,
            users,
            resources,
            tags,
            categories,
        }
    }

    /// Build a store with synthesized labels, sized to the IDs present.
    ///
    /// Convenient for in-memory datasets where only the split logic matters.
    pub fn from_interactions(interactions: Vec<Interaction>) -> Self {
        let users = synthesized_labels("user", max_id(interactions.iter().map(|i| i.user)));
        let resources =
            synthesized_labels("resource", max_id(interactions.iter().map(|i| i.resource)));
        let tags = synthesized_labels(
            "tag",
            max_id(interactions.iter().flat_map(|i| i.tags.iter().copied())),
        );
        let categories = synthesized_labels(
            "category",
            max_id(interactions.iter().flat_map(|i| i.categories.iter().copied())),
        );
        Self::with_dictionaries(interactions, users, resources, tags, categories)
    }

    /// Rebuild a store around a filtered record set, keeping the dictionaries
    /// and recomputing counts and frequency tables.
    pub fn rebuilt_with(&self, interactions: Vec<Interaction>) -> Self {
        Self::with_dictionaries(
            interactions,
            self.users.clone(),
            self.resources.clone(),
            self.tags.clone(),
            self.categories.clone(),
        )
    }

    /// Number of interaction records.
    pub fn len(&self) -> usize {
        self.interactions.len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.interactions.is_empty()
    }

    /// Ordered interaction records.
    pub fn data(&self) -> &[Interaction] {
        &self.interactions
    }

    /// Number of distinct users in the dictionary.
    pub fn num_users(&self) -> usize {
        self.users.len()
    }

    /// Number of distinct resources in the dictionary.
    pub fn num_resources(&self) -> usize {
        self.resources.len()
    }

    /// Number of distinct tags in the dictionary.
    pub fn num_tags(&self) -> usize {
        self.tags.len()
    }

    /// Per-user record counts, indexed by `UserId`.
    pub fn user_counts(&self) -> &[usize] {
        &self.user_counts
    }

    /// Global resource occurrence counts, indexed by `ResourceId`.
    pub fn resource_counts(&self) -> &[usize] {
        &self.resource_counts
    }

    /// Global tag occurrence counts, indexed by `TagId`.
    pub fn tag_counts(&self) -> &[usize] {
        &self.tag_counts
    }

    /// Display label for a user.
    pub fn user_label(&self, id: UserId) -> Result<&str, SplitError> {
        label(&self.users, id, "user")
    }

    /// Display label for a resource.
    pub fn resource_label(&self, id: ResourceId) -> Result<&str, SplitError> {
        label(&self.resources, id, "resource")
    }

    /// Display label for a tag.
    pub fn tag_label(&self, id: TagId) -> Result<&str, SplitError> {
        label(&self.tags, id, "tag")
    }

    /// Display label for a category.
    pub fn category_label(&self, id: CategoryId) -> Result<&str, SplitError> {
        label(&self.categories, id, "category")
    }

    /// Stable-sort records by user so each user's block is contiguous while
    /// insertion order within a user is preserved.
    pub fn sort_by_user(&mut self) {
        self.interactions.sort_by_key(|interaction| interaction.user);
    }

    /// Copy of the records in user-sorted order; the store is untouched.
    pub fn sorted_copy(&self) -> Vec<Interaction> {
        let mut copy = self.interactions.clone();
        copy.sort_by_key(|interaction| interaction.user);
        copy
    }

    /// Copy of the records in uniformly shuffled order; the store is
    /// untouched.
    pub fn shuffled_copy<R: Rng>(&self, rng: &mut R) -> Vec<Interaction> {
        let mut copy = self.interactions.clone();
        copy.shuffle(rng);
        copy
    }

    /// Drop the leading `train_size` records, narrowing the store to the
    /// test region. Counts and dictionaries are left untouched.
    pub fn narrow_to_tail(&mut self, train_size: usize) {
        let cut = train_size.min(self.interactions.len());
        self.interactions.drain(..cut);
    }

    /// Iterate contiguous per-user record blocks in scan order.
    pub fn user_blocks(&self) -> UserBlocks<'_> {
        UserBlocks {
            data: &self.interactions,
            idx: 0,
        }
    }

    /// Check the per-user count invariant and dictionary coverage before any
    /// partitioning runs, so a broken dataset fails here instead of deep
    /// inside a ranking helper.
    pub fn validate(&self) -> Result<(), SplitError> {
        let mut seen: HashSet<UserId> = HashSet::new();
        for (user, block) in self.user_blocks() {
            let expected = self.user_counts.get(user).copied().unwrap_or(0);
            if !seen.insert(user) || expected != block.len() {
                return Err(SplitError::InconsistentDataset {
                    user,
                    expected,
                    actual: block.len(),
                });
            }
        }
        for interaction in &self.interactions {
            if interaction.user >= self.users.len() {
                return Err(SplitError::MissingLabel {
                    kind: "user",
                    id: interaction.user,
                });
            }
            if interaction.resource >= self.resources.len() {
                return Err(SplitError::MissingLabel {
                    kind: "resource",
                    id: interaction.resource,
                });
            }
            if let Some(tag) = interaction
                .tags
                .iter()
                .find(|tag| **tag >= self.tags.len())
            {
                return Err(SplitError::MissingLabel {
                    kind: "tag",
                    id: *tag,
                });
            }
            if let Some(category) = interaction
                .categories
                .iter()
                .find(|category| **category >= self.categories.len())
            {
                return Err(SplitError::MissingLabel {
                    kind: "category",
                    id: *category,
                });
            }
        }
        Ok(())
    }

    /// Distinct users appearing after `train_size`, in first-seen order.
    pub fn unique_test_users(&self, train_size: usize) -> Vec<UserId> {
        let mut seen = HashSet::new();
        let mut users = Vec::new();
        for interaction in self.interactions.iter().skip(train_size) {
            if seen.insert(interaction.user) {
                users.push(interaction.user);
            }
        }
        users
    }

    /// Resources `user` consumed inside the train region (`..train_size`).
    pub fn user_resources_in_train(
        &self,
        train_size: usize,
        user: UserId,
    ) -> HashSet<ResourceId> {
        self.interactions[..train_size.min(self.interactions.len())]
            .iter()
            .filter(|interaction| interaction.user == user)
            .map(|interaction| interaction.resource)
            .collect()
    }
}

/// Iterator over contiguous `(user, block)` runs of an interaction sequence.
pub struct UserBlocks<'a> {
    data: &'a [Interaction],
    idx: usize,
}

impl<'a> Iterator for UserBlocks<'a> {
    type Item = (UserId, &'a [Interaction]);

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.idx;
        let first = self.data.get(start)?;
        let mut stop = start + 1;
        while self
            .data
            .get(stop)
            .is_some_and(|interaction| interaction.user == first.user)
        {
            stop += 1;
        }
        self.idx = stop;
        Some((first.user, &self.data[start..stop]))
    }
}

fn count_tables(
    interactions: &[Interaction],
    num_users: usize,
    num_resources: usize,
    num_tags: usize,
) -> (Vec<usize>, Vec<usize>, Vec<usize>) {
    let mut user_counts = vec![0; num_users];
    let mut resource_counts = vec![0; num_resources];
    let mut tag_counts = vec![0; num_tags];
    for interaction in interactions {
        if let Some(count) = user_counts.get_mut(interaction.user) {
            *count += 1;
        }
        if let Some(count) = resource_counts.get_mut(interaction.resource) {
            *count += 1;
        }
        for tag in &interaction.tags {
            if let Some(count) = tag_counts.get_mut(*tag) {
                *count += 1;
            }
        }
    }
    (user_counts, resource_counts, tag_counts)
}

fn max_id(ids: impl Iterator<Item = usize>) -> Option<usize> {
    ids.max()
}

fn synthesized_labels(prefix: &str, max: Option<usize>) -> Vec<String> {
    match max {
        Some(max) => (0..=max).map(|id| format!("{prefix}_{id}")).collect(),
        None => Vec::new(),
    }
}

fn label<'a>(dict: &'a [String], id: usize, kind: &'static str) -> Result<&'a str, SplitError> {
    dict.get(id)
        .map(String::as_str)
        .ok_or(SplitError::MissingLabel { kind, id })
}

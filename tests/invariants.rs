use std::collections::HashMap;

use rand::SeedableRng;
use rand::rngs::StdRng;

use folksplit::data::{Interaction, InteractionStore};
use folksplit::rank::RankDirection;
use folksplit::splits::{HoldoutSelection, SplitOutcome, Splitter};

fn store_with_counts(counts: &[usize]) -> InteractionStore {
    let mut interactions = Vec::new();
    for (user, count) in counts.iter().enumerate() {
        for idx in 0..*count {
            interactions.push(Interaction::unrated(user, user * 100 + idx, vec![0], "t"));
        }
    }
    InteractionStore::from_interactions(interactions)
}

fn record_keys(records: &[Interaction]) -> Vec<(usize, usize)> {
    let mut keys: Vec<(usize, usize)> = records
        .iter()
        .map(|interaction| (interaction.user, interaction.resource))
        .collect();
    keys.sort_unstable();
    keys
}

fn assert_conserved(store: &InteractionStore, outcome: &SplitOutcome) {
    assert_eq!(outcome.train.len() + outcome.test.len(), store.len());
    assert_eq!(record_keys(&outcome.combined()), record_keys(store.data()));
}

#[test]
fn every_strategy_conserves_the_input_multiset() {
    let store = store_with_counts(&[1, 4, 2, 7, 3]);
    let splitter = Splitter::new(&store).unwrap();
    let mut rng = StdRng::seed_from_u64(17);

    assert_conserved(&store, &splitter.random_percentage(30, &mut rng));
    assert_conserved(&store, &splitter.leave_last_out(false));
    assert_conserved(&store, &splitter.leave_last_out(true));
    assert_conserved(&store, &splitter.leave_one_random_out(&mut rng));
    assert_conserved(&store, &splitter.leave_n_out(2));
    assert_conserved(
        &store,
        &splitter.leave_percentage_out(3, HoldoutSelection::Random, &mut rng),
    );
    assert_conserved(
        &store,
        &splitter.leave_percentage_out(
            3,
            HoldoutSelection::Ranked(RankDirection::LeastFrequentFirst),
            &mut rng,
        ),
    );
}

#[test]
fn leave_last_out_example_from_three_users() {
    // Users with record counts {1, 2, 3}.
    let store = store_with_counts(&[1, 2, 3]);
    let splitter = Splitter::new(&store).unwrap();

    let outcome = splitter.leave_last_out(false);
    let mut train_per_user: HashMap<usize, usize> = HashMap::new();
    for interaction in &outcome.train {
        *train_per_user.entry(interaction.user).or_default() += 1;
    }
    assert_eq!(train_per_user[&0], 1);
    assert_eq!(train_per_user[&1], 1);
    assert_eq!(train_per_user[&2], 2);
    assert_eq!(outcome.test.len(), 2);

    let cold = splitter.leave_last_out(true);
    assert_eq!(cold.test.len(), 3);
    assert!(cold.test.iter().any(|interaction| interaction.user == 0));
}

#[test]
fn random_percentage_example_splits_ten_records_five_five() {
    let store = store_with_counts(&[4, 3, 3]);
    let splitter = Splitter::new(&store).unwrap();
    let mut rng = StdRng::seed_from_u64(2);
    let outcome = splitter.random_percentage(50, &mut rng);
    assert_eq!(outcome.test.len(), 5);
    assert_eq!(outcome.train.len(), 5);
    assert_eq!(record_keys(&outcome.combined()), record_keys(store.data()));
}

#[test]
fn leave_one_random_out_draws_roughly_uniform_positions() {
    let store = store_with_counts(&[4]);
    let splitter = Splitter::new(&store).unwrap();
    let trials = 4000;
    let mut hits = [0usize; 4];
    for seed in 0..trials {
        let mut rng = StdRng::seed_from_u64(seed);
        let outcome = splitter.leave_one_random_out(&mut rng);
        assert_eq!(outcome.test.len(), 1);
        hits[outcome.test[0].resource] += 1;
    }
    let expected = trials as usize / 4;
    for count in hits {
        // Loose envelope: each position should land within 20% of uniform.
        assert!(count > expected * 4 / 5, "position undersampled: {count}");
        assert!(count < expected * 6 / 5, "position oversampled: {count}");
    }
}

#[test]
fn fixed_seeds_reproduce_randomized_partitions_exactly() {
    let store = store_with_counts(&[3, 5, 2, 6]);
    let splitter = Splitter::new(&store).unwrap();

    let run = |seed: u64| {
        let mut rng = StdRng::seed_from_u64(seed);
        let random = splitter.random_percentage(40, &mut rng);
        let one_out = splitter.leave_one_random_out(&mut rng);
        let pct = splitter.leave_percentage_out(2, HoldoutSelection::Random, &mut rng);
        (
            record_keys(&random.test),
            record_keys(&one_out.test),
            record_keys(&pct.test),
        )
    };

    assert_eq!(run(9), run(9));
    assert_ne!(run(9), run(10));
}

#[test]
fn leave_percentage_out_holdout_counts_are_bounded_per_user() {
    let store = store_with_counts(&[1, 2, 5, 9]);
    let splitter = Splitter::new(&store).unwrap();
    let mut rng = StdRng::seed_from_u64(33);
    let percentage = 4;
    let outcome = splitter.leave_percentage_out(percentage, HoldoutSelection::Random, &mut rng);
    for (user, count) in [(0usize, 1usize), (1, 2), (2, 5), (3, 9)] {
        let held = outcome
            .test
            .iter()
            .filter(|interaction| interaction.user == user)
            .count();
        assert_eq!(held, percentage.min(count - 1));
    }
}

#[test]
fn ranked_holdout_prefers_the_sparsest_resources() {
    // User 0 tags resources 0..4; resource popularity grows with the id
    // because later users revisit high ids.
    let mut interactions = Vec::new();
    for resource in 0..5 {
        interactions.push(Interaction::unrated(0, resource, vec![0], "t"));
    }
    for (user, resource) in [(1, 3), (1, 4), (2, 4)] {
        interactions.push(Interaction::unrated(user, resource, vec![0], "t"));
    }
    let store = InteractionStore::from_interactions(interactions);
    let splitter = Splitter::new(&store).unwrap();
    let mut rng = StdRng::seed_from_u64(1);
    let outcome = splitter.leave_percentage_out(
        2,
        HoldoutSelection::Ranked(RankDirection::LeastFrequentFirst),
        &mut rng,
    );
    let held: Vec<usize> = outcome
        .test
        .iter()
        .filter(|interaction| interaction.user == 0)
        .map(|interaction| interaction.resource)
        .collect();
    assert_eq!(held, vec![0, 1]);
}

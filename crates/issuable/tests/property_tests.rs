//! Property-based tests for ordering and matching invariants
//!
//! These tests use `proptest` to check the query engine against randomly
//! generated issuable sets.


use chrono::{Days, NaiveDate};
use harness::TestHarness;
use issuable::domain::{IssuableId, State, Transition};
use issuable::query::IssuableFilter;
use proptest::prelude::*;
use std::collections::{BTreeSet, HashMap};

const LABELS: [&str; 4] = ["a", "b", "c", "d"];

/// Milestone placement: none, undated milestone, or dated milestone
fn placement_strategy() -> impl Strategy<Value = Option<Option<u32>>> {
    prop_oneof![
        Just(None),
        Just(Some(None)),
        (0u32..60).prop_map(|offset| Some(Some(offset))),
    ]
}

fn label_set_strategy() -> impl Strategy<Value = BTreeSet<usize>> {
    prop::collection::btree_set(0usize..LABELS.len(), 0..=LABELS.len())
}

/// Seed issuables with the given milestone placements, returning each id
/// with its placement.
fn seed_milestones(
    h: &TestHarness,
    placements: &[Option<Option<u32>>],
) -> HashMap<IssuableId, Option<Option<NaiveDate>>> {
    let base = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
    let mut seeded = HashMap::new();

    for (i, placement) in placements.iter().enumerate() {
        let title = format!("issuable {}", i);
        let due = placement.map(|offset| offset.map(|days| base + Days::new(u64::from(days))));
        let id = match due {
            None => h.create(&title),
            Some(due_date) => {
                let milestone = h
                    .executor
                    .create_milestone(1, &format!("m{}", i), due_date)
                    .unwrap();
                h.create_in_milestone(&title, milestone.id)
            }
        };
        seeded.insert(id, due);
    }
    seeded
}

/// 0 = dated, 1 = undated milestone, 2 = no milestone
fn null_rank(placement: &Option<Option<NaiveDate>>) -> u8 {
    match placement {
        Some(Some(_)) => 0,
        Some(None) => 1,
        None => 2,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_milestone_orders_place_nulls_last(
        placements in prop::collection::vec(placement_strategy(), 1..12)
    ) {
        let h = TestHarness::new();
        let seeded = seed_milestones(&h, &placements);

        for (sort, ascending) in [("milestone_due_asc", true), ("milestone_due_desc", false)] {
            let ids = h.ids(IssuableFilter::new().sort(sort));
            prop_assert_eq!(ids.len(), placements.len());

            let ranks: Vec<u8> = ids.iter().map(|id| null_rank(&seeded[id])).collect();
            prop_assert!(ranks.windows(2).all(|w| w[0] <= w[1]), "{:?}", ranks);

            let dates: Vec<NaiveDate> = ids
                .iter()
                .filter_map(|id| seeded[id].flatten())
                .collect();
            let ordered = dates.windows(2).all(|w| {
                if ascending { w[0] <= w[1] } else { w[0] >= w[1] }
            });
            prop_assert!(ordered, "{} out of order: {:?}", sort, dates);
        }
    }

    #[test]
    fn prop_label_filter_is_all_match(
        attached in prop::collection::vec(label_set_strategy(), 1..8),
        required in prop::collection::btree_set(0usize..LABELS.len(), 1..=LABELS.len())
    ) {
        let h = TestHarness::new();
        let mut expected = Vec::new();
        for (i, labels) in attached.iter().enumerate() {
            let id = h.create(&format!("issuable {}", i));
            let names: Vec<&str> = labels.iter().map(|&l| LABELS[l]).collect();
            h.label(id, &names);
            if required.is_subset(labels) {
                expected.push(id);
            }
        }
        expected.reverse();

        let names: Vec<&str> = required.iter().map(|&l| LABELS[l]).collect();
        prop_assert_eq!(h.ids(IssuableFilter::new().with_labels(names)), expected);
    }

    #[test]
    fn prop_without_label_matches_empty_sets(
        attached in prop::collection::vec(label_set_strategy(), 1..8)
    ) {
        let h = TestHarness::new();
        let mut expected = Vec::new();
        for (i, labels) in attached.iter().enumerate() {
            let id = h.create(&format!("issuable {}", i));
            let names: Vec<&str> = labels.iter().map(|&l| LABELS[l]).collect();
            h.label(id, &names);
            if labels.is_empty() {
                expected.push(id);
            }
        }
        expected.reverse();

        prop_assert_eq!(h.ids(IssuableFilter::new().without_label()), expected);
    }

    #[test]
    fn prop_upvote_order_is_non_increasing_and_complete(
        tallies in prop::collection::vec(0usize..5, 1..8)
    ) {
        let h = TestHarness::new();
        let mut by_id = HashMap::new();
        for (i, &up) in tallies.iter().enumerate() {
            let id = h.create(&format!("issuable {}", i));
            h.vote(id, up, 0);
            by_id.insert(id, up);
        }

        let ids = h.ids(IssuableFilter::new().sort("upvotes_desc"));
        prop_assert_eq!(ids.len(), tallies.len());
        for pair in ids.windows(2) {
            let (a, b) = (by_id[&pair[0]], by_id[&pair[1]]);
            prop_assert!(a > b || (a == b && pair[0] > pair[1]));
        }
        for id in &ids {
            prop_assert_eq!(h.executor.upvotes(*id).unwrap(), by_id[id]);
        }
    }

    #[test]
    fn prop_open_predicate_tracks_state(
        transitions in prop::collection::vec(prop::bool::ANY, 0..10)
    ) {
        let h = TestHarness::new();
        let id = h.create("lifecycle");
        let mut expected = State::Opened;

        for close in transitions {
            let transition = if close { Transition::Close } else { Transition::Reopen };
            let outcome = h.executor.transition(id, transition).unwrap();
            let next = expected.apply(transition);
            prop_assert_eq!(outcome.changed, next.is_some());
            expected = next.unwrap_or(expected);

            let issuable = outcome.issuable;
            prop_assert_eq!(issuable.state, expected);
            prop_assert_eq!(
                issuable.is_open(),
                matches!(issuable.state, State::Opened | State::Reopened)
            );
        }
    }
}

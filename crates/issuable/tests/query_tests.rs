//! Integration tests for filtering and ordering issuables


use harness::TestHarness;
use issuable::domain::{IssuableKind, NewIssuable, State};
use issuable::query::{GroupingColumn, IssuableFilter};

#[test]
fn test_text_search_is_case_insensitive_substring() {
    let h = TestHarness::new();
    let id = h.create("Fix login bug");

    assert_eq!(h.ids(IssuableFilter::new().search("login")), vec![id]);
    assert_eq!(h.ids(IssuableFilter::new().search("LOGIN")), vec![id]);
    assert!(h.ids(IssuableFilter::new().search("signup")).is_empty());
}

#[test]
fn test_empty_search_does_not_filter() {
    let h = TestHarness::new();
    let a = h.create("One");
    let b = h.create("Two");

    assert_eq!(h.ids(IssuableFilter::new().search("")), vec![b, a]);
}

#[test]
fn test_full_search_looks_at_descriptions() {
    let h = TestHarness::new();
    let id = h.create_with_description("Crash on start", "Stack trace mentions LoginController");

    assert!(h.ids(IssuableFilter::new().search("login")).is_empty());
    assert_eq!(h.ids(IssuableFilter::new().full_search("login")), vec![id]);
}

#[test]
fn test_label_filter_requires_every_label() {
    let h = TestHarness::new();
    let both = h.create("both");
    let only_a = h.create("only a");
    let none = h.create("none");
    h.label(both, &["A", "B"]);
    h.label(only_a, &["A"]);

    assert_eq!(h.ids(IssuableFilter::new().with_labels(["A", "B"])), vec![both]);
    assert_eq!(
        h.ids(IssuableFilter::new().with_labels(["A"])),
        vec![only_a, both]
    );
    assert_eq!(h.ids(IssuableFilter::new().without_label()), vec![none]);
}

#[test]
fn test_unknown_label_matches_nothing() {
    let h = TestHarness::new();
    let id = h.create("labelled");
    h.label(id, &["bug"]);

    assert!(h
        .ids(IssuableFilter::new().with_labels(["does-not-exist"]))
        .is_empty());
}

#[test]
fn test_assignee_filters() {
    let h = TestHarness::new();
    let mine = h.create_with(NewIssuable::new(1, "mine", 1).with_assignee(7)).id;
    let theirs = h.create_with(NewIssuable::new(1, "theirs", 1).with_assignee(8)).id;
    let nobody = h.create("nobody");

    assert_eq!(h.ids(IssuableFilter::new().assigned_to(7)), vec![mine]);
    assert_eq!(h.ids(IssuableFilter::new().unassigned()), vec![nobody]);
    assert_eq!(h.ids(IssuableFilter::new().assigned()), vec![theirs, mine]);
}

#[test]
fn test_author_project_and_kind_filters() {
    let h = TestHarness::new();
    let issue = h.create_with(NewIssuable::new(1, "issue", 5)).id;
    let mr = h
        .create_with(NewIssuable::new(2, "mr", 6).with_kind(IssuableKind::MergeRequest))
        .id;

    assert_eq!(h.ids(IssuableFilter::new().authored(5)), vec![issue]);
    assert_eq!(h.ids(IssuableFilter::new().of_projects([2])), vec![mr]);
    assert_eq!(
        h.ids(IssuableFilter::new().of_kind(IssuableKind::MergeRequest)),
        vec![mr]
    );
    assert_eq!(h.ids(IssuableFilter::new().of_projects([])), vec![mr, issue]);
}

#[test]
fn test_state_filters() {
    let h = TestHarness::new();
    let opened = h.create("opened");
    let reopened = h.create("reopened");
    let closed = h.create("closed");
    h.executor.close(reopened).unwrap();
    h.executor.reopen(reopened).unwrap();
    h.executor.close(closed).unwrap();

    assert_eq!(h.ids(IssuableFilter::new().opened()), vec![reopened, opened]);
    assert_eq!(h.ids(IssuableFilter::new().only_opened()), vec![opened]);
    assert_eq!(h.ids(IssuableFilter::new().only_reopened()), vec![reopened]);
    assert_eq!(h.ids(IssuableFilter::new().closed()), vec![closed]);
    assert_eq!(
        h.ids(IssuableFilter::new().with_states(Vec::<State>::new())),
        vec![closed, reopened, opened]
    );
}

#[test]
fn test_milestone_filters() {
    let h = TestHarness::new();
    let v1 = h.milestone("v1", Some("2026-01-01"));
    let v2 = h.milestone("v2", None);
    let in_v1 = h.create_in_milestone("in v1", v1);
    let in_v2 = h.create_in_milestone("in v2", v2);
    h.create("no milestone");

    assert_eq!(h.ids(IssuableFilter::new().with_milestone("v1")), vec![in_v1]);
    assert_eq!(h.ids(IssuableFilter::new().of_milestones([v2])), vec![in_v2]);
    assert!(h.ids(IssuableFilter::new().with_milestone("v9")).is_empty());
}

#[test]
fn test_milestone_due_orders_put_undated_last() {
    let h = TestHarness::new();
    let early = h.milestone("early", Some("2026-01-01"));
    let late = h.milestone("late", Some("2026-06-01"));
    let undated = h.milestone("someday", None);

    let none = h.create("no milestone");
    let in_late = h.create_in_milestone("late", late);
    let in_undated = h.create_in_milestone("undated", undated);
    let in_early = h.create_in_milestone("early", early);

    assert_eq!(
        h.ids(IssuableFilter::new().sort("milestone_due_asc")),
        vec![in_early, in_late, in_undated, none]
    );
    assert_eq!(
        h.ids(IssuableFilter::new().sort("milestone_due_desc")),
        vec![in_late, in_early, in_undated, none]
    );
}

#[test]
fn test_upvotes_order_keeps_zero_vote_issuables_last() {
    let h = TestHarness::new();
    let three = h.create("three");
    let zero = h.create("zero");
    let one = h.create("one");
    h.vote(three, 3, 0);
    h.vote(one, 1, 5);

    assert_eq!(
        h.ids(IssuableFilter::new().sort("upvotes_desc")),
        vec![three, one, zero]
    );
    assert_eq!(
        h.ids(IssuableFilter::new().sort("downvotes_desc")),
        vec![one, zero, three]
    );
}

#[test]
fn test_unknown_sort_falls_back_to_recent() {
    let h = TestHarness::new();
    let a = h.create("a");
    let b = h.create("b");
    let c = h.create("c");

    assert_eq!(h.ids(IssuableFilter::new().sort("priority")), vec![c, b, a]);
    assert_eq!(h.ids(IssuableFilter::new()), vec![c, b, a]);
    assert_eq!(h.ids(IssuableFilter::new().sort("id_asc")), vec![a, b, c]);
}

#[test]
fn test_equal_keys_tie_break_by_id_descending() {
    let h = TestHarness::new();
    let a = h.create("a");
    let b = h.create("b");
    h.vote(a, 2, 0);
    h.vote(b, 2, 0);

    assert_eq!(h.ids(IssuableFilter::new().sort("upvotes_desc")), vec![b, a]);
}

#[test]
fn test_filters_combine_with_and() {
    let h = TestHarness::new();
    let target = h.create_with(NewIssuable::new(1, "Login fails", 1).with_assignee(3)).id;
    let other = h.create_with(NewIssuable::new(1, "Login slow", 1).with_assignee(4)).id;
    h.label(target, &["bug"]);
    h.label(other, &["bug"]);

    let filter = IssuableFilter::new()
        .search("login")
        .with_labels(["bug"])
        .assigned_to(3)
        .opened();
    assert_eq!(h.ids(filter), vec![target]);
}

#[test]
fn test_soft_deleted_issuables_never_listed() {
    let h = TestHarness::new();
    let id = h.create("to delete");
    h.executor.soft_delete(id).unwrap();

    assert!(h.ids(IssuableFilter::new()).is_empty());
    assert!(h.executor.show_issuable(id).unwrap().is_deleted());
}

#[test]
fn test_grouping_columns_only_for_aggregating_queries() {
    let h = TestHarness::new();

    let plain = h.executor.resolve_query(&IssuableFilter::new());
    assert!(plain.grouping_columns.is_none());

    let one_label = h
        .executor
        .resolve_query(&IssuableFilter::new().with_labels(["bug"]));
    assert!(one_label.grouping_columns.is_none());

    let votes = h
        .executor
        .resolve_query(&IssuableFilter::new().sort("upvotes_desc"));
    assert_eq!(votes.grouping_columns, Some(vec![GroupingColumn::IssuableId]));

    let labels_by_milestone = h.executor.resolve_query(
        &IssuableFilter::new()
            .with_labels(["bug", "ui"])
            .sort("milestone_due_asc"),
    );
    assert_eq!(
        labels_by_milestone.grouping_columns,
        Some(vec![
            GroupingColumn::IssuableId,
            GroupingColumn::MilestoneId,
            GroupingColumn::MilestoneDueDate,
        ])
    );
}

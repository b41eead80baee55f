//! Integration tests for the opened/closed/reopened lifecycle


use chrono::{Duration, Utc};
use harness::TestHarness;
use issuable::domain::{NewIssuable, State, Transition};

#[test]
fn test_full_lifecycle() {
    let h = TestHarness::new();
    let id = h.create("lifecycle");
    assert_eq!(h.executor.show_issuable(id).unwrap().state, State::Opened);

    assert_eq!(h.executor.close(id).unwrap().issuable.state, State::Closed);
    assert_eq!(h.executor.reopen(id).unwrap().issuable.state, State::Reopened);
    assert_eq!(h.executor.close(id).unwrap().issuable.state, State::Closed);
}

#[test]
fn test_reopen_of_open_issuable_is_noop() {
    let h = TestHarness::new();
    let id = h.create("open");
    let before = h.executor.show_issuable(id).unwrap();

    let outcome = h.executor.reopen(id).unwrap();

    assert!(!outcome.changed);
    assert_eq!(outcome.issuable, before);
}

#[test]
fn test_open_predicate_matches_state() {
    let h = TestHarness::new();
    let id = h.create("predicate");

    for transition in [Transition::Close, Transition::Reopen, Transition::Close] {
        let issuable = h.executor.transition(id, transition).unwrap().issuable;
        assert_eq!(
            issuable.is_open(),
            matches!(issuable.state, State::Opened | State::Reopened)
        );
        assert_eq!(issuable.is_closed(), !issuable.is_open());
    }
}

#[test]
fn test_transition_moves_updated_at_and_clears_new_today() {
    let h = TestHarness::new();
    let id = h.create("fresh");
    let created = h.executor.show_issuable(id).unwrap();
    assert!(created.is_new_today());

    let closed = h.executor.close(id).unwrap().issuable;
    assert!(closed.updated_at >= created.updated_at);
    assert!(closed.is_today());
}

#[test]
fn test_new_today_requires_creation_today() {
    let now = Utc::now();
    let mut issuable = NewIssuable::new(1, "old", 1).build(now).unwrap();
    assert!(issuable.is_new_at(now));

    issuable.created_at = now - Duration::days(2);
    issuable.updated_at = issuable.created_at;
    assert!(!issuable.is_new_at(now));
    assert!(!issuable.is_today_at(now));
}

#[test]
fn test_new_today_false_after_edit() {
    let now = Utc::now();
    let mut issuable = NewIssuable::new(1, "edited", 1).build(now).unwrap();
    issuable.updated_at = now + Duration::seconds(1);

    assert!(issuable.is_today_at(now));
    assert!(!issuable.is_new_at(now));
}

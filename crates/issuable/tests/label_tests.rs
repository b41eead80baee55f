//! Integration tests for attaching and detaching labels by name


use harness::TestHarness;
use issuable::commands::CommandExecutor;
use issuable::domain::NewIssuable;
use issuable::query::IssuableFilter;
use issuable::storage::{InMemoryStorage, IssuableStore, JsonFileStorage};
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

#[test]
fn test_whitespace_variants_collapse_to_one_label() {
    let h = TestHarness::new();
    let id = h.create("fresh");

    h.label(id, &["x", "x", " x "]);

    let issuable = h.executor.show_issuable(id).unwrap();
    assert_eq!(issuable.label_ids.len(), 1);
    assert_eq!(h.executor.label_names(id).unwrap(), vec!["x"]);
}

#[test]
fn test_labels_are_shared_within_a_project() {
    let h = TestHarness::new();
    let a = h.create("a");
    let b = h.create("b");
    h.label(a, &["bug"]);
    h.label(b, &["bug"]);

    let snapshot = h.executor.storage().snapshot().unwrap();
    assert_eq!(snapshot.labels.len(), 1);
    assert_eq!(
        h.ids(IssuableFilter::new().with_labels(["bug"])),
        vec![b, a]
    );
}

#[test]
fn test_labels_are_scoped_to_the_issuable_project() {
    let h = TestHarness::new();
    let in_one = h.create_with(NewIssuable::new(1, "one", 1)).id;
    let in_two = h.create_with(NewIssuable::new(2, "two", 1)).id;
    h.label(in_one, &["bug"]);
    h.label(in_two, &["bug"]);

    let snapshot = h.executor.storage().snapshot().unwrap();
    let mut projects: Vec<_> = snapshot.labels.iter().map(|l| l.project_id).collect();
    projects.sort();
    assert_eq!(projects, vec![1, 2]);
}

#[test]
fn test_remove_labels_detaches_without_deleting() {
    let h = TestHarness::new();
    let a = h.create("a");
    let b = h.create("b");
    h.label(a, &["bug", "ui"]);
    h.label(b, &["bug"]);

    h.executor.remove_labels(a).unwrap();

    assert!(h.executor.label_names(a).unwrap().is_empty());
    assert_eq!(h.executor.label_names(b).unwrap(), vec!["bug"]);
    assert_eq!(h.executor.storage().snapshot().unwrap().labels.len(), 2);
    assert_eq!(h.ids(IssuableFilter::new().without_label()), vec![a]);
}

#[test]
fn test_label_changes_do_not_touch_assignee_cache() {
    let h = TestHarness::new();
    let id = h.create_with(NewIssuable::new(1, "assigned", 1).with_assignee(4)).id;
    h.cache.take();

    h.label(id, &["bug"]);
    h.executor.remove_labels(id).unwrap();

    assert!(h.cache.take().is_empty());
}

#[test]
fn test_concurrent_attach_creates_one_label_in_memory() {
    let storage = InMemoryStorage::new();
    let executor = Arc::new(CommandExecutor::new(storage.clone()));
    executor.init().unwrap();
    let ids: Vec<_> = (0..8)
        .map(|i| {
            executor
                .create_issuable(NewIssuable::new(1, format!("issue {}", i), 1))
                .unwrap()
                .id
        })
        .collect();

    let handles: Vec<_> = ids
        .iter()
        .map(|&id| {
            let executor = Arc::clone(&executor);
            thread::spawn(move || executor.add_labels_by_names(id, ["shared"]).unwrap())
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let snapshot = storage.snapshot().unwrap();
    assert_eq!(snapshot.labels.len(), 1);
    let label_id = snapshot.labels[0].id;
    assert!(snapshot
        .issuables
        .iter()
        .all(|i| i.label_ids.contains(&label_id)));
}

#[test]
fn test_concurrent_attach_creates_one_label_on_disk() {
    let temp = TempDir::new().unwrap();
    let storage = JsonFileStorage::new(temp.path());
    storage.init().unwrap();
    let setup = CommandExecutor::new(storage.clone());
    let ids: Vec<_> = (0..4)
        .map(|i| {
            setup
                .create_issuable(NewIssuable::new(1, format!("issue {}", i), 1))
                .unwrap()
                .id
        })
        .collect();

    let handles: Vec<_> = ids
        .iter()
        .map(|&id| {
            // Separate store handles, as separate processes would have
            let executor = CommandExecutor::new(JsonFileStorage::new(temp.path()));
            thread::spawn(move || executor.add_labels_by_names(id, ["shared"]).unwrap())
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let snapshot = storage.snapshot().unwrap();
    assert_eq!(snapshot.labels.len(), 1);
    assert!(snapshot.issuables.iter().all(|i| i.label_ids.len() == 1));
}

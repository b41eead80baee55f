//! Command execution logic for issuable operations.
//!
//! The `CommandExecutor` owns the mutation paths (create, update, state
//! transitions, labels, notes) and the query entry points. Every mutation
//! of an existing issuable goes through [`CommandExecutor::commit`], which
//! runs the store's read-modify-write and then fires the assignee cache
//! hook on the committed before/after values.
//!
//! This module is organized into submodules by functional area:
//! - `issuable`: Creation, updates, assignment and lifecycle
//! - `labels`: Attaching and detaching labels by name
//! - `notes`: Comments, award reactions and vote counts
//! - `query`: Filtered, ordered listings

mod issuable;
mod labels;
mod notes;
mod query;

pub use issuable::Transitioned;

// Common imports used across modules
use crate::assignee_cache::{self, AssigneeCache, NoopAssigneeCache};
use crate::config::IssuableConfig;
use crate::domain::{Issuable, IssuableId};
use crate::errors::{IssuableError, Result};
use crate::labels::DEFAULT_COLOR;
use crate::query::{QueryComposer, SortKey};
use crate::storage::{Change, IssuableStore};

/// Executes issuable operations against a store.
///
/// Generic over the storage backend and the assignee cache so the same
/// logic runs against the in-memory store in tests and the JSON store in
/// the binary.
pub struct CommandExecutor<S: IssuableStore, C: AssigneeCache = NoopAssigneeCache> {
    storage: S,
    cache: C,
    composer: QueryComposer,
    label_color: String,
}

impl<S: IssuableStore> CommandExecutor<S> {
    /// Create an executor with no assignee cache and default settings
    pub fn new(storage: S) -> Self {
        Self::with_cache(storage, NoopAssigneeCache)
    }
}

impl<S: IssuableStore, C: AssigneeCache> CommandExecutor<S, C> {
    /// Create an executor that keeps `cache` in step with assignee changes
    pub fn with_cache(storage: S, cache: C) -> Self {
        Self {
            storage,
            cache,
            composer: QueryComposer::new(SortKey::RECENT),
            label_color: DEFAULT_COLOR.to_string(),
        }
    }

    /// Apply label and query defaults from configuration
    pub fn with_config(mut self, config: &IssuableConfig) -> Self {
        self.composer = QueryComposer::new(config.default_sort());
        self.label_color = config.default_label_color();
        self
    }

    /// Get reference to the storage backend
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Get reference to the assignee cache
    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Initialize the storage backend
    pub fn init(&self) -> Result<()> {
        self.storage.init()?;
        Ok(())
    }

    /// Load an issuable, including soft-deleted ones.
    pub fn show_issuable(&self, id: IssuableId) -> Result<Issuable> {
        self.storage
            .get_issuable(id)?
            .ok_or_else(|| IssuableError::not_found("issuable", id))
    }

    /// Run a read-modify-write on one issuable and fire post-commit hooks.
    fn commit<F>(&self, id: IssuableId, mutate: F) -> Result<Change>
    where
        F: FnOnce(&mut Issuable),
    {
        let change = self
            .storage
            .update_issuable(id, mutate)?
            .ok_or_else(|| IssuableError::not_found("issuable", id))?;

        if change.is_modified() {
            self.after_commit(&change);
        }
        Ok(change)
    }

    /// Post-commit hook.
    ///
    /// An assignee change refreshes the previous and the new assignee. A
    /// change that moves the issuable in or out of the open set (close,
    /// reopen, soft delete) refreshes the current assignee. The change is
    /// already durable, so refresh failures are logged, not returned.
    fn after_commit(&self, change: &Change) {
        let (before, after) = (&change.before, &change.after);

        if before.assignee_id != after.assignee_id {
            assignee_cache::invalidate(&self.cache, before.assignee_id, after.assignee_id);
        } else if counts_as_open(before) != counts_as_open(after) {
            if let Some(user_id) = after.assignee_id {
                tracing::debug!(user_id, issuable_id = after.id, "open state changed");
                assignee_cache::refresh(&self.cache, user_id);
            }
        }
    }
}

fn counts_as_open(issuable: &Issuable) -> bool {
    issuable.is_open() && !issuable.is_deleted()
}

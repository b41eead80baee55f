//! Per-user cached counters kept in step with assignee changes.
//!
//! Whenever a committed update changes an issuable's assignee, the counters
//! of both the previous and the new assignee must be refreshed. The hook is
//! invoked explicitly by the command layer after the store has committed
//! the change; it never runs for failed or no-op updates. A refresh that
//! fails is logged and skipped: the committed change stands and the other
//! affected users are still refreshed.

use crate::domain::UserId;
use crate::storage::IssuableStore;
use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Aggregate cache that needs refreshing when assignments change.
pub trait AssigneeCache: Send + Sync {
    /// Recompute the cached counters for one user.
    fn update_cache_counts(&self, user_id: UserId) -> Result<()>;
}

impl<T: AssigneeCache + ?Sized> AssigneeCache for Arc<T> {
    fn update_cache_counts(&self, user_id: UserId) -> Result<()> {
        (**self).update_cache_counts(user_id)
    }
}

/// Users whose counters an assignee change affects: the previous assignee
/// (if any) followed by the new one (if any). Empty when unchanged.
pub fn affected_users(previous: Option<UserId>, current: Option<UserId>) -> Vec<UserId> {
    if previous == current {
        return Vec::new();
    }
    previous.into_iter().chain(current).collect()
}

/// Refresh counters for every user affected by an assignee change.
///
/// Returns the users whose counters were refreshed successfully.
pub fn invalidate<C: AssigneeCache + ?Sized>(
    cache: &C,
    previous: Option<UserId>,
    current: Option<UserId>,
) -> Vec<UserId> {
    affected_users(previous, current)
        .into_iter()
        .filter(|&user_id| refresh(cache, user_id))
        .collect()
}

/// Refresh one user's counters, logging a failure instead of returning it.
pub fn refresh<C: AssigneeCache + ?Sized>(cache: &C, user_id: UserId) -> bool {
    tracing::debug!(user_id, "refreshing assignee cache counts");
    match cache.update_cache_counts(user_id) {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(user_id, error = %err, "assignee cache refresh failed");
            false
        }
    }
}

/// Cache that does nothing, for callers without cached aggregates.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAssigneeCache;

impl AssigneeCache for NoopAssigneeCache {
    fn update_cache_counts(&self, _user_id: UserId) -> Result<()> {
        Ok(())
    }
}

/// Open-issuable count per assignee, recomputed from the store on refresh.
#[derive(Clone)]
pub struct OpenCountCache<S: IssuableStore> {
    storage: S,
    counts: Arc<RwLock<HashMap<UserId, usize>>>,
}

impl<S: IssuableStore> OpenCountCache<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            counts: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Cached count for a user; `None` if never refreshed.
    pub fn open_count(&self, user_id: UserId) -> Option<usize> {
        self.counts
            .read()
            .ok()
            .and_then(|counts| counts.get(&user_id).copied())
    }
}

impl<S: IssuableStore> AssigneeCache for OpenCountCache<S> {
    fn update_cache_counts(&self, user_id: UserId) -> Result<()> {
        let snapshot = self.storage.snapshot()?;
        let count = snapshot
            .issuables
            .iter()
            .filter(|i| !i.is_deleted() && i.is_open() && i.assignee_id == Some(user_id))
            .count();

        self.counts
            .write()
            .map_err(|_| anyhow!("Assignee cache lock poisoned"))?
            .insert(user_id, count);
        Ok(())
    }
}

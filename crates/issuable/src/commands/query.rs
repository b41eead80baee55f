//! Issuable query operations

use super::*;
use crate::query::{IssuableFilter, ResolvedQuery};

impl<S: IssuableStore, C: AssigneeCache> CommandExecutor<S, C> {
    /// Resolve a filter into predicates, an ordering and grouping columns
    /// without touching the store.
    pub fn resolve_query(&self, filter: &IssuableFilter) -> ResolvedQuery {
        self.composer.compose(filter)
    }

    /// Filtered, ordered issuables. Soft-deleted issuables never appear.
    pub fn query(&self, filter: &IssuableFilter) -> Result<Vec<Issuable>> {
        let snapshot = self.storage.snapshot()?;
        let ctx = snapshot.context();
        let resolved = self.composer.compose(filter);

        Ok(resolved
            .execute(&snapshot.issuables, &ctx)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Ids of the issuables `query` would return, in the same order.
    pub fn query_ids(&self, filter: &IssuableFilter) -> Result<Vec<IssuableId>> {
        let snapshot = self.storage.snapshot()?;
        let ctx = snapshot.context();
        Ok(self
            .composer
            .compose(filter)
            .execute_ids(&snapshot.issuables, &ctx))
    }
}

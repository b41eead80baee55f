//! Query composition and execution over issuables
//!
//! A caller describes what it wants with an [`IssuableFilter`]; the
//! [`QueryComposer`] turns that into a [`ResolvedQuery`]:
//!
//! 1. **Filter**: Caller-facing specification (text, labels, assignee, ...)
//! 2. **Composer**: Resolves the specification into predicates, a sort key
//!    and, for aggregating queries, the grouping key
//! 3. **Evaluator**: Matches predicates against issuables
//!
//! Execution is a pure read over a snapshot; queries never mutate and can
//! run concurrently.
//!
//! # Examples
//!
//! ```
//! use issuable::query::{IssuableFilter, QueryComposer, SortKey};
//!
//! let composer = QueryComposer::new(SortKey::RECENT);
//! let query = composer.compose(&IssuableFilter::new().search("login").opened());
//! assert_eq!(query.sort, SortKey::RECENT);
//! assert!(query.grouping_columns.is_none());
//! ```

mod evaluator;
mod filter;
pub mod milestone;
mod sort;

pub use evaluator::{Predicate, QueryContext};
pub use filter::{AssigneeFilter, IssuableFilter, TextScope};
pub use sort::{grouping_columns, FieldOrder, GroupingColumn, SortKey, Sorter};

use crate::domain::{Issuable, IssuableId};
use serde::Serialize;

/// Turns filter specifications into resolved queries
#[derive(Debug, Clone, Copy)]
pub struct QueryComposer {
    default_sort: SortKey,
}

impl QueryComposer {
    /// `default_sort` applies when a filter names no sort key.
    pub fn new(default_sort: SortKey) -> Self {
        Self { default_sort }
    }

    /// Resolve a filter into predicates, ordering and grouping.
    pub fn compose(&self, filter: &IssuableFilter) -> ResolvedQuery {
        let mut predicates = vec![Predicate::NotDeleted];

        if let Some(query) = filter.text_query.as_deref().filter(|q| !q.is_empty()) {
            predicates.push(Predicate::Text {
                needle: query.to_lowercase(),
                scope: filter.text_scope,
            });
        }
        if let Some(labels) = &filter.labels {
            predicates.push(Predicate::Labels {
                filter: labels.clone(),
            });
        }
        if let Some(assignee) = filter.assignee {
            predicates.push(Predicate::Assignee { filter: assignee });
        }
        if let Some(user_id) = filter.author_id {
            predicates.push(Predicate::Author { user_id });
        }
        if let Some(ids) = filter.milestone_ids.as_ref().filter(|ids| !ids.is_empty()) {
            predicates.push(Predicate::MilestoneIn { ids: ids.clone() });
        }
        if let Some(title) = &filter.milestone_title {
            predicates.push(Predicate::MilestoneTitle {
                title: title.clone(),
            });
        }
        if let Some(ids) = filter.project_ids.as_ref().filter(|ids| !ids.is_empty()) {
            predicates.push(Predicate::ProjectIn { ids: ids.clone() });
        }
        if let Some(states) = filter.states.as_ref().filter(|s| !s.is_empty()) {
            predicates.push(Predicate::StateIn {
                states: states.clone(),
            });
        }
        if let Some(kind) = filter.kind {
            predicates.push(Predicate::Kind { kind });
        }

        let sort = filter
            .sort
            .as_deref()
            .map(SortKey::parse)
            .unwrap_or(self.default_sort);

        let aggregates = sort.reaction_name().is_some()
            || filter
                .labels
                .as_ref()
                .map(|labels| labels.needs_grouping())
                .unwrap_or(false);

        let query = ResolvedQuery {
            predicates,
            sort,
            grouping_columns: aggregates.then(|| grouping_columns(sort)),
        };
        tracing::debug!(
            predicates = query.predicates.len(),
            sort = %query.sort,
            grouped = query.grouping_columns.is_some(),
            "composed issuable query"
        );
        query
    }
}

impl Default for QueryComposer {
    fn default() -> Self {
        Self::new(SortKey::RECENT)
    }
}

/// A fully resolved query description
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedQuery {
    /// ANDed predicates
    pub predicates: Vec<Predicate>,
    /// Primary ordering; ties are always broken by id descending
    pub sort: SortKey,
    /// Grouping key when the query aggregates (multi-label ALL match or
    /// vote tally); `None` otherwise
    pub grouping_columns: Option<Vec<GroupingColumn>>,
}

impl ResolvedQuery {
    /// Check if an issuable satisfies every predicate
    pub fn matches(&self, issuable: &Issuable, ctx: &QueryContext) -> bool {
        self.predicates.iter().all(|p| p.matches(issuable, ctx))
    }

    /// Filter and order a collection of issuables
    ///
    /// Returns references into `issuables`, one per matching issuable.
    pub fn execute<'a>(&self, issuables: &'a [Issuable], ctx: &QueryContext) -> Vec<&'a Issuable> {
        let mut matched: Vec<&'a Issuable> = issuables
            .iter()
            .filter(|issuable| self.matches(issuable, ctx))
            .collect();

        let sorter = Sorter::new(self.sort, ctx, &matched);
        matched.sort_by(|a, b| sorter.compare(a, b));
        matched
    }

    /// Identifiers of matching issuables, in result order
    pub fn execute_ids(&self, issuables: &[Issuable], ctx: &QueryContext) -> Vec<IssuableId> {
        self.execute(issuables, ctx)
            .into_iter()
            .map(|issuable| issuable.id)
            .collect()
    }
}

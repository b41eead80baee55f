//! Sort key resolution.
//!
//! Sort keys arrive as strings from callers. Keys with dedicated ordering
//! logic (milestone due date, vote tallies) route to their comparators;
//! plain field orders compare columns; anything unrecognized falls back to
//! `recent` (id descending). Every ordering ends with an id-descending
//! tie-break so results are deterministic.

use super::evaluator::QueryContext;
use super::milestone::{self, Direction};
use crate::domain::{Issuable, IssuableId};
use crate::votes;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

/// Plain column orderings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldOrder {
    IdDesc,
    IdAsc,
    CreatedDesc,
    CreatedAsc,
    UpdatedDesc,
    UpdatedAsc,
}

/// Resolved sort directive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    MilestoneDueAsc,
    MilestoneDueDesc,
    UpvotesDesc,
    DownvotesDesc,
    Field(FieldOrder),
}

/// Column included in the grouping key of an aggregating query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupingColumn {
    IssuableId,
    MilestoneId,
    MilestoneDueDate,
}

impl SortKey {
    /// Most recently created first.
    pub const RECENT: SortKey = SortKey::Field(FieldOrder::IdDesc);

    /// Parse a sort key, returning `None` for unrecognized keys.
    pub fn parse_strict(key: &str) -> Option<SortKey> {
        let key = match key.trim() {
            "milestone_due_asc" => SortKey::MilestoneDueAsc,
            "milestone_due_desc" => SortKey::MilestoneDueDesc,
            "upvotes_desc" => SortKey::UpvotesDesc,
            "downvotes_desc" => SortKey::DownvotesDesc,
            "recent" | "id_desc" => SortKey::RECENT,
            "id_asc" => SortKey::Field(FieldOrder::IdAsc),
            "created_desc" => SortKey::Field(FieldOrder::CreatedDesc),
            "created_asc" => SortKey::Field(FieldOrder::CreatedAsc),
            "updated_desc" => SortKey::Field(FieldOrder::UpdatedDesc),
            "updated_asc" => SortKey::Field(FieldOrder::UpdatedAsc),
            _ => return None,
        };
        Some(key)
    }

    /// Parse a sort key, degrading unknown keys to [`SortKey::RECENT`].
    pub fn parse(key: &str) -> SortKey {
        SortKey::parse_strict(key).unwrap_or_else(|| {
            tracing::warn!(sort = key, "unrecognized sort key, falling back to recent");
            SortKey::RECENT
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::MilestoneDueAsc => "milestone_due_asc",
            SortKey::MilestoneDueDesc => "milestone_due_desc",
            SortKey::UpvotesDesc => "upvotes_desc",
            SortKey::DownvotesDesc => "downvotes_desc",
            SortKey::Field(FieldOrder::IdDesc) => "id_desc",
            SortKey::Field(FieldOrder::IdAsc) => "id_asc",
            SortKey::Field(FieldOrder::CreatedDesc) => "created_desc",
            SortKey::Field(FieldOrder::CreatedAsc) => "created_asc",
            SortKey::Field(FieldOrder::UpdatedDesc) => "updated_desc",
            SortKey::Field(FieldOrder::UpdatedAsc) => "updated_asc",
        }
    }

    pub fn references_milestones(self) -> bool {
        matches!(self, SortKey::MilestoneDueAsc | SortKey::MilestoneDueDesc)
    }

    /// Reaction name tallied by vote sorts.
    pub fn reaction_name(self) -> Option<&'static str> {
        match self {
            SortKey::UpvotesDesc => Some(votes::UPVOTE),
            SortKey::DownvotesDesc => Some(votes::DOWNVOTE),
            _ => None,
        }
    }
}

impl Default for SortKey {
    fn default() -> Self {
        SortKey::RECENT
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Grouping key for an aggregating query under `sort`.
///
/// Always the issuable id; milestone id and due date are added when the
/// sort orders by milestone, since those columns appear in the ORDER BY of
/// a grouped query.
pub fn grouping_columns(sort: SortKey) -> Vec<GroupingColumn> {
    let mut columns = vec![GroupingColumn::IssuableId];
    if sort.references_milestones() {
        columns.push(GroupingColumn::MilestoneId);
        columns.push(GroupingColumn::MilestoneDueDate);
    }
    columns
}

/// Comparator for one sort key over a fixed result set.
pub struct Sorter<'a> {
    sort: SortKey,
    ctx: &'a QueryContext<'a>,
    tallies: HashMap<IssuableId, usize>,
}

impl<'a> Sorter<'a> {
    /// Prepare a comparator; vote sorts count reactions once per issuable.
    pub fn new(sort: SortKey, ctx: &'a QueryContext<'a>, issuables: &[&Issuable]) -> Self {
        let tallies = match sort.reaction_name() {
            Some(name) => votes::tally_by_id(issuables.iter().copied(), name),
            None => HashMap::new(),
        };
        Self { sort, ctx, tallies }
    }

    pub fn compare(&self, a: &Issuable, b: &Issuable) -> Ordering {
        let primary = match self.sort {
            SortKey::MilestoneDueAsc => {
                return milestone::compare(a, b, self.ctx, Direction::Asc);
            }
            SortKey::MilestoneDueDesc => {
                return milestone::compare(a, b, self.ctx, Direction::Desc);
            }
            SortKey::UpvotesDesc | SortKey::DownvotesDesc => {
                let tally = |i: &Issuable| self.tallies.get(&i.id).copied().unwrap_or(0);
                tally(b).cmp(&tally(a))
            }
            SortKey::Field(FieldOrder::IdDesc) => Ordering::Equal,
            SortKey::Field(FieldOrder::IdAsc) => a.id.cmp(&b.id),
            SortKey::Field(FieldOrder::CreatedDesc) => b.created_at.cmp(&a.created_at),
            SortKey::Field(FieldOrder::CreatedAsc) => a.created_at.cmp(&b.created_at),
            SortKey::Field(FieldOrder::UpdatedDesc) => b.updated_at.cmp(&a.updated_at),
            SortKey::Field(FieldOrder::UpdatedAsc) => a.updated_at.cmp(&b.updated_at),
        };
        primary.then_with(|| b.id.cmp(&a.id))
    }
}

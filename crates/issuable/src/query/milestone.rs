//! Ordering by milestone due date.
//!
//! Issuables with a dated milestone always come first, in either direction.
//! After them come issuables whose milestone has no due date, then
//! issuables without a milestone. Only the due-date component is reversed
//! for descending order.

use super::evaluator::QueryContext;
use crate::domain::Issuable;
use chrono::NaiveDate;
use std::cmp::Ordering;

/// Sort direction for the due-date component
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

/// Comparison key: `(milestone_missing, due_date_missing, due_date)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MilestoneKey {
    pub milestone_missing: bool,
    pub due_date_missing: bool,
    pub due_date: Option<NaiveDate>,
}

impl MilestoneKey {
    /// Resolve the key for an issuable.
    ///
    /// A milestone id that does not resolve behaves like no milestone, the
    /// same as an outer join finding no row.
    pub fn of(issuable: &Issuable, ctx: &QueryContext) -> Self {
        let milestone = issuable
            .milestone_id
            .and_then(|id| ctx.milestones.get(&id));

        match milestone {
            Some(milestone) => MilestoneKey {
                milestone_missing: false,
                due_date_missing: milestone.due_date.is_none(),
                due_date: milestone.due_date,
            },
            None => MilestoneKey {
                milestone_missing: true,
                due_date_missing: true,
                due_date: None,
            },
        }
    }
}

/// Compare two keys. Null groups sort last regardless of `direction`.
pub fn compare_keys(a: &MilestoneKey, b: &MilestoneKey, direction: Direction) -> Ordering {
    a.milestone_missing
        .cmp(&b.milestone_missing)
        .then_with(|| a.due_date_missing.cmp(&b.due_date_missing))
        .then_with(|| match direction {
            Direction::Asc => a.due_date.cmp(&b.due_date),
            Direction::Desc => b.due_date.cmp(&a.due_date),
        })
}

/// Compare two issuables by milestone due date, ties broken by id
/// descending.
pub fn compare(a: &Issuable, b: &Issuable, ctx: &QueryContext, direction: Direction) -> Ordering {
    compare_keys(&MilestoneKey::of(a, ctx), &MilestoneKey::of(b, ctx), direction)
        .then_with(|| b.id.cmp(&a.id))
}

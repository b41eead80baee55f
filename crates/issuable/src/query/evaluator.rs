//! Evaluator for resolved predicates against issuables
//!
//! This layer holds the matching rules for each filter dimension. Labels and
//! milestones live outside the issuable record, so evaluation takes a
//! [`QueryContext`] indexing them by id.

use super::filter::{AssigneeFilter, TextScope};
use crate::domain::{
    Issuable, IssuableKind, Label, LabelId, Milestone, MilestoneId, ProjectId, State, UserId,
};
use crate::labels::{self, LabelFilter};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

/// Lookup tables needed for evaluating predicates
pub struct QueryContext<'a> {
    pub labels: HashMap<LabelId, &'a Label>,
    pub milestones: HashMap<MilestoneId, &'a Milestone>,
}

impl<'a> QueryContext<'a> {
    /// Create context from label and milestone collections
    pub fn new(labels: &'a [Label], milestones: &'a [Milestone]) -> Self {
        QueryContext {
            labels: labels.iter().map(|l| (l.id, l)).collect(),
            milestones: milestones.iter().map(|m| (m.id, m)).collect(),
        }
    }
}

/// One resolved filter dimension; a query matches when all of its
/// predicates match
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Predicate {
    /// Excludes soft-deleted records
    NotDeleted,
    /// Case-insensitive substring; `needle` is stored lowercased
    Text { needle: String, scope: TextScope },
    Labels { filter: LabelFilter },
    Assignee { filter: AssigneeFilter },
    Author { user_id: UserId },
    MilestoneIn { ids: BTreeSet<MilestoneId> },
    MilestoneTitle { title: String },
    ProjectIn { ids: BTreeSet<ProjectId> },
    StateIn { states: BTreeSet<State> },
    Kind { kind: IssuableKind },
}

impl Predicate {
    /// Check if an issuable satisfies this predicate
    pub fn matches(&self, issuable: &Issuable, ctx: &QueryContext) -> bool {
        match self {
            Predicate::NotDeleted => !issuable.is_deleted(),

            Predicate::Text { needle, scope } => {
                contains_ignore_case(&issuable.title, needle)
                    || (*scope == TextScope::TitleAndDescription
                        && contains_ignore_case(&issuable.description, needle))
            }

            Predicate::Labels { filter } => {
                filter.matches(&labels::attached_titles(issuable, &ctx.labels))
            }

            Predicate::Assignee { filter } => match filter {
                AssigneeFilter::User(user_id) => issuable.assignee_id == Some(*user_id),
                AssigneeFilter::Unassigned => issuable.assignee_id.is_none(),
                AssigneeFilter::Assigned => issuable.assignee_id.is_some(),
            },

            Predicate::Author { user_id } => issuable.author_id == *user_id,

            Predicate::MilestoneIn { ids } => issuable
                .milestone_id
                .map(|id| ids.contains(&id))
                .unwrap_or(false),

            Predicate::MilestoneTitle { title } => issuable
                .milestone_id
                .and_then(|id| ctx.milestones.get(&id))
                .map(|milestone| milestone.title == *title)
                .unwrap_or(false),

            Predicate::ProjectIn { ids } => ids.contains(&issuable.project_id),

            Predicate::StateIn { states } => states.contains(&issuable.state),

            Predicate::Kind { kind } => issuable.kind == *kind,
        }
    }
}

fn contains_ignore_case(haystack: &str, lowercase_needle: &str) -> bool {
    haystack.to_lowercase().contains(lowercase_needle)
}

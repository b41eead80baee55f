//! Filter specification supplied by callers.
//!
//! Every field is optional; supplied fields are ANDed together. Builder
//! methods mirror the named scopes callers are used to (`opened`,
//! `unassigned`, `with_milestone`, ...) so a filter reads like a chain of
//! scopes but carries no hidden query state.

use crate::domain::{IssuableKind, MilestoneId, ProjectId, State, UserId};
use crate::labels::LabelFilter;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Which fields a text query looks at
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextScope {
    /// `search`: title only
    #[default]
    Title,
    /// `full_search`: title or description
    TitleAndDescription,
}

/// Assignment constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssigneeFilter {
    /// Assigned to this user
    User(UserId),
    /// No assignee
    Unassigned,
    /// Any assignee
    Assigned,
}

/// Query specification over issuables
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuableFilter {
    /// Substring to look for; empty means no text filter
    pub text_query: Option<String>,
    #[serde(default)]
    pub text_scope: TextScope,
    pub labels: Option<LabelFilter>,
    pub assignee: Option<AssigneeFilter>,
    pub author_id: Option<UserId>,
    pub milestone_ids: Option<BTreeSet<MilestoneId>>,
    pub milestone_title: Option<String>,
    pub project_ids: Option<BTreeSet<ProjectId>>,
    pub states: Option<BTreeSet<State>>,
    pub kind: Option<IssuableKind>,
    /// Raw sort key; unknown keys degrade to `recent`
    pub sort: Option<String>,
}

impl IssuableFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Match `query` against titles.
    pub fn search(mut self, query: impl Into<String>) -> Self {
        self.text_query = Some(query.into());
        self.text_scope = TextScope::Title;
        self
    }

    /// Match `query` against titles or descriptions.
    pub fn full_search(mut self, query: impl Into<String>) -> Self {
        self.text_query = Some(query.into());
        self.text_scope = TextScope::TitleAndDescription;
        self
    }

    /// Require every named label. An empty list clears the label filter.
    pub fn with_labels<I, T>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.labels = LabelFilter::all(names);
        self
    }

    pub fn without_label(mut self) -> Self {
        self.labels = Some(LabelFilter::Without);
        self
    }

    pub fn assigned_to(mut self, user_id: UserId) -> Self {
        self.assignee = Some(AssigneeFilter::User(user_id));
        self
    }

    pub fn unassigned(mut self) -> Self {
        self.assignee = Some(AssigneeFilter::Unassigned);
        self
    }

    pub fn assigned(mut self) -> Self {
        self.assignee = Some(AssigneeFilter::Assigned);
        self
    }

    pub fn authored(mut self, user_id: UserId) -> Self {
        self.author_id = Some(user_id);
        self
    }

    pub fn of_milestones<I: IntoIterator<Item = MilestoneId>>(mut self, ids: I) -> Self {
        self.milestone_ids = Some(ids.into_iter().collect());
        self
    }

    pub fn with_milestone(mut self, title: impl Into<String>) -> Self {
        self.milestone_title = Some(title.into());
        self
    }

    pub fn of_projects<I: IntoIterator<Item = ProjectId>>(mut self, ids: I) -> Self {
        self.project_ids = Some(ids.into_iter().collect());
        self
    }

    pub fn with_states<I: IntoIterator<Item = State>>(mut self, states: I) -> Self {
        self.states = Some(states.into_iter().collect());
        self
    }

    /// `opened` or `reopened`
    pub fn opened(self) -> Self {
        self.with_states(State::OPEN)
    }

    pub fn only_opened(self) -> Self {
        self.with_states([State::Opened])
    }

    pub fn only_reopened(self) -> Self {
        self.with_states([State::Reopened])
    }

    pub fn closed(self) -> Self {
        self.with_states([State::Closed])
    }

    pub fn of_kind(mut self, kind: IssuableKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn sort(mut self, key: impl Into<String>) -> Self {
        self.sort = Some(key.into());
        self
    }

    /// Most recently created first.
    pub fn recent(self) -> Self {
        self.sort("recent")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sets_fields() {
        let filter = IssuableFilter::new()
            .full_search("crash")
            .with_labels(["bug", "p1"])
            .unassigned()
            .opened()
            .of_projects([1, 2])
            .sort("upvotes_desc");

        assert_eq!(filter.text_query.as_deref(), Some("crash"));
        assert_eq!(filter.text_scope, TextScope::TitleAndDescription);
        assert!(matches!(filter.labels, Some(LabelFilter::All(ref names)) if names.len() == 2));
        assert_eq!(filter.assignee, Some(AssigneeFilter::Unassigned));
        assert_eq!(
            filter.states,
            Some([State::Opened, State::Reopened].into_iter().collect())
        );
        assert_eq!(filter.sort.as_deref(), Some("upvotes_desc"));
    }

    #[test]
    fn test_empty_label_list_clears_label_filter() {
        let filter = IssuableFilter::new()
            .without_label()
            .with_labels(Vec::<String>::new());
        assert_eq!(filter.labels, None);
    }

    #[test]
    fn test_filter_deserializes_from_json() {
        let filter: IssuableFilter = serde_json::from_str(
            r#"{"text_query": "login", "assignee": "unassigned", "sort": "milestone_due_asc"}"#,
        )
        .unwrap();
        assert_eq!(filter.text_query.as_deref(), Some("login"));
        assert_eq!(filter.text_scope, TextScope::Title);
        assert_eq!(filter.assignee, Some(AssigneeFilter::Unassigned));
    }
}

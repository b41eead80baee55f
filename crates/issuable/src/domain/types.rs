//! Core data structures shared by issues and merge requests.

use super::state::State;
use crate::errors::{IssuableError, Result};
use crate::votes;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

pub type IssuableId = u64;
pub type UserId = u64;
pub type ProjectId = u64;
pub type LabelId = u64;
pub type MilestoneId = u64;
pub type NoteId = u64;

/// Maximum title length in characters (Unicode scalar values).
pub const TITLE_MAX_LENGTH: usize = 255;

/// Concrete entity type sharing the issuable behaviour
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssuableKind {
    #[default]
    Issue,
    MergeRequest,
}

impl fmt::Display for IssuableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssuableKind::Issue => f.write_str("issue"),
            IssuableKind::MergeRequest => f.write_str("merge_request"),
        }
    }
}

impl FromStr for IssuableKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "issue" => Ok(IssuableKind::Issue),
            "merge_request" | "mr" => Ok(IssuableKind::MergeRequest),
            _ => Err(format!(
                "Invalid kind: '{}'. Expected one of: issue, merge_request",
                s
            )),
        }
    }
}

/// What a note represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteKind {
    /// Comment written by a user
    Comment,
    /// Award reaction; the body carries the reaction name (e.g. "thumbsup")
    Award,
    /// Generated by the system (state changes, label events)
    System,
}

/// A comment or reaction attached to one issuable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Identifier, unique within the owning issuable
    pub id: NoteId,
    pub author_id: UserId,
    pub kind: NoteKind,
    /// Comment text, or the reaction name for awards
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl Note {
    pub fn is_award(&self) -> bool {
        self.kind == NoteKind::Award
    }

    /// User-authored comment (not an award, not a system note)
    pub fn is_user_comment(&self) -> bool {
        self.kind == NoteKind::Comment
    }
}

/// A project-scoped label; titles are unique within a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub id: LabelId,
    pub project_id: ProjectId,
    pub title: String,
    /// Hex color, e.g. "#428BCA"
    pub color: String,
}

/// A milestone an issuable may be scheduled into
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    pub id: MilestoneId,
    pub project_id: ProjectId,
    pub title: String,
    pub due_date: Option<NaiveDate>,
}

/// An issue or merge request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issuable {
    /// Store-assigned identifier; higher means created later
    pub id: IssuableId,
    pub kind: IssuableKind,
    pub project_id: ProjectId,
    /// Short summary, stripped, 1..=255 characters
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub state: State,
    pub author_id: UserId,
    pub assignee_id: Option<UserId>,
    pub milestone_id: Option<MilestoneId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Set when soft-deleted; deleted issuables never appear in queries
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
    /// Attached labels (set semantics)
    #[serde(default)]
    pub label_ids: BTreeSet<LabelId>,
    #[serde(default)]
    pub notes: Vec<Note>,
}

impl Issuable {
    /// True for `opened` and `reopened`.
    pub fn is_open(&self) -> bool {
        self.state.is_open()
    }

    pub fn is_closed(&self) -> bool {
        self.state.is_closed()
    }

    pub fn is_assigned(&self) -> bool {
        self.assignee_id.is_some()
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Count of award notes named "thumbsup".
    pub fn upvotes(&self) -> usize {
        votes::tally(&self.notes, votes::UPVOTE)
    }

    /// Count of award notes named "thumbsdown".
    pub fn downvotes(&self) -> usize {
        votes::tally(&self.notes, votes::DOWNVOTE)
    }

    /// Number of user comments, excluding awards and system notes.
    pub fn user_notes_count(&self) -> usize {
        self.notes.iter().filter(|n| n.is_user_comment()).count()
    }

    /// Created on the same UTC calendar day as `now`.
    pub fn is_today_at(&self, now: DateTime<Utc>) -> bool {
        self.created_at.date_naive() == now.date_naive()
    }

    /// Created today (UTC) and never updated since.
    pub fn is_new_at(&self, now: DateTime<Utc>) -> bool {
        self.is_today_at(now) && self.created_at == self.updated_at
    }

    pub fn is_today(&self) -> bool {
        self.is_today_at(Utc::now())
    }

    pub fn is_new_today(&self) -> bool {
        self.is_new_at(Utc::now())
    }

    pub fn next_note_id(&self) -> NoteId {
        self.notes.iter().map(|n| n.id).max().unwrap_or(0) + 1
    }
}

/// Strip a title and check it against the length rules.
///
/// Returns the stripped title on success.
pub fn validate_title(title: &str) -> Result<String> {
    let stripped = title.trim();
    if stripped.is_empty() {
        return Err(IssuableError::validation("title", "can't be blank"));
    }
    let length = stripped.chars().count();
    if length > TITLE_MAX_LENGTH {
        return Err(IssuableError::validation(
            "title",
            format!(
                "is too long ({} characters, maximum is {})",
                length, TITLE_MAX_LENGTH
            ),
        ));
    }
    Ok(stripped.to_string())
}

/// Input for creating an issuable
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewIssuable {
    pub kind: IssuableKind,
    pub project_id: ProjectId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub author_id: Option<UserId>,
    pub assignee_id: Option<UserId>,
    pub milestone_id: Option<MilestoneId>,
}

impl NewIssuable {
    pub fn new(project_id: ProjectId, title: impl Into<String>, author_id: UserId) -> Self {
        Self {
            project_id,
            title: title.into(),
            author_id: Some(author_id),
            ..Self::default()
        }
    }

    pub fn with_kind(mut self, kind: IssuableKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_assignee(mut self, assignee_id: UserId) -> Self {
        self.assignee_id = Some(assignee_id);
        self
    }

    pub fn with_milestone(mut self, milestone_id: MilestoneId) -> Self {
        self.milestone_id = Some(milestone_id);
        self
    }

    /// Validate and build the record; the store assigns the final id.
    pub fn build(self, now: DateTime<Utc>) -> Result<Issuable> {
        let title = validate_title(&self.title)?;
        let author_id = self
            .author_id
            .ok_or_else(|| IssuableError::validation("author", "must be present"))?;

        Ok(Issuable {
            id: 0,
            kind: self.kind,
            project_id: self.project_id,
            title,
            description: self.description,
            state: State::Opened,
            author_id,
            assignee_id: self.assignee_id,
            milestone_id: self.milestone_id,
            created_at: now,
            updated_at: now,
            deleted_at: None,
            label_ids: BTreeSet::new(),
            notes: Vec::new(),
        })
    }
}

/// Partial update; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssuableUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    /// `Some(None)` unassigns
    pub assignee_id: Option<Option<UserId>>,
    /// `Some(None)` clears the milestone
    pub milestone_id: Option<Option<MilestoneId>>,
}

impl IssuableUpdate {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn assignee(mut self, assignee_id: Option<UserId>) -> Self {
        self.assignee_id = Some(assignee_id);
        self
    }

    pub fn milestone(mut self, milestone_id: Option<MilestoneId>) -> Self {
        self.milestone_id = Some(milestone_id);
        self
    }

    /// Apply to an issuable. Returns true if any field changed.
    ///
    /// The title must already have been validated.
    pub fn apply_to(&self, issuable: &mut Issuable) -> bool {
        let mut changed = false;
        if let Some(title) = &self.title {
            changed |= replace_if_different(&mut issuable.title, title.clone());
        }
        if let Some(description) = &self.description {
            changed |= replace_if_different(&mut issuable.description, description.clone());
        }
        if let Some(assignee_id) = self.assignee_id {
            changed |= replace_if_different(&mut issuable.assignee_id, assignee_id);
        }
        if let Some(milestone_id) = self.milestone_id {
            changed |= replace_if_different(&mut issuable.milestone_id, milestone_id);
        }
        changed
    }
}

fn replace_if_different<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn issuable_created_at(created_at: DateTime<Utc>) -> Issuable {
        NewIssuable::new(1, "Fix login bug", 7)
            .build(created_at)
            .unwrap()
    }

    fn award(id: NoteId, name: &str) -> Note {
        Note {
            id,
            author_id: 1,
            kind: NoteKind::Award,
            body: name.to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_new_issuable_defaults() {
        let issuable = issuable_created_at(Utc::now());
        assert_eq!(issuable.state, State::Opened);
        assert_eq!(issuable.kind, IssuableKind::Issue);
        assert_eq!(issuable.author_id, 7);
        assert!(issuable.assignee_id.is_none());
        assert!(issuable.label_ids.is_empty());
        assert!(issuable.is_open());
        assert!(!issuable.is_assigned());
    }

    #[test]
    fn test_title_is_stripped() {
        let issuable = NewIssuable::new(1, "  Padded title \n", 1)
            .build(Utc::now())
            .unwrap();
        assert_eq!(issuable.title, "Padded title");
    }

    #[test]
    fn test_blank_title_rejected() {
        let err = NewIssuable::new(1, "   ", 1).build(Utc::now()).unwrap_err();
        assert_eq!(err.field(), Some("title"));
    }

    #[test]
    fn test_title_length_counts_characters() {
        let at_limit = "é".repeat(TITLE_MAX_LENGTH);
        assert!(validate_title(&at_limit).is_ok());

        let over_limit = "a".repeat(TITLE_MAX_LENGTH + 1);
        let err = validate_title(&over_limit).unwrap_err();
        assert_eq!(err.field(), Some("title"));
        assert!(err.to_string().contains("too long"));
    }

    #[test]
    fn test_missing_author_rejected() {
        let mut new = NewIssuable::new(1, "Title", 1);
        new.author_id = None;
        let err = new.build(Utc::now()).unwrap_err();
        assert_eq!(err.field(), Some("author"));
    }

    #[test]
    fn test_new_today_requires_untouched_record() {
        let now = Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap();
        let mut issuable = issuable_created_at(now - Duration::hours(2));
        assert!(issuable.is_today_at(now));
        assert!(issuable.is_new_at(now));

        issuable.updated_at = now;
        assert!(issuable.is_today_at(now));
        assert!(!issuable.is_new_at(now));
    }

    #[test]
    fn test_new_today_uses_utc_day_boundary() {
        let now = Utc.with_ymd_and_hms(2026, 3, 14, 0, 30, 0).unwrap();
        let yesterday_late = Utc.with_ymd_and_hms(2026, 3, 13, 23, 59, 0).unwrap();
        let issuable = issuable_created_at(yesterday_late);
        assert!(!issuable.is_today_at(now));
        assert!(!issuable.is_new_at(now));
    }

    #[test]
    fn test_vote_accessors() {
        let mut issuable = issuable_created_at(Utc::now());
        issuable.notes = vec![
            award(1, "thumbsup"),
            award(2, "thumbsup"),
            award(3, "thumbsdown"),
            award(4, "Thumbsup"),
        ];
        assert_eq!(issuable.upvotes(), 2);
        assert_eq!(issuable.downvotes(), 1);
    }

    #[test]
    fn test_user_notes_count_excludes_awards_and_system_notes() {
        let mut issuable = issuable_created_at(Utc::now());
        issuable.notes = vec![
            award(1, "thumbsup"),
            Note {
                id: 2,
                author_id: 1,
                kind: NoteKind::Comment,
                body: "Looks good".to_string(),
                created_at: Utc::now(),
            },
            Note {
                id: 3,
                author_id: 1,
                kind: NoteKind::System,
                body: "closed".to_string(),
                created_at: Utc::now(),
            },
        ];
        assert_eq!(issuable.user_notes_count(), 1);
        assert_eq!(issuable.next_note_id(), 4);
    }

    #[test]
    fn test_update_reports_changes() {
        let mut issuable = issuable_created_at(Utc::now());

        let unchanged = IssuableUpdate::default().title("Fix login bug");
        assert!(!unchanged.apply_to(&mut issuable));

        let reassign = IssuableUpdate::default().assignee(Some(3));
        assert!(reassign.apply_to(&mut issuable));
        assert_eq!(issuable.assignee_id, Some(3));

        let unassign = IssuableUpdate::default().assignee(None);
        assert!(unassign.apply_to(&mut issuable));
        assert_eq!(issuable.assignee_id, None);
    }

    #[test]
    fn test_kind_parsing() {
        assert_eq!(
            "merge-request".parse::<IssuableKind>().unwrap(),
            IssuableKind::MergeRequest
        );
        assert_eq!("issue".parse::<IssuableKind>().unwrap(), IssuableKind::Issue);
        assert!("epic".parse::<IssuableKind>().is_err());
    }
}

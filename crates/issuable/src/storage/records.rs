//! Backend-independent record set.
//!
//! Both bundled backends hold the same data: the in-memory store keeps a
//! `Records` behind a lock, the JSON store serializes one to disk. All
//! uniqueness and id-assignment rules live here so the backends only
//! differ in how they guard access.

use super::{Change, StoreSnapshot};
use crate::domain::{Issuable, IssuableId, Label, LabelId, Milestone, MilestoneId, ProjectId};
use crate::errors::StoreError;
use anyhow::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Last id handed out per table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequences {
    pub issuable: IssuableId,
    pub label: LabelId,
    pub milestone: MilestoneId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Records {
    /// Schema version for future migrations
    pub schema_version: u32,
    pub sequences: Sequences,
    pub issuables: BTreeMap<IssuableId, Issuable>,
    pub labels: BTreeMap<LabelId, Label>,
    pub milestones: BTreeMap<MilestoneId, Milestone>,
}

impl Default for Records {
    fn default() -> Self {
        Self {
            schema_version: 1,
            sequences: Sequences::default(),
            issuables: BTreeMap::new(),
            labels: BTreeMap::new(),
            milestones: BTreeMap::new(),
        }
    }
}

impl Records {
    pub fn insert_issuable(&mut self, mut issuable: Issuable) -> Issuable {
        self.sequences.issuable += 1;
        issuable.id = self.sequences.issuable;
        self.issuables.insert(issuable.id, issuable.clone());
        issuable
    }

    pub fn update_issuable<F>(&mut self, id: IssuableId, mutate: F) -> Option<Change>
    where
        F: FnOnce(&mut Issuable),
    {
        let current = self.issuables.get_mut(&id)?;
        let before = current.clone();
        mutate(current);
        // The id is the primary key; a mutation must not move the record.
        current.id = id;
        Some(Change {
            before,
            after: current.clone(),
        })
    }

    pub fn find_label(&self, project_id: ProjectId, title: &str) -> Option<&Label> {
        self.labels
            .values()
            .find(|label| label.project_id == project_id && label.title == title)
    }

    /// Insert a label, enforcing `(project_id, title)` uniqueness.
    pub fn create_label(&mut self, project_id: ProjectId, title: &str, color: &str) -> Result<Label> {
        if self.find_label(project_id, title).is_some() {
            return Err(StoreError::DuplicateLabel {
                project_id,
                title: title.to_string(),
            }
            .into());
        }
        self.sequences.label += 1;
        let label = Label {
            id: self.sequences.label,
            project_id,
            title: title.to_string(),
            color: color.to_string(),
        };
        self.labels.insert(label.id, label.clone());
        Ok(label)
    }

    pub fn create_milestone(
        &mut self,
        project_id: ProjectId,
        title: &str,
        due_date: Option<NaiveDate>,
    ) -> Milestone {
        self.sequences.milestone += 1;
        let milestone = Milestone {
            id: self.sequences.milestone,
            project_id,
            title: title.to_string(),
            due_date,
        };
        self.milestones.insert(milestone.id, milestone.clone());
        milestone
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            issuables: self.issuables.values().cloned().collect(),
            labels: self.labels.values().cloned().collect(),
            milestones: self.milestones.values().cloned().collect(),
        }
    }
}

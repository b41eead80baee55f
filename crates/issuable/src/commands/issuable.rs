//! Issuable creation, updates, assignment and lifecycle

use super::*;
use crate::domain::{
    validate_title, IssuableUpdate, Milestone, MilestoneId, NewIssuable, ProjectId, Transition,
    UserId,
};
use chrono::{NaiveDate, Utc};
use serde::Serialize;

/// Outcome of a state transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transitioned {
    pub issuable: Issuable,
    /// False when the transition was not applicable (already closed, ...)
    pub changed: bool,
}

impl<S: IssuableStore, C: AssigneeCache> CommandExecutor<S, C> {
    /// Validate and persist a new issuable.
    ///
    /// Creating with an assignee counts as an assignee change from
    /// "unassigned", so the assignee's cached counts are refreshed.
    pub fn create_issuable(&self, new: NewIssuable) -> Result<Issuable> {
        if let Some(milestone_id) = new.milestone_id {
            self.require_milestone(milestone_id)?;
        }

        let draft = new.build(Utc::now())?;
        let issuable = self.storage.insert_issuable(draft)?;
        tracing::debug!(id = issuable.id, kind = %issuable.kind, "created issuable");

        if issuable.assignee_id.is_some() {
            assignee_cache::invalidate(&self.cache, None, issuable.assignee_id);
        }
        Ok(issuable)
    }

    /// Apply a partial update.
    ///
    /// The title is validated before anything is written; `updated_at` only
    /// moves when a field actually changes.
    pub fn update_issuable(&self, id: IssuableId, update: IssuableUpdate) -> Result<Issuable> {
        let mut update = update;
        if let Some(title) = update.title.take() {
            update.title = Some(validate_title(&title)?);
        }
        if let Some(Some(milestone_id)) = update.milestone_id {
            self.require_milestone(milestone_id)?;
        }

        let now = Utc::now();
        let change = self.commit(id, |issuable| {
            if update.apply_to(issuable) {
                issuable.updated_at = now;
            }
        })?;
        Ok(change.after)
    }

    /// Set or clear the assignee.
    pub fn assign(&self, id: IssuableId, assignee_id: Option<UserId>) -> Result<Issuable> {
        self.update_issuable(id, IssuableUpdate::default().assignee(assignee_id))
    }

    /// Apply a lifecycle transition.
    ///
    /// Transitions that are not defined for the current state are no-ops:
    /// nothing is written and no hooks fire.
    pub fn transition(&self, id: IssuableId, transition: Transition) -> Result<Transitioned> {
        let now = Utc::now();
        let change = self.commit(id, |issuable| {
            if let Some(next) = issuable.state.apply(transition) {
                issuable.state = next;
                issuable.updated_at = now;
            }
        })?;

        let changed = change.before.state != change.after.state;
        if !changed {
            tracing::debug!(id, ?transition, state = %change.after.state, "transition not applicable");
        }
        Ok(Transitioned {
            issuable: change.after,
            changed,
        })
    }

    pub fn close(&self, id: IssuableId) -> Result<Transitioned> {
        self.transition(id, Transition::Close)
    }

    pub fn reopen(&self, id: IssuableId) -> Result<Transitioned> {
        self.transition(id, Transition::Reopen)
    }

    /// Mark an issuable deleted. Deleting twice keeps the first timestamp.
    pub fn soft_delete(&self, id: IssuableId) -> Result<Issuable> {
        let now = Utc::now();
        let change = self.commit(id, |issuable| {
            if issuable.deleted_at.is_none() {
                issuable.deleted_at = Some(now);
            }
        })?;
        Ok(change.after)
    }

    pub fn create_milestone(
        &self,
        project_id: ProjectId,
        title: &str,
        due_date: Option<NaiveDate>,
    ) -> Result<Milestone> {
        let title = title.trim();
        if title.is_empty() {
            return Err(IssuableError::validation("title", "can't be blank"));
        }
        Ok(self.storage.create_milestone(project_id, title, due_date)?)
    }

    fn require_milestone(&self, id: MilestoneId) -> Result<Milestone> {
        self.storage
            .get_milestone(id)?
            .ok_or_else(|| IssuableError::not_found("milestone", id))
    }
}

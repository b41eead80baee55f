//! Label operations

use super::*;
use crate::domain::{Label, ProjectId};
use crate::errors::StoreError;
use crate::labels::normalize_label_names;
use std::collections::HashMap;

impl<S: IssuableStore, C: AssigneeCache> CommandExecutor<S, C> {
    /// Attach labels to an issuable by title, creating missing ones in the
    /// issuable's project.
    ///
    /// Names are trimmed; blank names are skipped and duplicates collapse.
    /// Attaching a label that is already present changes nothing. Returns
    /// the labels named by the call, in first-seen order.
    pub fn add_labels_by_names<I, T>(&self, id: IssuableId, names: I) -> Result<Vec<Label>>
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let issuable = self.show_issuable(id)?;
        let names = normalize_label_names(names);
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let labels = names
            .iter()
            .map(|name| self.find_or_create_label(issuable.project_id, name))
            .collect::<Result<Vec<_>>>()?;

        self.commit(id, |issuable| {
            issuable.label_ids.extend(labels.iter().map(|l| l.id));
        })?;
        Ok(labels)
    }

    /// Detach every label from an issuable. The labels themselves remain.
    pub fn remove_labels(&self, id: IssuableId) -> Result<()> {
        self.commit(id, |issuable| issuable.label_ids.clear())?;
        Ok(())
    }

    /// Titles of the labels attached to an issuable, sorted.
    pub fn label_names(&self, id: IssuableId) -> Result<Vec<String>> {
        let issuable = self.show_issuable(id)?;
        let snapshot = self.storage.snapshot()?;
        let by_id: HashMap<_, _> = snapshot.labels.iter().map(|l| (l.id, l)).collect();

        let mut names: Vec<String> = issuable
            .label_ids
            .iter()
            .filter_map(|label_id| by_id.get(label_id))
            .map(|label| label.title.clone())
            .collect();
        names.sort();
        Ok(names)
    }

    /// Look a label up by title, creating it if absent.
    ///
    /// A concurrent creator may win the race between the lookup and the
    /// insert; the uniqueness failure is then resolved by reading the
    /// winner's label back.
    pub fn find_or_create_label(&self, project_id: ProjectId, title: &str) -> Result<Label> {
        if let Some(label) = self.storage.find_label(project_id, title)? {
            return Ok(label);
        }

        match self.storage.create_label(project_id, title, &self.label_color) {
            Ok(label) => {
                tracing::info!(project_id, title, label_id = label.id, "created label");
                Ok(label)
            }
            Err(err) if err.downcast_ref::<StoreError>().is_some() => {
                tracing::warn!(project_id, title, "label created concurrently, retrying lookup");
                self.storage
                    .find_label(project_id, title)?
                    .ok_or_else(|| IssuableError::Store(err))
            }
            Err(err) => Err(err.into()),
        }
    }
}

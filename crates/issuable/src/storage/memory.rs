//! In-memory storage implementation.
//!
//! This backend keeps all records in RAM behind a read-write lock. Each
//! instance is isolated, making it ideal for tests and for embedding the
//! engine in a process that owns its data.

use super::records::Records;
use super::{Change, IssuableStore, StoreSnapshot};
use crate::domain::{Issuable, IssuableId, Label, Milestone, MilestoneId, ProjectId};
use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// In-memory storage backend.
///
/// All data is lost when the last clone is dropped. Uses `Arc<RwLock<>>` so
/// clones share the same data and can be used from several threads; every
/// read-modify-write runs under the write lock, which is what makes label
/// creation and issuable updates atomic.
///
/// # Examples
///
/// ```
/// use issuable::storage::{InMemoryStorage, IssuableStore};
///
/// let storage = InMemoryStorage::new();
/// storage.init().unwrap();
///
/// let label = storage.create_label(1, "bug", "#428BCA").unwrap();
/// assert_eq!(storage.find_label(1, "bug").unwrap(), Some(label));
/// ```
#[derive(Clone, Default)]
pub struct InMemoryStorage {
    records: Arc<RwLock<Records>>,
}

impl InMemoryStorage {
    /// Create a new in-memory storage instance.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Records>> {
        self.records
            .read()
            .map_err(|_| anyhow!("In-memory storage lock poisoned"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Records>> {
        self.records
            .write()
            .map_err(|_| anyhow!("In-memory storage lock poisoned"))
    }
}

impl IssuableStore for InMemoryStorage {
    fn init(&self) -> Result<()> {
        // No initialization needed for in-memory storage
        Ok(())
    }

    fn insert_issuable(&self, issuable: Issuable) -> Result<Issuable> {
        Ok(self.write()?.insert_issuable(issuable))
    }

    fn get_issuable(&self, id: IssuableId) -> Result<Option<Issuable>> {
        Ok(self.read()?.issuables.get(&id).cloned())
    }

    fn update_issuable<F>(&self, id: IssuableId, mutate: F) -> Result<Option<Change>>
    where
        F: FnOnce(&mut Issuable),
    {
        Ok(self.write()?.update_issuable(id, mutate))
    }

    fn find_label(&self, project_id: ProjectId, title: &str) -> Result<Option<Label>> {
        Ok(self.read()?.find_label(project_id, title).cloned())
    }

    fn create_label(&self, project_id: ProjectId, title: &str, color: &str) -> Result<Label> {
        self.write()?.create_label(project_id, title, color)
    }

    fn create_milestone(
        &self,
        project_id: ProjectId,
        title: &str,
        due_date: Option<NaiveDate>,
    ) -> Result<Milestone> {
        Ok(self.write()?.create_milestone(project_id, title, due_date))
    }

    fn get_milestone(&self, id: MilestoneId) -> Result<Option<Milestone>> {
        Ok(self.read()?.milestones.get(&id).cloned())
    }

    fn snapshot(&self) -> Result<StoreSnapshot> {
        Ok(self.read()?.snapshot())
    }
}

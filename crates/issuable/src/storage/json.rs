//! JSON file-based storage implementation.
//!
//! All records live in a single `data/store.json` document. Writes are
//! atomic (write to temp file, then rename) and every read-modify-write
//! holds an exclusive lock on `data/store.lock`, so concurrent processes
//! cannot interleave partial updates or create duplicate labels.

use super::lock::FileLocker;
use super::records::Records;
use super::{Change, IssuableStore, StoreSnapshot};
use crate::domain::{Issuable, IssuableId, Label, Milestone, MilestoneId, ProjectId};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DATA_DIR: &str = "data";
const STORE_FILE: &str = "data/store.json";
const LOCK_FILE: &str = "data/store.lock";

/// Bound on waiting for another process to release the store
const LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// JSON file storage rooted at a data directory.
#[derive(Clone)]
pub struct JsonFileStorage {
    root: PathBuf,
    locker: FileLocker,
}

impl JsonFileStorage {
    /// Create a new JSON file storage instance at the given root path
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            locker: FileLocker::new(LOCK_TIMEOUT),
        }
    }

    /// Check that the store has been initialized
    pub fn validate(&self) -> Result<()> {
        let store_path = self.root.join(STORE_FILE);
        if !store_path.exists() {
            anyhow::bail!("Store not initialized: {} not found", store_path.display());
        }
        Ok(())
    }

    fn read_records(&self) -> Result<Records> {
        let path = self.root.join(STORE_FILE);
        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {}", path.display()))?;
        serde_json::from_str(&contents).context("Failed to deserialize store")
    }

    fn write_records(&self, records: &Records) -> Result<()> {
        let path = self.root.join(STORE_FILE);
        let json = serde_json::to_string_pretty(records).context("Failed to serialize store")?;

        // Atomic write: write to temp file, then rename
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, json).context("Failed to write temporary file")?;
        fs::rename(&temp_path, &path).context("Failed to rename temporary file")?;
        Ok(())
    }

    /// Run `f` against the records under the shared lock.
    fn read_locked<T>(&self, f: impl FnOnce(&Records) -> T) -> Result<T> {
        let _guard = self.locker.lock_shared(&self.root.join(LOCK_FILE))?;
        let records = self.read_records()?;
        Ok(f(&records))
    }

    /// Run `f` against the records under the exclusive lock, persisting
    /// them afterwards only if `f` reports a modification.
    fn write_locked<T>(&self, f: impl FnOnce(&mut Records) -> Result<(T, bool)>) -> Result<T> {
        let _guard = self.locker.lock_exclusive(&self.root.join(LOCK_FILE))?;
        let mut records = self.read_records()?;
        let (value, modified) = f(&mut records)?;
        if modified {
            self.write_records(&records)?;
        }
        Ok(value)
    }
}

impl IssuableStore for JsonFileStorage {
    fn init(&self) -> Result<()> {
        fs::create_dir_all(self.root.join(DATA_DIR)).context("Failed to create data directory")?;

        let _guard = self.locker.lock_exclusive(&self.root.join(LOCK_FILE))?;
        if !self.root.join(STORE_FILE).exists() {
            self.write_records(&Records::default())?;
        }
        Ok(())
    }

    fn insert_issuable(&self, issuable: Issuable) -> Result<Issuable> {
        self.write_locked(|records| Ok((records.insert_issuable(issuable), true)))
    }

    fn get_issuable(&self, id: IssuableId) -> Result<Option<Issuable>> {
        self.read_locked(|records| records.issuables.get(&id).cloned())
    }

    fn update_issuable<F>(&self, id: IssuableId, mutate: F) -> Result<Option<Change>>
    where
        F: FnOnce(&mut Issuable),
    {
        self.write_locked(|records| {
            let change = records.update_issuable(id, mutate);
            let modified = change.as_ref().map(Change::is_modified).unwrap_or(false);
            Ok((change, modified))
        })
    }

    fn find_label(&self, project_id: ProjectId, title: &str) -> Result<Option<Label>> {
        self.read_locked(|records| records.find_label(project_id, title).cloned())
    }

    fn create_label(&self, project_id: ProjectId, title: &str, color: &str) -> Result<Label> {
        self.write_locked(|records| Ok((records.create_label(project_id, title, color)?, true)))
    }

    fn create_milestone(
        &self,
        project_id: ProjectId,
        title: &str,
        due_date: Option<NaiveDate>,
    ) -> Result<Milestone> {
        self.write_locked(|records| {
            Ok((records.create_milestone(project_id, title, due_date), true))
        })
    }

    fn get_milestone(&self, id: MilestoneId) -> Result<Option<Milestone>> {
        self.read_locked(|records| records.milestones.get(&id).cloned())
    }

    fn snapshot(&self) -> Result<StoreSnapshot> {
        self.read_locked(Records::snapshot)
    }
}

//! Storage abstraction for issuables, labels and milestones.
//!
//! This module defines the `IssuableStore` trait the engine runs against,
//! allowing different backends (JSON file, in-memory, a database) to be used
//! interchangeably. The engine only needs snapshot reads, a transactional
//! read-modify-write on single issuables, and label creation guarded by a
//! per-project uniqueness constraint.

use crate::domain::{Issuable, IssuableId, Label, Milestone, MilestoneId, ProjectId};
use crate::query::QueryContext;
use anyhow::Result;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub mod json;
pub mod lock;
pub mod memory;
pub mod records;

pub use json::JsonFileStorage;
pub use lock::FileLocker;
pub use memory::InMemoryStorage;

/// A consistent read of everything a query needs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub issuables: Vec<Issuable>,
    pub labels: Vec<Label>,
    pub milestones: Vec<Milestone>,
}

impl StoreSnapshot {
    /// Index labels and milestones for query evaluation
    pub fn context(&self) -> QueryContext<'_> {
        QueryContext::new(&self.labels, &self.milestones)
    }
}

/// Committed before/after values of a read-modify-write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub before: Issuable,
    pub after: Issuable,
}

impl Change {
    /// Whether the mutation altered the record at all
    pub fn is_modified(&self) -> bool {
        self.before != self.after
    }
}

/// Trait for storage backends that persist issuables, labels and milestones.
///
/// Implementations must be `Clone` (clones share the same data) and
/// thread-safe; queries may run in parallel with each other and with
/// mutations.
///
/// # Examples
///
/// ```
/// use issuable::domain::NewIssuable;
/// use issuable::storage::{InMemoryStorage, IssuableStore};
/// use chrono::Utc;
///
/// let storage = InMemoryStorage::new();
/// storage.init().unwrap();
///
/// let draft = NewIssuable::new(1, "Fix bug", 1).build(Utc::now()).unwrap();
/// let saved = storage.insert_issuable(draft).unwrap();
///
/// let loaded = storage.get_issuable(saved.id).unwrap().unwrap();
/// assert_eq!(loaded.title, "Fix bug");
/// ```
pub trait IssuableStore: Clone + Send + Sync {
    /// Initialize the storage backend (idempotent).
    fn init(&self) -> Result<()>;

    /// Persist a new issuable, assigning the next id.
    ///
    /// Ids increase monotonically, so a higher id means created later. The
    /// `id` field of the argument is ignored.
    fn insert_issuable(&self, issuable: Issuable) -> Result<Issuable>;

    /// Load an issuable by id, including soft-deleted ones.
    fn get_issuable(&self, id: IssuableId) -> Result<Option<Issuable>>;

    /// Atomically load, mutate and save one issuable.
    ///
    /// Returns `None` if the issuable does not exist. When `mutate` leaves the
    /// record unchanged nothing is written. The returned [`Change`] holds the
    /// committed before/after values.
    fn update_issuable<F>(&self, id: IssuableId, mutate: F) -> Result<Option<Change>>
    where
        F: FnOnce(&mut Issuable);

    /// Find a label by exact title within a project.
    fn find_label(&self, project_id: ProjectId, title: &str) -> Result<Option<Label>>;

    /// Create a label.
    ///
    /// # Errors
    ///
    /// Fails with [`crate::errors::StoreError::DuplicateLabel`] when the
    /// project already has a label with this title.
    fn create_label(&self, project_id: ProjectId, title: &str, color: &str) -> Result<Label>;

    /// Create a milestone, assigning the next id.
    fn create_milestone(
        &self,
        project_id: ProjectId,
        title: &str,
        due_date: Option<NaiveDate>,
    ) -> Result<Milestone>;

    fn get_milestone(&self, id: MilestoneId) -> Result<Option<Milestone>>;

    /// Read all issuables, labels and milestones in one consistent view.
    fn snapshot(&self) -> Result<StoreSnapshot>;
}

//! Label name handling and label-set matching.
//!
//! Labels are matched by title. A filter naming several labels requires
//! every one of them to be attached (ALL semantics, not overlap); the
//! `Without` filter requires the issuable to carry no labels at all.

use crate::domain::{Issuable, Label, LabelId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Color given to labels created implicitly by name
pub const DEFAULT_COLOR: &str = "#428BCA";

/// Trim a label name. Returns `None` if nothing is left.
///
/// # Examples
///
/// ```
/// use issuable::labels::normalize_label_name;
///
/// assert_eq!(normalize_label_name(" bug "), Some("bug".to_string()));
/// assert_eq!(normalize_label_name("   "), None);
/// ```
pub fn normalize_label_name(name: &str) -> Option<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Normalize a batch of names, dropping blanks and duplicates while keeping
/// first-seen order.
pub fn normalize_label_names<I, T>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = T>,
    T: AsRef<str>,
{
    let mut seen = BTreeSet::new();
    names
        .into_iter()
        .filter_map(|name| normalize_label_name(name.as_ref()))
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

/// Label constraint of a query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelFilter {
    /// Every named label must be attached
    All(BTreeSet<String>),
    /// No label may be attached
    Without,
}

impl LabelFilter {
    /// Build an ALL filter. An empty name set means "no label filter" and
    /// yields `None` rather than a filter that matches nothing.
    pub fn all<I, T>(names: I) -> Option<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let names: BTreeSet<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            None
        } else {
            Some(LabelFilter::All(names))
        }
    }

    /// Check an issuable's attached label titles against the filter.
    pub fn matches(&self, attached: &BTreeSet<&str>) -> bool {
        match self {
            LabelFilter::All(required) => required
                .iter()
                .all(|name| attached.contains(name.as_str())),
            LabelFilter::Without => attached.is_empty(),
        }
    }

    /// Whether resolving this filter needs a grouped count (more than one
    /// required name).
    pub fn needs_grouping(&self) -> bool {
        matches!(self, LabelFilter::All(required) if required.len() > 1)
    }
}

/// Titles of the labels attached to `issuable`.
///
/// Label ids that do not resolve are skipped.
pub fn attached_titles<'a>(
    issuable: &Issuable,
    labels: &HashMap<LabelId, &'a Label>,
) -> BTreeSet<&'a str> {
    issuable
        .label_ids
        .iter()
        .filter_map(|id| labels.get(id))
        .map(|label| label.title.as_str())
        .collect()
}

//! Vote tallies derived from award reactions.
//!
//! A vote is an award note whose body equals a reaction name exactly
//! (case-sensitive). Tallies are always recomputed from the notes and are
//! never stored.

use crate::domain::{Issuable, IssuableId, Note};
use std::collections::HashMap;

/// Reaction name counted as an upvote
pub const UPVOTE: &str = "thumbsup";
/// Reaction name counted as a downvote
pub const DOWNVOTE: &str = "thumbsdown";

/// Number of award notes named exactly `name`.
pub fn tally(notes: &[Note], name: &str) -> usize {
    notes
        .iter()
        .filter(|note| note.is_award() && note.body == name)
        .count()
}

/// Tally per issuable id (the "group by id, count" step of a vote sort).
///
/// Issuables without a matching reaction map to zero; they are never
/// dropped.
pub fn tally_by_id<'a, I>(issuables: I, name: &str) -> HashMap<IssuableId, usize>
where
    I: IntoIterator<Item = &'a Issuable>,
{
    issuables
        .into_iter()
        .map(|issuable| (issuable.id, tally(&issuable.notes, name)))
        .collect()
}

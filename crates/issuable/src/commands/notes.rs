//! Comments, award reactions and vote counts

use super::*;
use crate::domain::{Note, NoteId, NoteKind, UserId};
use chrono::Utc;

impl<S: IssuableStore, C: AssigneeCache> CommandExecutor<S, C> {
    /// Add a user comment.
    pub fn add_note(&self, id: IssuableId, author_id: UserId, body: &str) -> Result<Note> {
        let body = body.trim();
        if body.is_empty() {
            return Err(IssuableError::validation("note", "can't be blank"));
        }
        self.push_note(id, author_id, NoteKind::Comment, body)
    }

    /// Record an award reaction such as "thumbsup".
    ///
    /// Reaction names are case-sensitive; only exact "thumbsup" and
    /// "thumbsdown" count as votes.
    pub fn award(&self, id: IssuableId, author_id: UserId, name: &str) -> Result<Note> {
        let name = name.trim();
        if name.is_empty() {
            return Err(IssuableError::validation("award", "can't be blank"));
        }
        self.push_note(id, author_id, NoteKind::Award, name)
    }

    /// Change the reaction name of an existing award.
    pub fn rename_award(&self, id: IssuableId, note_id: NoteId, name: &str) -> Result<Note> {
        let name = name.trim();
        if name.is_empty() {
            return Err(IssuableError::validation("award", "can't be blank"));
        }

        let issuable = self.show_issuable(id)?;
        match issuable.notes.iter().find(|n| n.id == note_id) {
            Some(note) if note.is_award() => {}
            _ => return Err(IssuableError::not_found("award", note_id)),
        }

        let now = Utc::now();
        let change = self.commit(id, |issuable| {
            if let Some(note) = issuable.notes.iter_mut().find(|n| n.id == note_id) {
                if note.body != name {
                    note.body = name.to_string();
                    issuable.updated_at = now;
                }
            }
        })?;

        change
            .after
            .notes
            .into_iter()
            .find(|n| n.id == note_id)
            .ok_or_else(|| IssuableError::not_found("award", note_id))
    }

    pub fn upvotes(&self, id: IssuableId) -> Result<usize> {
        Ok(self.show_issuable(id)?.upvotes())
    }

    pub fn downvotes(&self, id: IssuableId) -> Result<usize> {
        Ok(self.show_issuable(id)?.downvotes())
    }

    /// Number of user comments, excluding awards and system notes.
    pub fn user_notes_count(&self, id: IssuableId) -> Result<usize> {
        Ok(self.show_issuable(id)?.user_notes_count())
    }

    fn push_note(
        &self,
        id: IssuableId,
        author_id: UserId,
        kind: NoteKind,
        body: &str,
    ) -> Result<Note> {
        let now = Utc::now();
        let mut created = None;
        self.commit(id, |issuable| {
            let note = Note {
                id: issuable.next_note_id(),
                author_id,
                kind,
                body: body.to_string(),
                created_at: now,
            };
            issuable.notes.push(note.clone());
            issuable.updated_at = now;
            created = Some(note);
        })?;

        created.ok_or_else(|| IssuableError::not_found("issuable", id))
    }
}

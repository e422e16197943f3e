//! Short-lived tombstones for undoing deletes
//!
//! A delete captures the removed record together with everything that was
//! cascade-deleted with it. The capture can be taken back until the undo
//! window elapses or the same entity is touched again.

use crate::db::{Artwork, Comment};
use chrono::{DateTime, TimeDelta, Utc};
use std::collections::HashMap;
use std::time::Duration;

/// An artwork removed by a delete, with the comments that went with it
#[derive(Debug, Clone, PartialEq)]
pub struct DeletedArtwork {
    pub artwork: Artwork,
    pub comments: Vec<Comment>,
}

#[derive(Debug)]
struct Held<T> {
    item: T,
    deleted_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct UndoBuffer {
    window: TimeDelta,
    artworks: HashMap<String, Held<DeletedArtwork>>,
    comments: HashMap<String, Held<Comment>>,
}

impl UndoBuffer {
    pub fn new(window: Duration) -> Self {
        let millis = i64::try_from(window.as_millis()).unwrap_or(i64::MAX);
        Self {
            window: TimeDelta::try_milliseconds(millis).unwrap_or(TimeDelta::MAX),
            artworks: HashMap::new(),
            comments: HashMap::new(),
        }
    }

    /// Hold a deleted artwork. Replaces any older tombstone for the same id.
    pub fn push_artwork(&mut self, deleted: DeletedArtwork, now: DateTime<Utc>) {
        let id = deleted.artwork.id.clone();
        self.artworks.insert(
            id,
            Held {
                item: deleted,
                deleted_at: now,
            },
        );
    }

    pub fn push_comment(&mut self, comment: Comment, now: DateTime<Utc>) {
        let id = comment.id.clone();
        self.comments.insert(
            id,
            Held {
                item: comment,
                deleted_at: now,
            },
        );
    }

    /// Remove and return the tombstone for `id` if it is still within the window
    pub fn take_artwork(&mut self, id: &str, now: DateTime<Utc>) -> Option<DeletedArtwork> {
        let held = self.artworks.remove(id)?;
        self.is_live(held.deleted_at, now).then_some(held.item)
    }

    pub fn take_comment(&mut self, id: &str, now: DateTime<Utc>) -> Option<Comment> {
        let held = self.comments.remove(id)?;
        self.is_live(held.deleted_at, now).then_some(held.item)
    }

    /// Remove every live comment tombstone on `artwork_id`, oldest delete first
    pub fn take_comments_on(&mut self, artwork_id: &str, now: DateTime<Utc>) -> Vec<Comment> {
        let ids: Vec<String> = self
            .comments
            .iter()
            .filter(|(_, held)| held.item.artwork_id == artwork_id)
            .map(|(id, _)| id.clone())
            .collect();

        let window = self.window;
        let mut taken: Vec<Held<Comment>> = ids
            .iter()
            .filter_map(|id| self.comments.remove(id))
            .filter(|held| now.signed_duration_since(held.deleted_at) <= window)
            .collect();
        taken.sort_by_key(|held| held.deleted_at);
        taken.into_iter().map(|held| held.item).collect()
    }

    /// Drop the tombstone for `id`; the entity was changed some other way.
    pub fn forget_artwork(&mut self, id: &str) {
        self.artworks.remove(id);
    }

    pub fn forget_comment(&mut self, id: &str) {
        self.comments.remove(id);
    }

    /// Drop every tombstone whose window has elapsed. Returns how many were dropped.
    pub fn purge_expired(&mut self, now: DateTime<Utc>) -> usize {
        let window = self.window;
        let live = |deleted_at: DateTime<Utc>| now.signed_duration_since(deleted_at) <= window;

        let before = self.len();
        self.artworks.retain(|_, held| live(held.deleted_at));
        self.comments.retain(|_, held| live(held.deleted_at));
        before - self.len()
    }

    pub fn clear(&mut self) {
        self.artworks.clear();
        self.comments.clear();
    }

    pub fn len(&self) -> usize {
        self.artworks.len() + self.comments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_live(&self, deleted_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(deleted_at) <= self.window
    }
}

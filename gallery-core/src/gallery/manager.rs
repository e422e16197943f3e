use crate::config::Config;
use crate::db::seed;
use crate::db::{
    Artist, ArtistSummary, Artwork, ArtworkPatch, Comment, FeedEntry, NewArtwork, NewComment,
};
use crate::gallery::undo::{DeletedArtwork, UndoBuffer};
use crate::storage::{
    read_collection, write_collection, KeyValueStore, StorageError, ARTISTS_KEY, ARTWORKS_KEY,
    COMMENTS_KEY,
};
use chrono::{DateTime, Utc};
use gallery_common::ViewerVote;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeSet;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Events emitted by GalleryStore when data changes
#[derive(Clone, Debug, PartialEq)]
pub enum GalleryEvent {
    /// Artworks were added, removed, edited, or voted on
    ArtworksChanged,
    /// Comments were added, removed, or edited
    CommentsChanged,
    /// Writing a collection to the backend failed. In-memory state is unaffected.
    PersistFailed { key: String },
}

/// Store behavior knobs
#[derive(Clone, Debug, PartialEq)]
pub struct StoreOptions {
    /// How long a delete can be undone with `undo_delete_*`
    pub undo_window: Duration,
    /// Persist a collection even when it is empty
    pub write_empty_collections: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        StoreOptions {
            undo_window: Duration::from_secs(10),
            write_empty_collections: false,
        }
    }
}

impl From<&Config> for StoreOptions {
    fn from(config: &Config) -> Self {
        StoreOptions {
            undo_window: config.undo_window,
            write_empty_collections: config.write_empty_collections,
        }
    }
}

type WallClock = Box<dyn Fn() -> DateTime<Utc>>;

/// The gallery's single source of truth
///
/// Owns artworks, artists, and comments for the lifetime of the session.
/// Every mutation replaces the in-memory state, re-sorts artworks newest
/// first, and writes all collections back to the backend.
///
/// Missing ids are never an error: mutations on an unknown id do nothing and
/// return `None`/`false`.
pub struct GalleryStore {
    backend: Box<dyn KeyValueStore>,
    options: StoreOptions,
    artworks: Vec<Artwork>,
    artists: Vec<Artist>,
    comments: Vec<Comment>,
    undo: UndoBuffer,
    /// Keys whose latest write failed
    unsaved: BTreeSet<String>,
    event_tx: broadcast::Sender<GalleryEvent>,
    /// Injected wall clock for testing
    wall_clock: WallClock,
}

impl std::fmt::Debug for GalleryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GalleryStore")
            .field("options", &self.options)
            .field("artworks", &self.artworks.len())
            .field("artists", &self.artists.len())
            .field("comments", &self.comments.len())
            .field("undo", &self.undo.len())
            .field("unsaved", &self.unsaved)
            .finish_non_exhaustive()
    }
}

impl GalleryStore {
    /// Load the gallery from `backend`, seeding any collection that has nothing stored
    pub fn open(backend: impl KeyValueStore + 'static, options: StoreOptions) -> Self {
        Self::open_with_clock(backend, options, Utc::now)
    }

    /// Like [`GalleryStore::open`] but reading time from `clock`
    pub fn open_with_clock(
        backend: impl KeyValueStore + 'static,
        options: StoreOptions,
        clock: impl Fn() -> DateTime<Utc> + 'static,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(16);
        let mut store = GalleryStore {
            backend: Box::new(backend),
            undo: UndoBuffer::new(options.undo_window),
            options,
            artworks: Vec::new(),
            artists: Vec::new(),
            comments: Vec::new(),
            unsaved: BTreeSet::new(),
            event_tx,
            wall_clock: Box::new(clock),
        };
        store.load();
        store
    }

    /// Subscribe to gallery events
    pub fn subscribe_events(&self) -> broadcast::Receiver<GalleryEvent> {
        self.event_tx.subscribe()
    }

    /// Discard in-memory state and pending undos, then load again from the backend
    pub fn reload(&mut self) {
        self.undo.clear();
        self.load();
        self.notify(GalleryEvent::ArtworksChanged);
        self.notify(GalleryEvent::CommentsChanged);
    }

    /// Keys whose most recent write to the backend failed, including writes made
    /// while opening. Cleared per key by the next successful write.
    pub fn unsaved_keys(&self) -> Vec<String> {
        self.unsaved.iter().cloned().collect()
    }

    /// Read all collections. Collections that came from storage or seed are
    /// written back; an unreadable blob is left in place until the next mutation.
    fn load(&mut self) {
        let now = self.now();
        let (artworks, artworks_loaded) =
            load_collection(&*self.backend, ARTWORKS_KEY, || seed::seed_artworks(now));
        let (artists, artists_loaded) =
            load_collection(&*self.backend, ARTISTS_KEY, seed::seed_artists);
        let (comments, comments_loaded) =
            load_collection(&*self.backend, COMMENTS_KEY, || seed::seed_comments(now));
        self.artworks = artworks;
        self.artists = artists;
        self.comments = comments;
        self.sort_artworks();

        let keys: Vec<&str> = [
            (ARTWORKS_KEY, artworks_loaded),
            (ARTISTS_KEY, artists_loaded),
            (COMMENTS_KEY, comments_loaded),
        ]
        .into_iter()
        .filter_map(|(key, loaded)| loaded.then_some(key))
        .collect();
        self.persist_keys(&keys);
    }

    fn now(&self) -> DateTime<Utc> {
        (self.wall_clock)()
    }

    fn notify(&self, event: GalleryEvent) {
        let _ = self.event_tx.send(event);
    }

    fn sort_artworks(&mut self) {
        self.artworks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    }

    fn persist(&mut self) {
        self.persist_keys(&[ARTWORKS_KEY, ARTISTS_KEY, COMMENTS_KEY]);
    }

    fn persist_keys(&mut self, keys: &[&str]) {
        for &key in keys {
            let written = match key {
                ARTWORKS_KEY => self.write_key(key, &self.artworks),
                ARTISTS_KEY => self.write_key(key, &self.artists),
                _ => self.write_key(key, &self.comments),
            };
            match written {
                Some(Ok(())) => {
                    self.unsaved.remove(key);
                }
                Some(Err(e)) => {
                    warn!("Failed to persist {}: {}", key, e);
                    self.unsaved.insert(key.to_string());
                    self.notify(GalleryEvent::PersistFailed {
                        key: key.to_string(),
                    });
                }
                None => {}
            }
        }
    }

    /// `None` when the write is skipped because the collection is empty
    fn write_key<T: Serialize>(
        &self,
        key: &str,
        items: &[T],
    ) -> Option<Result<(), StorageError>> {
        if items.is_empty() && !self.options.write_empty_collections {
            debug!("Skipping write of empty {}", key);
            return None;
        }
        Some(write_collection(&*self.backend, key, items))
    }

    fn artworks_changed(&mut self) {
        self.sort_artworks();
        self.persist();
        self.notify(GalleryEvent::ArtworksChanged);
    }

    fn comments_changed(&mut self) {
        self.persist();
        self.notify(GalleryEvent::CommentsChanged);
    }

    /// Start of every mutation: the current time, with stale tombstones dropped
    fn begin_mutation(&mut self) -> DateTime<Utc> {
        let now = self.now();
        let expired = self.undo.purge_expired(now);
        if expired > 0 {
            debug!("Expired {} undo entries", expired);
        }
        now
    }

    fn artwork_mut(&mut self, id: &str) -> Option<&mut Artwork> {
        self.artworks.iter_mut().find(|a| a.id == id)
    }

    // Artworks

    /// Add a new artwork with a fresh id, zero votes, and the current time
    pub fn add_artwork(&mut self, fields: NewArtwork) -> Artwork {
        let now = self.begin_mutation();
        let artwork = Artwork::new(fields, now);
        debug!("Adding artwork {} ({})", artwork.id, artwork.title);
        self.artworks.push(artwork.clone());
        self.artworks_changed();
        artwork
    }

    /// Merge `patch` onto the artwork with `id`
    pub fn update_artwork(&mut self, id: &str, patch: ArtworkPatch) -> Option<Artwork> {
        self.begin_mutation();
        let artwork = self.artwork_mut(id)?;
        artwork.apply(patch);
        let updated = artwork.clone();
        debug!("Updated artwork {}", id);
        self.artworks_changed();
        Some(updated)
    }

    /// Delete an artwork and every comment attached to it
    ///
    /// Returns the removed record, which can be handed back to
    /// [`GalleryStore::recover_artwork`]. The comments are only recoverable
    /// through [`GalleryStore::undo_delete_artwork`].
    pub fn delete_artwork(&mut self, id: &str) -> Option<Artwork> {
        let now = self.begin_mutation();
        let index = self.artworks.iter().position(|a| a.id == id)?;
        let artwork = self.artworks.remove(index);

        let (mut removed, kept): (Vec<Comment>, Vec<Comment>) =
            std::mem::take(&mut self.comments)
                .into_iter()
                .partition(|c| c.artwork_id == id);
        self.comments = kept;
        let had_comments = !removed.is_empty();
        // Earlier comment deletes on this artwork are only undoable together with it.
        removed.extend(self.undo.take_comments_on(id, now));

        debug!(
            "Deleted artwork {} and {} comments",
            artwork.id,
            removed.len()
        );
        self.undo.push_artwork(
            DeletedArtwork {
                artwork: artwork.clone(),
                comments: removed,
            },
            now,
        );

        self.artworks_changed();
        if had_comments {
            self.notify(GalleryEvent::CommentsChanged);
        }
        Some(artwork)
    }

    /// Re-insert `artwork` verbatim, replacing any record with the same id
    ///
    /// Comments removed by the earlier delete are not restored.
    pub fn recover_artwork(&mut self, artwork: Artwork) {
        self.begin_mutation();
        self.undo.forget_artwork(&artwork.id);
        debug!("Recovering artwork {}", artwork.id);
        self.artworks.retain(|a| a.id != artwork.id);
        self.artworks.push(artwork);
        self.artworks_changed();
    }

    /// Restore a recently deleted artwork together with its comments
    ///
    /// Returns `false` if there is nothing to restore: the id was never
    /// deleted, the undo window has passed, or the artwork was recovered or
    /// deleted again since.
    pub fn undo_delete_artwork(&mut self, id: &str) -> bool {
        let now = self.begin_mutation();
        let Some(deleted) = self.undo.take_artwork(id, now) else {
            return false;
        };

        let DeletedArtwork { artwork, comments } = deleted;
        info!(
            "Undoing delete of artwork {} ({} comments)",
            artwork.id,
            comments.len()
        );
        self.artworks.retain(|a| a.id != artwork.id);
        self.artworks.push(artwork);
        for comment in comments {
            self.undo.forget_comment(&comment.id);
            self.comments.retain(|c| c.id != comment.id);
            self.comments.push(comment);
        }

        self.artworks_changed();
        self.notify(GalleryEvent::CommentsChanged);
        true
    }

    /// Add one upvote. Returns the new count.
    pub fn upvote_artwork(&mut self, id: &str) -> Option<u32> {
        self.begin_mutation();
        let artwork = self.artwork_mut(id)?;
        artwork.upvote_count = artwork.upvote_count.saturating_add(1);
        let count = artwork.upvote_count;
        self.artworks_changed();
        Some(count)
    }

    /// Add one downvote. Returns the new count.
    pub fn downvote_artwork(&mut self, id: &str) -> Option<u32> {
        self.begin_mutation();
        let artwork = self.artwork_mut(id)?;
        artwork.downvote_count = artwork.downvote_count.saturating_add(1);
        let count = artwork.downvote_count;
        self.artworks_changed();
        Some(count)
    }

    /// Single-vote-per-viewer toggle
    ///
    /// Pressing the selected vote clears it, pressing the other one moves the
    /// vote, and `ViewerVote::None` withdraws any vote. Counters are adjusted
    /// in the same step and never go below zero. Returns the viewer's new vote.
    pub fn toggle_vote(&mut self, id: &str, pressed: ViewerVote) -> Option<ViewerVote> {
        self.begin_mutation();
        let artwork = self.artwork_mut(id)?;

        let next = match pressed {
            ViewerVote::None => ViewerVote::None,
            _ => artwork.viewer_vote.toggled(pressed),
        };
        match artwork.viewer_vote {
            ViewerVote::Up => artwork.upvote_count = artwork.upvote_count.saturating_sub(1),
            ViewerVote::Down => {
                artwork.downvote_count = artwork.downvote_count.saturating_sub(1)
            }
            ViewerVote::None => {}
        }
        match next {
            ViewerVote::Up => artwork.upvote_count = artwork.upvote_count.saturating_add(1),
            ViewerVote::Down => {
                artwork.downvote_count = artwork.downvote_count.saturating_add(1)
            }
            ViewerVote::None => {}
        }
        artwork.viewer_vote = next;

        self.artworks_changed();
        Some(next)
    }

    // Comments

    pub fn add_comment(&mut self, fields: NewComment) -> Comment {
        let now = self.begin_mutation();
        let comment = Comment::new(fields, now);
        debug!(
            "Adding comment {} on artwork {}",
            comment.id, comment.artwork_id
        );
        self.comments.push(comment.clone());
        self.comments_changed();
        comment
    }

    /// Replace a comment's text and stamp `updated_at`
    pub fn update_comment(&mut self, id: &str, text: impl Into<String>) -> Option<Comment> {
        let now = self.begin_mutation();
        let comment = self.comments.iter_mut().find(|c| c.id == id)?;
        comment.text = text.into();
        comment.updated_at = Some(now.max(comment.created_at));
        let updated = comment.clone();
        self.comments_changed();
        Some(updated)
    }

    pub fn delete_comment(&mut self, id: &str) -> Option<Comment> {
        let now = self.begin_mutation();
        let index = self.comments.iter().position(|c| c.id == id)?;
        let comment = self.comments.remove(index);
        debug!("Deleted comment {}", comment.id);
        self.undo.push_comment(comment.clone(), now);
        self.comments_changed();
        Some(comment)
    }

    /// Re-insert `comment` verbatim, replacing any record with the same id
    pub fn recover_comment(&mut self, comment: Comment) {
        self.begin_mutation();
        self.undo.forget_comment(&comment.id);
        debug!("Recovering comment {}", comment.id);
        self.comments.retain(|c| c.id != comment.id);
        self.comments.push(comment);
        self.comments_changed();
    }

    /// Restore a recently deleted comment. Returns `false` if nothing was restored.
    pub fn undo_delete_comment(&mut self, id: &str) -> bool {
        let now = self.begin_mutation();
        let Some(comment) = self.undo.take_comment(id, now) else {
            return false;
        };
        info!("Undoing delete of comment {}", comment.id);
        self.comments.retain(|c| c.id != comment.id);
        self.comments.push(comment);
        self.comments_changed();
        true
    }

    // Queries

    /// All artworks, newest first
    pub fn artworks(&self) -> &[Artwork] {
        &self.artworks
    }

    pub fn artists(&self) -> &[Artist] {
        &self.artists
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn artwork_by_id(&self, id: &str) -> Option<&Artwork> {
        self.artworks.iter().find(|a| a.id == id)
    }

    pub fn artist_by_id(&self, id: &str) -> Option<&Artist> {
        self.artists.iter().find(|a| a.id == id)
    }

    pub fn artworks_by_artist_id(&self, artist_id: &str) -> Vec<&Artwork> {
        self.artworks
            .iter()
            .filter(|a| a.artist_id == artist_id)
            .collect()
    }

    pub fn comments_by_artwork_id(&self, artwork_id: &str) -> Vec<&Comment> {
        self.comments
            .iter()
            .filter(|c| c.artwork_id == artwork_id)
            .collect()
    }

    /// Home feed: every artwork whose artist resolves, newest first
    pub fn feed(&self) -> Vec<FeedEntry> {
        self.artworks
            .iter()
            .filter_map(|artwork| {
                let artist = self.artist_by_id(&artwork.artist_id)?;
                Some(FeedEntry {
                    artwork: artwork.clone(),
                    artist: artist.clone(),
                    comments: self
                        .comments_by_artwork_id(&artwork.id)
                        .into_iter()
                        .cloned()
                        .collect(),
                })
            })
            .collect()
    }

    pub fn artist_summary(&self, artist_id: &str) -> Option<ArtistSummary> {
        let artist = self.artist_by_id(artist_id)?;
        let artworks = self.artworks_by_artist_id(artist_id);
        Some(ArtistSummary {
            artist: artist.clone(),
            artwork_count: artworks.len(),
            total_upvotes: artworks.iter().map(|a| u64::from(a.upvote_count)).sum(),
            total_downvotes: artworks.iter().map(|a| u64::from(a.downvote_count)).sum(),
        })
    }

    /// Summaries for every artist, in artist order
    pub fn artist_summaries(&self) -> Vec<ArtistSummary> {
        self.artists
            .iter()
            .filter_map(|artist| self.artist_summary(&artist.id))
            .collect()
    }
}

/// Read one collection, falling back to `seed`. The flag is `false` when the
/// stored blob could not be read and should not be overwritten yet.
fn load_collection<T: DeserializeOwned>(
    backend: &dyn KeyValueStore,
    key: &str,
    seed: impl FnOnce() -> Vec<T>,
) -> (Vec<T>, bool) {
    match read_collection(backend, key) {
        Ok(Some(items)) => {
            info!("Loaded {} {} from storage", items.len(), key);
            (items, true)
        }
        Ok(None) => {
            info!("No stored {}, using seed data", key);
            (seed(), true)
        }
        Err(e) => {
            warn!(
                "Failed to load {}: {}, using seed data until the next change",
                key, e
            );
            (seed(), false)
        }
    }
}

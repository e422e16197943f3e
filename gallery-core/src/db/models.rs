//! Gallery data models
//!
//! Field names on the wire are camelCase so blobs written by the web
//! frontend load unchanged.

use chrono::{DateTime, Utc};
use gallery_common::ViewerVote;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Artist shown in the gallery
///
/// Artists come only from seed data and are never mutated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Artist {
    pub id: String,
    pub name: String,
    pub bio: String,
    #[serde(rename = "avatar")]
    pub avatar_url: String,
}

/// A single artwork
///
/// `artist_id` is expected to reference an existing [`Artist`] but this is not
/// enforced; a dangling id simply fails to resolve at read time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Artwork {
    pub id: String,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub artist_id: String,
    pub medium: String,
    pub year: i32,
    #[serde(rename = "upvotes")]
    pub upvote_count: u32,
    #[serde(rename = "downvotes")]
    pub downvote_count: u32,
    pub created_at: DateTime<Utc>,
    /// This browser's toggle vote. Absent in blobs that predate it.
    #[serde(default, skip_serializing_if = "ViewerVote::is_none")]
    pub viewer_vote: ViewerVote,
}

/// Fields supplied by the caller when adding an artwork
#[derive(Debug, Clone, PartialEq)]
pub struct NewArtwork {
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub artist_id: String,
    pub medium: String,
    pub year: i32,
}

/// Partial artwork update. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArtworkPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub artist_id: Option<String>,
    pub medium: Option<String>,
    pub year: Option<i32>,
}

/// Comment attached to an artwork
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub artwork_id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Fields supplied by the caller when adding a comment
#[derive(Debug, Clone, PartialEq)]
pub struct NewComment {
    pub artwork_id: String,
    pub text: String,
}

/// Per-artist vote totals, as shown on the artists index and profile pages
#[derive(Debug, Clone, PartialEq)]
pub struct ArtistSummary {
    pub artist: Artist,
    pub artwork_count: usize,
    pub total_upvotes: u64,
    pub total_downvotes: u64,
}

impl ArtistSummary {
    /// Net rating: upvotes minus downvotes
    pub fn rating(&self) -> i64 {
        self.total_upvotes as i64 - self.total_downvotes as i64
    }
}

/// One card in the home feed
#[derive(Debug, Clone, PartialEq)]
pub struct FeedEntry {
    pub artwork: Artwork,
    pub artist: Artist,
    pub comments: Vec<Comment>,
}

impl Artwork {
    /// Build a fresh artwork with a new id and zeroed vote counts
    pub fn new(fields: NewArtwork, created_at: DateTime<Utc>) -> Self {
        Artwork {
            id: Uuid::new_v4().to_string(),
            title: fields.title,
            description: fields.description,
            image_url: fields.image_url,
            artist_id: fields.artist_id,
            medium: fields.medium,
            year: fields.year,
            upvote_count: 0,
            downvote_count: 0,
            created_at,
            viewer_vote: ViewerVote::None,
        }
    }

    /// Merge the fields set in `patch` onto this record
    pub fn apply(&mut self, patch: ArtworkPatch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(image_url) = patch.image_url {
            self.image_url = image_url;
        }
        if let Some(artist_id) = patch.artist_id {
            self.artist_id = artist_id;
        }
        if let Some(medium) = patch.medium {
            self.medium = medium;
        }
        if let Some(year) = patch.year {
            self.year = year;
        }
    }

    /// Net score shown next to the vote buttons
    pub fn score(&self) -> i64 {
        self.upvote_count as i64 - self.downvote_count as i64
    }
}

impl Comment {
    pub fn new(fields: NewComment, created_at: DateTime<Utc>) -> Self {
        Comment {
            id: Uuid::new_v4().to_string(),
            artwork_id: fields.artwork_id,
            text: fields.text,
            created_at,
            updated_at: None,
        }
    }

    pub fn is_edited(&self) -> bool {
        self.updated_at.is_some()
    }
}

impl ArtworkPatch {
    pub fn is_empty(&self) -> bool {
        self == &ArtworkPatch::default()
    }
}

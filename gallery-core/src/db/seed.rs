//! Built-in seed data
//!
//! Used for any collection that has nothing stored yet. Records keep their
//! hand-assigned ids ("1", "2", ...) and are stamped with the load time.

use crate::db::{Artist, Artwork, Comment};
use chrono::{DateTime, Utc};
use gallery_common::ViewerVote;
use serde::Deserialize;
use std::sync::OnceLock;

/// Embedded fixture data (compiled into the binary)
const FIXTURE_JSON: &str = include_str!("../../fixtures/seed.json");

#[derive(Debug, Deserialize)]
struct FixtureData {
    artists: Vec<Artist>,
    artworks: Vec<FixtureArtwork>,
    comments: Vec<FixtureComment>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FixtureArtwork {
    id: String,
    title: String,
    description: String,
    image_url: String,
    artist_id: String,
    medium: String,
    year: i32,
    upvotes: u32,
    downvotes: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FixtureComment {
    id: String,
    artwork_id: String,
    text: String,
}

static FIXTURE: OnceLock<FixtureData> = OnceLock::new();

fn fixture() -> &'static FixtureData {
    FIXTURE.get_or_init(|| {
        serde_json::from_str(FIXTURE_JSON).expect("Failed to parse seed fixture JSON")
    })
}

pub fn seed_artists() -> Vec<Artist> {
    fixture().artists.clone()
}

pub fn seed_artworks(now: DateTime<Utc>) -> Vec<Artwork> {
    fixture()
        .artworks
        .iter()
        .map(|a| Artwork {
            id: a.id.clone(),
            title: a.title.clone(),
            description: a.description.clone(),
            image_url: a.image_url.clone(),
            artist_id: a.artist_id.clone(),
            medium: a.medium.clone(),
            year: a.year,
            upvote_count: a.upvotes,
            downvote_count: a.downvotes,
            created_at: now,
            viewer_vote: ViewerVote::None,
        })
        .collect()
}

pub fn seed_comments(now: DateTime<Utc>) -> Vec<Comment> {
    fixture()
        .comments
        .iter()
        .map(|c| Comment {
            id: c.id.clone(),
            artwork_id: c.artwork_id.clone(),
            text: c.text.clone(),
            created_at: now,
            updated_at: None,
        })
        .collect()
}

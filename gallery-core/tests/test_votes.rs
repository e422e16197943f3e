mod support;
use crate::support::{create_test_artwork, manual_clock, tracing_init};
use chrono::{TimeDelta, Utc};
use gallery_common::ViewerVote;
use gallery_core::db::{ArtworkPatch, NewComment};
use gallery_core::storage::MemoryStore;
use gallery_core::{GalleryStore, StoreOptions};

fn setup_seeded_store() -> GalleryStore {
    tracing_init();
    GalleryStore::open(MemoryStore::new(), StoreOptions::default())
}

fn assert_newest_first(store: &GalleryStore) {
    let artworks = store.artworks();
    for pair in artworks.windows(2) {
        assert!(
            pair[0].created_at >= pair[1].created_at,
            "{} sorted before newer {}",
            pair[0].id,
            pair[1].id
        );
    }
}

#[test]
fn test_upvotes_accumulate() {
    let mut store = setup_seeded_store();

    for _ in 0..5 {
        store.upvote_artwork("2");
    }

    let two_fridas = store.artwork_by_id("2").unwrap();
    assert_eq!(two_fridas.upvote_count, 100);
    assert_eq!(two_fridas.downvote_count, 8);
}

#[test]
fn test_downvote_returns_new_count() {
    let mut store = setup_seeded_store();

    assert_eq!(store.downvote_artwork("3"), Some(4));
    assert_eq!(store.downvote_artwork("3"), Some(5));
    assert_eq!(store.downvote_artwork("missing"), None);
}

#[test]
fn test_toggle_vote_moves_single_vote() {
    let mut store = setup_seeded_store();

    assert_eq!(store.toggle_vote("1", ViewerVote::Up), Some(ViewerVote::Up));
    let starry = store.artwork_by_id("1").unwrap();
    assert_eq!((starry.upvote_count, starry.downvote_count), (121, 5));

    assert_eq!(
        store.toggle_vote("1", ViewerVote::Down),
        Some(ViewerVote::Down)
    );
    let starry = store.artwork_by_id("1").unwrap();
    assert_eq!((starry.upvote_count, starry.downvote_count), (120, 6));

    assert_eq!(
        store.toggle_vote("1", ViewerVote::Down),
        Some(ViewerVote::None)
    );
    let starry = store.artwork_by_id("1").unwrap();
    assert_eq!((starry.upvote_count, starry.downvote_count), (120, 5));
}

#[test]
fn test_toggle_vote_withdraw_and_saturate() {
    let mut store = setup_seeded_store();
    let added = store.add_artwork(create_test_artwork("Irises", "1"));

    store.toggle_vote(&added.id, ViewerVote::Up);
    assert_eq!(
        store.toggle_vote(&added.id, ViewerVote::None),
        Some(ViewerVote::None)
    );
    assert_eq!(store.artwork_by_id(&added.id).unwrap().upvote_count, 0);

    // Withdrawing with nothing selected changes nothing
    store.toggle_vote(&added.id, ViewerVote::None);
    let irises = store.artwork_by_id(&added.id).unwrap();
    assert_eq!((irises.upvote_count, irises.downvote_count), (0, 0));
}

#[test]
fn test_viewer_vote_survives_reopen() {
    tracing_init();
    let backend = MemoryStore::new();
    let mut store = GalleryStore::open(backend.clone(), StoreOptions::default());
    store.toggle_vote("4", ViewerVote::Down);

    let reopened = GalleryStore::open(backend, StoreOptions::default());
    let sunflowers = reopened.artwork_by_id("4").unwrap();
    assert_eq!(sunflowers.viewer_vote, ViewerVote::Down);
    assert_eq!(sunflowers.downvote_count, 8);
}

#[test]
fn test_add_artwork_assigns_fresh_identity() {
    let mut store = setup_seeded_store();

    let first = store.add_artwork(create_test_artwork("Irises", "1"));
    let second = store.add_artwork(create_test_artwork("Irises", "1"));

    assert_ne!(first.id, second.id);
    assert_eq!((first.upvote_count, first.downvote_count), (0, 0));
    assert_eq!(first.viewer_vote, ViewerVote::None);
    assert_eq!(store.artworks().len(), 6);

    let van_gogh_ids: Vec<_> = store
        .artworks_by_artist_id("1")
        .iter()
        .map(|a| a.id.clone())
        .collect();
    assert!(van_gogh_ids.contains(&first.id));
    assert!(van_gogh_ids.contains(&second.id));
}

#[test]
fn test_artworks_stay_newest_first() {
    tracing_init();
    let t0 = Utc::now();
    let (time, clock) = manual_clock(t0);
    let mut store =
        GalleryStore::open_with_clock(MemoryStore::new(), StoreOptions::default(), clock);

    time.set(t0 + TimeDelta::seconds(1));
    let older = store.add_artwork(create_test_artwork("Older", "2"));
    time.set(t0 + TimeDelta::seconds(2));
    let newer = store.add_artwork(create_test_artwork("Newer", "3"));
    assert_newest_first(&store);
    assert_eq!(store.artworks()[0].id, newer.id);
    assert_eq!(store.artworks()[1].id, older.id);

    // Votes and edits do not reorder
    store.upvote_artwork(&older.id);
    store.update_artwork(
        &older.id,
        ArtworkPatch {
            title: Some("Still older".to_string()),
            ..Default::default()
        },
    );
    assert_newest_first(&store);
    assert_eq!(store.artworks()[0].id, newer.id);
}

#[test]
fn test_update_artwork_merges_partial_patch() {
    let mut store = setup_seeded_store();
    let before = store.artwork_by_id("3").cloned().unwrap();

    let updated = store
        .update_artwork(
            "3",
            ArtworkPatch {
                medium: Some("Oil on canvas, triptych".to_string()),
                year: Some(1916),
                ..Default::default()
            },
        )
        .unwrap();

    assert_eq!(updated.medium, "Oil on canvas, triptych");
    assert_eq!(updated.year, 1916);
    assert_eq!(updated.title, before.title);
    assert_eq!(updated.image_url, before.image_url);
    assert_eq!(updated.upvote_count, before.upvote_count);
    assert_eq!(updated.created_at, before.created_at);
    assert_eq!(store.artwork_by_id("3"), Some(&updated));
}

#[test]
fn test_update_comment_stamps_edit_time() {
    tracing_init();
    let t0 = Utc::now();
    let (time, clock) = manual_clock(t0);
    let mut store =
        GalleryStore::open_with_clock(MemoryStore::new(), StoreOptions::default(), clock);
    let added = store.add_comment(NewComment {
        artwork_id: "3".to_string(),
        text: "Calm".to_string(),
    });
    assert!(!added.is_edited());

    time.set(t0 + TimeDelta::minutes(2));
    let edited = store.update_comment(&added.id, "Very calm").unwrap();

    assert_eq!(edited.id, added.id);
    assert_eq!(edited.artwork_id, "3");
    assert_eq!(edited.created_at, added.created_at);
    assert_eq!(edited.text, "Very calm");
    assert_eq!(edited.updated_at, Some(t0 + TimeDelta::minutes(2)));
    assert!(edited.updated_at.unwrap() >= edited.created_at);
}

#[test]
fn test_update_comment_with_clock_behind_creation() {
    tracing_init();
    let t0 = Utc::now();
    let (time, clock) = manual_clock(t0);
    let mut store =
        GalleryStore::open_with_clock(MemoryStore::new(), StoreOptions::default(), clock);

    time.set(t0 - TimeDelta::hours(1));
    let edited = store.update_comment("1", "Clock went backwards").unwrap();

    assert_eq!(edited.updated_at, Some(edited.created_at));
}

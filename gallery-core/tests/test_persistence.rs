mod support;
use crate::support::{create_test_artwork, tracing_init, FlakyStore};
use gallery_core::db::{Artist, Artwork, Comment, NewComment};
use gallery_core::storage::{
    read_collection, FileStore, KeyValueStore, MemoryStore, ARTISTS_KEY, ARTWORKS_KEY,
    COMMENTS_KEY,
};
use gallery_core::{GalleryEvent, GalleryStore, StoreOptions};
use tempfile::TempDir;

fn sorted_comments(comments: &[Comment]) -> Vec<Comment> {
    let mut comments = comments.to_vec();
    comments.sort_by(|a, b| a.id.cmp(&b.id));
    comments
}

#[test]
fn test_reopen_from_memory_backend_round_trips() {
    tracing_init();
    let backend = MemoryStore::new();
    let mut store = GalleryStore::open(backend.clone(), StoreOptions::default());

    let added = store.add_artwork(create_test_artwork("Olive Trees", "1"));
    store.upvote_artwork(&added.id);
    store.add_comment(NewComment {
        artwork_id: added.id.clone(),
        text: "Gorgeous brushwork".to_string(),
    });
    store.update_comment("1", "Still my favourite");

    let reopened = GalleryStore::open(backend, StoreOptions::default());

    assert_eq!(reopened.artworks(), store.artworks());
    assert_eq!(reopened.artists(), store.artists());
    assert_eq!(
        sorted_comments(reopened.comments()),
        sorted_comments(store.comments())
    );
}

#[test]
fn test_reopen_from_file_backend_round_trips() {
    tracing_init();
    let temp_dir = TempDir::new().unwrap();
    let data_dir = temp_dir.path().join("data");

    let mut store = GalleryStore::open(FileStore::new(&data_dir), StoreOptions::default());
    store.delete_artwork("3");
    store.downvote_artwork("4");
    let expected_artworks = store.artworks().to_vec();
    let expected_comments = store.comments().to_vec();
    drop(store);

    assert!(data_dir.join("artworks.json").exists());
    assert!(data_dir.join("artists.json").exists());
    assert!(data_dir.join("comments.json").exists());

    let reopened = GalleryStore::open(FileStore::new(&data_dir), StoreOptions::default());
    assert_eq!(reopened.artworks(), expected_artworks.as_slice());
    assert_eq!(reopened.comments(), expected_comments.as_slice());
    assert!(reopened.artwork_by_id("3").is_none());
}

#[test]
fn test_stored_blob_matches_web_format() {
    let backend = MemoryStore::new();
    let _store = GalleryStore::open(backend.clone(), StoreOptions::default());

    let raw = backend.get_item(ARTWORKS_KEY).unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    let first = &value.as_array().unwrap()[0];

    for key in ["id", "title", "imageUrl", "artistId", "upvotes", "downvotes", "createdAt"] {
        assert!(first.get(key).is_some(), "missing {key} in {first}");
    }
}

#[test]
fn test_loads_blobs_written_by_web_app() {
    tracing_init();
    let backend = MemoryStore::new();
    backend
        .set_item(
            ARTWORKS_KEY,
            r#"[
                {"id":"a","title":"Old","description":"d","imageUrl":"/a.png","artistId":"1",
                 "medium":"Ink","year":1800,"upvotes":1,"downvotes":0,
                 "createdAt":"2023-01-01T00:00:00.000Z"},
                {"id":"b","title":"New","description":"d","imageUrl":"/b.png","artistId":"1",
                 "medium":"Ink","year":1801,"upvotes":0,"downvotes":2,
                 "createdAt":"2024-06-01T00:00:00.000Z"}
            ]"#,
        )
        .unwrap();

    let store = GalleryStore::open(backend, StoreOptions::default());

    let ids: Vec<_> = store.artworks().iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, ["b", "a"]);
    assert_eq!(store.artists().len(), 3);
    assert_eq!(store.comments().len(), 3);
}

#[test]
fn test_corrupt_blob_falls_back_to_seed() {
    tracing_init();
    let backend = MemoryStore::new();
    backend.set_item(COMMENTS_KEY, "[{\"id\": broken").unwrap();
    backend.set_item(ARTISTS_KEY, "").unwrap();

    let mut store = GalleryStore::open(backend.clone(), StoreOptions::default());

    assert_eq!(store.comments().len(), 3);
    assert_eq!(store.artists().len(), 3);
    let artists: Vec<Artist> = read_collection(&backend, ARTISTS_KEY).unwrap().unwrap();
    assert_eq!(artists.len(), 3);

    // The unreadable blob stays as it was until something changes
    assert_eq!(
        backend.get_item(COMMENTS_KEY).unwrap().as_deref(),
        Some("[{\"id\": broken")
    );

    store.upvote_artwork("1");
    let repaired: Vec<Comment> = read_collection(&backend, COMMENTS_KEY).unwrap().unwrap();
    assert_eq!(repaired.len(), 3);
}

#[test]
fn test_reload_keeps_corrupt_blob() {
    tracing_init();
    let backend = MemoryStore::new();
    let mut store = GalleryStore::open(backend.clone(), StoreOptions::default());
    backend.set_item(ARTWORKS_KEY, "not json").unwrap();

    store.reload();

    assert_eq!(store.artworks().len(), 4);
    assert_eq!(
        backend.get_item(ARTWORKS_KEY).unwrap().as_deref(),
        Some("not json")
    );
}

#[test]
fn test_empty_collection_is_not_written_by_default() {
    tracing_init();
    let backend = MemoryStore::new();
    let mut store = GalleryStore::open(backend.clone(), StoreOptions::default());

    for id in ["1", "2", "3"] {
        store.delete_comment(id);
    }
    assert!(store.comments().is_empty());

    // The last non-empty snapshot stays in storage.
    let stored: Vec<Comment> = read_collection(&backend, COMMENTS_KEY).unwrap().unwrap();
    assert_eq!(stored.len(), 1);
}

#[test]
fn test_empty_collection_is_written_when_enabled() {
    tracing_init();
    let backend = MemoryStore::new();
    let options = StoreOptions {
        write_empty_collections: true,
        ..Default::default()
    };
    let mut store = GalleryStore::open(backend.clone(), options.clone());

    for id in ["1", "2", "3"] {
        store.delete_comment(id);
    }

    let stored: Vec<Comment> = read_collection(&backend, COMMENTS_KEY).unwrap().unwrap();
    assert!(stored.is_empty());

    let reopened = GalleryStore::open(backend, options);
    assert!(reopened.comments().is_empty());
}

#[test]
fn test_write_failure_keeps_memory_state_and_reports() {
    tracing_init();
    let backend = FlakyStore::default();
    let mut store = GalleryStore::open(backend.clone(), StoreOptions::default());
    let mut events = store.subscribe_events();

    backend.fail_writes.set(true);
    assert_eq!(store.upvote_artwork("1"), Some(121));

    assert_eq!(store.artwork_by_id("1").unwrap().upvote_count, 121);
    let mut failed_keys = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let GalleryEvent::PersistFailed { key } = event {
            failed_keys.push(key);
        }
    }
    assert_eq!(failed_keys, [ARTWORKS_KEY, ARTISTS_KEY, COMMENTS_KEY]);

    let stored: Vec<Artwork> = read_collection(&backend.inner, ARTWORKS_KEY)
        .unwrap()
        .unwrap();
    let stored_starry = stored.iter().find(|a| a.id == "1").unwrap();
    assert_eq!(stored_starry.upvote_count, 120);
}

#[test]
fn test_reload_picks_up_external_changes() {
    tracing_init();
    let backend = MemoryStore::new();
    let mut store = GalleryStore::open(backend.clone(), StoreOptions::default());
    let mut other_tab = GalleryStore::open(backend, StoreOptions::default());

    other_tab.delete_artwork("4");
    assert!(store.artwork_by_id("4").is_some());

    store.reload();
    assert!(store.artwork_by_id("4").is_none());
    assert_eq!(store.artworks().len(), 3);
}

#[test]
fn test_failed_writes_at_open_are_reported() {
    tracing_init();
    let backend = FlakyStore::default();
    backend.fail_writes.set(true);

    let mut store = GalleryStore::open(backend.clone(), StoreOptions::default());

    assert_eq!(store.unsaved_keys(), [ARTISTS_KEY, ARTWORKS_KEY, COMMENTS_KEY]);
    assert!(backend.inner.is_empty());
    assert_eq!(store.artworks().len(), 4);

    backend.fail_writes.set(false);
    store.downvote_artwork("2");

    assert!(store.unsaved_keys().is_empty());
    assert_eq!(backend.inner.len(), 3);
}

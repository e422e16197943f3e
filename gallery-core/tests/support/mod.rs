use chrono::{DateTime, Utc};
use gallery_core::db::NewArtwork;
use gallery_core::storage::{KeyValueStore, MemoryStore, StorageError};
use std::cell::Cell;
use std::rc::Rc;

/// Initialize tracing for tests with proper test output handling
#[allow(dead_code)]
pub fn tracing_init() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_line_number(true)
        .with_target(false)
        .with_file(true)
        .try_init();
}

/// Clock that only moves when the test says so
#[allow(dead_code)]
pub fn manual_clock(
    start: DateTime<Utc>,
) -> (Rc<Cell<DateTime<Utc>>>, impl Fn() -> DateTime<Utc> + 'static) {
    let time = Rc::new(Cell::new(start));
    let time_clone = time.clone();
    (time, move || time_clone.get())
}

#[allow(dead_code)]
pub fn create_test_artwork(title: &str, artist_id: &str) -> NewArtwork {
    NewArtwork {
        title: title.to_string(),
        description: format!("{title}, test fixture"),
        image_url: "https://example.com/art.jpg".to_string(),
        artist_id: artist_id.to_string(),
        medium: "Oil on canvas".to_string(),
        year: 1900,
    }
}

/// Backend whose writes fail once `fail_writes` is set; reads pass through
#[allow(dead_code)]
#[derive(Clone, Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    pub fail_writes: Rc<Cell<bool>>,
}

impl KeyValueStore for FlakyStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_writes.get() {
            return Err(StorageError::Backend("quota exceeded".to_string()));
        }
        self.inner.set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.inner.remove_item(key)
    }
}

use crate::gallery::{GalleryEvent, GalleryStore};
use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;
use tokio::sync::broadcast;

/// Cloneable handle to the one `GalleryStore` of a session
///
/// The gallery is single-threaded, so the handle is `Rc`-based and not `Send`.
#[derive(Clone, Debug)]
pub struct SharedGalleryStore(Rc<RefCell<GalleryStore>>);

impl SharedGalleryStore {
    pub fn new(store: GalleryStore) -> Self {
        Self(Rc::new(RefCell::new(store)))
    }

    /// Borrow the store for queries
    pub fn get(&self) -> Ref<'_, GalleryStore> {
        self.0.borrow()
    }

    /// Borrow the store for a mutation
    pub fn get_mut(&self) -> RefMut<'_, GalleryStore> {
        self.0.borrow_mut()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<GalleryEvent> {
        self.get().subscribe_events()
    }
}

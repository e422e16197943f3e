mod manager;
mod shared;
pub mod undo;

pub use manager::{GalleryEvent, GalleryStore, StoreOptions};
pub use shared::SharedGalleryStore;
pub use undo::DeletedArtwork;

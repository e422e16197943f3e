//! Client-side art gallery data layer.
//!
//! Owns artworks, artists, and comments in memory and mirrors them to a
//! key/value blob store after every change.

pub mod config;
pub mod db;
pub mod gallery;
pub mod storage;
pub mod validation;

pub use gallery::{GalleryEvent, GalleryStore, SharedGalleryStore, StoreOptions};

mod models;
pub mod seed;

pub use models::*;

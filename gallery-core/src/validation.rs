//! Input checks for the presentation layer
//!
//! The store trusts its inputs; forms run these before calling it.

use crate::db::{ArtworkPatch, NewArtwork};
use chrono::{Datelike, Utc};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),
    #[error("Image URL must not contain whitespace")]
    InvalidImageUrl,
    #[error("Year must be between 1 and {max}, got {year}")]
    YearOutOfRange { year: i32, max: i32 },
}

/// The current calendar year (UTC), the upper bound for artwork years
pub fn current_year() -> i32 {
    Utc::now().year()
}

fn require(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required(field));
    }
    Ok(())
}

fn check_image_url(url: &str) -> Result<(), ValidationError> {
    require(url, "Image URL")?;
    // Either an absolute URL or a site-relative path; both are whitespace-free.
    if url.trim().chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidImageUrl);
    }
    Ok(())
}

fn check_year(year: i32, max: i32) -> Result<(), ValidationError> {
    if !(1..=max).contains(&year) {
        return Err(ValidationError::YearOutOfRange { year, max });
    }
    Ok(())
}

/// Check every field of a new artwork against `1 <= year <= current_year`
pub fn validate_new_artwork(
    fields: &NewArtwork,
    current_year: i32,
) -> Result<(), ValidationError> {
    require(&fields.title, "Title")?;
    require(&fields.description, "Description")?;
    check_image_url(&fields.image_url)?;
    require(&fields.artist_id, "Artist")?;
    require(&fields.medium, "Medium")?;
    check_year(fields.year, current_year)
}

/// Check only the fields a patch sets
pub fn validate_artwork_patch(
    patch: &ArtworkPatch,
    current_year: i32,
) -> Result<(), ValidationError> {
    if let Some(title) = &patch.title {
        require(title, "Title")?;
    }
    if let Some(description) = &patch.description {
        require(description, "Description")?;
    }
    if let Some(image_url) = &patch.image_url {
        check_image_url(image_url)?;
    }
    if let Some(artist_id) = &patch.artist_id {
        require(artist_id, "Artist")?;
    }
    if let Some(medium) = &patch.medium {
        require(medium, "Medium")?;
    }
    if let Some(year) = patch.year {
        check_year(year, current_year)?;
    }
    Ok(())
}

/// Trim comment text; empty text is rejected
pub fn validate_comment_text(text: &str) -> Result<String, ValidationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required("Comment"));
    }
    Ok(trimmed.to_string())
}

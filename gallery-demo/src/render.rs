//! Plain-text views of the gallery for the terminal

use chrono::{DateTime, Utc};
use gallery_common::ViewerVote;
use gallery_core::db::{ArtistSummary, Artwork, Comment, FeedEntry};

fn date(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M").to_string()
}

fn vote_marker(vote: ViewerVote) -> &'static str {
    match vote {
        ViewerVote::Up => " [you: up]",
        ViewerVote::Down => " [you: down]",
        ViewerVote::None => "",
    }
}

pub fn artwork_line(artwork: &Artwork) -> String {
    format!(
        "{} ({}) {} - {}, {} | +{} -{} = {}{}",
        artwork.id,
        date(&artwork.created_at),
        artwork.title,
        artwork.medium,
        artwork.year,
        artwork.upvote_count,
        artwork.downvote_count,
        artwork.score(),
        vote_marker(artwork.viewer_vote),
    )
}

pub fn comment_line(comment: &Comment) -> String {
    let edited = match comment.updated_at {
        Some(ts) => format!(" (edited {})", date(&ts)),
        None => String::new(),
    };
    format!(
        "  [{}] {} {}{}",
        comment.id,
        date(&comment.created_at),
        comment.text,
        edited
    )
}

pub fn feed(entries: &[FeedEntry]) {
    if entries.is_empty() {
        println!("The gallery is empty.");
        return;
    }
    for entry in entries {
        println!("{}", artwork_line(&entry.artwork));
        println!("  by {}", entry.artist.name);
        for comment in &entry.comments {
            println!("{}", comment_line(comment));
        }
    }
}

pub fn artist_summary(summary: &ArtistSummary) {
    println!(
        "{}  {}  {} artworks, rating {} (+{} -{})",
        summary.artist.id,
        summary.artist.name,
        summary.artwork_count,
        summary.rating(),
        summary.total_upvotes,
        summary.total_downvotes,
    );
}

pub fn artwork_detail(artwork: &Artwork, artist_name: Option<&str>, comments: &[&Comment]) {
    println!("{}", artwork_line(artwork));
    println!("  by {}", artist_name.unwrap_or("unknown artist"));
    println!("  {}", artwork.description);
    println!("  {}", artwork.image_url);
    if comments.is_empty() {
        println!("  No comments yet.");
    }
    for comment in comments {
        println!("{}", comment_line(comment));
    }
}

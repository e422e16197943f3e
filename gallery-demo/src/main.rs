mod render;

use clap::{Parser, Subcommand, ValueEnum};
use gallery_common::ViewerVote;
use gallery_core::config::{gallery_dir, Config};
use gallery_core::db::{ArtworkPatch, NewArtwork, NewComment};
use gallery_core::storage::FileStore;
use gallery_core::validation::{
    current_year, validate_artwork_patch, validate_comment_text, validate_new_artwork,
};
use gallery_core::{GalleryStore, SharedGalleryStore, StoreOptions};
use std::path::PathBuf;
use tracing::{error, info, warn};

/// gallery demo - browse and edit the art gallery from a terminal.
#[derive(Parser)]
#[command(name = "gallery-demo")]
struct Args {
    /// Directory holding artworks.json, artists.json and comments.json.
    /// Overrides the configured data directory.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show every artwork, newest first, with its artist and comments
    Feed,
    /// List artists with their vote totals
    Artists,
    /// Show one artist and their artworks
    Artist { id: String },
    /// Show one artwork with its comments
    Artwork { id: String },
    /// Add a new artwork
    AddArtwork {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        image_url: String,
        #[arg(long)]
        artist_id: String,
        #[arg(long)]
        medium: String,
        #[arg(long)]
        year: i32,
    },
    /// Change some fields of an artwork
    EditArtwork {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        image_url: Option<String>,
        #[arg(long)]
        artist_id: Option<String>,
        #[arg(long)]
        medium: Option<String>,
        #[arg(long)]
        year: Option<i32>,
    },
    /// Vote on an artwork
    Vote {
        id: String,
        direction: VoteDirection,
        /// Count at most one vote from this viewer; pressing it again clears it
        #[arg(long)]
        toggle: bool,
    },
    /// Comment on an artwork
    Comment { artwork_id: String, text: String },
    /// Replace the text of a comment
    EditComment { id: String, text: String },
    /// Delete an artwork and its comments
    DeleteArtwork { id: String },
    /// Delete a comment
    DeleteComment { id: String },
    /// Print the effective configuration
    Config {
        /// Write it to config.yaml in the gallery directory
        #[arg(long)]
        save: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum VoteDirection {
    Up,
    Down,
}

impl From<VoteDirection> for ViewerVote {
    fn from(direction: VoteDirection) -> Self {
        match direction {
            VoteDirection::Up => ViewerVote::Up,
            VoteDirection::Down => ViewerVote::Down,
        }
    }
}

fn configure_logging() {
    use tracing_subscriber::prelude::*;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_line_number(true)
        .with_target(false)
        .with_file(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

fn exit_with(message: impl std::fmt::Display) -> ! {
    error!("{message}");
    std::process::exit(1);
}

fn main() {
    configure_logging();
    let args = Args::parse();

    let mut config = Config::load();
    if let Some(data_dir) = args.data_dir {
        config.data_dir = data_dir;
    }

    if let Command::Config { save } = args.command {
        print_config(&config, save);
        return;
    }

    info!("Opening gallery at {}", config.data_dir.display());
    let store = SharedGalleryStore::new(GalleryStore::open(
        FileStore::new(&config.data_dir),
        StoreOptions::from(&config),
    ));

    run(&store, args.command);

    // Covers writes made while opening as well as by the command itself.
    let unsaved = store.get().unsaved_keys();
    for key in &unsaved {
        warn!("Changes to {key} were not saved");
    }
    if !unsaved.is_empty() {
        std::process::exit(1);
    }
}

fn run(store: &SharedGalleryStore, command: Command) {
    match command {
        Command::Feed => render::feed(&store.get().feed()),
        Command::Artists => {
            for summary in store.get().artist_summaries() {
                render::artist_summary(&summary);
            }
        }
        Command::Artist { id } => {
            let gallery = store.get();
            let Some(summary) = gallery.artist_summary(&id) else {
                exit_with(format!("No artist with id {id}"));
            };
            render::artist_summary(&summary);
            println!("  {}", summary.artist.bio);
            for artwork in gallery.artworks_by_artist_id(&id) {
                println!("  {}", render::artwork_line(artwork));
            }
        }
        Command::Artwork { id } => {
            let gallery = store.get();
            let Some(artwork) = gallery.artwork_by_id(&id) else {
                exit_with(format!("No artwork with id {id}"));
            };
            let artist_name = gallery
                .artist_by_id(&artwork.artist_id)
                .map(|a| a.name.as_str());
            render::artwork_detail(artwork, artist_name, &gallery.comments_by_artwork_id(&id));
        }
        Command::AddArtwork {
            title,
            description,
            image_url,
            artist_id,
            medium,
            year,
        } => {
            let fields = NewArtwork {
                title,
                description,
                image_url,
                artist_id,
                medium,
                year,
            };
            if let Err(e) = validate_new_artwork(&fields, current_year()) {
                exit_with(e);
            }
            if store.get().artist_by_id(&fields.artist_id).is_none() {
                warn!("Artist {} does not exist yet", fields.artist_id);
            }
            let artwork = store.get_mut().add_artwork(fields);
            println!("Added {}", render::artwork_line(&artwork));
        }
        Command::EditArtwork {
            id,
            title,
            description,
            image_url,
            artist_id,
            medium,
            year,
        } => {
            let patch = ArtworkPatch {
                title,
                description,
                image_url,
                artist_id,
                medium,
                year,
            };
            if patch.is_empty() {
                exit_with("Nothing to change");
            }
            if let Err(e) = validate_artwork_patch(&patch, current_year()) {
                exit_with(e);
            }
            match store.get_mut().update_artwork(&id, patch) {
                Some(artwork) => println!("Updated {}", render::artwork_line(&artwork)),
                None => exit_with(format!("No artwork with id {id}")),
            }
        }
        Command::Vote {
            id,
            direction,
            toggle,
        } => {
            let mut gallery = store.get_mut();
            let voted = if toggle {
                gallery.toggle_vote(&id, direction.into()).map(|_| ())
            } else {
                match direction {
                    VoteDirection::Up => gallery.upvote_artwork(&id).map(|_| ()),
                    VoteDirection::Down => gallery.downvote_artwork(&id).map(|_| ()),
                }
            };
            if voted.is_none() {
                exit_with(format!("No artwork with id {id}"));
            }
            if let Some(artwork) = gallery.artwork_by_id(&id) {
                println!("{}", render::artwork_line(artwork));
            }
        }
        Command::Comment { artwork_id, text } => {
            let text = validate_comment_text(&text).unwrap_or_else(|e| exit_with(e));
            if store.get().artwork_by_id(&artwork_id).is_none() {
                exit_with(format!("No artwork with id {artwork_id}"));
            }
            let comment = store
                .get_mut()
                .add_comment(NewComment { artwork_id, text });
            println!("Added{}", render::comment_line(&comment));
        }
        Command::EditComment { id, text } => {
            let text = validate_comment_text(&text).unwrap_or_else(|e| exit_with(e));
            match store.get_mut().update_comment(&id, text) {
                Some(comment) => println!("Updated{}", render::comment_line(&comment)),
                None => exit_with(format!("No comment with id {id}")),
            }
        }
        Command::DeleteArtwork { id } => match store.get_mut().delete_artwork(&id) {
            Some(artwork) => println!("Deleted {} ({})", artwork.title, artwork.id),
            None => exit_with(format!("No artwork with id {id}")),
        },
        Command::DeleteComment { id } => match store.get_mut().delete_comment(&id) {
            Some(comment) => println!("Deleted comment {}", comment.id),
            None => exit_with(format!("No comment with id {id}")),
        },
        Command::Config { .. } => unreachable!("config is handled before the store opens"),
    }
}

fn print_config(config: &Config, save: bool) {
    println!("data dir:                {}", config.data_dir.display());
    println!("undo window:             {}s", config.undo_window.as_secs());
    println!("write empty collections: {}", config.write_empty_collections);

    if save {
        let dir = gallery_dir();
        if let Err(e) = config.save_to_gallery_dir(&dir) {
            exit_with(format!("Failed to save config to {}: {e}", dir.display()));
        }
        info!("Saved config to {}", dir.join("config.yaml").display());
    }
}

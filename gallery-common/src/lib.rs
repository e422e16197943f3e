pub mod viewer_vote;

pub use viewer_vote::ViewerVote;

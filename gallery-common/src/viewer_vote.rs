use serde::{Deserialize, Serialize};

/// The local viewer's vote on an artwork
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewerVote {
    None,
    Up,
    Down,
}

impl ViewerVote {
    pub fn is_none(&self) -> bool {
        matches!(self, ViewerVote::None)
    }

    /// Vote that results from the viewer pressing `pressed` while `self` is selected.
    ///
    /// Pressing the selected vote again clears it.
    pub fn toggled(self, pressed: ViewerVote) -> ViewerVote {
        if self == pressed {
            ViewerVote::None
        } else {
            pressed
        }
    }
}

#[allow(clippy::derivable_impls)]
impl Default for ViewerVote {
    fn default() -> Self {
        ViewerVote::None
    }
}

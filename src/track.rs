use serde::{Deserialize, Serialize};

use crate::common::types::UserId;

/// How a playlist entry is re-resolved when it has no cached stream URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackRef {
    /// A direct page URL (watch page, track page).
    Page(String),
    /// A free-text search query.
    Query(String),
}

impl TrackRef {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Page(s) | Self::Query(s) => s,
        }
    }
}

/// One playlist entry. The stream URL is resolved lazily on the first
/// playback attempt, never at import time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub title: String,
    pub reference: TrackRef,
    pub stream_url: Option<String>,
    pub requester: UserId,
}

impl Track {
    pub fn new(title: impl Into<String>, reference: TrackRef, requester: UserId) -> Self {
        Self {
            title: title.into(),
            reference,
            stream_url: None,
            requester,
        }
    }
}

/// Cursor-advance policy applied after a track ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoopMode {
    #[default]
    None,
    Single,
    Queue,
}

impl LoopMode {
    /// Rotation used by the loop button: none -> single -> queue -> none.
    pub fn cycled(self) -> Self {
        match self {
            Self::None => Self::Single,
            Self::Single => Self::Queue,
            Self::Queue => Self::None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::None => "off",
            Self::Single => "track",
            Self::Queue => "queue",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loop_mode_cycles_through_all_modes() {
        let mut mode = LoopMode::None;
        mode = mode.cycled();
        assert_eq!(mode, LoopMode::Single);
        mode = mode.cycled();
        assert_eq!(mode, LoopMode::Queue);
        mode = mode.cycled();
        assert_eq!(mode, LoopMode::None);
    }
}

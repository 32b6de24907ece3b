use async_trait::async_trait;
use thiserror::Error;

use crate::common::types::{ChannelId, MessageId};
use crate::session::state::GuildSession;
use crate::track::LoopMode;

/// Reference to the last-sent control panel. Panels are replaced on every
/// state change, never edited in place, so a stale handle only ever points
/// at a deleted message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelHandle {
    pub channel: ChannelId,
    pub message: MessageId,
}

#[derive(Debug, Error)]
pub enum SurfaceError {
    /// The message was already deleted. Ignored on panel replacement.
    #[error("message already gone")]
    Gone,

    #[error("send failed: {0}")]
    Send(String),
}

/// Pure projection of a session's state, recomputed on every render and
/// never diffed against a previous snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplaySnapshot {
    pub status: String,
    pub current: Option<String>,
    pub next: Option<String>,
    pub loop_label: &'static str,
    pub queue_len: usize,
}

impl DisplaySnapshot {
    pub fn capture(
        session: &GuildSession,
        playing: bool,
        paused: bool,
        status_override: Option<&str>,
    ) -> Self {
        let current = session.current_track().map(|t| t.title.clone());

        let status = if let Some(status) = status_override {
            status.to_string()
        } else if paused {
            "Paused".to_string()
        } else if playing && current.is_some() {
            "Playing".to_string()
        } else {
            "Stopped".to_string()
        };

        let len = session.playlist.len();
        let mut next_index = session.cursor + 1;
        if session.loop_mode == LoopMode::Queue && len > 0 {
            next_index = (session.cursor + 1).rem_euclid(len as isize);
        }
        let next = if next_index >= 0 && (next_index as usize) < len {
            Some(session.playlist[next_index as usize].title.clone())
        } else {
            None
        };

        Self {
            status,
            current,
            next,
            loop_label: session.loop_mode.label(),
            queue_len: len,
        }
    }
}

/// A snapshot plus the live transport pause state, which drives the
/// pause/resume toggle label on the rendered panel.
#[derive(Debug, Clone)]
pub struct PanelView {
    pub snapshot: DisplaySnapshot,
    pub paused: bool,
}

impl PanelView {
    pub fn pause_label(&self) -> &'static str {
        if self.paused { "Resume" } else { "Pause" }
    }
}

/// The external chat surface used to publish panels and status messages.
#[async_trait]
pub trait MessageSurface: Send + Sync {
    async fn send_panel(
        &self,
        channel: ChannelId,
        view: &PanelView,
    ) -> Result<PanelHandle, SurfaceError>;

    async fn delete_panel(&self, handle: &PanelHandle) -> Result<(), SurfaceError>;

    /// Short status message to the origin channel (resolution failures,
    /// skip notices). Failures are the surface's problem.
    async fn notify(&self, channel: ChannelId, text: &str);
}

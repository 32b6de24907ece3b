use crate::common::types::{ChannelId, GuildId, UserId};
use crate::display::panel::PanelHandle;
use crate::track::{LoopMode, Track};

/// Where a transition originated: the channel that receives status messages
/// and panels, and the invoking user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOrigin {
    pub channel: ChannelId,
    pub requester: UserId,
}

/// Read-only copy of the session handed to the queue view.
#[derive(Debug, Clone)]
pub struct QueueSnapshot {
    pub tracks: Vec<Track>,
    pub cursor: isize,
    pub loop_mode: LoopMode,
    pub active: bool,
}

/// Per-guild playback state. Owned exclusively by the session worker; every
/// mutation happens inside a single serialized transition.
///
/// Invariant: `-1 <= cursor <= playlist.len()`, where `cursor ==
/// playlist.len()` marks an exhausted run.
#[derive(Debug)]
pub struct GuildSession {
    pub guild_id: GuildId,
    pub playlist: Vec<Track>,
    /// Index of the selected track; -1 means none.
    pub cursor: isize,
    pub loop_mode: LoopMode,
    /// True while the sequencer intends to keep advancing. False means the
    /// run ended or was stopped; a future enqueue starts a new run.
    pub active: bool,
    /// Set by a direct jump while a source is live: the next end-of-track
    /// continuation must not advance the cursor again.
    pub suppress_advance: bool,
    /// Bumped on every transport hand-off and on stop. End-of-track signals
    /// carrying a stale epoch are dropped.
    pub epoch: u64,
    pub panel: Option<PanelHandle>,
    pub origin: Option<SessionOrigin>,
}

impl GuildSession {
    pub fn new(guild_id: GuildId) -> Self {
        Self {
            guild_id,
            playlist: Vec::new(),
            cursor: -1,
            loop_mode: LoopMode::None,
            active: false,
            suppress_advance: false,
            epoch: 0,
            panel: None,
            origin: None,
        }
    }

    pub fn current_track(&self) -> Option<&Track> {
        if self.cursor < 0 {
            return None;
        }
        self.playlist.get(self.cursor as usize)
    }

    /// Cursor step after a finished track: stationary under single-loop,
    /// consumed jump suppression, +1 otherwise. Wrap/end handling is the
    /// sequencer's job.
    pub fn advance_cursor(&mut self) {
        if self.suppress_advance {
            self.suppress_advance = false;
            return;
        }
        if self.loop_mode != LoopMode::Single {
            self.cursor += 1;
        }
    }

    /// Reset to the post-`stop()` state. Idempotent.
    pub fn reset(&mut self) {
        self.playlist.clear();
        self.cursor = -1;
        self.loop_mode = LoopMode::None;
        self.active = false;
        self.suppress_advance = false;
        self.epoch += 1;
    }

    pub fn snapshot(&self) -> QueueSnapshot {
        QueueSnapshot {
            tracks: self.playlist.clone(),
            cursor: self.cursor,
            loop_mode: self.loop_mode,
            active: self.active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::track::TrackRef;

    fn session(len: usize) -> GuildSession {
        let mut s = GuildSession::new(GuildId(1));
        s.playlist = (0..len)
            .map(|i| Track::new(format!("t{i}"), TrackRef::Query(format!("q{i}")), 1.into()))
            .collect();
        s
    }

    #[test]
    fn advance_is_stationary_under_single_loop() {
        let mut s = session(3);
        s.cursor = 1;
        s.loop_mode = LoopMode::Single;
        for _ in 0..5 {
            s.advance_cursor();
        }
        assert_eq!(s.cursor, 1);
    }

    #[test]
    fn advance_consumes_jump_suppression_once() {
        let mut s = session(5);
        s.cursor = 3;
        s.suppress_advance = true;
        s.advance_cursor();
        assert_eq!(s.cursor, 3);
        assert!(!s.suppress_advance);
        s.advance_cursor();
        assert_eq!(s.cursor, 4);
    }

    #[test]
    fn reset_is_idempotent_and_bumps_epoch() {
        let mut s = session(4);
        s.cursor = 2;
        s.active = true;
        s.loop_mode = LoopMode::Queue;
        let epoch = s.epoch;

        s.reset();
        s.reset();

        assert!(s.playlist.is_empty());
        assert_eq!(s.cursor, -1);
        assert_eq!(s.loop_mode, LoopMode::None);
        assert!(!s.active);
        assert!(s.epoch > epoch);
    }
}

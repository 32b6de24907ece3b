use std::sync::Arc;

use flume::{Receiver, Sender};
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::common::errors::CommandError;
use crate::common::types::GuildId;
use crate::configs::PlayerConfig;
use crate::display::panel::{DisplaySnapshot, MessageSurface, PanelView, SurfaceError};
use crate::session::state::{GuildSession, QueueSnapshot, SessionOrigin};
use crate::sources::resolver::TrackResolver;
use crate::track::{LoopMode, Track};
use crate::transport::{AudioTransport, ReconnectPolicy, TrackEndSignal};

/// Result of a pause/resume toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseToggle {
    Paused,
    Resumed,
}

/// One transition request. Every mutation of a guild's session flows
/// through this enum, including end-of-track continuations arriving from
/// the transport thread.
enum SessionCommand {
    Enqueue {
        tracks: Vec<Track>,
        origin: SessionOrigin,
        reply: oneshot::Sender<Result<usize, CommandError>>,
    },
    Skip {
        origin: SessionOrigin,
        reply: oneshot::Sender<Result<(), CommandError>>,
    },
    SkipTo {
        position: usize,
        origin: SessionOrigin,
        reply: oneshot::Sender<Result<(), CommandError>>,
    },
    Stop {
        origin: SessionOrigin,
        reply: oneshot::Sender<Result<(), CommandError>>,
    },
    PauseResume {
        origin: SessionOrigin,
        reply: oneshot::Sender<Result<PauseToggle, CommandError>>,
    },
    CycleLoop {
        origin: SessionOrigin,
        reply: oneshot::Sender<Result<LoopMode, CommandError>>,
    },
    SetLoop {
        mode: LoopMode,
        origin: SessionOrigin,
        reply: oneshot::Sender<Result<LoopMode, CommandError>>,
    },
    Queue {
        origin: SessionOrigin,
        reply: oneshot::Sender<Result<QueueSnapshot, CommandError>>,
    },
    TrackEnded {
        epoch: u64,
    },
}

/// Cloneable handle to one guild's session worker. All methods enqueue a
/// command and await its reply; commands are processed strictly one at a
/// time, so no two transitions for the same guild ever interleave.
#[derive(Clone)]
pub struct SessionHandle {
    guild_id: GuildId,
    tx: Sender<SessionCommand>,
}

impl SessionHandle {
    pub fn spawn(
        guild_id: GuildId,
        resolver: Arc<TrackResolver>,
        transport: Arc<dyn AudioTransport>,
        surface: Arc<dyn MessageSurface>,
        config: &PlayerConfig,
    ) -> Self {
        let (tx, rx) = flume::unbounded();
        let actor = SessionActor {
            state: GuildSession::new(guild_id),
            rx,
            tx: tx.clone(),
            resolver,
            transport,
            surface,
            reconnect: ReconnectPolicy::from(&config.reconnect),
        };
        tokio::spawn(actor.run());
        Self { guild_id, tx }
    }

    pub fn guild_id(&self) -> GuildId {
        self.guild_id
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<Result<T, CommandError>>) -> SessionCommand,
    ) -> Result<T, CommandError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(build(reply_tx))
            .map_err(|_| CommandError::SessionClosed)?;
        reply_rx.await.map_err(|_| CommandError::SessionClosed)?
    }

    /// Append tracks; starts playback when the session is idle. Returns the
    /// number of tracks added. Empty input is a no-op.
    pub async fn enqueue(
        &self,
        tracks: Vec<Track>,
        origin: SessionOrigin,
    ) -> Result<usize, CommandError> {
        self.request(|reply| SessionCommand::Enqueue {
            tracks,
            origin,
            reply,
        })
        .await
    }

    pub async fn skip(&self, origin: SessionOrigin) -> Result<(), CommandError> {
        self.request(|reply| SessionCommand::Skip { origin, reply })
            .await
    }

    /// Jump to a 1-based queue position.
    pub async fn skip_to(
        &self,
        position: usize,
        origin: SessionOrigin,
    ) -> Result<(), CommandError> {
        self.request(|reply| SessionCommand::SkipTo {
            position,
            origin,
            reply,
        })
        .await
    }

    pub async fn stop(&self, origin: SessionOrigin) -> Result<(), CommandError> {
        self.request(|reply| SessionCommand::Stop { origin, reply })
            .await
    }

    pub async fn pause_resume(&self, origin: SessionOrigin) -> Result<PauseToggle, CommandError> {
        self.request(|reply| SessionCommand::PauseResume { origin, reply })
            .await
    }

    pub async fn cycle_loop(&self, origin: SessionOrigin) -> Result<LoopMode, CommandError> {
        self.request(|reply| SessionCommand::CycleLoop { origin, reply })
            .await
    }

    pub async fn set_loop(
        &self,
        mode: LoopMode,
        origin: SessionOrigin,
    ) -> Result<LoopMode, CommandError> {
        self.request(|reply| SessionCommand::SetLoop {
            mode,
            origin,
            reply,
        })
        .await
    }

    pub async fn queue(&self, origin: SessionOrigin) -> Result<QueueSnapshot, CommandError> {
        self.request(|reply| SessionCommand::Queue { origin, reply })
            .await
    }
}

struct SessionActor {
    state: GuildSession,
    rx: Receiver<SessionCommand>,
    tx: Sender<SessionCommand>,
    resolver: Arc<TrackResolver>,
    transport: Arc<dyn AudioTransport>,
    surface: Arc<dyn MessageSurface>,
    reconnect: ReconnectPolicy,
}

impl SessionActor {
    async fn run(mut self) {
        while let Ok(command) = self.rx.recv_async().await {
            self.handle(command).await;
        }
        debug!(guild = %self.state.guild_id, "session worker shutting down");
    }

    /// Commands that originate in a channel must come from the channel the
    /// panel is bound to. When no panel exists, the command's channel
    /// becomes the new binding.
    fn bind_origin(&mut self, origin: SessionOrigin) -> Result<(), CommandError> {
        if let Some(panel) = &self.state.panel {
            if panel.channel != origin.channel {
                return Err(CommandError::WrongChannel {
                    bound: panel.channel,
                });
            }
        }
        self.state.origin = Some(origin);
        Ok(())
    }

    async fn handle(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::Enqueue {
                tracks,
                origin,
                reply,
            } => {
                if let Err(err) = self.bind_origin(origin) {
                    let _ = reply.send(Err(err));
                    return;
                }
                if tracks.is_empty() {
                    let _ = reply.send(Ok(0));
                    return;
                }
                let added = tracks.len();
                let pre_len = self.state.playlist.len();
                self.state.playlist.extend(tracks);
                let _ = reply.send(Ok(added));

                if self.state.active {
                    self.refresh_panel(None).await;
                } else {
                    self.state.cursor = pre_len as isize;
                    self.play_current().await;
                }
            }

            SessionCommand::Skip { origin, reply } => {
                if let Err(err) = self.bind_origin(origin) {
                    let _ = reply.send(Err(err));
                    return;
                }
                if self.transport.is_playing().await || self.transport.is_paused().await {
                    // The end-of-track continuation drives the advance.
                    self.transport.stop().await;
                    let _ = reply.send(Ok(()));
                } else {
                    let _ = reply.send(Err(CommandError::NothingPlaying));
                }
            }

            SessionCommand::SkipTo {
                position,
                origin,
                reply,
            } => {
                if let Err(err) = self.bind_origin(origin) {
                    let _ = reply.send(Err(err));
                    return;
                }
                let len = self.state.playlist.len();
                if position < 1 || position > len {
                    let _ = reply.send(Err(CommandError::InvalidPosition {
                        given: position,
                        len,
                    }));
                    return;
                }
                self.state.cursor = (position - 1) as isize;
                if self.transport.is_playing().await || self.transport.is_paused().await {
                    // The cursor already points at the target; the pending
                    // end-of-track continuation must not advance it again.
                    self.state.suppress_advance = true;
                    self.transport.stop().await;
                    let _ = reply.send(Ok(()));
                } else {
                    let _ = reply.send(Ok(()));
                    self.play_current().await;
                }
            }

            SessionCommand::Stop { origin, reply } => {
                if let Err(err) = self.bind_origin(origin) {
                    let _ = reply.send(Err(err));
                    return;
                }
                // Reset bumps the epoch first, so the end signal raised by
                // the transport stop below is already stale.
                self.state.reset();
                self.transport.stop().await;
                self.refresh_panel(Some("Stopped")).await;
                self.transport.disconnect().await;
                let _ = reply.send(Ok(()));
            }

            SessionCommand::PauseResume { origin, reply } => {
                if let Err(err) = self.bind_origin(origin) {
                    let _ = reply.send(Err(err));
                    return;
                }
                if self.transport.is_playing().await {
                    self.transport.pause().await;
                    self.refresh_panel(Some("Paused")).await;
                    let _ = reply.send(Ok(PauseToggle::Paused));
                } else if self.transport.is_paused().await {
                    self.transport.resume().await;
                    self.refresh_panel(Some("Playing")).await;
                    let _ = reply.send(Ok(PauseToggle::Resumed));
                } else {
                    let _ = reply.send(Err(CommandError::NothingPlaying));
                }
            }

            SessionCommand::CycleLoop { origin, reply } => {
                if let Err(err) = self.bind_origin(origin) {
                    let _ = reply.send(Err(err));
                    return;
                }
                self.state.loop_mode = self.state.loop_mode.cycled();
                self.refresh_panel(None).await;
                let _ = reply.send(Ok(self.state.loop_mode));
            }

            SessionCommand::SetLoop {
                mode,
                origin,
                reply,
            } => {
                if let Err(err) = self.bind_origin(origin) {
                    let _ = reply.send(Err(err));
                    return;
                }
                self.state.loop_mode = mode;
                self.refresh_panel(None).await;
                let _ = reply.send(Ok(mode));
            }

            SessionCommand::Queue { origin, reply } => {
                if let Err(err) = self.bind_origin(origin) {
                    let _ = reply.send(Err(err));
                    return;
                }
                let _ = reply.send(Ok(self.state.snapshot()));
            }

            SessionCommand::TrackEnded { epoch } => {
                if epoch != self.state.epoch {
                    debug!(guild = %self.state.guild_id, "dropping stale end-of-track signal");
                    return;
                }
                if !self.state.active {
                    return;
                }
                self.state.advance_cursor();
                self.play_current().await;
            }
        }
    }

    /// Resolve and start the track under the cursor, skipping forward past
    /// failures. Bounded by the playlist length so a fully broken playlist
    /// terminates as if the queue were exhausted.
    async fn play_current(&mut self) {
        let mut attempts = 0usize;
        loop {
            let len = self.state.playlist.len();
            if len == 0 || self.state.cursor < 0 {
                self.end_run().await;
                return;
            }
            if self.state.loop_mode != LoopMode::Single && self.state.cursor >= len as isize {
                if self.state.loop_mode == LoopMode::Queue {
                    self.state.cursor = 0;
                } else {
                    self.end_run().await;
                    return;
                }
            }
            if attempts >= len {
                self.end_run().await;
                return;
            }
            attempts += 1;

            let index = self.state.cursor as usize;
            let Some(track) = self.state.playlist.get(index) else {
                self.end_run().await;
                return;
            };

            let stream_url = match track.stream_url.clone() {
                Some(url) => url,
                None => {
                    let reference = track.reference.clone();
                    match self.resolver.resolve(&reference).await {
                        Ok(resolved) => {
                            let track = &mut self.state.playlist[index];
                            track.stream_url = Some(resolved.stream_url.clone());
                            if let Some(title) = resolved.title {
                                track.title = title;
                            }
                            resolved.stream_url
                        }
                        Err(err) => {
                            self.report_failure(index, &err.to_string()).await;
                            if self.state.loop_mode == LoopMode::Single {
                                self.end_run().await;
                                return;
                            }
                            self.state.cursor += 1;
                            continue;
                        }
                    }
                }
            };

            self.state.epoch += 1;
            let signal = {
                let tx = self.tx.clone();
                let epoch = self.state.epoch;
                TrackEndSignal::new(move || {
                    let _ = tx.send(SessionCommand::TrackEnded { epoch });
                })
            };

            match self
                .transport
                .play(&stream_url, &self.reconnect, signal)
                .await
            {
                Ok(()) => {
                    self.state.active = true;
                    self.refresh_panel(None).await;
                    return;
                }
                Err(err) => {
                    self.report_failure(index, &err.to_string()).await;
                    if self.state.loop_mode == LoopMode::Single {
                        self.end_run().await;
                        return;
                    }
                    self.state.cursor += 1;
                }
            }
        }
    }

    /// Terminal for this activation; a future enqueue starts a new run.
    async fn end_run(&mut self) {
        self.state.active = false;
        self.state.suppress_advance = false;
        self.refresh_panel(Some("Queue finished")).await;
    }

    async fn report_failure(&self, index: usize, err: &str) {
        let title = self
            .state
            .playlist
            .get(index)
            .map(|t| t.title.as_str())
            .unwrap_or("unknown");
        warn!(guild = %self.state.guild_id, title, err, "track failed, skipping");
        if let Some(origin) = self.state.origin {
            self.surface
                .notify(
                    origin.channel,
                    &format!("Could not play **{title}**: {err}. Skipping."),
                )
                .await;
        }
    }

    /// Replace the control panel: delete the old one (ignoring
    /// already-gone), send a fresh one bound to the current state. A failed
    /// send clears the handle and the next transition tries again.
    async fn refresh_panel(&mut self, status_override: Option<&str>) {
        let Some(origin) = self.state.origin else {
            return;
        };

        if let Some(handle) = self.state.panel.take() {
            match self.surface.delete_panel(&handle).await {
                Ok(()) | Err(SurfaceError::Gone) => {}
                Err(err) => {
                    debug!(guild = %self.state.guild_id, %err, "failed to delete old panel")
                }
            }
        }

        let playing = self.transport.is_playing().await;
        let paused = self.transport.is_paused().await;
        let view = PanelView {
            snapshot: DisplaySnapshot::capture(&self.state, playing, paused, status_override),
            paused,
        };

        match self.surface.send_panel(origin.channel, &view).await {
            Ok(handle) => self.state.panel = Some(handle),
            Err(err) => {
                warn!(guild = %self.state.guild_id, %err, "failed to send control panel");
            }
        }
    }
}

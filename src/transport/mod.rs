use std::sync::Arc;

use async_trait::async_trait;

use crate::common::errors::TransportError;
use crate::common::types::GuildId;
use crate::configs::ReconnectConfig;

/// Reconnect behavior handed to the transport alongside a stream URL, so a
/// dropped CDN connection is retried instead of ending the track.
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    pub enabled: bool,
    pub max_delay_secs: u64,
}

impl From<&ReconnectConfig> for ReconnectPolicy {
    fn from(config: &ReconnectConfig) -> Self {
        Self {
            enabled: config.enabled,
            max_delay_secs: config.max_delay_secs,
        }
    }
}

/// Completion handle the transport raises when the current source finishes
/// or errors. Raising it only enqueues a continuation on the owning
/// session's command queue; the transport thread never mutates session
/// state directly.
#[derive(Clone)]
pub struct TrackEndSignal {
    notify: Arc<dyn Fn() + Send + Sync>,
}

impl TrackEndSignal {
    pub fn new(notify: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            notify: Arc::new(notify),
        }
    }

    pub fn raise(&self) {
        (self.notify)();
    }
}

impl std::fmt::Debug for TrackEndSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("TrackEndSignal")
    }
}

/// The external voice/audio transport for one guild.
#[async_trait]
pub trait AudioTransport: Send + Sync {
    /// Build a source from the stream URL and start playing it. The signal
    /// must be raised exactly once, when the source finishes or errors.
    async fn play(
        &self,
        stream_url: &str,
        reconnect: &ReconnectPolicy,
        on_end: TrackEndSignal,
    ) -> Result<(), TransportError>;

    /// Stop the current source, raising its end signal.
    async fn stop(&self);

    async fn pause(&self);

    async fn resume(&self);

    async fn is_playing(&self) -> bool;

    async fn is_paused(&self) -> bool;

    async fn disconnect(&self);
}

/// Hands out the per-guild transport when a session is first created.
pub trait TransportProvider: Send + Sync {
    fn transport_for(&self, guild_id: &GuildId) -> Arc<dyn AudioTransport>;
}

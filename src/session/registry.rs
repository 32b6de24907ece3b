use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use crate::common::types::GuildId;
use crate::configs::PlayerConfig;
use crate::display::panel::MessageSurface;
use crate::session::actor::SessionHandle;
use crate::sources::resolver::TrackResolver;
use crate::transport::TransportProvider;

/// Process-wide guild -> session mapping. Sessions are created lazily on
/// first lookup and live until process exit. Creation is atomic with
/// respect to concurrent first-lookups for the same guild.
pub struct SessionRegistry {
    sessions: DashMap<GuildId, SessionHandle>,
    resolver: Arc<TrackResolver>,
    transports: Arc<dyn TransportProvider>,
    surface: Arc<dyn MessageSurface>,
    config: PlayerConfig,
}

impl SessionRegistry {
    pub fn new(
        resolver: Arc<TrackResolver>,
        transports: Arc<dyn TransportProvider>,
        surface: Arc<dyn MessageSurface>,
        config: PlayerConfig,
    ) -> Self {
        Self {
            sessions: DashMap::new(),
            resolver,
            transports,
            surface,
            config,
        }
    }

    pub fn get_or_create(&self, guild_id: GuildId) -> SessionHandle {
        self.sessions
            .entry(guild_id)
            .or_insert_with(|| {
                debug!(guild = %guild_id, "creating session");
                SessionHandle::spawn(
                    guild_id,
                    self.resolver.clone(),
                    self.transports.transport_for(&guild_id),
                    self.surface.clone(),
                    &self.config,
                )
            })
            .clone()
    }

    pub fn get(&self, guild_id: &GuildId) -> Option<SessionHandle> {
        self.sessions.get(guild_id).map(|h| h.clone())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::errors::{ResolutionError, TransportError};
    use crate::common::types::ChannelId;
    use crate::display::panel::{PanelHandle, PanelView, SurfaceError};
    use crate::sources::extractor::{Extraction, MediaExtractor};
    use crate::transport::{AudioTransport, ReconnectPolicy, TrackEndSignal};
    use async_trait::async_trait;
    use futures::future::join_all;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct NoExtractor;

    #[async_trait]
    impl MediaExtractor for NoExtractor {
        async fn extract(&self, _query: &str, _flat: bool) -> Result<Extraction, ResolutionError> {
            Err(ResolutionError::NotFound)
        }
    }

    struct NullTransport;

    #[async_trait]
    impl AudioTransport for NullTransport {
        async fn play(
            &self,
            _stream_url: &str,
            _reconnect: &ReconnectPolicy,
            _on_end: TrackEndSignal,
        ) -> Result<(), TransportError> {
            Ok(())
        }
        async fn stop(&self) {}
        async fn pause(&self) {}
        async fn resume(&self) {}
        async fn is_playing(&self) -> bool {
            false
        }
        async fn is_paused(&self) -> bool {
            false
        }
        async fn disconnect(&self) {}
    }

    struct NullSurface;

    #[async_trait]
    impl crate::display::panel::MessageSurface for NullSurface {
        async fn send_panel(
            &self,
            _channel: ChannelId,
            _view: &PanelView,
        ) -> Result<PanelHandle, SurfaceError> {
            Err(SurfaceError::Send("null".into()))
        }
        async fn delete_panel(&self, _handle: &PanelHandle) -> Result<(), SurfaceError> {
            Ok(())
        }
        async fn notify(&self, _channel: ChannelId, _text: &str) {}
    }

    struct CountingProvider {
        created: AtomicUsize,
    }

    impl TransportProvider for CountingProvider {
        fn transport_for(&self, _guild_id: &GuildId) -> Arc<dyn AudioTransport> {
            self.created.fetch_add(1, Ordering::SeqCst);
            Arc::new(NullTransport)
        }
    }

    fn registry(provider: Arc<CountingProvider>) -> Arc<SessionRegistry> {
        Arc::new(SessionRegistry::new(
            Arc::new(TrackResolver::new(Arc::new(NoExtractor))),
            provider,
            Arc::new(NullSurface),
            PlayerConfig::default(),
        ))
    }

    #[tokio::test]
    async fn concurrent_first_lookups_create_one_session() {
        let provider = Arc::new(CountingProvider {
            created: AtomicUsize::new(0),
        });
        let registry = registry(provider.clone());

        let tasks = (0..16).map(|_| {
            let registry = registry.clone();
            tokio::spawn(async move {
                registry.get_or_create(GuildId(42));
            })
        });
        for joined in join_all(tasks).await {
            joined.unwrap();
        }

        assert_eq!(registry.len(), 1);
        assert_eq!(provider.created.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn guilds_get_independent_sessions() {
        let provider = Arc::new(CountingProvider {
            created: AtomicUsize::new(0),
        });
        let registry = registry(provider.clone());

        registry.get_or_create(GuildId(1));
        registry.get_or_create(GuildId(2));
        registry.get_or_create(GuildId(1));

        assert_eq!(registry.len(), 2);
        assert_eq!(provider.created.load(Ordering::SeqCst), 2);
        assert!(registry.get(&GuildId(2)).is_some());
        assert!(registry.get(&GuildId(3)).is_none());
    }
}

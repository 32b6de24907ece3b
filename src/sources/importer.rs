use std::sync::Arc;

use regex::Regex;
use tracing::warn;

use crate::common::errors::ResolutionError;
use crate::common::types::UserId;
use crate::configs::PlayerConfig;
use crate::sources::catalog::CatalogApi;
use crate::sources::resolver::TrackResolver;
use crate::track::{Track, TrackRef};

const PLAYLIST_PAGE_LIMIT: usize = 100;
const ALBUM_PAGE_LIMIT: usize = 50;

/// Expands a user query into unresolved playlist entries: a catalog
/// playlist/album/track, a link-list URL, or a plain search. Stream URLs
/// are never fetched here.
pub struct PlaylistImporter {
    resolver: Arc<TrackResolver>,
    catalog: Arc<dyn CatalogApi>,
    config: PlayerConfig,
    track_re: Regex,
    playlist_re: Regex,
    album_re: Regex,
}

impl PlaylistImporter {
    pub fn new(
        resolver: Arc<TrackResolver>,
        catalog: Arc<dyn CatalogApi>,
        config: PlayerConfig,
    ) -> Self {
        Self {
            resolver,
            catalog,
            config,
            track_re: Regex::new(r"open\.spotify\.com/track/([A-Za-z0-9]+)")
                .expect("static regex"),
            playlist_re: Regex::new(r"open\.spotify\.com/playlist/([A-Za-z0-9]+)")
                .expect("static regex"),
            album_re: Regex::new(r"open\.spotify\.com/album/([A-Za-z0-9]+)")
                .expect("static regex"),
        }
    }

    pub async fn import(
        &self,
        query: &str,
        requester: UserId,
    ) -> Result<Vec<Track>, ResolutionError> {
        if let Some(id) = capture(&self.playlist_re, query) {
            return self
                .import_catalog(CatalogKind::Playlist, &id, requester)
                .await;
        }
        if let Some(id) = capture(&self.album_re, query) {
            return self
                .import_catalog(CatalogKind::Album, &id, requester)
                .await;
        }
        if is_link_list(query) {
            return self.import_link_list(query, requester).await;
        }

        // Catalog track links are converted into a search query first.
        let search_query = if let Some(id) = capture(&self.track_re, query) {
            self.catalog.track(&id).await?.search_query()
        } else {
            query.to_string()
        };

        let seed = self.resolver.lookup(&search_query).await?;
        let reference = match seed.page_url {
            Some(url) => TrackRef::Page(url),
            None => TrackRef::Query(search_query),
        };
        Ok(vec![Track::new(seed.title, reference, requester)])
    }

    async fn import_link_list(
        &self,
        url: &str,
        requester: UserId,
    ) -> Result<Vec<Track>, ResolutionError> {
        let seeds = self
            .resolver
            .expand_flat(url, self.config.max_link_list_import)
            .await?;

        Ok(seeds
            .into_iter()
            .map(|seed| {
                let reference = match seed.page_url {
                    Some(url) => TrackRef::Page(url),
                    None => TrackRef::Query(seed.title.clone()),
                };
                Track::new(seed.title, reference, requester)
            })
            .collect())
    }

    async fn import_catalog(
        &self,
        kind: CatalogKind,
        id: &str,
        requester: UserId,
    ) -> Result<Vec<Track>, ResolutionError> {
        let (cap, limit) = match kind {
            CatalogKind::Playlist => (self.config.max_playlist_import, PLAYLIST_PAGE_LIMIT),
            CatalogKind::Album => (self.config.max_album_import, ALBUM_PAGE_LIMIT),
        };

        let mut tracks = Vec::new();
        let mut offset = 0;
        loop {
            let page = match kind {
                CatalogKind::Playlist => self.catalog.playlist_items(id, offset, limit).await,
                CatalogKind::Album => self.catalog.album_tracks(id, offset, limit).await,
            };
            let page = match page {
                Ok(page) => page,
                Err(err) if tracks.is_empty() => return Err(err),
                Err(err) => {
                    // Keep what was already imported.
                    warn!(id, %err, "catalog import aborted mid-listing");
                    break;
                }
            };

            for item in &page.items {
                if tracks.len() >= cap {
                    break;
                }
                tracks.push(Track::new(
                    item.name.clone(),
                    TrackRef::Query(item.search_query()),
                    requester,
                ));
            }

            if tracks.len() >= cap || !page.has_more {
                break;
            }
            offset += limit;
        }

        Ok(tracks)
    }
}

enum CatalogKind {
    Playlist,
    Album,
}

fn capture(re: &Regex, query: &str) -> Option<String> {
    re.captures(query)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

fn is_link_list(query: &str) -> bool {
    ["youtube.com/playlist", "list=", "soundcloud.com/sets/"]
        .iter()
        .any(|marker| query.contains(marker))
}

use async_trait::async_trait;

use crate::common::errors::ResolutionError;

/// One track as listed by the catalog. The pair doubles as the search query
/// used to resolve it later.
#[derive(Debug, Clone)]
pub struct CatalogTrack {
    pub name: String,
    pub artist: String,
}

impl CatalogTrack {
    pub fn search_query(&self) -> String {
        format!("{} {}", self.name, self.artist)
    }
}

/// One page of a paginated catalog listing.
#[derive(Debug, Clone)]
pub struct CatalogPage {
    pub items: Vec<CatalogTrack>,
    pub has_more: bool,
}

/// The external music-catalog API used for playlist/album imports.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn track(&self, id: &str) -> Result<CatalogTrack, ResolutionError>;

    async fn playlist_items(
        &self,
        id: &str,
        offset: usize,
        limit: usize,
    ) -> Result<CatalogPage, ResolutionError>;

    async fn album_tracks(
        &self,
        id: &str,
        offset: usize,
        limit: usize,
    ) -> Result<CatalogPage, ResolutionError>;
}

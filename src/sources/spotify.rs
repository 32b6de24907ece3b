use std::sync::Arc;

use base64::Engine;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, error};

use crate::common::errors::ResolutionError;
use crate::common::types::{SharedRw, now_ms};
use crate::configs::CatalogConfig;
use crate::sources::catalog::{CatalogApi, CatalogPage, CatalogTrack};

const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const API_BASE: &str = "https://api.spotify.com/v1";

#[derive(Clone, Debug)]
struct CatalogToken {
    access_token: String,
    expiry_ms: u64,
}

/// Catalog client over the Spotify Web API with a cached
/// client-credentials token.
pub struct SpotifyCatalog {
    client: reqwest::Client,
    config: CatalogConfig,
    token: SharedRw<Option<CatalogToken>>,
}

impl SpotifyCatalog {
    pub fn new(client: reqwest::Client, config: CatalogConfig) -> Self {
        Self {
            client,
            config,
            token: Arc::new(RwLock::new(None)),
        }
    }

    async fn get_token(&self) -> Result<String, ResolutionError> {
        {
            let token_lock = self.token.read().await;
            if let Some(token) = &*token_lock {
                // Keep a 5-second margin before expiry to account for request time
                if token.expiry_ms > now_ms() + 5_000 {
                    return Ok(token.access_token.clone());
                }
            }
        }
        self.refresh_token().await
    }

    async fn refresh_token(&self) -> Result<String, ResolutionError> {
        debug!("Refreshing catalog token...");
        let credentials = base64::engine::general_purpose::STANDARD.encode(format!(
            "{}:{}",
            self.config.client_id, self.config.client_secret
        ));

        let resp = self
            .client
            .post(TOKEN_URL)
            .header("Authorization", format!("Basic {credentials}"))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        if !resp.status().is_success() {
            error!("Token endpoint returned status {}", resp.status());
            return Err(ResolutionError::Network(format!(
                "token endpoint returned {}",
                resp.status()
            )));
        }

        let body: Value = resp.json().await?;
        let access_token = body
            .get("access_token")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ResolutionError::Network("token missing in response".into()))?
            .to_string();
        let expires_in = body
            .get("expires_in")
            .and_then(|v| v.as_u64())
            .unwrap_or(3600);

        let mut token_lock = self.token.write().await;
        *token_lock = Some(CatalogToken {
            access_token: access_token.clone(),
            expiry_ms: now_ms() + expires_in * 1000,
        });

        Ok(access_token)
    }

    async fn get_json(&self, url: &str) -> Result<Value, ResolutionError> {
        let token = self.get_token().await?;
        let resp = self.client.get(url).bearer_auth(token).send().await?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ResolutionError::NotFound);
        }
        if !resp.status().is_success() {
            return Err(ResolutionError::Network(format!(
                "catalog returned {}",
                resp.status()
            )));
        }
        Ok(resp.json().await?)
    }
}

fn parse_track(value: &Value) -> Option<CatalogTrack> {
    let name = value.get("name")?.as_str()?.to_string();
    let artist = value
        .get("artists")
        .and_then(|a| a.as_array())
        .and_then(|a| a.first())
        .and_then(|a| a.get("name"))
        .and_then(|n| n.as_str())
        .unwrap_or_default()
        .to_string();
    Some(CatalogTrack { name, artist })
}

fn parse_page(body: &Value, nested_track: bool) -> CatalogPage {
    let items = body
        .get("items")
        .and_then(|i| i.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|item| {
                    let track_val = if nested_track { item.get("track")? } else { item };
                    parse_track(track_val)
                })
                .collect()
        })
        .unwrap_or_default();

    let has_more = body.get("next").map(|n| !n.is_null()).unwrap_or(false);

    CatalogPage { items, has_more }
}

#[async_trait::async_trait]
impl CatalogApi for SpotifyCatalog {
    async fn track(&self, id: &str) -> Result<CatalogTrack, ResolutionError> {
        let body = self
            .get_json(&format!("{API_BASE}/tracks/{}", urlencoding::encode(id)))
            .await?;
        parse_track(&body).ok_or(ResolutionError::NotFound)
    }

    async fn playlist_items(
        &self,
        id: &str,
        offset: usize,
        limit: usize,
    ) -> Result<CatalogPage, ResolutionError> {
        let body = self
            .get_json(&format!(
                "{API_BASE}/playlists/{}/tracks?offset={offset}&limit={limit}",
                urlencoding::encode(id)
            ))
            .await?;
        Ok(parse_page(&body, true))
    }

    async fn album_tracks(
        &self,
        id: &str,
        offset: usize,
        limit: usize,
    ) -> Result<CatalogPage, ResolutionError> {
        let body = self
            .get_json(&format!(
                "{API_BASE}/albums/{}/tracks?offset={offset}&limit={limit}",
                urlencoding::encode(id)
            ))
            .await?;
        Ok(parse_page(&body, false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_playlist_page_with_nested_tracks() {
        let body = json!({
            "items": [
                { "track": { "name": "Song A", "artists": [{ "name": "Artist A" }] } },
                { "track": null },
                { "track": { "name": "Song B", "artists": [] } }
            ],
            "next": "https://api.spotify.com/v1/playlists/x/tracks?offset=100"
        });
        let page = parse_page(&body, true);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].search_query(), "Song A Artist A");
        assert_eq!(page.items[1].artist, "");
        assert!(page.has_more);
    }

    #[test]
    fn album_page_without_next_is_final() {
        let body = json!({
            "items": [ { "name": "Song C", "artists": [{ "name": "Artist C" }] } ],
            "next": null
        });
        let page = parse_page(&body, false);
        assert_eq!(page.items.len(), 1);
        assert!(!page.has_more);
    }
}

use std::sync::Arc;

use tracing::debug;

use crate::common::errors::ResolutionError;
use crate::sources::extractor::{ExtractedItem, MediaExtractor};
use crate::track::TrackRef;

/// A playable stream plus the corrected display title.
#[derive(Debug, Clone)]
pub struct ResolvedStream {
    pub stream_url: String,
    pub title: Option<String>,
}

/// Cheap metadata-only search result, used when adding a single track.
#[derive(Debug, Clone)]
pub struct TrackSeed {
    pub title: String,
    pub page_url: Option<String>,
}

/// Turns a track reference into a playable stream URL via the extractor.
pub struct TrackResolver {
    extractor: Arc<dyn MediaExtractor>,
}

impl TrackResolver {
    pub fn new(extractor: Arc<dyn MediaExtractor>) -> Self {
        Self { extractor }
    }

    /// Full resolution: probe the reference and pick a stream URL.
    pub async fn resolve(&self, reference: &TrackRef) -> Result<ResolvedStream, ResolutionError> {
        let item = self
            .extractor
            .extract(reference.as_str(), false)
            .await?
            .into_first()?;

        let stream_url = select_stream_url(&item)?;
        debug!(reference = reference.as_str(), "resolved stream");

        Ok(ResolvedStream {
            stream_url,
            title: item.title,
        })
    }

    /// Metadata-only lookup for a single-track add. Stream resolution is
    /// deferred to the first playback attempt.
    pub async fn lookup(&self, query: &str) -> Result<TrackSeed, ResolutionError> {
        let item = self.extractor.extract(query, false).await?.into_first()?;

        Ok(TrackSeed {
            title: item.title.unwrap_or_else(|| "Unknown title".to_string()),
            page_url: item.webpage_url,
        })
    }

    /// Flat expansion of a link-list URL into seeds, capped at `max`.
    /// An empty entries list yields zero seeds, not an error.
    pub async fn expand_flat(
        &self,
        url: &str,
        max: usize,
    ) -> Result<Vec<TrackSeed>, ResolutionError> {
        let entries = match self.extractor.extract(url, true).await? {
            super::extractor::Extraction::Entries(entries) => entries,
            super::extractor::Extraction::Item(item) => vec![item],
        };

        let mut seeds = Vec::new();
        for entry in entries {
            if seeds.len() >= max {
                break;
            }
            let Some(reference) = entry.webpage_url else {
                continue;
            };
            // Flat entries may carry a bare video id instead of a URL.
            let page_url = if reference.starts_with("http") {
                reference
            } else {
                format!("https://www.youtube.com/watch?v={reference}")
            };
            seeds.push(TrackSeed {
                title: entry.title.unwrap_or_else(|| "Unknown title".to_string()),
                page_url: Some(page_url),
            });
        }
        Ok(seeds)
    }
}

/// Stream selection policy: prefer the explicit direct URL; otherwise the
/// first format with a present, non-"none" audio codec; otherwise the first
/// format that has a URL at all.
fn select_stream_url(item: &ExtractedItem) -> Result<String, ResolutionError> {
    if let Some(url) = &item.direct_url {
        return Ok(url.clone());
    }

    for format in &item.formats {
        let Some(url) = &format.url else { continue };
        if let Some(codec) = &format.audio_codec {
            if codec != "none" {
                return Ok(url.clone());
            }
        }
    }

    item.formats
        .iter()
        .find_map(|f| f.url.clone())
        .ok_or(ResolutionError::NoStream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::extractor::{Extraction, FormatCandidate};
    use async_trait::async_trait;

    fn format(url: Option<&str>, codec: Option<&str>) -> FormatCandidate {
        FormatCandidate {
            url: url.map(str::to_string),
            audio_codec: codec.map(str::to_string),
        }
    }

    #[test]
    fn prefers_explicit_direct_url() {
        let item = ExtractedItem {
            direct_url: Some("https://cdn.example/direct".into()),
            formats: vec![format(Some("https://cdn.example/a"), Some("opus"))],
            ..Default::default()
        };
        assert_eq!(
            select_stream_url(&item).unwrap(),
            "https://cdn.example/direct"
        );
    }

    #[test]
    fn picks_first_format_with_audio_codec() {
        let item = ExtractedItem {
            formats: vec![
                format(Some("https://cdn.example/video"), Some("none")),
                format(None, Some("opus")),
                format(Some("https://cdn.example/audio"), Some("mp4a.40.2")),
                format(Some("https://cdn.example/later"), Some("opus")),
            ],
            ..Default::default()
        };
        assert_eq!(
            select_stream_url(&item).unwrap(),
            "https://cdn.example/audio"
        );
    }

    #[test]
    fn falls_back_to_first_format_url() {
        let item = ExtractedItem {
            formats: vec![
                format(None, None),
                format(Some("https://cdn.example/any"), Some("none")),
            ],
            ..Default::default()
        };
        assert_eq!(select_stream_url(&item).unwrap(), "https://cdn.example/any");
    }

    #[test]
    fn no_candidates_is_no_stream() {
        let item = ExtractedItem::default();
        assert!(matches!(
            select_stream_url(&item),
            Err(ResolutionError::NoStream)
        ));
    }

    struct FlatExtractor;

    #[async_trait]
    impl MediaExtractor for FlatExtractor {
        async fn extract(&self, _query: &str, flat: bool) -> Result<Extraction, ResolutionError> {
            assert!(flat);
            Ok(Extraction::Entries(vec![
                ExtractedItem {
                    title: Some("First".into()),
                    webpage_url: Some("dQw4w9WgXcQ".into()),
                    ..Default::default()
                },
                ExtractedItem {
                    title: None,
                    webpage_url: Some("https://example.com/watch?v=abc".into()),
                    ..Default::default()
                },
                ExtractedItem {
                    title: Some("No reference".into()),
                    webpage_url: None,
                    ..Default::default()
                },
                ExtractedItem {
                    title: Some("Past the cap".into()),
                    webpage_url: Some("xyz".into()),
                    ..Default::default()
                },
            ]))
        }
    }

    #[tokio::test]
    async fn flat_expansion_normalizes_ids_and_honors_cap() {
        let resolver = TrackResolver::new(Arc::new(FlatExtractor));
        let seeds = resolver.expand_flat("https://example.com/list", 2).await.unwrap();

        assert_eq!(seeds.len(), 2);
        assert_eq!(
            seeds[0].page_url.as_deref(),
            Some("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
        );
        assert_eq!(seeds[1].title, "Unknown title");
        assert_eq!(
            seeds[1].page_url.as_deref(),
            Some("https://example.com/watch?v=abc")
        );
    }

    struct EmptyExtractor;

    #[async_trait]
    impl MediaExtractor for EmptyExtractor {
        async fn extract(&self, _query: &str, _flat: bool) -> Result<Extraction, ResolutionError> {
            Ok(Extraction::Entries(Vec::new()))
        }
    }

    #[tokio::test]
    async fn empty_entries_expand_to_zero_seeds_without_error() {
        let resolver = TrackResolver::new(Arc::new(EmptyExtractor));
        let seeds = resolver.expand_flat("https://example.com/list", 10).await.unwrap();
        assert!(seeds.is_empty());
    }

    #[tokio::test]
    async fn single_lookup_on_empty_entries_is_not_found() {
        let resolver = TrackResolver::new(Arc::new(EmptyExtractor));
        assert!(matches!(
            resolver.lookup("some query").await,
            Err(ResolutionError::NotFound)
        ));
    }
}

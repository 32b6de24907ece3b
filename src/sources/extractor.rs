use async_trait::async_trait;

use crate::common::errors::ResolutionError;

/// One candidate stream variant of an extraction result.
#[derive(Debug, Clone, Default)]
pub struct FormatCandidate {
    pub url: Option<String>,
    /// Audio codec name; the sentinel "none" marks a video-only variant.
    pub audio_codec: Option<String>,
}

/// One extracted item: either a fully probed page or, in flat mode, a
/// minimal title + reference pair.
#[derive(Debug, Clone, Default)]
pub struct ExtractedItem {
    pub title: Option<String>,
    pub webpage_url: Option<String>,
    /// Explicit direct stream URL, preferred over format scanning.
    pub direct_url: Option<String>,
    pub formats: Vec<FormatCandidate>,
}

/// Shape of an extractor response: a single item, or an entries list.
/// Callers that asked for a single result take the first entry.
#[derive(Debug, Clone)]
pub enum Extraction {
    Item(ExtractedItem),
    Entries(Vec<ExtractedItem>),
}

impl Extraction {
    /// First item of the response, however it was shaped.
    pub fn into_first(self) -> Result<ExtractedItem, ResolutionError> {
        match self {
            Self::Item(item) => Ok(item),
            Self::Entries(mut entries) => {
                if entries.is_empty() {
                    Err(ResolutionError::NotFound)
                } else {
                    Ok(entries.remove(0))
                }
            }
        }
    }
}

/// The external search/metadata backend the resolver wraps. The lookup is
/// blocking on the backend side; implementations must run it off the
/// cooperative scheduler and only suspend the calling task.
#[async_trait]
pub trait MediaExtractor: Send + Sync {
    /// Resolve a page URL or free-text query. With `flat` set, return
    /// minimal entries (title + reference) without probing streams.
    async fn extract(&self, query: &str, flat: bool) -> Result<Extraction, ResolutionError>;
}

pub mod catalog;
pub mod extractor;
pub mod importer;
pub mod resolver;
pub mod spotify;

pub use catalog::{CatalogApi, CatalogPage, CatalogTrack};
pub use extractor::{ExtractedItem, Extraction, FormatCandidate, MediaExtractor};
pub use importer::PlaylistImporter;
pub use resolver::{ResolvedStream, TrackResolver, TrackSeed};
pub use spotify::SpotifyCatalog;

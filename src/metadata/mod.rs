// Metadata module
// Read-only inspection of container payloads for display

pub mod extractor;

pub use extractor::{format_duration, MetadataExtractor, ThumbnailInfo, TrackInfo};

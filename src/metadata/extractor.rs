// Payload inspection using lofty for tags and image for thumbnails
use lofty::prelude::{Accessor, AudioFile, TaggedFileExt};
use lofty::probe::Probe;
use log::debug;
use serde::Serialize;
use std::io::Cursor;

use crate::container::{Thumbnail, TrackPayload};

#[derive(Debug, Clone, Default, Serialize)]
pub struct TrackInfo {
    pub name: String,
    pub size_bytes: usize,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub duration_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ThumbnailInfo {
    pub name: String,
    pub size_bytes: usize,
    pub dimensions: Option<(u32, u32)>,
}

pub struct MetadataExtractor;

impl MetadataExtractor {
    /// Probe a track payload for tags. The container treats tracks as
    /// opaque, so anything unreadable just leaves the fields empty.
    pub fn track_info(track: &TrackPayload) -> TrackInfo {
        let mut info = TrackInfo {
            name: track.name.clone(),
            size_bytes: track.bytes.len(),
            ..Default::default()
        };

        let tagged_file = match Probe::new(Cursor::new(&track.bytes))
            .guess_file_type()
            .map_err(|e| e.to_string())
            .and_then(|probe| probe.read().map_err(|e| e.to_string()))
        {
            Ok(f) => f,
            Err(e) => {
                debug!("No tags for {}: {}", track.name, e);
                return info;
            }
        };

        let tag = tagged_file.primary_tag().or(tagged_file.first_tag());
        info.title = tag.and_then(|t| t.title().map(|s| s.to_string()));
        info.artist = tag.and_then(|t| t.artist().map(|s| s.to_string()));

        let duration_ms = tagged_file.properties().duration().as_millis() as u64;
        info.duration_ms = (duration_ms > 0).then_some(duration_ms);

        info
    }

    pub fn thumbnail_info(thumbnail: &Thumbnail) -> ThumbnailInfo {
        let dimensions = image::ImageReader::new(Cursor::new(&thumbnail.bytes))
            .with_guessed_format()
            .map_err(image::ImageError::from)
            .and_then(|reader| reader.into_dimensions());

        if let Err(e) = &dimensions {
            debug!("Could not read thumbnail {}: {}", thumbnail.name, e);
        }

        ThumbnailInfo {
            name: thumbnail.name.clone(),
            size_bytes: thumbnail.bytes.len(),
            dimensions: dimensions.ok(),
        }
    }
}

/// Format milliseconds as m:ss
pub fn format_duration(ms: u64) -> String {
    let seconds = ms / 1000;
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

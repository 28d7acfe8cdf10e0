// Unpack a decoded container into a directory
use log::info;
use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};

use super::models::RawContainer;
use crate::error::{ModaError, Result};

/// Name of the metadata file written next to the extracted payloads
pub const METADATA_FILE: &str = "meta.json";

#[derive(Debug, Clone, serde::Serialize)]
pub struct ExtractionReport {
    pub output_dir: PathBuf,
    pub tracks: Vec<PathBuf>,
    pub thumbnail: Option<PathBuf>,
    pub metadata: PathBuf,
}

/// Write the thumbnail, every track and `meta.json` into `dir`.
///
/// All stored names are checked before the first file is created. Two
/// payloads sharing a name would overwrite each other, so that is an error.
pub fn extract_to_dir(container: &RawContainer, dir: &Path) -> Result<ExtractionReport> {
    let names = container
        .thumbnail
        .iter()
        .map(|thumb| thumb.name.as_str())
        .chain(container.tracks.iter().map(|track| track.name.as_str()));

    let mut seen = HashSet::new();
    for name in names {
        check_name(name)?;
        if !seen.insert(name) {
            return Err(ModaError::MalformedMetadata(format!(
                "duplicate stored file name {:?}",
                name
            )));
        }
    }

    fs::create_dir_all(dir)?;

    let thumbnail = match &container.thumbnail {
        Some(thumb) => {
            let path = dir.join(&thumb.name);
            fs::write(&path, &thumb.bytes)?;
            Some(path)
        }
        None => None,
    };

    let mut tracks = Vec::with_capacity(container.tracks.len());
    for track in &container.tracks {
        let path = dir.join(&track.name);
        fs::write(&path, &track.bytes)?;
        tracks.push(path);
    }

    let metadata = dir.join(METADATA_FILE);
    let json = serde_json::to_string_pretty(&container.metadata)
        .map_err(|e| ModaError::Encoding(format!("failed to serialize metadata: {}", e)))?;
    fs::write(&metadata, json)?;

    info!("Extracted {} tracks to {:?}", tracks.len(), dir);

    Ok(ExtractionReport {
        output_dir: dir.to_path_buf(),
        tracks,
        thumbnail,
        metadata,
    })
}

/// Stored names come from the file and must stay inside the output directory
fn check_name(name: &str) -> Result<()> {
    let mut components = Path::new(name).components();
    let is_plain = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(part)), None) if part == name
    );

    if is_plain && name != METADATA_FILE {
        Ok(())
    } else {
        Err(ModaError::MalformedMetadata(format!("unsafe stored file name {:?}", name)))
    }
}

// Container encoder
use log::debug;
use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use super::models::{PlayMode, RawContainer, Thumbnail, TrackPayload};
use super::MAGIC;
use crate::error::{ModaError, Result};

#[derive(Debug, Clone, Copy)]
pub struct EncodeOptions {
    /// Indent the metadata JSON (2 spaces) instead of writing it compact
    pub pretty_metadata: bool,
}

impl Default for EncodeOptions {
    fn default() -> Self {
        Self {
            pretty_metadata: true,
        }
    }
}

/// Collects caller file paths and reads them into a `RawContainer`
pub struct ContainerBuilder {
    play_mode: PlayMode,
    tracks: Vec<PathBuf>,
    thumbnail: Option<PathBuf>,
}

impl ContainerBuilder {
    pub fn new(play_mode: PlayMode) -> Self {
        Self {
            play_mode,
            tracks: Vec::new(),
            thumbnail: None,
        }
    }

    pub fn tracks<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.tracks.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn thumbnail<P: Into<PathBuf>>(mut self, path: Option<P>) -> Self {
        self.thumbnail = path.map(Into::into);
        self
    }

    /// Read every source file. Track order is the order paths were added.
    ///
    /// Payloads are stored by base name, so two sources with the same file
    /// name (the thumbnail included) are rejected before any file is read.
    pub fn build(self) -> Result<RawContainer> {
        let mut seen = HashSet::new();
        for path in self.thumbnail.iter().chain(&self.tracks) {
            let name = base_name(path)?;
            if !seen.insert(name) {
                return Err(ModaError::Encoding(format!(
                    "{:?} has the same file name as another source",
                    path
                )));
            }
        }

        let thumbnail = match self.thumbnail {
            Some(path) => Some(Thumbnail {
                name: base_name(&path)?,
                bytes: read_source(&path)?,
            }),
            None => None,
        };

        let tracks = self
            .tracks
            .iter()
            .map(|path| {
                Ok(TrackPayload {
                    name: base_name(path)?,
                    bytes: read_source(path)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(RawContainer::new(self.play_mode, tracks, thumbnail))
    }
}

fn read_source(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|source| ModaError::SourceUnreadable {
        path: path.to_path_buf(),
        source,
    })
}

fn base_name(path: &Path) -> Result<String> {
    let name = path
        .file_name()
        .ok_or_else(|| ModaError::Encoding(format!("{:?} has no file name", path)))?;
    name.to_str()
        .map(str::to_string)
        .ok_or_else(|| ModaError::Encoding(format!("{:?} is not a UTF-8 file name", path)))
}

/// Read the given files and write them as one container to `sink`
pub fn encode_files<P, W>(
    tracks: &[P],
    play_mode: PlayMode,
    thumbnail: Option<&Path>,
    sink: &mut W,
) -> Result<()>
where
    P: AsRef<Path>,
    W: Write,
{
    let container = ContainerBuilder::new(play_mode)
        .tracks(tracks.iter().map(|p| p.as_ref().to_path_buf()))
        .thumbnail(thumbnail)
        .build()?;

    encode(&container, sink)
}

pub fn encode<W: Write>(container: &RawContainer, sink: &mut W) -> Result<()> {
    encode_with_options(container, sink, EncodeOptions::default())
}

/// Serialize `container` and write it to `sink` in a single `write_all`.
///
/// All length fields are checked before anything is written, so an oversized
/// input never leaves a partial container behind. An I/O failure during the
/// write itself can.
pub fn encode_with_options<W: Write>(
    container: &RawContainer,
    sink: &mut W,
    options: EncodeOptions,
) -> Result<()> {
    let meta_json = if options.pretty_metadata {
        serde_json::to_vec_pretty(&container.metadata)
    } else {
        serde_json::to_vec(&container.metadata)
    }
    .map_err(|e| ModaError::Encoding(format!("failed to serialize metadata: {}", e)))?;

    let payload_len: usize = container.tracks.iter().map(|t| t.name.len() + t.bytes.len() + 6).sum();
    let mut out = Vec::with_capacity(16 + meta_json.len() + payload_len);

    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&u32_len(meta_json.len(), "metadata")?.to_be_bytes());
    out.extend_from_slice(&meta_json);

    match &container.thumbnail {
        Some(thumb) => {
            if thumb.name.is_empty() {
                return Err(ModaError::Encoding("thumbnail name is empty".to_string()));
            }
            put_name(&mut out, &thumb.name, "thumbnail name")?;
            put_blob(&mut out, &thumb.bytes, "thumbnail data")?;
        }
        None => out.extend_from_slice(&0u16.to_be_bytes()),
    }

    let count = u16::try_from(container.tracks.len())
        .map_err(|_| ModaError::Encoding(format!("too many tracks: {}", container.tracks.len())))?;
    out.extend_from_slice(&count.to_be_bytes());

    for track in &container.tracks {
        put_name(&mut out, &track.name, "track name")?;
        put_blob(&mut out, &track.bytes, "track data")?;
    }

    debug!(
        "Encoded {} tracks, {} metadata bytes, {} bytes total",
        container.tracks.len(),
        meta_json.len(),
        out.len()
    );

    sink.write_all(&out)?;
    sink.flush()?;
    Ok(())
}

fn put_name(out: &mut Vec<u8>, name: &str, field: &str) -> Result<()> {
    let len = u16::try_from(name.len())
        .map_err(|_| ModaError::Encoding(format!("{} is {} bytes long (max 65535)", field, name.len())))?;
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(name.as_bytes());
    Ok(())
}

fn put_blob(out: &mut Vec<u8>, bytes: &[u8], field: &str) -> Result<()> {
    out.extend_from_slice(&u32_len(bytes.len(), field)?.to_be_bytes());
    out.extend_from_slice(bytes);
    Ok(())
}

fn u32_len(len: usize, field: &str) -> Result<u32> {
    u32::try_from(len).map_err(|_| ModaError::Encoding(format!("{} is too large ({} bytes)", field, len)))
}

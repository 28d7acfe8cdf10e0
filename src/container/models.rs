// Container data models
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PlayMode {
    /// Tracks play one after another
    #[default]
    Sequential,
    /// All tracks start together
    Parallel,
}

impl fmt::Display for PlayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayMode::Sequential => f.write_str("sequential"),
            PlayMode::Parallel => f.write_str("parallel"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackEntry {
    #[serde(rename = "file")]
    pub file_name: String,
    /// 1-based position in the track list
    pub order: u32,
}

/// Playback metadata stored as JSON in the container header.
///
/// All three keys are required when decoding, `thumbnail` included (it may be
/// `null` but not absent). Unknown keys are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerMetadata {
    pub play_mode: PlayMode,
    pub tracks: Vec<TrackEntry>,
    #[serde(deserialize_with = "required_nullable")]
    pub thumbnail: Option<String>,
}

// A plain `Option` field would default to `None` when the key is missing.
fn required_nullable<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer)
}

impl ContainerMetadata {
    /// Build metadata for the given track names, numbering them from 1
    pub fn new<S: AsRef<str>>(play_mode: PlayMode, names: &[S], thumbnail: Option<String>) -> Self {
        let tracks = names
            .iter()
            .enumerate()
            .map(|(i, name)| TrackEntry {
                file_name: name.as_ref().to_string(),
                order: i as u32 + 1,
            })
            .collect();

        Self {
            play_mode,
            tracks,
            thumbnail,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackPayload {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Decoded, in-memory form of a container.
///
/// `tracks` is index-aligned with `metadata.tracks`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawContainer {
    pub metadata: ContainerMetadata,
    pub thumbnail: Option<Thumbnail>,
    pub tracks: Vec<TrackPayload>,
}

impl RawContainer {
    /// Assemble a container from in-memory payloads, deriving the metadata
    pub fn new(play_mode: PlayMode, tracks: Vec<TrackPayload>, thumbnail: Option<Thumbnail>) -> Self {
        let names: Vec<&str> = tracks.iter().map(|t| t.name.as_str()).collect();
        let metadata = ContainerMetadata::new(
            play_mode,
            &names,
            thumbnail.as_ref().map(|t| t.name.clone()),
        );

        Self {
            metadata,
            thumbnail,
            tracks,
        }
    }

    pub fn play_mode(&self) -> PlayMode {
        self.metadata.play_mode
    }

    pub fn is_playable(&self) -> bool {
        !self.tracks.is_empty()
    }
}

// Container decoder
use log::{debug, warn};
use std::io::Read;

use super::models::{ContainerMetadata, RawContainer, Thumbnail, TrackPayload};
use super::reader::ByteReader;
use super::MAGIC;
use crate::error::{ModaError, Result};

/// Buffer the whole source in memory and decode it
pub fn read_from<R: Read>(mut source: R) -> Result<RawContainer> {
    let mut buf = Vec::new();
    source.read_to_end(&mut buf)?;
    decode(&buf)
}

/// Decode a complete container.
///
/// Every declared length is checked against the bytes actually left before
/// anything is copied; a short buffer yields `TruncatedInput`.
pub fn decode(bytes: &[u8]) -> Result<RawContainer> {
    let mut reader = ByteReader::new(bytes);

    let magic: [u8; 4] = reader.read_array("magic")?;
    if &magic != MAGIC {
        return Err(ModaError::BadMagic { found: magic });
    }

    let meta_len = reader.read_u32("metadata length")? as usize;
    let meta_json = reader.take(meta_len, "metadata")?;
    let metadata: ContainerMetadata = serde_json::from_slice(meta_json)
        .map_err(|e| ModaError::MalformedMetadata(e.to_string()))?;
    debug!("Metadata: {} tracks, mode {}", metadata.tracks.len(), metadata.play_mode);

    let thumb_name_len = reader.read_u16("thumbnail name length")? as usize;
    let thumbnail = if thumb_name_len > 0 {
        let name = reader.read_str(thumb_name_len, "thumbnail name")?;
        let data = reader.read_blob("thumbnail data")?;
        Some(Thumbnail {
            name,
            bytes: data.to_vec(),
        })
    } else {
        None
    };

    let track_count = reader.read_u16("track count")? as usize;
    // Capacity is bounded by what the remaining bytes could possibly hold
    let mut tracks = Vec::with_capacity(track_count.min(reader.remaining() / 6));
    for _ in 0..track_count {
        let name = reader.read_name("track name")?;
        let data = reader.read_blob("track data")?;
        tracks.push(TrackPayload {
            name,
            bytes: data.to_vec(),
        });
    }

    if reader.remaining() > 0 {
        warn!("Ignoring {} trailing bytes after the last track", reader.remaining());
    }

    let container = RawContainer {
        metadata,
        thumbnail,
        tracks,
    };
    validate(&container)?;
    Ok(container)
}

/// Cross-check the JSON metadata against the binary body
fn validate(container: &RawContainer) -> Result<()> {
    let meta = &container.metadata;

    if meta.tracks.len() != container.tracks.len() {
        return Err(ModaError::MalformedMetadata(format!(
            "metadata lists {} tracks but the body holds {}",
            meta.tracks.len(),
            container.tracks.len()
        )));
    }

    for (i, (entry, payload)) in meta.tracks.iter().zip(&container.tracks).enumerate() {
        if entry.order as usize != i + 1 {
            return Err(ModaError::MalformedMetadata(format!(
                "track {:?} has order {}, expected {}",
                entry.file_name,
                entry.order,
                i + 1
            )));
        }
        if entry.file_name != payload.name {
            return Err(ModaError::MalformedMetadata(format!(
                "track {} is {:?} in metadata but {:?} in the body",
                i + 1,
                entry.file_name,
                payload.name
            )));
        }
    }

    let body_thumb = container.thumbnail.as_ref().map(|t| t.name.as_str());
    if meta.thumbnail.as_deref() != body_thumb {
        return Err(ModaError::MalformedMetadata(format!(
            "thumbnail is {:?} in metadata but {:?} in the body",
            meta.thumbnail, body_thumb
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::encoder::encode;
    use crate::container::models::PlayMode;

    fn sample(mode: PlayMode, with_thumb: bool) -> RawContainer {
        let tracks = vec![
            TrackPayload {
                name: "intro.mp3".to_string(),
                bytes: vec![1, 2, 3, 4],
            },
            TrackPayload {
                name: "drums.wav".to_string(),
                bytes: vec![],
            },
            TrackPayload {
                name: "outro.ogg".to_string(),
                bytes: (0..=255).collect(),
            },
        ];
        let thumb = with_thumb.then(|| Thumbnail {
            name: "cover.png".to_string(),
            bytes: vec![0x89, b'P', b'N', b'G'],
        });
        RawContainer::new(mode, tracks, thumb)
    }

    fn encoded(container: &RawContainer) -> Vec<u8> {
        let mut out = Vec::new();
        encode(container, &mut out).unwrap();
        out
    }

    #[test]
    fn test_round_trip() {
        for mode in [PlayMode::Sequential, PlayMode::Parallel] {
            for with_thumb in [false, true] {
                let original = sample(mode, with_thumb);
                let decoded = decode(&encoded(&original)).unwrap();
                assert_eq!(decoded, original);
            }
        }
    }

    #[test]
    fn test_order_preserved_after_round_trip() {
        let decoded = decode(&encoded(&sample(PlayMode::Sequential, false))).unwrap();
        for (i, entry) in decoded.metadata.tracks.iter().enumerate() {
            assert_eq!(entry.order as usize, i + 1);
            assert_eq!(entry.file_name, decoded.tracks[i].name);
        }
    }

    #[test]
    fn test_every_prefix_is_truncated() {
        let bytes = encoded(&sample(PlayMode::Parallel, true));
        for len in 0..bytes.len() {
            match decode(&bytes[..len]) {
                Err(ModaError::TruncatedInput { .. }) => {}
                other => panic!("prefix of {} bytes: expected TruncatedInput, got {:?}", len, other),
            }
        }
    }

    #[test]
    fn test_bad_magic() {
        let mut bytes = encoded(&sample(PlayMode::Sequential, false));
        bytes[0] = b'X';
        assert!(matches!(
            decode(&bytes),
            Err(ModaError::BadMagic { found }) if &found == b"XODA"
        ));
    }

    #[test]
    fn test_bad_magic_checked_before_lengths() {
        // Garbage length fields must not matter once the magic is wrong
        assert!(matches!(
            decode(b"RIFF\xff\xff\xff\xff"),
            Err(ModaError::BadMagic { .. })
        ));
    }

    #[test]
    fn test_empty_thumbnail_decodes_as_absent() {
        let decoded = decode(&encoded(&sample(PlayMode::Sequential, false))).unwrap();
        assert!(decoded.thumbnail.is_none());
        assert!(decoded.metadata.thumbnail.is_none());
    }

    #[test]
    fn test_invalid_json_is_malformed() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"MODA");
        bytes.extend_from_slice(&3u32.to_be_bytes());
        bytes.extend_from_slice(b"{x}");
        bytes.extend_from_slice(&[0, 0, 0, 0]);
        assert!(matches!(decode(&bytes), Err(ModaError::MalformedMetadata(_))));
    }

    #[test]
    fn test_name_mismatch_is_malformed() {
        let mut container = sample(PlayMode::Sequential, false);
        container.tracks[1].name = "other.wav".to_string();
        assert!(matches!(
            decode(&encoded(&container)),
            Err(ModaError::MalformedMetadata(_))
        ));
    }

    #[test]
    fn test_count_mismatch_is_malformed() {
        let mut container = sample(PlayMode::Sequential, false);
        container.tracks.pop();
        assert!(matches!(
            decode(&encoded(&container)),
            Err(ModaError::MalformedMetadata(_))
        ));
    }

    #[test]
    fn test_trailing_bytes_ignored() {
        let original = sample(PlayMode::Sequential, true);
        let mut bytes = encoded(&original);
        bytes.extend_from_slice(b"junk");
        assert_eq!(decode(&bytes).unwrap(), original);
    }

    #[test]
    fn test_read_from_stream() {
        let original = sample(PlayMode::Parallel, false);
        let bytes = encoded(&original);
        assert_eq!(read_from(std::io::Cursor::new(bytes)).unwrap(), original);
    }
}

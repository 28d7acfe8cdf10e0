// MODA container module
// Length-prefixed layout: magic, metadata JSON, optional thumbnail, tracks

pub mod decoder;
pub mod encoder;
pub mod extract;
pub mod models;
pub mod reader;

pub use decoder::{decode, read_from};
pub use encoder::{encode, encode_files, encode_with_options, ContainerBuilder, EncodeOptions};
pub use extract::{extract_to_dir, ExtractionReport, METADATA_FILE};
pub use models::{ContainerMetadata, PlayMode, RawContainer, Thumbnail, TrackEntry, TrackPayload};

/// File signature, the first four bytes of every container
pub const MAGIC: &[u8; 4] = b"MODA";

/// File extension used for containers
pub const EXTENSION: &str = "moda";

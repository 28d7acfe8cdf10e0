// Error types for the container codec and the playback engine
use std::io;
use std::path::PathBuf;

/// Failures that abort an encode or decode as a whole.
#[derive(thiserror::Error, Debug)]
pub enum ModaError {
    #[error("not a valid MODA file (magic {found:02x?})")]
    BadMagic { found: [u8; 4] },
    #[error("malformed metadata: {0}")]
    MalformedMetadata(String),
    #[error("truncated input while reading {field}: needed {needed} bytes, {remaining} left")]
    TruncatedInput {
        field: &'static str,
        needed: usize,
        remaining: usize,
    },
    #[error("failed to read {path:?}: {source}")]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("encoding error: {0}")]
    Encoding(String),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, ModaError>;

/// Per-track playback failures. The engine logs these and moves on.
#[derive(thiserror::Error, Debug)]
pub enum PlaybackError {
    #[error("failed to load {track}: {reason}")]
    Load { track: String, reason: String },
    #[error("no free output channel")]
    NoChannelAvailable,
}

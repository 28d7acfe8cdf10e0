// Settings module
// JSON-backed configuration for playback and compilation

#[allow(clippy::module_inception)]
pub mod settings;

pub use settings::{AppSettings, CompileSettings, PlaybackSettings};

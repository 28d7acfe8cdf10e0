// Playback engine module
// Sequential and parallel scheduling over an opaque audio output

pub mod engine;
pub mod output;

pub use engine::{PlaybackEngine, SessionState};
pub use output::AudioOutput;

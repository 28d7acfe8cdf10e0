// Audio playback module
// Uses Symphonia for decoding and cpal for output

pub mod convert;
pub mod decoder;
pub mod output;

pub use output::MixerOutput;

// Audio output capability consumed by the playback engine
use crate::error::PlaybackError;

/// Something that can turn encoded bytes into sounds and play them on a
/// limited set of channels.
///
/// Implementations decide how channels actually run; the engine only issues
/// start requests and polls busy state.
pub trait AudioOutput {
    type Sound;
    type Channel: Copy + std::fmt::Debug;

    /// Decode a track payload. `name` is a hint for format detection.
    fn load_sound(&mut self, name: &str, bytes: &[u8]) -> Result<Self::Sound, PlaybackError>;

    fn play_on_free_channel(&mut self, sound: &Self::Sound) -> Result<Self::Channel, PlaybackError>;

    fn channel_is_busy(&self, channel: Self::Channel) -> bool;

    /// Silence and release every channel
    fn stop_all(&mut self);
}

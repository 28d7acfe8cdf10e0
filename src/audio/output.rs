// Audio output using cpal
// A fixed pool of mixer channels, summed in the device callback

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Stream, StreamConfig};
use log::{debug, error};
use parking_lot::Mutex;
use std::sync::Arc;

use super::convert::{remap_channels, resample};
use super::decoder::AudioDecoder;
use crate::error::PlaybackError;
use crate::playback::AudioOutput;

/// Decoded samples already in the device's rate and channel layout
#[derive(Clone)]
pub struct Sound {
    samples: Arc<[f32]>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelId(usize);

#[derive(Default)]
struct Voice {
    samples: Option<Arc<[f32]>>,
    position: usize,
}

impl Voice {
    fn is_busy(&self) -> bool {
        self.samples.as_ref().is_some_and(|s| self.position < s.len())
    }
}

pub struct MixerOutput {
    _stream: Stream,
    voices: Arc<Mutex<Vec<Voice>>>,
    sample_rate: u32,
    channels: u16,
}

impl MixerOutput {
    /// Open the default output device with `voice_count` mixer channels
    pub fn new(voice_count: usize, volume: f32) -> Result<Self, String> {
        let host = cpal::default_host();

        let device = host.default_output_device()
            .ok_or("No output device available")?;

        let config = device.default_output_config()
            .map_err(|e| format!("Failed to get default output config: {}", e))?;

        let sample_rate = config.sample_rate().0;
        let channels = config.channels();

        let voices = Arc::new(Mutex::new(
            (0..voice_count.max(1)).map(|_| Voice::default()).collect::<Vec<_>>(),
        ));
        let volume = volume.clamp(0.0, 1.0);

        let stream = match config.sample_format() {
            cpal::SampleFormat::F32 => {
                Self::build_stream::<f32>(&device, &config.into(), voices.clone(), volume)?
            }
            cpal::SampleFormat::I16 => {
                Self::build_stream::<i16>(&device, &config.into(), voices.clone(), volume)?
            }
            cpal::SampleFormat::U16 => {
                Self::build_stream::<u16>(&device, &config.into(), voices.clone(), volume)?
            }
            format => return Err(format!("Unsupported sample format: {:?}", format)),
        };

        stream.play().map_err(|e| format!("Failed to start stream: {}", e))?;
        debug!("Output opened: {} Hz, {} channels, {} voices", sample_rate, channels, voice_count);

        Ok(Self {
            _stream: stream,
            voices,
            sample_rate,
            channels,
        })
    }

    fn build_stream<T: cpal::SizedSample + cpal::FromSample<f32>>(
        device: &cpal::Device,
        config: &StreamConfig,
        voices: Arc<Mutex<Vec<Voice>>>,
        volume: f32,
    ) -> Result<Stream, String> {
        let stream = device.build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                let mut voices = voices.lock();

                for sample in data.iter_mut() {
                    let value = mix_next(&mut voices) * volume;
                    *sample = T::from_sample(value.clamp(-1.0, 1.0));
                }
            },
            move |err| {
                error!("Audio output error: {}", err);
            },
            None,
        ).map_err(|e| format!("Failed to build output stream: {}", e))?;

        Ok(stream)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }
}

/// Sum the next interleaved sample of every busy voice
fn mix_next(voices: &mut [Voice]) -> f32 {
    let mut acc = 0.0;
    for voice in voices.iter_mut() {
        if let Some(samples) = &voice.samples {
            if voice.position < samples.len() {
                acc += samples[voice.position];
                voice.position += 1;
            }
        }
    }
    acc
}

fn claim_voice(voices: &mut [Voice], samples: Arc<[f32]>) -> Option<usize> {
    let index = voices.iter().position(|v| !v.is_busy())?;
    voices[index] = Voice {
        samples: Some(samples),
        position: 0,
    };
    Some(index)
}

impl AudioOutput for MixerOutput {
    type Sound = Sound;
    type Channel = ChannelId;

    fn load_sound(&mut self, name: &str, bytes: &[u8]) -> Result<Sound, PlaybackError> {
        let load_error = |reason: String| PlaybackError::Load {
            track: name.to_string(),
            reason,
        };

        let audio = AudioDecoder::from_bytes(name, bytes.to_vec())
            .and_then(AudioDecoder::decode_all)
            .map_err(load_error)?;

        let out_channels = self.channels as usize;
        let remapped = remap_channels(&audio.samples, audio.channels, out_channels);
        let samples = resample(&remapped, out_channels, audio.sample_rate, self.sample_rate)
            .map_err(load_error)?;

        debug!(
            "Loaded {}: {} Hz x{} -> {} samples",
            name,
            audio.sample_rate,
            audio.channels,
            samples.len()
        );

        Ok(Sound {
            samples: samples.into(),
        })
    }

    fn play_on_free_channel(&mut self, sound: &Sound) -> Result<ChannelId, PlaybackError> {
        claim_voice(&mut self.voices.lock(), sound.samples.clone())
            .map(ChannelId)
            .ok_or(PlaybackError::NoChannelAvailable)
    }

    fn channel_is_busy(&self, channel: ChannelId) -> bool {
        self.voices
            .lock()
            .get(channel.0)
            .map(Voice::is_busy)
            .unwrap_or(false)
    }

    fn stop_all(&mut self) {
        for voice in self.voices.lock().iter_mut() {
            *voice = Voice::default();
        }
    }
}

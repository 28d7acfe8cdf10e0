// Playback engine
// Drives sequential (auto-advance) or parallel (fire-all) playback of a
// decoded container. Single-threaded and cooperative: the caller invokes
// `poll()` from its own timer.

use log::{debug, info, warn};

use super::output::AudioOutput;
use crate::container::{PlayMode, RawContainer, TrackPayload};
use crate::error::PlaybackError;

/// Observable engine state, for callers enabling/disabling controls
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    PlayingSequential { index: usize },
    PlayingParallel { channels: usize },
}

enum Session<C> {
    Idle,
    Sequential { index: usize, channel: C },
    Parallel { channels: Vec<C> },
}

pub struct PlaybackEngine<O: AudioOutput> {
    output: O,
    container: Option<RawContainer>,
    session: Session<O::Channel>,
    // Keeps started sounds alive for as long as the session runs
    sounds: Vec<O::Sound>,
    started: Vec<usize>,
}

impl<O: AudioOutput> PlaybackEngine<O> {
    pub fn new(output: O) -> Self {
        Self {
            output,
            container: None,
            session: Session::Idle,
            sounds: Vec::new(),
            started: Vec::new(),
        }
    }

    /// Take ownership of a decoded container, ending any running session
    pub fn load(&mut self, container: RawContainer) {
        self.stop();
        self.started.clear();
        info!(
            "Loaded container: {} tracks, {} mode",
            container.tracks.len(),
            container.play_mode()
        );
        self.container = Some(container);
    }

    /// Play in the mode recorded in the container
    pub fn play(&mut self) {
        let mode = self
            .container
            .as_ref()
            .map(RawContainer::play_mode)
            .unwrap_or_default();
        self.play_as(mode);
    }

    /// Start a new session. Any running session is stopped first.
    pub fn play_as(&mut self, mode: PlayMode) {
        self.stop();
        self.started.clear();

        let track_count = self.tracks().len();
        if track_count == 0 {
            info!("Nothing to play");
            return;
        }

        match mode {
            PlayMode::Parallel => self.start_parallel(),
            PlayMode::Sequential => self.start_sequential_from(0),
        }
    }

    /// Stop everything and return to `Idle`. Safe to call repeatedly.
    pub fn stop(&mut self) {
        self.output.stop_all();
        self.sounds.clear();
        if self.is_active() {
            info!("Playback stopped");
        }
        self.session = Session::Idle;
    }

    /// Advance a sequential session whose track has finished.
    ///
    /// Parallel sessions never auto-complete; they run until `stop()`.
    /// Returns whether a session is still active.
    pub fn poll(&mut self) -> bool {
        if let Session::Sequential { index, channel } = self.session {
            if !self.output.channel_is_busy(channel) {
                debug!("Track {} finished", index + 1);
                self.start_sequential_from(index + 1);
            }
        }
        self.is_active()
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.session, Session::Idle)
    }

    pub fn state(&self) -> SessionState {
        match &self.session {
            Session::Idle => SessionState::Idle,
            Session::Sequential { index, .. } => SessionState::PlayingSequential { index: *index },
            Session::Parallel { channels } => SessionState::PlayingParallel {
                channels: channels.len(),
            },
        }
    }

    /// Index of the track playing in a sequential session
    pub fn current_index(&self) -> Option<usize> {
        match self.session {
            Session::Sequential { index, .. } => Some(index),
            _ => None,
        }
    }

    /// Indices of the tracks started since the last `play()`, in start order
    pub fn started_tracks(&self) -> &[usize] {
        &self.started
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }

    fn tracks(&self) -> &[TrackPayload] {
        self.container.as_ref().map(|c| c.tracks.as_slice()).unwrap_or(&[])
    }

    fn start_parallel(&mut self) {
        let tracks = self.container.as_ref().map(|c| c.tracks.as_slice()).unwrap_or(&[]);
        let mut channels = Vec::with_capacity(tracks.len());

        for (index, track) in tracks.iter().enumerate() {
            match start_track(&mut self.output, track) {
                Ok((sound, channel)) => {
                    debug!("Started {} on {:?}", track.name, channel);
                    self.sounds.push(sound);
                    self.started.push(index);
                    channels.push(channel);
                }
                Err(e) => warn!("Skipping track {}: {}", index + 1, e),
            }
        }

        if channels.is_empty() {
            info!("No track could be started");
            self.session = Session::Idle;
        } else {
            info!("Playing {} of {} tracks in parallel", channels.len(), tracks.len());
            self.session = Session::Parallel { channels };
        }
    }

    /// Start the first playable track at or after `from`, skipping failures.
    /// Ends the session when the sequence is exhausted.
    fn start_sequential_from(&mut self, from: usize) {
        self.sounds.clear();
        let tracks = self.container.as_ref().map(|c| c.tracks.as_slice()).unwrap_or(&[]);

        for (index, track) in tracks.iter().enumerate().skip(from) {
            match start_track(&mut self.output, track) {
                Ok((sound, channel)) => {
                    info!("Playing track {}/{}: {}", index + 1, tracks.len(), track.name);
                    self.sounds.push(sound);
                    self.started.push(index);
                    self.session = Session::Sequential { index, channel };
                    return;
                }
                Err(e) => warn!("Skipping track {}: {}", index + 1, e),
            }
        }

        info!("Reached end of sequence");
        self.session = Session::Idle;
    }
}

fn start_track<O: AudioOutput>(
    output: &mut O,
    track: &TrackPayload,
) -> Result<(O::Sound, O::Channel), PlaybackError> {
    let sound = output.load_sound(&track.name, &track.bytes)?;
    let channel = output.play_on_free_channel(&sound)?;
    Ok((sound, channel))
}

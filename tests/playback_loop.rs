use std::time::Duration;

use moda_lib::commands::drive;
use moda_lib::container::{PlayMode, RawContainer, TrackPayload};
use moda_lib::playback::{AudioOutput, PlaybackEngine};
use moda_lib::PlaybackError;

/// Every sound lasts a fixed number of busy checks
struct CountdownOutput {
    polls_per_track: u32,
    remaining: Vec<u32>,
    played: Vec<String>,
}

impl AudioOutput for CountdownOutput {
    type Sound = String;
    type Channel = usize;

    fn load_sound(&mut self, name: &str, bytes: &[u8]) -> Result<String, PlaybackError> {
        if bytes.is_empty() {
            return Err(PlaybackError::Load {
                track: name.to_string(),
                reason: "empty payload".to_string(),
            });
        }
        Ok(name.to_string())
    }

    fn play_on_free_channel(&mut self, sound: &String) -> Result<usize, PlaybackError> {
        self.remaining.push(self.polls_per_track);
        self.played.push(sound.clone());
        Ok(self.remaining.len() - 1)
    }

    fn channel_is_busy(&self, channel: usize) -> bool {
        self.remaining[channel] > 0
    }

    fn stop_all(&mut self) {
        self.remaining.iter_mut().for_each(|r| *r = 0);
    }
}

impl CountdownOutput {
    fn tick(&mut self) {
        for r in self.remaining.iter_mut() {
            *r = r.saturating_sub(1);
        }
    }
}

fn container(tracks: &[(&str, &[u8])]) -> RawContainer {
    let tracks = tracks
        .iter()
        .map(|(name, bytes)| TrackPayload {
            name: name.to_string(),
            bytes: bytes.to_vec(),
        })
        .collect();
    RawContainer::new(PlayMode::Sequential, tracks, None)
}

#[tokio::test]
async fn test_drive_runs_sequence_to_completion() {
    let output = CountdownOutput {
        polls_per_track: 0,
        remaining: Vec::new(),
        played: Vec::new(),
    };
    let mut engine = PlaybackEngine::new(output);
    engine.load(container(&[("a.wav", b"a"), ("b.wav", b""), ("c.wav", b"c")]));

    tokio::time::timeout(
        Duration::from_secs(5),
        drive(&mut engine, None, Duration::from_millis(10)),
    )
    .await
    .expect("sequence should finish")
    .unwrap();

    assert!(!engine.is_active());
    assert_eq!(engine.output().played, vec!["a.wav", "c.wav"]);
    assert_eq!(engine.started_tracks(), &[0, 2]);
}

#[test]
fn test_manual_polling_waits_for_busy_channel() {
    let output = CountdownOutput {
        polls_per_track: 2,
        remaining: Vec::new(),
        played: Vec::new(),
    };
    let mut engine = PlaybackEngine::new(output);
    engine.load(container(&[("a.wav", b"a"), ("b.wav", b"b")]));
    engine.play();

    assert!(engine.poll());
    assert_eq!(engine.current_index(), Some(0));

    engine.output_mut().tick();
    engine.output_mut().tick();
    assert!(engine.poll());
    assert_eq!(engine.current_index(), Some(1));

    engine.output_mut().tick();
    engine.output_mut().tick();
    assert!(!engine.poll());
}

#[tokio::test]
async fn test_drive_with_nothing_playable_returns() {
    let output = CountdownOutput {
        polls_per_track: 1,
        remaining: Vec::new(),
        played: Vec::new(),
    };
    let mut engine = PlaybackEngine::new(output);
    engine.load(container(&[("a.wav", b""), ("b.wav", b"")]));

    drive(&mut engine, Some(PlayMode::Parallel), Duration::from_millis(10))
        .await
        .unwrap();
    assert!(!engine.is_active());
}

// Command handlers
use anyhow::{bail, Context, Result};
use log::{info, warn};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::MissedTickBehavior;

use crate::audio::MixerOutput;
use crate::container::{
    self, encode_with_options, ContainerBuilder, EncodeOptions, ExtractionReport, PlayMode, RawContainer,
};
use crate::library::DirectoryScanner;
use crate::metadata::{format_duration, MetadataExtractor, ThumbnailInfo, TrackInfo};
use crate::playback::{AudioOutput, PlaybackEngine};
use crate::settings::AppSettings;

/// Read and decode a container file
pub fn open_container(path: &Path) -> Result<RawContainer> {
    let file = File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
    container::read_from(BufReader::new(file)).context("Failed to load MODA file")
}

/// Build a container from `tracks` (plus any audio found under `dir`) and
/// save it to `output`. Returns the path written.
pub fn compile(
    settings: &AppSettings,
    tracks: Vec<PathBuf>,
    dir: Option<&Path>,
    output: &Path,
    mode: PlayMode,
    thumbnail: Option<&Path>,
) -> Result<PathBuf> {
    let mut paths = tracks;
    if let Some(dir) = dir {
        paths.extend(DirectoryScanner::scan(dir).context("Failed to scan directory")?);
    }
    if paths.is_empty() {
        bail!("Please add at least one audio track");
    }

    let output = if output.extension().is_none() {
        output.with_extension(container::EXTENSION)
    } else {
        output.to_path_buf()
    };

    let raw = ContainerBuilder::new(mode)
        .tracks(paths)
        .thumbnail(thumbnail)
        .build()
        .context("Failed to read source files")?;

    let options = EncodeOptions {
        pretty_metadata: settings.compile.pretty_metadata,
    };
    let file = File::create(&output).with_context(|| format!("Failed to create {:?}", output))?;
    let mut writer = BufWriter::new(file);

    if let Err(e) = encode_with_options(&raw, &mut writer, options) {
        drop(writer);
        // A half-written container is useless
        if let Err(remove_err) = fs::remove_file(&output) {
            warn!("Failed to remove partial file {:?}: {}", output, remove_err);
        }
        return Err(e).context("Failed to save MODA file");
    }

    info!("Saved {} tracks ({} mode) to {:?}", raw.tracks.len(), mode, output);
    Ok(output)
}

pub fn extract(file: &Path, output: &Path) -> Result<ExtractionReport> {
    let raw = open_container(file)?;
    container::extract_to_dir(&raw, output).context("Failed to extract MODA file")
}

#[derive(Debug, Clone, Serialize)]
pub struct InfoReport {
    pub play_mode: PlayMode,
    pub tracks: Vec<TrackInfo>,
    pub thumbnail: Option<ThumbnailInfo>,
}

pub fn inspect(file: &Path) -> Result<InfoReport> {
    let raw = open_container(file)?;

    Ok(InfoReport {
        play_mode: raw.play_mode(),
        tracks: raw.tracks.iter().map(MetadataExtractor::track_info).collect(),
        thumbnail: raw.thumbnail.as_ref().map(MetadataExtractor::thumbnail_info),
    })
}

pub fn print_info(report: &InfoReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!("Play Mode: {}", report.play_mode);
    println!("Tracks: {}", report.tracks.len());
    for (i, track) in report.tracks.iter().enumerate() {
        let mut line = format!("  {}. {} ({} bytes", i + 1, track.name, track.size_bytes);
        if let Some(ms) = track.duration_ms {
            line.push_str(&format!(", {}", format_duration(ms)));
        }
        line.push(')');
        match (&track.artist, &track.title) {
            (Some(artist), Some(title)) => line.push_str(&format!(" {} - {}", artist, title)),
            (None, Some(title)) => line.push_str(&format!(" {}", title)),
            _ => {}
        }
        println!("{}", line);
    }

    match &report.thumbnail {
        Some(thumb) => match thumb.dimensions {
            Some((w, h)) => println!("Thumbnail: {} ({}x{})", thumb.name, w, h),
            None => println!("Thumbnail: {} ({} bytes)", thumb.name, thumb.size_bytes),
        },
        None => println!("Thumbnail: none"),
    }

    Ok(())
}

pub fn play(settings: &AppSettings, file: &Path, mode: Option<PlayMode>) -> Result<()> {
    let raw = open_container(file)?;
    if !raw.is_playable() {
        println!("Nothing to play");
        return Ok(());
    }

    let output = MixerOutput::new(settings.playback.channels, settings.playback.volume)
        .map_err(anyhow::Error::msg)
        .context("Failed to open audio output")?;
    info!("Output: {} Hz, {} channels", output.sample_rate(), output.channels());

    let mut engine = PlaybackEngine::new(output);
    engine.load(raw);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start runtime")?;

    let interval = Duration::from_millis(settings.playback.poll_interval_ms);
    runtime.block_on(drive(&mut engine, mode, interval))
}

/// Start playback and poll the engine on a timer until the session ends or
/// Ctrl-C stops it
pub async fn drive<O: AudioOutput>(
    engine: &mut PlaybackEngine<O>,
    mode: Option<PlayMode>,
    interval: Duration,
) -> Result<()> {
    match mode {
        Some(mode) => engine.play_as(mode),
        None => engine.play(),
    }

    if !engine.is_active() {
        println!("None of the tracks could be played");
        return Ok(());
    }

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if !engine.poll() {
                    break;
                }
            }
            result = &mut ctrl_c => {
                result.context("Failed to listen for Ctrl-C")?;
                engine.stop();
                break;
            }
        }
    }

    Ok(())
}

pub fn show_config(settings: &AppSettings, path: Option<&Path>, write: bool) -> Result<()> {
    if write {
        let Some(path) = path else {
            bail!("--write needs a --config file");
        };
        settings.save(path)?;
    }
    println!("{}", serde_json::to_string_pretty(settings)?);
    Ok(())
}

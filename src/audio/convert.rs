// Sample format conversion to the output device layout
use rubato::{FftFixedIn, Resampler};

const RESAMPLE_CHUNK: usize = 1024;

/// Convert interleaved frames from `from` channels to `to` channels.
/// Mono is duplicated when upmixing, extra channels are dropped when
/// downmixing (averaged when going to mono).
pub fn remap_channels(samples: &[f32], from: usize, to: usize) -> Vec<f32> {
    if from == to || from == 0 || to == 0 {
        return samples.to_vec();
    }

    let mut out = Vec::with_capacity(samples.len() / from * to);
    for frame in samples.chunks_exact(from) {
        if to == 1 {
            out.push(frame.iter().sum::<f32>() / from as f32);
            continue;
        }
        for ch in 0..to {
            let value = if from == 1 {
                frame[0]
            } else {
                frame.get(ch).copied().unwrap_or(0.0)
            };
            out.push(value);
        }
    }
    out
}

/// Resample interleaved frames with rubato's FFT resampler
pub fn resample(samples: &[f32], channels: usize, from_rate: u32, to_rate: u32) -> Result<Vec<f32>, String> {
    if from_rate == to_rate || samples.is_empty() || channels == 0 {
        return Ok(samples.to_vec());
    }

    let frames = samples.len() / channels;
    let planar: Vec<Vec<f32>> = (0..channels)
        .map(|ch| samples.iter().skip(ch).step_by(channels).copied().collect())
        .collect();

    let mut resampler = FftFixedIn::<f32>::new(
        from_rate as usize,
        to_rate as usize,
        RESAMPLE_CHUNK,
        2,
        channels,
    )
    .map_err(|e| format!("Failed to create resampler: {}", e))?;

    let expected = (frames as u64 * to_rate as u64 / from_rate as u64) as usize;
    let delay = resampler.output_delay();
    let mut out: Vec<Vec<f32>> = vec![Vec::with_capacity(expected + delay + RESAMPLE_CHUNK); channels];

    let mut pos = 0;
    while frames - pos >= resampler.input_frames_next() {
        let n = resampler.input_frames_next();
        let chunk: Vec<&[f32]> = planar.iter().map(|p| &p[pos..pos + n]).collect();
        let processed = resampler
            .process(&chunk[..], None)
            .map_err(|e| format!("Resampling failed: {}", e))?;
        append_planar(&mut out, processed);
        pos += n;
    }

    if pos < frames {
        let tail: Vec<&[f32]> = planar.iter().map(|p| &p[pos..]).collect();
        let processed = resampler
            .process_partial(Some(&tail[..]), None)
            .map_err(|e| format!("Resampling failed: {}", e))?;
        append_planar(&mut out, processed);
    }

    // Flush the frames still held back by the resampler delay
    let processed = resampler
        .process_partial(None::<&[&[f32]]>, None)
        .map_err(|e| format!("Resampling failed: {}", e))?;
    append_planar(&mut out, processed);

    let available = out.first().map(Vec::len).unwrap_or(0);
    let end = (delay + expected).min(available);
    let start = delay.min(end);

    let mut interleaved = Vec::with_capacity((end - start) * channels);
    for frame in start..end {
        for plane in &out {
            interleaved.push(plane[frame]);
        }
    }
    Ok(interleaved)
}

fn append_planar(out: &mut [Vec<f32>], processed: Vec<Vec<f32>>) {
    for (plane, chunk) in out.iter_mut().zip(processed) {
        plane.extend_from_slice(&chunk);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mono_to_stereo() {
        assert_eq!(remap_channels(&[0.1, 0.2], 1, 2), vec![0.1, 0.1, 0.2, 0.2]);
    }

    #[test]
    fn test_stereo_to_mono_averages() {
        assert_eq!(remap_channels(&[0.25, 0.75, -1.0, 1.0], 2, 1), vec![0.5, 0.0]);
    }

    #[test]
    fn test_stereo_to_quad_pads_silence() {
        assert_eq!(
            remap_channels(&[0.5, -0.5], 2, 4),
            vec![0.5, -0.5, 0.0, 0.0]
        );
    }

    #[test]
    fn test_same_rate_is_passthrough() {
        let samples = vec![0.1, 0.2, 0.3, 0.4];
        assert_eq!(resample(&samples, 2, 44100, 44100).unwrap(), samples);
    }

    #[test]
    fn test_resample_length_scales_with_rate() {
        let frames = 22050;
        let samples: Vec<f32> = (0..frames * 2).map(|i| ((i / 2) as f32 * 0.01).sin()).collect();
        let out = resample(&samples, 2, 22050, 44100).unwrap();

        assert_eq!(out.len() % 2, 0);
        let out_frames = out.len() / 2;
        assert!(out_frames <= 44100);
        assert!(out_frames > 44100 - RESAMPLE_CHUNK * 2, "got {} frames", out_frames);
    }
}

//! Sample-rate conversion using `rubato`'s windowed-sinc resampler.

use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use tracing::debug;

use crate::signal::Signal;
use crate::types::{AudioError, ResultExt};

/// Frames fed to the resampler per call.
const CHUNK_SIZE: usize = 1024;

/// Resample `signal` to `to_rate`, preserving channel count and duration.
///
/// The resampler's group delay is removed and the tail is truncated so the
/// output holds exactly `round(frames * ratio)` frames.
pub fn resample(signal: &Signal, to_rate: u32) -> Result<Signal, AudioError> {
    if signal.sample_rate == to_rate || signal.is_empty() {
        return Ok(Signal::new(signal.samples.clone(), signal.channels, to_rate));
    }
    if signal.sample_rate == 0 || to_rate == 0 {
        return Err(AudioError::Resample(format!(
            "cannot resample {} Hz -> {} Hz",
            signal.sample_rate, to_rate
        )));
    }

    let channels = signal.channels;
    let frames = signal.frames();
    let ratio = f64::from(to_rate) / f64::from(signal.sample_rate);

    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let mut resampler = SincFixedIn::<f32>::new(ratio, 2.0, params, CHUNK_SIZE, channels)
        .resample("init")?;

    let planar = deinterleave(signal);
    let expected = (frames as f64 * ratio).round() as usize;
    let delay = resampler.output_delay();
    let wanted = expected + delay;

    // Every call yields roughly CHUNK_SIZE * ratio frames; the cap guards
    // against a resampler that stops producing output.
    let max_calls = frames.div_ceil(CHUNK_SIZE) + (delay as f64 / (CHUNK_SIZE as f64 * ratio)).ceil() as usize + 4;

    let mut output: Vec<Vec<f32>> = vec![Vec::with_capacity(wanted + CHUNK_SIZE); channels];
    let mut position = 0;
    let mut calls = 0;

    while output[0].len() < wanted && calls < max_calls {
        let input: Vec<Vec<f32>> = planar
            .iter()
            .map(|channel| {
                let start = position.min(channel.len());
                let end = (position + CHUNK_SIZE).min(channel.len());
                // Pad the last chunk (and the flush chunks) with zeros
                let mut chunk = channel[start..end].to_vec();
                chunk.resize(CHUNK_SIZE, 0.0);
                chunk
            })
            .collect();

        let resampled = resampler.process(&input, None).resample("process")?;
        for (dst, src) in output.iter_mut().zip(resampled) {
            dst.extend_from_slice(&src);
        }

        position += CHUNK_SIZE;
        calls += 1;
    }

    let available = output[0].len().saturating_sub(delay).min(expected);
    let mut samples = Vec::with_capacity(available * channels);
    for frame in 0..available {
        for channel in &output {
            samples.push(channel[delay + frame]);
        }
    }

    debug!(
        from = signal.sample_rate,
        to = to_rate,
        in_frames = frames,
        out_frames = available,
        "resampled"
    );

    Ok(Signal::new(samples, channels, to_rate))
}

fn deinterleave(signal: &Signal) -> Vec<Vec<f32>> {
    let channels = signal.channels;
    let mut planar = vec![Vec::with_capacity(signal.frames()); channels];
    for frame in signal.samples.chunks_exact(channels) {
        for (dst, &s) in planar.iter_mut().zip(frame) {
            dst.push(s);
        }
    }
    planar
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(freq: f32, rate: u32, frames: usize, amplitude: f32) -> Vec<f32> {
        (0..frames)
            .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / rate as f32).sin() * amplitude)
            .collect()
    }

    #[test]
    fn same_rate_is_passthrough() {
        let input = Signal::new(sine(440.0, 16_000, 1_600, 0.5), 1, 16_000);
        let out = resample(&input, 16_000).unwrap();
        assert_eq!(out, input);
    }

    #[test]
    fn downsample_48k_to_16k_exact_length() {
        let input = Signal::new(sine(440.0, 48_000, 48_000, 0.5), 1, 48_000);
        let out = resample(&input, 16_000).unwrap();
        assert_eq!(out.sample_rate, 16_000);
        assert_eq!(out.frames(), 16_000);
    }

    #[test]
    fn downsample_44k1_keeps_duration() {
        let frames = 22_050;
        let input = Signal::new(sine(1_000.0, 44_100, frames, 0.5), 1, 44_100);
        let out = resample(&input, 16_000).unwrap();
        assert_eq!(out.frames(), 8_000);
        assert!((out.duration_secs() - 0.5).abs() < 1e-3);
    }

    #[test]
    fn delay_is_compensated() {
        // The tone starts at frame 0, so the output should not begin with a
        // long run of near-silence.
        let input = Signal::new(sine(1_000.0, 48_000, 48_000, 0.5), 1, 48_000);
        let out = resample(&input, 16_000).unwrap();
        let head = crate::signal::peak(&out.samples[..64]);
        assert!(head > 0.2, "head peak {head}");
    }

    #[test]
    fn multichannel_is_preserved() {
        let mono = sine(500.0, 32_000, 32_000, 0.5);
        let stereo: Vec<f32> = mono.iter().flat_map(|&s| [s, -s]).collect();
        let out = resample(&Signal::new(stereo, 2, 32_000), 16_000).unwrap();
        assert_eq!(out.channels, 2);
        assert_eq!(out.frames(), 16_000);
        // Channels stay mirrored
        for frame in out.samples.chunks_exact(2).skip(100).take(100) {
            assert!((frame[0] + frame[1]).abs() < 1e-4);
        }
    }

    #[test]
    fn empty_signal_changes_rate_only() {
        let out = resample(&Signal::new(Vec::new(), 1, 44_100), 16_000).unwrap();
        assert!(out.is_empty());
        assert_eq!(out.sample_rate, 16_000);
    }
}

//! Leading-silence removal and sample reversal.
//!
//! Trailing silence is removed by composing these: reverse, trim the head,
//! reverse back.

use crate::signal::{Signal, db_to_amplitude};

/// Mean square across the channels of one frame.
fn frame_power(signal: &Signal, frame: usize) -> f64 {
    let channels = signal.channels;
    let start = frame * channels;
    let sum: f64 = signal.samples[start..start + channels]
        .iter()
        .map(|&s| f64::from(s) * f64::from(s))
        .sum();
    sum / channels as f64
}

/// Drop frames before the first point where the running RMS over
/// `window_ms` reaches `threshold_db`.
///
/// The window is zero-padded before the start of the signal: its mean square
/// is always taken over the full window length, so one loud sample at the
/// very edge of a clip weighs the same as it would anywhere else. The cut lands on the first frame inside the triggering window that is
/// itself above the threshold, so the onset is kept sample-accurate rather
/// than carrying up to one window of quiet lead-in. A signal that never
/// reaches the threshold trims to empty.
pub fn trim_leading_silence(signal: &Signal, threshold_db: f32, window_ms: u32) -> Signal {
    let channels = signal.channels;
    let frames = signal.frames();
    let window =
        ((u64::from(signal.sample_rate) * u64::from(window_ms)) / 1000).max(1) as usize;
    let threshold = f64::from(db_to_amplitude(threshold_db));
    let threshold_sq = threshold * threshold;

    let mut sum = 0.0_f64;
    for frame in 0..frames {
        sum += frame_power(signal, frame);
        if frame >= window {
            sum = (sum - frame_power(signal, frame - window)).max(0.0);
        }
        if sum / window as f64 >= threshold_sq {
            let first = (frame + 1).saturating_sub(window);
            let onset = (first..=frame)
                .find(|&f| frame_power(signal, f) >= threshold_sq)
                .unwrap_or(first);
            return Signal::new(
                signal.samples[onset * channels..].to_vec(),
                channels,
                signal.sample_rate,
            );
        }
    }

    Signal::new(Vec::new(), channels, signal.sample_rate)
}

/// Reverse frame order, keeping channel order within each frame.
pub fn reverse(signal: &Signal) -> Signal {
    let channels = signal.channels;
    let samples = signal
        .samples
        .chunks_exact(channels)
        .rev()
        .flatten()
        .copied()
        .collect();
    Signal::new(samples, channels, signal.sample_rate)
}

//! EBU R128 loudness measurement and linear loudness normalization.
//!
//! Integrated loudness follows ITU-R BS.1770: K-weighting, 400 ms gating
//! blocks on a 100 ms hop, an absolute gate at -70 LUFS and a relative gate
//! 10 LU below the ungated mean. Loudness range uses 3 s short-term windows
//! with a -20 LU relative gate and the 10th to 95th percentile spread.

use std::f64::consts::PI;

use crate::signal::Signal;
use crate::types::LoudnessReport;

const ABSOLUTE_GATE_LUFS: f64 = -70.0;
const RELATIVE_GATE_LU: f64 = -10.0;
const RANGE_GATE_LU: f64 = -20.0;
const BLOCK_MS: u64 = 400;
const SHORT_TERM_MS: u64 = 3_000;
const HOP_MS: u64 = 100;

/// Taps on each side of the interpolation point for true-peak estimation.
const TRUE_PEAK_HALF_TAPS: isize = 8;
const OVERSAMPLE: usize = 4;

/// Loudness targets for [`normalize_loudness`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LoudnessTarget {
    /// Integrated loudness target (LUFS).
    pub integrated_lufs: f64,
    /// True-peak ceiling (dBTP).
    pub true_peak_dbtp: f64,
    /// Loudness range target (LU). Reported against, not enforced: gain is
    /// applied linearly.
    pub loudness_range_lu: f64,
}

/// Measurements of one signal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LoudnessMeasurement {
    /// Gated integrated loudness (LUFS), `-inf` when every block is gated.
    pub integrated_lufs: f64,
    /// Loudness range (LU), 0 when shorter than one short-term window.
    pub range_lu: f64,
    /// 4x oversampled true peak (dBTP).
    pub true_peak_dbtp: f64,
}

#[derive(Clone, Copy, Debug)]
struct Biquad {
    b: [f64; 3],
    a: [f64; 3],
}

impl Biquad {
    fn run(&self, input: &[f64]) -> Vec<f64> {
        let (mut x1, mut x2, mut y1, mut y2) = (0.0, 0.0, 0.0, 0.0);
        input
            .iter()
            .map(|&x| {
                let y = self.b[0] * x + self.b[1] * x1 + self.b[2] * x2
                    - self.a[1] * y1
                    - self.a[2] * y2;
                x2 = x1;
                x1 = x;
                y2 = y1;
                y1 = y;
                y
            })
            .collect()
    }
}

/// The two K-weighting stages (high-shelf pre-filter, RLB high-pass),
/// derived for an arbitrary sample rate.
fn k_weighting(sample_rate: u32) -> [Biquad; 2] {
    let rate = f64::from(sample_rate);

    let f0 = 1_681.974_450_955_533;
    let gain_db = 3.999_843_853_973_347;
    let q = 0.707_175_236_955_419_6;
    let k = (PI * f0 / rate).tan();
    let vh = 10.0_f64.powf(gain_db / 20.0);
    let vb = vh.powf(0.499_666_774_154_541_6);
    let a0 = 1.0 + k / q + k * k;
    let shelf = Biquad {
        b: [
            (vh + vb * k / q + k * k) / a0,
            2.0 * (k * k - vh) / a0,
            (vh - vb * k / q + k * k) / a0,
        ],
        a: [1.0, 2.0 * (k * k - 1.0) / a0, (1.0 - k / q + k * k) / a0],
    };

    let f0 = 38.135_470_876_024_44;
    let q = 0.500_327_037_323_877_3;
    let k = (PI * f0 / rate).tan();
    let a0 = 1.0 + k / q + k * k;
    let high_pass = Biquad {
        b: [1.0, -2.0, 1.0],
        a: [1.0, 2.0 * (k * k - 1.0) / a0, (1.0 - k / q + k * k) / a0],
    };

    [shelf, high_pass]
}

fn power_to_lufs(power: f64) -> f64 {
    if power <= 0.0 {
        return f64::NEG_INFINITY;
    }
    -0.691 + 10.0 * power.log10()
}

/// Channel-summed mean-square power of every `window`-frame block taken on
/// a `hop`-frame stride. A signal shorter than one window yields a single
/// block over all of it when `allow_partial` is set.
fn block_powers(weighted: &[Vec<f64>], window: usize, hop: usize, allow_partial: bool) -> Vec<f64> {
    let frames = weighted.first().map_or(0, Vec::len);
    if frames == 0 || window == 0 {
        return Vec::new();
    }
    if frames < window {
        if !allow_partial {
            return Vec::new();
        }
        let power = weighted
            .iter()
            .map(|ch| ch.iter().map(|s| s * s).sum::<f64>() / frames as f64)
            .sum();
        return vec![power];
    }

    let hop = hop.max(1);
    // Prefix sums of squares per channel keep each block O(channels).
    let prefix: Vec<Vec<f64>> = weighted
        .iter()
        .map(|ch| {
            let mut acc = Vec::with_capacity(ch.len() + 1);
            acc.push(0.0);
            let mut total = 0.0;
            for s in ch {
                total += s * s;
                acc.push(total);
            }
            acc
        })
        .collect();

    (0..=(frames - window) / hop)
        .map(|i| {
            let start = i * hop;
            prefix
                .iter()
                .map(|p| (p[start + window] - p[start]) / window as f64)
                .sum()
        })
        .collect()
}

fn gated_mean(powers: &[f64], threshold_lufs: f64) -> Option<f64> {
    let kept: Vec<f64> = powers
        .iter()
        .copied()
        .filter(|&p| power_to_lufs(p) > threshold_lufs)
        .collect();
    if kept.is_empty() {
        return None;
    }
    Some(kept.iter().sum::<f64>() / kept.len() as f64)
}

fn integrated(powers: &[f64]) -> f64 {
    let Some(ungated) = gated_mean(powers, ABSOLUTE_GATE_LUFS) else {
        return f64::NEG_INFINITY;
    };
    let relative = power_to_lufs(ungated) + RELATIVE_GATE_LU;
    let threshold = relative.max(ABSOLUTE_GATE_LUFS);
    gated_mean(powers, threshold).map_or(f64::NEG_INFINITY, power_to_lufs)
}

fn loudness_range(powers: &[f64]) -> f64 {
    let Some(ungated) = gated_mean(powers, ABSOLUTE_GATE_LUFS) else {
        return 0.0;
    };
    let threshold = (power_to_lufs(ungated) + RANGE_GATE_LU).max(ABSOLUTE_GATE_LUFS);
    let mut levels: Vec<f64> = powers
        .iter()
        .map(|&p| power_to_lufs(p))
        .filter(|&l| l > threshold)
        .collect();
    if levels.is_empty() {
        return 0.0;
    }
    levels.sort_by(f64::total_cmp);
    let at = |q: f64| levels[((levels.len() - 1) as f64 * q).round() as usize];
    at(0.95) - at(0.10)
}

fn sinc(x: f64) -> f64 {
    if x.abs() < 1e-12 {
        1.0
    } else {
        (PI * x).sin() / (PI * x)
    }
}

/// Windowed-sinc taps for each fractional phase `1..OVERSAMPLE`.
fn true_peak_taps() -> Vec<Vec<(isize, f64)>> {
    let half = TRUE_PEAK_HALF_TAPS as f64;
    (1..OVERSAMPLE)
        .map(|phase| {
            let frac = phase as f64 / OVERSAMPLE as f64;
            (-TRUE_PEAK_HALF_TAPS + 1..=TRUE_PEAK_HALF_TAPS)
                .map(|offset| {
                    let x = frac - offset as f64;
                    let hann = 0.5 * (1.0 + (PI * x / half).cos());
                    (offset, sinc(x) * hann)
                })
                .collect()
        })
        .collect()
}

fn true_peak(channels: &[Vec<f64>]) -> f64 {
    let taps = true_peak_taps();
    let mut peak = 0.0_f64;
    for ch in channels {
        let len = ch.len() as isize;
        for (n, &s) in ch.iter().enumerate() {
            peak = peak.max(s.abs());
            for phase in &taps {
                let value: f64 = phase
                    .iter()
                    .filter_map(|&(offset, h)| {
                        let j = n as isize + offset;
                        (0..len).contains(&j).then(|| ch[j as usize] * h)
                    })
                    .sum();
                peak = peak.max(value.abs());
            }
        }
    }
    if peak <= 0.0 {
        f64::NEG_INFINITY
    } else {
        20.0 * peak.log10()
    }
}

fn planar(signal: &Signal) -> Vec<Vec<f64>> {
    let channels = signal.channels;
    let mut out = vec![Vec::with_capacity(signal.frames()); channels];
    for frame in signal.samples.chunks_exact(channels) {
        for (dst, &s) in out.iter_mut().zip(frame) {
            dst.push(f64::from(s));
        }
    }
    out
}

fn k_weighted(channels: &[Vec<f64>], sample_rate: u32) -> Vec<Vec<f64>> {
    let [shelf, high_pass] = k_weighting(sample_rate);
    channels
        .iter()
        .map(|ch| high_pass.run(&shelf.run(ch)))
        .collect()
}

fn frames_for(sample_rate: u32, ms: u64) -> usize {
    (u64::from(sample_rate) * ms / 1000) as usize
}

/// Measure integrated loudness, loudness range and true peak.
pub fn measure(signal: &Signal) -> LoudnessMeasurement {
    let raw = planar(signal);
    let weighted = k_weighted(&raw, signal.sample_rate);

    let hop = frames_for(signal.sample_rate, HOP_MS);
    let blocks = block_powers(&weighted, frames_for(signal.sample_rate, BLOCK_MS), hop, true);
    let short_term = block_powers(
        &weighted,
        frames_for(signal.sample_rate, SHORT_TERM_MS),
        hop,
        false,
    );

    LoudnessMeasurement {
        integrated_lufs: integrated(&blocks),
        range_lu: loudness_range(&short_term),
        true_peak_dbtp: true_peak(&raw),
    }
}

/// Gain (dB) that brings `measured` to the target without pushing the true
/// peak over the ceiling. Unmeasurable (fully gated) input gets no gain.
pub fn normalization_gain(measured: &LoudnessMeasurement, target: &LoudnessTarget) -> f64 {
    if !measured.integrated_lufs.is_finite() {
        return 0.0;
    }
    let gain = target.integrated_lufs - measured.integrated_lufs;
    if measured.true_peak_dbtp.is_finite() && measured.true_peak_dbtp + gain > target.true_peak_dbtp
    {
        return target.true_peak_dbtp - measured.true_peak_dbtp;
    }
    gain
}

/// Apply linear loudness normalization and report what was measured.
pub fn normalize_loudness(signal: &Signal, target: &LoudnessTarget) -> (Signal, LoudnessReport) {
    let input = measure(signal);
    let gain_db = normalization_gain(&input, target);
    let factor = 10.0_f64.powf(gain_db / 20.0) as f32;

    let samples = signal
        .samples
        .iter()
        .map(|&s| (s * factor).clamp(-1.0, 1.0))
        .collect();
    let output = Signal::new(samples, signal.channels, signal.sample_rate);
    let output_lufs = measure_integrated(&output);

    (
        output,
        LoudnessReport {
            input_lufs: input.integrated_lufs,
            output_lufs,
            input_range_lu: input.range_lu,
            input_true_peak_dbtp: input.true_peak_dbtp,
            gain_db,
        },
    )
}

/// Integrated loudness only; skips the true-peak scan.
pub fn measure_integrated(signal: &Signal) -> f64 {
    let weighted = k_weighted(&planar(signal), signal.sample_rate);
    let blocks = block_powers(
        &weighted,
        frames_for(signal.sample_rate, BLOCK_MS),
        frames_for(signal.sample_rate, HOP_MS),
        true,
    );
    integrated(&blocks)
}

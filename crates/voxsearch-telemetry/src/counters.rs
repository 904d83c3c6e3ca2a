//! Process-lifetime SLO counters for the closed [`VoiceMetric`] set.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use voxsearch_core::VoiceMetric;

/// Monotonic counters, one per [`VoiceMetric`], all starting at zero.
///
/// Lock-free; share behind an `Arc` or own it inside the recorder.
#[derive(Debug, Default)]
pub struct VoiceMetricCounters {
    values: [AtomicU64; VoiceMetric::ALL.len()],
}

impl VoiceMetricCounters {
    /// All counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one to `metric`, returning the new count.
    pub fn increment(&self, metric: VoiceMetric) -> u64 {
        self.values[metric.index()].fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Current count for `metric`.
    pub fn get(&self, metric: VoiceMetric) -> u64 {
        self.values[metric.index()].load(Ordering::Relaxed)
    }

    /// Every counter by dotted name.
    pub fn snapshot(&self) -> BTreeMap<&'static str, u64> {
        VoiceMetric::ALL
            .into_iter()
            .map(|m| (m.name(), self.get(m)))
            .collect()
    }
}

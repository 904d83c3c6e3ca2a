//! Property tests for the recorder's counting and retention contract.

use std::sync::Arc;

use proptest::prelude::*;
use voxsearch_core::{Outcome, Provider, VoiceMetric};
use voxsearch_telemetry::{OutcomeReport, StaticEnvironment, TelemetryRecorder};

fn recorder(capacity: usize) -> TelemetryRecorder {
    TelemetryRecorder::with_probe(capacity, Arc::new(StaticEnvironment::default()))
}

fn outcome() -> impl Strategy<Value = Outcome> {
    prop_oneof![
        Just(Outcome::Success),
        Just(Outcome::NoSpeech),
        Just(Outcome::Denied),
        Just(Outcome::Error),
    ]
}

fn provider() -> impl Strategy<Value = Provider> {
    prop_oneof![Just(Provider::Native), Just(Provider::Fallback)]
}

#[test]
fn ring_keeps_last_hundred_in_order() {
    let recorder = recorder(100);
    for i in 0..101 {
        let _ = recorder.record_outcome(OutcomeReport::new(
            Provider::Native,
            Outcome::Success,
            f64::from(i),
        ));
    }
    let history = recorder.history();
    assert_eq!(history.len(), 100);
    assert!(history.iter().all(|e| e.duration_ms != 0));
    let durations: Vec<u64> = history.iter().map(|e| e.duration_ms).collect();
    assert_eq!(durations, (1..=100).collect::<Vec<u64>>());
}

#[test]
fn concurrent_recording_counts_every_event() {
    let recorder = Arc::new(recorder(100));
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let recorder = Arc::clone(&recorder);
            std::thread::spawn(move || {
                for _ in 0..50 {
                    let _ = recorder.record_outcome(
                        OutcomeReport::new(Provider::Fallback, Outcome::NoSpeech, 1.0)
                            .with_detection(true, false),
                    );
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(recorder.count(VoiceMetric::NoSpeech), 400);
    assert_eq!(recorder.count(VoiceMetric::SuspectedFalseNoSpeech), 400);
    assert_eq!(recorder.history().len(), 100);
}

proptest! {
    #[test]
    fn duration_is_clamped_and_rounded(d in -1.0e7_f64..1.0e7) {
        let event = recorder(10).record_outcome(
            OutcomeReport::new(Provider::Native, Outcome::Success, d),
        );
        let expected = d.round().max(0.0) as u64;
        prop_assert_eq!(event.duration_ms, expected);
    }

    #[test]
    fn history_never_exceeds_capacity(capacity in 1_usize..20, n in 0_usize..60) {
        let recorder = recorder(capacity);
        for i in 0..n {
            let _ = recorder.record_outcome(
                OutcomeReport::new(Provider::Native, Outcome::Success, i as f64),
            );
        }
        let history = recorder.history();
        prop_assert_eq!(history.len(), n.min(capacity));
        let first_kept = n.saturating_sub(capacity);
        for (offset, event) in history.iter().enumerate() {
            prop_assert_eq!(event.duration_ms, (first_kept + offset) as u64);
        }
    }

    #[test]
    fn suspected_false_no_speech_iff_silent_outcome_with_energy(
        reports in prop::collection::vec((provider(), outcome(), any::<bool>(), any::<bool>()), 0..40)
    ) {
        let recorder = recorder(100);
        let mut expected = 0_u64;
        for (provider, outcome, energy, spoken) in reports {
            if outcome == Outcome::NoSpeech && energy {
                expected += 1;
            }
            let _ = recorder.record_outcome(
                OutcomeReport::new(provider, outcome, 0.0).with_detection(energy, spoken),
            );
        }
        prop_assert_eq!(recorder.count(VoiceMetric::SuspectedFalseNoSpeech), expected);
    }
}

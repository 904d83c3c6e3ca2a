//! Async front door of the preprocessing engine.

use std::sync::Arc;

use tokio::sync::{Mutex, watch};
use tokio::time::Instant;
use tracing::{debug, info, warn};
use voxsearch_settings::AudioSettings;

use crate::chain::FilterChain;
use crate::engine::{CodecEngine, EngineLoader, ScratchDirLoader};
use crate::types::{AudioClip, AudioError, NormalizeOutcome};

/// Turns captured clips into normalized 16 kHz mono WAV.
///
/// The codec engine is loaded on first use. Concurrent first calls wait on
/// one in-flight load and all see its result, success or failure. A failed
/// load resets the slot so the next call retries. Executions against the
/// engine are serialized and run on the blocking pool.
pub struct AudioPreprocessor {
    chain: FilterChain,
    energy_floor_db: f32,
    loader: Arc<dyn EngineLoader>,
    engine: Arc<parking_lot::Mutex<EngineSlot>>,
    exec_lock: Arc<Mutex<()>>,
}

type LoadResult = Result<Arc<CodecEngine>, Arc<AudioError>>;

/// Load state of the codec engine.
enum EngineSlot {
    Empty,
    /// A load task is running; its result is published on the channel.
    Loading(watch::Receiver<Option<LoadResult>>),
    Ready(Arc<CodecEngine>),
}

impl AudioPreprocessor {
    /// Preprocessor with a temp-dir scratch space rooted at
    /// `settings.scratch_dir`.
    pub fn new(settings: &AudioSettings) -> Self {
        Self::with_loader(
            settings,
            Arc::new(ScratchDirLoader::new(settings.scratch_dir.clone())),
        )
    }

    /// Preprocessor with a custom engine loader.
    pub fn with_loader(settings: &AudioSettings, loader: Arc<dyn EngineLoader>) -> Self {
        Self {
            chain: FilterChain::speech_normalization(settings),
            energy_floor_db: settings.energy_floor_db,
            loader,
            engine: Arc::new(parking_lot::Mutex::new(EngineSlot::Empty)),
            exec_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Filter chain applied by [`Self::normalize`].
    pub fn chain(&self) -> &FilterChain {
        &self.chain
    }

    /// Input peak level above which a clip counts as carrying energy (dBFS).
    pub fn energy_floor_db(&self) -> f32 {
        self.energy_floor_db
    }

    /// Whether the engine has been loaded.
    pub fn is_loaded(&self) -> bool {
        matches!(*self.engine.lock(), EngineSlot::Ready(_))
    }

    /// The shared engine, loading it if needed.
    ///
    /// The load runs on its own task, so dropping a waiting call does not
    /// abort it for the others.
    pub async fn engine(&self) -> Result<Arc<CodecEngine>, AudioError> {
        loop {
            let mut rx = {
                let mut slot = self.engine.lock();
                if let EngineSlot::Ready(engine) = &*slot {
                    return Ok(Arc::clone(engine));
                }
                if let EngineSlot::Loading(rx) = &*slot {
                    rx.clone()
                } else {
                    let rx = self.spawn_load();
                    *slot = EngineSlot::Loading(rx.clone());
                    rx
                }
            };

            let published = match rx.wait_for(Option::is_some).await {
                Ok(result) => result.clone(),
                Err(_) => None,
            };
            match published {
                Some(Ok(engine)) => return Ok(engine),
                Some(Err(e)) => return Err(shared_error(&e)),
                None => {
                    // The load task died without publishing. Clear its slot
                    // and start over.
                    let mut slot = self.engine.lock();
                    let stale = matches!(
                        &*slot,
                        EngineSlot::Loading(current) if current.same_channel(&rx)
                    );
                    if stale {
                        *slot = EngineSlot::Empty;
                    }
                }
            }
        }
    }

    fn spawn_load(&self) -> watch::Receiver<Option<LoadResult>> {
        let (tx, rx) = watch::channel(None);
        let loader = Arc::clone(&self.loader);
        let slot = Arc::clone(&self.engine);
        drop(tokio::spawn(async move {
            debug!("loading codec engine");
            let result: LoadResult = loader.load().await.map(Arc::new).map_err(Arc::new);
            // Update the slot before publishing so a caller that sees the
            // failure and retries starts a fresh load.
            *slot.lock() = match &result {
                Ok(engine) => EngineSlot::Ready(Arc::clone(engine)),
                Err(_) => EngineSlot::Empty,
            };
            let _ = tx.send(Some(result));
        }));
        rx
    }

    /// Normalize one clip.
    ///
    /// Returns [`NormalizeOutcome::Empty`] when nothing is left after
    /// silence trimming. Engine load failures surface as
    /// [`AudioError::EngineUnavailable`].
    pub async fn normalize(&self, clip: AudioClip) -> Result<NormalizeOutcome, AudioError> {
        let engine = self.engine().await.inspect_err(|e| {
            warn!(error = %e, "codec engine load failed");
        })?;

        let started = Instant::now();
        let input_bytes = clip.bytes.len();
        let guard = Arc::clone(&self.exec_lock).lock_owned().await;
        let chain = self.chain.clone();

        // The guard moves into the worker, so the next call waits for this
        // one to finish even if the awaiting future is dropped.
        let outcome = tokio::task::spawn_blocking(move || {
            let _guard = guard;
            engine.exec(&clip.bytes, clip.extension(), &chain)
        })
        .await
        .map_err(|e| AudioError::Task(format!("normalize task: {e}")))??;

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &outcome {
            NormalizeOutcome::Normalized(normalized) => info!(
                input_bytes,
                output_samples = normalized.sample_count,
                input_peak_dbfs = normalized.input_peak_dbfs,
                gain_db = normalized.loudness.map(|l| l.gain_db),
                elapsed_ms,
                "clip normalized"
            ),
            NormalizeOutcome::Empty { input_peak_dbfs } => info!(
                input_bytes,
                input_peak_dbfs,
                elapsed_ms,
                "clip empty after trimming"
            ),
        }
        Ok(outcome)
    }
}

/// Per-caller copy of a load failure shared by every waiter.
fn shared_error(e: &AudioError) -> AudioError {
    match e {
        AudioError::EngineUnavailable(msg) => AudioError::EngineUnavailable(msg.clone()),
        AudioError::Task(msg) => AudioError::Task(msg.clone()),
        other => AudioError::EngineUnavailable(other.to_string()),
    }
}

impl std::fmt::Debug for AudioPreprocessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioPreprocessor")
            .field("chain", &self.chain.to_string())
            .field("loaded", &self.is_loaded())
            .finish_non_exhaustive()
    }
}

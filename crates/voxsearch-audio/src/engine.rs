//! Codec engine: a scratch filesystem plus the decode, filter and encode steps
//! run against it.
//!
//! Each execution writes the raw clip into a named input slot, decodes it,
//! runs the filter chain and writes the result into a named output slot.
//! Both slots are deleted when the call ends, whichever way it ends.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tempfile::TempDir;
use tracing::{debug, info, warn};

use crate::chain::FilterChain;
use crate::decode::decode_file;
use crate::types::{AudioError, NormalizeOutcome, NormalizedClip};
use crate::wav::write_wav_file;

/// Prefix of the scratch directory created for each engine instance.
const SCRATCH_PREFIX: &str = "voxsearch-engine-";

/// Produces a ready [`CodecEngine`].
///
/// The preprocessor calls this at most once per successful load; a failed
/// load is retried on the next `normalize` call.
#[async_trait]
pub trait EngineLoader: Send + Sync {
    /// Create the engine and its scratch storage.
    async fn load(&self) -> Result<CodecEngine, AudioError>;
}

/// Loads an engine whose scratch space is a fresh temporary directory under
/// `base` (the system temp dir when `None`).
#[derive(Clone, Debug, Default)]
pub struct ScratchDirLoader {
    base: Option<PathBuf>,
}

impl ScratchDirLoader {
    /// Loader rooted at `base`.
    pub fn new(base: Option<PathBuf>) -> Self {
        Self { base }
    }
}

#[async_trait]
impl EngineLoader for ScratchDirLoader {
    async fn load(&self) -> Result<CodecEngine, AudioError> {
        let base = self.base.clone();
        let dir = tokio::task::spawn_blocking(move || {
            let mut builder = tempfile::Builder::new();
            let _ = builder.prefix(SCRATCH_PREFIX);
            match base {
                Some(base) => builder.tempdir_in(base),
                None => builder.tempdir(),
            }
        })
        .await
        .map_err(|e| AudioError::Task(format!("engine load task: {e}")))?
        .map_err(|e| AudioError::EngineUnavailable(format!("scratch space: {e}")))?;

        info!(scratch = %dir.path().display(), "codec engine ready");
        Ok(CodecEngine::new(dir))
    }
}

/// Paths of one execution's input and output slots. Dropping the pair
/// deletes both files.
struct SlotPair {
    input: PathBuf,
    output: PathBuf,
}

impl Drop for SlotPair {
    fn drop(&mut self) {
        for path in [&self.input, &self.output] {
            match std::fs::remove_file(path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!(path = %path.display(), "failed to release slot: {e}"),
            }
        }
    }
}

/// A loaded codec engine.
///
/// Slot names are unique per engine, but callers still serialize
/// [`CodecEngine::exec`] calls; see `AudioPreprocessor`.
pub struct CodecEngine {
    scratch: TempDir,
    next_slot: AtomicU64,
}

impl CodecEngine {
    /// Engine backed by `scratch`, which is removed when the engine drops.
    pub fn new(scratch: TempDir) -> Self {
        Self {
            scratch,
            next_slot: AtomicU64::new(0),
        }
    }

    /// Root of the scratch filesystem.
    pub fn scratch_path(&self) -> &Path {
        self.scratch.path()
    }

    /// Number of files currently held in the scratch filesystem.
    pub fn scratch_entries(&self) -> Result<usize, AudioError> {
        Ok(std::fs::read_dir(self.scratch.path())?.count())
    }

    fn acquire_slots(&self, extension: &str) -> SlotPair {
        let n = self.next_slot.fetch_add(1, Ordering::Relaxed);
        SlotPair {
            input: self.scratch.path().join(format!("input-{n}.{extension}")),
            output: self.scratch.path().join(format!("output-{n}.wav")),
        }
    }

    /// Decode `input`, run `chain` over it and encode the result as WAV.
    ///
    /// Blocking; run it off the async runtime.
    pub fn exec(
        &self,
        input: &[u8],
        extension: &str,
        chain: &FilterChain,
    ) -> Result<NormalizeOutcome, AudioError> {
        let slots = self.acquire_slots(extension);
        std::fs::write(&slots.input, input)?;

        let decoded = decode_file(&slots.input)?;
        let input_peak_dbfs = decoded.peak_dbfs();
        let output = chain.apply(decoded)?;

        if output.signal.is_empty() {
            debug!(input_peak_dbfs, "nothing left after trimming");
            return Ok(NormalizeOutcome::Empty { input_peak_dbfs });
        }

        write_wav_file(&slots.output, &output.signal)?;
        let wav = std::fs::read(&slots.output)?;

        Ok(NormalizeOutcome::Normalized(NormalizedClip {
            wav,
            sample_rate: output.signal.sample_rate,
            sample_count: output.signal.frames(),
            input_peak_dbfs,
            loudness: output.loudness,
            filter_graph: chain.to_string(),
        }))
    }
}

impl std::fmt::Debug for CodecEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodecEngine")
            .field("scratch", &self.scratch.path())
            .finish_non_exhaustive()
    }
}

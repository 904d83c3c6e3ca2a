//! Container probing and decoding into interleaved `f32` PCM.

use std::fs::File;
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::debug;

use crate::signal::Signal;
use crate::types::{AudioError, ResultExt};

/// Decode the file at `path` into an interleaved [`Signal`].
///
/// Channels are preserved; downmixing is a separate filter stage. A stream
/// with zero decodable frames yields an empty signal, not an error.
pub fn decode_file(path: &Path) -> Result<Signal, AudioError> {
    let file = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        if ext != "bin" {
            let _ = hint.with_extension(ext);
        }
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .decode("probe failed")?;

    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| AudioError::Decode("no audio track found".into()))?;

    let codec_params = track.codec_params.clone();
    let track_id = track.id;
    let mut sample_rate = codec_params.sample_rate.unwrap_or(0);
    let mut channels = codec_params.channels.map_or(0, |c| c.count());

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .decode("codec init failed")?;

    let mut samples: Vec<f32> = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(SymphoniaError::IoError(ref e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => return Err(AudioError::Decode(format!("packet read: {e}"))),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            // A corrupt frame is skipped, as players do
            Err(SymphoniaError::DecodeError(e)) => {
                debug!("skipping undecodable packet: {e}");
                continue;
            }
            Err(e) => return Err(AudioError::Decode(format!("decode: {e}"))),
        };

        let spec = *decoded.spec();
        if sample_rate == 0 {
            sample_rate = spec.rate;
        }
        if channels == 0 {
            channels = spec.channels.count();
        }

        let mut sample_buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);
        samples.extend_from_slice(sample_buf.samples());
    }

    if sample_rate == 0 {
        return Err(AudioError::Decode("stream has no sample rate".into()));
    }

    let signal = Signal::new(samples, channels.max(1), sample_rate);
    debug!(
        frames = signal.frames(),
        channels = signal.channels,
        sample_rate = signal.sample_rate,
        "decoded input"
    );
    Ok(signal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wav::encode_wav;

    #[test]
    fn decode_invalid_audio_returns_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("input.wav");
        std::fs::write(&path, b"not audio data").unwrap();
        assert!(matches!(decode_file(&path), Err(AudioError::Decode(_))));
    }

    #[test]
    fn decode_missing_file_is_io_error() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(matches!(
            decode_file(&tmp.path().join("missing.wav")),
            Err(AudioError::Io(_))
        ));
    }

    #[test]
    fn decode_preserves_channels_and_rate() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("input.wav");
        let frames = 4_410;
        let samples: Vec<f32> = (0..frames * 2)
            .map(|i| if i % 2 == 0 { 0.25 } else { -0.25 })
            .collect();
        let wav = encode_wav(&Signal::new(samples, 2, 44_100)).unwrap();
        std::fs::write(&path, wav).unwrap();

        let signal = decode_file(&path).unwrap();
        assert_eq!(signal.channels, 2);
        assert_eq!(signal.sample_rate, 44_100);
        assert_eq!(signal.frames(), frames);
        assert!((signal.samples[0] - 0.25).abs() < 1e-3);
        assert!((signal.samples[1] + 0.25).abs() < 1e-3);
    }

    #[test]
    fn decode_without_extension_hint_still_probes() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("input.bin");
        let wav = encode_wav(&Signal::new(vec![0.1; 1_600], 1, 16_000)).unwrap();
        std::fs::write(&path, wav).unwrap();

        let signal = decode_file(&path).unwrap();
        assert_eq!(signal.frames(), 1_600);
    }
}

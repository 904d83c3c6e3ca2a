//! 16-bit PCM WAV encoding via `hound`.

use std::io::Cursor;
use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::signal::Signal;
use crate::types::{AudioError, ResultExt};

fn spec_for(signal: &Signal) -> Result<WavSpec, AudioError> {
    let channels = u16::try_from(signal.channels)
        .map_err(|_| AudioError::Encode(format!("{} channels", signal.channels)))?;
    Ok(WavSpec {
        channels,
        sample_rate: signal.sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    })
}

fn to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)).round() as i16
}

/// Encode a signal as an in-memory 16-bit PCM WAV container.
pub fn encode_wav(signal: &Signal) -> Result<Vec<u8>, AudioError> {
    let spec = spec_for(signal)?;
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut cursor, spec).encode("wav header")?;
        for &sample in &signal.samples {
            writer.write_sample(to_i16(sample)).encode("wav sample")?;
        }
        writer.finalize().encode("wav finalize")?;
    }
    Ok(cursor.into_inner())
}

/// Write a signal to `path` as a 16-bit PCM WAV file.
pub fn write_wav_file(path: &Path, signal: &Signal) -> Result<(), AudioError> {
    let spec = spec_for(signal)?;
    let mut writer = WavWriter::create(path, spec).encode("wav create")?;
    for &sample in &signal.samples {
        writer.write_sample(to_i16(sample)).encode("wav sample")?;
    }
    writer.finalize().encode("wav finalize")?;
    Ok(())
}

/// Decode WAV bytes into a [`Signal`]. Supports 16/24/32-bit integer and
/// 32-bit float payloads.
pub fn decode_wav(bytes: &[u8]) -> Result<Signal, AudioError> {
    let reader = WavReader::new(Cursor::new(bytes)).decode("wav header")?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<Result<_, _>>()
            .decode("wav samples")?,
        SampleFormat::Int => {
            let scale = (1_i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<_, _>>()
                .decode("wav samples")?
        }
    };

    Ok(Signal::new(
        samples,
        usize::from(spec.channels),
        spec.sample_rate,
    ))
}

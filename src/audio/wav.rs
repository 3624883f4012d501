use std::path::Path;

use hound::{SampleFormat, WavReader};

use crate::constants::SAMPLE_RATE;
use crate::error::{DeckError, Result};

/// Reads a normalized WAV into interleaved stereo f32. Mono files are
/// doubled onto both channels; anything wider than stereo, or not at the
/// deck's sample rate, is refused rather than played at the wrong speed.
pub fn read_stereo_f32(path: &Path) -> Result<Vec<f32>> {
    let mut reader = WavReader::open(path)?;
    let spec = reader.spec();

    if spec.sample_rate != SAMPLE_RATE {
        return Err(DeckError::UnsupportedWav(format!(
            "{}: sample rate {} (expected {})",
            path.display(),
            spec.sample_rate,
            SAMPLE_RATE
        )));
    }

    let samples = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Float, 32) => reader.samples::<f32>().collect::<std::result::Result<Vec<_>, _>>()?,
        (SampleFormat::Int, 8) => reader
            .samples::<i8>()
            .map(|s| s.map(|v| v as f32 / i8::MAX as f32))
            .collect::<std::result::Result<Vec<_>, _>>()?,
        (SampleFormat::Int, 16) => reader
            .samples::<i16>()
            .map(|s| s.map(|v| v as f32 / i16::MAX as f32))
            .collect::<std::result::Result<Vec<_>, _>>()?,
        (SampleFormat::Int, 24 | 32) => {
            let denom = (1_i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / denom))
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
        _ => {
            return Err(DeckError::UnsupportedWav(format!(
                "{}: {}-bit {:?}",
                path.display(),
                spec.bits_per_sample,
                spec.sample_format
            )))
        }
    };

    match spec.channels {
        2 => Ok(samples),
        1 => {
            let mut stereo = Vec::with_capacity(samples.len() * 2);
            for s in samples {
                stereo.push(s);
                stereo.push(s);
            }
            Ok(stereo)
        }
        n => Err(DeckError::UnsupportedWav(format!(
            "{}: {} channels",
            path.display(),
            n
        ))),
    }
}

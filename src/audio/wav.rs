//! WAV artifacts exchanged between renderer and player.

use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use tracing::debug;

use super::util::downmix_to_mono;
use crate::error::SpeechError;

/// Write mono f32 samples as a 32-bit float WAV file.
///
/// # Arguments
/// * `path` - Destination file (overwritten)
/// * `samples` - Mono samples in -1.0 - 1.0
/// * `sample_rate` - Sample rate of `samples`
pub fn write_wav(path: &Path, samples: &[f32], sample_rate: u32) -> Result<(), SpeechError> {
    let spec = WavSpec { channels: 1, sample_rate, bits_per_sample: 32, sample_format: SampleFormat::Float };

    let mut writer = WavWriter::create(path, spec)?;
    for &sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;

    debug!("Wrote {} samples at {} Hz to {}", samples.len(), sample_rate, path.display());
    Ok(())
}

/// Read a WAV file of any common PCM layout as mono f32.
///
/// # Returns
/// The samples and their sample rate.
pub fn read_wav_mono(path: &Path) -> Result<(Vec<f32>, u32), SpeechError> {
    let mut reader = WavReader::open(path)?;
    let spec = reader.spec();

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
        SampleFormat::Int => {
            let scale = (1_i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
            reader.samples::<i32>().map(|s| s.map(|v| v as f32 / scale)).collect::<Result<_, _>>()?
        }
    };

    Ok((downmix_to_mono(&interleaved, spec.channels as usize), spec.sample_rate))
}

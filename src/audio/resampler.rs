//! Batch resampling of rendered speech to the output device rate.

use anyhow::{Context, Result};
use audioadapter_buffers::direct::InterleavedSlice;
use rubato::{Fft, FixedSync, Resampler};

/// Input frames per FFT pass.
const CHUNK_SIZE: usize = 1024;

/// Sub-chunks per pass (more is smoother, and slower).
const SUB_CHUNKS: usize = 2;

/// Resample a whole mono utterance from `from_rate` to `to_rate`.
///
/// The tail chunk is zero-padded and the output trimmed back to the expected
/// length.
pub fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>> {
    if from_rate == to_rate {
        return Ok(samples.to_vec());
    }

    let mut resampler = Fft::<f32>::new(from_rate as usize, to_rate as usize, CHUNK_SIZE, SUB_CHUNKS, 1, FixedSync::Input)
        .context("Failed to create resampler")?;

    let output_frames_max = resampler.output_frames_max();
    let mut scratch = vec![0.0f32; output_frames_max];
    let expected_len = (samples.len() as f64 * to_rate as f64 / from_rate as f64) as usize;
    let mut output = Vec::with_capacity(expected_len + CHUNK_SIZE);
    let mut chunk = vec![0.0f32; CHUNK_SIZE];

    for block in samples.chunks(CHUNK_SIZE) {
        chunk[..block.len()].copy_from_slice(block);
        chunk[block.len()..].fill(0.0);

        let input = InterleavedSlice::new(&chunk, 1, CHUNK_SIZE).context("Failed to create input adapter")?;
        let mut out = InterleavedSlice::new_mut(&mut scratch, 1, output_frames_max).context("Failed to create output adapter")?;

        let (_, written) = resampler.process_into_buffer(&input, &mut out, None).map_err(|e| anyhow::anyhow!("Resampling error: {}", e))?;
        output.extend_from_slice(&scratch[..written]);
    }

    output.truncate(expected_len);
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_rate_is_copy() {
        assert_eq!(resample(&[0.1, 0.2], 24000, 24000).unwrap(), vec![0.1, 0.2]);
    }

    #[test]
    fn test_upsample_24k_to_48k() {
        let samples = vec![0.0; 24000];
        let result = resample(&samples, 24000, 48000).unwrap();
        assert!(result.len() <= 48000 && result.len() >= 47000, "got {}", result.len());
    }
}

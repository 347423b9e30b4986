//! Shared audio helpers.

#[cfg(feature = "audio")]
use anyhow::Result;
#[cfg(feature = "audio")]
use cpal::traits::DeviceTrait;
#[cfg(feature = "audio")]
use cpal::{Device, SampleFormat, SupportedStreamConfig, SupportedStreamConfigRange};

/// Human-readable device name, or "Unknown".
#[cfg(feature = "audio")]
pub fn get_device_name(device: &Device) -> String {
    device.description().ok().map(|desc| desc.name().to_string()).unwrap_or_else(|| "Unknown".to_string())
}

/// Pick an F32 mono/stereo output configuration, preferring `target_sample_rate`.
///
/// Falls back to the closest rate the first usable configuration supports.
#[cfg(feature = "audio")]
pub fn find_best_config(configs: impl Iterator<Item = SupportedStreamConfigRange>, target_sample_rate: u32) -> Result<SupportedStreamConfig> {
    let usable: Vec<SupportedStreamConfigRange> =
        configs.filter(|c| c.channels() <= 2 && c.sample_format() == SampleFormat::F32).collect();

    if let Some(config) = usable.iter().find(|c| (c.min_sample_rate()..=c.max_sample_rate()).contains(&target_sample_rate)) {
        return Ok(config.with_sample_rate(target_sample_rate));
    }

    let Some(config) = usable.first() else {
        anyhow::bail!("No F32 output configuration found");
    };
    let rate = target_sample_rate.clamp(config.min_sample_rate(), config.max_sample_rate());
    Ok(config.with_sample_rate(rate))
}

/// Mix interleaved frames down to mono by averaging channels.
///
/// # Arguments
/// * `data` - Interleaved samples
/// * `channels` - Samples per frame (0 or 1 returns the input unchanged)
pub fn downmix_to_mono(data: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        data.to_vec()
    } else {
        data.chunks(channels).map(|frame| frame.iter().sum::<f32>() / channels as f32).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stereo_downmix() {
        let result = downmix_to_mono(&[0.5, 1.0, -0.5, -1.0], 2);
        assert_eq!(result, vec![0.75, -0.75]);
    }

    #[test]
    fn test_mono_passthrough() {
        assert_eq!(downmix_to_mono(&[0.1, 0.2], 1), vec![0.1, 0.2]);
    }
}

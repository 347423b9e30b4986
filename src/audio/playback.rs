//! Artifact playback on the default output device using cpal.
//!
//! Each call opens its own output stream, so concurrent speech jobs overlap
//! instead of queueing. Samples reach the audio callback through a lock-free
//! ring buffer.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use cpal::StreamConfig;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use ringbuf::HeapRb;
use ringbuf::traits::{Consumer, Observer, Producer, Split};
use tracing::{debug, info, warn};

use super::resampler::resample;
use super::util::{find_best_config, get_device_name};
use super::wav::read_wav_mono;
use crate::error::SpeechError;
use crate::speech::ArtifactPlayer;

/// Slack added to the expected duration before giving up on a stream.
const PLAYBACK_GRACE: Duration = Duration::from_secs(1);

/// Plays WAV artifacts on the default output device.
#[derive(Debug, Clone, Default)]
pub struct DevicePlayer {
    preferred_sample_rate: Option<u32>, // Ask the device for this rate when supported
}

impl DevicePlayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prefer a device rate, avoiding a resample when the renderer's rate is known.
    pub fn with_preferred_sample_rate(mut self, rate: u32) -> Self {
        self.preferred_sample_rate = Some(rate);
        self
    }

    fn play_samples(&self, samples: &[f32], sample_rate: u32) -> anyhow::Result<()> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or_else(|| anyhow::anyhow!("No output device available"))?;
        debug!("Using output device: {}", get_device_name(&device));

        let target_rate = self.preferred_sample_rate.unwrap_or(sample_rate);
        let config = find_best_config(device.supported_output_configs()?, target_rate)?;
        let device_rate = config.sample_rate();
        let channels = config.channels() as usize;
        let stream_config: StreamConfig = config.config();

        let samples = if device_rate != sample_rate {
            debug!("Resampling {} Hz -> {} Hz", sample_rate, device_rate);
            resample(samples, sample_rate, device_rate)?
        } else {
            samples.to_vec()
        };

        let ring = HeapRb::<f32>::new(samples.len().max(1));
        let (mut producer, mut consumer) = ring.split();
        let written = producer.push_slice(&samples);
        if written < samples.len() {
            warn!("Playback buffer overflow, dropped {} samples", samples.len() - written);
        }

        let drained = Arc::new((Mutex::new(false), Condvar::new()));
        let drained_cb = drained.clone();
        let failed = Arc::new(AtomicBool::new(false));
        let failed_cb = failed.clone();

        let stream = device.build_output_stream(
            &stream_config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                for frame in data.chunks_mut(channels) {
                    let sample = consumer.try_pop().unwrap_or(0.0);
                    frame.fill(sample);
                }
                if consumer.is_empty() {
                    let (lock, cvar) = &*drained_cb;
                    if let Ok(mut done) = lock.lock() {
                        *done = true;
                        cvar.notify_all();
                    }
                }
            },
            move |err| {
                tracing::error!("Audio playback error: {}", err);
                failed_cb.store(true, Ordering::SeqCst);
            },
            None,
        )?;
        stream.play()?;

        let expected = Duration::from_secs_f64(samples.len() as f64 / device_rate as f64);
        let deadline = Instant::now() + expected + PLAYBACK_GRACE;

        let (lock, cvar) = &*drained;
        let mut done = lock.lock().map_err(|_| anyhow::anyhow!("playback state poisoned"))?;
        while !*done && !failed.load(Ordering::SeqCst) {
            let now = Instant::now();
            if now >= deadline {
                warn!("Playback timeout exceeded");
                break;
            }
            done = cvar.wait_timeout(done, (deadline - now).min(Duration::from_millis(50))).map_err(|_| anyhow::anyhow!("playback state poisoned"))?.0;
        }
        drop(done);

        // Let the device drain its own buffer before the stream is dropped
        std::thread::sleep(Duration::from_millis(100));

        if failed.load(Ordering::SeqCst) {
            anyhow::bail!("output stream reported an error");
        }
        info!("🔊 Played {:.1}s of audio", expected.as_secs_f32());
        Ok(())
    }
}

impl ArtifactPlayer for DevicePlayer {
    fn play(&self, artifact: &Path) -> Result<(), SpeechError> {
        let (samples, sample_rate) = read_wav_mono(artifact)?;
        if samples.is_empty() {
            return Ok(());
        }
        self.play_samples(&samples, sample_rate).map_err(|e| SpeechError::Playback(e.to_string()))
    }
}

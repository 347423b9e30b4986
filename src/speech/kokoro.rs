//! Kokoro text-to-speech through sherpa-rs.

use std::path::Path;

use anyhow::Result;
use sherpa_rs::OnnxConfig;
use sherpa_rs::tts::{CommonTtsConfig, KokoroTts, KokoroTtsConfig};
use tracing::info;

use super::renderer::SpeechRenderer;
use crate::audio::write_wav;
use crate::config::AppConfig;
use crate::error::SpeechError;

/// Kokoro always produces 24 kHz audio.
pub const KOKORO_SAMPLE_RATE: u32 = 24000;

/// Renders sentences with a local Kokoro model.
pub struct KokoroRenderer {
    tts: KokoroTts,  // Kokoro TTS engine
    speaker_id: i32, // Voice index inside voices.bin
    speed: f32,      // Speech speed multiplier
}

impl KokoroRenderer {
    /// Load the Kokoro model described by `config`.
    ///
    /// # Errors
    /// Returns an error if the voice is unknown.
    pub fn new(config: &AppConfig) -> Result<Self> {
        let provider = config.effective_provider();
        let speaker_id = config.speaker_id()?;

        info!("Initializing Kokoro renderer with {} provider", provider);
        info!("TTS voice: {} (speaker ID: {})", config.tts_voice, speaker_id);

        let tts_config = KokoroTtsConfig {
            model: config.tts_model_path().to_string_lossy().to_string(),
            voices: config.tts_voices_path().to_string_lossy().to_string(),
            tokens: config.tts_tokens_path().to_string_lossy().to_string(),
            data_dir: config.tts_data_dir().to_string_lossy().to_string(),
            dict_dir: config.tts_dict_dir().to_string_lossy().to_string(),
            lexicon: config.tts_lexicon(),
            lang: String::new(), // English voices go through the lexicon
            length_scale: 1.0 / config.tts_speed,
            onnx_config: OnnxConfig {
                provider: provider.as_sherpa_provider().to_string(),
                num_threads: config.tts_threads.try_into().unwrap_or(2),
                debug: config.verbose,
            },
            common_config: CommonTtsConfig { max_num_sentences: 1, ..Default::default() },
        };

        Ok(Self { tts: KokoroTts::new(tts_config), speaker_id, speed: config.tts_speed })
    }
}

impl SpeechRenderer for KokoroRenderer {
    fn render(&mut self, text: &str, artifact: &Path) -> Result<(), SpeechError> {
        let audio = self.tts.create(text, self.speaker_id, self.speed).map_err(|e| SpeechError::Synthesis(e.to_string()))?;

        info!("🎵 Generated speech ({} samples)", audio.samples.len());
        write_wav(artifact, &audio.samples, KOKORO_SAMPLE_RATE)
    }
}

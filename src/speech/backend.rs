//! Picks the renderer and player named on the command line.

use std::sync::Arc;

use anyhow::{Context, Result};

use super::player::{ArtifactPlayer, CommandPlayer};
use super::renderer::{CommandRenderer, SpeechRenderer};
use crate::config::{AppConfig, PlayerKind, RendererKind};
#[cfg(any(not(feature = "kokoro"), not(feature = "audio")))]
use crate::error::SpeechError;

/// Build the configured text-to-speech backend.
///
/// # Errors
/// [`SpeechError::Unsupported`] when the backend is not compiled in, or the
/// Kokoro model failing to load.
pub fn renderer_for(config: &AppConfig) -> Result<Box<dyn SpeechRenderer>> {
    match config.renderer {
        RendererKind::Command => Ok(Box::new(CommandRenderer::new(&config.tts_command, config.espeak_voice(), config.words_per_minute()))),
        #[cfg(feature = "kokoro")]
        RendererKind::Kokoro => Ok(Box::new(super::kokoro::KokoroRenderer::new(config)?)),
        #[cfg(not(feature = "kokoro"))]
        RendererKind::Kokoro => Err(SpeechError::Unsupported { backend: "Kokoro renderer", feature: "kokoro" }.into()),
    }
}

/// Build the configured artifact player.
///
/// # Errors
/// [`SpeechError::Unsupported`] when device playback is not compiled in, or an
/// empty player command line.
pub fn player_for(config: &AppConfig) -> Result<Arc<dyn ArtifactPlayer>> {
    match config.player {
        PlayerKind::Command => {
            let player = CommandPlayer::from_command_line(&config.player_command).context("Player command is empty")?;
            Ok(Arc::new(player))
        }
        #[cfg(feature = "audio")]
        PlayerKind::Device => {
            let player = crate::audio::DevicePlayer::new();
            #[cfg(feature = "kokoro")]
            let player = if config.renderer == RendererKind::Kokoro {
                player.with_preferred_sample_rate(super::kokoro::KOKORO_SAMPLE_RATE)
            } else {
                player
            };
            Ok(Arc::new(player))
        }
        #[cfg(not(feature = "audio"))]
        PlayerKind::Device => Err(SpeechError::Unsupported { backend: "Device playback", feature: "audio" }.into()),
    }
}

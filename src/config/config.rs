//! Application configuration and CLI argument parsing.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::voices;
use crate::accumulator::{AccumulatorConfig, DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_SPACE_TIMEOUT, DEFAULT_STABLE_FRAMES};
use crate::error::SpeechError;
use crate::speech::default_player_command;

/// Base espeak speaking rate at speed 1.0.
const ESPEAK_BASE_WPM: f32 = 175.0;

/// Hardware acceleration provider for the Kokoro model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// CPU inference (always available)
    #[default]
    Cpu,
    /// NVIDIA CUDA acceleration (Linux only)
    Cuda,
    /// Apple CoreML acceleration (macOS only)
    #[value(name = "coreml")]
    CoreMl,
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_sherpa_provider())
    }
}

impl Provider {
    /// Provider string understood by sherpa-rs.
    pub fn as_sherpa_provider(&self) -> &'static str {
        match self {
            Provider::Cpu => "cpu",
            Provider::Cuda => "cuda",
            Provider::CoreMl => "coreml",
        }
    }
}

/// Which text-to-speech backend renders sentences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RendererKind {
    /// External espeak-compatible program
    #[default]
    Command,
    /// Local Kokoro model (needs the `kokoro` feature)
    Kokoro,
}

/// How rendered artifacts are played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlayerKind {
    /// External player program
    #[default]
    Command,
    /// Default output device via cpal (needs the `audio` feature)
    Device,
}

/// Sign-to-speech configuration.
#[derive(Parser, Debug, Clone, Serialize, Deserialize)]
#[command(name = "sign-speech")]
#[command(author, version, about = "Turns recorded fingerspelling classifications into spoken sentences", long_about = None)]
pub struct AppConfig {
    /// Recorded session (JSON lines of frames and commands)
    #[arg(required_unless_present_any = ["list_voices", "voice_info"])]
    pub events: Option<PathBuf>,

    /// List available TTS voices and exit
    #[arg(long)]
    pub list_voices: bool,

    /// Show details of one TTS voice and exit
    #[arg(long)]
    pub voice_info: Option<String>,

    /// Minimum classifier confidence for a frame to count (0.0 - 1.0)
    #[arg(long, default_value_t = DEFAULT_CONFIDENCE_THRESHOLD, value_parser = parse_unit_interval)]
    pub confidence_threshold: f32,

    /// Consecutive stable frames needed to commit a letter
    #[arg(long, default_value_t = DEFAULT_STABLE_FRAMES, value_parser = clap::value_parser!(u32).range(1..))]
    pub stable_frames: u32,

    /// Seconds without a hand before the current word is finished
    #[arg(long, default_value_t = DEFAULT_SPACE_TIMEOUT.as_secs_f64(), value_parser = parse_positive_seconds)]
    pub space_timeout: f64,

    /// Replay at the recorded pace instead of as fast as possible
    #[arg(long)]
    pub realtime: bool,

    /// Speak the sentence once the recording ends
    #[arg(long)]
    pub speak_at_end: bool,

    /// Text-to-speech backend
    #[arg(long, value_enum, default_value = "command")]
    pub renderer: RendererKind,

    /// espeak-compatible program used by the command renderer
    #[arg(long, env = "SIGN_SPEECH_TTS", default_value = "espeak-ng")]
    pub tts_command: String,

    /// Playback backend
    #[arg(long, value_enum, default_value = "command")]
    pub player: PlayerKind,

    /// Player command line used by the command player (the file is appended).
    /// Split on whitespace without shell quoting, so no argument may contain a space
    #[arg(long, env = "SIGN_SPEECH_PLAYER", default_value_t = default_player_command().to_string())]
    pub player_command: String,

    /// Directory for temporary speech artifacts
    #[arg(long, env = "SIGN_SPEECH_SPOOL", default_value_os_t = default_spool_dir())]
    pub spool_dir: PathBuf,

    /// Directory containing the Kokoro model files
    #[arg(long, short = 'd', env = "MODEL_DIR", default_value_os_t = default_model_dir())]
    pub model_dir: PathBuf,

    /// TTS voice name (see --list-voices)
    #[arg(long, default_value = "af_bella")]
    pub tts_voice: String,

    /// Override the Kokoro speaker ID derived from --tts-voice
    #[arg(long)]
    pub tts_speaker_id: Option<i32>,

    /// Text-to-speech speed multiplier
    #[arg(long, default_value = "1.0")]
    pub tts_speed: f32,

    /// Hardware acceleration provider for Kokoro (auto-detected if not specified)
    #[arg(long, value_enum)]
    pub provider: Option<Provider>,

    /// Kokoro threads (0 = auto)
    #[arg(long, default_value = "0")]
    pub tts_threads: usize,

    /// Milliseconds to wait for speech still playing at exit
    #[arg(long, default_value = "5000")]
    pub shutdown_grace_ms: u64,

    /// Enable verbose logging
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

impl AppConfig {
    /// Parse configuration from command line arguments.
    ///
    /// Handles `--list-voices` / `--voice-info` directly and exits.
    pub fn from_args() -> Self {
        let mut config = Self::parse();

        if config.list_voices {
            voices::print_voices();
            std::process::exit(0);
        }

        if let Some(ref voice_name) = config.voice_info {
            match voices::print_voice_info(voice_name) {
                Ok(_) => std::process::exit(0),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }

        config.normalize_thread_counts();
        config
    }

    /// Pick a Kokoro thread count when left at 0.
    ///
    /// CUDA gets a single thread (the GPU parallelizes); CPU gets a third of
    /// the cores so the frame loop keeps headroom.
    fn normalize_thread_counts(&mut self) {
        if self.tts_threads == 0 {
            self.tts_threads = if self.effective_provider() == Provider::Cuda { 1 } else { (num_cpus::get() / 3).max(1) };
        }
    }

    /// Engine tunables from the command line.
    pub fn accumulator_config(&self) -> AccumulatorConfig {
        AccumulatorConfig {
            confidence_threshold: self.confidence_threshold,
            stable_frames: self.stable_frames,
            // Unrepresentable values map to zero so validate() rejects them
            space_timeout: Duration::try_from_secs_f64(self.space_timeout).unwrap_or(Duration::ZERO),
        }
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }

    /// Get the effective Kokoro provider.
    pub fn effective_provider(&self) -> Provider {
        self.provider.unwrap_or_else(detect_provider)
    }

    /// Kokoro speaker ID: the explicit override, else the voice table entry.
    pub fn speaker_id(&self) -> Result<i32> {
        if let Some(id) = self.tts_speaker_id {
            return Ok(id);
        }
        voices::get_voice(&self.tts_voice)
            .map(|v| v.speaker_id)
            .ok_or_else(|| anyhow::anyhow!("Unknown TTS voice '{}'", self.tts_voice))
    }

    /// espeak voice code for the command renderer.
    pub fn espeak_voice(&self) -> &'static str {
        voices::get_voice(&self.tts_voice).map(|v| v.espeak_code).unwrap_or("en-us")
    }

    /// espeak speaking rate matching `tts_speed`.
    pub fn words_per_minute(&self) -> u32 {
        (ESPEAK_BASE_WPM * self.tts_speed).round().max(1.0) as u32
    }

    fn kokoro_dir(&self) -> PathBuf {
        self.model_dir.join("tts").join("kokoro-multi-lang-v1_0")
    }

    pub fn tts_model_path(&self) -> PathBuf {
        self.kokoro_dir().join("model.onnx")
    }

    pub fn tts_voices_path(&self) -> PathBuf {
        self.kokoro_dir().join("voices.bin")
    }

    pub fn tts_tokens_path(&self) -> PathBuf {
        self.kokoro_dir().join("tokens.txt")
    }

    pub fn tts_data_dir(&self) -> PathBuf {
        self.kokoro_dir().join("espeak-ng-data")
    }

    pub fn tts_dict_dir(&self) -> PathBuf {
        self.kokoro_dir().join("dict")
    }

    /// Lexicon matching the voice's accent (British voices start with `b`).
    pub fn tts_lexicon(&self) -> String {
        let file = if self.tts_voice.starts_with('b') { "lexicon-gb-en.txt" } else { "lexicon-us-en.txt" };
        self.kokoro_dir().join(file).to_string_lossy().to_string()
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if let Some(ref events) = self.events
            && !events.is_file()
        {
            anyhow::bail!("Recording not found: {}", events.display());
        }

        self.accumulator_config().validate().map_err(|e| anyhow::anyhow!(e))?;

        if voices::get_voice(&self.tts_voice).is_none() {
            anyhow::bail!("Unknown TTS voice '{}' (see --list-voices)", self.tts_voice);
        }

        if !self.tts_speed.is_finite() || self.tts_speed <= 0.0 {
            anyhow::bail!("TTS speed must be positive");
        }

        match self.renderer {
            RendererKind::Command if self.tts_command.trim().is_empty() => anyhow::bail!("TTS command must not be empty"),
            RendererKind::Kokoro => {
                if !cfg!(feature = "kokoro") {
                    return Err(SpeechError::Unsupported { backend: "Kokoro renderer", feature: "kokoro" }.into());
                }
                for path in [self.tts_model_path(), self.tts_voices_path(), self.tts_tokens_path()] {
                    if !path.exists() {
                        anyhow::bail!("Required model file not found: {}", path.display());
                    }
                }
            }
            RendererKind::Command => {}
        }

        match self.player {
            PlayerKind::Command if self.player_command.trim().is_empty() => anyhow::bail!("Player command must not be empty"),
            PlayerKind::Device if !cfg!(feature = "audio") => {
                return Err(SpeechError::Unsupported { backend: "Device playback", feature: "audio" }.into());
            }
            _ => {}
        }

        Ok(())
    }

    /// Log the current configuration.
    pub fn log_config(&self) {
        info!("Configuration:");
        if let Some(ref events) = self.events {
            info!("  Recording: {}", events.display());
        }
        info!("  Confidence threshold: {}", self.confidence_threshold);
        info!("  Stable frames: {}", self.stable_frames);
        info!("  Space timeout: {}s", self.space_timeout);
        info!("  Pacing: {}", if self.realtime { "realtime" } else { "as fast as possible" });
        match self.renderer {
            RendererKind::Command => info!("  Renderer: {} (voice {}, {} wpm)", self.tts_command, self.espeak_voice(), self.words_per_minute()),
            RendererKind::Kokoro => info!("  Renderer: kokoro (voice {}, provider {})", self.tts_voice, self.effective_provider()),
        }
        match self.player {
            PlayerKind::Command => info!("  Player: {}", self.player_command),
            PlayerKind::Device => info!("  Player: default output device"),
        }
        info!("  Spool directory: {}", self.spool_dir.display());
    }
}

/// Default spool directory ($TMPDIR/sign-speech).
fn default_spool_dir() -> PathBuf {
    std::env::temp_dir().join("sign-speech")
}

/// Default model directory (~/.sign-speech/models).
fn default_model_dir() -> PathBuf {
    if let Some(home_dir) = dirs::home_dir() {
        home_dir.join(".sign-speech").join("models")
    } else {
        PathBuf::from("models")
    }
}

/// Auto-detect the best hardware acceleration provider.
fn detect_provider() -> Provider {
    #[cfg(target_os = "macos")]
    {
        Provider::CoreMl
    }

    #[cfg(target_os = "linux")]
    {
        if has_nvidia_gpu() { Provider::Cuda } else { Provider::Cpu }
    }

    #[cfg(not(any(target_os = "macos", target_os = "linux")))]
    {
        Provider::Cpu
    }
}

/// Check for NVIDIA device nodes (desktop GPUs and Jetson boards).
#[cfg(target_os = "linux")]
fn has_nvidia_gpu() -> bool {
    use std::path::Path;

    ["/dev/nvidia0", "/dev/nvidiactl", "/dev/nvhost-ctrl", "/dev/nvhost-ctrl-gpu", "/etc/nv_tegra_release"]
        .iter()
        .any(|p| Path::new(p).exists())
}

/// Parse a value in 0.0 - 1.0.
fn parse_unit_interval(s: &str) -> Result<f32, String> {
    let value: f32 = s.parse().map_err(|_| format!("'{}' is not a valid float", s))?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(format!("must be between 0.0 and 1.0, got {}", value))
    }
}

/// Parse a strictly positive number of seconds that fits in a `Duration`.
fn parse_positive_seconds(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|_| format!("'{}' is not a valid number of seconds", s))?;
    match Duration::try_from_secs_f64(value) {
        Ok(duration) if !duration.is_zero() => Ok(value),
        _ => Err(format!("must be a positive number of seconds, got {}", value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> AppConfig {
        AppConfig::try_parse_from(std::iter::once("sign-speech").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults_match_engine_defaults() {
        let config = parse(&["session.jsonl"]);
        assert_eq!(config.accumulator_config(), AccumulatorConfig::default());
        assert_eq!(config.renderer, RendererKind::Command);
        assert_eq!(config.player, PlayerKind::Command);
        assert_eq!(config.speaker_id().unwrap(), 2);
        assert_eq!(config.words_per_minute(), 175);
    }

    #[test]
    fn test_tunables_from_flags() {
        let config = parse(&["s.jsonl", "--confidence-threshold", "0.7", "--stable-frames", "5", "--space-timeout", "1.5"]);
        let acc = config.accumulator_config();
        assert_eq!(acc.confidence_threshold, 0.7);
        assert_eq!(acc.stable_frames, 5);
        assert_eq!(acc.space_timeout, Duration::from_millis(1500));
    }

    #[test]
    fn test_out_of_range_flags_rejected() {
        let attempt = |args: &[&str]| AppConfig::try_parse_from(std::iter::once("sign-speech").chain(args.iter().copied()));
        assert!(attempt(&["s.jsonl", "--confidence-threshold", "1.2"]).is_err());
        assert!(attempt(&["s.jsonl", "--stable-frames", "0"]).is_err());
        assert!(attempt(&["s.jsonl", "--space-timeout", "0"]).is_err());
        assert!(attempt(&["s.jsonl", "--space-timeout", "1e30"]).is_err());
        assert!(attempt(&["s.jsonl", "--space-timeout", "inf"]).is_err());
        assert!(attempt(&["s.jsonl", "--space-timeout", "1e-12"]).is_err());
        assert!(attempt(&[]).is_err());
        assert!(attempt(&["--list-voices"]).is_ok());
    }

    #[test]
    fn test_voice_derived_settings() {
        let config = parse(&["s.jsonl", "--tts-voice", "bf_emma", "--tts-speed", "0.8"]);
        assert_eq!(config.speaker_id().unwrap(), 21);
        assert_eq!(config.espeak_voice(), "en-gb");
        assert_eq!(config.words_per_minute(), 140);
        assert!(config.tts_lexicon().ends_with("lexicon-gb-en.txt"));

        let overridden = parse(&["s.jsonl", "--tts-speaker-id", "7"]);
        assert_eq!(overridden.speaker_id().unwrap(), 7);
    }

    #[test]
    fn test_validate() {
        let dir = tempfile::tempdir().unwrap();
        let events = dir.path().join("s.jsonl");
        std::fs::write(&events, "").unwrap();
        let ev = events.to_str().unwrap();

        assert!(parse(&[ev]).validate().is_ok());
        assert!(parse(&[ev, "--tts-voice", "zz_nobody"]).validate().is_err());
        assert!(parse(&[ev, "--tts-speed", "0"]).validate().is_err());
        assert!(parse(&[ev, "--player-command", " "]).validate().is_err());
        assert!(parse(&["missing.jsonl"]).validate().is_err());

        if !cfg!(feature = "kokoro") {
            let err = parse(&[ev, "--renderer", "kokoro"]).validate().unwrap_err();
            assert!(matches!(err.downcast_ref::<SpeechError>(), Some(SpeechError::Unsupported { .. })), "{err}");
        }

        let mut huge_timeout = parse(&[ev]);
        huge_timeout.space_timeout = 1e30;
        assert_eq!(huge_timeout.accumulator_config().space_timeout, Duration::ZERO);
        assert!(huge_timeout.validate().is_err());
    }
}

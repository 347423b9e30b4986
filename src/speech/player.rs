//! Players that consume a rendered WAV artifact.

use std::path::Path;
use std::process::Command;

use tracing::debug;

use super::renderer::run_to_completion;
use crate::error::SpeechError;

/// Plays an audio artifact to completion. Shared by overlapping jobs.
pub trait ArtifactPlayer: Send + Sync {
    fn play(&self, artifact: &Path) -> Result<(), SpeechError>;
}

/// Plays through an external program, e.g. `aplay -q <file>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandPlayer {
    program: String,
    args: Vec<String>,
}

impl CommandPlayer {
    /// Parse a whitespace-separated command line; the artifact path is appended.
    ///
    /// Quotes are not interpreted: `"a b"` becomes the two arguments `"a` and `b"`.
    ///
    /// # Returns
    /// `None` for an empty command line.
    pub fn from_command_line(command_line: &str) -> Option<Self> {
        let mut parts = command_line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self { program, args: parts.collect() })
    }

    fn command(&self, artifact: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).arg(artifact);
        cmd
    }
}

impl ArtifactPlayer for CommandPlayer {
    fn play(&self, artifact: &Path) -> Result<(), SpeechError> {
        debug!("Playing {} with {}", artifact.display(), self.program);
        run_to_completion(self.command(artifact), &self.program)
    }
}

/// The platform's stock command-line player.
pub fn default_player_command() -> &'static str {
    if cfg!(target_os = "macos") { "afplay" } else { "aplay -q" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_command_line() {
        let player = CommandPlayer::from_command_line("  aplay  -q ").unwrap();
        assert_eq!(player, CommandPlayer { program: "aplay".to_string(), args: vec!["-q".to_string()] });
        assert!(CommandPlayer::from_command_line("   ").is_none());
    }

    #[test]
    fn test_quotes_are_not_interpreted() {
        let player = CommandPlayer::from_command_line(r#"paplay --device "USB Audio""#).unwrap();
        assert_eq!(player.args, ["--device", "\"USB", "Audio\""]);
    }

    #[test]
    fn test_artifact_is_last_argument() {
        let player = CommandPlayer::from_command_line("paplay --volume 40000").unwrap();
        let cmd = player.command(Path::new("/tmp/tts_1.wav"));
        let args: Vec<_> = cmd.get_args().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(args, ["--volume", "40000", "/tmp/tts_1.wav"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_non_zero_exit_is_reported() {
        let player = CommandPlayer::from_command_line("false").unwrap();
        let err = player.play(Path::new("/tmp/does-not-matter.wav")).unwrap_err();
        assert!(matches!(err, SpeechError::CommandFailed { .. }));
    }
}

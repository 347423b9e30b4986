//! Text-to-speech renderers that write a sentence into a WAV artifact.

use std::path::Path;
use std::process::{Command, Stdio};

use tracing::debug;

use crate::error::SpeechError;

/// Renders text to an audio file.
pub trait SpeechRenderer: Send {
    /// Synthesize `text` into a WAV file at `artifact`.
    fn render(&mut self, text: &str, artifact: &Path) -> Result<(), SpeechError>;
}

/// Renders through an external espeak-compatible program
/// (`<program> -v <voice> -s <wpm> -w <file> <text>`).
#[derive(Debug, Clone)]
pub struct CommandRenderer {
    program: String,       // e.g. espeak-ng
    voice: String,         // espeak voice code
    words_per_minute: u32, // speaking rate
}

impl CommandRenderer {
    pub fn new(program: impl Into<String>, voice: impl Into<String>, words_per_minute: u32) -> Self {
        Self { program: program.into(), voice: voice.into(), words_per_minute }
    }

    fn command(&self, text: &str, artifact: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-v")
            .arg(&self.voice)
            .arg("-s")
            .arg(self.words_per_minute.to_string())
            .arg("-w")
            .arg(artifact)
            .arg("--")
            .arg(text);
        cmd
    }
}

impl SpeechRenderer for CommandRenderer {
    fn render(&mut self, text: &str, artifact: &Path) -> Result<(), SpeechError> {
        debug!("Rendering \"{}\" with {}", text, self.program);
        run_to_completion(self.command(text, artifact), &self.program)
    }
}

/// Run `cmd` with stdin/stdout detached, failing on a non-zero exit.
pub(super) fn run_to_completion(mut cmd: Command, program: &str) -> Result<(), SpeechError> {
    let output = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .map_err(|source| SpeechError::Spawn { program: program.to_string(), source })?;

    if output.status.success() {
        Ok(())
    } else {
        Err(SpeechError::CommandFailed {
            program: program.to_string(),
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}

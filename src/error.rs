//! Error types for the speech backends and the replay reader.

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

/// Failure while rendering or playing a sentence.
///
/// These never reach the accumulator; the speech worker logs and drops them.
#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("failed to run `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("`{program}` exited with {status}: {stderr}")]
    CommandFailed { program: String, status: ExitStatus, stderr: String },

    #[error("synthesis failed: {0}")]
    Synthesis(String),

    #[error("playback failed: {0}")]
    Playback(String),

    #[error("{backend} is not compiled in (rebuild with `--features {feature}`)")]
    Unsupported { backend: &'static str, feature: &'static str },
}

/// Failure while loading a recorded session.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("line {line}: {reason}")]
    Invalid { line: usize, reason: String },
}

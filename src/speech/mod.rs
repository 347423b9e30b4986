//! Speech output: renders finished sentences to audio on a background worker.
//!
//! `speak` never blocks and never reports back. Each sentence is rendered into
//! its own temporary WAV artifact, played, and the artifact is deleted on
//! every exit path.

mod artifact;
mod backend;
mod dispatcher;
#[cfg(feature = "kokoro")]
mod kokoro;
mod player;
mod renderer;

pub use artifact::AudioArtifact;
pub use backend::{player_for, renderer_for};
pub use dispatcher::{SpeechDispatch, SpeechDispatcher};
#[cfg(feature = "kokoro")]
pub use kokoro::{KOKORO_SAMPLE_RATE, KokoroRenderer};
pub use player::{ArtifactPlayer, CommandPlayer, default_player_command};
pub use renderer::{CommandRenderer, SpeechRenderer};

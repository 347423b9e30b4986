//! Sign Speech - fingerspelling to speech.
//!
//! Per-frame gesture classifications (from an external hand locator and
//! classifier) are debounced into letters, letters are grouped into words on
//! hand-absence timeouts, and the finished sentence is spoken by a background
//! text-to-speech worker.

pub mod accumulator;
pub mod audio;
pub mod config;
pub mod error;
pub mod replay;
pub mod session;
pub mod speech;
pub mod vision;

pub use accumulator::{Accumulator, AccumulatorConfig, AccumulatorState, ClassificationEvent, Phase};
pub use error::{ReplayError, SpeechError};
pub use session::{SessionCommand, SignSession, Transcript};
pub use speech::{SpeechDispatch, SpeechDispatcher};

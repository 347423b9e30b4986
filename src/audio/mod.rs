//! Audio plumbing between the speech renderers and the players.
//!
//! Renderers hand audio to players as WAV artifacts; the device player (feature
//! `audio`) plays them through cpal, resampling with rubato when needed.

#[cfg(feature = "audio")]
mod playback;
#[cfg(feature = "audio")]
pub mod resampler;
pub mod util;
mod wav;

#[cfg(feature = "audio")]
pub use playback::DevicePlayer;
pub use wav::{read_wav_mono, write_wav};

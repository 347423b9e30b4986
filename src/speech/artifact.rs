//! Scoped temporary audio files.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use uuid::Uuid;

/// A uniquely named audio file owned by one speech job.
///
/// The file is removed when the artifact is dropped, whether or not rendering
/// or playback succeeded.
#[derive(Debug)]
pub struct AudioArtifact {
    path: PathBuf,
}

impl AudioArtifact {
    /// Reserve a fresh `tts_<uuid>.wav` name in `dir`. Nothing is created yet.
    pub fn new_in(dir: &Path) -> Self {
        let path = dir.join(format!("tts_{}.wav", Uuid::new_v4().simple()));
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for AudioArtifact {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed speech artifact {}", self.path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!("Failed to remove speech artifact {}: {}", self.path.display(), e),
        }
    }
}

//! Fire-and-forget speech dispatch.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error, info, warn};

use super::artifact::AudioArtifact;
use super::player::ArtifactPlayer;
use super::renderer::SpeechRenderer;
use crate::error::SpeechError;

/// Accepts sentences to be spoken. Returns immediately, reports nothing.
pub trait SpeechDispatch {
    fn speak(&self, sentence: &str);
}

impl<T: SpeechDispatch + ?Sized> SpeechDispatch for &T {
    fn speak(&self, sentence: &str) {
        (**self).speak(sentence)
    }
}

/// Handle to the background speech worker.
///
/// Every sentence becomes an independent blocking job: rendering is serialized
/// on the shared renderer, playback is not, so back-to-back requests overlap.
pub struct SpeechDispatcher {
    tx: mpsc::UnboundedSender<String>, // Sentences to the worker
    worker: JoinHandle<()>,            // Worker task (awaited only at shutdown)
}

impl SpeechDispatcher {
    /// Start the worker on the current tokio runtime.
    ///
    /// # Arguments
    /// * `renderer` - Text-to-speech backend
    /// * `player` - Artifact player
    /// * `spool_dir` - Directory for temporary artifacts (created if missing)
    ///
    /// # Errors
    /// Returns an error if the spool directory cannot be created.
    pub fn spawn(renderer: Box<dyn SpeechRenderer>, player: Arc<dyn ArtifactPlayer>, spool_dir: PathBuf) -> Result<Self, SpeechError> {
        fs::create_dir_all(&spool_dir).map_err(|source| SpeechError::Io { path: spool_dir.clone(), source })?;

        let (tx, rx) = mpsc::unbounded_channel();
        let renderer = Arc::new(Mutex::new(renderer));
        let worker = tokio::spawn(run_worker(rx, renderer, player, spool_dir));

        Ok(Self { tx, worker })
    }

    /// Stop accepting sentences and wait up to `grace` for in-flight speech.
    ///
    /// Jobs still running afterwards stay on the blocking pool; shut the
    /// runtime down with `shutdown_background` to exit without them.
    ///
    /// # Returns
    /// `true` if every job finished in time.
    pub async fn shutdown(self, grace: Duration) -> bool {
        let Self { tx, worker } = self;
        drop(tx);

        match tokio::time::timeout(grace, worker).await {
            Ok(Ok(())) => {
                debug!("Speech worker finished gracefully");
                true
            }
            Ok(Err(e)) => {
                error!("Speech worker failed: {}", e);
                false
            }
            Err(_) => {
                warn!("Speech still playing after {:?}, not waiting any longer", grace);
                false
            }
        }
    }
}

impl SpeechDispatch for SpeechDispatcher {
    fn speak(&self, sentence: &str) {
        if sentence.trim().is_empty() {
            debug!("Ignoring empty sentence");
            return;
        }
        if self.tx.send(sentence.to_string()).is_err() {
            warn!("Speech worker is gone, dropping \"{}\"", sentence);
        }
    }
}

async fn run_worker(
    mut rx: mpsc::UnboundedReceiver<String>,
    renderer: Arc<Mutex<Box<dyn SpeechRenderer>>>,
    player: Arc<dyn ArtifactPlayer>,
    spool_dir: PathBuf,
) {
    let mut jobs = JoinSet::new();

    loop {
        tokio::select! {
            received = rx.recv() => {
                let Some(sentence) = received else { break };
                let renderer = renderer.clone();
                let player = player.clone();
                let spool_dir = spool_dir.clone();
                jobs.spawn_blocking(move || speak_job(&sentence, &renderer, player.as_ref(), &spool_dir));
            }
            Some(joined) = jobs.join_next(), if !jobs.is_empty() => {
                if let Err(e) = joined {
                    error!("Speech job panicked: {}", e);
                }
            }
        }
    }

    while let Some(joined) = jobs.join_next().await {
        if let Err(e) = joined {
            error!("Speech job panicked: {}", e);
        }
    }
}

/// Render and play one sentence. Errors end here.
fn speak_job(sentence: &str, renderer: &Mutex<Box<dyn SpeechRenderer>>, player: &dyn ArtifactPlayer, spool_dir: &Path) {
    let artifact = AudioArtifact::new_in(spool_dir);

    let rendered = renderer.lock().render(sentence, artifact.path());
    let result = rendered.and_then(|()| player.play(artifact.path()));

    match result {
        Ok(()) => info!("🔊 Spoke \"{}\"", sentence),
        Err(e) => error!("❌ Speech failed for \"{}\": {}", sentence, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Writes the sentence text as the "audio".
    struct TextRenderer;

    impl SpeechRenderer for TextRenderer {
        fn render(&mut self, text: &str, artifact: &Path) -> Result<(), SpeechError> {
            fs::write(artifact, text).map_err(|source| SpeechError::Io { path: artifact.to_path_buf(), source })
        }
    }

    /// Creates the artifact, then fails.
    struct BrokenRenderer;

    impl SpeechRenderer for BrokenRenderer {
        fn render(&mut self, _text: &str, artifact: &Path) -> Result<(), SpeechError> {
            fs::write(artifact, b"partial").unwrap();
            Err(SpeechError::Synthesis("model exploded".to_string()))
        }
    }

    /// Records what it played and how many plays ran at once.
    #[derive(Default)]
    struct RecordingPlayer {
        played: parking_lot::Mutex<Vec<String>>,
        active: AtomicUsize,
        max_active: AtomicUsize,
        hold: Duration,
        fail: bool,
    }

    impl ArtifactPlayer for RecordingPlayer {
        fn play(&self, artifact: &Path) -> Result<(), SpeechError> {
            let now_active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_active.fetch_max(now_active, Ordering::SeqCst);
            std::thread::sleep(self.hold);
            self.played.lock().push(fs::read_to_string(artifact).unwrap());
            self.active.fetch_sub(1, Ordering::SeqCst);

            if self.fail { Err(SpeechError::Playback("device unplugged".to_string())) } else { Ok(()) }
        }
    }

    fn spool_is_empty(dir: &Path) -> bool {
        fs::read_dir(dir).unwrap().next().is_none()
    }

    #[tokio::test]
    async fn test_speak_renders_plays_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let player = Arc::new(RecordingPlayer::default());
        let dispatcher = SpeechDispatcher::spawn(Box::new(TextRenderer), player.clone(), dir.path().to_path_buf()).unwrap();

        dispatcher.speak("Hi");
        assert!(dispatcher.shutdown(Duration::from_secs(5)).await);

        assert_eq!(*player.played.lock(), ["Hi"]);
        assert!(spool_is_empty(dir.path()));
    }

    #[tokio::test]
    async fn test_empty_sentence_is_not_dispatched() {
        let dir = tempfile::tempdir().unwrap();
        let player = Arc::new(RecordingPlayer::default());
        let dispatcher = SpeechDispatcher::spawn(Box::new(TextRenderer), player.clone(), dir.path().to_path_buf()).unwrap();

        dispatcher.speak("");
        dispatcher.speak("   ");
        assert!(dispatcher.shutdown(Duration::from_secs(5)).await);

        assert!(player.played.lock().is_empty());
    }

    #[tokio::test]
    async fn test_render_failure_is_swallowed_and_artifact_removed() {
        let dir = tempfile::tempdir().unwrap();
        let player = Arc::new(RecordingPlayer::default());
        let dispatcher = SpeechDispatcher::spawn(Box::new(BrokenRenderer), player.clone(), dir.path().to_path_buf()).unwrap();

        dispatcher.speak("Hi");
        assert!(dispatcher.shutdown(Duration::from_secs(5)).await);

        assert!(player.played.lock().is_empty());
        assert!(spool_is_empty(dir.path()));
    }

    #[tokio::test]
    async fn test_playback_failure_still_removes_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let player = Arc::new(RecordingPlayer { fail: true, ..Default::default() });
        let dispatcher = SpeechDispatcher::spawn(Box::new(TextRenderer), player.clone(), dir.path().to_path_buf()).unwrap();

        dispatcher.speak("Hi");
        assert!(dispatcher.shutdown(Duration::from_secs(5)).await);

        assert_eq!(*player.played.lock(), ["Hi"]);
        assert!(spool_is_empty(dir.path()));
    }

    #[tokio::test]
    async fn test_back_to_back_requests_overlap() {
        let dir = tempfile::tempdir().unwrap();
        let player = Arc::new(RecordingPlayer { hold: Duration::from_millis(300), ..Default::default() });
        let dispatcher = SpeechDispatcher::spawn(Box::new(TextRenderer), player.clone(), dir.path().to_path_buf()).unwrap();

        dispatcher.speak("Hi");
        dispatcher.speak("Hi");
        assert!(dispatcher.shutdown(Duration::from_secs(5)).await);

        assert_eq!(player.played.lock().len(), 2);
        assert_eq!(player.max_active.load(Ordering::SeqCst), 2);
        assert!(spool_is_empty(dir.path()));
    }

    #[test]
    fn test_runtime_exit_is_bounded_by_grace() {
        let dir = tempfile::tempdir().unwrap();
        let player = Arc::new(RecordingPlayer { hold: Duration::from_secs(3), ..Default::default() });
        let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build().unwrap();

        let started = std::time::Instant::now();
        let finished = runtime.block_on(async {
            let dispatcher = SpeechDispatcher::spawn(Box::new(TextRenderer), player.clone(), dir.path().to_path_buf()).unwrap();
            dispatcher.speak("Hi");
            dispatcher.shutdown(Duration::from_millis(200)).await
        });
        runtime.shutdown_background();

        assert!(!finished);
        assert!(started.elapsed() < Duration::from_secs(2), "exit took {:?}", started.elapsed());
    }

    #[tokio::test]
    async fn test_spawn_creates_spool_dir() {
        let dir = tempfile::tempdir().unwrap();
        let spool = dir.path().join("nested").join("spool");
        let dispatcher = SpeechDispatcher::spawn(Box::new(TextRenderer), Arc::new(RecordingPlayer::default()), spool.clone()).unwrap();

        assert!(spool.is_dir());
        assert!(dispatcher.shutdown(Duration::from_secs(1)).await);
    }
}

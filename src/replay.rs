//! Recorded sessions: per-frame classifier output and user commands as JSON lines.
//!
//! ```text
//! {"at": 0.00, "label": "H", "confidence": 0.93}
//! {"at": 2.70}
//! {"at": 3.00, "command": "speak"}
//! ```
//!
//! `at` is seconds since the session started. A line without `label` is a
//! frame with no hand. Blank lines and `#` comments are skipped.

use std::fs;
use std::path::Path;
use std::time::{Duration, Instant};

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::accumulator::ClassificationEvent;
use crate::error::ReplayError;
use crate::session::{SessionCommand, SignSession, Transcript};
use crate::speech::SpeechDispatch;

/// Longest offset a recording may use (one week).
const MAX_OFFSET: Duration = Duration::from_secs(7 * 24 * 60 * 60);

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawStep {
    at: f64,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    confidence: Option<f32>,
    #[serde(default)]
    command: Option<SessionCommand>,
}

/// One recorded step.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayStep {
    pub at: Duration, // Offset from session start
    pub action: ReplayAction,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReplayAction {
    Frame(ClassificationEvent),
    Command(SessionCommand),
}

/// How fast to play a recording back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pacing {
    /// Run steps back to back.
    #[default]
    AsFastAsPossible,
    /// Wait until each step's recorded offset.
    Realtime,
}

/// Outcome of a replay run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplaySummary {
    pub frames: usize,
    pub commands: usize,
    pub spoken: Vec<String>,
    pub transcript: Transcript,
}

/// Parse a recording.
///
/// # Errors
/// Returns the first malformed line with its 1-based line number.
pub fn parse(text: &str) -> Result<Vec<ReplayStep>, ReplayError> {
    let mut steps = Vec::new();
    let mut last_at = 0.0_f64;

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let raw: RawStep = serde_json::from_str(trimmed).map_err(|source| ReplayError::Parse { line: line_no, source })?;
        let invalid = |reason: &str| ReplayError::Invalid { line: line_no, reason: reason.to_string() };

        if !raw.at.is_finite() || raw.at < 0.0 {
            return Err(invalid("`at` must be a non-negative number of seconds"));
        }
        if raw.at < last_at {
            return Err(invalid("`at` must not go backwards"));
        }
        last_at = raw.at;

        let at = match Duration::try_from_secs_f64(raw.at) {
            Ok(at) if at <= MAX_OFFSET => at,
            _ => return Err(invalid("`at` is past the longest supported recording (one week)")),
        };

        let action = match (raw.command, raw.label, raw.confidence) {
            (Some(command), None, None) => ReplayAction::Command(command),
            (Some(_), _, _) => return Err(invalid("a command line cannot carry a label or confidence")),
            (None, Some(label), Some(confidence)) => ReplayAction::Frame(ClassificationEvent::Detected { label, confidence }),
            (None, None, None) => ReplayAction::Frame(ClassificationEvent::NoHand),
            (None, Some(_), None) => return Err(invalid("`label` requires `confidence`")),
            (None, None, Some(_)) => return Err(invalid("`confidence` requires `label`")),
        };

        steps.push(ReplayStep { at, action });
    }

    Ok(steps)
}

/// Read and parse a recording from disk.
pub fn load(path: &Path) -> Result<Vec<ReplayStep>, ReplayError> {
    let text = fs::read_to_string(path).map_err(|source| ReplayError::Io { path: path.to_path_buf(), source })?;
    let steps = parse(&text)?;
    debug!("Loaded {} step(s) from {}", steps.len(), path.display());
    Ok(steps)
}

/// Play `steps` into `session`, treating `start` as the recording's time zero.
pub async fn drive<D: SpeechDispatch>(session: &mut SignSession<D>, steps: &[ReplayStep], pacing: Pacing, start: Instant) -> ReplaySummary {
    let mut summary = ReplaySummary::default();

    for step in steps {
        let Some(now) = start.checked_add(step.at) else {
            warn!("Step at {:?} is out of range for this clock, stopping replay", step.at);
            break;
        };
        if pacing == Pacing::Realtime {
            tokio::time::sleep_until(tokio::time::Instant::from_std(now)).await;
        }

        match &step.action {
            ReplayAction::Frame(event) => {
                summary.frames += 1;
                if let Some(transcript) = session.observe(event.clone(), now) {
                    info!("✋ {}", transcript);
                }
            }
            ReplayAction::Command(command) => {
                summary.commands += 1;
                if let Some(sentence) = session.apply(*command, now) {
                    summary.spoken.push(sentence);
                }
            }
        }
    }

    summary.transcript = session.transcript().clone();
    summary
}

//! Letter/word/sentence accumulation from per-frame gesture classifications.
//!
//! Letters are debounced: a label must be classified above the confidence
//! threshold for `stable_frames` consecutive frames before it is committed.
//! Committed letters form the word in progress, which is flushed into the
//! sentence once no hand has been seen for longer than `space_timeout`.

use std::cmp::Ordering;
use std::fmt;
use std::time::{Duration, Instant};

use tracing::{debug, info};

/// Default minimum classifier confidence for a frame to count.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.85;

/// Default number of consecutive stable frames before a letter is committed.
pub const DEFAULT_STABLE_FRAMES: u32 = 10;

/// Default hand-absence duration that ends the current word.
pub const DEFAULT_SPACE_TIMEOUT: Duration = Duration::from_secs(2);

/// Result of classifying a single frame.
#[derive(Debug, Clone, PartialEq)]
pub enum ClassificationEvent {
    /// No hand (or no usable classification) in this frame.
    NoHand,
    /// A hand was classified as `label` with the given confidence.
    Detected { label: String, confidence: f32 },
}

impl ClassificationEvent {
    /// Shorthand for a detection.
    pub fn detected(label: impl Into<String>, confidence: f32) -> Self {
        Self::Detected { label: label.into(), confidence }
    }
}

/// Tunables for the accumulation engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccumulatorConfig {
    pub confidence_threshold: f32, // Frames at or below this are ignored
    pub stable_frames: u32,        // Run length that commits a letter
    pub space_timeout: Duration,   // Hand absence that flushes a word
}

impl Default for AccumulatorConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            stable_frames: DEFAULT_STABLE_FRAMES,
            space_timeout: DEFAULT_SPACE_TIMEOUT,
        }
    }
}

impl AccumulatorConfig {
    /// Check that the tunables describe a usable engine.
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(format!("confidence threshold must be between 0.0 and 1.0, got {}", self.confidence_threshold));
        }
        if self.stable_frames == 0 {
            return Err("stable frames must be at least 1".to_string());
        }
        if self.space_timeout.is_zero() {
            return Err("space timeout must be positive".to_string());
        }
        Ok(())
    }
}

/// Where the word in progress stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Nothing in flight.
    Idle,
    /// A stability run is being counted.
    Accumulating,
    /// A letter was just appended to the word in progress.
    LetterCommitted,
    /// The word in progress was just moved into the sentence.
    WordFlushed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Idle => write!(f, "Idle"),
            Phase::Accumulating => write!(f, "Accumulating"),
            Phase::LetterCommitted => write!(f, "LetterCommitted"),
            Phase::WordFlushed => write!(f, "WordFlushed"),
        }
    }
}

/// Mutable state of one signing session.
#[derive(Debug, Clone)]
pub struct AccumulatorState {
    pending_letters: Vec<String>,
    finalized_words: Vec<String>,
    last_seen_label: Option<String>,
    stable_run_length: u32,
    last_hand_present_time: Instant,
    phase: Phase,
}

impl AccumulatorState {
    fn new(now: Instant) -> Self {
        Self {
            pending_letters: Vec::new(),
            finalized_words: Vec::new(),
            last_seen_label: None,
            stable_run_length: 0,
            last_hand_present_time: now,
            phase: Phase::Idle,
        }
    }

    /// Letters of the word currently being spelled, in order.
    pub fn pending_letters(&self) -> &[String] {
        &self.pending_letters
    }

    /// Completed words, in completion order.
    pub fn finalized_words(&self) -> &[String] {
        &self.finalized_words
    }

    pub fn last_seen_label(&self) -> Option<&str> {
        self.last_seen_label.as_deref()
    }

    pub fn stable_run_length(&self) -> u32 {
        self.stable_run_length
    }

    pub fn last_hand_present_time(&self) -> Instant {
        self.last_hand_present_time
    }
}

/// Accumulation engine. Owned by whatever drives the frame loop.
#[derive(Debug, Clone)]
pub struct Accumulator {
    config: AccumulatorConfig,
    state: AccumulatorState,
}

impl Accumulator {
    /// Create an engine for a session starting at `now`.
    pub fn new(config: AccumulatorConfig, now: Instant) -> Self {
        Self { config, state: AccumulatorState::new(now) }
    }

    pub fn config(&self) -> &AccumulatorConfig {
        &self.config
    }

    pub fn state(&self) -> &AccumulatorState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    /// Feed one frame's classification.
    ///
    /// # Arguments
    /// * `event` - Classification of the frame
    /// * `now` - Time the frame was captured
    pub fn process_frame(&mut self, event: ClassificationEvent, now: Instant) {
        match event {
            ClassificationEvent::NoHand => self.on_no_hand(now),
            ClassificationEvent::Detected { label, confidence } => self.on_detected(label, confidence, now),
        }
    }

    fn on_no_hand(&mut self, now: Instant) {
        let state = &mut self.state;
        let absent_for = now.saturating_duration_since(state.last_hand_present_time);

        if !state.pending_letters.is_empty() && absent_for > self.config.space_timeout {
            let word = state.pending_letters.concat();
            state.pending_letters.clear();
            info!("📝 Word complete: \"{}\" (hand absent {:.1}s)", word, absent_for.as_secs_f32());
            state.finalized_words.push(word);
            state.phase = Phase::WordFlushed;
        } else if state.phase == Phase::WordFlushed {
            state.phase = Phase::Idle;
        }
    }

    fn on_detected(&mut self, label: String, confidence: f32, now: Instant) {
        let state = &mut self.state;
        state.last_hand_present_time = now;

        // Low-confidence frames leave the run untouched; NaN never counts
        if confidence.partial_cmp(&self.config.confidence_threshold) != Some(Ordering::Greater) {
            return;
        }

        if state.last_seen_label.as_deref() == Some(label.as_str()) {
            state.stable_run_length += 1;
        } else {
            debug!("Label changed {:?} -> {} after {} frame(s)", state.last_seen_label, label, state.stable_run_length);
            state.last_seen_label = Some(label);
            state.stable_run_length = 1;
        }

        if state.stable_run_length >= self.config.stable_frames {
            if let Some(letter) = state.last_seen_label.clone() {
                info!("🔤 Letter committed: {}", letter);
                state.pending_letters.push(letter);
            }
            state.stable_run_length = 0;
            state.phase = Phase::LetterCommitted;
        } else {
            state.phase = Phase::Accumulating;
        }
    }

    /// Drop everything accumulated so far and start over at `now`.
    pub fn restart(&mut self, now: Instant) {
        debug!("Restarting accumulator from {}", self.state.phase);
        self.state = AccumulatorState::new(now);
    }

    /// The word being spelled right now.
    pub fn current_word(&self) -> String {
        self.state.pending_letters.concat()
    }

    /// All completed words joined by single spaces.
    pub fn sentence_buffer(&self) -> String {
        self.state.finalized_words.join(" ")
    }

    /// The sentence ready to be spoken, in sentence case. Does not consume
    /// the buffer.
    pub fn finalize_sentence(&self) -> String {
        sentence_case(&self.sentence_buffer())
    }
}

/// Upper-case the first character and lower-case the rest ("HI THERE" -> "Hi there").
fn sentence_case(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

//! A signing session: the accumulator plus the user's speak/restart controls.

use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::accumulator::{Accumulator, AccumulatorConfig, ClassificationEvent};
use crate::speech::SpeechDispatch;

/// What the user sees: the word being spelled and the sentence so far.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    pub current_word: String,
    pub sentence: String,
}

impl fmt::Display for Transcript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Current word: {} | Sentence: {}", self.current_word, self.sentence)
    }
}

/// User controls outside the frame stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionCommand {
    /// Speak the accumulated sentence.
    Speak,
    /// Forget everything and start over.
    Restart,
}

/// Owns the accumulator for one session and forwards sentences to speech.
pub struct SignSession<D> {
    accumulator: Accumulator,
    dispatch: D,
    transcript: Transcript, // Last transcript reported to the caller
}

impl<D: SpeechDispatch> SignSession<D> {
    pub fn new(config: AccumulatorConfig, dispatch: D, now: Instant) -> Self {
        Self { accumulator: Accumulator::new(config, now), dispatch, transcript: Transcript::default() }
    }

    pub fn accumulator(&self) -> &Accumulator {
        &self.accumulator
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Feed one frame's classification.
    ///
    /// # Returns
    /// The new transcript if the word or sentence changed.
    pub fn observe(&mut self, event: ClassificationEvent, now: Instant) -> Option<Transcript> {
        self.accumulator.process_frame(event, now);
        self.refresh()
    }

    /// Hand the finished sentence to speech. Words stay in the buffer.
    ///
    /// # Returns
    /// The dispatched sentence, or `None` when no word is finished yet.
    pub fn speak(&self) -> Option<String> {
        if self.accumulator.state().finalized_words().is_empty() {
            debug!("Nothing to speak yet");
            return None;
        }

        let sentence = self.accumulator.finalize_sentence();
        info!("🗣️  Speaking: \"{}\"", sentence);
        self.dispatch.speak(&sentence);
        Some(sentence)
    }

    /// Start over.
    pub fn restart(&mut self, now: Instant) {
        info!("🔄 Session restarted");
        self.accumulator.restart(now);
        self.refresh();
    }

    /// Apply a user command.
    ///
    /// # Returns
    /// The sentence handed to speech, if any.
    pub fn apply(&mut self, command: SessionCommand, now: Instant) -> Option<String> {
        match command {
            SessionCommand::Speak => self.speak(),
            SessionCommand::Restart => {
                self.restart(now);
                None
            }
        }
    }

    fn refresh(&mut self) -> Option<Transcript> {
        let current = Transcript { current_word: self.accumulator.current_word(), sentence: self.accumulator.sentence_buffer() };
        if current == self.transcript {
            return None;
        }
        self.transcript = current.clone();
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::time::Duration;

    #[derive(Default)]
    struct Recorder(RefCell<Vec<String>>);

    impl SpeechDispatch for Recorder {
        fn speak(&self, sentence: &str) {
            self.0.borrow_mut().push(sentence.to_string());
        }
    }

    fn spell(session: &mut SignSession<&Recorder>, start: Instant, from: f64, word: &str) -> f64 {
        let mut t = from;
        for letter in word.chars() {
            for _ in 0..10 {
                session.observe(ClassificationEvent::detected(letter.to_string(), 0.9), start + Duration::from_secs_f64(t));
                t += 0.05;
            }
        }
        session.observe(ClassificationEvent::NoHand, start + Duration::from_secs_f64(t + 2.5));
        t + 3.0
    }

    #[test]
    fn test_speak_without_words_is_noop() {
        let recorder = Recorder::default();
        let start = Instant::now();
        let mut session = SignSession::new(AccumulatorConfig::default(), &recorder, start);

        for i in 0..10 {
            session.observe(ClassificationEvent::detected("A", 0.9), start + Duration::from_millis(i * 30));
        }
        assert_eq!(session.accumulator().current_word(), "A");
        assert_eq!(session.speak(), None);
        assert!(recorder.0.borrow().is_empty());
    }

    #[test]
    fn test_speak_dispatches_and_keeps_words() {
        let recorder = Recorder::default();
        let start = Instant::now();
        let mut session = SignSession::new(AccumulatorConfig::default(), &recorder, start);

        spell(&mut session, start, 0.0, "HI");
        assert_eq!(session.apply(SessionCommand::Speak, start + Duration::from_secs(10)), Some("Hi".to_string()));
        assert_eq!(session.speak(), Some("Hi".to_string()));

        assert_eq!(*recorder.0.borrow(), ["Hi", "Hi"]);
        assert_eq!(session.accumulator().sentence_buffer(), "HI");
    }

    #[test]
    fn test_observe_reports_only_changes() {
        let recorder = Recorder::default();
        let start = Instant::now();
        let mut session = SignSession::new(AccumulatorConfig::default(), &recorder, start);

        let mut updates = Vec::new();
        for i in 0..10 {
            if let Some(t) = session.observe(ClassificationEvent::detected("A", 0.9), start + Duration::from_millis(i * 30)) {
                updates.push(t);
            }
        }
        assert_eq!(updates, [Transcript { current_word: "A".to_string(), sentence: String::new() }]);

        let flushed = session.observe(ClassificationEvent::NoHand, start + Duration::from_secs(5)).unwrap();
        assert_eq!(flushed, Transcript { current_word: String::new(), sentence: "A".to_string() });
        assert_eq!(flushed.to_string(), "Current word:  | Sentence: A");
    }

    #[test]
    fn test_restart_clears_transcript() {
        let recorder = Recorder::default();
        let start = Instant::now();
        let mut session = SignSession::new(AccumulatorConfig::default(), &recorder, start);

        let t = spell(&mut session, start, 0.0, "OK");
        assert_eq!(session.apply(SessionCommand::Restart, start + Duration::from_secs_f64(t)), None);

        assert_eq!(session.transcript(), &Transcript::default());
        assert_eq!(session.speak(), None);
    }

    #[test]
    fn test_command_names() {
        assert_eq!(serde_json::from_str::<SessionCommand>("\"speak\"").unwrap(), SessionCommand::Speak);
        assert_eq!(serde_json::from_str::<SessionCommand>("\"restart\"").unwrap(), SessionCommand::Restart);
        assert!(serde_json::from_str::<SessionCommand>("\"shout\"").is_err());
    }
}

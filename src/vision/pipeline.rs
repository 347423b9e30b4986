//! Hand localization and gesture classification for one frame at a time.

use anyhow::Result;
use tracing::{debug, trace};

use super::frame::{BoundingBox, Frame};
use crate::accumulator::ClassificationEvent;

/// Supplies camera frames. `Ok(None)` means the stream ended.
pub trait FrameSource {
    fn next_frame(&mut self) -> Result<Option<Frame>>;
}

/// Finds at most one hand per frame.
pub trait HandLocator {
    fn locate(&mut self, frame: &Frame) -> Option<BoundingBox>;
}

/// Top-1 prediction of the gesture classifier.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub label: String,
    pub confidence: f32,
}

/// Classifies a cropped hand region over a fixed alphabet.
pub trait GestureClassifier {
    /// `None` when the model produced no usable output.
    fn classify(&mut self, roi: &Frame) -> Option<Prediction>;
}

/// Runs locator and classifier on each frame and reports the outcome as a
/// `ClassificationEvent`.
pub struct GesturePipeline<L, C> {
    locator: L,
    classifier: C,
    mirror: bool, // Flip frames horizontally before detection
}

impl<L: HandLocator, C: GestureClassifier> GesturePipeline<L, C> {
    pub fn new(locator: L, classifier: C) -> Self {
        Self { locator, classifier, mirror: true }
    }

    /// Disable or enable the selfie-style horizontal flip (enabled by default).
    pub fn with_mirror(mut self, mirror: bool) -> Self {
        self.mirror = mirror;
        self
    }

    /// Classify a single frame.
    ///
    /// A missing hand, an empty region or a classifier without output all
    /// count as `NoHand`. Confidence is clamped to 0.0 - 1.0.
    pub fn observe(&mut self, frame: &Frame) -> ClassificationEvent {
        let mirrored;
        let frame = if self.mirror {
            mirrored = frame.mirrored();
            &mirrored
        } else {
            frame
        };

        let Some(bbox) = self.locator.locate(frame) else {
            trace!("No hand in frame");
            return ClassificationEvent::NoHand;
        };

        let roi = frame.crop(&bbox);
        if roi.is_empty() {
            debug!("Hand region {:?} is empty after clipping", bbox);
            return ClassificationEvent::NoHand;
        }

        match self.classifier.classify(&roi) {
            Some(Prediction { label, confidence }) => {
                let confidence = if confidence.is_nan() { 0.0 } else { confidence.clamp(0.0, 1.0) };
                trace!("Classified {} ({:.2})", label, confidence);
                ClassificationEvent::Detected { label, confidence }
            }
            None => {
                debug!("Classifier returned no prediction");
                ClassificationEvent::NoHand
            }
        }
    }

    /// Pull the next frame from `source` and classify it.
    ///
    /// # Returns
    /// `None` once the source is exhausted.
    pub fn poll<S: FrameSource>(&mut self, source: &mut S) -> Result<Option<ClassificationEvent>> {
        Ok(source.next_frame()?.map(|frame| self.observe(&frame)))
    }
}

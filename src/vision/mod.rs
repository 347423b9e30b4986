//! Frame handling and the predictor seams in front of the accumulator.
//!
//! The camera, hand locator and gesture classifier are external collaborators.
//! This module only fixes their interfaces and turns their outputs into
//! per-frame `ClassificationEvent`s.

mod frame;
mod pipeline;

pub use frame::{BoundingBox, Frame, Landmark};
pub use pipeline::{FrameSource, GestureClassifier, GesturePipeline, HandLocator, Prediction};

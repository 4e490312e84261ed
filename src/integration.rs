//! Integration module for connecting detection and embedding backends
//! with the tracker.
//!
//! This module provides traits and utilities for integrating inference
//! backends (detector and appearance-feature extractor) with the
//! per-frame tracking loop.

mod builder;
mod detector;
mod extractor;
mod pipeline;

pub use builder::DetectionBuilder;
pub use detector::{DetectionSource, IntoDetections};
pub use extractor::FeatureSource;
pub use pipeline::{PipelineError, TrackerPipeline};

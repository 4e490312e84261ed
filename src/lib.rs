//! Multi-object player tracking with appearance-based re-identification.
//!
//! The tracker maintains per-object motion state through a
//! constant-velocity Kalman filter, associates detections to tracks with
//! an optimal assignment over blended geometric and appearance costs,
//! and recovers identities after occlusions or missed detections by
//! matching appearance embeddings against per-track galleries.
//!
//! Detection and embedding extraction are external collaborators behind
//! the [`DetectionSource`] and [`FeatureSource`] traits; feed frames to
//! a [`TrackerPipeline`], or call [`PlayerTracker::update`] directly
//! with prepared [`Detection`] values.

pub mod error;
pub mod integration;
pub mod tracker;

pub use error::TrackError;
pub use integration::{
    DetectionBuilder, DetectionSource, FeatureSource, IntoDetections, PipelineError,
    TrackerPipeline,
};
pub use tracker::{
    Detection, Embedding, Gallery, PlayerTracker, Rect, Track, TrackState, TrackerConfig,
    unit_normalized,
};

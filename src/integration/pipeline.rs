//! TrackerPipeline for combining detection, embedding extraction, and
//! tracking.

use std::fmt;

use crate::error::TrackError;
use crate::tracker::{PlayerTracker, Rect, Track, TrackerConfig, unit_normalized};

use super::{DetectionSource, FeatureSource};

/// Pipeline failure: either the detector failed for the whole frame or
/// the tracker hit an internal error. Per-crop extractor failures are
/// not represented here; they degrade that detection to motion-only and
/// are logged where they happen.
#[derive(Debug)]
pub enum PipelineError<E> {
    /// The detector failed for this frame.
    Detector(E),
    /// The tracker failed while processing this frame.
    Tracker(TrackError),
}

impl<E: fmt::Display> fmt::Display for PipelineError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Detector(err) => write!(f, "detection failed: {}", err),
            Self::Tracker(err) => write!(f, "tracking failed: {}", err),
        }
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for PipelineError<E> {}

/// End-to-end per-frame tracking: detect, embed crops, update tracks.
///
/// Bundles a `DetectionSource`, a `FeatureSource`, and the
/// `PlayerTracker` so a caller only feeds frames and receives the
/// Confirmed tracks back.
pub struct TrackerPipeline<D: DetectionSource, F: FeatureSource> {
    detector: D,
    extractor: F,
    tracker: PlayerTracker,
}

impl<D, F> TrackerPipeline<D, F>
where
    D: DetectionSource,
    F: FeatureSource,
    F::Error: fmt::Display,
{
    /// Create a new tracking pipeline with the given collaborators and
    /// tracker config.
    pub fn new(detector: D, extractor: F, config: TrackerConfig) -> Self {
        Self {
            detector,
            extractor,
            tracker: PlayerTracker::new(config),
        }
    }

    /// Create a new tracking pipeline with default tracker configuration.
    pub fn with_default_config(detector: D, extractor: F) -> Self {
        Self::new(detector, extractor, TrackerConfig::default())
    }

    /// Process a single frame and return the Confirmed tracks.
    ///
    /// Runs detection, embeds every detected crop (a failed or
    /// degenerate embedding leaves that detection motion-only), and
    /// updates the tracker.
    ///
    /// # Arguments
    /// * `input` - Raw image bytes
    /// * `width` - Image width in pixels
    /// * `height` - Image height in pixels
    pub fn process_frame(
        &mut self,
        input: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<Track>, PipelineError<D::Error>> {
        let mut detections = self
            .detector
            .detect(input, width, height)
            .map_err(PipelineError::Detector)?;

        let boxes: Vec<Rect> = detections.iter().map(|d| d.bbox).collect();
        let embeddings = self.extractor.embed_batch(input, width, height, &boxes);

        for (detection, embedding) in detections.iter_mut().zip(embeddings) {
            match embedding {
                Ok(raw) => match unit_normalized(raw) {
                    Some(embedding) => detection.embedding = Some(embedding),
                    None => {
                        tracing::warn!(
                            bbox = ?detection.bbox,
                            "degenerate embedding, appearance update skipped"
                        );
                    }
                },
                Err(err) => {
                    tracing::warn!(
                        bbox = ?detection.bbox,
                        %err,
                        "feature extraction failed, appearance update skipped"
                    );
                }
            }
        }

        self.tracker
            .update(detections)
            .map_err(PipelineError::Tracker)
    }

    /// Get a reference to the underlying detector.
    pub fn detector(&self) -> &D {
        &self.detector
    }

    /// Get a mutable reference to the underlying detector.
    pub fn detector_mut(&mut self) -> &mut D {
        &mut self.detector
    }

    /// Get a reference to the underlying feature extractor.
    pub fn extractor(&self) -> &F {
        &self.extractor
    }

    /// Get a mutable reference to the underlying feature extractor.
    pub fn extractor_mut(&mut self) -> &mut F {
        &mut self.extractor
    }

    /// Get a reference to the underlying tracker.
    pub fn tracker(&self) -> &PlayerTracker {
        &self.tracker
    }

    /// Get a mutable reference to the underlying tracker.
    pub fn tracker_mut(&mut self) -> &mut PlayerTracker {
        &mut self.tracker
    }
}

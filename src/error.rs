//! Error types for the tracking crate.

use thiserror::Error;

/// Errors surfaced by the core tracker.
///
/// Malformed detections and per-crop extractor failures are recovered
/// locally (filtered or downgraded to motion-only) and never reach this
/// type; what remains are genuine logic or numerical failures.
#[derive(Debug, Clone, Error)]
pub enum TrackError {
    /// The assignment solver rejected the cost matrix. A well-formed
    /// finite matrix always solves, so this indicates a bug in cost
    /// construction rather than bad input.
    #[error("assignment failed: {0}")]
    Assignment(String),

    /// A projected measurement covariance could not be inverted.
    #[error("numerical failure: {0}")]
    Numerical(String),
}

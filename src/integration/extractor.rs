//! Trait for appearance-embedding extraction backends.

use crate::tracker::{Embedding, Rect};

/// Trait for appearance feature extractors.
///
/// An implementation crops `bbox` out of the frame and embeds it into a
/// fixed-length vector. The tracker compares embeddings by dot product,
/// so implementations must return unit L2 norm vectors of consistent
/// dimensionality across calls. Behavior for a box that lies outside the
/// frame bounds is the implementation's responsibility.
pub trait FeatureSource {
    /// Error type for extraction failures.
    type Error;

    /// Embed the crop of `input` bounded by `bbox`.
    ///
    /// # Arguments
    /// * `input` - Raw image bytes (format depends on implementation)
    /// * `width` - Image width in pixels
    /// * `height` - Image height in pixels
    /// * `bbox` - Crop region in pixel coordinates
    fn embed(
        &mut self,
        input: &[u8],
        width: u32,
        height: u32,
        bbox: &Rect,
    ) -> Result<Embedding, Self::Error>;

    /// Embed one crop per box.
    ///
    /// The default loops over [`FeatureSource::embed`]; backends with
    /// batched inference should override it and run all crops in one
    /// forward pass.
    fn embed_batch(
        &mut self,
        input: &[u8],
        width: u32,
        height: u32,
        boxes: &[Rect],
    ) -> Vec<Result<Embedding, Self::Error>> {
        boxes
            .iter()
            .map(|bbox| self.embed(input, width, height, bbox))
            .collect()
    }
}

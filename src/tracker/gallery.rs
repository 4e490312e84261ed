//! Bounded appearance gallery for re-identification.
//!
//! A single embedding is noisy under pose and lighting change, so each
//! track keeps a small rolling window of recent embeddings and scores a
//! candidate against the best of them. All stored vectors are unit L2
//! norm (caller invariant), which reduces cosine similarity to a dot
//! product.

use std::collections::VecDeque;

use ndarray::Array1;

/// Appearance embedding produced by the feature extractor.
pub type Embedding = Array1<f32>;

/// Rolling FIFO store of recent appearance embeddings for one track.
#[derive(Debug, Clone)]
pub struct Gallery {
    embeddings: VecDeque<Embedding>,
    capacity: usize,
}

impl Gallery {
    /// Create an empty gallery holding at most `capacity` embeddings.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            embeddings: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Insert an embedding, evicting the oldest when at capacity.
    pub fn push(&mut self, embedding: Embedding) {
        if self.embeddings.len() == self.capacity {
            self.embeddings.pop_front();
        }
        self.embeddings.push_back(embedding);
    }

    /// Best cosine similarity between `candidate` and any stored
    /// embedding, or `None` when the gallery is empty. In [-1, 1] for
    /// unit-norm inputs.
    pub fn max_similarity(&self, candidate: &Embedding) -> Option<f32> {
        self.embeddings
            .iter()
            .map(|stored| stored.dot(candidate))
            .fold(None, |best, sim| match best {
                Some(b) if b >= sim => Some(b),
                _ => Some(sim),
            })
    }

    pub fn len(&self) -> usize {
        self.embeddings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.embeddings.is_empty()
    }
}

/// Rescale a vector to unit L2 norm.
///
/// Returns `None` for zero or non-finite input, which callers treat as
/// "no appearance information for this crop".
pub fn unit_normalized(v: Embedding) -> Option<Embedding> {
    let norm_sq: f32 = v.iter().map(|x| x * x).sum();
    if !norm_sq.is_finite() || norm_sq <= 0.0 {
        return None;
    }
    Some(v / norm_sq.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_empty_gallery_has_no_score() {
        let gallery = Gallery::new(5);
        assert!(gallery.is_empty());
        assert_eq!(gallery.max_similarity(&array![1.0, 0.0]), None);
    }

    #[test]
    fn test_max_similarity_picks_best() {
        let mut gallery = Gallery::new(5);
        gallery.push(array![1.0, 0.0]);
        gallery.push(array![0.0, 1.0]);

        let sim = gallery.max_similarity(&array![1.0, 0.0]).unwrap();
        assert!((sim - 1.0).abs() < 1e-6);

        // Opposite direction scores -1 against one entry, 0 against the other.
        let sim = gallery.max_similarity(&array![-1.0, 0.0]).unwrap();
        assert!((sim - 0.0).abs() < 1e-6);
    }

    #[test]
    fn test_fifo_eviction() {
        let mut gallery = Gallery::new(2);
        gallery.push(array![1.0, 0.0]);
        gallery.push(array![0.0, 1.0]);
        gallery.push(array![-1.0, 0.0]); // evicts the first entry

        assert_eq!(gallery.len(), 2);
        let sim = gallery.max_similarity(&array![1.0, 0.0]).unwrap();
        assert!(sim < 0.5); // the matching entry is gone
    }

    #[test]
    fn test_unit_normalized() {
        let v = unit_normalized(array![3.0, 4.0]).unwrap();
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert!((v[1] - 0.8).abs() < 1e-6);

        assert!(unit_normalized(array![0.0, 0.0]).is_none());
        assert!(unit_normalized(array![f32::NAN, 1.0]).is_none());
    }
}

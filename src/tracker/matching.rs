//! Association cost construction and optimal assignment.
//!
//! The primary pass blends a geometric score (IoU, with a center-distance
//! fallback for fast motion) and an appearance score (best-of-gallery
//! cosine similarity) into one cost matrix, gated so that spatially
//! distant pairs are never considered regardless of how alike they look.
//! The re-identification pass reuses the same assignment machinery over
//! an appearance-only matrix.

use ndarray::Array2;

use crate::error::TrackError;
use crate::tracker::gallery::{Embedding, Gallery};
use crate::tracker::rect::Rect;

/// Detection input for the tracker.
#[derive(Debug, Clone)]
pub struct Detection {
    /// Bounding box in TLWH storage (constructed from TLBR corners)
    pub bbox: Rect,
    /// Detection confidence score
    pub score: f32,
    /// Detector class id
    pub class_id: u32,
    /// Unit-norm appearance embedding, when extraction succeeded
    pub embedding: Option<Embedding>,
}

impl Detection {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32, score: f32) -> Self {
        Self {
            bbox: Rect::from_tlbr(x1, y1, x2, y2),
            score,
            class_id: 0,
            embedding: None,
        }
    }

    pub fn from_rect(bbox: Rect, score: f32) -> Self {
        Self {
            bbox,
            score,
            class_id: 0,
            embedding: None,
        }
    }

    pub fn with_class(mut self, class_id: u32) -> Self {
        self.class_id = class_id;
        self
    }

    pub fn with_embedding(mut self, embedding: Embedding) -> Self {
        self.embedding = Some(embedding);
        self
    }
}

/// Cost given to pairs excluded by the gate and to padding cells. Far
/// above every rejection threshold, so the solver's forced picks on such
/// cells are always discarded afterwards.
const GATED_COST: f32 = 1e6;

/// Ceiling for the center-distance fallback score, keeping it below any
/// real overlap score of interest.
const CENTER_FALLBACK_CEIL: f32 = 0.3;

/// Geometric compatibility of a predicted box and a detection, in [0, 1].
///
/// IoU when the boxes overlap. When they do not, a linear falloff on
/// center distance covers objects that moved too fast for their boxes to
/// still intersect: the score starts at `CENTER_FALLBACK_CEIL` for
/// coincident centers and reaches zero at twice the predicted box
/// diagonal.
pub fn motion_score(predicted: &Rect, detection: &Rect) -> f32 {
    let iou = predicted.iou(detection);
    if iou > 0.0 {
        return iou;
    }

    let reach = 2.0 * predicted.diagonal();
    if reach <= 0.0 {
        return 0.0;
    }
    let dist = predicted.center_distance(detection);
    if dist >= reach {
        return 0.0;
    }
    CENTER_FALLBACK_CEIL * (1.0 - dist / reach)
}

/// Build the blended cost matrix for the primary association pass.
///
/// `cost = 1 - (w * motion + (1 - w) * appearance)` with pairs whose
/// motion score falls below `motion_gate` forced to `GATED_COST`. Pairs
/// without usable appearance (empty gallery or detection without an
/// embedding) score `neutral_appearance` on the appearance term. Rows
/// must be ordered by ascending track id so equal-cost assignments
/// resolve to the lowest id.
pub fn combined_costs(
    predicted: &[Rect],
    galleries: &[&Gallery],
    detections: &[&Detection],
    motion_weight: f32,
    motion_gate: f32,
    neutral_appearance: f32,
) -> Array2<f32> {
    debug_assert_eq!(predicted.len(), galleries.len());

    let mut costs = Array2::zeros((predicted.len(), detections.len()));
    for i in 0..predicted.len() {
        for (j, det) in detections.iter().enumerate() {
            let motion = motion_score(&predicted[i], &det.bbox);
            if motion < motion_gate {
                costs[[i, j]] = GATED_COST;
                continue;
            }

            let appearance = det
                .embedding
                .as_ref()
                .and_then(|e| galleries[i].max_similarity(e))
                .unwrap_or(neutral_appearance);

            let blended = motion_weight * motion + (1.0 - motion_weight) * appearance;
            costs[[i, j]] = 1.0 - blended;
        }
    }
    costs
}

/// Build the appearance-only cost matrix for the re-identification pass.
///
/// Motion prediction is stale for long-lost tracks, so only gallery
/// similarity counts: `cost = 1 - similarity`. Pairs without usable
/// appearance are gated out entirely.
pub fn appearance_costs(galleries: &[&Gallery], detections: &[&Detection]) -> Array2<f32> {
    let mut costs = Array2::zeros((galleries.len(), detections.len()));
    for (i, gallery) in galleries.iter().enumerate() {
        for (j, det) in detections.iter().enumerate() {
            costs[[i, j]] = match det.embedding.as_ref().and_then(|e| gallery.max_similarity(e)) {
                Some(sim) => 1.0 - sim,
                None => GATED_COST,
            };
        }
    }
    costs
}

#[derive(Debug, Clone)]
pub struct AssignmentResult {
    pub matches: Vec<(usize, usize)>,
    pub unmatched_tracks: Vec<usize>,
    pub unmatched_detections: Vec<usize>,
}

/// Solve the cost matrix as a minimum-cost bipartite assignment.
///
/// The matrix is padded square with `GATED_COST` so unbalanced inputs
/// still solve; assigned pairs with realized cost above `thresh` are
/// discarded (padding can force low-quality pairings). A solver failure
/// on a finite matrix means the costs were malformed and is surfaced as
/// an error rather than treated as "nothing matched".
pub fn linear_assignment(
    cost_matrix: &Array2<f32>,
    thresh: f32,
) -> Result<AssignmentResult, TrackError> {
    let (num_rows, num_cols) = cost_matrix.dim();

    if num_rows == 0 {
        return Ok(AssignmentResult {
            matches: vec![],
            unmatched_tracks: vec![],
            unmatched_detections: (0..num_cols).collect(),
        });
    }

    if num_cols == 0 {
        return Ok(AssignmentResult {
            matches: vec![],
            unmatched_tracks: (0..num_rows).collect(),
            unmatched_detections: vec![],
        });
    }

    let size = num_rows.max(num_cols);
    let mut padded = Array2::<f64>::from_elem((size, size), GATED_COST as f64);

    for i in 0..num_rows {
        for j in 0..num_cols {
            padded[[i, j]] = cost_matrix[[i, j]] as f64;
        }
    }

    let (row_to_col, _) = lapjv::lapjv(&padded)
        .map_err(|e| TrackError::Assignment(format!("solver rejected cost matrix: {e:?}")))?;

    let mut matches = vec![];
    let mut unmatched_tracks = vec![];
    let mut unmatched_detections_mask: Vec<bool> = vec![true; num_cols];

    for (row_idx, &col_idx) in row_to_col.iter().enumerate() {
        if row_idx >= num_rows {
            continue;
        }
        if col_idx >= num_cols {
            unmatched_tracks.push(row_idx);
        } else if cost_matrix[[row_idx, col_idx]] <= thresh {
            matches.push((row_idx, col_idx));
            unmatched_detections_mask[col_idx] = false;
        } else {
            unmatched_tracks.push(row_idx);
        }
    }

    let unmatched_detections: Vec<usize> = unmatched_detections_mask
        .iter()
        .enumerate()
        .filter_map(|(i, &u)| if u { Some(i) } else { None })
        .collect();

    Ok(AssignmentResult {
        matches,
        unmatched_tracks,
        unmatched_detections,
    })
}

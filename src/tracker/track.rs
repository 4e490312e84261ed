//! Single tracked player.

use ndarray::{Array1, Array2};

use crate::tracker::gallery::Gallery;
use crate::tracker::kalman_filter::KalmanFilter;
use crate::tracker::matching::Detection;
use crate::tracker::rect::Rect;
use crate::tracker::track_state::TrackState;

/// Persistent record of one tracked player across frames.
///
/// Owns its motion state and appearance gallery exclusively; all
/// mutation goes through the lifecycle methods below, driven once per
/// frame by the tracker.
#[derive(Debug, Clone)]
pub struct Track {
    /// Unique identifier, stable for the track's lifetime, never reused
    pub track_id: u64,
    /// Current lifecycle state
    pub state: TrackState,
    /// Confidence score of the last matched detection
    pub score: f32,
    /// Detector class of the last matched detection
    pub class_id: u32,
    /// Frame of the last successful match
    pub frame_id: u32,
    /// Frame the track was spawned on
    pub start_frame: u32,
    /// Consecutive frames since the last successful match
    pub age: u32,
    /// Total successful matches
    pub hits: u32,
    /// Rolling appearance gallery
    pub gallery: Gallery,
    /// Kalman state mean (8-dim), present once initiated
    pub mean: Option<Array1<f64>>,
    /// Kalman state covariance (8x8)
    pub covariance: Option<Array2<f64>>,
    /// Most recent matched bounding box
    pub last_box: Rect,
}

impl Track {
    /// Spawn a new Tentative track from an unmatched detection.
    ///
    /// The seed detection counts as the first hit; with a confirmation
    /// count of 1 the track is Confirmed at birth.
    pub fn spawn(
        detection: &Detection,
        track_id: u64,
        kalman_filter: &KalmanFilter,
        frame_id: u32,
        gallery_capacity: usize,
        confirm_hits: u32,
    ) -> Self {
        let xyah = detection.bbox.to_xyah();
        let (mean, covariance) = kalman_filter.initiate(xyah.map(f64::from));

        let mut gallery = Gallery::new(gallery_capacity);
        if let Some(embedding) = &detection.embedding {
            gallery.push(embedding.clone());
        }

        let state = if confirm_hits <= 1 {
            TrackState::Confirmed
        } else {
            TrackState::Tentative
        };

        Self {
            track_id,
            state,
            score: detection.score,
            class_id: detection.class_id,
            frame_id,
            start_frame: frame_id,
            age: 0,
            hits: 1,
            gallery,
            mean: Some(mean),
            covariance: Some(covariance),
            last_box: detection.bbox,
        }
    }

    /// Current bounding box estimate: the motion state when initiated,
    /// the last matched box otherwise.
    pub fn rect(&self) -> Rect {
        match &self.mean {
            Some(mean) => {
                let cx = mean[0] as f32;
                let cy = mean[1] as f32;
                let aspect = mean[2] as f32;
                let h = mean[3] as f32;
                Rect::from_xyah(cx, cy, aspect, h)
            }
            None => self.last_box,
        }
    }

    /// Current box as (x1, y1, x2, y2).
    pub fn to_tlbr(&self) -> [f32; 4] {
        self.rect().to_tlbr()
    }

    /// Advance the motion state one frame.
    ///
    /// Tracks not currently matched hold their height steady: the
    /// height-velocity term is zeroed so a stale shrink/grow trend
    /// cannot run away while the object is unobserved.
    pub fn predict(&mut self, kalman_filter: &KalmanFilter) {
        if let (Some(mean), Some(cov)) = (&self.mean, &self.covariance) {
            let mut mean_to_predict = mean.clone();
            if self.state != TrackState::Confirmed {
                mean_to_predict[7] = 0.0;
            }
            let (new_mean, new_cov) = kalman_filter.predict(&mean_to_predict, cov);
            self.mean = Some(new_mean);
            self.covariance = Some(new_cov);
        }
    }

    /// Fold a matched detection into the track.
    ///
    /// Fuses the observation into the motion state, appends the
    /// embedding, resets the age and counts the hit, promoting a
    /// Tentative track once it reaches `confirm_hits`. A failed fusion
    /// leaves the predicted state in place for this frame.
    pub fn apply_match(
        &mut self,
        detection: &Detection,
        kalman_filter: &KalmanFilter,
        frame_id: u32,
        confirm_hits: u32,
    ) {
        if let (Some(mean), Some(cov)) = (&self.mean, &self.covariance) {
            let xyah = detection.bbox.to_xyah();
            match kalman_filter.correct(mean, cov, xyah.map(f64::from)) {
                Ok((new_mean, new_cov)) => {
                    self.mean = Some(new_mean);
                    self.covariance = Some(new_cov);
                }
                Err(err) => {
                    tracing::warn!(
                        track_id = self.track_id,
                        %err,
                        "motion correction failed, keeping predicted state"
                    );
                }
            }
        }

        if let Some(embedding) = &detection.embedding {
            self.gallery.push(embedding.clone());
        }

        self.frame_id = frame_id;
        self.last_box = detection.bbox;
        self.score = detection.score;
        self.class_id = detection.class_id;
        self.age = 0;
        self.hits += 1;

        if self.state == TrackState::Tentative && self.hits >= confirm_hits {
            self.state = TrackState::Confirmed;
        }
    }

    /// Reinstate a Lost track from a re-identified detection.
    ///
    /// The stale motion estimate is discarded and reseeded from the
    /// matched box; the track returns to Confirmed with its identity
    /// intact.
    pub fn reinstate(
        &mut self,
        detection: &Detection,
        kalman_filter: &KalmanFilter,
        frame_id: u32,
    ) {
        let xyah = detection.bbox.to_xyah();
        let (mean, covariance) = kalman_filter.initiate(xyah.map(f64::from));
        self.mean = Some(mean);
        self.covariance = Some(covariance);

        if let Some(embedding) = &detection.embedding {
            self.gallery.push(embedding.clone());
        }

        self.frame_id = frame_id;
        self.last_box = detection.bbox;
        self.score = detection.score;
        self.class_id = detection.class_id;
        self.age = 0;
        self.hits += 1;
        self.state = TrackState::Confirmed;
    }

    /// Register a frame with no matching detection.
    ///
    /// Tentative tracks die immediately, Confirmed tracks go Lost, and
    /// Lost tracks are Deleted once their age passes `max_age`.
    pub fn mark_missed(&mut self, max_age: u32) {
        self.age += 1;
        match self.state {
            TrackState::Tentative => {
                self.state = TrackState::Deleted;
            }
            TrackState::Confirmed => {
                self.state = TrackState::Lost;
            }
            TrackState::Lost => {
                if self.age > max_age {
                    self.state = TrackState::Deleted;
                }
            }
            TrackState::Deleted => {}
        }
    }

    pub fn is_confirmed(&self) -> bool {
        self.state == TrackState::Confirmed
    }

    pub fn is_lost(&self) -> bool {
        self.state == TrackState::Lost
    }

    pub fn is_deleted(&self) -> bool {
        self.state == TrackState::Deleted
    }
}

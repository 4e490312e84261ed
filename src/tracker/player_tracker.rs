//! Per-frame tracking loop and track lifecycle management.

use crate::error::TrackError;
use crate::tracker::gallery::Gallery;
use crate::tracker::kalman_filter::KalmanFilter;
use crate::tracker::matching::{self, AssignmentResult, Detection};
use crate::tracker::rect::Rect;
use crate::tracker::track::Track;

/// Configuration for the PlayerTracker. All thresholds are fixed at
/// construction.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Frames a Lost track survives without a match before deletion
    pub max_age: u32,
    /// Matches required to promote Tentative to Confirmed
    pub confirm_hits: u32,
    /// Embeddings retained per track, oldest evicted first
    pub gallery_capacity: usize,
    /// Minimum appearance similarity to reinstate a Lost track
    pub reid_threshold: f32,
    /// Weight of the motion score in the blended cost; appearance gets
    /// the complement
    pub motion_weight: f32,
    /// Maximum accepted cost for a primary-pass match
    pub match_thresh: f32,
    /// Minimum motion score below which a pair is never considered
    pub motion_gate: f32,
    /// Appearance score substituted when a pair has no usable appearance
    pub neutral_appearance: f32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            max_age: 30,
            confirm_hits: 3,
            gallery_capacity: 30,
            reid_threshold: 0.85,
            motion_weight: 0.6,
            match_thresh: 0.8,
            motion_gate: 0.05,
            neutral_appearance: 0.0,
        }
    }
}

/// Multi-object tracker with appearance-based re-identification.
///
/// Owns the live-track set exclusively; one instance per video stream.
/// Frames must be fed in order through [`PlayerTracker::update`].
pub struct PlayerTracker {
    tracks: Vec<Track>,
    frame_id: u32,
    next_id: u64,
    config: TrackerConfig,
    kalman_filter: KalmanFilter,
}

impl PlayerTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            tracks: Vec::new(),
            frame_id: 0,
            next_id: 0,
            config,
            kalman_filter: KalmanFilter::default(),
        }
    }

    /// Ingest one frame of detections and return snapshots of the
    /// Confirmed tracks.
    ///
    /// Steps per frame: drop malformed detections, predict all live
    /// tracks, associate non-Lost tracks with detections on blended
    /// motion + appearance cost, re-identify Lost tracks among the
    /// leftover detections on appearance alone, age out the unmatched,
    /// and spawn Tentative tracks for detections nothing claimed.
    pub fn update(&mut self, detections: Vec<Detection>) -> Result<Vec<Track>, TrackError> {
        self.frame_id += 1;

        let detections = self.sanitize(detections);

        // Step 1: advance every live track's motion state.
        for track in &mut self.tracks {
            track.predict(&self.kalman_filter);
        }

        let mut det_matched = vec![false; detections.len()];
        let mut track_matched = vec![false; self.tracks.len()];

        // Step 2: primary association over non-Lost tracks. The track
        // vector is in spawn order, so rows are already sorted by
        // ascending id and equal-cost solutions favor the older track.
        let primary: Vec<usize> = (0..self.tracks.len())
            .filter(|&i| !self.tracks[i].is_lost())
            .collect();

        let predicted: Vec<Rect> = primary.iter().map(|&i| self.tracks[i].rect()).collect();
        let galleries: Vec<&Gallery> = primary.iter().map(|&i| &self.tracks[i].gallery).collect();
        let det_refs: Vec<&Detection> = detections.iter().collect();

        let costs = matching::combined_costs(
            &predicted,
            &galleries,
            &det_refs,
            self.config.motion_weight,
            self.config.motion_gate,
            self.config.neutral_appearance,
        );
        let AssignmentResult {
            matches,
            unmatched_detections,
            ..
        } = matching::linear_assignment(&costs, self.config.match_thresh)?;

        for (ti, di) in matches {
            let idx = primary[ti];
            self.tracks[idx].apply_match(
                &detections[di],
                &self.kalman_filter,
                self.frame_id,
                self.config.confirm_hits,
            );
            track_matched[idx] = true;
            det_matched[di] = true;
        }

        // Step 3: re-identification of Lost tracks among the detections
        // the primary pass left behind, on appearance alone.
        let lost: Vec<usize> = (0..self.tracks.len())
            .filter(|&i| self.tracks[i].is_lost())
            .collect();

        if !lost.is_empty() && !unmatched_detections.is_empty() {
            let galleries: Vec<&Gallery> =
                lost.iter().map(|&i| &self.tracks[i].gallery).collect();
            let candidates: Vec<&Detection> = unmatched_detections
                .iter()
                .map(|&di| &detections[di])
                .collect();

            let reid_costs = matching::appearance_costs(&galleries, &candidates);
            let reid =
                matching::linear_assignment(&reid_costs, 1.0 - self.config.reid_threshold)?;

            for (ti, ci) in reid.matches {
                let idx = lost[ti];
                let di = unmatched_detections[ci];
                self.tracks[idx].reinstate(&detections[di], &self.kalman_filter, self.frame_id);
                track_matched[idx] = true;
                det_matched[di] = true;
                tracing::debug!(
                    track_id = self.tracks[idx].track_id,
                    frame = self.frame_id,
                    "track re-identified"
                );
            }
        }

        // Step 4: age the unmatched and drop what expired.
        for (i, track) in self.tracks.iter_mut().enumerate() {
            if !track_matched[i] {
                let was_confirmed = track.is_confirmed();
                track.mark_missed(self.config.max_age);
                if was_confirmed && track.is_lost() {
                    tracing::debug!(track_id = track.track_id, frame = self.frame_id, "track lost");
                }
            }
        }
        let frame_id = self.frame_id;
        self.tracks.retain(|t| {
            if t.is_deleted() {
                tracing::debug!(track_id = t.track_id, frame = frame_id, "track deleted");
                false
            } else {
                true
            }
        });

        // Step 5: unclaimed detections start new Tentative tracks.
        for (di, detection) in detections.iter().enumerate() {
            if det_matched[di] {
                continue;
            }
            let track_id = self.next_track_id();
            self.tracks.push(Track::spawn(
                detection,
                track_id,
                &self.kalman_filter,
                self.frame_id,
                self.config.gallery_capacity,
                self.config.confirm_hits,
            ));
        }

        // Step 6: emit Confirmed tracks only.
        Ok(self
            .tracks
            .iter()
            .filter(|t| t.is_confirmed())
            .cloned()
            .collect())
    }

    /// Drop detections whose boxes are non-finite or have no area.
    fn sanitize(&self, detections: Vec<Detection>) -> Vec<Detection> {
        detections
            .into_iter()
            .filter(|det| {
                if det.bbox.is_valid() {
                    true
                } else {
                    tracing::warn!(
                        frame = self.frame_id,
                        bbox = ?det.bbox,
                        "dropping malformed detection"
                    );
                    false
                }
            })
            .collect()
    }

    fn next_track_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// All live tracks, including Tentative and Lost ones.
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Number of frames processed so far.
    pub fn frame_id(&self) -> u32 {
        self.frame_id
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }
}

use ndarray::Array1;
use playertrack_rs::{Detection, PlayerTracker, TrackerConfig};

fn basis(dim: usize, axis: usize) -> Array1<f32> {
    let mut v = Array1::<f32>::zeros(dim);
    v[axis] = 1.0;
    v
}

fn config(max_age: u32) -> TrackerConfig {
    TrackerConfig {
        confirm_hits: 1,
        max_age,
        reid_threshold: 0.85,
        ..TrackerConfig::default()
    }
}

#[test]
fn test_reid_roundtrip_preserves_id() {
    let emb = basis(8, 0);
    let mut tracker = PlayerTracker::new(config(5));

    for i in 0..3 {
        let x = 100.0 + i as f32;
        tracker
            .update(vec![
                Detection::new(x, 100.0, x + 30.0, 160.0, 0.9).with_embedding(emb.clone()),
            ])
            .unwrap();
    }
    let id = tracker.tracks()[0].track_id;

    // Gone for three frames, fewer than max_age.
    for _ in 0..3 {
        assert!(tracker.update(vec![]).unwrap().is_empty());
    }

    // Reappears far away; motion cannot explain the jump but the
    // appearance can.
    let tracks = tracker
        .update(vec![
            Detection::new(400.0, 300.0, 430.0, 360.0, 0.9).with_embedding(emb.clone()),
        ])
        .unwrap();

    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].track_id, id);
    assert_eq!(tracks[0].age, 0);

    // Motion state was reseeded at the new location.
    let rect = tracks[0].rect();
    assert!((rect.x - 400.0).abs() < 1.0);
    assert!((rect.y - 300.0).abs() < 1.0);
}

#[test]
fn test_reid_at_exact_max_age_still_matches() {
    let emb = basis(8, 0);
    let mut tracker = PlayerTracker::new(config(3));

    for _ in 0..2 {
        tracker
            .update(vec![
                Detection::new(100.0, 100.0, 130.0, 160.0, 0.9).with_embedding(emb.clone()),
            ])
            .unwrap();
    }
    let id = tracker.tracks()[0].track_id;

    for _ in 0..3 {
        tracker.update(vec![]).unwrap();
    }
    assert_eq!(tracker.tracks()[0].age, 3); // at the limit, still live

    let tracks = tracker
        .update(vec![
            Detection::new(250.0, 150.0, 280.0, 210.0, 0.9).with_embedding(emb.clone()),
        ])
        .unwrap();
    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].track_id, id);
}

#[test]
fn test_reid_past_max_age_gets_new_id() {
    let emb = basis(8, 0);
    let mut tracker = PlayerTracker::new(config(3));

    for _ in 0..2 {
        tracker
            .update(vec![
                Detection::new(100.0, 100.0, 130.0, 160.0, 0.9).with_embedding(emb.clone()),
            ])
            .unwrap();
    }
    let id = tracker.tracks()[0].track_id;

    // max_age + 1 missed frames: the track is deleted on the last one.
    for _ in 0..4 {
        tracker.update(vec![]).unwrap();
    }
    assert!(tracker.tracks().is_empty());

    // Perfect similarity, but the identity is gone for good.
    let tracks = tracker
        .update(vec![
            Detection::new(100.0, 100.0, 130.0, 160.0, 0.9).with_embedding(emb.clone()),
        ])
        .unwrap();
    assert_eq!(tracks.len(), 1);
    assert_ne!(tracks[0].track_id, id);
}

#[test]
fn test_dissimilar_reappearance_gets_new_id() {
    let mut tracker = PlayerTracker::new(config(5));

    for _ in 0..2 {
        tracker
            .update(vec![
                Detection::new(100.0, 100.0, 130.0, 160.0, 0.9).with_embedding(basis(8, 0)),
            ])
            .unwrap();
    }
    let id = tracker.tracks()[0].track_id;

    for _ in 0..2 {
        tracker.update(vec![]).unwrap();
    }

    // A different-looking object at a new location: similarity 0 is
    // below the threshold, so no reinstatement.
    let tracks = tracker
        .update(vec![
            Detection::new(400.0, 300.0, 430.0, 360.0, 0.9).with_embedding(basis(8, 1)),
        ])
        .unwrap();
    assert_eq!(tracks.len(), 1);
    assert_ne!(tracks[0].track_id, id);
}

#[test]
fn test_two_tracks_never_swap_under_occlusion() {
    let emb_a = basis(8, 0);
    let emb_b = basis(8, 1);
    let mut tracker = PlayerTracker::new(config(5));

    let mut id_a = None;
    let mut id_b = None;

    for t in 1..=50u32 {
        let x = 100.0 + 2.0 * t as f32;
        let mut detections = vec![
            Detection::new(x, 100.0, x + 30.0, 160.0, 0.9).with_embedding(emb_a.clone()),
        ];
        // B drops out for three frames, then returns on its path.
        if !(20..=22).contains(&t) {
            detections.push(
                Detection::new(x, 600.0, x + 30.0, 660.0, 0.9).with_embedding(emb_b.clone()),
            );
        }

        let tracks = tracker.update(detections).unwrap();

        for track in &tracks {
            let (_, cy) = track.rect().center();
            let slot = if cy < 300.0 { &mut id_a } else { &mut id_b };
            let expected = slot.get_or_insert(track.track_id);
            assert_eq!(track.track_id, *expected, "identity changed at frame {t}");
        }

        // A is visible on every frame; B on all but the occluded ones.
        if (20..=22).contains(&t) {
            assert_eq!(tracks.len(), 1);
        } else {
            assert_eq!(tracks.len(), 2, "missing a track at frame {t}");
        }
    }

    assert_ne!(id_a.unwrap(), id_b.unwrap());
}

#[test]
fn test_identical_runs_produce_identical_output() {
    let run = || -> Vec<Vec<(u64, [f32; 4])>> {
        let emb_a = basis(8, 0);
        let emb_b = basis(8, 1);
        let mut tracker = PlayerTracker::new(config(5));
        let mut frames = Vec::new();

        for t in 1..=30u32 {
            let x = 50.0 + 3.0 * t as f32;
            let mut detections = vec![
                Detection::new(x, 80.0, x + 24.0, 140.0, 0.9).with_embedding(emb_a.clone()),
            ];
            if !(12..=14).contains(&t) {
                detections.push(
                    Detection::new(500.0 - x, 400.0, 524.0 - x, 460.0, 0.85)
                        .with_embedding(emb_b.clone()),
                );
            }

            let tracks = tracker.update(detections).unwrap();
            frames.push(
                tracks
                    .iter()
                    .map(|track| (track.track_id, track.to_tlbr()))
                    .collect(),
            );
        }
        frames
    };

    assert_eq!(run(), run());
}

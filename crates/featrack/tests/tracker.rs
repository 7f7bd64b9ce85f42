use featrack::{
    image::{normalize_frame, FrameData, Image, ImageSize, RawFrame},
    FeatureSet, FeatureTracker, TrackInput, TrackerError, TrackerParams, TrackingConfig,
    TrackingMode,
};
use rand::{rngs::StdRng, Rng, SeedableRng};

const SIZE: usize = 120;

// a 30x30 square with four corners and a quadrant reaching the image border
// with a single corner
fn five_corner_scene(shift_x: usize, shift_y: usize) -> Image<u8, 1> {
    five_corner_scene_with_levels(shift_x, shift_y, 0, 255)
}

fn five_corner_scene_with_levels(
    shift_x: usize,
    shift_y: usize,
    background: u8,
    foreground: u8,
) -> Image<u8, 1> {
    let data = (0..SIZE)
        .flat_map(|y| {
            (0..SIZE).map(move |x| {
                let in_square = (20 + shift_x..50 + shift_x).contains(&x)
                    && (20 + shift_y..50 + shift_y).contains(&y);
                let in_quadrant = x >= 90 + shift_x && y >= 90 + shift_y;
                if in_square || in_quadrant {
                    foreground
                } else {
                    background
                }
            })
        })
        .collect();
    Image::new([SIZE, SIZE].into(), data).unwrap()
}

const FIVE_CORNERS: [[f32; 2]; 5] = [
    [20.0, 20.0],
    [49.0, 20.0],
    [20.0, 49.0],
    [49.0, 49.0],
    [90.0, 90.0],
];

fn assert_matches_corners(features: &FeatureSet, expected: &[[f32; 2]], tolerance: f32) {
    assert_eq!(features.len(), expected.len(), "{features:?}");
    for [ex, ey] in expected {
        assert!(
            features
                .iter()
                .any(|[x, y]| (x - ex).abs() <= tolerance && (y - ey).abs() <= tolerance),
            "no feature near ({ex}, {ey}) in {features:?}"
        );
    }
}

fn random_blocks(rng: &mut StdRng, size: ImageSize, block: usize) -> Image<u8, 1> {
    let blocks_x = size.width.div_ceil(block);
    let values = (0..blocks_x * size.height.div_ceil(block))
        .map(|_| rng.random::<u8>())
        .collect::<Vec<_>>();
    let data = (0..size.height)
        .flat_map(|y| {
            let values = &values;
            (0..size.width).map(move |x| values[(y / block) * blocks_x + x / block])
        })
        .collect();
    Image::new(size, data).unwrap()
}

#[test]
fn detect_five_corners() -> Result<(), TrackerError> {
    let tracker = FeatureTracker::new(TrackingConfig::default());
    let features = tracker.detect(&five_corner_scene(0, 0))?;
    assert_matches_corners(&features, &FIVE_CORNERS, 1.0);
    Ok(())
}

#[test]
fn detect_five_corners_harris() -> Result<(), TrackerError> {
    let tracker = FeatureTracker::new(TrackingConfig {
        use_harris: true,
        ..Default::default()
    });
    let features = tracker.detect(&five_corner_scene(0, 0))?;
    assert_matches_corners(&features, &FIVE_CORNERS, 1.0);
    Ok(())
}

#[test]
fn track_identical_frames_round_trip() -> Result<(), TrackerError> {
    let frame = five_corner_scene(0, 0);
    let tracker = FeatureTracker::default();
    let detected = tracker.detect(&frame)?;

    let (tracked, mask) = tracker.track(&frame, &frame, &detected)?;
    assert_eq!(mask, vec![true; 5]);
    assert_eq!(tracked, detected);
    Ok(())
}

#[test]
fn track_shifted_scene() -> Result<(), TrackerError> {
    let previous = five_corner_scene(0, 0);
    let current = five_corner_scene(3, 2);
    let tracker = FeatureTracker::default();
    let detected = tracker.detect(&previous)?;

    let (tracked, mask) = tracker.track(&previous, &current, &detected)?;
    assert_eq!(mask, vec![true; 5]);
    for ([px, py], [nx, ny]) in detected.iter().zip(&tracked) {
        approx::assert_abs_diff_eq!(*nx, px + 3.0, epsilon = 0.1);
        approx::assert_abs_diff_eq!(*ny, py + 2.0, epsilon = 0.1);
    }
    Ok(())
}

#[test]
fn track_low_contrast_round_trip() -> Result<(), TrackerError> {
    let frame = five_corner_scene_with_levels(0, 0, 100, 110);
    let tracker = FeatureTracker::default();
    let detected = tracker.detect(&frame)?;
    assert_matches_corners(&detected, &FIVE_CORNERS, 1.0);

    let (tracked, mask) = tracker.track(&frame, &frame, &detected)?;
    assert_eq!(mask, vec![true; 5]);
    assert_eq!(tracked, detected);
    Ok(())
}

#[test]
fn track_low_contrast_shifted_scene() -> Result<(), TrackerError> {
    let previous = five_corner_scene_with_levels(0, 0, 100, 110);
    let current = five_corner_scene_with_levels(3, 2, 100, 110);
    let tracker = FeatureTracker::default();
    let detected = tracker.detect(&previous)?;

    let (tracked, mask) = tracker.track(&previous, &current, &detected)?;
    assert_eq!(mask, vec![true; 5]);
    for ([px, py], [nx, ny]) in detected.iter().zip(&tracked) {
        approx::assert_abs_diff_eq!(*nx, px + 3.0, epsilon = 0.1);
        approx::assert_abs_diff_eq!(*ny, py + 2.0, epsilon = 0.1);
    }
    Ok(())
}

#[test]
fn track_drops_lost_points_and_keeps_order() -> Result<(), TrackerError> {
    let frame = five_corner_scene(0, 0);
    let tracker = FeatureTracker::default();

    // a flat area and a point outside the frame are lost
    let features = FeatureSet::from_points(vec![
        [49.0, 49.0],
        [70.0, 70.0],
        [20.0, 20.0],
        [-10.0, 5.0],
        [90.0, 90.0],
    ]);
    let (tracked, mask) = tracker.track(&frame, &frame, &features)?;
    assert_eq!(mask, vec![true, false, true, false, true]);
    assert_eq!(
        tracked.points(),
        &[[49.0, 49.0], [20.0, 20.0], [90.0, 90.0]]
    );
    Ok(())
}

#[test]
fn track_empty_features() -> Result<(), TrackerError> {
    let frame = five_corner_scene(0, 0);
    let (tracked, mask) = FeatureTracker::default().track(&frame, &frame, &FeatureSet::new())?;
    assert!(tracked.is_empty());
    assert!(mask.is_empty());
    Ok(())
}

#[test]
fn detect_respects_count_and_spacing() -> Result<(), TrackerError> {
    let mut rng = StdRng::seed_from_u64(7);

    for (max_features, min_distance) in [(25, 10.0f32), (5, 10.0), (250, 3.0), (40, 25.5), (10, 0.0)] {
        let frame = random_blocks(&mut rng, [96, 72].into(), 6);
        let tracker = FeatureTracker::new(TrackingConfig {
            max_features,
            min_distance,
            ..Default::default()
        });
        let features = tracker.detect(&frame)?;

        assert!(!features.is_empty());
        assert!(features.len() <= max_features);
        for (i, [ax, ay]) in features.iter().enumerate() {
            for [bx, by] in features.iter().skip(i + 1) {
                let (dx, dy) = (ax - bx, ay - by);
                assert!(dx * dx + dy * dy >= min_distance * min_distance);
            }
        }
    }
    Ok(())
}

#[test]
fn detect_flat_frame_is_empty() -> Result<(), TrackerError> {
    let tracker = FeatureTracker::default();
    for value in [0, 128, 255] {
        let frame = Image::<u8, 1>::from_size_val([80, 60].into(), value)?;
        assert!(tracker.detect(&frame)?.is_empty());
    }
    Ok(())
}

#[test]
fn detect_zero_features_is_empty() -> Result<(), TrackerError> {
    let tracker = FeatureTracker::new(
        TrackerParams {
            features: 0,
            ..Default::default()
        }
        .into_config(),
    );
    assert!(tracker.detect(&five_corner_scene(0, 0))?.is_empty());
    Ok(())
}

#[test]
fn detect_quality_above_one_is_empty() -> Result<(), TrackerError> {
    let tracker = FeatureTracker::new(
        TrackerParams {
            quality: 1.5,
            ..Default::default()
        }
        .into_config(),
    );
    assert!(tracker.detect(&five_corner_scene(0, 0))?.is_empty());
    Ok(())
}

#[test]
fn process_float_frame_matches_u8_frame() -> Result<(), TrackerError> {
    let gray = five_corner_scene(0, 0);
    let floats = gray
        .as_slice()
        .iter()
        .map(|&v| v as f32 / 255.0)
        .collect::<Vec<_>>();
    let float_frame = RawFrame::new(gray.size(), 1, FrameData::F32(floats))?;
    let u8_frame = RawFrame::from_gray8(&gray);

    let tracker = FeatureTracker::default();
    let from_float = tracker.process(&TrackInput {
        frame: Some(&float_frame),
        ..Default::default()
    })?;
    let from_u8 = tracker.process(&TrackInput {
        frame: Some(&u8_frame),
        ..Default::default()
    })?;

    assert_eq!(normalize_frame(&float_frame)?, gray);
    assert_eq!(from_float, from_u8);
    Ok(())
}

#[test]
fn process_multichannel_frame_uses_first_channel() -> Result<(), TrackerError> {
    let gray = five_corner_scene(0, 0);
    // rgba where only the red channel carries the scene
    let data = gray
        .as_slice()
        .iter()
        .flat_map(|&v| [v as u16, 300, 7, 65535])
        .collect::<Vec<_>>();
    let frame = RawFrame::new(gray.size(), 4, FrameData::U16(data))?;

    let output = FeatureTracker::default().process(&TrackInput {
        frame: Some(&frame),
        ..Default::default()
    })?;
    assert_matches_corners(&output.to_feature_set(), &FIVE_CORNERS, 1.0);
    Ok(())
}

#[test]
fn process_output_lengths_agree() -> Result<(), TrackerError> {
    let scene = RawFrame::from_gray8(&five_corner_scene(0, 0));
    let flat = RawFrame::from_gray8(&Image::from_size_val([SIZE, SIZE].into(), 10)?);
    let features = FeatureSet::from_points(FIVE_CORNERS.to_vec());

    for mode in [TrackingMode::Detect, TrackingMode::Track] {
        let tracker = FeatureTracker::new(TrackingConfig {
            mode,
            ..Default::default()
        });
        for frame in [None, Some(&scene), Some(&flat)] {
            let output = tracker.process(&TrackInput {
                frame,
                previous_frame: Some(&scene),
                previous_features: Some(&features),
            })?;
            assert_eq!(output.tx().len(), output.num_samples());
            assert_eq!(output.ty().len(), output.num_samples());
        }
    }
    Ok(())
}

#[test]
fn process_track_mode_round_trip() -> Result<(), TrackerError> {
    let previous = RawFrame::from_gray8(&five_corner_scene(0, 0));
    let current = RawFrame::from_gray8(&five_corner_scene(3, 2));

    let detected = FeatureTracker::default().process(&TrackInput {
        frame: Some(&previous),
        ..Default::default()
    })?;
    assert_eq!(detected.num_samples(), 5);

    let tracker = FeatureTracker::new(TrackingConfig {
        mode: TrackingMode::Track,
        ..Default::default()
    });
    let previous_features = detected.to_feature_set();
    let tracked = tracker.process(&TrackInput {
        frame: Some(&current),
        previous_frame: Some(&previous),
        previous_features: Some(&previous_features),
    })?;

    assert_eq!(tracked.num_samples(), 5);
    for (x, px) in tracked.tx().iter().zip(detected.tx()) {
        approx::assert_abs_diff_eq!(*x, px + 3.0, epsilon = 0.1);
    }
    for (y, py) in tracked.ty().iter().zip(detected.ty()) {
        approx::assert_abs_diff_eq!(*y, py + 2.0, epsilon = 0.1);
    }
    Ok(())
}

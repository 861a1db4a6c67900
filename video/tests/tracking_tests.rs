use cv_core::{create_filled_image, fill_rect, Rect};
use cv_video::*;
use image::RgbImage;

const BACKGROUND: [u8; 3] = [10, 10, 10];
const QUADRANT_COLORS: [[u8; 3]; 4] = [
    [200, 40, 120],
    [40, 200, 60],
    [60, 90, 220],
    [230, 220, 30],
];

/// Target split into four differently colored quadrants.
fn quadrant_frame(width: u32, height: u32, target: Rect) -> RgbImage {
    let mut frame = create_filled_image(width, height, BACKGROUND);
    let half_w = target.width / 2;
    let half_h = target.height / 2;
    let quadrants = [
        Rect::new(target.x, target.y, half_w, half_h),
        Rect::new(target.x + half_w, target.y, target.width - half_w, half_h),
        Rect::new(target.x, target.y + half_h, half_w, target.height - half_h),
        Rect::new(
            target.x + half_w,
            target.y + half_h,
            target.width - half_w,
            target.height - half_h,
        ),
    ];
    for (rect, color) in quadrants.iter().zip(QUADRANT_COLORS) {
        fill_rect(&mut frame, *rect, color);
    }
    frame
}

fn solid_frame(target: Rect) -> RgbImage {
    let mut frame = create_filled_image(100, 100, BACKGROUND);
    fill_rect(&mut frame, target, QUADRANT_COLORS[0]);
    frame
}

fn within_one_pixel(a: Rect, b: Rect) -> bool {
    (a.x - b.x).abs() <= 1 && (a.y - b.y).abs() <= 1
}

#[test]
fn test_tracks_shifted_target() {
    let start = Rect::new(40, 40, 20, 20);
    let moved = Rect::new(45, 42, 20, 20);

    let mut tracker = MeanShiftTracker::default();
    tracker
        .initialize(&quadrant_frame(100, 100, start), start)
        .unwrap();

    let outcome = tracker
        .track_detailed(&quadrant_frame(100, 100, moved))
        .unwrap();

    assert!(
        within_one_pixel(outcome.rect, moved),
        "tracked {} expected {}",
        outcome.rect,
        moved
    );
    assert!(outcome.converged);
    assert!(outcome.iterations <= tracker.config().max_iterations);
    assert!(outcome.similarity > 0.9);
    assert_eq!(tracker.region(), Some(outcome.rect));
}

#[test]
fn test_solid_block_moves_toward_target() {
    // A flat block has a similarity plateau around the true position. With
    // every step rounded to whole pixels the x step shrinks 1.85 -> 0.88 px
    // and the search settles at (43, 41), so landing within one pixel of
    // (45, 42) is not reachable for this target.
    let start = Rect::new(40, 40, 20, 20);
    let mut tracker = MeanShiftTracker::default();
    tracker.initialize(&solid_frame(start), start).unwrap();

    let rect = tracker
        .track(&solid_frame(Rect::new(45, 42, 20, 20)))
        .unwrap();

    assert!(rect.x > 40 && rect.x <= 45, "x = {}", rect.x);
    assert!(rect.y >= 41 && rect.y <= 42, "y = {}", rect.y);
    assert!((rect.x - 45).abs() <= 2);
}

#[test]
fn test_follows_translating_sequence() {
    let start = Rect::new(40, 40, 20, 20);
    let mut tracker = MeanShiftTracker::default();
    tracker
        .initialize(&quadrant_frame(100, 100, start), start)
        .unwrap();

    for k in 1..=7 {
        let truth = start.translated(2 * k, k);
        let rect = tracker.track(&quadrant_frame(100, 100, truth)).unwrap();
        assert!(
            within_one_pixel(rect, truth),
            "frame {}: tracked {} expected {}",
            k,
            rect,
            truth
        );
    }
}

#[test]
fn test_repeated_tracking_reaches_fixed_point() {
    let start = Rect::new(40, 40, 20, 20);
    let frame = quadrant_frame(100, 100, Rect::new(45, 42, 20, 20));

    let mut tracker = MeanShiftTracker::default();
    tracker
        .initialize(&quadrant_frame(100, 100, start), start)
        .unwrap();

    let first = tracker.track(&frame).unwrap();
    let second = tracker.track_detailed(&frame).unwrap();
    let third = tracker.track_detailed(&frame).unwrap();

    assert_eq!(second.rect, third.rect);
    assert!(within_one_pixel(first, second.rect));
    assert_eq!(third.iterations, 1);
}

#[test]
fn test_solid_block_fixed_point() {
    let start = Rect::new(40, 40, 20, 20);
    let frame = solid_frame(Rect::new(45, 42, 20, 20));

    let mut tracker = MeanShiftTracker::default();
    tracker.initialize(&solid_frame(start), start).unwrap();

    let _ = tracker.track(&frame).unwrap();
    let second = tracker.track(&frame).unwrap();
    let third = tracker.track(&frame).unwrap();
    assert_eq!(second, third);
}

#[test]
fn test_non_square_target() {
    let start = Rect::new(30, 25, 15, 21);
    let moved = Rect::new(34, 22, 15, 21);

    let mut tracker = MeanShiftTracker::default();
    tracker
        .initialize(&quadrant_frame(120, 90, start), start)
        .unwrap();

    let rect = tracker.track(&quadrant_frame(120, 90, moved)).unwrap();
    assert!(within_one_pixel(rect, moved), "tracked {}", rect);
    assert_eq!((rect.width, rect.height), (15, 21));
}

#[test]
fn test_iteration_cap_returns_last_proposal() {
    let start = Rect::new(40, 40, 20, 20);
    let config = TrackerConfig::new().with_max_iterations(1);
    let mut tracker = MeanShiftTracker::new(config).unwrap();
    tracker
        .initialize(&quadrant_frame(100, 100, start), start)
        .unwrap();

    let outcome = tracker
        .track_detailed(&quadrant_frame(100, 100, Rect::new(45, 42, 20, 20)))
        .unwrap();

    assert!(!outcome.converged);
    assert_eq!(outcome.iterations, 1);
    assert!(outcome.rect.x > start.x);
    assert_eq!(tracker.region(), Some(outcome.rect));
}

#[test]
fn test_error_leaves_state_usable() {
    let start = Rect::new(40, 40, 20, 20);
    let mut tracker = MeanShiftTracker::default();
    tracker
        .initialize(&quadrant_frame(100, 100, start), start)
        .unwrap();

    let tiny = create_filled_image(30, 30, BACKGROUND);
    assert!(matches!(
        tracker.track(&tiny),
        Err(VideoError::InvalidRegion(_))
    ));
    assert_eq!(tracker.region(), Some(start));

    let truth = Rect::new(43, 41, 20, 20);
    let rect = tracker.track(&quadrant_frame(100, 100, truth)).unwrap();
    assert!(within_one_pixel(rect, truth));
}

#[test]
fn test_coarser_binning_still_tracks() {
    let start = Rect::new(40, 40, 20, 20);
    let moved = Rect::new(38, 44, 20, 20);
    let config = TrackerConfig::new().with_num_bins(8);
    let mut tracker = MeanShiftTracker::new(config).unwrap();
    tracker
        .initialize(&quadrant_frame(100, 100, start), start)
        .unwrap();

    let rect = tracker.track(&quadrant_frame(100, 100, moved)).unwrap();
    assert!(within_one_pixel(rect, moved), "tracked {}", rect);
}

//! Mean-shift object tracking
//!
//! The target model is built once from the initial frame and rectangle.
//! Every later frame moves the rectangle toward a local maximum of color
//! similarity with a bounded number of closed-form centroid steps.

use cv_core::Rect;
use image::RgbImage;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::TrackerConfig;
use crate::histogram::{BinQuantizer, ColorModel};
use crate::kernel::KernelSupport;
use crate::similarity::similarity_weights;
use crate::{validate_region, Result, VideoError};

/// Tracker interface
pub trait Tracker {
    /// Build the reference model from `rect` in `frame`.
    fn initialize(&mut self, frame: &RgbImage, rect: Rect) -> Result<()>;

    /// Locate the target in `frame`, update the stored rectangle and return it.
    fn track(&mut self, frame: &RgbImage) -> Result<Rect>;
}

/// One mean-shift proposal, in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeanShiftStep {
    pub dx: f64,
    pub dy: f64,
    /// Bhattacharyya coefficient of the candidate the step was computed from.
    pub similarity: f64,
}

impl MeanShiftStep {
    /// Both components under one pixel.
    pub fn is_converged(&self) -> bool {
        self.dx.abs() < 1.0 && self.dy.abs() < 1.0
    }
}

/// Result of tracking one frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrackOutcome {
    pub rect: Rect,
    /// Mean-shift iterations run, at least 1.
    pub iterations: usize,
    /// False when the iteration cap was reached first.
    pub converged: bool,
    pub similarity: f64,
}

/// Weighted centroid displacement of the candidate at `rect`.
///
/// Builds the candidate model, derives the similarity weights and averages
/// the normalized coordinates of the cells inside the kernel support.
pub fn mean_shift_step(
    frame: &RgbImage,
    reference: &ColorModel,
    rect: Rect,
    quantizer: &BinQuantizer,
) -> Result<MeanShiftStep> {
    let candidate = ColorModel::from_region(frame, rect, quantizer)?;
    let weights = similarity_weights(frame, reference, &candidate, rect, quantizer)?;
    let support = KernelSupport::new(rect.height as usize, rect.width as usize);

    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    let mut sum_w = 0.0;

    for row in 0..weights.height() {
        for col in 0..weights.width() {
            if let Some(cell) = support.cell(row, col) {
                let w = weights.get(row, col);
                sum_x += cell.nx * w;
                sum_y += cell.ny * w;
                sum_w += w;
            }
        }
    }

    if !(sum_w > 0.0) || !sum_w.is_finite() {
        return Err(VideoError::DegenerateWeightSum(format!(
            "weight sum {} over region {}",
            sum_w, rect
        )));
    }

    Ok(MeanShiftStep {
        dx: sum_x / sum_w * support.radius_col(),
        dy: sum_y / sum_w * support.radius_row(),
        similarity: reference.bhattacharyya(&candidate),
    })
}

#[derive(Debug, Clone)]
struct TargetState {
    model: ColorModel,
    region: Rect,
}

/// Kernel-based color tracker for a single fixed-size target.
///
/// Not synchronized: one `track` call must complete before the next.
#[derive(Debug, Clone)]
pub struct MeanShiftTracker {
    config: TrackerConfig,
    quantizer: BinQuantizer,
    target: Option<TargetState>,
}

impl Default for MeanShiftTracker {
    fn default() -> Self {
        let config = TrackerConfig::default();
        Self {
            quantizer: config.quantizer(),
            config,
            target: None,
        }
    }
}

impl MeanShiftTracker {
    pub fn new(config: TrackerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            quantizer: config.quantizer(),
            config,
            target: None,
        })
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        self.target.is_some()
    }

    /// Current best estimate of the target rectangle.
    pub fn region(&self) -> Option<Rect> {
        self.target.as_ref().map(|t| t.region)
    }

    pub fn target_model(&self) -> Option<&ColorModel> {
        self.target.as_ref().map(|t| &t.model)
    }

    /// Like [`Tracker::track`], also reporting how the search went.
    ///
    /// The rectangle only ever moves; its size is fixed at initialization.
    /// Proposals are clamped inside the frame. On error the stored rectangle
    /// keeps its last committed position.
    pub fn track_detailed(&mut self, frame: &RgbImage) -> Result<TrackOutcome> {
        let max_iterations = self.config.max_iterations;
        let quantizer = self.quantizer;
        let target = self.target.as_mut().ok_or(VideoError::NotInitialized)?;
        validate_region(frame, target.region)?;

        let (frame_width, frame_height) = frame.dimensions();
        let mut proposal = target.region;
        let mut similarity = 0.0;

        for iteration in 0..max_iterations {
            let current = target.region;
            let step = mean_shift_step(frame, &target.model, current, &quantizer)?;
            similarity = step.similarity;

            proposal = Rect {
                x: (current.x as f64 + step.dx).round() as i32,
                y: (current.y as f64 + step.dy).round() as i32,
                ..current
            }
            .clamped_to(frame_width, frame_height);

            debug!(
                iteration,
                dx = step.dx,
                dy = step.dy,
                x = proposal.x,
                y = proposal.y,
                "mean-shift step"
            );

            // Pinned against a frame edge counts as converged too
            if step.is_converged() || proposal == current {
                target.region = proposal;
                debug!(
                    iterations = iteration + 1,
                    x = proposal.x,
                    y = proposal.y,
                    similarity,
                    "mean-shift converged"
                );
                return Ok(TrackOutcome {
                    rect: proposal,
                    iterations: iteration + 1,
                    converged: true,
                    similarity,
                });
            }

            target.region = proposal;
        }

        warn!(
            max_iterations,
            x = proposal.x,
            y = proposal.y,
            "mean-shift did not converge"
        );

        Ok(TrackOutcome {
            rect: proposal,
            iterations: max_iterations,
            converged: false,
            similarity,
        })
    }
}

impl Tracker for MeanShiftTracker {
    fn initialize(&mut self, frame: &RgbImage, rect: Rect) -> Result<()> {
        validate_region(frame, rect)?;
        let model = ColorModel::from_region(frame, rect, &self.quantizer)?;
        info!(
            x = rect.x,
            y = rect.y,
            width = rect.width,
            height = rect.height,
            num_bins = self.quantizer.num_bins(),
            "target model built"
        );
        self.target = Some(TargetState {
            model,
            region: rect,
        });
        Ok(())
    }

    fn track(&mut self, frame: &RgbImage) -> Result<Rect> {
        self.track_detailed(frame).map(|outcome| outcome.rect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cv_core::{create_filled_image, fill_rect};

    const BACKGROUND: [u8; 3] = [10, 10, 10];
    const TARGET: [u8; 3] = [200, 40, 120];

    fn frame_with_block(block: Rect) -> RgbImage {
        let mut frame = create_filled_image(100, 100, BACKGROUND);
        fill_rect(&mut frame, block, TARGET);
        frame
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let result = MeanShiftTracker::new(TrackerConfig::new().with_num_bins(0));
        assert!(matches!(result, Err(VideoError::InvalidParameters(_))));
    }

    #[test]
    fn test_track_before_initialize() {
        let mut tracker = MeanShiftTracker::default();
        let frame = frame_with_block(Rect::new(40, 40, 20, 20));

        assert!(!tracker.is_initialized());
        assert!(matches!(tracker.track(&frame), Err(VideoError::NotInitialized)));
    }

    #[test]
    fn test_initialize_rejects_bad_regions() {
        let mut tracker = MeanShiftTracker::default();
        let frame = frame_with_block(Rect::new(40, 40, 20, 20));

        for bad in [
            Rect::new(90, 90, 20, 20),
            Rect::new(-3, 10, 20, 20),
            Rect::new(10, 10, 0, 20),
            Rect::new(10, 10, 20, -1),
            Rect::new(i32::MAX - 5, 0, 20, 20),
            Rect::new(0, i32::MAX - 5, 20, 20),
        ] {
            assert!(matches!(
                tracker.initialize(&frame, bad),
                Err(VideoError::InvalidRegion(_))
            ));
        }
        assert!(!tracker.is_initialized());
    }

    #[test]
    fn test_same_frame_converges_immediately() {
        let rect = Rect::new(40, 40, 20, 20);
        let frame = frame_with_block(rect);
        let mut tracker = MeanShiftTracker::default();
        tracker.initialize(&frame, rect).unwrap();

        let outcome = tracker.track_detailed(&frame).unwrap();
        assert_eq!(outcome.rect, rect);
        assert_eq!(outcome.iterations, 1);
        assert!(outcome.converged);
        assert!((outcome.similarity - 1.0).abs() < 1e-9);
        assert_eq!(tracker.region(), Some(rect));
    }

    #[test]
    fn test_zero_step_on_reference_region() {
        let rect = Rect::new(40, 40, 20, 20);
        let frame = frame_with_block(rect);
        let q = TrackerConfig::default().quantizer();
        let model = ColorModel::from_region(&frame, rect, &q).unwrap();

        let step = mean_shift_step(&frame, &model, rect, &q).unwrap();
        assert!(step.dx.abs() < 1e-9);
        assert!(step.dy.abs() < 1e-9);
        assert!(step.is_converged());
    }

    #[test]
    fn test_step_points_toward_target() {
        let rect = Rect::new(40, 40, 20, 20);
        let q = TrackerConfig::default().quantizer();
        let model = ColorModel::from_region(&frame_with_block(rect), rect, &q).unwrap();

        let right = mean_shift_step(&frame_with_block(Rect::new(45, 40, 20, 20)), &model, rect, &q)
            .unwrap();
        assert!(right.dx > 1.0, "dx {}", right.dx);
        assert!(right.dy.abs() < 1e-9);

        let up = mean_shift_step(&frame_with_block(Rect::new(40, 34, 20, 20)), &model, rect, &q)
            .unwrap();
        assert!(up.dy < -1.0, "dy {}", up.dy);
        assert!(up.dx.abs() < 1e-9);
    }

    #[test]
    fn test_size_never_changes() {
        let rect = Rect::new(30, 50, 24, 16);
        let mut tracker = MeanShiftTracker::default();
        tracker.initialize(&frame_with_block(rect), rect).unwrap();

        let moved = tracker
            .track(&frame_with_block(Rect::new(36, 47, 24, 16)))
            .unwrap();
        assert_eq!((moved.width, moved.height), (24, 16));
        assert!(moved.x > 30);
    }

    #[test]
    fn test_minimum_size_region() {
        let rect = Rect::new(4, 4, 2, 2);
        let mut first = create_filled_image(10, 10, BACKGROUND);
        fill_rect(&mut first, rect, TARGET);
        let mut second = create_filled_image(10, 10, BACKGROUND);
        fill_rect(&mut second, Rect::new(5, 4, 2, 2), TARGET);

        let mut a = MeanShiftTracker::default();
        let mut b = MeanShiftTracker::default();
        a.initialize(&first, rect).unwrap();
        b.initialize(&first, rect).unwrap();

        let ra = a.track_detailed(&second).unwrap();
        let rb = b.track_detailed(&second).unwrap();
        assert_eq!(ra, rb);
        assert_eq!((ra.rect.width, ra.rect.height), (2, 2));
        assert!(ra.rect.fits_within(10, 10));
    }

    #[test]
    fn test_clamps_at_frame_edge() {
        // Four-color target: the first step overshoots past the right edge
        let quadrants = |x: i32| {
            let mut frame = create_filled_image(100, 100, BACKGROUND);
            fill_rect(&mut frame, Rect::new(x, 40, 10, 10), [200, 40, 120]);
            fill_rect(&mut frame, Rect::new(x + 10, 40, 10, 10), [40, 200, 60]);
            fill_rect(&mut frame, Rect::new(x, 50, 10, 10), [60, 90, 220]);
            fill_rect(&mut frame, Rect::new(x + 10, 50, 10, 10), [230, 220, 30]);
            frame
        };
        let mut tracker = MeanShiftTracker::default();
        tracker
            .initialize(&quadrants(40), Rect::new(40, 40, 20, 20))
            .unwrap();
        let model = tracker.target_model().unwrap().clone();
        tracker.target = Some(TargetState {
            model,
            region: Rect::new(75, 40, 20, 20),
        });

        let outcome = tracker.track_detailed(&quadrants(80)).unwrap();
        assert_eq!(outcome.rect, Rect::new(80, 40, 20, 20));
        assert!(outcome.converged);
    }

    #[test]
    fn test_smaller_frame_is_invalid_region() {
        let rect = Rect::new(70, 70, 20, 20);
        let mut tracker = MeanShiftTracker::default();
        tracker.initialize(&frame_with_block(rect), rect).unwrap();

        let small = create_filled_image(50, 50, BACKGROUND);
        assert!(matches!(
            tracker.track(&small),
            Err(VideoError::InvalidRegion(_))
        ));
        assert_eq!(tracker.region(), Some(rect));
    }

    #[test]
    fn test_reinitialize_replaces_target() {
        let mut tracker = MeanShiftTracker::default();
        let frame = frame_with_block(Rect::new(40, 40, 20, 20));
        tracker.initialize(&frame, Rect::new(40, 40, 20, 20)).unwrap();
        let first = tracker.target_model().unwrap().clone();

        tracker.initialize(&frame, Rect::new(0, 0, 10, 10)).unwrap();
        assert_eq!(tracker.region(), Some(Rect::new(0, 0, 10, 10)));
        assert_ne!(tracker.target_model().unwrap(), &first);
    }
}

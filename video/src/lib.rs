//! Kernel-based object tracking
//!
//! Tracks a single rectangular target across video frames by repeatedly
//! moving it toward the region whose kernel-weighted color distribution
//! best matches a reference model built from the first frame (mean-shift).

use cv_core::Rect;
use image::RgbImage;

pub mod config;
pub mod histogram;
pub mod kernel;
pub mod similarity;
pub mod tracking;

pub use config::*;
pub use histogram::*;
pub use kernel::*;
pub use similarity::*;
pub use tracking::*;

pub type Result<T> = std::result::Result<T, VideoError>;

#[derive(Debug, thiserror::Error)]
pub enum VideoError {
    #[error("Invalid region: {0}")]
    InvalidRegion(String),

    #[error("Degenerate weight sum: {0}")]
    DegenerateWeightSum(String),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Tracker not initialized")]
    NotInitialized,
}

/// Fail with [`VideoError::InvalidRegion`] unless `rect` is a non-empty
/// sub-grid of `frame`.
pub fn validate_region(frame: &RgbImage, rect: Rect) -> Result<()> {
    let (width, height) = frame.dimensions();
    if rect.is_empty() {
        return Err(VideoError::InvalidRegion(format!(
            "region {} has non-positive size",
            rect
        )));
    }
    if !rect.fits_within(width, height) {
        return Err(VideoError::InvalidRegion(format!(
            "region {} lies outside the {}x{} frame",
            rect, width, height
        )));
    }
    Ok(())
}

/// Row-major grid of real weights covering a rectangle's footprint.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightGrid {
    width: usize,
    height: usize,
    data: Vec<f64>,
}

impl WeightGrid {
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, 0.0)
    }

    pub fn filled(width: usize, height: usize, value: f64) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.width + col]
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.data[row * self.width + col] = value;
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn sum(&self) -> f64 {
        self.data.iter().sum()
    }

    pub fn max(&self) -> f64 {
        self.data.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }
}

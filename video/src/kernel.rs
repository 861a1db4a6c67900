//! Epanechnikov spatial kernel
//!
//! Weights each pixel of a rectangle by its elliptical distance from the
//! rectangle centre. [`KernelSupport`] is the single definition of which
//! cells lie inside the kernel; the mean-shift centroid uses it as well.

use std::f64::consts::PI;

use crate::WeightGrid;

/// Normalized coordinates of a rectangle's cells.
///
/// Cell `(row, col)` maps to `((row - cy) / ry, (col - cx) / rx)` where the
/// centre is taken between pixel centres (`(h - 1) / 2`) and the radii are
/// half the extent (`h / 2`). A cell is inside when the squared normalized
/// radius is below 1, so every footprint of at least 1x1 has a non-empty
/// support.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KernelSupport {
    center_row: f64,
    center_col: f64,
    radius_row: f64,
    radius_col: f64,
}

impl KernelSupport {
    pub fn new(height: usize, width: usize) -> Self {
        Self {
            center_row: (height as f64 - 1.0) / 2.0,
            center_col: (width as f64 - 1.0) / 2.0,
            radius_row: height as f64 / 2.0,
            radius_col: width as f64 / 2.0,
        }
    }

    /// Vertical half-extent in pixels.
    pub fn radius_row(&self) -> f64 {
        self.radius_row
    }

    /// Horizontal half-extent in pixels.
    pub fn radius_col(&self) -> f64 {
        self.radius_col
    }

    /// `(ny, nx)` for a cell, regardless of whether it is inside.
    pub fn normalize(&self, row: usize, col: usize) -> (f64, f64) {
        (
            (row as f64 - self.center_row) / self.radius_row,
            (col as f64 - self.center_col) / self.radius_col,
        )
    }

    /// Normalized coordinates and squared radius of a cell inside the unit
    /// ellipse, `None` outside.
    pub fn cell(&self, row: usize, col: usize) -> Option<SupportCell> {
        let (ny, nx) = self.normalize(row, col);
        let r2 = ny * ny + nx * nx;
        (r2 < 1.0).then_some(SupportCell { ny, nx, r2 })
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        self.cell(row, col).is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SupportCell {
    pub ny: f64,
    pub nx: f64,
    /// `ny² + nx²`, always below 1.
    pub r2: f64,
}

/// Kernel weights for one rectangle footprint plus their total.
#[derive(Debug, Clone)]
pub struct SpatialKernel {
    support: KernelSupport,
    weights: WeightGrid,
    sum: f64,
}

impl SpatialKernel {
    /// `K(i, j) = c * (1 - r²)` inside the support and 0 outside, with
    /// `c = 0.1 * PI * height * width`.
    pub fn epanechnikov(height: usize, width: usize) -> Self {
        let support = KernelSupport::new(height, width);
        let scale = 0.1 * PI * height as f64 * width as f64;
        let mut weights = WeightGrid::new(width, height);
        let mut sum = 0.0;

        for row in 0..height {
            for col in 0..width {
                if let Some(cell) = support.cell(row, col) {
                    let k = scale * (1.0 - cell.r2);
                    weights.set(row, col, k);
                    sum += k;
                }
            }
        }

        Self {
            support,
            weights,
            sum,
        }
    }

    pub fn support(&self) -> &KernelSupport {
        &self.support
    }

    pub fn weights(&self) -> &WeightGrid {
        &self.weights
    }

    pub fn weight(&self, row: usize, col: usize) -> f64 {
        self.weights.get(row, col)
    }

    /// Total of all cell weights.
    pub fn sum(&self) -> f64 {
        self.sum
    }
}

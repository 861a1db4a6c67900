//! Kernel-weighted color histograms
//!
//! A [`ColorModel`] holds one discrete probability distribution per color
//! channel. Each pixel of a region contributes its normalized kernel weight
//! to the bin of its intensity, independently in every channel.

use cv_core::Rect;
use image::RgbImage;

use crate::kernel::SpatialKernel;
use crate::{validate_region, Result, VideoError};

pub const NUM_CHANNELS: usize = 3;

/// Initial value of every bin, keeps later probability ratios finite.
pub const BIN_FLOOR: f64 = 1e-10;

/// Maps channel intensities to histogram bins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinQuantizer {
    num_bins: usize,
    bin_width: u32,
}

impl BinQuantizer {
    /// A zero `bin_width` is treated as 1.
    pub fn new(num_bins: usize, bin_width: u32) -> Self {
        Self {
            num_bins: num_bins.max(1),
            bin_width: bin_width.max(1),
        }
    }

    pub fn num_bins(&self) -> usize {
        self.num_bins
    }

    pub fn bin_width(&self) -> u32 {
        self.bin_width
    }

    /// Bin index of an intensity, clamped to the last bin.
    pub fn bin(&self, value: u8) -> usize {
        ((value as u32 / self.bin_width) as usize).min(self.num_bins - 1)
    }
}

/// Per-channel color distribution of a region.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorModel {
    num_bins: usize,
    // NUM_CHANNELS rows of num_bins, row-major
    bins: Vec<f64>,
}

impl ColorModel {
    /// Build the kernel-weighted model of `rect` inside `frame`.
    pub fn from_region(frame: &RgbImage, rect: Rect, quantizer: &BinQuantizer) -> Result<Self> {
        validate_region(frame, rect)?;

        let height = rect.height as usize;
        let width = rect.width as usize;
        let kernel = SpatialKernel::epanechnikov(height, width);
        let total = kernel.sum();
        if !(total > 0.0) {
            return Err(VideoError::DegenerateWeightSum(format!(
                "kernel over region {} has no mass",
                rect
            )));
        }

        let num_bins = quantizer.num_bins();
        let mut bins = vec![BIN_FLOOR; NUM_CHANNELS * num_bins];

        for row in 0..height {
            let y = (rect.y as usize + row) as u32;
            for col in 0..width {
                let k = kernel.weight(row, col);
                if k == 0.0 {
                    continue;
                }
                let x = (rect.x as usize + col) as u32;
                let pixel = frame.get_pixel(x, y);
                let share = k / total;
                for channel in 0..NUM_CHANNELS {
                    bins[channel * num_bins + quantizer.bin(pixel[channel])] += share;
                }
            }
        }

        let mut model = Self { num_bins, bins };
        model.normalize();
        Ok(model)
    }

    fn normalize(&mut self) {
        for row in self.bins.chunks_exact_mut(self.num_bins) {
            let total: f64 = row.iter().sum();
            for p in row.iter_mut() {
                *p /= total;
            }
        }
    }

    pub fn num_bins(&self) -> usize {
        self.num_bins
    }

    pub fn channel(&self, channel: usize) -> &[f64] {
        let start = channel * self.num_bins;
        &self.bins[start..start + self.num_bins]
    }

    pub fn probability(&self, channel: usize, bin: usize) -> f64 {
        self.bins[channel * self.num_bins + bin]
    }

    /// Bhattacharyya coefficient averaged over channels, in `[0, 1]`.
    ///
    /// 1 means identical distributions. Both models must use the same binning.
    pub fn bhattacharyya(&self, other: &ColorModel) -> f64 {
        let per_channel: f64 = (0..NUM_CHANNELS)
            .map(|c| {
                self.channel(c)
                    .iter()
                    .zip(other.channel(c))
                    .map(|(p, q)| (p * q).sqrt())
                    .sum::<f64>()
            })
            .sum();
        per_channel / NUM_CHANNELS as f64
    }
}

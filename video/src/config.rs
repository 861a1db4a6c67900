//! Tracker configuration

use serde::{Deserialize, Serialize};

use crate::histogram::BinQuantizer;
use crate::{Result, VideoError};

pub const DEFAULT_NUM_BINS: usize = 16;
pub const DEFAULT_INTENSITY_RANGE: u32 = 256;
pub const DEFAULT_MAX_ITERATIONS: usize = 10;

/// Parameters fixed when a tracker is constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Histogram bins per color channel.
    pub num_bins: usize,
    /// Number of distinct intensities per channel.
    pub intensity_range: u32,
    /// Upper bound on mean-shift iterations per frame.
    pub max_iterations: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            num_bins: DEFAULT_NUM_BINS,
            intensity_range: DEFAULT_INTENSITY_RANGE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl TrackerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_num_bins(mut self, num_bins: usize) -> Self {
        self.num_bins = num_bins;
        self
    }

    pub fn with_intensity_range(mut self, intensity_range: u32) -> Self {
        self.intensity_range = intensity_range;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Intensities per bin (`intensity_range / num_bins`).
    ///
    /// Zero when `num_bins` is zero or does not fit in a `u32`.
    pub fn bin_width(&self) -> u32 {
        match u32::try_from(self.num_bins) {
            Ok(bins) if bins > 0 => self.intensity_range / bins,
            _ => 0,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.num_bins == 0 {
            return Err(VideoError::InvalidParameters(
                "num_bins must be at least 1".into(),
            ));
        }
        if self.max_iterations == 0 {
            return Err(VideoError::InvalidParameters(
                "max_iterations must be at least 1".into(),
            ));
        }
        if (self.intensity_range as u64) < self.num_bins as u64 {
            return Err(VideoError::InvalidParameters(format!(
                "intensity_range {} is smaller than num_bins {}",
                self.intensity_range, self.num_bins
            )));
        }
        Ok(())
    }

    pub fn quantizer(&self) -> BinQuantizer {
        BinQuantizer::new(self.num_bins, self.bin_width())
    }
}

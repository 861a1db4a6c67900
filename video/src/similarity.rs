//! Per-pixel similarity weights
//!
//! `w(i, j) = Π_c sqrt(q[c, b] / p[c, b])`, with `q` the reference model,
//! `p` the candidate model and `b` the pixel's bin in channel `c`. Colors
//! the candidate under-represents relative to the reference get weights
//! above 1 and pull the next estimate toward them.

use cv_core::Rect;
use image::RgbImage;

use crate::histogram::{BinQuantizer, ColorModel, NUM_CHANNELS};
use crate::{validate_region, Result, VideoError, WeightGrid};

pub fn similarity_weights(
    frame: &RgbImage,
    reference: &ColorModel,
    candidate: &ColorModel,
    rect: Rect,
    quantizer: &BinQuantizer,
) -> Result<WeightGrid> {
    validate_region(frame, rect)?;
    if reference.num_bins() != candidate.num_bins() || reference.num_bins() != quantizer.num_bins()
    {
        return Err(VideoError::InvalidParameters(format!(
            "bin count mismatch: reference {}, candidate {}, quantizer {}",
            reference.num_bins(),
            candidate.num_bins(),
            quantizer.num_bins()
        )));
    }

    let height = rect.height as usize;
    let width = rect.width as usize;
    let mut weights = WeightGrid::filled(width, height, 1.0);

    for row in 0..height {
        let y = (rect.y as usize + row) as u32;
        for col in 0..width {
            let x = (rect.x as usize + col) as u32;
            let pixel = frame.get_pixel(x, y);

            let mut w = 1.0;
            for channel in 0..NUM_CHANNELS {
                let bin = quantizer.bin(pixel[channel]);
                let p = candidate.probability(channel, bin);
                if !(p > 0.0) {
                    return Err(VideoError::DegenerateWeightSum(format!(
                        "candidate probability {} in channel {} bin {}",
                        p, channel, bin
                    )));
                }
                w *= (reference.probability(channel, bin) / p).sqrt();
            }
            weights.set(row, col, w);
        }
    }

    Ok(weights)
}

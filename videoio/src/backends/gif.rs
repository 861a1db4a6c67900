use crate::{end_of_stream, Result, VideoCapture, VideoError};
use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, DynamicImage, RgbImage};
use std::collections::VecDeque;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

/// Animated GIF source. The whole animation is composited and converted to
/// RGB when opened; frames are handed out in display order.
pub struct GifCapture {
    pending: VecDeque<RgbImage>,
    delays_ms: Vec<u32>,
}

impl std::fmt::Debug for GifCapture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GifCapture")
            .field("frame_count", &self.delays_ms.len())
            .field("remaining", &self.pending.len())
            .finish()
    }
}

impl GifCapture {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let unreadable =
            |e: image::ImageError| VideoError::Backend(format!("{}: {}", path.display(), e));

        let decoder = GifDecoder::new(BufReader::new(File::open(path)?)).map_err(unreadable)?;

        let mut pending = VecDeque::new();
        let mut delays_ms = Vec::new();
        for frame in decoder.into_frames() {
            let frame = frame.map_err(unreadable)?;
            let (numer, denom) = frame.delay().numer_denom_ms();
            delays_ms.push(if denom == 0 { 0 } else { numer / denom });
            // Alpha is dropped; the tracker only looks at color
            pending.push_back(DynamicImage::ImageRgba8(frame.into_buffer()).into_rgb8());
        }

        if pending.is_empty() {
            return Err(VideoError::InvalidParameters(format!(
                "{} holds no frames",
                path.display()
            )));
        }
        debug!(frames = pending.len(), path = %path.display(), "decoded GIF");

        Ok(Self { pending, delays_ms })
    }

    /// Frames in the whole animation, consumed or not.
    pub fn frame_count(&self) -> usize {
        self.delays_ms.len()
    }

    /// Display time of frame `index` in milliseconds.
    pub fn frame_delay_ms(&self, index: usize) -> Option<u32> {
        self.delays_ms.get(index).copied()
    }
}

impl VideoCapture for GifCapture {
    fn is_opened(&self) -> bool {
        !self.delays_ms.is_empty()
    }

    fn grab(&mut self) -> Result<()> {
        if self.pending.is_empty() {
            return Err(end_of_stream());
        }
        Ok(())
    }

    fn retrieve(&mut self) -> Result<RgbImage> {
        self.pending.pop_front().ok_or_else(end_of_stream)
    }
}

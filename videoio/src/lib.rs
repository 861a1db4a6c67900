//! Video input/output
//!
//! Frame sources feeding the tracker (image-sequence directories and
//! animated GIFs) plus an image-sequence writer. Every frame is decoded to
//! 8-bit RGB.

use image::RgbImage;
use std::fmt::Debug;
use std::path::Path;

pub mod backends;

pub use backends::{GifCapture, PngSequenceCapture, PngSequenceWriter};

pub type Result<T> = std::result::Result<T, VideoError>;

#[derive(Debug, thiserror::Error)]
pub enum VideoError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Capture failed: {0}")]
    CaptureFailed(String),
}

pub(crate) fn end_of_stream() -> VideoError {
    VideoError::CaptureFailed("end of stream".to_string())
}

/// Sequential source of decoded frames.
pub trait VideoCapture: Send + Debug {
    fn is_opened(&self) -> bool;
    fn grab(&mut self) -> Result<()>;
    fn retrieve(&mut self) -> Result<RgbImage>;
    fn read(&mut self) -> Result<RgbImage> {
        self.grab()?;
        self.retrieve()
    }
}

/// Sink for frames written in order.
pub trait VideoWriter: Send + Debug {
    fn write(&mut self, frame: &RgbImage) -> Result<()>;
}

/// Open a frame source: a directory is read as an image sequence, a `.gif`
/// file as an animation.
pub fn open_video<P: AsRef<Path>>(path: P) -> Result<Box<dyn VideoCapture>> {
    let path = path.as_ref();
    if path.is_dir() {
        return Ok(Box::new(PngSequenceCapture::new(path)?));
    }

    let is_gif = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("gif"))
        .unwrap_or(false);
    if is_gif {
        return Ok(Box::new(GifCapture::new(path)?));
    }

    Err(VideoError::InvalidParameters(format!(
        "unsupported input {}: expected an image directory or a .gif file",
        path.display()
    )))
}

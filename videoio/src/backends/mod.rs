//! Frame source and sink backends

pub mod gif;
pub mod png_sequence;

pub use gif::GifCapture;
pub use png_sequence::{PngSequenceCapture, PngSequenceWriter};

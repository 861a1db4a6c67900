use crate::{end_of_stream, Result, VideoCapture, VideoError, VideoWriter};
use image::RgbImage;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const FRAME_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

/// Reads every image file of a directory, in file-name order.
#[derive(Debug)]
pub struct PngSequenceCapture {
    paths: Vec<PathBuf>,
    current_idx: usize,
}

impl PngSequenceCapture {
    pub fn new<P: AsRef<Path>>(directory: P) -> Result<Self> {
        let directory = directory.as_ref();
        let mut paths = Vec::new();

        for entry in fs::read_dir(directory)? {
            let path = entry?.path();
            let is_frame = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| {
                    FRAME_EXTENSIONS
                        .iter()
                        .any(|known| e.eq_ignore_ascii_case(known))
                })
                .unwrap_or(false);
            if path.is_file() && is_frame {
                paths.push(path);
            }
        }

        if paths.is_empty() {
            return Err(VideoError::InvalidParameters(format!(
                "no image frames found in {}",
                directory.display()
            )));
        }
        paths.sort();
        debug!(frames = paths.len(), dir = %directory.display(), "opened image sequence");

        Ok(Self {
            paths,
            current_idx: 0,
        })
    }

    pub fn frame_count(&self) -> usize {
        self.paths.len()
    }
}

impl VideoCapture for PngSequenceCapture {
    fn is_opened(&self) -> bool {
        !self.paths.is_empty()
    }

    fn grab(&mut self) -> Result<()> {
        if self.current_idx < self.paths.len() {
            Ok(())
        } else {
            Err(end_of_stream())
        }
    }

    fn retrieve(&mut self) -> Result<RgbImage> {
        let path = self
            .paths
            .get(self.current_idx)
            .ok_or_else(end_of_stream)?;

        let img = image::open(path).map_err(|e| {
            VideoError::Backend(format!("Failed to decode {}: {}", path.display(), e))
        })?;
        self.current_idx += 1;
        Ok(img.into_rgb8())
    }
}

#[derive(Debug)]
pub struct PngSequenceWriter {
    directory: PathBuf,
    prefix: String,
    frame_count: usize,
}

impl PngSequenceWriter {
    pub fn new<P: AsRef<Path>>(directory: P, prefix: &str) -> Result<Self> {
        let directory = directory.as_ref();
        if !directory.exists() {
            fs::create_dir_all(directory)?;
        }

        Ok(Self {
            directory: directory.to_path_buf(),
            prefix: prefix.to_string(),
            frame_count: 0,
        })
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }
}

impl VideoWriter for PngSequenceWriter {
    fn write(&mut self, frame: &RgbImage) -> Result<()> {
        let filename = format!("{}_{:06}.png", self.prefix, self.frame_count);
        let path = self.directory.join(filename);

        frame
            .save(&path)
            .map_err(|e| VideoError::Backend(format!("Failed to save frame: {}", e)))?;
        self.frame_count += 1;
        Ok(())
    }
}

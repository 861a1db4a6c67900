//! Mean-shift color tracking.
//!
//! Facade over the workspace crates:
//!
//! - [`core`]: rectangles and RGB frame helpers
//! - [`video`]: color models, kernel weights and the [`video::MeanShiftTracker`]
//! - [`videoio`]: image-sequence and GIF frame sources
//!
//! ```no_run
//! use cv_meanshift::core::Rect;
//! use cv_meanshift::video::{MeanShiftTracker, Tracker};
//! use cv_meanshift::videoio::open_video;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut source = open_video("frames/")?;
//! let mut tracker = MeanShiftTracker::default();
//! tracker.initialize(&source.read()?, Rect::new(40, 40, 20, 20))?;
//! while source.grab().is_ok() {
//!     let rect = tracker.track(&source.retrieve()?)?;
//!     println!("{rect}");
//! }
//! # Ok(())
//! # }
//! ```

pub use cv_core as core;
pub use cv_video as video;
pub use cv_videoio as videoio;

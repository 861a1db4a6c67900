pub mod geometry;
pub mod image;

pub use self::geometry::*;
pub use self::image::*;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Axis-aligned integer rectangle in frame pixel coordinates.
///
/// `(x, y)` is the top-left corner. The rectangle covers columns
/// `x..x + width` and rows `y..y + height`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// One past the last covered column. Widened so extreme corners cannot overflow.
    pub fn right(&self) -> i64 {
        self.x as i64 + self.width as i64
    }

    /// One past the last covered row.
    pub fn bottom(&self) -> i64 {
        self.y as i64 + self.height as i64
    }

    pub fn area(&self) -> i64 {
        self.width as i64 * self.height as i64
    }

    /// True when either dimension is non-positive.
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Centre in continuous pixel coordinates.
    pub fn center(&self) -> (f64, f64) {
        (
            self.x as f64 + self.width as f64 / 2.0,
            self.y as f64 + self.height as f64 / 2.0,
        )
    }

    /// Whether the rectangle is non-empty and lies entirely inside a
    /// `frame_width × frame_height` frame.
    pub fn fits_within(&self, frame_width: u32, frame_height: u32) -> bool {
        !self.is_empty()
            && self.x >= 0
            && self.y >= 0
            && self.right() <= frame_width as i64
            && self.bottom() <= frame_height as i64
    }

    /// Shift by `(dx, dy)`, saturating at the `i32` limits.
    pub fn translated(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
            ..*self
        }
    }

    /// Move (never resize) the rectangle so it lies inside the frame.
    ///
    /// A rectangle larger than the frame along an axis is pinned to 0 on that axis.
    pub fn clamped_to(&self, frame_width: u32, frame_height: u32) -> Self {
        let max_x = (frame_width as i64 - self.width as i64).max(0) as i32;
        let max_y = (frame_height as i64 - self.height as i64).max(0) as i32;
        Self {
            x: self.x.clamp(0, max_x),
            y: self.y.clamp(0, max_y),
            ..*self
        }
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.x, self.y, self.width, self.height)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseRectError {
    #[error("expected 4 comma-separated integers x,y,w,h, got {0} fields")]
    FieldCount(usize),

    #[error("invalid integer '{0}'")]
    InvalidInteger(String),
}

impl FromStr for Rect {
    type Err = ParseRectError;

    /// Parses `"x,y,w,h"`; whitespace around each field is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split(',').map(str::trim).collect();
        if fields.len() != 4 {
            return Err(ParseRectError::FieldCount(fields.len()));
        }

        let mut values = [0i32; 4];
        for (value, field) in values.iter_mut().zip(&fields) {
            *value = field
                .parse()
                .map_err(|_| ParseRectError::InvalidInteger(field.to_string()))?;
        }

        Ok(Rect::new(values[0], values[1], values[2], values[3]))
    }
}

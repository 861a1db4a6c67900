use crate::Rect;
use image::{ImageBuffer, Rgb, RgbImage};

/// A decoded video frame: 8-bit samples, three independent channels.
pub type Frame = RgbImage;

pub fn create_rgb_image(width: u32, height: u32) -> RgbImage {
    ImageBuffer::new(width, height)
}

/// Frame of the given size filled with a single color.
pub fn create_filled_image(width: u32, height: u32, rgb: [u8; 3]) -> RgbImage {
    ImageBuffer::from_pixel(width, height, Rgb(rgb))
}

pub fn get_pixel_rgb(img: &RgbImage, x: u32, y: u32) -> [u8; 3] {
    img.get_pixel(x, y).0
}

pub fn set_pixel_rgb(img: &mut RgbImage, x: u32, y: u32, rgb: [u8; 3]) {
    img.put_pixel(x, y, Rgb(rgb));
}

/// Paint `rect` with a solid color, clipped to the image.
pub fn fill_rect(img: &mut RgbImage, rect: Rect, rgb: [u8; 3]) {
    let x0 = rect.x.max(0) as i64;
    let y0 = rect.y.max(0) as i64;
    let x1 = rect.right().min(img.width() as i64);
    let y1 = rect.bottom().min(img.height() as i64);

    for y in y0..y1 {
        for x in x0..x1 {
            img.put_pixel(x as u32, y as u32, Rgb(rgb));
        }
    }
}

use image::RgbaImage;

use crate::constants::{MASK_ALPHA_THRESHOLD, MASK_BLACK, MASK_COLOR_THRESHOLD, MASK_WHITE};

/// A pixel is stroke when its alpha is above [`MASK_ALPHA_THRESHOLD`] and
/// its brightest channel is above [`MASK_COLOR_THRESHOLD`]
#[inline]
pub fn is_stroke_pixel(rgba: [u8; 4]) -> bool {
    let brightest = rgba[0].max(rgba[1]).max(rgba[2]);
    rgba[3] > MASK_ALPHA_THRESHOLD && brightest > MASK_COLOR_THRESHOLD
}

/// Whether fully covered paint at opacity `alpha` (0-1) ends up in the mask
pub fn clears_alpha_threshold(alpha: f32) -> bool {
    (alpha.clamp(0.0, 1.0) * 255.0).round() as u8 > MASK_ALPHA_THRESHOLD
}

/// Force every pixel of `image` to opaque white or opaque black in place
pub fn threshold_image(image: &mut RgbaImage) {
    for pixel in image.pixels_mut() {
        pixel.0 = if is_stroke_pixel(pixel.0) {
            MASK_WHITE
        } else {
            MASK_BLACK
        };
    }
}

//! Bringing the overlay to the target size

use image::imageops::{self, FilterType};
use image::RgbaImage;

use crate::constants::ASPECT_EPSILON;
use crate::types::Dimensions;

/// Nearest-neighbour sample of `source` at `target` size.
///
/// Output pixel (x, y) reads source pixel
/// `(floor(x * src_w / target_w), floor(y * src_h / target_h))`.
pub fn sample_nearest(source: &RgbaImage, target: Dimensions) -> RgbaImage {
    let (src_w, src_h) = source.dimensions();
    let scale_x = src_w as f64 / target.width as f64;
    let scale_y = src_h as f64 / target.height as f64;

    let columns: Vec<u32> = (0..target.width)
        .map(|x| ((x as f64 * scale_x).floor() as u32).min(src_w.saturating_sub(1)))
        .collect();

    RgbaImage::from_fn(target.width, target.height, |x, y| {
        let sy = ((y as f64 * scale_y).floor() as u32).min(src_h.saturating_sub(1));
        *source.get_pixel(columns[x as usize], sy)
    })
}

/// The centered part of `source` with the target's aspect ratio.
///
/// Returns None when the ratios already agree within tolerance.
pub fn center_crop(source: Dimensions, target: Dimensions) -> Option<(u32, u32, u32, u32)> {
    let src_ratio = source.aspect_ratio()?;
    let dst_ratio = target.aspect_ratio()?;
    if (src_ratio - dst_ratio).abs() <= ASPECT_EPSILON {
        return None;
    }

    if src_ratio > dst_ratio {
        // Source is wider: trim the sides
        let width = ((source.height as f32 * dst_ratio).round() as u32).clamp(1, source.width);
        Some(((source.width - width) / 2, 0, width, source.height))
    } else {
        let height = ((source.width as f32 / dst_ratio).round() as u32).clamp(1, source.height);
        Some((0, (source.height - height) / 2, source.width, height))
    }
}

/// Bilinear scale of `source` to `target`, center-cropping to the target's
/// aspect ratio first so nothing is stretched
pub fn draw_and_sample(source: &RgbaImage, target: Dimensions) -> RgbaImage {
    let src = Dimensions::new(source.width(), source.height());
    if src == target {
        return source.clone();
    }
    match center_crop(src, target) {
        Some((x, y, w, h)) => {
            let cropped = imageops::crop_imm(source, x, y, w, h).to_image();
            imageops::resize(&cropped, target.width, target.height, FilterType::Triangle)
        }
        None => imageops::resize(source, target.width, target.height, FilterType::Triangle),
    }
}

//! Sizing the drawing buffer to the image's displayed box

use crate::types::Dimensions;

/// Display scale for an image inside a container: `min(cw / w, ch / h, 1)`.
///
/// Images are never shown larger than their original size. Returns None
/// when either the image or the container has no area.
pub fn scale_factor(original: Dimensions, container_width: f32, container_height: f32) -> Option<f32> {
    if original.is_empty() || !(container_width > 0.0 && container_height > 0.0) {
        return None;
    }
    let sx = container_width / original.width as f32;
    let sy = container_height / original.height as f32;
    let factor = sx.min(sy).min(1.0);
    factor.is_finite().then_some(factor)
}

/// Buffer size for an image shown in a container.
///
/// The limiting side is set to the container bound exactly and the other is
/// derived from the original aspect ratio, so the buffer never overflows the
/// container and never exceeds the original size. Each side is at least 1.
pub fn fit_buffer(original: Dimensions, container_width: f32, container_height: f32) -> Option<Dimensions> {
    let factor = scale_factor(original, container_width, container_height)?;
    if factor >= 1.0 {
        return Some(original);
    }

    let sx = container_width / original.width as f32;
    let sy = container_height / original.height as f32;
    let (width, height) = if sx <= sy {
        let width = container_width.floor();
        (width, (width * original.height as f32 / original.width as f32).round())
    } else {
        let height = container_height.floor();
        ((height * original.width as f32 / original.height as f32).round(), height)
    };

    Some(Dimensions::new(
        (width as u32).clamp(1, original.width),
        (height as u32).clamp(1, original.height),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scale_factor_never_upscales() {
        let original = Dimensions::new(400, 300);
        assert_eq!(scale_factor(original, 800.0, 600.0), Some(1.0));
        assert_eq!(scale_factor(original, 200.0, 600.0), Some(0.5));
        assert_eq!(scale_factor(original, 0.0, 600.0), None);
        assert_eq!(scale_factor(Dimensions::new(0, 300), 800.0, 600.0), None);
    }

    #[test]
    fn test_landscape_in_container() {
        let fitted = fit_buffer(Dimensions::new(1920, 1080), 800.0, 600.0).unwrap();
        assert_eq!(fitted, Dimensions::new(800, 450));
        assert!(fitted.width <= 800 && fitted.height <= 600);
        let ratio = fitted.aspect_ratio().unwrap();
        assert!((ratio - 1920.0 / 1080.0).abs() < 0.01);
    }

    #[test]
    fn test_portrait_in_container() {
        let fitted = fit_buffer(Dimensions::new(1000, 2000), 800.0, 600.0).unwrap();
        assert_eq!(fitted, Dimensions::new(300, 600));
    }

    #[test]
    fn test_small_image_keeps_original_size() {
        let original = Dimensions::new(320, 240);
        assert_eq!(fit_buffer(original, 800.0, 600.0), Some(original));
    }
}

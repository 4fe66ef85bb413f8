//! CPU surface for the paint overlay - 8-bit straight-alpha RGBA storage
//!
//! The overlay is what the user sees on top of the photo and what the mask
//! rasterizer later thresholds. It behaves like a 2D canvas backing store:
//! shapes are composited with source-over or destination-out, and resizing
//! discards the contents.

use thiserror::Error;
use tracing::debug;

use crate::constants::MAX_SURFACE_PIXELS;
use crate::raster::{Coverage, PixelRegion, Shape};
use crate::style::{Composite, Paint};
use crate::types::Dimensions;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SurfaceError {
    #[error("Surface size {0} has a zero side")]
    ZeroSized(Dimensions),
    #[error("Cannot allocate a {0} surface")]
    OutOfMemory(Dimensions),
    #[error("Pixel data length mismatch: expected {expected} bytes, got {actual}")]
    DataLength { expected: usize, actual: usize },
}

/// Operations the renderer and mask rasterizer need from a drawing buffer
pub trait DrawingSurface {
    fn dimensions(&self) -> Dimensions;

    fn width(&self) -> u32 {
        self.dimensions().width
    }

    fn height(&self) -> u32 {
        self.dimensions().height
    }

    /// RGBA bytes, row-major, straight alpha
    fn image_data(&self) -> &[u8];

    /// Replace the whole buffer with `data` of the given size
    fn put_image_data(&mut self, size: Dimensions, data: &[u8]) -> Result<(), SurfaceError>;

    /// Make every pixel transparent black
    fn clear(&mut self);

    /// Reallocate at a new size. Contents are discarded.
    fn resize(&mut self, size: Dimensions) -> Result<(), SurfaceError>;

    /// Composite paint through a coverage mask, returning the touched region
    fn composite(&mut self, coverage: &Coverage, paint: Paint) -> PixelRegion;

    /// Rasterize and composite a shape in one step
    fn fill_shape(&mut self, shape: &Shape<'_>, paint: Paint, antialias: bool) -> Option<PixelRegion> {
        let coverage = shape.rasterize(self.dimensions(), antialias)?;
        Some(self.composite(&coverage, paint))
    }

    /// True when any pixel has non-zero alpha
    fn has_visible_pixels(&self) -> bool {
        self.image_data().chunks_exact(4).any(|px| px[3] > 0)
    }
}

/// An 8-bit RGBA CPU surface
pub struct CpuSurface {
    width: u32,
    height: u32,
    /// Row-major, each pixel is [r, g, b, a]
    pixels: Vec<[u8; 4]>,
    /// Union of regions touched since the last `take_dirty_region`
    dirty: Option<PixelRegion>,
}

impl std::fmt::Debug for CpuSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuSurface")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("dirty", &self.dirty)
            .finish_non_exhaustive()
    }
}

impl CpuSurface {
    /// Create a transparent surface
    pub fn new(width: u32, height: u32) -> Result<Self, SurfaceError> {
        let pixels = allocate(Dimensions::new(width, height))?;
        Ok(Self {
            width,
            height,
            pixels,
            dirty: None,
        })
    }

    /// Wrap an existing RGBA image
    pub fn from_rgba_image(image: &image::RgbaImage) -> Result<Self, SurfaceError> {
        let mut surface = Self::new(image.width(), image.height())?;
        surface.put_image_data(Dimensions::new(image.width(), image.height()), image.as_raw())?;
        Ok(surface)
    }

    /// Copy the contents out as an `image` buffer
    pub fn to_rgba_image(&self) -> image::RgbaImage {
        let raw = self.as_bytes().to_vec();
        // Length always matches width * height * 4
        image::RgbaImage::from_raw(self.width, self.height, raw)
            .unwrap_or_else(|| image::RgbaImage::new(self.width, self.height))
    }

    #[inline]
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[self.index(x, y)])
    }

    /// Does nothing if coordinates are out of bounds
    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, color: [u8; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let index = self.index(x, y);
        self.pixels[index] = color;
    }

    /// Source-over: `out_a = src_a + dst_a * (1 - src_a)`
    #[inline]
    pub fn blend_pixel(&mut self, x: u32, y: u32, color: [u8; 3], alpha: f32) {
        if x >= self.width || y >= self.height || alpha <= 0.0 {
            return;
        }
        let index = self.index(x, y);
        self.pixels[index] = source_over(self.pixels[index], color, alpha.min(1.0));
    }

    /// Destination-out: `out_a = dst_a * (1 - src_a)`
    #[inline]
    pub fn erase_pixel(&mut self, x: u32, y: u32, amount: f32) {
        if x >= self.width || y >= self.height || amount <= 0.0 {
            return;
        }
        let index = self.index(x, y);
        self.pixels[index] = destination_out(self.pixels[index], amount.min(1.0));
    }

    /// Raw bytes, suitable for `put_image_data` or PNG encoding
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.pixels.len()
    }

    #[inline]
    pub fn pixels(&self) -> &[[u8; 4]] {
        &self.pixels
    }

    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [[u8; 4]] {
        &mut self.pixels
    }

    /// Region touched since the last call, if any
    pub fn take_dirty_region(&mut self) -> Option<PixelRegion> {
        self.dirty.take()
    }

    fn mark_dirty(&mut self, region: PixelRegion) {
        self.dirty = Some(match self.dirty {
            Some(existing) => existing.union(&region),
            None => region,
        });
    }

    fn whole(&self) -> PixelRegion {
        PixelRegion {
            x: 0,
            y: 0,
            width: self.width,
            height: self.height,
        }
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.width as usize) + (x as usize)
    }
}

impl DrawingSurface for CpuSurface {
    fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }

    fn image_data(&self) -> &[u8] {
        self.as_bytes()
    }

    fn put_image_data(&mut self, size: Dimensions, data: &[u8]) -> Result<(), SurfaceError> {
        let expected = size.pixel_count() as usize * 4;
        if data.len() != expected {
            return Err(SurfaceError::DataLength {
                expected,
                actual: data.len(),
            });
        }
        if size != self.dimensions() {
            self.resize(size)?;
        }
        for (dst, src) in self.pixels.iter_mut().zip(data.chunks_exact(4)) {
            dst.copy_from_slice(src);
        }
        let whole = self.whole();
        self.mark_dirty(whole);
        Ok(())
    }

    fn clear(&mut self) {
        self.pixels.fill([0, 0, 0, 0]);
        let whole = self.whole();
        self.mark_dirty(whole);
    }

    fn resize(&mut self, size: Dimensions) -> Result<(), SurfaceError> {
        let pixels = allocate(size)?;
        debug!(
            "CpuSurface::resize: {}x{} -> {}",
            self.width, self.height, size
        );
        self.width = size.width;
        self.height = size.height;
        self.pixels = pixels;
        self.dirty = Some(self.whole());
        Ok(())
    }

    fn composite(&mut self, coverage: &Coverage, paint: Paint) -> PixelRegion {
        for (x, y, fraction) in coverage.iter() {
            let alpha = paint.alpha * fraction;
            match paint.composite {
                Composite::SourceOver => self.blend_pixel(x, y, paint.color, alpha),
                Composite::DestinationOut => self.erase_pixel(x, y, alpha),
            }
        }
        let region = coverage.region();
        self.mark_dirty(region);
        region
    }
}

fn allocate(size: Dimensions) -> Result<Vec<[u8; 4]>, SurfaceError> {
    if size.is_empty() {
        return Err(SurfaceError::ZeroSized(size));
    }
    if size.pixel_count() > MAX_SURFACE_PIXELS {
        return Err(SurfaceError::OutOfMemory(size));
    }
    let count = usize::try_from(size.pixel_count()).map_err(|_| SurfaceError::OutOfMemory(size))?;
    let mut pixels = Vec::new();
    pixels
        .try_reserve_exact(count)
        .map_err(|_| SurfaceError::OutOfMemory(size))?;
    pixels.resize(count, [0, 0, 0, 0]);
    Ok(pixels)
}

#[inline]
fn to_unit(v: u8) -> f32 {
    v as f32 / 255.0
}

#[inline]
fn to_byte(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn source_over(dst: [u8; 4], color: [u8; 3], src_a: f32) -> [u8; 4] {
    let dst_a = to_unit(dst[3]);
    let out_a = src_a + dst_a * (1.0 - src_a);
    if out_a <= 0.0 {
        return [0, 0, 0, 0];
    }
    let channel = |s: u8, d: u8| {
        let c = (to_unit(s) * src_a + to_unit(d) * dst_a * (1.0 - src_a)) / out_a;
        to_byte(c)
    };
    [
        channel(color[0], dst[0]),
        channel(color[1], dst[1]),
        channel(color[2], dst[2]),
        to_byte(out_a),
    ]
}

fn destination_out(dst: [u8; 4], src_a: f32) -> [u8; 4] {
    let out_a = to_byte(to_unit(dst[3]) * (1.0 - src_a));
    if out_a == 0 {
        return [0, 0, 0, 0];
    }
    [dst[0], dst[1], dst[2], out_a]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Point;

    #[test]
    fn test_new_surface() {
        let surface = CpuSurface::new(100, 50).unwrap();
        assert_eq!(surface.dimensions(), Dimensions::new(100, 50));
        assert_eq!(surface.pixel_count(), 5000);
        assert_eq!(surface.as_bytes().len(), 20000);
        assert!(!surface.has_visible_pixels());
    }

    #[test]
    fn test_zero_and_oversized_surfaces() {
        assert_eq!(
            CpuSurface::new(0, 10).unwrap_err(),
            SurfaceError::ZeroSized(Dimensions::new(0, 10))
        );
        assert!(matches!(
            CpuSurface::new(u32::MAX, u32::MAX),
            Err(SurfaceError::OutOfMemory(_))
        ));
    }

    #[test]
    fn test_get_set_pixel() {
        let mut surface = CpuSurface::new(10, 10).unwrap();
        surface.set_pixel(5, 5, [1, 2, 3, 4]);
        assert_eq!(surface.get_pixel(5, 5), Some([1, 2, 3, 4]));
        assert_eq!(surface.get_pixel(100, 100), None);
    }

    #[test]
    fn test_blend_onto_transparent() {
        let mut surface = CpuSurface::new(4, 4).unwrap();
        surface.blend_pixel(1, 1, [255, 255, 255], 0.7);
        let px = surface.get_pixel(1, 1).unwrap();
        assert_eq!(&px[..3], &[255, 255, 255]);
        assert!((178..=179).contains(&px[3]));
    }

    #[test]
    fn test_blend_accumulates_alpha() {
        let mut surface = CpuSurface::new(4, 4).unwrap();
        surface.blend_pixel(0, 0, [255, 255, 255], 0.5);
        surface.blend_pixel(0, 0, [255, 255, 255], 0.5);
        let px = surface.get_pixel(0, 0).unwrap();
        assert_eq!(px[0], 255);
        // 0.5 + 0.5 * 0.5
        assert!((px[3] as i32 - 191).abs() <= 1);
    }

    #[test]
    fn test_erase_removes_alpha() {
        let mut surface = CpuSurface::new(4, 4).unwrap();
        surface.set_pixel(2, 2, [255, 255, 255, 200]);
        surface.erase_pixel(2, 2, 0.5);
        assert_eq!(surface.get_pixel(2, 2), Some([255, 255, 255, 100]));
        surface.erase_pixel(2, 2, 1.0);
        assert_eq!(surface.get_pixel(2, 2), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_resize_discards_contents() {
        let mut surface = CpuSurface::new(4, 4).unwrap();
        surface.set_pixel(0, 0, [255, 255, 255, 255]);
        surface.resize(Dimensions::new(8, 2)).unwrap();
        assert_eq!(surface.dimensions(), Dimensions::new(8, 2));
        assert!(!surface.has_visible_pixels());
        assert!(surface.resize(Dimensions::new(0, 2)).is_err());
        // Failed resize keeps the old buffer
        assert_eq!(surface.dimensions(), Dimensions::new(8, 2));
    }

    #[test]
    fn test_put_image_data_checks_length() {
        let mut surface = CpuSurface::new(2, 2).unwrap();
        let err = surface
            .put_image_data(Dimensions::new(2, 2), &[0; 15])
            .unwrap_err();
        assert_eq!(
            err,
            SurfaceError::DataLength {
                expected: 16,
                actual: 15
            }
        );

        let data = [9u8; 24];
        surface.put_image_data(Dimensions::new(3, 2), &data).unwrap();
        assert_eq!(surface.dimensions(), Dimensions::new(3, 2));
        assert_eq!(surface.get_pixel(2, 1), Some([9, 9, 9, 9]));
    }

    #[test]
    fn test_fill_shape_tracks_dirty_region() {
        let mut surface = CpuSurface::new(50, 50).unwrap();
        surface.take_dirty_region();

        let shape = Shape::Square {
            center: Point::new(10.0, 10.0),
            half_side: 2.0,
        };
        let region = surface
            .fill_shape(&shape, Paint::source_over([255, 255, 255], 1.0), false)
            .unwrap();
        assert_eq!(surface.take_dirty_region(), Some(region));
        assert_eq!(surface.get_pixel(10, 10), Some([255, 255, 255, 255]));
        assert!(surface.take_dirty_region().is_none());

        surface.fill_shape(&shape, Paint::destination_out(), false);
        assert_eq!(surface.get_pixel(10, 10), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_rgba_image_conversion() {
        let mut surface = CpuSurface::new(3, 2).unwrap();
        surface.set_pixel(2, 1, [10, 20, 30, 40]);
        let image = surface.to_rgba_image();
        assert_eq!(image.get_pixel(2, 1).0, [10, 20, 30, 40]);

        let copy = CpuSurface::from_rgba_image(&image).unwrap();
        assert_eq!(copy.as_bytes(), surface.as_bytes());
    }
}

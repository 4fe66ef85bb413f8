//! Shape coverage for the CPU drawing surface
//!
//! Shapes are rasterized into a [`Coverage`] mask first and composited once.
//! Each pixel stores a bitmask of sub-samples, so the union of overlapping
//! pieces of one shape (segments, joins, caps) is exact and a stroke never
//! paints the same pixel twice.

mod shapes;

pub use shapes::{LineCap, LineJoin, Shape};

use crate::constants::SUPERSAMPLE_GRID;
use crate::types::Dimensions;

/// Rectangle of whole pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRegion {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Smallest region containing both
    pub fn union(&self, other: &PixelRegion) -> PixelRegion {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = (self.x + self.width).max(other.x + other.width);
        let bottom = (self.y + self.height).max(other.y + other.height);
        PixelRegion {
            x,
            y,
            width: right - x,
            height: bottom - y,
        }
    }

    /// Pixel range covering float bounds (min_x, min_y, max_x, max_y),
    /// clamped to the surface. None if nothing remains.
    pub fn from_bounds(bounds: (f32, f32, f32, f32), surface: Dimensions) -> Option<PixelRegion> {
        let (min_x, min_y, max_x, max_y) = bounds;
        if !(min_x.is_finite() && min_y.is_finite() && max_x.is_finite() && max_y.is_finite()) {
            return None;
        }
        let x0 = (min_x.floor().max(0.0) as u32).min(surface.width);
        let y0 = (min_y.floor().max(0.0) as u32).min(surface.height);
        let x1 = (max_x.ceil().max(0.0) as u32).min(surface.width);
        let y1 = (max_y.ceil().max(0.0) as u32).min(surface.height);
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some(PixelRegion {
            x: x0,
            y: y0,
            width: x1 - x0,
            height: y1 - y0,
        })
    }
}

/// Per-pixel sub-sample coverage over a region of a surface
#[derive(Debug, Clone)]
pub struct Coverage {
    region: PixelRegion,
    grid: u32,
    masks: Vec<u16>,
}

impl Coverage {
    /// Empty coverage over `region`. With anti-aliasing each pixel is
    /// sampled on a 4x4 grid, otherwise only at its center.
    pub fn new(region: PixelRegion, antialias: bool) -> Self {
        let grid = if antialias { SUPERSAMPLE_GRID } else { 1 };
        let len = region.width as usize * region.height as usize;
        Self {
            region,
            grid,
            masks: vec![0; len],
        }
    }

    pub fn region(&self) -> PixelRegion {
        self.region
    }

    pub fn samples_per_pixel(&self) -> u32 {
        self.grid * self.grid
    }

    /// Mark every sample inside `bounds` for which `inside` holds
    pub fn stamp<F>(&mut self, bounds: (f32, f32, f32, f32), inside: F)
    where
        F: Fn(f32, f32) -> bool,
    {
        let (min_x, min_y, max_x, max_y) = bounds;
        let r = self.region;
        let x0 = (min_x.floor().max(r.x as f32) as u32).max(r.x);
        let y0 = (min_y.floor().max(r.y as f32) as u32).max(r.y);
        let x1 = (max_x.ceil().max(0.0) as u32).min(r.x + r.width);
        let y1 = (max_y.ceil().max(0.0) as u32).min(r.y + r.height);
        if x0 >= x1 || y0 >= y1 {
            return;
        }

        let step = 1.0 / self.grid as f32;
        for py in y0..y1 {
            for px in x0..x1 {
                let index = ((py - r.y) * r.width + (px - r.x)) as usize;
                let mut mask = self.masks[index];
                for sy in 0..self.grid {
                    let y = py as f32 + (sy as f32 + 0.5) * step;
                    for sx in 0..self.grid {
                        let bit = 1u16 << (sy * self.grid + sx);
                        if mask & bit != 0 {
                            continue;
                        }
                        let x = px as f32 + (sx as f32 + 0.5) * step;
                        if inside(x, y) {
                            mask |= bit;
                        }
                    }
                }
                self.masks[index] = mask;
            }
        }
    }

    /// Covered fraction of the pixel at absolute surface coordinates
    pub fn alpha_at(&self, x: u32, y: u32) -> f32 {
        let r = self.region;
        if x < r.x || y < r.y || x >= r.x + r.width || y >= r.y + r.height {
            return 0.0;
        }
        let index = ((y - r.y) * r.width + (x - r.x)) as usize;
        self.masks[index].count_ones() as f32 / self.samples_per_pixel() as f32
    }

    /// True when no sample is covered
    pub fn is_empty(&self) -> bool {
        self.masks.iter().all(|&m| m == 0)
    }

    /// Covered pixels as (x, y, fraction) in absolute surface coordinates
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32, f32)> + '_ {
        let r = self.region;
        let total = self.samples_per_pixel() as f32;
        self.masks
            .iter()
            .enumerate()
            .filter(|(_, m)| **m != 0)
            .map(move |(i, m)| {
                let i = i as u32;
                (r.x + i % r.width, r.y + i / r.width, m.count_ones() as f32 / total)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_from_bounds_clamps() {
        let surface = Dimensions::new(100, 50);
        let region = PixelRegion::from_bounds((-5.0, 10.2, 20.5, 80.0), surface).unwrap();
        assert_eq!(
            region,
            PixelRegion {
                x: 0,
                y: 10,
                width: 21,
                height: 40
            }
        );

        assert!(PixelRegion::from_bounds((200.0, 0.0, 300.0, 10.0), surface).is_none());
        assert!(PixelRegion::from_bounds((f32::NAN, 0.0, 10.0, 10.0), surface).is_none());
    }

    #[test]
    fn test_region_union() {
        let a = PixelRegion {
            x: 0,
            y: 0,
            width: 10,
            height: 10,
        };
        let b = PixelRegion {
            x: 5,
            y: 20,
            width: 10,
            height: 5,
        };
        assert_eq!(
            a.union(&b),
            PixelRegion {
                x: 0,
                y: 0,
                width: 15,
                height: 25
            }
        );
    }

    #[test]
    fn test_stamp_full_and_partial_pixels() {
        let region = PixelRegion {
            x: 0,
            y: 0,
            width: 4,
            height: 1,
        };
        let mut coverage = Coverage::new(region, true);
        // Left half-plane up to x = 1.5
        coverage.stamp((0.0, 0.0, 4.0, 1.0), |x, _| x < 1.5);

        assert_eq!(coverage.alpha_at(0, 0), 1.0);
        assert_eq!(coverage.alpha_at(1, 0), 0.5);
        assert_eq!(coverage.alpha_at(2, 0), 0.0);
        assert_eq!(coverage.iter().count(), 2);
    }

    #[test]
    fn test_stamp_union_is_exact() {
        let region = PixelRegion {
            x: 0,
            y: 0,
            width: 1,
            height: 1,
        };
        let mut coverage = Coverage::new(region, true);
        coverage.stamp((0.0, 0.0, 1.0, 1.0), |x, _| x < 0.5);
        coverage.stamp((0.0, 0.0, 1.0, 1.0), |x, _| x >= 0.5);
        assert_eq!(coverage.alpha_at(0, 0), 1.0);
    }

    #[test]
    fn test_center_sampling_without_antialias() {
        let region = PixelRegion {
            x: 2,
            y: 2,
            width: 2,
            height: 2,
        };
        let mut coverage = Coverage::new(region, false);
        assert_eq!(coverage.samples_per_pixel(), 1);
        coverage.stamp((2.0, 2.0, 4.0, 4.0), |x, y| x < 3.0 && y < 3.0);
        assert_eq!(coverage.alpha_at(2, 2), 1.0);
        assert_eq!(coverage.alpha_at(3, 2), 0.0);
        assert_eq!(coverage.alpha_at(0, 0), 0.0);
    }
}

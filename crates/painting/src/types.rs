use serde::{Deserialize, Serialize};

/// A position in buffer pixel space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Both coordinates are finite numbers
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn distance_to(&self, other: Point) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Semantic effect of a stroke on the mask
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum StrokeMode {
    /// Adds to the masked-in region
    #[default]
    Draw = 0,
    /// Removes from the masked-in region
    Erase = 1,
}

/// Tip geometry of the brush
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum BrushShape {
    #[default]
    Round = 0,
    Square = 1,
}

/// One pointer-down to pointer-up gesture.
///
/// `brush_size` is the diameter (or side, for square brushes) captured when
/// the stroke started. Later brush changes never touch recorded strokes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub mode: StrokeMode,
    pub brush_size: f32,
    pub brush_shape: BrushShape,
    pub points: Vec<Point>,
}

impl Stroke {
    /// A stroke that renders as a single stamp rather than a polyline.
    ///
    /// Multi-point strokes whose points never leave the first position
    /// (a click with pointer jitter below the recording threshold) count too.
    pub fn is_dot(&self) -> bool {
        match self.points.split_first() {
            Some((first, rest)) => rest.iter().all(|p| p == first),
            None => false,
        }
    }

    /// Axis-aligned bounds of the stroke including the brush extent:
    /// (min_x, min_y, max_x, max_y)
    pub fn bounds(&self) -> Option<(f32, f32, f32, f32)> {
        let first = self.points.first()?;
        let half = self.brush_size / 2.0;
        let mut bounds = (first.x, first.y, first.x, first.y);
        for p in &self.points[1..] {
            bounds.0 = bounds.0.min(p.x);
            bounds.1 = bounds.1.min(p.y);
            bounds.2 = bounds.2.max(p.x);
            bounds.3 = bounds.3.max(p.y);
        }
        Some((
            bounds.0 - half,
            bounds.1 - half,
            bounds.2 + half,
            bounds.3 + half,
        ))
    }
}

/// Pixel dimensions of an image or buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True when either side is zero
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Width over height, or None for an empty size
    pub fn aspect_ratio(&self) -> Option<f32> {
        if self.is_empty() {
            None
        } else {
            Some(self.width as f32 / self.height as f32)
        }
    }

    /// Pixel count, widened so it cannot overflow
    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Scale applied when a stroke recorded in one coordinate space is painted
/// into a buffer of a different size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeTransform {
    pub scale_x: f32,
    pub scale_y: f32,
}

impl Default for StrokeTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl StrokeTransform {
    pub const IDENTITY: Self = Self {
        scale_x: 1.0,
        scale_y: 1.0,
    };

    /// Transform that maps `from` space onto `to` space
    pub fn between(from: Dimensions, to: Dimensions) -> Self {
        if from.is_empty() {
            return Self::IDENTITY;
        }
        Self {
            scale_x: to.width as f32 / from.width as f32,
            scale_y: to.height as f32 / from.height as f32,
        }
    }

    pub fn is_identity(&self) -> bool {
        self.scale_x == 1.0 && self.scale_y == 1.0
    }

    #[inline]
    pub fn apply(&self, point: Point) -> Point {
        Point::new(point.x * self.scale_x, point.y * self.scale_y)
    }

    /// Brush sizes scale by the geometric mean so that a uniform scale is exact
    #[inline]
    pub fn scale_size(&self, size: f32) -> f32 {
        size * (self.scale_x * self.scale_y).sqrt()
    }

    pub fn inverse(&self) -> Self {
        Self {
            scale_x: 1.0 / self.scale_x,
            scale_y: 1.0 / self.scale_y,
        }
    }
}

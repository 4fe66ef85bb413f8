//! Active brush settings
//!
//! The brush is what the next stroke will be recorded with. Strokes copy the
//! settings when they begin, so changing the brush never alters history.

use tracing::debug;

use crate::constants::DEFAULT_BRUSH_SIZE;
use crate::types::{BrushShape, StrokeMode};
use crate::validation::clamp_brush_size;

/// Tool configuration for the next stroke
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrushSettings {
    /// Draw or erase
    pub mode: StrokeMode,
    /// Diameter in buffer pixels
    pub size: f32,
    /// Tip geometry
    pub shape: BrushShape,
}

impl Default for BrushSettings {
    fn default() -> Self {
        Self {
            mode: StrokeMode::Draw,
            size: DEFAULT_BRUSH_SIZE,
            shape: BrushShape::Round,
        }
    }
}

impl BrushSettings {
    /// Create brush settings, clamping the size to the supported range
    pub fn new(mode: StrokeMode, size: f32, shape: BrushShape) -> Self {
        Self {
            mode,
            size: clamp_brush_size(size),
            shape,
        }
    }

    pub fn set_mode(&mut self, mode: StrokeMode) {
        self.mode = mode;
    }

    /// Set the size, clamped to the supported range
    pub fn set_size(&mut self, size: f32) {
        let clamped = clamp_brush_size(size);
        debug!("BrushSettings::set_size: {} -> {}", self.size, clamped);
        self.size = clamped;
    }

    pub fn set_shape(&mut self, shape: BrushShape) {
        self.shape = shape;
    }

    pub fn is_erasing(&self) -> bool {
        self.mode == StrokeMode::Erase
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{MAX_BRUSH_SIZE, MIN_BRUSH_SIZE};

    #[test]
    fn test_default_brush() {
        let brush = BrushSettings::default();
        assert_eq!(brush.mode, StrokeMode::Draw);
        assert_eq!(brush.size, DEFAULT_BRUSH_SIZE);
        assert_eq!(brush.shape, BrushShape::Round);
        assert!(!brush.is_erasing());
    }

    #[test]
    fn test_size_is_clamped() {
        let mut brush = BrushSettings::new(StrokeMode::Erase, 0.0, BrushShape::Square);
        assert_eq!(brush.size, MIN_BRUSH_SIZE);
        assert!(brush.is_erasing());

        brush.set_size(80.0);
        assert_eq!(brush.size, MAX_BRUSH_SIZE);

        brush.set_size(12.5);
        assert_eq!(brush.size, 12.5);
    }
}

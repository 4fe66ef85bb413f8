//! Paint and context style for the drawing surface

use crate::raster::{LineCap, LineJoin};
use crate::types::{BrushShape, StrokeMode};

/// Compositing operator applied when paint lands on the surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Composite {
    /// Paint over existing content
    SourceOver,
    /// Remove existing content where paint lands
    DestinationOut,
}

/// A color plus compositing operator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Paint {
    /// RGB, straight (not premultiplied)
    pub color: [u8; 3],
    /// 0.0 - 1.0
    pub alpha: f32,
    pub composite: Composite,
}

impl Paint {
    pub fn source_over(color: [u8; 3], alpha: f32) -> Self {
        Self {
            color,
            alpha: alpha.clamp(0.0, 1.0),
            composite: Composite::SourceOver,
        }
    }

    /// Full-strength eraser
    pub fn destination_out() -> Self {
        Self {
            color: [0, 0, 0],
            alpha: 1.0,
            composite: Composite::DestinationOut,
        }
    }

    /// Same paint with its alpha scaled by `factor`
    pub fn with_alpha_factor(self, factor: f32) -> Self {
        Self {
            alpha: (self.alpha * factor).clamp(0.0, 1.0),
            ..self
        }
    }
}

/// Drawing context configuration, analogous to a 2D canvas context's state
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaintStyle {
    pub mode: StrokeMode,
    pub shape: BrushShape,
    pub line_width: f32,
    pub join: LineJoin,
    pub cap: LineCap,
    pub paint: Paint,
    /// Multiplies paint alpha for every fill
    pub global_alpha: f32,
}

impl PaintStyle {
    /// Style for a stroke of the given mode and brush.
    ///
    /// Round brushes use round joins and caps; square brushes use miter joins
    /// with butt caps. Draw paints `draw_color` at `draw_alpha`; erase always
    /// removes at full strength.
    pub fn for_brush(
        mode: StrokeMode,
        size: f32,
        shape: BrushShape,
        draw_color: [u8; 3],
        draw_alpha: f32,
    ) -> Self {
        let (join, cap) = match shape {
            BrushShape::Round => (LineJoin::Round, LineCap::Round),
            BrushShape::Square => (LineJoin::Miter, LineCap::Butt),
        };
        let paint = match mode {
            StrokeMode::Draw => Paint::source_over(draw_color, draw_alpha),
            StrokeMode::Erase => Paint::destination_out(),
        };
        Self {
            mode,
            shape,
            line_width: size,
            join,
            cap,
            paint,
            global_alpha: 1.0,
        }
    }

    /// Paint with global alpha folded in
    pub fn effective_paint(&self) -> Paint {
        self.paint.with_alpha_factor(self.global_alpha)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_brush_style() {
        let style = PaintStyle::for_brush(StrokeMode::Draw, 12.0, BrushShape::Round, [255; 3], 0.7);
        assert_eq!(style.join, LineJoin::Round);
        assert_eq!(style.cap, LineCap::Round);
        assert_eq!(style.paint.composite, Composite::SourceOver);
        assert!((style.paint.alpha - 0.7).abs() < 1e-6);
        assert_eq!(style.line_width, 12.0);
    }

    #[test]
    fn test_square_erase_style() {
        let style = PaintStyle::for_brush(StrokeMode::Erase, 8.0, BrushShape::Square, [255; 3], 0.7);
        assert_eq!(style.join, LineJoin::Miter);
        assert_eq!(style.cap, LineCap::Butt);
        assert_eq!(style.paint.composite, Composite::DestinationOut);
        assert_eq!(style.paint.alpha, 1.0);
    }

    #[test]
    fn test_effective_paint_applies_global_alpha() {
        let mut style = PaintStyle::for_brush(StrokeMode::Draw, 5.0, BrushShape::Round, [255; 3], 0.7);
        style.global_alpha = 0.5;
        assert!((style.effective_paint().alpha - 0.35).abs() < 1e-6);
    }
}

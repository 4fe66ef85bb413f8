//! Interactive renderer - paints the stroke log onto the on-screen buffer
//!
//! Every log mutation triggers a full repaint: clear, replay each committed
//! stroke with its own style, then restore the active brush style. While the
//! pointer is down, segments are painted incrementally with the active style
//! so feedback does not wait for the stroke to be committed.

use tracing::debug;

use crate::brush::BrushSettings;
use crate::constants::{DRAW_PAINT_ALPHA, DRAW_PAINT_COLOR, LIVE_SEGMENT_ALPHA};
use crate::raster::{PixelRegion, Shape};
use crate::style::PaintStyle;
use crate::surface::DrawingSurface;
use crate::types::{BrushShape, Point, Stroke, StrokeMode, StrokeTransform};

/// Visual parameters of the overlay
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderSettings {
    pub draw_color: [u8; 3],
    /// Opacity of committed draw strokes
    pub draw_alpha: f32,
    /// Extra factor applied to live draw segments
    pub live_segment_alpha: f32,
    pub antialias: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            draw_color: DRAW_PAINT_COLOR,
            draw_alpha: DRAW_PAINT_ALPHA,
            live_segment_alpha: LIVE_SEGMENT_ALPHA,
            antialias: true,
        }
    }
}

#[derive(Debug)]
pub struct InteractiveRenderer {
    settings: RenderSettings,
    /// Style for live segments; what the context is restored to after a repaint
    active: PaintStyle,
    /// Previous live point in buffer space
    live_last: Option<Point>,
    repaint_count: u64,
}

impl Default for InteractiveRenderer {
    fn default() -> Self {
        Self::new(RenderSettings::default())
    }
}

impl InteractiveRenderer {
    pub fn new(settings: RenderSettings) -> Self {
        let brush = BrushSettings::default();
        Self {
            active: Self::style_for(&settings, brush.mode, brush.size, brush.shape),
            settings,
            live_last: None,
            repaint_count: 0,
        }
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    pub fn set_active_brush(&mut self, brush: &BrushSettings) {
        self.active = Self::style_for(&self.settings, brush.mode, brush.size, brush.shape);
    }

    pub fn active_style(&self) -> &PaintStyle {
        &self.active
    }

    /// Number of full repaints so far
    pub fn repaint_count(&self) -> u64 {
        self.repaint_count
    }

    /// Clear `surface` and replay `strokes` in order.
    ///
    /// `transform` maps the strokes' recording space to the surface. The same
    /// inputs always produce the same pixels.
    pub fn repaint<S: DrawingSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        strokes: &[Stroke],
        transform: StrokeTransform,
    ) {
        surface.clear();
        for stroke in strokes {
            self.paint_stroke(surface, stroke, transform);
        }
        self.repaint_count += 1;
        debug!(
            "InteractiveRenderer::repaint: {} strokes at {} (repaint #{})",
            strokes.len(),
            surface.dimensions(),
            self.repaint_count
        );
    }

    /// Paint one stroke with its own recorded style.
    pub fn paint_stroke<S: DrawingSurface + ?Sized>(
        &self,
        surface: &mut S,
        stroke: &Stroke,
        transform: StrokeTransform,
    ) -> Option<PixelRegion> {
        let size = transform.scale_size(stroke.brush_size);
        let style = Self::style_for(&self.settings, stroke.mode, size, stroke.brush_shape);
        let paint = style.effective_paint();

        if stroke.is_dot() {
            let center = transform.apply(*stroke.points.first()?);
            let half = size / 2.0;
            let shape = match stroke.brush_shape {
                BrushShape::Round => Shape::Circle {
                    center,
                    radius: half,
                },
                BrushShape::Square => Shape::Square {
                    center,
                    half_side: half,
                },
            };
            return surface.fill_shape(&shape, paint, self.settings.antialias);
        }

        let points: Vec<Point> = stroke.points.iter().map(|p| transform.apply(*p)).collect();
        let shape = Shape::Polyline {
            points: &points,
            width: size,
            join: style.join,
            cap: style.cap,
        };
        surface.fill_shape(&shape, paint, self.settings.antialias)
    }

    /// Start live feedback at `point` (buffer space)
    pub fn begin_live(&mut self, point: Point) {
        self.live_last = Some(point);
    }

    /// Paint the segment from the previous live point to `point` with the
    /// active style.
    ///
    /// Draw segments use `live_segment_alpha` as a one-off global alpha;
    /// erase segments remove at full strength.
    pub fn extend_live<S: DrawingSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        point: Point,
    ) -> Option<PixelRegion> {
        let last = self.live_last.replace(point)?;
        let points = [last, point];

        let mut style = self.active;
        if style.mode == StrokeMode::Draw {
            style.global_alpha = self.settings.live_segment_alpha;
        }
        let shape = Shape::Polyline {
            points: &points,
            width: style.line_width,
            join: style.join,
            cap: style.cap,
        };
        // Global alpha applies to this segment only
        surface.fill_shape(&shape, style.effective_paint(), self.settings.antialias)
    }

    pub fn end_live(&mut self) {
        self.live_last = None;
    }

    pub fn is_live(&self) -> bool {
        self.live_last.is_some()
    }

    fn style_for(settings: &RenderSettings, mode: StrokeMode, size: f32, shape: BrushShape) -> PaintStyle {
        PaintStyle::for_brush(mode, size, shape, settings.draw_color, settings.draw_alpha)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::CpuSurface;

    fn stroke(mode: StrokeMode, shape: BrushShape, size: f32, points: &[(f32, f32)]) -> Stroke {
        Stroke {
            mode,
            brush_size: size,
            brush_shape: shape,
            points: points.iter().map(|&(x, y)| Point::new(x, y)).collect(),
        }
    }

    fn hard_edged() -> InteractiveRenderer {
        InteractiveRenderer::new(RenderSettings {
            antialias: false,
            ..Default::default()
        })
    }

    #[test]
    fn test_repaint_is_idempotent() {
        let strokes = vec![
            stroke(StrokeMode::Draw, BrushShape::Round, 10.0, &[(10.0, 10.0), (60.0, 40.0), (20.0, 70.0)]),
            stroke(StrokeMode::Erase, BrushShape::Square, 6.0, &[(30.0, 30.0), (50.0, 30.0)]),
            stroke(StrokeMode::Draw, BrushShape::Square, 8.0, &[(80.0, 80.0)]),
        ];
        let mut renderer = InteractiveRenderer::default();
        let mut a = CpuSurface::new(100, 100).unwrap();
        let mut b = CpuSurface::new(100, 100).unwrap();

        renderer.repaint(&mut a, &strokes, StrokeTransform::IDENTITY);
        renderer.repaint(&mut b, &strokes, StrokeTransform::IDENTITY);
        assert_eq!(a.as_bytes(), b.as_bytes());

        // Painting again over a dirty surface gives the same result
        renderer.repaint(&mut a, &strokes, StrokeTransform::IDENTITY);
        assert_eq!(a.as_bytes(), b.as_bytes());
        assert_eq!(renderer.repaint_count(), 3);
    }

    #[test]
    fn test_polyline_does_not_compound_opacity() {
        // Self-overlapping path: back and forth along the same line
        let strokes = vec![stroke(
            StrokeMode::Draw,
            BrushShape::Round,
            10.0,
            &[(10.0, 50.0), (90.0, 50.0), (10.0, 50.0)],
        )];
        let mut renderer = hard_edged();
        let mut surface = CpuSurface::new(100, 100).unwrap();
        renderer.repaint(&mut surface, &strokes, StrokeTransform::IDENTITY);

        let single = surface.get_pixel(50, 50).unwrap()[3];
        assert!((178..=179).contains(&single));
        assert_eq!(surface.get_pixel(15, 50).unwrap()[3], single);
    }

    #[test]
    fn test_dot_shapes() {
        let mut renderer = hard_edged();
        let mut surface = CpuSurface::new(40, 40).unwrap();

        let round = vec![stroke(StrokeMode::Draw, BrushShape::Round, 10.0, &[(20.0, 20.0)])];
        renderer.repaint(&mut surface, &round, StrokeTransform::IDENTITY);
        assert!(surface.get_pixel(20, 20).unwrap()[3] > 0);
        assert_eq!(surface.get_pixel(15, 15).unwrap()[3], 0);

        let square = vec![stroke(StrokeMode::Draw, BrushShape::Square, 10.0, &[(20.0, 20.0)])];
        renderer.repaint(&mut surface, &square, StrokeTransform::IDENTITY);
        assert!(surface.get_pixel(15, 15).unwrap()[3] > 0);
        assert!(surface.get_pixel(24, 24).unwrap()[3] > 0);
        assert_eq!(surface.get_pixel(26, 20).unwrap()[3], 0);
    }

    #[test]
    fn test_erase_removes_draw() {
        let strokes = vec![
            stroke(StrokeMode::Draw, BrushShape::Square, 20.0, &[(20.0, 20.0)]),
            stroke(StrokeMode::Erase, BrushShape::Square, 4.0, &[(20.0, 20.0)]),
        ];
        let mut renderer = hard_edged();
        let mut surface = CpuSurface::new(40, 40).unwrap();
        renderer.repaint(&mut surface, &strokes, StrokeTransform::IDENTITY);
        assert_eq!(surface.get_pixel(20, 20), Some([0, 0, 0, 0]));
        assert!(surface.get_pixel(12, 12).unwrap()[3] > 0);
    }

    #[test]
    fn test_transform_scales_points_and_size() {
        let strokes = vec![stroke(StrokeMode::Draw, BrushShape::Square, 4.0, &[(10.0, 10.0)])];
        let mut renderer = hard_edged();
        let mut surface = CpuSurface::new(40, 40).unwrap();
        let transform = StrokeTransform {
            scale_x: 2.0,
            scale_y: 2.0,
        };
        renderer.repaint(&mut surface, &strokes, transform);
        // Square of side 8 centered at (20, 20)
        assert!(surface.get_pixel(16, 16).unwrap()[3] > 0);
        assert!(surface.get_pixel(23, 23).unwrap()[3] > 0);
        assert_eq!(surface.get_pixel(24, 20).unwrap()[3], 0);
    }

    #[test]
    fn test_repaint_keeps_active_style() {
        let mut renderer = hard_edged();
        let brush = BrushSettings::new(StrokeMode::Erase, 25.0, BrushShape::Square);
        renderer.set_active_brush(&brush);
        let before = *renderer.active_style();

        let strokes = vec![stroke(StrokeMode::Draw, BrushShape::Round, 5.0, &[(1.0, 1.0)])];
        let mut surface = CpuSurface::new(10, 10).unwrap();
        renderer.repaint(&mut surface, &strokes, StrokeTransform::IDENTITY);

        assert_eq!(*renderer.active_style(), before);
        assert_eq!(before.mode, StrokeMode::Erase);
        assert_eq!(before.line_width, 25.0);
    }

    #[test]
    fn test_live_draw_segment_uses_reduced_alpha() {
        let mut renderer = hard_edged();
        let mut surface = CpuSurface::new(50, 50).unwrap();

        renderer.begin_live(Point::new(10.0, 25.0));
        assert!(renderer.is_live());
        renderer.extend_live(&mut surface, Point::new(40.0, 25.0)).unwrap();

        // 0.7 * 0.5 of 255
        let alpha = surface.get_pixel(25, 25).unwrap()[3];
        assert!((88..=90).contains(&alpha));
        // The global alpha reset leaves the active paint untouched
        assert_eq!(renderer.active_style().global_alpha, 1.0);

        renderer.end_live();
        assert!(renderer.extend_live(&mut surface, Point::new(1.0, 1.0)).is_none());
    }

    #[test]
    fn test_live_erase_segment_is_full_strength() {
        let mut renderer = hard_edged();
        renderer.set_active_brush(&BrushSettings::new(StrokeMode::Erase, 10.0, BrushShape::Round));
        let mut surface = CpuSurface::new(50, 50).unwrap();
        surface.pixels_mut().fill([255, 255, 255, 255]);

        renderer.begin_live(Point::new(10.0, 25.0));
        renderer.extend_live(&mut surface, Point::new(40.0, 25.0));
        assert_eq!(surface.get_pixel(25, 25), Some([0, 0, 0, 0]));
        assert_eq!(surface.get_pixel(25, 5), Some([255, 255, 255, 255]));
    }
}

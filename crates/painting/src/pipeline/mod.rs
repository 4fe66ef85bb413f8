//! Painting pipeline
//!
//! Connects the pieces of the editor core for one image:
//! - Input in buffer coordinates via `begin_stroke`, `stroke_to`, `end_stroke`
//! - The stroke log (source of truth)
//! - The interactive renderer and its CPU surface (what the user sees)
//! - The mask rasterizer on save
//!
//! Strokes are recorded in "log space", the buffer size the pipeline was
//! created with. After a resize the renderer maps log space onto the new
//! buffer, so the log itself never changes.

mod stroke;
mod surface_ops;
mod undo;

use tracing::debug;

use crate::brush::BrushSettings;
use crate::log::{StrokeLog, StrokeLogEvent};
use crate::renderer::{InteractiveRenderer, RenderSettings};
use crate::surface::{CpuSurface, DrawingSurface, SurfaceError};
use crate::types::{BrushShape, Dimensions, StrokeMode, StrokeTransform};

pub struct PaintingPipeline {
    pub(crate) surface: CpuSurface,
    pub(crate) renderer: InteractiveRenderer,
    pub(crate) log: StrokeLog,
    pub(crate) brush: BrushSettings,
    pub(crate) log_space: Dimensions,
}

impl std::fmt::Debug for PaintingPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaintingPipeline")
            .field("buffer", &self.surface.dimensions())
            .field("log_space", &self.log_space)
            .field("log", &self.log)
            .field("brush", &self.brush)
            .finish()
    }
}

impl PaintingPipeline {
    /// Create a pipeline with an empty log and a transparent buffer
    pub fn new(width: u32, height: u32, settings: RenderSettings) -> Result<Self, SurfaceError> {
        let surface = CpuSurface::new(width, height)?;
        let brush = BrushSettings::default();
        let mut renderer = InteractiveRenderer::new(settings);
        renderer.set_active_brush(&brush);
        Ok(Self {
            surface,
            renderer,
            log: StrokeLog::new(),
            brush,
            log_space: Dimensions::new(width, height),
        })
    }

    pub fn with_default_settings(width: u32, height: u32) -> Result<Self, SurfaceError> {
        Self::new(width, height, RenderSettings::default())
    }

    pub fn width(&self) -> u32 {
        self.surface.width()
    }

    pub fn height(&self) -> u32 {
        self.surface.height()
    }

    /// Current buffer size
    pub fn dimensions(&self) -> Dimensions {
        self.surface.dimensions()
    }

    /// The space strokes are recorded in
    pub fn log_space(&self) -> Dimensions {
        self.log_space
    }

    /// Maps log space onto the current buffer
    pub fn transform(&self) -> StrokeTransform {
        StrokeTransform::between(self.log_space, self.surface.dimensions())
    }

    pub fn surface(&self) -> &CpuSurface {
        &self.surface
    }

    pub fn log(&self) -> &StrokeLog {
        &self.log
    }

    pub fn renderer(&self) -> &InteractiveRenderer {
        &self.renderer
    }

    /// Forward stroke log events to `listener`
    pub fn add_event_listener<F>(&mut self, listener: F)
    where
        F: Fn(StrokeLogEvent) + Send + Sync + 'static,
    {
        self.log.add_event_listener(listener);
    }

    pub fn brush(&self) -> &BrushSettings {
        &self.brush
    }

    /// Replace the active brush. Recorded strokes keep their own settings.
    pub fn set_brush(&mut self, brush: BrushSettings) {
        self.brush = BrushSettings::new(brush.mode, brush.size, brush.shape);
        self.apply_brush();
    }

    pub fn set_mode(&mut self, mode: StrokeMode) {
        self.brush.set_mode(mode);
        self.apply_brush();
    }

    pub fn set_brush_size(&mut self, size: f32) {
        self.brush.set_size(size);
        self.apply_brush();
    }

    pub fn set_brush_shape(&mut self, shape: BrushShape) {
        self.brush.set_shape(shape);
        self.apply_brush();
    }

    fn apply_brush(&mut self) {
        debug!("PaintingPipeline::apply_brush: {:?}", self.brush);
        self.renderer.set_active_brush(&self.brush);
        // A stroke in progress keeps its live feedback until it ends
        if !self.log.is_recording() {
            self.repaint();
        }
    }
}

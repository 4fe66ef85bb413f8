//! Buffer-level operations for the painting pipeline

use tracing::info;

use crate::mask::{BinaryMask, MaskError, MaskRasterizer};
use crate::raster::PixelRegion;
use crate::surface::{DrawingSurface, SurfaceError};
use crate::types::{Dimensions, Stroke};
use crate::validation::StrokeError;

use super::PaintingPipeline;

impl PaintingPipeline {
    /// Clear the buffer and replay the whole log onto it
    pub fn repaint(&mut self) {
        let transform = self.transform();
        self.renderer
            .repaint(&mut self.surface, self.log.snapshot(), transform);
    }

    /// Resize the buffer and replay the log at the new resolution.
    ///
    /// On error the buffer keeps its previous size and contents.
    pub fn resize(&mut self, size: Dimensions) -> Result<(), SurfaceError> {
        if size == self.surface.dimensions() {
            return Ok(());
        }
        self.surface.resize(size)?;
        info!(
            "PaintingPipeline::resize: buffer {} (log space {})",
            size, self.log_space
        );
        self.renderer.end_live();
        self.log.cancel_stroke();
        self.repaint();
        Ok(())
    }

    /// Replace the log with strokes recorded in log space and repaint
    pub fn load_strokes(&mut self, strokes: Vec<Stroke>) -> Result<(), StrokeError> {
        self.renderer.end_live();
        self.log.load(strokes)?;
        self.repaint();
        Ok(())
    }

    /// True when the buffer has any visible paint
    pub fn has_paint(&self) -> bool {
        self.surface.has_visible_pixels()
    }

    /// Region changed since the last call, for partial presentation
    pub fn take_dirty_region(&mut self) -> Option<PixelRegion> {
        self.surface.take_dirty_region()
    }

    /// Build the binary mask for an image of size `target`
    pub fn rasterize_mask(
        &self,
        rasterizer: &MaskRasterizer,
        target: Dimensions,
    ) -> Result<BinaryMask, MaskError> {
        rasterizer.rasterize(&self.surface, self.log.snapshot(), self.log_space, target)
    }
}

use tracing::{debug, info, warn};

use crate::constants::MAX_SURFACE_PIXELS;
use crate::renderer::{InteractiveRenderer, RenderSettings};
use crate::surface::{CpuSurface, DrawingSurface, SurfaceError};
use crate::types::{Dimensions, Stroke, StrokeTransform};

use super::encode::BinaryMask;
use super::resample::{draw_and_sample, sample_nearest};
use super::threshold::threshold_image;
use super::{MaskError, MaskSettings, ResampleStrategy};

/// Produces binary masks from the on-screen overlay
#[derive(Debug, Clone, Default)]
pub struct MaskRasterizer {
    settings: MaskSettings,
    render: RenderSettings,
}

impl MaskRasterizer {
    /// `render` is only used by [`ResampleStrategy::Replay`], which paints
    /// the strokes again at target size
    pub fn new(settings: MaskSettings, render: RenderSettings) -> Self {
        Self { settings, render }
    }

    pub fn settings(&self) -> &MaskSettings {
        &self.settings
    }

    /// Build the mask for an image of size `target`.
    ///
    /// `surface` is the on-screen overlay. `strokes` and `log_space` (the
    /// coordinate space the strokes were recorded in) are needed for replay.
    /// Fails with `EmptyMask` when the overlay has no visible pixel, or when
    /// no pixel survives thresholding.
    pub fn rasterize<S: DrawingSurface + ?Sized>(
        &self,
        surface: &S,
        strokes: &[Stroke],
        log_space: Dimensions,
        target: Dimensions,
    ) -> Result<BinaryMask, MaskError> {
        if target.is_empty() {
            return Err(MaskError::ZeroDimensions);
        }
        if target.pixel_count() > MAX_SURFACE_PIXELS {
            return Err(SurfaceError::OutOfMemory(target).into());
        }
        if !surface.has_visible_pixels() {
            debug!("MaskRasterizer::rasterize: overlay is empty");
            return Err(MaskError::EmptyMask);
        }

        let mut image = match self.settings.strategy {
            ResampleStrategy::Nearest => sample_nearest(&overlay_image(surface)?, target),
            ResampleStrategy::DrawAndSample => draw_and_sample(&overlay_image(surface)?, target),
            ResampleStrategy::Replay => {
                let mut canvas = CpuSurface::new(target.width, target.height)?;
                let mut renderer = InteractiveRenderer::new(self.render);
                renderer.repaint(&mut canvas, strokes, StrokeTransform::between(log_space, target));
                canvas.to_rgba_image()
            }
        };

        threshold_image(&mut image);
        let mask = BinaryMask::from_thresholded(image);
        if mask.white_count() == 0 {
            warn!("MaskRasterizer::rasterize: overlay paint is below the mask thresholds");
            return Err(MaskError::EmptyMask);
        }
        info!(
            "MaskRasterizer::rasterize: {} mask via {:?}, {} white pixels",
            target,
            self.settings.strategy,
            mask.white_count()
        );
        Ok(mask)
    }
}

fn overlay_image<S: DrawingSurface + ?Sized>(surface: &S) -> Result<image::RgbaImage, MaskError> {
    let size = surface.dimensions();
    let data = surface.image_data();
    image::RgbaImage::from_raw(size.width, size.height, data.to_vec()).ok_or(
        MaskError::Surface(SurfaceError::DataLength {
            expected: size.pixel_count() as usize * 4,
            actual: data.len(),
        }),
    )
}

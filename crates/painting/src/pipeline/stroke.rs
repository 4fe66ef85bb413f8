//! Stroke input for the painting pipeline

use tracing::debug;

use crate::raster::PixelRegion;
use crate::types::Point;
use crate::validation::StrokeError;

use super::PaintingPipeline;

impl PaintingPipeline {
    /// Begin a stroke at `point` (buffer coordinates) with the active brush.
    ///
    /// A stroke left open (e.g. the pointer-up was lost) is committed first.
    pub fn begin_stroke(&mut self, point: Point) -> Result<(), StrokeError> {
        if self.log.is_recording() {
            debug!("PaintingPipeline::begin_stroke: committing dangling stroke");
            self.end_stroke();
        }

        let to_log = self.transform().inverse();
        let brush_size = to_log.scale_size(self.brush.size);
        self.log.begin_stroke(
            self.brush.mode,
            brush_size,
            self.brush.shape,
            to_log.apply(point),
        )?;
        self.renderer.begin_live(point);
        Ok(())
    }

    /// Continue the open stroke to `point` (buffer coordinates) and paint
    /// the new segment.
    ///
    /// Returns the painted region, or None when the point was a duplicate.
    pub fn stroke_to(&mut self, point: Point) -> Result<Option<PixelRegion>, StrokeError> {
        let to_log = self.transform().inverse();
        let recorded = self.log.extend_stroke(to_log.apply(point))?;
        if !recorded {
            return Ok(None);
        }
        Ok(self.renderer.extend_live(&mut self.surface, point))
    }

    /// Commit the open stroke and repaint from the log.
    ///
    /// Returns the index of the committed stroke.
    pub fn end_stroke(&mut self) -> Option<usize> {
        self.renderer.end_live();
        let index = self.log.commit_stroke();
        if index.is_some() {
            self.repaint();
        }
        index
    }

    /// Drop the open stroke and repaint, removing its live feedback
    pub fn cancel_stroke(&mut self) {
        self.renderer.end_live();
        if self.log.cancel_stroke() {
            self.repaint();
        }
    }

    pub fn is_stroking(&self) -> bool {
        self.log.is_recording()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::DrawingSurface;
    use crate::types::Dimensions;

    #[test]
    fn test_stroke_to_without_begin_is_rejected() {
        let mut pipeline = PaintingPipeline::with_default_settings(64, 64).unwrap();
        assert_eq!(
            pipeline.stroke_to(Point::new(5.0, 5.0)),
            Err(StrokeError::NoActiveStroke)
        );
        assert!(!pipeline.has_paint());
        assert_eq!(pipeline.end_stroke(), None);
    }

    #[test]
    fn test_begin_commits_dangling_stroke() {
        let mut pipeline = PaintingPipeline::with_default_settings(64, 64).unwrap();
        pipeline.begin_stroke(Point::new(5.0, 5.0)).unwrap();
        pipeline.stroke_to(Point::new(20.0, 5.0)).unwrap();
        pipeline.begin_stroke(Point::new(40.0, 40.0)).unwrap();
        assert_eq!(pipeline.log().len(), 1);
        pipeline.end_stroke();
        assert_eq!(pipeline.log().len(), 2);
    }

    #[test]
    fn test_strokes_after_resize_are_recorded_in_log_space() {
        let mut pipeline = PaintingPipeline::with_default_settings(100, 50).unwrap();
        pipeline.resize(Dimensions::new(200, 100)).unwrap();
        assert_eq!(pipeline.dimensions(), Dimensions::new(200, 100));

        pipeline.begin_stroke(Point::new(40.0, 20.0)).unwrap();
        pipeline.end_stroke();

        let stroke = &pipeline.log().snapshot()[0];
        assert_eq!(stroke.points[0], Point::new(20.0, 10.0));
        // Default brush of 10 buffer pixels is 5 in log space
        assert!((stroke.brush_size - 5.0).abs() < 1e-4);
        assert!(pipeline.surface().get_pixel(40, 20).unwrap()[3] > 0);
        assert_eq!(pipeline.surface().dimensions(), Dimensions::new(200, 100));
    }
}

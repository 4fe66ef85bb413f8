//! Recorder for the stroke currently being drawn.

use tracing::debug;

use crate::constants::MIN_POINT_DISTANCE;
use crate::types::{BrushShape, Point, Stroke, StrokeMode};
use crate::validation::{validate_brush_size, validate_point, StrokeError};

use super::events::StrokeLogEvent;

/// Holds the in-progress stroke between pointer down and pointer up.
///
/// Points closer than [`MIN_POINT_DISTANCE`] to the previous point are
/// skipped, so a click with a little pointer jitter still records as a dot.
///
/// # Example
///
/// ```ignore
/// let mut recorder = StrokeRecorder::new();
/// recorder.start(StrokeMode::Draw, 10.0, BrushShape::Round, Point::new(5.0, 5.0))?;
/// recorder.add_point(Point::new(6.0, 5.0))?;
/// let stroke = recorder.finish().unwrap();
/// ```
#[derive(Debug, Default)]
pub struct StrokeRecorder {
    current: Option<Stroke>,
}

impl StrokeRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_recording(&self) -> bool {
        self.current.is_some()
    }

    /// The stroke being recorded, if any
    pub fn current(&self) -> Option<&Stroke> {
        self.current.as_ref()
    }

    /// Open a stroke. Settings are captured now and never change afterwards.
    pub fn start(
        &mut self,
        mode: StrokeMode,
        brush_size: f32,
        brush_shape: BrushShape,
        first_point: Point,
    ) -> Result<StrokeLogEvent, StrokeError> {
        if self.current.is_some() {
            return Err(StrokeError::StrokeInProgress);
        }
        validate_brush_size(brush_size)?;
        validate_point(first_point)?;

        self.current = Some(Stroke {
            mode,
            brush_size,
            brush_shape,
            points: vec![first_point],
        });

        Ok(StrokeLogEvent::StrokeStarted { mode, brush_size })
    }

    /// Append a point to the open stroke.
    ///
    /// Returns false when the point was skipped as a duplicate.
    pub fn add_point(&mut self, point: Point) -> Result<bool, StrokeError> {
        let stroke = self.current.as_mut().ok_or(StrokeError::NoActiveStroke)?;
        validate_point(point)?;

        if let Some(last) = stroke.points.last() {
            if last.distance_to(point) < MIN_POINT_DISTANCE {
                debug!("StrokeRecorder::add_point: skipping duplicate point");
                return Ok(false);
            }
        }
        stroke.points.push(point);
        Ok(true)
    }

    /// Close the open stroke and hand it over.
    pub fn finish(&mut self) -> Option<Stroke> {
        self.current.take()
    }

    /// Drop the open stroke.
    ///
    /// Returns a `StrokeCancelled` event when there was one.
    pub fn abort(&mut self) -> Option<StrokeLogEvent> {
        self.current.take().map(|stroke| StrokeLogEvent::StrokeCancelled {
            point_count: stroke.points.len(),
        })
    }

    pub fn point_count(&self) -> usize {
        self.current.as_ref().map_or(0, |s| s.points.len())
    }
}

//! Ordered stroke storage with undo and clear.

use tracing::{debug, warn};

use crate::types::{BrushShape, Point, Stroke, StrokeMode};
use crate::validation::{validate_stroke, StrokeError};

use super::events::StrokeLogEvent;
use super::recorder::StrokeRecorder;

/// The source of truth for what has been drawn.
///
/// Committed strokes form a stack: replay order is paint order, undo removes
/// the most recent one. At most one stroke is in progress at a time.
pub struct StrokeLog {
    strokes: Vec<Stroke>,
    recorder: StrokeRecorder,
    #[allow(clippy::type_complexity)]
    event_listeners: Vec<Box<dyn Fn(StrokeLogEvent) + Send + Sync>>,
}

impl std::fmt::Debug for StrokeLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrokeLog")
            .field("stroke_count", &self.strokes.len())
            .field("recording", &self.recorder.is_recording())
            .field("listener_count", &self.event_listeners.len())
            .finish()
    }
}

impl Default for StrokeLog {
    fn default() -> Self {
        Self {
            strokes: Vec::new(),
            recorder: StrokeRecorder::new(),
            event_listeners: Vec::new(),
        }
    }
}

impl StrokeLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new stroke at `first_point`.
    ///
    /// Fails with `StrokeInProgress` if one is already open.
    pub fn begin_stroke(
        &mut self,
        mode: StrokeMode,
        brush_size: f32,
        brush_shape: BrushShape,
        first_point: Point,
    ) -> Result<(), StrokeError> {
        let event = self.recorder.start(mode, brush_size, brush_shape, first_point)?;
        debug!(
            "StrokeLog::begin_stroke: {:?} size={} at ({}, {})",
            mode, brush_size, first_point.x, first_point.y
        );
        self.emit_event(event);
        Ok(())
    }

    /// Append a point to the open stroke.
    ///
    /// Without an open stroke this is a no-op that logs a warning and
    /// returns `NoActiveStroke`.
    pub fn extend_stroke(&mut self, point: Point) -> Result<bool, StrokeError> {
        match self.recorder.add_point(point) {
            Err(StrokeError::NoActiveStroke) => {
                warn!("StrokeLog::extend_stroke: no stroke in progress, ignoring point");
                Err(StrokeError::NoActiveStroke)
            }
            other => other,
        }
    }

    /// Append the open stroke to the log.
    ///
    /// Returns the index of the committed stroke, or None if nothing was open.
    pub fn commit_stroke(&mut self) -> Option<usize> {
        let stroke = self.recorder.finish()?;
        // Strokes always start with one point, but never commit an empty one
        if stroke.points.is_empty() {
            return None;
        }
        let point_count = stroke.points.len();
        self.strokes.push(stroke);
        let index = self.strokes.len() - 1;
        debug!(
            "StrokeLog::commit_stroke: #{} with {} points",
            index, point_count
        );
        self.emit_event(StrokeLogEvent::StrokeCommitted { index, point_count });
        Some(index)
    }

    /// Drop the open stroke without recording it.
    pub fn cancel_stroke(&mut self) -> bool {
        match self.recorder.abort() {
            Some(event) => {
                debug!("StrokeLog::cancel_stroke: discarded open stroke");
                self.emit_event(event);
                true
            }
            None => false,
        }
    }

    /// Remove the most recent committed stroke. No-op on an empty log.
    pub fn undo(&mut self) -> Option<Stroke> {
        let stroke = self.strokes.pop()?;
        let remaining = self.strokes.len();
        debug!("StrokeLog::undo: {} strokes remain", remaining);
        self.emit_event(StrokeLogEvent::StrokeUndone { remaining });
        Some(stroke)
    }

    /// Remove every stroke, including the open one.
    pub fn clear(&mut self) {
        self.recorder.abort();
        let discarded = self.strokes.len();
        self.strokes.clear();
        debug!("StrokeLog::clear: discarded {} strokes", discarded);
        self.emit_event(StrokeLogEvent::Cleared { discarded });
    }

    /// Replace the log with `strokes`, validating each one first.
    ///
    /// On error the log is left untouched.
    pub fn load(&mut self, strokes: Vec<Stroke>) -> Result<(), StrokeError> {
        for stroke in &strokes {
            validate_stroke(stroke)?;
        }
        self.recorder.abort();
        self.strokes = strokes;
        let count = self.strokes.len();
        debug!("StrokeLog::load: {} strokes", count);
        self.emit_event(StrokeLogEvent::Loaded { count });
        Ok(())
    }

    /// The committed strokes in paint order.
    pub fn snapshot(&self) -> &[Stroke] {
        &self.strokes
    }

    /// The stroke currently being drawn.
    pub fn in_progress(&self) -> Option<&Stroke> {
        self.recorder.current()
    }

    pub fn is_recording(&self) -> bool {
        self.recorder.is_recording()
    }

    pub fn len(&self) -> usize {
        self.strokes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    /// Register a listener that receives every [`StrokeLogEvent`].
    pub fn add_event_listener<F>(&mut self, listener: F)
    where
        F: Fn(StrokeLogEvent) + Send + Sync + 'static,
    {
        self.event_listeners.push(Box::new(listener));
    }

    fn emit_event(&self, event: StrokeLogEvent) {
        for listener in &self.event_listeners {
            listener(event.clone());
        }
    }
}

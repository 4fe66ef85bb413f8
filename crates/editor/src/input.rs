//! Pointer input and brush controls

use painting::{map_to_buffer, BrushSettings, BrushShape, Point, PointerEvent, StrokeMode};
use tracing::debug;

use crate::session::EditorSession;
use crate::EditorError;

impl EditorSession {
    pub fn brush(&self) -> &BrushSettings {
        &self.brush
    }

    /// Map an event to buffer pixels, or None when it cannot be mapped yet
    fn map_event(&self, event: &PointerEvent) -> Option<Point> {
        let pipeline = self.pipeline.as_ref()?;
        match map_to_buffer(event, self.display, pipeline.dimensions()) {
            Ok(point) => Some(point),
            Err(e) => {
                debug!("EditorSession::map_event: {}", e);
                None
            }
        }
    }

    /// Start a stroke at the pointer position.
    ///
    /// Returns Ok(false) when the event could not be mapped (buffer or
    /// display not laid out yet); the event is dropped.
    pub fn pointer_down(&mut self, event: &PointerEvent) -> Result<bool, EditorError> {
        self.ready_pipeline()?;
        let Some(point) = self.map_event(event) else {
            return Ok(false);
        };
        self.ready_pipeline()?.begin_stroke(point)?;
        Ok(true)
    }

    /// Extend the open stroke. Moves without a stroke are ignored.
    pub fn pointer_move(&mut self, event: &PointerEvent) -> Result<bool, EditorError> {
        let pipeline = self.ready_pipeline()?;
        if !pipeline.is_stroking() {
            return Ok(false);
        }
        let Some(point) = self.map_event(event) else {
            return Ok(false);
        };
        let drawn = self.ready_pipeline()?.stroke_to(point)?;
        Ok(drawn.is_some())
    }

    /// Commit the open stroke, returning its index in the log
    pub fn pointer_up(&mut self, event: &PointerEvent) -> Result<Option<usize>, EditorError> {
        let pipeline = self.ready_pipeline()?;
        if !pipeline.is_stroking() {
            return Ok(None);
        }
        // The release position is part of the stroke when it can be mapped
        if let Some(point) = self.map_event(event) {
            self.ready_pipeline()?.stroke_to(point)?;
        }
        Ok(self.ready_pipeline()?.end_stroke())
    }

    /// Pointer left or the gesture was interrupted: keep what was drawn
    pub fn pointer_leave(&mut self) -> Result<Option<usize>, EditorError> {
        let pipeline = self.ready_pipeline()?;
        if !pipeline.is_stroking() {
            return Ok(None);
        }
        Ok(pipeline.end_stroke())
    }

    pub fn set_mode(&mut self, mode: StrokeMode) {
        self.brush.set_mode(mode);
        self.sync_brush();
    }

    /// Set the brush size in buffer pixels, clamped to the allowed range
    pub fn set_brush_size(&mut self, size: f32) {
        self.brush.set_size(size);
        self.sync_brush();
    }

    pub fn set_brush_shape(&mut self, shape: BrushShape) {
        self.brush.set_shape(shape);
        self.sync_brush();
    }

    fn sync_brush(&mut self) {
        if let Some(pipeline) = self.pipeline.as_mut() {
            pipeline.set_brush(self.brush);
        }
    }

    pub fn can_undo(&self) -> bool {
        self.pipeline.as_ref().is_some_and(|p| p.can_undo())
    }

    /// Remove the most recent stroke. Returns false when there was none.
    pub fn undo(&mut self) -> Result<bool, EditorError> {
        Ok(self.ready_pipeline()?.undo())
    }

    /// Remove every stroke
    pub fn clear(&mut self) -> Result<(), EditorError> {
        self.ready_pipeline()?.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use maskpaint_config::EditorConfig;
    use painting::{Dimensions, DisplayRect, TouchPoint};

    use super::*;
    use crate::session::{ImageInfo, SessionState};

    fn ready_session(original: Dimensions) -> EditorSession {
        let mut session = EditorSession::new(EditorConfig::default());
        let ticket = session.begin_load(ImageInfo::local("photo.jpg"));
        session.complete_load(ticket, Ok(original)).unwrap();
        session
    }

    #[test]
    fn test_input_requires_image() {
        let mut session = EditorSession::new(EditorConfig::default());
        assert!(matches!(
            session.pointer_down(&PointerEvent::mouse(1.0, 1.0)),
            Err(EditorError::NoImage)
        ));
        assert!(matches!(session.undo(), Err(EditorError::NoImage)));
    }

    #[test]
    fn test_input_while_loading_is_rejected() {
        let mut session = EditorSession::new(EditorConfig::default());
        session.begin_load(ImageInfo::local("photo.jpg"));
        assert!(matches!(
            session.pointer_down(&PointerEvent::mouse(1.0, 1.0)),
            Err(EditorError::InvalidState(SessionState::ImageLoading))
        ));
    }

    #[test]
    fn test_drag_records_stroke() {
        let mut session = ready_session(Dimensions::new(400, 300));
        assert!(session.pointer_down(&PointerEvent::mouse(10.0, 10.0)).unwrap());
        assert!(session.pointer_move(&PointerEvent::mouse(50.0, 10.0)).unwrap());
        assert_eq!(session.pointer_up(&PointerEvent::mouse(50.0, 40.0)).unwrap(), Some(0));

        let pipeline = session.pipeline().unwrap();
        let stroke = &pipeline.log().snapshot()[0];
        assert_eq!(stroke.points.len(), 3);
        assert_eq!(stroke.points[0], Point::new(10.0, 10.0));
        assert!(pipeline.has_paint());
        assert!(session.can_undo());
    }

    #[test]
    fn test_move_without_down_is_ignored() {
        let mut session = ready_session(Dimensions::new(400, 300));
        assert!(!session.pointer_move(&PointerEvent::mouse(5.0, 5.0)).unwrap());
        assert_eq!(session.pointer_up(&PointerEvent::mouse(5.0, 5.0)).unwrap(), None);
        assert!(!session.can_undo());
    }

    #[test]
    fn test_unsized_display_drops_event() {
        let mut session = ready_session(Dimensions::new(400, 300));
        session.set_display_rect(DisplayRect::default());
        assert!(!session.pointer_down(&PointerEvent::mouse(5.0, 5.0)).unwrap());
        assert!(!session.pipeline().unwrap().is_stroking());
    }

    #[test]
    fn test_touch_drag_and_leave() {
        let mut session = ready_session(Dimensions::new(400, 300));
        let touch = |x: f32, y: f32| PointerEvent::Touch {
            touches: vec![TouchPoint {
                client_x: x,
                client_y: y,
            }],
            changed_touches: vec![],
        };
        session.pointer_down(&touch(20.0, 20.0)).unwrap();
        session.pointer_move(&touch(60.0, 60.0)).unwrap();
        assert_eq!(session.pointer_leave().unwrap(), Some(0));
        assert_eq!(session.pipeline().unwrap().log().len(), 1);
    }

    #[test]
    fn test_brush_controls_reach_pipeline() {
        let mut session = ready_session(Dimensions::new(400, 300));
        session.set_mode(StrokeMode::Erase);
        session.set_brush_size(500.0);
        session.set_brush_shape(BrushShape::Square);

        let brush = session.pipeline().unwrap().brush();
        assert_eq!(brush.mode, StrokeMode::Erase);
        assert_eq!(brush.size, painting::MAX_BRUSH_SIZE);
        assert_eq!(brush.shape, BrushShape::Square);
        assert_eq!(session.brush(), brush);
    }

    #[test]
    fn test_brush_survives_new_image() {
        let mut session = ready_session(Dimensions::new(400, 300));
        session.set_brush_size(25.0);
        let ticket = session.begin_load(ImageInfo::local("next.jpg"));
        session.complete_load(ticket, Ok(Dimensions::new(200, 200))).unwrap();
        assert_eq!(session.pipeline().unwrap().brush().size, 25.0);
    }

    #[test]
    fn test_undo_and_clear() {
        let mut session = ready_session(Dimensions::new(400, 300));
        for x in [10.0, 100.0] {
            session.pointer_down(&PointerEvent::mouse(x, 10.0)).unwrap();
            session.pointer_up(&PointerEvent::mouse(x + 20.0, 10.0)).unwrap();
        }
        assert!(session.undo().unwrap());
        assert_eq!(session.pipeline().unwrap().log().len(), 1);
        session.clear().unwrap();
        assert!(!session.can_undo());
        assert!(!session.undo().unwrap());
        assert!(!session.pipeline().unwrap().has_paint());
    }
}

//! Pointer position to buffer pixel mapping
//!
//! The drawing buffer is usually displayed at a different size than its
//! pixel dimensions. Pointer events arrive in client (viewport) coordinates
//! and are mapped into buffer pixels using the displayed rectangle.

use thiserror::Error;

use crate::types::{Dimensions, Point};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MappingError {
    #[error("Drawing buffer has no pixels")]
    BufferNotSized,
    #[error("Drawing buffer is not laid out on screen")]
    DisplayNotSized,
    #[error("Touch event carries no touch point")]
    NoActiveTouch,
}

/// Where the buffer is displayed, in client coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DisplayRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl DisplayRect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn is_sized(&self) -> bool {
        self.width > 0.0 && self.height > 0.0 && self.width.is_finite() && self.height.is_finite()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    pub client_x: f32,
    pub client_y: f32,
}

/// A pointer input in client coordinates
#[derive(Debug, Clone, PartialEq)]
pub enum PointerEvent {
    Mouse { client_x: f32, client_y: f32 },
    /// `touches` holds the fingers still down; `changed_touches` the ones
    /// that triggered this event (the only source on touch end)
    Touch {
        touches: Vec<TouchPoint>,
        changed_touches: Vec<TouchPoint>,
    },
}

impl PointerEvent {
    pub fn mouse(client_x: f32, client_y: f32) -> Self {
        PointerEvent::Mouse { client_x, client_y }
    }

    /// The position this event reports: the mouse position, or the first
    /// active touch falling back to the first changed touch
    pub fn primary_position(&self) -> Option<(f32, f32)> {
        match self {
            PointerEvent::Mouse { client_x, client_y } => Some((*client_x, *client_y)),
            PointerEvent::Touch {
                touches,
                changed_touches,
            } => touches
                .first()
                .or_else(|| changed_touches.first())
                .map(|t| (t.client_x, t.client_y)),
        }
    }
}

/// Map a pointer event to buffer pixel coordinates.
///
/// `buffer_x = (client_x - rect.left) * buffer_width / rect.width`, and the
/// same for y. The result is not clamped: points outside the buffer are
/// kept so strokes leaving the edge still draw up to it.
pub fn map_to_buffer(
    event: &PointerEvent,
    rect: DisplayRect,
    buffer: Dimensions,
) -> Result<Point, MappingError> {
    if buffer.is_empty() {
        return Err(MappingError::BufferNotSized);
    }
    if !rect.is_sized() {
        return Err(MappingError::DisplayNotSized);
    }
    let (client_x, client_y) = event.primary_position().ok_or(MappingError::NoActiveTouch)?;

    let scale_x = buffer.width as f32 / rect.width;
    let scale_y = buffer.height as f32 / rect.height;
    Ok(Point::new(
        (client_x - rect.left) * scale_x,
        (client_y - rect.top) * scale_y,
    ))
}

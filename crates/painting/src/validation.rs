use crate::constants::{MAX_BRUSH_SIZE, MIN_BRUSH_SIZE};
use crate::types::{Point, Stroke};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum StrokeError {
    #[error("No stroke in progress")]
    NoActiveStroke,
    #[error("A stroke is already in progress")]
    StrokeInProgress,
    #[error("Invalid brush size: {0}")]
    InvalidBrushSize(f32),
    #[error("Non-finite point: ({x}, {y})")]
    NonFinitePoint { x: f32, y: f32 },
    #[error("Stroke has no points")]
    NoPoints,
}

/// Brush sizes must be positive and finite
pub fn validate_brush_size(size: f32) -> Result<(), StrokeError> {
    if size.is_finite() && size > 0.0 {
        Ok(())
    } else {
        Err(StrokeError::InvalidBrushSize(size))
    }
}

pub fn validate_point(point: Point) -> Result<(), StrokeError> {
    if point.is_finite() {
        Ok(())
    } else {
        Err(StrokeError::NonFinitePoint {
            x: point.x,
            y: point.y,
        })
    }
}

/// Validate a stroke loaded from outside the editor (e.g. a JSON script)
pub fn validate_stroke(stroke: &Stroke) -> Result<(), StrokeError> {
    validate_brush_size(stroke.brush_size)?;
    if stroke.points.is_empty() {
        return Err(StrokeError::NoPoints);
    }
    for point in &stroke.points {
        validate_point(*point)?;
    }
    Ok(())
}

/// Clamp a requested brush size to the range the toolbar offers
pub fn clamp_brush_size(size: f32) -> f32 {
    if size.is_nan() {
        return MIN_BRUSH_SIZE;
    }
    size.clamp(MIN_BRUSH_SIZE, MAX_BRUSH_SIZE)
}

//! Stroke scripts: pointer gestures described as JSON
//!
//! ```json
//! {
//!   "space": "image",
//!   "strokes": [
//!     { "mode": "draw", "size": 24, "shape": "round", "points": [[100, 80], [420, 80]] },
//!     { "mode": "erase", "points": [[260, 80]] }
//!   ]
//! }
//! ```
//!
//! In `image` space points and sizes are original image pixels and are
//! scaled to the drawing buffer; in `buffer` space they are used as is.
//! Brush settings carry over from one stroke to the next.

use maskpaint_editor::{EditorError, EditorSession};
use painting::{BrushShape, DisplayRect, Point, PointerEvent, StrokeMode, StrokeTransform};
use serde::Deserialize;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScriptSpace {
    #[default]
    Image,
    Buffer,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScriptStroke {
    #[serde(default)]
    pub mode: Option<StrokeMode>,
    #[serde(default)]
    pub size: Option<f32>,
    #[serde(default)]
    pub shape: Option<BrushShape>,
    pub points: Vec<[f32; 2]>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StrokeScript {
    #[serde(default)]
    pub space: ScriptSpace,
    pub strokes: Vec<ScriptStroke>,
}

impl StrokeScript {
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Drive the session with the scripted gestures as if they were mouse
    /// drags over the buffer. Returns the number of committed strokes.
    pub fn replay(&self, session: &mut EditorSession) -> Result<usize, EditorError> {
        let (Some(original), Some(buffer)) = (
            session.original_dimensions(),
            session.pipeline().map(|p| p.dimensions()),
        ) else {
            return Err(EditorError::NoImage);
        };
        let transform = match self.space {
            ScriptSpace::Image => StrokeTransform::between(original, buffer),
            ScriptSpace::Buffer => StrokeTransform::IDENTITY,
        };
        session.set_display_rect(DisplayRect::new(
            0.0,
            0.0,
            buffer.width as f32,
            buffer.height as f32,
        ));

        let mut committed = 0;
        for (i, stroke) in self.strokes.iter().enumerate() {
            let Some((first, rest)) = stroke.points.split_first() else {
                warn!("StrokeScript::replay: stroke {} has no points, skipped", i);
                continue;
            };
            if let Some(mode) = stroke.mode {
                session.set_mode(mode);
            }
            if let Some(size) = stroke.size {
                session.set_brush_size(transform.scale_size(size));
            }
            if let Some(shape) = stroke.shape {
                session.set_brush_shape(shape);
            }

            let event = |[x, y]: [f32; 2]| {
                let p = transform.apply(Point::new(x, y));
                PointerEvent::mouse(p.x, p.y)
            };
            session.pointer_down(&event(*first))?;
            for point in rest {
                session.pointer_move(&event(*point))?;
            }
            let last = rest.last().unwrap_or(first);
            if session.pointer_up(&event(*last))?.is_some() {
                committed += 1;
            }
        }
        debug!(
            "StrokeScript::replay: {} of {} strokes committed",
            committed,
            self.strokes.len()
        );
        Ok(committed)
    }
}

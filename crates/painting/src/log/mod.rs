//! Stroke log for the mask editor.
//!
//! This module provides:
//! - [`StrokeLog`] - ordered stroke stack with undo and clear
//! - [`StrokeRecorder`] - holds the stroke between pointer down and up
//! - [`StrokeLogEvent`] - notifications for registered listeners
//!
//! Strokes are recorded in the buffer space that was current when the image
//! was loaded. Renderers scale them when the buffer has a different size, so
//! the recorded points never change after commit.

mod events;
mod recorder;
mod storage;

pub use events::StrokeLogEvent;
pub use recorder::StrokeRecorder;
pub use storage::StrokeLog;

//! Events emitted as the stroke log changes.

use crate::types::StrokeMode;

/// Events emitted by [`super::StrokeLog`] to registered listeners.
///
/// Listeners let the editor (or anything else) react to log changes, e.g. to
/// schedule a repaint, without the log knowing about them.
#[derive(Debug, Clone, PartialEq)]
pub enum StrokeLogEvent {
    /// A stroke has been opened.
    StrokeStarted { mode: StrokeMode, brush_size: f32 },
    /// The open stroke was appended to the log at `index`.
    StrokeCommitted { index: usize, point_count: usize },
    /// The open stroke was dropped without being recorded.
    StrokeCancelled { point_count: usize },
    /// The most recent stroke was removed.
    StrokeUndone { remaining: usize },
    /// Every stroke was discarded.
    Cleared { discarded: usize },
    /// The log was replaced wholesale (e.g. imported from a script).
    Loaded { count: usize },
}

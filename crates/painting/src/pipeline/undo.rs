//! Undo and clear for the painting pipeline
//!
//! Undo is a pop of the stroke log followed by a full repaint. No pixel
//! snapshots are kept: replaying the remaining strokes reproduces the
//! buffer exactly.

use tracing::debug;

use super::PaintingPipeline;

impl PaintingPipeline {
    pub fn can_undo(&self) -> bool {
        !self.log.is_empty()
    }

    /// Number of strokes that can be undone
    pub fn undo_count(&self) -> usize {
        self.log.len()
    }

    /// Remove the last committed stroke.
    ///
    /// A stroke in progress is cancelled first. Returns true if a stroke was
    /// removed.
    pub fn undo(&mut self) -> bool {
        self.renderer.end_live();
        self.log.cancel_stroke();
        if self.log.undo().is_none() {
            debug!("PaintingPipeline::undo: nothing to undo");
            return false;
        }
        self.repaint();
        true
    }

    /// Remove every stroke and blank the buffer
    pub fn clear(&mut self) {
        self.renderer.end_live();
        self.log.clear();
        self.repaint();
    }
}

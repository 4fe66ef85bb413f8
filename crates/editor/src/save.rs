//! Mask saving
//!
//! A save is split so the session is never borrowed across the upload:
//! [`EditorSession::prepare_save`] rasterizes and encodes the mask and hands
//! back a [`SaveJob`], the job runs against the service, and
//! [`EditorSession::complete_save`] applies the outcome. Starting a new save
//! aborts the previous one, and outcomes of superseded saves are ignored.

use maskpaint_service::{
    run_abortable, AbortSignal, MaskFile, SavedMask, ServiceError, UploadService,
};
use painting::{mask_filename, BinaryMask};
use tracing::{debug, info, warn};

use crate::session::{ActiveSave, EditorSession, SessionState};
use crate::EditorError;

/// A mask upload detached from the session
#[derive(Debug, Clone)]
pub struct SaveJob {
    pub generation: u64,
    pub image_id: u64,
    pub mask: MaskFile,
    signal: AbortSignal,
}

impl SaveJob {
    pub fn signal(&self) -> &AbortSignal {
        &self.signal
    }

    /// Upload the mask. Resolves to `Cancelled` once the job is superseded.
    pub async fn run<U: UploadService>(&self, service: &U) -> Result<SavedMask, ServiceError> {
        debug!(
            "SaveJob::run: generation {} uploading {} ({} bytes)",
            self.generation,
            self.mask.filename,
            self.mask.bytes.len()
        );
        run_abortable(
            &self.signal,
            service.save_mask(self.image_id, &self.mask, &self.signal),
        )
        .await
    }
}

impl EditorSession {
    /// Rasterize and encode the mask at original resolution.
    ///
    /// Fails with `EmptyMask` when nothing is painted; the session state is
    /// unchanged and nothing is uploaded. Any save already in flight is
    /// aborted and the session moves to `Saving`.
    pub fn prepare_save(&mut self) -> Result<SaveJob, EditorError> {
        let mask = self.export_mask()?;
        let Some(image) = self.image.as_ref() else {
            return Err(EditorError::NoImage);
        };
        let original = image.original_dimensions;
        let format = self.rasterizer.settings().format;
        let bytes = mask.encode(format)?;
        let image_id = image.info.image_id.ok_or(EditorError::NotUploaded)?;

        let file = MaskFile {
            filename: mask_filename(&image.info.filename, format),
            mime: format.mime_type().to_string(),
            bytes,
            original_width: original.width,
            original_height: original.height,
        };

        self.cancel_active_save();
        self.save_generation += 1;
        let signal = AbortSignal::new();
        self.active_save = Some(ActiveSave {
            generation: self.save_generation,
            signal: signal.clone(),
        });
        self.state = SessionState::Saving;
        info!(
            "EditorSession::prepare_save: generation {} mask {} at {}",
            self.save_generation, file.filename, original
        );

        Ok(SaveJob {
            generation: self.save_generation,
            image_id,
            mask: file,
            signal,
        })
    }

    /// The binary mask at original image resolution, without uploading it
    pub fn export_mask(&self) -> Result<BinaryMask, EditorError> {
        self.check_ready()?;
        let (Some(pipeline), Some(image)) = (self.pipeline.as_ref(), self.image.as_ref()) else {
            return Err(EditorError::NoImage);
        };
        Ok(pipeline.rasterize_mask(&self.rasterizer, image.original_dimensions)?)
    }

    /// Apply the outcome of a save job.
    ///
    /// Outcomes of superseded jobs are ignored (Ok(None)). Cancellation is
    /// not an error. Any other outcome returns the session to `Ready`.
    pub fn complete_save(
        &mut self,
        generation: u64,
        result: Result<SavedMask, ServiceError>,
    ) -> Result<Option<SavedMask>, EditorError> {
        match &self.active_save {
            Some(active) if active.generation == generation => {}
            _ => {
                debug!(
                    "EditorSession::complete_save: ignoring superseded save {}",
                    generation
                );
                return Ok(None);
            }
        }
        self.active_save = None;
        if self.state == SessionState::Saving {
            self.state = SessionState::Ready;
        }

        match result {
            Ok(saved) => {
                info!("EditorSession::complete_save: saved mask {}", saved.id);
                Ok(Some(saved))
            }
            Err(e) if e.is_cancelled() => Ok(None),
            Err(e) => {
                warn!("EditorSession::complete_save: {}", e);
                Err(e.into())
            }
        }
    }

    /// Prepare, run and complete a save in one call
    pub async fn save_mask<U: UploadService>(
        &mut self,
        service: &U,
    ) -> Result<Option<SavedMask>, EditorError> {
        let job = self.prepare_save()?;
        let result = job.run(service).await;
        self.complete_save(job.generation, result)
    }

    /// Abort the save in flight, if any
    pub fn cancel_save(&mut self) {
        if self.active_save.is_some() {
            self.cancel_active_save();
            if self.state == SessionState::Saving {
                self.state = SessionState::Ready;
            }
        }
    }

    pub fn is_saving(&self) -> bool {
        self.active_save.is_some()
    }

    pub(crate) fn cancel_active_save(&mut self) {
        if let Some(active) = self.active_save.take() {
            debug!(
                "EditorSession: aborting save generation {}",
                active.generation
            );
            active.signal.abort();
        }
    }
}

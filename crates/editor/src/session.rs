//! Session state and image loading

use maskpaint_config::EditorConfig;
use maskpaint_service::{
    validate_file_type, AbortSignal, ImageDecoder, ImageFile, ServiceError, UploadService,
    UploadedImage,
};
use painting::{
    fit_buffer, scale_factor, BrushSettings, Dimensions, DisplayRect, MaskRasterizer,
    PaintingPipeline,
};
use tracing::{debug, info, warn};

use crate::EditorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NoImage,
    ImageLoading,
    Ready,
    Saving,
}

/// Identifies one load. Only the most recent ticket can complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket(u64);

/// What is known about an image before it is decoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageInfo {
    /// Service id; None for images that were never uploaded
    pub image_id: Option<u64>,
    pub filename: String,
    pub url: Option<String>,
}

impl ImageInfo {
    pub fn local(filename: impl Into<String>) -> Self {
        Self {
            image_id: None,
            filename: filename.into(),
            url: None,
        }
    }
}

impl From<&UploadedImage> for ImageInfo {
    fn from(image: &UploadedImage) -> Self {
        Self {
            image_id: Some(image.id),
            filename: image.original_filename.clone(),
            url: Some(image.url.clone()),
        }
    }
}

/// The image being edited
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedImage {
    pub info: ImageInfo,
    /// Set once per image; the mask is always produced at this size
    pub original_dimensions: Dimensions,
}

#[derive(Debug)]
pub(crate) struct ActiveSave {
    pub(crate) generation: u64,
    pub(crate) signal: AbortSignal,
}

#[derive(Debug)]
pub struct EditorSession {
    pub(crate) config: EditorConfig,
    pub(crate) state: SessionState,
    pub(crate) image: Option<LoadedImage>,
    pub(crate) pending_load: Option<(LoadTicket, ImageInfo)>,
    pub(crate) next_ticket: u64,
    pub(crate) pipeline: Option<PaintingPipeline>,
    pub(crate) brush: BrushSettings,
    pub(crate) container: (f32, f32),
    pub(crate) display: DisplayRect,
    pub(crate) rasterizer: MaskRasterizer,
    pub(crate) active_save: Option<ActiveSave>,
    pub(crate) save_generation: u64,
}

impl EditorSession {
    pub fn new(config: EditorConfig) -> Self {
        let rasterizer = MaskRasterizer::new(config.mask, config.render.to_settings());
        Self {
            brush: config.brush.to_settings(),
            container: (config.display.width_f32(), config.display.height_f32()),
            display: DisplayRect::default(),
            rasterizer,
            config,
            state: SessionState::NoImage,
            image: None,
            pending_load: None,
            next_ticket: 0,
            pipeline: None,
            active_save: None,
            save_generation: 0,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn image(&self) -> Option<&LoadedImage> {
        self.image.as_ref()
    }

    pub fn original_dimensions(&self) -> Option<Dimensions> {
        self.image.as_ref().map(|i| i.original_dimensions)
    }

    /// Display scale of the current image in its container
    pub fn scale_factor(&self) -> Option<f32> {
        scale_factor(self.original_dimensions()?, self.container.0, self.container.1)
    }

    pub fn pipeline(&self) -> Option<&PaintingPipeline> {
        self.pipeline.as_ref()
    }

    /// Mutable access, e.g. to register stroke log listeners
    pub fn pipeline_mut(&mut self) -> Option<&mut PaintingPipeline> {
        self.pipeline.as_mut()
    }

    pub fn display_rect(&self) -> DisplayRect {
        self.display
    }

    /// Where the buffer is shown on screen, in client coordinates
    pub fn set_display_rect(&mut self, rect: DisplayRect) {
        self.display = rect;
    }

    /// Start loading `info`, superseding any load in flight.
    ///
    /// The current image, its strokes and any in-flight save are discarded.
    pub fn begin_load(&mut self, info: ImageInfo) -> LoadTicket {
        self.cancel_active_save();
        self.next_ticket += 1;
        let ticket = LoadTicket(self.next_ticket);
        if let Some((old, _)) = self.pending_load.replace((ticket, info)) {
            debug!("EditorSession::begin_load: ticket {:?} superseded", old);
        }
        self.image = None;
        self.pipeline = None;
        self.state = SessionState::ImageLoading;
        ticket
    }

    /// Finish a load with the decode result.
    ///
    /// A stale ticket is ignored and reported as `StaleLoad` without touching
    /// the session. A failed decode returns the session to `NoImage`.
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        decoded: Result<Dimensions, ServiceError>,
    ) -> Result<&LoadedImage, EditorError> {
        match &self.pending_load {
            Some((current, _)) if *current == ticket => {}
            _ => {
                debug!("EditorSession::complete_load: ignoring stale ticket {:?}", ticket);
                return Err(EditorError::StaleLoad);
            }
        }
        let Some((_, info)) = self.pending_load.take() else {
            return Err(EditorError::StaleLoad);
        };

        let original = match decoded {
            Ok(dims) if !dims.is_empty() => dims,
            Ok(dims) => {
                return Err(self.fail_load(ServiceError::Decode(format!("empty image {}", dims))));
            }
            Err(e) => return Err(self.fail_load(e)),
        };

        let buffer = match fit_buffer(original, self.container.0, self.container.1) {
            Some(buffer) => buffer,
            None => {
                self.state = SessionState::NoImage;
                return Err(EditorError::ContainerNotSized);
            }
        };
        let mut pipeline = match PaintingPipeline::new(buffer.width, buffer.height, self.config.render.to_settings()) {
            Ok(pipeline) => pipeline,
            Err(e) => {
                warn!("EditorSession::complete_load: cannot allocate buffer: {}", e);
                self.state = SessionState::NoImage;
                return Err(e.into());
            }
        };
        pipeline.set_brush(self.brush);

        info!(
            "EditorSession::complete_load: {} at {}, buffer {}",
            info.filename, original, buffer
        );
        self.display = DisplayRect::new(0.0, 0.0, buffer.width as f32, buffer.height as f32);
        self.pipeline = Some(pipeline);
        self.state = SessionState::Ready;
        Ok(self.image.insert(LoadedImage {
            info,
            original_dimensions: original,
        }))
    }

    fn fail_load(&mut self, error: ServiceError) -> EditorError {
        warn!("EditorSession: image load failed: {}", error);
        self.image = None;
        self.pipeline = None;
        self.state = SessionState::NoImage;
        EditorError::ImageLoad(error)
    }

    /// Decode `bytes` and make them the current image
    pub async fn load_image<D: ImageDecoder>(
        &mut self,
        info: ImageInfo,
        bytes: &[u8],
        decoder: &D,
    ) -> Result<&LoadedImage, EditorError> {
        let ticket = self.begin_load(info);
        let decoded = decoder.decode(bytes).await;
        self.complete_load(ticket, decoded)
    }

    /// Validate, upload and load a picked file.
    ///
    /// Unsupported files are rejected before anything is uploaded or decoded.
    /// The current image is kept until the upload succeeds; only a decode
    /// failure leaves the session without an image.
    pub async fn upload_and_load<U: UploadService, D: ImageDecoder>(
        &mut self,
        file: &ImageFile,
        service: &U,
        decoder: &D,
    ) -> Result<&LoadedImage, EditorError> {
        if !validate_file_type(&file.filename, &file.mime) {
            return Err(EditorError::UnsupportedFileType {
                filename: file.filename.clone(),
                mime: file.mime.clone(),
            });
        }
        let uploaded = service
            .upload_image(file)
            .await
            .map_err(|e| self.keep_current(e))?;
        let ticket = self.begin_load(ImageInfo::from(&uploaded));
        let decoded = decoder.decode(&file.bytes).await;
        self.complete_load(ticket, decoded)
    }

    /// Load an image that was uploaded earlier.
    ///
    /// Lookup and download failures leave the session as it was.
    pub async fn open_uploaded<U: UploadService, D: ImageDecoder>(
        &mut self,
        image_id: u64,
        service: &U,
        decoder: &D,
    ) -> Result<&LoadedImage, EditorError> {
        let record = service
            .get_image(image_id)
            .await
            .map_err(|e| self.keep_current(e))?;
        let bytes = service
            .fetch_image(&record.url)
            .await
            .map_err(|e| self.keep_current(e))?;
        let ticket = self.begin_load(ImageInfo::from(&record));
        let decoded = decoder.decode(&bytes).await;
        self.complete_load(ticket, decoded)
    }

    fn keep_current(&self, error: ServiceError) -> EditorError {
        warn!(
            "EditorSession: image transfer failed, keeping {:?} session: {}",
            self.state, error
        );
        EditorError::ImageLoad(error)
    }

    /// Drop the image and its strokes, cancelling any save in flight
    pub fn reset(&mut self) {
        self.cancel_active_save();
        self.pending_load = None;
        self.image = None;
        self.pipeline = None;
        self.state = SessionState::NoImage;
        info!("EditorSession::reset");
    }

    /// The display container changed size: resize the buffer and replay
    pub fn set_container(&mut self, width: f32, height: f32) -> Result<(), EditorError> {
        if !(width > 0.0 && height > 0.0) {
            return Err(EditorError::ContainerNotSized);
        }
        self.container = (width, height);
        let (Some(image), Some(pipeline)) = (&self.image, self.pipeline.as_mut()) else {
            return Ok(());
        };
        let buffer = fit_buffer(image.original_dimensions, width, height)
            .ok_or(EditorError::ContainerNotSized)?;
        pipeline.resize(buffer)?;
        self.display = DisplayRect::new(
            self.display.left,
            self.display.top,
            buffer.width as f32,
            buffer.height as f32,
        );
        Ok(())
    }

    /// Strokes and saves need a loaded image; saving does not block input
    pub(crate) fn check_ready(&self) -> Result<(), EditorError> {
        match self.state {
            SessionState::Ready | SessionState::Saving => Ok(()),
            SessionState::NoImage => Err(EditorError::NoImage),
            other => Err(EditorError::InvalidState(other)),
        }
    }

    pub(crate) fn ready_pipeline(&mut self) -> Result<&mut PaintingPipeline, EditorError> {
        self.check_ready()?;
        self.pipeline.as_mut().ok_or(EditorError::NoImage)
    }
}

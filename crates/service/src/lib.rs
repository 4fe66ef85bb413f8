//! External collaborators of the mask editor
//!
//! The editor core never talks to the network or decodes files itself. It
//! consumes the traits in this crate:
//! - [`UploadService`] - stores images and masks (HTTP in production)
//! - [`ImageDecoder`] - turns image bytes into pixel dimensions
//! - [`AbortSignal`] - cancels an in-flight save
//! - [`validate_file_type`] - gate applied before anything is decoded

mod abort;
mod decode;
mod file_type;
mod http;
mod memory;

pub use abort::{run_abortable, AbortSignal};
pub use decode::{ImageCrateDecoder, ImageDecoder};
pub use file_type::{is_mpo_filename, validate_file_type, ACCEPTED_MIME_TYPES};
pub use http::HttpUploadService;
pub use memory::InMemoryUploadService;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Server error {status}: {body}")]
    Server { status: u16, body: String },

    #[error("Rejected by server: {0}")]
    Validation(String),

    #[error("Cancelled")]
    Cancelled,

    #[error("Image decode failed: {0}")]
    Decode(String),
}

impl ServiceError {
    /// Cancellation is an outcome, not a failure
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ServiceError::Cancelled)
    }
}

/// A file picked by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub filename: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(filename: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            mime: mime.into(),
            bytes,
        }
    }

    /// Accepted by [`validate_file_type`]
    pub fn is_supported(&self) -> bool {
        validate_file_type(&self.filename, &self.mime)
    }
}

/// An image stored by the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedImage {
    pub id: u64,
    pub url: String,
    pub original_filename: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// An encoded mask ready for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskFile {
    pub filename: String,
    pub mime: String,
    pub bytes: Vec<u8>,
    pub original_width: u32,
    pub original_height: u32,
}

/// A mask stored by the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedMask {
    pub id: u64,
    pub url: String,
    pub image_id: u64,
}

/// Storage for images and their masks
#[allow(async_fn_in_trait)]
pub trait UploadService {
    /// Store a new image
    async fn upload_image(&self, file: &ImageFile) -> Result<UploadedImage, ServiceError>;

    async fn get_image(&self, id: u64) -> Result<UploadedImage, ServiceError>;

    async fn list_images(&self) -> Result<Vec<UploadedImage>, ServiceError>;

    /// Download the bytes behind an image URL
    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>, ServiceError>;

    /// Store a mask for `image_id`.
    ///
    /// Resolves to `Cancelled` as soon as `signal` is aborted.
    async fn save_mask(
        &self,
        image_id: u64,
        mask: &MaskFile,
        signal: &AbortSignal,
    ) -> Result<SavedMask, ServiceError>;

    async fn list_masks(&self) -> Result<Vec<SavedMask>, ServiceError>;

    /// Whether a mask exists for an image with this file name
    async fn has_mask(&self, filename: &str) -> Result<bool, ServiceError>;
}

/// Base name without directory or extension, as the service matches masks
pub fn base_filename(filename: &str) -> &str {
    let name = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    match name.rfind('.') {
        Some(0) | None => name,
        Some(dot) => &name[..dot],
    }
}

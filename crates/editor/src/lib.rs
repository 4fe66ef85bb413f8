//! Mask editor session
//!
//! [`EditorSession`] owns everything that belongs to the image being edited:
//! its original dimensions, the painting pipeline (stroke log and overlay
//! buffer), the active brush and the in-flight save. Collaborators (upload
//! service, image decoder) are passed in per call.
//!
//! ```text
//! NoImage -> ImageLoading -> Ready <-> Saving
//!                 |            |
//!                 +-> NoImage  +-> NoImage (reset / new image)
//! ```

mod catalog;
mod input;
mod save;
mod session;

pub use catalog::available_images;
pub use save::SaveJob;
pub use session::{EditorSession, ImageInfo, LoadTicket, LoadedImage, SessionState};

use maskpaint_service::ServiceError;
use painting::{MaskError, StrokeError, SurfaceError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("No image is loaded")]
    NoImage,

    #[error("Operation not allowed while {0:?}")]
    InvalidState(SessionState),

    #[error("Unsupported file type: {filename} ({mime}); please choose a JPEG image")]
    UnsupportedFileType { filename: String, mime: String },

    #[error("Failed to load image: {0}")]
    ImageLoad(ServiceError),

    #[error("A newer image load replaced this one")]
    StaleLoad,

    #[error("Image display area has no size")]
    ContainerNotSized,

    #[error("Draw on the image before saving")]
    EmptyMask,

    #[error("Image has not been uploaded, so its mask cannot be saved")]
    NotUploaded,

    #[error(transparent)]
    Surface(#[from] SurfaceError),

    #[error(transparent)]
    Stroke(#[from] StrokeError),

    #[error(transparent)]
    Mask(MaskError),

    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl From<MaskError> for EditorError {
    fn from(err: MaskError) -> Self {
        match err {
            MaskError::EmptyMask => EditorError::EmptyMask,
            MaskError::Surface(e) => EditorError::Surface(e),
            other => EditorError::Mask(other),
        }
    }
}

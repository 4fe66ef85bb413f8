//! Images that still need a mask

use maskpaint_service::{ServiceError, UploadService, UploadedImage};
use tracing::debug;

/// Uploaded images for which the service has no mask yet, in service order
pub async fn available_images<U: UploadService>(
    service: &U,
) -> Result<Vec<UploadedImage>, ServiceError> {
    let images = service.list_images().await?;
    let total = images.len();
    let mut available = Vec::with_capacity(total);
    for image in images {
        if !service.has_mask(&image.original_filename).await? {
            available.push(image);
        }
    }
    debug!("available_images: {} of {} without a mask", available.len(), total);
    Ok(available)
}

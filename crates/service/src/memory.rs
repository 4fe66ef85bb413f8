//! In-process upload service for offline runs and tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use tracing::debug;

use crate::abort::run_abortable;
use crate::{
    base_filename, AbortSignal, ImageFile, MaskFile, SavedMask, ServiceError, UploadService,
    UploadedImage,
};

#[derive(Debug, Default)]
struct Store {
    images: Vec<(UploadedImage, Vec<u8>)>,
    masks: Vec<(SavedMask, MaskFile)>,
}

/// Keeps images and masks in memory.
///
/// `save_delay` makes saves take a while so cancellation can be observed.
/// The `failing_*` builders make every upload, download or save fail with
/// the given error.
#[derive(Debug, Default)]
pub struct InMemoryUploadService {
    store: Mutex<Store>,
    save_calls: AtomicUsize,
    save_delay: Option<Duration>,
    fail_uploads_with: Option<ServiceError>,
    fail_fetches_with: Option<ServiceError>,
    fail_saves_with: Option<ServiceError>,
}

impl InMemoryUploadService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_save_delay(mut self, delay: Duration) -> Self {
        self.save_delay = Some(delay);
        self
    }

    pub fn failing_uploads(mut self, error: ServiceError) -> Self {
        self.fail_uploads_with = Some(error);
        self
    }

    pub fn failing_fetches(mut self, error: ServiceError) -> Self {
        self.fail_fetches_with = Some(error);
        self
    }

    pub fn failing_saves(mut self, error: ServiceError) -> Self {
        self.fail_saves_with = Some(error);
        self
    }

    /// Number of `save_mask` calls, including failed and cancelled ones
    pub fn save_calls(&self) -> usize {
        self.save_calls.load(Ordering::SeqCst)
    }

    /// Masks stored so far
    pub fn masks(&self) -> Vec<MaskFile> {
        self.lock().masks.iter().map(|(_, file)| file.clone()).collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Store> {
        // A panicked writer cannot leave the store half-updated
        self.store.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl UploadService for InMemoryUploadService {
    async fn upload_image(&self, file: &ImageFile) -> Result<UploadedImage, ServiceError> {
        if let Some(error) = &self.fail_uploads_with {
            return Err(error.clone());
        }
        let mut store = self.lock();
        let id = store.images.len() as u64 + 1;
        let image = UploadedImage {
            id,
            url: format!("memory://images/{}", id),
            original_filename: file.filename.clone(),
            width: None,
            height: None,
        };
        store.images.push((image.clone(), file.bytes.clone()));
        debug!("InMemoryUploadService::upload_image: #{} {}", id, file.filename);
        Ok(image)
    }

    async fn get_image(&self, id: u64) -> Result<UploadedImage, ServiceError> {
        self.lock()
            .images
            .iter()
            .find(|(image, _)| image.id == id)
            .map(|(image, _)| image.clone())
            .ok_or(ServiceError::Server {
                status: 404,
                body: format!("image {} not found", id),
            })
    }

    async fn list_images(&self) -> Result<Vec<UploadedImage>, ServiceError> {
        Ok(self.lock().images.iter().map(|(image, _)| image.clone()).collect())
    }

    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>, ServiceError> {
        if let Some(error) = &self.fail_fetches_with {
            return Err(error.clone());
        }
        self.lock()
            .images
            .iter()
            .find(|(image, _)| image.url == url)
            .map(|(_, bytes)| bytes.clone())
            .ok_or_else(|| ServiceError::Network(format!("no image at {}", url)))
    }

    async fn save_mask(
        &self,
        image_id: u64,
        mask: &MaskFile,
        signal: &AbortSignal,
    ) -> Result<SavedMask, ServiceError> {
        self.save_calls.fetch_add(1, Ordering::SeqCst);
        let delay = self.save_delay;
        let failure = self.fail_saves_with.clone();

        run_abortable(signal, async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            match failure {
                Some(error) => Err(error),
                None => Ok(()),
            }
        })
        .await?;

        let mut store = self.lock();
        if !store.images.iter().any(|(image, _)| image.id == image_id) {
            return Err(ServiceError::Validation(format!("unknown image {}", image_id)));
        }
        let id = store.masks.len() as u64 + 1;
        let saved = SavedMask {
            id,
            url: format!("memory://masks/{}", mask.filename),
            image_id,
        };
        store.masks.push((saved.clone(), mask.clone()));
        Ok(saved)
    }

    async fn list_masks(&self) -> Result<Vec<SavedMask>, ServiceError> {
        Ok(self.lock().masks.iter().map(|(mask, _)| mask.clone()).collect())
    }

    async fn has_mask(&self, filename: &str) -> Result<bool, ServiceError> {
        let base = base_filename(filename);
        let store = self.lock();
        Ok(store.masks.iter().any(|(saved, _)| {
            store
                .images
                .iter()
                .any(|(image, _)| image.id == saved.image_id && base_filename(&image.original_filename) == base)
        }))
    }
}

//! HTTP client for the image/mask REST service
//!
//! Endpoints, relative to the configured API root:
//! - `POST images/upload/` multipart `file`
//! - `GET images/{id}/`, `GET images/`
//! - `POST masks/save/` multipart `file`, `image`, `original_width`, `original_height`
//! - `GET masks/`, `GET masks/check/{filename}/`

use std::time::Duration;

use maskpaint_config::ServiceConfig;
use reqwest::multipart::{Form, Part};
use reqwest::{Response, Url};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::abort::run_abortable;
use crate::{AbortSignal, ImageFile, MaskFile, SavedMask, ServiceError, UploadService, UploadedImage};

// =============================================================================
// CLIENT
// =============================================================================

pub struct HttpUploadService {
    http: reqwest::Client,
    base: Url,
    save_timeout: Duration,
}

impl std::fmt::Debug for HttpUploadService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpUploadService")
            .field("base", &self.base.as_str())
            .field("save_timeout", &self.save_timeout)
            .finish()
    }
}

impl HttpUploadService {
    pub fn new(config: &ServiceConfig) -> Result<Self, ServiceError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| ServiceError::Network(e.to_string()))?;
        // Trailing slash so relative joins stay under the API root
        let root = format!("{}/", config.base_url.trim_end_matches('/'));
        let base = Url::parse(&root)
            .map_err(|e| ServiceError::Network(format!("invalid base URL {}: {}", config.base_url, e)))?;
        Ok(Self {
            http,
            base,
            save_timeout: Duration::from_secs(config.save_timeout_secs),
        })
    }

    pub fn base_url(&self) -> &str {
        self.base.as_str()
    }

    fn endpoint(&self, path: &str) -> Result<Url, ServiceError> {
        self.base
            .join(path)
            .map_err(|e| ServiceError::Network(format!("invalid endpoint {}: {}", path, e)))
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, url: Url) -> Result<T, ServiceError> {
        debug!("HttpUploadService: GET {}", url);
        let response = self.http.get(url).send().await.map_err(transport_error)?;
        read_json(response).await
    }
}

impl UploadService for HttpUploadService {
    async fn upload_image(&self, file: &ImageFile) -> Result<UploadedImage, ServiceError> {
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.filename.clone())
            .mime_str(&file.mime)
            .map_err(|e| ServiceError::Validation(e.to_string()))?;
        let form = Form::new().part("file", part);

        info!(
            "HttpUploadService::upload_image: {} ({} bytes)",
            file.filename,
            file.bytes.len()
        );
        let response = self
            .http
            .post(self.endpoint("images/upload/")?)
            .multipart(form)
            .send()
            .await
            .map_err(transport_error)?;
        let record: ImageRecord = read_json(response).await?;
        Ok(record.into())
    }

    async fn get_image(&self, id: u64) -> Result<UploadedImage, ServiceError> {
        let record: ImageRecord = self.get_json(self.endpoint(&format!("images/{}/", id))?).await?;
        Ok(record.into())
    }

    async fn list_images(&self) -> Result<Vec<UploadedImage>, ServiceError> {
        let records: Vec<ImageRecord> = self.get_json(self.endpoint("images/")?).await?;
        Ok(records.into_iter().map(Into::into).collect())
    }

    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>, ServiceError> {
        // Media URLs are usually server-relative
        let url = self
            .base
            .join(url)
            .map_err(|e| ServiceError::Network(format!("invalid image URL {}: {}", url, e)))?;
        debug!("HttpUploadService::fetch_image: {}", url);
        let response = self.http.get(url).send().await.map_err(transport_error)?;
        let response = check_status(response).await?;
        let bytes = response.bytes().await.map_err(transport_error)?;
        Ok(bytes.to_vec())
    }

    async fn save_mask(
        &self,
        image_id: u64,
        mask: &MaskFile,
        signal: &AbortSignal,
    ) -> Result<SavedMask, ServiceError> {
        let part = Part::bytes(mask.bytes.clone())
            .file_name(mask.filename.clone())
            .mime_str(&mask.mime)
            .map_err(|e| ServiceError::Validation(e.to_string()))?;
        let form = Form::new()
            .part("file", part)
            .text("image", image_id.to_string())
            .text("original_width", mask.original_width.to_string())
            .text("original_height", mask.original_height.to_string());
        let request = self
            .http
            .post(self.endpoint("masks/save/")?)
            .timeout(self.save_timeout)
            .multipart(form);

        info!(
            "HttpUploadService::save_mask: {} for image {} ({}x{})",
            mask.filename, image_id, mask.original_width, mask.original_height
        );
        let record: MaskRecord = run_abortable(signal, async move {
            let response = request.send().await.map_err(transport_error)?;
            read_json(response).await
        })
        .await?;
        Ok(record.into())
    }

    async fn list_masks(&self) -> Result<Vec<SavedMask>, ServiceError> {
        let records: Vec<MaskRecord> = self.get_json(self.endpoint("masks/")?).await?;
        Ok(records.into_iter().map(Into::into).collect())
    }

    async fn has_mask(&self, filename: &str) -> Result<bool, ServiceError> {
        let mut url = self.endpoint("masks/check/")?;
        url.path_segments_mut()
            .map_err(|_| ServiceError::Network("base URL cannot have a path".to_string()))?
            .pop_if_empty()
            .push(filename)
            .push("");
        let check: MaskCheck = self.get_json(url).await?;
        Ok(check.has_mask)
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Debug, Deserialize)]
struct ImageRecord {
    id: u64,
    #[serde(default)]
    file: Option<String>,
    #[serde(default)]
    image_url: Option<String>,
    #[serde(default)]
    original_filename: String,
    #[serde(default)]
    width: Option<u32>,
    #[serde(default)]
    height: Option<u32>,
}

impl From<ImageRecord> for UploadedImage {
    fn from(record: ImageRecord) -> Self {
        UploadedImage {
            id: record.id,
            url: record.image_url.or(record.file).unwrap_or_default(),
            original_filename: record.original_filename,
            width: record.width,
            height: record.height,
        }
    }
}

#[derive(Debug, Deserialize)]
struct MaskRecord {
    id: u64,
    #[serde(default)]
    file: String,
    image: u64,
}

impl From<MaskRecord> for SavedMask {
    fn from(record: MaskRecord) -> Self {
        SavedMask {
            id: record.id,
            url: record.file,
            image_id: record.image,
        }
    }
}

#[derive(Debug, Deserialize)]
struct MaskCheck {
    #[serde(rename = "hasMask")]
    has_mask: bool,
}

// =============================================================================
// RESPONSES
// =============================================================================

fn transport_error(e: reqwest::Error) -> ServiceError {
    if e.is_timeout() {
        ServiceError::Network(format!("request timed out: {}", e))
    } else {
        ServiceError::Network(e.to_string())
    }
}

async fn check_status(response: Response) -> Result<Response, ServiceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(classify_failure(status.as_u16(), body))
}

async fn read_json<T: for<'de> Deserialize<'de>>(response: Response) -> Result<T, ServiceError> {
    let response = check_status(response).await?;
    let text = response.text().await.map_err(transport_error)?;
    parse_body(&text)
}

fn parse_body<T: for<'de> Deserialize<'de>>(text: &str) -> Result<T, ServiceError> {
    serde_json::from_str(text).map_err(|e| ServiceError::Server {
        status: 200,
        body: format!("unexpected response body: {}", e),
    })
}

/// 4xx with a field-error body is a validation failure; any other non-2xx
/// is a server failure
fn classify_failure(status: u16, body: String) -> ServiceError {
    if (400..500).contains(&status) && is_field_error_body(&body) {
        warn!("HttpUploadService: rejected with {}: {}", status, body);
        ServiceError::Validation(body)
    } else {
        warn!("HttpUploadService: failed with {}: {}", status, body);
        ServiceError::Server { status, body }
    }
}

/// `{"field": ["message", ...], ...}`
fn is_field_error_body(body: &str) -> bool {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(serde_json::Value::Object(map)) => {
            !map.is_empty() && map.values().all(|v| v.is_array() || v.is_string())
        }
        _ => false,
    }
}

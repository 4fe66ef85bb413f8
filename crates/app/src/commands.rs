//! Subcommand handlers

use std::path::{Path, PathBuf};

use maskpaint_config::{ConfigError, EditorConfig};
use maskpaint_editor::{available_images, EditorError, EditorSession, ImageInfo};
use maskpaint_service::{
    is_mpo_filename, HttpUploadService, ImageCrateDecoder, ImageFile, ServiceError, UploadService,
};
use painting::{mask_filename, MaskError};
use thiserror::Error;
use tracing::{info, warn};

use crate::script::StrokeScript;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid stroke script: {0}")]
    Script(#[from] serde_json::Error),

    #[error(transparent)]
    Editor(#[from] EditorError),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error(transparent)]
    Mask(#[from] MaskError),

    #[error("Save was cancelled")]
    Cancelled,
}

fn read(path: &Path) -> Result<Vec<u8>, AppError> {
    std::fs::read(path).map_err(|source| AppError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn read_script(path: &Path) -> Result<StrokeScript, AppError> {
    let bytes = read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// MIME type a browser would report for a picked file
fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        _ if is_mpo_filename(&file_name(path)) => "image/mpo",
        _ => "application/octet-stream",
    }
}

fn image_file(path: &Path) -> Result<ImageFile, AppError> {
    Ok(ImageFile::new(file_name(path), mime_for(path), read(path)?))
}

async fn paint_and_save(
    session: &mut EditorSession,
    service: &HttpUploadService,
    script: &StrokeScript,
) -> Result<(), AppError> {
    let strokes = script.replay(session)?;
    info!("Replayed {} strokes", strokes);
    match session.save_mask(service).await? {
        Some(saved) => {
            info!("Saved mask {} for image {}", saved.id, saved.image_id);
            println!("{}", saved.url);
            Ok(())
        }
        None => Err(AppError::Cancelled),
    }
}

pub async fn render(
    config: EditorConfig,
    image: &Path,
    strokes: &Path,
    out: Option<&Path>,
) -> Result<(), AppError> {
    let script = read_script(strokes)?;
    let file = image_file(image)?;
    let format = config.mask.format;
    let mut session = EditorSession::new(config);

    if !file.is_supported() {
        return Err(EditorError::UnsupportedFileType {
            filename: file.filename,
            mime: file.mime,
        }
        .into());
    }
    session
        .load_image(ImageInfo::local(file.filename.clone()), &file.bytes, &ImageCrateDecoder)
        .await?;
    script.replay(&mut session)?;

    let mask = session.export_mask()?;
    let out = match out {
        Some(path) => path.to_path_buf(),
        None => image.with_file_name(mask_filename(&file.filename, format)),
    };
    std::fs::write(&out, mask.encode(format)?).map_err(|source| AppError::Io {
        path: out.clone(),
        source,
    })?;
    info!(
        "Wrote {} ({} masked pixels)",
        out.display(),
        mask.white_count()
    );
    Ok(())
}

pub async fn upload(
    config: EditorConfig,
    image: &Path,
    strokes: Option<&Path>,
) -> Result<(), AppError> {
    let script = strokes.map(read_script).transpose()?;
    let file = image_file(image)?;
    let service = HttpUploadService::new(&config.service)?;
    let mut session = EditorSession::new(config);

    let loaded = session
        .upload_and_load(&file, &service, &ImageCrateDecoder)
        .await?;
    info!(
        "Uploaded {} as image {:?} ({})",
        loaded.info.filename, loaded.info.image_id, loaded.original_dimensions
    );
    if let Some(url) = &loaded.info.url {
        println!("{}", url);
    }

    match script {
        Some(script) => paint_and_save(&mut session, &service, &script).await,
        None => Ok(()),
    }
}

pub async fn open(config: EditorConfig, id: u64, strokes: &Path) -> Result<(), AppError> {
    let script = read_script(strokes)?;
    let service = HttpUploadService::new(&config.service)?;
    let mut session = EditorSession::new(config);

    if service.has_mask(&service.get_image(id).await?.original_filename).await? {
        warn!("Image {} already has a mask; saving another", id);
    }
    session
        .open_uploaded(id, &service, &ImageCrateDecoder)
        .await?;
    paint_and_save(&mut session, &service, &script).await
}

pub async fn pending(config: &EditorConfig) -> Result<(), AppError> {
    let service = HttpUploadService::new(&config.service)?;
    let images = available_images(&service).await?;
    info!("{} images without a mask", images.len());
    for image in images {
        let size = match (image.width, image.height) {
            (Some(w), Some(h)) => format!("{}x{}", w, h),
            _ => "?".to_string(),
        };
        println!("{}\t{}\t{}", image.id, image.original_filename, size);
    }
    Ok(())
}

pub async fn check(config: &EditorConfig, filename: &str) -> Result<(), AppError> {
    let service = HttpUploadService::new(&config.service)?;
    let has_mask = service.has_mask(filename).await?;
    println!("{}", has_mask);
    Ok(())
}

//! Reading image dimensions

use std::io::Cursor;

use image::ImageReader;
use painting::Dimensions;
use tracing::debug;

use crate::ServiceError;

/// Decodes enough of an image to know its pixel size
#[allow(async_fn_in_trait)]
pub trait ImageDecoder {
    async fn decode(&self, bytes: &[u8]) -> Result<Dimensions, ServiceError>;
}

/// Decoder backed by the `image` crate.
///
/// Only the header is read. Multi-picture (MPO) files decode as their first
/// JPEG frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCrateDecoder;

impl ImageDecoder for ImageCrateDecoder {
    async fn decode(&self, bytes: &[u8]) -> Result<Dimensions, ServiceError> {
        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| ServiceError::Decode(e.to_string()))?;
        let format = reader.format();
        let (width, height) = reader
            .into_dimensions()
            .map_err(|e| ServiceError::Decode(e.to_string()))?;
        if width == 0 || height == 0 {
            return Err(ServiceError::Decode(format!("empty image {}x{}", width, height)));
        }
        debug!("ImageCrateDecoder::decode: {:?} {}x{}", format, width, height);
        Ok(Dimensions::new(width, height))
    }
}

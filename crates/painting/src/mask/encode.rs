//! The finished mask and its file encoding

use std::io::Cursor;
use std::path::Path;

use image::{DynamicImage, ImageFormat, RgbaImage};

use crate::constants::MASK_WHITE;
use crate::types::Dimensions;

use super::{MaskError, MaskFormat};

/// A mask at original image resolution, every pixel opaque white or black
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryMask {
    image: RgbaImage,
}

impl BinaryMask {
    /// Wrap an image that has already been through the threshold pass
    pub(crate) fn from_thresholded(image: RgbaImage) -> Self {
        Self { image }
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.image.width(), self.image.height())
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.image.get_pixel_checked(x, y).map(|p| p.0)
    }

    /// True when (x, y) is inside the mask and white
    pub fn is_masked(&self, x: u32, y: u32) -> bool {
        self.pixel(x, y) == Some(MASK_WHITE)
    }

    pub fn white_count(&self) -> u64 {
        self.image.pixels().filter(|p| p.0 == MASK_WHITE).count() as u64
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Encode as PNG or JPEG.
    ///
    /// JPEG has no alpha channel, so the mask is flattened to RGB first.
    pub fn encode(&self, format: MaskFormat) -> Result<Vec<u8>, MaskError> {
        let mut bytes = Vec::new();
        let mut cursor = Cursor::new(&mut bytes);
        let result = match format {
            MaskFormat::Png => self.image.write_to(&mut cursor, ImageFormat::Png),
            MaskFormat::Jpeg => DynamicImage::ImageRgba8(self.image.clone())
                .to_rgb8()
                .write_to(&mut cursor, ImageFormat::Jpeg),
        };
        result.map_err(|e| MaskError::Encode(e.to_string()))?;
        Ok(bytes)
    }
}

/// File name for the mask of `original`: its base name with the mask
/// format's extension
pub fn mask_filename(original: &str, format: MaskFormat) -> String {
    // Accept both separators; names may come from any client platform
    let name = original.rsplit(['/', '\\']).next().unwrap_or(original);
    let stem = Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("mask");
    format!("{}.{}", stem, format.extension())
}
